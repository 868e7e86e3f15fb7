mod session;
mod utils;
