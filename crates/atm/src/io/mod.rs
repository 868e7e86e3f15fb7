//! Terminal output.
//!
//! User-facing output goes through the `sh_*` macros so that colors are stripped when the output
//! is not a terminal. Diagnostics belong in `tracing` instead.

#[macro_use]
mod macros;

use std::{fmt, io::Write};
use yansi::Paint;

#[doc(hidden)]
pub fn __print(args: fmt::Arguments<'_>) -> std::io::Result<()> {
    let mut stdout = anstream::stdout();
    stdout.write_fmt(args)?;
    stdout.flush()
}

#[doc(hidden)]
pub fn __println(args: fmt::Arguments<'_>) -> std::io::Result<()> {
    let mut stdout = anstream::stdout();
    writeln!(stdout, "{args}")
}

#[doc(hidden)]
pub fn __warn(args: fmt::Arguments<'_>) -> std::io::Result<()> {
    let mut stderr = anstream::stderr();
    writeln!(stderr, "{}: {args}", "Warning".yellow().bold())
}

#[doc(hidden)]
pub fn __err(args: fmt::Arguments<'_>) -> std::io::Result<()> {
    let mut stderr = anstream::stderr();
    writeln!(stderr, "{}: {args}", "Error".red().bold())
}
