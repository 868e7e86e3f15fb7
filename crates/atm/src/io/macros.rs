/// Prints to stdout without a trailing newline and flushes.
#[macro_export]
macro_rules! sh_print {
    ($($arg:tt)*) => {
        $crate::io::__print(::std::format_args!($($arg)*))
    };
}

/// Prints a line to stdout.
#[macro_export]
macro_rules! sh_println {
    () => {
        $crate::io::__println(::std::format_args!(""))
    };
    ($($arg:tt)*) => {
        $crate::io::__println(::std::format_args!($($arg)*))
    };
}

/// Prints a warning to stderr.
#[macro_export]
macro_rules! sh_warn {
    ($($arg:tt)*) => {
        $crate::io::__warn(::std::format_args!($($arg)*))
    };
}

/// Prints an error to stderr.
#[macro_export]
macro_rules! sh_err {
    ($($arg:tt)*) => {
        $crate::io::__err(::std::format_args!($($arg)*))
    };
}
