/// Print a tip message with a newline
macro_rules! tip {
    ($msg:expr) => {
        println!("  {}: {}", "tip".bold().cyan(), $msg);
    };
}
pub(crate) use tip;

/// Print an error message with a newline
macro_rules! error {
    ($msg:expr) => {
        eprintln!("{}: {}", "error".bold().red(), $msg);
    };
}
pub(crate) use error;
