//! GitHub Actions workflow commands written to stdout.

/// Escape a message for use as workflow command data.
pub fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

pub fn error_command(message: &str) -> String {
    format!("::error::{}", escape_data(message))
}

/// Annotate the run with an error. The caller sets the failing exit status.
pub fn set_failed(message: &str) {
    println!("{}", error_command(message));
}
