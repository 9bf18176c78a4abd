#![forbid(unsafe_code)]

/// Diagnostic line on stderr. Stdout carries protocol frames exclusively, so
/// all logging goes through here.
pub(crate) fn log_line(message: &str) {
    eprintln!("[ttaat-mcp {}] {message}", crate::now_rfc3339());
}
