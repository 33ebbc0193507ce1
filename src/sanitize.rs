//! Model output sanitization
//!
//! Some models emit an internal reasoning block before the answer, delimited
//! by `<think>`/`</think>` markers. The block is stripped before any output
//! reaches a caller.

/// Start marker of a reasoning block
pub const THINK_OPEN: &str = "<think>";
/// End marker of a reasoning block
pub const THINK_CLOSE: &str = "</think>";

/// Strip reasoning markup from raw model output.
///
/// Discards everything up to and including the last [`THINK_CLOSE`] marker
/// and trims surrounding whitespace. Cutting at the last end marker means the
/// result never contains one, which makes the function idempotent. Output
/// without an end marker is returned trimmed as-is.
pub fn sanitize(output: &str) -> String {
    match output.rfind(THINK_CLOSE) {
        Some(pos) => output[pos + THINK_CLOSE.len()..].trim().to_string(),
        None => output.trim().to_string(),
    }
}
