//! Prompt construction for clinical summarization
//!
//! Renders a fixed instruction template around the raw report text. The text
//! is embedded verbatim between delimiters so the model can always locate
//! where the source material starts and ends.

/// Marks the start of the embedded report text
pub const REPORT_OPEN: &str = "<<<REPORT";
/// Marks the end of the embedded report text
pub const REPORT_CLOSE: &str = "REPORT>>>";

/// Build the summarization prompt for one report.
///
/// The input must already be trimmed and non-empty; it is embedded verbatim
/// exactly once between [`REPORT_OPEN`] and [`REPORT_CLOSE`].
pub fn build_prompt(text: &str) -> String {
    format!(
        "You are a clinical pathology assistant. Summarize the report below for a \
treating physician.\n\
\n\
Structure the summary in three sections:\n\
1. Main findings\n\
2. Diagnosis / impression\n\
3. Recommendations\n\
\n\
Rules:\n\
- Preserve standardized international medical terms and abbreviations unchanged.\n\
- Preserve all numeric values and units exactly as written.\n\
- Do not introduce any fact that is absent from the report.\n\
\n\
{REPORT_OPEN}\n\
{text}\n\
{REPORT_CLOSE}\n\
\n\
Summary:"
    )
}

/// Collapse runs of whitespace to single spaces and trim the ends.
///
/// Applied to incoming text before validation and prompt construction, so
/// transcripts with ragged line breaks produce a stable prompt.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
