// file: src/summarizer/prompts.rs
// description: prompt templates for map-reduce resume summarization
// reference: internal prompt conventions

const TEXT_PLACEHOLDER: &str = "{text}";

pub const MAP_TEMPLATE: &str = "Write a concise summary of the following:\n\n\n\"{text}\"\n\n\nCONCISE SUMMARY:";

pub const COMBINE_TEMPLATE: &str = "Write a concise summary of the following:\n\n\n\"{text}\"\n\n\nCONCISE SUMMARY:";

/// Shown instead of a summary when the resume has no extractable text.
pub const EMPTY_DOCUMENT_SUMMARY: &str = "No text could be extracted from this resume.";

pub fn map_prompt(chunk: &str) -> String {
    MAP_TEMPLATE.replace(TEXT_PLACEHOLDER, chunk)
}

pub fn combine_prompt(summaries: &[String]) -> String {
    COMBINE_TEMPLATE.replace(TEXT_PLACEHOLDER, &summaries.join("\n\n"))
}
