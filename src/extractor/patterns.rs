// file: src/extractor/patterns.rs
// description: compiled regex patterns and defaults for resume metadata extraction
// reference: https://docs.rs/regex

use lazy_static::lazy_static;
use regex::Regex;

/// Placeholder for fields the heuristics could not fill.
pub const NOT_MENTIONED: &str = "Not mentioned";

/// Placeholder description for documents without text.
pub const NOT_AVAILABLE: &str = "Not available";

pub const DEFAULT_EXPERIENCE_PATTERN: &str = r"(\d+)\+?\s+years? of experience";

pub const DEFAULT_SKILLS: [&str; 8] = [
    "Java",
    "Python",
    "Machine Learning",
    "SQL",
    "React",
    "AWS",
    "DevOps",
    "Data Science",
];

lazy_static! {
    pub static ref YEARS_OF_EXPERIENCE: Regex = case_insensitive(DEFAULT_EXPERIENCE_PATTERN)
        .expect("YEARS_OF_EXPERIENCE regex is valid");
}

/// Compiles `pattern` with case-insensitive matching.
pub fn case_insensitive(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("(?i){}", pattern))
}

/// Builds a case-insensitive whole-word matcher for a literal vocabulary term.
///
/// Word boundaries are only asserted on sides where the term itself starts or
/// ends with a word character, so terms such as `C++` or `.NET` still match.
pub fn vocabulary_term(term: &str) -> Result<Regex, regex::Error> {
    let escaped = regex::escape(term.trim());
    let starts_with_word = term.trim().chars().next().is_some_and(is_word_char);
    let ends_with_word = term.trim().chars().last().is_some_and(is_word_char);

    let pattern = format!(
        "(?i){}{}{}",
        if starts_with_word { r"\b" } else { "" },
        escaped,
        if ends_with_word { r"\b" } else { "" }
    );
    Regex::new(&pattern)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
