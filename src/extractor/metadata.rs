// file: src/extractor/metadata.rs
// description: rule-table driven resume metadata heuristics (experience, skills, description)
// reference: https://docs.rs/regex

use crate::config::{ExtractionConfig, MetadataField, MetadataRule};
use crate::error::{PipelineError, Result};
use crate::extractor::patterns::{
    DEFAULT_SKILLS, NOT_AVAILABLE, NOT_MENTIONED, YEARS_OF_EXPERIENCE, case_insensitive,
    vocabulary_term,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Heuristic fields derived from resume text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeHeuristics {
    pub years_of_experience: String,
    pub key_skills: String,
    pub description: String,
}

enum CompiledRule {
    FirstMatch {
        field: MetadataField,
        pattern: Regex,
    },
    Vocabulary {
        field: MetadataField,
        terms: Vec<(String, Regex)>,
    },
}

pub struct MetadataExtractor {
    rules: Vec<CompiledRule>,
    description_words: usize,
}

impl MetadataExtractor {
    /// Compiles the configured rule table. A bad pattern is a configuration
    /// error, surfaced before any resume is processed.
    pub fn from_config(config: &ExtractionConfig) -> Result<Self> {
        let mut rules = Vec::with_capacity(config.rules.len());

        for rule in &config.rules {
            let compiled = match rule {
                MetadataRule::FirstMatch { field, pattern } => CompiledRule::FirstMatch {
                    field: *field,
                    pattern: case_insensitive(pattern).map_err(|e| {
                        PipelineError::Config(format!("invalid pattern for {:?}: {}", field, e))
                    })?,
                },
                MetadataRule::Vocabulary { field, terms } => {
                    let mut compiled_terms = Vec::with_capacity(terms.len());
                    for term in terms.iter().filter(|t| !t.trim().is_empty()) {
                        let regex = vocabulary_term(term).map_err(|e| {
                            PipelineError::Config(format!("invalid term {:?}: {}", term, e))
                        })?;
                        compiled_terms.push((term.trim().to_string(), regex));
                    }
                    CompiledRule::Vocabulary {
                        field: *field,
                        terms: compiled_terms,
                    }
                }
            };
            rules.push(compiled);
        }

        Ok(Self {
            rules,
            description_words: config.description_words,
        })
    }

    pub fn extract(&self, text: &str) -> ResumeHeuristics {
        let mut years_of_experience: Option<String> = None;
        let mut key_skills: Vec<String> = Vec::new();

        for rule in &self.rules {
            match rule {
                CompiledRule::FirstMatch { field, pattern } => {
                    let value = pattern.captures(text).and_then(|caps| {
                        caps.get(1)
                            .or_else(|| caps.get(0))
                            .map(|m| m.as_str().to_string())
                    });
                    if let Some(value) = value {
                        assign(*field, vec![value], &mut years_of_experience, &mut key_skills);
                    }
                }
                CompiledRule::Vocabulary { field, terms } => {
                    let found = terms
                        .iter()
                        .filter(|(_, regex)| regex.is_match(text))
                        .map(|(term, _)| term.clone())
                        .collect::<Vec<_>>();
                    assign(*field, found, &mut years_of_experience, &mut key_skills);
                }
            }
        }

        let mut seen = HashSet::new();
        key_skills.retain(|skill| seen.insert(skill.to_lowercase()));

        debug!(
            "Extracted experience {:?} and {} skills",
            years_of_experience,
            key_skills.len()
        );

        ResumeHeuristics {
            years_of_experience: years_of_experience.unwrap_or_else(|| NOT_MENTIONED.to_string()),
            key_skills: if key_skills.is_empty() {
                NOT_MENTIONED.to_string()
            } else {
                key_skills.join(", ")
            },
            description: self.describe(text),
        }
    }

    fn describe(&self, text: &str) -> String {
        let words = text
            .split_whitespace()
            .take(self.description_words)
            .collect::<Vec<_>>();

        if words.is_empty() {
            NOT_AVAILABLE.to_string()
        } else {
            words.join(" ")
        }
    }
}

impl Default for MetadataExtractor {
    fn default() -> Self {
        let terms = DEFAULT_SKILLS
            .iter()
            .filter_map(|term| vocabulary_term(term).ok().map(|re| (term.to_string(), re)))
            .collect();

        Self {
            rules: vec![
                CompiledRule::FirstMatch {
                    field: MetadataField::YearsOfExperience,
                    pattern: YEARS_OF_EXPERIENCE.clone(),
                },
                CompiledRule::Vocabulary {
                    field: MetadataField::KeySkills,
                    terms,
                },
            ],
            description_words: ExtractionConfig::default().description_words,
        }
    }
}

// Only the first value ever fills the experience field.
fn assign(
    field: MetadataField,
    values: Vec<String>,
    years_of_experience: &mut Option<String>,
    key_skills: &mut Vec<String>,
) {
    match field {
        MetadataField::YearsOfExperience => {
            if years_of_experience.is_none() {
                *years_of_experience = values.into_iter().next();
            }
        }
        MetadataField::KeySkills => key_skills.extend(values),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn skills_of(heuristics: &ResumeHeuristics) -> HashSet<String> {
        heuristics
            .key_skills
            .split(", ")
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_years_of_experience_variants() {
        let extractor = MetadataExtractor::default();

        for (text, expected) in [
            ("5 years of experience in Python", "5"),
            ("Senior engineer with 12+ Years Of Experience", "12"),
            ("1 year of experience", "1"),
            ("3 years of experience, then 10 years of experience", "3"),
        ] {
            assert_eq!(extractor.extract(text).years_of_experience, expected);
        }
    }

    #[test]
    fn test_years_of_experience_absent() {
        let extractor = MetadataExtractor::default();
        let heuristics = extractor.extract("Experienced engineer, many years in the field");
        assert_eq!(heuristics.years_of_experience, NOT_MENTIONED);
    }

    #[test]
    fn test_key_skills_deduplicated() {
        let extractor = MetadataExtractor::default();
        let heuristics =
            extractor.extract("python, PYTHON and Python. AWS certified; aws lambda; SQL");

        let skills = skills_of(&heuristics);
        assert_eq!(heuristics.key_skills.split(", ").count(), 3);
        assert!(skills.contains("Python"));
        assert!(skills.contains("AWS"));
        assert!(skills.contains("SQL"));
    }

    #[test]
    fn test_key_skills_only_vocabulary_members() {
        let extractor = MetadataExtractor::default();
        let heuristics = extractor.extract("JavaScript, Kubernetes and data science");

        let skills = skills_of(&heuristics);
        let vocabulary: HashSet<String> = DEFAULT_SKILLS.iter().map(|s| s.to_string()).collect();
        assert!(skills.is_subset(&vocabulary));
        assert!(skills.contains("Data Science"));
        assert!(!skills.contains("Java"));
    }

    #[test]
    fn test_key_skills_absent() {
        let extractor = MetadataExtractor::default();
        assert_eq!(extractor.extract("Gardening and cooking").key_skills, NOT_MENTIONED);
    }

    #[test]
    fn test_description_truncation() {
        let config = ExtractionConfig {
            description_words: 3,
            ..ExtractionConfig::default()
        };
        let extractor = MetadataExtractor::from_config(&config).unwrap();

        let heuristics = extractor.extract("one  two\nthree four five");
        assert_eq!(heuristics.description, "one two three");
    }

    #[test]
    fn test_empty_text() {
        let extractor = MetadataExtractor::default();
        let heuristics = extractor.extract("");

        assert_eq!(
            heuristics,
            ResumeHeuristics {
                years_of_experience: NOT_MENTIONED.to_string(),
                key_skills: NOT_MENTIONED.to_string(),
                description: NOT_AVAILABLE.to_string(),
            }
        );
    }

    #[test]
    fn test_custom_rule_table() {
        let config = ExtractionConfig {
            description_words: 10,
            rules: vec![
                MetadataRule::FirstMatch {
                    field: MetadataField::YearsOfExperience,
                    pattern: r"experience:\s*(\d+)".to_string(),
                },
                MetadataRule::Vocabulary {
                    field: MetadataField::KeySkills,
                    terms: vec!["Rust".to_string(), "C++".to_string()],
                },
            ],
        };
        let extractor = MetadataExtractor::from_config(&config).unwrap();
        let heuristics = extractor.extract("Experience: 8 with rust and C++, some Python");

        assert_eq!(heuristics.years_of_experience, "8");
        let skills = skills_of(&heuristics);
        assert_eq!(skills.len(), 2);
        assert!(skills.contains("Rust"));
        assert!(skills.contains("C++"));
    }

    #[test]
    fn test_invalid_pattern_is_config_error() {
        let config = ExtractionConfig {
            description_words: 10,
            rules: vec![MetadataRule::FirstMatch {
                field: MetadataField::YearsOfExperience,
                pattern: "(unclosed".to_string(),
            }],
        };
        assert!(matches!(
            MetadataExtractor::from_config(&config),
            Err(PipelineError::Config(_))
        ));
    }
}
