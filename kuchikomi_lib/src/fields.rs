//! Best-effort field probes. Each probe looks at one piece of text and
//! returns `None` when it finds nothing; probes never depend on each other.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::KuchikomiError;

static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+").expect("digit regex"));
static EXACT_AGE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+歳").expect("age regex"));
static AGE_BUCKET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+代[前中後半]*").expect("age bucket regex"));

/// First run of digits in the rating element's text, e.g. `"★4.0"` gives 4.
pub fn parse_score(rating_text: Option<&str>) -> Option<u8> {
    let text = rating_text?;
    DIGITS.find(text)?.as_str().parse().ok()
}

/// Exact age (`32歳`) if present anywhere, otherwise an age bucket (`40代前半`).
pub fn parse_age(info_text: &str) -> Option<String> {
    EXACT_AGE
        .find(info_text)
        .or_else(|| AGE_BUCKET.find(info_text))
        .map(|m| m.as_str().to_string())
}

/// Declarative rule for a free-text classifier field (skin type, gender).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Classifier {
    /// First term, in list order, that occurs in the text.
    Vocabulary { terms: Vec<String> },
    /// First regex match; capture group 1 when the pattern has one.
    Pattern { regex: String },
}

impl Classifier {
    pub fn vocabulary<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Vocabulary {
            terms: terms.into_iter().map(Into::into).collect(),
        }
    }

    pub fn pattern(regex: impl Into<String>) -> Self {
        Self::Pattern {
            regex: regex.into(),
        }
    }

    pub(crate) fn compile(&self) -> Result<CompiledClassifier, KuchikomiError> {
        match self {
            Self::Vocabulary { terms } => {
                if terms.iter().any(|t| t.is_empty()) {
                    return Err(KuchikomiError::Adapter(
                        "vocabulary terms must not be empty".into(),
                    ));
                }
                Ok(CompiledClassifier::Vocabulary(terms.clone()))
            }
            Self::Pattern { regex } => Regex::new(regex)
                .map(CompiledClassifier::Pattern)
                .map_err(|e| KuchikomiError::Adapter(format!("invalid pattern '{}': {}", regex, e))),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) enum CompiledClassifier {
    Vocabulary(Vec<String>),
    Pattern(Regex),
}

impl CompiledClassifier {
    pub(crate) fn classify(&self, text: &str) -> Option<String> {
        match self {
            Self::Vocabulary(terms) => terms.iter().find(|t| text.contains(t.as_str())).cloned(),
            Self::Pattern(re) => {
                let caps = re.captures(text)?;
                let m = caps.get(1).or_else(|| caps.get(0))?;
                let value = m.as_str().trim();
                (!value.is_empty()).then(|| value.to_string())
            }
        }
    }
}

/// Collapses the text of an element into a trimmed string, `None` when blank.
pub(crate) fn clean_text<'a>(parts: impl Iterator<Item = &'a str>) -> Option<String> {
    let joined: String = parts.collect();
    let trimmed = joined.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
