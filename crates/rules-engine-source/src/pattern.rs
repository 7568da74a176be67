//! Literal pattern queries for substring matching.

use crate::error::SourceError;
use crate::model::ResponseRecord;
use regex::{Regex, RegexBuilder};

/// Which record fields a pattern query tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternMode {
    /// Case-insensitive substring of `message`.
    MessageSubstring,
    /// Substring of `message`, or exact member of `keywords`.
    MessageSubstringOrKeyword,
}

/// Normalized text plus match mode, evaluated by a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternQuery {
    pub text: String,
    pub mode: PatternMode,
}

impl PatternQuery {
    pub fn new(text: impl Into<String>, mode: PatternMode) -> Self {
        Self {
            text: text.into(),
            mode,
        }
    }

    /// Compile the query with every metacharacter escaped.
    pub fn compile(&self) -> Result<CompiledPattern, SourceError> {
        let regex = RegexBuilder::new(&regex::escape(&self.text))
            .case_insensitive(true)
            .build()
            .map_err(|err| SourceError::Regex(err.to_string()))?;
        Ok(CompiledPattern {
            regex,
            query: self.clone(),
        })
    }
}

/// A compiled [`PatternQuery`].
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    regex: Regex,
    query: PatternQuery,
}

impl CompiledPattern {
    /// Test a record against the query.
    pub fn matches(&self, record: &ResponseRecord) -> bool {
        if self.regex.is_match(&record.message) {
            return true;
        }
        matches!(self.query.mode, PatternMode::MessageSubstringOrKeyword)
            && record.has_keyword(&self.query.text)
    }
}

#[cfg(test)]
mod tests {
    use super::{PatternMode, PatternQuery};
    use crate::ResponseRecord;

    #[test]
    fn metacharacters_are_literal() {
        let pattern = PatternQuery::new("a.b", PatternMode::MessageSubstring)
            .compile()
            .expect("compile");
        assert!(!pattern.matches(&ResponseRecord::new(["k"], "aXb", "r")));
        assert!(pattern.matches(&ResponseRecord::new(["k"], "see a.b here", "r")));

        let stars = PatternQuery::new("a.b*c(", PatternMode::MessageSubstring)
            .compile()
            .expect("unbalanced input still compiles");
        assert!(stars.matches(&ResponseRecord::new(["k"], "x A.B*C( y", "r")));
        assert!(!stars.matches(&ResponseRecord::new(["k"], "aXbbbc(", "r")));
    }

    #[test]
    fn substring_is_case_insensitive() {
        let pattern = PatternQuery::new("horario", PatternMode::MessageSubstring)
            .compile()
            .expect("compile");
        assert!(pattern.matches(&ResponseRecord::new(["k"], "Consulta de HORARIO", "r")));
    }

    #[test]
    fn keyword_membership_only_in_combined_mode() {
        let record = ResponseRecord::new(["precio"], "lista", "r");
        let plain = PatternQuery::new("precio", PatternMode::MessageSubstring)
            .compile()
            .expect("compile");
        let combined = PatternQuery::new("precio", PatternMode::MessageSubstringOrKeyword)
            .compile()
            .expect("compile");
        assert!(!plain.matches(&record));
        assert!(combined.matches(&record));
    }
}
