//! File-name pattern lists used by per-file override rules.
//!
//! Patterns are shell-style wildcards (`*`, `?`, `[...]`) matched
//! case-insensitively against either the source's relative path or its bare
//! file name, so `*_norm.*` and `walls/*.tga` both work.

use glob::{MatchOptions, Pattern, PatternError};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// An ordered list of wildcard patterns.
#[derive(Debug, Clone, Default)]
pub struct PatternList {
    patterns: Vec<Pattern>,
}

impl PatternList {
    /// Create an empty list (matches nothing).
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a list separated by whitespace, `,` or `;`.
    pub fn parse(list: &str) -> Result<Self, PatternError> {
        let patterns = list
            .split(|c: char| c.is_whitespace() || c == ';' || c == ',')
            .filter(|p| !p.is_empty())
            .map(|p| Pattern::new(&p.replace('\\', "/")))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Append a single pattern.
    pub fn push(&mut self, pattern: &str) -> Result<(), PatternError> {
        self.patterns.push(Pattern::new(&pattern.replace('\\', "/"))?);
        Ok(())
    }

    /// Returns true if any pattern matches the candidate.
    pub fn matches(&self, candidate: &str) -> bool {
        let candidate = candidate.replace('\\', "/");
        self.patterns
            .iter()
            .any(|p| p.matches_with(&candidate, MATCH_OPTIONS))
    }

    /// Returns true if any pattern matches either of the candidates.
    pub fn matches_any(&self, relative_path: &str, file_name: &str) -> bool {
        self.matches(relative_path) || self.matches(file_name)
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Pattern sources in declaration order.
    pub fn as_strings(&self) -> Vec<String> {
        self.patterns.iter().map(|p| p.as_str().to_string()).collect()
    }
}
