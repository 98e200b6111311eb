//! Search functionality for filtering items.
//!
//! This module encapsulates the matching logic, allowing the underlying
//! implementation to be changed without affecting the rest of the codebase.

/// A case-insensitive substring matcher.
///
/// The pattern is lowered once on construction, so one matcher can be
/// reused against every row of a table.
#[derive(Debug, Clone, Default)]
pub struct Matcher {
    pattern: String,
}

impl Matcher {
    pub fn new(pattern: &str) -> Self {
        Self {
            pattern: pattern.to_lowercase(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pattern.is_empty()
    }

    /// An empty pattern matches everything.
    pub fn matches(&self, text: &str) -> bool {
        self.pattern.is_empty() || text.to_lowercase().contains(&self.pattern)
    }
}
