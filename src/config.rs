//! Front-end settings shared by the lexer, the parser and the command line.

/// Default bound on syntactic nesting (parentheses, casts, prefix operators,
/// blocks, declarators). Above the 63 levels of parentheses C99 guarantees.
pub const DEFAULT_MAX_NESTING: usize = 100;

/// Tunables for one parse run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Skip `#...` lines like comments instead of rejecting the `#`.
    pub skip_directives: bool,
    /// Stop the translation-unit loop once this many syntax errors are
    /// recorded. `None` keeps going to end of file.
    pub max_errors: Option<usize>,
    /// Deepest syntactic nesting the parser descends into before reporting
    /// a diagnostic instead of recursing further.
    pub max_nesting: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            skip_directives: true,
            max_errors: None,
            max_nesting: DEFAULT_MAX_NESTING,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Config::default()
    }

    pub fn with_skip_directives(mut self, skip: bool) -> Self {
        self.skip_directives = skip;
        self
    }

    pub fn with_max_errors(mut self, max_errors: Option<usize>) -> Self {
        self.max_errors = max_errors;
        self
    }

    pub fn with_max_nesting(mut self, max_nesting: usize) -> Self {
        self.max_nesting = max_nesting;
        self
    }

    /// Whether `count` recorded errors exhausts the error budget.
    pub fn error_budget_spent(&self, count: usize) -> bool {
        self.max_errors.is_some_and(|max| count >= max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.skip_directives);
        assert!(!config.error_budget_spent(1000));
        assert_eq!(config.max_nesting, DEFAULT_MAX_NESTING);
    }

    #[test]
    fn test_error_budget() {
        let config = Config::new().with_max_errors(Some(2));
        assert!(!config.error_budget_spent(1));
        assert!(config.error_budget_spent(2));
    }
}
