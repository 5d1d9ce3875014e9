//! Which semantic checks run.

/// Switches for the semantic checks. Syntax errors, cyclic includes and
/// graph problems are always reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CheckConfig {
    /// Report calls whose argument count the resolved method does not accept
    pub check_arity: bool,
    /// Report constant paths that do not resolve
    pub report_unknown_constants: bool,
    /// Report calls on a known receiver that no ancestor defines
    pub report_missing_methods: bool,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            check_arity: true,
            report_unknown_constants: true,
            report_missing_methods: true,
        }
    }
}

impl CheckConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_arity_checks(mut self, enabled: bool) -> Self {
        self.check_arity = enabled;
        self
    }

    pub fn with_unknown_constants(mut self, enabled: bool) -> Self {
        self.report_unknown_constants = enabled;
        self
    }

    pub fn with_missing_methods(mut self, enabled: bool) -> Self {
        self.report_missing_methods = enabled;
        self
    }
}
