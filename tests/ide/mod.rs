//! Analysis host and expectation tests

pub mod tests_analysis_host;
pub mod tests_expectations;
