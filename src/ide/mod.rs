//! Analysis surface: the host that owns workspace state, and expectation
//! checking for annotated sources.
//!
//! ## Usage
//!
//! ```ignore
//! use rubric::ide::AnalysisHost;
//!
//! let mut host = AnalysisHost::new();
//! host.set_file_content("app.rb", "class App\n  include Missing # error: unknown constant `Missing`\nend\n");
//!
//! let analysis = host.analysis();
//! let file = analysis.get_file_id("app.rb").unwrap();
//! assert!(analysis.check_expectations(file).unwrap().is_ok());
//! ```

mod analysis;
mod expectations;

pub use analysis::{Analysis, AnalysisHost};
pub use expectations::{Expectation, ExpectationReport, check_expectations, parse_expectations};
