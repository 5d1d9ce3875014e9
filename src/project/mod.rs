pub mod file_loader;
pub mod workspace_loader;

pub use file_loader::{LoadError, collect_file_paths, load_and_parse, load_file};
pub use workspace_loader::WorkspaceLoader;
