use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::ide::AnalysisHost;
use crate::syntax::ParseError;

use super::file_loader::{self, LoadError};

/// Loads workspace files into an [`AnalysisHost`].
///
/// Files are read in parallel and installed in path order, so file ids do
/// not depend on thread scheduling.
pub struct WorkspaceLoader;

impl WorkspaceLoader {
    pub fn new() -> Self {
        Self
    }

    /// Loads all `.rb` and `.rbi` files under a directory into an
    /// AnalysisHost. Unreadable files are skipped with a warning.
    ///
    /// Returns the number of files loaded.
    pub fn load_directory_into_host<P: AsRef<Path>>(
        &self,
        path: P,
        host: &mut AnalysisHost,
    ) -> Result<usize, LoadError> {
        let paths = file_loader::collect_file_paths(path.as_ref())?;

        let contents: Vec<(PathBuf, Result<String, LoadError>)> = paths
            .into_par_iter()
            .map(|path| {
                let content = file_loader::load_file(&path);
                (path, content)
            })
            .collect();

        let mut loaded = 0;
        for (path, content) in contents {
            match content {
                Ok(text) => {
                    let errors = host.set_file_content(path.clone(), text);
                    if !errors.is_empty() {
                        tracing::debug!(
                            "[LOADER] {} has {} syntax errors",
                            path.display(),
                            errors.len()
                        );
                    }
                    loaded += 1;
                }
                Err(e) => tracing::warn!("[LOADER] skipping {}: {}", path.display(), e),
            }
        }
        Ok(loaded)
    }

    /// Loads a single file into an AnalysisHost, returning its syntax errors.
    pub fn load_file_into_host<P: Into<PathBuf>>(
        &self,
        path: P,
        host: &mut AnalysisHost,
    ) -> Result<Vec<ParseError>, LoadError> {
        let path = path.into();
        let text = file_loader::load_file(&path)?;
        Ok(host.set_file_content(path, text))
    }
}

impl Default for WorkspaceLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_directory_into_host() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("m.rb"), "module M\n  def greet; end\nend\n").unwrap();
        fs::write(root.join("c.rb"), "class C\n  include M\nend\n").unwrap();
        fs::write(root.join("notes.txt"), "ignored").unwrap();

        let mut host = AnalysisHost::new();
        let loaded = WorkspaceLoader::new()
            .load_directory_into_host(root, &mut host)
            .unwrap();
        assert_eq!(loaded, 2);

        // Installed in path order: c.rb before m.rb
        let c = host.get_file_id(root.join("c.rb")).unwrap();
        let m = host.get_file_id(root.join("m.rb")).unwrap();
        assert!(c < m);

        let analysis = host.analysis();
        assert!(analysis.resolve_method("C", "greet").unwrap().is_ok());
        assert!(analysis.all_diagnostics().is_empty());
    }

    #[test]
    fn test_load_directory_missing() {
        let mut host = AnalysisHost::new();
        let result = WorkspaceLoader::new().load_directory_into_host("/nonexistent/rubric", &mut host);
        assert!(matches!(result, Err(LoadError::NotADirectory { .. })));
    }

    #[test]
    fn test_load_file_into_host() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.rb");
        fs::write(&path, "class\n").unwrap();

        let mut host = AnalysisHost::new();
        let errors = WorkspaceLoader::default()
            .load_file_into_host(&path, &mut host)
            .unwrap();
        assert!(!errors.is_empty());
        assert_eq!(host.file_count(), 1);
    }

    #[test]
    fn test_load_file_rejects_extension() {
        let mut host = AnalysisHost::new();
        let result = WorkspaceLoader::new().load_file_into_host("notes.txt", &mut host);
        assert!(matches!(result, Err(LoadError::UnsupportedExtension { .. })));
    }
}
