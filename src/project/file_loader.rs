//! Reading Ruby sources from disk.

use std::fs;
use std::path::{Path, PathBuf};

use crate::base::constants::RUBY_EXTENSIONS;
use crate::syntax::SyntaxFile;

/// Errors raised while locating or reading source files.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Unsupported file extension: {}", path.display())]
    UnsupportedExtension { path: PathBuf },
    #[error("Directory not found: {}", path.display())]
    NotADirectory { path: PathBuf },
}

impl LoadError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// The path the error is about.
    pub fn path(&self) -> &Path {
        match self {
            Self::Io { path, .. }
            | Self::UnsupportedExtension { path }
            | Self::NotADirectory { path } => path,
        }
    }
}

// ============================================================================
// COLLECTION
// ============================================================================

/// Recursively collect all Ruby source files under `dir`, sorted by path.
pub fn collect_file_paths(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    if !dir.is_dir() {
        return Err(LoadError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }
    let mut paths = Vec::new();
    collect_recursive(dir, &mut paths)?;
    paths.sort();
    tracing::debug!("[LOADER] {} source files under {}", paths.len(), dir.display());
    Ok(paths)
}

fn collect_recursive(dir: &Path, paths: &mut Vec<PathBuf>) -> Result<(), LoadError> {
    let entries = fs::read_dir(dir).map_err(|e| LoadError::io(dir, e))?;
    for entry in entries {
        let path = entry.map_err(|e| LoadError::io(dir, e))?.path();
        if path.is_dir() {
            collect_recursive(&path, paths)?;
        } else if path.is_file() && is_ruby_file(&path) {
            paths.push(path);
        }
    }
    Ok(())
}

// ============================================================================
// LOADING
// ============================================================================

pub fn get_extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|ext| ext.to_str())
}

fn is_ruby_file(path: &Path) -> bool {
    get_extension(path).is_some_and(|ext| RUBY_EXTENSIONS.contains(&ext))
}

/// Reject paths that are not `.rb` or `.rbi` files.
pub fn validate_extension(path: &Path) -> Result<(), LoadError> {
    if is_ruby_file(path) {
        Ok(())
    } else {
        Err(LoadError::UnsupportedExtension {
            path: path.to_path_buf(),
        })
    }
}

/// Read a source file.
pub fn load_file(path: &Path) -> Result<String, LoadError> {
    validate_extension(path)?;
    fs::read_to_string(path).map_err(|e| LoadError::io(path, e))
}

/// Parse in-memory content that belongs to `path`.
///
/// Syntax errors do not fail the parse; they are carried by the returned
/// [`SyntaxFile`].
pub fn parse_content(content: &str, path: &Path) -> Result<SyntaxFile, LoadError> {
    validate_extension(path)?;
    Ok(SyntaxFile::new(content))
}

/// Read and parse a source file.
pub fn load_and_parse(path: &Path) -> Result<SyntaxFile, LoadError> {
    let content = load_file(path)?;
    parse_content(&content, path)
}
