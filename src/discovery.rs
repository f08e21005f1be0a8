//! Discovery of template sources and of generated component modules.

use lazy_static::lazy_static;
use regex::Regex;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

lazy_static! {
    /// `<lowercase identifier>_<40 hex>.js`, the shape of every wrapper module.
    static ref COMPONENT_MODULE_RE: Regex = Regex::new(r"^[a-z_][a-z0-9_]*_[0-9a-f]{40}\.js$").unwrap();
}

/// A template source together with the project root it was found under.
/// Generated modules land at the file's directory relative to that root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceFile {
    pub path: PathBuf,
    pub root: PathBuf,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, root: impl Into<PathBuf>) -> Self {
        SourceFile {
            path: path.into(),
            root: root.into(),
        }
    }

    /// A lone file, rooted at its own directory.
    pub fn single(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let root = path.parent().map(Path::to_path_buf).unwrap_or_default();
        SourceFile { path, root }
    }

    pub fn dir(&self) -> PathBuf {
        self.path.parent().map(Path::to_path_buf).unwrap_or_default()
    }

    /// Directory of the file relative to its root; empty when it sits at the
    /// root or lies outside it.
    pub fn relative_dir(&self) -> PathBuf {
        self.dir()
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    pub fn display_name(&self) -> String {
        self.path.to_string_lossy().to_string()
    }
}

/// Recursively finds files with one of `extensions` under `root`, in file-name
/// order so that runs over the same tree see the same sequence.
pub fn discover_sources(root: &Path, extensions: &[String]) -> Vec<SourceFile> {
    if !root.exists() {
        return Vec::new();
    }

    WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| extensions.iter().any(|e| e == ext))
        })
        .map(|entry| SourceFile::new(entry.path(), root))
        .collect()
}

pub fn is_component_module(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| COMPONENT_MODULE_RE.is_match(name))
}

/// Every generated wrapper module under `dir`, sorted by path.
pub fn find_component_modules(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && is_component_module(entry.path()))
        .map(|entry| entry.into_path())
        .collect()
}

/// Non-generated `.js`/`.ts` files under `dir`.
pub fn find_script_files(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            matches!(
                path.extension().and_then(|ext| ext.to_str()),
                Some("js") | Some("ts")
            ) && !is_component_module(path)
        })
        .collect()
}
