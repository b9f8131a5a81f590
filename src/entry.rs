use crate::config::FilesConfig;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One prompt directory under the prompts root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Directory holding the entry files
    pub dir: PathBuf,
    /// `dir` relative to the prompts root; empty for the inbox prompt
    pub rel: PathBuf,
}

impl Entry {
    pub fn new(root: &Path, dir: PathBuf) -> Self {
        let rel = dir.strip_prefix(root).map(Path::to_path_buf).unwrap_or_default();
        Self { dir, rel }
    }

    /// A prompt file dropped straight into the prompts root.
    pub fn is_inbox(&self) -> bool {
        self.rel.as_os_str().is_empty()
    }

    /// Display name: the relative path, or `(inbox)`.
    pub fn name(&self) -> String {
        if self.is_inbox() {
            "(inbox)".to_string()
        } else {
            self.rel.to_string_lossy().replace('\\', "/")
        }
    }

    pub fn prompt_path(&self, files: &FilesConfig) -> PathBuf {
        self.dir.join(&files.prompt)
    }

    pub fn metadata_path(&self, files: &FilesConfig) -> PathBuf {
        self.dir.join(&files.metadata)
    }

    pub fn view_path(&self, files: &FilesConfig) -> PathBuf {
        self.dir.join(&files.view)
    }

    /// Where the entry belongs for the given categorization.
    pub fn canonical_rel(category: &str, directory: &str) -> PathBuf {
        Path::new(category).join(directory)
    }
}

/// Entry directories at depth one or two holding any of `file_names`,
/// sorted by path.
pub fn discover(root: &Path, file_names: &[&str]) -> Vec<Entry> {
    WalkDir::new(root)
        .min_depth(1)
        .max_depth(2)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| match e {
            Ok(e) => Some(e),
            Err(err) => {
                log::warn!("Skipping unreadable path under {}: {}", root.display(), err);
                None
            }
        })
        .filter(|e| e.file_type().is_dir())
        .filter(|e| file_names.iter().any(|name| e.path().join(name).is_file()))
        .map(|e| Entry::new(root, e.into_path()))
        .collect()
}

/// Entries holding a prompt file, plus the inbox prompt first when present.
pub fn discover_prompts(root: &Path, files: &FilesConfig) -> Vec<Entry> {
    let mut entries = Vec::new();
    if root.join(&files.prompt).is_file() {
        entries.push(Entry::new(root, root.to_path_buf()));
    }
    entries.extend(discover(root, &[files.prompt.as_str()]));
    entries
}
