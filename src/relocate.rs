//! Moving an entry directory to its canonical location.
//!
//! `relocate_or_merge` is copy-then-delete when the target already exists and
//! is not atomic: an interrupted run can leave files in both places. Re-running
//! the synchronizer is safe because every step is re-derived from disk.

use eyre::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// What happened to the entry directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relocation {
    /// Target did not exist; the directory was renamed.
    Renamed { to: PathBuf },
    /// Target existed; source files were copied over it and the source removed.
    Merged { to: PathBuf, overwritten: Vec<String> },
}

impl Relocation {
    pub fn target(&self) -> &Path {
        match self {
            Relocation::Renamed { to } | Relocation::Merged { to, .. } => to,
        }
    }
}

/// Move directory `from` to `to`. When `to` exists, copy the files of `from`
/// into it (same-named files are overwritten and reported), then remove `from`.
/// Subdirectories of `from` are not carried over in a merge.
pub fn relocate_or_merge(from: &Path, to: &Path) -> Result<Relocation> {
    log::info!("Renaming directory from {} to {}", from.display(), to.display());

    // a directory cannot be renamed into itself; step aside first
    if to.starts_with(from) {
        let staging = staging_path(from);
        fs::rename(from, &staging).context(format!("Failed to rename {} to {}", from.display(), staging.display()))?;
        return relocate_or_merge(&staging, to);
    }

    if !to.exists() {
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent).context(format!("Failed to create {}", parent.display()))?;
        }
        fs::rename(from, to).context(format!("Failed to rename {} to {}", from.display(), to.display()))?;
        return Ok(Relocation::Renamed { to: to.to_path_buf() });
    }

    log::warn!("Directory {} already exists. Updating contents.", to.display());
    let mut overwritten = Vec::new();
    for item in fs::read_dir(from).context(format!("Failed to read {}", from.display()))? {
        let item = item?;
        let src = item.path();
        let name = item.file_name().to_string_lossy().to_string();
        if !src.is_file() {
            log::warn!("Not merging subdirectory {} into {}", src.display(), to.display());
            continue;
        }
        let dst = to.join(&name);
        if dst.exists() {
            log::warn!("Overwriting {} with {}", dst.display(), src.display());
            overwritten.push(name);
        }
        fs::copy(&src, &dst).context(format!("Failed to copy {} to {}", src.display(), dst.display()))?;
    }
    fs::remove_dir_all(from).context(format!("Failed to remove {}", from.display()))?;

    Ok(Relocation::Merged {
        to: to.to_path_buf(),
        overwritten,
    })
}

fn staging_path(dir: &Path) -> PathBuf {
    let mut name = dir.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".relocating");
    dir.with_file_name(name)
}

/// Move the single file `from` into directory `to_dir`, creating it. An
/// existing file of the same name is replaced with a warning.
pub fn relocate_file(from: &Path, to_dir: &Path) -> Result<Relocation> {
    let name = from
        .file_name()
        .ok_or_else(|| eyre::eyre!("Not a file path: {}", from.display()))?;
    let dst = to_dir.join(name);
    log::info!("Moving {} to {}", from.display(), dst.display());

    let existed = to_dir.exists();
    fs::create_dir_all(to_dir).context(format!("Failed to create {}", to_dir.display()))?;

    let mut overwritten = Vec::new();
    if dst.exists() {
        log::warn!("Overwriting {} with {}", dst.display(), from.display());
        overwritten.push(name.to_string_lossy().to_string());
    }
    fs::rename(from, &dst).context(format!("Failed to move {} to {}", from.display(), dst.display()))?;

    let to = to_dir.to_path_buf();
    Ok(if existed {
        Relocation::Merged { to, overwritten }
    } else {
        Relocation::Renamed { to }
    })
}

/// Remove `dir` if it is empty and strictly inside `root`.
pub fn prune_empty_dir(dir: &Path, root: &Path) -> Result<()> {
    if dir == root || !dir.starts_with(root) || !dir.is_dir() {
        return Ok(());
    }
    let is_empty = fs::read_dir(dir)
        .context(format!("Failed to read {}", dir.display()))?
        .next()
        .is_none();
    if is_empty {
        fs::remove_dir(dir).context(format!("Failed to remove {}", dir.display()))?;
        log::debug!("Removed empty directory {}", dir.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_rename_when_target_missing() {
        let dir = tempdir().unwrap();
        let from = dir.path().join("old");
        let to = dir.path().join("tools/new");
        fs::create_dir_all(&from).unwrap();
        fs::write(from.join("prompt.md"), "p").unwrap();

        let outcome = relocate_or_merge(&from, &to).unwrap();

        assert_eq!(outcome, Relocation::Renamed { to: to.clone() });
        assert!(!from.exists());
        assert_eq!(fs::read_to_string(to.join("prompt.md")).unwrap(), "p");
    }

    #[test]
    fn test_merge_into_existing_target() {
        let dir = tempdir().unwrap();
        let from = dir.path().join("old");
        let to = dir.path().join("new");
        fs::create_dir_all(from.join("nested")).unwrap();
        fs::create_dir_all(&to).unwrap();
        fs::write(from.join("prompt.md"), "source").unwrap();
        fs::write(from.join("extra.md"), "extra").unwrap();
        fs::write(to.join("prompt.md"), "target").unwrap();
        fs::write(to.join("view.md"), "view").unwrap();

        let outcome = relocate_or_merge(&from, &to).unwrap();

        assert_eq!(
            outcome,
            Relocation::Merged {
                to: to.clone(),
                overwritten: vec!["prompt.md".to_string()],
            }
        );
        assert!(!from.exists());
        assert_eq!(fs::read_to_string(to.join("prompt.md")).unwrap(), "source");
        assert_eq!(fs::read_to_string(to.join("extra.md")).unwrap(), "extra");
        assert_eq!(fs::read_to_string(to.join("view.md")).unwrap(), "view");
        assert!(!to.join("nested").exists());
    }

    #[test]
    fn test_rename_into_own_subdirectory() {
        let dir = tempdir().unwrap();
        let from = dir.path().join("coding");
        let to = from.join("refactor");
        fs::create_dir_all(&from).unwrap();
        fs::write(from.join("prompt.md"), "p").unwrap();

        let outcome = relocate_or_merge(&from, &to).unwrap();

        assert_eq!(outcome, Relocation::Renamed { to: to.clone() });
        assert_eq!(fs::read_to_string(to.join("prompt.md")).unwrap(), "p");
        assert!(!from.join("prompt.md").exists());
        assert!(!dir.path().join("coding.relocating").exists());
    }

    #[test]
    fn test_relocate_file_creates_directory() {
        let dir = tempdir().unwrap();
        let from = dir.path().join("prompt.md");
        fs::write(&from, "inbox").unwrap();
        let to = dir.path().join("tools/widget");

        let outcome = relocate_file(&from, &to).unwrap();

        assert!(matches!(outcome, Relocation::Renamed { .. }));
        assert!(!from.exists());
        assert_eq!(fs::read_to_string(to.join("prompt.md")).unwrap(), "inbox");
    }

    #[test]
    fn test_relocate_file_reports_overwrite() {
        let dir = tempdir().unwrap();
        let from = dir.path().join("prompt.md");
        let to = dir.path().join("tools/widget");
        fs::create_dir_all(&to).unwrap();
        fs::write(&from, "new").unwrap();
        fs::write(to.join("prompt.md"), "old").unwrap();

        let outcome = relocate_file(&from, &to).unwrap();

        assert_eq!(
            outcome,
            Relocation::Merged {
                to: to.clone(),
                overwritten: vec!["prompt.md".to_string()],
            }
        );
        assert_eq!(fs::read_to_string(to.join("prompt.md")).unwrap(), "new");
    }

    #[test]
    fn test_prune_only_empty_dirs_inside_root() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("prompts");
        let empty = root.join("old_category");
        let full = root.join("kept");
        fs::create_dir_all(&empty).unwrap();
        fs::create_dir_all(&full).unwrap();
        fs::write(full.join("x"), "x").unwrap();

        prune_empty_dir(&empty, &root).unwrap();
        prune_empty_dir(&full, &root).unwrap();
        prune_empty_dir(&root, &root).unwrap();

        assert!(!empty.exists());
        assert!(full.exists());
        assert!(root.exists());
    }
}
