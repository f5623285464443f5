//! Snippet repository
//!
//! Owns file existence and naming inside the snippet directory. A snippet
//! is either enabled (`<name>.toml`) or disabled (`<name>.toml.disabled`);
//! switching between the two is a single rename. Content is parsed on
//! every load, nothing is cached.

use std::fs;
use std::path::{Path, PathBuf};

use super::errors::{SnippetError, SnippetResult};
use crate::config::{MainConfig, DISABLED_SUFFIX, ENABLED_EXTENSION};
use crate::observability::{log_event_with_fields, warn_event, Event};
use crate::plugin::PluginDescriptor;

/// Result of resolving snippet names to files
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnippetListing {
    /// Existing files, in request order (or sorted, when listing everything)
    pub files: Vec<PathBuf>,
    /// Requested files that do not exist
    pub missing: Vec<PathBuf>,
}

/// Extension of a snippet in the given state
pub fn extension(disabled: bool) -> String {
    if disabled {
        format!("{}{}", ENABLED_EXTENSION, DISABLED_SUFFIX)
    } else {
        ENABLED_EXTENSION.to_string()
    }
}

/// Disabled form of `path`
pub fn disabled_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(DISABLED_SUFFIX);
    PathBuf::from(name)
}

/// Enabled form of `path`; `path` must carry the disabled suffix
pub fn enabled_path(path: &Path) -> SnippetResult<PathBuf> {
    path.to_str()
        .and_then(|p| p.strip_suffix(DISABLED_SUFFIX))
        .map(PathBuf::from)
        .ok_or_else(|| SnippetError::NotDisabled(path.to_path_buf()))
}

/// Parse every file and concatenate the descriptors.
///
/// One malformed file fails the whole load: a broken snippet is an
/// operator mistake and must not be silently skipped.
pub fn load(paths: &[PathBuf]) -> SnippetResult<Vec<PluginDescriptor>> {
    let mut plugins = Vec::new();
    for path in paths {
        let content = fs::read_to_string(path).map_err(|e| SnippetError::io(path, e))?;
        plugins.extend(PluginDescriptor::from_toml(&content, path)?);
    }
    Ok(plugins)
}

/// The snippet directory
#[derive(Debug, Clone)]
pub struct SnippetRepository {
    dir: PathBuf,
}

impl SnippetRepository {
    /// Repository over `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Repository over the directory named by the main configuration
    pub fn from_config(config: &MainConfig) -> Self {
        Self::new(&config.snippets)
    }

    /// The snippet directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of snippet `name` in the given state
    pub fn snippet_path(&self, name: &str, disabled: bool) -> PathBuf {
        self.dir.join(format!("{}{}", name, extension(disabled)))
    }

    /// Resolve snippet names to files ending in `extension`.
    ///
    /// Without names every file in the directory with that extension is
    /// returned, sorted by name.
    pub fn list_files(&self, names: &[String], extension: &str) -> SnippetResult<SnippetListing> {
        let mut listing = SnippetListing::default();

        if names.is_empty() {
            let entries = fs::read_dir(&self.dir).map_err(|e| SnippetError::io(&self.dir, e))?;
            for entry in entries {
                let entry = entry.map_err(|e| SnippetError::io(&self.dir, e))?;
                let is_match = entry
                    .file_name()
                    .to_str()
                    .map(|n| n.ends_with(extension))
                    .unwrap_or(false);
                if is_match && entry.path().is_file() {
                    listing.files.push(entry.path());
                }
            }
            listing.files.sort();
            return Ok(listing);
        }

        for name in names {
            let path = self.dir.join(format!("{}{}", name, extension));
            if path.exists() {
                listing.files.push(path);
            } else {
                warn_event(
                    Event::SnippetMissing,
                    &[("path", &path.display().to_string())],
                );
                listing.missing.push(path);
            }
        }
        Ok(listing)
    }

    /// Enabled snippets
    pub fn enabled(&self, names: &[String]) -> SnippetResult<SnippetListing> {
        self.list_files(names, &extension(false))
    }

    /// Disabled snippets
    pub fn disabled(&self, names: &[String]) -> SnippetResult<SnippetListing> {
        self.list_files(names, &extension(true))
    }

    /// Rename one snippet to its disabled form, returning the new path
    pub fn disable_file(&self, path: &Path) -> SnippetResult<PathBuf> {
        let target = disabled_path(path);
        fs::rename(path, &target).map_err(|e| SnippetError::io(path, e))?;
        log_event_with_fields(
            Event::SnippetDisabled,
            &[("path", &target.display().to_string())],
        );
        Ok(target)
    }

    /// Rename one disabled snippet back, returning the enabled path.
    ///
    /// Refuses to overwrite an existing enabled snippet.
    pub fn enable_file(&self, path: &Path) -> SnippetResult<PathBuf> {
        let target = enabled_path(path)?;
        if target.exists() {
            return Err(SnippetError::AlreadyExists(target));
        }
        fs::rename(path, &target).map_err(|e| SnippetError::io(path, e))?;
        log_event_with_fields(
            Event::SnippetEnabled,
            &[("path", &target.display().to_string())],
        );
        Ok(target)
    }

    /// Disable all `paths`; returns how many were transitioned
    pub fn disable(&self, paths: &[PathBuf]) -> SnippetResult<usize> {
        for path in paths {
            self.disable_file(path)?;
        }
        Ok(paths.len())
    }

    /// Enable all `paths`; returns how many were transitioned
    pub fn enable(&self, paths: &[PathBuf]) -> SnippetResult<usize> {
        for path in paths {
            self.enable_file(path)?;
        }
        Ok(paths.len())
    }

    /// Delete a snippet
    pub fn remove(&self, path: &Path) -> SnippetResult<()> {
        if !path.exists() {
            return Err(SnippetError::NotFound(path.to_path_buf()));
        }
        fs::remove_file(path).map_err(|e| SnippetError::io(path, e))?;
        log_event_with_fields(
            Event::SnippetRemoved,
            &[("path", &path.display().to_string())],
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn repo_with(files: &[(&str, &str)]) -> (TempDir, SnippetRepository) {
        let temp = TempDir::new().unwrap();
        for (name, content) in files {
            fs::write(temp.path().join(name), content).unwrap();
        }
        let repo = SnippetRepository::new(temp.path());
        (temp, repo)
    }

    #[test]
    fn test_list_all_by_extension() {
        let (_temp, repo) = repo_with(&[
            ("b.toml", ""),
            ("a.toml", ""),
            ("c.toml.disabled", ""),
            ("notes.txt", ""),
        ]);

        let enabled = repo.enabled(&[]).unwrap();
        let names: Vec<_> = enabled
            .files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.toml", "b.toml"]);

        let disabled = repo.disabled(&[]).unwrap();
        assert_eq!(disabled.files, vec![repo.dir().join("c.toml.disabled")]);
    }

    #[test]
    fn test_list_named_skips_missing() {
        let (_temp, repo) = repo_with(&[("a.toml", "")]);

        let listing = repo
            .enabled(&["missing".to_string(), "a".to_string()])
            .unwrap();
        assert_eq!(listing.files, vec![repo.dir().join("a.toml")]);
        assert_eq!(listing.missing, vec![repo.dir().join("missing.toml")]);
    }

    #[test]
    fn test_enable_disable_round_trip() {
        let content = "[[promoter]]\nid = \"web\"\n# keep me\n";
        let (_temp, repo) = repo_with(&[("web.toml", content)]);
        let original = repo.dir().join("web.toml");

        let disabled = repo.disable_file(&original).unwrap();
        assert_eq!(disabled, repo.dir().join("web.toml.disabled"));
        assert!(!original.exists());

        let enabled = repo.enable_file(&disabled).unwrap();
        assert_eq!(enabled, original);
        assert_eq!(fs::read_to_string(&original).unwrap(), content);
    }

    #[test]
    fn test_enable_requires_suffix() {
        let (_temp, repo) = repo_with(&[("web.toml", "")]);
        let err = repo.enable_file(&repo.dir().join("web.toml")).unwrap_err();
        assert!(matches!(err, SnippetError::NotDisabled(_)));
    }

    #[test]
    fn test_enable_refuses_overwrite() {
        let (_temp, repo) = repo_with(&[("web.toml", "new"), ("web.toml.disabled", "old")]);
        let err = repo
            .enable_file(&repo.dir().join("web.toml.disabled"))
            .unwrap_err();
        assert!(matches!(err, SnippetError::AlreadyExists(_)));
        assert_eq!(fs::read_to_string(repo.dir().join("web.toml")).unwrap(), "new");
    }

    #[test]
    fn test_counts() {
        let (_temp, repo) = repo_with(&[("a.toml", ""), ("b.toml", "")]);
        let files = repo.enabled(&[]).unwrap().files;
        assert_eq!(repo.disable(&files).unwrap(), 2);
        let files = repo.disabled(&[]).unwrap().files;
        assert_eq!(repo.enable(&files).unwrap(), 2);
        assert_eq!(repo.enabled(&[]).unwrap().files.len(), 2);
    }

    #[test]
    fn test_load_concatenates() {
        let (_temp, repo) = repo_with(&[
            ("a.toml", "[[promoter]]\nid = \"a\"\n[[umh]]\nid = \"u\"\n"),
            ("b.toml", "[[debugger]]\nid = \"b\"\n"),
        ]);
        let files = repo.enabled(&[]).unwrap().files;
        let plugins = load(&files).unwrap();
        let ids: Vec<_> = plugins.iter().map(|p| p.id()).collect();
        assert_eq!(ids, vec!["a", "u", "b"]);
        assert_eq!(plugins[2].source_file(), repo.dir().join("b.toml"));
    }

    #[test]
    fn test_load_fails_fast() {
        let (_temp, repo) = repo_with(&[
            ("a.toml", "[[debugger]]\n"),
            ("b.toml", "[[promoter]\n"),
        ]);
        let files = repo.enabled(&[]).unwrap().files;
        assert!(matches!(load(&files), Err(SnippetError::Plugin(_))));
    }

    #[test]
    fn test_remove() {
        let (_temp, repo) = repo_with(&[("a.toml", "")]);
        let path = repo.dir().join("a.toml");
        repo.remove(&path).unwrap();
        assert!(!path.exists());
        assert!(matches!(repo.remove(&path), Err(SnippetError::NotFound(_))));
    }
}
