//! Template and rule loading from disk.
//!
//! The core library never touches the filesystem; this module turns a
//! directory of RON template sets and a `rules.ron` file into a
//! [`TemplateLibrary`] and a [`RuleSet`].

use std::fs;
use std::path::{Path, PathBuf};

use arena_core::config::RuleSet;
use arena_core::data::{parse_template_set, TemplateLibrary};
use arena_core::error::CombatError;
use thiserror::Error;

/// Errors that can occur while loading data files.
#[derive(Error, Debug)]
pub enum TemplateLoadError {
    /// Failed to read a file or directory.
    #[error("IO error reading '{path}': {message}")]
    Io {
        /// Offending path.
        path: String,
        /// Underlying error.
        message: String,
    },
    /// Directory does not exist.
    #[error("Directory not found: {0}")]
    DirectoryNotFound(String),
    /// A file of a directory load was rejected.
    #[error("Failed to load '{path}': {message}")]
    FileFailed {
        /// Offending file.
        path: String,
        /// What went wrong.
        message: String,
    },
    /// Template or rule data was rejected by the engine.
    #[error(transparent)]
    Invalid(#[from] CombatError),
}

/// A file that failed to load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    /// Offending file.
    pub path: PathBuf,
    /// What went wrong.
    pub message: String,
}

/// Result of loading a template directory.
#[derive(Debug, Default)]
pub struct LoadSummary {
    /// Every template that loaded.
    pub library: TemplateLibrary,
    /// Files that loaded, in load order.
    pub loaded: Vec<PathBuf>,
    /// Files that were skipped because they failed to parse or validate.
    pub failed: Vec<FileFailure>,
}

impl LoadSummary {
    /// Whether every file loaded and all skill references resolve.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.library.check_references().is_ok()
    }

    /// Fail on the first problem instead of skipping it.
    ///
    /// # Errors
    ///
    /// Returns the first file failure, or the first dangling skill reference.
    pub fn into_strict(self) -> Result<TemplateLibrary, TemplateLoadError> {
        if let Some(failure) = self.failed.into_iter().next() {
            return Err(TemplateLoadError::FileFailed {
                path: failure.path.display().to_string(),
                message: failure.message,
            });
        }
        self.library.check_references()?;
        Ok(self.library)
    }
}

fn io_error(path: &Path, e: &std::io::Error) -> TemplateLoadError {
    TemplateLoadError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

/// Load one RON template set into `library`.
///
/// # Errors
///
/// Returns an IO error, or the engine's parse/validation error.
pub fn load_file(library: &mut TemplateLibrary, path: &Path) -> Result<(), TemplateLoadError> {
    let content = fs::read_to_string(path).map_err(|e| io_error(path, &e))?;
    let set = parse_template_set(&path.display().to_string(), &content)?;
    library.extend(set)?;
    Ok(())
}

/// Load every `.ron` file of a directory, in file-name order.
///
/// Files that fail are logged and recorded in [`LoadSummary::failed`];
/// other files are skipped.
///
/// # Errors
///
/// Returns an error only if the directory itself cannot be read.
pub fn load_directory(dir: &Path) -> Result<LoadSummary, TemplateLoadError> {
    if !dir.is_dir() {
        return Err(TemplateLoadError::DirectoryNotFound(
            dir.display().to_string(),
        ));
    }

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| io_error(dir, &e))? {
        let entry = entry.map_err(|e| io_error(dir, &e))?;
        let path = entry.path();
        if path.extension().is_some_and(|e| e == "ron") {
            paths.push(path);
        } else {
            tracing::warn!(path = %path.display(), "Skipping non-template file");
        }
    }
    paths.sort();

    let mut summary = LoadSummary::default();
    for path in paths {
        match load_file(&mut summary.library, &path) {
            Ok(()) => summary.loaded.push(path),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to load templates");
                summary.failed.push(FileFailure {
                    path,
                    message: e.to_string(),
                });
            }
        }
    }

    tracing::info!(
        files = summary.loaded.len(),
        skills = summary.library.skill_count(),
        combatants = summary.library.combatant_count(),
        "Templates loaded"
    );
    Ok(summary)
}

/// Load a template directory, failing on any bad file or dangling reference.
///
/// # Errors
///
/// See [`load_directory`] and [`LoadSummary::into_strict`].
pub fn load_templates(dir: &Path) -> Result<TemplateLibrary, TemplateLoadError> {
    load_directory(dir)?.into_strict()
}

/// Load a flat rule-constant map from a RON file.
///
/// # Errors
///
/// Returns an IO error or the engine's configuration error.
pub fn load_rules(path: &Path) -> Result<RuleSet, TemplateLoadError> {
    let content = fs::read_to_string(path).map_err(|e| io_error(path, &e))?;
    Ok(RuleSet::from_ron_str(&path.display().to_string(), &content)?)
}

/// Resolve the default data directory.
///
/// Looks in standard locations:
/// 1. Environment variable `ARENA_DATA_DIR`
/// 2. `./assets/data/` (repo root)
/// 3. `../../assets/data/` (running from a crate directory)
pub fn default_data_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("ARENA_DATA_DIR") {
        let path = PathBuf::from(dir);
        if path.exists() {
            return Some(path);
        }
    }

    ["assets/data", "../../assets/data"]
        .iter()
        .map(PathBuf::from)
        .find(|path| path.exists())
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_core::data::TemplateProvider;
    use arena_test_utils::fixtures::{HEROES_RON, MONSTERS_RON, RULES_RON, SKILLS_RON};

    fn write(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn test_load_shipped_files() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "skills.ron", SKILLS_RON);
        write(dir.path(), "heroes.ron", HEROES_RON);
        write(dir.path(), "monsters.ron", MONSTERS_RON);
        write(dir.path(), "README.txt", "not a template");

        let summary = load_directory(dir.path()).unwrap();
        assert!(summary.is_clean());
        assert_eq!(summary.loaded.len(), 3);
        let library = summary.into_strict().unwrap();
        assert!(library.combatant("kleriker").is_ok());
    }

    #[test]
    fn test_bad_file_is_recorded_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "skills.ron", SKILLS_RON);
        write(dir.path(), "broken.ron", "( skills: [ (id: ");

        let summary = load_directory(dir.path()).unwrap();
        assert_eq!(summary.loaded.len(), 1);
        assert_eq!(summary.failed.len(), 1);
        assert!(summary.failed[0].path.ends_with("broken.ron"));
        assert!(load_templates(dir.path()).is_err());
    }

    #[test]
    fn test_dangling_reference_fails_strict_load() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "heroes.ron", HEROES_RON);

        let summary = load_directory(dir.path()).unwrap();
        assert!(summary.failed.is_empty());
        assert!(!summary.is_clean());
        assert!(matches!(
            summary.into_strict(),
            Err(TemplateLoadError::Invalid(CombatError::InvalidTemplate { .. }))
        ));
    }

    #[test]
    fn test_missing_directory() {
        let err = load_directory(Path::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, TemplateLoadError::DirectoryNotFound(_)));
    }

    #[test]
    fn test_load_rules_file() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "rules.ron", RULES_RON);
        let rules = load_rules(&dir.path().join("rules.ron")).unwrap();
        assert_eq!(rules, RuleSet::standard());
    }

    #[test]
    fn test_rules_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "rules.ron", r#"{ "min_damage": 1.0 }"#);
        let err = load_rules(&dir.path().join("rules.ron")).unwrap_err();
        assert!(matches!(
            err,
            TemplateLoadError::Invalid(CombatError::MissingConfigKey(_))
        ));
    }
}
