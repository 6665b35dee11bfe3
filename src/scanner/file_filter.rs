use crate::config::{CollectorConfig, CombinerConfig};
use crate::error::Result;
use regex::Regex;
use serde::{Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;
use std::path::{Component, Path};

/// Directory names that prune a walk, compared case-insensitively.
#[derive(Debug, Clone)]
pub struct ExcludedDirectorySet {
    names: HashSet<String>,
}

impl ExcludedDirectorySet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: names
                .into_iter()
                .map(|n| n.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn from_config(config: &CollectorConfig) -> Self {
        Self::new(&config.exclude_dirs)
    }

    pub fn is_excluded(&self, dir_name: &str) -> bool {
        self.names.contains(&dir_name.to_lowercase())
    }

    /// True when any directory component of `relative_path` (the file name
    /// itself is not considered) is an excluded name.
    pub fn has_excluded_ancestor(&self, relative_path: &Path) -> bool {
        let Some(parent) = relative_path.parent() else {
            return false;
        };

        parent.components().any(|component| match component {
            Component::Normal(name) => self.is_excluded(&name.to_string_lossy()),
            _ => false,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotFound,
    BinaryOrExcluded,
}

impl Serialize for SkipReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotFound => write!(f, "not found"),
            SkipReason::BinaryOrExcluded => write!(f, "binary/excluded"),
        }
    }
}

/// Decides which manifest files are text worth combining.
pub struct FileFilter {
    text_extensions: Vec<String>,
    text_filenames: Vec<String>,
    skip_files: Vec<String>,
    skip_patterns: Vec<Regex>,
}

impl FileFilter {
    pub fn new(config: &CombinerConfig) -> Result<Self> {
        let skip_patterns = config
            .skip_patterns
            .iter()
            .map(|pattern| Regex::new(pattern))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            text_extensions: config
                .text_extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect(),
            text_filenames: config.text_filenames.clone(),
            skip_files: config.skip_files.clone(),
            skip_patterns,
        })
    }

    pub fn is_text_file(&self, path: &Path) -> bool {
        if let Some(extension) = path.extension().and_then(|s| s.to_str()) {
            if self.text_extensions.contains(&extension.to_lowercase()) {
                return true;
            }
        }

        // Extensionless config files are matched by exact name
        path.file_name()
            .and_then(|s| s.to_str())
            .is_some_and(|name| self.text_filenames.iter().any(|n| n == name))
    }

    pub fn is_denied(&self, path: &Path) -> bool {
        let Some(filename) = path.file_name().and_then(|s| s.to_str()) else {
            return false;
        };

        self.skip_files.iter().any(|n| n == filename) || self.matches_any_pattern(filename)
    }

    pub fn should_include(&self, path: &Path) -> bool {
        self.is_text_file(path) && !self.is_denied(path)
    }

    /// Skip reason for a manifest entry, or `None` when it should be combined.
    pub fn skip_reason(&self, path: &Path) -> Option<SkipReason> {
        if !path.exists() {
            Some(SkipReason::NotFound)
        } else if !self.should_include(path) {
            Some(SkipReason::BinaryOrExcluded)
        } else {
            None
        }
    }

    pub fn matches_any_pattern(&self, text: &str) -> bool {
        self.skip_patterns
            .iter()
            .any(|pattern| pattern.is_match(text))
    }
}
