use crate::combiner::content_reader::TextEncoding;
use crate::combiner::manifest::{FileManifest, ManifestGroup};
use crate::error::{MetaUtilsError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATHS: &[&str] = &["meta-utils.toml", ".meta-utils.toml"];

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub project: ProjectConfig,
    pub collector: CollectorConfig,
    pub combiner: CombinerConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub name: String,
    pub base_directory: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CollectorConfig {
    pub target_dirs: Vec<String>,
    pub exclude_dirs: Vec<String>,
    pub output_directory: PathBuf,
    pub file_prefix: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CombinerConfig {
    pub text_extensions: Vec<String>,
    pub text_filenames: Vec<String>,
    pub skip_files: Vec<String>,
    pub skip_patterns: Vec<String>,
    pub encodings: Vec<String>,
    pub output_prefix: String,
    pub groups: Vec<ManifestGroup>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "mhfa-registration".to_string(),
            base_directory: PathBuf::from("."),
        }
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            target_dirs: vec![
                "app".to_string(),
                "components".to_string(),
                "lib".to_string(),
            ],
            exclude_dirs: vec![
                ".next".to_string(),
                "node_modules".to_string(),
                ".git".to_string(),
                "__pycache__".to_string(),
                ".vscode".to_string(),
                "dist".to_string(),
                "build".to_string(),
            ],
            output_directory: PathBuf::from("file_lists"),
            file_prefix: "mhfa_project_files".to_string(),
        }
    }
}

impl Default for CombinerConfig {
    fn default() -> Self {
        let text_extensions = [
            "ts", "tsx", "js", "jsx", "json", "md", "txt", "css", "scss", "html", "htm", "xml",
            "yml", "yaml", "toml", "ini", "conf", "config", "gitignore", "env", "mjs", "local",
        ];

        Self {
            text_extensions: text_extensions.iter().map(|s| s.to_string()).collect(),
            text_filenames: vec![
                ".gitignore".to_string(),
                ".env.local".to_string(),
                "Dockerfile".to_string(),
                "README".to_string(),
            ],
            skip_files: vec![
                "package-lock.json".to_string(), // lockfile, not source
                "Current.png".to_string(),
                "favicon.ico".to_string(),
            ],
            skip_patterns: vec![r".*\.min\.(js|css)$".to_string()],
            encodings: vec![
                "utf-8".to_string(),
                "utf-8-sig".to_string(),
                "latin-1".to_string(),
                "cp1252".to_string(),
            ],
            output_prefix: "mhfa_project_combined".to_string(),
            groups: FileManifest::default().groups,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(MetaUtilsError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| MetaUtilsError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| MetaUtilsError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                for default_path in DEFAULT_CONFIG_PATHS {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref base_directory) = cli_args.base_directory {
            self.project.base_directory = base_directory.clone();
        }

        if let Some(ref output_dir) = cli_args.output_dir {
            self.collector.output_directory = output_dir.clone();
        }

        if let Some(ref exclude) = cli_args.exclude {
            for dir in exclude {
                let dir = dir.trim();
                if !dir.is_empty()
                    && !self
                        .collector
                        .exclude_dirs
                        .iter()
                        .any(|d| d.eq_ignore_ascii_case(dir))
                {
                    self.collector.exclude_dirs.push(dir.to_string());
                }
            }
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| MetaUtilsError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        std::fs::write(path, content).map_err(|e| MetaUtilsError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.collector.target_dirs.is_empty() {
            return Err(MetaUtilsError::Config {
                message: "At least one target directory must be specified".to_string(),
            });
        }

        if let Some(bad) = self
            .collector
            .target_dirs
            .iter()
            .find(|d| d.trim().is_empty() || d.eq_ignore_ascii_case("root"))
        {
            return Err(MetaUtilsError::Config {
                message: format!("Invalid target directory name: '{}'", bad),
            });
        }

        if self.collector.file_prefix.trim().is_empty()
            || self.combiner.output_prefix.trim().is_empty()
        {
            return Err(MetaUtilsError::Config {
                message: "Output file prefixes must not be empty".to_string(),
            });
        }

        if self.combiner.encodings.is_empty() {
            return Err(MetaUtilsError::Config {
                message: "At least one text encoding must be specified".to_string(),
            });
        }

        for label in &self.combiner.encodings {
            TextEncoding::from_label(label)?;
        }

        for pattern in &self.combiner.skip_patterns {
            Regex::new(pattern)?;
        }

        if let Some(group) = self.combiner.groups.iter().find(|g| g.name.trim().is_empty()) {
            return Err(MetaUtilsError::Config {
                message: format!(
                    "Manifest group with {} files has an empty name",
                    group.files.len()
                ),
            });
        }

        Ok(())
    }

    /// Group names in report order: `root` first, then each target directory.
    pub fn group_order(&self) -> Vec<String> {
        std::iter::once("root".to_string())
            .chain(self.collector.target_dirs.iter().cloned())
            .collect()
    }

    pub fn manifest(&self) -> FileManifest {
        FileManifest::new(self.combiner.groups.clone())
    }

    pub fn create_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub base_directory: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub exclude: Option<Vec<String>>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_directory(mut self, base_directory: Option<PathBuf>) -> Self {
        self.base_directory = base_directory;
        self
    }

    pub fn with_output_dir(mut self, output_dir: Option<PathBuf>) -> Self {
        self.output_dir = output_dir;
        self
    }

    pub fn with_exclude(mut self, exclude: Option<Vec<String>>) -> Self {
        self.exclude = exclude;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.collector.target_dirs, vec!["app", "components", "lib"]);
        assert_eq!(config.collector.exclude_dirs.len(), 7);
        assert!(config.combiner.text_extensions.contains(&"tsx".to_string()));
        assert_eq!(config.combiner.groups.len(), 4);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.collector.target_dirs.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_unknown_encoding() {
        let mut config = Config::default();
        config.combiner.encodings = vec!["klingon-8".to_string()];
        assert!(matches!(
            config.validate(),
            Err(MetaUtilsError::Config { .. })
        ));
    }

    #[test]
    fn test_validation_rejects_bad_pattern() {
        let mut config = Config::default();
        config.combiner.skip_patterns = vec!["(unclosed".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_file_operations() {
        let config = Config::default();
        let temp_file = NamedTempFile::new().unwrap();

        config.save_to_file(temp_file.path()).unwrap();

        let loaded_config = Config::load_from_file(temp_file.path()).unwrap();
        assert_eq!(config.project.name, loaded_config.project.name);
        assert_eq!(
            config.combiner.groups.len(),
            loaded_config.combiner.groups.len()
        );
        assert_eq!(
            config.combiner.groups[3].files,
            loaded_config.combiner.groups[3].files
        );
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [project]
            name = "demo"

            [collector]
            target_dirs = ["src"]
            "#,
        )
        .unwrap();

        assert_eq!(config.project.name, "demo");
        assert_eq!(config.project.base_directory, PathBuf::from("."));
        assert_eq!(config.collector.target_dirs, vec!["src"]);
        assert_eq!(config.collector.exclude_dirs.len(), 7);
        assert_eq!(config.combiner.output_prefix, "mhfa_project_combined");
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = Config::default();

        let overrides = CliOverrides::new()
            .with_base_directory(Some(PathBuf::from("/srv/site")))
            .with_exclude(Some(vec!["coverage".to_string(), "BUILD".to_string()]));

        config.merge_with_cli_args(&overrides);

        assert_eq!(config.project.base_directory, PathBuf::from("/srv/site"));
        assert!(config.collector.exclude_dirs.contains(&"coverage".to_string()));
        // "build" already present, case-insensitively
        assert_eq!(config.collector.exclude_dirs.len(), 8);
    }

    #[test]
    fn test_group_order() {
        let config = Config::default();
        assert_eq!(config.group_order(), vec!["root", "app", "components", "lib"]);
    }

    #[test]
    fn test_sample_config_generation() {
        let sample = Config::create_sample_config();
        assert!(!sample.is_empty());
        assert!(sample.contains("[project]"));
        assert!(sample.contains("[collector]"));
        assert!(sample.contains("[[combiner.groups]]"));
    }
}
