use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetaUtilsError {
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Path validation failed: {path}")]
    InvalidPath { path: String },

    #[error("Permission denied: {path}")]
    Permission { path: String },

    #[error("Error collecting files: {message}")]
    Scan { message: String },

    #[error("Serialization failed: {message}")]
    Serialization { message: String },
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for MetaUtilsError {
    fn user_message(&self) -> String {
        match self {
            MetaUtilsError::Io(e) => format!("File operation failed: {}", e),
            MetaUtilsError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            MetaUtilsError::InvalidPath { path } => {
                format!("Invalid directory: {}", path)
            }
            MetaUtilsError::Permission { path } => {
                format!("Permission denied accessing: {}", path)
            }
            MetaUtilsError::Scan { message } => {
                format!("Error collecting files: {}", message)
            }
            MetaUtilsError::Serialization { message } => {
                format!("Could not serialize output: {}", message)
            }
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            MetaUtilsError::Config { .. } => Some(
                "Check your configuration file syntax, or regenerate one with `meta-utils init-config`.".to_string()
            ),
            MetaUtilsError::InvalidPath { .. } => Some(
                "Point --base-dir (or project.base_directory in the config file) at the project root.".to_string()
            ),
            MetaUtilsError::Permission { .. } => Some(
                "Ensure you have the necessary read/write permissions for the target directory.".to_string()
            ),
            MetaUtilsError::Scan { .. } => Some(
                "No reports were written. Fix the underlying problem and run the collection again.".to_string()
            ),
            MetaUtilsError::Io(_) => Some(
                "Check that the output location exists and is writable.".to_string()
            ),
            MetaUtilsError::Serialization { .. } => None,
        }
    }
}

impl MetaUtilsError {
    /// Process exit code reported by the binary for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            MetaUtilsError::Config { .. } => 2,
            MetaUtilsError::InvalidPath { .. } => 3,
            MetaUtilsError::Scan { .. } => 4,
            MetaUtilsError::Io(_) | MetaUtilsError::Permission { .. } => 5,
            MetaUtilsError::Serialization { .. } => 1,
        }
    }
}

impl From<toml::de::Error> for MetaUtilsError {
    fn from(error: toml::de::Error) -> Self {
        MetaUtilsError::Config {
            message: error.to_string(),
        }
    }
}

impl From<regex::Error> for MetaUtilsError {
    fn from(error: regex::Error) -> Self {
        MetaUtilsError::Config {
            message: format!("Invalid pattern: {}", error),
        }
    }
}

impl From<serde_json::Error> for MetaUtilsError {
    fn from(error: serde_json::Error) -> Self {
        MetaUtilsError::Serialization {
            message: error.to_string(),
        }
    }
}

impl From<walkdir::Error> for MetaUtilsError {
    fn from(error: walkdir::Error) -> Self {
        let path = error
            .path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "unknown path".to_string());

        let is_permission = error
            .io_error()
            .is_some_and(|e| e.kind() == std::io::ErrorKind::PermissionDenied);

        if is_permission {
            MetaUtilsError::Permission { path }
        } else {
            MetaUtilsError::Scan {
                message: format!("{} ({})", error, path),
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, MetaUtilsError>;

pub(crate) fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_friendly_messages() {
        let error = MetaUtilsError::InvalidPath {
            path: "/nowhere".to_string(),
        };
        assert!(error.user_message().contains("Invalid directory"));
        assert!(error.suggestion().is_some());
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(1024), "1.0 KB");
        assert_eq!(format_bytes(1048576), "1.0 MB");
        assert_eq!(format_bytes(500), "500 B");
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(MetaUtilsError::Config { message: String::new() }.exit_code(), 2);
        assert_eq!(MetaUtilsError::InvalidPath { path: String::new() }.exit_code(), 3);
        assert_eq!(MetaUtilsError::Scan { message: String::new() }.exit_code(), 4);
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        let error = MetaUtilsError::from(io);
        assert!(matches!(error, MetaUtilsError::Io(_)));
        assert_eq!(error.exit_code(), 5);
    }
}
