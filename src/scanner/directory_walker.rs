use crate::config::CollectorConfig;
use crate::error::{format_bytes, MetaUtilsError, Result};
use crate::scanner::file_filter::ExcludedDirectorySet;
use chrono::{DateTime, Local, NaiveDateTime};
use log::{debug, warn};
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fs::{self, Metadata};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

pub const ROOT_GROUP: &str = "root";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Metadata for one discovered file.
#[derive(Debug, Clone, Serialize)]
pub struct FileRecord {
    pub name: String,
    pub full_path: PathBuf,
    pub relative_path: String,
    #[serde(rename = "directory")]
    pub directory_group: String,
    #[serde(rename = "size")]
    pub size_bytes: u64,
    pub extension: String,
    #[serde(rename = "modified", serialize_with = "serialize_timestamp")]
    pub modified: NaiveDateTime,
}

impl FileRecord {
    pub fn new(
        full_path: PathBuf,
        relative_path: &Path,
        directory_group: &str,
        size_bytes: u64,
        modified: SystemTime,
    ) -> Self {
        let name = full_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        // Keeps the dot and the original case, e.g. ".tsx"
        let extension = full_path
            .extension()
            .filter(|e| !e.is_empty())
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();

        Self {
            name,
            full_path,
            relative_path: relative_path.display().to_string(),
            directory_group: directory_group.to_string(),
            size_bytes,
            extension,
            modified: local_timestamp(modified),
        }
    }

    fn from_metadata(path: &Path, base: &Path, group: &str, metadata: &Metadata) -> Result<Self> {
        let relative = path
            .strip_prefix(base)
            .map_err(|_| MetaUtilsError::InvalidPath {
                path: format!(
                    "Cannot calculate relative path for {} from base {}",
                    path.display(),
                    base.display()
                ),
            })?;

        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);

        Ok(Self::new(
            path.to_path_buf(),
            relative,
            group,
            metadata.len(),
            modified,
        ))
    }

    pub fn modified_iso(&self) -> String {
        format_timestamp(&self.modified)
    }
}

pub fn local_timestamp(time: SystemTime) -> NaiveDateTime {
    DateTime::<Local>::from(time).naive_local()
}

pub fn format_timestamp(timestamp: &NaiveDateTime) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

fn serialize_timestamp<S: Serializer>(
    timestamp: &NaiveDateTime,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_timestamp(timestamp))
}

/// Records plus the non-fatal notices raised while walking.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub records: Vec<FileRecord>,
    pub warnings: Vec<String>,
}

pub struct DirectoryWalker {
    target_dirs: Vec<String>,
    excluded: ExcludedDirectorySet,
}

impl DirectoryWalker {
    pub fn new(config: &CollectorConfig) -> Self {
        Self {
            target_dirs: config.target_dirs.clone(),
            excluded: ExcludedDirectorySet::from_config(config),
        }
    }

    /// Collects root-level files plus the recursive contents of every target
    /// directory. Permission problems become warnings; any other failure
    /// discards everything collected so far.
    pub fn collect<P: AsRef<Path>>(&self, base: P) -> Result<ScanOutcome> {
        let base = base.as_ref();

        if !base.exists() {
            return Err(MetaUtilsError::InvalidPath {
                path: format!("Directory '{}' does not exist", base.display()),
            });
        }

        if !base.is_dir() {
            return Err(MetaUtilsError::InvalidPath {
                path: format!("'{}' is not a directory", base.display()),
            });
        }

        let mut outcome = ScanOutcome::default();

        debug!("Scanning root directory: {}", base.display());
        self.collect_root(base, &mut outcome)?;

        for target in &self.target_dirs {
            let target_path = base.join(target);

            if target_path.is_dir() {
                debug!("Scanning directory: {}", target_path.display());
                self.collect_target(base, &target_path, target, &mut outcome)?;
            } else {
                let notice = format!(
                    "Target directory '{}' not found in {}",
                    target,
                    base.display()
                );
                warn!("{}", notice);
                outcome.warnings.push(notice);
            }
        }

        debug!("Collected {} files", outcome.records.len());
        Ok(outcome)
    }

    fn collect_root(&self, base: &Path, outcome: &mut ScanOutcome) -> Result<()> {
        let entries = match fs::read_dir(base) {
            Ok(entries) => entries,
            Err(e) => return tolerate_permission(e.into(), base, outcome),
        };

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tolerate_permission(e.into(), base, outcome)?;
                    continue;
                }
            };

            let path = entry.path();
            let Some(metadata) = regular_file_metadata(&path, outcome) else {
                continue;
            };

            if metadata.is_file() {
                outcome
                    .records
                    .push(FileRecord::from_metadata(&path, base, ROOT_GROUP, &metadata)?);
            }
        }

        Ok(())
    }

    fn collect_target(
        &self,
        base: &Path,
        target_path: &Path,
        group: &str,
        outcome: &mut ScanOutcome,
    ) -> Result<()> {
        let walker = WalkDir::new(target_path)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| {
                e.depth() == 0
                    || !e.file_type().is_dir()
                    || !self.excluded.is_excluded(&e.file_name().to_string_lossy())
            });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err.path().unwrap_or(target_path).to_path_buf();
                    tolerate_permission(err.into(), &path, outcome)?;
                    continue;
                }
            };

            // Linked files count; linked directories are never descended
            if !entry.file_type().is_file() && !entry.path_is_symlink() {
                continue;
            }

            let path = entry.path();
            let relative = path.strip_prefix(base).unwrap_or(path);
            if self.excluded.has_excluded_ancestor(relative) {
                continue;
            }

            let metadata = match regular_file_metadata(path, outcome) {
                Some(metadata) if metadata.is_file() => metadata,
                _ => continue,
            };

            outcome
                .records
                .push(FileRecord::from_metadata(path, base, group, &metadata)?);
        }

        Ok(())
    }

    pub fn get_statistics(&self, records: &[FileRecord]) -> ScanStatistics {
        ScanStatistics::from_records(records, &group_order(&self.target_dirs))
    }
}

fn group_order(target_dirs: &[String]) -> Vec<String> {
    std::iter::once(ROOT_GROUP.to_string())
        .chain(target_dirs.iter().cloned())
        .collect()
}

fn tolerate_permission(error: MetaUtilsError, path: &Path, outcome: &mut ScanOutcome) -> Result<()> {
    let denied = match &error {
        MetaUtilsError::Permission { .. } => true,
        MetaUtilsError::Io(e) => e.kind() == io::ErrorKind::PermissionDenied,
        _ => false,
    };

    if denied {
        let notice = format!("Permission denied accessing {}", path.display());
        warn!("{}", notice);
        outcome.warnings.push(notice);
        return Ok(());
    }

    match error {
        MetaUtilsError::Scan { .. } => Err(error),
        other => Err(MetaUtilsError::Scan {
            message: format!("{} ({})", other, path.display()),
        }),
    }
}

/// Metadata following symlinks. Dangling links and loops are not regular
/// files and are skipped; only permission problems are reported.
fn regular_file_metadata(path: &Path, outcome: &mut ScanOutcome) -> Option<Metadata> {
    match fs::metadata(path) {
        Ok(metadata) => Some(metadata),
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            let notice = format!("Permission denied accessing {}", path.display());
            warn!("{}", notice);
            outcome.warnings.push(notice);
            None
        }
        Err(e) => {
            debug!("Skipping {}: {}", path.display(), e);
            None
        }
    }
}

/// Records sorted by group (in `group_order`) then case-insensitive relative
/// path. Groups missing from `group_order` sort last, alphabetically.
pub fn sorted_records<'a>(records: &'a [FileRecord], group_order: &[String]) -> Vec<&'a FileRecord> {
    let rank = |group: &str| {
        group_order
            .iter()
            .position(|g| g == group)
            .unwrap_or(group_order.len())
    };

    let mut sorted: Vec<&FileRecord> = records.iter().collect();
    sorted.sort_by(|a, b| {
        rank(&a.directory_group)
            .cmp(&rank(&b.directory_group))
            .then_with(|| a.directory_group.cmp(&b.directory_group))
            .then_with(|| {
                a.relative_path
                    .to_lowercase()
                    .cmp(&b.relative_path.to_lowercase())
            })
    });
    sorted
}

#[derive(Debug, Default)]
pub struct ScanStatistics {
    pub total_files: usize,
    pub total_size: u64,
    /// In report group order, empty groups omitted.
    pub files_by_group: Vec<(String, usize)>,
    /// Count-descending, ties alphabetical.
    pub files_by_extension: Vec<(String, usize)>,
}

impl ScanStatistics {
    pub fn from_records(records: &[FileRecord], group_order: &[String]) -> Self {
        let mut by_group: HashMap<&str, usize> = HashMap::new();
        let mut by_extension: HashMap<String, usize> = HashMap::new();

        for record in records {
            *by_group.entry(record.directory_group.as_str()).or_insert(0) += 1;

            let ext = if record.extension.is_empty() {
                "No extension".to_string()
            } else {
                record.extension.to_lowercase()
            };
            *by_extension.entry(ext).or_insert(0) += 1;
        }

        let files_by_group = group_order
            .iter()
            .filter_map(|g| by_group.get(g.as_str()).map(|count| (g.clone(), *count)))
            .collect();

        let mut files_by_extension: Vec<(String, usize)> = by_extension.into_iter().collect();
        files_by_extension.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        Self {
            total_files: records.len(),
            total_size: records.iter().map(|r| r.size_bytes).sum(),
            files_by_group,
            files_by_extension,
        }
    }

    pub fn total_size_mb(&self) -> f64 {
        self.total_size as f64 / (1024.0 * 1024.0)
    }

    pub fn display_summary(&self) -> String {
        let mut summary = format!(
            "Scan Results:\n  Total files: {}\n  Total size: {}\n",
            self.total_files,
            format_bytes(self.total_size)
        );

        for (group, count) in &self.files_by_group {
            summary.push_str(&format!("    {}: {} files\n", group, count));
        }

        summary
    }
}
