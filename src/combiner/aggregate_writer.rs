use crate::combiner::content_reader::ContentReader;
use crate::combiner::manifest::FileManifest;
use crate::config::Config;
use crate::error::{MetaUtilsError, Result};
use crate::scanner::directory_walker::{format_timestamp, local_timestamp};
use crate::scanner::file_filter::{FileFilter, SkipReason};
use chrono::Local;
use log::{debug, info};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

const HEADER_RULE: usize = 70;
const FILE_RULE: usize = 60;
const GROUP_RULE: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub path: String,
    pub reason: SkipReason,
}

impl fmt::Display for SkippedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.path, self.reason)
    }
}

/// Counts gathered while writing the combined document.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CombineTally {
    pub total_files: usize,
    pub included_files: usize,
    pub skipped: Vec<SkippedFile>,
    pub files_by_group: Vec<(String, usize)>,
}

impl CombineTally {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CombineSummary {
    pub output_path: PathBuf,
    pub output_size: u64,
    #[serde(flatten)]
    pub tally: CombineTally,
}

#[derive(Debug, Clone)]
pub struct CombineProgress {
    pub processed: usize,
    pub total: usize,
    pub current_file: Option<String>,
}

pub struct AggregateWriter {
    base_directory: PathBuf,
    project_name: String,
    filter: FileFilter,
    reader: ContentReader,
}

impl AggregateWriter {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            base_directory: config.project.base_directory.clone(),
            project_name: config.project.name.clone(),
            filter: FileFilter::new(&config.combiner)?,
            reader: ContentReader::from_labels(&config.combiner.encodings)?,
        })
    }

    pub fn with_base_directory<P: Into<PathBuf>>(mut self, base_directory: P) -> Self {
        self.base_directory = base_directory.into();
        self
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    pub fn filter(&self) -> &FileFilter {
        &self.filter
    }

    /// Writes the combined document to `output_path`. Nothing is created when
    /// the base directory is missing.
    pub fn combine_to_file(
        &self,
        manifest: &FileManifest,
        output_path: &Path,
        progress_callback: Option<&dyn Fn(&CombineProgress)>,
    ) -> Result<CombineSummary> {
        self.ensure_base_directory()?;

        let file = fs::File::create(output_path)?;
        let mut writer = BufWriter::new(file);
        let tally = self.write_document(&mut writer, manifest, progress_callback)?;
        writer.flush()?;
        drop(writer);

        let output_size = fs::metadata(output_path)?.len();
        info!(
            "Combined {} of {} files into {}",
            tally.included_files,
            tally.total_files,
            output_path.display()
        );

        Ok(CombineSummary {
            output_path: output_path.to_path_buf(),
            output_size,
            tally,
        })
    }

    pub fn ensure_base_directory(&self) -> Result<()> {
        if self.base_directory.exists() {
            Ok(())
        } else {
            Err(MetaUtilsError::InvalidPath {
                path: format!(
                    "Directory '{}' does not exist",
                    self.base_directory.display()
                ),
            })
        }
    }

    pub fn write_document<W: Write>(
        &self,
        out: &mut W,
        manifest: &FileManifest,
        progress_callback: Option<&dyn Fn(&CombineProgress)>,
    ) -> Result<CombineTally> {
        let mut tally = CombineTally::default();
        let total = manifest.total_files();

        writeln!(
            out,
            "{} PROJECT - COMBINED SOURCE FILES",
            self.project_name.replace(['-', '_'], " ").to_uppercase()
        )?;
        writeln!(out, "{}", "=".repeat(HEADER_RULE))?;
        writeln!(out, "Generated on: {}", now_iso())?;
        writeln!(out, "Base directory: {}", self.base_directory.display())?;
        writeln!(out, "{}", "=".repeat(HEADER_RULE))?;
        writeln!(out)?;

        for group in &manifest.groups {
            let rule = "=".repeat(GROUP_RULE);
            write!(out, "\n{} {} DIRECTORY {}\n\n", rule, group.name.to_uppercase(), rule)?;

            let mut group_count = 0;

            for relative_path in &group.files {
                tally.total_files += 1;
                let full_path = self.base_directory.join(relative_path);

                match self.filter.skip_reason(&full_path) {
                    Some(reason) => {
                        debug!("Skipping {} ({})", relative_path, reason);
                        tally.skipped.push(SkippedFile {
                            path: relative_path.clone(),
                            reason,
                        });
                    }
                    None => {
                        debug!("Processing: {}", relative_path);
                        self.write_file_block(out, relative_path, &full_path)?;
                        tally.included_files += 1;
                        group_count += 1;
                    }
                }

                if let Some(callback) = progress_callback {
                    callback(&CombineProgress {
                        processed: tally.total_files,
                        total,
                        current_file: Some(relative_path.clone()),
                    });
                }
            }

            write!(
                out,
                "\n--- End of {} directory ({} files) ---\n\n",
                group.name, group_count
            )?;
            tally.files_by_group.push((group.name.clone(), group_count));
        }

        self.write_summary(out, &tally)?;
        Ok(tally)
    }

    fn write_file_block<W: Write>(&self, out: &mut W, relative_path: &str, full_path: &Path) -> Result<()> {
        let metadata = fs::metadata(full_path)?;
        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        let dashes = "-".repeat(FILE_RULE);

        write!(out, "\n{}\n", dashes)?;
        writeln!(out, "FILE: {}", relative_path)?;
        writeln!(out, "SIZE: {} bytes", metadata.len())?;
        writeln!(out, "MODIFIED: {}", format_timestamp(&local_timestamp(modified)))?;
        write!(out, "{}\n\n", dashes)?;

        out.write_all(self.reader.read(full_path).as_bytes())?;

        let equals = "=".repeat(FILE_RULE);
        write!(out, "\n\n{}\n", equals)?;
        writeln!(out, "END OF FILE: {}", relative_path)?;
        write!(out, "{}\n\n", equals)?;

        Ok(())
    }

    fn write_summary<W: Write>(&self, out: &mut W, tally: &CombineTally) -> Result<()> {
        let rule = "=".repeat(HEADER_RULE);
        write!(out, "\n{}\n", rule)?;
        writeln!(out, "COMBINATION SUMMARY")?;
        writeln!(out, "{}", rule)?;
        writeln!(out, "Total files processed: {}", tally.total_files)?;
        writeln!(out, "Files included: {}", tally.included_files)?;
        writeln!(out, "Files skipped: {}", tally.skipped_count())?;

        if !tally.skipped.is_empty() {
            write!(out, "\nSkipped files:\n")?;
            for skipped in &tally.skipped {
                writeln!(out, "  - {}", skipped)?;
            }
        }

        write!(out, "\nGeneration completed: {}\n", now_iso())?;
        Ok(())
    }
}

/// `<prefix>_<YYYYmmdd_HHMMSS>.txt` in the working directory.
pub fn default_output_name(prefix: &str) -> PathBuf {
    PathBuf::from(format!(
        "{}_{}.txt",
        prefix,
        Local::now().format("%Y%m%d_%H%M%S")
    ))
}

fn now_iso() -> String {
    format_timestamp(&Local::now().naive_local())
}
