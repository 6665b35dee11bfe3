use crate::config::Config;
use crate::error::{MetaUtilsError, Result};
use crate::scanner::directory_walker::{format_timestamp, sorted_records, FileRecord};
use chrono::{Local, NaiveDateTime};
use log::{debug, info};
use serde::Serialize;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

const RULE_WIDTH: usize = 70;

/// JSON envelope written next to the text and CSV listings.
#[derive(Debug, Serialize)]
pub struct CollectionReport<'a> {
    pub project: String,
    pub base_directory: String,
    pub collection_date: String,
    pub total_files: usize,
    pub directories_scanned: Vec<String>,
    pub excluded_directories: Vec<String>,
    pub files: Vec<&'a FileRecord>,
}

#[derive(Debug, Clone)]
pub struct ReportArtifacts {
    pub text: PathBuf,
    pub json: PathBuf,
    pub csv: PathBuf,
}

impl ReportArtifacts {
    pub fn paths(&self) -> [&Path; 3] {
        [&self.text, &self.json, &self.csv]
    }
}

pub struct ReportWriter {
    output_directory: PathBuf,
    file_prefix: String,
    project_name: String,
    target_dirs: Vec<String>,
    exclude_dirs: Vec<String>,
    group_order: Vec<String>,
    generated_at: NaiveDateTime,
}

impl ReportWriter {
    pub fn new(config: &Config) -> Self {
        Self {
            output_directory: config.collector.output_directory.clone(),
            file_prefix: config.collector.file_prefix.clone(),
            project_name: config.project.name.clone(),
            target_dirs: config.collector.target_dirs.clone(),
            exclude_dirs: config.collector.exclude_dirs.clone(),
            group_order: config.group_order(),
            generated_at: Local::now().naive_local(),
        }
    }

    pub fn with_output_directory<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.output_directory = dir.into();
        self
    }

    pub fn with_timestamp(mut self, generated_at: NaiveDateTime) -> Self {
        self.generated_at = generated_at;
        self
    }

    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    /// `<prefix>_<YYYYmmdd_HHMMSS>`, shared by all three artifacts.
    pub fn base_name(&self) -> String {
        format!(
            "{}_{}",
            self.file_prefix,
            self.generated_at.format("%Y%m%d_%H%M%S")
        )
    }

    /// Writes the text, JSON and CSV listings. Returns `None` without touching
    /// the filesystem when there is nothing to report.
    pub fn write_reports(
        &self,
        records: &[FileRecord],
        base_directory: &Path,
    ) -> Result<Option<ReportArtifacts>> {
        if records.is_empty() {
            info!("No files to save");
            return Ok(None);
        }

        fs::create_dir_all(&self.output_directory).map_err(|e| MetaUtilsError::Permission {
            path: format!(
                "Cannot create output directory {}: {}",
                self.output_directory.display(),
                e
            ),
        })?;

        let base_name = self.base_name();
        let artifacts = ReportArtifacts {
            text: self.output_directory.join(format!("{}.txt", base_name)),
            json: self.output_directory.join(format!("{}.json", base_name)),
            csv: self.output_directory.join(format!("{}.csv", base_name)),
        };

        let mut text = BufWriter::new(fs::File::create(&artifacts.text)?);
        self.write_text_report(&mut text, records, base_directory)?;
        text.flush()?;
        debug!("File list saved to: {}", artifacts.text.display());

        let report = self.build_json_report(records, base_directory);
        let json_content = serde_json::to_string_pretty(&report)?;
        fs::write(&artifacts.json, json_content)?;
        debug!("Detailed file info saved to: {}", artifacts.json.display());

        let mut csv = BufWriter::new(fs::File::create(&artifacts.csv)?);
        self.write_csv_report(&mut csv, records)?;
        csv.flush()?;
        debug!("CSV file saved to: {}", artifacts.csv.display());

        Ok(Some(artifacts))
    }

    pub fn write_text_report<W: Write>(
        &self,
        out: &mut W,
        records: &[FileRecord],
        base_directory: &Path,
    ) -> Result<()> {
        writeln!(out, "Files collected from: {}", base_directory.display())?;
        writeln!(out, "Collection date: {}", format_timestamp(&self.generated_at))?;
        writeln!(out, "Total files: {}", records.len())?;
        writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;
        writeln!(out)?;

        let sorted = sorted_records(records, &self.group_order);
        let mut current_group: Option<&str> = None;

        for record in sorted {
            if current_group != Some(record.directory_group.as_str()) {
                if current_group.is_some() {
                    writeln!(out)?;
                }
                writeln!(
                    out,
                    "=== {} DIRECTORY ===",
                    record.directory_group.to_uppercase()
                )?;
                current_group = Some(record.directory_group.as_str());
            }
            writeln!(out, "{}", record.relative_path)?;
        }

        if current_group.is_some() {
            writeln!(out)?;
        }

        Ok(())
    }

    pub fn build_json_report<'a>(
        &self,
        records: &'a [FileRecord],
        base_directory: &Path,
    ) -> CollectionReport<'a> {
        let directories_scanned = std::iter::once("root (files only)".to_string())
            .chain(self.target_dirs.iter().map(|d| format!("{} (recursive)", d)))
            .collect();

        CollectionReport {
            project: self.project_name.clone(),
            base_directory: base_directory.display().to_string(),
            collection_date: format_timestamp(&self.generated_at),
            total_files: records.len(),
            directories_scanned,
            excluded_directories: self.exclude_dirs.clone(),
            files: sorted_records(records, &self.group_order),
        }
    }

    pub fn write_csv_report<W: Write>(&self, out: &mut W, records: &[FileRecord]) -> Result<()> {
        writeln!(
            out,
            "Directory,Name,Relative Path,Full Path,Size (bytes),Extension,Modified Date"
        )?;

        for record in sorted_records(records, &self.group_order) {
            writeln!(
                out,
                "{},{},{},{},{},{},{}",
                csv_quote(&record.directory_group),
                csv_quote(&record.name),
                csv_quote(&record.relative_path),
                csv_quote(&record.full_path.display().to_string()),
                record.size_bytes,
                csv_quote(&record.extension),
                csv_quote(&record.modified_iso()),
            )?;
        }

        Ok(())
    }
}

fn csv_quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}
