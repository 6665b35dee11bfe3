pub mod cli;
pub mod combiner;
pub mod config;
pub mod error;
pub mod report;
pub mod scanner;
pub mod ui;

pub use cli::{Cli, Command, OutputFormat};
pub use config::{CliOverrides, CollectorConfig, CombinerConfig, Config, ProjectConfig};
pub use error::{MetaUtilsError, Result, UserFriendlyError};

pub use combiner::{AggregateWriter, CombineSummary, ContentReader, FileManifest, ManifestGroup};
pub use report::{ReportArtifacts, ReportWriter};
pub use scanner::{DirectoryWalker, FileFilter, FileRecord, ScanStatistics};
pub use ui::{OutputFormatter, OutputMode, ProgressAwareOutput, ProgressManager};

use std::path::{Path, PathBuf};

/// Outcome of a `collect` run.
#[derive(Debug)]
pub struct CollectionRun {
    pub records: Vec<FileRecord>,
    pub warnings: Vec<String>,
    pub statistics: ScanStatistics,
    /// `None` when nothing was found and no reports were written.
    pub artifacts: Option<ReportArtifacts>,
}

/// What `combine` is about to do, resolved before anything is written.
#[derive(Debug)]
pub struct CombinePlan {
    pub manifest: FileManifest,
    pub output_path: PathBuf,
}

pub struct MetaUtils {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
}

impl MetaUtils {
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(!quiet && output_mode == OutputMode::Human);

        Self {
            config,
            output_formatter,
            progress_manager,
        }
    }

    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        Ok(Self::new(
            config,
            cli_args.output_mode(),
            cli_args.verbose,
            cli_args.quiet,
        ))
    }

    /// Walks the project, prints the summary and writes the three reports.
    pub fn collect_files(&self) -> Result<CollectionRun> {
        let base = &self.config.project.base_directory;
        self.output_formatter
            .start_operation(&format!("Scanning {}", base.display()));

        let walker = DirectoryWalker::new(&self.config.collector);
        let spinner = self.progress_manager.create_spinner("Collecting files...");
        let outcome = walker.collect(base);
        spinner.finish_and_clear();
        let outcome = outcome?;

        for warning in &outcome.warnings {
            self.output_formatter.warning(warning);
        }

        let statistics = walker.get_statistics(&outcome.records);
        self.output_formatter.debug(&statistics.display_summary());

        if outcome.records.is_empty() {
            self.output_formatter.warning("No files found");
            return Ok(CollectionRun {
                records: outcome.records,
                warnings: outcome.warnings,
                statistics,
                artifacts: None,
            });
        }

        self.output_formatter
            .print_collection_summary(&statistics, &self.config.collector.exclude_dirs);

        let artifacts = ReportWriter::new(&self.config).write_reports(&outcome.records, base)?;
        if let Some(ref artifacts) = artifacts {
            self.output_formatter.print_report_paths(artifacts);
        }

        let ordered = scanner::sorted_records(&outcome.records, &self.config.group_order());
        self.output_formatter.print_file_preview(&ordered);

        Ok(CollectionRun {
            records: outcome.records,
            warnings: outcome.warnings,
            statistics,
            artifacts,
        })
    }

    /// Resolves the manifest and output path. Fails if the base directory is
    /// missing so no prompt is shown for a run that cannot succeed.
    pub fn plan_combine(&self, output: Option<&Path>, from_scan: bool) -> Result<CombinePlan> {
        AggregateWriter::new(&self.config)?.ensure_base_directory()?;

        let manifest = if from_scan {
            self.manifest_from_scan()?
        } else {
            self.config.manifest()
        };

        let output_path = output.map(Path::to_path_buf).unwrap_or_else(|| {
            combiner::default_output_name(&self.config.combiner.output_prefix)
        });

        Ok(CombinePlan {
            manifest,
            output_path,
        })
    }

    pub fn combine_files(&self, plan: &CombinePlan) -> Result<CombineSummary> {
        let writer = AggregateWriter::new(&self.config)?;
        let total = plan.manifest.total_files();

        self.output_formatter.start_operation(&format!(
            "Combining {} files into {}",
            total,
            plan.output_path.display()
        ));

        let file_progress = self.progress_manager.create_file_progress(total as u64);
        let progress_output = ProgressAwareOutput::new(&self.output_formatter, &self.progress_manager);
        let progress_callback = |progress: &combiner::CombineProgress| {
            ui::progress::update_combine_progress(&file_progress, progress);
            if let Some(ref file) = progress.current_file {
                progress_output.debug(&format!("Processed: {}", file));
            }
        };

        let summary = match writer.combine_to_file(
            &plan.manifest,
            &plan.output_path,
            Some(&progress_callback),
        ) {
            Ok(summary) => summary,
            Err(e) => {
                file_progress.abandon();
                return Err(e);
            }
        };

        ui::progress::finish_progress_with_summary(
            &file_progress,
            &format!("Combined {} files", summary.tally.included_files),
        );
        self.output_formatter.print_combine_summary(&summary);

        Ok(summary)
    }

    fn manifest_from_scan(&self) -> Result<FileManifest> {
        let walker = DirectoryWalker::new(&self.config.collector);
        let outcome = walker.collect(&self.config.project.base_directory)?;

        for warning in &outcome.warnings {
            self.output_formatter.warning(warning);
        }

        Ok(FileManifest::from_records(
            &outcome.records,
            &self.config.group_order(),
        ))
    }

    /// Prints the effective settings and the report names `collect` would use.
    pub fn collect_dry_run(&self) {
        let formatter = &self.output_formatter;
        let config = &self.config;
        let writer = ReportWriter::new(config);
        let base_name = writer.base_name();

        formatter.print_header("Dry run: collect");
        formatter.success(&format!(
            "Base directory: {}",
            config.project.base_directory.display()
        ));
        formatter.success(&format!(
            "Target directories: {}",
            config.collector.target_dirs.join(", ")
        ));
        formatter.success(&format!(
            "Excluded directories: {}",
            config.collector.exclude_dirs.join(", ")
        ));
        for ext in ["txt", "json", "csv"] {
            formatter.success(&format!(
                "Would write {}",
                writer
                    .output_directory()
                    .join(format!("{}.{}", base_name, ext))
                    .display()
            ));
        }
    }

    /// Lists every manifest entry with the status it would get.
    pub fn combine_dry_run(&self, plan: &CombinePlan) -> Result<()> {
        let writer = AggregateWriter::new(&self.config)?;
        let formatter = &self.output_formatter;

        formatter.print_header("Dry run: combine");
        for group in &plan.manifest.groups {
            formatter.start_operation(&format!("{} ({} files)", group.name, group.files.len()));
            for path in &group.files {
                let status = writer
                    .filter()
                    .skip_reason(&writer.base_directory().join(path));
                formatter.print_manifest_entry(&group.name, path, status);
            }
        }
        formatter.success(&format!(
            "Would write {}",
            plan.output_path.display()
        ));

        Ok(())
    }

    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        std::fs::write(output_path.as_ref(), Config::create_sample_config())?;
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    pub fn handle_error(&self, error: &MetaUtilsError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}

pub fn version_info() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn project_fixture() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("app/admin")).unwrap();
        fs::create_dir_all(root.join("lib")).unwrap();
        fs::create_dir_all(root.join("components/node_modules/pkg")).unwrap();
        fs::write(root.join("package.json"), "{\"name\":\"site\"}").unwrap();
        fs::write(root.join("app/page.tsx"), "export default function Page() {}\n").unwrap();
        fs::write(root.join("app/admin/page.tsx"), "export default function Admin() {}\n").unwrap();
        fs::write(root.join("lib/utils.ts"), "export {}\n").unwrap();
        fs::write(root.join("components/node_modules/pkg/index.js"), "").unwrap();
        temp_dir
    }

    fn quiet_instance(base: &Path, output_dir: &Path) -> MetaUtils {
        let mut config = Config::default();
        config.project.base_directory = base.to_path_buf();
        config.collector.output_directory = output_dir.to_path_buf();
        MetaUtils::new(config, OutputMode::Plain, 0, true)
    }

    #[test]
    fn test_collect_writes_three_reports() {
        let project = project_fixture();
        let output = TempDir::new().unwrap();
        let meta = quiet_instance(project.path(), &output.path().join("lists"));

        let run = meta.collect_files().unwrap();

        assert_eq!(run.records.len(), 4);
        assert_eq!(run.statistics.total_files, 4);
        let artifacts = run.artifacts.expect("reports written");
        for path in artifacts.paths() {
            assert!(path.exists(), "missing {}", path.display());
        }
    }

    #[test]
    fn test_collect_empty_project_writes_nothing() {
        let project = TempDir::new().unwrap();
        let output_dir = project.path().join("lists");
        let meta = quiet_instance(project.path(), &output_dir);

        let run = meta.collect_files().unwrap();

        assert!(run.records.is_empty());
        assert!(run.artifacts.is_none());
        assert_eq!(run.warnings.len(), 3);
        assert!(!output_dir.exists());
    }

    #[test]
    fn test_collect_missing_base_directory() {
        let temp_dir = TempDir::new().unwrap();
        let meta = quiet_instance(&temp_dir.path().join("nope"), temp_dir.path());

        let err = meta.collect_files().unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_plan_from_scan_uses_files_on_disk() {
        let project = project_fixture();
        let meta = quiet_instance(project.path(), project.path());

        let plan = meta.plan_combine(Some(Path::new("out.txt")), true).unwrap();

        let names: Vec<&str> = plan.manifest.groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["root", "app", "lib"]);
        assert_eq!(
            plan.manifest.groups[1].files,
            vec!["app/admin/page.tsx".to_string(), "app/page.tsx".to_string()]
        );
        assert_eq!(plan.output_path, PathBuf::from("out.txt"));
    }

    #[test]
    fn test_plan_rejects_missing_base_directory() {
        let temp_dir = TempDir::new().unwrap();
        let meta = quiet_instance(&temp_dir.path().join("nope"), temp_dir.path());

        let err = meta.plan_combine(None, false).unwrap_err();
        assert!(matches!(err, MetaUtilsError::InvalidPath { .. }));
    }

    #[test]
    fn test_combine_with_configured_manifest() {
        let project = project_fixture();
        let meta = quiet_instance(project.path(), project.path());
        let output = project.path().join("combined.txt");

        let plan = meta.plan_combine(Some(&output), false).unwrap();
        let summary = meta.combine_files(&plan).unwrap();

        // package.json, app/page.tsx, app/admin/page.tsx and lib/utils.ts exist
        assert_eq!(summary.tally.included_files, 4);
        assert_eq!(summary.tally.total_files, 44);
        assert_eq!(summary.tally.skipped_count(), 40);
        assert!(output.exists());
    }

    #[test]
    fn test_sample_config_generation() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("meta-utils.toml");

        MetaUtils::generate_sample_config(&config_path).unwrap();

        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[collector]"));
        assert!(content.contains("[combiner]"));
        let reloaded = Config::load_from_file(&config_path).unwrap();
        assert_eq!(reloaded.combiner.groups.len(), 4);
    }

    #[test]
    fn test_version_info() {
        assert!(!version_info().is_empty());
    }
}
