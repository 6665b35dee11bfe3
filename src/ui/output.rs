use crate::combiner::CombineSummary;
use crate::error::{format_bytes, MetaUtilsError, UserFriendlyError};
use crate::report::ReportArtifacts;
use crate::scanner::{FileRecord, ScanStatistics, SkipReason};
use crate::ui::ProgressManager;
use console::{style, Emoji, StyledObject, Term};
use std::path::Path;

const PREVIEW_PER_GROUP: usize = 5;
const SKIPPED_PREVIEW: usize = 10;
const RULE: &str = "─";
const RULE_WIDTH: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

static CHECKMARK: Emoji = Emoji("✅ ", "✓ ");
static CROSS: Emoji = Emoji("❌ ", "✗ ");
static INFO: Emoji = Emoji("ℹ️  ", "i ");
static WARNING: Emoji = Emoji("⚠️  ", "! ");
static FOLDER: Emoji = Emoji("📁 ", "> ");
static SPARKLES: Emoji = Emoji("✨ ", "* ");

pub struct OutputFormatter {
    mode: OutputMode,
    use_colors: bool,
    verbose_level: u8,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let use_colors = match mode {
            OutputMode::Human => Term::stdout().features().colors_supported() && !quiet,
            _ => false,
        };

        Self {
            mode,
            use_colors,
            verbose_level: if quiet { 0 } else { verbose },
            quiet,
        }
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    pub fn success(&self, message: &str) {
        self.emit(Tone::Success, message);
    }

    pub fn error(&self, message: &str) {
        self.emit(Tone::Error, message);
    }

    pub fn warning(&self, message: &str) {
        self.emit(Tone::Warning, message);
    }

    pub fn debug(&self, message: &str) {
        self.emit(Tone::Debug, message);
    }

    pub fn start_operation(&self, operation: &str) {
        self.emit(Tone::Operation, operation);
    }

    fn emit(&self, tone: Tone, message: &str) {
        if let Some(level) = tone.min_verbosity() {
            if !self.should_show_message(level) {
                return;
            }
        }

        let line = match self.mode {
            OutputMode::Json => {
                self.print_json_message(tone.json_level(), message);
                return;
            }
            OutputMode::Plain => format!("{}: {}", tone.plain_tag(), message),
            OutputMode::Human if self.use_colors => {
                format!("{}{}", tone.emoji(), tone.paint(message))
            }
            OutputMode::Human => format!("{}{}", tone.marker(), message),
        };

        if tone == Tone::Error {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }

    /// Error line plus the optional hint, both on stderr except in JSON mode.
    pub fn print_user_friendly_error(&self, error: &MetaUtilsError) {
        self.error(&error.user_message());

        let Some(hint) = error.suggestion() else {
            return;
        };

        match self.mode {
            OutputMode::Json => self.print_json_object(&serde_json::json!({
                "type": "suggestion",
                "message": hint,
            })),
            OutputMode::Plain => eprintln!("SUGGESTION: {}", hint),
            OutputMode::Human if self.use_colors => {
                eprintln!("\n{}{}", INFO, style(format!("Suggestion: {}", hint)).cyan())
            }
            OutputMode::Human => eprintln!("\nSuggestion: {}", hint),
        }
    }

    pub fn print_header(&self, title: &str) {
        if self.quiet {
            return;
        }

        let banner = if self.use_colors {
            format!("{} {}", SPARKLES, style(title).bold().cyan())
        } else {
            format!("=== {} ===", title)
        };

        match self.mode {
            OutputMode::Json => self.print_json_object(&serde_json::json!({
                "type": "header",
                "title": title,
            })),
            OutputMode::Plain => println!("{}", banner),
            OutputMode::Human => println!("\n{}\n", banner),
        }
    }

    pub fn print_separator(&self) {
        if self.quiet || self.mode == OutputMode::Json {
            return;
        }

        if self.use_colors {
            println!("{}", style(RULE.repeat(RULE_WIDTH)).dim());
        } else {
            println!("{}", "-".repeat(RULE_WIDTH));
        }
    }

    pub fn print_collection_summary(&self, stats: &ScanStatistics, excluded_dirs: &[String]) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => self.print_human_collection_summary(stats, excluded_dirs),
            OutputMode::Json => {
                let by_group: serde_json::Map<String, serde_json::Value> = stats
                    .files_by_group
                    .iter()
                    .map(|(g, n)| (g.clone(), serde_json::json!(n)))
                    .collect();
                let by_extension: serde_json::Map<String, serde_json::Value> = stats
                    .files_by_extension
                    .iter()
                    .map(|(e, n)| (e.clone(), serde_json::json!(n)))
                    .collect();

                self.print_json_object(&serde_json::json!({
                    "type": "collection_summary",
                    "total_files": stats.total_files,
                    "total_size": stats.total_size,
                    "files_by_directory": by_group,
                    "files_by_extension": by_extension,
                    "excluded_directories": excluded_dirs,
                }));
            }
            OutputMode::Plain => {
                println!("Total files: {}", stats.total_files);
                for (group, count) in &stats.files_by_group {
                    println!("Directory {}: {}", group, count);
                }
                for (ext, count) in &stats.files_by_extension {
                    println!("Extension {}: {}", ext, count);
                }
                println!("Total size: {} bytes", stats.total_size);
            }
        }
    }

    fn print_human_collection_summary(&self, stats: &ScanStatistics, excluded_dirs: &[String]) {
        println!();
        self.print_separator();
        println!("  Total files found: {}", self.highlight(stats.total_files));

        println!();
        println!("  Files by directory:");
        for (group, count) in &stats.files_by_group {
            println!("    {}: {} files", group, count);
        }

        println!();
        println!("  Files by file type:");
        for (ext, count) in &stats.files_by_extension {
            println!("    {}: {} files", ext, count);
        }

        println!();
        println!(
            "  Total size: {} bytes ({:.2} MB)",
            self.highlight(format_with_commas(stats.total_size)),
            stats.total_size_mb()
        );

        if !excluded_dirs.is_empty() {
            println!("  Excluded directories: {}", excluded_dirs.join(", "));
        }
        self.print_separator();
    }

    /// First few entries of each group, records already in report order.
    pub fn print_file_preview(&self, records: &[&FileRecord]) {
        if self.quiet || self.mode == OutputMode::Json {
            return;
        }

        self.print_header("File preview");

        let mut start = 0;
        while start < records.len() {
            let group = &records[start].directory_group;
            let end = records[start..]
                .iter()
                .position(|r| &r.directory_group != group)
                .map_or(records.len(), |offset| start + offset);

            println!("{}/", group.to_uppercase());
            for record in &records[start..(start + PREVIEW_PER_GROUP).min(end)] {
                println!("  {} ({} bytes)", record.relative_path, record.size_bytes);
            }
            if end - start > PREVIEW_PER_GROUP {
                println!("  ... and {} more files", end - start - PREVIEW_PER_GROUP);
            }

            start = end;
        }
    }

    pub fn print_report_paths(&self, artifacts: &ReportArtifacts) {
        match self.mode {
            OutputMode::Json => {
                self.print_json_object(&serde_json::json!({
                    "type": "reports",
                    "text": artifacts.text,
                    "json": artifacts.json,
                    "csv": artifacts.csv,
                }));
            }
            _ => {
                if self.quiet {
                    return;
                }
                for path in artifacts.paths() {
                    self.success(&format!("Saved {}", path.display()));
                }
            }
        }
    }

    pub fn print_combine_summary(&self, summary: &CombineSummary) {
        let tally = &summary.tally;
        let absolute = absolute_display(&summary.output_path);

        match self.mode {
            OutputMode::Json => {
                let mut value = serde_json::to_value(summary).unwrap_or_default();
                if let Some(obj) = value.as_object_mut() {
                    obj.insert("type".to_string(), serde_json::json!("combine_summary"));
                    obj.insert("output_path".to_string(), serde_json::json!(absolute));
                }
                self.print_json_object(&value);
            }
            OutputMode::Plain => {
                println!("Output: {}", absolute);
                println!("Total files processed: {}", tally.total_files);
                println!("Files included: {}", tally.included_files);
                println!("Files skipped: {}", tally.skipped_count());
                println!("Output size: {} bytes", summary.output_size);
            }
            OutputMode::Human => {
                if self.quiet {
                    return;
                }
                println!();
                self.print_separator();
                self.success("Files combined successfully!");
                println!("  Output file: {}", absolute);
                println!("  Total files processed: {}", tally.total_files);
                println!("  Files included: {}", self.highlight(tally.included_files));
                println!("  Files skipped: {}", tally.skipped_count());
                println!(
                    "  Combined file size: {} bytes ({})",
                    format_with_commas(summary.output_size),
                    format_bytes(summary.output_size)
                );

                if !tally.skipped.is_empty() {
                    println!();
                    println!("  Skipped files:");
                    for skipped in tally.skipped.iter().take(SKIPPED_PREVIEW) {
                        println!("    - {}", skipped);
                    }
                    if tally.skipped.len() > SKIPPED_PREVIEW {
                        println!(
                            "    ... and {} more",
                            tally.skipped.len() - SKIPPED_PREVIEW
                        );
                    }
                }
                self.print_separator();
            }
        }
    }

    /// One line per manifest entry for `combine --dry-run`.
    pub fn print_manifest_entry(&self, group: &str, path: &str, status: Option<SkipReason>) {
        let label = status.map_or_else(|| "include".to_string(), |r| r.to_string());

        match self.mode {
            OutputMode::Json => self.print_json_object(&serde_json::json!({
                "type": "manifest_entry",
                "group": group,
                "path": path,
                "status": label,
            })),
            OutputMode::Plain => println!("{}\t{}\t{}", group, path, label),
            OutputMode::Human => {
                if self.use_colors {
                    let styled = match status {
                        None => style(label).green(),
                        Some(_) => style(label).yellow(),
                    };
                    println!("  [{}] {}", styled, path);
                } else {
                    println!("  [{}] {}", label, path);
                }
            }
        }
    }

    fn should_show_message(&self, min_verbose_level: u8) -> bool {
        !self.quiet && self.verbose_level >= min_verbose_level
    }

    fn highlight<T: std::fmt::Display>(&self, value: T) -> String {
        if self.use_colors {
            style(value).cyan().bold().to_string()
        } else {
            value.to_string()
        }
    }

    fn print_json_message(&self, level: &str, message: &str) {
        self.print_json_object(&serde_json::json!({
            "type": "message",
            "level": level,
            "message": message,
            "timestamp": chrono::Local::now().to_rfc3339()
        }));
    }

    fn print_json_object(&self, obj: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string(obj).unwrap_or_else(|_| "{}".to_string())
        );
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Tone {
    Success,
    Error,
    Warning,
    Debug,
    Operation,
}

impl Tone {
    /// `None` means always shown, even when quiet.
    fn min_verbosity(self) -> Option<u8> {
        match self {
            Tone::Success | Tone::Error => None,
            Tone::Warning | Tone::Operation => Some(0),
            Tone::Debug => Some(2),
        }
    }

    fn json_level(self) -> &'static str {
        match self {
            Tone::Success => "success",
            Tone::Error => "error",
            Tone::Warning => "warning",
            Tone::Debug => "debug",
            Tone::Operation => "operation_start",
        }
    }

    fn plain_tag(self) -> &'static str {
        match self {
            Tone::Success => "SUCCESS",
            Tone::Error => "ERROR",
            Tone::Warning => "WARNING",
            Tone::Debug => "DEBUG",
            Tone::Operation => "STARTING",
        }
    }

    fn emoji(self) -> Emoji<'static, 'static> {
        match self {
            Tone::Success => CHECKMARK,
            Tone::Error => CROSS,
            Tone::Warning => WARNING,
            Tone::Debug => Emoji("  ", "  "),
            Tone::Operation => FOLDER,
        }
    }

    /// Prefix used on terminals without color support.
    fn marker(self) -> &'static str {
        match self {
            Tone::Success => "✓ ",
            Tone::Error => "✗ ",
            Tone::Warning => "! ",
            Tone::Debug => "  DEBUG: ",
            Tone::Operation => "> ",
        }
    }

    fn paint(self, message: &str) -> StyledObject<&str> {
        let styled = style(message);
        match self {
            Tone::Success => styled.green().bold(),
            Tone::Error => styled.red().bold(),
            Tone::Warning => styled.yellow().bold(),
            Tone::Debug => styled.dim(),
            Tone::Operation => styled.bold(),
        }
    }
}

fn absolute_display(path: &Path) -> String {
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}

/// `1234567` -> `1,234,567`
pub fn format_with_commas(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Prints formatter messages with the progress bars suspended so they are
/// not torn.
pub struct ProgressAwareOutput<'a> {
    formatter: &'a OutputFormatter,
    bars: &'a ProgressManager,
}

impl<'a> ProgressAwareOutput<'a> {
    pub fn new(formatter: &'a OutputFormatter, bars: &'a ProgressManager) -> Self {
        Self { formatter, bars }
    }

    pub fn debug(&self, message: &str) {
        self.bars.suspend(|| self.formatter.debug(message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tone_visibility() {
        let quiet = OutputFormatter::new(OutputMode::Plain, 0, true);
        let shown = |f: &OutputFormatter, tone: Tone| {
            tone.min_verbosity().map_or(true, |level| f.should_show_message(level))
        };

        assert!(shown(&quiet, Tone::Error));
        assert!(shown(&quiet, Tone::Success));
        assert!(!shown(&quiet, Tone::Warning));

        let normal = OutputFormatter::new(OutputMode::Plain, 1, false);
        assert!(shown(&normal, Tone::Operation));
        assert!(!shown(&normal, Tone::Debug));
        assert_eq!(Tone::Operation.plain_tag(), "STARTING");
        assert_eq!(Tone::Operation.json_level(), "operation_start");
    }

    #[test]
    fn test_quiet_mode() {
        let formatter = OutputFormatter::new(OutputMode::Human, 2, true);
        assert_eq!(formatter.verbose_level, 0);
        assert!(formatter.is_quiet());
    }

    #[test]
    fn test_should_show_message() {
        let formatter = OutputFormatter::new(OutputMode::Plain, 1, false);
        assert!(formatter.should_show_message(0));
        assert!(formatter.should_show_message(1));
        assert!(!formatter.should_show_message(2));

        let quiet_formatter = OutputFormatter::new(OutputMode::Plain, 2, true);
        assert!(!quiet_formatter.should_show_message(0));
    }

    #[test]
    fn test_format_with_commas() {
        assert_eq!(format_with_commas(0), "0");
        assert_eq!(format_with_commas(999), "999");
        assert_eq!(format_with_commas(1000), "1,000");
        assert_eq!(format_with_commas(123456), "123,456");
        assert_eq!(format_with_commas(1234567), "1,234,567");
    }

    #[test]
    fn test_plain_mode_has_no_colors() {
        let formatter = OutputFormatter::new(OutputMode::Plain, 1, false);
        assert!(!formatter.use_colors);
        assert_eq!(formatter.highlight(42), "42");
    }
}
