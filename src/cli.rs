use crate::config::{CliOverrides, Config};
use crate::error::Result;
use crate::ui::OutputMode;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_FILE: &str = "meta-utils.toml";

#[derive(Parser, Debug)]
#[command(name = "meta-utils")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Inventory and combine the source files of a web project")]
#[command(
    long_about = "meta-utils walks a project tree and writes text, JSON and CSV inventories of its \
                  files, or concatenates a curated list of source files into one annotated \
                  document for review."
)]
#[command(after_help = "EXAMPLES:\n  \
    meta-utils collect\n  \
    meta-utils collect --base-dir ../site --exclude coverage,tmp\n  \
    meta-utils combine --yes --output review.txt\n  \
    meta-utils combine --from-scan --dry-run\n  \
    meta-utils init-config")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file path
    #[arg(short, long, global = true, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Output format for console messages
    #[arg(long, value_enum, global = true, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Show what would be done without writing anything
    #[arg(long, global = true)]
    pub dry_run: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Walk the project and write text, JSON and CSV file inventories
    Collect(CollectArgs),
    /// Concatenate the manifest's text files into one document
    Combine(CombineArgs),
    /// Write a sample configuration file with every default
    InitConfig {
        #[arg(default_value = DEFAULT_CONFIG_FILE)]
        path: PathBuf,
    },
}

#[derive(Args, Debug, Default)]
pub struct CollectArgs {
    /// Project root to scan
    #[arg(short, long)]
    pub base_dir: Option<PathBuf>,

    /// Directory that receives the three reports
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Extra directory names to exclude (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    pub exclude: Option<Vec<String>>,
}

#[derive(Args, Debug, Default)]
pub struct CombineArgs {
    /// Project root the manifest paths are relative to
    #[arg(short, long)]
    pub base_dir: Option<PathBuf>,

    /// Combined output file (defaults to a timestamped name)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Build the manifest from a directory walk instead of the configured list
    #[arg(long)]
    pub from_scan: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl From<&OutputFormat> for OutputMode {
    fn from(format: &OutputFormat) -> Self {
        match format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        }
    }
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        match &self.command {
            Command::Collect(args) => CliOverrides::new()
                .with_base_directory(args.base_dir.clone())
                .with_output_dir(args.output_dir.clone())
                .with_exclude(args.exclude.clone()),
            Command::Combine(args) => {
                CliOverrides::new().with_base_directory(args.base_dir.clone())
            }
            Command::InitConfig { .. } => CliOverrides::new(),
        }
    }

    pub fn output_mode(&self) -> OutputMode {
        OutputMode::from(&self.output_format)
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli_with(command: Command) -> Cli {
        Cli {
            command,
            config: None,
            output_format: OutputFormat::Human,
            verbose: 0,
            quiet: false,
            dry_run: false,
        }
    }

    #[test]
    fn test_collect_overrides() {
        let cli = cli_with(Command::Collect(CollectArgs {
            base_dir: Some(PathBuf::from("/srv/site")),
            output_dir: Some(PathBuf::from("inventory")),
            exclude: Some(vec!["coverage".to_string()]),
        }));

        let overrides = cli.create_cli_overrides();
        assert_eq!(overrides.base_directory, Some(PathBuf::from("/srv/site")));
        assert_eq!(overrides.output_dir, Some(PathBuf::from("inventory")));
        assert_eq!(overrides.exclude, Some(vec!["coverage".to_string()]));
    }

    #[test]
    fn test_combine_overrides_only_touch_base_directory() {
        let cli = cli_with(Command::Combine(CombineArgs {
            base_dir: Some(PathBuf::from("site")),
            output: Some(PathBuf::from("out.txt")),
            yes: true,
            from_scan: false,
        }));

        let overrides = cli.create_cli_overrides();
        assert_eq!(overrides.base_directory, Some(PathBuf::from("site")));
        assert!(overrides.output_dir.is_none());
        assert!(overrides.exclude.is_none());
    }

    #[test]
    fn test_parse_collect_with_global_flags() {
        let cli = Cli::try_parse_from([
            "meta-utils",
            "collect",
            "--exclude",
            "coverage,tmp",
            "-vv",
            "--output-format",
            "plain",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.output_mode(), OutputMode::Plain);
        match cli.command {
            Command::Collect(args) => {
                assert_eq!(
                    args.exclude,
                    Some(vec!["coverage".to_string(), "tmp".to_string()])
                );
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_init_config_default_path() {
        let cli = Cli::try_parse_from(["meta-utils", "init-config"]).unwrap();
        match cli.command {
            Command::InitConfig { path } => assert_eq!(path, PathBuf::from(DEFAULT_CONFIG_FILE)),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["meta-utils", "collect", "-q", "-v"]).is_err());
    }

    #[test]
    fn test_verbosity_level() {
        let mut cli = cli_with(Command::Collect(CollectArgs::default()));
        cli.verbose = 2;
        assert_eq!(cli.verbosity_level(), 2);

        cli.quiet = true;
        assert_eq!(cli.verbosity_level(), 0);
    }
}
