use clap::Parser;
use log::debug;
use meta_utils::cli::{CombineArgs, Command};
use meta_utils::ui::prompt::{confirm, CONFIRM_PROMPT};
use meta_utils::{Cli, MetaUtils, MetaUtilsError, OutputFormatter, OutputMode, UserFriendlyError};
use std::path::Path;
use std::process;

fn main() {
    let exit_code = run();
    process::exit(exit_code);
}

fn run() -> i32 {
    let cli = Cli::parse();
    setup_logging(cli.verbosity_level());

    if let Command::InitConfig { ref path } = cli.command {
        return handle_init_config(path, cli.dry_run);
    }

    let meta = match MetaUtils::from_cli(&cli) {
        Ok(meta) => meta,
        Err(e) => {
            print_startup_error(&e, cli.output_mode());
            return e.exit_code();
        }
    };
    debug!("Effective configuration: {:?}", meta.config());

    let result = match cli.command {
        Command::Collect(_) if cli.dry_run => {
            meta.collect_dry_run();
            Ok(())
        }
        Command::Collect(_) => meta.collect_files().map(|_| ()),
        Command::Combine(ref args) => handle_combine(&meta, args, cli.dry_run),
        Command::InitConfig { .. } => Ok(()),
    };

    match result {
        Ok(()) => 0,
        Err(e) => {
            meta.handle_error(&e);
            e.exit_code()
        }
    }
}

fn handle_combine(meta: &MetaUtils, args: &CombineArgs, dry_run: bool) -> meta_utils::Result<()> {
    let plan = meta.plan_combine(args.output.as_deref(), args.from_scan)?;

    if dry_run {
        return meta.combine_dry_run(&plan);
    }

    if !args.yes {
        let formatter = meta.output_formatter();
        formatter.start_operation(&format!(
            "This will combine {} files from {} into {}",
            plan.manifest.total_files(),
            meta.config().project.base_directory.display(),
            plan.output_path.display()
        ));

        if !confirm(CONFIRM_PROMPT)? {
            formatter.warning("Operation cancelled.");
            return Ok(());
        }
    }

    meta.combine_files(&plan).map(|_| ())
}

fn handle_init_config(path: &Path, dry_run: bool) -> i32 {
    if dry_run {
        println!("Would write sample configuration to {}", path.display());
        return 0;
    }

    match MetaUtils::generate_sample_config(path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", path.display());
            println!("\nTo use this configuration:");
            println!("  meta-utils collect --config {}", path.display());
            println!("\nEdit the file to customize settings for your project.");
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            e.exit_code()
        }
    }
}

fn print_startup_error(error: &MetaUtilsError, mode: OutputMode) {
    let formatter = OutputFormatter::new(mode, 0, false);
    formatter.print_user_friendly_error(error);
}

/// Diagnostics go to stderr; `META_UTILS_LOG` overrides the level derived
/// from `-v`/`-q`.
fn setup_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "error",
        1 => "warn",
        2 => "info",
        _ => "debug",
    };

    let env = env_logger::Env::default().filter_or("META_UTILS_LOG", level);
    env_logger::Builder::from_env(env)
        .format_timestamp_secs()
        .try_init()
        .ok();
}
