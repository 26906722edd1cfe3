use clap::Parser;
use datasplit::{Cli, DataSplit, DataSplitError, OutputFormatter, OutputMode, UserFriendlyError};
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    let exit_code = run();
    process::exit(exit_code);
}

fn run() -> i32 {
    let cli = Cli::parse();

    setup_logging(&cli);

    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    let datasplit = match DataSplit::from_cli(&cli) {
        Ok(datasplit) => datasplit,
        Err(e) => {
            print_startup_error(&e);
            return exit_code_for(&e);
        }
    };

    let archives = match cli.archive_paths() {
        Ok(archives) => archives,
        Err(e) => {
            datasplit.handle_error(&e);
            return exit_code_for(&e);
        }
    };

    if cli.dry_run {
        return handle_dry_run(&cli, &datasplit, &archives);
    }

    match datasplit.process(cli.model_name(), &archives) {
        Ok(report) => {
            datasplit.output_formatter().print_process_report(&report);
            0
        }
        Err(e) => {
            datasplit.handle_error(&e);
            exit_code_for(&e)
        }
    }
}

fn exit_code_for(error: &DataSplitError) -> i32 {
    match error {
        DataSplitError::Validation { .. } | DataSplitError::InvalidName { .. } => 2,
        DataSplitError::CorruptArchive { .. } | DataSplitError::UnsafeEntry { .. } => 3,
        DataSplitError::Config { .. } => 4,
        DataSplitError::Busy => 5,
        _ => 1,
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "datasplit.toml".to_string());

    match DataSplit::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  datasplit --model <NAME> <ARCHIVES>... --config {}", config_path);
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn handle_dry_run(cli: &Cli, datasplit: &DataSplit, archives: &[std::path::PathBuf]) -> i32 {
    let formatter = datasplit.output_formatter();

    formatter.info("DRY RUN MODE - No files will be written");

    match datasplit.plan(cli.model_name(), archives) {
        Ok(plan) => {
            formatter.print_plan(&plan);
            formatter.print_separator();
            formatter.success("Dry run completed successfully");
            0
        }
        Err(e) => {
            datasplit.handle_error(&e);
            exit_code_for(&e)
        }
    }
}

fn print_startup_error(error: &DataSplitError) {
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}

fn setup_logging(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| cli.log_filter().into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();
}
