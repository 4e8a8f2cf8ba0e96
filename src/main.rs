//! Update center CLI
//!
//! Entry point for the `update-center` command-line tool.

use std::path::{Path, PathBuf};
use std::process;

use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;
use update_center::config::read_arguments_file;
use update_center::pipeline::exit_code;
use update_center::{list_plugins, run_batch, run_build, BuildArgs, BuildError};

#[derive(Parser)]
#[command(name = "update-center")]
#[command(about = "Build update center metadata from artifact descriptors", version)]
struct Cli {
    /// Log filter (e.g. info, debug, update_center=trace); RUST_LOG wins when set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the update center documents
    Build {
        #[command(flatten)]
        args: BuildArgs,
    },

    /// Run one build per line of an arguments file
    Batch {
        #[arg(long, value_name = "FILE")]
        arguments_file: PathBuf,
    },

    /// Print the latest core and the latest version of every plugin
    List {
        #[command(flatten)]
        args: BuildArgs,

        /// Print plugin group ids instead
        #[arg(long)]
        groups: bool,
    },
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let result = match cli.command {
        Commands::Build { args } => build(&args),
        Commands::Batch { arguments_file } => batch(&arguments_file),
        Commands::List { args, groups } => list(&args, groups),
    };

    if let Err(e) = result {
        error!("{}", e);
        process::exit(e.exit_code());
    }
    process::exit(exit_code::SUCCESS);
}

fn build(args: &BuildArgs) -> Result<(), BuildError> {
    let config = args.resolve()?;
    let summary = run_build(&config, Utc::now())?;

    match summary.to_json() {
        Ok(json) => println!("{}", json),
        Err(e) => error!("failed to serialize build summary: {}", e),
    }
    Ok(())
}

fn batch(arguments_file: &Path) -> Result<(), BuildError> {
    let entries = read_arguments_file(arguments_file)?;
    let summaries = run_batch(&entries, Utc::now())?;

    for summary in summaries {
        println!(
            "{}\t{} plugins\t{}",
            summary.id, summary.plugin_count, summary.catalog_sha256
        );
    }
    Ok(())
}

fn list(args: &BuildArgs, groups: bool) -> Result<(), BuildError> {
    let config = args.resolve()?;
    let listing = list_plugins(&config)?;

    if groups {
        for group in listing.group_ids() {
            println!("{}", group);
        }
    } else {
        print!("{}", listing.render());
    }
    Ok(())
}
