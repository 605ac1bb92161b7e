//! # VibeGuard CLI
//!
//! Submit code snippets and repositories to the VibeGuard scanning service.
//!
//! ## Usage
//!
//! ```bash
//! # Scan a snippet
//! vibeguard scan --code "query = 'SELECT * FROM users WHERE id=' + uid"
//!
//! # Scan a project directory
//! vibeguard scan ./my-project
//!
//! # Browse past scans
//! vibeguard history
//! vibeguard show <ID>
//! ```

use std::path::PathBuf;

use clap::{ArgGroup, Parser, Subcommand};
use vibeguard::commands;
use vibeguard::commands::scan::ScanSource;
use vibeguard::output::OutputFormat;
use vibeguard::session::{DEFAULT_HISTORY_LIMIT, DEFAULT_LANGUAGE};

/// Initialize logger based on verbose flag
fn init_logger(verbose: bool) {
    let mut log_builder = env_logger::Builder::from_default_env();
    if verbose {
        log_builder.filter_level(log::LevelFilter::Debug);
    } else {
        log_builder.filter_level(log::LevelFilter::Info);
    }
    log_builder.init();
}

/// Main CLI structure
#[derive(Parser)]
#[command(name = "vibeguard")]
#[command(about = "VibeGuard - security scanning for code snippets and repositories", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
enum Commands {
    /// Scan code and show the findings
    #[command(group(
        ArgGroup::new("source")
            .required(true)
            .multiple(false)
            .args(["code", "code_file", "paths", "files_from"])
    ))]
    Scan {
        /// Code to scan
        #[arg(long, value_name = "CODE")]
        code: Option<String>,
        /// File whose contents are scanned as a snippet (`-` for stdin)
        #[arg(long, value_name = "FILE")]
        code_file: Option<PathBuf>,
        /// Files and directories to scan as one repository upload
        #[arg(value_name = "PATHS")]
        paths: Vec<PathBuf>,
        /// File listing relative paths to upload, one per line (`-` for stdin)
        #[arg(long, value_name = "FILE")]
        files_from: Option<PathBuf>,
        /// Language hint sent to the scanner
        #[arg(long, short = 'l', default_value = DEFAULT_LANGUAGE)]
        language: String,
        /// Output format
        #[arg(long, value_name = "OUTPUT", default_value = "text")]
        output: OutputFormat,
        /// Exit with code 5 when the score is below this value
        #[arg(long, value_name = "SCORE", value_parser = clap::value_parser!(u8).range(0..=100))]
        fail_under: Option<u8>,
    },
    /// List recent scans
    History {
        /// Number of scans to list
        #[arg(long, short = 'n', default_value_t = DEFAULT_HISTORY_LIMIT)]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a stored scan
    Show {
        #[arg(value_name = "ID")]
        id: String,
        /// Output format
        #[arg(long, value_name = "OUTPUT", default_value = "text")]
        output: OutputFormat,
    },
    /// Delete a stored scan
    Delete {
        #[arg(value_name = "ID")]
        id: String,
    },
    /// Check configuration and service status
    Status,
    /// Manage CLI configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Config subcommands
#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show {
        /// Show the full API key
        #[arg(long)]
        show_secrets: bool,
    },
    /// Store the base URL and/or API key
    Set {
        /// Base URL of the scanning service
        #[arg(long, value_name = "URL")]
        base_url: Option<String>,
        /// API key (empty to clear)
        #[arg(long, value_name = "KEY")]
        api_key: Option<String>,
    },
    /// Remove the stored configuration
    Reset,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose);
    let exit_code = run_command(cli.command).await;
    std::process::exit(exit_code);
}

async fn run_command(command: Commands) -> i32 {
    use vibeguard::exit_codes::*;

    let (label, result) = match command {
        Commands::Scan {
            code,
            code_file,
            paths,
            files_from,
            language,
            output,
            fail_under,
        } => {
            let source = match (code, code_file, files_from) {
                (Some(code), _, _) => ScanSource::Code(code),
                (_, Some(file), _) => ScanSource::CodeFile(file),
                (_, _, Some(list)) => ScanSource::FilesFrom(list),
                (None, None, None) => ScanSource::Paths(paths),
            };
            let args = commands::scan::ScanArgs {
                source,
                language,
                output,
                fail_under,
            };
            ("Scan", commands::scan::execute(args).await)
        }
        Commands::History { limit, json } => {
            let args = commands::history::HistoryArgs { limit, json };
            ("History", commands::history::execute(args).await)
        }
        Commands::Show { id, output } => {
            let args = commands::show::ShowArgs { id, output };
            ("Show", commands::show::execute(args).await)
        }
        Commands::Delete { id } => {
            let args = commands::delete::DeleteArgs { id };
            ("Delete", commands::delete::execute(args).await)
        }
        Commands::Status => ("Status", commands::status::execute().await),
        Commands::Config { command } => ("Config", run_config_command(command)),
    };

    match result {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("{} error: {:#}", label, e);
            EXIT_ERROR
        }
    }
}

fn run_config_command(command: ConfigCommands) -> anyhow::Result<i32> {
    match command {
        ConfigCommands::Show { show_secrets } => {
            commands::config::execute_show(commands::config::ConfigShowArgs { show_secrets })
        }
        ConfigCommands::Set { base_url, api_key } => {
            commands::config::execute_set(commands::config::ConfigSetArgs { base_url, api_key })
        }
        ConfigCommands::Reset => commands::config::execute_reset(),
    }
}
