use crate::prelude::{eprintln, *};
use clap::Parser;
use std::path::PathBuf;

mod api;
mod check;
mod client;
mod combinations;
mod config;
mod error;
mod output;
mod prelude;
mod report;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Inventory an Akamai account (PAPI, CPS, AppSec, GTM, Edge DNS, EdgeWorkers, \
                  Cloudlets, Cloud Wrapper, network lists) and write CSV/JSON reports plus \
                  Cloudflare migration checklists.\n\nRunning without a subcommand generates the report."
)]
pub struct App {
    #[command(subcommand)]
    pub command: Option<SubCommands>,

    #[clap(flatten)]
    report: report::ReportOptions,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Account switch key, for credentials that manage other accounts
    #[clap(long, env = "AKAMAI_ACCOUNT_SWITCH_KEY", global = true)]
    account_switch_key: Option<String>,

    /// Section of the edgerc file to use when AKAMAI_* variables are not set
    #[clap(long, env = "AKAMAI_EDGERC_SECTION", global = true, default_value = "default")]
    edgerc_section: String,

    /// Path to the edgerc file (defaults to ~/.edgerc)
    #[clap(long, env = "AKAMAI_EDGERC", global = true)]
    edgerc: Option<PathBuf>,

    /// Enable debug output and detailed error information
    #[clap(long, env = "AKAMAI_DEBUG", global = true, default_value = "false")]
    debug: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Generate CSV/JSON inventories and migration checklists (default)
    Report(crate::report::ReportOptions),

    /// Validate credentials and list which Akamai APIs they can reach
    Check(crate::check::CheckOptions),

    /// List contract/group combinations usable with the Property Manager API
    Combinations(crate::combinations::CombinationsOptions),
}

fn init_logger(debug: bool) {
    let default_filter = if debug {
        "info,akamai_usage_reporter=debug"
    } else {
        "info"
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .format_target(debug)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // The env file has to be loaded before parsing so clap's `env` fallbacks see it.
    let env_file = config::load_env_file();

    let app = App::parse();

    if app.global.debug {
        std::env::set_var("RUST_LIB_BACKTRACE", "1");
    }
    init_logger(app.global.debug);
    color_eyre::install()?;

    match env_file {
        Ok(Some(path)) => log::info!("Loaded environment variables from {}", path.display()),
        Ok(None) => log::debug!("No {} file found", config::ENV_FILE),
        Err(err) => log::warn!("Failed to load environment file: {err}"),
    }

    let result = match app.command {
        None => crate::report::run(app.report, app.global).await,
        Some(SubCommands::Report(options)) => crate::report::run(options, app.global).await,
        Some(SubCommands::Check(options)) => crate::check::run(options, app.global).await,
        Some(SubCommands::Combinations(options)) => {
            crate::combinations::run(options, app.global).await
        }
    };

    if let Err(err) = &result {
        if let Some(code) = exit_code(err) {
            eprintln!("{err}");
            std::process::exit(code);
        }
    }

    result
}

/// Exit code for errors that bypass the default report handler
fn exit_code(err: &color_eyre::eyre::Report) -> Option<i32> {
    match err.downcast_ref::<Error>() {
        Some(Error::MissingCredentials(_)) => Some(2),
        _ => None,
    }
}
