use std::io;
use std::path::Path;

use clap::{Args, Parser, Subcommand};
use once_cell::sync::Lazy;
use tokio::runtime::Runtime;
use trace::global_logging::init_global_logging;
use trace::{error, info};

mod auth;
mod command;
mod event;
mod http;
mod schema;
mod server;
mod service;
mod signal;
mod sink;
mod validate;

static VERSION: Lazy<String> = Lazy::new(|| {
    format!(
        "{}, revision {}",
        option_env!("CARGO_PKG_VERSION").unwrap_or("UNKNOWN"),
        option_env!("GIT_HASH").unwrap_or("UNKNOWN")
    )
});

#[derive(Debug, Parser)]
#[command(name = "vescollector", version = & VERSION[..])]
#[command(about = "VES collector command line tools")]
#[command(long_about = r#"VES event collector and command line tools
Examples:
    # Run the collector:
    vescollector run
    # Check configuration file:
    vescollector check server-config ./config/collector.toml"#)]
struct Cli {
    #[command(subcommand)]
    subcmd: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Run the VES collector server.
    Run(RunArgs),
    /// Check configurations.
    Check {
        #[command(subcommand)]
        subcmd: CheckCommand,
    },
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Path to configuration file.
    #[arg(long, global = true)]
    config: Option<String>,

    /// Time-series backend address, overrides the configuration file.
    #[arg(short, long)]
    influxdb: Option<String>,

    /// Event listener API version on the served URLs.
    #[arg(short, long)]
    api_version: Option<u32>,

    /// Generate more information in the logs.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Subcommand)]
enum CheckCommand {
    /// Check server configurations.
    #[command(arg_required_else_help = false)]
    ServerConfig {
        /// Print warnings.
        #[arg(short, long)]
        show_warnings: bool,
        /// Path to configuration file.
        config: String,
    },
}

fn main() -> Result<(), std::io::Error> {
    let cli = Cli::parse();
    let run_args = match cli.subcmd {
        CliCommand::Run(run_args) => run_args,
        CliCommand::Check { subcmd } => match subcmd {
            CheckCommand::ServerConfig {
                config,
                show_warnings,
            } => {
                config::check_config(config, show_warnings);
                return Ok(());
            }
        },
    };

    let mut config = parse_config(run_args.config.as_ref());
    config.override_by_env();
    if let Some(influxdb) = run_args.influxdb {
        config.sink.host = influxdb;
    }
    if let Some(api_version) = run_args.api_version {
        config.listener.api_version = api_version;
    }
    if run_args.verbose > 0 {
        println!("Verbose mode on");
        config.log.level = "debug".to_string();
    }

    init_global_logging(&config.log, "collector.log");

    let runtime = init_runtime(None)?;
    runtime.block_on(async move {
        let builder = server::ServiceBuilder { config };
        let mut server = server::Server::default();
        if let Err(e) = builder.build_collector(&mut server) {
            error!("{}", e);
            return Err(io::Error::new(io::ErrorKind::Other, e.to_string()));
        }

        server.start().expect("VES collector start.");
        info!("serving vendor events");
        signal::block_waiting_ctrl_c().await;
        server.stop(false).await;

        println!("VES collector is stopped.");
        Ok(())
    })
}

fn parse_config(config_path: Option<impl AsRef<Path>>) -> config::Config {
    let global_config = if let Some(p) = config_path {
        println!("----------\nStart with configuration:");
        config::get_config(p).unwrap()
    } else {
        println!("----------\nStart with default configuration:");
        config::Config::default()
    };
    println!("{}----------", global_config.to_string_pretty());

    global_config
}

fn init_runtime(cores: Option<usize>) -> Result<Runtime, std::io::Error> {
    use tokio::runtime::Builder;
    match cores {
        None => Runtime::new(),
        Some(cores) => match cores {
            0 => Builder::new_multi_thread().enable_all().build(),
            _ => Builder::new_multi_thread()
                .enable_all()
                .worker_threads(cores)
                .build(),
        },
    }
}
