//! loregate - command-line interface to the content gateway.
//!
//! Drives a locally configured gateway and prints its answers as JSON.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;

use loregate::{ContentCategory, Gateway, GatewayConfig, GatewayError, ParamValue};

/// Loregate content gateway
#[derive(Parser)]
#[command(name = "loregate")]
#[command(version = loregate::PKG_VERSION)]
#[command(about = "Resilient gateway for generated game content")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long, env = "LOREGATE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate content for a category
    Generate {
        /// Content category (npc, quest, monster, item, room)
        category: ContentCategory,
        /// Template parameter as key=value (repeatable)
        #[arg(short, long = "param", value_parser = parse_param)]
        params: Vec<(String, ParamValue)>,
    },

    /// Print the fallback content for a category
    Fallback {
        /// Content category (npc, quest, monster, item, room)
        category: String,
    },

    /// Report gateway status, including backend reachability
    Status,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialise tracing (default: info for loregate; override with RUST_LOG).
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("loregate=info")),
        )
        .init();

    let args = Args::parse();

    // Commands that don't require a gateway
    if let Command::Fallback { category } = &args.command {
        let body = loregate::FallbackProvider::new().fallback_by_name(category);
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    let config = GatewayConfig::load(args.config.as_deref())?;
    info!(version = loregate::PKG_VERSION, endpoint = %config.backend_endpoint, "loregate starting");
    let gateway = Gateway::init(config)?;

    let outcome = run(&gateway, args.command).await;
    gateway.shutdown().await;
    outcome
}

async fn run(gateway: &Gateway, command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Generate { category, params } => {
            let content = gateway.generate(category, params).await?;
            println!("{}", serde_json::to_string_pretty(&content)?);
        }

        Command::Status => {
            let status = gateway.status().await;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }

        Command::Fallback { .. } => unreachable!("handled before the gateway starts"),
    }
    Ok(())
}

/// Parse a `key=value` parameter, inferring the value's type.
fn parse_param(raw: &str) -> Result<(String, ParamValue), GatewayError> {
    let (key, value) = raw.split_once('=').ok_or_else(|| {
        GatewayError::Configuration(format!("parameter `{raw}` is not in key=value form"))
    })?;
    let key = key.trim();
    if key.is_empty() {
        return Err(GatewayError::Configuration(format!(
            "parameter `{raw}` has an empty name"
        )));
    }
    Ok((key.to_string(), ParamValue::infer(value)))
}
