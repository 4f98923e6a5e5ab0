use clap::{Parser, Subcommand};
use serde_json::json;
use whatsapp_lib::envelope::Outcome;

#[derive(Parser)]
#[command(name = "whatsapp-service")]
#[command(about = "WhatsApp messaging service (Twilio)", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Create the configuration directory and a default config file.
    Init {
        /// Config file path (default: WHATSAPP_SERVICE_CONFIG_PATH or ~/.whatsapp-service/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,
    },

    /// Serve the send-whatsapp and get-whatsapp-messages tools over HTTP.
    Serve {
        /// Config file path (default: WHATSAPP_SERVICE_CONFIG_PATH or ~/.whatsapp-service/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// HTTP port (default from config or 2022)
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Send one WhatsApp message and print the result envelope.
    Send {
        /// Config file path (default: WHATSAPP_SERVICE_CONFIG_PATH or ~/.whatsapp-service/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// Recipient in E.164 format (e.g. +15551234567)
        #[arg(long)]
        to: String,

        /// Message text
        #[arg(long, short)]
        message: String,
    },

    /// List WhatsApp messages and print the result envelope.
    Messages {
        /// Config file path (default: WHATSAPP_SERVICE_CONFIG_PATH or ~/.whatsapp-service/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// Maximum number of messages (default 10)
        #[arg(long, short, allow_negative_numbers = true)]
        limit: Option<i64>,

        /// Only messages sent from this number
        #[arg(long)]
        from: Option<String>,

        /// Only messages sent to this number
        #[arg(long)]
        to: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("whatsapp-service {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Init { config }) => {
            if let Err(e) = run_init(config) {
                log::error!("init failed: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Serve { config, port }) => {
            if let Err(e) = run_serve(config, port).await {
                log::error!("service failed: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Send {
            config,
            to,
            message,
        }) => {
            let args = json!({ "recipient": to, "body": message });
            exit_with(run_tool(config, "send-whatsapp", args).await);
        }
        Some(Commands::Messages {
            config,
            limit,
            from,
            to,
        }) => {
            let args = json!({ "limit": limit, "senderFilter": from, "recipientFilter": to });
            exit_with(run_tool(config, "get-whatsapp-messages", args).await);
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

fn run_init(config_path: Option<std::path::PathBuf>) -> anyhow::Result<()> {
    let path = config_path.unwrap_or_else(whatsapp_lib::config::default_config_path);
    let dir = whatsapp_lib::init::init_config_dir(&path)?;
    println!("initialized configuration at {}", dir.display());
    Ok(())
}

async fn run_serve(
    config_path: Option<std::path::PathBuf>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let (mut config, _path) = whatsapp_lib::config::load_config(config_path)?;
    if let Some(p) = port {
        config.service.port = p;
    }
    log::info!(
        "starting service on {}:{}",
        config.service.bind,
        config.service.port
    );
    whatsapp_lib::service::run_service(config).await
}

/// Run one tool in-process and print its envelope. Returns whether it succeeded.
async fn run_tool(
    config_path: Option<std::path::PathBuf>,
    tool: &str,
    args: serde_json::Value,
) -> anyhow::Result<bool> {
    let (config, _path) = whatsapp_lib::config::load_config(config_path)?;
    let registry = whatsapp_lib::service::build_registry(&config);
    let result = registry
        .execute(tool, args)
        .await
        .map_err(anyhow::Error::msg)?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(result.outcome == Outcome::Success)
}

fn exit_with(result: anyhow::Result<bool>) {
    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    }
}
