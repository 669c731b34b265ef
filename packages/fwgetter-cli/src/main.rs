use clap::{Parser, Subcommand};
use fwgetter_core::{FirmwareConfig, FirmwareQuery, FirmwareService};
use fwgetter_provider::StaticReleaseProvider;
use fwgetter_rpc::FirmwareRpcServer;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Parser)]
#[command(name = "fwgetter")]
#[command(about = "Firmware update lookup for Omi devices")]
struct Cli {
    /// JSON config file; environment variables are used when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP / JSON-RPC server
    Serve {
        /// Listen address, overrides the configured one
        #[arg(long)]
        addr: Option<SocketAddr>,
    },
    /// Look up the update for one device
    Check {
        /// Model name the device reports
        device_model: String,
        /// Firmware revision the device runs
        firmware_revision: String,
        #[arg(long, default_value = "")]
        hardware_revision: String,
        #[arg(long, default_value = "")]
        manufacturer_name: String,
        /// Saved GitHub release listing to use instead of the API
        #[arg(long)]
        releases_file: Option<PathBuf>,
        /// Print every eligible release tag instead of the answer
        #[arg(long)]
        all: bool,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<FirmwareConfig, BoxError> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "Loading configuration");
            Ok(FirmwareConfig::from_file(path)?)
        }
        None => Ok(FirmwareConfig::from_env()),
    }
}

async fn serve(config: &FirmwareConfig, addr: Option<SocketAddr>) -> Result<(), BoxError> {
    let addr = match addr {
        Some(addr) => addr,
        None => config.listen_addr.parse()?,
    };
    let listener = TcpListener::bind(addr).await?;
    let server = FirmwareRpcServer::new(Arc::new(FirmwareService::from_config(config)));
    server
        .serve_with_shutdown(listener, async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
}

#[tokio::main]
async fn main() -> Result<ExitCode, BoxError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fwgetter=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Serve { addr } => {
            serve(&config, addr).await?;
        }
        Commands::Check {
            device_model,
            firmware_revision,
            hardware_revision,
            manufacturer_name,
            releases_file,
            all,
        } => {
            let service = match releases_file {
                Some(path) => FirmwareService::new(
                    Arc::new(StaticReleaseProvider::from_file(&path).await?),
                    config.cache_key.clone(),
                ),
                None => FirmwareService::from_config(&config),
            };
            let query = FirmwareQuery::new(device_model, firmware_revision)
                .with_hardware_revision(hardware_revision)
                .with_manufacturer_name(manufacturer_name);

            if all {
                match service.candidate_tags(&query).await {
                    Ok(tags) => {
                        for tag in tags {
                            println!("{}", tag);
                        }
                    }
                    Err(e) => {
                        eprintln!("{}", e);
                        return Ok(ExitCode::FAILURE);
                    }
                }
            } else {
                match service.latest_firmware(&query).await {
                    Ok(answer) => println!("{}", serde_json::to_string_pretty(&answer)?),
                    Err(e) => {
                        eprintln!("{}", e);
                        return Ok(ExitCode::FAILURE);
                    }
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
