//! viproxy command line tool
//!
//! Listens on one address family and forwards every connection to the other.
//!
//! ```text
//! IN_ADDR=127.0.0.1:8080 OUT_ADDR=3:8080 viproxy
//! viproxy --config-file viproxy.json
//! ```

use std::path::PathBuf;

use clap::Parser;
use log::{error, info};

use viproxy::{Proxy, VERSION, APP_NAME};
use viproxy::common::{init_logger, Result};
use viproxy::config::{ProxyConfig, ENV_CONFIG_FILE, ENV_IN_ADDR, ENV_LOG_LEVEL, ENV_OUT_ADDR};

/// viproxy: point-to-point TCP proxy between AF_INET and AF_VSOCK
#[derive(Parser, Debug)]
#[clap(author, version = VERSION, about, long_about = None)]
struct Args {
    /// Address to listen on (host:port or cid:port)
    #[clap(long, env = ENV_IN_ADDR)]
    in_addr: Option<String>,

    /// Address to forward to (host:port or cid:port)
    #[clap(long, env = ENV_OUT_ADDR)]
    out_addr: Option<String>,

    /// JSON configuration file with additional forwarding pairs
    #[clap(short, long, env = ENV_CONFIG_FILE)]
    config_file: Option<PathBuf>,

    /// Log level (info when not given)
    #[clap(long, env = ENV_LOG_LEVEL)]
    log_level: Option<String>,
}

/// Build the configuration from the file (if any) and the command line
fn load_config(args: &Args) -> Result<ProxyConfig> {
    let mut config = ProxyConfig::default();

    if let Some(path) = &args.config_file {
        config = config.merge(ProxyConfig::from_file(path)?);
    }

    let cmd_config = ProxyConfig::from_args(
        args.in_addr.as_deref(),
        args.out_addr.as_deref(),
        args.log_level.as_deref(),
    )?;

    Ok(config.merge(cmd_config))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(&args)?;
    init_logger(config.effective_log_level());

    info!("Starting {} v{}", APP_NAME, VERSION);

    let pairs = config.validate()?;
    for pair in &pairs {
        info!("Forwarding {}", pair);
    }

    let mut proxy = Proxy::with_log_sink(pairs);
    if let Err(e) = proxy.start().await {
        error!("Failed to start proxy: {}", e);
        return Err(e);
    }

    info!("Proxy service ready, press Ctrl+C to stop");

    tokio::select! {
        result = tokio::signal::ctrl_c() => match result {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Unable to listen for Ctrl+C: {}", e);
                proxy.wait().await;
            }
        },
        _ = proxy.wait() => info!("All accept loops ended"),
    }

    Ok(())
}
