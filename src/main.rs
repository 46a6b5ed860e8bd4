use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use serde_json::json;
use tracing::info;
use wavebridge::bridge::method;
use wavebridge::{Bridge, Config, MicBackend, RodioPlayback};

#[derive(Parser, Debug)]
#[command(name = "wavebridge", about = "Audio session bridge")]
struct Args {
    /// Config file name (without extension)
    #[arg(long, default_value = "config/wavebridge")]
    config: String,

    /// Optional audio file to prepare and probe at startup
    #[arg(long)]
    fixture: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let cfg = match Config::load(&args.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            info!("no config loaded ({e:#}), using defaults");
            Config::default()
        }
    };

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));
    info!("recordings directory: {}", cfg.audio.recordings_path);

    let mut bridge = Bridge::new(
        Arc::new(RodioPlayback::new()),
        Box::new(MicBackend::new()),
        None,
        PathBuf::from(&cfg.audio.recordings_path),
    )
    .with_poll_interval(Duration::from_millis(cfg.audio.poll_interval_ms));

    if let Some(fixture) = &args.fixture {
        let key = "fixture";
        bridge
            .dispatch(
                method::PREPARE_PLAYER,
                json!({ "playerKey": key, "path": fixture.display().to_string() }),
            )
            .await?;
        let duration = bridge
            .dispatch(method::GET_DURATION, json!({ "playerKey": key, "durationType": 1 }))
            .await?;
        info!("fixture duration: {}ms", duration);
        bridge
            .dispatch(method::RELEASE_PLAYER, json!({ "playerKey": key }))
            .await?;
    } else {
        info!("no fixture given; bridge ready");
    }

    Ok(())
}
