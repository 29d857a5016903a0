use anyhow::{Context, Result};
use clap::Parser;
use readalong::{create_router, AppState, Config, RemoteTranscriptSource};
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "readalong", about = "Read-along transcript service for testimony playback")]
struct Args {
    /// Config file (extension optional)
    #[arg(short, long, default_value = "config/readalong")]
    config: String,

    /// Override the HTTP port from the config file
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    info!("Readalong v{}", env!("CARGO_PKG_VERSION"));
    info!("Loaded config: {}", cfg.service.name);
    info!("Archive API: {}", cfg.source.api_base_url);

    let source = RemoteTranscriptSource::connect(&cfg.source).await?;
    let state = AppState::new(Arc::new(source), cfg.readalong.clone());
    state.spawn_reaper();
    let app = create_router(state);

    let port = args.port.unwrap_or(cfg.service.http.port);
    let addr = format!("{}:{}", cfg.service.http.bind, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .await
        .context("HTTP server failed")?;

    Ok(())
}
