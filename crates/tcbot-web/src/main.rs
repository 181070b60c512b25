use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use tcbot_core::telemetry::{init_tracing, level_for};
use tcbot_web::{router, AppState};

#[derive(Parser, Debug)]
#[command(name = "tcbot-web")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Serve the tcbot consumer page", long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(long, env = "BOT_WEB_BIND", default_value = "127.0.0.1:5000")]
    bind: SocketAddr,

    /// Directory served under /static (where `tcbot dump` writes consumed.json)
    #[arg(long, env = "BOT_WEB_STATIC", default_value = "static")]
    static_dir: PathBuf,

    /// Enable debug output
    #[arg(long, env = "BOT_DEBUG")]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(false, level_for(args.debug));

    let app = router(AppState::default(), &args.static_dir);
    let listener = TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("Failed to bind {}", args.bind))?;

    info!(addr = %args.bind, static_dir = %args.static_dir.display(), "serving consumer page");
    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
