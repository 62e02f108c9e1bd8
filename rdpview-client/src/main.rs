//! rdpview — headless remote desktop viewer.
//!
//! ```text
//! rdpview                          Connect with defaults
//! rdpview --config <path>          Use custom config TOML
//! rdpview --snapshot out.png       Write the framebuffer when the session ends
//! rdpview --gen-config             Dump default config and exit
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use rdpview_core::codec::default_kernel;
use rdpview_core::{
    FixedOrigin, FrameCompositor, Framebuffer, InputTranslator, PixelCodec, RawScancodes,
    ScanlineOrienter, Session, TcpLink,
};

use rdpview_client::config::ClientConfig;
use rdpview_client::snapshot;

// ── CLI ──────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "rdpview", about = "Headless remote desktop viewer")]
struct Cli {
    /// Path to configuration TOML file.
    #[arg(short, long, default_value = "rdpview.toml")]
    config: PathBuf,

    /// Gateway address (overrides config). Example: 127.0.0.1:9250
    #[arg(short, long)]
    gateway: Option<String>,

    /// Remote desktop host (overrides config).
    #[arg(short, long)]
    target: Option<String>,

    /// Username for the remote session (overrides config).
    #[arg(short, long)]
    username: Option<String>,

    /// Write a PNG of the framebuffer here when the session ends.
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Print the default configuration to stdout and exit.
    #[arg(long)]
    gen_config: bool,
}

// ── Main ─────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.gen_config {
        let text = toml::to_string_pretty(&ClientConfig::default())?;
        println!("{text}");
        return Ok(());
    }

    let mut config = ClientConfig::load(&cli.config);
    if let Some(addr) = cli.gateway {
        config.gateway.address = addr;
    }
    if let Some(host) = cli.target {
        config.target.host = host;
    }
    if let Some(user) = cli.username {
        config.target.username = user;
    }
    if let Some(path) = cli.snapshot {
        config.snapshot.path = path.to_string_lossy().into_owned();
    }

    // Init tracing.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("rdpview v{}", env!("CARGO_PKG_VERSION"));

    // ── 1. Connect to the gateway ───────────────────────────────

    let timeout = Duration::from_millis(config.gateway.timeout_ms);
    let link = TcpLink::connect(&config.gateway.address, timeout).await?;

    // ── 2. Build the session ────────────────────────────────────

    let compositor = FrameCompositor::new(
        Framebuffer::new(config.display.width, config.display.height),
        PixelCodec::new(default_kernel()).with_max_edge(config.codec.max_tile_edge),
        ScanlineOrienter::new(config.codec.orientation),
    );
    // No local surface: pointer coordinates are already surface-relative.
    let translator = InputTranslator::new(Box::new(FixedOrigin(0, 0)), Box::new(RawScancodes));

    let (damage_tx, mut damage_rx) = mpsc::unbounded_channel();
    let mut session = Session::new(link, compositor, translator)
        .on_complete(Box::new(|outcome| match outcome {
            None => info!("remote session closed"),
            Some(e) => error!("remote session failed: {e}"),
        }))
        .with_damage_sink(damage_tx);

    tokio::spawn(async move {
        while let Some(damage) = damage_rx.recv().await {
            debug!(
                "damage {}x{} at ({},{})",
                damage.width, damage.height, damage.x, damage.y
            );
        }
    });

    let mut stats_rx = session.stats_receiver();
    tokio::spawn(async move {
        while stats_rx.changed().await.is_ok() {
            let stats = stats_rx.borrow_and_update().clone();
            debug!(
                "{}: {} tiles applied, {} dropped, {} sent",
                stats.phase, stats.tiles_applied, stats.tiles_dropped, stats.messages_sent
            );
        }
    });

    // ── 3. Run until the link ends or Ctrl-C ────────────────────

    session.connect(config.connection_request()).await?;

    // Headless: nothing feeds input, but the channel stays open for the run.
    let (_input_tx, input_rx) = mpsc::channel(64);

    tokio::select! {
        stats = session.run(input_rx) => {
            info!(
                "done ({}): {} tiles applied, {} dropped",
                stats.phase, stats.tiles_applied, stats.tiles_dropped
            );
        }
        _ = tokio::signal::ctrl_c() => {
            warn!("interrupted");
        }
    }

    // ── 4. Snapshot ─────────────────────────────────────────────

    if let Some(path) = config.snapshot_path() {
        snapshot::write_png(session.compositor().framebuffer(), &path)?;
    }

    Ok(())
}
