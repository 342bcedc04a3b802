use std::time::Duration;

use axum::Router;
use clap::Parser;
use roomcast::config::{RelayConfig, DEFAULT_HISTORY_LIMIT, DEFAULT_OUTBOUND_BUFFER};
use roomcast::AxumRelay;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "roomcast")]
#[command(about = "Room-scoped websocket chat relay")]
#[command(version)]
struct Cli {
    /// Address to bind to
    #[arg(long, env = "ROOMCAST_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "ROOMCAST_PORT", default_value_t = 8090)]
    port: u16,

    /// Chat messages kept per room for late joiners
    #[arg(long, env = "ROOMCAST_HISTORY_LIMIT", default_value_t = DEFAULT_HISTORY_LIMIT)]
    history_limit: usize,

    /// Envelopes queued per connection before new ones are dropped
    #[arg(long, env = "ROOMCAST_OUTBOUND_BUFFER", default_value_t = DEFAULT_OUTBOUND_BUFFER)]
    outbound_buffer: usize,

    /// Upper bound on a single socket write, in milliseconds
    #[arg(long, env = "ROOMCAST_SEND_TIMEOUT_MS", default_value_t = 5000)]
    send_timeout_ms: u64,

    /// Reject creating existing rooms and joining unknown ones with create=false
    #[arg(long, env = "ROOMCAST_STRICT_CREATE")]
    strict_create: bool,
}

impl Cli {
    fn relay_config(&self) -> RelayConfig {
        RelayConfig::default()
            .with_history_limit(self.history_limit)
            .with_outbound_buffer(self.outbound_buffer)
            .with_send_timeout(Duration::from_millis(self.send_timeout_ms))
            .with_strict_create(self.strict_create)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roomcast=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = cli.relay_config();
    info!(?config, "relay configured");

    let relay = AxumRelay::new(config);
    let app = relay.attach_router("/", Router::new());

    let addr = format!("{}:{}", cli.host, cli.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Chat server listening on ws://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
