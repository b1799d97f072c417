use anyhow::{Context, Result};
use clap::Parser;
use server::{build_app, AppConfig};
use std::net::SocketAddr;
use termstore_core::SledStore;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// sled database directory
    #[arg(long, default_value = "./termstore.db")]
    db: String,
    /// Key namespace; empty uses the library default
    #[arg(long, default_value = "")]
    namespace: String,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let store = SledStore::open(&args.db).with_context(|| format!("opening {}", args.db))?;
    let config = AppConfig {
        namespace: args.namespace,
        admin_token: std::env::var("ADMIN_TOKEN").ok(),
        cors_allow_origin: std::env::var("CORS_ALLOW_ORIGIN").ok(),
    };
    let app = build_app(store, config);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
