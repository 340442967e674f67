use document_portal::services::mailer::{Mailer, MailerConfig};
use document_portal::{RelayState, create_relay_app};
use dotenvy::dotenv;
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "document_portal=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("🚀 Starting Email Relay...");

    let config = MailerConfig::from_env();
    info!(
        "📧 SMTP relay: {}:{} (from: {})",
        config.smtp_host, config.smtp_port, config.from_address
    );

    let mailer = Arc::new(Mailer::new(config)?);

    let app = create_relay_app(RelayState { mailer }).layer(TraceLayer::new_for_http());

    let port: u16 = env::var("RELAY_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    info!("✅ Relay ready at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("⌨️  Ctrl+C received, shutting down...");
        })
        .await?;

    info!("🛑 Relay shut down gracefully.");
    Ok(())
}
