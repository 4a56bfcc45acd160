use tracing_subscriber::EnvFilter;

use typerace_server::{ServerError, TypeRaceServer};

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let addr =
        std::env::var("TYPERACE_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    let server = TypeRaceServer::builder().bind(&addr).build().await?;
    if let Ok(local) = server.local_addr() {
        tracing::info!(addr = %local, "typerace server ready");
    }
    server.run().await
}
