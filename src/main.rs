use tenant_portal::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tenant_portal=debug")),
        )
        .init();

    let config = AppConfig::load()?;
    let stores = connect_stores(&config).await?;

    ServerBuilder::new()
        .with_config(config)
        .with_stores(stores)
        .serve()
        .await
}

#[cfg(feature = "mongodb_backend")]
async fn connect_stores(config: &AppConfig) -> Result<Stores> {
    let Some(url) = &config.database.url else {
        tracing::warn!("DATABASE_URL not set, using in-memory stores");
        return Ok(Stores::in_memory());
    };

    Ok(Stores::connect_mongodb(url, &config.database.name).await?)
}

#[cfg(not(feature = "mongodb_backend"))]
async fn connect_stores(config: &AppConfig) -> Result<Stores> {
    if config.database.url.is_some() {
        tracing::warn!("DATABASE_URL is set but the `mongodb_backend` feature is disabled");
    }
    tracing::info!("using in-memory stores");
    Ok(Stores::in_memory())
}
