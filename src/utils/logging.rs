use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber.
///
/// Honours `RUST_LOG`, falling back to `info`. Calling it twice is harmless.
pub fn init_logger() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// Log database connection details without credentials
pub fn log_database_connection_details(url: &str) {
    let shown = match url.find('@') {
        Some(at) => match url.find("://") {
            Some(scheme) => format!("{}://***{}", &url[..scheme], &url[at..]),
            None => "***".to_string(),
        },
        None => url.to_string(),
    };
    tracing::info!("Database connection details: {}", shown);
}
