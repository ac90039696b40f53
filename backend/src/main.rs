use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use locale_router::config::{Config, LoggingConfig};
use locale_router::{
    LocaleCatalog, LocaleNegotiator, LocaleState, RustI18nCatalog, handlers, set_tld_length,
};

#[derive(Parser, Debug)]
#[command(name = "locale-router", version, about = "Locale negotiation demo server")]
struct Args {
    /// Path to config.toml (default: conf/config.toml or ./config.toml)
    #[arg(short, long)]
    config: Option<String>,

    /// Override the listening port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let _log_guard = init_logging(&config.logging)?;

    set_tld_length(config.locale.tld_length)?;
    let locales = config.locale.locale_set()?;
    tracing::info!(
        "Serving locales {:?} (default {}), subdomain routing {}",
        locales.available().iter().map(ToString::to_string).collect::<Vec<_>>(),
        locales.default_locale(),
        if config.locale.subdomain_routing { "enabled" } else { "disabled" }
    );

    let catalog: Arc<dyn LocaleCatalog> = Arc::new(RustI18nCatalog::new(locales));
    let negotiator =
        LocaleNegotiator::new(catalog).with_subdomain_routing(config.locale.subdomain_routing);

    let app = handlers::router(LocaleState::new(negotiator)).layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

fn init_logging(config: &LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_new(&config.level)
        .with_context(|| format!("Invalid log level '{}'", config.level))?;

    let Some(file) = &config.file else {
        tracing_subscriber::registry().with(filter).with(fmt::layer()).init();
        return Ok(None);
    };

    let path = Path::new(file);
    let directory = path.parent().filter(|dir| !dir.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let file_name = path.file_name().with_context(|| format!("Invalid log file '{}'", file))?;

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::daily(directory, file_name));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .init();

    Ok(Some(guard))
}
