use std::sync::Arc;

use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use devicelock::clock::SystemClock;
use devicelock::config::Config;
use devicelock::crypto::IssuerKeys;
use devicelock::db::{AppState, create_pool, init_db};
use devicelock::registry::DeviceRegistry;
use devicelock::service::LicenseService;
use devicelock::store::{LicenseStore, MemoryLicenseStore, SqliteLicenseStore};

#[derive(Parser, Debug)]
#[command(name = "devicelock")]
#[command(about = "Time-bounded licenses bound to a small set of devices")]
struct Cli {
    /// Keep licenses in memory only (dev mode only, nothing survives a restart)
    #[arg(long)]
    ephemeral: bool,

    /// Mint a license, print its activation link and exit
    #[arg(long)]
    issue: bool,

    /// Plan length in days (for --issue)
    #[arg(long, requires = "issue", default_value_t = 10)]
    days: i64,

    /// Source reference to bind the license to (for --issue). Defaults to a
    /// fresh admin marker, so repeated runs mint distinct licenses.
    #[arg(long, requires = "issue")]
    source_ref: Option<String>,
}

fn build_store(config: &Config, ephemeral: bool) -> Arc<dyn LicenseStore> {
    if ephemeral {
        tracing::info!("EPHEMERAL MODE: licenses are kept in memory only");
        return Arc::new(MemoryLicenseStore::new());
    }

    let pool = create_pool(&config.database_path).expect("Failed to create database pool");
    {
        let conn = pool.get().expect("Failed to get connection");
        init_db(&conn).expect("Failed to initialize database");
    }
    tracing::info!("Using database: {}", config.database_path);

    Arc::new(SqliteLicenseStore::new(pool))
}

/// Mint a license from the command line, for comps and support cases.
fn issue_from_cli(state: &AppState, days: i64, source_ref: Option<String>) {
    let source_ref = source_ref.unwrap_or_else(|| format!("admin:{}", uuid::Uuid::new_v4()));

    let issued = match state.service.create_license(&source_ref, days) {
        Ok(issued) => issued,
        Err(e) => {
            eprintln!("Failed to issue license: {}", e);
            std::process::exit(1);
        }
    };

    println!();
    if issued.created {
        println!("License issued");
    } else {
        println!("License already exists for {}", source_ref);
    }
    println!("  license_id: {}", issued.license.id);
    println!("  source_ref: {}", issued.license.source_ref);
    println!("  expires_at: {}", issued.license.expires_at);
    println!("  activation_url: {}", state.activation_url(&issued.license.id));
    println!();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "devicelock=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env();

    if config.dev_mode {
        tracing::info!("Running in DEVELOPMENT mode");
    }

    let ephemeral = if cli.ephemeral && !config.dev_mode {
        tracing::warn!("--ephemeral flag ignored: not in dev mode (set DEVICELOCK_ENV=dev)");
        false
    } else {
        cli.ephemeral
    };

    let store = build_store(&config, ephemeral);
    let service = LicenseService::new(
        store,
        Arc::new(SystemClock),
        DeviceRegistry::new(config.max_devices),
    );

    let state = AppState {
        service: Arc::new(service),
        base_url: config.base_url.clone(),
        content_url: config.content_url.clone(),
        issuer_keys: IssuerKeys::new(&config.issuer_api_keys),
    };

    if cli.issue {
        issue_from_cli(&state, cli.days, cli.source_ref);
        return;
    }

    if state.issuer_keys.is_empty() {
        tracing::warn!("No ISSUER_API_KEYS configured: issue endpoints are disabled");
    } else {
        tracing::info!(
            "Issue endpoints enabled for {} key(s)",
            state.issuer_keys.len()
        );
    }

    let app = devicelock::app(state).layer(TraceLayer::new_for_http());

    // Start the server
    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!(
        "devicelock listening on {} (max {} devices per license)",
        addr,
        config.max_devices
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Failed to start server");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}
