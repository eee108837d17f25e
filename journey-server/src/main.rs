use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use journey_server::config::AppConfig;
use journey_server::geocode::NominatimClient;
use journey_server::tfl::TflClient;
use journey_server::web::{AppState, create_router};

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;

    let tfl = TflClient::new(config.tfl())?;
    let geocoder = NominatimClient::new(config.nominatim())?;

    let state = AppState::new(tfl, geocoder);
    let app = create_router(state, &config.static_dir);

    let addr = config.bind_addr;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("London Journey Planner listening on http://{addr}");
    info!("Endpoints:");
    info!("  GET  /                   - Journey form");
    info!("  GET  /health             - Health check");
    info!("  GET  /about              - About page");
    info!("  GET  /api/places/search  - Location suggestions");
    info!("  GET  /journey/plan       - Plan a journey");

    axum::serve(listener, app).await?;
    Ok(())
}
