use anyhow::{bail, Context, Result};
use clap::Parser;
use ebdue_rust::{
    sdk::catalog::{load_stations_csv, Catalog, HttpCatalogStore},
    sdk::config::PlannerConfig,
    sdk::export::{export, ExportFormat, ExportMetadata},
    sdk::model::{Coordinates, StartAddress},
    sdk::projection::{clipboard_text, summary},
    sdk::routing::{resolve_start_address, CachingProvider, NominatimGeocoder, RouteCache},
    sdk::selection::Selection,
    sdk::session::{recompute, shared, RouteView, WizardSession},
    sdk::aggregate::Aggregator,
    sdk::util::{
        log::init_logging,
        rate_limit::nominatim_limiter,
    },
};
use std::{fs, path::PathBuf, sync::Arc};

/// Plans routes from one start address to a set of police stations and
/// custom addresses, and exports the result.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Start address, e.g. "Taubenheimstraße 85, Stuttgart, 70372"
    #[arg(short, long)]
    start: String,

    /// Latitude of the start address (skips geocoding, needs --lng)
    #[arg(long, requires = "lng", allow_negative_numbers = true)]
    lat: Option<f64>,

    /// Longitude of the start address (needs --lat)
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lng: Option<f64>,

    /// Catalog snapshot (JSON). Missing files start an empty catalog.
    #[arg(long, default_value = "catalog.json")]
    catalog: PathBuf,

    /// [Optional] Stations CSV replacing the snapshot's stations
    #[arg(long)]
    stations_csv: Option<PathBuf>,

    /// [Optional] Base URL of the catalog service to refresh from
    #[arg(long)]
    catalog_url: Option<String>,

    /// Station id to route to (repeatable)
    #[arg(long = "station", value_name = "ID")]
    stations: Vec<String>,

    /// Custom address id to route to (repeatable)
    #[arg(long = "address", value_name = "ID")]
    addresses: Vec<String>,

    /// Headquarters id; selects it together with all its precincts (repeatable)
    #[arg(long = "praesidium", value_name = "ID")]
    praesidien: Vec<String>,

    /// Export format: xlsx, csv or txt
    #[arg(short, long, default_value = "xlsx")]
    format: ExportFormat,

    /// Output file (defaults to Police_Routes_<date>.<ext>)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Fuel price in EUR per litre
    #[arg(long)]
    fuel_price: Option<f64>,

    /// Consumption in litres per 100 km
    #[arg(long)]
    consumption: Option<f64>,

    /// Route cache file
    #[arg(long, default_value = "route_cache.json")]
    cache: PathBuf,

    /// Print the route list as plain lines for pasting
    #[arg(long)]
    copy: bool,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // --- 1. Configuration ---
    let mut config = PlannerConfig::from_env().context("Invalid configuration")?;
    if let Some(price) = cli.fuel_price {
        config.cost.fuel_price_eur_per_l = price;
    }
    if let Some(consumption) = cli.consumption {
        config.cost.consumption_l_per_100km = consumption;
    }

    // --- 2. Catalog ---
    let mut catalog = Catalog::load_from_file(&cli.catalog)
        .with_context(|| format!("Failed to load catalog {}", cli.catalog.display()))?;
    if let Some(csv_path) = &cli.stations_csv {
        catalog.stations = load_stations_csv(csv_path)
            .with_context(|| format!("Failed to import {}", csv_path.display()))?;
        log::info!("Imported {} stations from {}", catalog.stations.len(), csv_path.display());
    }
    if let Some(url) = &cli.catalog_url {
        let store = HttpCatalogStore::new(url.as_str())?;
        match catalog.refresh(&store).await {
            Ok(()) => catalog
                .save_to_file(&cli.catalog)
                .with_context(|| format!("Failed to save catalog {}", cli.catalog.display()))?,
            Err(e) => log::warn!("Catalog refresh failed, using cached snapshot: {}", e),
        }
    }

    // --- 3. Start address and selection ---
    let start = match (cli.lat, cli.lng) {
        (Some(lat), Some(lng)) => StartAddress::from_input(&cli.start, Coordinates::new(lat, lng), 100)?,
        _ => {
            let geocoder = NominatimGeocoder::new(nominatim_limiter())?;
            resolve_start_address(&geocoder, &cli.start).await?
        }
    };
    log::info!("Start: {} ({})", start.full_address, start.coordinates);

    let mut selection = Selection::new();
    for id in &cli.stations {
        if catalog.station(id).is_none() {
            log::warn!("Unknown station id: {}", id);
        }
        selection.select_station(id.as_str());
    }
    for id in &cli.addresses {
        if catalog.address(id).is_none() {
            log::warn!("Unknown address id: {}", id);
        }
        selection.select_address(id.as_str());
    }
    for id in &cli.praesidien {
        if selection.select_praesidium_with_reviere(&catalog, id) == 0 {
            log::warn!("Unknown headquarters id: {}", id);
        }
    }

    let mut session = WizardSession::new();
    session.set_start_address(start);
    session.set_selection(selection);
    let session = shared(session);

    // --- 4. Routing ---
    let route_cache = RouteCache::load_from_file(&cli.cache)
        .with_context(|| format!("Failed to load route cache {}", cli.cache.display()))?;
    let provider = Arc::new(CachingProvider::new(config.routing_provider()?, route_cache));
    let aggregator =
        Aggregator::new(provider.clone(), config.cost).with_max_concurrent(config.max_concurrent);

    let routes = match recompute(&session, &catalog, &aggregator).await {
        RouteView::Ready(routes) => routes,
        RouteView::NothingSelected => bail!("Nothing to route: select at least one known station or address"),
        RouteView::Failed(err) => return Err(err.into()),
        other => bail!("Unexpected session state: {:?}", other),
    };

    provider
        .save_to_file(&cli.cache)
        .with_context(|| format!("Failed to save route cache {}", cli.cache.display()))?;

    // --- 5. Output ---
    for failure in &routes.failures {
        log::warn!("Not routable: {} ({})", failure.name, failure.reason);
    }
    let totals = summary(&routes.results);
    for (label, value) in totals.lines() {
        log::info!("{}: {}", label, value);
    }

    let metadata = ExportMetadata::for_route_set(&routes, config.cost);
    let bytes = export(&routes.results, cli.format, &metadata)?;
    let output = cli
        .output
        .unwrap_or_else(|| PathBuf::from(cli.format.file_name(metadata.exported_at.date())));
    fs::write(&output, bytes).with_context(|| format!("Failed to write {}", output.display()))?;
    log::info!("Routes written to {}", output.display());

    if cli.copy {
        println!("{}", clipboard_text(&routes.results));
    }

    Ok(())
}
