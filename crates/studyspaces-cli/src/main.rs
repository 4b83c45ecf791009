mod fetch;
mod render;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use studyspaces_core::{
    load_facilities, Coordinates, DistanceFormula, EnrichmentPipeline, SortOption, StatusFilter,
};
use studyspaces_geocode::GoogleGeocoder;
use tracing_subscriber::EnvFilter;

use crate::fetch::{fetch_buildings, BuildingsClient};

#[derive(Debug, Parser)]
#[command(name = "studyspaces")]
#[command(about = "Find open study spaces near you")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch the list from a running server and print it
    List {
        /// Server base URL
        #[arg(long, env = "STUDYSPACES_SERVER_URL", default_value = "http://localhost:3002")]
        server: String,
        /// Bearer token for the buildings endpoint
        #[arg(long, env = "STUDYSPACES_API_TOKEN", hide_env_values = true)]
        token: Option<String>,
        /// Retries after a failed fetch
        #[arg(long, default_value_t = 2)]
        retries: u32,
        /// Delay between fetch attempts, in milliseconds
        #[arg(long, default_value_t = 1_000)]
        retry_delay_ms: u64,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Enrich a local data file without a server
    Enrich {
        /// Facility data file; defaults to `STUDYSPACES_DATA_PATH`
        #[arg(long)]
        data: Option<PathBuf>,
        /// Print the enriched list as JSON instead of cards
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Distance in kilometers between two points
    Distance {
        #[arg(allow_negative_numbers = true)]
        from_lat: f64,
        #[arg(allow_negative_numbers = true)]
        from_lng: f64,
        #[arg(allow_negative_numbers = true)]
        to_lat: f64,
        #[arg(allow_negative_numbers = true)]
        to_lng: f64,
        /// `vincenty` or `spherical`
        #[arg(long, default_value = "vincenty")]
        formula: DistanceFormula,
    },
}

/// Location, ordering and filtering shared by `list` and `enrich`.
#[derive(Debug, Args)]
struct ViewArgs {
    /// Your latitude
    #[arg(long, requires = "lng", allow_negative_numbers = true)]
    lat: Option<f64>,
    /// Your longitude
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lng: Option<f64>,
    /// closest, furthest, highest-rated or name
    #[arg(long, default_value = "closest")]
    sort: SortOption,
    /// all, open or closed
    #[arg(long, default_value = "all")]
    filter: StatusFilter,
}

impl ViewArgs {
    fn user_location(&self) -> anyhow::Result<Option<Coordinates>> {
        let (Some(lat), Some(lng)) = (self.lat, self.lng) else {
            return Ok(None);
        };
        let coords = Coordinates::new(lat, lng);
        if !coords.is_valid() {
            anyhow::bail!("{coords} is not a valid latitude/longitude");
        }
        Ok(Some(coords))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::List {
            server,
            token,
            retries,
            retry_delay_ms,
            view,
        } => run_list(&server, token, retries, retry_delay_ms, &view).await,
        Commands::Enrich { data, json, view } => run_enrich(data, json, &view).await,
        Commands::Distance {
            from_lat,
            from_lng,
            to_lat,
            to_lng,
            formula,
        } => {
            let km = formula.distance_km(
                Coordinates::new(from_lat, from_lng),
                Coordinates::new(to_lat, to_lng),
            )?;
            println!("{km:.3} km ({formula})");
            Ok(())
        }
    }
}

async fn run_list(
    server: &str,
    token: Option<String>,
    retries: u32,
    retry_delay_ms: u64,
    view: &ViewArgs,
) -> anyhow::Result<()> {
    let user = view.user_location()?;
    let client = BuildingsClient::new(server, token, 30)?;
    let facilities = fetch_buildings(
        &client,
        user,
        retries,
        Duration::from_millis(retry_delay_ms),
    )
    .await;

    let now = chrono::Local::now().naive_local();
    let shown = render::prepare(&facilities, user, now, view.sort, view.filter);
    print!("{}", render::render_list(&shown, now, view.sort, view.filter));
    Ok(())
}

async fn run_enrich(data: Option<PathBuf>, json: bool, view: &ViewArgs) -> anyhow::Result<()> {
    let config = studyspaces_core::load_app_config()?;
    let user = view.user_location()?;
    let path = data.unwrap_or_else(|| config.data_path.clone());

    let records = load_facilities(&path)?;
    let pipeline = EnrichmentPipeline::from_config(GoogleGeocoder::from_config(&config)?, &config);
    let now = chrono::Local::now().naive_local();
    let enriched = pipeline.enrich(&records, user, now).await;
    tracing::info!(path = %path.display(), count = enriched.len(), "enriched data file");

    let shown = studyspaces_core::filter_facilities(
        &studyspaces_core::sort_facilities(&enriched, view.sort),
        view.filter,
    );
    if json {
        println!("{}", serde_json::to_string_pretty(&shown)?);
    } else {
        print!("{}", render::render_list(&shown, now, view.sort, view.filter));
    }
    Ok(())
}

#[cfg(test)]
mod tests;
