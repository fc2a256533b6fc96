use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use parcel_score::parcel::{
    Classification, Destination, Parcel, ParcelFile, ParcelPatch, ParcelStore,
};
use parcel_score::routing::{OrsClient, TravelTracker};
use parcel_score::scoring::ScoringConfig;

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_NETWORK: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum Commands {
    /// List parcels sorted by score (default if no subcommand)
    List {
        /// Only parcels in this neighborhood
        #[arg(short, long)]
        neighborhood: Option<String>,
    },
    /// Recompute and store the score of every parcel
    Score,
    /// Refresh travel times to every destination, then rescore
    Travel {
        /// Print the results without writing the data file
        #[arg(long)]
        no_save: bool,
    },
    /// Show one parcel with its score breakdown
    Show {
        id: u64,
    },
    /// Clear stored travel baselines of a parcel
    ResetBaseline {
        id: u64,
    },
    /// Open driving directions from a parcel in the browser
    Route {
        id: u64,
        /// office, marina_parents or marista (defaults to office)
        destination: Option<String>,
    },
    /// Change fields of a parcel and rescore it
    Edit {
        id: u64,
        #[arg(long)]
        price: Option<f64>,
        #[arg(long)]
        area: Option<f64>,
        /// Google Maps link (coordinates are re-read from it)
        #[arg(long)]
        link: Option<String>,
        #[arg(long)]
        neighborhood: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        safety: Option<String>,
        #[arg(long)]
        shape: Option<String>,
    },
    /// Delete a parcel
    Remove {
        id: u64,
    },
    /// Collection statistics
    Stats,
    /// Add a parcel
    Add {
        /// Total asking price
        #[arg(long)]
        price: f64,
        /// Area in square meters
        #[arg(long)]
        area: f64,
        /// Google Maps link (coordinates are read from it)
        #[arg(long)]
        link: Option<String>,
        #[arg(long)]
        neighborhood: Option<String>,
        /// Location label (e.g. otimo, bom, longe, alaga)
        #[arg(long)]
        location: Option<String>,
        /// Safety label (e.g. boa, ok, perigoso)
        #[arg(long)]
        safety: Option<String>,
        /// Shape label (e.g. otimo, bom, estreito em l)
        #[arg(long)]
        shape: Option<String>,
    },
}

#[derive(Parser, Debug)]
#[command(name = "parcel-score")]
#[command(about = "Land parcel scoring and travel-time tracking CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/parcel-score/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Path to parcel data file (overrides data_file from config)
    #[arg(short, long, global = true)]
    data: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn init_tracing(verbose: bool) {
    let log_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn exit_with(code: i32, message: impl std::fmt::Display) -> ! {
    eprintln!("{}", message);
    std::process::exit(code);
}

fn save(path: &Path, data: &mut ParcelFile, store: &ParcelStore) {
    data.parcels = store.all().to_vec();
    if let Err(e) = parcel_score::parcel::save_parcels(path, data) {
        exit_with(EXIT_CONFIG, format!("Data error: {:#}", e));
    }
}

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for rustls 0.23+)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let command = cli
        .command
        .unwrap_or(Commands::List { neighborhood: None });
    let start_time = Instant::now();

    // Load config
    let config_path = cli.config.map(PathBuf::from);
    let config = match parcel_score::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => exit_with(EXIT_CONFIG, format!("Config error: {:#}", e)),
    };

    // Validate scoring config at startup
    let scoring: ScoringConfig = config.scoring.clone().unwrap_or_default();
    if let Err(errors) = parcel_score::scoring::validate_scoring(&scoring) {
        eprintln!("Scoring config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let data_path = cli.data.map(PathBuf::from).unwrap_or_else(|| config.data_path());
    let mut data = match parcel_score::parcel::load_parcels(&data_path) {
        Ok(d) => d,
        Err(e) => exit_with(EXIT_CONFIG, format!("Data error: {:#}", e)),
    };
    tracing::debug!(
        path = %data_path.display(),
        parcels = data.parcels.len(),
        "loaded parcel data"
    );
    let mut store = ParcelStore::new(std::mem::take(&mut data.parcels));

    match command {
        Commands::List { neighborhood } => {
            let selected: Vec<&Parcel> = match neighborhood {
                Some(ref name) => {
                    let found = store.in_neighborhood(name);
                    if found.is_empty() {
                        let known = store.neighborhoods();
                        let known = if known.is_empty() {
                            "none".to_string()
                        } else {
                            known.join(", ")
                        };
                        exit_with(
                            EXIT_CONFIG,
                            format!("No parcels in neighborhood '{}'. Known: {}", name, known),
                        );
                    }
                    found
                }
                None => store.all().iter().collect(),
            };
            let results: Vec<_> = selected
                .into_iter()
                .map(|p| (p, parcel_score::scoring::calculate_score(p, &scoring)))
                .collect();
            let mut scored: Vec<parcel_score::output::ScoredParcel> = results
                .iter()
                .map(|(parcel, result)| parcel_score::output::ScoredParcel {
                    parcel,
                    score: result.score,
                    incomplete: result.incomplete,
                })
                .collect();
            parcel_score::output::sort_scored(&mut scored);

            let use_colors = parcel_score::output::should_use_colors();
            println!(
                "{}",
                parcel_score::output::format_scored_table(&scored, use_colors)
            );

            if cli.verbose {
                eprintln!();
                eprintln!("Total: {} parcels in {:?}", scored.len(), start_time.elapsed());
            }
        }
        Commands::Score => {
            let count = parcel_score::batch::score_all(store.all_mut(), &scoring);
            save(&data_path, &mut data, &store);
            println!("Scored {} parcels.", count);
        }
        Commands::Travel { no_save } => {
            let routing = config.routing();
            let Some(api_key) = routing.resolve_api_key() else {
                exit_with(
                    EXIT_CONFIG,
                    format!(
                        "No routing API key. Set {} or routing.api_key in the config file.",
                        parcel_score::config::ENV_API_KEY_VAR
                    ),
                );
            };
            let delay = match routing.lookup_delay() {
                Ok(d) => d,
                Err(e) => exit_with(EXIT_CONFIG, format!("Config error: {:#}", e)),
            };

            let mut client = OrsClient::new(api_key);
            if let Some(ref base_url) = routing.base_url {
                client = client.with_base_url(base_url.as_str());
            }
            if let Some(ref profile) = routing.profile {
                client = client.with_profile(profile.as_str());
            }
            if let Some(retries) = routing.retries {
                client = client.with_retries(retries);
            }

            let mut tracker = TravelTracker::new(client);
            let report =
                parcel_score::batch::refresh_travel_times(store.all_mut(), &mut tracker, delay)
                    .await;
            parcel_score::batch::score_all(store.all_mut(), &scoring);

            if !no_save {
                save(&data_path, &mut data, &store);
            }

            println!("{}", parcel_score::output::format_refresh_report(&report));

            if cli.verbose {
                eprintln!(
                    "Cache: {} entries, {} hits, {} misses in {:?}",
                    tracker.cache().len(),
                    tracker.cache().hits(),
                    tracker.cache().misses(),
                    start_time.elapsed()
                );
            }

            if report.all_failed() {
                exit_with(
                    EXIT_NETWORK,
                    "All travel lookups failed. Check your network connection and API key.",
                );
            }
        }
        Commands::Show { id } => {
            let Some(parcel) = store.get(id) else {
                exit_with(EXIT_CONFIG, format!("Parcel {} not found.", id));
            };
            let result = parcel_score::scoring::calculate_score(parcel, &scoring);
            let use_colors = parcel_score::output::should_use_colors();
            println!(
                "{}",
                parcel_score::output::format_parcel_detail(parcel, &result, use_colors)
            );
        }
        Commands::ResetBaseline { id } => {
            let Some(parcel) = store.get_mut(id) else {
                exit_with(EXIT_CONFIG, format!("Parcel {} not found.", id));
            };
            parcel.reset_baselines();
            save(&data_path, &mut data, &store);
            println!("Baselines cleared for parcel #{}.", id);
        }
        Commands::Route { id, destination } => {
            let destination = match destination.as_deref().map(Destination::parse) {
                None => Destination::Office,
                Some(Ok(d)) => d,
                Some(Err(e)) => exit_with(EXIT_CONFIG, e),
            };
            let Some(parcel) = store.get(id) else {
                exit_with(EXIT_CONFIG, format!("Parcel {} not found.", id));
            };
            let url = match parcel_score::browser::route_url(parcel, destination) {
                Ok(u) => u,
                Err(e) => exit_with(EXIT_CONFIG, e),
            };

            // Open in browser
            if let Err(e) = parcel_score::browser::open_url(&url) {
                exit_with(EXIT_NETWORK, format!("Failed to open browser: {}", e));
            }

            println!("Opening route to {} in browser: {}", destination, url);
        }
        Commands::Edit {
            id,
            price,
            area,
            link,
            neighborhood,
            location,
            safety,
            shape,
        } => {
            let patch = ParcelPatch {
                neighborhood,
                maps_link: link,
                coordinates: None,
                price,
                area_m2: area,
                location,
                safety,
                shape,
            };
            if patch.is_empty() {
                exit_with(EXIT_CONFIG, "Nothing to change. Pass at least one field flag.");
            }

            match store.update(id, patch) {
                Ok(true) => {}
                Ok(false) => exit_with(EXIT_CONFIG, format!("Parcel {} not found.", id)),
                Err(e) => exit_with(EXIT_CONFIG, format!("Invalid parcel: {:#}", e)),
            }
            let score = store.rescore(id, &scoring);
            save(&data_path, &mut data, &store);

            match score {
                Some(result) => println!(
                    "Updated parcel #{} (score {}).",
                    id,
                    parcel_score::output::format_score(Some(result.score), result.incomplete)
                ),
                None => println!("Updated parcel #{}.", id),
            }
        }
        Commands::Remove { id } => {
            if !store.remove(id) {
                exit_with(EXIT_CONFIG, format!("Parcel {} not found.", id));
            }
            save(&data_path, &mut data, &store);
            println!("Removed parcel #{}.", id);
        }
        Commands::Stats => {
            println!("{}", parcel_score::output::format_stats(&store.stats()));
        }
        Commands::Add {
            price,
            area,
            link,
            neighborhood,
            location,
            safety,
            shape,
        } => {
            let mut parcel = Parcel::new(0);
            parcel.neighborhood = neighborhood;
            parcel.maps_link = link;
            parcel.price = Some(price);
            parcel.area_m2 = Some(area);
            parcel.classification = Classification {
                location,
                safety,
                shape,
            };

            let id = match store.add(parcel) {
                Ok(id) => id,
                Err(e) => exit_with(EXIT_CONFIG, format!("Invalid parcel: {:#}", e)),
            };
            let score = store.rescore(id, &scoring);
            save(&data_path, &mut data, &store);

            match score {
                Some(result) => println!(
                    "Added parcel #{} (score {}).",
                    id,
                    parcel_score::output::format_score(Some(result.score), result.incomplete)
                ),
                None => println!("Added parcel #{}.", id),
            }
        }
    }

    std::process::exit(EXIT_SUCCESS);
}
