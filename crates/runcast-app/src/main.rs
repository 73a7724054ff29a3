// Runcast command-line entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file; stdout carries JSON only)
// 2. Load config, copying defaults on first run
// 3. Open the weight database and seed it
// 4. Load the dataset (commands that project)
// 5. Run the command and print its result as JSON

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use runcast_baseball::{
    matchup_from_repository, project_from_repository, GameRequest, MatchupRequest,
};
use runcast_core::config::{self, Config};
use runcast_core::db::WeightDatabase;
use runcast_core::model::Hand;
use runcast_core::repository::{MemoryRepository, StatRepository};
use runcast_core::weights::WeightStore;

const DEFAULT_LOG_FILTER: &str = "runcast=info,warn";

#[derive(Parser)]
#[command(
    name = "runcast",
    about = "Runcast: lineup-level run projections for a pitching matchup"
)]
struct Cli {
    /// Directory holding config/ and defaults/.
    #[arg(long, default_value = ".")]
    base_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Project a game described by a JSON request file.
    Project {
        /// Path to a request with pitcher and lineup ids.
        request: PathBuf,
    },
    /// Break down a single batter-vs-pitcher matchup.
    Matchup {
        #[arg(long)]
        pitcher: String,
        #[arg(long)]
        hitter: String,
        /// Park factor (1.0 = neutral). Defaults to the configured value.
        #[arg(long)]
        park: Option<f64>,
        /// Pitcher throwing hand override (R or L).
        #[arg(long)]
        hand: Option<String>,
    },
    /// Inspect or adjust model weights.
    Weights {
        #[command(subcommand)]
        action: WeightsAction,
    },
    /// List teams with park factors.
    Teams,
}

#[derive(Subcommand)]
enum WeightsAction {
    /// Print every weight.
    List,
    /// Set one weight.
    Set { name: String, value: f64 },
    /// Restore the defaults with the config's [weights] overrides applied.
    Reset,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli.base_dir)?;
    info!("runcast starting up");

    let config = config::load_config(&cli.base_dir).context("failed to load configuration")?;
    let db_path = resolve(&cli.base_dir, Path::new(&config.database.path));
    let db = WeightDatabase::open(&db_path.to_string_lossy())
        .context("failed to open weight database")?;
    let weights = WeightStore::open(db, &config.seed_weights())
        .context("failed to load model weights")?;
    info!("Weight database opened at {}", db_path.display());

    match cli.command {
        Commands::Project { request } => {
            let repo = load_repository(&cli.base_dir, &config)?;
            let path = resolve(&cli.base_dir, &request);
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read request {}", path.display()))?;
            let request: GameRequest = serde_json::from_str(&text)
                .with_context(|| format!("failed to parse request {}", path.display()))?;
            let projection = project_from_repository(
                &repo,
                &weights,
                &request,
                config.projection.default_park_factor,
            );
            print_json(&projection)
        }
        Commands::Matchup {
            pitcher,
            hitter,
            park,
            hand,
        } => {
            let repo = load_repository(&cli.base_dir, &config)?;
            let pitcher_hand = match hand.as_deref() {
                Some(raw) => match Hand::from_code(raw) {
                    Some(hand) => Some(hand),
                    None => bail!("unrecognised hand {raw:?}; expected R or L"),
                },
                None => None,
            };
            let request = MatchupRequest {
                pitcher,
                hitter,
                park_factor: park,
                pitcher_hand,
                ..MatchupRequest::default()
            };
            let Some(breakdown) = matchup_from_repository(
                &repo,
                &weights,
                &request,
                config.projection.default_park_factor,
            ) else {
                bail!(
                    "pitcher {:?} or hitter {:?} not found in dataset",
                    request.pitcher,
                    request.hitter
                );
            };
            print_json(&breakdown)
        }
        Commands::Weights { action } => {
            match action {
                WeightsAction::List => {}
                WeightsAction::Set { name, value } => weights.update(&name, value)?,
                WeightsAction::Reset => weights.reset()?,
            }
            print_json(&weight_rows(&weights)?)
        }
        Commands::Teams => {
            let repo = load_repository(&cli.base_dir, &config)?;
            print_json(&repo.teams())
        }
    }
}

fn load_repository(base_dir: &Path, config: &Config) -> Result<MemoryRepository> {
    let path = resolve(base_dir, &config.data.dataset);
    MemoryRepository::load(&path).context("failed to load dataset")
}

/// Relative paths in config and arguments are taken from `base_dir`.
fn resolve(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() || path.as_os_str() == ":memory:" {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

/// One line of `weights list`.
#[derive(Debug, Serialize)]
struct WeightRow {
    name: &'static str,
    value: f64,
    /// Last write time; absent for stores without a database.
    updated_at: Option<String>,
}

fn weight_rows(store: &WeightStore) -> Result<Vec<WeightRow>> {
    let db = store.database();
    store
        .snapshot()
        .entries()
        .into_iter()
        .map(|(name, value)| -> Result<WeightRow> {
            let updated_at = match db {
                Some(db) => db.updated_at(name)?,
                None => None,
            };
            Ok(WeightRow {
                name,
                value,
                updated_at,
            })
        })
        .collect()
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{text}");
    Ok(())
}

/// Send logs to `logs/runcast.log` under `base_dir`; stdout carries only
/// command output. `RUST_LOG` overrides the default filter.
fn init_tracing(base_dir: &Path) -> Result<()> {
    let log_path = base_dir.join("logs").join("runcast.log");
    if let Some(dir) = log_path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open {}", log_path.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .try_init()
        .map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))
}
