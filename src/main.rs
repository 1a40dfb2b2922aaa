// Wallet sync command line entry point

mod commands;

use clap::{Parser, Subcommand, ValueEnum};

use wallet_sync::config::AppConfig;
use wallet_sync::utils::logging;
use wallet_sync::Wallet;

/// Mixin wallet local sync CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Command to execute
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        /// Number of migrations to run (all if not specified)
        #[arg(short, long)]
        steps: Option<u32>,
    },
    /// Pull remote data into the local store
    Sync {
        #[command(subcommand)]
        target: SyncTarget,
    },
    /// List local assets
    Assets {
        /// Leave out hidden assets
        #[arg(long)]
        hide_hidden: bool,
        /// Leave out assets worth one USD or less
        #[arg(long)]
        hide_small: bool,
        #[arg(long, value_enum, default_value_t = SortArg::Amount)]
        sort: SortArg,
        #[arg(short, long)]
        limit: Option<u64>,
    },
    /// Show one local asset
    Asset { asset_id: String },
    /// Page through an asset's history, syncing each page
    Snapshots {
        asset_id: String,
        /// Pages to load
        #[arg(short, long, default_value_t = 1)]
        pages: u32,
        /// Snapshots per page
        #[arg(short, long)]
        limit: Option<u64>,
    },
    /// Show one snapshot, syncing it first
    Snapshot { snapshot_id: String },
    /// Search assets remotely and list local matches
    Search { query: String },
    /// List the network's top assets
    Top,
    /// Hide an asset from filtered lists
    Hide {
        asset_id: String,
        /// Show the asset again instead
        #[arg(long)]
        undo: bool,
    },
    /// Show an asset's price, optionally at an RFC 3339 time
    Ticker {
        asset_id: String,
        #[arg(long)]
        at: Option<String>,
    },
}

#[derive(Subcommand)]
enum SyncTarget {
    /// Every held asset plus exchange rates
    Assets,
    /// One asset plus exchange rates
    Asset { asset_id: String },
    /// One page of an asset's history
    Snapshots {
        asset_id: String,
        /// `created_at` of the last snapshot already loaded
        #[arg(long)]
        offset: Option<String>,
        #[arg(short, long)]
        limit: Option<u64>,
    },
    /// One snapshot with its asset and users
    Snapshot { snapshot_id: String },
    /// The signed-in user's profile
    Profile,
    /// The network's top assets
    Top,
    /// Remote asset search results
    Search { query: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Amount,
    Increase,
    Decrease,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_logger();

    let cli = Cli::parse();
    let config = AppConfig::from_env();
    tracing::debug!("Configuration loaded");

    if let Commands::Migrate { steps } = cli.command {
        return commands::migrate::execute(&config, steps).await;
    }

    let wallet = Wallet::connect(&config).await?;
    let limit = config.sync.snapshot_page_limit;

    match cli.command {
        Commands::Migrate { .. } => {}
        Commands::Sync { target } => commands::sync::execute(&wallet, target, limit).await?,
        Commands::Assets {
            hide_hidden,
            hide_small,
            sort,
            limit,
        } => commands::read::assets(&wallet, hide_hidden, hide_small, sort, limit).await?,
        Commands::Asset { asset_id } => commands::read::asset(&wallet, &asset_id).await?,
        Commands::Snapshots {
            asset_id,
            pages,
            limit: page_limit,
        } => {
            commands::read::snapshots(&wallet, &asset_id, pages, page_limit.unwrap_or(limit))
                .await?
        }
        Commands::Snapshot { snapshot_id } => {
            commands::read::snapshot(&wallet, &snapshot_id).await?
        }
        Commands::Search { query } => commands::read::search(&wallet, &query).await?,
        Commands::Top => commands::read::top(&wallet).await?,
        Commands::Hide { asset_id, undo } => {
            wallet.sync().set_asset_hidden(&asset_id, !undo).await?;
            commands::read::asset(&wallet, &asset_id).await?
        }
        Commands::Ticker { asset_id, at } => commands::read::ticker(&wallet, &asset_id, at).await?,
    }

    Ok(())
}
