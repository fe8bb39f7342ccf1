//! AppStorage Migrator CLI - consolidate legacy per-app storage documents

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;
use appstorage_migrator::account::AccountFilter;
use appstorage_migrator::config::{self, Profile};
use appstorage_migrator::fixture::{self, Fixture};
use appstorage_migrator::iter::IterOptions;
use appstorage_migrator::ui::{self, RunProgress};
use appstorage_migrator::{MergeEngine, MigrationStore, Migrator, ObjectId, SqliteStore};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "appstorage-migrator")]
#[command(version)]
#[command(about = "Consolidate per-application storage documents into one record per account")]
#[command(long_about = r#"
Reads every account's appStorage relationships, merges the linked legacy
app storages and writes one combined app storage per account. Safe to run
repeatedly: keys already present in a combined record are never overwritten.

Example usage:
  appstorage-migrator -c prod run --skip 0 --limit 1000
  appstorage-migrator import --file accounts.json
  appstorage-migrator show --account 50c4a3fe6b33139354000159
"#)]
struct Cli {
    /// Debug mode
    #[arg(short, long, global = true)]
    debug: bool,

    /// Configuration profile from the config file
    #[arg(short = 'c', long, global = true, default_value = config::DEFAULT_PROFILE)]
    profile: String,

    /// Path to the config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// No colour or progress spinner
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Migrate accounts
    Run {
        /// Number of accounts to skip
        #[arg(short, long, default_value = "0")]
        skip: usize,

        /// Maximum number of accounts to process
        #[arg(short, long, default_value = "1000")]
        limit: usize,

        /// Only migrate these account ids
        #[arg(long = "account")]
        accounts: Vec<String>,

        /// Merge and report without writing
        #[arg(long)]
        dry_run: bool,

        /// Print one line per account
        #[arg(short, long)]
        verbose: bool,
    },

    /// Seed the store from a JSON fixture
    Import {
        /// Fixture file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Show document counts
    Stats,

    /// Print the combined app storage of an account
    Show {
        /// Account id
        #[arg(short, long)]
        account: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    appstorage_migrator::output::set_quiet(cli.quiet);

    // Initialize logging
    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    if let Err(e) = run(cli) {
        tracing::error!("{:#}", e);
        ui::error(&format!("{:#}", e));
        return Err(e);
    }
    Ok(())
}

fn run(cli: Cli) -> anyhow::Result<()> {
    if cli.profile.is_empty() {
        anyhow::bail!("Please specify profile via -c. Aborting.");
    }

    let loaded = config::load_config(cli.config.as_deref())?;
    let profile = config::select_profile(loaded.as_ref(), &cli.profile)?;
    let store = open_store(&profile)?;

    match cli.command {
        Commands::Run { skip, limit, accounts, dry_run, verbose } => {
            let ids = accounts
                .iter()
                .map(String::as_str)
                .map(ObjectId::parse)
                .collect::<appstorage_migrator::Result<Vec<_>>>()?;

            let options = IterOptions {
                filter: AccountFilter::by_ids(ids),
                skip,
                limit,
                page_size: profile.page_size(),
            };

            ui::header("AppStorage migration");
            ui::info("Profile", &cli.profile);
            ui::info("Database", &profile.database);
            ui::info("Window", &format!("skip {}, limit {}", skip, limit));
            if dry_run {
                ui::warn("Dry run: nothing will be written");
            }

            tracing::info!("worker started");
            let start = Instant::now();
            let progress = RunProgress::new(limit);
            let denylist = profile.denylist();
            tracing::debug!("{} app ids denylisted", denylist.len());
            let migrator = Migrator::new(&store, MergeEngine::new(denylist)).dry_run(dry_run);

            let stats = migrator.run_with(&options, |account, outcome| {
                progress.account(&account.nickname);
                if verbose {
                    progress.suspend(|| ui::outcome(&account.nickname, outcome));
                }
            })?;

            progress.finish(start.elapsed(), stats.visited);
            ui::section("Summary");
            println!("{}", ui::migration_stats_table(&stats));
            tracing::info!("worker finished");
        }

        Commands::Import { file } => {
            let fixture = Fixture::load(&file)?;
            if fixture.is_empty() {
                ui::warn(&format!("Nothing to import from {}", file.display()));
                return Ok(());
            }
            let start = Instant::now();
            let imported = fixture::import_fixture(&store, &fixture)?;
            ui::success(&format!("Imported {} documents from {}", imported, file.display()));
            ui::timing(&format!("{:.2?}", start.elapsed()));
        }

        Commands::Stats => {
            let stats = store.stats()?;
            ui::section(&format!("Statistics ({})", profile.database));
            println!("{}", ui::db_stats_table(&stats));
        }

        Commands::Show { account } => {
            let id = ObjectId::parse(&account)?;
            match store.get_account(id)? {
                Some(found) => ui::info("Account", &found.nickname),
                None => ui::warn(&format!("Account {} does not exist", id)),
            }
            match store.find_combined_by_account_id(id)?.into_option() {
                Some(doc) => println!("{}", serde_json::to_string_pretty(&doc)?),
                None => ui::warn(&format!("No combined app storage for account {}", id)),
            }
        }
    }

    Ok(())
}

fn open_store(profile: &Profile) -> anyhow::Result<SqliteStore> {
    let path = profile.database_path();
    config::ensure_db_dir(&path)?;
    tracing::debug!("Opening database {}", path.display());
    Ok(SqliteStore::open(&path)?)
}
