use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use schema_lifecycle::database::{DatabaseConn, SqlitePropertyStore, SqliteScriptRunner};
use schema_lifecycle::schema::{SchemaLifecycle, SchemaStrategy, VersionCatalog};
use schema_lifecycle::LifecycleConfig;
use serde_json::json;
use tracing::{info, Level};

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
struct Cli {
    /// configuration file path, by default $HOME/.schema-lifecycle/schema-lifecycle.toml is used
    #[clap(short, long)]
    config: Option<String>,

    /// Print debug information
    #[clap(long)]
    debug: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the configuration and the store's schema state
    Status {
        /// Output as JSON
        #[clap(long)]
        json: bool,
    },

    /// Create the schema, or check an existing one is at the current version
    Create,

    /// Drop the schema
    Drop,

    /// Create or upgrade the schema to the current version
    Update,

    /// Check the schema exists at the current version
    Validate,

    /// Run the configured strategy's startup and shutdown actions
    Apply {
        /// Strategy to use instead of the configured one
        #[clap(long)]
        strategy: Option<SchemaStrategy>,
    },
}

fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if cli.debug {
        tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .init();
    } else {
        tracing_subscriber::fmt().with_max_level(Level::WARN).init();
    }

    if let Err(e) = run(cli) {
        eprintln!("ERROR: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = LifecycleConfig::new(&cli.config)?;
    info!("using database {}", config.database_path);

    let db = DatabaseConn::open(Some(config.database_path.as_str()), config.busy_timeout_ms)
        .map_err(|e| anyhow!("Unable to open database {}: {}", config.database_path, e))?;
    let catalog = VersionCatalog::bundled()?;
    let store = SqlitePropertyStore::new(&db.conn);
    let runner =
        SqliteScriptRunner::new(&db.conn, config.script_source()).with_component(&config.component);
    let lifecycle = SchemaLifecycle::new(&catalog, &store, &store, &runner);

    match cli.command {
        Commands::Status { json } => {
            let state = lifecycle.state()?;
            let current = catalog.current_version().id();
            if json {
                let val = json!({
                    "database_path": config.database_path,
                    "scripts": config.script_source().describe(),
                    "strategy": config.strategy,
                    "current_version": current,
                    "state": state,
                });
                println!("{}", serde_json::to_string_pretty(&val)?);
            } else {
                println!("{}", config.summary());
                println!("Current Version:    {}", current);
                match state.resolved_version {
                    Some(v) => println!("Store Version:      {}", v),
                    None => println!("Store Version:      (schema not created)"),
                }
            }
        }
        Commands::Create => {
            lifecycle.create_schema()?;
            println!("schema is at version {}", catalog.current_version());
        }
        Commands::Drop => {
            lifecycle.drop_schema()?;
            println!("schema dropped");
        }
        Commands::Update => match lifecycle.update_schema()? {
            Some(feedback) => println!("{}", feedback),
            None => println!("schema is at version {}", catalog.current_version()),
        },
        Commands::Validate => {
            lifecycle.validate_schema()?;
            println!("schema is at version {}", catalog.current_version());
        }
        Commands::Apply { strategy } => {
            let strategy = strategy.unwrap_or(config.strategy);
            if let Some(feedback) = lifecycle.apply_startup(strategy)? {
                println!("{}", feedback);
            }
            lifecycle.apply_shutdown(strategy)?;
            println!("applied strategy {}", strategy);
        }
    }

    Ok(())
}
