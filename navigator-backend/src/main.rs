use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

mod ai;
mod config;
mod controllers;
mod crew;
mod db;
mod deploy;
mod errors;
mod jobs;
mod models;
mod tools;

use config::{Config, JobStoreKind, SAMPLE_ADDRESS};
use crew::{executor_from_config, AgentRoster, Crew};
use db::Database;
use jobs::{InMemoryJobStore, JobRunner, JobStore};
use models::ServiceType;

pub struct AppState {
    pub store: Arc<dyn JobStore>,
    pub runner: JobRunner,
}

#[derive(Parser)]
#[command(name = "navigator-backend", version, about = "Cardano Career Navigator agent service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the job API
    #[command(alias = "api")]
    Serve,
    /// Run one request through the crew and print the result
    Run {
        #[arg(long = "type", default_value = "assessment")]
        service_type: ServiceType,
        #[arg(long, default_value = SAMPLE_ADDRESS)]
        address: String,
        #[arg(long)]
        timeline: Option<String>,
    },
    /// Check the crew offline and write container and hosting platform files
    Deploy {
        /// Docker build context; defaults to the enclosing workspace root
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
}

fn to_io<E: std::fmt::Display>(context: &str) -> impl Fn(E) -> io::Error + '_ {
    move |e| io::Error::other(format!("{}: {}", context, e))
}

fn build_crew(config: &Config) -> io::Result<Crew> {
    let roster = AgentRoster::load(&config.config_dir).map_err(to_io("Failed to load agent roster"))?;
    let registry = Arc::new(tools::create_default_registry());
    log::info!("[TOOLS] Registered {} tools: {:?}", registry.len(), registry.names());

    let executor = executor_from_config(config).map_err(to_io("Failed to create task executor"))?;
    let crew = Crew::new(roster, registry, executor, config.agent_id.clone());
    crew.validate().map_err(to_io("Invalid agent roster"))?;
    Ok(crew)
}

fn build_store(config: &Config) -> io::Result<Arc<dyn JobStore>> {
    match config.job_store {
        JobStoreKind::Memory => {
            log::info!("[JOBS] Using in-memory job store");
            Ok(Arc::new(InMemoryJobStore::new()))
        }
        JobStoreKind::Sqlite => {
            log::info!("[JOBS] Using SQLite job store at {}", config.database_url);
            let db = Database::new(&config.database_url).map_err(to_io("Failed to initialize database"))?;
            let store: Arc<dyn JobStore> = Arc::new(db);
            log::info!("[JOBS] {} existing jobs on record", store.len());
            Ok(store)
        }
    }
}

async fn serve(config: Config) -> io::Result<()> {
    let store = build_store(&config)?;
    let crew = Arc::new(build_crew(&config)?);
    let runner = JobRunner::new(Arc::clone(&store), Arc::clone(&crew));

    log::info!(
        "Starting {} on {}:{} ({} executor, {} network)",
        config.agent_id,
        config.host,
        config.port,
        crew.executor_name(),
        config.cardano_network
    );

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(AppState {
                store: Arc::clone(&store),
                runner: runner.clone(),
            }))
            .wrap(Logger::default())
            .wrap(cors)
            .configure(controllers::agent_info::config)
            .configure(controllers::jobs::config)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}

async fn run_once(
    config: Config,
    service_type: ServiceType,
    address: String,
    timeline: Option<String>,
) -> io::Result<()> {
    let crew = build_crew(&config)?;
    log::info!("Testing Cardano Career Navigator ({} for {})", service_type, address);

    let result = crew
        .process_request(service_type, &address, timeline)
        .await
        .map_err(to_io("Crew failed"))?;

    let rendered = serde_json::to_string_pretty(&result).map_err(to_io("Failed to encode result"))?;
    println!("{}", rendered);
    Ok(())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let config = Config::from_env().map_err(to_io("Invalid configuration"))?;

    match cli.command {
        Some(Command::Serve) => serve(config).await,
        Some(Command::Run {
            service_type,
            address,
            timeline,
        }) => run_once(config, service_type, address, timeline).await,
        Some(Command::Deploy { out_dir }) => {
            let out_dir = match out_dir {
                Some(dir) => dir,
                None => {
                    let cwd = std::env::current_dir()?;
                    deploy::find_workspace_root(&cwd).unwrap_or(cwd)
                }
            };
            let report = deploy::prepare(&config, &out_dir)
                .await
                .map_err(to_io("Deployment failed"))?;
            for warning in &report.warnings {
                println!("Warning: {}", warning);
            }
            for check in &report.checks {
                println!("Preflight: {}", check);
            }
            println!("Generated {} files in {}:", report.files.len(), out_dir.display());
            for file in &report.files {
                println!("- {}", file.display());
            }
            Ok(())
        }
        None => run_once(config, ServiceType::Assessment, SAMPLE_ADDRESS.to_string(), None).await,
    }
}
