use std::fs;
use std::path::Path;

use anyhow::Result;
use clap::Parser;

use livego::repositories::store::MemoryStore;
use livego::services;
use livego::settings::Settings;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "config.toml")]
    config: String,
    /// Overrides the listen address from the config file.
    #[arg(short, long)]
    listen: Option<String>,
    #[arg(long, default_value = "log4rs.yaml")]
    log4rs: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let args = Args::parse();
    let settings = Settings::load(&args.config).expect("Could not load config file.");

    init_logging(&args.log4rs).expect("Failed to initialize logging.");
    log::info!("Starting LiveGo server.");

    let store = MemoryStore::seeded(settings.economy);
    log::info!("Seeded store with {} users.", store.users.len());

    println!("[*] Starting services.");
    let state = services::start_services(store)
        .await
        .expect("Could not start services.");

    let addr = args
        .listen
        .unwrap_or_else(|| format!("{}:{}", settings.server.host, settings.server.port));

    println!("[*] Starting HTTP server.");
    services::http::start_http_server(state, &addr)
        .await
        .expect("Could not start HTTP server.");

    Ok(())
}

fn init_logging(path: &str) -> Result<(), anyhow::Error> {
    if !Path::new("logs").exists() {
        fs::create_dir("logs")?;
    }

    match log4rs::init_file(path, Default::default()) {
        Ok(_) => {
            println!("[*] Logging initialized successfully.");
            Ok(())
        }
        Err(e) => {
            println!("[ERROR] Failed to initialize logging: {}", e);
            Err(anyhow::anyhow!("Could not initialize logging: {}", e))
        }
    }
}
