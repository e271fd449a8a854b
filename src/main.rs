use anki_vision::agent::CardGeneratorAgent;
use anki_vision::batch::BatchRunner;
use anki_vision::cli::Args;
use anki_vision::config::Config;
use anyhow::Result;
use clap::Parser;
use std::path::Path;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let args = Args::parse();
    let config = args.load_config();

    // Initialize logging; RUST_LOG wins over the configured level
    let level = config
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(|_| "info".to_string());
    init_logging(&level);
    log::info!("Starting anki-vision...");

    let result = match config {
        Ok(config) => run(config).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        log::error!("Unhandled error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(level: &str) {
    let mut builder = pretty_env_logger::formatted_builder();
    match std::env::var("RUST_LOG") {
        Ok(filters) => builder.parse_filters(&filters),
        Err(_) => builder.parse_filters(level),
    };
    builder.init();
}

async fn run(config: Config) -> Result<()> {
    log::info!(
        "Configuration loaded: deck \"{}\", model {} at {}, Anki at {}",
        config.anki.deck_name,
        config.ai_model.model,
        config.ai_model.endpoint,
        config.anki.endpoint
    );

    let agent = CardGeneratorAgent::from_config(&config);
    let runner = BatchRunner::new(agent);
    runner.run(Path::new(&config.input.images_dir)).await?;

    Ok(())
}
