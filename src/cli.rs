use clap::Parser;
use std::path::PathBuf;

use crate::config::Config;

pub const DEFAULT_CONFIG: &str = "config.toml";

#[derive(Parser, Debug)]
#[command(name = "anki-vision")]
#[command(about = "Turn photos of foreign-language text into Anki flashcards", long_about = None)]
pub struct Args {
    /// Path to the TOML config file (defaults to ./config.toml if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory to scan for images
    #[arg(short, long)]
    pub input_dir: Option<PathBuf>,

    /// Ollama model to use
    #[arg(short, long)]
    pub model: Option<String>,

    /// Target Anki deck
    #[arg(short, long)]
    pub deck: Option<String>,
}

impl Args {
    /// Load the config file and layer command-line overrides on top.
    pub fn load_config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path, true)?,
            None => Config::load(DEFAULT_CONFIG, false)?,
        };
        self.apply(&mut config);
        Ok(config)
    }

    fn apply(&self, config: &mut Config) {
        if let Some(dir) = &self.input_dir {
            config.input.images_dir = dir.to_string_lossy().to_string();
        }
        if let Some(model) = &self.model {
            config.ai_model.model = model.clone();
        }
        if let Some(deck) = &self.deck {
            config.anki.deck_name = deck.clone();
        }
    }
}
