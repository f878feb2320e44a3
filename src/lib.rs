pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::{CliConfig, Command};

pub use adapters::{BedrockImageSource, LocalStorage};
pub use config::{AppConfig, Credentials};
pub use core::{
    engine::MoodboardEngine, pipeline::MoodboardPipeline, store::MoodboardStore,
    tagger::KeywordTagger,
};
pub use domain::model::{Color, ColorPalette, GeneratedImage, Moodboard, SampledColors};
pub use utils::error::{MoodboardError, Result};
