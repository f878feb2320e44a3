use crate::config::toml_config::AppConfig;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "moodboard-gen")]
#[command(about = "Turn a short prompt into an AI moodboard: images, palette and keywords")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the directory where moodboards are stored
    #[arg(long, global = true)]
    pub store_path: Option<String>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Generate a moodboard from a prompt
    Generate {
        prompt: String,

        /// Number of images to request
        #[arg(long)]
        count: Option<usize>,

        /// Seed for the keyword backfill
        #[arg(long)]
        seed: Option<u64>,

        /// Do not save the result
        #[arg(long)]
        no_save: bool,
    },
    /// List saved moodboards, newest first
    List,
    /// Show one saved moodboard
    Show { id: String },
    /// Delete a saved moodboard
    Delete { id: String },
    /// Delete every saved moodboard
    Clear,
    /// Export a moodboard as JSON, or as a zip bundle with its images
    Export {
        id: String,

        #[arg(long, default_value = ".")]
        out: PathBuf,

        #[arg(long)]
        bundle: bool,
    },
    /// Print a shareable text summary
    Share { id: String },
    /// Show example prompts
    Examples,
}

impl CliConfig {
    /// Applies command-line overrides on top of the file configuration.
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(path) = &self.store_path {
            tracing::info!("🔧 Storage path overridden to: {}", path);
            config.storage.path = path.clone();
        }

        if let Command::Generate { count, seed, .. } = &self.command {
            if let Some(count) = count {
                config.image_source.image_count = *count;
            }
            if seed.is_some() {
                config.generation.keyword_seed = *seed;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_generate_with_overrides() {
        let cli = CliConfig::parse_from([
            "moodboard-gen",
            "--store-path",
            "/tmp/boards",
            "generate",
            "cozy rustic living room",
            "--count",
            "2",
            "--seed",
            "7",
        ]);

        let mut config = AppConfig::default();
        cli.apply_overrides(&mut config);

        assert_eq!(config.storage.path, "/tmp/boards");
        assert_eq!(config.image_source.image_count, 2);
        assert_eq!(config.generation.keyword_seed, Some(7));
        assert!(matches!(cli.command, Command::Generate { no_save: false, .. }));
    }

    #[test]
    fn test_parse_examples() {
        let cli = CliConfig::parse_from(["moodboard-gen", "examples"]);
        assert!(matches!(cli.command, Command::Examples));
    }

    #[test]
    fn test_parse_export_defaults() {
        let cli = CliConfig::parse_from(["moodboard-gen", "export", "m1", "--bundle"]);
        match cli.command {
            Command::Export { id, out, bundle } => {
                assert_eq!(id, "m1");
                assert_eq!(out, PathBuf::from("."));
                assert!(bundle);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
