use clap::Parser;
use moodboard_gen::app::{display, export, share};
use moodboard_gen::domain::ports::ConfigProvider;
use moodboard_gen::utils::{logger, validation::Validate};
use moodboard_gen::{
    AppConfig, BedrockImageSource, CliConfig, Command, Credentials, LocalStorage,
    MoodboardEngine, MoodboardError, MoodboardPipeline, MoodboardStore,
};
use std::io::IsTerminal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::debug!("CLI config: {:?}", cli);

    if let Err(e) = run(&cli).await {
        tracing::error!(
            "❌ {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

        std::process::exit(e.exit_code());
    }

    Ok(())
}

async fn run(cli: &CliConfig) -> moodboard_gen::Result<()> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);
    config.validate()?;

    let store = MoodboardStore::new(
        LocalStorage::new(config.storage_path().to_string()),
        config.storage_key().to_string(),
    );

    match &cli.command {
        Command::Generate {
            prompt, no_save, ..
        } => {
            let credentials = Credentials::resolve(&config).await?;
            let source = BedrockImageSource::new(config.image_source.clone())?;
            let pipeline = MoodboardPipeline::new(source, config);
            let engine = MoodboardEngine::new(pipeline, store).with_auto_save(!no_save);

            let moodboard = engine.run(prompt, credentials.as_ref()).await?;
            println!("{}", display::render_summary(&moodboard, use_color()));
        }
        Command::List => {
            let moodboards = store.list_recent();
            if moodboards.is_empty() {
                println!("No saved moodboards yet");
            }
            for moodboard in &moodboards {
                println!("{}", display::render_list_entry(moodboard));
            }
        }
        Command::Show { id } => {
            let moodboard = find(&store, id)?;
            println!("{}", display::render_summary(&moodboard, use_color()));
        }
        Command::Delete { id } => {
            store.delete(id)?;
            println!("🗑️ Deleted {}", id);
        }
        Command::Clear => {
            store.clear()?;
            println!("🗑️ Cleared all saved moodboards");
        }
        Command::Export { id, out, bundle } => {
            let moodboard = find(&store, id)?;
            let path = if *bundle {
                export::write_bundle(&moodboard, out)?
            } else {
                export::write_export(&moodboard, out)?
            };
            println!("📁 Exported to: {}", path.display());
        }
        Command::Share { id } => {
            let moodboard = find(&store, id)?;
            println!("{}", share::share_text(&moodboard));
        }
        Command::Examples => print!("{}", display::render_examples()),
    }

    Ok(())
}

fn find(
    store: &MoodboardStore<LocalStorage>,
    id: &str,
) -> moodboard_gen::Result<moodboard_gen::Moodboard> {
    store
        .find(id)
        .ok_or_else(|| MoodboardError::validation(format!("No saved moodboard with id '{}'", id)))
}

fn use_color() -> bool {
    std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}
