use crate::config::credentials::Credentials;
use crate::core::pipeline::MoodboardPipeline;
use crate::core::store::MoodboardStore;
use crate::domain::model::Moodboard;
use crate::domain::ports::{ConfigProvider, ImageSource, Storage};
use crate::utils::error::Result;

/// Runs the pipeline and saves the result.
pub struct MoodboardEngine<I: ImageSource, C: ConfigProvider, S: Storage> {
    pipeline: MoodboardPipeline<I, C>,
    store: MoodboardStore<S>,
    auto_save: bool,
}

impl<I: ImageSource, C: ConfigProvider, S: Storage> MoodboardEngine<I, C, S> {
    pub fn new(pipeline: MoodboardPipeline<I, C>, store: MoodboardStore<S>) -> Self {
        Self {
            pipeline,
            store,
            auto_save: true,
        }
    }

    pub fn with_auto_save(mut self, auto_save: bool) -> Self {
        self.auto_save = auto_save;
        self
    }

    pub fn store(&self) -> &MoodboardStore<S> {
        &self.store
    }

    /// A failed save is logged; the generated moodboard is still returned.
    pub async fn run(&self, prompt: &str, credentials: Option<&Credentials>) -> Result<Moodboard> {
        tracing::info!("Starting moodboard generation");

        let moodboard = self.pipeline.generate(prompt, credentials).await?;

        if self.auto_save {
            match self.store.save(&moodboard) {
                Ok(()) => tracing::info!("💾 Saved moodboard {}", moodboard.id),
                Err(e) => {
                    tracing::warn!("Failed to save moodboard {}: {}", moodboard.id, e);
                    tracing::warn!("💡 {}", e.recovery_suggestion());
                }
            }
        } else {
            tracing::debug!("Auto-save disabled, not persisting {}", moodboard.id);
        }

        Ok(moodboard)
    }
}
