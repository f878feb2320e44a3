use crate::config::credentials::Credentials;
use crate::core::aggregator;
use crate::core::assembler;
use crate::core::sampler::ColorSampler;
use crate::core::tagger::KeywordTagger;
use crate::domain::model::{ImageRequest, Moodboard};
use crate::domain::ports::{ConfigProvider, ImageSource};
use crate::utils::error::{MoodboardError, Result};
use crate::utils::validation;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Prompt → images → palette → keywords → moodboard.
pub struct MoodboardPipeline<I: ImageSource, C: ConfigProvider> {
    source: I,
    config: C,
    sampler: ColorSampler,
    tagger: KeywordTagger,
}

impl<I: ImageSource, C: ConfigProvider> MoodboardPipeline<I, C> {
    pub fn new(source: I, config: C) -> Self {
        Self::with_sampler(source, config, ColorSampler::default())
    }

    pub fn with_sampler(source: I, config: C, sampler: ColorSampler) -> Self {
        Self {
            source,
            config,
            sampler,
            tagger: KeywordTagger::new(),
        }
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    pub async fn generate(
        &self,
        prompt: &str,
        credentials: Option<&Credentials>,
    ) -> Result<Moodboard> {
        let prompt = validation::validate_prompt(prompt, self.config.max_prompt_length())?;
        let credentials = credentials.ok_or_else(|| {
            MoodboardError::configuration("image service credentials are not configured")
        })?;

        let request = ImageRequest {
            prompt: prompt.clone(),
            count: self.config.image_count(),
        };
        tracing::info!("🎨 Generating {} images for \"{}\"", request.count, prompt);
        let images = self.source.generate_images(&request, credentials).await?;
        if images.is_empty() {
            return Err(MoodboardError::validation("Failed to generate any images"));
        }
        tracing::info!("🖼️ Received {}/{} images", images.len(), request.count);

        let palette = aggregator::extract_palette(&self.sampler, &images).await;
        tracing::info!(
            "🎯 Palette: {} colors, dominant {}",
            palette.palette.len(),
            palette.dominant
        );

        let keywords = match self.config.keyword_seed() {
            Some(seed) => self
                .tagger
                .generate(&prompt, &palette, &mut StdRng::seed_from_u64(seed)),
            None => self.tagger.generate(&prompt, &palette, &mut rand::rng()),
        };
        tracing::info!("✨ Keywords: {}", keywords.join(", "));

        assembler::assemble(&prompt, images, palette, keywords)
    }
}
