use crate::core::sampler::ColorSampler;
use crate::domain::model::{Color, ColorPalette, GeneratedImage, SampledColors};
use std::collections::HashSet;

pub const AGGREGATE_PALETTE_SIZE: usize = 8;

/// Merges per-image colors into one palette.
///
/// Colors are deduplicated by hex with the first occurrence winning, and the
/// result is capped at eight entries. The first surviving color becomes the
/// dominant; with no input the dominant is black and the palette empty.
pub fn aggregate<I>(samples: I) -> ColorPalette
where
    I: IntoIterator<Item = SampledColors>,
{
    let mut seen = HashSet::new();
    let mut palette: Vec<Color> = Vec::with_capacity(AGGREGATE_PALETTE_SIZE);

    for sample in samples {
        for color in sample.colors() {
            if palette.len() == AGGREGATE_PALETTE_SIZE {
                break;
            }
            if seen.insert(color.to_hex()) {
                palette.push(color);
            }
        }
    }

    match palette.first().copied() {
        Some(dominant) => ColorPalette { dominant, palette },
        None => ColorPalette::empty(),
    }
}

/// Samples each image in order and aggregates whatever succeeded.
///
/// Images that fail to load or quantize are logged and skipped.
pub async fn extract_palette(sampler: &ColorSampler, images: &[GeneratedImage]) -> ColorPalette {
    let mut samples = Vec::with_capacity(images.len());

    for image in images {
        match sampler.sample(image).await {
            Ok(colors) => samples.push(colors),
            Err(e) => {
                tracing::warn!("Failed to extract colors from image {}: {}", image.id, e);
            }
        }
    }

    tracing::debug!(
        "Aggregating colors from {}/{} images",
        samples.len(),
        images.len()
    );
    aggregate(samples)
}
