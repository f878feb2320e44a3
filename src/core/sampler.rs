//! Color sampling for a single image.
//!
//! Pixels are sampled on a fixed stride and clustered with seeded k-means, so
//! the same image always yields the same colors.

use crate::domain::model::{Color, GeneratedImage, SampledColors};
use crate::utils::error::{MoodboardError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::DynamicImage;
use kmeans_colors::get_kmeans;
use palette::Srgb;
use reqwest::Client;
use std::cmp::Reverse;
use std::collections::HashSet;

/// Every n-th pixel is sampled.
const SAMPLE_STRIDE: usize = 10;
const MIN_ALPHA: u8 = 125;
const NEAR_WHITE: u8 = 250;
const DOMINANT_COLORS: usize = 5;
pub const SINGLE_IMAGE_PALETTE_SIZE: usize = 6;
const KMEANS_MAX_ITER: usize = 20;
const KMEANS_CONVERGE: f32 = 0.0025;
const KMEANS_SEED: u64 = 0;

/// Resolves an image reference to decoded pixels.
#[derive(Debug, Clone, Default)]
pub struct ImageLoader {
    client: Client,
}

impl ImageLoader {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn load(&self, image: &GeneratedImage) -> Result<DynamicImage> {
        let bytes = self.fetch_bytes(image).await?;
        image::load_from_memory(&bytes).map_err(|e| load_error(image, e))
    }

    async fn fetch_bytes(&self, image: &GeneratedImage) -> Result<Vec<u8>> {
        if !image.base64.is_empty() {
            return decode_base64(image, &image.base64);
        }

        let url = image.url.as_str();
        if let Some(rest) = url.strip_prefix("data:") {
            let (meta, payload) = rest
                .split_once(',')
                .ok_or_else(|| load_error(image, "malformed data URL"))?;
            if !meta.ends_with(";base64") {
                return Err(load_error(image, "only base64 data URLs are supported"));
            }
            return decode_base64(image, payload);
        }

        if url.starts_with("http://") || url.starts_with("https://") {
            tracing::debug!("Fetching image {} from {}", image.id, url);
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| load_error(image, e))?;

            if !response.status().is_success() {
                return Err(load_error(image, format!("HTTP {}", response.status())));
            }

            let bytes = response.bytes().await.map_err(|e| load_error(image, e))?;
            return Ok(bytes.to_vec());
        }

        let path = url.strip_prefix("file://").unwrap_or(url);
        tokio::fs::read(path).await.map_err(|e| load_error(image, e))
    }
}

fn decode_base64(image: &GeneratedImage, payload: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(payload.trim())
        .map_err(|e| load_error(image, e))
}

fn load_error(image: &GeneratedImage, cause: impl std::fmt::Display) -> MoodboardError {
    MoodboardError::ImageLoad {
        source_ref: image.id.clone(),
        message: cause.to_string(),
    }
}

#[derive(Debug, Clone, Default)]
pub struct ColorSampler {
    loader: ImageLoader,
}

impl ColorSampler {
    pub fn new(loader: ImageLoader) -> Self {
        Self { loader }
    }

    pub async fn sample(&self, image: &GeneratedImage) -> Result<SampledColors> {
        let decoded = self.loader.load(image).await?;
        let colors = sample_image(&decoded)?;
        tracing::debug!(
            "Sampled image {}: dominant {}, {} palette colors",
            image.id,
            colors.dominant,
            colors.palette.len()
        );
        Ok(colors)
    }
}

/// Dominant color plus up to six representative colors of a decoded image.
pub fn sample_image(image: &DynamicImage) -> Result<SampledColors> {
    let pixels = sample_pixels(image);
    if pixels.is_empty() {
        return Err(MoodboardError::ColorExtraction {
            message: format!(
                "{}x{} image has no pixels to sample",
                image.width(),
                image.height()
            ),
        });
    }

    let dominant = quantize(&pixels, DOMINANT_COLORS)
        .first()
        .copied()
        .ok_or_else(|| MoodboardError::ColorExtraction {
            message: "quantization produced no colors".to_string(),
        })?;

    let mut seen = HashSet::new();
    let palette = quantize(&pixels, SINGLE_IMAGE_PALETTE_SIZE)
        .into_iter()
        .filter(|color| seen.insert(color.to_hex()))
        .collect();

    Ok(SampledColors { dominant, palette })
}

fn sample_pixels(image: &DynamicImage) -> Vec<Srgb<f32>> {
    let rgba = image.to_rgba8();

    let kept: Vec<Srgb<f32>> = rgba
        .pixels()
        .step_by(SAMPLE_STRIDE)
        .filter(|p| {
            let [r, g, b, a] = p.0;
            a >= MIN_ALPHA && !(r > NEAR_WHITE && g > NEAR_WHITE && b > NEAR_WHITE)
        })
        .map(|p| Srgb::new(p.0[0], p.0[1], p.0[2]).into_format())
        .collect();

    if !kept.is_empty() {
        return kept;
    }

    // Blank or fully transparent images still get a palette.
    rgba.pixels()
        .step_by(SAMPLE_STRIDE)
        .map(|p| Srgb::new(p.0[0], p.0[1], p.0[2]).into_format())
        .collect()
}

/// K-means with a fixed seed into at most `max_colors` centroids, most
/// populous first.
fn quantize(pixels: &[Srgb<f32>], max_colors: usize) -> Vec<Color> {
    // k-means++ seeding needs at least k distinct points.
    let distinct: HashSet<[u8; 3]> = pixels.iter().map(|p| to_color(*p).rgb()).collect();
    let k = max_colors.min(distinct.len());
    if k == 0 {
        return Vec::new();
    }

    let result = get_kmeans(k, KMEANS_MAX_ITER, KMEANS_CONVERGE, false, pixels, KMEANS_SEED);

    let mut population = vec![0usize; result.centroids.len()];
    for &index in &result.indices {
        population[usize::from(index)] += 1;
    }

    let mut ranked: Vec<(usize, Srgb<f32>)> = population
        .into_iter()
        .zip(result.centroids)
        .filter(|(count, _)| *count > 0)
        .collect();
    // Stable sort keeps centroid order on ties.
    ranked.sort_by_key(|&(count, _)| Reverse(count));

    ranked.into_iter().map(|(_, centroid)| to_color(centroid)).collect()
}

fn to_color(color: Srgb<f32>) -> Color {
    let rgb: Srgb<u8> = color.into_format();
    Color::new(rgb.red, rgb.green, rgb.blue)
}
