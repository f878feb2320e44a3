use crate::domain::model::{ColorPalette, GeneratedImage, Moodboard};
use crate::utils::error::{MoodboardError, Result};
use chrono::{DateTime, Utc};
use rand::Rng;

const ID_SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// `moodboard-{unix millis}-{9 base36 chars}`
pub fn generate_id<R: Rng + ?Sized>(now: DateTime<Utc>, rng: &mut R) -> String {
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| char::from(BASE36[rng.random_range(0..BASE36.len())]))
        .collect();
    format!("moodboard-{}-{}", now.timestamp_millis(), suffix)
}

/// Builds a moodboard record stamped with the current time and a fresh id.
/// Nothing is persisted here.
pub fn assemble(
    prompt: &str,
    images: Vec<GeneratedImage>,
    palette: ColorPalette,
    keywords: Vec<String>,
) -> Result<Moodboard> {
    if images.is_empty() {
        return Err(MoodboardError::validation("Failed to generate any images"));
    }

    let created_at = Utc::now();
    let id = generate_id(created_at, &mut rand::rng());
    tracing::debug!("Assembled moodboard {} with {} images", id, images.len());

    Ok(Moodboard {
        id,
        prompt: prompt.to_string(),
        images,
        palette,
        keywords,
        created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_zero_images_is_validation_error() {
        let err = assemble("dreamy pastel clouds", Vec::new(), ColorPalette::empty(), Vec::new())
            .unwrap_err();
        assert!(matches!(err, MoodboardError::Validation { .. }));
    }

    #[test]
    fn test_assemble_keeps_inputs() {
        let images = vec![GeneratedImage::from_url("image-0", "https://example.com/0.png")];
        let keywords = vec!["dreamy".to_string(), "pastel".to_string()];

        let moodboard = assemble(
            "dreamy pastel clouds",
            images.clone(),
            ColorPalette::empty(),
            keywords.clone(),
        )
        .unwrap();

        assert!(moodboard.id.starts_with("moodboard-"));
        assert_eq!(moodboard.prompt, "dreamy pastel clouds");
        assert_eq!(moodboard.images, images);
        assert_eq!(moodboard.keywords, keywords);
        assert!(moodboard.created_at <= Utc::now());
    }

    #[test]
    fn test_id_format() {
        let now: DateTime<Utc> = "2024-05-01T12:00:00Z".parse().unwrap();
        let id = generate_id(now, &mut StdRng::seed_from_u64(3));

        let suffix = id
            .strip_prefix(&format!("moodboard-{}-", now.timestamp_millis()))
            .unwrap();
        assert_eq!(suffix.len(), 9);
        assert!(suffix.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn test_ids_differ_between_calls() {
        let images = vec![GeneratedImage::from_url("image-0", "https://example.com/0.png")];
        let a = assemble("x", images.clone(), ColorPalette::empty(), Vec::new()).unwrap();
        let b = assemble("x", images, ColorPalette::empty(), Vec::new()).unwrap();
        assert_ne!(a.id, b.id);
    }
}
