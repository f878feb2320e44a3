//! Aesthetic keyword tagging.
//!
//! Keywords come from, in order: vocabulary words found in the prompt, rules
//! over the palette, the first few long prompt words, and finally random
//! vocabulary entries until the minimum count is reached. Only the last step
//! is random, and it draws from the caller's RNG.

use crate::domain::model::{Color, ColorPalette};
use rand::seq::SliceRandom;
use rand::Rng;

pub const MIN_KEYWORDS: usize = 5;
pub const MAX_KEYWORDS: usize = 10;
const PROMPT_WORD_LIMIT: usize = 3;

pub const MOODS: [&str; 10] = [
    "dreamy", "cozy", "ethereal", "vibrant", "serene", "dramatic", "whimsical", "elegant",
    "rustic", "modern",
];

pub const STYLES: [&str; 10] = [
    "minimalist", "maximalist", "vintage", "futuristic", "bohemian", "industrial", "organic",
    "geometric", "abstract", "realistic",
];

pub const THEMES: [&str; 10] = [
    "nature", "urban", "celestial", "oceanic", "forest", "desert", "cosmic", "architectural",
    "floral", "mechanical",
];

pub const COLOR_TERMS: [&str; 10] = [
    "monochromatic", "pastel", "neon", "earth tones", "jewel tones", "muted", "bold", "warm",
    "cool", "neutral",
];

pub const TEXTURES: [&str; 10] = [
    "smooth", "rough", "glossy", "matte", "metallic", "organic", "crystalline", "fabric", "paper",
    "stone",
];

const STOPWORDS: [&str; 7] = ["with", "and", "the", "for", "from", "that", "this"];

/// Every vocabulary word, in category order, without repeats.
pub fn vocabulary() -> Vec<&'static str> {
    let mut words: Vec<&'static str> = Vec::with_capacity(50);
    for word in MOODS
        .iter()
        .chain(STYLES.iter())
        .chain(THEMES.iter())
        .chain(COLOR_TERMS.iter())
        .chain(TEXTURES.iter())
        .copied()
    {
        if !words.contains(&word) {
            words.push(word);
        }
    }
    words
}

/// Insertion-ordered set of keywords.
#[derive(Debug, Default)]
struct KeywordSet(Vec<String>);

impl KeywordSet {
    fn insert(&mut self, keyword: impl Into<String>) {
        let keyword = keyword.into();
        if !self.0.contains(&keyword) {
            self.0.push(keyword);
        }
    }

    fn contains(&self, keyword: &str) -> bool {
        self.0.iter().any(|k| k == keyword)
    }

    fn len(&self) -> usize {
        self.0.len()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordTagger;

impl KeywordTagger {
    pub fn new() -> Self {
        Self
    }

    /// Between five and ten lowercase keywords for a prompt and its palette.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        prompt: &str,
        palette: &ColorPalette,
        rng: &mut R,
    ) -> Vec<String> {
        let mut keywords = KeywordSet::default();

        for word in match_vocabulary(prompt) {
            keywords.insert(word);
        }
        for word in palette_keywords(palette) {
            keywords.insert(word);
        }
        for word in prompt_words(prompt) {
            keywords.insert(word);
        }

        if keywords.len() < MIN_KEYWORDS {
            let mut candidates: Vec<&str> = vocabulary()
                .into_iter()
                .filter(|word| !keywords.contains(word))
                .collect();
            candidates.shuffle(rng);

            let needed = MIN_KEYWORDS - keywords.len();
            tracing::debug!("Backfilling {} random keywords", needed);
            for word in candidates.into_iter().take(needed) {
                keywords.insert(word);
            }
        }

        let mut result = keywords.0;
        result.truncate(MAX_KEYWORDS);
        result
    }
}

/// Vocabulary words that occur anywhere in the prompt, case-insensitively.
pub fn match_vocabulary(prompt: &str) -> Vec<&'static str> {
    let lower = prompt.to_lowercase();
    vocabulary()
        .into_iter()
        .filter(|word| lower.contains(word))
        .collect()
}

pub fn palette_keywords(palette: &ColorPalette) -> Vec<&'static str> {
    let dominant = palette.dominant;
    let mut keywords = Vec::new();

    if is_warm(dominant) {
        keywords.push("warm");
    }
    if is_cool(dominant) {
        keywords.push("cool");
    }
    if is_dark(dominant) {
        keywords.push("dark");
    }
    if is_light(dominant) {
        keywords.push("light");
    }
    if is_colorful(palette) {
        keywords.push("colorful");
    }
    if is_monochromatic(palette) {
        keywords.push("monochromatic");
    }
    if has_pastel(palette) {
        keywords.push("pastel");
    }

    keywords
}

/// First three lowercase prompt words longer than three characters.
pub fn prompt_words(prompt: &str) -> Vec<String> {
    prompt
        .to_lowercase()
        .split_whitespace()
        .filter(|word| word.chars().count() > 3 && !STOPWORDS.contains(word))
        .take(PROMPT_WORD_LIMIT)
        .map(str::to_string)
        .collect()
}

pub fn is_warm(color: Color) -> bool {
    let (r, g, b) = channels(color);
    r > b && r + g > b * 1.5
}

pub fn is_cool(color: Color) -> bool {
    let (r, g, b) = channels(color);
    b > r && b + g > r * 1.5
}

pub fn is_dark(color: Color) -> bool {
    color.luminance() < 0.5
}

pub fn is_light(color: Color) -> bool {
    !is_dark(color)
}

pub fn is_colorful(palette: &ColorPalette) -> bool {
    palette.palette.len() > 5
}

/// Coarse proxy: a short palette counts as monochromatic.
pub fn is_monochromatic(palette: &ColorPalette) -> bool {
    palette.palette.len() <= 3
}

pub fn has_pastel(palette: &ColorPalette) -> bool {
    palette.palette.iter().any(|c| c.channel_average() > 180.0)
}

fn channels(color: Color) -> (f64, f64, f64) {
    (f64::from(color.r), f64::from(color.g), f64::from(color.b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn palette_of(hexes: &[&str]) -> ColorPalette {
        let palette: Vec<Color> = hexes.iter().map(|h| Color::from_hex(h).unwrap()).collect();
        ColorPalette {
            dominant: palette[0],
            palette,
        }
    }

    #[test]
    fn test_vocabulary_has_no_repeats() {
        let words = vocabulary();
        assert_eq!(words.len(), 49);
        assert_eq!(words.iter().filter(|w| **w == "organic").count(), 1);
    }

    #[test]
    fn test_cozy_rustic_living_room() {
        let palette = palette_of(&["#8b5a2b", "#d2b48c", "#5c4033", "#f5deb3"]);
        let mut rng = StdRng::seed_from_u64(1);

        let keywords = KeywordTagger::new().generate("cozy rustic living room", &palette, &mut rng);

        assert!(keywords.contains(&"cozy".to_string()));
        assert!(keywords.contains(&"rustic".to_string()));
        assert!(keywords.contains(&"warm".to_string()));
        assert!(keywords.len() >= MIN_KEYWORDS);
        assert!(keywords.len() <= MAX_KEYWORDS);
    }

    #[test]
    fn test_deterministic_steps_in_order() {
        // dominant #8b5a2b: warm and dark; four entries, one pastel.
        let palette = palette_of(&["#8b5a2b", "#d2b48c", "#5c4033", "#f5deb3"]);
        let mut rng = StdRng::seed_from_u64(1);

        let keywords = KeywordTagger::new().generate("cozy rustic living room", &palette, &mut rng);

        assert_eq!(
            keywords,
            vec!["cozy", "rustic", "warm", "dark", "pastel", "living"]
        );
    }

    #[test]
    fn test_backfill_reaches_minimum() {
        let palette = palette_of(&["#808080", "#7f7f7f", "#818181", "#828282"]);
        let mut rng = StdRng::seed_from_u64(99);

        // "zz": no vocabulary hit, no long word; palette gives "light" only.
        let keywords = KeywordTagger::new().generate("zz", &palette, &mut rng);

        assert_eq!(keywords.len(), MIN_KEYWORDS);
        assert_eq!(keywords[0], "light");
        let vocab = vocabulary();
        assert!(keywords[1..].iter().all(|k| vocab.contains(&k.as_str())));
    }

    #[test]
    fn test_seeded_backfill_is_reproducible() {
        let palette = ColorPalette::empty();
        let a = KeywordTagger::new().generate("zz", &palette, &mut StdRng::seed_from_u64(5));
        let b = KeywordTagger::new().generate("zz", &palette, &mut StdRng::seed_from_u64(5));
        assert_eq!(a, b);
    }

    #[test]
    fn test_truncated_to_ten() {
        let prompt = "dreamy cozy ethereal vibrant serene dramatic whimsical elegant rustic modern";
        let palette = palette_of(&["#101010"]);
        let keywords = KeywordTagger::new().generate(prompt, &palette, &mut StdRng::seed_from_u64(0));

        assert_eq!(keywords.len(), MAX_KEYWORDS);
        assert_eq!(keywords[0], "dreamy");
        assert_eq!(keywords[9], "modern");
    }

    #[test]
    fn test_prompt_words_skip_short_and_stopwords() {
        assert_eq!(
            prompt_words("A Loft With Neon Lights From Tokyo"),
            vec!["loft", "neon", "lights"]
        );
        assert!(prompt_words("the sun and sky").is_empty());
    }

    #[test]
    fn test_vocabulary_match_is_substring_and_case_insensitive() {
        let matched = match_vocabulary("Earth Tones in a NEONLIT alley");
        assert!(matched.contains(&"earth tones"));
        assert!(matched.contains(&"neon"));
    }

    #[test]
    fn test_palette_heuristics() {
        assert!(is_warm(Color::new(200, 120, 40)));
        assert!(!is_cool(Color::new(200, 120, 40)));
        assert!(is_cool(Color::new(30, 90, 200)));
        assert!(is_dark(Color::new(20, 20, 20)));
        assert!(is_light(Color::new(240, 240, 240)));

        let wide = palette_of(&["#000000", "#111111", "#222222", "#333333", "#444444", "#555555"]);
        assert!(is_colorful(&wide));
        assert!(!is_monochromatic(&wide));
        assert!(!has_pastel(&wide));

        let narrow = palette_of(&["#eeeeee", "#101010"]);
        assert!(is_monochromatic(&narrow));
        assert!(has_pastel(&narrow));
    }
}
