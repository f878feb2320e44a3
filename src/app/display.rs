use crate::domain::model::{Color, Moodboard};
use std::fmt::Write;

/// Starter prompts offered to users who don't know what to type.
pub const EXAMPLE_PROMPTS: [&str; 8] = [
    "cozy cyberpunk café",
    "ethereal forest sanctuary",
    "minimalist zen garden",
    "vibrant neon cityscape",
    "rustic bohemian living room",
    "dreamy pastel clouds",
    "industrial loft workspace",
    "tropical sunset paradise",
];

/// A hex label on a truecolor background, in black or white for contrast.
pub fn swatch(color: Color) -> String {
    let fg = color.contrast_color();
    format!(
        "\x1b[48;2;{};{};{}m\x1b[38;2;{};{};{}m {} \x1b[0m",
        color.r,
        color.g,
        color.b,
        fg.r,
        fg.g,
        fg.b,
        color.to_hex()
    )
}

/// Multi-line summary of a moodboard for the terminal.
pub fn render_summary(moodboard: &Moodboard, ansi: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "🎨 {}", moodboard.prompt);
    let _ = writeln!(out, "   id:       {}", moodboard.id);
    let _ = writeln!(
        out,
        "   created:  {}",
        moodboard.created_at.format("%Y-%m-%d %H:%M UTC")
    );
    let _ = writeln!(out, "   images:   {}", moodboard.images.len());

    let colors: Vec<String> = moodboard
        .palette
        .palette
        .iter()
        .map(|&c| if ansi { swatch(c) } else { c.to_hex() })
        .collect();
    let _ = writeln!(out, "   palette:  {}", colors.join(" "));
    let _ = writeln!(out, "   keywords: {}", moodboard.keywords.join(", "));
    out
}

/// One line per moodboard for listings.
pub fn render_list_entry(moodboard: &Moodboard) -> String {
    format!(
        "{}  {}  {}  [{}]",
        moodboard.created_at.format("%Y-%m-%d"),
        moodboard.id,
        moodboard.prompt,
        moodboard.keywords.iter().take(3).cloned().collect::<Vec<_>>().join(", ")
    )
}

pub fn render_examples() -> String {
    let mut out = String::from("💡 Try one of these:\n");
    for prompt in EXAMPLE_PROMPTS {
        let _ = writeln!(out, "   moodboard-gen generate \"{}\"", prompt);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{ColorPalette, GeneratedImage};

    fn moodboard() -> Moodboard {
        Moodboard {
            id: "m1".to_string(),
            prompt: "minimalist zen garden".to_string(),
            images: vec![GeneratedImage::from_url("image-0", "https://example.com/0.png")],
            palette: ColorPalette {
                dominant: Color::new(240, 240, 230),
                palette: vec![Color::new(240, 240, 230), Color::new(40, 60, 40)],
            },
            keywords: vec!["minimalist".to_string(), "serene".to_string()],
            created_at: "2024-05-01T12:00:00Z".parse().unwrap(),
        }
    }

    #[test]
    fn test_swatch_uses_contrasting_label() {
        let light = swatch(Color::new(240, 240, 230));
        assert!(light.contains("\x1b[38;2;0;0;0m"));
        let dark = swatch(Color::new(40, 60, 40));
        assert!(dark.contains("\x1b[38;2;255;255;255m"));
    }

    #[test]
    fn test_plain_summary() {
        let summary = render_summary(&moodboard(), false);
        assert!(summary.contains("minimalist zen garden"));
        assert!(summary.contains("palette:  #f0f0e6 #283c28"));
        assert!(summary.contains("created:  2024-05-01 12:00 UTC"));
        assert!(!summary.contains('\x1b'));
    }

    #[test]
    fn test_examples_are_valid_prompts() {
        let rendered = render_examples();
        for prompt in EXAMPLE_PROMPTS {
            assert!(crate::utils::validation::validate_prompt(prompt, 200).is_ok());
            assert!(rendered.contains(&format!("generate \"{}\"", prompt)));
        }
    }

    #[test]
    fn test_list_entry() {
        assert_eq!(
            render_list_entry(&moodboard()),
            "2024-05-01  m1  minimalist zen garden  [minimalist, serene]"
        );
    }
}
