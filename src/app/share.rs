use crate::domain::model::Moodboard;

const SHARE_LIMIT: usize = 5;

/// Plain-text summary for the clipboard or a share sheet.
pub fn share_text(moodboard: &Moodboard) -> String {
    let keywords: Vec<&str> = moodboard
        .keywords
        .iter()
        .take(SHARE_LIMIT)
        .map(String::as_str)
        .collect();
    let colors: Vec<String> = moodboard
        .palette
        .palette
        .iter()
        .take(SHARE_LIMIT)
        .map(|c| c.to_hex())
        .collect();

    format!(
        "🎨 AI Moodboard: \"{}\"\n\n✨ Vibe: {}\n🎯 Colors: {}\n\nGenerated with AI Moodboard Generator",
        moodboard.prompt,
        keywords.join(", "),
        colors.join(", ")
    )
}
