use crate::domain::model::Moodboard;
use crate::utils::error::{MoodboardError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::SecondsFormat;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::{FileOptions, ZipWriter};

/// Write-once snapshot of a moodboard. There is no import path for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub prompt: String,
    pub images: Vec<String>,
    pub palette: Vec<String>,
    pub keywords: Vec<String>,
    pub created_at: String,
}

impl From<&Moodboard> for ExportDocument {
    fn from(moodboard: &Moodboard) -> Self {
        Self {
            prompt: moodboard.prompt.clone(),
            images: moodboard.images.iter().map(|img| img.url.clone()).collect(),
            palette: moodboard.palette.hex_values(),
            keywords: moodboard.keywords.clone(),
            created_at: moodboard
                .created_at
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

pub fn export_json(moodboard: &Moodboard) -> Result<String> {
    Ok(serde_json::to_string_pretty(&ExportDocument::from(moodboard))?)
}

pub fn export_file_name(moodboard: &Moodboard, extension: &str) -> Result<String> {
    Ok(format!("moodboard-{}.{}", file_component(&moodboard.id)?, extension))
}

/// Ids come from a hand-editable store; they must stay a single path segment.
fn file_component(id: &str) -> Result<&str> {
    let unsafe_id = id.is_empty()
        || id == "."
        || id.contains("..")
        || id.contains(['/', '\\', ':', '\0']);
    if unsafe_id {
        return Err(MoodboardError::validation(format!(
            "'{}' cannot be used in a file name",
            id
        )));
    }
    Ok(id)
}

/// Writes `moodboard-{id}.json` into `dir`.
pub fn write_export(moodboard: &Moodboard, dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(moodboard, "json")?);
    std::fs::write(&path, export_json(moodboard)?)?;
    tracing::debug!("Exported {} to {}", moodboard.id, path.display());
    Ok(path)
}

/// Writes `moodboard-{id}.zip` with the export document and every inline
/// image as `images/{image id}.png`.
pub fn write_bundle(moodboard: &Moodboard, dir: &Path) -> Result<PathBuf> {
    let file_name = export_file_name(moodboard, "zip")?;
    let zip_data = {
        let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

        zip.start_file::<_, ()>("moodboard.json", FileOptions::default())?;
        zip.write_all(export_json(moodboard)?.as_bytes())?;

        for image in &moodboard.images {
            if image.base64.is_empty() {
                tracing::debug!("Image {} has no inline data, skipping in bundle", image.id);
                continue;
            }
            let bytes = STANDARD.decode(image.base64.trim())?;
            let entry = format!("images/{}.png", file_component(&image.id)?);
            zip.start_file::<_, ()>(entry, FileOptions::default())?;
            zip.write_all(&bytes)?;
        }

        let cursor = zip.finish()?;
        cursor.into_inner()
    };

    std::fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    tracing::debug!("Writing bundle ({} bytes) to {}", zip_data.len(), path.display());
    std::fs::write(&path, zip_data)?;
    Ok(path)
}
