use crate::domain::model::Moodboard;
use crate::domain::ports::Storage;
use crate::utils::error::Result;

/// The saved moodboard collection, kept as one JSON array under one key.
///
/// Every mutation reads the whole collection, changes it in memory and writes
/// it back with a single `Storage::set`.
pub struct MoodboardStore<S: Storage> {
    storage: S,
    key: String,
}

impl<S: Storage> MoodboardStore<S> {
    pub fn new(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// Replaces the record with the same id, or appends it.
    pub fn save(&self, moodboard: &Moodboard) -> Result<()> {
        let mut moodboards = self.list();

        match moodboards.iter_mut().find(|m| m.id == moodboard.id) {
            Some(existing) => *existing = moodboard.clone(),
            None => moodboards.push(moodboard.clone()),
        }

        self.write(&moodboards)?;
        tracing::debug!("Saved moodboard {} ({} total)", moodboard.id, moodboards.len());
        Ok(())
    }

    /// All saved moodboards in insertion order. Unreadable data reads as empty.
    pub fn list(&self) -> Vec<Moodboard> {
        let stored = match self.storage.get(&self.key) {
            Ok(Some(stored)) => stored,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::error!("Failed to read saved moodboards: {}", e);
                return Vec::new();
            }
        };

        match serde_json::from_str(&stored) {
            Ok(moodboards) => moodboards,
            Err(e) => {
                tracing::error!("Failed to parse saved moodboards: {}", e);
                Vec::new()
            }
        }
    }

    /// Newest first.
    pub fn list_recent(&self) -> Vec<Moodboard> {
        let mut moodboards = self.list();
        moodboards.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        moodboards
    }

    pub fn find(&self, id: &str) -> Option<Moodboard> {
        self.list().into_iter().find(|m| m.id == id)
    }

    /// Removes the record if present. Unknown ids are not an error.
    pub fn delete(&self, id: &str) -> Result<()> {
        let moodboards: Vec<Moodboard> = self.list().into_iter().filter(|m| m.id != id).collect();
        self.write(&moodboards)
    }

    pub fn clear(&self) -> Result<()> {
        self.storage.remove(&self.key)
    }

    fn write(&self, moodboards: &[Moodboard]) -> Result<()> {
        let json = serde_json::to_string(moodboards)?;
        self.storage.set(&self.key, &json)
    }
}
