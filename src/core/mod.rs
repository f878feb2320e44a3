pub mod aggregator;
pub mod assembler;
pub mod engine;
pub mod pipeline;
pub mod sampler;
pub mod store;
pub mod tagger;

pub use crate::domain::model::{ColorPalette, Moodboard};
pub use crate::domain::ports::{ConfigProvider, ImageSource, Storage};
pub use crate::utils::error::Result;
