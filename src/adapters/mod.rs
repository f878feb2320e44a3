// Adapters layer: concrete implementations of the domain ports.

pub mod bedrock;
pub mod storage;

pub use bedrock::BedrockImageSource;
pub use storage::LocalStorage;
