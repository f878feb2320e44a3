use crate::domain::ports::ConfigProvider;
use crate::utils::error::{MoodboardError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_PRIMARY_MODEL: &str = "amazon.titan-image-generator-v1";
pub const DEFAULT_FALLBACK_MODEL: &str = "stability.stable-diffusion-xl-v1";
pub const DEFAULT_NEGATIVE_PROMPT: &str = "blurry, low quality, distorted, watermark";
pub const DEFAULT_STORAGE_KEY: &str = "ai-moodboards";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub image_source: ImageSourceConfig,
    pub storage: StorageConfig,
    pub generation: GenerationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageSourceConfig {
    /// Defaults to the regional Bedrock runtime endpoint.
    pub endpoint: Option<String>,
    pub region: String,
    pub primary_model: String,
    /// Empty string disables the fallback model.
    pub fallback_model: String,
    pub image_count: usize,
    pub width: u32,
    pub height: u32,
    pub negative_prompt: String,
    pub timeout_seconds: u64,
    pub enhance_prompt: bool,
}

impl Default for ImageSourceConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            region: DEFAULT_REGION.to_string(),
            primary_model: DEFAULT_PRIMARY_MODEL.to_string(),
            fallback_model: DEFAULT_FALLBACK_MODEL.to_string(),
            image_count: 4,
            width: 512,
            height: 512,
            negative_prompt: DEFAULT_NEGATIVE_PROMPT.to_string(),
            timeout_seconds: 120,
            enhance_prompt: true,
        }
    }
}

impl ImageSourceConfig {
    pub fn endpoint(&self) -> String {
        self.endpoint_for_region(&self.region)
    }

    /// The configured endpoint, or the regional Bedrock runtime for `region`.
    pub fn endpoint_for_region(&self, region: &str) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => format!("https://bedrock-runtime.{}.amazonaws.com", region),
        }
    }

    pub fn fallback_model(&self) -> Option<&str> {
        let model = self.fallback_model.trim();
        (!model.is_empty()).then_some(model)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub path: String,
    pub key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: "./moodboards".to_string(),
            key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub max_prompt_length: usize,
    /// Seeds the keyword backfill; unset means a fresh random draw each run.
    pub keyword_seed: Option<u64>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_prompt_length: 200,
            keyword_seed: None,
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// Loads `path` when given, otherwise falls back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                tracing::debug!("Loading configuration from {}", path.display());
                Self::from_file(path)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| MoodboardError::InvalidConfigValue {
            field: "toml_parsing".to_string(),
            value: String::new(),
            reason: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unset variables stay as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}")
            .map_err(|e| MoodboardError::configuration(format!("env pattern: {}", e)))?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("image_source.endpoint", &self.image_source.endpoint())?;
        validation::validate_non_empty_string("image_source.region", &self.image_source.region)?;
        validation::validate_non_empty_string(
            "image_source.primary_model",
            &self.image_source.primary_model,
        )?;
        validation::validate_range("image_source.image_count", self.image_source.image_count, 1, 8)?;
        validation::validate_range("image_source.width", self.image_source.width, 256, 1408)?;
        validation::validate_range("image_source.height", self.image_source.height, 256, 1408)?;
        validation::validate_range(
            "image_source.timeout_seconds",
            self.image_source.timeout_seconds,
            1,
            600,
        )?;

        validation::validate_path("storage.path", &self.storage.path)?;
        validation::validate_non_empty_string("storage.key", &self.storage.key)?;
        if self.storage.key.contains(['/', '\\']) {
            return Err(MoodboardError::InvalidConfigValue {
                field: "storage.key".to_string(),
                value: self.storage.key.clone(),
                reason: "Key cannot contain path separators".to_string(),
            });
        }

        validation::validate_range(
            "generation.max_prompt_length",
            self.generation.max_prompt_length,
            1,
            10_000,
        )?;

        Ok(())
    }
}

impl ConfigProvider for AppConfig {
    fn image_count(&self) -> usize {
        self.image_source.image_count
    }

    fn max_prompt_length(&self) -> usize {
        self.generation.max_prompt_length
    }

    fn storage_path(&self) -> &str {
        &self.storage.path
    }

    fn storage_key(&self) -> &str {
        &self.storage.key
    }

    fn keyword_seed(&self) -> Option<u64> {
        self.generation.keyword_seed
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
