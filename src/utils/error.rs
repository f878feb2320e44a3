use thiserror::Error;

#[derive(Error, Debug)]
pub enum MoodboardError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Invalid configuration value for '{field}' ({value}): {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Image generation failed: {message}")]
    Generation { message: String },

    #[error("Failed to load image '{source_ref}': {message}")]
    ImageLoad { source_ref: String, message: String },

    #[error("Color extraction failed: {message}")]
    ColorExtraction { message: String },

    #[error("Persistence error: {message}")]
    Persistence { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Zip operation failed: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Base64 decoding error: {0}")]
    Base64(#[from] base64::DecodeError),
}

pub type Result<T> = std::result::Result<T, MoodboardError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Generation,
    Sampling,
    Persistence,
    Validation,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl MoodboardError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation {
            message: message.into(),
        }
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Configuration { .. } | Self::InvalidConfigValue { .. } => ErrorCategory::Configuration,
            Self::Generation { .. } | Self::Http(_) => ErrorCategory::Generation,
            Self::ImageLoad { .. } | Self::ColorExtraction { .. } => ErrorCategory::Sampling,
            // Base64 only fails outside sampling when stored image data is bad.
            Self::Persistence { .. } | Self::Serialization(_) | Self::Base64(_) => {
                ErrorCategory::Persistence
            }
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::Io(_) | Self::Zip(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // A single image or a stale store never sinks a run.
            ErrorCategory::Sampling | ErrorCategory::Persistence => ErrorSeverity::Low,
            ErrorCategory::Generation => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Validation => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        self.severity() < ErrorSeverity::Critical
    }

    /// Process exit code for an error that ends a command. Never zero:
    /// low severity only means the pipeline may skip past it.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low | ErrorSeverity::High => 1,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::Configuration { message } => format!("Image service is not configured: {}", message),
            Self::InvalidConfigValue { field, reason, .. } => {
                format!("Setting '{}' is invalid: {}", field, reason)
            }
            Self::Generation { message } => format!("Could not generate images: {}", message),
            Self::Http(e) => format!("Could not reach the image service: {}", e),
            Self::ImageLoad { source_ref, .. } => format!("Could not read image {}", source_ref),
            Self::ColorExtraction { message } => format!("Could not extract colors: {}", message),
            Self::Persistence { message } => format!("Saved moodboards are unavailable: {}", message),
            Self::Validation { message } => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Set AWS_ACCESS_KEY_ID/AWS_SECRET_ACCESS_KEY (or an AWS profile), or MOODBOARD_API_KEY, plus AWS_REGION"
            }
            ErrorCategory::Generation => "Check network access and model availability, then retry",
            ErrorCategory::Sampling => "The image was skipped; try regenerating for a fuller palette",
            ErrorCategory::Persistence => "Check the storage directory permissions; `clear` resets a corrupt store",
            ErrorCategory::Validation => "Describe a vibe or mood, e.g. \"cozy rustic living room\"",
            ErrorCategory::System => "Check disk space and file permissions",
        }
    }
}
