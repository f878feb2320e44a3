use crate::config::toml_config::AppConfig;
use crate::utils::error::{MoodboardError, Result};
use crate::utils::validation::{self, Validate};
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::provider::ProvideCredentials;
use std::env;
use std::fmt;

pub const API_KEY_VAR: &str = "MOODBOARD_API_KEY";
pub const BEDROCK_TOKEN_VAR: &str = "AWS_BEARER_TOKEN_BEDROCK";
pub const REGION_VAR: &str = "AWS_REGION";

/// How requests to the image service authenticate.
#[derive(Clone, PartialEq, Eq)]
pub enum Auth {
    /// Bedrock API key, sent as a bearer token.
    ApiKey(String),
    /// IAM access keys; requests are SigV4-signed.
    Iam(IamKeys),
}

#[derive(Clone, PartialEq, Eq)]
pub struct IamKeys {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

/// Credentials for the image service. Lives for the current process only.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub auth: Auth,
    pub region: String,
}

impl Credentials {
    /// API key credentials.
    pub fn new(api_key: impl Into<String>, region: impl Into<String>) -> Result<Self> {
        let credentials = Self {
            auth: Auth::ApiKey(api_key.into()),
            region: region.into(),
        };
        credentials.validate()?;
        Ok(credentials)
    }

    pub fn iam(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: Option<String>,
        region: impl Into<String>,
    ) -> Result<Self> {
        let credentials = Self {
            auth: Auth::Iam(IamKeys {
                access_key_id: access_key_id.into(),
                secret_access_key: secret_access_key.into(),
                session_token: session_token.filter(|token| !token.trim().is_empty()),
            }),
            region: region.into(),
        };
        credentials.validate()?;
        Ok(credentials)
    }

    /// Copies keys handed out by an AWS credentials provider.
    pub fn from_aws(keys: &aws_credential_types::Credentials, region: impl Into<String>) -> Result<Self> {
        Self::iam(
            keys.access_key_id(),
            keys.secret_access_key(),
            keys.session_token().map(str::to_string),
            region,
        )
    }

    /// API key from `MOODBOARD_API_KEY` or `AWS_BEARER_TOKEN_BEDROCK`.
    pub fn api_key_from_env(config: &AppConfig) -> Result<Option<Self>> {
        let Some(api_key) = env::var(API_KEY_VAR).or_else(|_| env::var(BEDROCK_TOKEN_VAR)).ok() else {
            return Ok(None);
        };
        Self::new(api_key, region_for(config)).map(Some)
    }

    /// An API key in the environment wins. Otherwise the AWS default chain
    /// (`AWS_ACCESS_KEY_ID`/`AWS_SECRET_ACCESS_KEY`/`AWS_SESSION_TOKEN`,
    /// profiles, SSO, instance roles) is asked for IAM keys. `None` when
    /// neither yields anything.
    pub async fn resolve(config: &AppConfig) -> Result<Option<Self>> {
        if let Some(credentials) = Self::api_key_from_env(config)? {
            tracing::debug!("Using image service API key from environment");
            return Ok(Some(credentials));
        }

        let region = region_for(config);
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.clone()))
            .load()
            .await;

        let Some(provider) = sdk_config.credentials_provider() else {
            tracing::debug!("No AWS credentials provider configured");
            return Ok(None);
        };

        match provider.provide_credentials().await {
            Ok(keys) => {
                tracing::debug!("Using AWS IAM credentials for {}", region);
                Self::from_aws(&keys, region).map(Some)
            }
            Err(e) => {
                tracing::debug!("No AWS credentials found: {}", e);
                Ok(None)
            }
        }
    }
}

fn region_for(config: &AppConfig) -> String {
    env::var(REGION_VAR).unwrap_or_else(|_| config.image_source.region.clone())
}

impl Validate for Credentials {
    fn validate(&self) -> Result<()> {
        match &self.auth {
            Auth::ApiKey(api_key) if api_key.trim().is_empty() => {
                return Err(MoodboardError::configuration("API key is empty"));
            }
            Auth::Iam(keys) if keys.access_key_id.trim().is_empty() => {
                return Err(MoodboardError::configuration("access key id is empty"));
            }
            Auth::Iam(keys) if keys.secret_access_key.trim().is_empty() => {
                return Err(MoodboardError::configuration("secret access key is empty"));
            }
            _ => {}
        }
        validation::validate_non_empty_string("region", &self.region)
    }
}

// Keep secrets out of logs.
impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ApiKey(_) => f.write_str("ApiKey(***)"),
            Self::Iam(keys) => write!(f, "Iam({}, ***)", keys.access_key_id),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("auth", &self.auth)
            .field("region", &self.region)
            .finish()
    }
}
