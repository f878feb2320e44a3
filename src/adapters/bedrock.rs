//! Text-to-image over the Bedrock runtime `InvokeModel` API.
//!
//! IAM credentials go through the AWS SDK, which signs each request with
//! SigV4. A Bedrock API key is sent as a bearer token over plain REST. The
//! primary model speaks the Titan Image Generator body; the optional fallback
//! speaks the Stability SDXL body.

use crate::config::credentials::{Auth, Credentials, IamKeys};
use crate::config::toml_config::ImageSourceConfig;
use crate::domain::model::{GeneratedImage, ImageRequest};
use crate::domain::ports::ImageSource;
use crate::utils::error::{MoodboardError, Result};
use async_trait::async_trait;
use aws_config::timeout::TimeoutConfig;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_bedrockruntime::error::DisplayErrorContext;
use aws_sdk_bedrockruntime::primitives::Blob;
use chrono::Utc;
use rand::Rng;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

const STYLE_SUFFIXES: [&str; 6] = [
    "aesthetic",
    "artistic",
    "high quality",
    "detailed",
    "professional photography",
    "cinematic lighting",
];
const SEED_RANGE: u64 = 1_000_000;

/// One connection to the service for a batch of requests.
enum Transport<'a> {
    Bearer { api_key: &'a str, endpoint: String },
    Signed(aws_sdk_bedrockruntime::Client),
}

pub struct BedrockImageSource {
    client: Client,
    settings: ImageSourceConfig,
}

impl BedrockImageSource {
    pub fn new(settings: ImageSourceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()?;
        Ok(Self { client, settings })
    }

    /// Appends one random style cue, unless enhancement is switched off.
    fn enhance_prompt<R: Rng + ?Sized>(&self, prompt: &str, rng: &mut R) -> String {
        if !self.settings.enhance_prompt {
            return prompt.to_string();
        }
        let style = STYLE_SUFFIXES[rng.random_range(0..STYLE_SUFFIXES.len())];
        format!("{}, {}, 4k resolution", prompt, style)
    }

    fn transport<'a>(&self, credentials: &'a Credentials) -> Transport<'a> {
        match &credentials.auth {
            Auth::ApiKey(api_key) => Transport::Bearer {
                api_key: api_key.as_str(),
                endpoint: self.settings.endpoint_for_region(&credentials.region),
            },
            Auth::Iam(keys) => Transport::Signed(self.signed_client(keys, &credentials.region)),
        }
    }

    fn signed_client(&self, keys: &IamKeys, region: &str) -> aws_sdk_bedrockruntime::Client {
        let provider = aws_credential_types::Credentials::new(
            keys.access_key_id.clone(),
            keys.secret_access_key.clone(),
            keys.session_token.clone(),
            None,
            "moodboard-gen",
        );
        let timeouts = TimeoutConfig::builder()
            .operation_timeout(Duration::from_secs(self.settings.timeout_seconds))
            .build();

        let mut builder = aws_sdk_bedrockruntime::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .credentials_provider(provider)
            .timeout_config(timeouts);
        if let Some(endpoint) = &self.settings.endpoint {
            builder = builder.endpoint_url(endpoint.trim_end_matches('/'));
        }

        aws_sdk_bedrockruntime::Client::from_conf(builder.build())
    }

    async fn invoke(&self, model: &str, body: Value, transport: &Transport<'_>) -> Result<Value> {
        match transport {
            Transport::Bearer { api_key, endpoint } => {
                self.invoke_rest(model, body, api_key, endpoint).await
            }
            Transport::Signed(client) => Self::invoke_signed(client, model, body).await,
        }
    }

    async fn invoke_signed(
        client: &aws_sdk_bedrockruntime::Client,
        model: &str,
        body: Value,
    ) -> Result<Value> {
        tracing::debug!("Invoking {} with SigV4", model);

        let output = client
            .invoke_model()
            .model_id(model)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(serde_json::to_vec(&body)?))
            .send()
            .await
            .map_err(|e| {
                MoodboardError::generation(format!("{} failed: {}", model, DisplayErrorContext(&e)))
            })?;

        Ok(serde_json::from_slice(output.body().as_ref())?)
    }

    async fn invoke_rest(
        &self,
        model: &str,
        body: Value,
        api_key: &str,
        endpoint: &str,
    ) -> Result<Value> {
        let url = format!("{}/model/{}/invoke", endpoint, model);
        tracing::debug!("Invoking {} at {}", model, url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("{} responded with {}", model, status);
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(MoodboardError::generation(format!(
                "{} returned HTTP {}: {}",
                model, status, detail
            )));
        }

        Ok(response.json().await?)
    }

    fn titan_payload(&self, prompt: &str, seed: u64) -> Value {
        json!({
            "taskType": "TEXT_IMAGE",
            "textToImageParams": {
                "text": prompt,
                "negativeText": self.settings.negative_prompt,
            },
            "imageGenerationConfig": {
                "numberOfImages": 1,
                "height": self.settings.height,
                "width": self.settings.width,
                "cfgScale": 8,
                "seed": seed,
            }
        })
    }

    fn stability_payload(&self, prompt: &str, seed: u64) -> Value {
        json!({
            "text_prompts": [
                { "text": prompt, "weight": 1 },
                { "text": self.settings.negative_prompt, "weight": -1 },
            ],
            "cfg_scale": 7,
            "height": self.settings.height,
            "width": self.settings.width,
            "samples": 1,
            "steps": 20,
            "seed": seed,
        })
    }

    async fn generate_primary(
        &self,
        prompt: &str,
        seed: u64,
        transport: &Transport<'_>,
    ) -> Result<Option<String>> {
        let model = &self.settings.primary_model;
        let body = self
            .invoke(model, self.titan_payload(prompt, seed), transport)
            .await?;
        Ok(body["images"][0].as_str().map(str::to_string))
    }

    async fn generate_fallback(
        &self,
        model: &str,
        prompt: &str,
        seed: u64,
        transport: &Transport<'_>,
    ) -> Result<Option<String>> {
        let body = self
            .invoke(model, self.stability_payload(prompt, seed), transport)
            .await?;
        Ok(body["artifacts"][0]["base64"].as_str().map(str::to_string))
    }

    /// One image: primary model first, fallback model only when the primary errors.
    async fn generate_single(
        &self,
        prompt: &str,
        index: usize,
        transport: &Transport<'_>,
    ) -> Result<Option<GeneratedImage>> {
        let (prompt, seed) = {
            let mut rng = rand::rng();
            let prompt = self.enhance_prompt(prompt, &mut rng);
            (prompt, rng.random_range(0..SEED_RANGE) + index as u64)
        };

        let payload = match self.generate_primary(&prompt, seed, transport).await {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!("Primary model {} failed: {}", self.settings.primary_model, e);
                let Some(fallback) = self.settings.fallback_model() else {
                    return Err(e);
                };
                tracing::warn!("Falling back to {}", fallback);
                self.generate_fallback(fallback, &prompt, seed, transport)
                    .await
                    .inspect_err(|fe| tracing::error!("Fallback model {} failed: {}", fallback, fe))?
            }
        };

        Ok(payload.map(|b64| {
            GeneratedImage::from_base64(
                format!("image-{}-{}", index, Utc::now().timestamp_millis()),
                b64,
            )
        }))
    }
}

#[async_trait]
impl ImageSource for BedrockImageSource {
    /// Requests run one after another. Individual failures are logged and
    /// skipped; only when every request errors is the whole call an error.
    async fn generate_images(
        &self,
        request: &ImageRequest,
        credentials: &Credentials,
    ) -> Result<Vec<GeneratedImage>> {
        let transport = self.transport(credentials);
        let mut images = Vec::with_capacity(request.count);
        let mut failures = 0;
        let mut last_error = None;

        for index in 0..request.count {
            match self.generate_single(&request.prompt, index, &transport).await {
                Ok(Some(image)) => images.push(image),
                Ok(None) => tracing::warn!("Image {} came back without image data", index + 1),
                Err(e) => {
                    tracing::error!("Failed to generate image {}: {}", index + 1, e);
                    failures += 1;
                    last_error = Some(e);
                }
            }
        }

        if let Some(e) = last_error {
            if failures == request.count {
                return Err(MoodboardError::generation(format!(
                    "all {} image requests failed; last error: {}",
                    request.count, e
                )));
            }
        }

        Ok(images)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const TITAN_PATH: &str = "/model/amazon.titan-image-generator-v1/invoke";
    const SDXL_PATH: &str = "/model/stability.stable-diffusion-xl-v1/invoke";

    fn source_for(server: &MockServer) -> BedrockImageSource {
        let settings = ImageSourceConfig {
            endpoint: Some(server.base_url()),
            ..ImageSourceConfig::default()
        };
        BedrockImageSource::new(settings).unwrap()
    }

    fn credentials() -> Credentials {
        Credentials::new("test-key", "us-east-1").unwrap()
    }

    fn request(count: usize) -> ImageRequest {
        ImageRequest {
            prompt: "ethereal forest sanctuary".to_string(),
            count,
        }
    }

    #[test]
    fn test_enhance_prompt_appends_style() {
        let source = BedrockImageSource::new(ImageSourceConfig::default()).unwrap();
        let enhanced = source.enhance_prompt("zen garden", &mut StdRng::seed_from_u64(4));

        assert!(enhanced.starts_with("zen garden, "));
        assert!(enhanced.ends_with(", 4k resolution"));
        assert!(STYLE_SUFFIXES.iter().any(|s| enhanced.contains(s)));
    }

    #[test]
    fn test_regional_endpoint_follows_credentials() {
        let source = BedrockImageSource::new(ImageSourceConfig::default()).unwrap();
        let creds = Credentials::new("k", "eu-central-1").unwrap();
        match source.transport(&creds) {
            Transport::Bearer { api_key, endpoint } => {
                assert_eq!(api_key, "k");
                assert_eq!(endpoint, "https://bedrock-runtime.eu-central-1.amazonaws.com");
            }
            Transport::Signed(_) => panic!("API key must not be signed"),
        }
    }

    #[tokio::test]
    async fn test_iam_credentials_sign_requests() {
        let server = MockServer::start();
        let titan = server.mock(|when, then| {
            when.method(POST)
                .path(TITAN_PATH)
                .header_exists("authorization")
                .header_exists("x-amz-date")
                .header("x-amz-security-token", "session-token")
                .body_contains("TEXT_IMAGE");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({ "images": ["c2lnbmVk"] }));
        });

        let creds = Credentials::iam(
            "AKIDEXAMPLE",
            "wJalrXUtnFEMI",
            Some("session-token".to_string()),
            "us-east-1",
        )
        .unwrap();
        let images = source_for(&server)
            .generate_images(&request(1), &creds)
            .await
            .unwrap();

        titan.assert();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].base64, "c2lnbmVk");
    }

    #[tokio::test]
    async fn test_titan_images_are_returned() {
        let server = MockServer::start();
        let titan = server.mock(|when, then| {
            when.method(POST)
                .path(TITAN_PATH)
                .header("authorization", "Bearer test-key")
                .body_contains("TEXT_IMAGE")
                .body_contains("ethereal forest sanctuary");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({ "images": ["aGVsbG8="] }));
        });

        let images = source_for(&server)
            .generate_images(&request(2), &credentials())
            .await
            .unwrap();

        titan.assert_hits(2);
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].base64, "aGVsbG8=");
        assert_eq!(images[0].url, "data:image/png;base64,aGVsbG8=");
        assert!(images[0].id.starts_with("image-0-"));
        assert!(images[1].id.starts_with("image-1-"));
    }

    #[tokio::test]
    async fn test_falls_back_to_stability_on_error() {
        let server = MockServer::start();
        let titan = server.mock(|when, then| {
            when.method(POST).path(TITAN_PATH);
            then.status(500).body("throttled");
        });
        let sdxl = server.mock(|when, then| {
            when.method(POST).path(SDXL_PATH).body_contains("text_prompts");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({ "artifacts": [{ "base64": "c2R4bA==" }] }));
        });

        let images = source_for(&server)
            .generate_images(&request(1), &credentials())
            .await
            .unwrap();

        titan.assert();
        sdxl.assert();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].base64, "c2R4bA==");
    }

    #[tokio::test]
    async fn test_missing_image_data_yields_empty_list() {
        let server = MockServer::start();
        let titan = server.mock(|when, then| {
            when.method(POST).path(TITAN_PATH);
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({ "images": [] }));
        });

        let images = source_for(&server)
            .generate_images(&request(2), &credentials())
            .await
            .unwrap();

        titan.assert_hits(2);
        assert!(images.is_empty());
    }

    #[tokio::test]
    async fn test_all_failures_is_generation_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST);
            then.status(503);
        });

        let err = source_for(&server)
            .generate_images(&request(2), &credentials())
            .await
            .unwrap_err();

        assert!(matches!(err, MoodboardError::Generation { .. }));
    }

    #[tokio::test]
    async fn test_no_fallback_when_disabled() {
        let server = MockServer::start();
        let titan = server.mock(|when, then| {
            when.method(POST).path(TITAN_PATH);
            then.status(500);
        });
        let sdxl = server.mock(|when, then| {
            when.method(POST).path(SDXL_PATH);
            then.status(200).json_body(json!({ "artifacts": [{ "base64": "eA==" }] }));
        });

        let settings = ImageSourceConfig {
            endpoint: Some(server.base_url()),
            fallback_model: String::new(),
            ..ImageSourceConfig::default()
        };
        let result = BedrockImageSource::new(settings)
            .unwrap()
            .generate_images(&request(1), &credentials())
            .await;

        assert!(result.is_err());
        titan.assert();
        sdxl.assert_hits(0);
    }
}
