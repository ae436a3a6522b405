//! Amazon Bedrock runtime adapter for the Titan text and image models.

use crate::config::{ImageConfig, TextGenerationConfig, TomlConfig};
use crate::domain::ports::{ImageGenerator, TextGenerator};
use crate::utils::error::{AppError, Result};
use async_trait::async_trait;
use aws_config::retry::RetryConfig;
use aws_config::timeout::TimeoutConfig;
use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_bedrockruntime::config::Region;
use aws_sdk_bedrockruntime::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_bedrockruntime::primitives::Blob;
use aws_sdk_bedrockruntime::Client;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Shared SDK configuration: region, standard retry mode and fixed
/// connect/read timeouts for every outbound AWS call.
pub async fn load_sdk_config(config: &TomlConfig) -> SdkConfig {
    let timeout = Duration::from_secs(config.inference.timeout_seconds);

    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.aws.region.clone()))
        .retry_config(RetryConfig::standard().with_max_attempts(config.inference.max_attempts))
        .timeout_config(
            TimeoutConfig::builder()
                .connect_timeout(timeout)
                .read_timeout(timeout)
                .build(),
        )
        .load()
        .await
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TitanTextRequest<'a> {
    input_text: &'a str,
    text_generation_config: TitanTextGenerationConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TitanTextGenerationConfig {
    max_token_count: u32,
    stop_sequences: Vec<String>,
    temperature: f32,
    top_p: f32,
}

#[derive(Deserialize)]
struct TitanTextResponse {
    #[serde(default)]
    results: Vec<TitanTextResult>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TitanTextResult {
    output_text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TitanImageRequest<'a> {
    task_type: &'static str,
    text_to_image_params: TextToImageParams<'a>,
    image_generation_config: ImageGenerationConfig,
}

#[derive(Serialize)]
struct TextToImageParams<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageGenerationConfig {
    number_of_images: u32,
    height: u32,
    width: u32,
    cfg_scale: f32,
    seed: u32,
}

#[derive(Deserialize)]
struct TitanImageResponse {
    #[serde(default)]
    images: Vec<String>,
    #[serde(default)]
    error: Option<String>,
}

pub fn encode_text_request(prompt: &str, config: &TextGenerationConfig) -> Result<Vec<u8>> {
    let request = TitanTextRequest {
        input_text: prompt,
        text_generation_config: TitanTextGenerationConfig {
            max_token_count: config.max_token_count,
            stop_sequences: Vec::new(),
            temperature: config.temperature,
            top_p: config.top_p,
        },
    };
    Ok(serde_json::to_vec(&request)?)
}

pub fn decode_text_response(body: &[u8]) -> Result<String> {
    let response: TitanTextResponse = serde_json::from_slice(body)?;
    response
        .results
        .into_iter()
        .next()
        .map(|r| r.output_text)
        .ok_or_else(|| AppError::InferenceError {
            message: "text model response has no results[0].outputText".to_string(),
        })
}

pub fn encode_image_request(prompt: &str, config: &ImageConfig) -> Result<Vec<u8>> {
    let request = TitanImageRequest {
        task_type: "TEXT_IMAGE",
        text_to_image_params: TextToImageParams { text: prompt },
        image_generation_config: ImageGenerationConfig {
            number_of_images: 1,
            height: config.height,
            width: config.width,
            cfg_scale: config.cfg_scale,
            seed: config.seed,
        },
    };
    Ok(serde_json::to_vec(&request)?)
}

/// An `error` embedded in an otherwise successful body wins over any image.
pub fn decode_image_response(body: &[u8]) -> Result<Vec<u8>> {
    let response: TitanImageResponse = serde_json::from_slice(body)?;

    if let Some(error) = response.error {
        return Err(AppError::GenerationError { message: error });
    }

    let encoded = response
        .images
        .into_iter()
        .next()
        .ok_or_else(|| AppError::InferenceError {
            message: "image model response has no images".to_string(),
        })?;

    Ok(STANDARD.decode(encoded.as_bytes())?)
}

#[derive(Clone)]
pub struct BedrockClient {
    client: Client,
    text_model_id: String,
    image_model_id: String,
    text_config: TextGenerationConfig,
    image_config: ImageConfig,
}

impl BedrockClient {
    pub fn new(sdk_config: &SdkConfig, config: &TomlConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
            text_model_id: config.inference.text_model_id.clone(),
            image_model_id: config.inference.image_model_id.clone(),
            text_config: config.text_generation.clone(),
            image_config: config.image.clone(),
        }
    }

    async fn invoke(&self, model_id: &str, body: Vec<u8>) -> Result<Vec<u8>> {
        tracing::debug!("Invoking model {}", model_id);

        let output = self
            .client
            .invoke_model()
            .model_id(model_id)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(body))
            .send()
            .await
            .map_err(|e| {
                let message = e
                    .as_service_error()
                    .and_then(|se| se.message())
                    .map(str::to_string)
                    .unwrap_or_else(|| DisplayErrorContext(&e).to_string());
                tracing::error!("A client error occurred invoking {}: {}", model_id, message);
                AppError::InferenceError { message }
            })?;

        tracing::debug!("Model {} invoked successfully", model_id);
        Ok(output.body.into_inner())
    }
}

#[async_trait]
impl TextGenerator for BedrockClient {
    async fn generate_text(&self, prompt: &str) -> Result<String> {
        let body = encode_text_request(prompt, &self.text_config)?;
        let response = self.invoke(&self.text_model_id, body).await?;
        decode_text_response(&response)
    }
}

#[async_trait]
impl ImageGenerator for BedrockClient {
    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>> {
        let body = encode_image_request(prompt, &self.image_config)?;
        let response = self.invoke(&self.image_model_id, body).await?;
        decode_image_response(&response)
    }
}
