#![allow(dead_code)]

use aircargo_enrich::config::ImageConfig;
use aircargo_enrich::core::{ImageGenerator, TextGenerator};
use aircargo_enrich::{AppError, AppState, Result, UrlFetcher};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// Text model double that answers every prompt with the same reply and
/// records the prompts it saw.
pub struct StubTextGenerator {
    reply: String,
    pub prompts: Mutex<Vec<String>>,
}

impl StubTextGenerator {
    pub fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl TextGenerator for StubTextGenerator {
    async fn generate_text(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.reply.clone())
    }
}

pub enum ImageBehavior {
    Png,
    EmbeddedError(&'static str),
}

pub struct StubImageGenerator {
    behavior: ImageBehavior,
    calls: AtomicUsize,
}

impl StubImageGenerator {
    pub fn new(behavior: ImageBehavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageGenerator for StubImageGenerator {
    async fn generate_image(&self, _prompt: &str) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            ImageBehavior::Png => Ok(tiny_png()),
            ImageBehavior::EmbeddedError(message) => Err(AppError::GenerationError {
                message: message.to_string(),
            }),
        }
    }
}

pub fn tiny_png() -> Vec<u8> {
    let mut png = Vec::new();
    RgbImage::from_pixel(8, 8, Rgb([200, 120, 40]))
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .unwrap();
    png
}

pub fn test_app(text: Arc<StubTextGenerator>, image: Arc<StubImageGenerator>) -> Router {
    let fetch_config = aircargo_enrich::config::FetchConfig {
        timeout_seconds: 5,
        retry_attempts: 1,
        retry_delay_ms: 1,
    };
    let fetcher = UrlFetcher::new(&fetch_config).unwrap();

    let state = AppState::new(text, image, Arc::new(fetcher), &ImageConfig::default());
    aircargo_enrich::build_router(state)
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}
