use crate::core::prompt::{cargo_prompt, check_prompt_length};
use crate::core::schematic::render_schematic;
use crate::domain::model::{CargoImages, ProductRecord};
use crate::domain::ports::ImageGenerator;
use crate::utils::error::{AppError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::sync::Arc;

/// Renders the cargo-hold picture for a set of enriched products.
#[derive(Clone)]
pub struct CargoImageService {
    generator: Arc<dyn ImageGenerator>,
    max_prompt_chars: usize,
    render_schematic: bool,
}

impl CargoImageService {
    pub fn new(
        generator: Arc<dyn ImageGenerator>,
        max_prompt_chars: usize,
        render_schematic: bool,
    ) -> Self {
        Self {
            generator,
            max_prompt_chars,
            render_schematic,
        }
    }

    /// `include_schematic` overrides the configured default for one call.
    pub async fn generate(
        &self,
        products: &[ProductRecord],
        include_schematic: Option<bool>,
    ) -> Result<CargoImages> {
        if products.is_empty() {
            return Err(AppError::ValidationError {
                message: "products must not be empty".to_string(),
            });
        }

        let prompt = cargo_prompt(products);
        tracing::debug!("Cargo prompt: {}", prompt);
        // Oversized prompts never reach the image service
        check_prompt_length(&prompt, self.max_prompt_chars)?;

        let image_bytes = self.generator.generate_image(&prompt).await?;
        let image_url = to_data_uri(&image_bytes)?;

        let schematic_image_url = if include_schematic.unwrap_or(self.render_schematic) {
            match render_schematic(products)? {
                Some(png) => Some(to_data_uri(&png)?),
                None => {
                    tracing::warn!("No parcel had readable dimensions, schematic omitted");
                    None
                }
            }
        } else {
            None
        };

        Ok(CargoImages {
            image_url,
            schematic_image_url,
        })
    }
}

/// Checks that `bytes` decode as an image and wraps them in a data URI.
pub fn to_data_uri(bytes: &[u8]) -> Result<String> {
    let format = image::guess_format(bytes)?;
    image::load_from_memory_with_format(bytes, format)?;

    Ok(format!(
        "data:{};base64,{}",
        format.to_mime_type(),
        STANDARD.encode(bytes)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Flag;
    use async_trait::async_trait;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubImages {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ImageGenerator for StubImages {
        async fn generate_image(&self, _prompt: &str) -> Result<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut png = Vec::new();
            RgbImage::from_pixel(4, 4, Rgb([10, 20, 30]))
                .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
                .unwrap();
            Ok(png)
        }
    }

    fn service(render_schematic: bool) -> (Arc<StubImages>, CargoImageService) {
        let stub = Arc::new(StubImages {
            calls: AtomicUsize::new(0),
        });
        let service = CargoImageService::new(stub.clone(), 512, render_schematic);
        (stub, service)
    }

    fn parcel(name: &str) -> ProductRecord {
        ProductRecord {
            name: name.to_string(),
            description: None,
            dimensions: "10 x 5 x 3".to_string(),
            perishable: Flag::False,
            explosive: Flag::True,
        }
    }

    #[tokio::test]
    async fn test_generate_returns_png_data_uri() {
        let (stub, service) = service(false);

        let images = service.generate(&[parcel("Fireworks")], None).await.unwrap();

        assert!(images.image_url.starts_with("data:image/png;base64,"));
        assert!(images.schematic_image_url.is_none());
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_schematic_follows_request_override() {
        let (_, service) = service(false);

        let images = service
            .generate(&[parcel("Fireworks")], Some(true))
            .await
            .unwrap();

        let schematic = images.schematic_image_url.unwrap();
        assert!(schematic.starts_with("data:image/png;base64,"));
    }

    #[tokio::test]
    async fn test_long_prompt_is_rejected_before_generation() {
        let (stub, service) = service(true);
        let products: Vec<ProductRecord> = (0..10).map(|i| parcel(&format!("Parcel {}", i))).collect();

        let result = service.generate(&products, None).await;

        assert!(matches!(result, Err(AppError::PromptTooLong { limit: 512, .. })));
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_products_rejected() {
        let (stub, service) = service(false);

        let result = service.generate(&[], None).await;

        assert!(matches!(result, Err(AppError::ValidationError { .. })));
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_data_uri_rejects_non_image() {
        assert!(matches!(
            to_data_uri(b"definitely not an image"),
            Err(AppError::ImageError { .. })
        ));
    }
}
