use crate::core::enrichment::EnrichmentService;
use crate::core::spreadsheet::parse_products;
use crate::domain::model::{ProductRecord, ProductRow};
use crate::domain::ports::FileFetcher;
use crate::utils::error::Result;
use std::sync::Arc;

/// Spreadsheet URL in, enriched product records out.
#[derive(Clone)]
pub struct ProcessPipeline {
    fetcher: Arc<dyn FileFetcher>,
    enrichment: EnrichmentService,
}

impl ProcessPipeline {
    pub fn new(fetcher: Arc<dyn FileFetcher>, enrichment: EnrichmentService) -> Self {
        Self {
            fetcher,
            enrichment,
        }
    }

    pub async fn extract(&self, file_url: &str) -> Result<Vec<ProductRow>> {
        tracing::debug!("Downloading spreadsheet from: {}", file_url);
        let bytes = self.fetcher.fetch(file_url).await?;
        tracing::debug!("Downloaded {} bytes", bytes.len());

        parse_products(&bytes)
    }

    pub async fn transform(&self, rows: Vec<ProductRow>) -> Result<Vec<ProductRecord>> {
        self.enrichment.enrich_all(rows).await
    }

    pub async fn run(&self, file_url: &str) -> Result<Vec<ProductRecord>> {
        let rows = self.extract(file_url).await?;
        tracing::info!("Extracted {} products", rows.len());

        let records = self.transform(rows).await?;
        tracing::info!("Enriched {} products", records.len());

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::TextGenerator;
    use crate::utils::error::AppError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MapFetcher {
        files: HashMap<String, Vec<u8>>,
    }

    #[async_trait]
    impl FileFetcher for MapFetcher {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
            self.files
                .get(url)
                .cloned()
                .ok_or_else(|| AppError::FetchStatusError {
                    url: url.to_string(),
                    status: 404,
                })
        }
    }

    #[derive(Default)]
    struct CountingGenerator {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TextGenerator for CountingGenerator {
        async fn generate_text(&self, _prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok("Dimensions: 1 x 2 x 3\nPerishable: false\nExplosive: false".to_string())
        }
    }

    fn pipeline(files: &[(&str, &str)], generator: Arc<CountingGenerator>) -> ProcessPipeline {
        let fetcher = MapFetcher {
            files: files
                .iter()
                .map(|(url, body)| (url.to_string(), body.as_bytes().to_vec()))
                .collect(),
        };
        ProcessPipeline::new(Arc::new(fetcher), EnrichmentService::new(generator))
    }

    #[tokio::test]
    async fn test_run_enriches_every_row() {
        let generator = Arc::new(CountingGenerator::default());
        let pipeline = pipeline(
            &[(
                "https://files.test/products.csv",
                "product_name,product_description\nTent,Camping tent\nRope,\n",
            )],
            generator.clone(),
        );

        let records = pipeline.run("https://files.test/products.csv").await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Tent");
        assert_eq!(records[0].description.as_deref(), Some("Camping tent"));
        assert_eq!(records[1].dimensions, "1 x 2 x 3");
        assert_eq!(generator.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_schema_error_skips_inference() {
        let generator = Arc::new(CountingGenerator::default());
        let pipeline = pipeline(
            &[("https://files.test/bad.csv", "name\nTent\n")],
            generator.clone(),
        );

        let result = pipeline.run("https://files.test/bad.csv").await;

        assert!(matches!(result, Err(AppError::SpreadsheetError { .. })));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fetch_error_propagates() {
        let generator = Arc::new(CountingGenerator::default());
        let pipeline = pipeline(&[], generator);

        let result = pipeline.run("https://files.test/missing.csv").await;

        assert!(matches!(result, Err(AppError::FetchStatusError { status: 404, .. })));
    }
}
