use crate::core::parser::parse_attributes;
use crate::core::prompt::enrichment_prompt;
use crate::domain::model::{ProductRecord, ProductRow};
use crate::domain::ports::TextGenerator;
use crate::utils::error::Result;
use std::sync::Arc;

/// Derives shipping attributes for products, one model call per product.
#[derive(Clone)]
pub struct EnrichmentService {
    generator: Arc<dyn TextGenerator>,
}

impl EnrichmentService {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    pub async fn enrich(&self, row: ProductRow) -> Result<ProductRecord> {
        tracing::info!("Processing product: {}", row.name);

        let prompt = enrichment_prompt(&row);
        let output = self.generator.generate_text(&prompt).await?;
        tracing::debug!("Model output for '{}': {}", row.name, output);

        let attributes = parse_attributes(&output);
        Ok(ProductRecord::from_row(row, attributes))
    }

    /// Enriches rows in order. The first failure aborts the batch.
    pub async fn enrich_all(&self, rows: Vec<ProductRow>) -> Result<Vec<ProductRecord>> {
        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            records.push(self.enrich(row).await?);
        }
        Ok(records)
    }
}
