//! Prompt assembly for the two hosted models.

use crate::domain::model::{ProductRecord, ProductRow};
use crate::utils::error::{AppError, Result};
use std::fmt::Write;

const CARGO_PROMPT_HEADER: &str =
    "Generate an image of an air cargo setup with the following parcels:\n\n";
const CARGO_PROMPT_FOOTER: &str = "The image should show the parcels arranged in the air cargo with their dimensions accurately represented.";

/// Builds the instruction asking the text model for a JSON-shaped answer.
/// The JSON shape is requested, never enforced.
pub fn enrichment_prompt(row: &ProductRow) -> String {
    let name = &row.name;
    let description = row.description.as_deref().unwrap_or("");

    format!(
        "Provide product details for '{name}' in the following JSON format:\n\
         {{\n\
         \x20   \"Product Name\": \"{name}\",\n\
         \x20   \"Product Description\": \"{description}\",\n\
         \x20   \"Dimensions\": <width> x <height> x <length>,\n\
         \x20   \"Perishable\": \"<True/False>\",\n\
         \x20   \"Explosive\": \"<True/False>\"\n\
         }}\n\
         The dimensions should be randomized numbers in inches, and the perishable and explosive properties should be based on one of the words in the product name."
    )
}

/// Concatenates one fixed-format block per product.
pub fn cargo_prompt(products: &[ProductRecord]) -> String {
    let mut prompt = String::from(CARGO_PROMPT_HEADER);

    for product in products {
        // Writing into a String cannot fail
        let _ = writeln!(prompt, "Product: {}", product.name);
        let _ = writeln!(
            prompt,
            "Description: {}",
            product.description.as_deref().unwrap_or("")
        );
        let _ = writeln!(prompt, "Dimensions: {}", product.dimensions);
        let _ = writeln!(prompt, "Perishable: {}", product.perishable);
        let _ = writeln!(prompt, "Explosive: {}", product.explosive);
        prompt.push('\n');
    }

    prompt.push_str(CARGO_PROMPT_FOOTER);
    prompt
}

/// Fails with `PromptTooLong` when `prompt` has more than `limit` characters.
pub fn check_prompt_length(prompt: &str, limit: usize) -> Result<()> {
    let length = prompt.chars().count();
    if length > limit {
        return Err(AppError::PromptTooLong { length, limit });
    }
    Ok(())
}
