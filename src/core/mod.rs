pub mod cargo_image;
pub mod enrichment;
pub mod parser;
pub mod pipeline;
pub mod prompt;
pub mod schematic;
pub mod spreadsheet;

pub use crate::domain::model::{CargoImages, EnrichedAttributes, Flag, ProductRecord, ProductRow};
pub use crate::domain::ports::{FileFetcher, ImageGenerator, Storage, TextGenerator};
pub use crate::utils::error::Result;
