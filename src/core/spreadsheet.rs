use crate::domain::model::ProductRow;
use crate::utils::error::{AppError, Result};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::io::Cursor;

pub const NAME_COLUMN: &str = "product_name";
pub const DESCRIPTION_COLUMN: &str = "product_description";

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0];

/// Reads product rows from a workbook (xlsx, xls, ods: first sheet) or,
/// when the bytes are not a workbook container, from CSV.
pub fn parse_products(bytes: &[u8]) -> Result<Vec<ProductRow>> {
    let table = if bytes.starts_with(ZIP_MAGIC) || bytes.starts_with(OLE_MAGIC) {
        read_workbook(bytes)?
    } else {
        read_csv(bytes)?
    };

    rows_from_table(table)
}

fn read_workbook(bytes: &[u8]) -> Result<Vec<Vec<String>>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::SpreadsheetError {
            message: "workbook contains no worksheets".to_string(),
        })??;

    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect())
}

fn read_csv(bytes: &[u8]) -> Result<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let mut table = Vec::new();
    for record in reader.records() {
        let record = record?;
        table.push(record.iter().map(str::to_string).collect());
    }
    Ok(table)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        // Whole numbers come back as floats from most writers
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}

fn rows_from_table(table: Vec<Vec<String>>) -> Result<Vec<ProductRow>> {
    let mut rows = table.into_iter();

    let header = rows.next().ok_or_else(|| AppError::SpreadsheetError {
        message: "spreadsheet is empty".to_string(),
    })?;

    let column = |wanted: &str| header.iter().position(|h| h.trim() == wanted);

    let name_idx = column(NAME_COLUMN).ok_or_else(|| AppError::SpreadsheetError {
        message: format!(
            "missing required column '{}' (found: {})",
            NAME_COLUMN,
            header.join(", ")
        ),
    })?;
    let description_idx = column(DESCRIPTION_COLUMN);

    tracing::debug!("Spreadsheet columns: {:?}", header);

    let mut products = Vec::new();
    for (line, row) in rows.enumerate() {
        let name = row.get(name_idx).map(|s| s.trim()).unwrap_or("");
        if name.is_empty() {
            tracing::warn!("Skipping row {} without a product name", line + 2);
            continue;
        }

        let description = description_idx.map(|idx| {
            row.get(idx)
                .map(|s| s.trim().to_string())
                .unwrap_or_default()
        });

        products.push(ProductRow::new(name, description));
    }

    Ok(products)
}
