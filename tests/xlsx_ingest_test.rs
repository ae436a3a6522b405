use aircargo_enrich::core::spreadsheet::parse_products;
use aircargo_enrich::core::ProductRow;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
</Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets><sheet name="Products" sheetId="1" r:id="rId1"/></sheets>
</workbook>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
</Relationships>"#;

fn inline(cell: &str, text: &str) -> String {
    format!(r#"<c r="{}" t="inlineStr"><is><t>{}</t></is></c>"#, cell, text)
}

fn sheet_xml(rows: &[(&str, &str)]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );
    for (i, (a, b)) in rows.iter().enumerate() {
        let r = i + 1;
        xml.push_str(&format!(
            r#"<row r="{}">{}{}</row>"#,
            r,
            inline(&format!("A{}", r), a),
            inline(&format!("B{}", r), b)
        ));
    }
    xml.push_str("</sheetData></worksheet>");
    xml
}

fn build_xlsx(rows: &[(&str, &str)]) -> Vec<u8> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let parts = [
        ("[Content_Types].xml", CONTENT_TYPES.to_string()),
        ("_rels/.rels", ROOT_RELS.to_string()),
        ("xl/workbook.xml", WORKBOOK.to_string()),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS.to_string()),
        ("xl/worksheets/sheet1.xml", sheet_xml(rows)),
    ];

    for (name, content) in parts {
        zip.start_file::<_, ()>(name, FileOptions::default()).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }

    zip.finish().unwrap().into_inner()
}

#[test]
fn test_xlsx_rows_are_read_from_first_sheet() {
    let bytes = build_xlsx(&[
        ("product_name", "product_description"),
        ("Lithium Battery Pack", "Rechargeable"),
        ("Frozen Peas", "1kg bag"),
    ]);

    let rows = parse_products(&bytes).unwrap();

    assert_eq!(
        rows,
        vec![
            ProductRow::new("Lithium Battery Pack", Some("Rechargeable".to_string())),
            ProductRow::new("Frozen Peas", Some("1kg bag".to_string())),
        ]
    );
}

#[test]
fn test_xlsx_missing_name_column() {
    let bytes = build_xlsx(&[("item", "product_description"), ("Tent", "Camping")]);

    let err = parse_products(&bytes).unwrap_err();

    assert!(err.to_string().contains("missing required column 'product_name'"));
}
