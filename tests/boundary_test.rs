//! Boundary Tests for xlsxcatalog
//!
//! Edge cases of sheet layout: missing header rows, wide and long sheets,
//! unusual first-column values and consecutive category rows.

use rust_xlsxwriter::*;
use std::io::Cursor;
use xlsxcatalog::{CatalogError, ExtractorBuilder, Product};

mod fixtures {
    use super::*;

    /// Data starts at row 3; row 1 is empty so no header is found
    pub fn generate_without_header_row() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        worksheet.write_string(2, 0, "Футболка")?;
        worksheet.write_number(2, 1, 500.0)?;
        worksheet.write_string(3, 0, "Шорты")?;

        Ok(workbook.save_to_buffer()?)
    }

    /// Price column far to the right of the name column
    pub fn generate_wide_sheet() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        worksheet.write_string(0, 0, "Наименование")?;
        worksheet.write_string(0, 300, "Цена")?;
        worksheet.write_string(1, 0, "Футболка")?;
        worksheet.write_number(1, 300, 500.0)?;

        Ok(workbook.save_to_buffer()?)
    }

    /// Very long product name (32,767 characters)
    pub fn generate_long_name() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        worksheet.write_string(0, 0, "Наименование")?;
        worksheet.write_string(1, 0, "Я".repeat(32_767))?;

        Ok(workbook.save_to_buffer()?)
    }

    /// Whitespace names, numeric names and stacked category rows
    pub fn generate_unusual_first_column() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        let bold = Format::new().set_bold();

        worksheet.write_string(0, 0, "Наименование")?;
        worksheet.write_string(0, 1, "Цена")?;

        // Whitespace-only name with a price is skipped
        worksheet.write_string(1, 0, "   ")?;
        worksheet.write_number(1, 1, 100.0)?;

        // Consecutive category rows: the last one wins
        worksheet.write_string_with_format(2, 0, "Одежда", &bold)?;
        worksheet.write_string_with_format(3, 0, "  Обувь  ", &bold)?;

        // Numeric name
        worksheet.write_number(4, 0, 42.0)?;
        worksheet.write_number(4, 1, 10.0)?;

        // Bold numeric cell alone on its row is a category
        worksheet.write_number_with_format(5, 0, 2024.0, &bold)?;
        worksheet.write_string(6, 0, "Календарь")?;

        Ok(workbook.save_to_buffer()?)
    }

    /// Many products in a single category
    pub fn generate_large_catalog(rows: u32) -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        let bold = Format::new().set_bold();

        worksheet.write_string(0, 0, "Наименование")?;
        worksheet.write_string(0, 1, "Остаток")?;
        worksheet.write_string_with_format(1, 0, "Склад", &bold)?;

        for i in 0..rows {
            worksheet.write_string(i + 2, 0, format!("Товар {}", i))?;
            worksheet.write_number(i + 2, 1, f64::from(i % 5))?;
        }

        Ok(workbook.save_to_buffer()?)
    }

    /// ZIP header followed by garbage
    pub fn generate_corrupted_file() -> Vec<u8> {
        let mut data = vec![0x50, 0x4B, 0x03, 0x04];
        data.extend_from_slice(b"INVALID_CONTENT");
        data
    }

    /// Minimal OpenDocument spreadsheet (mimetype + content.xml)
    pub fn generate_ods_file() -> Vec<u8> {
        use std::io::Write;
        use zip::write::{FileOptions, ZipWriter};
        use zip::CompressionMethod;

        let content = r#"<?xml version="1.0" encoding="UTF-8"?>
<office:document-content xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" xmlns:table="urn:oasis:names:tc:opendocument:xmlns:table:1.0" xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0" office:version="1.2"><office:body><office:spreadsheet><table:table table:name="Прайс"><table:table-row><table:table-cell office:value-type="string"><text:p>Наименование</text:p></table:table-cell></table:table-row></table:table></office:spreadsheet></office:body></office:document-content>"#;

        let mut data = Vec::new();
        {
            let mut zip = ZipWriter::new(Cursor::new(&mut data));
            let options = FileOptions::default().compression_method(CompressionMethod::Stored);
            zip.start_file("mimetype", options).unwrap();
            zip.write_all(b"application/vnd.oasis.opendocument.spreadsheet").unwrap();
            zip.start_file("content.xml", options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
            zip.finish().unwrap();
        }
        data
    }
}

fn extract(data: Vec<u8>) -> Vec<Product> {
    let extractor = ExtractorBuilder::new().build().unwrap();
    extractor.extract(Cursor::new(data)).unwrap()
}

#[test]
fn test_sheet_without_header_row() {
    let products = extract(fixtures::generate_without_header_row().unwrap());

    // Without headers every optional field is unset
    assert_eq!(products.len(), 2);
    assert_eq!(products[0].name(), "Футболка");
    assert_eq!(products[0].price(), None);
    assert_eq!(products[0].category(), "Без категории");
    assert_eq!(products[1].name(), "Шорты");
}

#[test]
fn test_wide_sheet() {
    let products = extract(fixtures::generate_wide_sheet().unwrap());
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].price(), Some(500.0));
}

#[test]
fn test_very_long_name() {
    let products = extract(fixtures::generate_long_name().unwrap());
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].name().chars().count(), 32_767);
}

#[test]
fn test_unusual_first_column() {
    let products = extract(fixtures::generate_unusual_first_column().unwrap());

    let summary: Vec<(&str, &str, Option<f64>)> = products
        .iter()
        .map(|p| (p.name(), p.category(), p.price()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("42", "Обувь", Some(10.0)),
            ("Календарь", "2024", None),
        ]
    );
}

#[test]
fn test_large_catalog() {
    let products = extract(fixtures::generate_large_catalog(5_000).unwrap());

    assert_eq!(products.len(), 5_000);
    assert!(products.iter().all(|p| p.category() == "Склад"));
    assert_eq!(products[4_999].name(), "Товар 4999");
    assert_eq!(products[4_999].stock(), 4);
}

#[test]
#[ignore] // Time-consuming test
fn test_very_large_catalog() {
    let products = extract(fixtures::generate_large_catalog(200_000).unwrap());
    assert_eq!(products.len(), 200_000);
}

#[test]
fn test_corrupted_file() {
    let extractor = ExtractorBuilder::new().build().unwrap();
    let result = extractor.extract(Cursor::new(fixtures::generate_corrupted_file()));

    match result {
        Err(CatalogError::Zip(_)) | Err(CatalogError::Parse(_)) | Err(CatalogError::Io(_)) => {}
        other => panic!("Expected Zip, Parse or Io error, got {:?}", other),
    }
}

#[test]
fn test_non_xlsx_workbook_is_not_a_config_error() {
    let extractor = ExtractorBuilder::new().build().unwrap();
    let result = extractor.extract(Cursor::new(fixtures::generate_ods_file()));

    match result {
        Err(CatalogError::UnsupportedFormat(format)) => assert_eq!(format, "ods"),
        // calamine may reject the minimal document before detecting the format
        Err(CatalogError::Parse(_)) | Err(CatalogError::Zip(_)) => {}
        other => panic!("Expected UnsupportedFormat, got {:?}", other),
    }
}
