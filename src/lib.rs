//! xlsxcatalog - Product catalog extractor for XLSX price lists
//!
//! This crate reads a product price list from an Excel workbook (XLSX) and turns
//! it into a flat list of products, each tagged with the category of the nearest
//! bold heading row above it. A small HTTP service exposes the list as JSON.
//!
//! # Sheet layout
//!
//! - Row 1 is the header row. Columns are matched by name, case-insensitively
//!   (`Цена`/`Price`, `Код`/`Артикул`/`Code`/`Article`, `Остаток`/`Stock`/`Remainder`).
//! - Column A holds the product name.
//! - A row whose column A is bold and whose other cells are empty starts a new category.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use xlsxcatalog::ExtractorBuilder;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let extractor = ExtractorBuilder::new().build()?;
//!
//!     let products = extractor.extract_path("Каталог.xlsx")?;
//!     for product in &products {
//!         println!("{} / {} / {:?}", product.category(), product.name(), product.price());
//!     }
//!
//!     // The HTTP response body uses the same serialization
//!     println!("{}", serde_json::to_string(&products)?);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Custom Configuration
//!
//! ```rust,no_run
//! use xlsxcatalog::{ExtractorBuilder, HeaderAliases, SheetSelector};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let extractor = ExtractorBuilder::new()
//!         .with_sheet_selector(SheetSelector::Name("Прайс".to_string()))
//!         .with_header_aliases(HeaderAliases::default().with_stock(["кол-во", "остаток"]))
//!         .with_default_category("Прочее")
//!         .build()?;
//!
//!     let products = extractor.extract(std::fs::File::open("price.xlsx")?)?;
//!     println!("{} products", products.len());
//!
//!     Ok(())
//! }
//! ```

mod api;
mod builder;
mod catalog;
pub mod config;
mod error;
mod parser;
mod security;
pub mod server;
mod types;

// 公開API
pub use api::{HeaderAliases, SheetSelector};
pub use builder::{Extractor, ExtractorBuilder};
pub use catalog::DEFAULT_CATEGORY;
pub use error::{CatalogError, RowError};
pub use types::{Product, StockStatus};
