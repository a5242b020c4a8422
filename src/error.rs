//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! ファイル全体を失敗させる`CatalogError`と、1行だけを破棄する`RowError`の
//! 2階層で構成される。

use thiserror::Error;

/// カタログ抽出全体を失敗させるエラー型
///
/// ワークブックを開けない、XLSXとして解析できない、セキュリティ制限に
/// 違反したなど、行単位では回復できない失敗を表します。
///
/// # 使用例
///
/// ```rust,no_run
/// use xlsxcatalog::{CatalogError, ExtractorBuilder};
///
/// fn load(path: &str) -> Result<usize, CatalogError> {
///     let extractor = ExtractorBuilder::new().build()?;
///     let products = extractor.extract_path(path)?;  // Ioエラーも自動的に変換される
///     Ok(products.len())
/// }
/// ```
#[derive(Error, Debug)]
pub enum CatalogError {
    /// I/O操作中に発生したエラー
    ///
    /// ファイルが存在しない、読み込み権限がないなどの場合に発生します。
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Excelファイルの解析中に発生したエラー（calamine由来）
    #[error("Failed to parse Excel file: {0}")]
    Parse(#[from] calamine::Error),

    /// ZIPアーカイブの解析エラー
    #[error("ZIP archive error: {0}")]
    Zip(String),

    /// 数値属性の解析エラー（styles.xmlのfontIdなど）
    #[error("Number parse error: {0}")]
    ParseInt(#[from] std::num::ParseIntError),

    /// ワークブック内部XMLの解析エラー
    #[error("XML error in '{part}': {message}")]
    Xml {
        /// エラーが発生したパート名（例: `xl/styles.xml`）
        part: String,
        /// エラーの詳細
        message: String,
    },

    /// 設定の検証に失敗したエラー
    ///
    /// `ExtractorBuilder::build()`時、またはサービス設定の検証時に発生します。
    ///
    /// ```rust,no_run
    /// use xlsxcatalog::{CatalogError, ExtractorBuilder};
    ///
    /// match ExtractorBuilder::new().with_default_category("  ").build() {
    ///     Err(CatalogError::Config(msg)) => println!("設定エラー: {}", msg),
    ///     _ => {}
    /// }
    /// ```
    #[error("Configuration error: {0}")]
    Config(String),

    /// XLSX以外のワークブック形式（xls、xlsb、ods）
    #[error("Unsupported workbook format: {0}")]
    UnsupportedFormat(String),

    /// 指定されたシートが見つからない
    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    /// セキュリティ制限に違反したエラー
    ///
    /// ZIP bomb、パストラバーサル、入力サイズ超過などで発生します。
    #[error("Security violation: {0}")]
    SecurityViolation(String),
}

impl CatalogError {
    pub(crate) fn xml(part: &str, err: impl std::fmt::Display) -> Self {
        CatalogError::Xml {
            part: part.to_string(),
            message: err.to_string(),
        }
    }
}

/// 1行の処理に限定されたエラー
///
/// 抽出処理はこのエラーを捕捉してログに記録し、その行を破棄して次の行へ進みます。
/// 抽出全体が失敗することはありません。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RowError {
    /// 価格文字列を数値に変換できない
    #[error("price '{0}' is not a number")]
    InvalidPrice(String),

    /// 価格セルが数値にも文字列にも該当しない型（論理値、日付、エラー値）
    #[error("price cell of type {0} cannot be converted to a number")]
    UnsupportedPriceCell(&'static str),
}
