//! Builder Module
//!
//! Fluent Builder APIを提供し、`Extractor`インスタンスを段階的に構築する。

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::api::{normalize_header, HeaderAliases, SheetSelector};
use crate::catalog::{extract_products, SheetRow, DEFAULT_CATEGORY};
use crate::error::CatalogError;
use crate::parser::{SheetGrid, WorkbookParser};
use crate::security::SecurityConfig;
use crate::types::{CellCoord, Product};

/// 抽出処理の設定を保持する内部構造体
#[derive(Debug, Clone)]
pub(crate) struct ExtractionConfig {
    /// シート選択方式
    pub sheet_selector: SheetSelector,

    /// 見出しのエイリアス
    pub header_aliases: HeaderAliases,

    /// カテゴリ見出しより前の行に割り当てるカテゴリ
    pub default_category: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            sheet_selector: SheetSelector::Active,
            header_aliases: HeaderAliases::default(),
            default_category: DEFAULT_CATEGORY.to_string(),
        }
    }
}

/// Fluent Builder APIを提供する構造体
///
/// すべての設定項目にデフォルト値が設定されており、必要な設定のみをオーバーライドできます。
///
/// # 使用例
///
/// ```rust,no_run
/// use xlsxcatalog::{ExtractorBuilder, SheetSelector};
///
/// # fn main() -> Result<(), xlsxcatalog::CatalogError> {
/// let extractor = ExtractorBuilder::new()
///     .with_sheet_selector(SheetSelector::Name("Прайс".to_string()))
///     .with_default_category("Прочее")
///     .build()?;
/// let products = extractor.extract_path("Каталог.xlsx")?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ExtractorBuilder {
    config: ExtractionConfig,
}

impl Default for ExtractorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractorBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    ///
    /// # デフォルト設定
    ///
    /// - シート選択: アクティブシート
    /// - 見出し: `HeaderAliases::default()`（ロシア語・英語の列名）
    /// - デフォルトカテゴリ: `Без категории`
    pub fn new() -> Self {
        Self {
            config: ExtractionConfig::default(),
        }
    }

    /// 抽出対象のシートを選択する
    pub fn with_sheet_selector(mut self, selector: SheetSelector) -> Self {
        self.config.sheet_selector = selector;
        self
    }

    /// 見出しのエイリアスを指定する
    ///
    /// ```rust,no_run
    /// use xlsxcatalog::{ExtractorBuilder, HeaderAliases};
    ///
    /// let builder = ExtractorBuilder::new()
    ///     .with_header_aliases(HeaderAliases::default().with_stock(["кол-во"]));
    /// ```
    pub fn with_header_aliases(mut self, aliases: HeaderAliases) -> Self {
        self.config.header_aliases = aliases;
        self
    }

    /// カテゴリ見出しより前の商品に割り当てるカテゴリを指定する
    pub fn with_default_category(mut self, category: impl Into<String>) -> Self {
        self.config.default_category = category.into();
        self
    }

    /// 設定を検証し、`Extractor`インスタンスを生成する
    ///
    /// # 発生し得るエラー
    ///
    /// * `CatalogError::Config(String)`:
    ///   * デフォルトカテゴリが空（空白のみを含む）
    ///   * いずれかのフィールドのエイリアスが空、または空文字列を含む
    ///   * 同じエイリアスが複数のフィールドに指定されている
    pub fn build(self) -> Result<Extractor, CatalogError> {
        // 1. デフォルトカテゴリの検証
        let default_category = self.config.default_category.trim();
        if default_category.is_empty() {
            return Err(CatalogError::Config(
                "Default category must not be empty".to_string(),
            ));
        }

        // 2. エイリアスの検証
        let aliases = &self.config.header_aliases;
        let mut seen: HashSet<String> = HashSet::new();
        for (field, names) in [
            ("price", &aliases.price),
            ("article", &aliases.article),
            ("stock", &aliases.stock),
        ] {
            if names.is_empty() {
                return Err(CatalogError::Config(format!(
                    "No header aliases given for '{}'",
                    field
                )));
            }
            let normalized: HashSet<String> = names.iter().map(|n| normalize_header(n)).collect();
            for name in &normalized {
                if name.is_empty() {
                    return Err(CatalogError::Config(format!(
                        "Empty header alias for '{}'",
                        field
                    )));
                }
                if seen.contains(name) {
                    return Err(CatalogError::Config(format!(
                        "Header alias '{}' is used by more than one field",
                        name
                    )));
                }
            }
            seen.extend(normalized);
        }

        let mut config = self.config;
        config.default_category = config.default_category.trim().to_string();
        Ok(Extractor::new(config))
    }
}

/// 抽出処理のファサード
///
/// Excelカタログを商品一覧に変換するためのメインエントリーポイントです。
/// 状態を持たないため、同じファイルに対する呼び出しは常に同じ結果を返します。
#[derive(Debug, Clone)]
pub struct Extractor {
    config: ExtractionConfig,
    security: SecurityConfig,
}

impl Extractor {
    pub(crate) fn new(config: ExtractionConfig) -> Self {
        Self {
            config,
            security: SecurityConfig::default(),
        }
    }

    /// パスを指定してカタログを抽出する
    ///
    /// ファイルが存在しない・読めない場合は`CatalogError::Io`を返します。
    pub fn extract_path(&self, path: impl AsRef<Path>) -> Result<Vec<Product>, CatalogError> {
        let path = path.as_ref();
        tracing::info!(path = %path.display(), "loading catalog");
        let file = File::open(path)?;
        self.extract(file)
    }

    /// リーダーからカタログを抽出する
    ///
    /// # 処理フロー
    ///
    /// 1. 入力をメモリに読み込む（サイズ制限あり）
    /// 2. WorkbookParserの初期化（セキュリティ検査、シート一覧、スタイル）
    /// 3. シートの読み込み
    /// 4. 1行目を見出しとして、2行目以降を商品に変換
    ///
    /// # 使用例
    ///
    /// ```rust,no_run
    /// use std::io::Cursor;
    /// use xlsxcatalog::ExtractorBuilder;
    ///
    /// # fn main() -> Result<(), xlsxcatalog::CatalogError> {
    /// let extractor = ExtractorBuilder::new().build()?;
    /// let excel_data: Vec<u8> = vec![]; // XLSXファイルのバイト列
    /// let products = extractor.extract(Cursor::new(excel_data))?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn extract<R: Read>(&self, input: R) -> Result<Vec<Product>, CatalogError> {
        let buffer = self.security.read_input(input)?;

        let mut parser = WorkbookParser::open(&buffer, &self.security)?;
        let grid = parser.read_sheet(&self.config.sheet_selector)?;

        let products = self.extract_grid(&grid);
        tracing::info!(sheet = grid.name(), count = products.len(), "catalog loaded");
        Ok(products)
    }

    fn extract_grid(&self, grid: &SheetGrid) -> Vec<Product> {
        if grid.height() == 0 {
            return Vec::new();
        }

        let headers = grid.row(0);
        let rows = (1..grid.height()).map(|row| SheetRow {
            number: row + 1,
            cells: grid.row(row),
            first_bold: grid.is_bold(CellCoord::new(row, 0)),
        });

        extract_products(
            &headers,
            rows,
            &self.config.header_aliases,
            &self.config.default_category,
        )
    }
}
