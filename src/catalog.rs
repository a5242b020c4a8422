//! Catalog Module
//!
//! シートの行を商品レコードに変換するモジュール。
//! 見出し行から列位置を決め、太字の見出し行をカテゴリとして追跡し、
//! 各セルを型付きの値に変換します。不正な行はログに記録して破棄します。

use std::collections::HashMap;

use crate::api::{normalize_header, HeaderAliases};
use crate::error::RowError;
use crate::types::{CellValue, Product};

/// カテゴリ見出しがまだ現れていない行に割り当てるカテゴリ
pub const DEFAULT_CATEGORY: &str = "Без категории";

/// データ行（2行目以降）の1行
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SheetRow {
    /// 1始まりの行番号（ログ用）
    pub number: u32,
    /// A列から最終使用列までのセル値
    pub cells: Vec<CellValue>,
    /// A列のセルが太字かどうか
    pub first_bold: bool,
}

/// 見出し行から求めた各フィールドの列位置（0始まり）
///
/// 見出しが見つからないフィールドは`None`になり、全行で未設定として扱われます。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ColumnMap {
    pub price: Option<usize>,
    pub article: Option<usize>,
    pub stock: Option<usize>,
}

impl ColumnMap {
    /// 見出し行から列位置を求める
    ///
    /// 同じ見出しが複数ある場合は右側の列が優先されます。
    pub fn from_headers(headers: &[CellValue], aliases: &HeaderAliases) -> Self {
        let mut positions: HashMap<String, usize> = HashMap::new();
        for (idx, cell) in headers.iter().enumerate() {
            if cell.is_blank() {
                continue;
            }
            positions.insert(normalize_header(&cell.as_text()), idx);
        }

        let lookup = |names: &[String]| {
            names
                .iter()
                .find_map(|name| positions.get(&normalize_header(name)).copied())
        };

        Self {
            price: lookup(aliases.price.as_slice()),
            article: lookup(aliases.article.as_slice()),
            stock: lookup(aliases.stock.as_slice()),
        }
    }
}

/// 行の種類
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RowKind {
    /// A列が空（スキップ）
    Blank,
    /// 太字のA列以外がすべて空の行。新しいカテゴリ名を持つ。
    Category(String),
    /// 商品行。トリム済みの商品名を持つ。
    Product(String),
}

/// 行を分類する
pub(crate) fn classify_row(row: &SheetRow) -> RowKind {
    let name = row
        .cells
        .first()
        .map(|cell| cell.as_text().trim().to_string())
        .unwrap_or_default();

    if name.is_empty() {
        return RowKind::Blank;
    }

    if row.first_bold && row.cells.iter().skip(1).all(CellValue::is_blank) {
        return RowKind::Category(name);
    }

    RowKind::Product(name)
}

/// 価格を変換する
///
/// 空セルは`None`。数値セルはそのまま、文字列はトリムして`f64`に変換します。
/// 変換できない値、有限でない値はエラーです。
pub(crate) fn parse_price(cell: &CellValue) -> Result<Option<f64>, RowError> {
    if cell.is_blank() {
        return Ok(None);
    }

    let price = match cell {
        CellValue::Number(n) => *n,
        CellValue::String(s) => {
            let text = s.trim();
            text.parse::<f64>()
                .map_err(|_| RowError::InvalidPrice(text.to_string()))?
        }
        other => return Err(RowError::UnsupportedPriceCell(other.type_name())),
    };

    if !price.is_finite() {
        return Err(RowError::InvalidPrice(cell.as_text().trim().to_string()));
    }
    Ok(Some(price))
}

/// 商品コードを変換する。空なら`None`。
pub(crate) fn parse_article(cell: &CellValue) -> Option<String> {
    if cell.is_blank() {
        return None;
    }
    Some(cell.as_text().trim().to_string())
}

/// 在庫数を変換する
///
/// トリム後の文字列がASCII数字のみの場合だけ整数として読み、それ以外
/// （空、`abc`、`-5`、`+3`、`2.5`）は0になります。日付・論理値・エラーも0です。
/// `u64`に収まらない数字列は`u64::MAX`に飽和します。
pub(crate) fn parse_stock(cell: &CellValue) -> u64 {
    let text = match cell {
        CellValue::String(_) | CellValue::Number(_) => cell.as_text(),
        _ => return 0,
    };
    let text = text.trim();
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return 0;
    }

    text.parse::<u64>().unwrap_or(u64::MAX)
}

fn cell_at(cells: &[CellValue], column: Option<usize>) -> &CellValue {
    const EMPTY: &CellValue = &CellValue::Empty;
    column.and_then(|idx| cells.get(idx)).unwrap_or(EMPTY)
}

/// 商品行からProductを組み立てる
pub(crate) fn build_product(
    name: &str,
    cells: &[CellValue],
    columns: &ColumnMap,
    category: &str,
) -> Result<Product, RowError> {
    let price = parse_price(cell_at(cells, columns.price))?;
    let article = parse_article(cell_at(cells, columns.article));
    let stock = parse_stock(cell_at(cells, columns.stock));

    Ok(Product::new(name, price, category, article, stock))
}

/// 見出し行とデータ行から商品一覧を抽出する
///
/// 行の順序は保持されます。1行の変換失敗が全体を失敗させることはありません。
pub(crate) fn extract_products<I>(
    headers: &[CellValue],
    rows: I,
    aliases: &HeaderAliases,
    default_category: &str,
) -> Vec<Product>
where
    I: IntoIterator<Item = SheetRow>,
{
    let columns = ColumnMap::from_headers(headers, aliases);
    tracing::debug!(?columns, "resolved catalog columns");

    let mut category = default_category.to_string();
    let mut products = Vec::new();

    for row in rows {
        match classify_row(&row) {
            RowKind::Blank => {}
            RowKind::Category(name) => category = name,
            RowKind::Product(name) => match build_product(&name, &row.cells, &columns, &category) {
                Ok(product) => products.push(product),
                Err(e) => {
                    tracing::warn!(row = row.number, name = %name, error = %e, "skipping malformed row");
                }
            },
        }
    }

    products
}
