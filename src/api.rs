//! Public API Types
//!
//! 公開APIで使用する列挙型・設定型を定義するモジュール。

use serde::Deserialize;

/// シート選択方式
///
/// 抽出対象のシートを選択する方法を指定します。
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum SheetSelector {
    /// 保存時にアクティブだったシート（デフォルト）
    ///
    /// `xl/workbook.xml`の`<workbookView activeTab="..">`で決まります。
    /// 指定がない場合は先頭のシートです。
    #[default]
    Active,

    /// インデックス指定（0始まり）
    Index(usize),

    /// シート名指定
    Name(String),
}

/// 見出し行の列名と商品フィールドの対応
///
/// 見出しは前後の空白を除去し、小文字化してから比較されます。
/// エイリアス自体も同じ正規化を経るため、大文字・小文字は区別されません。
///
/// # 使用例
///
/// ```rust
/// use xlsxcatalog::HeaderAliases;
///
/// let aliases = HeaderAliases::default().with_price(["цена, руб."]);
/// assert!(aliases.price.contains(&"цена, руб.".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HeaderAliases {
    /// 価格列（デフォルト: `цена`, `price`）
    pub price: Vec<String>,
    /// 商品コード列（デフォルト: `код`, `артикул`, `code`, `article`）
    pub article: Vec<String>,
    /// 在庫数列（デフォルト: `остаток`, `stock`, `remainder`）
    pub stock: Vec<String>,
}

impl Default for HeaderAliases {
    fn default() -> Self {
        Self {
            price: to_strings(["цена", "price"]),
            article: to_strings(["код", "артикул", "code", "article"]),
            stock: to_strings(["остаток", "stock", "remainder"]),
        }
    }
}

impl HeaderAliases {
    /// 価格列のエイリアスを置き換える
    pub fn with_price<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.price = aliases.into_iter().map(Into::into).collect();
        self
    }

    /// 商品コード列のエイリアスを置き換える
    pub fn with_article<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.article = aliases.into_iter().map(Into::into).collect();
        self
    }

    /// 在庫数列のエイリアスを置き換える
    pub fn with_stock<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stock = aliases.into_iter().map(Into::into).collect();
        self
    }
}

fn to_strings<const N: usize>(values: [&str; N]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

/// 見出しの正規化（前後の空白除去 + 小文字化）
pub(crate) fn normalize_header(text: &str) -> String {
    text.trim().to_lowercase()
}
