//! Types Module
//!
//! クレート全体で使用する共通データ型を定義するモジュール。

use serde::Serialize;

/// セルの値を表す列挙型
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CellValue {
    /// 数値（f64）
    Number(f64),

    /// 文字列
    String(String),

    /// 論理値
    Bool(bool),

    /// 日付・時刻（Excelのシリアル値、またはISO文字列）
    DateTime(String),

    /// エラー値（例: #DIV/0!）
    Error(String),

    /// 空セル
    Empty,
}

impl CellValue {
    /// calamineのセル値から変換
    pub fn from_data(data: &calamine::Data) -> Self {
        use calamine::Data;

        match data {
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Float(f) => CellValue::Number(*f),
            Data::String(s) => CellValue::String(s.clone()),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::DateTime(dt) => CellValue::DateTime(dt.as_f64().to_string()),
            Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::DateTime(s.clone()),
            Data::Error(e) => CellValue::Error(format!("{:?}", e)),
            Data::Empty => CellValue::Empty,
            #[allow(unreachable_patterns)]
            _ => CellValue::Empty,
        }
    }

    /// 値を文字列として取得（書式適用前）
    ///
    /// 整数値の数値は小数点なしで表現されます（`10.0` -> `"10"`）。
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Number(n) => n.to_string(),
            CellValue::String(s) => s.clone(),
            CellValue::Bool(true) => "TRUE".to_string(),
            CellValue::Bool(false) => "FALSE".to_string(),
            CellValue::DateTime(s) => s.clone(),
            CellValue::Error(e) => e.clone(),
            CellValue::Empty => String::new(),
        }
    }

    /// 空、または空白のみの文字列かどうか
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// ログ・エラーメッセージ用の型名
    pub fn type_name(&self) -> &'static str {
        match self {
            CellValue::Number(_) => "number",
            CellValue::String(_) => "string",
            CellValue::Bool(_) => "bool",
            CellValue::DateTime(_) => "datetime",
            CellValue::Error(_) => "error",
            CellValue::Empty => "empty",
        }
    }
}

/// セル座標（0始まり）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct CellCoord {
    pub row: u32,
    pub col: u32,
}

impl CellCoord {
    /// 新しい座標を生成
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// A1形式のセル参照を座標に変換（例: "B3" -> (2, 1)）
    ///
    /// 列文字の後に1以上の行番号が続かない場合は`None`を返します。
    pub fn from_a1(reference: &str) -> Option<Self> {
        let split = reference
            .find(|c: char| c.is_ascii_digit())
            .filter(|&idx| idx > 0)?;
        let (letters, digits) = reference.split_at(split);

        let mut col: u32 = 0;
        for ch in letters.chars() {
            if !ch.is_ascii_alphabetic() {
                return None;
            }
            let val = (ch.to_ascii_uppercase() as u32) - ('A' as u32) + 1;
            col = col.checked_mul(26)?.checked_add(val)?;
        }

        let row = digits.parse::<u32>().ok()?.checked_sub(1)?;
        Some(Self::new(row, col - 1))
    }
}

/// 在庫状況
///
/// `Product`の在庫数からのみ導出され、単独で設定されることはありません。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StockStatus {
    #[serde(rename = "В НАЛИЧИИ")]
    InStock,
    #[serde(rename = "НЕТ В НАЛИЧИИ")]
    OutOfStock,
}

impl StockStatus {
    /// 在庫数から状況を導出
    pub fn from_stock(stock: u64) -> Self {
        if stock > 0 {
            StockStatus::InStock
        } else {
            StockStatus::OutOfStock
        }
    }

    /// 出力される表示文字列
    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::InStock => "В НАЛИЧИИ",
            StockStatus::OutOfStock => "НЕТ В НАЛИЧИИ",
        }
    }
}

/// カタログの1商品
///
/// 抽出処理のたびに新しく構築され、構築後に変更されることはありません。
/// JSONでは`name`, `price`, `category`, `article`, `stock`, `in_stock`の順に
/// シリアライズされ、値のない`price`と`article`は`null`になります。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    name: String,
    price: Option<f64>,
    category: String,
    article: Option<String>,
    stock: u64,
    in_stock: StockStatus,
}

impl Product {
    /// 商品を生成する。`in_stock`は`stock`から導出される。
    pub fn new(
        name: impl Into<String>,
        price: Option<f64>,
        category: impl Into<String>,
        article: Option<String>,
        stock: u64,
    ) -> Self {
        Self {
            name: name.into(),
            price,
            category: category.into(),
            article,
            stock,
            in_stock: StockStatus::from_stock(stock),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> Option<f64> {
        self.price
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn article(&self) -> Option<&str> {
        self.article.as_deref()
    }

    pub fn stock(&self) -> u64 {
        self.stock
    }

    pub fn in_stock(&self) -> StockStatus {
        self.in_stock
    }
}
