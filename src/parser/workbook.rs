//! Workbook Module
//!
//! calamineでセル値を、XlsxMetadataParserでスタイルを読み込み、
//! 1シート分の`SheetGrid`を組み立てます。

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader, Sheets, Xlsx};
use std::collections::HashMap;
use std::io::Cursor;

use crate::api::SheetSelector;
use crate::error::CatalogError;
use crate::parser::metadata::{SheetEntry, StyleTable, WorkbookSheets, XlsxMetadataParser};
use crate::security::SecurityConfig;
use crate::types::{CellCoord, CellValue};

/// ワークブックパーサー
///
/// calamineのワークブックとXMLメタデータパーサーを束ねます。
/// 入力はメモリ上のバイト列を借用し、ファイルを再読込することはありません。
pub(crate) struct WorkbookParser<'a> {
    workbook: Xlsx<Cursor<&'a [u8]>>,
    metadata: XlsxMetadataParser<'a>,
    sheets: WorkbookSheets,
    styles: StyleTable,
}

impl<'a> WorkbookParser<'a> {
    /// ワークブックを開き、シート一覧とスタイルを解析する
    ///
    /// セキュリティ検査はcalamineに渡す前に行います。
    ///
    /// # 戻り値
    ///
    /// * `Err(CatalogError::SecurityViolation)` - アーカイブが制限に違反している場合
    /// * `Err(CatalogError::Parse)` - XLSXとして開けない場合
    /// * `Err(CatalogError::UnsupportedFormat)` - XLSX以外の形式の場合
    pub fn open(data: &'a [u8], security: &SecurityConfig) -> Result<Self, CatalogError> {
        let mut metadata = XlsxMetadataParser::new(data, security)?;

        let workbook = match open_workbook_auto_from_rs(Cursor::new(data))? {
            Sheets::Xlsx(workbook) => workbook,
            Sheets::Xls(_) => return Err(CatalogError::UnsupportedFormat("xls".to_string())),
            Sheets::Xlsb(_) => return Err(CatalogError::UnsupportedFormat("xlsb".to_string())),
            Sheets::Ods(_) => return Err(CatalogError::UnsupportedFormat("ods".to_string())),
        };

        let sheets = metadata.workbook_sheets()?;
        let styles = metadata.styles()?;

        Ok(Self {
            workbook,
            metadata,
            sheets,
            styles,
        })
    }

    /// シート選択方式に基づいてシートを選択
    ///
    /// # 戻り値
    ///
    /// * `Err(CatalogError::SheetNotFound)` - 該当するシートがない場合
    pub fn select_sheet(&self, selector: &SheetSelector) -> Result<SheetEntry, CatalogError> {
        let entry = match selector {
            SheetSelector::Active => self.sheets.active(),
            SheetSelector::Index(index) => self.sheets.sheets.get(*index),
            SheetSelector::Name(name) => self.sheets.sheets.iter().find(|s| &s.name == name),
        };

        entry.cloned().ok_or_else(|| {
            CatalogError::SheetNotFound(match selector {
                SheetSelector::Active => "active sheet".to_string(),
                SheetSelector::Index(index) => format!(
                    "index {} (total: {})",
                    index,
                    self.sheets.sheets.len()
                ),
                SheetSelector::Name(name) => name.clone(),
            })
        })
    }

    /// 選択されたシートを値とスタイル付きで読み込む
    pub fn read_sheet(&mut self, selector: &SheetSelector) -> Result<SheetGrid, CatalogError> {
        let entry = self.select_sheet(selector)?;
        tracing::debug!(sheet = %entry.name, part = ?entry.part, "reading sheet");

        let cells = self
            .workbook
            .worksheet_range(&entry.name)
            .map_err(|e| CatalogError::Parse(e.into()))?;

        let styles = match &entry.part {
            Some(part) => self.metadata.cell_styles(part)?,
            None => HashMap::new(),
        };

        Ok(SheetGrid {
            name: entry.name,
            cells,
            styles,
            style_table: self.styles.clone(),
        })
    }
}

/// 1シート分のセル値とスタイル
///
/// 座標はすべて絶対座標（A1 = (0, 0)）です。calamineの`Range`は最初の使用セルから
/// 始まるため、ここで絶対座標に揃えます。
#[derive(Debug, Clone)]
pub(crate) struct SheetGrid {
    name: String,
    cells: Range<Data>,
    styles: HashMap<CellCoord, u32>,
    style_table: StyleTable,
}

impl SheetGrid {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 最終使用行までの行数（A1から数える）
    pub fn height(&self) -> u32 {
        self.cells.end().map(|(row, _)| row + 1).unwrap_or(0)
    }

    /// 最終使用列までの列数（A列から数える）
    pub fn width(&self) -> u32 {
        self.cells.end().map(|(_, col)| col + 1).unwrap_or(0)
    }

    /// セル値を取得。範囲外は空セル。
    pub fn value(&self, coord: CellCoord) -> CellValue {
        self.cells
            .get_value((coord.row, coord.col))
            .map(CellValue::from_data)
            .unwrap_or(CellValue::Empty)
    }

    /// 1行分のセル値（A列から最終使用列まで）
    pub fn row(&self, row: u32) -> Vec<CellValue> {
        (0..self.width())
            .map(|col| self.value(CellCoord::new(row, col)))
            .collect()
    }

    /// セルのフォントが太字かどうか
    pub fn is_bold(&self, coord: CellCoord) -> bool {
        let style_id = self.styles.get(&coord).copied().unwrap_or(0);
        self.style_table.is_bold(style_id)
    }
}

// ワークブック全体の読み込みは実際のXLSXファイルが必要なため、統合テスト（tests/）で検証します。
