//! XML Metadata Parser Module
//!
//! XLSX内部のXMLファイルから、calamineで取得不可能な情報を抽出するモジュール。
//! シートの並びとアクティブシート、フォントの太字設定、セルごとのスタイル番号を提供します。

use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::io::{Cursor, Read};
use zip::ZipArchive;

use crate::error::CatalogError;
use crate::security::SecurityConfig;
use crate::types::CellCoord;

const WORKBOOK_PART: &str = "xl/workbook.xml";
const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";
const STYLES_PART: &str = "xl/styles.xml";

/// ワークブック内の1シート（workbook.xmlの`<sheet>`要素）
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SheetEntry {
    /// シート名
    pub name: String,
    /// ワークシートXMLのパート名（例: `xl/worksheets/sheet1.xml`）
    pub part: Option<String>,
}

/// シート一覧とアクティブシート
#[derive(Debug, Clone, Default)]
pub(crate) struct WorkbookSheets {
    /// ワークブック内の並び順
    pub sheets: Vec<SheetEntry>,
    /// `<workbookView activeTab="..">`の値（未指定時は0）
    pub active_tab: usize,
}

impl WorkbookSheets {
    /// アクティブシートを取得
    ///
    /// `activeTab`が範囲外の場合は先頭シートにフォールバックします。
    pub fn active(&self) -> Option<&SheetEntry> {
        self.sheets
            .get(self.active_tab)
            .or_else(|| self.sheets.first())
    }
}

/// styles.xmlから得たフォント情報
///
/// `cellXfs`のインデックス（セルの`s`属性）からフォントを引き、太字かどうかを判定します。
#[derive(Debug, Clone, Default)]
pub(crate) struct StyleTable {
    /// fontId -> 太字かどうか
    bold_fonts: Vec<bool>,
    /// cellXfsインデックス -> fontId
    xf_fonts: Vec<u32>,
}

impl StyleTable {
    /// スタイル番号のフォントが太字かどうか
    ///
    /// 範囲外のスタイル番号・フォント番号は太字でないものとして扱います。
    pub fn is_bold(&self, style_id: u32) -> bool {
        self.xf_fonts
            .get(style_id as usize)
            .and_then(|font_id| self.bold_fonts.get(*font_id as usize))
            .copied()
            .unwrap_or(false)
    }
}

/// XLSXメタデータパーサー
///
/// XLSXファイル（ZIPアーカイブ）からXMLを直接解析します。
/// 生成時にアーカイブ全体のセキュリティ検査を行います。
pub(crate) struct XlsxMetadataParser<'a> {
    archive: ZipArchive<Cursor<&'a [u8]>>,
}

impl<'a> XlsxMetadataParser<'a> {
    /// メモリ上のXLSXデータからパーサーを生成
    ///
    /// # 戻り値
    ///
    /// * `Err(CatalogError::Zip)` - ZIPアーカイブとして読めない場合
    /// * `Err(CatalogError::SecurityViolation)` - アーカイブが制限に違反している場合
    pub fn new(data: &'a [u8], security: &SecurityConfig) -> Result<Self, CatalogError> {
        let mut archive =
            ZipArchive::new(Cursor::new(data)).map_err(|e| CatalogError::Zip(e.to_string()))?;
        security.check_archive(&mut archive)?;
        Ok(Self { archive })
    }

    /// アーカイブ内のパートを読み込む。存在しない場合は`None`。
    fn read_part(&mut self, name: &str) -> Result<Option<Vec<u8>>, CatalogError> {
        let mut file = match self.archive.by_name(name) {
            Ok(file) => file,
            Err(zip::result::ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(CatalogError::Zip(e.to_string())),
        };
        let mut content = Vec::new();
        file.read_to_end(&mut content)?;
        Ok(Some(content))
    }

    /// xl/workbook.xml と xl/_rels/workbook.xml.rels を解析
    pub fn workbook_sheets(&mut self) -> Result<WorkbookSheets, CatalogError> {
        let workbook_xml = match self.read_part(WORKBOOK_PART)? {
            Some(xml) => xml,
            None => return Ok(WorkbookSheets::default()),
        };
        let relationships = match self.read_part(WORKBOOK_RELS_PART)? {
            Some(xml) => parse_relationships(&xml, WORKBOOK_RELS_PART)?,
            None => HashMap::new(),
        };

        let mut reader = Reader::from_reader(workbook_xml.as_slice());
        reader.trim_text(true);

        let mut buf = Vec::new();
        let mut result = WorkbookSheets::default();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                    b"workbookView" => {
                        // <workbookView activeTab="1"/>
                        if let Some(tab) = attribute(&e, b"activeTab", WORKBOOK_PART)? {
                            result.active_tab = tab.parse()?;
                        }
                    }
                    b"sheet" => {
                        // <sheet name="Прайс" sheetId="1" r:id="rId1"/>
                        let name = attribute(&e, b"name", WORKBOOK_PART)?.unwrap_or_default();
                        let part = attribute(&e, b"id", WORKBOOK_PART)?
                            .and_then(|rid| relationships.get(&rid))
                            .map(|target| resolve_target(target));
                        result.sheets.push(SheetEntry { name, part });
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(CatalogError::xml(WORKBOOK_PART, e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(result)
    }

    /// xl/styles.xml の`<fonts>`と`<cellXfs>`を解析
    ///
    /// styles.xmlが存在しない場合は空のテーブル（すべて太字でない）を返します。
    pub fn styles(&mut self) -> Result<StyleTable, CatalogError> {
        let xml = match self.read_part(STYLES_PART)? {
            Some(xml) => xml,
            None => return Ok(StyleTable::default()),
        };

        let mut reader = Reader::from_reader(xml.as_slice());
        reader.trim_text(true);

        let mut buf = Vec::new();
        let mut table = StyleTable::default();
        let mut in_fonts = false;
        let mut in_font = false;
        let mut in_cell_xfs = false;

        loop {
            buf.clear();
            let event = reader.read_event_into(&mut buf);
            match event {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                    let is_empty = matches!(event, Ok(Event::Empty(_)));
                    match e.local_name().as_ref() {
                        b"fonts" if !is_empty => in_fonts = true,
                        b"font" if in_fonts => {
                            table.bold_fonts.push(false);
                            in_font = !is_empty;
                        }
                        b"b" if in_font => {
                            // <b/> または <b val="0"/>（ST_OnOff）
                            let enabled = attribute(e, b"val", STYLES_PART)?
                                .map(|v| !matches!(v.as_str(), "0" | "false" | "off"))
                                .unwrap_or(true);
                            if let Some(last) = table.bold_fonts.last_mut() {
                                *last = enabled;
                            }
                        }
                        b"cellXfs" if !is_empty => in_cell_xfs = true,
                        b"xf" if in_cell_xfs => {
                            // <xf numFmtId="0" fontId="1" fillId="0" borderId="0" applyFont="1"/>
                            let font_id = match attribute(e, b"fontId", STYLES_PART)? {
                                Some(id) => id.parse()?,
                                None => 0,
                            };
                            table.xf_fonts.push(font_id);
                        }
                        _ => {}
                    }
                }
                Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                    b"fonts" => in_fonts = false,
                    b"font" => in_font = false,
                    b"cellXfs" => in_cell_xfs = false,
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(CatalogError::xml(STYLES_PART, e)),
                _ => {}
            }
        }

        Ok(table)
    }

    /// ワークシートXMLからセルごとのスタイル番号（`s`属性）を収集
    ///
    /// `s`属性のないセルはスタイル0として扱うため、マップには含めません。
    /// `r`属性が省略されたセル・行は直前の位置から推定します。
    pub fn cell_styles(&mut self, part: &str) -> Result<HashMap<CellCoord, u32>, CatalogError> {
        let xml = self
            .read_part(part)?
            .ok_or_else(|| CatalogError::Zip(format!("worksheet part '{}' is missing", part)))?;

        let mut reader = Reader::from_reader(xml.as_slice());
        reader.trim_text(true);

        let mut buf = Vec::new();
        let mut styles = HashMap::new();
        let mut next_row: u32 = 0;
        let mut current_row: u32 = 0;
        let mut next_col: u32 = 0;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                    b"row" => {
                        // <row r="15">（1始まり）
                        current_row = match attribute(&e, b"r", part)? {
                            Some(r) => r.parse::<u32>()?.saturating_sub(1),
                            None => next_row,
                        };
                        next_row = current_row + 1;
                        next_col = 0;
                    }
                    b"c" => {
                        // <c r="A1" s="3" t="s">
                        let coord = attribute(&e, b"r", part)?
                            .and_then(|r| CellCoord::from_a1(&r))
                            .unwrap_or_else(|| CellCoord::new(current_row, next_col));
                        next_col = coord.col + 1;

                        if let Some(style) = attribute(&e, b"s", part)? {
                            let style: u32 = style.parse()?;
                            if style != 0 {
                                styles.insert(coord, style);
                            }
                        }
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(CatalogError::xml(part, e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(styles)
    }
}

/// 要素の属性値を取得（名前空間プレフィックスは無視）
fn attribute(
    element: &BytesStart<'_>,
    key: &[u8],
    part: &str,
) -> Result<Option<String>, CatalogError> {
    for attr in element.attributes() {
        let attr = attr.map_err(|e| CatalogError::xml(part, e))?;
        if attr.key.local_name().as_ref() == key {
            let raw = String::from_utf8_lossy(&attr.value);
            let value = unescape(&raw).map_err(|e| CatalogError::xml(part, e))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// リレーションシップファイルを解析（Id -> Target）
fn parse_relationships(xml: &[u8], part: &str) -> Result<HashMap<String, String>, CatalogError> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut relationships = HashMap::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"Relationship" {
                    let id = attribute(&e, b"Id", part)?;
                    let target = attribute(&e, b"Target", part)?;
                    if let (Some(id), Some(target)) = (id, target) {
                        relationships.insert(id, target);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(CatalogError::xml(part, e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(relationships)
}

/// workbook.xml.relsのTargetをアーカイブ内のパート名に変換
///
/// 相対パスは`xl/`基準、`/`始まりはアーカイブルート基準として解決します。
fn resolve_target(target: &str) -> String {
    let joined = match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{}", target),
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}
