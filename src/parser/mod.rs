//! Parser Module
//!
//! calamineによるセル値の読み込みと、XLSX内部XMLからのスタイル解析。

mod metadata;
mod workbook;

pub(crate) use workbook::{SheetGrid, WorkbookParser};
