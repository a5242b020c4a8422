//! Security Module
//!
//! 入力ファイルとZIPアーカイブに対する制限をまとめたモジュール。
//! カタログは外部から差し替えられるファイルなので、解析前に必ず検査する。

use std::io::{Read, Seek};
use zip::ZipArchive;

use crate::error::CatalogError;

/// セキュリティ設定
#[derive(Debug, Clone)]
pub(crate) struct SecurityConfig {
    /// 展開後の合計最大サイズ（デフォルト: 1GB）
    pub max_decompressed_size: u64,
    /// ZIPアーカイブ内の最大エントリ数（デフォルト: 10000）
    pub max_file_count: usize,
    /// 単一エントリの最大サイズ（デフォルト: 100MB）
    pub max_file_size: u64,
    /// 入力ファイルの最大サイズ（デフォルト: 2GB）
    pub max_input_file_size: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_decompressed_size: 1_073_741_824,
            max_file_count: 10_000,
            max_file_size: 104_857_600,
            max_input_file_size: 2_147_483_648,
        }
    }
}

impl SecurityConfig {
    /// 入力全体を読み込み、サイズ上限を検査したバッファを返す
    pub fn read_input<R: Read>(&self, reader: R) -> Result<Vec<u8>, CatalogError> {
        let mut buffer = Vec::new();
        let bytes_read = reader
            .take(self.max_input_file_size + 1)
            .read_to_end(&mut buffer)?;

        if bytes_read as u64 > self.max_input_file_size {
            return Err(CatalogError::SecurityViolation(format!(
                "Input file size exceeds maximum: more than {} bytes",
                self.max_input_file_size
            )));
        }
        Ok(buffer)
    }

    /// アーカイブ全体を検査する
    ///
    /// エントリ数、各エントリのパスとサイズ、展開後の合計サイズを確認します。
    /// どれか1つでも違反すれば`CatalogError::SecurityViolation`を返します。
    pub fn check_archive<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
    ) -> Result<(), CatalogError> {
        if archive.len() > self.max_file_count {
            return Err(CatalogError::SecurityViolation(format!(
                "ZIP archive contains too many files: {} (max: {})",
                archive.len(),
                self.max_file_count
            )));
        }

        let mut total_decompressed_size = 0u64;
        for i in 0..archive.len() {
            let entry = archive
                .by_index(i)
                .map_err(|e| CatalogError::Zip(e.to_string()))?;

            validate_zip_path(entry.name()).map_err(|e| {
                CatalogError::SecurityViolation(format!("Invalid ZIP path: {}", e))
            })?;

            if entry.size() > self.max_file_size {
                return Err(CatalogError::SecurityViolation(format!(
                    "File '{}' exceeds maximum size: {} bytes (max: {} bytes)",
                    entry.name(),
                    entry.size(),
                    self.max_file_size
                )));
            }

            total_decompressed_size = total_decompressed_size
                .checked_add(entry.size())
                .ok_or_else(|| {
                    CatalogError::SecurityViolation(
                        "Total decompressed size calculation overflow".to_string(),
                    )
                })?;
            if total_decompressed_size > self.max_decompressed_size {
                return Err(CatalogError::SecurityViolation(format!(
                    "Total decompressed size exceeds maximum: {} bytes (max: {} bytes)",
                    total_decompressed_size, self.max_decompressed_size
                )));
            }
        }

        Ok(())
    }
}

/// ZIPエントリ名の検証
///
/// 空のパス、絶対パス、`..`、バックスラッシュを含むパスを拒否します。
pub(crate) fn validate_zip_path(path: &str) -> Result<(), String> {
    if path.is_empty() {
        return Err("Empty path is not allowed".to_string());
    }

    let bytes = path.as_bytes();
    let has_drive_prefix = bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':';
    if path.starts_with('/') || has_drive_prefix {
        return Err(format!("Absolute path is not allowed: {}", path));
    }

    if path.split('/').any(|segment| segment == "..") {
        return Err(format!("Path traversal detected: {}", path));
    }

    if path.contains('\\') {
        return Err(format!("Backslash in path is not allowed: {}", path));
    }

    Ok(())
}
