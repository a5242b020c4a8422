//! Service Configuration
//!
//! HTTPサービスの設定（TOML）を読み込むモジュール。

use serde::Deserialize;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use axum::http::HeaderValue;

use crate::api::{HeaderAliases, SheetSelector};
use crate::builder::{Extractor, ExtractorBuilder};
use crate::catalog::DEFAULT_CATEGORY;
use crate::error::CatalogError;

/// 設定ファイルのパスを指定する環境変数
pub const CONFIG_ENV: &str = "XLSXCATALOG_CONFIG";

/// バイナリに埋め込まれたデフォルト設定
pub const DEFAULT_CONFIG: &str = r#"
[server]
host = "0.0.0.0"
port = 8000

[catalog]
path = "Каталог.xlsx"
default_category = "Без категории"

[cors]
allowed_origin = "https://telegram-catalog.vercel.app"

[logging]
filter = "info,tower_http=info"
"#;

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub catalog: CatalogConfig,
    pub cors: CorsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,

    /// 相対パスの基準ディレクトリ（設定ファイルの置き場所）
    #[serde(skip)]
    base_dir: Option<PathBuf>,

    /// 読み込んだ設定ファイル（埋め込みのデフォルトなら`None`）
    #[serde(skip)]
    source: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    pub path: String,
    #[serde(default = "default_category")]
    pub default_category: String,
    #[serde(default)]
    pub sheet: SheetSelector,
    #[serde(default)]
    pub headers: HeaderAliases,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allowed_origin: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info,tower_http=info".to_string(),
        }
    }
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

impl ServiceConfig {
    /// TOML文字列から設定を読み込む
    ///
    /// `base_dir`は相対パスの解決に使われます。`None`の場合はカレントディレクトリ基準です。
    pub fn from_toml_str(contents: &str, base_dir: Option<&Path>) -> anyhow::Result<Self> {
        let mut config: ServiceConfig = toml::from_str(contents)?;
        config.base_dir = base_dir.map(Path::to_path_buf);
        Ok(config)
    }

    /// ファイルから設定を読み込む
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let mut config = Self::from_toml_str(&contents, path.parent())
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// 設定の読み込み元ファイル
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// 設定値の検証
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.catalog.path.trim().is_empty() {
            bail!("catalog.path must not be empty");
        }
        if self.catalog.default_category.trim().is_empty() {
            bail!("catalog.default_category must not be empty");
        }
        if self.cors.allowed_origin.trim().is_empty()
            || HeaderValue::from_str(&self.cors.allowed_origin).is_err()
        {
            bail!(
                "cors.allowed_origin '{}' is not a valid origin",
                self.cors.allowed_origin
            );
        }
        Ok(())
    }

    /// カタログファイルのパス
    ///
    /// 相対パスは設定ファイルのディレクトリを基準に解決します。
    pub fn catalog_path(&self) -> PathBuf {
        let path = Path::new(&self.catalog.path);
        match &self.base_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// `host:port`形式の待ち受けアドレス
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// 設定から抽出器を組み立てる
    pub fn extractor(&self) -> Result<Extractor, CatalogError> {
        ExtractorBuilder::new()
            .with_sheet_selector(self.catalog.sheet.clone())
            .with_header_aliases(self.catalog.headers.clone())
            .with_default_category(self.catalog.default_category.clone())
            .build()
    }
}

/// 設定の読み込み
///
/// 探索順:
/// 1. 環境変数`XLSXCATALOG_CONFIG`のパス
/// 2. 実行ファイルと同じディレクトリの`config.toml`
/// 3. 埋め込みのデフォルト設定
///
/// ロガー初期化前に呼ばれるため、ここではログを出しません。
/// 読み込み元は[`ServiceConfig::source`]で確認できます。
pub fn load_config() -> anyhow::Result<ServiceConfig> {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return ServiceConfig::from_file(Path::new(&path));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");
            if config_path.exists() {
                return ServiceConfig::from_file(&config_path);
            }
        }
    }

    ServiceConfig::from_toml_str(DEFAULT_CONFIG, None)
}
