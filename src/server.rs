//! HTTP Service
//!
//! `GET /products`でカタログを返すaxumルーター。
//! リクエストごとにファイルを読み直すため、ファイルの差し替えは再起動なしで反映されます。

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::builder::Extractor;
use crate::error::CatalogError;
use crate::types::Product;

/// ハンドラー間で共有する状態
#[derive(Debug, Clone)]
pub struct AppState {
    extractor: Arc<Extractor>,
    catalog_path: PathBuf,
}

impl AppState {
    pub fn new(extractor: Extractor, catalog_path: impl Into<PathBuf>) -> Self {
        Self {
            extractor: Arc::new(extractor),
            catalog_path: catalog_path.into(),
        }
    }
}

/// リクエスト処理中のエラー
///
/// どの失敗も`500`と`{"error": "..."}`で応答します。
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("extraction task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "failed to serve catalog");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}

/// 単一オリジン向けのCORSレイヤー
///
/// 一致するオリジンにのみ`Access-Control-Allow-Origin`を返します。
/// 資格情報付きリクエストを許可し、メソッドとヘッダーはプリフライト要求をそのまま返します。
pub fn cors_layer(allowed_origin: HeaderValue) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list([allowed_origin]))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

pub fn router(state: AppState, allowed_origin: HeaderValue) -> Router {
    Router::new()
        .route("/products", get(list_products))
        .with_state(state)
        .layer(cors_layer(allowed_origin))
        .layer(TraceLayer::new_for_http())
}

async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>, ApiError> {
    let extractor = Arc::clone(&state.extractor);
    let path = state.catalog_path.clone();

    // calamineは同期APIなのでブロッキングスレッドで実行
    let products = tokio::task::spawn_blocking(move || extractor.extract_path(&path)).await??;

    Ok(Json(products))
}
