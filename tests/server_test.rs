//! HTTP Service Tests
//!
//! Drives the axum router directly with `tower::ServiceExt::oneshot`.

use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderValue, Method, Request, StatusCode};
use axum::Router;
use rust_xlsxwriter::*;
use std::path::Path;
use tower::ServiceExt;
use xlsxcatalog::server::{router, AppState};
use xlsxcatalog::ExtractorBuilder;

const ORIGIN: &str = "https://telegram-catalog.vercel.app";

fn write_catalog(path: &Path) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let bold = Format::new().set_bold();

    worksheet.write_string(0, 0, "Наименование")?;
    worksheet.write_string(0, 1, "Цена")?;
    worksheet.write_string(0, 2, "Код")?;
    worksheet.write_string(0, 3, "Остаток")?;

    worksheet.write_string_with_format(1, 0, "Одежда", &bold)?;
    worksheet.write_string(2, 0, "Футболка")?;
    worksheet.write_number(2, 1, 500.0)?;
    worksheet.write_string(2, 2, "A1")?;
    worksheet.write_string(2, 3, "10")?;
    worksheet.write_string(3, 0, "Шорты")?;

    workbook.save(path)
}

fn app(catalog_path: &Path) -> Router {
    let extractor = ExtractorBuilder::new().build().unwrap();
    router(
        AppState::new(extractor, catalog_path),
        HeaderValue::from_static(ORIGIN),
    )
}

async fn body_json(body: Body) -> serde_json::Value {
    let bytes = to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_get_products() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Каталог.xlsx");
    write_catalog(&path).unwrap();

    let response = app(&path)
        .oneshot(Request::get("/products").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json"
    );

    let json = body_json(response.into_body()).await;
    assert_eq!(
        json,
        serde_json::json!([
            {
                "name": "Футболка",
                "price": 500.0,
                "category": "Одежда",
                "article": "A1",
                "stock": 10,
                "in_stock": "В НАЛИЧИИ"
            },
            {
                "name": "Шорты",
                "price": null,
                "category": "Одежда",
                "article": null,
                "stock": 0,
                "in_stock": "НЕТ В НАЛИЧИИ"
            }
        ])
    );
}

#[tokio::test]
async fn test_file_is_reread_per_request() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Каталог.xlsx");
    let app = app(&path);

    // No file yet
    let response = app
        .clone()
        .oneshot(Request::get("/products").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    // File appears without restarting the service
    write_catalog(&path).unwrap();
    let response = app
        .oneshot(Request::get("/products").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response.into_body()).await;
    assert_eq!(json.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_repeated_requests_return_identical_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Каталог.xlsx");
    write_catalog(&path).unwrap();
    let app = app(&path);

    let first = app
        .clone()
        .oneshot(Request::get("/products").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let second = app
        .oneshot(Request::get("/products").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(second.status(), StatusCode::OK);

    let first = body_json(first.into_body()).await;
    let second = body_json(second.into_body()).await;
    assert_eq!(first.as_array().unwrap().len(), 2);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_missing_file_returns_error_body() {
    let dir = tempfile::tempdir().unwrap();
    let response = app(&dir.path().join("missing.xlsx"))
        .oneshot(Request::get("/products").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("IO error"));
}

#[tokio::test]
async fn test_corrupt_file_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Каталог.xlsx");
    std::fs::write(&path, b"not an excel file").unwrap();

    let response = app(&path)
        .oneshot(Request::get("/products").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response.into_body()).await;
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_cors_allowed_origin() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Каталог.xlsx");
    write_catalog(&path).unwrap();

    let response = app(&path)
        .oneshot(
            Request::get("/products")
                .header(header::ORIGIN, ORIGIN)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        ORIGIN
    );
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
        "true"
    );
}

#[tokio::test]
async fn test_cors_other_origin_not_allowed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Каталог.xlsx");
    write_catalog(&path).unwrap();

    let response = app(&path)
        .oneshot(
            Request::get("/products")
                .header(header::ORIGIN, "https://evil.example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

#[tokio::test]
async fn test_cors_preflight_mirrors_request() {
    let dir = tempfile::tempdir().unwrap();
    let response = app(&dir.path().join("Каталог.xlsx"))
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/products")
                .header(header::ORIGIN, ORIGIN)
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "x-telegram-init-data")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        ORIGIN
    );
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_METHODS).unwrap(),
        "GET"
    );
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_HEADERS).unwrap(),
        "x-telegram-init-data"
    );
}

#[tokio::test]
async fn test_unknown_route() {
    let dir = tempfile::tempdir().unwrap();
    let response = app(&dir.path().join("Каталог.xlsx"))
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_post_not_allowed() {
    let dir = tempfile::tempdir().unwrap();
    let response = app(&dir.path().join("Каталог.xlsx"))
        .oneshot(
            Request::post("/products")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
