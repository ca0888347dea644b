//! Image API integration tests.
//!
//! Run with: `cargo test -p mediahub-api --test images_test`

mod helpers;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use helpers::{bearer, fixtures, setup_test_app};
use serde_json::Value;

fn png_form(field: &str) -> MultipartForm {
    MultipartForm::new().add_part(
        field,
        Part::bytes(fixtures::create_test_png(16, 8))
            .file_name("photo.png")
            .mime_type("image/png"),
    )
}

#[tokio::test]
async fn test_upload_image_stores_reencoded_file() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/upload/image")
        .add_header("Authorization", bearer())
        .multipart(png_form("image"))
        .await;

    response.assert_status_ok();
    let served = response.text();
    let filename = served
        .strip_prefix("image/")
        .expect("response is image/<filename>");
    assert!(filename.ends_with(".png"), "unexpected name {}", filename);

    let stored = std::fs::read(app.path(&format!("images/{}", filename))).unwrap();
    let decoded = image::load_from_memory(&stored).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (16, 8));
}

#[tokio::test]
async fn test_upload_image_from_base64_buffer() {
    let app = setup_test_app().await;
    let encoded = STANDARD.encode(fixtures::create_test_png(4, 4));

    let form = MultipartForm::new()
        .add_text("buffer", encoded)
        .add_text("mimetype", "image/png")
        .add_text("filename", "inline.png");
    let response = app
        .client()
        .post("/upload/image/60")
        .add_header("Authorization", bearer())
        .multipart(form)
        .await;

    response.assert_status_ok();
    assert!(response.text().starts_with("image/"));
}

#[tokio::test]
async fn test_upload_image_without_file_is_bad_request() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/upload/image")
        .add_header("Authorization", bearer())
        .multipart(MultipartForm::new().add_text("note", "nothing here"))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "No image provided");
}

#[tokio::test]
async fn test_upload_image_rejects_out_of_range_quality() {
    let app = setup_test_app().await;

    for quality in ["0", "101", "high"] {
        let response = app
            .client()
            .post(&format!("/upload/image/{}", quality))
            .add_header("Authorization", bearer())
            .multipart(png_form("image"))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_image_get_download_delete_workflow() {
    let app = setup_test_app().await;
    let client = app.client();

    let served = client
        .post("/upload/image")
        .add_header("Authorization", bearer())
        .multipart(png_form("image"))
        .await
        .text();
    let filename = served.trim_start_matches("image/").to_string();

    let inline = client.get(&format!("/image/{}", filename)).await;
    inline.assert_status_ok();
    assert_eq!(inline.header("content-type"), "image/png");
    assert!(image::load_from_memory(inline.as_bytes()).is_ok());

    let download = client.get(&format!("/download/image/{}", filename)).await;
    download.assert_status_ok();
    let disposition = download.header("content-disposition");
    assert!(disposition.to_str().unwrap().starts_with("attachment"));

    let deleted = client
        .delete(&format!("/delete/image/{}", filename))
        .add_header("Authorization", bearer())
        .await;
    deleted.assert_status_ok();
    let body: Value = deleted.json();
    assert_eq!(body["message"], "Image deleted successfully");
    assert_eq!(body["path"], format!("images/{}", filename));
    assert!(!app.path(&format!("images/{}", filename)).exists());

    let gone = client.get(&format!("/image/{}", filename)).await;
    gone.assert_status(StatusCode::NOT_FOUND);
    let body: Value = gone.json();
    assert_eq!(body["error"], "Image not found");
}

#[tokio::test]
async fn test_image_served_from_legacy_directories() {
    let app = setup_test_app().await;
    app.seed("legacy.jpg", b"root-level");
    app.seed("image/old.gif", b"singular-dir");

    let root = app.client().get("/image/legacy.jpg").await;
    root.assert_status_ok();
    assert_eq!(root.as_bytes().as_ref(), b"root-level");

    let singular = app.client().get("/image/old.gif").await;
    singular.assert_status_ok();
    assert_eq!(singular.header("content-type"), "image/gif");
}

#[tokio::test]
async fn test_get_rejects_traversal() {
    let app = setup_test_app().await;
    app.seed("secret.jpg", b"x");

    let response = app.client().get("/image/..%2Fsecret.jpg").await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_rejects_other_categories() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .delete("/delete/audio/song.mp3")
        .add_header("Authorization", bearer())
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(
        body["error"],
        "Invalid media type. Type must be 'image' or 'video'"
    );
}
