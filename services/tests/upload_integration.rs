use axum::http::StatusCode;
use axum_test::{
    TestServer,
    multipart::{MultipartForm, Part},
};
use stashbox_services::{
    config::{Config, Env},
    routes,
    storage::MockFileStorage,
};
use stashbox_utils::{UploadErrorBody, UploadSuccessBody};

const UPLOAD: &str = "/api/upload";

fn server_with(storage: MockFileStorage, config: Config) -> TestServer {
    TestServer::new(routes(storage, config)).unwrap()
}

fn file_part(name: &str, mime_type: &str, content: &[u8]) -> Part {
    Part::bytes(content.to_vec())
        .file_name(name.to_owned())
        .mime_type(mime_type.to_owned())
}

fn form_of(parts: Vec<Part>) -> MultipartForm {
    parts
        .into_iter()
        .fold(MultipartForm::new(), |form, part| form.add_part("files", part))
}

#[tokio::test]
async fn test_upload_two_images_returns_descriptors_in_order() {
    let storage = MockFileStorage::new();
    let server = server_with(storage.clone(), Config::new_for_test());

    let form = form_of(vec![
        file_part("a.png", "image/png", &[1u8; 1024]),
        file_part("b.png", "image/png", &[2u8; 2048]),
    ]);
    let response = server.post(UPLOAD).multipart(form).await;

    response.assert_status(StatusCode::OK);
    let body: UploadSuccessBody = response.json();
    assert!(body.success);
    assert_eq!(body.files.len(), 2);
    assert_eq!(body.files[0].file_name, "a.png");
    assert_eq!(body.files[0].size, 1024);
    assert_eq!(body.files[1].file_name, "b.png");
    assert_eq!(body.files[1].size, 2048);

    for file in &body.files {
        assert!(file.key.starts_with("uploads/"));
        assert!(file.key.ends_with(".png"));
        assert_eq!(file.mime_type, "image/png");
        assert_eq!(file.url, format!("https://cdn.example.com/{}", file.key));

        let object = storage.get(&file.key).expect("object stored");
        assert_eq!(object.metadata.original_name, file.file_name);
        assert_eq!(object.content.len() as u64, file.size);
    }
}

#[tokio::test]
async fn test_success_body_uses_wire_field_names() {
    let server = server_with(MockFileStorage::new(), Config::new_for_test());

    let form = form_of(vec![file_part("note.txt", "text/plain", b"hello")]);
    let response = server.post(UPLOAD).multipart(form).await;

    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    let file = &body["files"][0];
    assert_eq!(file["fileName"], "note.txt");
    assert_eq!(file["type"], "text/plain");
    assert_eq!(file["size"], 5);
    assert!(file["key"].is_string());
    assert!(file["url"].is_string());
}

#[tokio::test]
async fn test_one_invalid_file_rejects_whole_batch() {
    let storage = MockFileStorage::new();
    let server = server_with(storage.clone(), Config::new_for_test());

    let form = form_of(vec![
        file_part("a.png", "image/png", &[1u8; 16]),
        file_part("b.png", "image/png", &[1u8; 16]),
        file_part("tool.exe", "application/x-msdownload", &[1u8; 16]),
        file_part("c.png", "image/png", &[1u8; 16]),
    ]);
    let response = server.post(UPLOAD).multipart(form).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: UploadErrorBody = response.json();
    assert!(body.error.contains("tool.exe"));
    assert_eq!(storage.put_attempts(), 0);
    assert!(storage.is_empty());
}

#[tokio::test]
async fn test_oversized_file_is_rejected() {
    let storage = MockFileStorage::new();
    let server = server_with(storage.clone(), Config::new_for_test());

    let big = vec![0u8; 10 * 1024 * 1024 + 1];
    let form = form_of(vec![file_part("huge.png", "image/png", &big)]);
    let response = server.post(UPLOAD).multipart(form).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: UploadErrorBody = response.json();
    assert_eq!(body.error, "File \"huge.png\" exceeds maximum size of 10MB");
    assert!(storage.is_empty());
}

#[tokio::test]
async fn test_empty_batch_is_rejected() {
    let server = server_with(MockFileStorage::new(), Config::new_for_test());

    let form = MultipartForm::new().add_text("comment", "no files here");
    let response = server.post(UPLOAD).multipart(form).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: UploadErrorBody = response.json();
    assert_eq!(body.error, "No files provided");
}

#[tokio::test]
async fn test_more_than_ten_files_is_rejected() {
    let storage = MockFileStorage::new();
    let server = server_with(storage.clone(), Config::new_for_test());

    let parts = (0..11)
        .map(|i| file_part(&format!("{i}.png"), "image/png", &[1u8; 8]))
        .collect();
    let response = server.post(UPLOAD).multipart(form_of(parts)).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: UploadErrorBody = response.json();
    assert_eq!(body.error, "Too many files. Maximum 10 files allowed");
    assert_eq!(storage.put_attempts(), 0);
}

#[tokio::test]
async fn test_other_methods_are_not_allowed() {
    let server = server_with(MockFileStorage::new(), Config::new_for_test());

    let response = server.get(UPLOAD).await;
    response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
    let body: UploadErrorBody = response.json();
    assert_eq!(body.error, "Method not allowed");

    let response = server.put(UPLOAD).await;
    response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_store_failure_hides_details_outside_local() {
    let storage = MockFileStorage::new();
    storage.fail_uploads_for("b.png");
    let server = server_with(storage.clone(), Config::new_for_test());

    let form = form_of(vec![
        file_part("a.png", "image/png", &[1u8; 16]),
        file_part("b.png", "image/png", &[1u8; 16]),
    ]);
    let response = server.post(UPLOAD).multipart(form).await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: UploadErrorBody = response.json();
    assert_eq!(body.error, "Upload failed");
    assert!(body.details.is_none());
    assert!(storage.is_empty());
}

#[tokio::test]
async fn test_store_failure_exposes_details_locally() {
    let storage = MockFileStorage::new();
    storage.fail_uploads_for("a.png");
    let server = server_with(storage, Config::new_for_test_with_env(Env::Local));

    let form = form_of(vec![file_part("a.png", "image/png", &[1u8; 16])]);
    let response = server.post(UPLOAD).multipart(form).await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: UploadErrorBody = response.json();
    assert_eq!(body.error, "Upload failed");
    assert!(body.details.is_some_and(|d| d.contains("injected failure")));
}

#[tokio::test]
async fn test_non_multipart_body_is_a_server_error() {
    let storage = MockFileStorage::new();
    let server = server_with(storage.clone(), Config::new_for_test());

    let response = server
        .post(UPLOAD)
        .json(&serde_json::json!({ "files": ["a.png"] }))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: UploadErrorBody = response.json();
    assert_eq!(body.error, "Upload failed");
    assert!(body.details.is_none());
    assert_eq!(storage.put_attempts(), 0);
}
