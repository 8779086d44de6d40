//! Upload files command.

use std::future::Future;
use std::process::ExitCode;

use anyhow::{Context as _, Result};
use stashbox_business::{
    BusinessConfig, PendingFile, ReqwestTransport, UploadController, UploadPhase, UploadedFile,
    format_file_size,
};
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tracing::instrument;

use crate::cli::UploadArgs;
use crate::output::Output;

/// Exit code for a batch the user interrupted.
const EXIT_CANCELLED: u8 = 130;

#[derive(Tabled, Debug, PartialEq, Eq)]
pub struct UploadedRow {
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Size")]
    pub size: String,
    #[tabled(rename = "Type")]
    pub mime_type: String,
    #[tabled(rename = "URL")]
    pub url: String,
}

impl From<&UploadedFile> for UploadedRow {
    fn from(file: &UploadedFile) -> Self {
        Self {
            name: file.file_name.clone(),
            size: format_file_size(file.size),
            mime_type: file.mime_type.clone(),
            url: file.url.clone(),
        }
    }
}

/// Run the upload command; Ctrl-C cancels the batch.
pub async fn run_upload(config: BusinessConfig, args: UploadArgs) -> Result<ExitCode> {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::warn!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };
    run_upload_until(config, args, interrupt).await
}

/// Run the upload command, cancelling the batch when `interrupt` resolves.
#[instrument(skip_all, name = "upload", fields(file_count = args.files.len()))]
pub async fn run_upload_until(
    config: BusinessConfig,
    args: UploadArgs,
    interrupt: impl Future<Output = ()>,
) -> Result<ExitCode> {
    let out = Output::new();

    let mut files = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let file = PendingFile::from_path(path)
            .await
            .with_context(|| format!("Failed to load {}", path.display()))?;
        files.push(file);
    }

    let transport = ReqwestTransport::new(&config);
    let mut controller = UploadController::new(args.options(), transport)
        .on_error(|message| log::debug!("Upload batch failed: {message}"));

    if let Err(e) = controller.select_files(files) {
        out.error(e);
        return Ok(ExitCode::FAILURE);
    }

    out.info(format!(
        "Uploading {} file(s) to {}",
        controller.session().pending().len(),
        config.upload_url()
    ));
    for file in controller.session().pending() {
        let details = if file.mime_type.is_empty() {
            "unknown type"
        } else {
            file.mime_type.as_str()
        };
        out.file_item(&file.name, details, format_file_size(file.size_bytes()));
    }

    controller.start_upload();
    out.progress(controller.session().progress());

    tokio::pin!(interrupt);
    loop {
        tokio::select! {
            uploading = controller.step() => {
                out.progress(controller.session().progress());
                if !uploading {
                    break;
                }
            }
            () = &mut interrupt => {
                controller.cancel_upload();
                break;
            }
        }
    }
    out.clear_progress();

    let session = controller.session();
    match session.phase() {
        UploadPhase::Completed => {
            out.success(format!("Uploaded {} file(s)", session.results().len()));
            let rows: Vec<UploadedRow> = session.results().iter().map(UploadedRow::from).collect();
            let mut table = Table::new(&rows);
            table.with(Style::rounded());
            out.newline();
            out.print(table.to_string());
            Ok(ExitCode::SUCCESS)
        }
        UploadPhase::Cancelled => {
            out.warning(session.last_error().unwrap_or("Upload cancelled"));
            Ok(ExitCode::from(EXIT_CANCELLED))
        }
        phase => {
            out.error(session.last_error().unwrap_or("Upload failed"));
            log::debug!("Upload ended in phase {phase:?}");
            Ok(ExitCode::FAILURE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    fn args_for(files: Vec<PathBuf>) -> UploadArgs {
        UploadArgs {
            files,
            single: false,
            accept: "image/*".to_owned(),
            max_size_mb: 20,
            max_files: 10,
        }
    }

    fn write_file(dir: &tempfile::TempDir, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_uploaded_row_formats_size() {
        let file = UploadedFile {
            file_name: "a.png".to_owned(),
            key: "uploads/a_1.png".to_owned(),
            url: "https://cdn.example.com/uploads/a_1.png".to_owned(),
            size: 1536,
            mime_type: "image/png".to_owned(),
        };

        let row = UploadedRow::from(&file);
        assert_eq!(row.size, "1.5 KB");
        assert_eq!(row.url, file.url);
    }

    #[tokio::test]
    async fn test_upload_success_exits_zero() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/upload"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "files": [
                    {"fileName": "a.png", "key": "uploads/a_1.png", "url": "https://cdn.example.com/uploads/a_1.png", "size": 3, "type": "image/png"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let file = write_file(&dir, "a.png", b"png");

        let code = run_upload_until(
            BusinessConfig::new(server.uri()),
            args_for(vec![file]),
            std::future::pending(),
        )
        .await
        .unwrap();

        assert_eq!(code, ExitCode::SUCCESS);
    }

    #[tokio::test]
    async fn test_rejected_selection_never_hits_the_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let file = write_file(&dir, "notes.txt", b"text is not an image");

        let code = run_upload_until(
            BusinessConfig::new(server.uri()),
            args_for(vec![file]),
            std::future::pending(),
        )
        .await
        .unwrap();

        assert_eq!(code, ExitCode::FAILURE);
    }

    #[tokio::test]
    async fn test_server_failure_exits_non_zero() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(serde_json::json!({"error": "Upload failed"})),
            )
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let file = write_file(&dir, "a.png", b"png");

        let code = run_upload_until(
            BusinessConfig::new(server.uri()),
            args_for(vec![file]),
            std::future::pending(),
        )
        .await
        .unwrap();

        assert_eq!(code, ExitCode::FAILURE);
    }

    #[tokio::test]
    async fn test_interrupt_cancels_batch() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"success": true, "files": []}))
                    .set_delay(Duration::from_secs(30)),
            )
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let file = write_file(&dir, "a.png", b"png");

        let code = tokio::time::timeout(
            Duration::from_secs(5),
            run_upload_until(
                BusinessConfig::new(server.uri()),
                args_for(vec![file]),
                tokio::time::sleep(Duration::from_millis(100)),
            ),
        )
        .await
        .expect("interrupt should end the upload promptly")
        .unwrap();

        assert_eq!(code, ExitCode::from(EXIT_CANCELLED));
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = run_upload_until(
            BusinessConfig::default(),
            args_for(vec![dir.path().join("missing.png")]),
            std::future::pending(),
        )
        .await;

        assert!(result.is_err());
    }
}
