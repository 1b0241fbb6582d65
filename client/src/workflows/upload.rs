use std::path::{Path, PathBuf};

use candid::Principal;

use crate::assets::{AssetBatch, AssetStore, StoreArgs};
use crate::error::ClientError;
use crate::session::Session;
use crate::workflows::{FileList, UploadRecord};

/// Hard ceiling on a selected file, in bytes (1 GiB).
pub const MAX_FILE_SIZE: u64 = 1_073_741_824;

/// Message surfaced when a selection exceeds [`MAX_FILE_SIZE`].
const MAX_SIZE_MESSAGE: &str = "Max size of 1 GB";

/// Namespace every upload key lives under, followed by the principal.
const UPLOADS_PREFIX: &str = "/uploads";

/// Upload key namespace of a principal.
pub(crate) fn upload_namespace(principal: &Principal) -> String {
    format!("{UPLOADS_PREFIX}/{principal}")
}

/// A file chosen for upload. Construction validates the selection; the
/// content itself is read only once the upload starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    path: PathBuf,
    file_name: String,
    size: u64,
}

impl SelectedFile {
    /// Validate and select the file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(ClientError::Validation(format!(
                "{} is not a regular file",
                path.display()
            )));
        }
        if metadata.len() > MAX_FILE_SIZE {
            return Err(ClientError::Validation(MAX_SIZE_MESSAGE.to_string()));
        }
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                ClientError::Validation(format!("{} has no usable file name", path.display()))
            })?
            .to_string();
        Ok(Self {
            path: path.to_path_buf(),
            file_name,
            size: metadata.len(),
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    fn read(&self) -> Result<Vec<u8>, ClientError> {
        Ok(std::fs::read(&self.path)?)
    }
}

/// Single-file upload workflow: select, validate, then store-and-commit
/// with progress reporting.
///
/// At most one upload is in flight; a second request is rejected, not
/// queued. The pending selection is consumed whatever the outcome of the
/// upload, and a failed upload is never retried.
#[derive(Debug, Default)]
pub struct UploadWorkflow {
    selection: Option<SelectedFile>,
    is_uploading: bool,
    progress: Option<f64>,
}

impl UploadWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the file at `path`. A failed validation leaves any previous
    /// selection untouched.
    pub fn select(&mut self, path: impl AsRef<Path>) -> Result<(), ClientError> {
        if self.is_uploading {
            return Err(ClientError::Validation(
                "an upload is already in progress".to_string(),
            ));
        }
        let file = SelectedFile::open(path)?;
        log::debug!("selected {} ({} bytes)", file.file_name(), file.size());
        self.selection = Some(file);
        Ok(())
    }

    pub fn selection(&self) -> Option<&SelectedFile> {
        self.selection.as_ref()
    }

    /// Drop the pending selection.
    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    pub fn is_uploading(&self) -> bool {
        self.is_uploading
    }

    /// Completed fraction of the upload in flight, if any.
    pub fn progress(&self) -> Option<f64> {
        self.progress
    }

    /// Reset the progress indicator to its cleared state.
    pub fn reset_progress(&mut self) {
        self.progress = None;
    }

    /// Upload the pending selection, keyed by the current time. Progress
    /// is reported as a percentage.
    pub async fn upload<S: AssetStore>(
        &mut self,
        session: &Session,
        store: &S,
        list: &mut FileList,
        on_progress: impl FnMut(f64),
    ) -> Result<UploadRecord, ClientError> {
        self.upload_at(now_millis(), session, store, list, on_progress)
            .await
    }

    /// Upload the pending selection with an explicit creation timestamp.
    pub async fn upload_at<S: AssetStore>(
        &mut self,
        timestamp_ms: u64,
        session: &Session,
        store: &S,
        list: &mut FileList,
        mut on_progress: impl FnMut(f64),
    ) -> Result<UploadRecord, ClientError> {
        if self.is_uploading {
            return Err(ClientError::Validation(
                "an upload is already in progress".to_string(),
            ));
        }
        if !session.is_authenticated {
            return Err(ClientError::Session("log in before uploading".to_string()));
        }
        let Some(file) = self.selection.take() else {
            return Err(ClientError::Validation("no file selected".to_string()));
        };

        self.is_uploading = true;
        self.progress = Some(0.0);
        let result = self
            .run_upload(timestamp_ms, session, store, &file, &mut on_progress)
            .await;
        self.is_uploading = false;
        self.progress = None;

        let record = result?;
        list.prepend(record.clone());
        Ok(record)
    }

    async fn run_upload<S: AssetStore>(
        &mut self,
        timestamp_ms: u64,
        session: &Session,
        store: &S,
        file: &SelectedFile,
        on_progress: &mut impl FnMut(f64),
    ) -> Result<UploadRecord, ClientError> {
        let content = file.read()?;
        let content_type = sniff_content_type(&content);

        let mut batch = store.batch();
        let key = batch.store(
            content,
            StoreArgs {
                path: upload_namespace(&session.principal),
                file_name: format!("{timestamp_ms}-{}", file.file_name()),
                content_type,
            },
        )?;

        let progress = &mut self.progress;
        batch
            .commit(|reported| {
                let fraction = reported.fraction();
                *progress = Some(fraction);
                on_progress(fraction * 100.0);
            })
            .await?;

        log::info!("uploaded {} as {key}", file.file_name());
        Ok(UploadRecord {
            key,
            filename: file.file_name().to_string(),
            timestamp_ms,
        })
    }
}

fn sniff_content_type(content: &[u8]) -> String {
    infer::get(content)
        .map(|kind| kind.mime_type().to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string())
}

fn now_millis() -> u64 {
    let nanos = time::OffsetDateTime::now_utc().unix_timestamp_nanos();
    u64::try_from(nanos / 1_000_000).unwrap_or(0)
}
