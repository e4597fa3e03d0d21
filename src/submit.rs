//! Submit reconciliation: create-vs-update branching and the
//! upload → stale-delete → record-write sequence.
//!
//! Exactly one reconciliation should be in flight per form instance; the
//! embedding UI is responsible for disabling resubmission while one is
//! pending. Nothing here retries: a failed submit requires the user to
//! resubmit, and a resubmission after partial failure may upload the file
//! again.

use crate::model::{FormState, NewPost, PostRecord, PostUpdate, StoredFile};
use crate::storage::{FileStore, RecordStore};
use thiserror::Error;
use tracing::{error, info, instrument, warn};

/// What went wrong during reconciliation. Sources carry the collaborator's
/// underlying error.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("a featured image is required for a new post")]
    MissingImage,
    #[error("failed to upload featured image")]
    Upload(#[source] anyhow::Error),
    #[error("failed to write post record")]
    RecordWrite(#[source] anyhow::Error),
}

/// User-visible success/failure sink. Fire-and-forget; no return value.
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn failure(&self, message: &str);
}

/// Default sink that reports through the log stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn success(&self, message: &str) {
        info!(message, "notification");
    }

    fn failure(&self, message: &str) {
        warn!(message, "notification");
    }
}

/// Reconcile form values with the remote stores.
///
/// Update path: an optional upload of the newly selected image, then a
/// best-effort deletion of the replaced file (only once the upload is
/// confirmed), then the record write — the image reference changes only if an
/// upload occurred. Create path: the image is mandatory; the record is
/// written only after its upload succeeds, owned by `author_id`.
///
/// The three steps are awaited strictly in sequence. An upload that no record
/// ends up referencing is removed best-effort before the error is returned.
#[instrument(skip_all)]
pub async fn reconcile(
    files: &dyn FileStore,
    records: &dyn RecordStore,
    values: &FormState,
    existing: Option<&PostRecord>,
    author_id: &str,
) -> Result<PostRecord, SubmitError> {
    match existing {
        Some(prev) => {
            let mut replacement: Option<StoredFile> = None;
            if let Some(image) = &values.image {
                // The old file may only go away once the replacement is
                // confirmed stored; a failed upload leaves the record and its
                // current image untouched.
                let uploaded = files
                    .upload_file(image)
                    .await
                    .map_err(SubmitError::Upload)?;
                if let Err(err) = files.delete_file(&prev.featured_image_id).await {
                    warn!(?err, file_id = %prev.featured_image_id, "failed to delete replaced image; leaving it behind");
                }
                replacement = Some(uploaded);
            }

            let update = PostUpdate {
                title: values.title.clone(),
                content: values.content.clone(),
                slug: values.slug.clone(),
                featured_image_id: replacement.as_ref().map(|f| f.id.clone()),
            };
            match records.update_post(&prev.id, &update).await {
                Ok(record) => {
                    info!(post_id = %record.id, "updated post");
                    Ok(record)
                }
                Err(err) => {
                    if let Some(file) = replacement {
                        discard_unreferenced_upload(files, &file).await;
                    }
                    Err(SubmitError::RecordWrite(err))
                }
            }
        }
        None => {
            let image = values.image.as_ref().ok_or(SubmitError::MissingImage)?;
            let uploaded = files
                .upload_file(image)
                .await
                .map_err(SubmitError::Upload)?;

            let post = NewPost {
                title: values.title.clone(),
                content: values.content.clone(),
                slug: values.slug.clone(),
                featured_image_id: uploaded.id.clone(),
                author_id: author_id.to_owned(),
            };
            match records.create_post(&post).await {
                Ok(record) => {
                    info!(post_id = %record.id, "created post");
                    Ok(record)
                }
                Err(err) => {
                    discard_unreferenced_upload(files, &uploaded).await;
                    Err(SubmitError::RecordWrite(err))
                }
            }
        }
    }
}

/// Reconcile and report the outcome upward: one notification either way, the
/// navigation callback once on success, and no error propagation past this
/// point.
#[instrument(skip_all)]
pub async fn submit_post(
    files: &dyn FileStore,
    records: &dyn RecordStore,
    notifier: &dyn Notifier,
    values: &FormState,
    existing: Option<&PostRecord>,
    author_id: &str,
    navigate: impl FnOnce(String),
) -> Option<PostRecord> {
    match reconcile(files, records, values, existing, author_id).await {
        Ok(record) => {
            notifier.success("Post saved successfully!");
            navigate(format!("/post/{}", record.id));
            Some(record)
        }
        Err(err) => {
            error!(error = ?err, "failed to save post");
            notifier.failure("Error saving post");
            None
        }
    }
}

async fn discard_unreferenced_upload(files: &dyn FileStore, file: &StoredFile) {
    if let Err(err) = files.delete_file(&file.id).await {
        warn!(?err, file_id = %file.id, "failed to remove unreferenced upload");
    }
}
