//! Image reconciliation for product create and update.
//!
//! [`ReconcilePlan`] is the pure diff: which submitted images need uploading
//! and where their hosted references will land. [`ImageReconciler`] runs the
//! plan against an [`ObjectStore`]: uploads fan out concurrently and must all
//! succeed, while cleanup of dropped images is best effort.

use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::models::ImageSource;
use crate::storage::{ObjectStore, StorageError};

/// An image that must be uploaded before the record can be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlinePayload {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Slot {
    Hosted(String),
    /// Index into `ReconcilePlan::to_upload`.
    Upload(usize),
}

#[derive(Debug, Clone)]
pub struct ReconcilePlan {
    existing: Vec<String>,
    slots: Vec<Slot>,
    to_upload: Vec<InlinePayload>,
}

/// Outcome once every upload has a hosted reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// Hosted references in submission order.
    pub final_refs: Vec<String>,
    /// Previously stored references that are no longer used.
    pub to_delete: Vec<String>,
    /// References created by this reconciliation.
    pub uploaded: Vec<String>,
}

impl ReconcilePlan {
    #[must_use]
    pub fn new(existing: &[String], submitted: Vec<ImageSource>) -> Self {
        let mut slots = Vec::with_capacity(submitted.len());
        let mut to_upload = Vec::new();

        for source in submitted {
            match source {
                ImageSource::Hosted(reference) => slots.push(Slot::Hosted(reference)),
                ImageSource::Inline { bytes, mime_type } => {
                    slots.push(Slot::Upload(to_upload.len()));
                    to_upload.push(InlinePayload { bytes, mime_type });
                }
            }
        }

        Self {
            existing: existing.to_vec(),
            slots,
            to_upload,
        }
    }

    #[must_use]
    pub fn to_upload(&self) -> &[InlinePayload] {
        &self.to_upload
    }

    /// Substitutes `uploaded` (one hosted reference per payload, same order as
    /// [`Self::to_upload`]) into the submission and diffs against `existing`.
    ///
    /// # Panics
    ///
    /// Panics if `uploaded` does not hold exactly one reference per payload.
    #[must_use]
    pub fn finish(self, uploaded: Vec<String>) -> Reconciliation {
        assert_eq!(
            uploaded.len(),
            self.to_upload.len(),
            "one hosted reference is required per inline payload"
        );

        let final_refs: Vec<String> = self
            .slots
            .into_iter()
            .map(|slot| match slot {
                Slot::Hosted(reference) => reference,
                Slot::Upload(index) => uploaded[index].clone(),
            })
            .collect();

        let to_delete = self
            .existing
            .into_iter()
            .filter(|reference| !final_refs.contains(reference))
            .collect();

        Reconciliation {
            final_refs,
            to_delete,
            uploaded,
        }
    }
}

/// Drives a [`ReconcilePlan`] against object storage.
#[derive(Clone)]
pub struct ImageReconciler {
    store: Arc<dyn ObjectStore>,
}

impl ImageReconciler {
    #[must_use]
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Uploads every inline payload concurrently.
    ///
    /// Either all uploads succeed or none of them stay behind: when one fails
    /// the ones that did land are removed again and the first error is
    /// returned.
    pub async fn apply(&self, plan: ReconcilePlan) -> Result<Reconciliation, StorageError> {
        let uploads = plan
            .to_upload()
            .iter()
            .map(|payload| self.store.upload(payload.bytes.clone(), &payload.mime_type));
        let results = join_all(uploads).await;

        let mut uploaded = Vec::with_capacity(results.len());
        let mut first_error = None;
        for result in results {
            match result {
                Ok(reference) => uploaded.push(reference),
                Err(e) => {
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        if let Some(e) = first_error {
            warn!(
                error = %e,
                orphaned = uploaded.len(),
                "Image upload failed, rolling back completed uploads"
            );
            self.cleanup(&uploaded).await;
            return Err(e);
        }

        metrics::counter!("catalog_images_uploaded_total").increment(uploaded.len() as u64);
        Ok(plan.finish(uploaded))
    }

    /// Deletes `references`, logging failures instead of returning them.
    ///
    /// References that are already gone count as deleted. Returns how many
    /// deletions failed.
    pub async fn cleanup(&self, references: &[String]) -> usize {
        let deletes = references
            .iter()
            .map(|reference| async move { (reference, self.store.delete(reference).await) });

        let mut failures = 0;
        for (reference, result) in join_all(deletes).await {
            match result {
                Ok(()) => debug!(reference = %reference, "Removed unused image"),
                Err(e) if e.is_not_found() => {
                    debug!(reference = %reference, "Image already gone");
                }
                Err(StorageError::ForeignReference(_)) => {
                    debug!(reference = %reference, "Image not hosted here, skipping");
                }
                Err(e) => {
                    failures += 1;
                    metrics::counter!("catalog_image_cleanup_failures_total").increment(1);
                    warn!(reference = %reference, error = %e, "Failed to delete image");
                }
            }
        }
        failures
    }
}
