use tracing::{error, warn};

use super::error::{IngestError, UploadFailure};

/// A file that was fully ingested: bytes stored and row committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub id: i32,
    pub owner_id: i32,
    pub dataset_id: i32,
    pub name: String,
    pub content_type: String,
    pub size: i64,
}

/// A file that did not make it, with the cause that surfaced.
#[derive(Debug)]
pub struct FailedUpload {
    pub name: String,
    pub cause: UploadFailure,
}

/// Result of one worker.
#[derive(Debug)]
pub enum FileOutcome {
    Uploaded(UploadedFile),
    Failed(FailedUpload),
}

impl FileOutcome {
    pub fn failed(name: impl Into<String>, cause: UploadFailure) -> Self {
        Self::Failed(FailedUpload {
            name: name.into(),
            cause,
        })
    }
}

/// Per-batch partition of worker outcomes.
///
/// `uploaded` keeps completion order, which need not match request order.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub uploaded: Vec<UploadedFile>,
    pub failed: Vec<FailedUpload>,
}

impl BatchOutcome {
    pub fn aggregate(outcomes: impl IntoIterator<Item = FileOutcome>) -> Self {
        let mut batch = Self::default();
        for outcome in outcomes {
            match outcome {
                FileOutcome::Uploaded(file) => batch.uploaded.push(file),
                FileOutcome::Failed(failure) => batch.failed.push(failure),
            }
        }
        batch
    }

    /// Apply the best-effort batch rule.
    ///
    /// Zero successes with at least one failure fails the whole call. Any
    /// success makes the call succeed; failures ride along as warnings.
    pub fn into_result(self) -> Result<Self, IngestError> {
        if self.uploaded.is_empty() && !self.failed.is_empty() {
            let causes: Vec<String> = self.failed.iter().map(describe).collect();
            error!(failures = ?causes, "All file uploads failed");
            return Err(IngestError::AllUploadsFailed(self.failed));
        }

        if !self.failed.is_empty() {
            let causes: Vec<String> = self.failed.iter().map(describe).collect();
            warn!(
                uploaded = self.uploaded.len(),
                failed = self.failed.len(),
                failures = ?causes,
                "Some file uploads failed"
            );
        }

        Ok(self)
    }
}

fn describe(failure: &FailedUpload) -> String {
    format!("{}: {}", failure.name, failure.cause)
}
