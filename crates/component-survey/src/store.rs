use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use survey_spec::SubmissionRecord;

use crate::collaborators::ReportStore;
use crate::error::StoreError;

/// Collection reports are appended to unless configured otherwise.
pub const DEFAULT_COLLECTION: &str = "self-reports";

/// Keeps records in memory. Can be told to reject every append.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Vec<SubmissionRecord>>,
    reject_with: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose appends all fail with `reason`.
    pub fn rejecting(reason: impl Into<String>) -> Self {
        Self {
            records: Mutex::default(),
            reject_with: Some(reason.into()),
        }
    }

    pub fn records(&self) -> Vec<SubmissionRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl ReportStore for MemoryStore {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn append(&self, record: SubmissionRecord) -> Result<(), StoreError> {
        if let Some(reason) = &self.reject_with {
            return Err(StoreError::Rejected(reason.clone()));
        }
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
        Ok(())
    }
}

/// Appends each record as one JSON line to `<dir>/<collection>.jsonl`.
#[derive(Debug, Clone)]
pub struct JsonlStore {
    dir: PathBuf,
    collection: String,
}

impl JsonlStore {
    pub fn new(dir: impl Into<PathBuf>, collection: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            collection: collection.into(),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.jsonl", self.collection))
    }
}

#[async_trait]
impl ReportStore for JsonlStore {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn append(&self, record: SubmissionRecord) -> Result<(), StoreError> {
        let mut line = record.to_json_line()?;
        line.push('\n');

        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path();
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        debug!(path = %path.display(), "appended report");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use survey_spec::FormStatus;

    fn record() -> SubmissionRecord {
        SubmissionRecord::new(FormStatus::new(), Utc::now())
    }

    #[tokio::test]
    async fn memory_store_keeps_records() {
        let store = MemoryStore::new();
        store.append(record()).await.expect("append");
        assert_eq!(store.records().len(), 1);
    }

    #[tokio::test]
    async fn rejecting_store_fails_without_keeping_anything() {
        let store = MemoryStore::rejecting("offline");
        let err = store.append(record()).await.unwrap_err();
        assert!(matches!(err, StoreError::Rejected(reason) if reason == "offline"));
        assert!(store.records().is_empty());
    }

    #[tokio::test]
    async fn jsonl_store_appends_one_line_per_record() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = JsonlStore::new(dir.path().join("reports"), DEFAULT_COLLECTION);

        store.append(record()).await.expect("first");
        store.append(record()).await.expect("second");

        let contents = std::fs::read_to_string(store.path()).expect("read");
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: SubmissionRecord = serde_json::from_str(lines[0]).expect("parse");
        assert!(parsed.answers.is_shown(survey_spec::QuestionId::Gender));
        assert!(store.path().ends_with("self-reports.jsonl"));
    }
}
