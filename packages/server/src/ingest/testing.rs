//! In-memory fakes for the ingestion ports.

use std::collections::{HashMap, HashSet};
use std::io::Cursor;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use common::FileUploadedEvent;
use common::storage::{BoxReader, ObjectStore, STAGING_PREFIX, StorageError};
use mq::MqError;
use sea_orm::DbErr;
use tokio::io::AsyncReadExt;

use super::error::RepositoryError;
use super::ports::{DatasetDirectory, EventPublisher, FileRepository, NewFile, Page};
use super::worker::FilePayload;
use crate::entity::{dataset, file};

pub fn file_record(id: i32, owner_id: i32, dataset_id: i32, name: &str) -> file::Model {
    let now = Utc::now();
    file::Model {
        id,
        name: name.to_string(),
        object_key: format!("{owner_id}/{name}"),
        size: 4,
        content_type: "application/pdf".into(),
        owner_id,
        dataset_id,
        created_at: now,
        updated_at: now,
    }
}

pub fn dataset_record(id: i32, owner_id: i32) -> dataset::Model {
    let now = Utc::now();
    dataset::Model {
        id,
        name: format!("dataset-{id}"),
        icon: "📁".into(),
        description: String::new(),
        owner_id,
        created_at: now,
        updated_at: now,
    }
}

pub fn payload(name: &str, bytes: &[u8]) -> FilePayload {
    FilePayload {
        name: name.to_string(),
        content_type: mime_guess::from_path(name)
            .first_or_octet_stream()
            .to_string(),
        size: bytes.len() as u64,
        reader: Box::new(Cursor::new(bytes.to_vec())),
    }
}

#[derive(Default)]
pub struct FakeObjectStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    deleted: Mutex<Vec<String>>,
    fail_puts: bool,
    fail_deletes: bool,
    fail_renames: bool,
    fail_put_keys: Mutex<HashSet<String>>,
    panic_put_keys: Mutex<HashSet<String>>,
    put_delay: Option<Duration>,
    put_calls: AtomicUsize,
    delete_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeObjectStore {
    pub fn failing_puts() -> Self {
        Self {
            fail_puts: true,
            ..Default::default()
        }
    }

    pub fn failing_deletes() -> Self {
        Self {
            fail_deletes: true,
            ..Default::default()
        }
    }

    pub fn failing_renames() -> Self {
        Self {
            fail_renames: true,
            ..Default::default()
        }
    }

    pub fn with_put_delay(delay: Duration) -> Self {
        Self {
            put_delay: Some(delay),
            ..Default::default()
        }
    }

    pub fn fail_put_for(&self, key: &str) {
        self.fail_put_keys.lock().unwrap().insert(key.to_string());
    }

    pub fn panic_put_for(&self, key: &str) {
        self.panic_put_keys.lock().unwrap().insert(key.to_string());
    }

    pub fn seed(&self, key: &str, bytes: &[u8]) {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), bytes.to_vec());
    }

    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    /// Staged uploads still sitting in the store.
    pub fn staged_keys(&self) -> Vec<String> {
        self.objects
            .lock()
            .unwrap()
            .keys()
            .filter(|k| k.contains(STAGING_PREFIX))
            .cloned()
            .collect()
    }

    pub fn deleted_keys(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn put_calls(&self) -> usize {
        self.put_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

/// The key a staged upload will be promoted to, so failures can be injected
/// by the name a test cares about.
fn target_of(key: &str) -> String {
    let (dir, name) = key.rsplit_once('/').unwrap_or(("", key));
    // Staged names are `.staging-{uuid}-{name}`; a hyphenated uuid is 36 chars.
    let Some(rest) = name.strip_prefix(STAGING_PREFIX) else {
        return key.to_string();
    };
    let name = rest.get(37..).unwrap_or(rest);
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{dir}/{name}")
    }
}

#[async_trait]
impl ObjectStore for FakeObjectStore {
    async fn put_stream(
        &self,
        key: &str,
        mut reader: BoxReader,
        _size: u64,
        _content_type: &str,
    ) -> Result<u64, StorageError> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.put_delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let target = target_of(key);
        if self.panic_put_keys.lock().unwrap().contains(&target) {
            panic!("object store crashed on {target}");
        }
        if self.fail_puts || self.fail_put_keys.lock().unwrap().contains(&target) {
            return Err(StorageError::Backend(format!("put rejected for {key}")));
        }

        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).await?;
        let len = bytes.len() as u64;
        self.objects.lock().unwrap().insert(key.to_string(), bytes);
        Ok(len)
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.objects.lock().unwrap().contains_key(key))
    }

    async fn rename(&self, from: &str, to: &str) -> Result<(), StorageError> {
        if self.fail_renames {
            return Err(StorageError::Backend(format!("rename rejected for {from}")));
        }
        let mut objects = self.objects.lock().unwrap();
        let bytes = objects
            .remove(from)
            .ok_or_else(|| StorageError::NotFound(from.to_string()))?;
        objects.insert(to.to_string(), bytes);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_deletes {
            return Err(StorageError::Backend(format!("delete rejected for {key}")));
        }
        self.objects.lock().unwrap().remove(key);
        self.deleted.lock().unwrap().push(key.to_string());
        Ok(())
    }

    async fn presigned_download_url(
        &self,
        key: &str,
        ttl: Duration,
    ) -> Result<String, StorageError> {
        if !self.objects.lock().unwrap().contains_key(key) {
            return Err(StorageError::NotFound(key.to_string()));
        }
        Ok(format!("https://objects.test/{key}?ttl={}", ttl.as_secs()))
    }
}

pub struct FakeFileRepository {
    rows: Mutex<Vec<file::Model>>,
    deleted: Mutex<Vec<i32>>,
    next_id: AtomicI32,
    insert_calls: AtomicUsize,
    fail_inserts: bool,
    fail_deletes: bool,
}

impl Default for FakeFileRepository {
    fn default() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
            next_id: AtomicI32::new(100),
            insert_calls: AtomicUsize::new(0),
            fail_inserts: false,
            fail_deletes: false,
        }
    }
}

impl FakeFileRepository {
    pub fn failing_inserts() -> Self {
        Self {
            fail_inserts: true,
            ..Default::default()
        }
    }

    pub fn failing_deletes() -> Self {
        Self {
            fail_deletes: true,
            ..Default::default()
        }
    }

    pub fn seed(&self, id: i32, owner_id: i32, dataset_id: i32, name: &str) -> file::Model {
        let record = file_record(id, owner_id, dataset_id, name);
        self.rows.lock().unwrap().push(record.clone());
        record
    }

    pub fn rows(&self) -> Vec<file::Model> {
        self.rows.lock().unwrap().clone()
    }

    pub fn deleted_ids(&self) -> Vec<i32> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FileRepository for FakeFileRepository {
    async fn insert(&self, new_file: NewFile) -> Result<file::Model, RepositoryError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_inserts {
            return Err(RepositoryError::Db(DbErr::Custom(
                "connection reset".into(),
            )));
        }

        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|r| r.object_key == new_file.object_key) {
            return Err(RepositoryError::UniqueViolation(new_file.object_key));
        }

        let now = Utc::now();
        let record = file::Model {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            name: new_file.name,
            object_key: new_file.object_key,
            size: new_file.size,
            content_type: new_file.content_type,
            owner_id: new_file.owner_id,
            dataset_id: new_file.dataset_id,
            created_at: now,
            updated_at: now,
        };
        rows.push(record.clone());
        Ok(record)
    }

    async fn find_owned(
        &self,
        id: i32,
        owner_id: i32,
    ) -> Result<Option<file::Model>, RepositoryError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id && r.owner_id == owner_id)
            .cloned())
    }

    async fn delete(&self, id: i32) -> Result<bool, RepositoryError> {
        if self.fail_deletes {
            return Err(RepositoryError::Db(DbErr::Custom("delete failed".into())));
        }
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| r.id != id);
        let removed = rows.len() != before;
        if removed {
            self.deleted.lock().unwrap().push(id);
        }
        Ok(removed)
    }

    async fn update_content_type(
        &self,
        id: i32,
        owner_id: i32,
        content_type: &str,
    ) -> Result<Option<file::Model>, RepositoryError> {
        let mut rows = self.rows.lock().unwrap();
        Ok(rows
            .iter_mut()
            .find(|r| r.id == id && r.owner_id == owner_id)
            .map(|r| {
                r.content_type = content_type.to_string();
                r.updated_at = Utc::now();
                r.clone()
            }))
    }

    async fn list(
        &self,
        owner_id: i32,
        dataset_id: i32,
        page: u64,
        per_page: u64,
    ) -> Result<Page<file::Model>, RepositoryError> {
        let mut matching = self.list_all_in_dataset(owner_id, dataset_id).await?;
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(page.saturating_sub(1).saturating_mul(per_page) as usize)
            .take(per_page as usize)
            .collect();
        Ok(Page { items, total })
    }

    async fn list_all_in_dataset(
        &self,
        owner_id: i32,
        dataset_id: i32,
    ) -> Result<Vec<file::Model>, RepositoryError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.owner_id == owner_id && r.dataset_id == dataset_id)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct FakeDatasetDirectory {
    datasets: Mutex<Vec<dataset::Model>>,
    lookups: AtomicUsize,
}

impl FakeDatasetDirectory {
    pub fn with_dataset(id: i32, owner_id: i32) -> Self {
        let directory = Self::default();
        directory
            .datasets
            .lock()
            .unwrap()
            .push(dataset_record(id, owner_id));
        directory
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DatasetDirectory for FakeDatasetDirectory {
    async fn find_owned(
        &self,
        id: i32,
        owner_id: i32,
    ) -> Result<Option<dataset::Model>, RepositoryError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .datasets
            .lock()
            .unwrap()
            .iter()
            .find(|d| d.id == id && d.owner_id == owner_id)
            .cloned())
    }
}

#[derive(Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<(String, FileUploadedEvent)>>,
    fail: bool,
}

impl RecordingPublisher {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn published(&self) -> Vec<(String, FileUploadedEvent)> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, queue: &str, event: &FileUploadedEvent) -> Result<(), MqError> {
        if self.fail {
            return Err(MqError::Internal("broker unavailable".into()));
        }
        self.events
            .lock()
            .unwrap()
            .push((queue.to_string(), event.clone()));
        Ok(())
    }
}
