use std::sync::{Arc, Mutex};
use summary_datastore::{CacheRecord, DataStore};

#[derive(Clone, Default)]
pub struct MockDataStore {
    pub records: Arc<Mutex<Vec<CacheRecord>>>,
    pub lookups: Arc<Mutex<Vec<String>>>,
    pub fail_insert_with: Option<String>,
    pub fail_lookup_with: Option<String>,
}

impl MockDataStore {
    pub fn with_records(records: Vec<CacheRecord>) -> Self {
        Self {
            records: Arc::new(Mutex::new(records)),
            ..Default::default()
        }
    }

    pub fn failing_insert(msg: &str) -> Self {
        Self {
            fail_insert_with: Some(msg.to_string()),
            ..Default::default()
        }
    }

    pub fn failing_lookup(msg: &str) -> Self {
        Self {
            fail_lookup_with: Some(msg.to_string()),
            ..Default::default()
        }
    }

    pub fn records_for(&self, video_id: &str) -> Vec<CacheRecord> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.video_id == video_id)
            .cloned()
            .collect()
    }
}

impl DataStore for MockDataStore {
    async fn latest_summary(&self, video_id: &str) -> anyhow::Result<Option<CacheRecord>> {
        self.lookups.lock().unwrap().push(video_id.to_string());
        if let Some(ref msg) = self.fail_lookup_with {
            return Err(anyhow::anyhow!("{}", msg));
        }
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.video_id == video_id)
            .max_by_key(|r| r.created_at)
            .cloned())
    }

    async fn insert_summary(&self, record: &CacheRecord) -> anyhow::Result<i64> {
        if let Some(ref msg) = self.fail_insert_with {
            return Err(anyhow::anyhow!("{}", msg));
        }
        let mut records = self.records.lock().unwrap();
        records.push(record.clone());
        Ok(records.len() as i64)
    }
}
