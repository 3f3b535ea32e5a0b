use std::future::Future;

use crate::CacheRecord;

pub mod postgres;

pub trait DataStore {
    /// Returns the most recently created record for `video_id`, if any.
    fn latest_summary(
        &self,
        video_id: &str,
    ) -> impl Future<Output = anyhow::Result<Option<CacheRecord>>> + Send;

    /// Inserts a new record and returns its row id.
    fn insert_summary(
        &self,
        record: &CacheRecord,
    ) -> impl Future<Output = anyhow::Result<i64>> + Send;
}

impl<T: DataStore + Send + Sync> DataStore for &T {
    async fn latest_summary(&self, video_id: &str) -> anyhow::Result<Option<CacheRecord>> {
        (**self).latest_summary(video_id).await
    }

    async fn insert_summary(&self, record: &CacheRecord) -> anyhow::Result<i64> {
        (**self).insert_summary(record).await
    }
}
