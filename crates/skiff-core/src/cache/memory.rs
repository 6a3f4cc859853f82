// # Memory Cache Store
//
// In-memory implementation of CacheStore.
//
// ## Purpose
//
// Holds cache partitions in process memory with no persistence. Useful
// for tests and for embedders whose process lifetime matches the cache
// lifetime anyway.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::Error;
use crate::traits::cache::CacheStore;
use crate::traits::network::{Request, Response};

type Partition = HashMap<String, Response>;

/// In-memory cache partition store
#[derive(Clone, Default)]
pub struct MemoryCacheStore {
    partitions: Arc<RwLock<HashMap<String, Partition>>>,
}

impl MemoryCacheStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries in a partition (0 if absent)
    pub async fn len(&self, partition: &str) -> usize {
        let partitions = self.partitions.read().await;
        partitions.get(partition).map_or(0, |p| p.len())
    }

    /// Whether the store holds no partitions at all
    pub async fn is_empty(&self) -> bool {
        self.partitions.read().await.is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn open(&self, partition: &str) -> Result<(), Error> {
        let mut partitions = self.partitions.write().await;
        partitions.entry(partition.to_string()).or_default();
        Ok(())
    }

    async fn match_in(&self, partition: &str, req: &Request) -> Result<Option<Response>, Error> {
        let partitions = self.partitions.read().await;
        Ok(partitions
            .get(partition)
            .and_then(|p| p.get(&req.identity()))
            .cloned())
    }

    async fn match_any(&self, req: &Request) -> Result<Option<Response>, Error> {
        let identity = req.identity();
        let partitions = self.partitions.read().await;
        Ok(partitions
            .values()
            .find_map(|p| p.get(&identity))
            .cloned())
    }

    async fn put(&self, partition: &str, req: &Request, resp: &Response) -> Result<(), Error> {
        let mut partitions = self.partitions.write().await;
        partitions
            .entry(partition.to_string())
            .or_default()
            .insert(req.identity(), resp.clone());
        Ok(())
    }

    async fn delete_partition(&self, partition: &str) -> Result<bool, Error> {
        let mut partitions = self.partitions.write().await;
        Ok(partitions.remove(partition).is_some())
    }

    async fn list_partitions(&self) -> Result<Vec<String>, Error> {
        let partitions = self.partitions.read().await;
        Ok(partitions.keys().cloned().collect())
    }
}

impl std::fmt::Debug for MemoryCacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCacheStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn req(url: &str) -> Request {
        Request::get(Url::parse(url).unwrap())
    }

    #[tokio::test]
    async fn put_then_match() {
        let store = MemoryCacheStore::new();
        let request = req("https://app.example/css/base.css");
        let response = Response::ok(b"body { margin: 0 }".to_vec());

        store.put("static-v1", &request, &response).await.unwrap();

        let found = store.match_in("static-v1", &request).await.unwrap();
        assert_eq!(found, Some(response.clone()));

        let found = store.match_any(&request).await.unwrap();
        assert_eq!(found, Some(response));

        let miss = store.match_in("dynamic-v1", &request).await.unwrap();
        assert!(miss.is_none());
    }

    #[tokio::test]
    async fn delete_partition_reports_existence() {
        let store = MemoryCacheStore::new();
        store.open("static-v1").await.unwrap();

        assert!(store.delete_partition("static-v1").await.unwrap());
        assert!(!store.delete_partition("static-v1").await.unwrap());
    }

    #[tokio::test]
    async fn list_partitions_sees_opened_and_filled() {
        let store = MemoryCacheStore::new();
        store.open("static-v1").await.unwrap();
        store
            .put("dynamic-v1", &req("https://a.example/x.png"), &Response::ok(vec![1]))
            .await
            .unwrap();

        let mut names = store.list_partitions().await.unwrap();
        names.sort();
        assert_eq!(names, vec!["dynamic-v1", "static-v1"]);
    }
}
