//! Veil Gallery - Batch Loader
//!
//! Probes `{prefix}/{index}.{ext}.enc` for every index in `1..=max_count`
//! and every extension, fetches what exists and decrypts it. Most probes
//! are expected to miss; a miss is an ordinary outcome, not an error.
//!
//! Outcomes come back in candidate order (index first, then extension)
//! whatever the concurrency, so callers can line results up with the
//! candidate list.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::{Client, StatusCode};

use crate::asset_crypto::AssetCipher;
use crate::config::{LoaderConfig, ENCRYPTED_SUFFIX};
use crate::error::{GalleryError, GalleryResult};
use crate::Progress;

// ═══════════════════════════════════════════════════════════════════════════════
// FETCHING
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of fetching one identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Bytes(Vec<u8>),
    NotFound,
    Failed(String),
}

/// Source of encrypted asset bytes
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, id: &str) -> FetchOutcome;
}

#[async_trait]
impl<F: Fetcher + ?Sized> Fetcher for Box<F> {
    async fn fetch(&self, id: &str) -> FetchOutcome {
        (**self).fetch(id).await
    }
}

/// Fetches assets over HTTP(S)
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> GalleryResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> FetchOutcome {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => return FetchOutcome::Failed(e.to_string()),
        };

        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            return FetchOutcome::NotFound;
        }
        if !status.is_success() {
            return FetchOutcome::Failed(format!("HTTP {}", status));
        }

        match response.bytes().await {
            Ok(body) => FetchOutcome::Bytes(body.to_vec()),
            Err(e) => FetchOutcome::Failed(e.to_string()),
        }
    }
}

/// Reads assets from the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsFetcher;

#[async_trait]
impl Fetcher for FsFetcher {
    async fn fetch(&self, path: &str) -> FetchOutcome {
        match tokio::fs::read(Path::new(path)).await {
            Ok(data) => FetchOutcome::Bytes(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => FetchOutcome::NotFound,
            Err(e) => FetchOutcome::Failed(e.to_string()),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// OUTCOMES
// ═══════════════════════════════════════════════════════════════════════════════

/// What the loader found at one candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Fetched and decrypted
    Found(Vec<u8>),
    /// Nothing at this slot (the common case)
    NotFound,
    /// Transport failure, treated as absence
    FetchFailed(String),
    /// Fetched but did not decrypt; logged as a warning
    DecodeFailed(String),
    /// Not attempted because the load was cancelled
    Skipped,
}

impl LoadOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, LoadOutcome::Found(_))
    }

    pub fn as_found(&self) -> Option<&[u8]> {
        match self {
            LoadOutcome::Found(data) => Some(data),
            _ => None,
        }
    }

    pub fn into_found(self) -> Option<Vec<u8>> {
        match self {
            LoadOutcome::Found(data) => Some(data),
            _ => None,
        }
    }
}

/// Drop absences, keeping recovered assets in candidate order
pub fn found_only(outcomes: Vec<LoadOutcome>) -> Vec<Vec<u8>> {
    outcomes
        .into_iter()
        .filter_map(LoadOutcome::into_found)
        .collect()
}

/// Candidate identifiers, index-major: `1.jpg, 1.png, 2.jpg, 2.png, ...`.
///
/// A leading dot on an extension is dropped; case is kept as configured.
pub fn candidate_ids(prefix: &str, extensions: &[String], max_count: usize) -> Vec<String> {
    let prefix = prefix.trim_end_matches('/');
    let extensions: Vec<&str> = extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.'))
        .collect();

    let mut ids = Vec::with_capacity(max_count * extensions.len());
    for index in 1..=max_count {
        for ext in &extensions {
            ids.push(format!("{}/{}.{}{}", prefix, index, ext, ENCRYPTED_SUFFIX));
        }
    }
    ids
}

// ═══════════════════════════════════════════════════════════════════════════════
// CANCELLATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Cooperative cancellation checked before each candidate
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// BATCH LOADER
// ═══════════════════════════════════════════════════════════════════════════════

/// Fetch-and-decrypt over a list of candidates
pub struct BatchLoader<F: Fetcher> {
    fetcher: F,
    cipher: AssetCipher,
    concurrency: usize,
    cancel: Option<CancelFlag>,
}

impl<F: Fetcher> BatchLoader<F> {
    /// Sequential loader
    pub fn new(fetcher: F, cipher: AssetCipher) -> Self {
        Self {
            fetcher,
            cipher,
            concurrency: 1,
            cancel: None,
        }
    }

    /// Allow up to `concurrency` fetches in flight. Result order is unchanged.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn cipher(&self) -> &AssetCipher {
        &self.cipher
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().map(CancelFlag::is_cancelled).unwrap_or(false)
    }

    /// Fetch and decrypt a single identifier, surfacing every failure
    pub async fn load_one(&self, id: &str) -> GalleryResult<Vec<u8>> {
        match self.fetcher.fetch(id).await {
            FetchOutcome::Bytes(data) => self.cipher.decode(&data),
            FetchOutcome::NotFound => Err(GalleryError::NotFound(id.to_string())),
            FetchOutcome::Failed(reason) => Err(GalleryError::Transport(reason)),
        }
    }

    /// Probe one candidate, folding failures into an outcome
    pub async fn probe(&self, id: &str) -> LoadOutcome {
        if self.is_cancelled() {
            return LoadOutcome::Skipped;
        }

        match self.fetcher.fetch(id).await {
            FetchOutcome::NotFound => LoadOutcome::NotFound,
            FetchOutcome::Failed(reason) => {
                log::debug!("Fetch failed for {}: {}", id, reason);
                LoadOutcome::FetchFailed(reason)
            }
            FetchOutcome::Bytes(data) => match self.cipher.decode(&data) {
                Ok(plaintext) => LoadOutcome::Found(plaintext),
                Err(e) => {
                    log::warn!("Skipping asset that failed to decrypt: {} ({})", id, e);
                    LoadOutcome::DecodeFailed(e.to_string())
                }
            },
        }
    }

    /// Probe an explicit list of identifiers.
    ///
    /// Returns one outcome per identifier, in input order. `progress` is
    /// called once per identifier, in the same order, as
    /// `(completed, total, id)`.
    pub async fn load_ids(&self, ids: &[String], progress: Option<Progress<'_>>) -> Vec<LoadOutcome> {
        let total = ids.len();
        let mut outcomes = Vec::with_capacity(total);

        let mut results = std::pin::pin!(stream::iter(ids)
            .map(|id| async move { (id, self.probe(id).await) })
            .buffered(self.concurrency));

        while let Some((id, outcome)) = results.next().await {
            outcomes.push(outcome);
            if let Some(callback) = progress {
                callback(outcomes.len(), total, id.as_str());
            }
        }

        let found = outcomes.iter().filter(|o| o.is_found()).count();
        log::info!("Loaded {}/{} candidates", found, total);

        outcomes
    }

    /// Probe every candidate the configuration describes
    pub async fn load_all(
        &self,
        config: &LoaderConfig,
        progress: Option<Progress<'_>>,
    ) -> GalleryResult<Vec<LoadOutcome>> {
        config.validate()?;
        let ids = candidate_ids(&config.image_dir, &config.extensions, config.max_count);
        Ok(self.load_ids(&ids, progress).await)
    }

    /// [`load_all`](Self::load_all) with absences removed
    pub async fn load_found(
        &self,
        config: &LoaderConfig,
        progress: Option<Progress<'_>>,
    ) -> GalleryResult<Vec<Vec<u8>>> {
        Ok(found_only(self.load_all(config, progress).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset_crypto::encode;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Serves canned outcomes; anything unknown is a miss
    struct MapFetcher {
        entries: HashMap<String, FetchOutcome>,
        delays_ms: HashMap<String, u64>,
        calls: Mutex<Vec<String>>,
    }

    impl MapFetcher {
        fn new() -> Self {
            Self {
                entries: HashMap::new(),
                delays_ms: HashMap::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn with(mut self, id: &str, outcome: FetchOutcome) -> Self {
            self.entries.insert(id.to_string(), outcome);
            self
        }

        fn delayed(mut self, id: &str, ms: u64) -> Self {
            self.delays_ms.insert(id.to_string(), ms);
            self
        }
    }

    #[async_trait]
    impl Fetcher for MapFetcher {
        async fn fetch(&self, id: &str) -> FetchOutcome {
            self.calls.lock().unwrap().push(id.to_string());
            if let Some(ms) = self.delays_ms.get(id) {
                tokio::time::sleep(Duration::from_millis(*ms)).await;
            }
            self.entries.get(id).cloned().unwrap_or(FetchOutcome::NotFound)
        }
    }

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_candidate_order() {
        let exts = ids(&["jpg", ".PNG"]);
        assert_eq!(
            candidate_ids("./images/", &exts, 2),
            vec![
                "./images/1.jpg.enc",
                "./images/1.PNG.enc",
                "./images/2.jpg.enc",
                "./images/2.PNG.enc",
            ]
        );
        assert_eq!(candidate_ids("img", &ids(&["PNG"]), 1), vec!["img/1.PNG.enc"]);
        assert_eq!(candidate_ids("./images", &exts, 200).len(), 400);
        assert!(candidate_ids("./images", &exts, 0).is_empty());
    }

    #[tokio::test]
    async fn test_present_then_missing() {
        let image_a = b"image A bytes".to_vec();
        let fetcher = MapFetcher::new().with(
            "a.png.enc",
            FetchOutcome::Bytes(encode(&image_a, "tree2024").unwrap()),
        );
        let loader = BatchLoader::new(fetcher, AssetCipher::from_password("tree2024"));

        let outcomes = loader.load_ids(&ids(&["a.png.enc", "b.png.enc"]), None).await;
        assert_eq!(outcomes, vec![LoadOutcome::Found(image_a.clone()), LoadOutcome::NotFound]);
        assert_eq!(found_only(outcomes), vec![image_a]);
    }

    #[tokio::test]
    async fn test_decode_failure_is_absence() {
        let fetcher = MapFetcher::new()
            .with("1.jpg.enc", FetchOutcome::Bytes(vec![1, 2, 3]))
            .with("2.jpg.enc", FetchOutcome::Failed("connection reset".into()));
        let loader = BatchLoader::new(fetcher, AssetCipher::from_password("tree2024"));

        let outcomes = loader.load_ids(&ids(&["1.jpg.enc", "2.jpg.enc"]), None).await;
        assert!(matches!(outcomes[0], LoadOutcome::DecodeFailed(_)));
        assert_eq!(outcomes[1], LoadOutcome::FetchFailed("connection reset".into()));
        assert!(found_only(outcomes).is_empty());
    }

    #[tokio::test]
    async fn test_load_one_surfaces_errors() {
        let fetcher = MapFetcher::new()
            .with("x.enc", FetchOutcome::Bytes(encode(b"x", "tree2024").unwrap()))
            .with("down.enc", FetchOutcome::Failed("timeout".into()));
        let loader = BatchLoader::new(fetcher, AssetCipher::from_password("tree2024"));

        assert_eq!(loader.load_one("x.enc").await.unwrap(), b"x");
        assert!(matches!(loader.load_one("y.enc").await, Err(GalleryError::NotFound(_))));
        assert!(matches!(loader.load_one("down.enc").await, Err(GalleryError::Transport(_))));
    }

    #[tokio::test]
    async fn test_concurrent_load_keeps_candidate_order() {
        let fetcher = MapFetcher::new()
            .with("1.enc", FetchOutcome::Bytes(encode(b"one", "pw").unwrap()))
            .with("2.enc", FetchOutcome::Bytes(encode(b"two", "pw").unwrap()))
            .with("3.enc", FetchOutcome::Bytes(encode(b"three", "pw").unwrap()))
            .delayed("1.enc", 60)
            .delayed("2.enc", 30);
        let loader =
            BatchLoader::new(fetcher, AssetCipher::from_password("pw")).with_concurrency(3);

        let seen = Mutex::new(Vec::new());
        let callback = |done: usize, total: usize, id: &str| {
            seen.lock().unwrap().push((done, total, id.to_string()));
        };

        let outcomes = loader
            .load_ids(&ids(&["1.enc", "2.enc", "3.enc"]), Some(&callback))
            .await;

        assert_eq!(
            found_only(outcomes),
            vec![b"one".to_vec(), b"two".to_vec(), b"three".to_vec()]
        );
        let seen = seen.into_inner().unwrap();
        assert_eq!(
            seen.iter().map(|(d, _, id)| (*d, id.as_str())).collect::<Vec<_>>(),
            vec![(1, "1.enc"), (2, "2.enc"), (3, "3.enc")]
        );
        assert!(seen.iter().all(|(_, total, _)| *total == 3));
    }

    #[tokio::test]
    async fn test_sequential_fetch_order() {
        let loader = BatchLoader::new(MapFetcher::new(), AssetCipher::from_password("pw"));
        let config = LoaderConfig {
            image_dir: "img".into(),
            extensions: ids(&["jpg", "png"]),
            max_count: 2,
            ..Default::default()
        };

        let outcomes = loader.load_all(&config, None).await.unwrap();
        assert_eq!(outcomes.len(), 4);
        assert_eq!(
            *loader.fetcher.calls.lock().unwrap(),
            vec!["img/1.jpg.enc", "img/1.png.enc", "img/2.jpg.enc", "img/2.png.enc"]
        );
    }

    #[tokio::test]
    async fn test_cancel_skips_remaining() {
        let cancel = CancelFlag::new();
        let loader = BatchLoader::new(MapFetcher::new(), AssetCipher::from_password("pw"))
            .with_cancel(cancel.clone());

        let trip = cancel.clone();
        let callback = move |done: usize, _total: usize, _id: &str| {
            if done == 1 {
                trip.cancel();
            }
        };

        let outcomes = loader
            .load_ids(&ids(&["1.enc", "2.enc", "3.enc"]), Some(&callback))
            .await;

        assert_eq!(
            outcomes,
            vec![LoadOutcome::NotFound, LoadOutcome::Skipped, LoadOutcome::Skipped]
        );
        assert_eq!(loader.fetcher.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let loader = BatchLoader::new(MapFetcher::new(), AssetCipher::from_password("pw"));
        let config = LoaderConfig {
            max_count: 0,
            ..Default::default()
        };
        assert!(loader.load_all(&config, None).await.is_err());
    }

    #[tokio::test]
    async fn test_fs_fetcher() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("1.jpg.enc");
        std::fs::write(&path, b"bytes").unwrap();

        let hit = FsFetcher.fetch(path.to_str().unwrap()).await;
        assert_eq!(hit, FetchOutcome::Bytes(b"bytes".to_vec()));

        let miss = FsFetcher
            .fetch(dir.path().join("2.jpg.enc").to_str().unwrap())
            .await;
        assert_eq!(miss, FetchOutcome::NotFound);
    }
}
