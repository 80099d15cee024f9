use crate::error::FetchError;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

pub type Bytes = Arc<[u8]>;

pub trait AssetSource: Send + Sync {
    fn fetch(&self, path: &str) -> Result<Vec<u8>, FetchError>;
}

#[derive(Debug, Clone)]
pub struct FsAssetSource {
    root: PathBuf,
}

impl FsAssetSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetSource for FsAssetSource {
    fn fetch(&self, path: &str) -> Result<Vec<u8>, FetchError> {
        let full = self.root.join(path);
        fs::read(&full).map_err(|err| FetchError::Io {
            path: full,
            reason: err.to_string(),
        })
    }
}

#[derive(Debug, Default)]
pub struct MemoryAssetSource {
    assets: HashMap<String, Vec<u8>>,
    delay: Duration,
    requests: Mutex<HashMap<String, usize>>,
}

impl MemoryAssetSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_asset(mut self, path: &str, data: impl Into<Vec<u8>>) -> Self {
        self.assets.insert(path.to_string(), data.into());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn requests(&self, path: &str) -> usize {
        self.requests
            .lock()
            .map(|requests| requests.get(path).copied().unwrap_or(0))
            .unwrap_or(0)
    }
}

impl AssetSource for MemoryAssetSource {
    fn fetch(&self, path: &str) -> Result<Vec<u8>, FetchError> {
        if let Ok(mut requests) = self.requests.lock() {
            *requests.entry(path.to_string()).or_default() += 1;
        }
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        self.assets
            .get(path)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(path.to_string()))
    }
}

#[derive(Clone)]
pub struct AssetLoader {
    source: Arc<dyn AssetSource>,
    timeout: Duration,
}

impl AssetLoader {
    pub fn new(source: Arc<dyn AssetSource>, timeout: Duration) -> Self {
        Self { source, timeout }
    }

    pub fn spawn(&self, path: &str) -> PendingFetch {
        let (tx, rx) = mpsc::channel();
        let source = Arc::clone(&self.source);
        let owned = path.to_string();
        thread::spawn(move || {
            let result = source.fetch(&owned);
            // The receiver is gone when the fetch was abandoned.
            let _ = tx.send(result);
        });

        PendingFetch {
            path: path.to_string(),
            rx,
            started: Instant::now(),
            timeout: self.timeout,
        }
    }

    pub fn fetch_now(&self, path: &str) -> Result<Bytes, FetchError> {
        self.source.fetch(path).map(Bytes::from)
    }
}

pub struct PendingFetch {
    path: String,
    rx: Receiver<Result<Vec<u8>, FetchError>>,
    started: Instant,
    timeout: Duration,
}

impl PendingFetch {
    pub fn poll(&self) -> Option<Result<Bytes, FetchError>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result.map(Bytes::from)),
            Err(TryRecvError::Disconnected) => {
                Some(Err(FetchError::Disconnected(self.path.clone())))
            }
            Err(TryRecvError::Empty) if self.started.elapsed() >= self.timeout => {
                Some(Err(FetchError::TimedOut {
                    path: self.path.clone(),
                    after: self.timeout,
                }))
            }
            Err(TryRecvError::Empty) => None,
        }
    }
}

#[derive(Default)]
pub enum Fetch {
    #[default]
    Idle,
    InFlight(PendingFetch),
    Done(Result<Bytes, FetchError>),
}

impl Fetch {
    pub fn start(&mut self, loader: &AssetLoader, path: &str) -> bool {
        if !matches!(self, Self::Idle) {
            return false;
        }
        log::debug!("fetching {path}");
        *self = Self::InFlight(loader.spawn(path));
        true
    }

    pub fn poll(&mut self) -> Option<&Result<Bytes, FetchError>> {
        if let Self::InFlight(pending) = self
            && let Some(result) = pending.poll()
        {
            *self = Self::Done(result);
        }

        match self {
            Self::Done(result) => Some(result),
            Self::Idle | Self::InFlight(_) => None,
        }
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::InFlight(_))
    }

    pub fn failed(&self) -> bool {
        matches!(self, Self::Done(Err(_)))
    }

    pub fn reset_failed(&mut self) {
        if self.failed() {
            *self = Self::Idle;
        }
    }
}
