// Not every helper is used in every test, so we allow dead code
#![allow(dead_code)]

use std::collections::{BTreeMap, HashSet};
use std::io;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use chrono::Utc;
use object_signing::{
    ObjectLocation, ObjectStore, PresignRequest, PresignedUrl, SignedUrlError, SignedUrlResult,
};
use tracing_subscriber::{fmt::MakeWriter, EnvFilter};
use uuid::Uuid;

/// Initialize tracing for tests
pub fn setup_test_env() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init()
        .ok();
}

/// Collects this crate's log lines for assertions
///
/// Install with `tracing::subscriber::set_default(capture.subscriber())` on a
/// current-thread runtime so every event of the test lands here.
#[derive(Clone, Default)]
pub struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    pub fn subscriber(&self) -> impl tracing::Subscriber + Send + Sync {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new("object_signing=debug"))
            .with_ansi(false)
            .with_writer(self.clone())
            .finish()
    }

    pub fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.buffer.lock().unwrap())
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Lines logged at `level`, e.g. "ERROR"
    pub fn lines_at(&self, level: &str) -> Vec<String> {
        let marker = format!(" {level} ");
        self.lines()
            .into_iter()
            .filter(|line| line.contains(&marker))
            .collect()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// How the fake store answers a signing call
#[derive(Debug, Clone)]
pub enum SignOutcome {
    Succeed,
    Fail(SignedUrlError),
}

/// In-memory object store that records every backend call
pub struct FakeObjectStore {
    objects: Mutex<HashSet<ObjectLocation>>,
    sign_outcome: Mutex<SignOutcome>,
    exists_outcome: Mutex<Option<SignedUrlError>>,
    exists_calls: AtomicUsize,
    presign_calls: Mutex<Vec<PresignRequest>>,
}

impl FakeObjectStore {
    pub fn new() -> Self {
        Self {
            objects: Mutex::new(HashSet::new()),
            sign_outcome: Mutex::new(SignOutcome::Succeed),
            exists_outcome: Mutex::new(None),
            exists_calls: AtomicUsize::new(0),
            presign_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_object(self, bucket: &str, key: &str) -> Self {
        self.objects
            .lock()
            .unwrap()
            .insert(ObjectLocation::new(bucket, key));
        self
    }

    pub fn fail_signing(&self, err: SignedUrlError) {
        *self.sign_outcome.lock().unwrap() = SignOutcome::Fail(err);
    }

    pub fn fail_existence_check(&self, err: SignedUrlError) {
        *self.exists_outcome.lock().unwrap() = Some(err);
    }

    pub fn exists_calls(&self) -> usize {
        self.exists_calls.load(Ordering::SeqCst)
    }

    pub fn presign_calls(&self) -> Vec<PresignRequest> {
        self.presign_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStore for FakeObjectStore {
    async fn object_exists(&self, location: &ObjectLocation) -> SignedUrlResult<bool> {
        self.exists_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(err) = self.exists_outcome.lock().unwrap().clone() {
            return Err(err);
        }

        Ok(self.objects.lock().unwrap().contains(location))
    }

    async fn presign(&self, request: &PresignRequest) -> SignedUrlResult<PresignedUrl> {
        self.presign_calls.lock().unwrap().push(request.clone());

        if let SignOutcome::Fail(err) = self.sign_outcome.lock().unwrap().clone() {
            return Err(err);
        }

        // Fresh signature material on every call, like a real signer's timestamp
        let signature = Uuid::new_v4().simple().to_string();
        let url = format!(
            "https://storage.test/{}/{}?X-Method={}&X-Expires={}&X-Signature={signature}",
            request.location.bucket,
            request.location.key,
            request.method,
            request.expires_in.as_secs(),
        );

        Ok(PresignedUrl {
            url,
            method: request.method,
            expires_at: Utc::now() + request.expires_in,
            headers: request.headers.clone(),
        })
    }
}

/// Single-entry header map for assertions
pub fn headers(name: &str, value: &str) -> BTreeMap<String, String> {
    BTreeMap::from([(name.to_string(), value.to_string())])
}
