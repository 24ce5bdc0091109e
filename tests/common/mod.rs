#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::net::TcpListener;

use engineers_api::config::AppConfig;
use engineers_api::database::{
    seed, Engineer, EngineerFilter, EngineerSession, EngineerStore, MemoryEngineerStore,
    StoreError,
};
use engineers_api::server::{self, AppState};

pub const USER: &str = "masud";
pub const SECRET: &str = "pass";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
}

impl TestServer {
    /// Serve the full router on an unused port, backed by `store`
    pub async fn spawn(store: Arc<dyn EngineerStore>) -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let listener = TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;

        let state = AppState::new(store, &AppConfig::development().security);
        let router = server::app(state, Duration::from_secs(5));

        tokio::spawn(async move {
            let service = router.into_make_service_with_connect_info::<SocketAddr>();
            if let Err(e) = axum::serve(listener, service).await {
                eprintln!("test server stopped: {}", e);
            }
        });

        Ok(Self { port, base_url })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Memory store preloaded with the demo profiles
pub async fn seeded_store() -> Result<MemoryEngineerStore> {
    let store = MemoryEngineerStore::new();
    seed::seed_engineers(&store, seed::initial_engineers()).await?;
    Ok(store)
}

/// Server over a freshly seeded memory store
pub async fn seeded_server() -> Result<TestServer> {
    TestServer::spawn(Arc::new(seeded_store().await?)).await
}

/// Client that sends the development credentials on every call
pub struct AuthedClient {
    inner: reqwest::Client,
}

impl AuthedClient {
    pub fn new() -> Self {
        Self {
            inner: reqwest::Client::new(),
        }
    }

    pub fn get(&self, url: String) -> reqwest::RequestBuilder {
        self.inner.get(url).basic_auth(USER, Some(SECRET))
    }

    pub fn post(&self, url: String) -> reqwest::RequestBuilder {
        self.inner.post(url).basic_auth(USER, Some(SECRET))
    }

    pub fn put(&self, url: String) -> reqwest::RequestBuilder {
        self.inner.put(url).basic_auth(USER, Some(SECRET))
    }

    pub fn delete(&self, url: String) -> reqwest::RequestBuilder {
        self.inner.delete(url).basic_auth(USER, Some(SECRET))
    }
}

/// Switches that make the wrapped store misbehave, plus counters of how
/// sessions ended.
#[derive(Default)]
pub struct Faults {
    pub find: AtomicBool,
    pub get: AtomicBool,
    pub insert: AtomicBool,
    pub insert_duplicate: AtomicBool,
    pub update: AtomicBool,
    pub delete: AtomicBool,
    pub rollback: AtomicBool,
    pub stale_reads: AtomicBool,
    pub commits: AtomicUsize,
    pub rollbacks: AtomicUsize,
}

impl Faults {
    pub fn set(flag: &AtomicBool) {
        flag.store(true, Ordering::SeqCst);
    }

    pub fn commits(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    pub fn rollbacks(&self) -> usize {
        self.rollbacks.load(Ordering::SeqCst)
    }
}

fn injected(what: &str) -> StoreError {
    StoreError::Backend(format!("injected {} failure", what))
}

/// Memory store wrapper with switchable failures
#[derive(Clone)]
pub struct FaultyStore {
    inner: MemoryEngineerStore,
    pub faults: Arc<Faults>,
}

impl FaultyStore {
    pub fn new(inner: MemoryEngineerStore) -> Self {
        Self {
            inner,
            faults: Arc::new(Faults::default()),
        }
    }
}

#[async_trait]
impl EngineerStore for FaultyStore {
    async fn find(&self, filter: &EngineerFilter) -> Result<Vec<Engineer>, StoreError> {
        if self.faults.find.load(Ordering::SeqCst) {
            return Err(injected("find"));
        }
        self.inner.find(filter).await
    }

    async fn get(&self, username: &str) -> Result<Option<Engineer>, StoreError> {
        if self.faults.get.load(Ordering::SeqCst) {
            return Err(injected("get"));
        }
        let found = self.inner.get(username).await?;
        if self.faults.stale_reads.load(Ordering::SeqCst) {
            return Ok(found.map(|mut engineer| {
                engineer.version -= 1;
                engineer
            }));
        }
        Ok(found)
    }

    async fn get_unscoped(&self, username: &str) -> Result<Option<Engineer>, StoreError> {
        self.inner.get_unscoped(username).await
    }

    async fn begin(&self) -> Result<Box<dyn EngineerSession>, StoreError> {
        Ok(Box::new(FaultySession {
            inner: self.inner.begin().await?,
            faults: Arc::clone(&self.faults),
        }))
    }
}

struct FaultySession {
    inner: Box<dyn EngineerSession>,
    faults: Arc<Faults>,
}

#[async_trait]
impl EngineerSession for FaultySession {
    async fn insert(&mut self, engineer: &mut Engineer) -> Result<(), StoreError> {
        if self.faults.insert_duplicate.load(Ordering::SeqCst) {
            return Err(StoreError::Duplicate(engineer.username.clone()));
        }
        if self.faults.insert.load(Ordering::SeqCst) {
            return Err(injected("insert"));
        }
        self.inner.insert(engineer).await
    }

    async fn update(&mut self, engineer: &mut Engineer) -> Result<(), StoreError> {
        if self.faults.update.load(Ordering::SeqCst) {
            return Err(injected("update"));
        }
        self.inner.update(engineer).await
    }

    async fn delete(&mut self, engineer: &mut Engineer) -> Result<(), StoreError> {
        if self.faults.delete.load(Ordering::SeqCst) {
            return Err(injected("delete"));
        }
        self.inner.delete(engineer).await
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.faults.commits.fetch_add(1, Ordering::SeqCst);
        self.inner.commit().await
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.faults.rollbacks.fetch_add(1, Ordering::SeqCst);
        let result = self.inner.rollback().await;
        if self.faults.rollback.load(Ordering::SeqCst) {
            return Err(injected("rollback"));
        }
        result
    }
}
