use std::{
    fs,
    path::Path,
    sync::Arc,
    time::{Duration, SystemTime},
};

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response},
};
use tempfile::TempDir;
use tokio::sync::Mutex;
use tower::ServiceExt;
use vitrine_core::{
    DownloadDispatcher, JobLauncher, LaunchError, MemoryLedger, model::ItemId,
};
use vitrine_server::{
    AppState,
    infra::config::{Config, EnqueueConfig},
    routes::create_router,
};

/// Records every launch instead of running a program.
#[derive(Debug, Default)]
pub struct RecordingLauncher {
    launched: Mutex<Vec<ItemId>>,
}

#[async_trait]
impl JobLauncher for RecordingLauncher {
    async fn launch(&self, id: &ItemId) -> Result<(), LaunchError> {
        self.launched.lock().await.push(id.clone());
        Ok(())
    }
}

impl RecordingLauncher {
    pub async fn launched(&self) -> Vec<ItemId> {
        self.launched.lock().await.clone()
    }

    /// Waits until `expected` launches were recorded, then a little longer
    /// to catch any extra ones.
    pub async fn settle(&self, expected: usize) -> Vec<ItemId> {
        for _ in 0..200 {
            if self.launched.lock().await.len() >= expected {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
        self.launched().await
    }
}

// Shared by several test binaries; each uses a subset.
#[allow(unused)]
#[derive(Debug)]
pub struct TestApp {
    pub dir: TempDir,
    pub state: AppState,
    pub router: Router,
    pub ledger: Arc<MemoryLedger>,
    pub launcher: Arc<RecordingLauncher>,
}

#[allow(unused)]
impl TestApp {
    pub fn new(api_key: Option<&str>) -> Result<Self> {
        Self::build(true, api_key)
    }

    pub fn without_enqueue() -> Result<Self> {
        Self::build(false, None)
    }

    fn build(enqueue_enabled: bool, api_key: Option<&str>) -> Result<Self> {
        let dir = TempDir::new()?;
        let mut config = Config::with_library_root(dir.path());
        config.enqueue = EnqueueConfig {
            enabled: enqueue_enabled,
            api_key: api_key.map(str::to_string),
            ..EnqueueConfig::default()
        };

        let ledger = Arc::new(MemoryLedger::new());
        let launcher = Arc::new(RecordingLauncher::default());
        let dispatcher = enqueue_enabled.then(|| {
            Arc::new(DownloadDispatcher::new(
                ledger.clone(),
                launcher.clone(),
                config.enqueue.max_concurrent_jobs,
            ))
        });

        let state = AppState::new(Arc::new(config), dispatcher);
        let router = create_router(state.clone());
        Ok(Self {
            dir,
            state,
            router,
            ledger,
            launcher,
        })
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Creates an item directory with a poster and optional descriptor and
    /// pins its modification time.
    pub fn item(&self, id: &str, nfo: Option<&str>, mtime: u64) -> Result<()> {
        let item_dir = self.root().join(id);
        fs::create_dir_all(&item_dir)?;
        fs::write(item_dir.join(format!("{id}-poster.jpg")), b"poster")?;
        if let Some(nfo) = nfo {
            fs::write(item_dir.join(format!("{id}.nfo")), nfo)?;
        }
        fs::File::open(&item_dir)?
            .set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(mtime))?;
        Ok(())
    }

    pub fn file(&self, id: &str, name: &str, contents: &[u8]) -> Result<()> {
        let item_dir = self.root().join(id);
        fs::create_dir_all(&item_dir)?;
        fs::write(item_dir.join(name), contents)?;
        Ok(())
    }

    pub async fn rebuild(&self) -> Result<()> {
        self.state.catalog.build().await?;
        Ok(())
    }

    pub async fn send(&self, request: Request<Body>) -> Result<Response<Body>> {
        Ok(self.router.clone().oneshot(request).await?)
    }

    pub async fn get(&self, uri: &str) -> Result<Response<Body>> {
        self.send(Request::get(uri).body(Body::empty())?).await
    }
}

#[allow(unused)]
pub async fn body_string(response: Response<Body>) -> Result<String> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(String::from_utf8(bytes.to_vec())?)
}

#[allow(unused)]
pub async fn body_json(response: Response<Body>) -> Result<serde_json::Value> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}
