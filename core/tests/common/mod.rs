#![allow(dead_code)]

use async_trait::async_trait;
use calcpanel_core::api::{
    Commands, Content, DurableStore, EditingSurface, Interaction, MemoryStore, PanelConfig, PanelManager,
    RecoveryStore, SaveRequest, SurfaceHandle, SurfaceLauncher, VariantConfig, VariantId,
};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub fn content(v: serde_json::Value) -> Content {
    Content::new(v)
}

pub struct FakeSurface {
    handle: SurfaceHandle,
    state: Mutex<Content>,
    pub pushed: Mutex<Vec<Content>>,
    pub fail_push: AtomicBool,
}

impl FakeSurface {
    pub fn new(handle: &str) -> Arc<Self> {
        Arc::new(Self {
            handle: SurfaceHandle::from(handle),
            state: Mutex::new(Content::new(serde_json::json!({}))),
            pushed: Mutex::new(Vec::new()),
            fail_push: AtomicBool::new(false),
        })
    }

    /// Simulate the user editing the calculator.
    pub fn edit(&self, content: Content) {
        *self.state.lock().unwrap() = content;
    }
}

#[async_trait]
impl EditingSurface for FakeSurface {
    fn handle(&self) -> SurfaceHandle {
        self.handle.clone()
    }

    async fn get_state(&self) -> anyhow::Result<Content> {
        Ok(self.state.lock().unwrap().clone())
    }

    async fn set_state(&self, content: &Content) -> anyhow::Result<()> {
        if self.fail_push.load(Ordering::SeqCst) {
            anyhow::bail!("surface rejected state");
        }
        *self.state.lock().unwrap() = content.clone();
        self.pushed.lock().unwrap().push(content.clone());
        Ok(())
    }
}

/// Hands out `s1`, `s2`, ... and remembers every surface it launched.
#[derive(Default)]
pub struct FakeLauncher {
    next: AtomicUsize,
    pub fail: AtomicBool,
    /// New surfaces refuse `set_state`.
    pub fail_push: AtomicBool,
    pub launched: Mutex<Vec<Arc<FakeSurface>>>,
    pub titles: Mutex<Vec<String>>,
}

impl FakeLauncher {
    pub fn surface(&self, handle: &SurfaceHandle) -> Arc<FakeSurface> {
        self.launched
            .lock()
            .unwrap()
            .iter()
            .find(|s| &s.handle == handle)
            .cloned()
            .expect("surface was launched")
    }
}

#[async_trait]
impl SurfaceLauncher for FakeLauncher {
    async fn launch(&self, variant: &VariantConfig) -> anyhow::Result<Arc<dyn EditingSurface>> {
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("launcher unavailable");
        }
        let n = self.next.fetch_add(1, Ordering::SeqCst) + 1;
        let surface = FakeSurface::new(&format!("s{n}"));
        surface
            .fail_push
            .store(self.fail_push.load(Ordering::SeqCst), Ordering::SeqCst);
        self.titles.lock().unwrap().push(variant.title.clone());
        self.launched.lock().unwrap().push(Arc::clone(&surface));
        Ok(surface)
    }
}

/// Answers dialogs from a queue; an empty queue dismisses the dialog.
#[derive(Default)]
pub struct ScriptedDialogs {
    pub paths: Mutex<VecDeque<PathBuf>>,
    pub answers: Mutex<VecDeque<String>>,
    pub messages: Mutex<Vec<String>>,
}

impl ScriptedDialogs {
    pub fn push_path(&self, path: PathBuf) {
        self.paths.lock().unwrap().push_back(path);
    }

    pub fn push_answer(&self, answer: &str) {
        self.answers.lock().unwrap().push_back(answer.to_string());
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Interaction for ScriptedDialogs {
    async fn choose_save_location(&self, _request: &SaveRequest) -> Option<PathBuf> {
        self.paths.lock().unwrap().pop_front()
    }

    async fn choose_open_file(&self, _request: &SaveRequest) -> Option<PathBuf> {
        self.paths.lock().unwrap().pop_front()
    }

    async fn confirm(&self, _message: &str, _choices: &[&str]) -> Option<String> {
        self.answers.lock().unwrap().pop_front()
    }

    fn info(&self, message: &str) {
        self.messages.lock().unwrap().push(format!("info: {message}"));
    }

    fn error(&self, message: &str) {
        self.messages.lock().unwrap().push(format!("error: {message}"));
    }
}

pub fn panel_config() -> PanelConfig {
    PanelConfig {
        confirm_on_close: true,
        variants: vec![VariantConfig {
            id: VariantId::from("stable"),
            title: "Stable".to_string(),
            script: "stable.js".to_string(),
        }],
    }
}

pub struct Harness {
    pub manager: PanelManager,
    pub commands: Commands,
    pub launcher: Arc<FakeLauncher>,
    pub dialogs: Arc<ScriptedDialogs>,
}

/// Memory store whose writes can be made to fail.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    pub fail_writes: AtomicBool,
}

#[async_trait]
impl DurableStore for FlakyStore {
    fn name(&self) -> &str {
        "flaky"
    }

    async fn get(&self, key: &str) -> anyhow::Result<Option<Vec<serde_json::Value>>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, values: Vec<serde_json::Value>) -> anyhow::Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            anyhow::bail!("disk full");
        }
        self.inner.set(key, values).await
    }
}

pub fn harness() -> Harness {
    harness_with_store(Arc::new(MemoryStore::new()))
}

pub fn harness_with_store(store: Arc<dyn DurableStore>) -> Harness {
    let recovery = Arc::new(RecoveryStore::with_limits(
        store,
        "test.unsaved",
        1000,
        100,
    ));
    let launcher = Arc::new(FakeLauncher::default());
    let dialogs = Arc::new(ScriptedDialogs::default());
    let manager = PanelManager::new(recovery, launcher.clone(), panel_config());
    let commands = Commands::new(manager.clone(), dialogs.clone());
    Harness {
        manager,
        commands,
        launcher,
        dialogs,
    }
}
