//! In-memory collaborators for unit tests

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::channel::oneshot;
use futures::future::{self, BoxFuture, FutureExt, Shared};
use glam::Vec3;
use parking_lot::Mutex;
use scene_renderer::{Geometry, Material, Mesh, SceneNode};

use crate::assets::{TemplateLoadError, TemplateLoader};
use crate::selection::{InfoDisplay, SelectionInfo};
use crate::sources::{DocumentSink, DocumentSource, SourceError, SourceRef};

/// Template with a single unit cube leaf named `body`
pub fn cube_template(name: &str) -> SceneNode {
    SceneNode::new(name).with_child(SceneNode::new("body").with_mesh(Mesh::new(
        Arc::new(Geometry::cuboid(Vec3::ONE)),
        Material::standard("paint", [0.6, 0.6, 0.6, 1.0]),
    )))
}

/// Serves cube templates for a fixed set of ids and counts requests
pub struct FakeTemplateLoader {
    known: HashSet<String>,
    calls: Mutex<HashMap<String, usize>>,
}

impl FakeTemplateLoader {
    pub fn with_templates(ids: &[&str]) -> Self {
        Self {
            known: ids.iter().map(|id| id.to_string()).collect(),
            calls: Mutex::new(HashMap::new()),
        }
    }

    pub fn calls(&self, template_id: &str) -> usize {
        self.calls.lock().get(template_id).copied().unwrap_or(0)
    }
}

impl TemplateLoader for FakeTemplateLoader {
    fn load_template(
        &self,
        template_id: &str,
    ) -> BoxFuture<'static, Result<SceneNode, TemplateLoadError>> {
        *self.calls.lock().entry(template_id.to_string()).or_default() += 1;
        let result = if self.known.contains(template_id) {
            Ok(cube_template(template_id))
        } else {
            Err(TemplateLoadError::new(template_id, "no such model"))
        };
        future::ready(result).boxed()
    }
}

/// Holds every load until the paired sender fires
pub struct GatedTemplateLoader {
    inner: FakeTemplateLoader,
    gate: Shared<oneshot::Receiver<()>>,
    calls: AtomicUsize,
}

impl GatedTemplateLoader {
    pub fn new(ids: &[&str]) -> (Self, oneshot::Sender<()>) {
        let (tx, rx) = oneshot::channel();
        let loader = Self {
            inner: FakeTemplateLoader::with_templates(ids),
            gate: rx.shared(),
            calls: AtomicUsize::new(0),
        };
        (loader, tx)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TemplateLoader for GatedTemplateLoader {
    fn load_template(
        &self,
        template_id: &str,
    ) -> BoxFuture<'static, Result<SceneNode, TemplateLoadError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.gate.clone();
        let load = self.inner.load_template(template_id);
        async move {
            let _ = gate.await;
            load.await
        }
        .boxed()
    }
}

/// Gives each load its own gate, handed out in call order; loads past the
/// last gate resolve immediately
pub struct SteppedTemplateLoader {
    inner: FakeTemplateLoader,
    gates: Mutex<VecDeque<oneshot::Receiver<()>>>,
}

impl SteppedTemplateLoader {
    pub fn new(ids: &[&str], loads: usize) -> (Self, Vec<oneshot::Sender<()>>) {
        let (senders, receivers): (Vec<_>, VecDeque<_>) =
            (0..loads).map(|_| oneshot::channel()).unzip();
        let loader = Self {
            inner: FakeTemplateLoader::with_templates(ids),
            gates: Mutex::new(receivers),
        };
        (loader, senders)
    }

    pub fn calls(&self, template_id: &str) -> usize {
        self.inner.calls(template_id)
    }
}

impl TemplateLoader for SteppedTemplateLoader {
    fn load_template(
        &self,
        template_id: &str,
    ) -> BoxFuture<'static, Result<SceneNode, TemplateLoadError>> {
        let gate = self.gates.lock().pop_front();
        let load = self.inner.load_template(template_id);
        async move {
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            load.await
        }
        .boxed()
    }
}

/// Serves documents from memory, keyed by path or URL
pub struct FakeDocumentSource {
    documents: HashMap<String, Vec<u8>>,
}

impl FakeDocumentSource {
    pub fn with_documents(documents: &[(&str, &str)]) -> Self {
        Self {
            documents: documents
                .iter()
                .map(|(key, body)| (key.to_string(), body.as_bytes().to_vec()))
                .collect(),
        }
    }
}

impl DocumentSource for FakeDocumentSource {
    fn read(&self, source: &SourceRef) -> BoxFuture<'static, Result<Vec<u8>, SourceError>> {
        let result = match source {
            SourceRef::Bytes { data, .. } => Ok(data.clone()),
            SourceRef::Path(path) => {
                let key = path.to_string_lossy().to_string();
                self.documents
                    .get(&key)
                    .cloned()
                    .ok_or(SourceError::NotFound(key))
            }
            SourceRef::Url(url) => self
                .documents
                .get(url)
                .cloned()
                .ok_or_else(|| SourceError::NotFound(url.clone())),
        };
        future::ready(result).boxed()
    }
}

/// Keeps exported files in memory
#[derive(Default)]
pub struct MemorySink {
    files: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemorySink {
    pub fn file(&self, name: &str) -> Option<Vec<u8>> {
        self.files.lock().get(name).cloned()
    }
}

impl DocumentSink for MemorySink {
    fn write(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, SourceError> {
        self.files
            .lock()
            .insert(file_name.to_string(), bytes.to_vec());
        Ok(PathBuf::from(file_name))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InfoEvent {
    Shown(SelectionInfo),
    Hidden,
}

/// Records every call made to the info display
#[derive(Clone, Default)]
pub struct RecordingInfoDisplay {
    events: Arc<Mutex<Vec<InfoEvent>>>,
}

impl RecordingInfoDisplay {
    pub fn events(&self) -> Vec<InfoEvent> {
        self.events.lock().clone()
    }

    pub fn last(&self) -> Option<InfoEvent> {
        self.events.lock().last().cloned()
    }
}

impl InfoDisplay for RecordingInfoDisplay {
    fn show(&mut self, info: &SelectionInfo) {
        self.events.lock().push(InfoEvent::Shown(info.clone()));
    }

    fn hide(&mut self) {
        self.events.lock().push(InfoEvent::Hidden);
    }
}
