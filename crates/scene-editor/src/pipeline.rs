//! Scene pipeline: load, import and export of scene documents
//!
//! Every load runs the same stages: read bytes from a [`DocumentSource`],
//! parse and validate, resolve templates through the [`ModelCache`], clone,
//! place, and finally commit to the [`SceneStore`](crate::store::SceneStore).
//! Whole-document errors surface before anything is committed; node-local
//! problems skip the node and end up in the [`LoadReport`].

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::future::join_all;
use parking_lot::Mutex;
use scene_core::{
    DocumentError, NodeIssue, NodeRecord, NodeWarning, ParamWarning, ParsedDocument,
    SceneDocument, parse_document,
};
use scene_renderer::{ObjectId, SceneNode};

use crate::cache::ModelCache;
use crate::sources::{DocumentSink, DocumentSource, SourceError, SourceRef};
use crate::store::SharedSceneStore;

/// Where the pipeline is in its current (or last) operation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PipelineState {
    #[default]
    Idle,
    Loading,
    /// Last operation placed this many objects
    Loaded(usize),
    Failed(String),
}

/// Errors that abort a pipeline operation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("A scene load is already in progress")]
    Busy,
}

/// Outcome of a successful load or import
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    /// Placed objects in document order
    pub objects: Vec<ObjectId>,
    /// Nodes that were skipped
    pub warnings: Vec<NodeWarning>,
    /// Environment overrides an import dropped
    pub param_warnings: Vec<ParamWarning>,
}

impl LoadReport {
    pub fn loaded(&self) -> usize {
        self.objects.len()
    }
}

/// Clears the busy flag when an operation ends, however it ends
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

type Placed = (ObjectId, String, SceneNode);

pub struct ScenePipeline {
    store: SharedSceneStore,
    cache: Arc<ModelCache>,
    source: Arc<dyn DocumentSource>,
    state: Mutex<PipelineState>,
    busy: AtomicBool,
}

impl ScenePipeline {
    pub fn new(
        store: SharedSceneStore,
        cache: Arc<ModelCache>,
        source: Arc<dyn DocumentSource>,
    ) -> Self {
        Self {
            store,
            cache,
            source,
            state: Mutex::new(PipelineState::Idle),
            busy: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state.lock().clone()
    }

    pub fn store(&self) -> &SharedSceneStore {
        &self.store
    }

    pub fn cache(&self) -> &Arc<ModelCache> {
        &self.cache
    }

    /// Appends the nodes of a document to the current scene; `params` are ignored
    pub async fn load_from_source(&self, source: &SourceRef) -> Result<LoadReport, PipelineError> {
        let _guard = self.begin()?;
        tracing::info!("Loading scene from {}", source);

        let result = async {
            let parsed = self.read_document(source).await?;
            let ParsedDocument {
                nodes, warnings, ..
            } = parsed;

            let (placed, warnings) = self.instantiate(nodes, warnings).await;
            let mut store = self.store.lock();
            let objects = placed.iter().map(|(id, _, _)| *id).collect();
            for (id, template_id, root) in placed {
                store.push_object(id, template_id, root);
            }
            Ok::<_, PipelineError>(LoadReport {
                objects,
                warnings,
                ..Default::default()
            })
        }
        .await;

        self.finish(result)
    }

    /// Replaces the current scene with a document.
    ///
    /// The document is read and validated before the scene is cleared, so a
    /// broken document leaves the current scene in place. Environment fields
    /// the document omits, or gives invalid values for, keep their current value.
    pub async fn import_from_source(
        &self,
        source: &SourceRef,
    ) -> Result<LoadReport, PipelineError> {
        let _guard = self.begin()?;
        tracing::info!("Importing scene from {}", source);

        let result = async {
            let parsed = self.read_document(source).await?;
            for warning in &parsed.param_warnings {
                tracing::warn!("Ignoring {}", warning);
            }

            {
                let mut store = self.store.lock();
                store.clear();
                let mut environment = store.environment().clone();
                environment.apply(&parsed.params);
                if parsed.params.ground.is_some() {
                    store.set_ground(&environment.ground_texture, environment.ground_repeats);
                }
                if parsed.params.skybox.is_some() {
                    store.set_sky(&environment.sky_image);
                }
            }

            let (placed, warnings) = self.instantiate(parsed.nodes, parsed.warnings).await;
            let mut store = self.store.lock();
            let objects = placed.iter().map(|(id, _, _)| *id).collect();
            for (id, template_id, root) in placed {
                store.push_object(id, template_id, root);
            }
            Ok::<_, PipelineError>(LoadReport {
                objects,
                warnings,
                param_warnings: parsed.param_warnings,
            })
        }
        .await;

        self.finish(result)
    }

    /// Replaces environment and objects with a fully specified document
    pub async fn apply_document(
        &self,
        document: SceneDocument,
    ) -> Result<LoadReport, PipelineError> {
        let _guard = self.begin()?;
        let SceneDocument { environment, nodes } = document;
        let nodes: Vec<(usize, NodeRecord)> = nodes.into_iter().enumerate().collect();

        let (placed, warnings) = self.instantiate(nodes, Vec::new()).await;
        let objects = placed.iter().map(|(id, _, _)| *id).collect();
        self.store.lock().replace(environment, placed);

        self.finish(Ok(LoadReport {
            objects,
            warnings,
            ..Default::default()
        }))
    }

    /// Snapshot of the current scene
    pub fn export_document(&self) -> SceneDocument {
        let store = self.store.lock();
        let mut document = SceneDocument::new(store.environment().clone());
        for object in store.loaded_objects() {
            match store.object_transform(object.id) {
                Some(transform) => document
                    .nodes
                    .push(NodeRecord::new(object.template_id.clone(), transform)),
                None => tracing::warn!("Object {} missing from render tree", object.id),
            }
        }
        document
    }

    pub fn export_json(&self) -> Result<String, DocumentError> {
        self.export_document().to_json_pretty()
    }

    /// Writes the current scene as `file_name` into a sink
    pub fn export_to_sink(
        &self,
        sink: &dyn DocumentSink,
        file_name: &str,
    ) -> Result<PathBuf, PipelineError> {
        let json = self.export_json()?;
        let path = sink.write(file_name, json.as_bytes())?;
        tracing::info!("Exported scene to {:?}", path);
        Ok(path)
    }

    /// Removes every placed object, keeping the environment.
    ///
    /// Rejected while a load is in flight, since that load would append its
    /// objects after the clear.
    pub fn clear_scene(&self) -> Result<usize, PipelineError> {
        if self.busy.load(Ordering::Acquire) {
            tracing::warn!("Rejected scene clear: pipeline busy");
            return Err(PipelineError::Busy);
        }
        Ok(self.store.lock().clear())
    }

    fn begin(&self) -> Result<BusyGuard<'_>, PipelineError> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            tracing::warn!("Rejected scene load: pipeline busy");
            return Err(PipelineError::Busy);
        }
        *self.state.lock() = PipelineState::Loading;
        Ok(BusyGuard(&self.busy))
    }

    fn finish(
        &self,
        result: Result<LoadReport, PipelineError>,
    ) -> Result<LoadReport, PipelineError> {
        let state = match &result {
            Ok(report) => {
                tracing::info!(
                    "Placed {} objects ({} skipped)",
                    report.loaded(),
                    report.warnings.len()
                );
                PipelineState::Loaded(report.loaded())
            }
            Err(e) => {
                tracing::error!("Scene load failed: {}", e);
                PipelineState::Failed(e.to_string())
            }
        };
        *self.state.lock() = state;
        result
    }

    async fn read_document(&self, source: &SourceRef) -> Result<ParsedDocument, PipelineError> {
        let bytes = self.source.read(source).await?;
        let parsed = parse_document(&bytes)?;
        for warning in &parsed.warnings {
            tracing::warn!("Skipping {}", warning);
        }
        Ok(parsed)
    }

    /// Resolves templates for all records at once and clones them in document order
    async fn instantiate(
        &self,
        nodes: Vec<(usize, NodeRecord)>,
        mut warnings: Vec<NodeWarning>,
    ) -> (Vec<Placed>, Vec<NodeWarning>) {
        let results = join_all(
            nodes
                .iter()
                .map(|(_, record)| self.cache.get_or_load(&record.template_id)),
        )
        .await;

        let mut placed = Vec::with_capacity(nodes.len());
        for ((index, record), result) in nodes.into_iter().zip(results) {
            match result {
                Ok(template) => {
                    let id = ObjectId::new();
                    let mut root = ModelCache::instantiate(&template, id);
                    root.transform = record.transform;
                    placed.push((id, record.template_id, root));
                }
                Err(e) => {
                    let warning = NodeWarning {
                        index,
                        template_id: Some(record.template_id),
                        issue: NodeIssue::TemplateLoad(e.reason),
                    };
                    tracing::warn!("Skipping {}", warning);
                    warnings.push(warning);
                }
            }
        }

        warnings.sort_by_key(|w| w.index);
        (placed, warnings)
    }
}
