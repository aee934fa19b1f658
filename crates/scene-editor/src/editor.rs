//! Editor facade wiring the pipeline, store and selection together

use std::sync::Arc;

use scene_renderer::Ray;

use crate::actions::EditorAction;
use crate::assets::{GltfTemplateLoader, TemplateLoader};
use crate::cache::ModelCache;
use crate::config::SharedConfig;
use crate::pipeline::{LoadReport, PipelineError, ScenePipeline};
use crate::selection::{InfoDisplay, SelectionController, TracingInfoDisplay};
use crate::sources::{DefaultDocumentSource, DirectorySink, DocumentSink, DocumentSource, SourceRef};
use crate::store::{SharedSceneStore, create_shared_store};

pub struct SceneEditor {
    config: SharedConfig,
    store: SharedSceneStore,
    pipeline: ScenePipeline,
    selection: SelectionController,
    sink: Box<dyn DocumentSink>,
    pending_actions: Vec<EditorAction>,
}

impl SceneEditor {
    /// Editor reading models and documents from the configured asset root.
    ///
    /// Also installs the tracing subscriber unless one is already set.
    pub fn new(config: SharedConfig) -> Self {
        if !crate::logging::init_logging() {
            tracing::debug!("Tracing subscriber already installed");
        }
        let (loader, source, sink) = {
            let cfg = config.read();
            let cfg = cfg.config();
            (
                Arc::new(GltfTemplateLoader::new(cfg.assets.models_path())),
                Arc::new(DefaultDocumentSource::new(cfg.assets.asset_root.clone())),
                Box::new(DirectorySink::new(cfg.export.directory.clone())),
            )
        };
        Self::with_collaborators(
            config,
            loader,
            source,
            sink,
            Box::new(TracingInfoDisplay::new()),
        )
    }

    pub fn with_collaborators(
        config: SharedConfig,
        loader: Arc<dyn TemplateLoader>,
        source: Arc<dyn DocumentSource>,
        sink: Box<dyn DocumentSink>,
        display: Box<dyn InfoDisplay>,
    ) -> Self {
        let (store, selection_config) = {
            let cfg = config.read();
            let cfg = cfg.config();
            (
                create_shared_store(
                    cfg.environment.initial_environment(),
                    cfg.environment.ground_size,
                ),
                cfg.selection.clone(),
            )
        };

        let pipeline = ScenePipeline::new(store.clone(), Arc::new(ModelCache::new(loader)), source);
        let selection = SelectionController::new(store.clone(), display, &selection_config);

        Self {
            config,
            store,
            pipeline,
            selection,
            sink,
            pending_actions: Vec::new(),
        }
    }

    pub fn config(&self) -> &SharedConfig {
        &self.config
    }

    pub fn store(&self) -> &SharedSceneStore {
        &self.store
    }

    pub fn pipeline(&self) -> &ScenePipeline {
        &self.pipeline
    }

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    /// Applies the configured ground and sky, then loads the default scene
    pub async fn startup(&mut self) -> Result<LoadReport, PipelineError> {
        let (environment, default_scene) = {
            let cfg = self.config.read();
            let cfg = cfg.config();
            (
                cfg.environment.initial_environment(),
                cfg.assets.default_scene.clone(),
            )
        };
        tracing::info!("Starting scene editor");

        {
            let mut store = self.store.lock();
            store.set_ground(&environment.ground_texture, environment.ground_repeats);
            store.set_sky(&environment.sky_image);
        }

        self.pipeline
            .load_from_source(&SourceRef::Path(default_scene))
            .await
    }

    pub fn queue_action(&mut self, action: EditorAction) {
        self.pending_actions.push(action);
    }

    pub fn has_pending_actions(&self) -> bool {
        !self.pending_actions.is_empty()
    }

    /// Runs queued actions one after another, returning each outcome in order
    pub async fn process_actions(&mut self) -> Vec<Result<(), PipelineError>> {
        let actions = std::mem::take(&mut self.pending_actions);
        let mut results = Vec::with_capacity(actions.len());
        for action in actions {
            tracing::debug!("Processing action: {}", action.description());
            let result = self.execute(action).await;
            if let Err(e) = &result {
                tracing::error!("Action failed: {}", e);
            }
            results.push(result);
        }
        results
    }

    pub fn on_click(&mut self, ray: &Ray) {
        self.selection.on_click(ray);
    }

    pub fn on_key(&mut self, key: char) {
        self.selection.on_key(key);
    }

    pub fn on_pointer_move(&mut self, ray: &Ray) {
        self.selection.on_pointer_move(ray);
    }

    async fn execute(&mut self, action: EditorAction) -> Result<(), PipelineError> {
        let invalidates_selection = action.invalidates_selection();

        match action {
            EditorAction::LoadScene(source) => {
                self.pipeline.load_from_source(&source).await?;
            }
            EditorAction::ImportScene(source) => {
                self.pipeline.import_from_source(&source).await?;
            }
            EditorAction::ClearScene => {
                self.pipeline.clear_scene()?;
            }
            EditorAction::ExportScene => {
                let file_name = self.config.read().config().export.file_name.clone();
                self.pipeline.export_to_sink(self.sink.as_ref(), &file_name)?;
            }
            EditorAction::SetSkybox(image) => {
                if !self
                    .config
                    .read()
                    .config()
                    .environment
                    .skybox_files
                    .contains(&image)
                {
                    tracing::warn!("Sky image {} is not in the configured list", image);
                }
                self.store.lock().set_sky(&image);
            }
            EditorAction::SetGround { texture, repeats } => {
                if !self
                    .config
                    .read()
                    .config()
                    .environment
                    .ground_textures
                    .contains(&texture)
                {
                    tracing::warn!("Ground texture {} is not in the configured list", texture);
                }
                if repeats == 0 {
                    tracing::warn!("Ground repeats must be positive, using 1");
                }
                self.store.lock().set_ground(&texture, repeats.max(1));
            }
        }

        if invalidates_selection {
            self.selection.reset();
        }
        Ok(())
    }
}
