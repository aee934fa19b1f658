//! Model cache: one template per id, shared in-flight loads

use std::collections::HashMap;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use parking_lot::Mutex;
use scene_renderer::{ObjectId, SceneNode};

use crate::assets::{Template, TemplateLoadError, TemplateLoader};

type PendingLoad = Shared<BoxFuture<'static, Result<Template, TemplateLoadError>>>;

/// Caches loaded templates and de-duplicates concurrent loads.
///
/// Entries are only ever added on success; a failed load leaves nothing
/// behind, so the next request retries.
pub struct ModelCache {
    loader: Arc<dyn TemplateLoader>,
    templates: Mutex<HashMap<String, Template>>,
    in_flight: Mutex<HashMap<String, PendingLoad>>,
}

impl ModelCache {
    pub fn new(loader: Arc<dyn TemplateLoader>) -> Self {
        Self {
            loader,
            templates: Mutex::new(HashMap::new()),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached template, joins a pending load, or starts a new one.
    pub async fn get_or_load(&self, template_id: &str) -> Result<Template, TemplateLoadError> {
        let pending = {
            let mut in_flight = self.in_flight.lock();
            if let Some(template) = self.templates.lock().get(template_id) {
                tracing::debug!("Template cache hit: {}", template_id);
                return Ok(template.clone());
            }

            match in_flight.get(template_id) {
                Some(pending) => {
                    tracing::debug!("Joining pending load: {}", template_id);
                    pending.clone()
                }
                None => {
                    tracing::debug!("Template cache miss: {}", template_id);
                    let pending = self
                        .loader
                        .load_template(template_id)
                        .map(|result| result.map(Arc::new))
                        .boxed()
                        .shared();
                    in_flight.insert(template_id.to_string(), pending.clone());
                    pending
                }
            }
        };

        let result = pending.clone().await;

        if let Ok(template) = &result {
            self.templates
                .lock()
                .entry(template_id.to_string())
                .or_insert_with(|| template.clone());
        }

        // A retry may already have registered a newer load under this id
        let mut in_flight = self.in_flight.lock();
        if in_flight
            .get(template_id)
            .is_some_and(|current| current.ptr_eq(&pending))
        {
            in_flight.remove(template_id);
        }

        result
    }

    /// Builds an independent instance of a template.
    ///
    /// The copy gets fresh node ids, every mesh leaf casts and receives
    /// shadows and is tagged selectable as `object_id`.
    pub fn instantiate(template: &SceneNode, object_id: ObjectId) -> SceneNode {
        let mut root = template.deep_copy();
        root.visit_mut(&mut |node| {
            if let Some(mesh) = node.mesh.as_mut() {
                mesh.cast_shadow = true;
                mesh.receive_shadow = true;
                node.pick = Some(object_id);
            }
        });
        root
    }

    pub fn contains(&self, template_id: &str) -> bool {
        self.templates.lock().contains_key(template_id)
    }

    /// Whether a load for `template_id` is currently pending
    pub fn is_loading(&self, template_id: &str) -> bool {
        self.in_flight.lock().contains_key(template_id)
    }

    pub fn len(&self) -> usize {
        self.templates.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.lock().is_empty()
    }

    /// Drops every cached template. Pending loads are unaffected.
    pub fn clear(&self) {
        self.templates.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeTemplateLoader, GatedTemplateLoader, SteppedTemplateLoader};

    use futures::executor::block_on;
    use glam::Mat4;

    #[test]
    fn test_second_request_hits_cache() {
        let loader = Arc::new(FakeTemplateLoader::with_templates(&["tree"]));
        let cache = ModelCache::new(loader.clone());

        let first = block_on(cache.get_or_load("tree")).unwrap();
        let second = block_on(cache.get_or_load("tree")).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(loader.calls("tree"), 1);
        assert!(cache.contains("tree"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_concurrent_requests_share_one_load() {
        let (loader, release) = GatedTemplateLoader::new(&["rock"]);
        let loader = Arc::new(loader);
        let cache = ModelCache::new(loader.clone());

        let (a, b, ()) = block_on(async {
            futures::join!(cache.get_or_load("rock"), cache.get_or_load("rock"), async {
                let _ = release.send(());
            })
        });

        let (a, b) = (a.unwrap(), b.unwrap());
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(loader.calls(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_failed_load_is_not_cached() {
        let loader = Arc::new(FakeTemplateLoader::with_templates(&[]));
        let cache = ModelCache::new(loader.clone());

        let err = block_on(cache.get_or_load("ghost")).unwrap_err();
        assert_eq!(err.template_id, "ghost");
        assert!(!cache.contains("ghost"));

        assert!(block_on(cache.get_or_load("ghost")).is_err());
        assert_eq!(loader.calls("ghost"), 2);
    }

    #[test]
    fn test_late_waiter_keeps_retry_in_flight() {
        let (loader, gates) = SteppedTemplateLoader::new(&[], 2);
        let loader = Arc::new(loader);
        let cache = ModelCache::new(loader.clone());
        let mut gates = gates.into_iter();
        let (first_gate, retry_gate) = (gates.next().unwrap(), gates.next().unwrap());

        let mut first = Box::pin(cache.get_or_load("ghost"));
        let mut late = Box::pin(cache.get_or_load("ghost"));
        assert!((&mut first).now_or_never().is_none());
        assert!((&mut late).now_or_never().is_none());

        let _ = first_gate.send(());
        assert!(block_on(&mut first).is_err());
        assert!(!cache.is_loading("ghost"));

        // The retry starts before the late waiter has seen the failure
        let mut retry = Box::pin(cache.get_or_load("ghost"));
        assert!((&mut retry).now_or_never().is_none());
        assert!(block_on(&mut late).is_err());
        assert!(cache.is_loading("ghost"));

        let mut joined = Box::pin(cache.get_or_load("ghost"));
        assert!((&mut joined).now_or_never().is_none());
        assert_eq!(loader.calls("ghost"), 2);

        let _ = retry_gate.send(());
        let (retry, joined) = block_on(async { futures::join!(retry, joined) });
        assert!(retry.is_err() && joined.is_err());
        assert_eq!(loader.calls("ghost"), 2);
        assert!(!cache.is_loading("ghost"));
    }

    #[test]
    fn test_instantiate_tags_leaves_and_keeps_template_untouched() {
        let loader = Arc::new(FakeTemplateLoader::with_templates(&["tree"]));
        let cache = ModelCache::new(loader);
        let template = block_on(cache.get_or_load("tree")).unwrap();

        let object = ObjectId::new();
        let instance = ModelCache::instantiate(&template, object);

        assert_eq!(instance.name, "tree");
        assert_ne!(instance.id, template.id);
        instance.visit(Mat4::IDENTITY, &mut |node, _| {
            if let Some(mesh) = &node.mesh {
                assert!(mesh.cast_shadow && mesh.receive_shadow);
                assert_eq!(node.pick, Some(object));
            }
        });
        template.visit(Mat4::IDENTITY, &mut |node, _| {
            assert_eq!(node.pick, None);
            if let Some(mesh) = &node.mesh {
                assert!(!mesh.cast_shadow);
            }
        });
    }

    #[test]
    fn test_clear_forces_reload() {
        let loader = Arc::new(FakeTemplateLoader::with_templates(&["tree"]));
        let cache = ModelCache::new(loader.clone());
        block_on(cache.get_or_load("tree")).unwrap();

        cache.clear();
        assert!(cache.is_empty());
        block_on(cache.get_or_load("tree")).unwrap();
        assert_eq!(loader.calls("tree"), 2);
    }
}
