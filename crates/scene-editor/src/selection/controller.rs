//! Pointer and keyboard adapter around the selection state machine

use scene_renderer::{HitTarget, Ray, RenderTree};

use super::{
    InfoDisplay, PickTarget, SelectionEffect, SelectionEvent, SelectionInfo, SelectionState,
};
use crate::config::SelectionConfig;
use crate::store::SharedSceneStore;

pub struct SelectionController {
    state: SelectionState,
    store: SharedSceneStore,
    display: Box<dyn InfoDisplay>,
}

impl SelectionController {
    pub fn new(
        store: SharedSceneStore,
        display: Box<dyn InfoDisplay>,
        config: &SelectionConfig,
    ) -> Self {
        Self {
            state: SelectionState::new(config),
            store,
            display,
        }
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    /// Selects the nearest selectable leaf under the ray, or deselects
    pub fn on_click(&mut self, ray: &Ray) {
        self.drop_stale();
        let target = pick(self.store.lock().render(), ray);
        self.dispatch(SelectionEvent::Click(target));
    }

    pub fn on_key(&mut self, key: char) {
        self.drop_stale();
        self.dispatch(SelectionEvent::Key(key));
    }

    /// Drags the selected object along the ground while moving
    pub fn on_pointer_move(&mut self, ray: &Ray) {
        self.drop_stale();
        if !self.state.is_moving() {
            return;
        }
        let point = self
            .store
            .lock()
            .render()
            .intersect_ground(ray)
            .map(|hit| hit.point);
        self.dispatch(SelectionEvent::PointerMove(point));
    }

    /// Forgets the selection after the scene was cleared or replaced
    pub fn reset(&mut self) {
        if self.state.selected().is_some() {
            tracing::debug!("Selection reset");
            self.state.forget();
        }
        self.display.hide();
    }

    fn drop_stale(&mut self) {
        let Some(selection) = self.state.selected() else {
            return;
        };
        if !self.store.lock().render().contains(selection.object) {
            tracing::debug!("Dropping selection of removed object {}", selection.object);
            self.state.forget();
        }
    }

    fn dispatch(&mut self, event: SelectionEvent) {
        tracing::debug!("Selection event: {:?}", event);
        let (next, effects) = std::mem::take(&mut self.state).transition(event);
        self.state = next;

        let mut store = self.store.lock();
        for effect in effects {
            match effect {
                SelectionEffect::SetMaterial {
                    object,
                    leaf,
                    material,
                } => {
                    store.render_mut().set_material(object, leaf, material);
                }
                SelectionEffect::SetPosition { object, position } => {
                    store.render_mut().set_object_position(object, position);
                }
                SelectionEffect::ShowInfo(object) => {
                    let name = store
                        .loaded_objects()
                        .iter()
                        .find(|o| o.id == object)
                        .map(|o| o.template_id.clone());
                    if let (Some(name), Some(transform)) = (name, store.object_transform(object)) {
                        self.display.show(&SelectionInfo::new(name, &transform));
                    }
                }
                SelectionEffect::HideInfo => self.display.hide(),
            }
        }
    }
}

/// First hit, nearest first, on a leaf tagged selectable
fn pick(render: &RenderTree, ray: &Ray) -> Option<PickTarget> {
    render.intersect(ray).into_iter().find_map(|hit| match hit.target {
        HitTarget::Mesh {
            object,
            node,
            pick: Some(owner),
        } => render.material(object, node).map(|material| PickTarget {
            object: owner,
            leaf: node,
            material: material.clone(),
        }),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ModelCache;
    use crate::store::create_shared_store;
    use crate::testing::{InfoEvent, RecordingInfoDisplay, cube_template};

    use glam::{Quat, Vec3};
    use scene_core::{Environment, Transform};
    use scene_renderer::{Material, NodeId, ObjectId};

    const TINT: [f32; 3] = [1.0, 85.0 / 255.0, 0.0];

    struct Fixture {
        controller: SelectionController,
        store: SharedSceneStore,
        display: RecordingInfoDisplay,
        a: ObjectId,
        b: ObjectId,
    }

    fn fixture() -> Fixture {
        let store = create_shared_store(Environment::new("sand", 10, "day.jpg"), 100.0);
        let (a, b) = (ObjectId::new(), ObjectId::new());
        {
            let mut guard = store.lock();
            let template = cube_template("tree");
            let rotation = Quat::from_rotation_y(0.5);

            let mut root = ModelCache::instantiate(&template, a);
            root.transform = Transform::new(Vec3::new(0.0, 0.5, 0.0), rotation, Vec3::ONE);
            guard.push_object(a, "tree", root);

            let mut root = ModelCache::instantiate(&template, b);
            root.transform = Transform::from_position(Vec3::new(5.0, 0.5, 0.0));
            guard.push_object(b, "tree", root);
        }

        let display = RecordingInfoDisplay::default();
        let controller = SelectionController::new(
            store.clone(),
            Box::new(display.clone()),
            &SelectionConfig::default(),
        );
        Fixture {
            controller,
            store,
            display,
            a,
            b,
        }
    }

    fn down_at(x: f32, z: f32) -> Ray {
        Ray::new(Vec3::new(x, 10.0, z), Vec3::NEG_Y)
    }

    fn sky_ray() -> Ray {
        Ray::new(Vec3::new(0.0, 10.0, 0.0), Vec3::Y)
    }

    fn leaf(store: &SharedSceneStore, object: ObjectId) -> NodeId {
        store.lock().render().get_object(object).unwrap().root.children[0].id
    }

    fn material(store: &SharedSceneStore, object: ObjectId) -> Material {
        let leaf = leaf(store, object);
        store.lock().render().material(object, leaf).unwrap().clone()
    }

    #[test]
    fn test_click_highlights_leaf_and_shows_info() {
        let mut f = fixture();
        let original = material(&f.store, f.a);

        f.controller.on_click(&down_at(0.1, 0.2));

        let selection = f.controller.state().selected().unwrap();
        assert_eq!(selection.object, f.a);
        assert_eq!(selection.original_material, original);
        assert_eq!(material(&f.store, f.a).emissive, Some(TINT));
        match f.display.last() {
            Some(InfoEvent::Shown(info)) => {
                assert_eq!(info.name, "tree");
                assert_eq!(info.position, "0.00, 0.50, 0.00");
            }
            other => panic!("unexpected display event {other:?}"),
        }
    }

    #[test]
    fn test_select_a_then_b_restores_a() {
        let mut f = fixture();
        let original_a = material(&f.store, f.a);
        let original_b = material(&f.store, f.b);

        f.controller.on_click(&down_at(0.1, 0.2));
        f.controller.on_click(&down_at(5.1, 0.2));

        assert_eq!(material(&f.store, f.a), original_a);
        assert_eq!(material(&f.store, f.b), original_b.highlighted(TINT));
        assert_eq!(f.controller.state().selected().unwrap().object, f.b);
    }

    #[test]
    fn test_deselect_restores_exactly() {
        let mut f = fixture();
        let original = material(&f.store, f.a);

        f.controller.on_click(&down_at(0.1, 0.2));
        f.controller.on_click(&down_at(0.1, 0.2));
        f.controller.on_click(&sky_ray());

        assert_eq!(material(&f.store, f.a), original);
        assert!(f.controller.state().selected().is_none());
        assert_eq!(f.display.last(), Some(InfoEvent::Hidden));
    }

    #[test]
    fn test_ground_click_deselects() {
        let mut f = fixture();
        f.controller.on_click(&down_at(0.1, 0.2));
        f.controller.on_click(&down_at(20.0, 20.0));
        assert!(f.controller.state().selected().is_none());
    }

    #[test]
    fn test_drag_moves_selected_object_to_ground_point() {
        let mut f = fixture();
        let before = f.store.lock().object_transform(f.a).unwrap();

        f.controller.on_click(&down_at(0.1, 0.2));
        f.controller.on_key('G');
        assert!(f.controller.state().is_moving());
        f.controller.on_pointer_move(&down_at(3.0, -2.0));

        let after = f.store.lock().object_transform(f.a).unwrap();
        assert_eq!(after.position, Vec3::new(3.0, 0.0, -2.0));
        assert_eq!(after.rotation, before.rotation);
        assert_eq!(after.scale, before.scale);
        match f.display.last() {
            Some(InfoEvent::Shown(info)) => assert_eq!(info.position, "3.00, 0.00, -2.00"),
            other => panic!("unexpected display event {other:?}"),
        }

        f.controller.on_key('g');
        f.controller.on_pointer_move(&down_at(8.0, 8.0));
        let settled = f.store.lock().object_transform(f.a).unwrap();
        assert_eq!(settled.position, Vec3::new(3.0, 0.0, -2.0));
    }

    #[test]
    fn test_keys_and_moves_without_selection_do_nothing() {
        let mut f = fixture();
        f.controller.on_key('g');
        f.controller.on_pointer_move(&down_at(3.0, -2.0));

        assert!(!f.controller.state().is_moving());
        assert!(f.display.events().is_empty());
        assert_eq!(
            f.store.lock().object_transform(f.b).unwrap().position,
            Vec3::new(5.0, 0.5, 0.0)
        );
    }

    #[test]
    fn test_stale_selection_is_dropped_silently() {
        let mut f = fixture();
        f.controller.on_click(&down_at(0.1, 0.2));
        f.controller.on_key('g');
        let events_before = f.display.events().len();

        f.store.lock().clear();
        f.controller.on_pointer_move(&down_at(3.0, -2.0));

        assert!(f.controller.state().selected().is_none());
        assert_eq!(f.display.events().len(), events_before);
    }

    #[test]
    fn test_reset_hides_info() {
        let mut f = fixture();
        f.controller.on_click(&down_at(0.1, 0.2));
        f.controller.reset();
        assert!(f.controller.state().selected().is_none());
        assert_eq!(f.display.last(), Some(InfoEvent::Hidden));
    }
}
