//! Selection state machine
//!
//! Transitions are pure: [`SelectionState::transition`] returns the next
//! state plus the effects to apply. [`SelectionController`] is the adapter
//! that hit-tests the render tree, feeds events in and applies the effects.
//!
//! ```text
//! Unselected --click(target)--> Selected --key(g)--> Selected+Moving
//!      ^                          |   ^                 |
//!      +------click(nothing)------+   +-----key(g)------+
//! ```

mod controller;
mod info;

pub use controller::SelectionController;
pub use info::{InfoDisplay, SelectionInfo, TracingInfoDisplay};

use glam::Vec3;
use scene_renderer::{Material, NodeId, ObjectId};

use crate::config::SelectionConfig;

/// A selectable leaf under the pointer, with its current material
#[derive(Debug, Clone, PartialEq)]
pub struct PickTarget {
    pub object: ObjectId,
    pub leaf: NodeId,
    pub material: Material,
}

/// The current selection
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Weak handle; the object may have been removed since
    pub object: ObjectId,
    pub leaf: NodeId,
    /// Material the leaf had before it was highlighted
    pub original_material: Material,
    pub moving: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectionEvent {
    /// Pointer click; `None` when nothing selectable was hit
    Click(Option<PickTarget>),
    Key(char),
    /// Pointer moved; ground hit point if any
    PointerMove(Option<Vec3>),
}

/// Side effects requested by a transition, applied in order
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionEffect {
    SetMaterial {
        object: ObjectId,
        leaf: NodeId,
        material: Material,
    },
    SetPosition {
        object: ObjectId,
        position: Vec3,
    },
    ShowInfo(ObjectId),
    HideInfo,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectionState {
    selected: Option<Selection>,
    highlight_color: [f32; 3],
    move_key: char,
}

impl Default for SelectionState {
    fn default() -> Self {
        Self::new(&SelectionConfig::default())
    }
}

impl SelectionState {
    pub fn new(config: &SelectionConfig) -> Self {
        Self {
            selected: None,
            highlight_color: config.highlight_color,
            move_key: config.move_key,
        }
    }

    pub fn selected(&self) -> Option<&Selection> {
        self.selected.as_ref()
    }

    pub fn is_moving(&self) -> bool {
        self.selected.as_ref().is_some_and(|s| s.moving)
    }

    /// Drops the selection without restoring anything
    pub fn forget(&mut self) {
        self.selected = None;
    }

    pub fn transition(self, event: SelectionEvent) -> (SelectionState, Vec<SelectionEffect>) {
        let mut effects = Vec::new();
        let Self {
            selected,
            highlight_color,
            move_key,
        } = self;

        let selected = match event {
            SelectionEvent::Click(None) => {
                if let Some(previous) = selected {
                    effects.push(restore(previous));
                }
                effects.push(SelectionEffect::HideInfo);
                None
            }

            SelectionEvent::Click(Some(target)) => {
                let original_material = match selected {
                    Some(previous)
                        if previous.object == target.object && previous.leaf == target.leaf =>
                    {
                        previous.original_material
                    }
                    Some(previous) => {
                        effects.push(restore(previous));
                        target.material
                    }
                    None => target.material,
                };

                effects.push(SelectionEffect::SetMaterial {
                    object: target.object,
                    leaf: target.leaf,
                    material: original_material.highlighted(highlight_color),
                });
                effects.push(SelectionEffect::ShowInfo(target.object));

                Some(Selection {
                    object: target.object,
                    leaf: target.leaf,
                    original_material,
                    moving: false,
                })
            }

            SelectionEvent::Key(key) => selected.map(|mut selection| {
                if key.eq_ignore_ascii_case(&move_key) {
                    selection.moving = !selection.moving;
                }
                selection
            }),

            SelectionEvent::PointerMove(point) => {
                if let (Some(selection @ Selection { moving: true, .. }), Some(position)) =
                    (&selected, point)
                {
                    effects.push(SelectionEffect::SetPosition {
                        object: selection.object,
                        position,
                    });
                    effects.push(SelectionEffect::ShowInfo(selection.object));
                }
                selected
            }
        };

        (
            SelectionState {
                selected,
                highlight_color,
                move_key,
            },
            effects,
        )
    }
}

fn restore(selection: Selection) -> SelectionEffect {
    SelectionEffect::SetMaterial {
        object: selection.object,
        leaf: selection.leaf,
        material: selection.original_material,
    }
}
