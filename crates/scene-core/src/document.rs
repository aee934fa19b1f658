//! Scene document model and its JSON representation
//!
//! The persisted layout is:
//!
//! ```text
//! { "params": { "ground": { "texture": "...", "repeats": 50 }, "skybox": "..." },
//!   "nodes": [ { "name": "...", "position": "x,y,z", "rotation": "x,y,z,w", "scale": "x,y,z" } ] }
//! ```
//!
//! Parsing is lenient per node: a broken node is skipped and reported as a
//! [`NodeWarning`]. A bad `params` field drops only that override and is
//! reported as a [`ParamWarning`]. Only invalid JSON or a missing `nodes`
//! array fails the document as a whole.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::codec::{self, CodecError};
use crate::transform::Transform;

/// Errors that reject a whole document
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DocumentError {
    #[error("Failed to parse scene document: {0}")]
    Parse(String),

    #[error("Invalid scene document: {0}")]
    Schema(String),

    #[error("Failed to serialize scene document: {0}")]
    Serialize(String),
}

/// Ground and sky parameters of a scene
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    pub ground_texture: String,
    /// Texture tiling across the ground plane, always > 0
    pub ground_repeats: u32,
    pub sky_image: String,
}

impl Environment {
    pub fn new(
        ground_texture: impl Into<String>,
        ground_repeats: u32,
        sky_image: impl Into<String>,
    ) -> Self {
        Self {
            ground_texture: ground_texture.into(),
            ground_repeats,
            sky_image: sky_image.into(),
        }
    }

    /// Apply the overrides present in a document, leaving absent fields as they are
    pub fn apply(&mut self, params: &DocumentParams) {
        if let Some(ground) = &params.ground {
            if let Some(texture) = &ground.texture {
                self.ground_texture = texture.clone();
            }
            if let Some(repeats) = ground.repeats {
                self.ground_repeats = repeats;
            }
        }
        if let Some(skybox) = &params.skybox {
            self.sky_image = skybox.clone();
        }
    }
}

/// One placed object in a document
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRecord {
    /// Identifies the shared template, serialized as `name`
    pub template_id: String,
    pub transform: Transform,
}

impl NodeRecord {
    pub fn new(template_id: impl Into<String>, transform: Transform) -> Self {
        Self {
            template_id: template_id.into(),
            transform,
        }
    }
}

/// Fully specified scene (what export produces)
#[derive(Debug, Clone, PartialEq)]
pub struct SceneDocument {
    pub environment: Environment,
    pub nodes: Vec<NodeRecord>,
}

impl SceneDocument {
    pub fn new(environment: Environment) -> Self {
        Self {
            environment,
            nodes: Vec::new(),
        }
    }

    /// Convert to the serializable file layout
    pub fn to_file(&self) -> DocumentFile {
        DocumentFile {
            params: DocumentParams {
                ground: Some(GroundParams {
                    texture: Some(self.environment.ground_texture.clone()),
                    repeats: Some(self.environment.ground_repeats),
                }),
                skybox: Some(self.environment.sky_image.clone()),
            },
            nodes: self
                .nodes
                .iter()
                .map(|node| NodeEntry {
                    name: Some(node.template_id.clone()),
                    position: Some(codec::encode_vec3(node.transform.position)),
                    rotation: Some(codec::encode_quat(node.transform.rotation)),
                    scale: Some(codec::encode_vec3(node.transform.scale)),
                })
                .collect(),
        }
    }

    /// Pretty JSON with two space indentation
    pub fn to_json_pretty(&self) -> Result<String, DocumentError> {
        serde_json::to_string_pretty(&self.to_file())
            .map_err(|e| DocumentError::Serialize(e.to_string()))
    }
}

/// Serialized document layout
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DocumentFile {
    pub params: DocumentParams,
    pub nodes: Vec<NodeEntry>,
}

/// Environment overrides; absent fields mean "keep the current value"
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DocumentParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ground: Option<GroundParams>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skybox: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroundParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub texture: Option<String>,
    /// Always > 0 when parsed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeats: Option<u32>,
}

/// Serialized node; every field is optional on input
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<String>,
}

/// Why a node was skipped
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NodeIssue {
    #[error("node has no name")]
    MissingName,

    #[error("malformed node: {0}")]
    Malformed(String),

    #[error("invalid {field}: {error}")]
    Transform {
        field: &'static str,
        error: CodecError,
    },

    #[error("template failed to load: {0}")]
    TemplateLoad(String),
}

/// A node-local problem; the node is skipped and processing continues
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("node {index}: {issue}")]
pub struct NodeWarning {
    /// Position of the node in the document's `nodes` array
    pub index: usize,
    pub template_id: Option<String>,
    pub issue: NodeIssue,
}

/// A dropped environment override; the current value is kept
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("params.{field}: {reason}")]
pub struct ParamWarning {
    pub field: &'static str,
    pub reason: String,
}

impl ParamWarning {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Result of parsing a document: valid nodes plus the reasons others were dropped
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedDocument {
    pub params: DocumentParams,
    pub param_warnings: Vec<ParamWarning>,
    /// Valid nodes with their document index, in document order
    pub nodes: Vec<(usize, NodeRecord)>,
    pub warnings: Vec<NodeWarning>,
}

impl ParsedDocument {
    pub fn records(&self) -> impl Iterator<Item = &NodeRecord> {
        self.nodes.iter().map(|(_, record)| record)
    }
}

/// Parse and validate a scene document
pub fn parse_document(bytes: &[u8]) -> Result<ParsedDocument, DocumentError> {
    let value: Value =
        serde_json::from_slice(bytes).map_err(|e| DocumentError::Parse(e.to_string()))?;

    let Value::Object(mut root) = value else {
        return Err(DocumentError::Schema("document is not an object".into()));
    };

    let Some(Value::Array(entries)) = root.remove("nodes") else {
        return Err(DocumentError::Schema(
            "nodes missing or not an array".into(),
        ));
    };

    let mut param_warnings = Vec::new();
    let params = parse_params(root.remove("params"), &mut param_warnings);
    let mut parsed = ParsedDocument {
        params,
        param_warnings,
        ..Default::default()
    };

    for (index, raw) in entries.into_iter().enumerate() {
        match parse_node(raw) {
            Ok(record) => parsed.nodes.push((index, record)),
            Err((template_id, issue)) => parsed.warnings.push(NodeWarning {
                index,
                template_id,
                issue,
            }),
        }
    }

    Ok(parsed)
}

fn parse_params(raw: Option<Value>, warnings: &mut Vec<ParamWarning>) -> DocumentParams {
    let mut fields = match raw {
        None | Some(Value::Null) => return DocumentParams::default(),
        Some(Value::Object(fields)) => fields,
        Some(other) => {
            warnings.push(ParamWarning::new("params", format!("expected an object, got {other}")));
            return DocumentParams::default();
        }
    };

    let ground = match fields.remove("ground") {
        None | Some(Value::Null) => None,
        Some(Value::Object(mut ground)) => {
            let ground = GroundParams {
                texture: string_param(ground.remove("texture"), "ground.texture", warnings),
                repeats: repeats_param(ground.remove("repeats"), warnings),
            };
            (ground != GroundParams::default()).then_some(ground)
        }
        Some(other) => {
            warnings.push(ParamWarning::new("ground", format!("expected an object, got {other}")));
            None
        }
    };

    DocumentParams {
        ground,
        skybox: string_param(fields.remove("skybox"), "skybox", warnings),
    }
}

fn string_param(
    value: Option<Value>,
    field: &'static str,
    warnings: &mut Vec<ParamWarning>,
) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => {
            warnings.push(ParamWarning::new(field, format!("expected a string, got {other}")));
            None
        }
    }
}

fn repeats_param(value: Option<Value>, warnings: &mut Vec<ParamWarning>) -> Option<u32> {
    let value = value.filter(|v| !v.is_null())?;
    let repeats = value
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .filter(|&n| n > 0);
    if repeats.is_none() {
        warnings.push(ParamWarning::new(
            "ground.repeats",
            format!("expected a positive integer, got {value}"),
        ));
    }
    repeats
}

fn parse_node(raw: Value) -> Result<NodeRecord, (Option<String>, NodeIssue)> {
    if !raw.is_object() {
        return Err((None, NodeIssue::Malformed("node is not an object".into())));
    }

    let entry: NodeEntry =
        serde_json::from_value(raw).map_err(|e| (None, NodeIssue::Malformed(e.to_string())))?;

    let template_id = match entry.name {
        Some(name) if !name.is_empty() => name,
        _ => return Err((None, NodeIssue::MissingName)),
    };

    let fail = |field: &'static str, error: CodecError| {
        (
            Some(template_id.clone()),
            NodeIssue::Transform { field, error },
        )
    };

    let mut transform = Transform::IDENTITY;
    if let Some(position) = &entry.position {
        transform.position = codec::decode_vec3(position).map_err(|e| fail("position", e))?;
    }
    if let Some(rotation) = &entry.rotation {
        transform.rotation = codec::decode_quat(rotation).map_err(|e| fail("rotation", e))?;
    }
    if let Some(scale) = &entry.scale {
        transform.scale = codec::decode_vec3(scale).map_err(|e| fail("scale", e))?;
    }

    Ok(NodeRecord::new(template_id, transform))
}
