//! Textual transform encoding
//!
//! Scene documents store vectors as comma separated decimal strings
//! (`"x,y,z"` for position and scale, `"x,y,z,w"` for rotation). Export uses
//! the shortest representation that parses back to the same `f32`, so
//! `decode(encode(v)) == v` holds bit for bit for finite input.

use glam::{Quat, Vec3};

/// Errors produced while decoding a transform string
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CodecError {
    #[error("expected {expected} components, found {found} in '{input}'")]
    Arity {
        expected: usize,
        found: usize,
        input: String,
    },

    #[error("invalid component {index} ('{value}') in '{input}'")]
    InvalidComponent {
        index: usize,
        value: String,
        input: String,
    },
}

/// Encode a vector for export (`"x,y,z"`, full precision)
pub fn encode_vec3(v: Vec3) -> String {
    join_exact(&v.to_array())
}

/// Encode a quaternion for export (`"x,y,z,w"`, full precision)
pub fn encode_quat(q: Quat) -> String {
    join_exact(&q.to_array())
}

/// Human readable vector (`"x.xx, y.yy, z.zz"`); lossy, display only
pub fn encode_display_vec3(v: Vec3) -> String {
    join_display(&v.to_array())
}

/// Human readable quaternion (`"x.xx, y.yy, z.zz, w.ww"`); lossy, display only
pub fn encode_display_quat(q: Quat) -> String {
    join_display(&q.to_array())
}

/// Decode a `"x,y,z"` string
pub fn decode_vec3(input: &str) -> Result<Vec3, CodecError> {
    decode_components::<3>(input).map(Vec3::from_array)
}

/// Decode a `"x,y,z,w"` string; the result is not normalized
pub fn decode_quat(input: &str) -> Result<Quat, CodecError> {
    decode_components::<4>(input).map(Quat::from_array)
}

fn join_exact(values: &[f32]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn join_display(values: &[f32]) -> String {
    values
        .iter()
        .map(|v| format!("{v:.2}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn decode_components<const N: usize>(input: &str) -> Result<[f32; N], CodecError> {
    let parts: Vec<&str> = input.split(',').collect();
    if parts.len() != N {
        return Err(CodecError::Arity {
            expected: N,
            found: parts.len(),
            input: input.to_string(),
        });
    }

    let mut out = [0.0f32; N];
    for (index, (slot, raw)) in out.iter_mut().zip(parts).enumerate() {
        let value = raw.trim();
        *slot = value
            .parse::<f32>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| CodecError::InvalidComponent {
                index,
                value: value.to_string(),
                input: input.to_string(),
            })?;
    }

    Ok(out)
}
