//! Surface materials

/// Surface appearance of a mesh leaf.
///
/// Materials are plain values: every leaf owns its own copy, so swapping one
/// leaf's material never affects other instances of the same template.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    /// Base color (RGBA).
    pub base_color: [f32; 4],
    /// Emissive color, `None` when the material has no emissive channel.
    pub emissive: Option<[f32; 3]>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: String::from("default"),
            base_color: [0.8, 0.8, 0.8, 1.0],
            emissive: Some([0.0; 3]),
        }
    }
}

impl Material {
    /// Creates a lit material with a black emissive channel.
    pub fn standard(name: impl Into<String>, base_color: [f32; 4]) -> Self {
        Self {
            name: name.into(),
            base_color,
            emissive: Some([0.0; 3]),
        }
    }

    /// Creates a material without an emissive channel.
    pub fn basic(name: impl Into<String>, base_color: [f32; 4]) -> Self {
        Self {
            name: name.into(),
            base_color,
            emissive: None,
        }
    }

    pub fn with_emissive(mut self, emissive: [f32; 3]) -> Self {
        self.emissive = Some(emissive);
        self
    }

    pub fn supports_emissive(&self) -> bool {
        self.emissive.is_some()
    }

    /// Returns a tinted copy used to mark the current selection.
    ///
    /// The tint goes into the emissive channel when there is one, otherwise
    /// it replaces the base color (alpha is kept).
    pub fn highlighted(&self, tint: [f32; 3]) -> Self {
        let mut material = self.clone();
        if material.supports_emissive() {
            material.emissive = Some(tint);
        } else {
            material.base_color = [tint[0], tint[1], tint[2], self.base_color[3]];
        }
        material
    }
}
