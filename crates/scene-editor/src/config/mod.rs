//! Editor configuration module
//!
//! This module handles editor-wide configuration: where assets live, the
//! default environment, selection behavior and export settings.

mod manager;

pub use manager::{ConfigError, ConfigManager, SharedConfig, create_shared_config};

use std::path::PathBuf;

use scene_core::Environment;
use serde::{Deserialize, Serialize};

/// Asset locations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssetConfig {
    /// Root directory all relative asset paths are resolved against
    pub asset_root: PathBuf,
    /// Directory (under the root) holding `<template>.glb` files
    pub models_dir: PathBuf,
    /// Document loaded at startup
    pub default_scene: PathBuf,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("."),
            models_dir: PathBuf::from("models"),
            default_scene: PathBuf::from("scenes/scene_1.json"),
        }
    }
}

impl AssetConfig {
    pub fn models_path(&self) -> PathBuf {
        self.asset_root.join(&self.models_dir)
    }
}

/// Ground and sky choices
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnvironmentConfig {
    /// Ground textures offered to the user
    pub ground_textures: Vec<String>,
    /// Sky images offered to the user
    pub skybox_files: Vec<String>,
    pub ground_texture: String,
    pub ground_repeats: u32,
    pub skybox: String,
    /// Edge length of the ground plane
    pub ground_size: f32,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            ground_textures: vec![
                "aerial_grass_rock".into(),
                "sand".into(),
                "mud".into(),
            ],
            skybox_files: vec![
                "DaySkyHDRI019A_2K-TONEMAPPED.jpg".into(),
                "DaySkyHDRI050A_2K-TONEMAPPED.jpg".into(),
                "NightSkyHDRI009_2K-TONEMAPPED.jpg".into(),
            ],
            ground_texture: "aerial_grass_rock".into(),
            ground_repeats: 50,
            skybox: "DaySkyHDRI019A_2K-TONEMAPPED.jpg".into(),
            ground_size: 100.0,
        }
    }
}

impl EnvironmentConfig {
    /// Environment applied at startup
    pub fn initial_environment(&self) -> Environment {
        Environment::new(
            self.ground_texture.clone(),
            self.ground_repeats.max(1),
            self.skybox.clone(),
        )
    }
}

/// Selection behavior
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SelectionConfig {
    /// Tint applied to the selected leaf (RGB, 0..1)
    pub highlight_color: [f32; 3],
    /// Key toggling drag-to-ground placement (matched case-insensitively)
    pub move_key: char,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            // #ff5500
            highlight_color: [1.0, 85.0 / 255.0, 0.0],
            move_key: 'g',
        }
    }
}

/// Export settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportConfig {
    /// Directory exports are written to
    pub directory: PathBuf,
    pub file_name: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            file_name: "scene_export.json".into(),
        }
    }
}

/// Complete editor configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct EditorConfig {
    /// Configuration format version
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub assets: AssetConfig,
    #[serde(default)]
    pub environment: EnvironmentConfig,
    #[serde(default)]
    pub selection: SelectionConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

impl EditorConfig {
    /// Current configuration version
    pub const CURRENT_VERSION: u32 = 1;

    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            ..Default::default()
        }
    }
}
