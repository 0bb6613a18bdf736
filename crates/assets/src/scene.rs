use std::path::{Path, PathBuf};

use glam::Vec3;
use planefield_common::{Bitmap, PlaneConfig};
use serde::{Deserialize, Serialize};

use crate::AssetError;
use crate::bitmap::{checkerboard, load_bitmap, radial_height_map};

/// Where a plane's bitmap comes from.
///
/// In JSON either a path string or an object such as
/// `{ "procedural": "checkerboard", "size": 256, "cells": 8 }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BitmapSource {
    File(PathBuf),
    Procedural(ProceduralBitmap),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "procedural", rename_all = "snake_case")]
pub enum ProceduralBitmap {
    Checkerboard {
        size: u32,
        cells: u32,
        #[serde(default = "default_light")]
        a: [u8; 4],
        #[serde(default = "default_dark")]
        b: [u8; 4],
    },
    Dome {
        size: u32,
    },
}

fn default_light() -> [u8; 4] {
    [230, 230, 230, 255]
}

fn default_dark() -> [u8; 4] {
    [40, 40, 40, 255]
}

impl BitmapSource {
    /// Decodes or generates the bitmap. Relative paths resolve against `base`.
    pub fn resolve(&self, base: &Path) -> Result<Bitmap, AssetError> {
        match self {
            Self::File(path) => load_bitmap(base.join(path)),
            Self::Procedural(ProceduralBitmap::Checkerboard { size, cells, a, b }) => {
                Ok(checkerboard(*size, *cells, *a, *b))
            }
            Self::Procedural(ProceduralBitmap::Dome { size }) => Ok(radial_height_map(*size)),
        }
    }
}

/// One plane entry of a scene file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaneDescription {
    #[serde(flatten)]
    pub config: PlaneConfig,
    /// Color texture. A default checkerboard is used when absent.
    #[serde(default)]
    pub texture: Option<BitmapSource>,
    /// Height map; its presence selects vertex displacement.
    #[serde(default)]
    pub height_map: Option<BitmapSource>,
}

impl PlaneDescription {
    pub fn new(config: PlaneConfig) -> Self {
        Self {
            config,
            texture: None,
            height_map: None,
        }
    }

    /// Resolves `(color, height)` bitmaps.
    pub fn bitmaps(&self, base: &Path) -> Result<(Bitmap, Option<Bitmap>), AssetError> {
        let color = match &self.texture {
            Some(source) => source.resolve(base)?,
            None => checkerboard(256, 8, default_light(), default_dark()),
        };
        let height = self
            .height_map
            .as_ref()
            .map(|source| source.resolve(base))
            .transpose()?;
        Ok((color, height))
    }
}

/// JSON scene file: an ordered plane list plus an optional light position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    #[serde(default)]
    pub light_position: Option<Vec3>,
    #[serde(default)]
    pub planes: Vec<PlaneDescription>,
}

impl SceneDescription {
    pub fn from_json_str(json: &str) -> Result<Self, AssetError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let file = std::fs::File::open(path)?;
        Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
    }

    /// Three planes side by side; the middle one is height-displaced.
    pub fn demo() -> Self {
        let checker = |a, b| {
            Some(BitmapSource::Procedural(ProceduralBitmap::Checkerboard {
                size: 256,
                cells: 8,
                a,
                b,
            }))
        };
        Self {
            light_position: None,
            planes: vec![
                PlaneDescription {
                    config: PlaneConfig::default()
                        .with_position(Vec3::new(-8.0, 0.0, 0.0))
                        .with_size(6.0, 6.0),
                    texture: checker([220, 60, 60, 255], [250, 240, 230, 255]),
                    height_map: None,
                },
                PlaneDescription {
                    config: PlaneConfig::default()
                        .with_size(6.0, 6.0)
                        .with_segments(64, 64),
                    texture: checker([60, 160, 90, 255], [240, 240, 200, 255]),
                    height_map: Some(BitmapSource::Procedural(ProceduralBitmap::Dome {
                        size: 128,
                    })),
                },
                PlaneDescription {
                    config: PlaneConfig::default()
                        .with_position(Vec3::new(8.0, 0.0, 0.0))
                        .with_size(6.0, 6.0),
                    texture: checker([60, 90, 220, 255], [230, 230, 250, 255]),
                    height_map: None,
                },
            ],
        }
    }
}
