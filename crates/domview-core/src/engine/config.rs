use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for '{parameter}': {reason}")]
    Invalid {
        parameter: &'static str,
        reason: String,
    },
}

/// Atom-count and backbone-completeness limits that drive representation choice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Levels with more atoms than this are drawn as ribbons.
    pub ribbon_atom_limit: usize,
    /// Structures with more atoms than this get a volumetric whole-structure view.
    pub volumetric_atom_limit: usize,
    /// Below this ratio of bonded backbone N to Cα the chain is traced through Cα only.
    pub min_backbone_ratio: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            ribbon_atom_limit: 99_999,
            volumetric_atom_limit: 499_999,
            min_backbone_ratio: 0.33,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Sizes and quality of the two images exported per context level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSpec {
    pub thumbnail: ImageSize,
    pub full: ImageSize,
    pub ray: bool,
}

impl Default for ImageSpec {
    fn default() -> Self {
        Self {
            thumbnail: ImageSize::new(300, 300),
            full: ImageSize::new(1024, 768),
            ray: true,
        }
    }
}

/// A color stop of the surface ramp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RampColor {
    /// Takes the color of the nearest atom.
    Atom,
    White,
}

impl RampColor {
    /// Renderer color code: `-1` for atom colors, `0` for white.
    pub fn code(&self) -> i32 {
        match self {
            RampColor::Atom => -1,
            RampColor::White => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VolumetricParams {
    pub gaussian_resolution: f64,
    pub gaussian_b_floor: f64,
    pub grid_spacing: f64,
    pub buffer: f64,
    pub isosurface_level: f64,
    pub ramp_levels: [f64; 3],
    pub ramp_colors: [RampColor; 3],
    pub transparency: f64,
}

impl Default for VolumetricParams {
    fn default() -> Self {
        Self {
            gaussian_resolution: 10.0,
            gaussian_b_floor: 50.0,
            grid_spacing: 10.0,
            buffer: 10.0,
            isosurface_level: 1.0,
            ramp_levels: [0.0, 10.0, 10.0],
            ramp_colors: [RampColor::Atom, RampColor::Atom, RampColor::White],
            transparency: 0.5,
        }
    }
}

/// Radius in Angstroms around atomic ligands used when none is configured.
pub const DEFAULT_LIGAND_SHELL_RADIUS: f64 = 4.0;

#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// Directory receiving the PNG images and the assembly coordinates.
    pub output_dir: PathBuf,
    pub thresholds: Thresholds,
    pub images: ImageSpec,
    pub volumetric: VolumetricParams,
    /// Radius around atomic ligands in which coordinating side chains are drawn.
    pub ligand_shell_radius: f64,
}

#[derive(Default)]
pub struct RenderConfigBuilder {
    output_dir: Option<PathBuf>,
    thresholds: Option<Thresholds>,
    images: Option<ImageSpec>,
    volumetric: Option<VolumetricParams>,
    ligand_shell_radius: Option<f64>,
}

impl RenderConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }
    pub fn thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = Some(thresholds);
        self
    }
    pub fn images(mut self, images: ImageSpec) -> Self {
        self.images = Some(images);
        self
    }
    pub fn volumetric(mut self, params: VolumetricParams) -> Self {
        self.volumetric = Some(params);
        self
    }
    pub fn ligand_shell_radius(mut self, radius: f64) -> Self {
        self.ligand_shell_radius = Some(radius);
        self
    }

    pub fn build(self) -> Result<RenderConfig, ConfigError> {
        let output_dir = self
            .output_dir
            .ok_or(ConfigError::MissingParameter("output_dir"))?;
        let thresholds = self.thresholds.unwrap_or_default();
        let images = self.images.unwrap_or_default();
        let volumetric = self.volumetric.unwrap_or_default();
        let ligand_shell_radius = self.ligand_shell_radius.unwrap_or(DEFAULT_LIGAND_SHELL_RADIUS);

        if !(thresholds.min_backbone_ratio > 0.0 && thresholds.min_backbone_ratio <= 1.0) {
            return Err(ConfigError::Invalid {
                parameter: "min_backbone_ratio",
                reason: format!("{} is outside (0, 1]", thresholds.min_backbone_ratio),
            });
        }
        for (parameter, size) in [("thumbnail", images.thumbnail), ("full", images.full)] {
            if size.width == 0 || size.height == 0 {
                return Err(ConfigError::Invalid {
                    parameter,
                    reason: format!("image size {} has a zero dimension", size),
                });
            }
        }
        if !(0.0..=1.0).contains(&volumetric.transparency) {
            return Err(ConfigError::Invalid {
                parameter: "transparency",
                reason: format!("{} is outside [0, 1]", volumetric.transparency),
            });
        }
        if ligand_shell_radius <= 0.0 {
            return Err(ConfigError::Invalid {
                parameter: "ligand_shell_radius",
                reason: format!("{} must be positive", ligand_shell_radius),
            });
        }

        Ok(RenderConfig {
            output_dir,
            thresholds,
            images,
            volumetric,
            ligand_shell_radius,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_applies_defaults() {
        let config = RenderConfigBuilder::new().output_dir("/tmp/out").build().unwrap();
        assert_eq!(config.thresholds.ribbon_atom_limit, 99_999);
        assert_eq!(config.thresholds.volumetric_atom_limit, 499_999);
        assert_eq!(config.images.thumbnail, ImageSize::new(300, 300));
        assert_eq!(config.images.full, ImageSize::new(1024, 768));
        assert!(config.images.ray);
        assert_eq!(config.volumetric.ramp_levels, [0.0, 10.0, 10.0]);
        assert_eq!(config.ligand_shell_radius, DEFAULT_LIGAND_SHELL_RADIUS);
    }

    #[test]
    fn build_requires_output_dir() {
        assert_eq!(
            RenderConfigBuilder::new().build(),
            Err(ConfigError::MissingParameter("output_dir"))
        );
    }

    #[test]
    fn build_rejects_out_of_range_values() {
        let bad_ratio = RenderConfigBuilder::new()
            .output_dir("out")
            .thresholds(Thresholds {
                min_backbone_ratio: 0.0,
                ..Thresholds::default()
            })
            .build();
        assert!(matches!(
            bad_ratio,
            Err(ConfigError::Invalid {
                parameter: "min_backbone_ratio",
                ..
            })
        ));

        let bad_image = RenderConfigBuilder::new()
            .output_dir("out")
            .images(ImageSpec {
                thumbnail: ImageSize::new(0, 300),
                ..ImageSpec::default()
            })
            .build();
        assert!(matches!(
            bad_image,
            Err(ConfigError::Invalid {
                parameter: "thumbnail",
                ..
            })
        ));
    }

    #[test]
    fn ramp_colors_use_renderer_codes() {
        let codes: Vec<i32> = VolumetricParams::default()
            .ramp_colors
            .iter()
            .map(RampColor::code)
            .collect();
        assert_eq!(codes, vec![-1, -1, 0]);
    }
}
