pub mod defaults;
pub mod models;

use crate::cli::{RenderArgs, RepositoryArgs};
use crate::error::{CliError, Result};
use defaults::DefaultsConfig;
use directories::ProjectDirs;
use domview::engine::config::{
    DEFAULT_LIGAND_SHELL_RADIUS, ImageSize, ImageSpec, Thresholds, VolumetricParams,
};
use models::{AppConfig, RepositoryConfig};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialRepositoryConfig {
    pdb_template: Option<String>,
    mmcif_template: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialOutputConfig {
    root: Option<PathBuf>,
    ray: Option<bool>,
    thumbnail_width: Option<u32>,
    thumbnail_height: Option<u32>,
    full_width: Option<u32>,
    full_height: Option<u32>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialThresholdsConfig {
    ribbon_atom_limit: Option<usize>,
    volumetric_atom_limit: Option<usize>,
    min_backbone_ratio: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialVolumetricConfig {
    gaussian_resolution: Option<f64>,
    gaussian_b_floor: Option<f64>,
    grid_spacing: Option<f64>,
    buffer: Option<f64>,
    isosurface_level: Option<f64>,
    transparency: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialRendererConfig {
    executable: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialLigandsConfig {
    shell_radius: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialAppConfig {
    repository: Option<PartialRepositoryConfig>,
    output: Option<PartialOutputConfig>,
    thresholds: Option<PartialThresholdsConfig>,
    volumetric: Option<PartialVolumetricConfig>,
    renderer: Option<PartialRendererConfig>,
    ligands: Option<PartialLigandsConfig>,
}

/// Settings given as dedicated command-line flags.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub pdb_template: Option<String>,
    pub mmcif_template: Option<String>,
    pub output_root: Option<PathBuf>,
    pub renderer: Option<PathBuf>,
}

impl CliOverrides {
    pub fn from_repository(args: &RepositoryArgs) -> Self {
        Self {
            pdb_template: args.pdb_template.clone(),
            mmcif_template: args.mmcif_template.clone(),
            ..Default::default()
        }
    }

    pub fn from_render_args(args: &RenderArgs) -> Self {
        Self {
            output_root: args.output_root.clone(),
            renderer: args.renderer.clone(),
            ..Self::from_repository(&args.repository)
        }
    }
}

/// Location of the per-user configuration file.
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("org", "caltechmsc", "domview")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid value for {}: {}", key, value)))
}

impl PartialAppConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Loads `explicit` if given, else the per-user file if it exists, else nothing.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match default_config_path() {
            Some(path) if path.is_file() => {
                info!("Using configuration file {}", path.display());
                Self::from_file(&path)
            }
            _ => {
                debug!("No configuration file found; using built-in defaults.");
                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli(
        mut self,
        overrides: &CliOverrides,
        set_values: &[String],
    ) -> Result<AppConfig> {
        self.apply_overrides(overrides);
        self.apply_set_values(set_values)?;

        let defaults = DefaultsConfig::default();
        let repository = self.repository.unwrap_or_default();
        let output = self.output.unwrap_or_default();
        let thresholds = self.thresholds.unwrap_or_default();
        let volumetric = self.volumetric.unwrap_or_default();
        let renderer = self.renderer.unwrap_or_default();
        let ligands = self.ligands.unwrap_or_default();

        let default_thresholds = Thresholds::default();
        let default_images = ImageSpec::default();
        let default_volumetric = VolumetricParams::default();

        Ok(AppConfig {
            repository: RepositoryConfig {
                pdb_template: repository.pdb_template.unwrap_or(defaults.pdb_template),
                mmcif_template: repository
                    .mmcif_template
                    .unwrap_or(defaults.mmcif_template),
            },
            output_root: output.root.unwrap_or(defaults.output_root),
            renderer: renderer.executable.unwrap_or(defaults.renderer),
            thresholds: Thresholds {
                ribbon_atom_limit: thresholds
                    .ribbon_atom_limit
                    .unwrap_or(default_thresholds.ribbon_atom_limit),
                volumetric_atom_limit: thresholds
                    .volumetric_atom_limit
                    .unwrap_or(default_thresholds.volumetric_atom_limit),
                min_backbone_ratio: thresholds
                    .min_backbone_ratio
                    .unwrap_or(default_thresholds.min_backbone_ratio),
            },
            images: ImageSpec {
                thumbnail: ImageSize::new(
                    output
                        .thumbnail_width
                        .unwrap_or(default_images.thumbnail.width),
                    output
                        .thumbnail_height
                        .unwrap_or(default_images.thumbnail.height),
                ),
                full: ImageSize::new(
                    output.full_width.unwrap_or(default_images.full.width),
                    output.full_height.unwrap_or(default_images.full.height),
                ),
                ray: output.ray.unwrap_or(default_images.ray),
            },
            volumetric: VolumetricParams {
                gaussian_resolution: volumetric
                    .gaussian_resolution
                    .unwrap_or(default_volumetric.gaussian_resolution),
                gaussian_b_floor: volumetric
                    .gaussian_b_floor
                    .unwrap_or(default_volumetric.gaussian_b_floor),
                grid_spacing: volumetric
                    .grid_spacing
                    .unwrap_or(default_volumetric.grid_spacing),
                buffer: volumetric.buffer.unwrap_or(default_volumetric.buffer),
                isosurface_level: volumetric
                    .isosurface_level
                    .unwrap_or(default_volumetric.isosurface_level),
                transparency: volumetric
                    .transparency
                    .unwrap_or(default_volumetric.transparency),
                ..default_volumetric
            },
            ligand_shell_radius: ligands
                .shell_radius
                .unwrap_or(DEFAULT_LIGAND_SHELL_RADIUS),
        })
    }

    fn apply_overrides(&mut self, overrides: &CliOverrides) {
        let repository = self.repository.get_or_insert_with(Default::default);
        if let Some(template) = &overrides.pdb_template {
            repository.pdb_template = Some(template.clone());
        }
        if let Some(template) = &overrides.mmcif_template {
            repository.mmcif_template = Some(template.clone());
        }
        if let Some(root) = &overrides.output_root {
            self.output.get_or_insert_with(Default::default).root = Some(root.clone());
        }
        if let Some(executable) = &overrides.renderer {
            self.renderer.get_or_insert_with(Default::default).executable =
                Some(executable.clone());
        }
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };

            match key {
                "repository.pdb-template" => {
                    self.repository
                        .get_or_insert_with(Default::default)
                        .pdb_template = Some(value.to_string());
                }
                "repository.mmcif-template" => {
                    self.repository
                        .get_or_insert_with(Default::default)
                        .mmcif_template = Some(value.to_string());
                }
                "output.root" => {
                    self.output.get_or_insert_with(Default::default).root =
                        Some(PathBuf::from(value));
                }
                "output.ray" => {
                    self.output.get_or_insert_with(Default::default).ray =
                        Some(parse_value(key, value)?);
                }
                "output.thumbnail-width" => {
                    self.output
                        .get_or_insert_with(Default::default)
                        .thumbnail_width = Some(parse_value(key, value)?);
                }
                "output.thumbnail-height" => {
                    self.output
                        .get_or_insert_with(Default::default)
                        .thumbnail_height = Some(parse_value(key, value)?);
                }
                "output.full-width" => {
                    self.output.get_or_insert_with(Default::default).full_width =
                        Some(parse_value(key, value)?);
                }
                "output.full-height" => {
                    self.output.get_or_insert_with(Default::default).full_height =
                        Some(parse_value(key, value)?);
                }
                "thresholds.ribbon-atom-limit" => {
                    self.thresholds
                        .get_or_insert_with(Default::default)
                        .ribbon_atom_limit = Some(parse_value(key, value)?);
                }
                "thresholds.volumetric-atom-limit" => {
                    self.thresholds
                        .get_or_insert_with(Default::default)
                        .volumetric_atom_limit = Some(parse_value(key, value)?);
                }
                "thresholds.min-backbone-ratio" => {
                    self.thresholds
                        .get_or_insert_with(Default::default)
                        .min_backbone_ratio = Some(parse_value(key, value)?);
                }
                "volumetric.transparency" => {
                    self.volumetric
                        .get_or_insert_with(Default::default)
                        .transparency = Some(parse_value(key, value)?);
                }
                "volumetric.gaussian-resolution" => {
                    self.volumetric
                        .get_or_insert_with(Default::default)
                        .gaussian_resolution = Some(parse_value(key, value)?);
                }
                "renderer.executable" => {
                    self.renderer.get_or_insert_with(Default::default).executable =
                        Some(PathBuf::from(value));
                }
                "ligands.shell-radius" => {
                    self.ligands.get_or_insert_with(Default::default).shell_radius =
                        Some(parse_value(key, value)?);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}
