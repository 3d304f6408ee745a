use crate::error::{CliError, Result};
use domview::engine::config::{
    ImageSpec, RenderConfig, RenderConfigBuilder, Thresholds, VolumetricParams,
};
use std::path::{Path, PathBuf};

/// Path templates of the local structure repository.
#[derive(Debug, Clone, PartialEq)]
pub struct RepositoryConfig {
    pub pdb_template: String,
    pub mmcif_template: String,
}

/// Fully resolved settings of one CLI invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub repository: RepositoryConfig,
    pub output_root: PathBuf,
    pub renderer: PathBuf,
    pub thresholds: Thresholds,
    pub images: ImageSpec,
    pub volumetric: VolumetricParams,
    pub ligand_shell_radius: f64,
}

impl AppConfig {
    /// The core render configuration writing into `output_dir`.
    pub fn render_config(&self, output_dir: &Path) -> Result<RenderConfig> {
        RenderConfigBuilder::new()
            .output_dir(output_dir)
            .thresholds(self.thresholds)
            .images(self.images)
            .volumetric(self.volumetric.clone())
            .ligand_shell_radius(self.ligand_shell_radius)
            .build()
            .map_err(|e| CliError::Config(e.to_string()))
    }
}
