use crate::config::models::RepositoryConfig;
use crate::error::{CliError, Result};
use domview::core::io::format::{self, StructureFormat};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// A structure file ready to be loaded.
///
/// Compressed mmCIF files are decompressed into a temporary file that lives as long as
/// this value.
#[derive(Debug)]
pub struct StructureSource {
    path: PathBuf,
    format: StructureFormat,
    _temp: Option<NamedTempFile>,
}

impl StructureSource {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> StructureFormat {
        self.format
    }
}

/// Fills `{mid}` (second and third characters of the code) and `{id}` into `template`.
pub fn expand_template(template: &str, code: &str) -> PathBuf {
    let mid = code.get(1..3).unwrap_or_default();
    PathBuf::from(template.replace("{mid}", mid).replace("{id}", code))
}

/// Finds the structure `code` in the local repository, legacy PDB first, then mmCIF.
pub fn locate(repository: &RepositoryConfig, code: &str) -> Result<StructureSource> {
    let pdb_path = expand_template(&repository.pdb_template, code);
    if pdb_path.is_file() {
        info!("Using PDB file {}", pdb_path.display());
        return Ok(StructureSource {
            format: StructureFormat::from_path(&pdb_path).unwrap_or(StructureFormat::Pdb),
            path: pdb_path,
            _temp: None,
        });
    }
    debug!("No PDB file at {}; trying mmCIF.", pdb_path.display());

    let cif_path = expand_template(&repository.mmcif_template, code);
    if !cif_path.is_file() {
        return Err(CliError::StructureNotFound {
            code: code.to_string(),
            tried: vec![pdb_path, cif_path],
        });
    }
    info!("Using mmCIF file {}", cif_path.display());
    if !format::is_gzip_path(&cif_path) {
        return Ok(StructureSource {
            path: cif_path,
            format: StructureFormat::Mmcif,
            _temp: None,
        });
    }

    let mut temp = tempfile::Builder::new()
        .prefix("tmpcif")
        .suffix(".cif")
        .tempfile()?;
    let bytes = format::decompress_into(&cif_path, temp.as_file_mut())?;
    debug!(
        "Decompressed {} bytes of mmCIF into {}",
        bytes,
        temp.path().display()
    );
    Ok(StructureSource {
        path: temp.path().to_path_buf(),
        format: StructureFormat::Mmcif,
        _temp: Some(temp),
    })
}
