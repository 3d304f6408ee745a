use crate::cli::RenderArgs;
use crate::config::{CliOverrides, PartialAppConfig};
use crate::error::{CliError, Result};
use crate::renderer;
use crate::source;
use crate::utils::parser;
use crate::utils::progress::CliProgressHandler;
use domview::core::ranges::{parse_ligand_spec, parse_range_spec};
use domview::engine::error::EngineError;
use domview::engine::progress::ProgressReporter;
use domview::engine::scripted::PymolScriptSession;
use domview::workflows::domain_images::{self, DomainRequest};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub fn run(args: RenderArgs) -> Result<()> {
    let group = parser::domain_group(&args.uid).map_err(|e| CliError::Argument(e.to_string()))?;
    let code =
        parser::validate_pdb_code(&args.pdb).map_err(|e| CliError::Argument(e.to_string()))?;
    let extras = parser::split_extra_args(&args.extra);

    let partial_config = PartialAppConfig::load(args.repository.config.as_deref())?;
    info!("Merging configuration from file and CLI arguments...");
    let config = partial_config.merge_with_cli(
        &CliOverrides::from_render_args(&args),
        &args.repository.set_values,
    )?;

    let workdir = prepare_workdir(&config.output_root, group, &args.uid)?;
    let source = source::locate(&config.repository, code)?;
    let structure_path = std::path::absolute(source.path())?;

    let range = parse_range_spec(&args.range);
    if range.is_empty() {
        warn!("Range '{}' has no usable segments.", args.range);
    }
    let ligands = extras
        .ligands
        .as_deref()
        .map(parse_ligand_spec)
        .unwrap_or_default();
    let partners = extras
        .partners
        .iter()
        .map(|p| parse_range_spec(p))
        .collect();

    let request = DomainRequest::new(&args.uid, structure_path, source.format(), code, range)
        .with_ligands(ligands)
        .with_assembly_partners(partners);
    let render_config = config.render_config(&workdir)?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
    let mut session = PymolScriptSession::new();

    println!("Rendering domain {} of {}...", args.uid, code);
    let result = domain_images::run(&mut session, &request, &render_config, &reporter)?;

    let script_path = workdir.join(format!("{}.pml", args.uid));
    session
        .write_script(&script_path)
        .map_err(EngineError::from)?;

    if args.script_only {
        println!("Renderer script written to {}", script_path.display());
        return Ok(());
    }

    renderer::run_script(&config.renderer, &script_path, &workdir)?;

    println!("Wrote {} image(s) to {}", result.images.len(), workdir.display());
    if let Some(assembly) = &result.assembly_file {
        println!("Assembly coordinates written to {}", assembly.display());
    }
    Ok(())
}

/// Creates `<root>/<group>/<uid>` if needed and returns it as an absolute path.
fn prepare_workdir(root: &Path, group: &str, uid: &str) -> Result<PathBuf> {
    let dir = root.join(group).join(uid);
    if !dir.exists() {
        warn!("Domain directory does not exist, creating {}", dir.display());
        fs::create_dir_all(&dir)?;
    }
    Ok(fs::canonicalize(&dir)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workdir_is_created_under_the_uid_group() {
        let root = tempfile::tempdir().unwrap();
        let dir = prepare_workdir(root.path(), "hhh", "e4hhhA1").unwrap();
        assert!(dir.is_dir());
        assert!(dir.is_absolute());
        assert!(dir.ends_with("hhh/e4hhhA1"));

        let again = prepare_workdir(root.path(), "hhh", "e4hhhA1").unwrap();
        assert_eq!(dir, again);
    }
}
