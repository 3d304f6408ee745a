use crate::cli::ColorsArgs;
use crate::config::{CliOverrides, PartialAppConfig};
use crate::error::{CliError, Result};
use crate::source;
use crate::utils::parser;
use domview::core::ranges::parse_range_spec;
use domview::engine::error::EngineError;
use domview::engine::rainbow::{self, ColorAssignment};
use domview::engine::scripted::PymolScriptSession;
use domview::engine::session::RenderSession;
use tracing::warn;

pub fn run(args: ColorsArgs) -> Result<()> {
    let code =
        parser::validate_pdb_code(&args.pdb).map_err(|e| CliError::Argument(e.to_string()))?;
    let config = PartialAppConfig::load(args.repository.config.as_deref())?.merge_with_cli(
        &CliOverrides::from_repository(&args.repository),
        &args.repository.set_values,
    )?;
    let source = source::locate(&config.repository, code)?;

    let mut session = PymolScriptSession::new();
    session
        .load_structure(source.path(), source.format(), code)
        .map_err(EngineError::from)?;

    let assignment = rainbow::compute(&session, &parse_range_spec(&args.range))?;
    if assignment.is_empty() {
        warn!("No residues with CA atoms in range '{}'.", args.range);
    }
    print!("{}", format_assignment(&assignment));
    Ok(())
}

/// One tab-separated `chain, residue, color` line per residue.
fn format_assignment(assignment: &ColorAssignment) -> String {
    assignment
        .entries()
        .iter()
        .map(|(key, rgb)| format!("{}\t{}\t{}\n", key.chain, key.number, rgb))
        .collect()
}
