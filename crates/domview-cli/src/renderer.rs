use crate::error::{CliError, Result};
use std::path::Path;
use std::process::Command;
use tracing::{debug, info};

/// Runs `script` with the renderer in quiet batch mode from inside `workdir`.
pub fn run_script(program: &Path, script: &Path, workdir: &Path) -> Result<()> {
    info!(
        "Running renderer {} on {}",
        program.display(),
        script.display()
    );
    let output = Command::new(program)
        .arg("-cq")
        .arg(script)
        .current_dir(workdir)
        .output()
        .map_err(|e| CliError::Renderer {
            program: program.to_path_buf(),
            reason: e.to_string(),
        })?;

    for line in String::from_utf8_lossy(&output.stdout).lines() {
        debug!("renderer: {}", line);
    }
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CliError::Renderer {
            program: program.to_path_buf(),
            reason: format!("{} ({})", output.status, stderr.trim()),
        });
    }
    Ok(())
}
