/**
 * file: external.rs
 * desc: Run external tools (aligner, read simulators). Any non-zero exit aborts the run, there are
 *       no retries since the tools are deterministic for identical inputs.
 */
use itertools::Itertools;
use std::process::Command;
use tracing::{error, info};

use shared::{Result, SimError};

/**
 * Render a command as a shell-like string for logs and errors.
 */
pub fn render(command: &Command) -> String {
    std::iter::once(command.get_program().to_string_lossy())
        .chain(command.get_args().map(|a| a.to_string_lossy()))
        .join(" ")
}

/**
 * Run the given command to completion, blocking until it exits.
 *
 * args
 *  tool:    tool name used in logs and errors
 *  command: the fully built command
 */
pub fn run(tool: &str, command: &mut Command) -> Result<()> {
    let rendered = render(command);

    info!("Running {}", tool);
    info!("  {}", rendered);

    let status = command.status().map_err(|e| {
        error!("Failed to launch {}: {}", tool, e);
        SimError::Io(e)
    })?;

    if !status.success() {
        return Err(SimError::ExternalTool {
            tool: tool.to_string(),
            command: rendered,
            status,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn test_render() {
        let mut command = Command::new("minimap2");
        command.args(["ref.fa", "reads.fq", "-x", "map-pb"]);

        assert!(render(&command) == "minimap2 ref.fa reads.fq -x map-pb");
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_tool_is_an_error() {
        assert!(run("true", &mut Command::new("true")).is_ok());
        assert!(matches!(
            run("false", &mut Command::new("false")),
            Err(SimError::ExternalTool { .. })
        ));
    }
}
