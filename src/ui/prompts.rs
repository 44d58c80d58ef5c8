//! Confirmation prompt with CI fallback

use super::context::UiContext;
use crate::error::{CheckpointError, CkptResult};

/// Ask a yes/no question
///
/// `--yes` approves without asking; a non-interactive session answers
/// `default` so destructive commands stay no-ops in CI.
pub fn confirm(ctx: &UiContext, message: &str, default: bool) -> CkptResult<bool> {
    if ctx.auto_yes() {
        println!("  {} (auto-approved)", message);
        return Ok(true);
    }

    if !ctx.is_interactive() {
        return Ok(default);
    }

    cliclack::confirm(message)
        .initial_value(default)
        .interact()
        .map_err(|e| CheckpointError::User(format!("Prompt failed: {}", e)))
}
