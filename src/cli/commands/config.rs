//! Config command - show or initialize configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::error::CkptResult;
use crate::ui::{self, UiContext};

/// Execute the config command
pub fn execute(args: ConfigArgs, config: &Config, manager: &ConfigManager) -> CkptResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config)?,
        Some(ConfigAction::Path) => println!("{}", manager.path().display()),
        Some(ConfigAction::Init { force }) => init_config(manager, force)?,
    }
    Ok(())
}

/// Print the effective configuration, local overrides applied
fn show_config(config: &Config) -> CkptResult<()> {
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

fn init_config(manager: &ConfigManager, force: bool) -> CkptResult<()> {
    let ctx = UiContext::detect();
    let path = manager.path();

    if path.exists() && !force {
        ui::step_warn_hint(
            &ctx,
            &format!("Config already exists at {}", path.display()),
            "Use --force to overwrite",
        );
        return Ok(());
    }

    manager.save(&Config::default())?;
    ui::step_ok(&ctx, &format!("Configuration initialized at {}", path.display()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn init_writes_defaults_once() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(temp.path().join("ckpt").join("config.toml"));

        init_config(&manager, false).unwrap();
        let written = fs::read_to_string(manager.path()).unwrap();
        assert!(written.contains("[cache]"));

        fs::write(manager.path(), "[cache]\nserialization = \"json\"\n").unwrap();
        init_config(&manager, false).unwrap();
        assert!(fs::read_to_string(manager.path()).unwrap().contains("json"));

        init_config(&manager, true).unwrap();
        assert!(fs::read_to_string(manager.path()).unwrap().contains("binary"));
    }
}
