//! cliclack theme

use cliclack::ThemeState;
use console::Style;

/// Cyan while active, red on errors, green once submitted
#[derive(Debug, Clone, Default)]
pub struct CkptTheme;

impl cliclack::Theme for CkptTheme {
    fn bar_color(&self, state: &ThemeState) -> Style {
        match state {
            ThemeState::Active => Style::new().cyan(),
            ThemeState::Error(_) => Style::new().red(),
            ThemeState::Cancel => Style::new().dim(),
            ThemeState::Submit => Style::new().cyan().dim(),
        }
    }

    fn state_symbol_color(&self, state: &ThemeState) -> Style {
        match state {
            ThemeState::Active => Style::new().cyan(),
            ThemeState::Error(_) => Style::new().red(),
            ThemeState::Cancel => Style::new().dim(),
            ThemeState::Submit => Style::new().green(),
        }
    }
}

/// Install [`CkptTheme`] for every later prompt
pub fn init_theme() {
    cliclack::set_theme(CkptTheme);
}
