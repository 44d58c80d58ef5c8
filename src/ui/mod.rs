//! Terminal output for the `ckpt` binary
//!
//! Uses `cliclack` for styled output and prompts when attached to a
//! terminal, and falls back to plain bracketed lines in CI or when piped.
//!
//! ```rust,ignore
//! use ckpt::ui::{self, UiContext};
//!
//! let ctx = UiContext::detect().with_auto_yes(args.yes);
//! ui::intro(&ctx, "Verifying checkpoints");
//! ui::step_warn_hint(&ctx, "add_source.rs missing", "directory was copied by hand");
//! if ui::confirm(&ctx, "Remove 3 file(s)?", false)? {
//!     // ...
//! }
//! ui::outro_success(&ctx, "Done");
//! ```

mod context;
mod output;
mod prompts;
mod theme;

pub use context::UiContext;
pub use output::{
    intro, key_value, outro_error, outro_success, remark, section, step_error_detail, step_info,
    step_ok, step_warn, step_warn_hint,
};
pub use prompts::confirm;
pub use theme::{init_theme, CkptTheme};
