//! Terminal detection and environment color overrides

use std::io::IsTerminal;
use std::sync::Arc;

/// Decides whether an output is attached to a terminal.
///
/// Formatters call this at most once, the first time they render.
pub type TerminalCheck = Arc<dyn Fn() -> bool + Send + Sync>;

/// Probe standard error
pub fn stderr() -> TerminalCheck {
    Arc::new(|| std::io::stderr().is_terminal())
}

/// Probe standard output
pub fn stdout() -> TerminalCheck {
    Arc::new(|| std::io::stdout().is_terminal())
}

/// Always answer `is_terminal`; used for plain writers, pipes and tests.
pub fn fixed(is_terminal: bool) -> TerminalCheck {
    Arc::new(move || is_terminal)
}

/// Resolve the `CLICOLOR_FORCE` / `CLICOLOR` convention.
///
/// Any `CLICOLOR_FORCE` other than `"0"`, even an empty one, forces colors
/// on and takes precedence. `CLICOLOR_FORCE=0` or `CLICOLOR=0` forces them off. `None`
/// leaves the decision to terminal detection.
pub fn color_override(force: Option<&str>, clicolor: Option<&str>) -> Option<bool> {
    match force {
        Some(value) if value != "0" => return Some(true),
        Some("0") => return Some(false),
        _ => {}
    }
    match clicolor {
        Some("0") => Some(false),
        _ => None,
    }
}

/// [`color_override`] applied to the process environment
pub fn env_color_override() -> Option<bool> {
    let force = std::env::var("CLICOLOR_FORCE").ok();
    let clicolor = std::env::var("CLICOLOR").ok();
    color_override(force.as_deref(), clicolor.as_deref())
}
