//! Decides whether decorated terminal output (colour, spinners) is wanted

use std::sync::OnceLock;

static QUIET: OnceLock<bool> = OnceLock::new();

/// Force quiet mode, e.g. from `--quiet`. Only the first call sticks.
pub fn set_quiet(quiet: bool) {
    let _ = QUIET.set(quiet || quiet_from_env());
}

/// `--quiet` or `MIGRATOR_QUIET=1` suppresses progress bars and colour
pub fn is_quiet() -> bool {
    *QUIET.get_or_init(quiet_from_env)
}

/// Decorate only an interactive, non-quiet stdout
pub fn is_interactive() -> bool {
    !is_quiet() && console::Term::stdout().is_term()
}

fn quiet_from_env() -> bool {
    std::env::var("MIGRATOR_QUIET")
        .map(|v| is_truthy(&v))
        .unwrap_or(false)
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim(), "1") || value.trim().eq_ignore_ascii_case("true")
}
