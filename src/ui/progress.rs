use crate::ui::theme;
use crate::ui::Icons;
use indicatif::{HumanDuration, ProgressBar};
use owo_colors::OwoColorize;
use std::time::Duration;

/// Spinner with a running account count, hidden off-terminal or when quiet
pub struct RunProgress {
    pb: ProgressBar,
}

impl RunProgress {
    pub fn new(limit: usize) -> Self {
        let pb = if !crate::output::is_interactive() {
            ProgressBar::hidden()
        } else {
            let pb = ProgressBar::new_spinner();
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        };
        pb.set_message(format!("Migrating up to {} accounts", limit));
        Self { pb }
    }

    pub fn account(&self, nickname: &str) {
        self.pb.inc(1);
        self.pb.set_message(format!("{} accounts, last: {}", self.pb.position(), nickname));
    }

    /// Run an output call without the spinner overwriting it
    pub fn suspend<R>(&self, f: impl FnOnce() -> R) -> R {
        self.pb.suspend(f)
    }

    pub fn finish(&self, duration: Duration, visited: usize) {
        self.pb.finish_and_clear();
        println!(
            "{} {}  {} {}",
            Icons::CHECK.style(theme().success.clone()),
            format!("Complete in {}", HumanDuration(duration)).style(theme().success.clone()),
            Icons::PERSON.style(theme().info.clone()),
            visited
        );
    }
}
