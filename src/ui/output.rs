use crate::migrator::AccountOutcome;
use crate::ui::{theme, Icons};
use owo_colors::OwoColorize;

pub fn header(text: &str) {
    println!("{} {}", Icons::ROCKET, text.style(theme().header.clone()));
}

pub fn success(label: &str) {
    println!("{} {}", Icons::CHECK, label.style(theme().success.clone()));
}

pub fn error(label: &str) {
    eprintln!("{} {}", Icons::CROSS, label.style(theme().error.clone()));
}

pub fn warn(label: &str) {
    eprintln!("{} {}", Icons::WARN, label.style(theme().warn.clone()));
}

pub fn info(label: &str, value: &str) {
    println!(
        "{} {}: {}",
        Icons::INFO.style(theme().info.clone()),
        label.style(theme().dim.clone()),
        value
    );
}

pub fn section(title: &str) {
    println!();
    println!("━{}━", title.style(theme().header.clone()));
}

pub fn timing(elapsed: &str) {
    println!("{} {}", Icons::CLOCK.style(theme().dim.clone()), elapsed);
}

/// One line per account, used in verbose runs
pub fn outcome(nickname: &str, outcome: AccountOutcome) {
    match outcome {
        AccountOutcome::Created { apps } => println!(
            "{} {} {}",
            Icons::NEW.style(theme().success.clone()),
            nickname,
            format!("created ({} apps)", apps).style(theme().dim.clone())
        ),
        AccountOutcome::Updated { apps } => println!(
            "{} {} {}",
            Icons::MOD.style(theme().warn.clone()),
            nickname,
            format!("updated ({} apps)", apps).style(theme().dim.clone())
        ),
        skipped => println!(
            "{} {} {}",
            Icons::SKIP.style(theme().dim.clone()),
            nickname,
            format!("{:?}", skipped).style(theme().dim.clone())
        ),
    }
}
