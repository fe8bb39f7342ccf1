//! Deprecated application ids excluded from combined records

use std::collections::BTreeSet;

/// Applications whose storage is no longer in use.
pub const DEPRECATED_APP_IDS: &[&str] = &[
    "Activity",
    "Members",
    "WelcomeModal",
    "Wordpress",
    "github-dashboard",
    "laravel-installer",
    "OnboardingStatus",
    "About",
    "AceTabHistory",
    "Applications",
    "Apps",
    "Brackets",
    "Brackets",
    "Bugs",
    "Dashboard",
    "DefaultAppConfig",
    "DevTools",
    "Dock",
    "EnvironmentsScene",
    "Gameoflife",
    "Hartl",
    "Helper",
    "Home",
    "Installer",
    "Groups",
    "IntroductionTooltipStatus",
    "Julia",
    "Kodepad",
    "KodingApps",
    "Login",
    "KodingBook",
    "MainApp",
    "NewKoding",
    "PhoneGap",
    "Numbers",
    "Rubyonrailsinstaller",
    "Teamwork",
    "Topics",
    "Umlgenerator",
];

/// Immutable set of app ids to drop. Matching is exact and case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Denylist {
    app_ids: BTreeSet<String>,
}

impl Denylist {
    pub fn new<I, T>(app_ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            app_ids: app_ids.into_iter().map(Into::into).collect(),
        }
    }

    /// The built-in deprecated list
    pub fn builtin() -> Self {
        Self::new(DEPRECATED_APP_IDS.iter().copied())
    }

    /// The built-in list plus `extra`
    pub fn builtin_with<I, T>(extra: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut list = Self::builtin();
        list.app_ids.extend(extra.into_iter().map(Into::into));
        list
    }

    pub fn empty() -> Self {
        Self { app_ids: BTreeSet::new() }
    }

    pub fn contains(&self, app_id: &str) -> bool {
        self.app_ids.contains(app_id)
    }

    pub fn len(&self) -> usize {
        self.app_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.app_ids.is_empty()
    }
}

impl Default for Denylist {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_is_deduplicated() {
        let list = Denylist::builtin();
        assert_eq!(list.len(), DEPRECATED_APP_IDS.len() - 1);
        assert!(list.contains("Brackets"));
    }

    #[test]
    fn test_exact_case_sensitive_match() {
        let list = Denylist::builtin();
        assert!(list.contains("Dashboard"));
        assert!(!list.contains("dashboard"));
        assert!(!list.contains("Dashboard "));
        assert!(list.contains("github-dashboard"));
    }

    #[test]
    fn test_builtin_with_extra() {
        let list = Denylist::builtin_with(["Legacy", "Home"]);
        assert!(list.contains("Legacy"));
        assert_eq!(list.len(), Denylist::builtin().len() + 1);
    }
}
