//! Screen state machine.
//!
//! The whole UI position is one [`Screen`] value. Every transition is a
//! method on [`ViewState`] that either moves to the next screen or returns
//! [`Error::InvalidTransition`] and leaves the state as it was.

use crate::{Error, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    Diary,
    Search,
    Meals,
    Fitness,
}

impl Tab {
    pub fn label(self) -> &'static str {
        match self {
            Tab::Diary => "diary",
            Tab::Search => "search",
            Tab::Meals => "meals",
            Tab::Fitness => "fitness",
        }
    }
}

impl FromStr for Tab {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "diary" => Ok(Tab::Diary),
            "search" => Ok(Tab::Search),
            "meals" | "meal-plans" | "meal_plans" => Ok(Tab::Meals),
            "fitness" => Ok(Tab::Fitness),
            _ => Err(Error::NotFound {
                kind: "tab",
                name: s.to_string(),
            }),
        }
    }
}

/// Modal drawn over the main tabs
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Overlay {
    Scanner,
    Profile,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum Screen {
    Loading { progress: u32 },
    Login,
    Signup,
    Main { tab: Tab, overlay: Option<Overlay> },
}

impl Screen {
    fn name(&self) -> &'static str {
        match self {
            Screen::Loading { .. } => "loading",
            Screen::Login => "login",
            Screen::Signup => "signup",
            Screen::Main { .. } => "main",
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fields of the sign-up form
#[derive(Clone, Debug, Default)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignupForm {
    pub fn validate(&self) -> Result<()> {
        let fields = [
            &self.name,
            &self.email,
            &self.password,
            &self.confirm_password,
        ];
        if fields.iter().any(|f| f.trim().is_empty()) {
            return Err(Error::Validation("Please fill in all fields".into()));
        }
        if self.password != self.confirm_password {
            return Err(Error::Validation("Passwords do not match".into()));
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct ViewState {
    screen: Screen,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewState {
    /// Starts on the loading screen at 0%
    pub fn new() -> Self {
        Self {
            screen: Screen::Loading { progress: 0 },
        }
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn is_main(&self) -> bool {
        matches!(self.screen, Screen::Main { .. })
    }

    pub fn tab(&self) -> Option<Tab> {
        match self.screen {
            Screen::Main { tab, .. } => Some(tab),
            _ => None,
        }
    }

    fn invalid(&self, action: &'static str) -> Error {
        Error::InvalidTransition {
            from: self.screen.name().to_string(),
            action,
        }
    }

    /// Bump the loading bar; returns true once it is full
    pub fn loading_step(&mut self, increment: u32) -> Result<bool> {
        match &mut self.screen {
            Screen::Loading { progress } => {
                *progress = progress.saturating_add(increment).min(100);
                Ok(*progress >= 100)
            }
            _ => Err(self.invalid("advance loading")),
        }
    }

    pub fn finish_loading(&mut self) -> Result<()> {
        match self.screen {
            Screen::Loading { .. } => {
                self.screen = Screen::Login;
                Ok(())
            }
            _ => Err(self.invalid("finish loading")),
        }
    }

    pub fn show_signup(&mut self) -> Result<()> {
        match self.screen {
            Screen::Login => {
                self.screen = Screen::Signup;
                Ok(())
            }
            _ => Err(self.invalid("show signup")),
        }
    }

    pub fn show_login(&mut self) -> Result<()> {
        match self.screen {
            Screen::Signup => {
                self.screen = Screen::Login;
                Ok(())
            }
            _ => Err(self.invalid("show login")),
        }
    }

    pub fn login(&mut self) -> Result<()> {
        match self.screen {
            Screen::Login => {
                self.screen = main_screen();
                Ok(())
            }
            _ => Err(self.invalid("log in")),
        }
    }

    /// Sign up; form errors are reported before the screen is checked
    pub fn signup(&mut self, form: &SignupForm) -> Result<()> {
        if self.screen != Screen::Signup {
            return Err(self.invalid("sign up"));
        }
        form.validate()?;
        self.screen = main_screen();
        Ok(())
    }

    /// Select a bottom-bar entry by name
    ///
    /// `scan` is not a tab: it opens the scanner over the current tab.
    pub fn select_tab(&mut self, name: &str) -> Result<()> {
        if !self.is_main() {
            return Err(self.invalid("select a tab"));
        }
        if name.trim().eq_ignore_ascii_case("scan") {
            return self.open_overlay(Overlay::Scanner);
        }
        let tab: Tab = name.parse()?;
        self.screen = Screen::Main { tab, overlay: None };
        Ok(())
    }

    pub fn open_scanner(&mut self) -> Result<()> {
        self.open_overlay(Overlay::Scanner)
    }

    pub fn open_profile(&mut self) -> Result<()> {
        self.open_overlay(Overlay::Profile)
    }

    fn open_overlay(&mut self, which: Overlay) -> Result<()> {
        match &mut self.screen {
            Screen::Main { overlay, .. } => {
                *overlay = Some(which);
                Ok(())
            }
            _ => Err(self.invalid("open an overlay")),
        }
    }

    pub fn close_overlay(&mut self) -> Result<()> {
        match &mut self.screen {
            Screen::Main { overlay, .. } => {
                *overlay = None;
                Ok(())
            }
            _ => Err(self.invalid("close an overlay")),
        }
    }

    pub fn sign_out(&mut self) -> Result<()> {
        match self.screen {
            Screen::Main { .. } => {
                self.screen = Screen::Login;
                Ok(())
            }
            _ => Err(self.invalid("sign out")),
        }
    }
}

fn main_screen() -> Screen {
    Screen::Main {
        tab: Tab::Diary,
        overlay: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at_main() -> ViewState {
        let mut view = ViewState::new();
        view.finish_loading().unwrap();
        view.login().unwrap();
        view
    }

    fn form(password: &str, confirm: &str) -> SignupForm {
        SignupForm {
            name: "Amina".into(),
            email: "amina@example.com".into(),
            password: password.into(),
            confirm_password: confirm.into(),
        }
    }

    #[test]
    fn test_loading_fills_then_moves_to_login() {
        let mut view = ViewState::new();
        let mut steps = 0;
        while !view.loading_step(8).unwrap() {
            steps += 1;
        }
        // 12 steps of 8 reach 96, the 13th fills the bar
        assert_eq!(steps, 12);
        assert_eq!(view.screen(), &Screen::Loading { progress: 100 });

        view.finish_loading().unwrap();
        assert_eq!(view.screen(), &Screen::Login);
        assert!(view.loading_step(8).is_err());
    }

    #[test]
    fn test_login_signup_round_trip() {
        let mut view = ViewState::new();
        view.finish_loading().unwrap();
        view.show_signup().unwrap();
        assert_eq!(view.screen(), &Screen::Signup);
        view.show_login().unwrap();
        assert_eq!(view.screen(), &Screen::Login);
        view.login().unwrap();
        assert_eq!(view.tab(), Some(Tab::Diary));
    }

    #[test]
    fn test_signup_validation() {
        let mut view = ViewState::new();
        view.finish_loading().unwrap();
        view.show_signup().unwrap();

        let err = view.signup(&form("secret", "secrat")).unwrap_err();
        assert_eq!(err.to_string(), "Passwords do not match");
        assert_eq!(view.screen(), &Screen::Signup);

        let mut missing = form("secret", "secret");
        missing.email = "  ".into();
        assert!(matches!(view.signup(&missing), Err(Error::Validation(_))));

        view.signup(&form("secret", "secret")).unwrap();
        assert_eq!(
            view.screen(),
            &Screen::Main {
                tab: Tab::Diary,
                overlay: None
            }
        );
    }

    #[test]
    fn test_scan_opens_overlay_over_current_tab() {
        let mut view = at_main();
        view.select_tab("fitness").unwrap();
        view.select_tab("scan").unwrap();
        assert_eq!(
            view.screen(),
            &Screen::Main {
                tab: Tab::Fitness,
                overlay: Some(Overlay::Scanner)
            }
        );

        // picking a tab dismisses the overlay
        view.select_tab("Meals").unwrap();
        assert_eq!(
            view.screen(),
            &Screen::Main {
                tab: Tab::Meals,
                overlay: None
            }
        );
    }

    #[test]
    fn test_profile_overlay_and_close() {
        let mut view = at_main();
        view.open_profile().unwrap();
        assert!(matches!(
            view.screen(),
            Screen::Main {
                overlay: Some(Overlay::Profile),
                ..
            }
        ));
        view.close_overlay().unwrap();
        assert!(matches!(view.screen(), Screen::Main { overlay: None, .. }));
    }

    #[test]
    fn test_invalid_transitions_leave_state_unchanged() {
        let mut view = ViewState::new();
        let err = view.login().unwrap_err();
        assert_eq!(err.to_string(), "Cannot log in from loading screen");
        assert_eq!(view.screen(), &Screen::Loading { progress: 0 });

        let mut view = at_main();
        assert!(view.show_signup().is_err());
        assert!(view.finish_loading().is_err());
        assert!(matches!(
            view.select_tab("settings"),
            Err(Error::NotFound { kind: "tab", .. })
        ));
        assert_eq!(view.tab(), Some(Tab::Diary));

        view.sign_out().unwrap();
        assert_eq!(view.screen(), &Screen::Login);
        assert!(view.open_profile().is_err());
        assert!(view.sign_out().is_err());
    }
}
