//! Color Theme
//!
//! Light/dark choice persisted in local storage. Without a saved choice
//! the system color scheme decides.

use board_core::KeyValueStore;

pub const THEME_KEY: &str = "theme";
const DARK_CLASS: &str = "dark";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Button text; names the theme a click switches to
    pub fn label(self) -> &'static str {
        match self.toggle() {
            Theme::Dark => "🌙 Dark",
            Theme::Light => "☀️ Light",
        }
    }
}

fn system_prefers_dark() -> bool {
    web_sys::window()
        .and_then(|w| w.match_media("(prefers-color-scheme: dark)").ok().flatten())
        .map(|mq| mq.matches())
        .unwrap_or(false)
}

/// Saved theme, else the system preference
pub fn load(store: &dyn KeyValueStore) -> Theme {
    store
        .get(THEME_KEY)
        .and_then(|v| Theme::parse(&v))
        .unwrap_or_else(|| if system_prefers_dark() { Theme::Dark } else { Theme::Light })
}

pub fn save(store: &dyn KeyValueStore, theme: Theme) {
    store.set(THEME_KEY, theme.as_str());
}

/// Toggle the `dark` class on the document root
pub fn apply(theme: Theme) {
    let Some(root) = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.document_element())
    else {
        return;
    };
    if let Err(e) = root.class_list().toggle_with_force(DARK_CLASS, theme == Theme::Dark) {
        log::warn!("[THEME] failed to apply {}: {:?}", theme.as_str(), e);
    }
}
