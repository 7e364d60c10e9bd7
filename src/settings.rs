//! Process-wide preferences and the persisted `settings` record.

use serde::{Deserialize, Serialize};

use crate::tab::TabId;

pub const SETTINGS_KEY: &str = "settings";

pub const DEFAULT_FONT_SIZE: u16 = 14;
pub const MIN_FONT_SIZE: u16 = 8;
pub const MAX_FONT_SIZE: u16 = 48;

/// The `settings` record: theme, font size, active tab and tab order.
///
/// Every field is optional on disk; missing ones take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub is_dark_theme: bool,
    pub font_size: u16,
    pub active_tab_id: Option<TabId>,
    pub tab_order: Vec<TabId>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            is_dark_theme: false,
            font_size: DEFAULT_FONT_SIZE,
            active_tab_id: None,
            tab_order: Vec::new(),
        }
    }
}

pub const fn clamp_font_size(size: u16) -> u16 {
    if size < MIN_FONT_SIZE {
        MIN_FONT_SIZE
    } else if size > MAX_FONT_SIZE {
        MAX_FONT_SIZE
    } else {
        size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_gives_defaults() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.font_size, DEFAULT_FONT_SIZE);
    }

    #[test]
    fn test_settings_json_shape() {
        let settings = Settings {
            is_dark_theme: true,
            font_size: 16,
            active_tab_id: Some(TabId::new(2)),
            tab_order: vec![TabId::new(2), TabId::new(1)],
        };
        let json = serde_json::to_string(&settings).unwrap();
        assert_eq!(
            json,
            r#"{"isDarkTheme":true,"fontSize":16,"activeTabId":"tab_2","tabOrder":["tab_2","tab_1"]}"#
        );
    }

    #[test]
    fn test_null_active_tab_is_accepted() {
        let settings: Settings =
            serde_json::from_str(r#"{"activeTabId":null,"tabOrder":[]}"#).unwrap();
        assert_eq!(settings.active_tab_id, None);
    }

    #[test]
    fn test_font_size_is_clamped() {
        assert_eq!(clamp_font_size(2), MIN_FONT_SIZE);
        assert_eq!(clamp_font_size(18), 18);
        assert_eq!(clamp_font_size(200), MAX_FONT_SIZE);
    }
}
