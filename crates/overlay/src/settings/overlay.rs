use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub const DEFAULT_PLACEHOLDER: &str = "Ask a question...";
pub const DEFAULT_GREETING: &str = "What can I help with?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl Serialize for ThemeMode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for ThemeMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(parse_theme_mode(&value))
    }
}

fn parse_theme_mode(value: &str) -> ThemeMode {
    if value.trim().eq_ignore_ascii_case("dark") {
        ThemeMode::Dark
    } else {
        ThemeMode::Light
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderStyle {
    #[default]
    Plain,
    /// Header with a drop shadow and a back affordance on the left.
    Elevated,
}

/// The two shipped looks of the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayVariant {
    #[default]
    Classic,
    Assistant,
}

/// Colour tokens handed to the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayTheme {
    pub mode: ThemeMode,
    pub background: String,
    pub accent: String,
    pub user_bubble: String,
    pub response_bubble: String,
    pub error_bubble: String,
}

/// Resolved overlay presentation and feature switches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayConfig {
    pub variant: OverlayVariant,
    pub title: String,
    pub placeholder: String,
    pub greeting: Option<String>,
    pub header_style: HeaderStyle,
    pub enable_suggestions: bool,
    pub enable_loading_ticker: bool,
    pub theme: OverlayTheme,
}

impl OverlayConfig {
    pub fn classic() -> Self {
        Self {
            variant: OverlayVariant::Classic,
            title: "Chat".to_string(),
            placeholder: "Type a message...".to_string(),
            greeting: None,
            header_style: HeaderStyle::Plain,
            enable_suggestions: true,
            enable_loading_ticker: true,
            theme: OverlayTheme {
                mode: ThemeMode::Light,
                background: "#f5f5f5".to_string(),
                accent: "#007aff".to_string(),
                user_bubble: "#007aff".to_string(),
                response_bubble: "#ffffff".to_string(),
                error_bubble: "#ffebee".to_string(),
            },
        }
    }

    pub fn assistant() -> Self {
        Self {
            variant: OverlayVariant::Assistant,
            title: "Kotak AI".to_string(),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            greeting: Some(DEFAULT_GREETING.to_string()),
            header_style: HeaderStyle::Elevated,
            enable_suggestions: false,
            enable_loading_ticker: true,
            theme: OverlayTheme {
                mode: ThemeMode::Light,
                background: "#fcfcfc".to_string(),
                accent: "#3b5bff".to_string(),
                user_bubble: "#3b5bff".to_string(),
                response_bubble: "#ffffff".to_string(),
                error_bubble: "#fdecea".to_string(),
            },
        }
    }

    pub fn for_variant(variant: OverlayVariant) -> Self {
        match variant {
            OverlayVariant::Classic => Self::classic(),
            OverlayVariant::Assistant => Self::assistant(),
        }
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self::classic()
    }
}

/// Persisted overlay choice: a variant plus optional per-field overrides.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OverlaySettings {
    #[serde(default)]
    pub variant: OverlayVariant,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub enable_suggestions: Option<bool>,
    #[serde(default)]
    pub enable_loading_ticker: Option<bool>,
    #[serde(default)]
    pub theme_mode: Option<ThemeMode>,
    #[serde(default)]
    pub accent: Option<String>,
}

impl OverlaySettings {
    pub fn resolve(&self) -> OverlayConfig {
        let mut config = OverlayConfig::for_variant(self.variant);

        if let Some(title) = non_blank(self.title.as_deref()) {
            config.title = title;
        }
        if let Some(placeholder) = non_blank(self.placeholder.as_deref()) {
            config.placeholder = placeholder;
        }
        if let Some(enabled) = self.enable_suggestions {
            config.enable_suggestions = enabled;
        }
        if let Some(enabled) = self.enable_loading_ticker {
            config.enable_loading_ticker = enabled;
        }
        if let Some(mode) = self.theme_mode {
            config.theme.mode = mode;
        }
        if let Some(accent) = non_blank(self.accent.as_deref()) {
            config.theme.user_bubble = accent.clone();
            config.theme.accent = accent;
        }

        config
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
