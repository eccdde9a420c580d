pub mod overlay;
pub mod state;

pub use overlay::{
    HeaderStyle, OverlayConfig, OverlaySettings, OverlayTheme, OverlayVariant, ThemeMode,
};
pub use state::{ChatSettings, GeneratorSettings, HostSettings, SettingsError, SettingsStore};
