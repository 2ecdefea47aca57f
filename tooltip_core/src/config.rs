use crate::types::Rgba;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Overlay settings loaded from a flat TOML file.
///
/// Every field carries a default, so a partial (or empty) file is valid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub item_mods: ItemModsSettings,
    pub item_level: ItemLevelSettings,
    pub weapon_dps: WeaponDpsSettings,
    pub debug: DebugSettings,
}

impl Settings {
    /// Load settings from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = read_file_with_context(path)?;
        parse_toml_with_context(&content, path)
    }

    /// Load settings, falling back to defaults when the file does not exist
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Settings::default());
        }
        Self::load_from_file(path)
    }
}

/// Where the compact annotation column is anchored against the tooltip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FastModsAnchor {
    Top,
    #[default]
    Bottom,
}

/// How compact annotations are derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FastModsStrategy {
    /// Use resolved modifier tiers directly
    #[default]
    Structured,
    /// Parse the tooltip's extended description text
    TextScrape,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemModsSettings {
    pub enable_tooltip: bool,
    /// Sort mods so the best tiers are shown first instead of their natural order
    pub sort_mods_by_tier: bool,
    /// Sort by short name; applies after tier sorting when both are active
    pub sort_mods_by_name: bool,
    /// Shorthand names for good mods, e.g. "Phys%"
    pub show_short_names: bool,
    /// The mod's affix name, e.g. "Tyrannical"
    pub show_mod_names: bool,
    pub show_tags: bool,
    pub start_tags_on_same_line: bool,
    pub start_stats_on_same_line: bool,
    /// Print the first matching stat key below each mod
    pub show_stat_names: bool,
    pub enable_mod_count: bool,
    pub mod_count_size: f32,
    pub enable_fast_mods: bool,
    pub fast_mods_anchor: FastModsAnchor,
    pub fast_mods_strategy: FastModsStrategy,
    /// Held to draw the advanced tooltip over the native one
    pub override_tooltip_key: Option<String>,
    /// Invert the override hotkey: override unless held
    pub inverse_override: bool,
    pub dump_mod_names_key: Option<String>,
    pub dump_stat_names_key: Option<String>,
    pub background_color: Rgba,
    pub prefix_color: Rgba,
    pub suffix_color: Rgba,
    pub t1_color: Rgba,
    pub t2_color: Rgba,
    pub t3_color: Rgba,
    pub special_colors: SpecialColors,
}

impl Default for ItemModsSettings {
    fn default() -> Self {
        ItemModsSettings {
            enable_tooltip: true,
            sort_mods_by_tier: false,
            sort_mods_by_name: false,
            show_short_names: true,
            show_mod_names: true,
            show_tags: false,
            start_tags_on_same_line: false,
            start_stats_on_same_line: false,
            show_stat_names: false,
            enable_mod_count: true,
            mod_count_size: 1.0,
            enable_fast_mods: false,
            fast_mods_anchor: FastModsAnchor::Bottom,
            fast_mods_strategy: FastModsStrategy::Structured,
            override_tooltip_key: None,
            inverse_override: false,
            dump_mod_names_key: None,
            dump_stat_names_key: None,
            background_color: Rgba::rgba(0, 0, 0, 220),
            prefix_color: Rgba::rgb(178, 184, 255),
            suffix_color: Rgba::rgb(238, 255, 168),
            t1_color: Rgba::rgb(255, 0, 255),
            t2_color: Rgba::rgb(0, 255, 255),
            t3_color: Rgba::rgb(0, 255, 0),
            special_colors: SpecialColors::default(),
        }
    }
}

impl ItemModsSettings {
    /// Whether the advanced tooltip replaces the native one this frame
    pub fn override_tooltip_active(&self, override_key_held: bool) -> bool {
        override_key_held != self.inverse_override
    }

    /// Palette color for tiers 1 to 3
    pub fn tier_color(&self, tier: i32) -> Option<Rgba> {
        match tier {
            1 => Some(self.t1_color),
            2 => Some(self.t2_color),
            3 => Some(self.t3_color),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecialColors {
    pub crafted_color: Rgba,
}

impl Default for SpecialColors {
    fn default() -> Self {
        SpecialColors {
            crafted_color: Rgba::rgb(184, 218, 242),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemLevelSettings {
    pub enable: bool,
    pub text_color: Rgba,
    /// Tint of the backdrop image behind the item level
    pub background_color: Rgba,
    pub text_size: f32,
}

impl Default for ItemLevelSettings {
    fn default() -> Self {
        ItemLevelSettings {
            enable: true,
            text_color: Rgba::rgb(0, 255, 255),
            background_color: Rgba::rgba(255, 255, 255, 150),
            text_size: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponDpsSettings {
    pub enable_weapon_dps: bool,
    /// Compute DPS as if the weapon had at least 20% quality; over-quality still counts
    pub always_full_quality: bool,
    pub text_color: Rgba,
    pub background_color: Rgba,
    pub dmg_fire_color: Rgba,
    pub dmg_cold_color: Rgba,
    pub dmg_lightning_color: Rgba,
    pub dmg_chaos_color: Rgba,
    pub physical_damage_color: Rgba,
    pub elemental_damage_color: Rgba,
    pub dps_text_size: f32,
}

impl Default for WeaponDpsSettings {
    fn default() -> Self {
        WeaponDpsSettings {
            enable_weapon_dps: true,
            always_full_quality: false,
            text_color: Rgba::WHITE,
            background_color: Rgba::rgba(255, 255, 255, 150),
            dmg_fire_color: Rgba::rgb(255, 0, 0),
            dmg_cold_color: Rgba::rgb(0, 128, 255),
            dmg_lightning_color: Rgba::rgb(255, 255, 0),
            dmg_chaos_color: Rgba::rgb(144, 31, 208),
            physical_damage_color: Rgba::WHITE,
            elemental_damage_color: Rgba::rgb(255, 155, 255),
            dps_text_size: 1.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugSettings {
    /// Emit per-mod inspection lines to the debug log
    pub show_debug: bool,
}

// Helper functions for error context

pub(crate) fn read_dir_with_context(dir: &Path) -> Result<std::fs::ReadDir, ConfigError> {
    std::fs::read_dir(dir).map_err(|e| ConfigError::Io {
        error: e,
        path: Some(dir.to_path_buf()),
    })
}

pub(crate) fn read_file_with_context(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        error: e,
        path: Some(path.to_path_buf()),
    })
}

pub(crate) fn parse_toml_with_context<T: serde::de::DeserializeOwned>(
    content: &str,
    path: &Path,
) -> Result<T, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::Parse {
        error: e,
        path: path.to_path_buf(),
    })
}

#[derive(Debug)]
pub enum ConfigError {
    /// IO error with optional file path
    Io {
        error: std::io::Error,
        path: Option<PathBuf>,
    },
    /// TOML parse error with file path and location details
    Parse {
        error: toml::de::Error,
        path: PathBuf,
    },
    /// Two records in the data directory share a key
    DuplicateRecord { key: String, path: PathBuf },
}

impl ConfigError {
    /// Get the file path associated with this error, if any
    pub fn file_path(&self) -> Option<&Path> {
        match self {
            ConfigError::Io { path, .. } => path.as_deref(),
            ConfigError::Parse { path, .. } => Some(path),
            ConfigError::DuplicateRecord { path, .. } => Some(path),
        }
    }

    /// Get a user-friendly description of where the error occurred
    pub fn location_description(&self) -> String {
        match self {
            ConfigError::Io { path: Some(p), .. } => {
                format!("File: {}", p.display())
            }
            ConfigError::Io { path: None, .. } => "Unknown location".to_string(),
            ConfigError::Parse { error, path } => {
                let mut desc = format!("File: {}", path.display());
                if let Some(span) = error.span() {
                    desc.push_str(&format!("\nPosition: bytes {}..{}", span.start, span.end));
                }
                desc
            }
            ConfigError::DuplicateRecord { path, .. } => format!("File: {}", path.display()),
        }
    }

    /// Get the underlying error message
    pub fn error_message(&self) -> String {
        match self {
            ConfigError::Io { error, .. } => error.to_string(),
            ConfigError::Parse { error, .. } => error.message().to_string(),
            ConfigError::DuplicateRecord { key, .. } => format!("duplicate mod record '{}'", key),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io {
            error: e,
            path: None,
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io {
                error,
                path: Some(p),
            } => {
                write!(f, "IO error in '{}': {}", p.display(), error)
            }
            ConfigError::Io { error, path: None } => {
                write!(f, "IO error: {}", error)
            }
            ConfigError::Parse { error, path } => {
                write!(f, "Parse error in '{}': {}", path.display(), error)
            }
            ConfigError::DuplicateRecord { key, path } => {
                write!(f, "Duplicate mod record '{}' in '{}'", key, path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { error, .. } => Some(error),
            ConfigError::Parse { error, .. } => Some(error),
            ConfigError::DuplicateRecord { .. } => None,
        }
    }
}
