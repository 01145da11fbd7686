//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/studymap/studymap.toml`
//! 3. Local config: `--config <FILE>` or `./.studymap.toml`
//! 4. Environment variables: `STUDYMAP__<SECTION>__<KEY>`

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use kurbo::Size;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::layout::{LayoutConfig, TextMetrics, ViewportOptions};

pub const ENV_PREFIX: &str = "STUDYMAP";
pub const LOCAL_CONFIG_FILE: &str = ".studymap.toml";

/// Tree placement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayoutSettings {
    pub horizontal_spacing: f64,
    pub vertical_spacing: f64,
    /// Normalize labels and drop duplicate siblings before layout
    pub clean: bool,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        let defaults = LayoutConfig::default();
        Self {
            horizontal_spacing: defaults.horizontal_spacing,
            vertical_spacing: defaults.vertical_spacing,
            clean: true,
        }
    }
}

/// Label box approximation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TextSettings {
    /// Node box width, px
    pub max_width: f64,
    pub char_width: f64,
    pub line_height: f64,
    pub padding: f64,
}

impl Default for TextSettings {
    fn default() -> Self {
        let metrics = TextMetrics::default();
        Self {
            max_width: 140.0,
            char_width: metrics.char_width,
            line_height: metrics.line_height,
            padding: metrics.padding,
        }
    }
}

/// Initial view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewportSettings {
    pub width: f64,
    pub height: f64,
    pub min_scale: f64,
    pub zoom_step: f64,
    pub fit_ratio: f64,
    pub top_margin: f64,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        let options = ViewportOptions::default();
        Self {
            width: 960.0,
            height: 500.0,
            min_scale: options.min_scale,
            zoom_step: options.zoom_step,
            fit_ratio: options.fit_ratio,
            top_margin: options.top_margin,
        }
    }
}

/// SVG output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderSettings {
    /// Directory for rendered files when no explicit output path is given
    pub output_dir: PathBuf,
    /// Fixed caption; a random motivational quote is used when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote: Option<String>,
    pub show_quote: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            quote: None,
            show_quote: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawLayoutSettings {
    pub horizontal_spacing: Option<f64>,
    pub vertical_spacing: Option<f64>,
    pub clean: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawTextSettings {
    pub max_width: Option<f64>,
    pub char_width: Option<f64>,
    pub line_height: Option<f64>,
    pub padding: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawViewportSettings {
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub min_scale: Option<f64>,
    pub zoom_step: Option<f64>,
    pub fit_ratio: Option<f64>,
    pub top_margin: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawRenderSettings {
    pub output_dir: Option<PathBuf>,
    pub quote: Option<String>,
    pub show_quote: Option<bool>,
}

/// Raw settings for intermediate parsing.
///
/// Every field is optional so a file only overrides what it names.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub layout: RawLayoutSettings,
    pub text: RawTextSettings,
    pub viewport: RawViewportSettings,
    pub render: RawRenderSettings,
}

impl LayoutSettings {
    fn merge(&self, overlay: &RawLayoutSettings) -> Self {
        Self {
            horizontal_spacing: overlay.horizontal_spacing.unwrap_or(self.horizontal_spacing),
            vertical_spacing: overlay.vertical_spacing.unwrap_or(self.vertical_spacing),
            clean: overlay.clean.unwrap_or(self.clean),
        }
    }
}

impl TextSettings {
    fn merge(&self, overlay: &RawTextSettings) -> Self {
        Self {
            max_width: overlay.max_width.unwrap_or(self.max_width),
            char_width: overlay.char_width.unwrap_or(self.char_width),
            line_height: overlay.line_height.unwrap_or(self.line_height),
            padding: overlay.padding.unwrap_or(self.padding),
        }
    }
}

impl ViewportSettings {
    fn merge(&self, overlay: &RawViewportSettings) -> Self {
        Self {
            width: overlay.width.unwrap_or(self.width),
            height: overlay.height.unwrap_or(self.height),
            min_scale: overlay.min_scale.unwrap_or(self.min_scale),
            zoom_step: overlay.zoom_step.unwrap_or(self.zoom_step),
            fit_ratio: overlay.fit_ratio.unwrap_or(self.fit_ratio),
            top_margin: overlay.top_margin.unwrap_or(self.top_margin),
        }
    }
}

impl RenderSettings {
    fn merge(&self, overlay: &RawRenderSettings) -> Self {
        Self {
            output_dir: overlay
                .output_dir
                .clone()
                .unwrap_or_else(|| self.output_dir.clone()),
            quote: overlay.quote.clone().or_else(|| self.quote.clone()),
            show_quote: overlay.show_quote.unwrap_or(self.show_quote),
        }
    }
}

/// Unified configuration for studymap.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Settings {
    pub layout: LayoutSettings,
    pub text: TextSettings,
    pub viewport: ViewportSettings,
    pub render: RenderSettings,
}

/// Get the XDG config directory for studymap.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "studymap").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("studymap.toml"))
}

/// Get the path to the local config file in the working directory.
pub fn local_config_path() -> PathBuf {
    PathBuf::from(LOCAL_CONFIG_FILE)
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - Explicit local config; must exist when given.
    ///   Without it `./.studymap.toml` is used if present.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        let local = match config_file {
            Some(path) if !path.exists() => {
                return Err(ApplicationError::config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            Some(path) => Some(path.to_path_buf()),
            None => Some(local_config_path()).filter(|p| p.exists()),
        };
        Self::load_layers(global_config_path().as_deref(), local.as_deref())
    }

    /// Merge defaults, the given files (skipped when absent) and env overrides.
    pub fn load_layers(global: Option<&Path>, local: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        for path in [global, local].into_iter().flatten() {
            if path.exists() {
                debug!("config layer: {}", path.display());
                let raw = load_raw_settings(path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();
        current.validate()?;

        Ok(current)
    }

    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            layout: self.layout.merge(&overlay.layout),
            text: self.text.merge(&overlay.text),
            viewport: self.viewport.merge(&overlay.viewport),
            render: self.render.merge(&overlay.render),
        }
    }

    /// Apply STUDYMAP__* environment variables as explicit overrides.
    fn apply_env_overrides(settings: Self) -> Result<Self, ApplicationError> {
        // Use config crate just for env var parsing
        let config = Config::builder()
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        let raw = RawSettings {
            layout: RawLayoutSettings {
                horizontal_spacing: env_value(&config, "layout.horizontal_spacing")?,
                vertical_spacing: env_value(&config, "layout.vertical_spacing")?,
                clean: env_value(&config, "layout.clean")?,
            },
            text: RawTextSettings {
                max_width: env_value(&config, "text.max_width")?,
                char_width: env_value(&config, "text.char_width")?,
                line_height: env_value(&config, "text.line_height")?,
                padding: env_value(&config, "text.padding")?,
            },
            viewport: RawViewportSettings {
                width: env_value(&config, "viewport.width")?,
                height: env_value(&config, "viewport.height")?,
                min_scale: env_value(&config, "viewport.min_scale")?,
                zoom_step: env_value(&config, "viewport.zoom_step")?,
                fit_ratio: env_value(&config, "viewport.fit_ratio")?,
                top_margin: env_value(&config, "viewport.top_margin")?,
            },
            render: RawRenderSettings {
                output_dir: env_value::<String>(&config, "render.output_dir")?.map(PathBuf::from),
                quote: env_value(&config, "render.quote")?,
                show_quote: env_value(&config, "render.show_quote")?,
            },
        };

        Ok(settings.merge_with(&raw))
    }

    /// Expand `~` and `$VAR` in path-like fields.
    fn expand_paths(&mut self) {
        let raw = self.render.output_dir.to_string_lossy().to_string();
        if let Ok(expanded) = shellexpand::full(&raw) {
            self.render.output_dir = PathBuf::from(expanded.as_ref());
        }
    }

    /// Reject values the layout and rendering code cannot work with.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        self.layout_config()
            .validate()
            .map_err(|e| ApplicationError::config(e.to_string()))?;

        let positive = [
            ("text.max_width", self.text.max_width),
            ("text.char_width", self.text.char_width),
            ("text.line_height", self.text.line_height),
            ("viewport.width", self.viewport.width),
            ("viewport.height", self.viewport.height),
            ("viewport.min_scale", self.viewport.min_scale),
            ("viewport.zoom_step", self.viewport.zoom_step),
            ("viewport.fit_ratio", self.viewport.fit_ratio),
        ];
        if let Some((name, value)) = positive
            .iter()
            .find(|(_, v)| !(v.is_finite() && *v > 0.0))
        {
            return Err(ApplicationError::config(format!(
                "{name} must be positive, got {value}"
            )));
        }
        if !(self.text.padding.is_finite() && self.text.padding >= 0.0) {
            return Err(ApplicationError::config(format!(
                "text.padding must not be negative, got {}",
                self.text.padding
            )));
        }
        Ok(())
    }

    pub fn layout_config(&self) -> LayoutConfig {
        LayoutConfig {
            horizontal_spacing: self.layout.horizontal_spacing,
            vertical_spacing: self.layout.vertical_spacing,
        }
    }

    pub fn text_metrics(&self) -> TextMetrics {
        TextMetrics {
            char_width: self.text.char_width,
            line_height: self.text.line_height,
            padding: self.text.padding,
        }
    }

    pub fn viewport_options(&self) -> ViewportOptions {
        ViewportOptions {
            min_scale: self.viewport.min_scale,
            zoom_step: self.viewport.zoom_step,
            fit_ratio: self.viewport.fit_ratio,
            top_margin: self.viewport.top_margin,
        }
    }

    pub fn viewport_size(&self) -> Size {
        Size::new(self.viewport.width, self.viewport.height)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# studymap configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/studymap/studymap.toml
#   Local:  ./.studymap.toml or --config <FILE>
#   Env:    STUDYMAP__<SECTION>__<KEY>, e.g. STUDYMAP__LAYOUT__HORIZONTAL_SPACING=200

[layout]
# Minimum distance between nodes at the same depth, px
# horizontal_spacing = 170.0
# Distance between depth levels, px
# vertical_spacing = 120.0
# Trim labels and drop empty or duplicate siblings before layout
# clean = true

[text]
# Node box width, px
# max_width = 140.0
# char_width = 7.0
# line_height = 14.0
# padding = 10.0

[viewport]
# width = 960.0
# height = 500.0
# min_scale = 0.1
# zoom_step = 1.1
# fit_ratio = 0.9
# top_margin = 50.0

[render]
# output_dir = "."
# quote = "Well done is better than well said."
# show_quote = false
"#
        .to_string()
    }
}

/// Read one optional env override; a present but unparsable value is an error.
fn env_value<T: serde::de::DeserializeOwned>(config: &Config, key: &str) -> Result<Option<T>, ApplicationError> {
    match config.get::<T>(key) {
        Ok(value) => Ok(Some(value)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(ApplicationError::config(format!("{key}: {e}"))),
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn given_no_config_when_loading_then_uses_defaults() {
        let settings = Settings::load_layers(None, None).expect("load defaults");
        assert_eq!(settings.layout.horizontal_spacing, 170.0);
        assert_eq!(settings.layout.vertical_spacing, 120.0);
        assert!(settings.layout.clean);
        assert_eq!(settings.text.max_width, 140.0);
        assert_eq!(settings.viewport.width, 960.0);
        assert!(!settings.render.show_quote);
    }

    #[test]
    fn given_global_and_local_when_loading_then_local_wins_per_field() {
        let dir = TempDir::new().unwrap();
        let global = write(
            &dir,
            "global.toml",
            "[layout]\nhorizontal_spacing = 200.0\nvertical_spacing = 90.0\n",
        );
        let local = write(&dir, "local.toml", "[layout]\nhorizontal_spacing = 250.0\n");

        let settings = Settings::load_layers(Some(&global), Some(&local)).unwrap();

        assert_eq!(settings.layout.horizontal_spacing, 250.0);
        assert_eq!(settings.layout.vertical_spacing, 90.0);
        assert_eq!(settings.text, TextSettings::default());
    }

    #[test]
    fn given_missing_explicit_config_when_loading_then_config_error() {
        let result = Settings::load(Some(Path::new("/nonexistent/studymap.toml")));
        assert!(matches!(result, Err(ApplicationError::Config { .. })));
    }

    #[test]
    fn given_invalid_toml_when_loading_then_config_error() {
        let dir = TempDir::new().unwrap();
        let local = write(&dir, "bad.toml", "[layout\n");
        let result = Settings::load_layers(None, Some(&local));
        assert!(matches!(result, Err(ApplicationError::Config { .. })));
    }

    #[test]
    fn given_zero_spacing_when_validating_then_rejected() {
        let mut settings = Settings::default();
        settings.layout.vertical_spacing = 0.0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.text.char_width = -7.0;
        let err = settings.validate().unwrap_err().to_string();
        assert!(err.contains("text.char_width"), "{err}");
    }

    #[test]
    fn given_tilde_in_output_dir_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings::default();
        settings.render.output_dir = PathBuf::from("~/maps");

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        assert!(settings.render.output_dir.starts_with(&home));
    }

    #[test]
    fn given_settings_when_serialized_then_template_round_trips() {
        let toml_text = Settings::default().to_toml().unwrap();
        assert!(toml_text.contains("[layout]"));
        let parsed: Settings = toml::from_str(&toml_text).unwrap();
        assert_eq!(parsed, Settings::default());

        let template: Settings = toml::from_str(&Settings::template()).unwrap();
        assert_eq!(template, Settings::default());
    }

    #[test]
    fn given_settings_when_converted_then_engine_types_match() {
        let settings = Settings::default();
        assert_eq!(settings.layout_config(), LayoutConfig::default());
        assert_eq!(settings.text_metrics(), TextMetrics::default());
        assert_eq!(settings.viewport_options(), ViewportOptions::default());
        assert_eq!(settings.viewport_size(), Size::new(960.0, 500.0));
    }
}
