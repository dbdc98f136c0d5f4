use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Geometry constants for the layout and connector passes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Height of every person box.
    pub box_height: f32,
    /// Horizontal gap between partner boxes and between sibling subtrees.
    pub spacing: f32,
    /// Vertical distance from a parent box top to its children's box tops.
    pub gen_space: f32,
    /// Horizontal text padding inside a box, applied by font metrics.
    pub label_padding: f32,
    /// Smallest box width metrics will report.
    pub min_box_width: f32,
    /// Whitespace around the whole diagram.
    pub margin: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            box_height: 34.0,
            spacing: 20.0,
            gen_space: 90.0,
            label_padding: 10.0,
            min_box_width: 60.0,
            margin: 24.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    theme: Option<String>,
    #[serde(rename = "themeVariables")]
    theme_variables: Option<ThemeOverrides>,
    layout: Option<LayoutOverrides>,
}

#[derive(Debug, Default, Deserialize)]
struct ThemeOverrides {
    #[serde(rename = "fontFamily")]
    font_family: Option<String>,
    #[serde(rename = "fontSize")]
    font_size: Option<f32>,
    #[serde(rename = "boxFill")]
    box_fill: Option<String>,
    #[serde(rename = "boxBorder")]
    box_border: Option<String>,
    #[serde(rename = "textColor")]
    text_color: Option<String>,
    #[serde(rename = "lineColor")]
    line_color: Option<String>,
    background: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LayoutOverrides {
    #[serde(rename = "boxHeight")]
    box_height: Option<f32>,
    spacing: Option<f32>,
    #[serde(rename = "genSpace")]
    gen_space: Option<f32>,
    #[serde(rename = "labelPadding")]
    label_padding: Option<f32>,
    #[serde(rename = "minBoxWidth")]
    min_box_width: Option<f32>,
    margin: Option<f32>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    let parsed: ConfigFile = serde_json::from_str(&contents)?;
    apply_config_file(&mut config, parsed);
    Ok(config)
}

fn apply_config_file(config: &mut Config, parsed: ConfigFile) {
    if let Some(theme_name) = parsed.theme.as_deref() {
        if theme_name == "modern" {
            config.theme = Theme::modern();
        } else if theme_name == "classic" || theme_name == "default" {
            config.theme = Theme::classic();
        }
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.box_fill {
            config.theme.box_fill = v;
        }
        if let Some(v) = vars.box_border {
            config.theme.box_border = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.line_color {
            config.theme.line_color = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
    }

    if let Some(layout) = parsed.layout {
        if let Some(v) = layout.box_height {
            config.layout.box_height = v;
        }
        if let Some(v) = layout.spacing {
            config.layout.spacing = v;
        }
        if let Some(v) = layout.gen_space {
            config.layout.gen_space = v;
        }
        if let Some(v) = layout.label_padding {
            config.layout.label_padding = v;
        }
        if let Some(v) = layout.min_box_width {
            config.layout.min_box_width = v;
        }
        if let Some(v) = layout.margin {
            config.layout.margin = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_yields_defaults() {
        let config = load_config(None).expect("defaults failed");
        assert_eq!(config.layout.spacing, 20.0);
        assert_eq!(config.theme.font_size, 14.0);
    }

    #[test]
    fn overrides_apply_on_top_of_theme() {
        let parsed: ConfigFile = serde_json::from_str(
            r##"{
                "theme": "modern",
                "themeVariables": {"fontSize": 18.0, "lineColor": "#000"},
                "layout": {"spacing": 32.0, "genSpace": 120.0}
            }"##,
        )
        .expect("parse failed");
        let mut config = Config::default();
        apply_config_file(&mut config, parsed);
        assert_eq!(config.theme.font_size, 18.0);
        assert_eq!(config.theme.line_color, "#000");
        assert_eq!(config.theme.box_fill, Theme::modern().box_fill);
        assert_eq!(config.layout.spacing, 32.0);
        assert_eq!(config.layout.gen_space, 120.0);
    }
}
