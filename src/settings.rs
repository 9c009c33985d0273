use ratatui::style::{Color, Style};
use serde::{de::Deserializer, Deserialize, Serialize};
use std::{collections::HashMap, path::PathBuf, str::FromStr};

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub global: GlobalSettings,
    #[serde(default)]
    pub keybindings: HashMap<String, String>,
    #[serde(default)]
    pub colors: ColorSettings,
}

/// Shape of a settings file on disk. Every group is optional; what is there
/// replaces or extends the corresponding group of the defaults.
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct SettingsFromYaml {
    #[serde(default)]
    pub global: Option<GlobalSettings>,
    #[serde(default)]
    pub keybindings: Option<HashMap<String, String>>,
    #[serde(default)]
    pub colors: Option<ColorSettings>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GlobalSettings {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_min_column_width")]
    pub min_column_width: usize,
    #[serde(default = "default_max_column_width")]
    pub max_column_width: usize,
}

fn default_poll_interval_ms() -> u64 {
    250
}
fn default_min_column_width() -> usize {
    4
}
fn default_max_column_width() -> usize {
    48
}

impl Default for GlobalSettings {
    fn default() -> GlobalSettings {
        GlobalSettings {
            poll_interval_ms: default_poll_interval_ms(),
            min_column_width: default_min_column_width(),
            max_column_width: default_max_column_width(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct ColorSettings {
    #[serde(deserialize_with = "parse_style", serialize_with = "serialize_style")]
    pub normal: Style,
    #[serde(deserialize_with = "parse_style", serialize_with = "serialize_style")]
    pub selected: Style,
    #[serde(deserialize_with = "parse_style", serialize_with = "serialize_style")]
    pub unparsable: Style,
    pub table: TableColorSettings,
    pub details: DetailsColorSettings,
    pub footer: FooterColorSettings,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct TableColorSettings {
    #[serde(deserialize_with = "parse_style", serialize_with = "serialize_style")]
    pub header: Style,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct DetailsColorSettings {
    #[serde(deserialize_with = "parse_style", serialize_with = "serialize_style")]
    pub title: Style,
    #[serde(deserialize_with = "parse_style", serialize_with = "serialize_style")]
    pub key: Style,
    #[serde(deserialize_with = "parse_style", serialize_with = "serialize_style")]
    pub value: Style,
    #[serde(deserialize_with = "parse_style", serialize_with = "serialize_style")]
    pub border: Style,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct FooterColorSettings {
    #[serde(deserialize_with = "parse_style", serialize_with = "serialize_style")]
    pub normal: Style,
    #[serde(deserialize_with = "parse_style", serialize_with = "serialize_style")]
    pub input: Style,
    #[serde(deserialize_with = "parse_style", serialize_with = "serialize_style")]
    pub warning: Style,
}

fn parse_style<'de, D>(deserializer: D) -> Result<Style, D::Error>
where
    D: Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    string_to_style(&s).map_err(serde::de::Error::custom)
}

/// "fg" or "fg bg", color names as ratatui knows them.
pub fn string_to_style(s: &str) -> Result<Style, String> {
    let mut parts = s.split_whitespace();
    let first = parts.next().ok_or_else(|| "Missing first color")?;
    let first_color = Color::from_str(first).map_err(|_| "Invalid color")?;
    let style = Style::new().fg(first_color);

    let style = match parts.next() {
        Some(second) => {
            let second_color = Color::from_str(second).map_err(|_| "Invalid color")?;
            style.bg(second_color)
        }
        None => style,
    };

    Ok(style)
}

fn serialize_style<S>(style: &Style, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let mut s = String::new();
    if let Some(fg) = style.fg {
        s.push_str(&fg.to_string());
        if let Some(bg) = style.bg {
            s.push(' ');
            s.push_str(&bg.to_string());
        }
    }
    serializer.serialize_str(&s)
}

impl Settings {
    pub fn new() -> Result<Settings, Box<dyn std::error::Error>> {
        let mut settings = Settings::default();

        settings.read_from_string(Self::default_settings_yaml_data())?;

        // Then ~/.config/tabwatch/settings.yaml, when it exists.
        if let Some(filename) = Self::local_settings_filename() {
            if filename.exists() {
                settings
                    .read_from_yaml(filename.to_str().unwrap_or("unknown"))
                    .map_err(|e| {
                        format!("Error reading settings from {}: {}", filename.display(), e)
                    })?;
            }
        }

        Ok(settings)
    }

    pub fn default_settings_yaml_data() -> &'static str {
        include_str!("../settings.yaml")
    }

    pub fn local_settings_filename() -> Option<PathBuf> {
        let xdg = xdg::BaseDirectories::with_prefix("tabwatch");

        if xdg.is_err() {
            return None;
        }

        xdg.unwrap().find_config_file("settings.yaml")
    }

    pub fn read_from_yaml(&mut self, filename: &str) -> Result<(), Box<dyn std::error::Error>> {
        let file = std::fs::File::open(filename)?;
        let reader = std::io::BufReader::new(file);
        let settings: SettingsFromYaml = serde_yaml::from_reader(reader)?;

        self.merge_with(settings);

        Ok(())
    }

    pub fn read_from_string(&mut self, s: &str) -> Result<(), Box<dyn std::error::Error>> {
        let settings: SettingsFromYaml = serde_yaml::from_str(s)?;
        self.merge_with(settings);

        Ok(())
    }

    pub fn merge_with(&mut self, other: SettingsFromYaml) {
        if let Some(global) = other.global {
            self.global = global;
        }

        // keybindings merge key by key, everything else group by group
        if let Some(keybindings) = other.keybindings {
            self.keybindings.extend(keybindings);
        }

        if let Some(colors) = other.colors {
            self.colors = colors;
        }
    }
}
