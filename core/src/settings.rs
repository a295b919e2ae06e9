use std::{
    collections::BTreeMap,
    fmt, fs, io,
    path::{Path, PathBuf},
};

use serde_json::Value;
use tracing::{debug, warn};

pub mod parameters {
    pub const WINDOW_TITLE: &str = "window.title";
    pub const WINDOW_WIDTH: &str = "window.width";
    pub const WINDOW_HEIGHT: &str = "window.height";
    pub const SHADER_VERTEX: &str = "shaders.vertex";
    pub const SHADER_FRAGMENT: &str = "shaders.fragment";
    pub const LOG_FILTER: &str = "log.filter";
    pub const FRAME_STATS_INTERVAL: &str = "frame.stats_interval";
}

#[derive(Clone, Debug, PartialEq)]
pub enum Setting {
    Bool(bool),
    I32(i32),
    U32(u32),
    F32(f32),
    Str(String),
}

impl Setting {
    pub fn type_name(&self) -> &'static str {
        match self {
            Setting::Bool(_) => "bool",
            Setting::I32(_) => "i32",
            Setting::U32(_) => "u32",
            Setting::F32(_) => "f32",
            Setting::Str(_) => "string",
        }
    }

    /// Converts a JSON value into the same variant as `self`.
    fn same_kind_from_json(&self, value: &Value) -> Option<Setting> {
        match self {
            Setting::Bool(_) => value.as_bool().map(Setting::Bool),
            Setting::I32(_) => value
                .as_i64()
                .and_then(|v| i32::try_from(v).ok())
                .map(Setting::I32),
            Setting::U32(_) => value
                .as_u64()
                .and_then(|v| u32::try_from(v).ok())
                .map(Setting::U32),
            Setting::F32(_) => value.as_f64().map(|v| Setting::F32(v as f32)),
            Setting::Str(_) => value.as_str().map(|v| Setting::Str(v.to_string())),
        }
    }
}

/// Maps a Rust type `T` <-> a `Setting` variant.
/// Implement once per supported type.
pub trait SettingAccess: Sized {
    const TYPE_NAME: &'static str;
    fn as_ref(s: &Setting) -> Option<&Self>;
    fn as_mut(s: &mut Setting) -> Option<&mut Self>;
    fn into_setting(self) -> Setting;
}

macro_rules! impl_setting_access {
    ($t:ty, $variant:ident, $name:expr) => {
        impl SettingAccess for $t {
            const TYPE_NAME: &'static str = $name;

            #[inline]
            fn as_ref(s: &Setting) -> Option<&Self> {
                if let Setting::$variant(v) = s {
                    Some(v)
                } else {
                    None
                }
            }
            #[inline]
            fn as_mut(s: &mut Setting) -> Option<&mut Self> {
                if let Setting::$variant(v) = s {
                    Some(v)
                } else {
                    None
                }
            }
            #[inline]
            fn into_setting(self) -> Setting {
                Setting::$variant(self)
            }
        }
    };
}

impl_setting_access!(bool, Bool, "bool");
impl_setting_access!(i32, I32, "i32");
impl_setting_access!(u32, U32, "u32");
impl_setting_access!(f32, F32, "f32");
impl_setting_access!(String, Str, "string");

type SettingKey = String;

#[derive(Debug)]
pub enum SettingsError {
    Missing(String),
    WrongType {
        key: String,
        expected: &'static str,
        found: &'static str,
    },
    Io {
        path: PathBuf,
        source: io::Error,
    },
    Parse(String),
    Invalid {
        key: String,
        reason: String,
    },
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Missing(key) => write!(f, "setting '{}' does not exist", key),
            SettingsError::WrongType {
                key,
                expected,
                found,
            } => write!(
                f,
                "setting '{}' has type {}, expected {}",
                key, found, expected
            ),
            SettingsError::Io { path, source } => {
                write!(f, "failed to read settings file {:?}: {}", path, source)
            }
            SettingsError::Parse(message) => write!(f, "invalid settings: {}", message),
            SettingsError::Invalid { key, reason } => {
                write!(f, "invalid value for setting '{}': {}", key, reason)
            }
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Typed settings addressed by dotted keys such as `window.width`.
#[derive(Debug, Clone)]
pub struct Settings {
    settings: BTreeMap<SettingKey, Setting>,
}

impl Settings {
    pub fn new(settings: BTreeMap<SettingKey, Setting>) -> Self {
        Self { settings }
    }

    /// Borrow as the requested type, if the variant matches.
    pub fn get<T: SettingAccess>(&self, key: &str) -> Result<&T, SettingsError> {
        let setting = self
            .settings
            .get(key)
            .ok_or_else(|| SettingsError::Missing(key.to_string()))?;
        T::as_ref(setting).ok_or_else(|| SettingsError::WrongType {
            key: key.to_string(),
            expected: T::TYPE_NAME,
            found: setting.type_name(),
        })
    }

    /// Mutably borrow as the requested type, if the variant matches.
    pub fn get_mut<T: SettingAccess>(&mut self, key: &str) -> Result<&mut T, SettingsError> {
        let setting = self
            .settings
            .get_mut(key)
            .ok_or_else(|| SettingsError::Missing(key.to_string()))?;
        let found = setting.type_name();
        T::as_mut(setting).ok_or_else(|| SettingsError::WrongType {
            key: key.to_string(),
            expected: T::TYPE_NAME,
            found,
        })
    }

    /// Set/overwrite the value with the appropriate enum variant.
    pub fn set<T: SettingAccess>(&mut self, key: &str, value: T) {
        self.settings.insert(key.to_string(), value.into_setting());
    }

    /// Applies overrides from a JSON document. Nested objects flatten to
    /// dotted keys. Unknown keys are skipped with a warning; a value of the
    /// wrong type is an error. Returns how many settings changed.
    pub fn apply_json(&mut self, json: &str) -> Result<usize, SettingsError> {
        let document: Value =
            serde_json::from_str(json).map_err(|e| SettingsError::Parse(e.to_string()))?;
        if !document.is_object() {
            return Err(SettingsError::Parse(
                "top level must be a JSON object".to_string(),
            ));
        }

        let mut overrides = Vec::new();
        flatten("", &document, &mut overrides);

        let mut applied = 0;
        for (key, value) in overrides {
            let Some(current) = self.settings.get(&key) else {
                warn!("Ignoring unknown setting '{}'", key);
                continue;
            };
            let replacement =
                current
                    .same_kind_from_json(value)
                    .ok_or_else(|| SettingsError::WrongType {
                        key: key.clone(),
                        expected: current.type_name(),
                        found: json_type_name(value),
                    })?;
            debug!("Setting '{}' = {:?}", key, replacement);
            self.settings.insert(key, replacement);
            applied += 1;
        }
        Ok(applied)
    }

    pub fn load_overrides(&mut self, path: impl AsRef<Path>) -> Result<usize, SettingsError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.apply_json(&contents)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new(BTreeMap::from([
            (
                parameters::WINDOW_TITLE.to_string(),
                Setting::Str("Framework".to_string()),
            ),
            (parameters::WINDOW_WIDTH.to_string(), Setting::U32(800)),
            (parameters::WINDOW_HEIGHT.to_string(), Setting::U32(600)),
            (
                parameters::SHADER_VERTEX.to_string(),
                Setting::Str("data/shaders/triangle.vs".to_string()),
            ),
            (
                parameters::SHADER_FRAGMENT.to_string(),
                Setting::Str("data/shaders/triangle.fs".to_string()),
            ),
            (
                parameters::LOG_FILTER.to_string(),
                Setting::Str(String::new()),
            ),
            (
                parameters::FRAME_STATS_INTERVAL.to_string(),
                Setting::F32(1.0),
            ),
        ]))
    }
}

fn flatten<'a>(prefix: &str, value: &'a Value, out: &mut Vec<(String, &'a Value)>) {
    match value {
        Value::Object(map) => {
            for (name, child) in map {
                let key = if prefix.is_empty() {
                    name.clone()
                } else {
                    format!("{}.{}", prefix, name)
                };
                flatten(&key, child, out);
            }
        }
        leaf => out.push((prefix.to_string(), leaf)),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn settings() -> Settings {
        Settings::default()
    }

    #[rstest]
    fn defaults(settings: Settings) {
        assert_eq!(settings.get::<u32>(parameters::WINDOW_WIDTH).unwrap(), &800);
        assert_eq!(settings.get::<u32>(parameters::WINDOW_HEIGHT).unwrap(), &600);
        assert_eq!(
            settings.get::<String>(parameters::WINDOW_TITLE).unwrap(),
            "Framework"
        );
    }

    #[rstest]
    fn get_missing_and_wrong_type(settings: Settings) {
        assert!(matches!(
            settings.get::<bool>("window.fullscreen"),
            Err(SettingsError::Missing(_))
        ));
        assert!(matches!(
            settings.get::<f32>(parameters::WINDOW_WIDTH),
            Err(SettingsError::WrongType {
                expected: "f32",
                found: "u32",
                ..
            })
        ));
    }

    #[rstest]
    fn set_and_get_mut(mut settings: Settings) {
        settings.set(parameters::FRAME_STATS_INTERVAL, 2.5f32);
        *settings.get_mut::<f32>(parameters::FRAME_STATS_INTERVAL).unwrap() += 0.5;
        assert_eq!(
            settings.get::<f32>(parameters::FRAME_STATS_INTERVAL).unwrap(),
            &3.0
        );
    }

    #[rstest]
    fn nested_json_overrides(mut settings: Settings) {
        let applied = settings
            .apply_json(r#"{ "window": { "width": 1024, "title": "Triangle" }, "log.filter": "debug" }"#)
            .unwrap();

        assert_eq!(applied, 3);
        assert_eq!(settings.get::<u32>(parameters::WINDOW_WIDTH).unwrap(), &1024);
        assert_eq!(
            settings.get::<String>(parameters::WINDOW_TITLE).unwrap(),
            "Triangle"
        );
        assert_eq!(settings.get::<String>(parameters::LOG_FILTER).unwrap(), "debug");
    }

    #[rstest]
    fn unknown_keys_are_skipped(mut settings: Settings) {
        let applied = settings.apply_json(r#"{ "window": { "vsync": true } }"#).unwrap();
        assert_eq!(applied, 0);
    }

    #[rstest]
    #[case(r#"{ "window": { "width": "wide" } }"#)]
    #[case(r#"{ "window": { "width": -1 } }"#)]
    #[case(r#"{ "window": { "height": 5000000000 } }"#)]
    fn bad_values_are_rejected(mut settings: Settings, #[case] json: &str) {
        assert!(matches!(
            settings.apply_json(json),
            Err(SettingsError::WrongType { .. })
        ));
    }

    #[rstest]
    #[case("not json")]
    #[case("[1, 2]")]
    fn malformed_documents(mut settings: Settings, #[case] json: &str) {
        assert!(matches!(
            settings.apply_json(json),
            Err(SettingsError::Parse(_))
        ));
    }

    #[rstest]
    fn missing_file(mut settings: Settings) {
        assert!(matches!(
            settings.load_overrides("/nonexistent/settings.json"),
            Err(SettingsError::Io { .. })
        ));
    }
}
