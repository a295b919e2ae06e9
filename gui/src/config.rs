use std::{
    env,
    path::{Path, PathBuf},
};

use tracing::info;
use triangle_core::settings::{Settings, SettingsError, parameters};

use crate::platform::WindowConfig;

/// Names a JSON file whose values override the defaults.
pub const SETTINGS_ENV: &str = "HELLO_TRIANGLE_SETTINGS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderPaths {
    pub vertex: PathBuf,
    pub fragment: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub shaders: ShaderPaths,
    pub log_filter: Option<String>,
    pub stats_interval: f32,
}

impl AppConfig {
    /// Defaults, overridden by the file named in [`SETTINGS_ENV`] if set.
    pub fn load() -> Result<Self, SettingsError> {
        Self::load_from(env::var_os(SETTINGS_ENV).map(PathBuf::from).as_deref())
    }

    /// Relative shader paths resolve against the settings file's directory,
    /// or stay relative to the working directory when there is no file.
    pub fn load_from(settings_file: Option<&Path>) -> Result<Self, SettingsError> {
        let mut settings = Settings::default();
        let base_dir = match settings_file {
            Some(path) => {
                let applied = settings.load_overrides(path)?;
                info!("Applied {} setting(s) from {:?}", applied, path);
                path.parent().map(Path::to_path_buf).unwrap_or_default()
            }
            None => PathBuf::new(),
        };
        Self::from_settings(&settings, &base_dir)
    }

    pub fn from_settings(settings: &Settings, base_dir: &Path) -> Result<Self, SettingsError> {
        let log_filter = settings.get::<String>(parameters::LOG_FILTER)?;
        let stats_interval = *settings.get::<f32>(parameters::FRAME_STATS_INTERVAL)?;
        if !(stats_interval.is_finite() && stats_interval > 0.0) {
            return Err(SettingsError::Invalid {
                key: parameters::FRAME_STATS_INTERVAL.to_string(),
                reason: format!("{} is not a positive number of seconds", stats_interval),
            });
        }
        Ok(Self {
            window: WindowConfig {
                title: settings.get::<String>(parameters::WINDOW_TITLE)?.clone(),
                width: *settings.get::<u32>(parameters::WINDOW_WIDTH)?,
                height: *settings.get::<u32>(parameters::WINDOW_HEIGHT)?,
            },
            shaders: ShaderPaths {
                vertex: resolve(
                    base_dir,
                    settings.get::<String>(parameters::SHADER_VERTEX)?,
                ),
                fragment: resolve(
                    base_dir,
                    settings.get::<String>(parameters::SHADER_FRAGMENT)?,
                ),
            },
            log_filter: (!log_filter.is_empty()).then(|| log_filter.clone()),
            stats_interval,
        })
    }
}

fn resolve(base_dir: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn defaults() {
        let config = AppConfig::from_settings(&Settings::default(), Path::new("/app")).unwrap();

        assert_eq!(
            config.window,
            WindowConfig {
                title: "Framework".to_string(),
                width: 800,
                height: 600,
            }
        );
        assert_eq!(
            config.shaders.vertex,
            PathBuf::from("/app/data/shaders/triangle.vs")
        );
        assert_eq!(
            config.shaders.fragment,
            PathBuf::from("/app/data/shaders/triangle.fs")
        );
        assert_eq!(config.log_filter, None);
        assert_eq!(config.stats_interval, 1.0);
    }

    #[test]
    fn overrides_flow_through() {
        let mut settings = Settings::default();
        settings
            .apply_json(
                r#"{
                    "window": { "title": "Triangle", "width": 1280 },
                    "shaders": { "vertex": "/abs/basic.vs" },
                    "log": { "filter": "triangle_core=debug" }
                }"#,
            )
            .unwrap();

        let config = AppConfig::from_settings(&settings, Path::new("/app")).unwrap();
        assert_eq!(config.window.title, "Triangle");
        assert_eq!(config.window.width, 1280);
        assert_eq!(config.window.height, 600);
        assert_eq!(config.shaders.vertex, PathBuf::from("/abs/basic.vs"));
        assert_eq!(config.log_filter.as_deref(), Some("triangle_core=debug"));
    }

    #[rstest]
    #[case("/base", "shader.vs", "/base/shader.vs")]
    #[case("/base", "/etc/shader.vs", "/etc/shader.vs")]
    #[case("", "shader.vs", "shader.vs")]
    fn paths_resolve_against_base(
        #[case] base: &str,
        #[case] path: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(resolve(Path::new(base), path), PathBuf::from(expected));
    }

    #[test]
    fn without_a_settings_file_paths_stay_relative() {
        let config = AppConfig::load_from(None).unwrap();
        assert_eq!(
            config.shaders.vertex,
            PathBuf::from("data/shaders/triangle.vs")
        );
        assert_eq!(
            config.shaders.fragment,
            PathBuf::from("data/shaders/triangle.fs")
        );
        assert!(config.shaders.vertex.is_relative());
    }

    #[test]
    fn settings_file_directory_is_the_base() {
        let dir = env::temp_dir().join(format!("hello_triangle_config_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("settings.json");
        std::fs::write(&file, r#"{ "shaders": { "vertex": "custom.vs" } }"#).unwrap();

        let config = AppConfig::load_from(Some(&file)).unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        assert_eq!(config.shaders.vertex, dir.join("custom.vs"));
        assert_eq!(config.shaders.fragment, dir.join("data/shaders/triangle.fs"));
    }

    #[test]
    fn missing_settings_file_is_an_error() {
        let result = AppConfig::load_from(Some(Path::new("/nonexistent/settings.json")));
        assert!(matches!(result, Err(SettingsError::Io { .. })));
    }

    #[rstest]
    #[case(0.0)]
    #[case(-1.0)]
    #[case(f32::NAN)]
    #[case(f32::INFINITY)]
    fn stats_interval_must_be_positive(#[case] interval: f32) {
        let mut settings = Settings::default();
        settings.set(parameters::FRAME_STATS_INTERVAL, interval);

        let result = AppConfig::from_settings(&settings, Path::new("/app"));
        assert!(matches!(result, Err(SettingsError::Invalid { .. })));
    }

    #[test]
    fn default_shaders_exist_at_the_workspace_root() {
        let base = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("..");
        let config = AppConfig::from_settings(&Settings::default(), &base).unwrap();
        assert!(config.shaders.vertex.is_file());
        assert!(config.shaders.fragment.is_file());
    }
}
