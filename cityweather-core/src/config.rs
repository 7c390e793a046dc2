use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

pub const DEFAULT_GEOCODING_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_WEATHER_URL: &str = "https://api.open-meteo.com";
pub const DEFAULT_USER_AGENT: &str = concat!("cityweather/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_DEADLINE_SECS: u64 = 5;

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// cities = ["Amsterdam", "Paris"]
/// deadline_secs = 5
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Cities to look up, in launch order.
    pub cities: Vec<String>,

    /// Shared deadline for the whole run, in seconds.
    pub deadline_secs: u64,

    pub geocoding_url: String,
    pub weather_url: String,

    /// Sent on every request; Nominatim rejects anonymous clients.
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cities: ["Amsterdam", "Wien", "Moskow", "Warsaw", "Paris"]
                .into_iter()
                .map(String::from)
                .collect(),
            deadline_secs: DEFAULT_DEADLINE_SECS,
            geocoding_url: DEFAULT_GEOCODING_URL.to_string(),
            weather_url: DEFAULT_WEATHER_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Config {
    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }

    /// Reject configurations a run cannot make sense of.
    pub fn validate(&self) -> Result<()> {
        if self.cities.is_empty() {
            bail!(
                "No cities configured.\n\
                 Hint: pass `--city <NAME>` or run `cityweather configure`."
            );
        }

        if let Some(pos) = self.cities.iter().position(|c| c.trim().is_empty()) {
            bail!("City #{} is blank; every city needs a name.", pos + 1);
        }

        if self.deadline_secs == 0 {
            bail!("Deadline must be at least 1 second.");
        }

        Ok(())
    }

    /// Replace the city list, trimming names and dropping empty entries.
    pub fn set_cities<I, S>(&mut self, cities: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.cities = cities
            .into_iter()
            .map(|c| c.as_ref().trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
    }

    /// Load config from the default location, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, use defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to the default location.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save config, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "cityweather", "cityweather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = Config::default();
        cfg.validate().expect("default config must validate");

        assert_eq!(cfg.cities.len(), 5);
        assert_eq!(cfg.deadline(), Duration::from_secs(5));
    }

    #[test]
    fn empty_city_list_is_rejected() {
        let mut cfg = Config::default();
        cfg.cities.clear();

        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("No cities configured"));
    }

    #[test]
    fn blank_city_is_rejected() {
        let mut cfg = Config::default();
        cfg.cities.push("   ".into());

        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("City #6 is blank"));
    }

    #[test]
    fn zero_deadline_is_rejected() {
        let cfg = Config {
            deadline_secs: 0,
            ..Config::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn oversized_deadline_still_yields_a_usable_context() {
        let cfg = Config {
            deadline_secs: u64::MAX,
            ..Config::default()
        };
        cfg.validate().expect("large deadlines are allowed");

        let ctx = crate::RunContext::with_timeout(cfg.deadline());
        assert!(!ctx.is_done());
    }

    #[test]
    fn set_cities_trims_and_drops_empty() {
        let mut cfg = Config::default();
        cfg.set_cities([" Oslo ", "", "Bergen"]);
        assert_eq!(cfg.cities, vec!["Oslo".to_string(), "Bergen".to_string()]);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn save_then_load_preserves_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.set_cities(["Oslo"]);
        cfg.deadline_secs = 9;
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "cities = [\"Lisbon\"]\n").unwrap();

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.cities, vec!["Lisbon".to_string()]);
        assert_eq!(cfg.deadline_secs, DEFAULT_DEADLINE_SECS);
        assert_eq!(cfg.weather_url, DEFAULT_WEATHER_URL);
    }

    #[test]
    fn malformed_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "cities = 3").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
