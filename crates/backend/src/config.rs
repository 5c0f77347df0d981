use std::path::PathBuf;

use wildtrack_shared::utm::UtmZone;

const DEFAULT_PORT: u16 = 3000;

/// Server settings, read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub port: u16,
    pub data_dir: PathBuf,
    pub dist_dir: PathBuf,
    pub tracks_file: String,
    pub zone: UtmZone,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            data_dir: PathBuf::from("data"),
            dist_dir: PathBuf::from("dist"),
            tracks_file: "tracks.csv".to_string(),
            zone: UtmZone::ZONE_18_NORTH,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unparseable values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Config::default();

        let port = match lookup("PORT") {
            Some(raw) => raw.parse::<u16>().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "invalid PORT, using {DEFAULT_PORT}");
                DEFAULT_PORT
            }),
            None => defaults.port,
        };
        let zone = match lookup("UTM_ZONE") {
            Some(raw) => raw.parse::<UtmZone>().unwrap_or_else(|e| {
                tracing::warn!(value = %raw, "{e}, using {}", defaults.zone);
                defaults.zone
            }),
            None => defaults.zone,
        };

        Self {
            port,
            data_dir: lookup("DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir),
            dist_dir: lookup("DIST_DIR").map(PathBuf::from).unwrap_or(defaults.dist_dir),
            tracks_file: lookup("TRACKS_FILE").unwrap_or(defaults.tracks_file),
            zone,
        }
    }

    pub fn tracks_path(&self) -> PathBuf {
        self.data_dir.join(&self.tracks_file)
    }

    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use wildtrack_shared::utm::Hemisphere;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[]));
        assert_eq!(config, Config::default());
        assert_eq!(config.tracks_path(), PathBuf::from("data/tracks.csv"));
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("PORT", "8080"),
            ("DATA_DIR", "/srv/tracks"),
            ("DIST_DIR", "/srv/www"),
            ("TRACKS_FILE", "spring.csv"),
            ("UTM_ZONE", "33S"),
        ]));
        assert_eq!(config.port, 8080);
        assert_eq!(config.tracks_path(), PathBuf::from("/srv/tracks/spring.csv"));
        assert_eq!(config.dist_dir, PathBuf::from("/srv/www"));
        assert_eq!(config.zone.number(), 33);
        assert_eq!(config.zone.hemisphere(), Hemisphere::South);
    }

    #[test]
    fn test_bad_values_fall_back() {
        let config = Config::from_lookup(lookup(&[("PORT", "eighty"), ("UTM_ZONE", "99Q")]));
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.zone, UtmZone::ZONE_18_NORTH);
    }
}
