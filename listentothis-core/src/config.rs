//! Startup configuration.
//!
//! Reddit credentials always come from the environment (optionally seeded from
//! a `.env` file by the binary). Everything the UI offers by default can be
//! overridden from an optional TOML file.

use crate::error::ConfigError;
use crate::types::{DEFAULT_POST_LIMIT, MAX_POST_LIMIT, MAX_SELECTED_COMMUNITIES, MIN_POST_LIMIT};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const CLIENT_ID_VAR: &str = "REDDIT_CLIENT_ID";
pub const CLIENT_SECRET_VAR: &str = "REDDIT_CLIENT_SECRET";
pub const USERNAME_VAR: &str = "REDDIT_USERNAME";
pub const CONFIG_PATH_VAR: &str = "LISTENTOTHIS_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "listentothis.toml";

#[derive(Debug, Clone)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
}

impl RedditCredentials {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |var_name: &str| {
            lookup(var_name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .ok_or_else(|| ConfigError::MissingEnvironmentVariable {
                    var_name: var_name.to_string(),
                })
        };

        Ok(Self {
            client_id: required(CLIENT_ID_VAR)?,
            client_secret: required(CLIENT_SECRET_VAR)?,
            username: required(USERNAME_VAR)?,
        })
    }

    pub fn user_agent(&self) -> String {
        format!("script:listentothis:v1.0 (by /u/{})", self.username)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GenreConfig {
    pub options: Vec<String>,
    pub defaults: Vec<String>,
    pub max_selections: usize,
}

impl Default for GenreConfig {
    fn default() -> Self {
        Self {
            options: to_strings(&[
                "rock",
                "metal",
                "punk",
                "alternative",
                "pop",
                "hip-hop",
                "electronic",
            ]),
            defaults: to_strings(&["rock", "metal", "punk"]),
            max_selections: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub default_limit: u8,
    pub max_communities: usize,
    pub known_subreddits: Vec<String>,
    pub genres: GenreConfig,
    pub tag_colors: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_POST_LIMIT,
            max_communities: MAX_SELECTED_COMMUNITIES,
            known_subreddits: to_strings(&[
                "ListenToThis",
                "MusicRecommendations",
                "MusicSuggestions",
                "IndieMusic",
                "HipHopHeads",
                "EDM",
                "Metal",
                "Rock",
                "Popheads",
                "Jazz",
                "ClassicalMusic",
                "KPop",
                "MusicCritique",
                "Songwriting",
                "BedroomBands",
                "FutureBeats",
                "ExperimentalMusic",
            ]),
            genres: GenreConfig::default(),
            tag_colors: to_strings(&[
                "darkcyan",
                "mediumpurple",
                "tan",
                "orange",
                "crimson",
                "teal",
                "olive",
            ]),
        }
    }
}

impl AppConfig {
    /// Loads the config file named by `LISTENTOTHIS_CONFIG`, falling back to
    /// `listentothis.toml` when present and to the defaults otherwise.
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var(CONFIG_PATH_VAR) {
            Ok(path) => Self::from_file(Path::new(&path)),
            Err(_) => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(&default_path)
                } else {
                    debug!("No {} found, using built-in defaults", DEFAULT_CONFIG_FILE);
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
                path: path.display().to_string(),
            })?;
        let config = Self::from_toml(&contents)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_POST_LIMIT..=MAX_POST_LIMIT).contains(&self.default_limit) {
            return Err(ConfigError::InvalidValue {
                field: "default_limit".to_string(),
                value: self.default_limit.to_string(),
            });
        }
        if self.max_communities == 0 || self.max_communities > MAX_SELECTED_COMMUNITIES {
            return Err(ConfigError::InvalidValue {
                field: "max_communities".to_string(),
                value: self.max_communities.to_string(),
            });
        }
        if self.tag_colors.is_empty() {
            return Err(ConfigError::ValidationFailed {
                reason: "tag_colors must name at least one colour".to_string(),
            });
        }
        if self.genres.max_selections == 0 {
            return Err(ConfigError::InvalidValue {
                field: "genres.max_selections".to_string(),
                value: "0".to_string(),
            });
        }
        if let Some(unknown) = self
            .genres
            .defaults
            .iter()
            .find(|genre| !self.genres.options.contains(genre))
        {
            return Err(ConfigError::ValidationFailed {
                reason: format!("default genre '{}' is not one of the options", unknown),
            });
        }
        Ok(())
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_credentials_from_lookup() {
        let credentials = RedditCredentials::from_lookup(lookup_from(&[
            (CLIENT_ID_VAR, "abc"),
            (CLIENT_SECRET_VAR, "shh"),
            (USERNAME_VAR, "melomane"),
        ]))
        .unwrap();

        assert_eq!(credentials.client_id, "abc");
        assert_eq!(credentials.client_secret, "shh");
        assert_eq!(
            credentials.user_agent(),
            "script:listentothis:v1.0 (by /u/melomane)"
        );
    }

    #[test]
    fn test_missing_credentials() {
        let result = RedditCredentials::from_lookup(lookup_from(&[
            (CLIENT_ID_VAR, "abc"),
            (CLIENT_SECRET_VAR, "   "),
            (USERNAME_VAR, "melomane"),
        ]));

        match result {
            Err(ConfigError::MissingEnvironmentVariable { var_name }) => {
                assert_eq!(var_name, CLIENT_SECRET_VAR)
            }
            other => panic!("Expected missing variable error, got {:?}", other),
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_limit, 5);
        assert_eq!(config.max_communities, 20);
        assert_eq!(config.known_subreddits.len(), 17);
        assert_eq!(config.tag_colors.len(), 7);
        assert_eq!(config.genres.defaults, vec!["rock", "metal", "punk"]);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            default_limit = 12
            known_subreddits = ["Metal", "Jazz"]

            [genres]
            max_selections = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.default_limit, 12);
        assert_eq!(config.known_subreddits, vec!["Metal", "Jazz"]);
        assert_eq!(config.genres.max_selections, 3);
        assert_eq!(config.genres.options.len(), 7);
        assert_eq!(config.tag_colors, AppConfig::default().tag_colors);
    }

    #[test]
    fn test_invalid_toml_values() {
        assert!(matches!(
            AppConfig::from_toml("default_limit = 0"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            AppConfig::from_toml("max_communities = 50"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            AppConfig::from_toml("tag_colors = []"),
            Err(ConfigError::ValidationFailed { .. })
        ));
        assert!(matches!(
            AppConfig::from_toml("[genres]\ndefaults = [\"polka\"]"),
            Err(ConfigError::ValidationFailed { .. })
        ));
        assert!(matches!(
            AppConfig::from_toml("default_limit = \"five\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_config_file() {
        let result = AppConfig::from_file(Path::new("/definitely/not/here.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
    }
}
