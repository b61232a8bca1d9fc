use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use prospecto_core::domain::phone::normalize_prefix;
use serde::Deserialize;
use thiserror::Error;

const APP_DIR: &str = "prospecto";
const CONFIG_FILENAME: &str = "config.toml";

pub const DEFAULT_SUCCESS_DISMISS_SECS: u64 = 5;
pub const DEFAULT_SUCCESS_MESSAGE: &str =
    "¡Gracias por contactarnos! Nos pondremos en contacto contigo pronto.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceEntry {
    pub id: String,
    pub label: String,
}

impl ChoiceEntry {
    fn new(id: &str, label: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub projects: Vec<ChoiceEntry>,
    pub unit_types: Vec<ChoiceEntry>,
    pub phone_prefixes: Vec<String>,
    pub default_prefix: String,
    pub success_message: String,
    pub success_dismiss_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            projects: vec![
                ChoiceEntry::new("parque-mirador", "Parque Mirador"),
                ChoiceEntry::new("altos-del-valle", "Altos del Valle"),
                ChoiceEntry::new("edificio-costanera", "Edificio Costanera"),
                ChoiceEntry::new("vista-cordillera", "Vista Cordillera"),
            ],
            unit_types: vec![
                ChoiceEntry::new("studio", "Studio"),
                ChoiceEntry::new("1d1b", "1 dormitorio 1 baño"),
                ChoiceEntry::new("2d1b", "2 dormitorios 1 baño"),
                ChoiceEntry::new("2d2b", "2 dormitorios 2 baños"),
                ChoiceEntry::new("3d2b", "3 dormitorios 2 baños"),
            ],
            phone_prefixes: vec!["569".to_string(), "562".to_string()],
            default_prefix: "569".to_string(),
            success_message: DEFAULT_SUCCESS_MESSAGE.to_string(),
            success_dismiss_secs: DEFAULT_SUCCESS_DISMISS_SECS,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing home directory")]
    MissingHomeDir,
    #[error("invalid config path: {0}")]
    InvalidConfigPath(PathBuf),
    #[error("config file not found: {0}")]
    MissingConfigFile(PathBuf),
    #[error("{0} catalog cannot be empty")]
    EmptyCatalog(&'static str),
    #[error("option id cannot be empty in the {0} catalog")]
    EmptyOptionId(&'static str),
    #[error("duplicate option id in the {catalog} catalog: {id}")]
    DuplicateOptionId { catalog: &'static str, id: String },
    #[error("invalid phone prefix: {0}")]
    InvalidPrefix(String),
    #[error("default prefix {0} is not in the prefix list")]
    UnknownDefaultPrefix(String),
    #[error("success dismiss delay must be at least one second")]
    InvalidDismissSecs,
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    projects: Option<Vec<ChoiceFile>>,
    unit_types: Option<Vec<ChoiceFile>>,
    phone: Option<PhoneFile>,
    success: Option<SuccessFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ChoiceFile {
    id: String,
    label: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PhoneFile {
    prefixes: Option<Vec<String>>,
    default_prefix: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SuccessFile {
    message: Option<String>,
    dismiss_secs: Option<u64>,
}

pub fn load(config_path: Option<PathBuf>) -> Result<AppConfig> {
    let required = config_path.is_some();
    let path = match resolve_config_path(config_path) {
        Ok(path) => path,
        Err(ConfigError::MissingHomeDir) if !required => return Ok(AppConfig::default()),
        Err(ConfigError::InvalidConfigPath(_)) if !required => return Ok(AppConfig::default()),
        Err(err) => return Err(err),
    };
    match load_at_path(&path, required)? {
        Some(config) => Ok(config),
        None => Ok(AppConfig::default()),
    }
}

pub fn resolve_config_path(custom: Option<PathBuf>) -> Result<PathBuf> {
    match custom {
        Some(path) => {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidConfigPath(path));
            }
            Ok(path)
        }
        None => {
            let base = if let Some(dir) = env::var_os("XDG_CONFIG_HOME") {
                let path = PathBuf::from(dir);
                if path.as_os_str().is_empty() {
                    return Err(ConfigError::InvalidConfigPath(path));
                }
                path
            } else {
                let home = dirs::home_dir().ok_or(ConfigError::MissingHomeDir)?;
                home.join(".config")
            };
            Ok(base.join(APP_DIR).join(CONFIG_FILENAME))
        }
    }
}

fn load_at_path(path: &Path, required: bool) -> Result<Option<AppConfig>> {
    if !path.exists() {
        if required {
            return Err(ConfigError::MissingConfigFile(path.to_path_buf()));
        }
        return Ok(None);
    }

    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: ConfigFile = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(merge_config(parsed)?))
}

fn merge_config(parsed: ConfigFile) -> Result<AppConfig> {
    let mut config = AppConfig::default();

    if let Some(projects) = parsed.projects {
        config.projects = build_catalog("projects", projects)?;
    }
    if let Some(unit_types) = parsed.unit_types {
        config.unit_types = build_catalog("unit_types", unit_types)?;
    }

    if let Some(phone) = parsed.phone {
        if let Some(prefixes) = phone.prefixes {
            let mut out = Vec::with_capacity(prefixes.len());
            for prefix in prefixes {
                let normalized = normalize_prefix(&prefix)
                    .map_err(|_| ConfigError::InvalidPrefix(prefix.clone()))?;
                out.push(normalized);
            }
            if out.is_empty() {
                return Err(ConfigError::EmptyCatalog("phone prefix"));
            }
            config.phone_prefixes = out;
        }
        if let Some(default_prefix) = phone.default_prefix {
            config.default_prefix = normalize_prefix(&default_prefix)
                .map_err(|_| ConfigError::InvalidPrefix(default_prefix.clone()))?;
        }
    }
    if !config.phone_prefixes.contains(&config.default_prefix) {
        return Err(ConfigError::UnknownDefaultPrefix(config.default_prefix));
    }

    if let Some(success) = parsed.success {
        if let Some(message) = success.message {
            config.success_message = message;
        }
        if let Some(dismiss_secs) = success.dismiss_secs {
            if dismiss_secs == 0 {
                return Err(ConfigError::InvalidDismissSecs);
            }
            config.success_dismiss_secs = dismiss_secs;
        }
    }

    Ok(config)
}

fn build_catalog(catalog: &'static str, entries: Vec<ChoiceFile>) -> Result<Vec<ChoiceEntry>> {
    if entries.is_empty() {
        return Err(ConfigError::EmptyCatalog(catalog));
    }
    let mut out = Vec::with_capacity(entries.len());
    for entry in entries {
        let id = entry.id.trim().to_string();
        if id.is_empty() {
            return Err(ConfigError::EmptyOptionId(catalog));
        }
        if out.iter().any(|existing: &ChoiceEntry| existing.id == id) {
            return Err(ConfigError::DuplicateOptionId { catalog, id });
        }
        let label = match entry.label {
            Some(label) if !label.trim().is_empty() => label,
            _ => id.clone(),
        };
        out.push(ChoiceEntry { id, label });
    }
    Ok(out)
}
