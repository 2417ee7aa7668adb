//! Run configuration, loaded once at startup from the config directory.
//!
//! Credentials live in two files (`db_credentials.json`, `email_credentials.json`);
//! fleet and rendering settings in an optional `report.json`.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::TimeDelta;
use chrono_tz::Tz;
use lettre::message::Mailbox;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{defaults, filenames};
use crate::data_mgmt::models::DbSelector;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Clone, Deserialize, Serialize)]
pub struct DbCredentials {
    pub server: String,
    #[serde(default = "default_sql_server_port")]
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for DbCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbCredentials")
            .field("server", &self.server)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DatabaseCredentials {
    pub smbs: DbCredentials,
    pub debug_smbs: DbCredentials,
}

impl FromStr for DatabaseCredentials {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s).map_err(Into::into)
    }
}

#[derive(Clone, Deserialize, Serialize)]
pub struct EmailConfig {
    pub sender: String,
    pub password: String,
    pub recipients: Vec<String>,
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// When set, messages are written here as .eml files instead of being sent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outbox_dir: Option<PathBuf>,
}

impl fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailConfig")
            .field("sender", &self.sender)
            .field("password", &"<redacted>")
            .field("recipients", &self.recipients)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("outbox_dir", &self.outbox_dir)
            .finish()
    }
}

impl EmailConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.recipients.is_empty() {
            return Err(ConfigError::Invalid("at least one recipient is required".into()));
        }
        for address in std::iter::once(&self.sender).chain(self.recipients.iter()) {
            address
                .parse::<Mailbox>()
                .map_err(|e| ConfigError::Invalid(format!("bad address '{address}': {e}")))?;
        }
        Ok(())
    }
}

impl FromStr for EmailConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let config: EmailConfig = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}

/// An organization reported on in the fleet-wide statistics
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct OrganizationRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct ReportSettings {
    pub organizations: Vec<OrganizationRef>,
    /// CSV with a `DeviceID` column; relative paths resolve against the config directory
    pub new_pv_list: Option<PathBuf>,
    pub last_seen_weeks: i64,
    pub critical_voltage: f64,
    pub timezone: Option<String>,
    pub chart_font: PathBuf,
}

impl Default for ReportSettings {
    fn default() -> Self {
        ReportSettings {
            organizations: ["ZIM", "Samskip", "HMM"]
                .into_iter()
                .map(|name| OrganizationRef {
                    id: None,
                    name: name.to_string(),
                })
                .collect(),
            new_pv_list: None,
            last_seen_weeks: defaults::LAST_SEEN_WEEKS,
            critical_voltage: defaults::CRITICAL_VOLTAGE,
            timezone: None,
            chart_font: PathBuf::from(defaults::CHART_FONT),
        }
    }
}

impl ReportSettings {
    pub fn timezone(&self) -> Result<Option<Tz>, ConfigError> {
        self.timezone
            .as_deref()
            .map(|tz| {
                tz.parse::<Tz>()
                    .map_err(|e| ConfigError::Invalid(format!("invalid timezone: {e}")))
            })
            .transpose()
    }
}

impl FromStr for ReportSettings {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let settings: ReportSettings = serde_json::from_str(s)?;
        if settings.last_seen_weeks <= 0 {
            return Err(ConfigError::Invalid("last_seen_weeks must be positive".into()));
        }
        if TimeDelta::try_weeks(settings.last_seen_weeks).is_none() {
            return Err(ConfigError::Invalid(format!(
                "last_seen_weeks {} is out of range",
                settings.last_seen_weeks
            )));
        }
        settings.timezone()?;
        Ok(settings)
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub databases: DatabaseCredentials,
    pub email: EmailConfig,
    pub report: ReportSettings,
    pub config_dir: PathBuf,
}

impl Config {
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let databases: DatabaseCredentials =
            read_file(&config_dir.join(filenames::DB_CREDENTIALS))?.parse()?;
        let email: EmailConfig =
            read_file(&config_dir.join(filenames::EMAIL_CREDENTIALS))?.parse()?;

        let settings_path = config_dir.join(filenames::REPORT_SETTINGS);
        let report: ReportSettings = if settings_path.is_file() {
            read_file(&settings_path)?.parse()?
        } else {
            log::debug!("No {} found; using default report settings", settings_path.display());
            ReportSettings::default()
        };

        Ok(Config {
            databases,
            email,
            report,
            config_dir: config_dir.to_path_buf(),
        })
    }

    pub fn database(&self, selector: DbSelector) -> &DbCredentials {
        match selector {
            DbSelector::Smbs => &self.databases.smbs,
            DbSelector::DebugSmbs => &self.databases.debug_smbs,
        }
    }

    pub fn new_pv_list_path(&self) -> Option<PathBuf> {
        self.report
            .new_pv_list
            .as_ref()
            .map(|p| self.config_dir.join(p))
    }
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn default_sql_server_port() -> u16 {
    defaults::SQL_SERVER_PORT
}

fn default_smtp_host() -> String {
    defaults::SMTP_HOST.to_string()
}

fn default_smtp_port() -> u16 {
    defaults::SMTP_PORT
}
