use std::path::PathBuf;

use serde::Deserialize;

use crate::reminder::PermissionStatus;

#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PhoneAlarmBackend {
    #[default]
    Acknowledge,
    Platform,
}

#[derive(Deserialize, Debug, Clone)]
pub struct AlarmSettings {
    #[serde(default = "default_timezone")]
    pub timezone: chrono_tz::Tz,
    #[serde(default = "default_horizon_days")]
    pub horizon_days: u32,
    #[serde(default)]
    pub phone_alarm: PhoneAlarmBackend,
    #[serde(default)]
    pub notification_permission: PermissionStatus,
    #[serde(default = "default_grant_on_request")]
    pub grant_on_request: bool,
}

impl Default for AlarmSettings {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            horizon_days: default_horizon_days(),
            phone_alarm: PhoneAlarmBackend::default(),
            notification_permission: PermissionStatus::default(),
            grant_on_request: default_grant_on_request(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct StorageSettings {
    pub data_dir: PathBuf,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct SessionSettings {
    pub user_id: Option<String>,
    #[serde(default)]
    pub guest: bool,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    #[serde(default)]
    pub alarms: AlarmSettings,
    pub storage: StorageSettings,
    #[serde(default)]
    pub session: SessionSettings,
}

fn default_timezone() -> chrono_tz::Tz {
    chrono_tz::Europe::Istanbul
}

fn default_horizon_days() -> u32 {
    1
}

fn default_grant_on_request() -> bool {
    true
}
