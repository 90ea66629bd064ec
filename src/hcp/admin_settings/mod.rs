//! Admin settings module

mod api;
mod models;

pub use api::{AdminSmtpSettings, AdminSmtpSettingsService};
pub use models::{AdminSmtpSetting, AdminSmtpSettingUpdateOptions, SmtpAuthType};
