//! Global settings with defaults merged under stored partial values.

use super::SiteLocker;
use crate::storage::models::{Settings, SettingsPatch};
use crate::storage::KEY_SETTINGS;
use crate::Result;
use serde_json::Value;

impl SiteLocker {
    /// Current settings; defaults fill in anything missing or malformed.
    pub fn settings(&self) -> Result<Settings> {
        Ok(decode_settings(self.store().get_value(KEY_SETTINGS)?))
    }

    /// Merge a partial patch over the current settings and store the result.
    pub fn update_settings(&self, patch: &SettingsPatch) -> Result<Settings> {
        let mut merged = Settings::default();
        self.store().update(KEY_SETTINGS, |current| {
            let mut settings = decode_settings(current);
            settings.apply(patch);
            merged = settings.clone();
            Ok(serde_json::to_value(&settings)?)
        })?;
        Ok(merged)
    }
}

fn decode_settings(value: Option<Value>) -> Settings {
    match value {
        Some(v @ Value::Object(_)) => serde_json::from_value(v).unwrap_or_default(),
        _ => Settings::default(),
    }
}
