//! Session settings
//!
//! Persisted in LocalStorage on the web; read from the JSON file named by
//! `MINION_HAMMER_CONFIG` on native. Missing fields take their defaults.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::net::{Endpoint, UriError};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings are not valid JSON")]
    Parse(#[from] serde_json::Error),
    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error("invalid setting `base_url`: {0}")]
    BaseUrl(#[from] UriError),
}

/// What the poll loop does after a failed list request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RetryPolicy {
    /// Stop polling; minions freeze at their last known positions
    Stop,
    /// Retry after an exponentially growing, jittered delay
    Backoff {
        initial_ms: u32,
        max_ms: u32,
        multiplier: f32,
        /// Fraction of the delay randomized either way (0.0 - 1.0)
        jitter: f32,
    },
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::Backoff {
            initial_ms: 250,
            max_ms: 8000,
            multiplier: 2.0,
            jitter: 0.25,
        }
    }
}

/// Endpoint and gameplay tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Minion authority base URL (no trailing slash needed)
    pub base_url: String,

    // === Slots ===
    /// Pooled minion slots (OBJ_COUNT)
    pub slot_count: usize,
    /// Server units → world units (UNIT_SCALE)
    pub unit_scale: f32,
    /// Turn slots to face the arena center
    pub face_center: bool,

    // === Hit detection ===
    pub hand_radius: f32,
    pub minion_radius: f32,
    /// Height above the ground plane that still counts as striking
    pub hit_margin: f32,

    // === Feedback ===
    pub status_reset_ms: u32,
    pub hint_delay_ms: u32,

    // === Network ===
    pub retry: RetryPolicy,
    /// Seed for retry jitter
    pub rng_seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000".to_string(),

            slot_count: OBJ_COUNT,
            unit_scale: UNIT_SCALE,
            face_center: true,

            hand_radius: HAND_RADIUS,
            minion_radius: MINION_RADIUS,
            hit_margin: HIT_MARGIN,

            status_reset_ms: STATUS_RESET_MS,
            hint_delay_ms: HINT_DELAY_MS,

            retry: RetryPolicy::default(),
            rng_seed: 0x5eed,
        }
    }
}

impl Settings {
    /// LocalStorage key / native env var
    const STORAGE_KEY: &'static str = "minion_hammer_settings";
    #[allow(dead_code)]
    const CONFIG_ENV: &'static str = "MINION_HAMMER_CONFIG";

    /// Parse and validate settings JSON
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> SettingsError {
            SettingsError::Invalid {
                field,
                reason: reason.into(),
            }
        }

        if self.base_url.trim().is_empty() {
            return Err(invalid("base_url", "must not be empty"));
        }
        Endpoint::new(&self.base_url)?;
        if !(self.unit_scale.is_finite() && self.unit_scale > 0.0) {
            return Err(invalid("unit_scale", "must be a positive number"));
        }
        if !(self.hand_radius >= 0.0) {
            return Err(invalid("hand_radius", "must not be negative"));
        }
        if !(self.minion_radius >= 0.0) {
            return Err(invalid("minion_radius", "must not be negative"));
        }
        if !self.hit_margin.is_finite() {
            return Err(invalid("hit_margin", "must be finite"));
        }
        if let RetryPolicy::Backoff {
            initial_ms,
            max_ms,
            multiplier,
            jitter,
        } = self.retry
        {
            if initial_ms == 0 || max_ms < initial_ms {
                return Err(invalid("retry", "need 0 < initial_ms <= max_ms"));
            }
            if multiplier < 1.0 {
                return Err(invalid("retry", "multiplier must be >= 1.0"));
            }
            if !(0.0..=1.0).contains(&jitter) {
                return Err(invalid("retry", "jitter must be within 0.0 - 1.0"));
            }
        }
        Ok(())
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = self.to_json() {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Load settings from the file named by `MINION_HAMMER_CONFIG`
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let Ok(path) = std::env::var(Self::CONFIG_ENV) else {
            log::info!("Using default settings");
            return Self::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path);
                    settings
                }
                Err(e) => {
                    log::warn!("Ignoring {}: {}", path, e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Could not read {}: {}", path, e);
                Self::default()
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        log::debug!("{} is browser-only; not saving", Self::STORAGE_KEY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let s = Settings::from_json(r#"{"base_url":"https://minions.test","slot_count":3}"#).unwrap();
        assert_eq!(s.base_url, "https://minions.test");
        assert_eq!(s.slot_count, 3);
        assert_eq!(s.hand_radius, HAND_RADIUS);
        assert_eq!(s.retry, RetryPolicy::default());
    }

    #[test]
    fn test_stop_policy_parses() {
        let s = Settings::from_json(r#"{"retry":{"mode":"stop"}}"#).unwrap();
        assert_eq!(s.retry, RetryPolicy::Stop);
    }

    #[test]
    fn test_rejects_bad_scale() {
        let err = Settings::from_json(r#"{"unit_scale":0}"#).unwrap_err();
        assert!(matches!(err, SettingsError::Invalid { field: "unit_scale", .. }));
    }

    #[test]
    fn test_negative_radius_names_its_field() {
        let err = Settings::from_json(r#"{"minion_radius":-0.1}"#).unwrap_err();
        assert!(matches!(err, SettingsError::Invalid { field: "minion_radius", .. }));
        let err = Settings::from_json(r#"{"hand_radius":-0.1}"#).unwrap_err();
        assert!(matches!(err, SettingsError::Invalid { field: "hand_radius", .. }));
    }

    #[test]
    fn test_rejects_unusable_base_url() {
        let err = Settings::from_json(r#"{"base_url":"not a url"}"#).unwrap_err();
        assert!(matches!(err, SettingsError::BaseUrl(_)));
        let err = Settings::from_json(r#"{"base_url":"ws://minions.test"}"#).unwrap_err();
        assert!(matches!(
            err,
            SettingsError::BaseUrl(UriError::UnknownUriScheme { .. })
        ));
    }

    #[test]
    fn test_rejects_bad_backoff() {
        let json = r#"{"retry":{"mode":"backoff","initial_ms":500,"max_ms":100,"multiplier":2.0,"jitter":0.1}}"#;
        assert!(Settings::from_json(json).is_err());
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            Settings::from_json("{not json"),
            Err(SettingsError::Parse(_))
        ));
    }

    #[test]
    fn test_json_roundtrip_preserves_policy() {
        let mut s = Settings::default();
        s.retry = RetryPolicy::Stop;
        let back = Settings::from_json(&s.to_json().unwrap()).unwrap();
        assert_eq!(back, s);
    }
}
