use crate::store::KeyValueStore;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const CONFIG_KEY: &str = "opencrm_config";

pub const DEFAULT_APP_NAME: &str = "OpenCRM";
pub const DEFAULT_PRIMARY_COLOR: &str = "#0ea5e9";
pub const DEFAULT_FONT_FAMILY: &str = "Inter";
pub const DEFAULT_STORAGE_TYPE: &str = "local";

pub const SUPPORTED_FONTS: [&str; 6] = [
    "Inter",
    "Roboto",
    "Open Sans",
    "Lato",
    "Montserrat",
    "Poppins",
];

pub fn is_supported_font(font: &str) -> bool {
    SUPPORTED_FONTS.contains(&font)
}

/// Settings this crate does not interpret (SMTP, invoice layout, ...). They
/// travel with the config and round-trip unchanged.
pub type Extra = BTreeMap<String, serde_json::Value>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    app_name: String,
    primary_color: String,
    font_family: String,
    dark_mode: bool,
    storage_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    ai_provider: Option<String>,
    #[serde(flatten)]
    extra: Extra,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_string(),
            primary_color: DEFAULT_PRIMARY_COLOR.to_string(),
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            dark_mode: false,
            storage_type: DEFAULT_STORAGE_TYPE.to_string(),
            ai_provider: None,
            extra: Extra::default(),
        }
    }
}

impl AppConfig {
    pub fn app_name(&self) -> String {
        self.app_name.clone()
    }

    pub fn primary_color(&self) -> String {
        self.primary_color.clone()
    }

    pub fn font_family(&self) -> String {
        self.font_family.clone()
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub fn storage_type(&self) -> String {
        self.storage_type.clone()
    }

    pub fn ai_provider(&self) -> Option<String> {
        self.ai_provider.clone()
    }

    pub fn extra(&self) -> &Extra {
        &self.extra
    }

    /// Letter shown in place of a missing logo.
    pub fn initial(&self) -> Option<char> {
        self.app_name
            .trim()
            .chars()
            .next()
            .map(|c| c.to_ascii_uppercase())
    }

    /// Shallow merge: every field present in the patch replaces ours, extra
    /// keys are replaced one by one.
    pub fn merge(mut self, patch: ConfigPatch) -> Self {
        if let Some(app_name) = patch.app_name {
            self.app_name = app_name;
        }

        if let Some(primary_color) = patch.primary_color {
            self.primary_color = primary_color;
        }

        if let Some(font_family) = patch.font_family {
            self.font_family = font_family;
        }

        if let Some(dark_mode) = patch.dark_mode {
            self.dark_mode = dark_mode;
        }

        if let Some(storage_type) = patch.storage_type {
            self.storage_type = storage_type;
        }

        if patch.ai_provider.is_some() {
            self.ai_provider = patch.ai_provider;
        }

        self.extra.extend(patch.extra);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConfigPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dark_mode: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_provider: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// The current [`AppConfig`] and the store it persists to. Every update
/// rewrites the whole blob under [`CONFIG_KEY`].
#[derive(Debug)]
pub struct ConfigStore<S: KeyValueStore> {
    store: S,
    current: AppConfig,
}

impl<S: KeyValueStore> ConfigStore<S> {
    pub fn open(store: S) -> Self {
        let current = load_config(&store);
        Self { store, current }
    }

    pub fn current(&self) -> &AppConfig {
        &self.current
    }

    /// Reads the persisted config again, as a fresh session would.
    pub fn load(&self) -> AppConfig {
        load_config(&self.store)
    }

    pub fn update(&mut self, patch: ConfigPatch) -> Result<AppConfig> {
        let merged = self.current.clone().merge(patch);
        self.store.set(CONFIG_KEY, &serde_json::to_string(&merged)?)?;
        log::debug!("persisted config under {}", CONFIG_KEY);

        self.current = merged;
        Ok(self.current.clone())
    }

    pub fn reset(&mut self) -> Result<AppConfig> {
        self.store.remove(CONFIG_KEY)?;
        log::debug!("removed {}", CONFIG_KEY);

        self.current = AppConfig::default();
        Ok(self.current.clone())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }
}

/// Never fails: a missing, unreadable or malformed blob yields the default.
pub fn load_config(store: &impl KeyValueStore) -> AppConfig {
    let blob = match store.get(CONFIG_KEY) {
        Ok(Some(blob)) => blob,
        Ok(None) => return AppConfig::default(),
        Err(e) => {
            log::warn!("could not read {}: {}", CONFIG_KEY, e);
            return AppConfig::default();
        }
    };

    match serde_json::from_str(&blob) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("stored config is corrupt, using defaults: {}", e);
            AppConfig::default()
        }
    }
}
