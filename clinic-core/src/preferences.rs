//! Persisted UI preferences. Only the display language is stored.

use std::collections::HashMap;

use crate::models::coded_enum;
use crate::ClinicError;

/// Storage key of the saved language code.
pub const LANGUAGE_KEY: &str = "clinicLanguage";

coded_enum! {
    Language {
        English => ("en", "English"),
        Japanese => ("ja", "日本語"),
        Korean => ("ko", "한국어"),
        Chinese => ("zh", "中文"),
        Vietnamese => ("vi", "Tiếng Việt"),
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::Japanese
    }
}

impl Language {
    pub fn flag(self) -> &'static str {
        match self {
            Language::English => "🇺🇸",
            Language::Japanese => "🇯🇵",
            Language::Korean => "🇰🇷",
            Language::Chinese => "🇨🇳",
            Language::Vietnamese => "🇻🇳",
        }
    }
}

/// Key-value storage for short preference strings (browser local storage,
/// a file, memory).
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), ClinicError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryPreferenceStore {
    values: HashMap<String, String>,
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), ClinicError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Saved language, or `fallback` when nothing (or an unknown code) is stored.
pub fn load_language(store: &dyn PreferenceStore, fallback: Language) -> Language {
    match store.get(LANGUAGE_KEY) {
        Some(code) => Language::from_code(code.trim()).unwrap_or_else(|| {
            tracing::warn!(code = %code, "unknown saved language, using fallback");
            fallback
        }),
        None => fallback,
    }
}

pub fn save_language(
    store: &mut dyn PreferenceStore,
    language: Language,
) -> Result<(), ClinicError> {
    store.set(LANGUAGE_KEY, language.as_code())
}
