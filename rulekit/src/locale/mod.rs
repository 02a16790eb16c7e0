//! Locale scoping for tests
//!
//! Rust has no runtime-wide default locale, so rulekit keeps one: a
//! process-wide [`Locale`] that locale-aware helpers such as
//! [`NumberFormat::number_instance`] read. [`LocaleRule`] swaps it for the
//! duration of a test and puts the previous one back afterwards.
//!
//! The default is shared by every thread in the process. Tests that change
//! it must not run alongside tests that read it.

pub mod format;

pub use format::NumberFormat;

use crate::error::{Result, RuleError};
use crate::lifecycle::InitializationRule;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use std::sync::{Mutex, PoisonError, RwLock};
use tracing::debug;

static DEFAULT_LOCALE: Lazy<RwLock<Locale>> = Lazy::new(|| RwLock::new(Locale::from_env()));

/// A language with an optional country, e.g. `de` or `de-DE`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Locale {
    language: Cow<'static, str>,
    country: Option<Cow<'static, str>>,
}

impl Locale {
    pub const ENGLISH: Locale = Locale::language_only("en");
    pub const GERMAN: Locale = Locale::language_only("de");
    pub const FRENCH: Locale = Locale::language_only("fr");
    pub const ITALIAN: Locale = Locale::language_only("it");
    pub const US: Locale = Locale::with_country("en", "US");
    pub const UK: Locale = Locale::with_country("en", "GB");
    pub const GERMANY: Locale = Locale::with_country("de", "DE");
    pub const FRANCE: Locale = Locale::with_country("fr", "FR");

    const fn language_only(language: &'static str) -> Self {
        Self {
            language: Cow::Borrowed(language),
            country: None,
        }
    }

    const fn with_country(language: &'static str, country: &'static str) -> Self {
        Self {
            language: Cow::Borrowed(language),
            country: Some(Cow::Borrowed(country)),
        }
    }

    pub fn new(language: &str, country: Option<&str>) -> Result<Self> {
        let language = language.trim().to_ascii_lowercase();
        if !(2..=3).contains(&language.len())
            || !language.chars().all(|c| c.is_ascii_alphabetic())
        {
            return Err(RuleError::Configuration(format!(
                "invalid locale language: {language:?}"
            )));
        }

        let country = match country.map(|c| c.trim().to_ascii_uppercase()) {
            Some(c) if c.len() == 2 && c.chars().all(|ch| ch.is_ascii_alphabetic()) => Some(c),
            Some(c) if c.is_empty() => None,
            Some(c) => {
                return Err(RuleError::Configuration(format!(
                    "invalid locale country: {c:?}"
                )));
            }
            None => None,
        };

        Ok(Self {
            language: Cow::Owned(language),
            country: country.map(Cow::Owned),
        })
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    /// Language tag such as `de-DE`
    pub fn tag(&self) -> String {
        match &self.country {
            Some(country) => format!("{}-{}", self.language, country),
            None => self.language.to_string(),
        }
    }

    /// The process-wide default locale
    pub fn current() -> Locale {
        DEFAULT_LOCALE
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the process-wide default, returning the previous one
    pub fn set_default(locale: Locale) -> Locale {
        let mut current = DEFAULT_LOCALE.write().unwrap_or_else(PoisonError::into_inner);
        debug!("default locale {} -> {}", current, locale);
        std::mem::replace(&mut *current, locale)
    }

    /// Initial default, read from `LC_ALL`, `LC_NUMERIC` or `LANG`
    fn from_env() -> Locale {
        ["LC_ALL", "LC_NUMERIC", "LANG"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find_map(|value| {
                // `de_DE.UTF-8@euro` -> `de_DE`
                let base = value.split(['.', '@']).next().unwrap_or_default();
                match base {
                    "" | "C" | "POSIX" => None,
                    other => other.parse().ok(),
                }
            })
            .unwrap_or(Locale::US)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag())
    }
}

impl FromStr for Locale {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.trim().splitn(2, ['-', '_']);
        let language = parts.next().unwrap_or_default();
        Locale::new(language, parts.next())
    }
}

impl From<Locale> for String {
    fn from(locale: Locale) -> Self {
        locale.tag()
    }
}

impl TryFrom<String> for Locale {
    type Error = RuleError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// Runs a test with a specific default locale
///
/// The default in place when the test starts is saved in `before` and
/// restored in `after`, which also runs for failed tests.
pub struct LocaleRule {
    locale: Locale,
    saved: Mutex<Option<Locale>>,
}

impl LocaleRule {
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            saved: Mutex::new(None),
        }
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }
}

impl InitializationRule for LocaleRule {
    fn before(&self) -> Result<()> {
        let previous = Locale::set_default(self.locale.clone());
        *self.saved.lock().unwrap_or_else(PoisonError::into_inner) = Some(previous);
        Ok(())
    }

    fn after(&self) -> Result<()> {
        let saved = self.saved.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(previous) = saved {
            Locale::set_default(previous);
        }
        Ok(())
    }
}

/// Serializes tests that touch the process-wide default locale
#[cfg(test)]
pub(crate) static TEST_LOCK: Mutex<()> = Mutex::new(());
