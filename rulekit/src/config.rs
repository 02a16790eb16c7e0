//! Rule configuration loaded from TOML

use crate::accessors::{GetterSetterRule, PropertyChecker};
use crate::error::{Result, RuleError};
use crate::lifecycle::{ConcurrentRule, RetryRule};
use crate::locale::{Locale, LocaleRule};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Settings shared by the rules of a test suite
///
/// ```toml
/// locale = "de-DE"
///
/// [accessors]
/// excluded = ["ignored"]
/// verbose = true
///
/// [retry]
/// attempts = 5
///
/// [concurrency]
/// default_degree = 4
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<Locale>,
    pub accessors: AccessorConfig,
    pub retry: RetryConfig,
    pub concurrency: ConcurrencyConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessorConfig {
    /// Fields, or accessor names, to leave unchecked
    pub excluded: Vec<String>,
    pub verbose: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub attempts: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { attempts: 3 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConcurrencyConfig {
    /// Used for tests that carry no degree of their own
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_degree: Option<usize>,
}

impl RulesConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| RuleError::Configuration(format!("failed to parse rules config: {e}")))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            RuleError::Configuration(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Load from `path`, falling back to defaults when the file is missing
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            debug!("{} not found, using default rules config", path.display());
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                RuleError::Configuration(format!("failed to create {}: {e}", parent.display()))
            })?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            RuleError::Configuration(format!("failed to serialize rules config: {e}"))
        })?;

        fs::write(path, content).map_err(|e| {
            RuleError::Configuration(format!("failed to write {}: {e}", path.display()))
        })
    }

    pub fn retry_rule(&self) -> RetryRule {
        RetryRule::new(self.retry.attempts)
    }

    pub fn concurrent_rule(&self) -> ConcurrentRule {
        match self.concurrency.default_degree {
            Some(degree) => ConcurrentRule::with_degree(degree),
            None => ConcurrentRule::new(),
        }
    }

    /// `None` when no locale is configured
    pub fn locale_rule(&self) -> Option<LocaleRule> {
        self.locale.clone().map(LocaleRule::new)
    }

    /// Add the configured exclusions and verbosity to an accessor checker
    pub fn configure<T>(&self, checker: &mut PropertyChecker<T>) {
        for name in &self.accessors.excluded {
            checker.add_exclusion(name);
        }
        checker.set_verbose(self.accessors.verbose);
    }

    pub fn apply_to<T>(&self, rule: &mut GetterSetterRule<T>) {
        self.configure(rule.checker_mut());
    }
}
