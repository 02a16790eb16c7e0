//! Rulekit: reusable test rules
//!
//! Each rule wraps a test body ([`Statement`]) with extra checks or setup:
//!
//! - [`FulfillEqualsContractRule`] checks that a type's equality and hash
//!   functions obey the equality contract
//! - [`InvariantRule`] fails a test class that leaves a declared invariant
//!   without a live test
//! - [`GetterSetterRule`] sets a sample value through each setter and reads
//!   it back through the matching getter
//! - [`LocaleRule`], [`RetryRule`] and [`ConcurrentRule`] scope the default
//!   locale, retry a flaky body and run a body on several threads at once
//!
//! Rules compose with [`RuleChain`] and read their settings from
//! [`RulesConfig`].

pub mod accessors;
pub mod config;
pub mod contract;
pub mod error;
pub mod invariants;
pub mod lifecycle;
pub mod locale;

#[cfg(feature = "tracing-subscriber")]
pub mod logging;

pub use accessors::{
    AccessorPair, AccessorReport, Accessible, GetterSetterRule, PropertyChecker, SampleValue,
    ValueKind,
};
pub use config::RulesConfig;
pub use contract::{
    Comparable, EqualityLaw, EqualityProfile, EqualsContractChecker, FulfillEqualsContractRule,
};
pub use error::{Result, RuleError, fail};
pub use invariants::{
    CoverageReport, CoverageTracker, InvariantDeclaration, InvariantRule, Invariants,
};
pub use lifecycle::{
    ConcurrentRule, Description, InitializationRule, RetryRule, RuleChain, Statement, TestClass,
    TestMethod, TestRule,
};
pub use locale::{Locale, LocaleRule, NumberFormat};
