//! Equality contract verification
//!
//! Checks that a type's equality behaves like an equivalence relation and
//! agrees with its hash. Types describe their equality through an
//! [`EqualityProfile`] instead of runtime reflection: the profile says
//! whether the type supplies its own equality and hash, and how to compute
//! them. A type that supplies neither falls back to identity, comparing
//! addresses.

pub mod checker;
pub mod rule;

pub use checker::EqualsContractChecker;
pub use rule::FulfillEqualsContractRule;

use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Laws an equality implementation must satisfy, in checking order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EqualityLaw {
    /// Supplying equality requires supplying a hash
    HashPresence,
    Reflexivity,
    Symmetry,
    Transitivity,
    Consistency,
    NullComparison,
    HashAgreement,
}

impl EqualityLaw {
    pub fn all() -> [EqualityLaw; 7] {
        [
            EqualityLaw::HashPresence,
            EqualityLaw::Reflexivity,
            EqualityLaw::Symmetry,
            EqualityLaw::Transitivity,
            EqualityLaw::Consistency,
            EqualityLaw::NullComparison,
            EqualityLaw::HashAgreement,
        ]
    }

    /// Fixed failure message for the law
    pub fn message(&self) -> &'static str {
        match self {
            EqualityLaw::HashPresence => "implements equals but hash_code isn't present",
            EqualityLaw::Reflexivity => "x.equals(x) should be true",
            EqualityLaw::Symmetry => "x.equals(y) and y.equals(x) should give same result",
            EqualityLaw::Transitivity => concat!(
                "if x.equals(y) returns true and y.equals(z) returns true, ",
                "then x.equals(z) should return true"
            ),
            EqualityLaw::Consistency => concat!(
                "multiple invocations of x.equals(y) consistently return true ",
                "or consistently return false"
            ),
            EqualityLaw::NullComparison => "x.equals(null) should return false",
            EqualityLaw::HashAgreement => "equal objects must produce the same hash code",
        }
    }
}

impl fmt::Display for EqualityLaw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

type EqualsFn<T> = Arc<dyn Fn(&T, Option<&T>) -> bool + Send + Sync>;
type HashFn<T> = Arc<dyn Fn(&T) -> u64 + Send + Sync>;

/// How a type compares and hashes its values
///
/// The `other` side of equality is optional so the null comparison can be
/// expressed.
pub struct EqualityProfile<T> {
    equals: Option<EqualsFn<T>>,
    hash: Option<HashFn<T>>,
}

impl<T> Clone for EqualityProfile<T> {
    fn clone(&self) -> Self {
        Self {
            equals: self.equals.clone(),
            hash: self.hash.clone(),
        }
    }
}

impl<T> fmt::Debug for EqualityProfile<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EqualityProfile")
            .field("overrides_equals", &self.overrides_equals())
            .field("overrides_hash_code", &self.overrides_hash_code())
            .finish()
    }
}

impl<T: 'static> EqualityProfile<T> {
    /// Neither equality nor hash supplied: both go by address
    pub fn identity() -> Self {
        Self {
            equals: None,
            hash: None,
        }
    }

    pub fn equals<F>(mut self, equals: F) -> Self
    where
        F: Fn(&T, Option<&T>) -> bool + Send + Sync + 'static,
    {
        self.equals = Some(Arc::new(equals));
        self
    }

    pub fn hash_code<F>(mut self, hash: F) -> Self
    where
        F: Fn(&T) -> u64 + Send + Sync + 'static,
    {
        self.hash = Some(Arc::new(hash));
        self
    }
}

impl<T> EqualityProfile<T> {
    pub fn overrides_equals(&self) -> bool {
        self.equals.is_some()
    }

    pub fn overrides_hash_code(&self) -> bool {
        self.hash.is_some()
    }

    pub fn is_equal(&self, x: &T, other: Option<&T>) -> bool {
        match &self.equals {
            Some(equals) => equals(x, other),
            None => other.is_some_and(|y| std::ptr::eq(x, y)),
        }
    }

    pub fn hash_of(&self, x: &T) -> u64 {
        match &self.hash {
            Some(hash) => hash(x),
            None => x as *const T as usize as u64,
        }
    }
}

impl<T: PartialEq + 'static> EqualityProfile<T> {
    /// `PartialEq` with no hash, which breaks hash presence
    pub fn partial_eq_only() -> Self {
        Self::identity().equals(|x, other| other.is_some_and(|y| x == y))
    }
}

impl<T: PartialEq + Hash + 'static> EqualityProfile<T> {
    /// `PartialEq` and `Hash` as derived or implemented by the type
    pub fn derived() -> Self {
        Self::partial_eq_only().hash_code(|x| {
            let mut hasher = DefaultHasher::new();
            x.hash(&mut hasher);
            hasher.finish()
        })
    }
}

/// Types that describe their own equality for contract checking
pub trait Comparable: Sized + 'static {
    fn equality() -> EqualityProfile<Self>;
}
