use super::{Comparable, EqualityLaw, EqualityProfile};
use crate::error::{Result, RuleError};
use std::sync::Arc;
use tracing::{debug, info};

type Factory<T> = Arc<dyn Fn() -> anyhow::Result<T> + Send + Sync>;

/// Verifies the equality laws of one type
///
/// Every law is checked on freshly constructed instances. The factory is
/// assumed to always produce comparable state, so distinct instances are
/// expected to relate the same way every time.
pub struct EqualsContractChecker<T> {
    type_name: String,
    factory: Factory<T>,
    profile: EqualityProfile<T>,
}

impl<T: Default + 'static> EqualsContractChecker<T> {
    /// Checker constructing samples with `T::default()`
    pub fn new(profile: EqualityProfile<T>) -> Self {
        Self::with_factory(|| Ok(T::default()), profile)
    }
}

impl<T: Comparable + Default> EqualsContractChecker<T> {
    pub fn for_type() -> Self {
        Self::new(T::equality())
    }
}

impl<T: 'static> EqualsContractChecker<T> {
    pub fn with_factory<F>(factory: F, profile: EqualityProfile<T>) -> Self
    where
        F: Fn() -> anyhow::Result<T> + Send + Sync + 'static,
    {
        Self {
            type_name: std::any::type_name::<T>().to_string(),
            factory: Arc::new(factory),
            profile,
        }
    }

    /// Name used in failure messages, the Rust type name by default
    pub fn named(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = type_name.into();
        self
    }
}

impl<T> EqualsContractChecker<T> {
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn profile(&self) -> &EqualityProfile<T> {
        &self.profile
    }

    /// Laws `check` runs, in order
    pub fn laws(&self) -> [EqualityLaw; 7] {
        EqualityLaw::all()
    }

    /// Check every law in order, stopping at the first violation
    pub fn check(&self) -> Result<()> {
        for law in self.laws() {
            self.check_law(law)?;
        }
        debug!("{}: equality contract holds", self.type_name);
        Ok(())
    }

    pub fn check_law(&self, law: EqualityLaw) -> Result<()> {
        info!("{}: {:?} test", self.type_name, law);

        match law {
            EqualityLaw::HashPresence => self.hash_presence(),
            EqualityLaw::Reflexivity => self.reflexivity(),
            EqualityLaw::Symmetry => self.symmetry(),
            EqualityLaw::Transitivity => self.transitivity(),
            EqualityLaw::Consistency => self.consistency(),
            EqualityLaw::NullComparison => self.null_comparison(),
            EqualityLaw::HashAgreement => self.hash_agreement(),
        }
    }

    fn hash_presence(&self) -> Result<()> {
        self.require(
            !self.profile.overrides_equals() || self.profile.overrides_hash_code(),
            EqualityLaw::HashPresence,
        )
    }

    fn reflexivity(&self) -> Result<()> {
        let x = self.instance()?;
        self.require(self.eq(&x, &x), EqualityLaw::Reflexivity)
    }

    fn symmetry(&self) -> Result<()> {
        let x = self.instance()?;
        let y = self.instance()?;
        self.require(self.eq(&x, &y) == self.eq(&y, &x), EqualityLaw::Symmetry)
    }

    /// Only compares the two booleans x~y and y~z: when they agree, x~z must
    /// agree with them too. Weaker than chaining true results.
    fn transitivity(&self) -> Result<()> {
        let x = self.instance()?;
        let y = self.instance()?;
        let z = self.instance()?;

        let first = self.eq(&x, &y);
        let second = self.eq(&y, &z);
        if first == second {
            return self.require(self.eq(&x, &z) == first, EqualityLaw::Transitivity);
        }
        Ok(())
    }

    fn consistency(&self) -> Result<()> {
        let x = self.instance()?;
        let y = self.instance()?;

        let result = self.eq(&x, &y);
        for _ in 0..3 {
            self.require(self.eq(&x, &y) == result, EqualityLaw::Consistency)?;
        }
        Ok(())
    }

    fn null_comparison(&self) -> Result<()> {
        let x = self.instance()?;
        self.require(!self.profile.is_equal(&x, None), EqualityLaw::NullComparison)
    }

    fn hash_agreement(&self) -> Result<()> {
        let x = self.instance()?;
        let y = self.instance()?;

        if self.eq(&x, &y) {
            let agree = self.profile.hash_of(&x) == self.profile.hash_of(&y);
            return self.require(agree, EqualityLaw::HashAgreement);
        }
        Ok(())
    }

    fn eq(&self, x: &T, y: &T) -> bool {
        self.profile.is_equal(x, Some(y))
    }

    fn instance(&self) -> Result<T> {
        (self.factory)().map_err(|e| RuleError::Construction {
            type_name: self.type_name.clone(),
            reason: format!("{e:#}"),
        })
    }

    fn require(&self, holds: bool, law: EqualityLaw) -> Result<()> {
        if holds {
            Ok(())
        } else {
            Err(RuleError::ContractViolation {
                type_name: self.type_name.clone(),
                law,
            })
        }
    }
}
