//! Getter/setter round-trip checking
//!
//! A type lists its accessor pairs explicitly through [`Accessible`] or by
//! handing [`AccessorPair`]s to the checker. Each pair knows how to produce a
//! representative value for its field, which the checker sets and reads
//! back.

pub mod checker;
pub mod rule;

pub use checker::{AccessorReport, PropertyChecker};
pub use rule::GetterSetterRule;

use accessor_naming::convention;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Broad category of an accessor's value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    PrimitiveNumeric,
    BoxedNumeric,
    String,
    Boolean,
    Collection,
    Enum,
    Object,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::PrimitiveNumeric => "primitive numeric",
            ValueKind::BoxedNumeric => "boxed numeric",
            ValueKind::String => "string",
            ValueKind::Boolean => "boolean",
            ValueKind::Collection => "collection",
            ValueKind::Enum => "enum",
            ValueKind::Object => "object",
        };
        f.write_str(name)
    }
}

/// A type that can produce a representative non-default value
pub trait SampleValue: Sized {
    const KIND: ValueKind;

    /// `None` when no value can be built; the accessor is then skipped
    fn sample() -> Option<Self>;
}

macro_rules! numeric_sample {
    ($value:expr => $($ty:ty),+) => {
        $(
            impl SampleValue for $ty {
                const KIND: ValueKind = ValueKind::PrimitiveNumeric;

                fn sample() -> Option<Self> {
                    Some($value)
                }
            }
        )+
    };
}

numeric_sample!(5 => i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
numeric_sample!(5.5 => f32, f64);

impl SampleValue for bool {
    const KIND: ValueKind = ValueKind::Boolean;

    fn sample() -> Option<Self> {
        Some(true)
    }
}

impl SampleValue for String {
    const KIND: ValueKind = ValueKind::String;

    fn sample() -> Option<Self> {
        Some("rulekit".to_string())
    }
}

impl SampleValue for char {
    const KIND: ValueKind = ValueKind::String;

    fn sample() -> Option<Self> {
        Some('r')
    }
}

impl<T: SampleValue> SampleValue for Option<T> {
    const KIND: ValueKind = match T::KIND {
        ValueKind::PrimitiveNumeric => ValueKind::BoxedNumeric,
        other => other,
    };

    fn sample() -> Option<Self> {
        T::sample().map(Some)
    }
}

impl<T: SampleValue> SampleValue for Vec<T> {
    const KIND: ValueKind = ValueKind::Collection;

    fn sample() -> Option<Self> {
        T::sample().map(|value| vec![value])
    }
}

enum Outcome {
    Matched,
    Mismatch { expected: String, actual: String },
    NoSample,
}

type Exercise<T> = Box<dyn Fn(&mut T) -> Outcome + Send + Sync>;

/// A field with its getter and setter
pub struct AccessorPair<T> {
    field: String,
    kind: ValueKind,
    exercise: Exercise<T>,
}

impl<T: 'static> AccessorPair<T> {
    /// Pair whose value type knows its own sample
    pub fn new<V, G, S>(field: impl Into<String>, getter: G, setter: S) -> Self
    where
        V: SampleValue + PartialEq + fmt::Debug + Clone + 'static,
        G: Fn(&T) -> V + Send + Sync + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        Self::with_sample(field, V::KIND, getter, setter, V::sample)
    }

    /// Pair for an arbitrary object, sampled with `V::default()`
    pub fn object<V, G, S>(field: impl Into<String>, getter: G, setter: S) -> Self
    where
        V: Default + PartialEq + fmt::Debug + Clone + 'static,
        G: Fn(&T) -> V + Send + Sync + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        Self::with_sample(field, ValueKind::Object, getter, setter, || Some(V::default()))
    }

    /// Pair for an enum field, sampled with the given variant
    pub fn enumeration<V, G, S>(field: impl Into<String>, getter: G, setter: S, variant: V) -> Self
    where
        V: PartialEq + fmt::Debug + Clone + Send + Sync + 'static,
        G: Fn(&T) -> V + Send + Sync + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        Self::with_sample(field, ValueKind::Enum, getter, setter, move || Some(variant.clone()))
    }

    pub fn with_sample<V, G, S, P>(
        field: impl Into<String>,
        kind: ValueKind,
        getter: G,
        setter: S,
        sample: P,
    ) -> Self
    where
        V: PartialEq + fmt::Debug + Clone + 'static,
        G: Fn(&T) -> V + Send + Sync + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
        P: Fn() -> Option<V> + Send + Sync + 'static,
    {
        let exercise = move |target: &mut T| {
            let Some(expected) = sample() else {
                return Outcome::NoSample;
            };

            setter(target, expected.clone());
            let actual = getter(target);

            if actual == expected {
                Outcome::Matched
            } else {
                Outcome::Mismatch {
                    expected: format!("{expected:?}"),
                    actual: format!("{actual:?}"),
                }
            }
        };

        Self {
            field: field.into(),
            kind,
            exercise: Box::new(exercise),
        }
    }
}

impl<T> AccessorPair<T> {
    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// `is_<field>` for booleans, `get_<field>` otherwise
    pub fn getter_name(&self) -> String {
        convention::getter_name(&self.field, self.kind == ValueKind::Boolean)
    }

    pub fn setter_name(&self) -> String {
        convention::setter_name(&self.field)
    }

    fn exercise(&self, target: &mut T) -> Outcome {
        (self.exercise)(target)
    }
}

impl<T> fmt::Debug for AccessorPair<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessorPair")
            .field("field", &self.field)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Types that list their getter/setter pairs
///
/// Read-only fields are left out.
pub trait Accessible: Sized + 'static {
    fn accessors() -> Vec<AccessorPair<Self>>;
}
