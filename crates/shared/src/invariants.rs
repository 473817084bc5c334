//! Helpers for carrying validated invariants in the type system.

use std::fmt;

/// Proof wrapper indicating a value has passed schema validation.
///
/// Only the validation engine can mint one, so request builders that accept
/// `Validated<_>` can never be handed raw caller input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validated<T>(T);

impl<T> Validated<T> {
    pub(crate) const fn new(value: T) -> Self {
        Self(value)
    }

    /// Consume and return the inner value.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> std::ops::Deref for Validated<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Out-of-range error for bounded numeric wrappers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundsError<T> {
    /// Raw value provided.
    pub value: T,
    /// Inclusive minimum.
    pub min: T,
    /// Inclusive maximum.
    pub max: T,
}

impl<T: fmt::Display> fmt::Display for BoundsError<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "value {} is outside [{}, {}]",
            self.value, self.min, self.max
        )
    }
}

impl<T: fmt::Debug + fmt::Display> std::error::Error for BoundsError<T> {}

/// Bounded `u64` with const generic limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BoundedU64<const MIN: u64, const MAX: u64>(u64);

impl<const MIN: u64, const MAX: u64> BoundedU64<MIN, MAX> {
    /// Create a bounded value or return a bounds error.
    pub const fn try_new(value: u64) -> Result<Self, BoundsError<u64>> {
        if value < MIN || value > MAX {
            Err(BoundsError {
                value,
                min: MIN,
                max: MAX,
            })
        } else {
            Ok(Self(value))
        }
    }

    /// Return the wrapped value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validated_derefs_to_inner() {
        let validated = Validated::new(vec!["email"]);
        assert_eq!(validated.len(), 1);
        assert_eq!(validated.into_inner(), vec!["email"]);
    }

    #[test]
    fn bounded_u64_rejects_out_of_range() {
        type Timeout = BoundedU64<1_000, 600_000>;

        assert_eq!(Timeout::try_new(30_000).map(Timeout::get), Ok(30_000));
        let error = Timeout::try_new(5).err();
        assert_eq!(
            error,
            Some(BoundsError {
                value: 5,
                min: 1_000,
                max: 600_000
            })
        );
    }
}
