use std::fmt;
use std::str::FromStr;

use crate::error::{validation_error, KernelError};

/// The optimisation levels every kernel family is built at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    /// Sequential triple loop, the ground truth.
    Reference,
    /// Reduction loop unrolled by four with a scalar tail.
    Unrolled,
    /// Four-lane vector batches over contiguous rows.
    Vectorized,
    /// Parallel scalar loop. Only SYRK reports this one.
    CombinedSimple,
    /// Vector batches with the reduction unrolled by four.
    Combined,
}

impl Variant {
    /// Variants shared by all three families, in report order.
    pub const COMMON: [Variant; 4] = [
        Variant::Reference,
        Variant::Unrolled,
        Variant::Vectorized,
        Variant::Combined,
    ];

    /// Every variant, in dispatch order.
    pub const ALL: [Variant; 5] = [
        Variant::Reference,
        Variant::Unrolled,
        Variant::Vectorized,
        Variant::CombinedSimple,
        Variant::Combined,
    ];

    /// SYRK report order.
    pub const SYRK: [Variant; 5] = [
        Variant::Reference,
        Variant::Unrolled,
        Variant::Vectorized,
        Variant::CombinedSimple,
        Variant::Combined,
    ];

    /// Label printed in timing reports.
    pub fn label(self) -> &'static str {
        match self {
            Variant::Reference => "naive",
            Variant::Unrolled => "unrolled",
            Variant::Vectorized => "vectorized",
            Variant::CombinedSimple => "comb_simple",
            Variant::Combined => "combined",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Variant {
    type Err = KernelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "naive" | "reference" => Ok(Variant::Reference),
            "unrolled" => Ok(Variant::Unrolled),
            "vectorized" => Ok(Variant::Vectorized),
            "comb_simple" => Ok(Variant::CombinedSimple),
            "combined" => Ok(Variant::Combined),
            other => Err(validation_error(format!("unknown variant '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_roundtrip() {
        for v in Variant::ALL {
            assert_eq!(v.label().parse::<Variant>().unwrap(), v);
        }
        assert_eq!("reference".parse::<Variant>().unwrap(), Variant::Reference);
    }

    #[test]
    fn test_report_sets_are_subsets_of_all() {
        assert!(Variant::COMMON.iter().all(|v| Variant::ALL.contains(v)));
        assert!(Variant::SYRK.iter().all(|v| Variant::ALL.contains(v)));
        assert!(!Variant::COMMON.contains(&Variant::CombinedSimple));
    }

    #[test]
    fn test_unknown_label() {
        assert!("blocked".parse::<Variant>().is_err());
    }
}
