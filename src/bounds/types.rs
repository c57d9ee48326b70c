//! Bound result types.

use std::fmt;

/// Feasible birth-year interval of one individual.
///
/// `None` on a side means the individual is unbounded in that direction.
/// Finite sides are inclusive integer years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BirthRange {
    /// Earliest feasible year.
    pub earliest: Option<i64>,
    /// Latest feasible year.
    pub latest: Option<i64>,
}

impl BirthRange {
    /// Creates a range; `None` leaves that side open.
    pub fn new(earliest: Option<i64>, latest: Option<i64>) -> Self {
        Self { earliest, latest }
    }

    /// A closed range `[earliest, latest]`.
    pub fn finite(earliest: i64, latest: i64) -> Self {
        Self::new(Some(earliest), Some(latest))
    }

    /// A range open on both sides.
    pub fn unbounded() -> Self {
        Self::new(None, None)
    }

    /// Both sides finite.
    pub fn is_finite(&self) -> bool {
        self.earliest.is_some() && self.latest.is_some()
    }

    /// `(earliest, latest)` when both sides are finite.
    pub fn as_finite(&self) -> Option<(i64, i64)> {
        self.earliest.zip(self.latest)
    }

    /// Number of years in a finite range; `None` when open or when the
    /// count does not fit in an `i64`.
    pub fn width(&self) -> Option<i64> {
        let (lo, hi) = self.as_finite()?;
        hi.checked_sub(lo)?.checked_add(1)
    }

    /// Whether `year` lies in the range.
    pub fn contains(&self, year: i64) -> bool {
        self.earliest.map_or(true, |lo| year >= lo) && self.latest.map_or(true, |hi| year <= hi)
    }

    /// Whether `self` lies within `other`.
    pub fn is_within(&self, other: &BirthRange) -> bool {
        let lower_ok = match (self.earliest, other.earliest) {
            (_, None) => true,
            (None, Some(_)) => false,
            (Some(a), Some(b)) => a >= b,
        };
        let upper_ok = match (self.latest, other.latest) {
            (_, None) => true,
            (None, Some(_)) => false,
            (Some(a), Some(b)) => a <= b,
        };
        lower_ok && upper_ok
    }
}

impl fmt::Display for BirthRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.earliest {
            Some(lo) => write!(f, "[{lo}, ")?,
            None => f.write_str("(-inf, ")?,
        }
        match self.latest {
            Some(hi) => write!(f, "{hi}]"),
            None => f.write_str("+inf)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finite() {
        let range = BirthRange::finite(348, 442);
        assert!(range.is_finite());
        assert_eq!(range.as_finite(), Some((348, 442)));
        assert_eq!(range.width(), Some(95));
        assert!(range.contains(400));
        assert!(!range.contains(443));
    }

    #[test]
    fn test_half_open() {
        let range = BirthRange::new(Some(100), None);
        assert!(!range.is_finite());
        assert_eq!(range.width(), None);
        assert!(range.contains(10_000));
        assert!(!range.contains(99));
    }

    #[test]
    fn test_width_overflow() {
        assert_eq!(BirthRange::finite(i64::MIN, i64::MAX).width(), None);
        assert_eq!(BirthRange::finite(i64::MIN, -2).width(), Some(i64::MAX));
    }

    #[test]
    fn test_is_within() {
        let outer = BirthRange::new(Some(100), None);
        assert!(BirthRange::finite(120, 150).is_within(&outer));
        assert!(!BirthRange::finite(90, 150).is_within(&outer));
        assert!(!BirthRange::unbounded().is_within(&outer));
        assert!(outer.is_within(&BirthRange::unbounded()));
    }

    #[test]
    fn test_display() {
        assert_eq!(BirthRange::finite(1, 2).to_string(), "[1, 2]");
        assert_eq!(BirthRange::new(None, Some(5)).to_string(), "(-inf, 5]");
        assert_eq!(BirthRange::unbounded().to_string(), "(-inf, +inf)");
    }
}
