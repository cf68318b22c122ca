//! Value-range and size constraints attached to a type model

use serde::{Deserialize, Serialize};
use std::fmt;

/// Permitted value range of an INTEGER type
///
/// `min`/`max` of `None` mean the bound is absent. A range with both bounds is
/// "constrained", a range with only `min` is "semi-constrained", and a range
/// without `min` is "unconstrained" for PER purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ValueRange {
    #[serde(default)]
    pub min: Option<i64>,
    #[serde(default)]
    pub max: Option<i64>,
    /// Whether the range carries an extension marker (`(lb..ub, ...)`)
    #[serde(default)]
    pub extensible: bool,
}

impl ValueRange {
    /// No bounds at all
    pub const UNCONSTRAINED: ValueRange = ValueRange {
        min: None,
        max: None,
        extensible: false,
    };

    /// A fully constrained range `min..=max`
    pub const fn new(min: i64, max: i64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            extensible: false,
        }
    }

    /// A semi-constrained range `min..MAX`
    pub const fn at_least(min: i64) -> Self {
        Self {
            min: Some(min),
            max: None,
            extensible: false,
        }
    }

    /// Mark the range as extensible
    pub const fn extensible(mut self) -> Self {
        self.extensible = true;
        self
    }

    /// Whether the value lies inside the root range
    pub fn contains(&self, value: i64) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }

    /// Both bounds, when the range is fully constrained
    pub fn bounds(&self) -> Option<(i64, i64)> {
        match (self.min, self.max) {
            (Some(min), Some(max)) => Some((min, max)),
            _ => None,
        }
    }

    pub(crate) fn is_well_formed(&self) -> bool {
        self.bounds().is_none_or(|(min, max)| min <= max)
    }
}

impl fmt::Display for ValueRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.min {
            Some(min) => write!(f, "{}", min)?,
            None => f.write_str("MIN")?,
        }
        f.write_str("..")?;
        match self.max {
            Some(max) => write!(f, "{}", max)?,
            None => f.write_str("MAX")?,
        }
        if self.extensible {
            f.write_str(", ...")?;
        }
        Ok(())
    }
}

/// SIZE constraint of a string or SEQUENCE OF type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SizeConstraint {
    #[serde(default)]
    pub min: usize,
    #[serde(default)]
    pub max: Option<usize>,
    #[serde(default)]
    pub extensible: bool,
}

impl Default for SizeConstraint {
    fn default() -> Self {
        Self::UNCONSTRAINED
    }
}

impl SizeConstraint {
    /// `SIZE(0..MAX)`, i.e. no constraint
    pub const UNCONSTRAINED: SizeConstraint = SizeConstraint {
        min: 0,
        max: None,
        extensible: false,
    };

    /// `SIZE(n)`
    pub const fn fixed(size: usize) -> Self {
        Self {
            min: size,
            max: Some(size),
            extensible: false,
        }
    }

    /// `SIZE(min..max)`
    pub const fn range(min: usize, max: usize) -> Self {
        Self {
            min,
            max: Some(max),
            extensible: false,
        }
    }

    /// Mark the constraint as extensible
    pub const fn extensible(mut self) -> Self {
        self.extensible = true;
        self
    }

    /// Whether a length satisfies the root constraint
    pub fn contains(&self, len: usize) -> bool {
        len >= self.min && self.max.is_none_or(|max| len <= max)
    }

    /// The fixed size, if the constraint admits exactly one length
    pub fn fixed_size(&self) -> Option<usize> {
        match self.max {
            Some(max) if max == self.min => Some(max),
            _ => None,
        }
    }

    pub(crate) fn is_well_formed(&self) -> bool {
        self.max.is_none_or(|max| self.min <= max)
    }
}

impl fmt::Display for SizeConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.fixed_size(), self.max) {
            (Some(size), _) => write!(f, "SIZE({})", size)?,
            (None, Some(max)) => write!(f, "SIZE({}..{})", self.min, max)?,
            (None, None) => write!(f, "SIZE({}..MAX)", self.min)?,
        }
        if self.extensible {
            f.write_str(" ...")?;
        }
        Ok(())
    }
}
