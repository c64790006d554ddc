use std::fmt;

use smallvec::SmallVec;

/// A named breakpoint's width range, expressed in the owning registry's unit.
///
/// `min: None` means the range is open below; `max: f64::INFINITY` means it is
/// open above.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WidthRange {
    pub min: Option<f64>,
    pub max: f64,
}

impl WidthRange {
    pub fn new(min: f64, max: f64) -> WidthRange {
        WidthRange {
            min: Some(min),
            max,
        }
    }

    /// A range with no lower bound.
    pub fn up_to(max: f64) -> WidthRange {
        WidthRange { min: None, max }
    }

    /// A range with no upper bound.
    pub fn at_least(min: f64) -> WidthRange {
        WidthRange {
            min: Some(min),
            max: f64::INFINITY,
        }
    }

    pub fn contains(&self, width: f64) -> bool {
        self.min.map_or(true, |min| width >= min) && width <= self.max
    }
}

/// A viewport-width condition: the logical OR of one or more [`WidthRange`]s.
///
/// A plain breakpoint holds a single range; a union holds one range per
/// resolved member. The `Display` text mirrors the host's media-condition
/// syntax, with ranges joined by the host's "comma = OR" grouping.
#[derive(Clone, Debug, PartialEq)]
pub struct MediaCondition {
    ranges: SmallVec<[WidthRange; 2]>,
    unit: String,
}

impl MediaCondition {
    pub fn single(range: WidthRange, unit: &str) -> MediaCondition {
        Self::any_of([range], unit)
    }

    pub fn any_of(ranges: impl IntoIterator<Item = WidthRange>, unit: &str) -> MediaCondition {
        MediaCondition {
            ranges: ranges.into_iter().collect(),
            unit: unit.to_string(),
        }
    }

    /// True when any member range contains `width`. A condition with no ranges
    /// (a union that resolved no names) never matches.
    pub fn matches_width(&self, width: f64) -> bool {
        self.ranges.iter().any(|range| range.contains(width))
    }

    pub fn ranges(&self) -> &[WidthRange] {
        &self.ranges
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }
}

impl fmt::Display for MediaCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, range) in self.ranges.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match range.min {
                None => write!(f, "(max-width: {}{})", range.max, self.unit)?,
                Some(min) if range.max == f64::INFINITY => {
                    write!(f, "(min-width: {}{})", min, self.unit)?
                }
                Some(min) => write!(
                    f,
                    "(min-width: {}{}) and (max-width: {}{})",
                    min, self.unit, range.max, self.unit
                )?,
            }
        }
        Ok(())
    }
}
