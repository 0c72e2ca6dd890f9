//! Horizontal boundary markers and iteration domains.

use std::fmt;
use std::ops::Range;

use indexmap::IndexMap;

use crate::error::DomainError;

/// Ordered, strictly increasing named positions on the horizontal axis.
///
/// Consecutive markers delimit half-open bands. Marker arithmetic is plain
/// `usize` arithmetic on the returned positions:
///
/// ```
/// use icosa_mesh::{Domain, HorizontalMarkers};
///
/// let m = HorizontalMarkers::new([("lb", 0), ("nudging", 1000), ("halo", 3000)]).unwrap();
/// let lb = m.position("lb").unwrap();
/// let nudging = m.position("nudging").unwrap();
/// let d = Domain::upward().across(lb + 4..nudging + 1);
/// assert_eq!(d.resolve(4000).unwrap(), 4..1001);
/// assert_eq!(m.band("nudging", "halo").unwrap(), 1000..3000);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HorizontalMarkers {
    markers: IndexMap<String, usize>,
}

impl HorizontalMarkers {
    /// Build from `(name, position)` pairs in ascending order.
    pub fn new<S: Into<String>>(
        markers: impl IntoIterator<Item = (S, usize)>,
    ) -> Result<Self, DomainError> {
        let mut map: IndexMap<String, usize> = IndexMap::new();
        for (name, pos) in markers {
            let name = name.into();
            if map.contains_key(&name) {
                return Err(DomainError::DuplicateMarker { name });
            }
            if let Some((previous, &last)) = map.last() {
                if pos <= last {
                    return Err(DomainError::NotIncreasing {
                        previous: previous.clone(),
                        name,
                    });
                }
            }
            map.insert(name, pos);
        }
        Ok(Self { markers: map })
    }

    /// Position of `name`, failing for unknown markers.
    pub fn position(&self, name: &str) -> Result<usize, DomainError> {
        self.markers
            .get(name)
            .copied()
            .ok_or_else(|| DomainError::UnknownMarker {
                name: name.to_string(),
            })
    }

    /// The half-open band `[start, end)` between two markers.
    pub fn band(&self, start: &str, end: &str) -> Result<Range<usize>, DomainError> {
        let (a, b) = (self.position(start)?, self.position(end)?);
        if a > b {
            return Err(DomainError::Inverted { start: a, end: b });
        }
        Ok(a..b)
    }

    /// Markers in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.markers.iter().map(|(n, &p)| (n.as_str(), p))
    }

    /// Position of the last marker.
    pub fn last(&self) -> Option<usize> {
        self.markers.last().map(|(_, &p)| p)
    }

    /// Number of markers.
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    /// Returns `true` if there are no markers.
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

/// Order in which vertical levels are visited.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum VerticalDirection {
    /// Ascending level index.
    #[default]
    Upward,
    /// Descending level index.
    Downward,
}

impl VerticalDirection {
    /// Level visited at `step` of an `n`-level traversal.
    #[inline]
    pub fn level(self, step: usize, n: usize) -> usize {
        match self {
            Self::Upward => step,
            Self::Downward => n - 1 - step,
        }
    }
}

impl fmt::Display for VerticalDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upward => write!(f, "upward"),
            Self::Downward => write!(f, "downward"),
        }
    }
}

/// The active iteration domain of a statement.
///
/// `horizontal == None` covers the whole horizontal extent of the output.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Domain {
    horizontal: Option<Range<usize>>,
    direction: VerticalDirection,
}

impl Domain {
    /// Every entity, levels upward.
    pub fn full() -> Self {
        Self::default()
    }

    /// Every entity, levels upward.
    pub fn upward() -> Self {
        Self::default()
    }

    /// Every entity, levels downward.
    pub fn downward() -> Self {
        Self {
            horizontal: None,
            direction: VerticalDirection::Downward,
        }
    }

    /// Restrict to horizontal indices in `range`.
    pub fn across(mut self, range: Range<usize>) -> Self {
        self.horizontal = Some(range);
        self
    }

    /// The horizontal restriction, if any.
    pub fn horizontal(&self) -> Option<&Range<usize>> {
        self.horizontal.as_ref()
    }

    /// Vertical traversal order.
    pub fn direction(&self) -> VerticalDirection {
        self.direction
    }

    /// Concrete horizontal range for an output of `extent` entities.
    pub fn resolve(&self, extent: usize) -> Result<Range<usize>, DomainError> {
        let Some(range) = &self.horizontal else {
            return Ok(0..extent);
        };
        if range.start > range.end {
            return Err(DomainError::Inverted {
                start: range.start,
                end: range.end,
            });
        }
        if range.end > extent {
            return Err(DomainError::OutOfBounds {
                start: range.start,
                end: range.end,
                extent,
            });
        }
        Ok(range.clone())
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.horizontal {
            Some(r) => write!(f, "[{}, {}) {}", r.start, r.end, self.direction),
            None => write!(f, "full {}", self.direction),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn icon() -> HorizontalMarkers {
        HorizontalMarkers::new([
            ("lb", 0),
            ("nudging", 1000),
            ("interior", 2000),
            ("halo", 3000),
            ("end", 4000),
        ])
        .unwrap()
    }

    #[test]
    fn markers_must_increase() {
        let err = HorizontalMarkers::new([("a", 5), ("b", 5)]).unwrap_err();
        assert_eq!(
            err,
            DomainError::NotIncreasing {
                previous: "a".into(),
                name: "b".into()
            }
        );
    }

    #[test]
    fn markers_reject_duplicates() {
        let err = HorizontalMarkers::new([("a", 0), ("a", 5)]).unwrap_err();
        assert!(matches!(err, DomainError::DuplicateMarker { .. }));
    }

    #[test]
    fn unknown_marker() {
        assert!(matches!(
            icon().position("edge"),
            Err(DomainError::UnknownMarker { .. })
        ));
    }

    #[test]
    fn band_between_markers() {
        let m = icon();
        assert_eq!(m.band("nudging", "halo").unwrap(), 1000..3000);
        assert!(matches!(
            m.band("halo", "lb"),
            Err(DomainError::Inverted { .. })
        ));
        assert_eq!(m.last(), Some(4000));
        assert_eq!(m.len(), 5);
    }

    #[test]
    fn full_domain_resolves_to_extent() {
        assert_eq!(Domain::full().resolve(12).unwrap(), 0..12);
    }

    #[test]
    fn restricted_domain_bounds_checked() {
        let d = Domain::upward().across(4..1001);
        assert_eq!(d.resolve(1001).unwrap(), 4..1001);
        assert_eq!(
            d.resolve(1000).unwrap_err(),
            DomainError::OutOfBounds {
                start: 4,
                end: 1001,
                extent: 1000
            }
        );
        #[allow(clippy::reversed_empty_ranges)]
        let inverted = Domain::full().across(5..2);
        assert!(matches!(
            inverted.resolve(10),
            Err(DomainError::Inverted { .. })
        ));
    }

    #[test]
    fn empty_range_is_valid() {
        assert_eq!(Domain::full().across(3..3).resolve(5).unwrap(), 3..3);
    }

    #[test]
    fn direction_maps_steps_to_levels() {
        assert_eq!(VerticalDirection::Upward.level(0, 4), 0);
        assert_eq!(VerticalDirection::Downward.level(0, 4), 3);
        assert_eq!(VerticalDirection::Downward.level(3, 4), 0);
        assert_eq!(Domain::downward().direction(), VerticalDirection::Downward);
    }

    #[test]
    fn display() {
        assert_eq!(Domain::upward().across(4..10).to_string(), "[4, 10) upward");
        assert_eq!(Domain::downward().to_string(), "full downward");
    }
}
