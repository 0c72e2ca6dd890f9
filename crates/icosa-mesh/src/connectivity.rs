//! Dense neighbour tables with sentinel padding.

use std::ops::Range;

use icosa_core::Dimension;
use smallvec::SmallVec;

use crate::error::MeshError;

/// Sentinel marking an absent neighbour slot.
pub const SKIP_VALUE: i32 = -1;

/// A table entry that lies outside its target space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BadEntry {
    /// Row of the entry.
    pub row: usize,
    /// Slot of the entry.
    pub slot: usize,
    /// The stored value.
    pub value: i32,
}

/// A `rows × arity` matrix mapping (origin entity, slot) to a neighbour index.
///
/// Rows belong to the `origin` horizontal dimension, values index the
/// `neighbor` horizontal dimension. Rows with fewer neighbours than the
/// arity are padded with [`SKIP_VALUE`], which is never dereferenced.
///
/// ```
/// use icosa_core::{Dimension, HorizontalKind};
/// use icosa_mesh::ConnectivityTable;
///
/// let edge = Dimension::horizontal("Edge", HorizontalKind::Edge);
/// let cell = Dimension::horizontal("Cell", HorizontalKind::Cell);
/// let e2c = ConnectivityTable::from_rows(edge, cell, &[[0, 1], [1, 2], [2, -1]]).unwrap();
/// assert_eq!(e2c.rows(), 3);
/// assert_eq!(e2c.neighbor_at(2, 0), Some(2));
/// assert_eq!(e2c.neighbor_at(2, 1), None);
/// assert_eq!(e2c.valid_count(2), 1);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectivityTable {
    origin: Dimension,
    neighbor: Dimension,
    arity: usize,
    data: Vec<i32>,
}

impl ConnectivityTable {
    /// Wrap a flat row-major buffer of `rows * arity` entries.
    pub fn new(
        origin: Dimension,
        neighbor: Dimension,
        arity: usize,
        data: Vec<i32>,
    ) -> Result<Self, MeshError> {
        for dim in [&origin, &neighbor] {
            if !dim.is_horizontal() {
                return Err(MeshError::NotHorizontal {
                    dim: dim.name().to_string(),
                });
            }
        }
        if arity == 0 {
            return Err(MeshError::ZeroArity);
        }
        if data.len() % arity != 0 {
            return Err(MeshError::RaggedTable {
                len: data.len(),
                arity,
            });
        }
        if let Some(i) = data.iter().position(|&v| v < SKIP_VALUE) {
            return Err(MeshError::InvalidEntry {
                row: i / arity,
                slot: i % arity,
                value: data[i],
            });
        }
        Ok(Self {
            origin,
            neighbor,
            arity,
            data,
        })
    }

    /// Build from fixed-width rows.
    pub fn from_rows<const N: usize>(
        origin: Dimension,
        neighbor: Dimension,
        rows: &[[i32; N]],
    ) -> Result<Self, MeshError> {
        let data = rows.iter().flat_map(|r| r.iter().copied()).collect();
        Self::new(origin, neighbor, N, data)
    }

    /// Dimension indexed by rows.
    pub fn origin(&self) -> &Dimension {
        &self.origin
    }

    /// Dimension indexed by the stored values.
    pub fn neighbor(&self) -> &Dimension {
        &self.neighbor
    }

    /// Number of slots per row.
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Number of origin entities.
    pub fn rows(&self) -> usize {
        self.data.len() / self.arity
    }

    /// The flat buffer.
    pub fn as_slice(&self) -> &[i32] {
        &self.data
    }

    /// All slots of one row, sentinels included.
    pub fn row(&self, row: usize) -> &[i32] {
        &self.data[row * self.arity..(row + 1) * self.arity]
    }

    /// Neighbour at `(row, slot)`, or `None` for a sentinel or out-of-range
    /// position.
    pub fn neighbor_at(&self, row: usize, slot: usize) -> Option<usize> {
        if row >= self.rows() || slot >= self.arity {
            return None;
        }
        let v = self.data[row * self.arity + slot];
        usize::try_from(v).ok()
    }

    /// Valid `(slot, neighbour)` pairs of a row in ascending slot order.
    pub fn neighbors(&self, row: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.row(row)
            .iter()
            .enumerate()
            .filter_map(|(slot, &v)| usize::try_from(v).ok().map(|n| (slot, n)))
    }

    /// Number of non-sentinel slots in a row.
    pub fn valid_count(&self, row: usize) -> usize {
        self.row(row).iter().filter(|&&v| v != SKIP_VALUE).count()
    }

    /// Largest stored neighbour index, or `None` if every slot is a sentinel.
    pub fn max_index(&self) -> Option<usize> {
        self.data
            .iter()
            .filter_map(|&v| usize::try_from(v).ok())
            .max()
    }

    /// First entry in `rows` that does not index into `[0, target_count)`.
    ///
    /// Rows beyond the table are ignored; the caller checks the table covers
    /// the range it iterates.
    pub fn first_out_of_range(&self, rows: Range<usize>, target_count: usize) -> Option<BadEntry> {
        let end = rows.end.min(self.rows());
        (rows.start..end).find_map(|row| {
            self.row(row).iter().enumerate().find_map(|(slot, &v)| {
                match usize::try_from(v) {
                    Ok(n) if n >= target_count => Some(BadEntry { row, slot, value: v }),
                    _ => None,
                }
            })
        })
    }

    /// The inverse relation with `target_count` rows of width `arity`.
    ///
    /// Row `n` of the result lists, in ascending order, every origin row
    /// that references `n`. Duplicated references are kept.
    pub fn transpose(&self, target_count: usize, arity: usize) -> Result<Self, MeshError> {
        if arity == 0 {
            return Err(MeshError::ZeroArity);
        }
        let mut lists: Vec<SmallVec<[i32; 8]>> = vec![SmallVec::new(); target_count];
        for row in 0..self.rows() {
            for (slot, n) in self.neighbors(row) {
                let list = lists.get_mut(n).ok_or(MeshError::InvalidEntry {
                    row,
                    slot,
                    value: self.data[row * self.arity + slot],
                })?;
                if list.len() == arity {
                    return Err(MeshError::ArityExceeded { row: n, arity });
                }
                let row = i32::try_from(row).map_err(|_| MeshError::TooManyRows { rows: row })?;
                list.push(row);
            }
        }
        let mut data = Vec::with_capacity(target_count * arity);
        for list in lists {
            data.extend_from_slice(&list);
            data.extend(std::iter::repeat(SKIP_VALUE).take(arity - list.len()));
        }
        Self::new(self.neighbor.clone(), self.origin.clone(), arity, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use icosa_core::HorizontalKind;
    use proptest::prelude::*;

    fn edge() -> Dimension {
        Dimension::horizontal("Edge", HorizontalKind::Edge)
    }

    fn cell() -> Dimension {
        Dimension::horizontal("Cell", HorizontalKind::Cell)
    }

    fn stub() -> ConnectivityTable {
        ConnectivityTable::from_rows(edge(), cell(), &[[0, 1], [1, 2], [2, -1]]).unwrap()
    }

    #[test]
    fn neighbors_skip_sentinels() {
        let t = stub();
        assert_eq!(t.neighbors(0).collect::<Vec<_>>(), vec![(0, 0), (1, 1)]);
        assert_eq!(t.neighbors(2).collect::<Vec<_>>(), vec![(0, 2)]);
        assert_eq!(t.valid_count(2), 1);
        assert_eq!(t.max_index(), Some(2));
    }

    #[test]
    fn neighbor_at_out_of_range_is_none() {
        let t = stub();
        assert_eq!(t.neighbor_at(3, 0), None);
        assert_eq!(t.neighbor_at(0, 2), None);
    }

    #[test]
    fn rejects_below_sentinel() {
        let err = ConnectivityTable::from_rows(edge(), cell(), &[[0, -2]]).unwrap_err();
        assert_eq!(
            err,
            MeshError::InvalidEntry {
                row: 0,
                slot: 1,
                value: -2
            }
        );
    }

    #[test]
    fn rejects_ragged_and_zero_arity() {
        assert_eq!(
            ConnectivityTable::new(edge(), cell(), 2, vec![0, 1, 2]).unwrap_err(),
            MeshError::RaggedTable { len: 3, arity: 2 }
        );
        assert_eq!(
            ConnectivityTable::new(edge(), cell(), 0, vec![]).unwrap_err(),
            MeshError::ZeroArity
        );
    }

    #[test]
    fn rejects_non_horizontal_dimensions() {
        let err = ConnectivityTable::new(edge(), Dimension::vertical("K"), 1, vec![0]).unwrap_err();
        assert!(matches!(err, MeshError::NotHorizontal { .. }));
    }

    #[test]
    fn first_out_of_range_is_restricted_to_rows() {
        let t = stub();
        assert_eq!(
            t.first_out_of_range(0..3, 2),
            Some(BadEntry {
                row: 1,
                slot: 1,
                value: 2
            })
        );
        assert_eq!(t.first_out_of_range(0..1, 2), None);
        assert_eq!(t.first_out_of_range(0..3, 3), None);
    }

    #[test]
    fn transpose_lists_rows_in_order() {
        let c2e = stub().transpose(3, 2).unwrap();
        assert_eq!(c2e.origin(), &cell());
        assert_eq!(c2e.neighbor(), &edge());
        assert_eq!(c2e.row(0), &[0, -1]);
        assert_eq!(c2e.row(1), &[0, 1]);
        assert_eq!(c2e.row(2), &[1, 2]);
    }

    #[test]
    fn transpose_reports_overflow() {
        let err = stub().transpose(3, 1).unwrap_err();
        assert_eq!(err, MeshError::ArityExceeded { row: 1, arity: 1 });
    }

    #[test]
    fn transpose_rejects_small_target_space() {
        let err = stub().transpose(2, 2).unwrap_err();
        assert!(matches!(err, MeshError::InvalidEntry { row: 1, .. }));
    }

    proptest! {
        #[test]
        fn transpose_twice_preserves_valid_pairs(
            rows in prop::collection::vec(prop::array::uniform3(-1i32..6), 1..12),
        ) {
            let t = ConnectivityTable::from_rows(edge(), cell(), &rows).unwrap();
            let back = t.transpose(6, 3 * rows.len()).unwrap();
            let mut forward: Vec<(usize, usize)> = (0..t.rows())
                .flat_map(|r| t.neighbors(r).map(move |(_, n)| (r, n)))
                .collect();
            let mut inverse: Vec<(usize, usize)> = (0..back.rows())
                .flat_map(|n| back.neighbors(n).map(move |(_, r)| (r, n)))
                .collect();
            forward.sort_unstable();
            inverse.sort_unstable();
            prop_assert_eq!(forward, inverse);
        }
    }
}
