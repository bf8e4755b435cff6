//! Hex coordinate system for the pitch.
//!
//! The pitch is addressed with offset coordinates (`col`, `row`) in an odd-q
//! layout: odd columns are shifted half a cell down. Offset coordinates are
//! what players, the ball and the wire protocol use.
//!
//! Axial coordinates (`q`, `r`) are used internally whenever we need neighbor
//! or straight-line math, because in axial space every direction is a constant
//! offset regardless of column parity.

use serde::{Deserialize, Serialize};

/// The six axial unit directions, in the order neighbors are enumerated.
pub const AXIAL_DIRECTIONS: [AxialCoord; 6] = [
    AxialCoord::new(1, 0),
    AxialCoord::new(1, -1),
    AxialCoord::new(0, -1),
    AxialCoord::new(-1, 0),
    AxialCoord::new(-1, 1),
    AxialCoord::new(0, 1),
];

/// Offset coordinate on the pitch (odd-q layout).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct OffsetCoord {
    /// Column, 0 is the left edge
    pub col: i32,
    /// Row, 0 is the top edge
    pub row: i32,
}

impl OffsetCoord {
    /// Create a new offset coordinate
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// Convert to axial coordinates.
    ///
    /// `(col - (col & 1)) / 2` is always an exact division, so this is also
    /// correct for negative columns produced while probing past the edge.
    pub const fn to_axial(self) -> AxialCoord {
        let q = self.col;
        let r = self.row - (self.col - (self.col & 1)) / 2;
        AxialCoord { q, r }
    }

    /// The six neighboring cells, one per axial direction.
    ///
    /// Candidates past the pitch edge are included; see
    /// [`Board::in_bounds_neighbors`](crate::board::Board::in_bounds_neighbors)
    /// for the filtered variant.
    pub fn neighbors(&self) -> [OffsetCoord; 6] {
        let axial = self.to_axial();
        AXIAL_DIRECTIONS.map(|direction| axial.offset(direction, 1).to_offset())
    }

    /// Whether `other` is one of the six neighbors of this cell
    pub fn is_adjacent(&self, other: &OffsetCoord) -> bool {
        self.neighbors().contains(other)
    }

    /// Distance in hex steps
    pub fn distance_to(&self, other: &OffsetCoord) -> u32 {
        self.to_axial().distance_to(&other.to_axial())
    }

    /// The cell reached by stepping `distance` times along `direction`
    pub fn step(&self, direction: AxialCoord, distance: i32) -> OffsetCoord {
        self.to_axial().offset(direction, distance).to_offset()
    }
}

/// Axial coordinate for hex math.
///
/// - `q` increases going east
/// - `r` increases going south-east
/// - The third coordinate `s` (not stored) satisfies: q + r + s = 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct AxialCoord {
    pub q: i32,
    pub r: i32,
}

impl AxialCoord {
    /// Create a new axial coordinate
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// The implicit third coordinate (s = -q - r)
    pub const fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// Convert back to offset coordinates (inverse of [`OffsetCoord::to_axial`])
    pub const fn to_offset(self) -> OffsetCoord {
        let col = self.q;
        let row = self.r + (self.q - (self.q & 1)) / 2;
        OffsetCoord { col, row }
    }

    /// Move `distance` steps along `direction`
    pub const fn offset(self, direction: AxialCoord, distance: i32) -> AxialCoord {
        AxialCoord {
            q: self.q + direction.q * distance,
            r: self.r + direction.r * distance,
        }
    }

    /// Whether this is one of the six canonical unit directions
    pub fn is_unit_direction(&self) -> bool {
        AXIAL_DIRECTIONS.contains(self)
    }

    /// Distance to another hex (in hex steps)
    pub fn distance_to(&self, other: &AxialCoord) -> u32 {
        let dq = (self.q - other.q).abs();
        let dr = (self.r - other.r).abs();
        let ds = (self.s() - other.s()).abs();
        ((dq + dr + ds) / 2) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_axial_round_trip_odd_and_even_columns() {
        for coord in [
            OffsetCoord::new(0, 0),
            OffsetCoord::new(1, 0),
            OffsetCoord::new(5, 9),
            OffsetCoord::new(12, 14),
        ] {
            assert_eq!(coord.to_axial().to_offset(), coord);
        }
    }

    #[test]
    fn test_odd_column_shift() {
        assert_eq!(OffsetCoord::new(3, 4).to_axial(), AxialCoord::new(3, 3));
        assert_eq!(OffsetCoord::new(4, 4).to_axial(), AxialCoord::new(4, 2));
    }

    #[test]
    fn test_negative_column_round_trip() {
        let coord = OffsetCoord::new(-1, 3);
        assert_eq!(coord.to_axial().to_offset(), coord);
    }

    #[test]
    fn test_neighbors_are_distinct_and_adjacent() {
        let center = OffsetCoord::new(5, 5);
        let neighbors = center.neighbors();

        let unique: HashSet<_> = neighbors.iter().collect();
        assert_eq!(unique.len(), 6);

        for neighbor in &neighbors {
            assert_eq!(center.distance_to(neighbor), 1);
            assert!(neighbor.is_adjacent(&center));
        }
    }

    #[test]
    fn test_unit_directions() {
        for direction in AXIAL_DIRECTIONS {
            assert!(direction.is_unit_direction());
        }
        assert!(!AxialCoord::new(1, 1).is_unit_direction());
        assert!(!AxialCoord::new(2, 0).is_unit_direction());
        assert!(!AxialCoord::new(0, 0).is_unit_direction());
    }

    #[test]
    fn test_step_straight_line() {
        let start = OffsetCoord::new(3, 1);
        let end = start.step(AxialCoord::new(1, 0), 2);
        assert_eq!(start.distance_to(&end), 2);
        assert_eq!(end.col, 5);
    }
}
