//! Pitch dimensions and the fixed regions derived from them.
//!
//! This module contains:
//! - The `Board` extents and the standard 13x15 pitch
//! - Team sides and their setup rows
//! - Region queries: midline, goals, penalty boxes
//!
//! Nothing here depends on game state; every predicate is a pure function of
//! the board constants and the queried coordinate.

use crate::hex::OffsetCoord;
use serde::{Deserialize, Serialize};

/// Number of players each team fields
pub const PLAYERS_PER_TEAM: usize = 4;

/// Row the top team lines up on during setup
pub const TOP_START_ROW: i32 = 4;

/// Row the bottom team lines up on during setup
pub const BOTTOM_START_ROW: i32 = 10;

/// The standard pitch
pub const BOARD: Board = Board::standard();

/// Which end of the pitch a team defends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TeamSide {
    #[default]
    Top,
    Bottom,
}

impl TeamSide {
    /// The side facing this one
    pub const fn opposite(self) -> Self {
        match self {
            TeamSide::Top => TeamSide::Bottom,
            TeamSide::Bottom => TeamSide::Top,
        }
    }

    /// Row every player of this side must occupy during setup
    pub const fn start_row(self) -> i32 {
        match self {
            TeamSide::Top => TOP_START_ROW,
            TeamSide::Bottom => BOTTOM_START_ROW,
        }
    }
}

/// Goal cells for both ends of the pitch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalHexes {
    pub top: OffsetCoord,
    pub bottom: OffsetCoord,
}

/// Immutable pitch geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub columns: i32,
    pub rows: i32,
    /// Width of each penalty box in columns
    pub penalty_box_columns: i32,
    /// Depth of each penalty box in rows
    pub penalty_box_rows: i32,
}

impl Board {
    /// The standard 13 column by 15 row pitch with 9x4 penalty boxes
    pub const fn standard() -> Self {
        Self {
            columns: 13,
            rows: 15,
            penalty_box_columns: 9,
            penalty_box_rows: 4,
        }
    }

    /// Whether the coordinate lies on the pitch
    pub const fn is_in_bounds(&self, coord: OffsetCoord) -> bool {
        coord.col >= 0 && coord.col < self.columns && coord.row >= 0 && coord.row < self.rows
    }

    /// Neighbors of `coord` that lie on the pitch (between 1 and 6 of them)
    pub fn in_bounds_neighbors(&self, coord: OffsetCoord) -> Vec<OffsetCoord> {
        coord
            .neighbors()
            .into_iter()
            .filter(|neighbor| self.is_in_bounds(*neighbor))
            .collect()
    }

    /// Row splitting the two halves of the pitch
    pub const fn midline_row(&self) -> i32 {
        self.rows / 2
    }

    /// Column the goals and the kickoff spot sit on
    pub const fn center_column(&self) -> i32 {
        self.columns / 2
    }

    /// Default resting spot for the ball before kickoff
    pub const fn center_spot(&self) -> OffsetCoord {
        OffsetCoord::new(self.center_column(), self.midline_row())
    }

    /// Every cell of a row, or nothing if the row is off the pitch
    pub fn row_hexes(&self, row: i32) -> Vec<OffsetCoord> {
        if row < 0 || row >= self.rows {
            return Vec::new();
        }
        (0..self.columns).map(|col| OffsetCoord::new(col, row)).collect()
    }

    pub fn midline_hexes(&self) -> Vec<OffsetCoord> {
        self.row_hexes(self.midline_row())
    }

    pub fn is_midline_hex(&self, coord: OffsetCoord) -> bool {
        self.is_in_bounds(coord) && coord.row == self.midline_row()
    }

    pub const fn goal_hexes(&self) -> GoalHexes {
        GoalHexes {
            top: OffsetCoord::new(self.center_column(), 0),
            bottom: OffsetCoord::new(self.center_column(), self.rows - 1),
        }
    }

    pub fn is_goal_hex(&self, coord: OffsetCoord) -> bool {
        if !self.is_in_bounds(coord) {
            return false;
        }
        let goals = self.goal_hexes();
        coord == goals.top || coord == goals.bottom
    }

    /// Inclusive (start, end) corners of a side's penalty box
    fn penalty_box_bounds(&self, side: TeamSide) -> (OffsetCoord, OffsetCoord) {
        let start_col = (self.columns - self.penalty_box_columns) / 2;
        let end_col = start_col + self.penalty_box_columns - 1;
        let start_row = match side {
            TeamSide::Top => 0,
            TeamSide::Bottom => self.rows - self.penalty_box_rows,
        };
        let end_row = start_row + self.penalty_box_rows - 1;
        (
            OffsetCoord::new(start_col, start_row),
            OffsetCoord::new(end_col, end_row),
        )
    }

    /// Cells of a side's penalty box, row by row
    pub fn penalty_box_hexes(&self, side: TeamSide) -> Vec<OffsetCoord> {
        let (start, end) = self.penalty_box_bounds(side);
        (start.row..=end.row)
            .flat_map(|row| (start.col..=end.col).map(move |col| OffsetCoord::new(col, row)))
            .filter(|coord| self.is_in_bounds(*coord))
            .collect()
    }

    /// Whether the cell lies in a penalty box; `None` checks both ends
    pub fn is_penalty_box_hex(&self, coord: OffsetCoord, side: Option<TeamSide>) -> bool {
        if !self.is_in_bounds(coord) {
            return false;
        }
        match side {
            Some(side) => {
                let (start, end) = self.penalty_box_bounds(side);
                (start.col..=end.col).contains(&coord.col)
                    && (start.row..=end.row).contains(&coord.row)
            }
            None => {
                self.is_penalty_box_hex(coord, Some(TeamSide::Top))
                    || self.is_penalty_box_hex(coord, Some(TeamSide::Bottom))
            }
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::standard()
    }
}
