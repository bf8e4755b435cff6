//! Hexkick - a two-team, turn-based football game on a hex pitch
//!
//! This crate provides the core game logic for Hexkick, including:
//! - Offset/axial hex coordinates and the fixed pitch regions
//! - A rules engine validating runs, passes and discards
//! - Turn pacing (two actions per team per turn)
//! - Enumeration of legal run and pass targets for interactive selection
//!
//! # Architecture
//!
//! The engine is platform-agnostic and never mutates state in place: every
//! operation takes a state and returns a new one or a tagged error. It can be
//! compiled to:
//! - Native Rust for the session server
//! - WebAssembly for the browser UI (`wasm` feature)
//!
//! # Modules
//!
//! - [`hex`]: Offset and axial coordinates
//! - [`board`]: Pitch extents, midline, goals, penalty boxes
//! - [`game`]: Game state and the rules engine
//! - [`turn`]: Turn pacing
//! - [`targets`]: Legal run/pass destinations

pub mod actions;
pub mod board;
pub mod field;
pub mod game;
pub mod hex;
pub mod player;
pub mod setup;
pub mod targets;
pub mod turn;
#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use actions::{ActionError, GameAction, ACTIONS_PER_TURN};
pub use board::{
    Board, GoalHexes, TeamSide, BOARD, BOTTOM_START_ROW, PLAYERS_PER_TEAM, TOP_START_ROW,
};
pub use field::{FieldIndex, FieldState};
pub use game::{Ball, GameState};
pub use hex::{AxialCoord, OffsetCoord, AXIAL_DIRECTIONS};
pub use player::{Player, PlayerId, SkillSet, Team, TeamId};
pub use setup::{toggle_player_position, SetupContext, SetupPhase};
pub use targets::{pass_targets, run_target_paths, run_targets, PassTarget, RunTarget};
pub use turn::{QueuedTurn, TurnError, TurnState};
