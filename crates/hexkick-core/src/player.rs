//! Players, their skills, and the teams that own them.

use crate::board::TeamSide;
use crate::hex::OffsetCoord;
use serde::{Deserialize, Serialize};

/// Player identifier, chosen by the client that places the player
pub type PlayerId = String;

/// Team identifier, assigned by the server when a team is created
pub type TeamId = String;

/// Fixed skill ratings of a player.
///
/// `speed` caps how many cells a run may cover and `passing` caps how far a
/// pass may travel. The others are carried for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SkillSet {
    pub speed: u32,
    pub shoot: u32,
    pub passing: u32,
    pub dribbling: u32,
    pub defense: u32,
    pub physics: u32,
}

impl SkillSet {
    pub const fn new(
        speed: u32,
        shoot: u32,
        passing: u32,
        dribbling: u32,
        defense: u32,
        physics: u32,
    ) -> Self {
        Self {
            speed,
            shoot,
            passing,
            dribbling,
            defense,
            physics,
        }
    }

    /// Whether every rating is at least 1
    pub fn is_positive(&self) -> bool {
        [
            self.speed,
            self.shoot,
            self.passing,
            self.dribbling,
            self.defense,
            self.physics,
        ]
        .iter()
        .all(|&rating| rating >= 1)
    }
}

/// A player on the pitch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub skills: SkillSet,
    pub position: OffsetCoord,
}

impl Player {
    pub fn new(
        id: impl Into<PlayerId>,
        name: impl Into<String>,
        skills: SkillSet,
        position: OffsetCoord,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            skills,
            position,
        }
    }
}

/// A team of players defending one end of the pitch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub side: TeamSide,
    /// Empty until the team places its players
    pub players: Vec<Player>,
}

impl Team {
    /// Create a team with no players yet
    pub fn new(id: impl Into<TeamId>, name: impl Into<String>, side: TeamSide) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            side,
            players: Vec::new(),
        }
    }

    pub fn get_player(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub(crate) fn get_player_mut(&mut self, id: &str) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn has_player(&self, id: &str) -> bool {
        self.get_player(id).is_some()
    }
}
