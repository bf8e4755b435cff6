//! Legal destinations for interactive selection.
//!
//! Read-only companions of the rules engine, used by a UI to highlight where a
//! player can run or pass. Every run path and pass target offered here is one
//! that [`GameState::apply_action`] accepts.
//!
//! Pass enumeration stops at the first blocked cell in each direction and only
//! offers the distances before it. The rules engine is stricter about
//! requested distances that cross a blocked cell; the two agree on every
//! target that is actually offered.

use crate::board::BOARD;
use crate::game::GameState;
use crate::hex::{AxialCoord, OffsetCoord, AXIAL_DIRECTIONS};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};

/// A reachable cell and a shortest path to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunTarget {
    pub coord: OffsetCoord,
    /// Cells to walk, excluding the start and ending at `coord`
    pub path: Vec<OffsetCoord>,
}

/// A cell the ball can be passed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassTarget {
    pub coord: OffsetCoord,
    pub direction: AxialCoord,
    pub distance: u32,
}

/// Every cell the player can run to this action, keyed by destination.
///
/// Breadth-first over free, in-bounds cells up to `speed` steps. The first
/// path found for a cell is kept, so each path is a shortest one.
pub fn run_target_paths(
    state: &GameState,
    player_id: &str,
) -> HashMap<OffsetCoord, Vec<OffsetCoord>> {
    let mut paths = HashMap::new();
    let Some((_, player)) = state.find_player(player_id) else {
        return paths;
    };

    let max_steps = player.skills.speed as usize;
    let occupied = state.occupied_positions(Some(player_id));
    let mut visited = HashSet::from([player.position]);
    let mut queue = VecDeque::from([(player.position, Vec::new())]);

    while let Some((coord, path)) = queue.pop_front() {
        if path.len() + 1 > max_steps {
            continue;
        }
        for neighbor in coord.neighbors() {
            if !BOARD.is_in_bounds(neighbor)
                || occupied.contains(&neighbor)
                || !visited.insert(neighbor)
            {
                continue;
            }
            let mut next_path: Vec<OffsetCoord> = path.clone();
            next_path.push(neighbor);
            paths.insert(neighbor, next_path.clone());
            queue.push_back((neighbor, next_path));
        }
    }

    paths
}

/// Run targets as a list, nearest first
pub fn run_targets(state: &GameState, player_id: &str) -> Vec<RunTarget> {
    let mut targets: Vec<RunTarget> = run_target_paths(state, player_id)
        .into_iter()
        .map(|(coord, path)| RunTarget { coord, path })
        .collect();
    targets.sort_by_key(|t| (t.path.len(), t.coord));
    targets
}

/// Every cell the player can pass to, keyed by destination.
///
/// Empty unless the player stands on the ball.
pub fn pass_targets(state: &GameState, player_id: &str) -> HashMap<OffsetCoord, PassTarget> {
    let mut targets = HashMap::new();
    let Some((_, player)) = state.find_player(player_id) else {
        return targets;
    };
    if player.position != state.ball.position {
        return targets;
    }

    let occupied = state.occupied_positions(None);
    for direction in AXIAL_DIRECTIONS {
        for distance in 1..=player.skills.passing {
            let coord = player.position.step(direction, distance as i32);
            if !BOARD.is_in_bounds(coord) || occupied.contains(&coord) {
                break;
            }
            targets.insert(
                coord,
                PassTarget {
                    coord,
                    direction,
                    distance,
                },
            );
        }
    }

    targets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::GameAction;
    use crate::board::TeamSide;
    use crate::game::Ball;
    use crate::player::{Player, SkillSet, Team};
    use pretty_assertions::assert_eq;

    fn state_with(home: Vec<Player>, away: Vec<Player>, ball: OffsetCoord) -> GameState {
        let mut t1 = Team::new("t1", "t1", TeamSide::Top);
        t1.players = home;
        let mut t2 = Team::new("t2", "t2", TeamSide::Bottom);
        t2.players = away;
        GameState {
            teams: vec![t1, t2],
            ball: Ball::loose(ball),
            active_team_id: "t1".into(),
            round: 1,
        }
    }

    fn player(id: &str, coord: OffsetCoord, speed: u32, passing: u32) -> Player {
        Player::new(id, id, SkillSet::new(speed, 1, passing, 1, 1, 1), coord)
    }

    #[test]
    fn test_speed_one_reaches_free_neighbors() {
        let start = OffsetCoord::new(6, 7);
        let blocker = start.neighbors()[0];
        let state = state_with(
            vec![player("p1", start, 1, 1)],
            vec![player("p2", blocker, 1, 1)],
            OffsetCoord::new(0, 0),
        );

        let paths = run_target_paths(&state, "p1");

        assert_eq!(paths.len(), 5);
        assert!(!paths.contains_key(&blocker));
        assert!(!paths.contains_key(&start));
        for (coord, path) in &paths {
            assert_eq!(path, &vec![*coord]);
        }
    }

    #[test]
    fn test_paths_are_shortest_and_bounded_by_speed() {
        let start = OffsetCoord::new(6, 7);
        let state = state_with(
            vec![player("p1", start, 3, 1)],
            vec![player("p2", OffsetCoord::new(0, 0), 1, 1)],
            OffsetCoord::new(0, 14),
        );

        let paths = run_target_paths(&state, "p1");

        // 6 + 12 + 18 cells within three steps on an open pitch.
        assert_eq!(paths.len(), 36);
        for (coord, path) in &paths {
            assert_eq!(path.len() as u32, start.distance_to(coord));
            assert_eq!(path.last(), Some(coord));
        }
    }

    #[test]
    fn test_every_run_target_is_accepted_by_rules() {
        let start = OffsetCoord::new(1, 1);
        let state = state_with(
            vec![player("p1", start, 3, 1)],
            vec![player("p2", OffsetCoord::new(2, 1), 1, 1)],
            OffsetCoord::new(6, 7),
        );

        for target in run_targets(&state, "p1") {
            let action = GameAction::Run {
                team_id: "t1".into(),
                player_id: "p1".into(),
                path: target.path.clone(),
                pick_up_ball: false,
            };
            assert!(state.apply_action(&action).is_ok(), "{target:?}");
        }
    }

    #[test]
    fn test_run_targets_sorted_nearest_first() {
        let state = state_with(
            vec![player("p1", OffsetCoord::new(6, 7), 2, 1)],
            vec![],
            OffsetCoord::new(0, 0),
        );

        let targets = run_targets(&state, "p1");
        assert!(targets.windows(2).all(|w| w[0].path.len() <= w[1].path.len()));
    }

    #[test]
    fn test_unknown_player_has_no_targets() {
        let state = state_with(vec![], vec![], OffsetCoord::new(0, 0));
        assert!(run_target_paths(&state, "nobody").is_empty());
        assert!(pass_targets(&state, "nobody").is_empty());
    }

    #[test]
    fn test_no_pass_targets_off_the_ball() {
        let state = state_with(
            vec![player("p1", OffsetCoord::new(6, 7), 1, 3)],
            vec![],
            OffsetCoord::new(6, 8),
        );
        assert!(pass_targets(&state, "p1").is_empty());
    }

    #[test]
    fn test_pass_targets_stop_before_blocker() {
        let start = OffsetCoord::new(6, 7);
        let east = AxialCoord::new(1, 0);
        let blocker = start.step(east, 2);
        let state = state_with(
            vec![player("p1", start, 1, 3)],
            vec![player("p2", blocker, 1, 1)],
            start,
        );

        let targets = pass_targets(&state, "p1");

        // Three cells in each of five open directions, one before the blocker.
        assert_eq!(targets.len(), 16);
        let first_east = start.step(east, 1);
        assert_eq!(
            targets.get(&first_east),
            Some(&PassTarget {
                coord: first_east,
                direction: east,
                distance: 1
            })
        );
        assert!(!targets.contains_key(&blocker));
        assert!(!targets.contains_key(&start.step(east, 3)));
    }

    #[test]
    fn test_every_pass_target_is_accepted_by_rules() {
        let start = OffsetCoord::new(1, 2);
        let state = state_with(
            vec![player("p1", start, 1, 4)],
            vec![player("p2", OffsetCoord::new(1, 4), 1, 1)],
            start,
        );

        for target in pass_targets(&state, "p1").values() {
            let action = GameAction::Pass {
                team_id: "t1".into(),
                player_id: "p1".into(),
                direction: target.direction,
                distance: target.distance,
            };
            let next = state.apply_action(&action).unwrap();
            assert_eq!(next.ball.position, target.coord);
        }
    }
}
