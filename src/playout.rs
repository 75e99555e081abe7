//! Pluggable playout (rollout) move policy.
//!
//! A playout policy only answers one question: given a position, what move
//! should the rollout play next? The rollout loop itself (when to stop,
//! how to score, how to fold the result back into the tree) is owned by
//! [`crate::walker`], which can run it with any policy behind this trait.
//! [`HeuristicPlayout`] is the concrete policy carried over from the
//! reference engine (captures, then 3x3 patterns, then a random legal
//! move, all with self-atari rejection); [`RandomPlayout`] is the uniform
//! fallback used for `random_policy_chance` trials.

use crate::constants::{
    BOARD_IMAX, BOARD_IMIN, EMPTY, N, PROB_HEURISTIC_CAPTURE, PROB_HEURISTIC_PAT3,
    PROB_RSAREJECT, PROB_SSAREJECT, STONE_BLACK, W,
};
use crate::patterns::pat3_match;
use crate::position::{all_neighbors, fix_atari, is_eye, play_move, Point, Position};

/// Chooses the next move to play inside a playout.
pub trait PlayoutPolicy {
    /// Return the next move to play, or `None` if the policy has nothing
    /// to suggest and the rollout should pass.
    fn choose_move(&self, pos: &Position, rng: &mut fastrand::Rng) -> Option<Point>;
}

/// The reference heuristic playout policy: captures, then pattern moves,
/// then a random legal move, each with probabilistic self-atari rejection.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicPlayout;

impl PlayoutPolicy for HeuristicPlayout {
    fn choose_move(&self, pos: &Position, rng: &mut fastrand::Rng) -> Option<Point> {
        let neighbors = make_list_last_moves_neighbors(pos, rng);

        if rng.f64() < PROB_HEURISTIC_CAPTURE {
            if let Some(mv) = try_capture_moves(pos, &neighbors, rng) {
                return Some(mv);
            }
        }

        if rng.f64() < PROB_HEURISTIC_PAT3 {
            if let Some(mv) = try_pattern_moves(pos, &neighbors, rng) {
                return Some(mv);
            }
        }

        choose_random_move(pos, rng)
    }
}

/// Uniform random legal move, no heuristics. Used for the
/// `random_policy_chance` fallback and as a cheap baseline in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomPlayout;

impl PlayoutPolicy for RandomPlayout {
    fn choose_move(&self, pos: &Position, rng: &mut fastrand::Rng) -> Option<Point> {
        choose_random_move(pos, rng)
    }
}

/// Points near the last two moves, shuffled, used to focus capture/pattern
/// search on the locally active area instead of scanning the whole board.
fn make_list_last_moves_neighbors(pos: &Position, rng: &mut fastrand::Rng) -> Vec<Point> {
    let mut points = Vec::with_capacity(20);

    if pos.last != 0 {
        points.push(pos.last);
        for n in all_neighbors(pos.last) {
            if pos.color[n] != b' ' && !points.contains(&n) {
                points.push(n);
            }
        }
    }

    if pos.last2 != 0 {
        if !points.contains(&pos.last2) {
            points.push(pos.last2);
        }
        for n in all_neighbors(pos.last2) {
            if pos.color[n] != b' ' && !points.contains(&n) {
                points.push(n);
            }
        }
    }

    rng.shuffle(&mut points);
    points
}

fn try_capture_moves(pos: &Position, neighbors: &[Point], rng: &mut fastrand::Rng) -> Option<Point> {
    for &pt in neighbors {
        if pos.color[pt] == STONE_BLACK || pos.color[pt] == b'x' {
            let moves = fix_atari(pos, pt, false);
            for mv in moves {
                if try_move_with_self_atari_check(pos, mv, false, rng) {
                    return Some(mv);
                }
            }
        }
    }
    None
}

fn try_pattern_moves(pos: &Position, neighbors: &[Point], rng: &mut fastrand::Rng) -> Option<Point> {
    for &pt in neighbors {
        if pos.color[pt] == EMPTY && pat3_match(pos, pt) && try_move_with_self_atari_check(pos, pt, false, rng) {
            return Some(pt);
        }
    }
    None
}

/// Check legality and probabilistically reject moves that put the mover in
/// self-atari. `is_random` selects the (lower) rejection rate used for
/// plain random moves, matching the reference engine's two-tier policy.
fn try_move_with_self_atari_check(
    pos: &Position,
    pt: Point,
    is_random: bool,
    rng: &mut fastrand::Rng,
) -> bool {
    let mut test_pos = pos.clone();
    if play_move(&mut test_pos, pt).is_err() {
        return false;
    }

    let reject_prob = if is_random { PROB_RSAREJECT } else { PROB_SSAREJECT };
    if rng.f64() < reject_prob {
        let moves = fix_atari(&test_pos, pt, true);
        if !moves.is_empty() {
            return false;
        }
    }

    true
}

fn choose_random_move(pos: &Position, rng: &mut fastrand::Rng) -> Option<Point> {
    let mut candidates = Vec::with_capacity(N * N);

    let start = BOARD_IMIN + rng.usize(0..(N * W));

    for pt in start..BOARD_IMAX {
        if pos.color[pt] == EMPTY && is_eye(pos, pt) != b'X' {
            candidates.push(pt);
        }
    }
    for pt in BOARD_IMIN..start {
        if pos.color[pt] == EMPTY && is_eye(pos, pt) != b'X' {
            candidates.push(pt);
        }
    }

    if candidates.is_empty() {
        return None;
    }

    rng.shuffle(&mut candidates);
    candidates
        .into_iter()
        .find(|&pt| try_move_with_self_atari_check(pos, pt, true, rng))
}
