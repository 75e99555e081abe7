//! Ownership accumulation and dead-group judgment.
//!
//! Every playout, once it runs out to a terminal-ish position, classifies
//! each point as belonging to Black, White or neither (`is_eyeish`'s
//! effective color at that point); [`OwnerMap`] accumulates those
//! per-point tallies across many playouts so the engine can answer
//! "who owns this point" and "is this group dead" once enough playouts
//! have landed (`GJ_MINGAMES`).

use std::collections::HashSet;

use crate::constants::{BOARD_IMAX, BOARD_IMIN, EMPTY, GJ_MINGAMES, GJ_THRES, GJ_THRES_FALLBACK};
use crate::position::{all_neighbors, is_eyeish, Color, Point, Position};

/// Per-point tallies of how many recorded playouts ended with that point
/// controlled by Black, by White, or by neither (dame/contested).
pub struct OwnerMap {
    black: Vec<u32>,
    white: Vec<u32>,
    pub playouts: u32,
}

impl OwnerMap {
    pub fn new() -> Self {
        OwnerMap {
            black: vec![0; crate::constants::BOARDSIZE],
            white: vec![0; crate::constants::BOARDSIZE],
            playouts: 0,
        }
    }

    pub fn clear(&mut self) {
        self.black.iter_mut().for_each(|c| *c = 0);
        self.white.iter_mut().for_each(|c| *c = 0);
        self.playouts = 0;
    }

    /// Record the final state of one playout. `board` should be at (or
    /// past) the terminal position the playout reached.
    pub fn record(&mut self, board: &Position) {
        let black_to_play = board.is_black_to_play();
        for pt in BOARD_IMIN..BOARD_IMAX {
            let c = board.color[pt];
            let effective = if c == EMPTY { is_eyeish(board, pt) } else { c };
            // 'X' is Black exactly when Black is currently to move.
            match (effective, black_to_play) {
                (b'X', true) | (b'x', false) => self.black[pt] += 1,
                (b'x', true) | (b'X', false) => self.white[pt] += 1,
                _ => {}
            }
        }
        self.playouts += 1;
    }

    pub fn merge(&mut self, other: &OwnerMap) {
        for pt in 0..self.black.len() {
            self.black[pt] += other.black[pt];
            self.white[pt] += other.white[pt];
        }
        self.playouts += other.playouts;
    }

    /// Fraction of recorded playouts that had `pt` owned by `color`.
    pub fn fraction(&self, pt: Point, color: Color) -> f64 {
        if self.playouts == 0 {
            return 0.0;
        }
        let count = match color {
            Color::Black => self.black[pt],
            Color::White => self.white[pt],
        };
        count as f64 / self.playouts as f64
    }

    /// Classify a point at the given confidence threshold.
    pub fn judge_point(&self, pt: Point, thres: f64) -> PointOwner {
        if self.fraction(pt, Color::Black) >= thres {
            PointOwner::Black
        } else if self.fraction(pt, Color::White) >= thres {
            PointOwner::White
        } else {
            PointOwner::Unclear
        }
    }

    /// Character used by board-display printhooks: upper-case at the
    /// strict threshold, lower-case at the relaxed fallback threshold,
    /// ',' if even that can't settle the point.
    pub fn printhook(&self, pt: Point) -> char {
        match self.judge_point(pt, GJ_THRES) {
            PointOwner::Black => 'X',
            PointOwner::White => 'O',
            PointOwner::Unclear => match self.judge_point(pt, GJ_THRES_FALLBACK) {
                PointOwner::Black => 'x',
                PointOwner::White => 'o',
                PointOwner::Unclear => ',',
            },
        }
    }

    /// Render a row-by-row grid of [`Self::printhook`] characters, top row
    /// first, matching the board's own row/column layout. Used by GTP's
    /// `showboard` to print a territory estimate alongside the stones.
    pub fn display_grid(&self) -> String {
        use crate::constants::{N, W};
        let mut out = String::with_capacity(N * (N + 1));
        for row in 1..=N {
            for col in 1..=N {
                out.push(' ');
                out.push(self.printhook(row * W + col));
            }
            out.push('\n');
        }
        out
    }
}

impl Default for OwnerMap {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointOwner {
    Black,
    White,
    Unclear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupStatus {
    Dead,
    Alive,
    Unclear,
}

/// A connected group of same-color stones on the real (not relative)
/// board.
pub struct Group {
    pub color: Color,
    pub points: Vec<Point>,
    pub status: GroupStatus,
}

fn absolute_color_at(board: &Position, pt: Point) -> Option<Color> {
    match board.color[pt] {
        b'X' => Some(if board.is_black_to_play() { Color::Black } else { Color::White }),
        b'x' => Some(if board.is_black_to_play() { Color::White } else { Color::Black }),
        _ => None,
    }
}

/// Flood-fill every stone group on the board and classify it dead, alive
/// or unclear against the accumulated owner map at `thres` confidence.
/// A group is dead only if every one of its points is judged owned by the
/// *opposing* color; anything not dead defaults to alive, matching the
/// reference engine's conservative stance (never claim a group is dead
/// without the owner map actually saying so).
pub fn judge_groups(board: &Position, owner_map: &OwnerMap, thres: f64) -> Vec<Group> {
    let mut visited = HashSet::new();
    let mut groups = Vec::new();

    for start in BOARD_IMIN..BOARD_IMAX {
        if visited.contains(&start) {
            continue;
        }
        let Some(color) = absolute_color_at(board, start) else {
            continue;
        };

        let mut points = Vec::new();
        let mut stack = vec![start];
        visited.insert(start);
        while let Some(pt) = stack.pop() {
            points.push(pt);
            for n in all_neighbors(pt) {
                if visited.contains(&n) {
                    continue;
                }
                if absolute_color_at(board, n) == Some(color) {
                    visited.insert(n);
                    stack.push(n);
                }
            }
        }

        let opponent = color.other();
        let all_owned_by_opponent = points
            .iter()
            .all(|&pt| owner_map.judge_point(pt, thres) == owner_color(opponent));
        let all_owned_by_self = points
            .iter()
            .all(|&pt| owner_map.judge_point(pt, thres) == owner_color(color));

        let status = if all_owned_by_opponent {
            GroupStatus::Dead
        } else if all_owned_by_self {
            GroupStatus::Alive
        } else {
            GroupStatus::Unclear
        };

        groups.push(Group { color, points, status });
    }

    groups
}

fn owner_color(color: Color) -> PointOwner {
    match color {
        Color::Black => PointOwner::Black,
        Color::White => PointOwner::White,
    }
}

/// True if, having accumulated at least `GJ_MINGAMES` playouts, removing
/// the opponent's dead groups (at `GJ_THRES` confidence) would still
/// leave `color` ahead under area scoring plus the board's own komi.
///
/// Requires at least `GJ_MINGAMES` playouts to have been recorded;
/// returns `false` otherwise (not enough signal to trust the judgment).
pub fn pass_is_safe(board: &Position, color: Color, owner_map: &OwnerMap) -> bool {
    if owner_map.playouts < GJ_MINGAMES {
        return false;
    }

    let opponent = color.other();
    let dead = judge_groups(board, owner_map, GJ_THRES)
        .into_iter()
        .filter(|g| g.color == opponent && g.status == GroupStatus::Dead)
        .flat_map(|g| g.points);

    let mut cleaned = board.clone();
    for pt in dead {
        cleaned.color[pt] = EMPTY;
    }

    let raw_score = cleaned.area_score(); // from 'X' perspective
    let black_to_play = cleaned.is_black_to_play();
    let score_for_black = if black_to_play { raw_score } else { -raw_score };
    let komi = cleaned.komi as f64;
    let black_net = score_for_black - komi;

    match color {
        Color::Black => black_net > 0.0,
        Color::White => black_net < 0.0,
    }
}
