//! The playout-and-backup walker: one call to [`walk`] is one simulation.
//!
//! `walk` clones the root board once, descends the tree recording a path
//! of child indices (expanding lazily once a node crosses
//! `expand_p` visits), rolls out to a terminal-ish position with a
//! pluggable [`PlayoutPolicy`], scores the result, and backs the value up
//! the path with a `1 - v` flip at every level (since each level
//! alternates whose turn it is) plus AMAF updates for any move played
//! during descent or rollout that also appears as a sibling somewhere on
//! the path.

use crate::constants::{MAX_GAME_LEN, PASS_MOVE};
use crate::owner::OwnerMap;
use crate::playout::PlayoutPolicy;
use crate::policy::TreePolicy;
use crate::position::{pass_move, play_move, Color, Point, Position};
use crate::tree::{expand, Tree, TreeNode};

/// Tunable scoring and expansion parameters threaded in from
/// [`crate::config::Config`].
#[derive(Debug, Clone, Copy)]
pub struct ScoreParams {
    pub val_scale: f64,
    pub val_points: f64,
    pub val_extra: bool,
    pub gamelen: usize,
    /// Visit count a leaf must reach before it is expanded.
    pub expand_p: u32,
}

/// Run one playout from the tree's root. Returns the number of playouts
/// this call contributed to the tree (1 normally, 0 if an inconsistency
/// was discovered mid-descent and the playout had to be abandoned before
/// touching any statistics).
#[allow(clippy::too_many_arguments)]
pub fn walk(
    tree: &mut Tree,
    root_board: &Position,
    policy: &dyn TreePolicy,
    playout_policy: &dyn PlayoutPolicy,
    random_policy: &dyn PlayoutPolicy,
    random_policy_chance: f64,
    score_params: ScoreParams,
    owner_map: &mut OwnerMap,
    rng: &mut fastrand::Rng,
) -> u32 {
    let mut board = root_board.clone();
    let mut amaf_map = vec![0i8; crate::constants::BOARDSIZE];
    let mut path = Vec::new();

    if !tree.root.is_expanded {
        expand(&mut tree.root, &board, &mut tree.nodes_count);
    }

    // Descend.
    {
        let mut node: &mut TreeNode = &mut tree.root;
        let mut passes = 0u32;
        loop {
            if node.children.is_empty() || passes >= 2 {
                break;
            }
            let idx = policy.select_child(node, rng);
            let mv = node.children[idx].mv;

            if mv == PASS_MOVE {
                pass_move(&mut board);
                passes += 1;
            } else {
                if play_move(&mut board, mv).is_err() {
                    // Tree and board disagree about legality; abort this
                    // playout without touching any statistics.
                    return 0;
                }
                passes = 0;
                mark_amaf(&mut amaf_map, mv, node.color_to_play_after);
            }
            path.push(idx);

            let child = &mut node.children[idx];
            if !child.is_expanded && child.total_playouts() >= score_params.expand_p {
                expand(child, &board, &mut tree.nodes_count);
            }
            node = &mut node.children[idx];
        }
    }

    // Roll out to a terminal-ish position.
    let mut passes = 0;
    while passes < 2 && board.move_count() < score_params.gamelen.min(MAX_GAME_LEN) {
        let mover_color = board.color_to_move();
        let use_random = random_policy_chance > 0.0 && rng.f64() < random_policy_chance;
        let chosen = if use_random {
            random_policy.choose_move(&board, rng)
        } else {
            playout_policy.choose_move(&board, rng)
        };

        match chosen {
            Some(mv) => {
                mark_amaf(&mut amaf_map, mv, mover_color);
                if play_move(&mut board, mv).is_err() {
                    pass_move(&mut board);
                    passes += 1;
                    continue;
                }
                passes = 0;
            }
            None => {
                pass_move(&mut board);
                passes += 1;
            }
        }
    }

    owner_map.record(&board);

    // Score from the root mover's perspective, then flip once per ply on
    // the way back up (plus once more to account for komi's natural sign
    // under color-swapped coordinates).
    let root_color = tree.root_color;
    let value_for_root_mover = score_value(&board, root_color, tree.extra_komi, score_params);

    backup(
        &mut tree.root,
        &path,
        &amaf_map,
        value_for_root_mover,
        root_color,
    );

    1
}

fn mark_amaf(amaf_map: &mut [i8], mv: Point, mover: Color) {
    if mv != PASS_MOVE && amaf_map[mv] == 0 {
        amaf_map[mv] = match mover {
            Color::Black => 1,
            Color::White => -1,
        };
    }
}

/// Area score plus komi and dynamic komi, folded through the
/// win/loss-plus-margin blend, from `perspective`'s point of view.
fn score_value(board: &Position, perspective: Color, extra_komi: f64, params: ScoreParams) -> f64 {
    let raw = board.area_score(); // from 'X' perspective
    let black_to_play = board.is_black_to_play();
    let score_for_black = if black_to_play { raw } else { -raw };
    let komi = board.komi as f64 + extra_komi;
    let black_net = score_for_black - komi;

    let score_for_perspective = match perspective {
        Color::Black => black_net,
        Color::White => -black_net,
    };

    value_from_score(score_for_perspective, params)
}

/// Blend a binary win/loss outcome with a bounded, score-proportional
/// margin term: `val_scale` sets how much weight the margin gets, and
/// `val_points` is the margin (in points) beyond which the blend
/// saturates at a pure win or loss. When `val_extra` is set the blend is
/// centered at 0.5 instead of the raw win/loss indicator.
fn value_from_score(score_for_mover: f64, params: ScoreParams) -> f64 {
    let binary = if score_for_mover > 0.0 { 1.0 } else { 0.0 };
    if params.val_scale <= 0.0 || params.val_points <= 0.0 {
        return binary;
    }
    let margin = (score_for_mover / params.val_points).clamp(-1.0, 1.0) * params.val_scale;
    if params.val_extra {
        (0.5 + 0.5 * margin).clamp(0.0, 1.0)
    } else {
        (binary + margin).clamp(0.0, 1.0)
    }
}

/// Propagate `value_for_root_mover` up the descent path, flipping the
/// value at every level (each level is the other player's turn), and
/// update AMAF stats for any sibling whose move appears in `amaf_map`
/// with the color matching whoever was to move at that level.
fn backup(root: &mut TreeNode, path: &[usize], amaf_map: &[i8], value_for_root_mover: f64, root_color: Color) {
    let mut value = value_for_root_mover;
    root.stats.record(value);
    update_amaf(root, amaf_map, root_color, value);

    let mut node = root;
    let mut color = root_color;
    for &idx in path {
        node = &mut node.children[idx];
        value = 1.0 - value;
        color = color.other();
        node.stats.record(value);
        update_amaf(node, amaf_map, color, value);
    }
}

fn update_amaf(node: &mut TreeNode, amaf_map: &[i8], mover_color: Color, value_for_mover: f64) {
    let marker = match mover_color {
        Color::Black => 1i8,
        Color::White => -1i8,
    };
    for child in node.children.iter_mut() {
        if child.mv != PASS_MOVE && amaf_map[child.mv] == marker {
            child.amaf_stats.record(value_for_mover);
        }
    }
}
