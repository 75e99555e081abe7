//! Per-game engine façade: the stateful controller an external caller
//! (GTP loop, CLI demo, test harness) drives one move at a time.
//!
//! [`Engine`] owns the per-game [`BoardState`] (search tree plus ownership
//! map), recreating it when needed and promoting it forward a ply at a
//! time as moves are observed, mirroring the reference engine's
//! `engine_notify_play`/`engine_genmove` pair.

use std::time::Instant;

use anyhow::{bail, Result};

use crate::book::Book;
use crate::config::Config;
use crate::constants::{GJ_MINGAMES, PASS_MOVE, RESIGN_MOVE};
use crate::owner::{self, GroupStatus, OwnerMap};
use crate::parallel::uct_search;
use crate::playout::{HeuristicPlayout, PlayoutPolicy, RandomPlayout};
use crate::policy::{TreePolicy, Ucb1Amaf};
use crate::position::{Color, Point, Position};
use crate::tree::{expand, promote_at, promote_node, Tree};
use crate::walker::{walk, ScoreParams};

/// The tree plus ownership accumulator for one in-progress game.
pub struct BoardState {
    pub tree: Tree,
    pub owner_map: OwnerMap,
}

pub struct Engine {
    cfg: Config,
    policy: Box<dyn TreePolicy + Sync>,
    playout_policy: Box<dyn PlayoutPolicy + Sync>,
    random_policy: Box<dyn PlayoutPolicy + Sync>,
    book: Option<Book>,
    state: Option<BoardState>,
    rng: fastrand::Rng,
    start_time: Instant,
}

impl Engine {
    pub fn new(cfg: Config) -> Self {
        let book = if cfg.no_book {
            None
        } else {
            cfg.book_path.as_ref().and_then(|path| match Book::load(path) {
                Ok(book) => Some(book),
                Err(err) => {
                    log::warn!("failed to load opening book: {err:#}");
                    None
                }
            })
        };
        let rng = match cfg.force_seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        Engine {
            cfg,
            policy: Box::new(Ucb1Amaf::default()),
            playout_policy: Box::new(HeuristicPlayout),
            random_policy: Box::new(RandomPlayout),
            book,
            state: None,
            rng,
            start_time: Instant::now(),
        }
    }

    fn ensure_state(&mut self, board: &Position) {
        if self.state.is_some() {
            return;
        }
        let mut tree = Tree::init(board.color_to_move());
        expand(&mut tree.root, board, &mut tree.nodes_count);
        if let Some(book) = &self.book {
            if board.move_count() == 0 {
                book.apply(&mut tree);
            }
        }
        self.state = Some(BoardState { tree, owner_map: OwnerMap::new() });
    }

    /// Record a move (own or the opponent's) that was just played on
    /// `board` (i.e. `board` is the position *before* `mv`). Promotes the
    /// tree forward, or discards per-game state entirely if that isn't
    /// possible.
    pub fn notify_play(&mut self, board: &Position, mover: Color, mv: Point) -> Result<()> {
        self.ensure_state(board);
        let tree = &self.state.as_ref().unwrap().tree;
        if mover != tree.root_color {
            bail!("non-alternating play: expected {} to move, got {}", tree.root_color, mover);
        }

        if mv == RESIGN_MOVE {
            self.state = None;
            return Ok(());
        }

        let tree = &mut self.state.as_mut().unwrap().tree;
        if !promote_at(tree, mv, mover.other()) {
            log::warn!("tree promotion failed for move {mv}, rebuilding state from scratch");
            self.state = None;
        }
        Ok(())
    }

    /// Generate (and internally play) the engine's move for `color` on
    /// `board`. `board` must be the position *before* the move.
    pub fn genmove(&mut self, board: &Position, color: Color) -> Result<Point> {
        self.ensure_state(board);
        {
            let tree = &self.state.as_ref().unwrap().tree;
            if color != tree.root_color {
                bail!("non-alternating play: expected {} to move, got {}", tree.root_color, color);
            }
        }

        if self.cfg.dynkomi > 0 {
            let move_count = board.move_count();
            let state = self.state.as_mut().unwrap();
            if self.cfg.dynkomi_mask.contains(color) && move_count < self.cfg.dynkomi {
                let fraction = 1.0 - (move_count as f64 / self.cfg.dynkomi as f64);
                state.tree.extra_komi = self.cfg.dynkomi_initial * fraction;
            } else {
                state.tree.extra_komi = 0.0;
            }
        }

        let seed = self.rng.u64(..);
        {
            let state = self.state.as_mut().unwrap();
            uct_search(
                &mut state.tree,
                board,
                self.policy.as_ref(),
                self.playout_policy.as_ref(),
                self.random_policy.as_ref(),
                &self.cfg,
                &mut state.owner_map,
                seed,
            );
        }

        let best_idx = {
            let state = self.state.as_ref().unwrap();
            self.policy.choose(&state.tree.root)
        };
        let Some(best_idx) = best_idx else {
            self.state = None;
            return Ok(PASS_MOVE);
        };

        let best_value = self.state.as_ref().unwrap().tree.root.children[best_idx].value();
        let best_mv = self.state.as_ref().unwrap().tree.root.children[best_idx].mv;

        if best_value < self.cfg.resign_ratio && best_mv != PASS_MOVE {
            self.state = None;
            return Ok(RESIGN_MOVE);
        }

        let mut reply = best_mv;
        if board.last_move() == PASS_MOVE && board.move_count() > 1 {
            self.top_up_owner_map(board);
            let safe = {
                let state = self.state.as_ref().unwrap();
                owner::pass_is_safe(board, color, &state.owner_map)
            };
            if safe {
                reply = PASS_MOVE;
            }
        }

        let state = self.state.as_mut().unwrap();
        promote_node(&mut state.tree, best_idx, color.other());
        Ok(reply)
    }

    /// Run extra playouts (no tree descent changes beyond the normal
    /// walk) until the owner map has accumulated at least `GJ_MINGAMES`
    /// samples, so a pass-safety judgment can be trusted.
    fn top_up_owner_map(&mut self, board: &Position) {
        let params = ScoreParams {
            val_scale: self.cfg.val_scale,
            val_points: self.cfg.val_points,
            val_extra: self.cfg.val_extra,
            gamelen: self.cfg.gamelen,
            expand_p: self.cfg.expand_p,
        };
        let state = self.state.as_mut().unwrap();
        while state.owner_map.playouts < GJ_MINGAMES {
            walk(
                &mut state.tree,
                board,
                self.policy.as_ref(),
                self.playout_policy.as_ref(),
                self.random_policy.as_ref(),
                self.cfg.random_policy_chance,
                params,
                &mut state.owner_map,
                &mut self.rng,
            );
        }
    }

    /// List of groups judged dead against the accumulated ownership map.
    /// Returns an empty list if `pass_all_alive` is set.
    pub fn dead_group_list(&mut self, board: &Position) -> Vec<owner::Group> {
        if self.cfg.pass_all_alive {
            return Vec::new();
        }

        let had_state = self.state.is_some();
        self.ensure_state(board);
        self.top_up_owner_map(board);

        let groups = {
            let state = self.state.as_ref().unwrap();
            owner::judge_groups(board, &state.owner_map, crate::constants::GJ_THRES)
                .into_iter()
                .filter(|g| g.status == GroupStatus::Dead)
                .collect()
        };

        if !had_state {
            self.state = None;
        }
        groups
    }

    /// Respond to a free-text chat command. Only `"winrate"` is
    /// understood; everything else returns `None`.
    pub fn chat(&self, command: &str) -> Option<String> {
        if command.trim() != "winrate" {
            return None;
        }
        let state = self.state.as_ref()?;
        let best = state
            .tree
            .root
            .children
            .iter()
            .max_by_key(|c| c.total_playouts())?;
        Some(format!(
            "win rate {:.1}%, extra komi {:.1}",
            best.value() * 100.0,
            state.tree.extra_komi
        ))
    }

    /// The current game's accumulated ownership map, if any search has
    /// happened yet.
    pub fn owner_map(&self) -> Option<&OwnerMap> {
        self.state.as_ref().map(|s| &s.owner_map)
    }

    pub fn cputime(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }

    pub fn done_board_state(&mut self) {
        self.state = None;
    }
}
