//! Engine configuration.
//!
//! The external configuration surface is a single comma-separated string
//! of `key[=value]` pairs, e.g. `"threads=4,games=20000,resign_ratio=0.25"`.
//! Parsing it is the one place bad user input becomes a hard failure: an
//! unknown key, or a key that needs a value but doesn't get one, is an
//! `anyhow` error the caller is expected to treat as fatal, matching the
//! reference engine's own `die()`-on-bad-config behaviour.

use anyhow::{bail, Context, Result};

use crate::position::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadModel {
    /// Single in-line search loop, no worker threads.
    None,
    /// Root parallelization across `threads` independent workers.
    Root,
}

/// Which color(s) dynamic komi should apply to. Mirrors the reference
/// engine's bitmask, but since there are only two colors a pair of bools
/// reads more plainly in Rust.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DynkomiMask {
    pub black: bool,
    pub white: bool,
}

impl DynkomiMask {
    pub fn contains(&self, color: Color) -> bool {
        match color {
            Color::Black => self.black,
            Color::White => self.white,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub debug_level: u32,
    pub games: usize,
    pub gamelen: usize,
    pub threads: usize,
    pub thread_model: ThreadModel,
    pub resign_ratio: f64,
    pub loss_threshold: f64,
    pub val_scale: f64,
    pub val_points: f64,
    /// Score blend formula: `0.5 + 0.5 * margin` when true, a truncated
    /// `win_indicator + margin` blend when false.
    pub val_extra: bool,
    pub playout_amaf: bool,
    /// Use AMAF statistics (rather than the heuristic priors) to seed new
    /// nodes' priors.
    pub amaf_prior: bool,
    /// Visit count a leaf must reach before it is expanded.
    pub expand_p: u32,
    /// Tree-dump size threshold; stored for parity with the reference
    /// engine's debug tooling, not otherwise consulted by this crate.
    pub dumpthres: u32,
    pub random_policy_chance: f64,
    /// Number of root moves over which dynamic komi is applied.
    pub dynkomi: usize,
    pub dynkomi_mask: DynkomiMask,
    /// Deterministic seed for the search RNG; `None` means seed from
    /// system entropy.
    pub force_seed: Option<u64>,
    pub no_book: bool,
    /// Starting value of the dynamic komi schedule, decayed linearly to 0
    /// over the first `dynkomi` moves of the game.
    pub dynkomi_initial: f64,
    /// Treat every group as alive; `dead_group_list` always returns empty.
    pub pass_all_alive: bool,
    /// Path to an opening book file; `None` disables book loading even
    /// when `no_book` is false.
    pub book_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            debug_level: 1,
            games: 80_000,
            gamelen: crate::constants::MAX_GAME_LEN,
            threads: 0,
            thread_model: ThreadModel::None,
            resign_ratio: 0.2,
            loss_threshold: 0.85,
            val_scale: 0.02,
            val_points: 20.0,
            val_extra: false,
            playout_amaf: true,
            amaf_prior: false,
            expand_p: crate::constants::EXPAND_VISITS,
            dumpthres: 0,
            random_policy_chance: 0.0,
            dynkomi: 0,
            dynkomi_mask: DynkomiMask { black: true, white: false },
            force_seed: None,
            no_book: false,
            dynkomi_initial: 0.0,
            pass_all_alive: false,
            book_path: None,
        }
    }
}

impl Config {
    /// Parse a comma-separated `key[=value]` configuration string on top
    /// of the defaults. An empty string is valid and yields the defaults.
    pub fn parse(s: &str) -> Result<Config> {
        let mut cfg = Config::default();
        let mut thread_model_explicit = false;

        for entry in s.split(',') {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            let (key, value) = match entry.split_once('=') {
                Some((k, v)) => (k.trim(), Some(v.trim())),
                None => (entry, None),
            };

            match key {
                "debug_level" => cfg.debug_level = require(value, key)?.parse().context(key.to_string())?,
                "games" => cfg.games = require(value, key)?.parse().context(key.to_string())?,
                "gamelen" => cfg.gamelen = require(value, key)?.parse().context(key.to_string())?,
                "threads" => cfg.threads = require(value, key)?.parse().context(key.to_string())?,
                "thread_model" => {
                    cfg.thread_model = parse_thread_model(require(value, key)?)?;
                    thread_model_explicit = true;
                }
                "resign_ratio" => cfg.resign_ratio = require(value, key)?.parse().context(key.to_string())?,
                "loss_threshold" => cfg.loss_threshold = require(value, key)?.parse().context(key.to_string())?,
                "val_scale" => cfg.val_scale = require(value, key)?.parse().context(key.to_string())?,
                "val_points" => cfg.val_points = require(value, key)?.parse().context(key.to_string())?,
                "val_extra" => cfg.val_extra = parse_bool(require(value, key)?)?,
                "playout_amaf" => cfg.playout_amaf = parse_bool(require(value, key)?)?,
                "amaf_prior" => cfg.amaf_prior = parse_bool(require(value, key)?)?,
                "expand_p" => cfg.expand_p = require(value, key)?.parse().context(key.to_string())?,
                "dumpthres" => cfg.dumpthres = require(value, key)?.parse().context(key.to_string())?,
                "random_policy_chance" => {
                    cfg.random_policy_chance = require(value, key)?.parse().context(key.to_string())?
                }
                "dynkomi" => cfg.dynkomi = require(value, key)?.parse().context(key.to_string())?,
                "dynkomi_mask" => cfg.dynkomi_mask = parse_dynkomi_mask(require(value, key)?)?,
                "force_seed" => cfg.force_seed = Some(require(value, key)?.parse().context(key.to_string())?),
                "no_book" => cfg.no_book = parse_bool(require(value, key)?)?,
                "dynkomi_initial" => {
                    cfg.dynkomi_initial = require(value, key)?.parse().context(key.to_string())?
                }
                "pass_all_alive" => cfg.pass_all_alive = parse_bool(require(value, key)?)?,
                "book" => cfg.book_path = Some(require(value, key)?.to_string()),
                other => bail!("unknown configuration key: {other}"),
            }
        }

        if !thread_model_explicit {
            cfg.thread_model = if cfg.threads == 0 { ThreadModel::None } else { ThreadModel::Root };
        }
        Ok(cfg)
    }
}

fn require<'a>(value: Option<&'a str>, key: &str) -> Result<&'a str> {
    value.ok_or_else(|| anyhow::anyhow!("configuration key '{key}' requires a value"))
}

fn parse_bool(s: &str) -> Result<bool> {
    match s {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        other => bail!("invalid boolean value: {other}"),
    }
}

fn parse_thread_model(s: &str) -> Result<ThreadModel> {
    match s {
        "none" => Ok(ThreadModel::None),
        "root" => Ok(ThreadModel::Root),
        other => bail!("invalid thread_model value: {other}"),
    }
}

fn parse_dynkomi_mask(s: &str) -> Result<DynkomiMask> {
    match s {
        "black" => Ok(DynkomiMask { black: true, white: false }),
        "white" => Ok(DynkomiMask { black: false, white: true }),
        "both" | "all" => Ok(DynkomiMask { black: true, white: true }),
        "none" => Ok(DynkomiMask { black: false, white: false }),
        other => bail!("invalid dynkomi_mask value: {other}"),
    }
}
