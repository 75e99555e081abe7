//! Board geometry and low-level tuning constants.
//!
//! Search-level tunables that are meant to be user-configurable (komi
//! schedule, resignation threshold, playout budget, ...) live in
//! [`crate::config`] instead, since they are part of the configuration
//! grammar. This module only holds constants that describe the board
//! layout and move representation, plus the playout-policy heuristic
//! weights the teacher tuned empirically.
//!
//! # Board Size Configuration
//!
//! The board size is controlled by Cargo features:
//! - `board9x9` (default): 9x9 board
//! - `board13x13`: 13x13 board

// =============================================================================
// Board Geometry
// =============================================================================

/// Board size (NxN). Standard Go sizes are 9, 13, or 19.
#[cfg(feature = "board9x9")]
pub const N: usize = 9;

#[cfg(feature = "board13x13")]
pub const N: usize = 13;

#[cfg(all(feature = "board9x9", feature = "board13x13"))]
compile_error!("Cannot enable both 'board9x9' and 'board13x13' features at the same time");

#[cfg(not(any(feature = "board9x9", feature = "board13x13")))]
compile_error!("Must enable exactly one board size feature: 'board9x9' or 'board13x13'");

/// Board width including left padding (N + 2 for padding on both sides).
pub const W: usize = N + 2;

/// Total board array size including all padding. Matches C layout for compatibility.
pub const BOARDSIZE: usize = (N + 1) * W + 1;

/// First valid board index (skips top and left padding).
pub const BOARD_IMIN: usize = N + 1;

/// Last valid board index (before bottom padding).
pub const BOARD_IMAX: usize = BOARDSIZE - N - 1;

/// Maximum game length (3 times board area to allow for captures and replays).
pub const MAX_GAME_LEN: usize = N * N * 3;

// =============================================================================
// Special Move Values
// =============================================================================

/// Pass move marker (index 0 is padding, so safe to use).
pub const PASS_MOVE: usize = 0;

/// Resign move marker.
pub const RESIGN_MOVE: usize = usize::MAX;

// =============================================================================
// Tree shape parameters
// =============================================================================

/// Minimum visits before a leaf is expanded into children.
pub const EXPAND_VISITS: u32 = 8;

/// RAVE equivalence parameter - controls RAVE vs UCB balance.
pub const RAVE_EQUIV: usize = 3500;

// =============================================================================
// Prior Values (for MCTS node initialization)
// =============================================================================

pub const PRIOR_EVEN: u32 = 10;
pub const PRIOR_SELFATARI: u32 = 10;
pub const PRIOR_CAPTURE_ONE: u32 = 15;
pub const PRIOR_CAPTURE_MANY: u32 = 30;
pub const PRIOR_PAT3: u32 = 10;
pub const PRIOR_LARGEPATTERN: u32 = 100;
pub const PRIOR_CFG: [u32; 3] = [24, 22, 8];
pub const PRIOR_EMPTYAREA: u32 = 10;

// =============================================================================
// Playout Heuristic Probabilities
// =============================================================================

pub const PROB_HEURISTIC_CAPTURE: f64 = 0.9;
pub const PROB_HEURISTIC_PAT3: f64 = 0.95;
pub const PROB_SSAREJECT: f64 = 0.9;
pub const PROB_RSAREJECT: f64 = 0.5;

// =============================================================================
// Ownership / dead-group judgment thresholds
// =============================================================================

/// Fraction of playouts a point must be owned by one color to be judged
/// settled, at the strict (primary) threshold.
pub const GJ_THRES: f64 = 0.8;

/// Relaxed fallback threshold used by the board-display printhook when the
/// strict threshold leaves too much of the board unclear.
pub const GJ_THRES_FALLBACK: f64 = 0.67;

/// Minimum number of playouts recorded in an owner map before its
/// judgments (dead group list, pass safety) are trusted at all.
pub const GJ_MINGAMES: u32 = 500;

// =============================================================================
// Neighbor Offsets
// =============================================================================

/// Offsets to neighboring points in the 1D board array.
/// Order: North, East, South, West, NE, SE, SW, NW
pub const DELTA: [isize; 8] = [
    -(N as isize) - 1,
    1,
    (N as isize) + 1,
    -1,
    -(N as isize),
    W as isize,
    N as isize,
    -(W as isize),
];

// =============================================================================
// Stone Color Constants (as bytes for direct comparison)
// =============================================================================

pub const STONE_BLACK: u8 = b'X';
pub const STONE_WHITE: u8 = b'x';
pub const EMPTY: u8 = b'.';
pub const OUT: u8 = b' ';
