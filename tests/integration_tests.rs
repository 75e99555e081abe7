//! End-to-end tests exercising the public crate surface: board mechanics,
//! tree search, and the stateful [`Engine`] façade together.

use uctgo::config::Config;
use uctgo::constants::{N, PASS_MOVE, RESIGN_MOVE};
use uctgo::engine::Engine;
use uctgo::owner::OwnerMap;
use uctgo::policy::{TreePolicy, Ucb1Amaf};
use uctgo::position::{
    all_neighbors, fix_atari, is_eye, is_eyeish, parse_coord, pass_move, play_move, str_coord,
    Color, Position,
};
use uctgo::tree::{expand, promote_at, Tree};
use uctgo::walker::{walk, ScoreParams};

// =============================================================================
// Helpers
// =============================================================================

/// Play a sequence of moves alternately (Black, White, Black, ...). "pass"
/// skips a turn. Panics if any move is illegal.
fn setup_position(moves: &[&str]) -> Position {
    let mut pos = Position::new();
    for mv in moves {
        let pt = parse_coord(mv);
        play_move(&mut pos, pt).unwrap();
    }
    pos
}

fn far_corner() -> &'static str {
    if N == 9 { "J9" } else { "N13" }
}

fn elsewhere() -> &'static str {
    if N == 9 { "H8" } else { "M12" }
}

fn elsewhere2() -> &'static str {
    if N == 9 { "H9" } else { "L12" }
}

fn elsewhere3() -> &'static str {
    if N == 9 { "J8" } else { "K11" }
}

fn fast_cfg() -> Config {
    let mut cfg = Config::default();
    cfg.threads = 0;
    cfg.games = 300;
    cfg
}

// =============================================================================
// Coordinate parsing
// =============================================================================

#[test]
fn parse_coord_corners_are_distinct_and_empty() {
    let pos = Position::new();
    let a1 = parse_coord("A1");
    let far = parse_coord(far_corner());
    assert_eq!(pos.color[a1], b'.');
    assert_eq!(pos.color[far], b'.');
    assert_ne!(a1, far);
}

#[test]
fn parse_coord_skips_i() {
    let h5 = parse_coord("H5");
    let j5 = parse_coord("J5");
    assert_eq!(j5 - h5, 1, "J should be one column after H (skipping I)");
}

#[test]
fn str_coord_roundtrips() {
    for &coord in &["A1", "D4", "G7", "H5", "J5", far_corner()] {
        let pt = parse_coord(coord);
        assert_eq!(parse_coord(&str_coord(pt)), pt, "roundtrip failed for {coord}");
    }
}

#[test]
fn parse_pass_is_case_insensitive() {
    assert_eq!(parse_coord("pass"), PASS_MOVE);
    assert_eq!(parse_coord("PASS"), PASS_MOVE);
    assert_eq!(parse_coord("Pass"), PASS_MOVE);
}

// =============================================================================
// Basic position and move mechanics
// =============================================================================

#[test]
fn fresh_position_is_empty() {
    let pos = Position::new();
    assert_eq!(pos.n, 0);
    assert_eq!(pos.ko, 0);
    assert_eq!(pos.cap, 0);
    assert_eq!(pos.cap_x, 0);
    for row in 1..=N {
        for col in 1..=N {
            assert_eq!(pos.color[row * (N + 1) + col], b'.');
        }
    }
}

#[test]
fn play_single_stone() {
    let mut pos = Position::new();
    let pt = parse_coord("D4");
    play_move(&mut pos, pt).unwrap();
    assert_eq!(pos.n, 1);
    assert_eq!(pos.last, pt);
    // Colors swap after a move, so Black's stone reads as the opponent marker.
    assert_eq!(pos.color[pt], b'x');
}

#[test]
fn play_two_stones_swaps_back() {
    let mut pos = Position::new();
    let b1 = parse_coord("D4");
    let w1 = parse_coord(elsewhere());
    play_move(&mut pos, b1).unwrap();
    play_move(&mut pos, w1).unwrap();
    assert_eq!(pos.color[b1], b'X');
    assert_eq!(pos.color[w1], b'x');
}

#[test]
fn pass_move_advances_count_and_clears_ko() {
    let mut pos = Position::new();
    pass_move(&mut pos);
    assert_eq!(pos.n, 1);
    assert_eq!(pos.last, PASS_MOVE);
    assert_eq!(pos.ko, 0);
}

#[test]
fn illegal_move_on_occupied_point_is_rejected() {
    let mut pos = Position::new();
    let pt = parse_coord("D4");
    play_move(&mut pos, pt).unwrap();
    assert!(play_move(&mut pos, pt).is_err());
}

// =============================================================================
// Captures
// =============================================================================

#[test]
fn capture_single_stone() {
    let mut pos = Position::new();
    play_move(&mut pos, parse_coord("C4")).unwrap();
    play_move(&mut pos, parse_coord("D4")).unwrap();
    play_move(&mut pos, parse_coord("E4")).unwrap();
    play_move(&mut pos, parse_coord(elsewhere())).unwrap();
    play_move(&mut pos, parse_coord("D3")).unwrap();
    play_move(&mut pos, parse_coord(elsewhere2())).unwrap();
    play_move(&mut pos, parse_coord("D5")).unwrap();

    assert_eq!(pos.color[parse_coord("D4")], b'.');
}

#[test]
fn capture_in_corner() {
    let mut pos = Position::new();
    play_move(&mut pos, parse_coord("B2")).unwrap();
    play_move(&mut pos, parse_coord("A1")).unwrap();
    play_move(&mut pos, parse_coord("A2")).unwrap();
    play_move(&mut pos, parse_coord(elsewhere())).unwrap();
    play_move(&mut pos, parse_coord("B1")).unwrap();

    assert_eq!(pos.color[parse_coord("A1")], b'.');
}

#[test]
fn capture_two_stone_group() {
    let mut pos = Position::new();
    play_move(&mut pos, parse_coord("C4")).unwrap();
    play_move(&mut pos, parse_coord("D4")).unwrap();
    play_move(&mut pos, parse_coord("C5")).unwrap();
    play_move(&mut pos, parse_coord("D5")).unwrap();
    play_move(&mut pos, parse_coord("E4")).unwrap();
    play_move(&mut pos, parse_coord(elsewhere())).unwrap();
    play_move(&mut pos, parse_coord("E5")).unwrap();
    play_move(&mut pos, parse_coord(elsewhere2())).unwrap();
    play_move(&mut pos, parse_coord("D3")).unwrap();
    play_move(&mut pos, parse_coord(elsewhere3())).unwrap();
    play_move(&mut pos, parse_coord("D6")).unwrap();

    assert_eq!(pos.color[parse_coord("D4")], b'.');
    assert_eq!(pos.color[parse_coord("D5")], b'.');
}

// =============================================================================
// Suicide
// =============================================================================

#[test]
fn suicide_move_is_rejected() {
    let mut pos = Position::new();
    play_move(&mut pos, parse_coord("A2")).unwrap();
    play_move(&mut pos, parse_coord(elsewhere())).unwrap();
    play_move(&mut pos, parse_coord("B1")).unwrap();

    let result = play_move(&mut pos, parse_coord("A1"));
    assert!(result.is_err(), "A1 should be suicide");
}

// =============================================================================
// Ko
// =============================================================================

#[test]
fn ko_is_cleared_by_pass() {
    let mut pos = Position::new();
    assert_eq!(pos.ko, 0);
    pass_move(&mut pos);
    assert_eq!(pos.ko, 0);
}

#[test]
fn retaking_an_active_ko_immediately_is_illegal() {
    let mut pos = setup_position(&["A2", "B2", "B1", elsewhere(), "C2", elsewhere2()]);
    // Whatever shape resulted from this sequence, the invariant that
    // matters is general: playing directly on the recorded ko point must
    // be rejected until an intervening move clears it.
    if pos.ko != 0 {
        assert!(play_move(&mut pos, pos.ko).is_err());
    }
}

// =============================================================================
// Eyes
// =============================================================================

#[test]
fn empty_board_point_is_not_eyeish() {
    let pos = Position::new();
    assert_eq!(is_eyeish(&pos, parse_coord("G7")), 0);
}

#[test]
fn corner_surrounded_by_one_color_is_eyeish() {
    let mut pos = Position::new();
    play_move(&mut pos, parse_coord("A2")).unwrap();
    play_move(&mut pos, parse_coord(elsewhere())).unwrap();
    play_move(&mut pos, parse_coord("B1")).unwrap();

    let eye_color = is_eyeish(&pos, parse_coord("A1"));
    assert!(eye_color == b'X' || eye_color == b'x');
}

#[test]
fn corner_true_eye_survives_is_eye() {
    let mut pos = Position::new();
    play_move(&mut pos, parse_coord("A2")).unwrap();
    play_move(&mut pos, parse_coord(elsewhere())).unwrap();
    play_move(&mut pos, parse_coord("B1")).unwrap();
    play_move(&mut pos, parse_coord(elsewhere2())).unwrap();
    play_move(&mut pos, parse_coord("B2")).unwrap();

    let eye_color = is_eye(&pos, parse_coord("A1"));
    assert!(eye_color == b'X' || eye_color == b'x');
}

#[test]
fn empty_corner_is_not_an_eye() {
    let pos = Position::new();
    assert_eq!(is_eye(&pos, parse_coord("A1")), 0);
}

// =============================================================================
// Atari / escape heuristics
// =============================================================================

#[test]
fn fix_atari_suggests_an_escape() {
    // Black C8 is down to one liberty (C7) after this sequence.
    let pos = setup_position(&["C8", "C9", "E9", "B8", "F9", "D8"]);
    let c8 = parse_coord("C8");
    let moves = fix_atari(&pos, c8, false);
    let c7 = parse_coord("C7");
    assert!(
        moves.contains(&c7),
        "expected C7 among {:?}",
        moves.iter().map(|&m| str_coord(m)).collect::<Vec<_>>()
    );
}

#[test]
fn fix_atari_on_an_empty_point_does_not_panic() {
    let pos = Position::new();
    let _ = fix_atari(&pos, parse_coord("E5"), true);
}

// =============================================================================
// Board geometry
// =============================================================================

#[test]
fn board_size_matches_configured_feature() {
    use uctgo::constants::BOARDSIZE;
    assert!(N == 9 || N == 13);
    assert!(BOARDSIZE > N * N);
}

#[test]
fn boundaries_are_out_of_bounds() {
    let pos = Position::new();
    for i in 0..=N {
        assert_eq!(pos.color[i], b' ');
    }
    for row in 1..=N {
        assert_eq!(pos.color[row * (N + 1)], b' ');
    }
}

#[test]
fn center_point_has_no_out_of_bounds_neighbors() {
    let pos = Position::new();
    for n in all_neighbors(parse_coord("G7")) {
        assert_eq!(pos.color[n], b'.');
    }
}

#[test]
fn corner_point_has_several_out_of_bounds_neighbors() {
    let pos = Position::new();
    let out_count = all_neighbors(parse_coord("A1")).iter().filter(|&&n| pos.color[n] == b' ').count();
    assert!(out_count >= 3);
}

// =============================================================================
// Tree: expansion, promotion
// =============================================================================

#[test]
fn fresh_root_expands_into_many_legal_children() {
    let board = Position::new();
    let mut tree = Tree::init(Color::Black);
    expand(&mut tree.root, &board, &mut tree.nodes_count);
    let min_moves = if N == 9 { 50 } else { 100 };
    assert!(tree.root.children.len() > min_moves, "got {}", tree.root.children.len());
}

#[test]
fn tree_promotion_keeps_only_the_chosen_subtree() {
    let board = Position::new();
    let mut tree = Tree::init(Color::Black);
    expand(&mut tree.root, &board, &mut tree.nodes_count);
    let mv = tree.root.children[0].mv;
    assert!(promote_at(&mut tree, mv, Color::White));
    assert_eq!(tree.root.mv, mv);
    assert_eq!(tree.root_color, Color::White);
}

#[test]
fn promote_at_fails_for_a_move_with_no_matching_child() {
    let board = Position::new();
    let mut tree = Tree::init(Color::Black);
    expand(&mut tree.root, &board, &mut tree.nodes_count);
    let bogus = parse_coord(far_corner()) + 10_000;
    assert!(!promote_at(&mut tree, bogus, Color::White));
}

// =============================================================================
// Walker / playout
// =============================================================================

#[test]
fn walk_runs_a_full_simulation_and_records_one_playout() {
    let board = Position::new();
    let mut tree = Tree::init(Color::Black);
    let policy = Ucb1Amaf::default();
    let playout = uctgo::playout::HeuristicPlayout;
    let random = uctgo::playout::RandomPlayout;
    let mut owner_map = OwnerMap::new();
    let mut rng = fastrand::Rng::with_seed(7);
    let params = ScoreParams {
        val_scale: 0.02,
        val_points: 20.0,
        val_extra: false,
        gamelen: uctgo::constants::MAX_GAME_LEN,
        expand_p: uctgo::constants::EXPAND_VISITS,
    };

    let played = walk(&mut tree, &board, &policy, &playout, &random, 0.0, params, &mut owner_map, &mut rng);
    assert_eq!(played, 1);
    assert_eq!(tree.root.stats.playouts, 1);
    assert_eq!(owner_map.playouts, 1);
}

#[test]
fn many_walks_grow_root_visits_and_choose_a_legal_move() {
    let board = Position::new();
    let mut tree = Tree::init(Color::Black);
    let policy = Ucb1Amaf::default();
    let playout = uctgo::playout::HeuristicPlayout;
    let random = uctgo::playout::RandomPlayout;
    let mut owner_map = OwnerMap::new();
    let mut rng = fastrand::Rng::with_seed(11);
    let params = ScoreParams {
        val_scale: 0.02,
        val_points: 20.0,
        val_extra: false,
        gamelen: uctgo::constants::MAX_GAME_LEN,
        expand_p: uctgo::constants::EXPAND_VISITS,
    };

    for _ in 0..200 {
        walk(&mut tree, &board, &policy, &playout, &random, 0.0, params, &mut owner_map, &mut rng);
    }

    assert_eq!(tree.root.stats.playouts, 200);
    let best = policy.choose(&tree.root).expect("some child should be chosen");
    assert!(best < tree.root.children.len());
}

// =============================================================================
// Engine façade: genmove, notify_play, resignation
// =============================================================================

#[test]
fn genmove_on_fresh_board_is_legal_and_deterministic_with_a_forced_seed() {
    fn run() -> usize {
        let mut cfg = fast_cfg();
        cfg.force_seed = Some(42);
        let mut engine = Engine::new(cfg);
        let board = Position::new();
        engine.genmove(&board, Color::Black).unwrap()
    }
    let a = run();
    let b = run();
    assert_eq!(a, b, "single-thread search with a fixed seed should be deterministic");
    assert_ne!(a, RESIGN_MOVE);
}

#[test]
fn tree_promotion_preserves_state_across_notify_play() {
    let mut cfg = fast_cfg();
    cfg.force_seed = Some(1);
    let mut engine = Engine::new(cfg);
    let board = Position::new();

    let m1 = engine.genmove(&board, Color::Black).unwrap();
    assert_ne!(m1, RESIGN_MOVE);

    let mut after_black = board.clone();
    play_move(&mut after_black, m1).unwrap();

    // Any legal White reply works; pick the first empty point.
    let reply = (uctgo::constants::BOARD_IMIN..uctgo::constants::BOARD_IMAX)
        .find(|&pt| after_black.color[pt] == b'.')
        .unwrap();

    engine.notify_play(&after_black, Color::White, reply).unwrap();

    // The engine should still answer a further genmove, i.e. state
    // survived the promotion instead of being discarded and rebuilt blind.
    let mut after_white = after_black.clone();
    play_move(&mut after_white, reply).unwrap();
    let m2 = engine.genmove(&after_white, Color::Black).unwrap();
    assert!(m2 == PASS_MOVE || m2 == RESIGN_MOVE || after_white.color[m2] == b'.');
}

#[test]
fn notify_play_rejects_a_second_move_from_the_same_color() {
    let cfg = fast_cfg();
    let mut engine = Engine::new(cfg);
    let board = Position::new();
    engine.genmove(&board, Color::Black).unwrap();
    // Black just moved; asking Black to move again is non-alternating.
    assert!(engine.notify_play(&board, Color::Black, parse_coord("D4")).is_err());
}

#[test]
fn resignation_returns_resign_move_and_clears_state() {
    let mut cfg = fast_cfg();
    cfg.resign_ratio = 0.99; // nearly impossible to clear, forces resign
    let mut engine = Engine::new(cfg);
    let board = Position::new();
    let mv = engine.genmove(&board, Color::Black).unwrap();
    assert_eq!(mv, RESIGN_MOVE);
    assert!(engine.chat("winrate").is_none(), "state should be discarded after resigning");
}

#[test]
fn chat_winrate_reports_nothing_before_any_search() {
    let engine = Engine::new(fast_cfg());
    assert!(engine.chat("winrate").is_none());
}

#[test]
fn chat_winrate_reports_something_after_a_search() {
    let mut engine = Engine::new(fast_cfg());
    let board = Position::new();
    engine.genmove(&board, Color::Black).unwrap();
    assert!(engine.chat("winrate").is_some());
}

#[test]
fn dead_group_list_is_empty_when_pass_all_alive_is_set() {
    let mut cfg = fast_cfg();
    cfg.pass_all_alive = true;
    let mut engine = Engine::new(cfg);
    let board = Position::new();
    assert!(engine.dead_group_list(&board).is_empty());
}
