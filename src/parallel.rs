//! Root parallelization: independent workers, each searching a private
//! copy of the tree from the same board, merged back together once every
//! worker has joined.
//!
//! The completion handshake mirrors a classic pthread mutex+condvar
//! pattern: each worker pushes its index onto a shared queue under a
//! mutex and notifies a condvar; the driver thread wakes, drains the
//! queue (so two workers finishing back to back both get consumed
//! instead of one clobbering the other), joins each worker, merges its
//! tree and owner map, and repeats. A `halt` flag is set once at least
//! half the workers have joined, so the stragglers wind down their
//! in-flight playout and return early instead of running to their full
//! budget.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;

use crate::config::{Config, ThreadModel};
use crate::owner::OwnerMap;
use crate::playout::PlayoutPolicy;
use crate::policy::TreePolicy;
use crate::position::Position;
use crate::tree::{merge, normalize, Tree};
use crate::walker::{walk, ScoreParams};

/// Run the search budget described by `cfg` against `tree`, using
/// `cfg.threads` worker threads under root parallelization (or a single
/// in-line loop when `thread_model` is `None`, i.e. `threads == 0`).
/// Returns the total number of playouts actually run.
pub fn uct_search(
    tree: &mut Tree,
    board: &Position,
    policy: &(dyn TreePolicy + Sync),
    playout_policy: &(dyn PlayoutPolicy + Sync),
    random_policy: &(dyn PlayoutPolicy + Sync),
    cfg: &Config,
    owner_map: &mut OwnerMap,
    seed: u64,
) -> u32 {
    match cfg.thread_model {
        ThreadModel::None => {
            let mut rng = fastrand::Rng::with_seed(seed);
            uct_playouts(tree, board, policy, playout_policy, random_policy, cfg, owner_map, &mut rng, None)
        }
        ThreadModel::Root => uct_threaded_playouts(
            tree, board, policy, playout_policy, random_policy, cfg, owner_map, seed,
        ),
    }
}

/// Run playouts in a single thread until the budget, the halt flag, or
/// the early-stop heuristic (best root child's value clears
/// `loss_threshold` after at least 5000 playouts) fires.
#[allow(clippy::too_many_arguments)]
fn uct_playouts(
    tree: &mut Tree,
    board: &Position,
    policy: &dyn TreePolicy,
    playout_policy: &dyn PlayoutPolicy,
    random_policy: &dyn PlayoutPolicy,
    cfg: &Config,
    owner_map: &mut OwnerMap,
    rng: &mut fastrand::Rng,
    halt: Option<&AtomicBool>,
) -> u32 {
    let params = ScoreParams {
        val_scale: cfg.val_scale,
        val_points: cfg.val_points,
        val_extra: cfg.val_extra,
        gamelen: cfg.gamelen,
        expand_p: cfg.expand_p,
    };

    let mut played = 0u32;
    for i in 0..cfg.games {
        if let Some(h) = halt {
            if h.load(Ordering::Relaxed) {
                break;
            }
        }

        played += walk(
            tree,
            board,
            policy,
            playout_policy,
            random_policy,
            cfg.random_policy_chance,
            params,
            owner_map,
            rng,
        );

        if i > 5000 {
            let best = tree.root.children.iter().map(|c| c.value()).fold(0.0_f64, f64::max);
            if best > cfg.loss_threshold {
                break;
            }
        }
    }
    played
}

#[allow(clippy::too_many_arguments)]
fn uct_threaded_playouts(
    tree: &mut Tree,
    board: &Position,
    policy: &(dyn TreePolicy + Sync),
    playout_policy: &(dyn PlayoutPolicy + Sync),
    random_policy: &(dyn PlayoutPolicy + Sync),
    cfg: &Config,
    owner_map: &mut OwnerMap,
    seed: u64,
) -> u32 {
    let n = cfg.threads;
    let halt = Arc::new(AtomicBool::new(false));
    let finish: Arc<(Mutex<VecDeque<usize>>, Condvar)> =
        Arc::new((Mutex::new(VecDeque::new()), Condvar::new()));

    thread::scope(|scope| {
        let mut handles = Vec::with_capacity(n);
        for i in 0..n {
            let mut worker_tree = tree.clone();
            let board = board.clone();
            let halt = Arc::clone(&halt);
            let finish = Arc::clone(&finish);
            let worker_seed = seed.wrapping_add(i as u64).wrapping_mul(0x9E3779B97F4A7C15);

            handles.push(Some(scope.spawn(move || {
                let mut rng = fastrand::Rng::with_seed(worker_seed);
                let mut local_owner = OwnerMap::new();
                let played = uct_playouts(
                    &mut worker_tree,
                    &board,
                    policy,
                    playout_policy,
                    random_policy,
                    cfg,
                    &mut local_owner,
                    &mut rng,
                    Some(&halt),
                );

                let (lock, cvar) = &*finish;
                let mut queue = lock.lock().unwrap();
                queue.push_back(i);
                cvar.notify_one();
                drop(queue);

                (worker_tree, local_owner, played)
            })));
        }

        let mut joined = 0usize;
        let mut total_played = 0u32;
        let (lock, cvar) = &*finish;

        while joined < n {
            let mut queue = lock.lock().unwrap();
            while queue.is_empty() {
                queue = cvar.wait(queue).unwrap();
            }
            let drained: Vec<usize> = queue.drain(..).collect();
            drop(queue);

            for finished_idx in drained {
                let handle = handles[finished_idx].take().expect("worker signaled completion twice");
                let (worker_tree, worker_owner, played) = handle.join().expect("search worker panicked");

                total_played += played;
                merge(&mut tree.root, worker_tree.root);
                tree.nodes_count += worker_tree.nodes_count;
                owner_map.merge(&worker_owner);

                joined += 1;
                if joined >= n.div_ceil(2) {
                    halt.store(true, Ordering::Relaxed);
                }
            }
        }

        normalize(&mut tree.root, n as u32);
        total_played
    })
}
