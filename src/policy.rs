//! Selection policy: how to pick a child to descend into, and how to pick
//! the move to finally play at the root.
//!
//! Kept as a trait so the walker and the engine façade don't need to know
//! which formula is in play; [`Ucb1`] is the textbook UCB1 bound, and
//! [`Ucb1Amaf`] is the RAVE-blended urgency carried over from the
//! reference engine's `rave_urgency`, tie-broken the same way (shuffle the
//! candidate children, then take the max).

use crate::tree::TreeNode;

pub trait TreePolicy: Send + Sync {
    /// How urgently to explore `child`, given the total (real + prior)
    /// visit count of its parent.
    fn urgency(&self, parent_playouts: u64, child: &TreeNode) -> f64;

    /// Pick a child to descend into. Default: shuffle to break ties
    /// fairly, then take the child with maximum urgency.
    fn select_child(&self, node: &mut TreeNode, rng: &mut fastrand::Rng) -> usize {
        if node.children.is_empty() {
            return 0;
        }
        let parent_playouts = node.total_playouts() as u64;
        rng.shuffle(&mut node.children);
        node.children
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| {
                self.urgency(parent_playouts, a)
                    .partial_cmp(&self.urgency(parent_playouts, b))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    /// Pick the final move to play at the root: the most-visited child
    /// (the "robust child" choice), not the highest win rate, since visit
    /// count is a more stable signal once the budget is spent.
    fn choose(&self, root: &TreeNode) -> Option<usize> {
        root.children
            .iter()
            .enumerate()
            .max_by_key(|(_, c)| c.total_playouts())
            .map(|(i, _)| i)
    }
}

/// Plain UCB1: empirical mean plus a confidence-bound exploration term
/// that shrinks as the child gets more visits and grows with the parent's
/// total visit count.
#[derive(Debug, Clone, Copy)]
pub struct Ucb1 {
    pub exploration: f64,
}

impl Default for Ucb1 {
    fn default() -> Self {
        Ucb1 { exploration: std::f64::consts::SQRT_2 }
    }
}

impl TreePolicy for Ucb1 {
    fn urgency(&self, parent_playouts: u64, child: &TreeNode) -> f64 {
        let n = child.total_playouts() as f64;
        if n == 0.0 {
            return f64::INFINITY;
        }
        let mean = child.value();
        let parent_n = (parent_playouts.max(1)) as f64;
        mean + self.exploration * (parent_n.ln() / n).sqrt()
    }
}

/// UCB1 blended with All-Moves-As-First (RAVE) statistics. The AMAF
/// estimate is weighted by `beta`, which decays toward zero as the node's
/// own visit count grows past `rave_equiv`, so RAVE dominates early
/// (when there's little direct experience) and fades as real playouts
/// accumulate.
#[derive(Debug, Clone, Copy)]
pub struct Ucb1Amaf {
    pub rave_equiv: f64,
}

impl Default for Ucb1Amaf {
    fn default() -> Self {
        Ucb1Amaf { rave_equiv: crate::constants::RAVE_EQUIV as f64 }
    }
}

impl TreePolicy for Ucb1Amaf {
    fn urgency(&self, _parent_playouts: u64, child: &TreeNode) -> f64 {
        let v = child.total_playouts() as f64;
        let expectation = child.value();

        if child.amaf_stats.playouts == 0 {
            return expectation;
        }

        let av = child.amaf_stats.playouts as f64;
        let rave_expectation = child.amaf_stats.value_sum_doubled as f64 / (2.0 * av);
        let beta = av / (av + v + v * av / self.rave_equiv);
        beta * rave_expectation + (1.0 - beta) * expectation
    }
}
