// Weighted root selection and direction shuffling for a growth step

use ::rand as external_rand;
use external_rand::seq::SliceRandom;
use external_rand::Rng;

use crate::types::Node;

/// The 8 compass offsets, excluding (0, 0).
pub const DIRECTIONS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Indices of nodes that can still sprout.
pub fn candidates(nodes: &[Node], max_sprouts: u32) -> Vec<usize> {
    nodes
        .iter()
        .enumerate()
        .filter(|(_, n)| n.sprouts < max_sprouts)
        .map(|(i, _)| i)
        .collect()
}

/// Nodes with fewer branches weigh more, which keeps growth balanced.
#[inline]
pub fn weight(node: &Node, max_sprouts: u32) -> u32 {
    (max_sprouts + 1).saturating_sub(node.sprouts)
}

/// `min(1 + floor(log2(node_count + 1)), candidate_count)`
pub fn root_count(node_count: usize, candidate_count: usize) -> usize {
    let scaled = 1 + (node_count + 1).ilog2() as usize;
    scaled.min(candidate_count)
}

/// Roulette selection without replacement over `pool` (node indices).
///
/// Each pick removes the chosen node and recomputes the total weight. A draw
/// that lands on nothing aborts the whole selection and returns no roots.
pub fn select_roots<R: Rng>(
    nodes: &[Node],
    mut pool: Vec<usize>,
    count: usize,
    max_sprouts: u32,
    rng: &mut R,
) -> Vec<usize> {
    let mut selected = Vec::with_capacity(count);
    while selected.len() < count {
        match draw(nodes, &pool, max_sprouts, rng) {
            Some(slot) => selected.push(pool.swap_remove(slot)),
            None => return Vec::new(),
        }
    }
    selected
}

fn draw<R: Rng>(nodes: &[Node], pool: &[usize], max_sprouts: u32, rng: &mut R) -> Option<usize> {
    let total: u32 = pool.iter().map(|&i| weight(&nodes[i], max_sprouts)).sum();
    if total == 0 {
        return None;
    }
    let r = rng.gen_range(0..total);
    let mut running = 0;
    for (slot, &i) in pool.iter().enumerate() {
        running += weight(&nodes[i], max_sprouts);
        if running > r {
            return Some(slot);
        }
    }
    None
}

/// A fresh Fisher-Yates shuffle of the 8 directions.
pub fn shuffled_directions<R: Rng>(rng: &mut R) -> [(i8, i8); 8] {
    let mut dirs = DIRECTIONS;
    dirs.shuffle(rng);
    dirs
}
