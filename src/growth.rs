// Phase growth engine - one discrete growth step over the graph

use ::rand as external_rand;
use external_rand::Rng;
use rayon::prelude::*;
use tracing::debug;

use crate::config::LoaderConfig;
use crate::geometry::{in_bounds, intersects, overlaps_existing_node};
use crate::graph::GrowthGraph;
use crate::selector::{candidates, root_count, select_roots, shuffled_directions};
use crate::types::{Line, Node, Point};

// Below this many committed lines a sequential scan is faster than rayon
const PARALLEL_SCAN_MIN_LINES: usize = 2048;

#[derive(Clone, Debug)]
pub struct GrowthEngine {
    pub max_sprouts: u32,
    pub branch_length: f32,
    pub node_tolerance: f32,
    pub endpoint_tolerance: f32,
}

impl GrowthEngine {
    pub fn from_config(config: &LoaderConfig) -> Self {
        Self {
            max_sprouts: config.max_sprouts,
            branch_length: config.branch_length,
            node_tolerance: config.node_tolerance,
            endpoint_tolerance: config.endpoint_tolerance,
        }
    }

    /// Run one growth phase. Returns true iff at least one branch was added.
    ///
    /// The phase counter always advances; nodes and lines are only touched
    /// when something is committed. `width`/`height` are the surface size for
    /// the whole step.
    pub fn step<R: Rng>(&self, graph: &mut GrowthGraph, width: f32, height: f32, rng: &mut R) -> bool {
        graph.phase += 1;

        let pool = candidates(&graph.nodes, self.max_sprouts);
        if pool.is_empty() {
            debug!(phase = graph.phase, "no growable candidates");
            return false;
        }

        let count = root_count(graph.nodes.len(), pool.len());
        let roots = select_roots(&graph.nodes, pool, count, self.max_sprouts, rng);

        let mut new_nodes: Vec<Node> = Vec::with_capacity(roots.len());
        let mut new_lines: Vec<Line> = Vec::with_capacity(roots.len());

        for root_idx in roots {
            let start = graph.nodes[root_idx].point();
            for (dx, dy) in shuffled_directions(rng) {
                if graph.nodes[root_idx].sprouts >= self.max_sprouts {
                    break;
                }
                let end = Point::new(
                    start.x + dx as f32 * self.branch_length,
                    start.y + dy as f32 * self.branch_length,
                );
                if !self.admissible(graph, &new_nodes, &new_lines, start, end, width, height) {
                    continue;
                }

                graph.nodes[root_idx].sprouts += 1;
                new_nodes.push(Node::new(end.x, end.y));
                new_lines.push(Line {
                    start,
                    end,
                    progress: 0.0,
                    phase: graph.phase,
                });
                // One sprout per root per phase
                break;
            }
        }

        if new_nodes.is_empty() {
            debug!(phase = graph.phase, "no valid direction for any root");
            return false;
        }

        debug!(
            phase = graph.phase,
            added = new_nodes.len(),
            total_nodes = graph.nodes.len() + new_nodes.len(),
            "committing branches"
        );
        graph.commit(new_nodes, new_lines);
        true
    }

    /// Whether a branch `start -> end` may be added, given the committed graph
    /// and whatever this step has already proposed.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn admissible(
        &self,
        graph: &GrowthGraph,
        pending_nodes: &[Node],
        pending_lines: &[Line],
        start: Point,
        end: Point,
        width: f32,
        height: f32,
    ) -> bool {
        if !in_bounds(end, width, height) {
            return false;
        }
        if overlaps_existing_node(end, graph.nodes.iter().chain(pending_nodes), self.node_tolerance) {
            return false;
        }
        if self.crosses_committed(&graph.lines, start, end) {
            return false;
        }
        // Siblings from this same step must not cross each other either
        !pending_lines
            .iter()
            .any(|l| intersects(start, end, l.start, l.end, self.endpoint_tolerance))
    }

    fn crosses_committed(&self, lines: &[Line], start: Point, end: Point) -> bool {
        let tol = self.endpoint_tolerance;
        if lines.len() >= PARALLEL_SCAN_MIN_LINES {
            lines
                .par_iter()
                .any(|l| intersects(start, end, l.start, l.end, tol))
        } else {
            lines
                .iter()
                .any(|l| intersects(start, end, l.start, l.end, tol))
        }
    }
}
