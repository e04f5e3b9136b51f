use crate::types::{Line, Node, Point};

/// Nodes and lines grown so far, plus the phase counter.
///
/// `generation` identifies this instance: a resize builds a new graph with a
/// higher generation, so work scheduled against an older one can be told apart.
#[derive(Clone, Debug)]
pub struct GrowthGraph {
    pub nodes: Vec<Node>,
    pub lines: Vec<Line>,
    pub phase: u32,
    pub generation: u64,
}

impl GrowthGraph {
    pub fn new(origin: Point, generation: u64) -> Self {
        Self {
            nodes: vec![Node::new(origin.x, origin.y)],
            lines: Vec::new(),
            phase: 0,
            generation,
        }
    }

    /// Append a batch produced by one growth step.
    pub fn commit(&mut self, nodes: Vec<Node>, lines: Vec<Line>) {
        self.nodes.extend(nodes);
        self.lines.extend(lines);
    }

    pub fn phase_lines(&self, phase: u32) -> impl Iterator<Item = &Line> {
        self.lines.iter().filter(move |l| l.phase == phase)
    }

    /// All lines of the current phase have finished drawing.
    /// A phase with no lines is trivially settled.
    pub fn is_phase_settled(&self) -> bool {
        self.phase_lines(self.phase).all(Line::is_complete)
    }

    pub fn any_active(&self) -> bool {
        self.lines.iter().any(Line::is_active)
    }
}
