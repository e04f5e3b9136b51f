use serde::{Deserialize, Serialize};

/// Pixel coordinates on the rendering surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A growth node. `sprouts` counts the branches already grown from it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Node {
    pub x: f32,
    pub y: f32,
    pub sprouts: u32,
}

impl Node {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y, sprouts: 0 }
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// A branch between two nodes, drawn progressively.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Line {
    pub start: Point,
    pub end: Point,
    pub progress: f32, // 0.0 = pending, 1.0 = complete
    pub phase: u32,
}

impl Line {
    pub fn is_complete(&self) -> bool {
        self.progress >= 1.0
    }

    /// Pending or mid-animation.
    pub fn is_active(&self) -> bool {
        self.progress < 1.0
    }
}

/// What the render sink receives for one line each frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RenderedLine {
    pub start: Point,
    pub end: Point,
    pub rendered_point: Point,
    pub phase: u32,
    pub is_complete: bool,
}
