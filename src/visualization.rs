use macroquad::prelude::*;

use crate::color::Rgba;
use crate::loader::LoaderStats;
use crate::types::RenderedLine;

/// Resolved colors and stroke for drawing a frame.
pub struct LineStyle {
    pub line: Color,
    pub marker: Color,
    pub width: f32,
}

impl LineStyle {
    pub fn new(line: Rgba, marker: Rgba, width: f32) -> Self {
        Self {
            line: to_color(line),
            marker: to_color(marker),
            width,
        }
    }
}

fn to_color(c: Rgba) -> Color {
    Color::new(c.r, c.g, c.b, c.a)
}

/// Draw each line up to its eased point, with a small marker at the tip.
pub fn draw_growth(frame: &[RenderedLine], style: &LineStyle) {
    for line in frame {
        let tip = line.rendered_point;
        draw_line(line.start.x, line.start.y, tip.x, tip.y, style.width, style.line);
        // Round joins: cap the segment start so branches meet cleanly
        draw_circle(line.start.x, line.start.y, style.width * 0.5, style.line);
        draw_circle_lines(tip.x, tip.y, 1.0, 1.0, style.marker);
    }
}

pub fn draw_stats(stats: &LoaderStats) {
    let fps = get_fps();
    let text = format!(
        "Nodes: {} | Lines: {} | Phase: {} | Generation: {} | FPS: {}",
        stats.nodes, stats.lines, stats.phase, stats.generation, fps
    );
    draw_text(&text, 10.0, screen_height() - 30.0, 16.0, Color::new(1.0, 1.0, 1.0, 0.7));

    let status = if stats.paused {
        "PAUSED - Press SPACE to resume"
    } else if stats.exhausted {
        "Growth exhausted - Press R to restart"
    } else {
        "SPACE=Pause | R=Reset | H=Stats | P=Screenshot"
    };
    draw_text(status, 10.0, screen_height() - 12.0, 14.0, Color::new(0.8, 0.8, 1.0, 0.6));
}
