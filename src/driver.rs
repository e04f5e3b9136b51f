//! Animation driver - advances line progress on the host's frame clock and
//! paces growth phases.
//!
//! Each frame:
//! 1. Normalize the elapsed time into `dt` (capped at `max_frame_ms`).
//! 2. Advance every unfinished line by `progress_per_frame * dt`.
//! 3. If this frame finished the current phase and it has dwelled
//!    `phase_time_ms`, schedule one growth request through [`Deferred`].
//! 4. Otherwise, if no line was drawing and nothing is pending, grow
//!    immediately. After a failed retry this stays quiet until a resize.
//!
//! A failed growth request gets exactly one retry after `retry_delay_ms`;
//! if that fails too the driver is exhausted until the next resize.
//!
//! There is at most one pending request, identified by a [`GrowthToken`].
//! Resizing or shutting down cancels it, and any callback whose token does
//! not match the pending one is dropped.

use ::rand as external_rand;
use external_rand::Rng;
use tracing::{debug, info};

use crate::config::LoaderConfig;
use crate::geometry::{ease_in_out_cubic, lerp_point};
use crate::graph::GrowthGraph;
use crate::growth::GrowthEngine;
use crate::timers::{Attempt, Deferred, GrowthToken, TaskId};
use crate::types::RenderedLine;

#[derive(Clone, Copy, Debug)]
struct Pending {
    token: GrowthToken,
    task: TaskId,
}

pub struct AnimationDriver {
    config: LoaderConfig,
    engine: GrowthEngine,
    graph: GrowthGraph,
    width: f32,
    height: f32,
    last_frame_ms: Option<f64>,
    phase_started_ms: f64,
    pending: Option<Pending>,
    next_seq: u64,
    exhausted: bool,
    torn_down: bool,
}

#[inline]
pub(crate) fn sanitize_dimension(v: f32) -> f32 {
    if v.is_finite() {
        v.max(0.0)
    } else {
        0.0
    }
}

impl AnimationDriver {
    pub fn new(config: LoaderConfig, width: f32, height: f32, now_ms: f64) -> Self {
        let engine = GrowthEngine::from_config(&config);
        let graph = GrowthGraph::new(config.origin, 0);
        Self {
            config,
            engine,
            graph,
            width: sanitize_dimension(width),
            height: sanitize_dimension(height),
            last_frame_ms: None,
            phase_started_ms: now_ms,
            pending: None,
            next_seq: 0,
            exhausted: false,
            torn_down: false,
        }
    }

    pub fn graph(&self) -> &GrowthGraph {
        &self.graph
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    pub fn pending_token(&self) -> Option<GrowthToken> {
        self.pending.map(|p| p.token)
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Advance animation by one host frame.
    pub fn tick<R: Rng, D: Deferred>(&mut self, now_ms: f64, rng: &mut R, deferred: &mut D) {
        if self.torn_down {
            return;
        }

        let elapsed = self
            .last_frame_ms
            .map_or(0.0, |last| (now_ms - last).max(0.0));
        self.last_frame_ms = Some(now_ms);
        let dt = (elapsed.min(self.config.max_frame_ms) / self.config.target_frame_ms) as f32;

        // Whether anything was still drawing when this frame began
        let was_active = self.graph.any_active();
        let advance = self.config.progress_per_frame * dt;
        for line in self.graph.lines.iter_mut().filter(|l| l.is_active()) {
            line.progress = (line.progress + advance).min(1.0);
        }

        if self.pending.is_some() || self.exhausted {
            return;
        }

        let dwelled = now_ms - self.phase_started_ms >= self.config.phase_time_ms;
        if was_active && dwelled && self.graph.is_phase_settled() {
            self.schedule(now_ms, Attempt::First, deferred);
        } else if !was_active {
            debug!(phase = self.graph.phase, "nothing drawing, growing immediately");
            self.run_growth(Attempt::First, now_ms, rng, deferred);
        }
    }

    /// Deliver a deferred growth request. Returns whether it was applied;
    /// tokens that are not the current pending request are ignored.
    pub fn on_deferred<R: Rng, D: Deferred>(
        &mut self,
        token: GrowthToken,
        now_ms: f64,
        rng: &mut R,
        deferred: &mut D,
    ) -> bool {
        if self.torn_down {
            return false;
        }
        match self.pending {
            Some(p) if p.token == token && token.generation == self.graph.generation => {}
            _ => {
                debug!(?token, generation = self.graph.generation, "ignoring stale growth callback");
                return false;
            }
        }
        self.pending = None;
        self.run_growth(token.attempt, now_ms, rng, deferred);
        true
    }

    /// Request a growth step right now, outside the dwell timer.
    pub fn grow_now<R: Rng, D: Deferred>(&mut self, now_ms: f64, rng: &mut R, deferred: &mut D) -> bool {
        if self.torn_down {
            return false;
        }
        self.cancel_pending(deferred);
        self.run_growth(Attempt::First, now_ms, rng, deferred)
    }

    /// Discard all growth and restart from the origin on a surface of the new size.
    pub fn resize<R: Rng, D: Deferred>(
        &mut self,
        width: f32,
        height: f32,
        now_ms: f64,
        rng: &mut R,
        deferred: &mut D,
    ) {
        if self.torn_down {
            return;
        }
        self.cancel_pending(deferred);

        let generation = self.graph.generation + 1;
        self.graph = GrowthGraph::new(self.config.origin, generation);
        self.width = sanitize_dimension(width);
        self.height = sanitize_dimension(height);
        self.phase_started_ms = now_ms;
        self.exhausted = false;
        info!(
            width = self.width,
            height = self.height,
            generation,
            "surface resized, restarting growth"
        );

        self.run_growth(Attempt::First, now_ms, rng, deferred);
    }

    /// Stop for good: cancel outstanding work and ignore every later call.
    pub fn shutdown<D: Deferred>(&mut self, deferred: &mut D) {
        self.cancel_pending(deferred);
        self.torn_down = true;
    }

    /// Keep the frame baseline current without advancing anything (used while paused).
    pub fn hold(&mut self, now_ms: f64) {
        self.last_frame_ms = Some(now_ms);
    }

    /// Drawable snapshot with eased interpolation points.
    pub fn frame(&self) -> Vec<RenderedLine> {
        self.graph
            .lines
            .iter()
            .map(|line| RenderedLine {
                start: line.start,
                end: line.end,
                rendered_point: lerp_point(line.start, line.end, ease_in_out_cubic(line.progress)),
                phase: line.phase,
                is_complete: line.is_complete(),
            })
            .collect()
    }

    fn run_growth<R: Rng, D: Deferred>(
        &mut self,
        attempt: Attempt,
        now_ms: f64,
        rng: &mut R,
        deferred: &mut D,
    ) -> bool {
        let (width, height) = (self.width, self.height);
        let grew = self.engine.step(&mut self.graph, width, height, rng);
        if grew {
            self.phase_started_ms = now_ms;
            self.exhausted = false;
            return true;
        }

        match attempt {
            Attempt::First => {
                debug!(phase = self.graph.phase, "dead end, retrying once");
                self.schedule(now_ms + self.config.retry_delay_ms, Attempt::Retry, deferred);
            }
            Attempt::Retry => {
                info!(
                    nodes = self.graph.nodes.len(),
                    lines = self.graph.lines.len(),
                    "growth exhausted"
                );
                self.exhausted = true;
            }
        }
        false
    }

    fn schedule<D: Deferred>(&mut self, at_ms: f64, attempt: Attempt, deferred: &mut D) {
        let token = GrowthToken {
            generation: self.graph.generation,
            seq: self.next_seq,
            attempt,
        };
        self.next_seq += 1;
        let task = deferred.schedule(at_ms, token);
        self.pending = Some(Pending { token, task });
    }

    fn cancel_pending<D: Deferred>(&mut self, deferred: &mut D) {
        if let Some(p) = self.pending.take() {
            deferred.cancel(p.task);
        }
    }
}
