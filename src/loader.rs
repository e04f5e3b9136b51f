use ::rand as external_rand;
use external_rand::Rng;
use serde::Serialize;

use crate::config::LoaderConfig;
use crate::driver::{sanitize_dimension, AnimationDriver};
use crate::timers::TimerQueue;
use crate::types::RenderedLine;

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct LoaderStats {
    pub nodes: usize,
    pub lines: usize,
    pub phase: u32,
    pub generation: u64,
    pub animating: usize,
    pub pending: bool,
    pub exhausted: bool,
    pub paused: bool,
    pub width: f32,
    pub height: f32,
}

// Loader - the driver, its timer queue and host control flags
pub struct Loader {
    pub driver: AnimationDriver,
    pub timers: TimerQueue,
    pub config: LoaderConfig,
    pub paused: bool,
}

impl Loader {
    /// Build a loader for a surface and start the first phase right away.
    pub fn new<R: Rng>(config: LoaderConfig, width: f32, height: f32, now_ms: f64, rng: &mut R) -> Self {
        let mut timers = TimerQueue::new();
        let mut driver = AnimationDriver::new(config.clone(), width, height, now_ms);
        driver.grow_now(now_ms, rng, &mut timers);
        Self {
            driver,
            timers,
            config,
            paused: false,
        }
    }

    /// One host frame: deliver due callbacks, then tick.
    pub fn advance<R: Rng>(&mut self, now_ms: f64, rng: &mut R) {
        if self.paused {
            self.driver.hold(now_ms);
            return;
        }
        for token in self.timers.drain_due(now_ms) {
            self.driver.on_deferred(token, now_ms, rng, &mut self.timers);
        }
        self.driver.tick(now_ms, rng, &mut self.timers);
    }

    /// Report the current surface size; restarts growth only if it changed.
    pub fn set_surface<R: Rng>(&mut self, width: f32, height: f32, now_ms: f64, rng: &mut R) -> bool {
        let (w, h) = self.driver.size();
        if w == sanitize_dimension(width) && h == sanitize_dimension(height) {
            return false;
        }
        self.driver.resize(width, height, now_ms, rng, &mut self.timers);
        true
    }

    pub fn reset<R: Rng>(&mut self, now_ms: f64, rng: &mut R) {
        let (w, h) = self.driver.size();
        self.driver.resize(w, h, now_ms, rng, &mut self.timers);
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    pub fn shutdown(&mut self) {
        self.driver.shutdown(&mut self.timers);
        self.timers.clear();
    }

    pub fn frame(&self) -> Vec<RenderedLine> {
        self.driver.frame()
    }

    pub fn stats(&self) -> LoaderStats {
        let graph = self.driver.graph();
        let (width, height) = self.driver.size();
        LoaderStats {
            nodes: graph.nodes.len(),
            lines: graph.lines.len(),
            phase: graph.phase,
            generation: graph.generation,
            animating: graph.lines.iter().filter(|l| l.is_active()).count(),
            pending: self.driver.has_pending(),
            exhausted: self.driver.is_exhausted(),
            paused: self.paused,
            width,
            height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::rand::rngs::StdRng;
    use ::rand::SeedableRng;

    fn loader(width: f32, height: f32) -> (Loader, StdRng) {
        let mut rng = StdRng::seed_from_u64(21);
        let loader = Loader::new(LoaderConfig::default(), width, height, 0.0, &mut rng);
        (loader, rng)
    }

    fn run(loader: &mut Loader, rng: &mut StdRng, from: f64, to: f64) {
        let mut now = from;
        while now <= to {
            loader.advance(now, rng);
            now += 16.0;
        }
    }

    #[test]
    fn starts_growing_immediately() {
        let (loader, _) = loader(120.0, 80.0);
        let stats = loader.stats();
        assert_eq!(stats.nodes, 2);
        assert_eq!(stats.lines, 1);
        assert_eq!(stats.phase, 1);
        assert_eq!(stats.generation, 0);
    }

    #[test]
    fn keeps_growing_across_phases() {
        let (mut loader, mut rng) = loader(300.0, 200.0);
        run(&mut loader, &mut rng, 0.0, 5_000.0);
        let stats = loader.stats();
        assert!(stats.phase >= 5, "only reached phase {}", stats.phase);
        assert!(stats.nodes > 5);
        assert_eq!(loader.frame().len(), stats.lines);
    }

    #[test]
    fn pause_freezes_progress() {
        let (mut loader, mut rng) = loader(120.0, 80.0);
        loader.advance(0.0, &mut rng);
        loader.advance(16.0, &mut rng);
        let before = loader.frame();

        loader.toggle_pause();
        run(&mut loader, &mut rng, 32.0, 3_008.0);
        assert_eq!(loader.frame(), before);

        // No jump on resume: the first tick after unpausing only covers one frame
        loader.toggle_pause();
        loader.advance(3_024.0, &mut rng);
        let progressed = loader.frame()[0].rendered_point;
        assert_ne!(progressed, before[0].rendered_point);
        assert!((loader.driver.graph().lines[0].progress - 0.1).abs() < 1e-6);
    }

    #[test]
    fn surface_changes_restart_growth() {
        let (mut loader, mut rng) = loader(120.0, 80.0);
        run(&mut loader, &mut rng, 0.0, 2_000.0);

        assert!(!loader.set_surface(120.0, 80.0, 2_016.0, &mut rng));
        assert_eq!(loader.stats().generation, 0);

        assert!(loader.set_surface(60.0, 60.0, 2_032.0, &mut rng));
        let stats = loader.stats();
        assert_eq!(stats.generation, 1);
        assert_eq!(stats.nodes, 2);
        assert_eq!((stats.width, stats.height), (60.0, 60.0));

        loader.reset(2_048.0, &mut rng);
        assert_eq!(loader.stats().generation, 2);
    }

    #[test]
    fn repeated_degenerate_size_restarts_once() {
        let (mut loader, mut rng) = loader(120.0, 80.0);
        assert!(loader.set_surface(-1.0, -1.0, 16.0, &mut rng));
        assert!(!loader.set_surface(-1.0, -1.0, 32.0, &mut rng));
        assert!(!loader.set_surface(f32::NAN, 0.0, 48.0, &mut rng));
        assert_eq!(loader.stats().generation, 1);
        assert_eq!((loader.stats().width, loader.stats().height), (0.0, 0.0));
    }

    #[test]
    fn shutdown_drops_pending_work() {
        let (mut loader, mut rng) = loader(0.0, 0.0);
        assert!(loader.stats().pending);
        loader.shutdown();
        assert!(loader.timers.is_empty());
        run(&mut loader, &mut rng, 0.0, 2_000.0);
        assert_eq!(loader.stats().phase, 1);
    }
}
