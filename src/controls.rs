use ::rand as external_rand;
use external_rand::Rng;
use macroquad::prelude::*;

use crate::loader::Loader;

/// Host-side toggles that live outside the loader itself.
pub struct ViewFlags {
    pub stats_visible: bool,
    pub take_screenshot: bool,
}

impl Default for ViewFlags {
    fn default() -> Self {
        Self {
            stats_visible: true,
            take_screenshot: false,
        }
    }
}

pub fn handle_controls<R: Rng>(loader: &mut Loader, flags: &mut ViewFlags, now_ms: f64, rng: &mut R) {
    if is_key_pressed(KeyCode::Space) {
        loader.toggle_pause();
    }

    if is_key_pressed(KeyCode::R) {
        loader.reset(now_ms, rng);
    }

    if is_key_pressed(KeyCode::H) {
        flags.stats_visible = !flags.stats_visible;
    }

    if is_key_pressed(KeyCode::P) {
        flags.take_screenshot = true;
    }
}
