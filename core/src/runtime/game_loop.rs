//! Game loop execution with fixed timestep

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::frame::Frame;
use crate::lifecycle::{GameHandle, HostRequest};

use super::RuntimeConfig;

/// Execute a single frame for the active controller
///
/// Runs as many fixed ticks as the accumulator allows, then renders once.
/// Update and render failures are logged; the loop keeps going.
/// Returns the number of ticks executed and interpolation factor for rendering.
pub fn execute_frame(
    config: &RuntimeConfig,
    tick_duration: Duration,
    accumulator: &mut Duration,
    delta: Duration,
    game: &GameHandle,
    frame: &mut Frame,
    requests: &mut VecDeque<HostRequest>,
) -> (u32, f32) {
    let delta = delta.min(config.max_delta);
    *accumulator += delta;

    let mut ticks = 0u32;
    let mut game = game.borrow_mut();

    while *accumulator >= tick_duration {
        let tick_start = Instant::now();
        let dt = tick_duration.as_secs_f32();

        game.modules_mut().time.advance(dt);
        if let Err(e) = game.update(dt) {
            tracing::error!(game = game.game_id(), "update failed: {e:#}");
        }
        if let Some(request) = game.take_host_request() {
            tracing::debug!(game = game.game_id(), ?request, "host request");
            requests.push_back(request);
        }

        *accumulator -= tick_duration;
        ticks += 1;

        // Check CPU budget
        let tick_time = tick_start.elapsed();
        if tick_time > config.cpu_budget {
            tracing::warn!(
                "Tick took {:?}, exceeds budget of {:?}",
                tick_time,
                config.cpu_budget
            );
        }
    }

    frame.clear();
    if let Err(e) = game.render(frame) {
        tracing::error!(game = game.game_id(), "render failed: {e:#}");
    }

    // Calculate interpolation factor for rendering
    let alpha = accumulator.as_secs_f32() / tick_duration.as_secs_f32();

    (ticks, alpha)
}
