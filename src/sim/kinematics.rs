//! Player movement integration
//!
//! Forward run, lateral strafing, a projectile jump arc and crouching, all
//! scaled by the slow-time multiplier. Effect expiry is checked against the
//! frame timestamp, so it does not depend on frame rate.

use super::state::PlayerState;
use super::tick::TickInput;
use crate::settings::PlayerSettings;

/// Movement-side outcome of one integration step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Step {
    /// Slow time ran out at the start of this step
    pub slow_time_ended: bool,
    pub jumped: bool,
    pub landed: bool,
}

/// Advance the player by `delta` seconds at frame time `time`
pub fn integrate(
    player: &mut PlayerState,
    input: &TickInput,
    tuning: &PlayerSettings,
    lateral_limit: f32,
    slow_multiplier: f32,
    delta: f32,
    time: f32,
) -> Step {
    let mut step = Step::default();

    player.invincibility.expire(time);
    step.slow_time_ended = player.slow_time.expire(time);
    let multiplier = player.speed_multiplier(time, slow_multiplier);

    // Posture: crouch and jump exclude each other
    player.crouching = input.crouch_held && !player.jumping;
    if input.jump_requested && !player.jumping && !player.crouching {
        player.jumping = true;
        player.vertical_velocity = tuning.jump_velocity;
        step.jumped = true;
    }

    player.position.z += player.speed * delta * multiplier;

    let resting = player.resting_height(tuning);
    if player.jumping {
        player.position.y += player.vertical_velocity * delta;
        player.vertical_velocity += tuning.gravity * delta;
        if player.position.y <= resting {
            player.position.y = resting;
            player.vertical_velocity = 0.0;
            player.jumping = false;
            step.landed = true;
        }
    } else {
        player.position.y = resting;
    }

    player.lateral_intent = match (input.move_left, input.move_right) {
        (true, false) => -1.0,
        (false, true) => 1.0,
        _ => 0.0,
    };
    player.position.x += player.lateral_intent * tuning.lateral_speed * delta * multiplier;
    player.position.x = player.position.x.clamp(-lateral_limit, lateral_limit);

    player.speed += tuning.acceleration * delta * multiplier;
    player.update_hitbox(tuning);
    step
}
