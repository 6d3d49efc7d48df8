use crate::model::{Obstacle, Session};
use rand::Rng;
use std::time::Instant;

/// Clamp sim dt if the system hiccups; elapsed time still follows the clock.
const MAX_FRAME_DT: f32 = 1.0 / 20.0;

pub(crate) enum TickOutcome {
    Continue,
    Collision { elapsed: f32 },
}

/// One full sim step: clock -> backdrop -> player physics -> spawner ->
/// obstacle motion + collision -> cull. Pure over the session; rendering and
/// scheduling stay with the caller, which stops ticking on Collision.
pub(crate) fn tick(s: &mut Session, now: Instant) -> TickOutcome {
    let dt = s.clock.tick(now).min(MAX_FRAME_DT);
    let elapsed = s.clock.elapsed(now);
    let speed = s.tunables.scroll_speed;

    s.backdrop.advance(speed, dt, s.surface.w);
    s.player.integrate(dt);
    step_spawner(s, dt);
    let hit = advance_obstacles(s, dt);
    // cull after the collision check for this tick, whatever the outcome
    s.obstacles.retain(|o| !o.off_screen());

    if hit {
        TickOutcome::Collision { elapsed }
    } else {
        TickOutcome::Continue
    }
}

/// Countdown measured in scrolled distance. One obstacle per expiry, at the
/// right edge, ground-aligned, with a uniformly random sprite; then the
/// countdown is re-drawn into [gap_min, gap_max].
fn step_spawner(s: &mut Session, dt: f32) {
    s.spawn_in -= s.tunables.scroll_speed * dt;
    if s.spawn_in <= 0.0 {
        let sprite = s.rng.gen_range(0..s.tunables.obstacle_palette);
        s.obstacles
            .push(Obstacle::spawn(&s.tunables, s.surface, sprite));
        s.spawn_in = s
            .rng
            .gen_range(s.tunables.spawn_gap_min..=s.tunables.spawn_gap_max);
    }
}

fn advance_obstacles(s: &mut Session, dt: f32) -> bool {
    let speed = s.tunables.scroll_speed;
    let p = &s.player;
    let mut hit = false;
    for o in &mut s.obstacles {
        o.x -= speed * dt;
        if aabb(p.x, p.y, p.w, p.h, o.x, o.y, o.w, o.h) {
            hit = true;
        }
    }
    hit
}

/// Strict axis-aligned overlap; touching edges do not collide.
pub(crate) fn aabb(
    ax: f32,
    ay: f32,
    aw: f32,
    ah: f32,
    bx: f32,
    by: f32,
    bw: f32,
    bh: f32,
) -> bool {
    ax < bx + bw && ax + aw > bx && ay < by + bh && ay + ah > by
}
