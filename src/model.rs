use crate::config::Tunables;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;

/// Linear scene flow: Title -> Instructions -> Playing -> Over, with
/// Over -> Playing on restart. There is no way back to Title.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Scene {
    Title,
    Instructions,
    Playing,
    Over { elapsed: f32 },
}

/// Sim surface in world units.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Surface {
    pub(crate) w: f32,
    pub(crate) h: f32,
}

pub(crate) struct Player {
    pub(crate) x: f32, // fixed after init
    pub(crate) y: f32,
    pub(crate) w: f32,
    pub(crate) h: f32,
    pub(crate) vy: f32,
    pub(crate) gravity: f32,
    pub(crate) jump_velocity: f32,
    pub(crate) ground_y: f32,
    pub(crate) jumping: bool,
}

impl Player {
    pub(crate) fn new(t: &Tunables, surface: Surface) -> Self {
        let ground_y = surface.h - t.player_h - t.ground_margin;
        Self {
            x: t.player_x,
            y: ground_y,
            w: t.player_w,
            h: t.player_h,
            vy: 0.0,
            gravity: t.gravity,
            jump_velocity: t.jump_velocity,
            ground_y,
            jumping: false,
        }
    }

    /// No-op while airborne: no double jump, no arc reset.
    pub(crate) fn trigger_jump(&mut self) {
        if self.jumping {
            return;
        }
        self.jumping = true;
        self.vy = self.jump_velocity;
    }

    /// Gravity only acts mid-jump. Landing is a single-frame snap: clamp to
    /// the ground line, clear the flag, zero the velocity.
    pub(crate) fn integrate(&mut self, dt: f32) {
        if !self.jumping {
            return;
        }
        self.vy += self.gravity * dt;
        self.y += self.vy * dt;
        if self.y >= self.ground_y {
            self.y = self.ground_y;
            self.jumping = false;
            self.vy = 0.0;
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Obstacle {
    pub(crate) x: f32,
    pub(crate) y: f32,
    pub(crate) w: f32,
    pub(crate) h: f32,
    /// Index into the obstacle sprite palette, drawn at spawn time.
    pub(crate) sprite: usize,
}

impl Obstacle {
    pub(crate) fn spawn(t: &Tunables, surface: Surface, sprite: usize) -> Self {
        Self {
            x: surface.w,
            y: surface.h - t.obstacle_h - t.ground_margin,
            w: t.obstacle_w,
            h: t.obstacle_h,
            sprite,
        }
    }

    /// Fully past the left edge; safe to cull.
    pub(crate) fn off_screen(&self) -> bool {
        self.x + self.w < 0.0
    }
}

/// N looping panels painted left-to-right in a cycle at one shared offset.
pub(crate) struct Backdrop {
    pub(crate) offset: f32,
    pub(crate) layer_count: usize,
}

impl Backdrop {
    pub(crate) fn new(layer_count: usize) -> Self {
        Self {
            offset: 0.0,
            layer_count,
        }
    }

    pub(crate) fn total_width(&self, surface_w: f32) -> f32 {
        surface_w * self.layer_count as f32
    }

    /// Keeps offset in [0, total) so the painted cycle never gaps or jumps,
    /// whatever dt the frame delivers.
    pub(crate) fn advance(&mut self, speed: f32, dt: f32, surface_w: f32) {
        let total = self.total_width(surface_w);
        if total <= 0.0 {
            self.offset = 0.0;
            return;
        }
        self.offset = (self.offset + speed * dt) % total;
    }
}

/// Start and last-tick timestamps. dt is never negative; the first tick of a
/// session reports dt == 0 because last starts equal to start.
pub(crate) struct SessionClock {
    pub(crate) start: Instant,
    pub(crate) last: Instant,
}

impl SessionClock {
    pub(crate) fn new(now: Instant) -> Self {
        Self {
            start: now,
            last: now,
        }
    }

    pub(crate) fn tick(&mut self, now: Instant) -> f32 {
        let dt = now.saturating_duration_since(self.last).as_secs_f32();
        self.last = now;
        dt
    }

    pub(crate) fn elapsed(&self, now: Instant) -> f32 {
        now.saturating_duration_since(self.start).as_secs_f32()
    }
}

/// Everything mutated across frames lives here and is threaded through the
/// tick by reference; no ambient globals.
pub(crate) struct Session {
    pub(crate) tunables: Tunables,
    pub(crate) surface: Surface,
    pub(crate) player: Player,
    pub(crate) obstacles: Vec<Obstacle>,
    pub(crate) backdrop: Backdrop,
    /// Remaining distance until the next spawn.
    pub(crate) spawn_in: f32,
    pub(crate) clock: SessionClock,
    pub(crate) rng: StdRng,
}

impl Session {
    pub(crate) fn new(t: Tunables, surface: Surface, seed: u64, now: Instant) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let spawn_in = rng.gen_range(t.spawn_gap_min..=t.spawn_gap_max);
        Self {
            tunables: t,
            surface,
            player: Player::new(&t, surface),
            obstacles: Vec::new(),
            backdrop: Backdrop::new(t.backdrop_layers),
            spawn_in,
            clock: SessionClock::new(now),
            rng,
        }
    }

    /// Terminal resizes change only the visible width; height is virtual.
    pub(crate) fn set_surface_width(&mut self, w: f32) {
        self.surface.w = w;
    }
}

pub(crate) fn format_elapsed(secs: f32) -> String {
    format!("{:.1} s", secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn tunables() -> Tunables {
        Tunables::default()
    }

    fn surface() -> Surface {
        Surface { w: 1600.0, h: 800.0 }
    }

    #[test]
    fn player_starts_on_ground() {
        let t = tunables();
        let p = Player::new(&t, surface());
        assert_eq!(p.y, 800.0 - t.player_h - t.ground_margin);
        assert!(!p.jumping);
        assert_eq!(p.vy, 0.0);
    }

    #[test]
    fn jump_while_airborne_is_a_noop() {
        let t = tunables();
        let mut p = Player::new(&t, surface());
        p.trigger_jump();
        p.integrate(0.05);
        let (y, vy) = (p.y, p.vy);
        p.trigger_jump();
        assert_eq!(p.y, y);
        assert_eq!(p.vy, vy);
        assert!(p.jumping);
    }

    #[test]
    fn landing_clamps_and_zeroes() {
        let t = tunables();
        let mut p = Player::new(&t, surface());
        p.trigger_jump();
        for _ in 0..600 {
            p.integrate(1.0 / 60.0);
            assert!(p.y <= p.ground_y + 1e-3);
        }
        assert!(!p.jumping);
        assert_eq!(p.y, p.ground_y);
        assert_eq!(p.vy, 0.0);
    }

    #[test]
    fn grounded_player_ignores_integration() {
        let t = tunables();
        let mut p = Player::new(&t, surface());
        p.integrate(0.5);
        assert_eq!(p.y, p.ground_y);
        assert_eq!(p.vy, 0.0);
    }

    #[test]
    fn backdrop_offset_stays_in_range() {
        let mut b = Backdrop::new(4);
        let w = 1600.0;
        let total = b.total_width(w);
        for dt in [0.0, 0.016, 0.2, 1.0, 7.5, 123.4] {
            b.advance(400.0, dt, w);
            assert!(b.offset >= 0.0 && b.offset < total, "offset {}", b.offset);
        }
    }

    #[test]
    fn backdrop_with_no_layers_is_harmless() {
        let mut b = Backdrop::new(0);
        b.advance(400.0, 0.5, 1600.0);
        assert_eq!(b.offset, 0.0);
    }

    #[test]
    fn clock_first_tick_is_zero() {
        let t0 = Instant::now();
        let mut c = SessionClock::new(t0);
        assert_eq!(c.tick(t0), 0.0);
        assert_eq!(format_elapsed(c.elapsed(t0)), "0.0 s");
    }

    #[test]
    fn clock_dt_tracks_last_tick() {
        let t0 = Instant::now();
        let mut c = SessionClock::new(t0);
        let t1 = t0 + Duration::from_millis(16);
        let t2 = t1 + Duration::from_millis(20);
        assert!((c.tick(t1) - 0.016).abs() < 1e-4);
        assert!((c.tick(t2) - 0.020).abs() < 1e-4);
        assert!((c.elapsed(t2) - 0.036).abs() < 1e-4);
    }

    #[test]
    fn fresh_session_is_empty_with_drawn_countdown() {
        let t = tunables();
        let s = Session::new(t, surface(), 7, Instant::now());
        assert!(s.obstacles.is_empty());
        assert!(s.spawn_in >= t.spawn_gap_min && s.spawn_in <= t.spawn_gap_max);
        assert_eq!(s.backdrop.offset, 0.0);
    }
}
