use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "skyrunner")]
#[command(about = "Side-scrolling terminal survival runner", long_about = None)]
pub(crate) struct Args {
    /// FPS cap (render rate)
    #[arg(long, default_value_t = 60)]
    pub(crate) fps: u64,

    /// RNG seed for spawn gaps and obstacle sprites (0 = derive from time)
    #[arg(long, default_value_t = 0)]
    pub(crate) seed: u64,

    /// Monochrome output
    #[arg(long, default_value_t = false)]
    pub(crate) no_color: bool,
}

/// Every sim constant lives here, in world units. The sim runs on a virtual
/// surface of fixed height WORLD_H; width follows the terminal aspect, so
/// physics never sees cell geometry. y grows downward, like the canvas it
/// models.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Tunables {
    pub(crate) world_h: f32,
    /// Horizontal speed shared by the backdrop, the spawner countdown and
    /// the obstacles. Constant for the whole run.
    pub(crate) scroll_speed: f32,
    pub(crate) gravity: f32,
    /// Negative = upward.
    pub(crate) jump_velocity: f32,
    pub(crate) ground_margin: f32,
    pub(crate) player_x: f32,
    pub(crate) player_w: f32,
    pub(crate) player_h: f32,
    pub(crate) obstacle_w: f32,
    pub(crate) obstacle_h: f32,
    /// Spawn countdown is re-drawn uniformly from [min, max] after each
    /// spawn, giving an irregular cadence at fixed average density.
    pub(crate) spawn_gap_min: f32,
    pub(crate) spawn_gap_max: f32,
    pub(crate) backdrop_layers: usize,
    /// Matches assets::OBSTACLE_SPRITES.len().
    pub(crate) obstacle_palette: usize,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            world_h: 800.0,
            scroll_speed: 400.0,
            gravity: 2000.0,
            jump_velocity: -1500.0,
            ground_margin: 10.0,
            player_x: 100.0,
            player_w: 200.0,
            player_h: 290.0,
            obstacle_w: 150.0,
            obstacle_h: 200.0,
            spawn_gap_min: 800.0,
            spawn_gap_max: 1500.0,
            backdrop_layers: 4,
            obstacle_palette: 3,
        }
    }
}
