use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Panel pixel values. Zero is transparent sky.
pub(crate) const PX_EMPTY: u8 = 0;
pub(crate) const PX_FILL: u8 = 1;
pub(crate) const PX_DETAIL: u8 = 2;

/// One backdrop panel at canvas resolution. `loaded` models an image handle
/// that may not be ready yet; a panel that is not ready is skipped for the
/// frame, never an error.
pub(crate) struct Panel {
    pub(crate) w: i32,
    pub(crate) h: i32,
    pub(crate) px: Vec<u8>,
    pub(crate) loaded: bool,
}

impl Panel {
    pub(crate) fn ready(&self) -> bool {
        self.loaded && self.w > 0 && self.h > 0 && self.px.len() == (self.w * self.h) as usize
    }

    pub(crate) fn at(&self, x: i32, y: i32) -> u8 {
        if x < 0 || y < 0 || x >= self.w || y >= self.h {
            return PX_EMPTY;
        }
        self.px[(y * self.w + x) as usize]
    }
}

pub(crate) struct Assets {
    pub(crate) panels: Vec<Panel>,
}

impl Assets {
    /// Panels are deterministic per slot so a resize regenerates the same
    /// scenery at the new resolution.
    pub(crate) fn build(px_w: i32, px_h: i32, count: usize) -> Self {
        let panels = (0..count).map(|i| build_panel(i, px_w, px_h)).collect();
        Self { panels }
    }
}

fn build_panel(idx: usize, w: i32, h: i32) -> Panel {
    let mut px = vec![PX_EMPTY; (w.max(0) * h.max(0)) as usize];
    let mut rng = SmallRng::seed_from_u64(0x5C17_0000 + idx as u64);
    if w > 0 && h > 0 {
        match idx % 4 {
            0 => skyline(&mut px, w, h, &mut rng),
            1 => hills(&mut px, w, h, &mut rng),
            2 => park(&mut px, w, h, &mut rng),
            _ => poles(&mut px, w, h, &mut rng),
        }
    }
    Panel {
        w,
        h,
        px,
        loaded: true,
    }
}

fn fill_below(px: &mut [u8], w: i32, h: i32, x: i32, top: i32, v: u8) {
    if x < 0 || x >= w {
        return;
    }
    for y in top.max(0)..h {
        px[(y * w + x) as usize] = v;
    }
}

fn put(px: &mut [u8], w: i32, h: i32, x: i32, y: i32, v: u8) {
    if x >= 0 && x < w && y >= 0 && y < h {
        px[(y * w + x) as usize] = v;
    }
}

/// Flat-roofed buildings with sparse lit windows.
fn skyline(px: &mut [u8], w: i32, h: i32, rng: &mut SmallRng) {
    let mut x = 0;
    while x < w {
        let bw = rng.gen_range(6..16).min(w - x);
        let bh = (h as f32 * rng.gen_range(0.25..0.65)) as i32;
        let top = h - bh;
        for cx in x..x + bw {
            fill_below(px, w, h, cx, top, PX_FILL);
        }
        for wy in (top + 2..h - 1).step_by(3) {
            for wx in (x + 1..x + bw - 1).step_by(3) {
                if rng.gen_bool(0.35) {
                    put(px, w, h, wx, wy, PX_DETAIL);
                }
            }
        }
        x += bw + rng.gen_range(1..4);
    }
}

/// Two overlapping sine ridges.
fn hills(px: &mut [u8], w: i32, h: i32, rng: &mut SmallRng) {
    let p1: f32 = rng.gen_range(0.0..6.28);
    let p2: f32 = rng.gen_range(0.0..6.28);
    for x in 0..w {
        let fx = x as f32;
        let y1 = h as f32 * (0.62 - 0.14 * (fx * 0.045 + p1).sin());
        let y2 = h as f32 * (0.74 - 0.10 * (fx * 0.085 + p2).sin());
        fill_below(px, w, h, x, y1.min(y2) as i32, PX_FILL);
        if x % 9 == 0 && rng.gen_bool(0.4) {
            put(px, w, h, x, y1.min(y2) as i32 - 1, PX_DETAIL);
        }
    }
}

/// Round-canopy trees on open ground.
fn park(px: &mut [u8], w: i32, h: i32, rng: &mut SmallRng) {
    let mut x = rng.gen_range(2..8);
    while x < w - 4 {
        let r = rng.gen_range(3..6);
        let trunk_top = h - rng.gen_range(4..7);
        let cy = trunk_top - r;
        fill_below(px, w, h, x, trunk_top, PX_FILL);
        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy <= r * r {
                    put(px, w, h, x + dx, cy + dy, PX_FILL);
                }
            }
        }
        put(px, w, h, x - 1, cy - r, PX_DETAIL);
        x += r * 2 + rng.gen_range(4..12);
    }
}

/// Utility poles with sagging wires.
fn poles(px: &mut [u8], w: i32, h: i32, rng: &mut SmallRng) {
    let gap = (w / 5).max(8);
    let wire_y = h / 3;
    let mut prev_x: Option<i32> = None;
    let mut x = gap / 2;
    while x < w {
        fill_below(px, w, h, x, wire_y - 2, PX_FILL);
        put(px, w, h, x - 1, wire_y - 2, PX_FILL);
        put(px, w, h, x + 1, wire_y - 2, PX_FILL);
        if let Some(px0) = prev_x {
            let span = (x - px0) as f32;
            for wx in px0..=x {
                let t = (wx - px0) as f32 / span;
                let sag = (4.0 * t * (1.0 - t) * (span * 0.06)) as i32;
                put(px, w, h, wx, wire_y + sag, PX_FILL);
            }
            if rng.gen_bool(0.5) {
                let bx = px0 + (span * rng.gen_range(0.3..0.7)) as i32;
                put(px, w, h, bx, wire_y + 1, PX_DETAIL);
            }
        }
        prev_x = Some(x);
        x += gap;
    }
}

/* -----------------------------
   Sprite art. Non-space bytes are filled; the renderer nearest-samples
   these grids into world rectangles.
------------------------------ */

pub(crate) const PLAYER_RUN: [&[&str]; 2] = [
    &[
        "   ###  ",
        "   ###  ",
        "    #   ",
        "  ####> ",
        " # ##   ",
        "   ##   ",
        "   ##   ",
        "  #  #  ",
        " #    # ",
        "#      #",
    ],
    &[
        "   ###  ",
        "   ###  ",
        "    #   ",
        " <####  ",
        "   ## # ",
        "   ##   ",
        "   ##   ",
        "  ####  ",
        "  #  #  ",
        "  #  #  ",
    ],
];

const CRATE_BOX: &[&str] = &[
    "########",
    "#\\    /#",
    "# \\  / #",
    "#  \\/  #",
    "#  /\\  #",
    "# /  \\ #",
    "#/    \\#",
    "########",
];

const CONE: &[&str] = &[
    "   ##   ",
    "   ##   ",
    "  ####  ",
    "  ####  ",
    " ###### ",
    " ###### ",
    "########",
    "########",
];

const HYDRANT: &[&str] = &[
    "  ####  ",
    " ###### ",
    "########",
    " ###### ",
    " ###### ",
    " ###### ",
    "########",
    "########",
];

pub(crate) const OBSTACLE_SPRITES: [&[&str]; 3] = [CRATE_BOX, CONE, HYDRANT];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panels_are_deterministic_per_slot() {
        let a = Assets::build(120, 60, 4);
        let b = Assets::build(120, 60, 4);
        assert_eq!(a.panels.len(), 4);
        for (pa, pb) in a.panels.iter().zip(&b.panels) {
            assert!(pa.ready());
            assert_eq!(pa.px, pb.px);
        }
    }

    #[test]
    fn unready_panel_reads_as_empty() {
        let p = Panel {
            w: 0,
            h: 0,
            px: vec![],
            loaded: false,
        };
        assert!(!p.ready());
        assert_eq!(p.at(3, 3), PX_EMPTY);
    }

    #[test]
    fn panel_sampling_is_clipped() {
        let a = Assets::build(40, 20, 1);
        let p = &a.panels[0];
        assert_eq!(p.at(-1, 5), PX_EMPTY);
        assert_eq!(p.at(40, 5), PX_EMPTY);
        assert_eq!(p.at(5, 20), PX_EMPTY);
    }
}
