use crate::assets::{Assets, Panel, OBSTACLE_SPRITES, PLAYER_RUN, PX_DETAIL, PX_FILL};
use crate::config::Tunables;
use crate::model::{Backdrop, Obstacle, Player};
use crossterm::{
    cursor, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{BeginSynchronizedUpdate, EndSynchronizedUpdate},
};
use std::io::{self, Stdout, Write};

pub(crate) const HUD_ROWS: u16 = 1;

#[derive(Clone, Copy)]
pub(crate) struct Theme {
    pub(crate) sky_bg: Color,
    pub(crate) ground_bg: Color,
    pub(crate) hud_fg: Color,
    pub(crate) hud_bg: Color,
    pub(crate) fill_fg: Color,
    pub(crate) detail_fg: Color,
    pub(crate) ground_fg: Color,
    pub(crate) mark_fg: Color,
    pub(crate) obstacle_fg: [Color; 3],
    pub(crate) player_fg: Color,
    pub(crate) overlay_fg: Color,
    pub(crate) accent_fg: Color,
}

pub(crate) fn theme(no_color: bool) -> Theme {
    if no_color {
        return Theme {
            sky_bg: Color::Black,
            ground_bg: Color::Black,
            hud_fg: Color::White,
            hud_bg: Color::Black,
            fill_fg: Color::Grey,
            detail_fg: Color::White,
            ground_fg: Color::Grey,
            mark_fg: Color::Grey,
            obstacle_fg: [Color::White, Color::White, Color::White],
            player_fg: Color::White,
            overlay_fg: Color::White,
            accent_fg: Color::White,
        };
    }
    Theme {
        sky_bg: Color::Rgb { r: 12, g: 16, b: 28 },
        ground_bg: Color::Rgb { r: 20, g: 16, b: 12 },
        hud_fg: Color::Rgb { r: 200, g: 220, b: 255 },
        hud_bg: Color::Rgb { r: 6, g: 8, b: 14 },
        fill_fg: Color::Rgb { r: 90, g: 110, b: 150 },
        detail_fg: Color::Rgb { r: 255, g: 220, b: 140 },
        ground_fg: Color::Rgb { r: 170, g: 140, b: 100 },
        mark_fg: Color::Rgb { r: 110, g: 90, b: 70 },
        obstacle_fg: [
            Color::Rgb { r: 210, g: 160, b: 90 },
            Color::Rgb { r: 255, g: 140, b: 80 },
            Color::Rgb { r: 220, g: 80, b: 80 },
        ],
        player_fg: Color::Rgb { r: 150, g: 255, b: 170 },
        overlay_fg: Color::Rgb { r: 240, g: 240, b: 240 },
        accent_fg: Color::Rgb { r: 255, g: 220, b: 140 },
    }
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Mat {
    Empty = 0,
    Mark = 1,
    Fill = 2,
    Detail = 3,
    Ground = 4,
    Obstacle0 = 5,
    Obstacle1 = 6,
    Obstacle2 = 7,
    Player = 8,
}

fn obstacle_mat(sprite: usize) -> Mat {
    match sprite % 3 {
        0 => Mat::Obstacle0,
        1 => Mat::Obstacle1,
        _ => Mat::Obstacle2,
    }
}

fn fg_for_mat(theme: Theme, m: Mat) -> Color {
    match m {
        Mat::Player => theme.player_fg,
        Mat::Obstacle0 => theme.obstacle_fg[0],
        Mat::Obstacle1 => theme.obstacle_fg[1],
        Mat::Obstacle2 => theme.obstacle_fg[2],
        Mat::Ground => theme.ground_fg,
        Mat::Detail => theme.detail_fg,
        Mat::Fill => theme.fill_fg,
        Mat::Mark => theme.mark_fg,
        Mat::Empty => theme.hud_fg,
    }
}

#[derive(Clone, Copy)]
struct FrameCell {
    ch: char,
    fg: Color,
    bg: Color,
}

pub(crate) struct Renderer {
    pub(crate) w: u16,
    pub(crate) h: u16,
    prev: Vec<FrameCell>,
    cur: Vec<FrameCell>,
}

impl Renderer {
    pub(crate) fn new(w: u16, h: u16) -> Self {
        let blank = FrameCell {
            ch: ' ',
            fg: Color::White,
            bg: Color::Black,
        };
        Self {
            w,
            h,
            prev: vec![blank; (w as usize) * (h as usize)],
            cur: vec![blank; (w as usize) * (h as usize)],
        }
    }

    pub(crate) fn resize(&mut self, w: u16, h: u16) {
        *self = Self::new(w, h);
    }

    pub(crate) fn clear_to(&mut self, fg: Color, bg: Color) {
        for c in &mut self.cur {
            c.ch = ' ';
            c.fg = fg;
            c.bg = bg;
        }
    }

    pub(crate) fn put(&mut self, x: u16, y: u16, ch: char, fg: Color, bg: Color) {
        if x >= self.w || y >= self.h {
            return;
        }
        let i = (y as usize) * (self.w as usize) + (x as usize);
        self.cur[i] = FrameCell { ch, fg, bg };
    }

    pub(crate) fn put_str(&mut self, x: u16, y: u16, s: &str, fg: Color, bg: Color) {
        let mut xx = x;
        for ch in s.chars() {
            if xx >= self.w {
                break;
            }
            self.put(xx, y, ch, fg, bg);
            xx += 1;
        }
    }

    /// Darken everything already drawn; overlays sit on a dimmed scene.
    pub(crate) fn dim(&mut self) {
        for c in &mut self.cur {
            c.fg = dim_color(c.fg);
            c.bg = dim_color(c.bg);
        }
    }

    pub(crate) fn flush_diff(&mut self, out: &mut Stdout) -> io::Result<()> {
        queue!(out, BeginSynchronizedUpdate)?;
        let mut cur_fg = None::<Color>;
        let mut cur_bg = None::<Color>;

        for y in 0..self.h {
            let row_off = (y as usize) * (self.w as usize);
            for x in 0..self.w {
                let i = row_off + (x as usize);
                let a = self.cur[i];
                let b = self.prev[i];
                if a.ch == b.ch && a.fg == b.fg && a.bg == b.bg {
                    continue;
                }
                queue!(out, cursor::MoveTo(x, y))?;
                if cur_fg != Some(a.fg) {
                    queue!(out, SetForegroundColor(a.fg))?;
                    cur_fg = Some(a.fg);
                }
                if cur_bg != Some(a.bg) {
                    queue!(out, SetBackgroundColor(a.bg))?;
                    cur_bg = Some(a.bg);
                }
                queue!(out, Print(a.ch))?;
            }
        }

        queue!(out, ResetColor, EndSynchronizedUpdate)?;
        out.flush()?;
        self.prev.copy_from_slice(&self.cur);
        Ok(())
    }
}

fn dim_color(c: Color) -> Color {
    match c {
        Color::Rgb { r, g, b } => Color::Rgb {
            r: (r as f32 * 0.35) as u8,
            g: (g as f32 * 0.35) as u8,
            b: (b as f32 * 0.35) as u8,
        },
        other => other,
    }
}

/// Maps the virtual world onto braille subpixels: 2x4 per cell, scale fixed
/// by the world height so the sim never depends on the terminal size.
#[derive(Clone, Copy)]
pub(crate) struct Viewport {
    pub(crate) term_w: u16,
    pub(crate) term_h: u16,
    pub(crate) px_w: i32,
    pub(crate) px_h: i32,
    pub(crate) scale: f32,
    pub(crate) world_w: f32,
    ground_px: i32,
}

pub(crate) fn fit_view(term_w: u16, term_h: u16, t: &Tunables) -> Option<Viewport> {
    if term_w < 40 || term_h < 12 {
        return None;
    }
    let play_h = term_h - HUD_ROWS;
    let px_w = (term_w as i32) * 2;
    let px_h = (play_h as i32) * 4;
    let scale = px_h as f32 / t.world_h;
    let world_w = px_w as f32 / scale;
    let ground_px = ((t.world_h - t.ground_margin) * scale) as i32;
    Some(Viewport {
        term_w,
        term_h,
        px_w,
        px_h,
        scale,
        world_w,
        ground_px,
    })
}

fn mat_put(buf: &mut [Mat], pw: i32, ph: i32, x: i32, y: i32, m: Mat) {
    if x < 0 || x >= pw || y < 0 || y >= ph {
        return;
    }
    let i = (y * pw + x) as usize;
    if m > buf[i] {
        buf[i] = m;
    }
}

/// Nearest-sample an ascii sprite grid into a subpixel rectangle.
fn blit_sprite(buf: &mut [Mat], pw: i32, ph: i32, art: &[&str], x0: i32, y0: i32, w: i32, h: i32, m: Mat) {
    let rows = art.len() as i32;
    if rows == 0 || w <= 0 || h <= 0 {
        return;
    }
    for py in 0..h {
        let row = art[(py * rows / h) as usize].as_bytes();
        let cols = row.len() as i32;
        if cols == 0 {
            continue;
        }
        for px in 0..w {
            let c = row[(px * cols / w) as usize];
            if c != b' ' {
                mat_put(buf, pw, ph, x0 + px, y0 + py, m);
            }
        }
    }
}

fn blit_panel(buf: &mut [Mat], v: &Viewport, panel: &Panel, base_x: i32) {
    let x_start = base_x.max(0);
    let x_end = (base_x + panel.w).min(v.px_w);
    let y_end = v.px_h.min(panel.h);
    for y in 0..y_end {
        for x in x_start..x_end {
            match panel.at(x - base_x, y) {
                PX_FILL => mat_put(buf, v.px_w, v.px_h, x, y, Mat::Fill),
                PX_DETAIL => mat_put(buf, v.px_w, v.px_h, x, y, Mat::Detail),
                _ => {}
            }
        }
    }
}

/// Each ready panel is painted twice, at `i*W - offset` and a full cycle to
/// the right, so any offset leaves the surface covered with no seam. Unready
/// panels and an empty panel set are skipped silently.
fn draw_backdrop(buf: &mut [Mat], v: &Viewport, backdrop: &Backdrop, assets: &Assets) {
    if assets.panels.is_empty() || backdrop.layer_count == 0 {
        return;
    }
    let off_px = backdrop.offset * v.scale;
    let total = (v.px_w * backdrop.layer_count as i32) as f32;
    for i in 0..backdrop.layer_count {
        let Some(panel) = assets.panels.get(i) else {
            continue;
        };
        if !panel.ready() {
            continue;
        }
        let base = (i as i32 * v.px_w) as f32 - off_px;
        blit_panel(buf, v, panel, base.round() as i32);
        blit_panel(buf, v, panel, (base + total).round() as i32);
    }
}

fn draw_ground(buf: &mut [Mat], v: &Viewport) {
    for x in 0..v.px_w {
        mat_put(buf, v.px_w, v.px_h, x, v.ground_px, Mat::Ground);
    }
    for y in v.ground_px + 1..v.px_h {
        for x in 0..v.px_w {
            if (x * 31 + y * 17) % 41 == 0 {
                mat_put(buf, v.px_w, v.px_h, x, y, Mat::Mark);
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn render_scene(
    r: &mut Renderer,
    v: &Viewport,
    theme: Theme,
    assets: &Assets,
    backdrop: &Backdrop,
    player: Option<&Player>,
    obstacles: &[Obstacle],
    elapsed: f32,
    hud_left: &str,
    hud_right: Option<&str>,
) {
    r.clear_to(theme.hud_fg, theme.sky_bg);

    let mut buf = vec![Mat::Empty; (v.px_w as usize) * (v.px_h as usize)];
    draw_backdrop(&mut buf, v, backdrop, assets);
    draw_ground(&mut buf, v);

    for o in obstacles {
        let x = (o.x * v.scale).round() as i32;
        let y = (o.y * v.scale).round() as i32;
        let w = (o.w * v.scale).ceil() as i32;
        let h = (o.h * v.scale).ceil() as i32;
        blit_sprite(
            &mut buf,
            v.px_w,
            v.px_h,
            OBSTACLE_SPRITES[o.sprite % OBSTACLE_SPRITES.len()],
            x,
            y,
            w,
            h,
            obstacle_mat(o.sprite),
        );
    }

    if let Some(p) = player {
        let frame = if p.jumping {
            PLAYER_RUN[0]
        } else {
            PLAYER_RUN[(elapsed * 6.0) as usize % PLAYER_RUN.len()]
        };
        let x = (p.x * v.scale).round() as i32;
        let y = (p.y * v.scale).round() as i32;
        let w = (p.w * v.scale).ceil() as i32;
        let h = (p.h * v.scale).ceil() as i32;
        blit_sprite(&mut buf, v.px_w, v.px_h, frame, x, y, w, h, Mat::Player);
    }

    // pack 2x4 subpixels per cell into braille
    for by in 0..(v.term_h - HUD_ROWS) as i32 {
        let term_y = HUD_ROWS as i32 + by;
        let bg = if by * 4 >= v.ground_px {
            theme.ground_bg
        } else {
            theme.sky_bg
        };
        for bx in 0..v.term_w as i32 {
            let px0 = bx * 2;
            let py0 = by * 4;
            let mut dots: u8 = 0;
            let mut best = Mat::Empty;
            for dy in 0..4 {
                for dx in 0..2 {
                    let px = px0 + dx;
                    let py = py0 + dy;
                    if px >= v.px_w || py >= v.px_h {
                        continue;
                    }
                    let m = buf[(py * v.px_w + px) as usize];
                    if m != Mat::Empty {
                        dots |= braille_bit(dx, dy);
                        if m > best {
                            best = m;
                        }
                    }
                }
            }
            let ch = if dots == 0 { ' ' } else { braille_char(dots) };
            let fg = fg_for_mat(theme, best);
            r.put(bx as u16, term_y as u16, ch, fg, bg);
        }
    }

    // HUD row
    r.put_str(
        0,
        0,
        &" ".repeat(v.term_w as usize),
        theme.hud_fg,
        theme.hud_bg,
    );
    r.put_str(1, 0, hud_left, theme.hud_fg, theme.hud_bg);
    if let Some(right) = hud_right {
        let x = (v.term_w as usize).saturating_sub(right.chars().count() + 2) as u16;
        r.put_str(x, 0, right, theme.accent_fg, theme.hud_bg);
    }
}

/// Centered overlay text over whatever is already in the buffer.
pub(crate) fn overlay(r: &mut Renderer, theme: Theme, title: &str, body: &[&str]) {
    let total = body.len() as u16 + 2;
    let y0 = (r.h.saturating_sub(total)) / 2;
    put_centered(r, y0, title, theme.accent_fg, theme.hud_bg);
    for (i, line) in body.iter().enumerate() {
        put_centered(
            r,
            y0 + 2 + i as u16,
            line,
            theme.overlay_fg,
            theme.hud_bg,
        );
    }
}

fn put_centered(r: &mut Renderer, y: u16, s: &str, fg: Color, bg: Color) {
    let len = s.chars().count() as u16;
    let x = (r.w.saturating_sub(len)) / 2;
    // pad one cell either side so the text sits on a solid strip
    if x > 0 {
        r.put(x - 1, y, ' ', fg, bg);
    }
    r.put_str(x, y, s, fg, bg);
    r.put(x + len, y, ' ', fg, bg);
}

fn braille_char(dots: u8) -> char {
    char::from_u32(0x2800 + dots as u32).unwrap_or(' ')
}

fn braille_bit(dx: i32, dy: i32) -> u8 {
    // (0,0)=1 (0,1)=2 (0,2)=4 (0,3)=64
    // (1,0)=8 (1,1)=16 (1,2)=32 (1,3)=128
    match (dx, dy) {
        (0, 0) => 0x01,
        (0, 1) => 0x02,
        (0, 2) => 0x04,
        (0, 3) => 0x40,
        (1, 0) => 0x08,
        (1, 1) => 0x10,
        (1, 2) => 0x20,
        (1, 3) => 0x80,
        _ => 0x00,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Tunables;

    #[test]
    fn fit_view_rejects_tiny_terminals() {
        let t = Tunables::default();
        assert!(fit_view(10, 40, &t).is_none());
        assert!(fit_view(80, 5, &t).is_none());
        assert!(fit_view(80, 24, &t).is_some());
    }

    #[test]
    fn viewport_scale_round_trips_world_width() {
        let t = Tunables::default();
        let v = fit_view(100, 30, &t).unwrap();
        assert!((v.world_w * v.scale - v.px_w as f32).abs() < 1e-3);
        assert!(v.ground_px < v.px_h);
    }

    #[test]
    fn unready_panels_draw_nothing() {
        let t = Tunables::default();
        let v = fit_view(80, 24, &t).unwrap();
        let mut buf = vec![Mat::Empty; (v.px_w * v.px_h) as usize];
        let assets = Assets {
            panels: vec![Panel {
                w: 0,
                h: 0,
                px: vec![],
                loaded: false,
            }],
        };
        let backdrop = Backdrop::new(1);
        draw_backdrop(&mut buf, &v, &backdrop, &assets);
        assert!(buf.iter().all(|&m| m == Mat::Empty));
    }

    #[test]
    fn empty_panel_set_skips_backdrop() {
        let t = Tunables::default();
        let v = fit_view(80, 24, &t).unwrap();
        let mut buf = vec![Mat::Empty; (v.px_w * v.px_h) as usize];
        let assets = Assets { panels: vec![] };
        let backdrop = Backdrop::new(4);
        draw_backdrop(&mut buf, &v, &backdrop, &assets);
        assert!(buf.iter().all(|&m| m == Mat::Empty));
    }

    #[test]
    fn backdrop_covers_surface_at_any_offset() {
        let t = Tunables::default();
        let v = fit_view(80, 24, &t).unwrap();
        let assets = Assets::build(v.px_w, v.px_h, 4);
        let mut backdrop = Backdrop::new(4);
        // skyline panels fill every column near the bottom, so a seam shows
        // up as an untouched bottom-row column
        for step in 0..40 {
            backdrop.offset = (step as f32) * 97.3 % backdrop.total_width(v.world_w);
            let mut buf = vec![Mat::Empty; (v.px_w * v.px_h) as usize];
            draw_backdrop(&mut buf, &v, &backdrop, &assets);
            let y = v.px_h - 1;
            let covered = (0..v.px_w)
                .filter(|x| buf[(y * v.px_w + x) as usize] != Mat::Empty)
                .count();
            assert!(covered > 0, "offset {} drew nothing", backdrop.offset);
        }
    }

    #[test]
    fn sprite_blit_clips_at_edges() {
        let mut buf = vec![Mat::Empty; 16 * 16];
        blit_sprite(&mut buf, 16, 16, PLAYER_RUN[0], -4, -4, 10, 12, Mat::Player);
        blit_sprite(&mut buf, 16, 16, PLAYER_RUN[0], 12, 12, 10, 12, Mat::Player);
        // only asserts no panic / no out-of-bounds write
        assert_eq!(buf.len(), 16 * 16);
    }
}
