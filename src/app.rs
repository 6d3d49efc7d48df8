use crate::assets::Assets;
use crate::config::{Args, Tunables};
use crate::input::{map_key, Action};
use crate::model::{format_elapsed, Backdrop, Scene, Session, Surface};
use crate::render::{fit_view, overlay, render_scene, theme, Renderer, Theme, Viewport};
use crate::sim::{tick, TickOutcome};
use anyhow::Result;
use crossterm::{
    cursor,
    event::{self, Event, KeyEventKind},
    execute,
    style::{Color, ResetColor},
    terminal::{
        self, Clear, ClearType, DisableLineWrap, EnableLineWrap, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use std::io::{self, Stdout};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

const HUD_PLAY: &str = "SKYRUNNER   Space jump   Q quit";
const HUD_IDLE: &str = "SKYRUNNER";

pub(crate) fn run(args: Args) -> Result<()> {
    let mut out = io::stdout();
    terminal::enable_raw_mode()?;
    execute!(
        out,
        EnterAlternateScreen,
        cursor::Hide,
        DisableLineWrap,
        Clear(ClearType::All)
    )?;

    let res = App::new(args).and_then(|mut app| app.run(&mut out));

    // restore
    let _ = execute!(
        out,
        EnableLineWrap,
        cursor::Show,
        LeaveAlternateScreen,
        ResetColor
    );
    let _ = terminal::disable_raw_mode();

    res
}

struct App {
    args: Args,
    tunables: Tunables,
    theme: Theme,
    scene: Scene,
    /// Exists from the first Start onward; Over keeps it around so the final
    /// scene stays visible under the overlay.
    session: Option<Session>,
    /// Shown behind the pre-play screens; never advanced.
    idle_backdrop: Backdrop,
    renderer: Renderer,
    view: Option<Viewport>,
    assets: Assets,
}

impl App {
    fn new(args: Args) -> Result<Self> {
        let (tw, th) = terminal::size()?;
        let tunables = Tunables::default();
        let view = fit_view(tw, th, &tunables);
        let assets = match view {
            Some(v) => Assets::build(v.px_w, v.px_h, tunables.backdrop_layers),
            None => Assets { panels: vec![] },
        };
        Ok(Self {
            theme: theme(args.no_color),
            args,
            tunables,
            scene: Scene::Title,
            session: None,
            idle_backdrop: Backdrop::new(tunables.backdrop_layers),
            renderer: Renderer::new(tw, th),
            view,
            assets,
        })
    }

    fn run(&mut self, out: &mut Stdout) -> Result<()> {
        let fps = self.args.fps.clamp(10, 240);
        let frame_dt = Duration::from_secs_f64(1.0 / fps as f64);

        loop {
            while event::poll(Duration::from_millis(0))? {
                match event::read()? {
                    Event::Key(k) if k.kind == KeyEventKind::Press => {
                        if let Some(action) = map_key(self.scene, k.code) {
                            if self.apply(action) {
                                return Ok(());
                            }
                        }
                    }
                    Event::Resize(w, h) => self.handle_resize(w, h),
                    _ => {}
                }
            }

            self.frame(out)?;
            spin_sleep(frame_dt, Instant::now());
        }
    }

    /// Returns true when the app should quit.
    fn apply(&mut self, action: Action) -> bool {
        match action {
            Action::Quit => return true,
            Action::Advance => {
                if self.scene == Scene::Title {
                    self.scene = Scene::Instructions;
                }
            }
            Action::Start | Action::Restart => self.start_session(),
            Action::Jump => {
                if let Some(s) = self.session.as_mut() {
                    s.player.trigger_jump();
                }
            }
        }
        false
    }

    /// Entering Playing rebuilds everything mutable: fresh player, empty
    /// obstacle set, newly drawn countdown, clock reset to now.
    fn start_session(&mut self) {
        let world_w = self
            .view
            .map(|v| v.world_w)
            .unwrap_or(self.tunables.world_h * 2.0);
        let surface = Surface {
            w: world_w,
            h: self.tunables.world_h,
        };
        let seed = if self.args.seed != 0 {
            self.args.seed
        } else {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(0xC0FFEE)
        };
        self.session = Some(Session::new(self.tunables, surface, seed, Instant::now()));
        self.scene = Scene::Playing;
    }

    fn handle_resize(&mut self, w: u16, h: u16) {
        self.renderer.resize(w, h);
        self.view = fit_view(w, h, &self.tunables);
        if let Some(v) = self.view {
            self.assets = Assets::build(v.px_w, v.px_h, self.tunables.backdrop_layers);
            if let Some(s) = self.session.as_mut() {
                s.set_surface_width(v.world_w);
            }
        }
    }

    fn frame(&mut self, out: &mut Stdout) -> Result<()> {
        let Some(v) = self.view else {
            self.renderer.clear_to(Color::White, Color::Black);
            self.renderer
                .put_str(0, 0, "Terminal too small. Try at least 40x12.", Color::White, Color::Black);
            self.renderer.flush_diff(out)?;
            return Ok(());
        };

        match self.scene {
            Scene::Title => {
                self.draw_idle(v);
                overlay(
                    &mut self.renderer,
                    self.theme,
                    "S K Y R U N N E R",
                    &[
                        "The street never stops moving.",
                        "Outrun it for as long as you can.",
                        "",
                        "Press any key",
                    ],
                );
            }
            Scene::Instructions => {
                self.draw_idle(v);
                overlay(
                    &mut self.renderer,
                    self.theme,
                    "How to play",
                    &[
                        "The ground scrolls at a constant pace.",
                        "Space vaults you over whatever rolls in.",
                        "One touch ends the run.",
                        "",
                        "Press Space to start",
                    ],
                );
            }
            Scene::Playing => {
                let now = Instant::now();
                if let Some(s) = self.session.as_mut() {
                    let outcome = tick(s, now);
                    let elapsed = s.clock.elapsed(now);
                    let label = format_elapsed(elapsed);
                    render_scene(
                        &mut self.renderer,
                        &v,
                        self.theme,
                        &self.assets,
                        &s.backdrop,
                        Some(&s.player),
                        &s.obstacles,
                        elapsed,
                        HUD_PLAY,
                        Some(label.as_str()),
                    );
                    if let TickOutcome::Collision { elapsed } = outcome {
                        // the loop stops ticking once the scene leaves Playing
                        self.renderer.dim();
                        draw_over_overlay(&mut self.renderer, self.theme, elapsed);
                        self.scene = Scene::Over { elapsed };
                    }
                }
            }
            Scene::Over { elapsed } => {
                if let Some(s) = self.session.as_ref() {
                    let label = format_elapsed(elapsed);
                    render_scene(
                        &mut self.renderer,
                        &v,
                        self.theme,
                        &self.assets,
                        &s.backdrop,
                        Some(&s.player),
                        &s.obstacles,
                        elapsed,
                        HUD_IDLE,
                        Some(label.as_str()),
                    );
                } else {
                    self.draw_idle(v);
                }
                self.renderer.dim();
                draw_over_overlay(&mut self.renderer, self.theme, elapsed);
            }
        }

        self.renderer.flush_diff(out)?;
        Ok(())
    }

    fn draw_idle(&mut self, v: Viewport) {
        render_scene(
            &mut self.renderer,
            &v,
            self.theme,
            &self.assets,
            &self.idle_backdrop,
            None,
            &[],
            0.0,
            HUD_IDLE,
            None,
        );
        self.renderer.dim();
    }
}

fn draw_over_overlay(r: &mut Renderer, theme: Theme, elapsed: f32) {
    overlay(
        r,
        theme,
        &format!("You lasted {}", format_elapsed(elapsed)),
        &["", "Press Space to run again   Q to quit"],
    );
}

/* -----------------------------
   Frame pacing helper
------------------------------ */

fn spin_sleep(target: Duration, now: Instant) {
    let end = now + target;
    loop {
        let t = Instant::now();
        if t >= end {
            break;
        }
        let left = end - t;
        if left > Duration::from_millis(2) {
            std::thread::sleep(Duration::from_millis(1));
        } else {
            std::hint::spin_loop();
        }
    }
}
