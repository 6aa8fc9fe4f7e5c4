/// Terminal front end for the interactive 3D dice
use clap::ValueEnum;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use dice3d_core::{
    presets, AnimationConfig, ConfigError, DiceEvent, DiceLayer, DiceSimulation, DiceState,
    LayerLock, RollStyle, SimulationSettings,
};
use rand::Rng;
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub mod renderer;

pub use renderer::AsciiRenderer;

/// Pixels of simulated drag per arrow key press
const KEY_DRAG_STEP: f32 = 12.0;

/// Layer stacks selectable from the command line
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    /// Single classic die
    Classic,
    /// Ghost parent, classic middle, lagging inner die
    Nested,
    /// Translucent palette layers
    Crystal,
    /// Nested die in front of a static cavity backdrop
    Cavity,
}

impl Preset {
    pub fn layers(self) -> Result<Vec<DiceLayer>, ConfigError> {
        match self {
            Preset::Classic => Ok(presets::classic()),
            Preset::Nested => presets::nested(),
            Preset::Crystal => presets::crystal(),
            Preset::Cavity => presets::with_cavity(presets::nested()?),
        }
    }
}

/// Map a key to what it does to the die
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Quit,
    Drag { dx: f32, dy: f32 },
    Roll(u8),
    RandomRoll,
    BounceRoll,
    ToggleParent,
    ToggleLock,
}

impl Action {
    pub fn from_key(code: KeyCode) -> Option<Self> {
        let action = match code {
            KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
            KeyCode::Char('w') | KeyCode::Up => Action::Drag {
                dx: 0.0,
                dy: -KEY_DRAG_STEP,
            },
            KeyCode::Char('s') | KeyCode::Down => Action::Drag {
                dx: 0.0,
                dy: KEY_DRAG_STEP,
            },
            KeyCode::Char('a') | KeyCode::Left => Action::Drag {
                dx: -KEY_DRAG_STEP,
                dy: 0.0,
            },
            KeyCode::Char('d') | KeyCode::Right => Action::Drag {
                dx: KEY_DRAG_STEP,
                dy: 0.0,
            },
            KeyCode::Char(c @ '1'..='6') => Action::Roll(c as u8 - b'0'),
            KeyCode::Char('r') => Action::RandomRoll,
            KeyCode::Char('b') => Action::BounceRoll,
            KeyCode::Char('p') => Action::ToggleParent,
            KeyCode::Char('l') => Action::ToggleLock,
            _ => return None,
        };
        Some(action)
    }
}

/// Main application struct for the terminal dice
pub struct TerminalApp {
    simulation: DiceSimulation,
    renderer: AsciiRenderer,
    frame_time: Duration,
    running: bool,
    parent_frozen: bool,
    last_tick: Instant,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
    message: String,
}

impl TerminalApp {
    pub fn new(
        layers: Vec<DiceLayer>,
        settings: SimulationSettings,
        seed: u64,
        target_fps: u32,
    ) -> anyhow::Result<Self> {
        let (width, height) = terminal::size()?;
        let simulation = DiceSimulation::new(layers, settings, seed)?;

        Ok(Self::with_simulation(
            simulation,
            width as usize,
            height as usize,
            target_fps,
        ))
    }

    /// Build around an existing simulation and a fixed surface size
    pub fn with_simulation(
        simulation: DiceSimulation,
        width: usize,
        height: usize,
        target_fps: u32,
    ) -> Self {
        let now = Instant::now();
        Self {
            simulation,
            renderer: AsciiRenderer::new(width, height),
            frame_time: Duration::from_millis(1000 / u64::from(target_fps.max(1))),
            running: true,
            parent_frozen: false,
            last_tick: now,
            last_frame: now,
            frame_count: 0,
            fps: 0.0,
            message: String::from("ready"),
        }
    }

    pub fn simulation(&self) -> &DiceSimulation {
        &self.simulation
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        while self.running {
            let frame_start = Instant::now();

            while event::poll(Duration::from_millis(0))? {
                self.handle_event(event::read()?);
            }

            let dt = frame_start - self.last_tick;
            self.last_tick = frame_start;
            self.update(dt);

            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < self.frame_time {
                std::thread::sleep(self.frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(KeyEvent {
                code,
                kind: KeyEventKind::Press,
                ..
            }) => {
                if let Some(action) = Action::from_key(code) {
                    self.apply(action);
                }
            }
            Event::Resize(width, height) => {
                debug!(width, height, "terminal resized");
                self.renderer.resize(width as usize, height as usize);
            }
            _ => {}
        }
    }

    /// Apply one user action to the simulation
    pub fn apply(&mut self, action: Action) {
        match action {
            Action::Quit => self.running = false,
            Action::Drag { dx, dy } => {
                // A key press is a short flick: grab, move, release
                if self.simulation.drag_start(None) {
                    self.simulation.drag(dx, dy, None);
                    self.simulation.drag_end();
                }
            }
            Action::Roll(value) => self.start_roll(value, RollStyle::default()),
            Action::RandomRoll => {
                let value = rand::rng().random_range(1..=6);
                self.start_roll(value, RollStyle::default());
            }
            Action::BounceRoll => {
                let value = rand::rng().random_range(1..=6);
                self.start_roll(
                    value,
                    RollStyle::Bounce {
                        reveal_fraction: 0.6,
                    },
                );
            }
            Action::ToggleParent => {
                self.parent_frozen = !self.parent_frozen;
                self.simulation.set_parent_interactive(!self.parent_frozen);
                self.message = if self.parent_frozen {
                    "outer layer frozen".into()
                } else {
                    "outer layer released".into()
                };
            }
            Action::ToggleLock => self.toggle_inner_lock(),
        }
    }

    fn start_roll(&mut self, value: u8, style: RollStyle) {
        let handle = AnimationConfig::roll_to(value, 3.0, 4.0, 1500)
            .and_then(|config| config.with_style(style))
            .and_then(|config| self.simulation.roll_to(config));
        match handle {
            Ok(handle) => {
                info!(value, ?handle, "roll requested");
                self.message = String::from("rolling...");
            }
            Err(err) => self.message = err.to_string(),
        }
    }

    fn toggle_inner_lock(&mut self) {
        let (Some(lock), Some(rotation)) = (
            self.simulation.layer_lock(1),
            self.simulation.layer_rotation(1),
        ) else {
            self.message = String::from("no inner layer to lock");
            return;
        };
        let next = if lock.locked {
            LayerLock::unlocked()
        } else {
            LayerLock::locked(rotation.x, rotation.y)
        };
        match self.simulation.set_layer_lock(1, next) {
            Ok(()) if next.locked => self.message = String::from("layer 1 locked"),
            Ok(()) => self.message = String::from("layer 1 unlocked"),
            Err(err) => self.message = err.to_string(),
        }
    }

    /// Advance the simulation and react to its notifications
    pub fn update(&mut self, dt: Duration) {
        for event in self.simulation.tick(dt) {
            debug!(?event, "dice event");
            match event {
                DiceEvent::ValueChanged(_) | DiceEvent::StateChanged(DiceState::Rolling) => {}
                DiceEvent::StateChanged(DiceState::Landing) => {
                    self.message = format!("landing on {}", self.simulation.display_value())
                }
                DiceEvent::StateChanged(DiceState::Idle) => {
                    self.message = format!("rolled {}", self.simulation.display_value())
                }
            }
        }
    }

    /// Rasterize the current frame without touching the terminal
    pub fn draw_frame(&mut self) {
        let viewport = self
            .simulation
            .viewport(self.renderer.logical_width(), self.renderer.height() as f32);
        let faces = self.simulation.frame(&viewport);
        self.renderer.clear();
        self.renderer.render_faces(&faces);
    }

    pub fn renderer(&self) -> &AsciiRenderer {
        &self.renderer
    }

    fn status_line(&self) -> String {
        let value = match self.simulation.display_value() {
            0 => String::from("-"),
            v => v.to_string(),
        };
        format!(
            "Dice3D | FPS: {:.1} | {:?} | value {} | {} | Arrows/WASD=Spin 1-6=Roll R=Random B=Bounce P=Freeze L=Lock Q=Quit",
            self.fps,
            self.simulation.state(),
            value,
            self.message
        )
    }

    fn render(&mut self) -> io::Result<()> {
        self.draw_frame();

        let mut stdout = stdout();
        self.renderer.draw(&mut stdout)?;

        // Draw UI overlay
        let mut status = self.status_line();
        status.truncate(self.renderer.width());
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            terminal::Clear(ClearType::CurrentLine),
            SetForegroundColor(Color::Yellow),
            Print(status),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}
