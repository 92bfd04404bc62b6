#![deny(clippy::all)]
#![forbid(unsafe_code)]

//! Window/input glue around `torus-grid`: paints the session through the
//! viewport transform and forwards pointer and key events to it. All
//! simulation logic lives in the library.

use pixels::wgpu::Color;
use pixels::{Pixels, PixelsBuilder, SurfaceTexture};
use std::sync::Arc;
use std::time::{Duration, Instant};
use torus_grid::{LifeSession, PaintableCell, Random, SessionConfig};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, KeyEvent, MouseButton, StartCause, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Cursor, CursorIcon, Fullscreen, Window, WindowId};

const TIME_STEP_MILLIS: u64 = 100;
const CELL_PIXEL_WIDTH: u32 = 4;
const FILL_PROBABILITY: f64 = 0.1;
const BACKGROUND_COLOR: Color = Color::BLACK;

fn main() {
    env_logger::init();
    let event_loop = EventLoop::new().unwrap();
    event_loop.set_control_flow(ControlFlow::Wait);
    event_loop.run_app(&mut AppEventHandler::new()).unwrap();
}

struct App {
    session: LifeSession,
    window: Arc<Window>,
    pixels: Pixels<'static>,
    frame_width: i64,
    frame_height: i64,
    cursor: PhysicalPosition<f64>,
    paused: bool,
    next_update: Instant,
}

impl App {
    fn new(event_loop: &ActiveEventLoop) -> Self {
        let window = Arc::new(Self::build_window(event_loop));
        let window_size = window.inner_size();

        let mut session = LifeSession::new(
            window_size.height / CELL_PIXEL_WIDTH,
            window_size.width / CELL_PIXEL_WIDTH,
            SessionConfig {
                cell_size: CELL_PIXEL_WIDTH,
                ..SessionConfig::default()
            },
        )
        .unwrap();
        session.seed_random(&mut Random::new(), FILL_PROBABILITY);

        let pixels = Self::build_pixels(&window);
        Self {
            session,
            window,
            pixels,
            frame_width: window_size.width as i64,
            frame_height: window_size.height as i64,
            cursor: PhysicalPosition::new(0.0, 0.0),
            paused: false,
            next_update: Instant::now(),
        }
    }

    fn build_window(event_loop: &ActiveEventLoop) -> Window {
        let window_attributes = Window::default_attributes()
            .with_cursor(Cursor::Icon(CursorIcon::Crosshair))
            .with_fullscreen(Some(Fullscreen::Borderless(None)))
            .with_visible(false);
        event_loop.create_window(window_attributes).unwrap()
    }

    fn build_pixels(window: &Arc<Window>) -> Pixels<'static> {
        let window_size = window.inner_size();
        let surface_texture =
            SurfaceTexture::new(window_size.width, window_size.height, window.clone());
        PixelsBuilder::new(window_size.width, window_size.height, surface_texture)
            .clear_color(BACKGROUND_COLOR)
            .build()
            .unwrap()
    }

    fn on_create(&mut self) {
        self.window.request_redraw();
        self.window.set_visible(true);
    }

    fn on_time_step(&mut self) {
        if !self.paused {
            self.session.step();
            self.window.request_redraw();
        }

        while self.next_update < Instant::now() {
            self.next_update += Duration::from_millis(TIME_STEP_MILLIS);
        }
    }

    fn on_redraw(&mut self) {
        let (width, height) = (self.frame_width, self.frame_height);
        let frame = self.pixels.frame_mut();
        frame.fill(0);
        self.session
            .for_each_cell(|cell| Self::paint_cell(frame, width, height, &cell));
        self.pixels.render().unwrap();
    }

    fn paint_cell(frame: &mut [u8], width: i64, height: i64, cell: &PaintableCell) {
        let left = cell.screen_x.max(0);
        let top = cell.screen_y.max(0);
        let right = (cell.screen_x + cell.screen_size).min(width);
        let bottom = (cell.screen_y + cell.screen_size).min(height);

        for y in top..bottom {
            for x in left..right {
                let offset = ((y * width + x) * 4) as usize;
                frame[offset..offset + 4].copy_from_slice(&cell.tag);
            }
        }
    }

    fn on_click(&mut self) {
        let toggled = self
            .session
            .toggle_at(self.cursor.x as i64, self.cursor.y as i64);
        if let Some(index) = toggled {
            log::debug!("toggled cell {index}");
            self.window.request_redraw();
        }
    }

    fn on_key(&mut self, code: KeyCode, event_loop: &ActiveEventLoop) {
        let pan = self.session.pan_step();
        match code {
            KeyCode::Escape | KeyCode::KeyQ | KeyCode::KeyX => {
                event_loop.exit();
                return;
            }
            KeyCode::KeyP => {
                self.paused = !self.paused;
            }
            KeyCode::Space => {
                if self.paused {
                    self.session.step();
                }
            }
            KeyCode::NumpadAdd | KeyCode::Equal => {
                let state = self.session.zoom_in();
                log::debug!("view: {state:?}");
            }
            KeyCode::NumpadSubtract | KeyCode::Minus => {
                let state = self.session.zoom_out();
                log::debug!("view: {state:?}");
            }
            KeyCode::ArrowLeft => {
                self.session.pan_by(pan, 0);
            }
            KeyCode::ArrowRight => {
                self.session.pan_by(-pan, 0);
            }
            KeyCode::ArrowUp => {
                self.session.pan_by(0, pan);
            }
            KeyCode::ArrowDown => {
                self.session.pan_by(0, -pan);
            }
            _ => return,
        }
        self.window.request_redraw();
    }
}

struct AppEventHandler {
    app: Option<App>,
}

impl AppEventHandler {
    fn new() -> Self {
        Self { app: None }
    }

    fn app(&mut self) -> &mut App {
        self.app.as_mut().unwrap()
    }
}

impl ApplicationHandler for AppEventHandler {
    fn new_events(&mut self, _event_loop: &ActiveEventLoop, cause: StartCause) {
        if let StartCause::ResumeTimeReached { .. } = cause {
            self.app().on_time_step();
        }
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.app.is_none() {
            self.app = Some(App::new(event_loop));
            self.app().on_create();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.app().cursor = position;
            }
            WindowEvent::MouseInput {
                state: ElementState::Released,
                button: MouseButton::Left,
                ..
            } => {
                self.app().on_click();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Released,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                self.app().on_key(code, event_loop);
            }
            WindowEvent::RedrawRequested => {
                self.app().on_redraw();
            }
            _ => (),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let wakeup_time = self.app().next_update;
        event_loop.set_control_flow(ControlFlow::WaitUntil(wakeup_time));
    }
}
