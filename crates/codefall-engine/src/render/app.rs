//! Windowed runner.
//!
//! [`run_windowed`] owns a [`Scene`] and drives it from a winit event loop.
//! Every `RedrawRequested` advances the simulation by however many fixed
//! steps of wall-clock time have passed, redraws the canvas and presents it.

use std::sync::Arc;
use std::time::Instant;

use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{WindowAttributes, WindowId};

use super::presenter::FramePresenter;
use crate::canvas::Canvas;
use crate::scene::Scene;

/// Upper bound on fixed steps per frame, so a stalled window does not
/// trigger a burst of catch-up ticks.
const MAX_TICKS_PER_FRAME: u32 = 5;

/// Show `scene` in a window until it is closed.
///
/// The window starts at the scene's pixel size.
///
/// # Errors
///
/// Returns an error if the event loop cannot be created or the window or
/// presenter fail to initialise.
pub fn run_windowed(scene: Scene, window_title: &str) -> Result<(), anyhow::Error> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(winit::event_loop::ControlFlow::Poll);

    let mut app = App {
        state: AppState::Pending {
            scene,
            title: window_title.to_owned(),
        },
        init_failed: false,
    };

    event_loop.run_app(&mut app)?;

    if app.init_failed {
        return Err(anyhow::anyhow!(
            "failed to initialize window (see logs for details)"
        ));
    }
    Ok(())
}

/// Winit 0.30 only allows window creation inside `resumed`, hence the
/// two phases.
enum AppState {
    Pending {
        scene: Scene,
        title: String,
    },
    Running {
        scene: Scene,
        canvas: Canvas,
        presenter: FramePresenter,
        clock: FrameClock,
    },
    Transitioning,
}

struct App {
    state: AppState,
    init_failed: bool,
}

/// Converts wall-clock time into whole fixed steps.
struct FrameClock {
    last: Instant,
    carry: f64,
    step: f64,
}

impl FrameClock {
    fn new(step: f64) -> Self {
        Self {
            last: Instant::now(),
            carry: 0.0,
            step,
        }
    }

    fn ticks_due(&mut self) -> u32 {
        let now = Instant::now();
        self.carry += now.duration_since(self.last).as_secs_f64();
        self.last = now;
        self.take(MAX_TICKS_PER_FRAME)
    }

    fn take(&mut self, cap: u32) -> u32 {
        let due = (self.carry / self.step).floor();
        if due >= cap as f64 {
            self.carry = 0.0;
            return cap;
        }
        self.carry -= due * self.step;
        due as u32
    }
}

impl App {
    fn start(&mut self, event_loop: &ActiveEventLoop, scene: Scene, title: String) {
        let (width, height) = scene.config().pixel_size();
        let attrs = WindowAttributes::default()
            .with_title(title)
            .with_inner_size(winit::dpi::PhysicalSize::new(width, height));

        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                tracing::error!(error = %e, "failed to create window, exiting");
                self.fail(event_loop, scene);
                return;
            }
        };

        let background = scene.config().background;
        match pollster::block_on(FramePresenter::new(
            window.clone(),
            (width, height),
            background,
        )) {
            Ok(presenter) => {
                tracing::info!(width, height, seed = scene.seed(), "window opened");
                window.request_redraw();
                let canvas = scene.new_canvas();
                let clock = FrameClock::new(scene.physics().fixed_dt());
                self.state = AppState::Running {
                    scene,
                    canvas,
                    presenter,
                    clock,
                };
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to initialize presenter, exiting");
                self.fail(event_loop, scene);
            }
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, scene: Scene) {
        self.init_failed = true;
        self.state = AppState::Pending {
            scene,
            title: String::new(),
        };
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        match std::mem::replace(&mut self.state, AppState::Transitioning) {
            AppState::Pending { scene, title } => self.start(event_loop, scene, title),
            running @ AppState::Running { .. } => self.state = running,
            AppState::Transitioning => {
                tracing::warn!("resumed called during state transition");
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let AppState::Running {
            scene,
            canvas,
            presenter,
            clock,
        } = &mut self.state
        else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                tracing::info!(
                    ticks = scene.tick_count(),
                    spawned = scene.spawned_total(),
                    culled = scene.culled_total(),
                    "window closed"
                );
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                tracing::debug!(width = new_size.width, height = new_size.height, "window resized");
                presenter.resize(new_size);
            }
            WindowEvent::RedrawRequested => {
                for _ in 0..clock.ticks_due() {
                    let report = scene.tick();
                    if report.spawned > 0 || report.culled > 0 {
                        tracing::trace!(
                            tick = report.tick,
                            spawned = report.spawned,
                            culled = report.culled,
                            "bodies changed"
                        );
                    }
                }
                scene.render(canvas);

                match presenter.present(canvas) {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        let size = presenter.window().inner_size();
                        presenter.resize(size);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        tracing::error!("GPU out of memory, exiting");
                        event_loop.exit();
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "surface error during present");
                    }
                }
                presenter.window().request_redraw();
            }
            _ => {}
        }
    }
}
