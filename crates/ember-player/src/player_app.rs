//! Windowed player implementing winit ApplicationHandler
//!
//! One redraw is one frame: clock tick, simulate, emit sprites, draw, present.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use ember_render::{BillboardPipeline, RenderContext, TextureCache};
use ember_runtime::GameClock;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Fullscreen, Window, WindowId};

use crate::scene::{load_sprite_texture, FountainScene, PlayerOptions};

const WINDOW_TITLE: &str = "Ember";
const WINDOW_SIZE: PhysicalSize<u32> = PhysicalSize::new(1024, 768);

/// GPU state that only exists once the window does
struct Graphics {
    window: Arc<Window>,
    context: RenderContext,
    pipeline: BillboardPipeline,
    // Owns the texture the bind group samples
    _textures: TextureCache,
    texture_bind_group: wgpu::BindGroup,
    scene: FountainScene,
}

pub struct PlayerApp {
    options: PlayerOptions,
    clock: GameClock,
    graphics: Option<Graphics>,
    error: Option<anyhow::Error>,
}

impl PlayerApp {
    pub fn new(options: PlayerOptions) -> Self {
        let clock = GameClock::with_target_fps(options.fps);
        Self {
            options,
            clock,
            graphics: None,
            error: None,
        }
    }

    /// The error that stopped the event loop, if any
    pub fn take_error(&mut self) -> Option<anyhow::Error> {
        self.error.take()
    }

    fn initialize(&mut self, event_loop: &ActiveEventLoop) -> Result<Graphics> {
        let window_attrs = Window::default_attributes()
            .with_title(WINDOW_TITLE)
            .with_inner_size(WINDOW_SIZE);
        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .context("Failed to create window")?,
        );
        if self.options.fullscreen {
            window.set_fullscreen(Some(Fullscreen::Borderless(None)));
        }

        let context = pollster::block_on(RenderContext::new(window.clone(), self.options.pacing))
            .context("Failed to initialise wgpu")?;

        let mut textures = TextureCache::new(&context.device, &context.queue);
        let texture = load_sprite_texture(
            &mut textures,
            &context.device,
            &context.queue,
            self.options.texture.as_deref(),
        )
        .context("Failed to load sprite texture")?;

        let pipeline = BillboardPipeline::new(&context.device, context.format());
        let texture_bind_group =
            pipeline.texture_bind_group(&context.device, textures.get(texture));

        let scene = FountainScene::new(
            self.options.config.clone(),
            self.options.seed,
            texture,
            context.aspect_ratio(),
        )
        .context("Failed to build particle scene")?;

        log::info!("[player] Escape to exit, F11 to toggle fullscreen");

        Ok(Graphics {
            window,
            context,
            pipeline,
            _textures: textures,
            texture_bind_group,
            scene,
        })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("[player] {err:#}");
        self.error = Some(err);
        event_loop.exit();
    }

    fn frame(&mut self) -> Result<()> {
        let Some(gfx) = &mut self.graphics else {
            return Ok(());
        };

        self.clock.tick();
        gfx.scene.advance(self.clock.delta_time)?;

        gfx.pipeline.prepare(
            &gfx.context.device,
            &gfx.context.queue,
            &gfx.scene.camera().projection_matrix(),
            gfx.scene.billboards(),
        );

        let output = match gfx.context.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("[player] Surface lost, reconfiguring");
                let size = gfx.context.size;
                gfx.context.resize(size);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("[player] Surface timeout, skipping frame");
                return Ok(());
            }
            Err(e) => anyhow::bail!("Surface error: {e}"),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        gfx.pipeline.render_to(
            &gfx.context.device,
            &gfx.context.queue,
            &view,
            &gfx.texture_bind_group,
        );
        output.present();

        if self.clock.frame_count % 250 == 0 {
            log::debug!(
                "[player] frame {}: {} sprites, dt {:.4}s",
                self.clock.frame_count,
                gfx.pipeline.sprite_count(),
                self.clock.delta_time
            );
        }
        Ok(())
    }

    fn toggle_fullscreen(&self) {
        if let Some(gfx) = &self.graphics {
            if gfx.window.fullscreen().is_some() {
                gfx.window.set_fullscreen(None);
            } else {
                gfx.window.set_fullscreen(Some(Fullscreen::Borderless(None)));
            }
        }
    }
}

impl ApplicationHandler for PlayerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.graphics.is_some() {
            return;
        }
        match self.initialize(event_loop) {
            Ok(graphics) => self.graphics = Some(graphics),
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => {
                if let Some(gfx) = &mut self.graphics {
                    gfx.context.resize(new_size);
                    gfx.scene.camera_mut().aspect = gfx.context.aspect_ratio();
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed || event.repeat {
                    return;
                }
                match event.physical_key {
                    PhysicalKey::Code(KeyCode::Escape) => event_loop.exit(),
                    PhysicalKey::Code(KeyCode::F11) => self.toggle_fullscreen(),
                    _ => {}
                }
            }

            WindowEvent::RedrawRequested => {
                if let Err(err) = self.frame() {
                    self.fail(event_loop, err);
                }
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(gfx) = &self.graphics else {
            return;
        };
        if !self.options.pacing {
            event_loop.set_control_flow(ControlFlow::Poll);
            gfx.window.request_redraw();
            return;
        }

        let wait = self.clock.time_until_next_frame();
        if wait.is_zero() {
            gfx.window.request_redraw();
        } else {
            event_loop.set_control_flow(ControlFlow::WaitUntil(Instant::now() + wait));
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gfx) = &mut self.graphics {
            if let Err(err) = gfx.scene.shutdown() {
                log::warn!("[player] Shutdown failed: {err}");
            }
        }
        log::info!(
            "[player] Exiting after {} frames ({:.1}s)",
            self.clock.frame_count,
            self.clock.total_time
        );
    }
}
