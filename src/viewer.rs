//! Viewer orchestration
//!
//! Owns the GPU context, the material resolver and the mesh objects, and
//! exposes the lifecycle hooks a hosting shell drives: `load`, `paint`,
//! `resize` and pointer hover. The shell may instead hand control to
//! [`Viewer::run_loop`], an explicit render task (render, present, yield,
//! repeat) with a stop signal, which also samples input at a fixed rate on
//! the same thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use glam::{Mat4, Vec3};

use crate::backend::GpuContext;
use crate::error::LoadError;
use crate::renderer::render_frame;
use crate::resources::MaterialResolver;
use crate::scene::{estimate_bounds, Camera, MeshObject};
use crate::ViewerConfig;

/// The viewer: pre-load registration, load-time pipeline, per-frame hooks.
pub struct Viewer<C: GpuContext, R: MaterialResolver> {
    ctx: C,
    resolver: R,
    config: ViewerConfig,
    objects: Vec<MeshObject>,
    registered_cameras: Vec<(String, Mat4)>,
    cameras: Vec<Camera>,
    active_camera: usize,
    min_bounds: Vec3,
    max_bounds: Vec3,
    loaded: bool,
    started: Instant,
}

impl<C: GpuContext, R: MaterialResolver> Viewer<C, R> {
    pub fn new(ctx: C, resolver: R, config: ViewerConfig) -> Self {
        Self {
            ctx,
            resolver,
            config,
            objects: Vec::new(),
            registered_cameras: Vec::new(),
            cameras: Vec::new(),
            active_camera: 0,
            min_bounds: Vec3::ZERO,
            max_bounds: Vec3::ZERO,
            loaded: false,
            started: Instant::now(),
        }
    }

    /// Register a mesh object. Must happen before [`load`](Self::load).
    pub fn add_mesh_object(&mut self, object: MeshObject) {
        self.objects.push(object);
    }

    /// Register a named camera placed from a scene transform. Must happen
    /// before [`load`](Self::load).
    pub fn add_camera(&mut self, name: impl Into<String>, transform: Mat4) {
        let name = name.into();
        log::info!("adding camera {name}");
        self.registered_cameras.push((name, transform));
    }

    /// Load hook: configure the context, size the default camera from the
    /// first mesh's bounds, then upload and build every object's draw calls.
    pub fn load(&mut self, width: u32, height: u32) -> Result<(), LoadError> {
        self.ctx.configure(self.config.background_color);
        self.ctx.set_viewport(width, height);
        self.ctx.clear();

        let max_anisotropy = self.ctx.max_anisotropy();

        let (min_bounds, max_bounds) = estimate_bounds(&self.objects)?;
        self.min_bounds = min_bounds;
        self.max_bounds = max_bounds;

        for object in &mut self.objects {
            object.build_draw_calls(&mut self.ctx, &mut self.resolver, max_anisotropy)?;
        }

        self.cameras.clear();
        self.cameras.push(Camera::from_bounds(
            width as f32,
            height as f32,
            min_bounds,
            max_bounds,
        ));
        for (name, transform) in &self.registered_cameras {
            self.cameras.push(Camera::from_transform(
                width as f32,
                height as f32,
                *transform,
                name.clone(),
            ));
        }
        self.active_camera = 0;
        self.loaded = true;

        let total: usize = self.objects.iter().map(|o| o.draw_calls().len()).sum();
        log::info!("{total} draw calls total");
        Ok(())
    }

    /// Paint hook: render one frame. Does nothing until loaded; presenting
    /// is the shell's business.
    pub fn paint(&mut self) {
        if !self.loaded {
            return;
        }
        let camera = &self.cameras[self.active_camera];
        render_frame(&mut self.ctx, camera, &self.objects, self.started.elapsed());
    }

    /// Resize hook: propagate the new surface size and clear.
    pub fn resize(&mut self, width: u32, height: u32) {
        if !self.loaded {
            return;
        }
        for camera in &mut self.cameras {
            camera.set_viewport_size(width as f32, height as f32);
        }
        self.ctx.set_viewport(width, height);
        self.ctx.clear();
    }

    /// Focus hook: the surface just became current again, so refresh it.
    /// Re-enabling vsync on the restored surface is the shell's business.
    pub fn focus(&mut self) {
        if self.loaded {
            self.ctx.clear();
        }
    }

    /// Pointer enter/leave hook for the active camera's hover flag.
    pub fn set_hover(&mut self, hover: bool) {
        if let Some(camera) = self.cameras.get_mut(self.active_camera) {
            camera.mouse_over_surface = hover;
        }
    }

    /// Switch the active camera. Index 0 is the default bounds camera,
    /// registered cameras follow in registration order. Out-of-range
    /// indices are ignored.
    pub fn activate_camera(&mut self, index: usize) {
        if index < self.cameras.len() {
            self.active_camera = index;
        } else {
            log::warn!("camera index {index} out of range ({})", self.cameras.len());
        }
    }

    /// The currently active camera, once loaded.
    pub fn camera(&self) -> Option<&Camera> {
        self.cameras.get(self.active_camera)
    }

    /// Mutable access for input integration between frames.
    pub fn camera_mut(&mut self) -> Option<&mut Camera> {
        self.cameras.get_mut(self.active_camera)
    }

    /// Bounds estimated at load, (zero, zero) before that.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        (self.min_bounds, self.max_bounds)
    }

    /// Access to the GPU context, e.g. for the shell to register provider
    /// resources.
    pub fn ctx_mut(&mut self) -> &mut C {
        &mut self.ctx
    }

    /// Continuous render loop: render, present, yield, repeat until `stop`
    /// is raised. `sample_input` runs at the configured fixed rate on this
    /// same thread and may mutate the active camera; `present` swaps the
    /// shell's buffers after each frame.
    pub fn run_loop(
        &mut self,
        mut present: impl FnMut(),
        mut sample_input: impl FnMut(&mut Camera),
        stop: &AtomicBool,
    ) {
        let tick = Duration::from_secs(1) / self.config.input_rate_hz.max(1);
        let mut last_tick = Instant::now();

        while !stop.load(Ordering::Relaxed) {
            if last_tick.elapsed() >= tick {
                last_tick = Instant::now();
                if let Some(camera) = self.cameras.get_mut(self.active_camera) {
                    sample_input(camera);
                }
            }

            self.paint();
            present();
            std::thread::yield_now();
        }
    }
}
