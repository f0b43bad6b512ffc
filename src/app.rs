use egui::{TextureId, Vec2};

use crate::canvas::SketchCanvas;
use crate::generation::{GenerateButton, GenerationFlow, HttpBackend, OutputImage};
use crate::input::InputHandler;
use crate::panels::{self, failure_placeholder};
use crate::settings::Settings;
use crate::texture_manager::{TextureManager, TextureSlot};

/// Only `Settings` are persisted on shutdown; the sketch and any generated
/// image live for the session.
pub struct SketchApp {
    settings: Settings,
    canvas: SketchCanvas,
    input: InputHandler,
    flow: GenerationFlow,
    backend: HttpBackend,
    textures: TextureManager,
}

impl SketchApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let settings = Settings::load(cc.storage);
        let backend =
            HttpBackend::new(settings.resolved_endpoint()).with_repaint(cc.egui_ctx.clone());
        log::info!("Generation endpoint: {}", backend.endpoint());

        Self {
            settings,
            canvas: SketchCanvas::new(),
            input: InputHandler::new(),
            flow: GenerationFlow::new(),
            backend,
            textures: TextureManager::new(),
        }
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn flow(&self) -> &GenerationFlow {
        &self.flow
    }

    pub fn generate_button(&self) -> GenerateButton {
        self.flow.generate_button()
    }

    /// Re-read the endpoint after it was edited in the settings panel
    pub fn sync_endpoint(&mut self) {
        self.backend.set_endpoint(self.settings.resolved_endpoint());
    }

    /// Keep the raster the same size as its layout box
    pub fn resize_canvas(&mut self, size: [usize; 2]) {
        self.canvas.resize(size);
    }

    pub fn clear_canvas(&mut self) {
        self.canvas.clear();
    }

    /// Feed this frame's pointer and touch events to the canvas
    pub fn handle_input(&mut self, ctx: &egui::Context, canvas_rect: egui::Rect) {
        let brush_width = self.settings.brush_width;
        for input in self.input.process_input(ctx, canvas_rect) {
            self.canvas.apply(input, brush_width);
        }
    }

    pub fn generate(&mut self) {
        if let Err(err) = self
            .flow
            .trigger(&self.backend, &self.canvas, &self.settings.prompt)
        {
            log::warn!("Generate request rejected: {}", err);
        }
    }

    pub fn canvas_texture(&mut self, ctx: &egui::Context) -> Option<TextureId> {
        let canvas = &self.canvas;
        self.textures
            .get_or_update(
                TextureSlot::Canvas,
                canvas.version(),
                || Ok(canvas.to_color_image()),
                ctx,
            )
            .map_err(|err| log::debug!("Canvas texture unavailable: {}", err))
            .ok()
    }

    /// Texture and natural size of whatever the output slot shows
    pub fn output_texture(&mut self, ctx: &egui::Context) -> Option<(TextureId, Vec2)> {
        let version = self.flow.output_version();
        let output = self.flow.output();
        let size = match output {
            OutputImage::Empty => return None,
            OutputImage::Generated(generated) => generated.image.size,
            OutputImage::FailurePlaceholder => failure_placeholder().size,
        };

        let texture = self.textures.get_or_update(
            TextureSlot::Output,
            version,
            || match output {
                OutputImage::Generated(generated) => Ok(generated.image.clone()),
                _ => Ok(failure_placeholder()),
            },
            ctx,
        );
        match texture {
            Ok(id) => Some((id, Vec2::new(size[0] as f32, size[1] as f32))),
            Err(err) => {
                log::error!("Failed to upload output image: {}", err);
                None
            }
        }
    }
}

impl eframe::App for SketchApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        self.settings.save(storage);
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.flow.poll();

        panels::controls_panel(self, ctx);
        panels::output_panel(self, ctx);
        // Central panel last so it takes the space the side panels leave
        panels::sketch_panel(self, ctx);
    }
}
