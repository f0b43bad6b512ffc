use egui::{Color32, Id, Rect, Sense, pos2, vec2};

use crate::SketchApp;

pub fn sketch_panel(app: &mut SketchApp, ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        let available = ui.available_rect_before_wrap();
        // The raster is measured in whole points
        let canvas_rect = Rect::from_min_size(
            available.min,
            vec2(available.width().floor(), available.height().floor()),
        );

        // Claiming drags keeps touch scrolling and panning off the canvas
        ui.interact(canvas_rect, Id::new("sketch_canvas"), Sense::drag());

        app.resize_canvas([
            canvas_rect.width().max(0.0) as usize,
            canvas_rect.height().max(0.0) as usize,
        ]);
        app.handle_input(ctx, canvas_rect);

        if let Some(texture) = app.canvas_texture(ctx) {
            let uv = Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0));
            ui.painter_at(canvas_rect)
                .image(texture, canvas_rect, uv, Color32::WHITE);
        }
    });
}
