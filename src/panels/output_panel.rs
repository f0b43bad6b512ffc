use egui::{Align2, Color32, ColorImage, FontId, Image, Vec2, load::SizedTexture};

use crate::SketchApp;
use crate::data_url::is_data_url;
use crate::generation::OutputImage;

pub const FAILURE_COLOR: Color32 = Color32::from_rgb(0xff, 0x6b, 0x6b);
pub const FAILURE_CAPTION: &str = "Generation Failed";
const PLACEHOLDER_SIZE: [usize; 2] = [512, 512];

/// The image shown in the output slot after a failed request
pub fn failure_placeholder() -> ColorImage {
    ColorImage::new(PLACEHOLDER_SIZE, FAILURE_COLOR)
}

pub fn output_panel(app: &mut SketchApp, ctx: &egui::Context) {
    egui::SidePanel::right("output_panel")
        .resizable(true)
        .default_width(360.0)
        .show(ctx, |ui| {
            ui.heading("Result");
            ui.separator();

            let Some((texture, natural_size)) = app.output_texture(ctx) else {
                ui.label("The generated image will appear here.");
                return;
            };

            let size = fit_width(natural_size, ui.available_width());
            let response = ui.add(Image::new(SizedTexture::new(texture, size)));

            match app.flow().output() {
                OutputImage::FailurePlaceholder => {
                    ui.painter().text(
                        response.rect.center(),
                        Align2::CENTER_CENTER,
                        FAILURE_CAPTION,
                        FontId::proportional(24.0),
                        Color32::WHITE,
                    );
                }
                OutputImage::Generated(generated) if !is_data_url(&generated.reference) => {
                    ui.small(generated.reference.as_str());
                }
                _ => {}
            }
        });
}

/// Scale down to `max_width`, keeping the aspect ratio; never upscale
fn fit_width(natural: Vec2, max_width: f32) -> Vec2 {
    if natural.x <= max_width || natural.x <= 0.0 {
        natural
    } else {
        natural * (max_width / natural.x)
    }
}
