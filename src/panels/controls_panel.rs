use egui::{Button, Color32, Id, Slider, TextEdit};

use crate::SketchApp;
use crate::canvas::{MAX_BRUSH_WIDTH, MIN_BRUSH_WIDTH};

const ERROR_COLOR: Color32 = Color32::from_rgb(220, 53, 69);

pub fn controls_panel(app: &mut SketchApp, ctx: &egui::Context) {
    egui::SidePanel::left("controls_panel")
        .resizable(true)
        .default_width(240.0)
        .show(ctx, |ui| {
            ui.heading("Sketch");

            ui.add(
                Slider::new(
                    &mut app.settings_mut().brush_width,
                    MIN_BRUSH_WIDTH..=MAX_BRUSH_WIDTH,
                )
                .text("Brush size"),
            );
            if ui.button("Clear Canvas").clicked() {
                app.clear_canvas();
            }

            ui.separator();

            ui.label("Prompt");
            ui.add(
                TextEdit::multiline(&mut app.settings_mut().prompt)
                    .id(Id::new("text_prompt"))
                    .hint_text("Describe what the sketch should become")
                    .desired_rows(3),
            );

            let button = app.generate_button();
            if ui
                .add_enabled(button.enabled, Button::new(button.label))
                .clicked()
            {
                app.generate();
            }

            if app.flow().loader_visible() {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Waiting for the generator...");
                });
            }

            if let Some(message) = app.flow().error_message() {
                ui.colored_label(ERROR_COLOR, message);
            }

            ui.separator();

            ui.collapsing("Settings", |ui| {
                ui.label("Generation endpoint");
                if ui
                    .text_edit_singleline(&mut app.settings_mut().endpoint)
                    .lost_focus()
                {
                    app.sync_endpoint();
                }
            });
        });
}
