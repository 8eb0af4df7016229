use super::state::Settings;

pub fn show_settings_window(ctx: &egui::Context, settings: &mut Settings) {
    if !settings.is_visible() {
        return;
    }

    egui::Window::new("⚙ Settings")
        .collapsible(false)
        .resizable(false)
        .show(ctx, |ui| {
            ui.heading("Appearance");
            egui::Grid::new("settings_appearance").num_columns(2).show(ui, |ui| {
                ui.label("UI Scale:");
                ui.add(egui::Slider::new(&mut settings.scale, 0.5..=2.0).step_by(0.1));
                ui.end_row();
                ui.label("Font Size:");
                ui.add(egui::Slider::new(&mut settings.font_size, 8.0..=32.0).step_by(1.0));
                ui.end_row();
            });

            ui.separator();
            ui.heading("Behaviour");
            ui.checkbox(&mut settings.show_memory_trend, "Plot memory in trends");
            ui.checkbox(&mut settings.confirm_terminate, "Confirm before terminating");

            ui.separator();
            ui.horizontal(|ui| {
                if ui.button("Reset").clicked() {
                    settings.reset();
                }
                if ui.button("Close").clicked() {
                    settings.hide();
                }
            });
        });
}
