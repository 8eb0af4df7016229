use crate::process::SystemStats;

pub fn show_system_stats(ui: &mut egui::Ui, stats: &SystemStats, process_count: usize, group_count: usize) {
    ui.horizontal(|ui| {
        ui.vertical(|ui| {
            ui.label(format!("System CPU: {:.0}%", stats.cpu_percent));
            ui.add(egui::ProgressBar::new((stats.cpu_percent / 100.0) as f32).desired_width(160.0));
        });

        ui.add_space(32.0);

        ui.vertical(|ui| {
            ui.label(format!("System Memory: {:.0}%", stats.memory_percent));
            ui.add(egui::ProgressBar::new((stats.memory_percent / 100.0) as f32).desired_width(160.0));
        });

        ui.add_space(32.0);

        ui.vertical(|ui| {
            ui.label(format!("Processes: {}", process_count));
            ui.label(format!("Groups: {}", group_count));
        });
    });
    ui.add_space(8.0);
}
