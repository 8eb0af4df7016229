use crate::process::ProcessDetails;

/// Details requested for a pid; `result` is `None` while the worker is busy.
pub struct DetailsState {
    pub pid: u32,
    pub result: Option<Result<ProcessDetails, String>>,
}

/// Returns `false` once the window was closed.
pub fn show_details(ctx: &egui::Context, details: &DetailsState) -> bool {
    let mut open = true;
    egui::Window::new(format!("Process {}", details.pid))
        .id(egui::Id::new("details_window"))
        .open(&mut open)
        .collapsible(false)
        .show(ctx, |ui| match &details.result {
            None => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label(format!("Loading details for process {}...", details.pid));
                });
            }
            Some(Err(e)) => {
                ui.colored_label(egui::Color32::from_rgb(0xdd, 0x33, 0x33), format!("Error: {}", e));
            }
            Some(Ok(d)) => {
                egui::Grid::new("details_grid").num_columns(2).show(ui, |ui| {
                    ui.label("Name:");
                    ui.label(&d.name);
                    ui.end_row();
                    ui.label("PID:");
                    ui.label(d.pid.to_string());
                    ui.end_row();
                    ui.label("CPU:");
                    ui.label(format!("{:.1}%", d.cpu_percent));
                    ui.end_row();
                    ui.label("Memory:");
                    ui.label(format!("{:.1} MB", d.memory_mb));
                    ui.end_row();
                    ui.label("User:");
                    ui.label(&d.user);
                    ui.end_row();
                    ui.label("Path:");
                    ui.label(&d.path);
                    ui.end_row();
                    ui.label("Started:");
                    ui.label(
                        d.start_time
                            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                            .unwrap_or_else(|| "Unknown".to_string()),
                    );
                    ui.end_row();
                });
            }
        });
    open
}
