use crate::metrics::HistorySeries;
use egui::Vec2;

fn usage_plot(ui: &mut egui::Ui, id: impl std::hash::Hash, height: f32, history: &[f64], max_points: usize) {
    let plot = egui_plot::Plot::new(id)
        .height(height)
        .show_axes(true)
        .set_margin_fraction(Vec2::ZERO)
        .include_x(0.0)
        .include_x(max_points as f64)
        .include_y(0.0)
        .include_y(100.0)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .allow_double_click_reset(false);

    plot.show(ui, |plot_ui| {
        let points: egui_plot::PlotPoints = history
            .iter()
            .enumerate()
            .map(|(i, value)| [i as f64, *value])
            .collect();
        plot_ui.line(egui_plot::Line::new(points));
    });
}

/// Trend window for one process name. Returns `false` once closed.
pub fn show_trends(
    ctx: &egui::Context,
    name: &str,
    series: Option<&HistorySeries>,
    max_points: usize,
    show_memory: bool,
) -> bool {
    let mut open = true;
    egui::Window::new(format!("Trends: {}", name))
        .id(egui::Id::new("trends_window"))
        .open(&mut open)
        .default_size([420.0, 320.0])
        .show(ctx, |ui| {
            let Some(series) = series.filter(|s| !s.is_empty()) else {
                ui.label("No history for this process yet.");
                return;
            };

            let first = series.timestamps().first().map(|t| t.format("%H:%M:%S").to_string());
            let last = series.timestamps().last().map(|t| t.format("%H:%M:%S").to_string());
            if let (Some(first), Some(last)) = (first, last) {
                ui.label(format!("{} samples, {} to {}", series.len(), first, last));
            }

            ui.label(format!(
                "CPU: {:.1}% (avg {:.1}%, peak {:.1}%)",
                series.last_cpu().unwrap_or(0.0),
                series.avg_cpu(),
                series.peak_cpu()
            ));
            usage_plot(ui, format!("cpu_trend_{}", name), 100.0, &series.cpu(), max_points);

            if show_memory {
                ui.label(format!(
                    "Memory: {:.1}% (peak {:.1}%)",
                    series.last_memory().unwrap_or(0.0),
                    series.peak_memory()
                ));
                usage_plot(ui, format!("memory_trend_{}", name), 100.0, &series.memory(), max_points);
            }
        });
    open
}
