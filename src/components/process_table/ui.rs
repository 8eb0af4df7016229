use super::state::ProcessTable;
use crate::process::{GroupedProcess, StatusTier};
use crate::view::SortField;
use egui::{Color32, RichText};

/// What the user asked for while the table was drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableAction {
    OpenDetails(u32),
    ShowTrends(String),
}

fn usage_color(value: f64) -> Option<Color32> {
    if value > 80.0 {
        Some(Color32::from_rgb(0xdd, 0x33, 0x33))
    } else if value > 50.0 {
        Some(Color32::from_rgb(0xe6, 0x9a, 0x28))
    } else {
        None
    }
}

fn value_text(value: f64, changed: bool) -> RichText {
    let mut text = RichText::new(format!("{:.1}%", value));
    if let Some(color) = usage_color(value) {
        text = text.color(color);
    }
    if changed {
        text = text.strong();
    }
    text
}

fn status_text(status: StatusTier) -> RichText {
    let text = RichText::new(status.label());
    if status.is_critical() {
        text.color(Color32::from_rgb(0xdd, 0x33, 0x33))
    } else {
        text.color(Color32::from_rgb(0xe6, 0x9a, 0x28))
    }
}

fn pid_text(row: &GroupedProcess) -> String {
    match (row.first_pid(), row.count) {
        (Some(pid), 1) => pid.to_string(),
        (Some(pid), n) => format!("{} +{}", pid, n - 1),
        (None, _) => "-".to_string(),
    }
}

impl ProcessTable {
    fn header(&mut self, ui: &mut egui::Ui, field: SortField) {
        let label = if self.view.sort_field == field {
            format!("{} {}", field.label(), self.view.sort_direction.arrow())
        } else {
            field.label().to_string()
        };
        if ui.button(RichText::new(label).strong()).clicked() {
            self.toggle_sort(field);
        }
    }

    pub fn show_search(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("Search:");
            if ui
                .add(egui::TextEdit::singleline(&mut self.search).hint_text("Search processes..."))
                .changed()
            {
                self.apply_search();
            }
            if !self.search.is_empty() && ui.small_button("❌").clicked() {
                self.clear_search();
            }
        });
    }

    pub fn show(&mut self, ui: &mut egui::Ui) -> Option<TableAction> {
        let mut action = None;

        if self.rows.is_empty() {
            let message = if self.view.search_term().trim().is_empty() {
                "No processes found.".to_string()
            } else {
                format!("No processes match your search: \"{}\"", self.view.search_term().trim())
            };
            ui.label(RichText::new(message).color(Color32::GRAY));
            return None;
        }

        egui::ScrollArea::vertical().show(ui, |ui| {
            egui::Grid::new("process_table")
                .striped(true)
                .num_columns(6)
                .show(ui, |ui| {
                    self.header(ui, SortField::Pid);
                    self.header(ui, SortField::Name);
                    self.header(ui, SortField::Cpu);
                    self.header(ui, SortField::Memory);
                    ui.label(RichText::new("Status").strong());
                    ui.label("");
                    ui.end_row();

                    let selected = self.rows.selected_pid();
                    let mut clicked = None;
                    for row in self.rows.rows() {
                        let is_selected = selected.is_some_and(|pid| row.pids.contains(&pid));
                        let changed = self.rows.is_changed(&row.name);

                        let response = ui.selectable_label(is_selected, pid_text(row));
                        if response.double_clicked() {
                            action = row.first_pid().map(TableAction::OpenDetails);
                        } else if response.clicked() {
                            clicked = row.first_pid();
                        }

                        let name = if row.count > 1 {
                            format!("{} (x{})", row.name, row.count)
                        } else {
                            row.name.clone()
                        };
                        ui.label(name);
                        ui.label(value_text(row.display_cpu(), changed));
                        ui.label(value_text(row.memory_percent, changed));
                        ui.label(status_text(row.status()));
                        if ui.small_button("📈").on_hover_text("Trends").clicked() {
                            action = Some(TableAction::ShowTrends(row.name.clone()));
                        }
                        ui.end_row();
                    }
                    if let Some(pid) = clicked {
                        self.rows.select(pid);
                    }
                });
        });

        action
    }

    pub fn show_pagination(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let total_pages = self.rows.total_pages();
            if ui
                .add_enabled(self.view.has_prev(), egui::Button::new("◀ Prev"))
                .clicked()
            {
                self.prev_page();
            }
            ui.label(format!(
                "Page {} of {} ({} groups)",
                self.view.current_page + 1,
                self.rows.displayed_total_pages(),
                self.rows.total_count()
            ));
            if ui
                .add_enabled(self.view.has_next(total_pages), egui::Button::new("Next ▶"))
                .clicked()
            {
                self.next_page();
            }
        });
    }
}
