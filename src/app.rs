use crate::components::{
    show_details, show_settings_window, show_system_stats, show_trends, DetailsState, ProcessTable, Settings,
    TableAction,
};
use crate::config::MonitorConfig;
use crate::metrics::{MonitorEngine, Refresher, WorkerEvent};
use crate::process::{ActionOutcome, ProcessAction, SysinfoSource, SystemActions, SystemStats};
use log::{debug, warn};

/// We derive Deserialize/Serialize so we can persist app state on shutdown.
#[derive(serde::Deserialize, serde::Serialize, Default)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct ProcessManagerApp {
    #[serde(skip)]
    refresher: Option<Refresher>,
    table: ProcessTable,
    settings: Settings,
    #[serde(skip)]
    status: String,
    #[serde(skip)]
    refreshing: bool,
    #[serde(skip)]
    system: SystemStats,
    #[serde(skip)]
    details: Option<DetailsState>,
    #[serde(skip)]
    trends_for: Option<String>,
    #[serde(skip)]
    pending_terminate: Option<(u32, String)>,
}

fn action_message(action: ProcessAction, pid: u32, outcome: &ActionOutcome) -> String {
    if outcome.success {
        return match action {
            ProcessAction::LowerPriority => format!("Lowered priority of process {}", pid),
            ProcessAction::Terminate => format!("Terminated process {}", pid),
        };
    }
    if outcome.is_permission_denied() {
        return format!(
            "Permission denied: cannot {} process {}. Try running with elevated privileges.",
            action.verb(),
            pid
        );
    }
    format!(
        "Failed to {} process {}: {}",
        action.verb(),
        pid,
        outcome.error.as_deref().unwrap_or("unknown error")
    )
}

impl ProcessManagerApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>, config: MonitorConfig) -> Self {
        // Load previous app state (if any).
        let mut app: Self = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();

        app.table.view.page_size = config.page_size;
        app.table.restore();

        let ctx = cc.egui_ctx.clone();
        let refresher = Refresher::spawn(
            MonitorEngine::new(config),
            SysinfoSource::new(),
            SystemActions,
            move || ctx.request_repaint(),
        );
        refresher.request_refresh();
        app.refreshing = true;
        app.status = "Loading processes...".to_string();
        app.refresher = Some(refresher);
        app
    }

    fn request_refresh(&mut self) {
        if let Some(refresher) = &self.refresher {
            refresher.request_refresh();
            self.refreshing = true;
            self.status = "Refreshing...".to_string();
        }
    }

    fn request_action(&mut self, action: ProcessAction, pid: u32) {
        if let Some(refresher) = &self.refresher {
            refresher.request_action(action, pid);
            self.refreshing = true;
        }
    }

    fn open_details(&mut self, pid: u32) {
        if let Some(refresher) = &self.refresher {
            refresher.request_details(pid);
            self.details = Some(DetailsState { pid, result: None });
        }
    }

    fn handle_events(&mut self) {
        let Some(refresher) = &self.refresher else {
            return;
        };

        for event in refresher.poll_events() {
            match event {
                WorkerEvent::Refreshed { generation, system } => {
                    self.refreshing = false;
                    self.system = system;
                    let engine = refresher.engine();
                    let Some(outcome) = engine.last_outcome() else {
                        continue;
                    };
                    if outcome.generation != generation {
                        debug!("Outcome {} superseded by {}", generation, outcome.generation);
                    }
                    self.table.sync(outcome);
                    self.status = match &outcome.error {
                        Some(e) => format!("Error loading processes: {}", e),
                        None if outcome.snapshot.is_empty() => "No processes returned".to_string(),
                        None => format!(
                            "Processes refreshed at {}",
                            outcome.snapshot.captured_at().format("%H:%M:%S")
                        ),
                    };
                }
                WorkerEvent::Details { pid, result } => {
                    if let Some(details) = self.details.as_mut().filter(|d| d.pid == pid) {
                        details.result = Some(result.map_err(|e| e.to_string()));
                    }
                }
                WorkerEvent::ActionDone { action, pid, outcome } => {
                    if !outcome.success {
                        warn!("{} on {} failed: {:?}", action.verb(), pid, outcome.error);
                    }
                    self.status = action_message(action, pid, &outcome);
                }
            }
        }
    }

    fn show_controls(&mut self, ui: &mut egui::Ui) {
        let selected = self
            .table
            .rows
            .selected_row()
            .and_then(|row| self.table.rows.selected_pid().map(|pid| (pid, row.name.clone())));

        ui.horizontal(|ui| {
            if ui
                .add_enabled(!self.refreshing, egui::Button::new("🔄 Refresh"))
                .clicked()
            {
                self.request_refresh();
            }

            ui.separator();

            if ui
                .add_enabled(selected.is_some(), egui::Button::new("Lower Priority"))
                .clicked()
            {
                if let Some((pid, _)) = &selected {
                    self.request_action(ProcessAction::LowerPriority, *pid);
                }
            }

            if ui
                .add_enabled(selected.is_some(), egui::Button::new("Terminate"))
                .clicked()
            {
                if let Some((pid, name)) = selected.clone() {
                    if self.settings.confirm_terminate {
                        self.pending_terminate = Some((pid, name));
                    } else {
                        self.request_action(ProcessAction::Terminate, pid);
                    }
                }
            }

            if let Some((pid, name)) = &selected {
                ui.label(format!("Selected: {} ({})", name, pid));
            }
        });
    }

    fn show_terminate_confirmation(&mut self, ctx: &egui::Context) {
        let Some((pid, name)) = self.pending_terminate.clone() else {
            return;
        };

        let mut decision = None;
        egui::Window::new("Confirm Terminate")
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(format!("Terminate {} (PID {})?", name, pid));
                ui.horizontal(|ui| {
                    if ui.button("Terminate").clicked() {
                        decision = Some(true);
                    }
                    if ui.button("Cancel").clicked() {
                        decision = Some(false);
                    }
                });
            });

        match decision {
            Some(true) => {
                self.pending_terminate = None;
                self.request_action(ProcessAction::Terminate, pid);
            }
            Some(false) => self.pending_terminate = None,
            None => {}
        }
    }

    fn show_windows(&mut self, ctx: &egui::Context) {
        show_settings_window(ctx, &mut self.settings);
        self.show_terminate_confirmation(ctx);

        if let Some(details) = &self.details {
            if !show_details(ctx, details) {
                self.details = None;
            }
        }

        if let (Some(name), Some(refresher)) = (&self.trends_for, &self.refresher) {
            let engine = refresher.engine();
            let open = show_trends(
                ctx,
                name,
                engine.history().get(name),
                engine.history().history_len(),
                self.settings.show_memory_trend,
            );
            drop(engine);
            if !open {
                self.trends_for = None;
            }
        }
    }
}

impl eframe::App for ProcessManagerApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, self);
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.settings.apply(ctx);
        self.handle_events();

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.add_space(16.0);
                egui::widgets::global_theme_preference_buttons(ui);

                ui.add_space(16.0);
                if ui.button("⚙").clicked() {
                    self.settings.show();
                }
            });
        });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if self.refreshing {
                    ui.spinner();
                }
                ui.label(&self.status);
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Process Manager");
            let snapshot = self.table.snapshot();
            show_system_stats(ui, &self.system, snapshot.process_count(), snapshot.len());

            self.show_controls(ui);
            self.table.show_search(ui);
            ui.separator();

            match self.table.show(ui) {
                Some(TableAction::OpenDetails(pid)) => self.open_details(pid),
                Some(TableAction::ShowTrends(name)) => self.trends_for = Some(name),
                None => {}
            }

            ui.separator();
            self.table.show_pagination(ui);
        });

        self.show_windows(ctx);
    }
}
