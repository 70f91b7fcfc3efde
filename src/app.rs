use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use eframe::egui;

use crate::config::{AppConfig, ViewMode};
use crate::data::export;
use crate::data::loader::{self, LoadError, RawTable};
use crate::data::remote;
use crate::data::resolve::{self, ColumnChoices};
use crate::data::sample;
use crate::processing::encoding;
use crate::processing::reconcile;
use crate::state::session::{EditField, SessionStore};
use crate::state::theme::Theme;
use crate::ui::bubble_panel::{self, BubbleContext, BubbleEvent};
use crate::ui::canvas_panel::{self, CanvasSurface};
use crate::ui::sidebar::{self, SidebarAction, SidebarContext};
use crate::ui::table_view;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

type SharedResult = Arc<Mutex<Option<Result<RawTable, LoadError>>>>;

/// Background parse of a local file.
struct PendingLoad {
    name: String,
    result: SharedResult,
}

/// Background fetch of the CSV URL.
struct PendingFetch {
    result: SharedResult,
}

/// The main Quadrant application.
///
/// Every frame runs one full pass: pick the source, classify and resolve
/// it, sync the session snapshot, render the active view, and reconcile
/// whatever the view reported back.
pub struct QuadrantApp {
    theme: Theme,
    view_mode: ViewMode,
    url_input: String,
    show_table: bool,

    sample: RawTable,
    upload_result: Option<Result<RawTable, LoadError>>,
    upload_name: Option<String>,
    url_result: Option<Result<RawTable, LoadError>>,
    pending_load: Option<PendingLoad>,
    pending_fetch: Option<PendingFetch>,

    choices: ColumnChoices,
    /// Raw column used as the record label, for export and tooltips.
    label_col: Option<String>,
    session: SessionStore,
    /// Metric-editable copy of the loaded table; reset with the session.
    raw_working: Option<RawTable>,
    selected: Option<String>,
    surface: CanvasSurface,
}

impl QuadrantApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let config = AppConfig::load();

        // --- Global UI style ---
        let ctx = &cc.egui_ctx;
        let mut style = (*ctx.style()).clone();
        style.text_styles.insert(
            egui::TextStyle::Body,
            egui::FontId::proportional(15.0),
        );
        style.text_styles.insert(
            egui::TextStyle::Button,
            egui::FontId::proportional(14.5),
        );
        style.spacing.button_padding = egui::vec2(10.0, 5.0);
        style.spacing.item_spacing = egui::vec2(8.0, 6.0);
        style.visuals.widgets.inactive.corner_radius = egui::CornerRadius::same(6);
        style.visuals.widgets.hovered.corner_radius = egui::CornerRadius::same(6);
        style.visuals.widgets.active.corner_radius = egui::CornerRadius::same(6);
        ctx.set_style(style);
        ctx.set_visuals(config.theme.visuals());

        let mut app = Self {
            theme: config.theme,
            view_mode: config.view_mode,
            url_input: config.csv_url,
            show_table: false,
            sample: sample::sample_table(),
            upload_result: None,
            upload_name: None,
            url_result: None,
            pending_load: None,
            pending_fetch: None,
            choices: ColumnChoices::default(),
            label_col: None,
            session: SessionStore::new(),
            raw_working: None,
            selected: None,
            surface: CanvasSurface::new(),
        };
        // Try the configured remote source right away; the sample covers
        // the gap until it arrives.
        if !app.url_input.trim().is_empty() {
            app.start_fetch();
        }
        app
    }

    fn open_file_dialog(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Data Files", &["csv", "xls", "xlsx"])
            .add_filter("All Files", &["*"])
            .pick_file()
        {
            self.start_load(path);
        }
    }

    /// Parse a local file on a worker thread so the UI stays responsive.
    fn start_load(&mut self, path: PathBuf) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        let result: SharedResult = Arc::new(Mutex::new(None));
        let result_clone = Arc::clone(&result);
        std::thread::spawn(move || {
            *result_clone.lock().unwrap() = Some(loader::load_path(&path));
        });
        self.pending_load = Some(PendingLoad { name, result });
    }

    /// Fetch the CSV URL on a worker thread. One attempt; failures become
    /// source warnings.
    fn start_fetch(&mut self) {
        let url = self.url_input.trim().to_string();
        if url.is_empty() {
            return;
        }
        let result: SharedResult = Arc::new(Mutex::new(None));
        let result_clone = Arc::clone(&result);
        std::thread::spawn(move || {
            *result_clone.lock().unwrap() = Some(remote::fetch_csv(&url));
        });
        self.pending_fetch = Some(PendingFetch { result });
    }

    fn poll_background_work(&mut self) {
        if let Some(pending) = self.pending_load.take() {
            let finished = pending.result.lock().unwrap().take();
            match finished {
                Some(result) => {
                    match &result {
                        Ok(t) => tracing::info!(
                            "Loaded {} rows from {}",
                            t.row_count,
                            pending.name
                        ),
                        Err(e) => tracing::warn!("Could not load {}: {e}", pending.name),
                    }
                    self.upload_name = Some(pending.name);
                    self.upload_result = Some(result);
                }
                None => self.pending_load = Some(pending),
            }
        }
        if let Some(pending) = self.pending_fetch.take() {
            let finished = pending.result.lock().unwrap().take();
            match finished {
                Some(result) => {
                    match &result {
                        Ok(t) => tracing::info!("Fetched {} rows from URL", t.row_count),
                        Err(e) => tracing::warn!("URL fetch failed: {e}"),
                    }
                    self.url_result = Some(result);
                }
                None => self.pending_fetch = Some(pending),
            }
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let mut dropped: Vec<PathBuf> = Vec::new();
        ctx.input(|i| {
            for file in &i.raw.dropped_files {
                if let Some(path) = &file.path {
                    let ext = path
                        .extension()
                        .and_then(|e| e.to_str())
                        .map(|e| e.to_lowercase())
                        .unwrap_or_default();
                    if matches!(ext.as_str(), "csv" | "xls" | "xlsx") {
                        dropped.push(path.clone());
                    }
                }
            }
        });
        for path in dropped {
            self.start_load(path);
        }
    }

    fn apply_bubble_events(&mut self, events: Vec<BubbleEvent>) {
        for event in events {
            match event {
                BubbleEvent::Select(label) => self.selected = label,
                BubbleEvent::SetX(label, v) => self.session.apply_edit(&label, EditField::X, v),
                BubbleEvent::SetY(label, v) => self.session.apply_edit(&label, EditField::Y, v),
                BubbleEvent::SetMetric(label, v) => self.apply_metric_edit(&label, v),
            }
        }
    }

    /// Write a new metric value into the working raw table and re-derive
    /// every radius from the updated column.
    fn apply_metric_edit(&mut self, label: &str, value: f64) {
        let Some(raw) = self.raw_working.as_mut() else {
            return;
        };
        let Some(table) = self.session.current_mut() else {
            return;
        };
        let Some(size_col) = table.size_col.clone() else {
            return;
        };
        let Some(col_idx) = raw.column_index(&size_col) else {
            return;
        };
        let Some(row) = table.record(label).map(|r| r.raw_row) else {
            return;
        };
        raw.set_cell(row, col_idx, value.to_string());
        let (values, _) = loader::column_to_f64(raw.column(col_idx));
        encoding::apply_size_encoding(&mut table.records, &values);
    }

    fn export_csv(&self) {
        let Some(working) = self.session.current() else {
            return;
        };
        let Some(raw) = self.raw_working.as_ref() else {
            return;
        };
        if let Some(path) = rfd::FileDialog::new()
            .set_file_name("quadrant_layout.csv")
            .add_filter("CSV Files", &["csv"])
            .save_file()
        {
            let bytes = export::export_csv(working, raw, self.label_col.as_deref());
            match std::fs::write(&path, bytes) {
                Ok(()) => tracing::info!("Exported CSV to {:?}", path),
                Err(e) => tracing::error!("Failed to write CSV: {e}"),
            }
        }
    }

    fn save_config(&self) {
        AppConfig {
            theme: self.theme,
            view_mode: self.view_mode,
            csv_url: self.url_input.clone(),
        }
        .save();
    }
}

impl eframe::App for QuadrantApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.set_visuals(self.theme.visuals());

        self.poll_background_work();
        self.handle_dropped_files(ctx);

        // ------------------------------------------------------------------
        // Resolve the active source and sync the session snapshot
        // ------------------------------------------------------------------
        let outcome = loader::select_source(
            self.upload_result.as_ref(),
            self.url_result.as_ref(),
            &self.sample,
        );
        let origin = outcome.origin;
        let warnings = outcome.warnings;
        let plan = resolve::classify(outcome.table);
        let base = resolve::resolve(outcome.table, &plan, &self.choices);
        if self.session.get_or_init(&base) {
            tracing::info!("Working table rebuilt from {}", origin.describe());
            self.raw_working = Some(outcome.table.clone());
            self.surface.needs_rebuild = true;
            if let Some(selected) = &self.selected {
                if base.record(selected).is_none() {
                    self.selected = None;
                }
            }
        }

        // ------------------------------------------------------------------
        // Header
        // ------------------------------------------------------------------
        egui::TopBottomPanel::top("header")
            .frame(
                egui::Frame::side_top_panel(&ctx.style())
                    .inner_margin(egui::Margin::symmetric(16, 8)),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("Quadrant");
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.small(format!("v{VERSION}"));
                    });
                });
            });

        // ------------------------------------------------------------------
        // Sidebar
        // ------------------------------------------------------------------
        let size_range = self.session.current().and_then(|t| {
            let size_col = t.size_col.as_deref()?;
            let mut min = f64::INFINITY;
            let mut max = f64::NEG_INFINITY;
            for r in &t.records {
                if let Some(v) = r.size_value.filter(|v| v.is_finite()) {
                    min = min.min(v);
                    max = max.max(v);
                }
            }
            (min.is_finite() && max > min).then_some((size_col, min, max))
        });

        let previous_mode = self.view_mode;
        let mut sidebar_ctx = SidebarContext {
            plan: &plan,
            choices: &mut self.choices,
            url_input: &mut self.url_input,
            view_mode: &mut self.view_mode,
            theme: &mut self.theme,
            show_table: &mut self.show_table,
            origin,
            fetching: self.pending_fetch.is_some(),
            warnings: &warnings,
            upload_name: self.upload_name.as_deref(),
            size_range,
        };
        let action = sidebar::show_sidebar(ctx, &mut sidebar_ctx);

        self.label_col = resolve::effective_choices(&plan, &self.choices).label_col;

        match action {
            SidebarAction::None => {}
            SidebarAction::PickFile => self.open_file_dialog(),
            SidebarAction::FetchUrl => self.start_fetch(),
            SidebarAction::ExportCsv => self.export_csv(),
            SidebarAction::PreferencesChanged => self.save_config(),
        }
        if self.view_mode != previous_mode {
            self.surface.needs_rebuild = true;
        }

        // ------------------------------------------------------------------
        // Central panel: table, bubbles or canvas
        // ------------------------------------------------------------------
        let mut bubble_events: Vec<BubbleEvent> = Vec::new();
        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(working) = self.session.current() else {
                return;
            };
            if self.show_table {
                table_view::show_table_view(ui, working);
                return;
            }
            match self.view_mode {
                ViewMode::Bubble => {
                    if let Some(raw) = self.raw_working.as_ref() {
                        let view = BubbleContext {
                            table: working,
                            raw,
                            label_col: self.label_col.as_deref(),
                            selected: &self.selected,
                            theme: &self.theme,
                        };
                        bubble_events = bubble_panel::show_bubble_panel(ui, &view);
                    }
                }
                ViewMode::Canvas => {
                    canvas_panel::show_canvas(ui, &mut self.surface, working, &self.theme);
                }
            }
        });
        self.apply_bubble_events(bubble_events);

        // ------------------------------------------------------------------
        // Reconcile the drawing surface back into the session
        // ------------------------------------------------------------------
        if self.view_mode == ViewMode::Canvas && !self.show_table {
            if let Some(current) = self.session.current() {
                let recovered = reconcile::recover_table(
                    &self.surface.objects,
                    &self.surface.transform,
                    current,
                );
                if reconcile::needs_refresh(current, &recovered) {
                    self.session.replace(recovered);
                    self.surface.needs_rebuild = true;
                    ctx.request_repaint();
                }
            }
        }

        // Keep polling while background work is in flight.
        if self.pending_load.is_some() || self.pending_fetch.is_some() {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }
}
