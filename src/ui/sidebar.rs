use crate::config::ViewMode;
use crate::data::loader::SourceOrigin;
use crate::data::resolve::{
    effective_choices, ColumnChoices, ResolveMode, ResolvePlan, SizeChoice,
};
use crate::processing::encoding::HEAT_PALETTE;
use crate::state::theme::Theme;

/// What the sidebar asks the app to do.
pub enum SidebarAction {
    None,
    PickFile,
    FetchUrl,
    ExportCsv,
    /// Theme, view mode or URL changed; persist preferences.
    PreferencesChanged,
}

/// Everything the sidebar reads and mutates this frame.
pub struct SidebarContext<'a> {
    pub plan: &'a ResolvePlan,
    pub choices: &'a mut ColumnChoices,
    pub url_input: &'a mut String,
    pub view_mode: &'a mut ViewMode,
    pub theme: &'a mut Theme,
    pub show_table: &'a mut bool,
    pub origin: SourceOrigin,
    pub fetching: bool,
    pub warnings: &'a [String],
    pub upload_name: Option<&'a str>,
    /// Size column with its observed value range, for the legend.
    pub size_range: Option<(&'a str, f64, f64)>,
}

fn column_combo(
    ui: &mut egui::Ui,
    id: &str,
    current: &Option<String>,
    candidates: &[String],
) -> Option<Option<String>> {
    let mut picked = current.clone();
    egui::ComboBox::from_id_salt(id)
        .selected_text(picked.clone().unwrap_or_default())
        .width(200.0)
        .show_ui(ui, |ui| {
            for c in candidates {
                ui.selectable_value(&mut picked, Some(c.clone()), c);
            }
        });
    (picked != *current).then_some(picked)
}

pub fn show_sidebar(ctx: &egui::Context, view: &mut SidebarContext<'_>) -> SidebarAction {
    let mut action = SidebarAction::None;

    egui::SidePanel::left("sidebar")
        .default_width(280.0)
        .show(ctx, |ui| {
            ui.add_space(8.0);
            ui.heading("Data");
            ui.add_space(4.0);

            if ui
                .button("Open CSV / Excel File")
                .on_hover_text("Load a local file as the data source")
                .clicked()
            {
                action = SidebarAction::PickFile;
            }
            if let Some(name) = view.upload_name {
                ui.label(egui::RichText::new(name).weak());
            }

            ui.add_space(8.0);
            ui.label(egui::RichText::new("CSV URL").strong());
            let url_edit = ui.add(
                egui::TextEdit::singleline(view.url_input)
                    .hint_text("Drive share link or HTTP CSV"),
            );
            if url_edit.lost_focus() {
                action = SidebarAction::PreferencesChanged;
            }
            ui.horizontal(|ui| {
                if ui
                    .add_enabled(!view.fetching, egui::Button::new("Fetch"))
                    .clicked()
                {
                    action = SidebarAction::FetchUrl;
                }
                if view.fetching {
                    ui.spinner();
                }
            });

            ui.add_space(4.0);
            ui.label(
                egui::RichText::new(format!("Using {}", view.origin.describe())).weak(),
            );
            for warning in view.warnings {
                ui.colored_label(egui::Color32::from_rgb(220, 120, 40), warning);
            }

            ui.separator();

            // --- Axis selection ---
            ui.label(egui::RichText::new("Axes").strong());
            ui.add_space(2.0);
            let eff = effective_choices(view.plan, view.choices);

            match view.plan.mode {
                ResolveMode::StateTable => {
                    ui.add_enabled_ui(false, |ui| {
                        let _ = column_combo(ui, "label_col", &eff.label_col, &view.plan.label_candidates);
                        let _ = column_combo(ui, "x_axis", &eff.x_col, &["X".to_string()]);
                        let _ = column_combo(ui, "y_axis", &eff.y_col, &["Y".to_string()]);
                    });
                    ui.label(
                        egui::RichText::new("Recognized as a previously exported layout").weak(),
                    );
                }
                ResolveMode::PickAxes => {
                    ui.label("X Axis");
                    if let Some(picked) =
                        column_combo(ui, "x_axis", &eff.x_col, &view.plan.axis_candidates)
                    {
                        view.choices.x_col = picked;
                    }
                    ui.label("Y Axis");
                    if let Some(picked) =
                        column_combo(ui, "y_axis", &eff.y_col, &view.plan.axis_candidates)
                    {
                        view.choices.y_col = picked;
                    }
                }
                ResolveMode::Manual => {
                    ui.label("Label Column");
                    if view.plan.label_candidates.is_empty() {
                        ui.label(egui::RichText::new("(row index)").weak());
                    } else if let Some(picked) =
                        column_combo(ui, "label_col", &eff.label_col, &view.plan.label_candidates)
                    {
                        view.choices.label_col = picked;
                    }
                    ui.label("X Axis");
                    if let Some(picked) =
                        column_combo(ui, "x_axis", &eff.x_col, &view.plan.axis_candidates)
                    {
                        view.choices.x_col = picked;
                    }
                    ui.label("Y Axis");
                    if let Some(picked) =
                        column_combo(ui, "y_axis", &eff.y_col, &view.plan.axis_candidates)
                    {
                        view.choices.y_col = picked;
                    }
                }
            }
            if view.plan.synthesized_label {
                ui.label(egui::RichText::new("Labels generated from the row index").weak());
            }

            ui.add_space(8.0);

            // --- Size encoding ---
            ui.label(egui::RichText::new("Bubble Size").strong());
            ui.add_space(2.0);
            let mut size_pick = eff.size_col.clone();
            egui::ComboBox::from_id_salt("size_col")
                .selected_text(
                    size_pick
                        .clone()
                        .unwrap_or_else(|| "None (fixed size)".to_string()),
                )
                .width(200.0)
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut size_pick, None, "None (fixed size)");
                    for c in &view.plan.size_candidates {
                        ui.selectable_value(&mut size_pick, Some(c.clone()), c);
                    }
                });
            if size_pick != eff.size_col {
                view.choices.size = match size_pick {
                    None => SizeChoice::Fixed,
                    Some(c) => SizeChoice::Column(c),
                };
            }

            if let Some((size_col, min, max)) = view.size_range {
                ui.add_space(4.0);
                heat_legend(ui);
                ui.label(
                    egui::RichText::new(format!("{size_col}: {min:.1} - {max:.1}")).weak(),
                );
                ui.label(egui::RichText::new("Bubbles: 10px - 50px, faint to solid").weak());
            }

            ui.separator();

            // --- View ---
            ui.label(egui::RichText::new("View").strong());
            ui.add_space(2.0);
            ui.horizontal(|ui| {
                for mode in [ViewMode::Bubble, ViewMode::Canvas] {
                    if ui
                        .selectable_value(view.view_mode, mode, mode.label())
                        .clicked()
                    {
                        action = SidebarAction::PreferencesChanged;
                    }
                }
            });
            ui.checkbox(view.show_table, "Show data table");

            let theme_label = match view.theme {
                Theme::Dark => "Light Mode",
                Theme::Light => "Dark Mode",
            };
            if ui.button(theme_label).clicked() {
                *view.theme = view.theme.toggle();
                action = SidebarAction::PreferencesChanged;
            }

            ui.separator();

            let export_btn = egui::Button::new(egui::RichText::new("Download CSV").strong())
                .min_size(egui::vec2(120.0, 28.0));
            if ui
                .add(export_btn)
                .on_hover_text("Save the current layout as CSV")
                .clicked()
            {
                action = SidebarAction::ExportCsv;
            }
        });

    action
}

/// Paint the heat ramp as a horizontal bar of palette stops.
fn heat_legend(ui: &mut egui::Ui) {
    let (rect, _) = ui.allocate_exact_size(
        egui::vec2(ui.available_width().min(200.0), 14.0),
        egui::Sense::hover(),
    );
    let n = HEAT_PALETTE.len();
    let seg_w = rect.width() / n as f32;
    for (i, [r, g, b]) in HEAT_PALETTE.iter().enumerate() {
        let seg = egui::Rect::from_min_size(
            egui::pos2(rect.left() + i as f32 * seg_w, rect.top()),
            egui::vec2(seg_w + 0.5, rect.height()),
        );
        ui.painter()
            .rect_filled(seg, egui::CornerRadius::ZERO, egui::Color32::from_rgb(*r, *g, *b));
    }
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new("Low").weak());
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(egui::RichText::new("High").weak());
        });
    });
}
