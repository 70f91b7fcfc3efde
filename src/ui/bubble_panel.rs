use egui_plot::{HLine, LineStyle, Plot, PlotPoints, Points, VLine};

use crate::data::loader::RawTable;
use crate::processing::encoding;
use crate::processing::hover::HoverTree;
use crate::state::table::{StateTable, INTERNAL_COLUMNS};
use crate::state::theme::Theme;

/// Axis range of the bubble chart, data units.
const AXIS_EXTENT: f64 = 120.0;
/// Metric cards always shown for the selected record.
const CARD_METRICS: [&str; 4] = ["Costo", "Impacto", "Esfuerzo", "Variable"];
/// Pick distance for hover and click, data units.
const PICK_RADIUS: f64 = 10.0;

/// Edits requested by the panel this frame.
pub enum BubbleEvent {
    Select(Option<String>),
    SetX(String, f64),
    SetY(String, f64),
    /// New value for the size-metric column of one record.
    SetMetric(String, f64),
}

pub struct BubbleContext<'a> {
    pub table: &'a StateTable,
    pub raw: &'a RawTable,
    pub label_col: Option<&'a str>,
    pub selected: &'a Option<String>,
    pub theme: &'a Theme,
}

pub fn show_bubble_panel(ui: &mut egui::Ui, view: &BubbleContext<'_>) -> Vec<BubbleEvent> {
    let mut events = Vec::new();

    let total = ui.available_width();
    let control_width = (total * 0.28).clamp(220.0, 340.0);

    ui.horizontal_top(|ui| {
        let plot_width = total - control_width - ui.spacing().item_spacing.x;
        ui.allocate_ui(egui::vec2(plot_width, ui.available_height()), |ui| {
            show_plot(ui, view, &mut events);
        });
        ui.vertical(|ui| {
            ui.set_width(control_width);
            show_controls(ui, view, &mut events);
        });
    });

    events
}

fn show_plot(ui: &mut egui::Ui, view: &BubbleContext<'_>, events: &mut Vec<BubbleEvent>) {
    let table = view.table;
    let radius_range = table.radius_range().unwrap_or((10.0, 50.0));
    let tree = HoverTree::build(&table.records);
    let has_selection = view.selected.is_some();

    let plot = Plot::new("quadrant_plot")
        .data_aspect(1.0)
        .include_x(-AXIS_EXTENT)
        .include_x(AXIS_EXTENT)
        .include_y(-AXIS_EXTENT)
        .include_y(AXIS_EXTENT)
        .x_axis_label(table.x_label.clone())
        .y_axis_label(table.y_label.clone())
        .show_grid(true);

    let response = plot.show(ui, |plot_ui| {
        let axis_color = view.theme.axis_color();
        plot_ui.hline(HLine::new(0.0).color(axis_color).style(LineStyle::dashed_loose()));
        plot_ui.vline(VLine::new(0.0).color(axis_color).style(LineStyle::dashed_loose()));

        for r in &table.records {
            let color = encoding::heat_color(r.radius_px, radius_range.0, radius_range.1);
            let mut opacity =
                encoding::heat_opacity(r.radius_px, radius_range.0, radius_range.1);
            let is_selected = view.selected.as_deref() == Some(r.label.as_str());
            if is_selected {
                opacity = 1.0;
            } else if has_selection {
                // Fade the rest while something is selected.
                opacity *= 0.4;
            }

            if is_selected {
                // Dark ring behind the selected bubble.
                plot_ui.points(
                    Points::new(PlotPoints::new(vec![[r.x, r.y]]))
                        .radius(r.radius_px as f32 + 3.0)
                        .color(egui::Color32::from_rgb(30, 58, 95)),
                );
            }
            let fill = color.gamma_multiply(opacity);
            plot_ui.points(
                Points::new(PlotPoints::new(vec![[r.x, r.y]]))
                    .name(r.label.clone())
                    .radius(r.radius_px as f32)
                    .color(fill),
            );
        }

        plot_ui
            .pointer_coordinate()
            .and_then(|p| tree.nearest(p.x, p.y))
            .filter(|(_, dist)| *dist <= PICK_RADIUS)
            .map(|(idx, _)| idx)
    });

    let hovered = response.inner;
    if response.response.clicked() {
        let picked = hovered.map(|idx| table.records[idx].label.clone());
        events.push(BubbleEvent::Select(picked));
    }
    if let Some(idx) = hovered {
        let record = &table.records[idx];
        response.response.on_hover_ui_at_pointer(|ui| {
            hover_tooltip(ui, view, record.label.as_str(), record.raw_row);
        });
    }
}

/// Every loaded column except the label and the internal fields, with the
/// conventional cost metric last.
fn hover_tooltip(ui: &mut egui::Ui, view: &BubbleContext<'_>, label: &str, raw_row: usize) {
    ui.label(egui::RichText::new(label).strong());
    let mut costo: Option<String> = None;
    for (idx, name) in view.raw.columns.iter().enumerate() {
        if Some(name.as_str()) == view.label_col || INTERNAL_COLUMNS.contains(&name.as_str()) {
            continue;
        }
        let cell = view.raw.cell(raw_row, idx);
        let text = match cell.trim().parse::<f64>() {
            Ok(v) => format!("{name}: {v:.2}"),
            Err(_) => format!("{name}: {cell}"),
        };
        if name == "Costo" {
            costo = Some(text);
        } else {
            ui.label(text);
        }
    }
    if let Some(text) = costo {
        ui.label(text);
    }
}

fn show_controls(ui: &mut egui::Ui, view: &BubbleContext<'_>, events: &mut Vec<BubbleEvent>) {
    let table = view.table;

    // --- Record selector ---
    let mut picked = view.selected.clone();
    egui::ComboBox::from_id_salt("record_selector")
        .selected_text(picked.clone().unwrap_or_else(|| "Select a record...".to_string()))
        .width(ui.available_width() - 8.0)
        .show_ui(ui, |ui| {
            ui.selectable_value(&mut picked, None, "Select a record...");
            for label in table.labels() {
                ui.selectable_value(&mut picked, Some(label.clone()), label);
            }
        });
    if picked != *view.selected {
        events.push(BubbleEvent::Select(picked.clone()));
    }

    ui.separator();

    // --- Metric cards, two per row ---
    let selected_row = picked
        .as_deref()
        .and_then(|label| table.record(label))
        .map(|r| r.raw_row);
    for pair in CARD_METRICS.chunks(2) {
        ui.columns(2, |cols| {
            for (col_ui, metric) in cols.iter_mut().zip(pair) {
                metric_card(col_ui, view, metric, selected_row);
            }
        });
    }

    ui.separator();
    ui.label(egui::RichText::new("Adjust Values").strong());

    let selected_record = picked.as_deref().and_then(|label| table.record(label));
    let enabled = selected_record.is_some();
    let (mut x, mut y) = selected_record.map(|r| (r.x, r.y)).unwrap_or((0.0, 0.0));

    let x_slider = ui.add_enabled(
        enabled,
        egui::Slider::new(&mut x, -AXIS_EXTENT..=AXIS_EXTENT)
            .step_by(1.0)
            .text(table.x_label.clone()),
    );
    let y_slider = ui.add_enabled(
        enabled,
        egui::Slider::new(&mut y, -AXIS_EXTENT..=AXIS_EXTENT)
            .step_by(1.0)
            .text(table.y_label.clone()),
    );
    if let Some(label) = picked.as_deref() {
        if x_slider.changed() {
            events.push(BubbleEvent::SetX(label.to_string(), x));
        }
        if y_slider.changed() {
            events.push(BubbleEvent::SetY(label.to_string(), y));
        }

        // Metric slider over the size column's observed range.
        if let Some((size_col, col_idx)) = table
            .size_col
            .as_deref()
            .and_then(|c| view.raw.column_index(c).map(|i| (c, i)))
        {
            let (values, _) = crate::data::loader::column_to_f64(view.raw.column(col_idx));
            let (min, max) = values
                .iter()
                .filter(|v| v.is_finite())
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                    (lo.min(v), hi.max(v))
                });
            if min.is_finite() && max > min {
                let current = selected_record
                    .and_then(|r| values.get(r.raw_row).copied())
                    .filter(|v| v.is_finite())
                    .unwrap_or(min);
                let mut value = current;
                let slider = ui.add(
                    egui::Slider::new(&mut value, min..=max)
                        .step_by(1.0)
                        .text(size_col),
                );
                if slider.changed() {
                    events.push(BubbleEvent::SetMetric(label.to_string(), value));
                }
            }
        }
    } else {
        ui.label(
            egui::RichText::new("Select a record to adjust its position").weak(),
        );
    }
}

fn metric_card(ui: &mut egui::Ui, view: &BubbleContext<'_>, metric: &str, row: Option<usize>) {
    let value = row
        .and_then(|row| {
            view.raw
                .column_index(metric)
                .map(|idx| view.raw.cell(row, idx))
        })
        .and_then(|cell| cell.trim().parse::<f64>().ok());
    let display = match value {
        Some(v) if metric == "Costo" => format!("{v:.0}"),
        Some(v) => format!("{v:.2}"),
        None => "--".to_string(),
    };

    egui::Frame::group(ui.style())
        .inner_margin(egui::Margin::same(8))
        .show(ui, |ui| {
            ui.vertical_centered(|ui| {
                ui.label(egui::RichText::new(metric.to_uppercase()).small().weak());
                ui.label(egui::RichText::new(display).strong().size(18.0));
            });
        });
}
