use egui_extras::{Column, TableBuilder};

use crate::state::table::StateTable;

/// Read-only table of the working records.
pub fn show_table_view(ui: &mut egui::Ui, table: &StateTable) {
    let has_size = table.size_col.is_some();
    let mut headers = vec![
        "Label".to_string(),
        table.x_label.clone(),
        table.y_label.clone(),
    ];
    if let Some(size_col) = &table.size_col {
        headers.push(size_col.clone());
    }
    headers.extend(["Radius px", "Font px", "Width px"].map(String::from));

    let mut builder = TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(120.0));
    for _ in 1..headers.len() {
        builder = builder.column(Column::remainder().at_least(60.0));
    }

    builder
        .header(22.0, |mut header| {
            for title in &headers {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|body| {
            body.rows(20.0, table.records.len(), |mut row| {
                let r = &table.records[row.index()];
                row.col(|ui| {
                    ui.label(&r.label);
                });
                let mut values = vec![r.x, r.y];
                if has_size {
                    values.push(r.size_value.unwrap_or(f64::NAN));
                }
                values.extend([r.radius_px, r.font_px, r.width_px]);
                for v in values {
                    row.col(|ui| {
                        if v.is_finite() {
                            ui.label(format!("{v:.2}"));
                        } else {
                            ui.label("--");
                        }
                    });
                }
            });
        });
}
