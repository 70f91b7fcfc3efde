use crate::data::loader::{column_to_f64, RawTable};
use crate::processing::encoding;
use crate::state::table::{Record, StateTable, INTERNAL_COLUMNS};

/// Fraction of parseable cells above which a column counts as numeric.
const NUMERIC_THRESHOLD: f64 = 0.5;

/// Size column picked by default when the table has one.
const DEFAULT_SIZE_COLUMN: &str = "Costo";

/// How the loaded table maps onto the canonical working table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveMode {
    /// `Label`, `X` and `Y` are all present: a table this app exported
    /// earlier. Axis selection is fixed.
    StateTable,
    /// A label column plus at least two numeric columns: the user picks
    /// which two serve as the axes.
    PickAxes,
    /// Not enough numeric columns to suggest axes: label, X and Y are all
    /// chosen by hand from every detected column.
    Manual,
}

/// Classification of a raw table: the mode plus the candidate lists the
/// sidebar selectors render from.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvePlan {
    pub mode: ResolveMode,
    /// No label column existed; labels are the stringified row index.
    pub synthesized_label: bool,
    pub label_candidates: Vec<String>,
    pub axis_candidates: Vec<String>,
    pub size_candidates: Vec<String>,
}

/// The user's column picks. Anything unset or stale falls back to the
/// plan's defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnChoices {
    pub label_col: Option<String>,
    pub x_col: Option<String>,
    pub y_col: Option<String>,
    pub size: SizeChoice,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum SizeChoice {
    /// Prefer the conventional cost column when the table has one.
    #[default]
    Auto,
    /// Fixed-size bubbles.
    Fixed,
    Column(String),
}

/// The picks actually in effect after validation against the plan.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveChoices {
    pub label_col: Option<String>,
    pub x_col: Option<String>,
    pub y_col: Option<String>,
    pub size_col: Option<String>,
}

fn is_internal(name: &str) -> bool {
    INTERNAL_COLUMNS.contains(&name)
}

/// Decide how a freshly loaded table maps onto the working table.
pub fn classify(raw: &RawTable) -> ResolvePlan {
    let mut numeric = Vec::new();
    let mut text = Vec::new();
    for (idx, name) in raw.columns.iter().enumerate() {
        let (_, frac) = column_to_f64(raw.column(idx));
        if frac >= NUMERIC_THRESHOLD {
            numeric.push(name.clone());
        } else {
            text.push(name.clone());
        }
    }

    let has_label = raw.has_column("Label");
    let has_xy = raw.has_column("X") && raw.has_column("Y");

    let axis_candidates: Vec<String> = numeric
        .iter()
        .filter(|c| !is_internal(c.as_str()))
        .cloned()
        .collect();
    let size_candidates: Vec<String> = axis_candidates
        .iter()
        .filter(|c| c.as_str() != "X" && c.as_str() != "Y")
        .cloned()
        .collect();

    if has_label && has_xy {
        return ResolvePlan {
            mode: ResolveMode::StateTable,
            synthesized_label: false,
            label_candidates: vec!["Label".to_string()],
            axis_candidates,
            size_candidates,
        };
    }

    if axis_candidates.len() >= 2 {
        return ResolvePlan {
            mode: ResolveMode::PickAxes,
            synthesized_label: !has_label,
            label_candidates: if has_label {
                vec!["Label".to_string()]
            } else {
                Vec::new()
            },
            axis_candidates,
            size_candidates,
        };
    }

    // Degraded mode: offer everything and let the user sort it out.
    ResolvePlan {
        mode: ResolveMode::Manual,
        synthesized_label: !has_label && text.is_empty(),
        label_candidates: if has_label || !text.is_empty() {
            let mut cands = text;
            if has_label && !cands.iter().any(|c| c == "Label") {
                cands.insert(0, "Label".to_string());
            }
            cands
        } else {
            Vec::new()
        },
        axis_candidates: raw.columns.clone(),
        size_candidates,
    }
}

fn pick(valid: &[String], choice: &Option<String>, default_idx: usize) -> Option<String> {
    choice
        .as_ref()
        .filter(|c| valid.contains(c))
        .cloned()
        .or_else(|| valid.get(default_idx.min(valid.len().saturating_sub(1))).cloned())
}

/// Validate the user's picks against the plan, substituting defaults for
/// anything unset or left over from a previous table.
pub fn effective_choices(plan: &ResolvePlan, choices: &ColumnChoices) -> EffectiveChoices {
    let size_col = match &choices.size {
        SizeChoice::Fixed => None,
        SizeChoice::Column(c) if plan.size_candidates.contains(c) => Some(c.clone()),
        // Stale column picks degrade to the default behavior.
        SizeChoice::Auto | SizeChoice::Column(_) => plan
            .size_candidates
            .iter()
            .find(|c| c.as_str() == DEFAULT_SIZE_COLUMN)
            .cloned(),
    };

    match plan.mode {
        ResolveMode::StateTable => EffectiveChoices {
            label_col: Some("Label".to_string()),
            x_col: Some("X".to_string()),
            y_col: Some("Y".to_string()),
            size_col,
        },
        ResolveMode::PickAxes => EffectiveChoices {
            label_col: if plan.synthesized_label {
                None
            } else {
                Some("Label".to_string())
            },
            x_col: pick(&plan.axis_candidates, &choices.x_col, 0),
            y_col: pick(&plan.axis_candidates, &choices.y_col, 1),
            size_col,
        },
        ResolveMode::Manual => EffectiveChoices {
            label_col: if plan.label_candidates.is_empty() {
                None
            } else {
                pick(&plan.label_candidates, &choices.label_col, 0)
            },
            x_col: pick(&plan.axis_candidates, &choices.x_col, 0),
            y_col: pick(&plan.axis_candidates, &choices.y_col, 1),
            size_col,
        },
    }
}

/// Materialize the canonical working table from the raw one.
///
/// Rows with a non-finite X or Y are dropped, as are rows repeating a
/// label already seen (the label is the record key). Visual fields come
/// from the table when it carries them and from the defaults otherwise;
/// a chosen size column re-derives every radius.
pub fn resolve(raw: &RawTable, plan: &ResolvePlan, choices: &ColumnChoices) -> StateTable {
    let eff = effective_choices(plan, choices);

    let x_label = eff.x_col.clone().unwrap_or_else(|| "X".to_string());
    let y_label = eff.y_col.clone().unwrap_or_else(|| "Y".to_string());
    let mut table = StateTable::new(x_label, y_label);
    table.size_col = eff.size_col.clone();

    let Some(x_idx) = eff.x_col.as_deref().and_then(|c| raw.column_index(c)) else {
        return table;
    };
    let Some(y_idx) = eff.y_col.as_deref().and_then(|c| raw.column_index(c)) else {
        return table;
    };

    let label_idx = eff.label_col.as_deref().and_then(|c| raw.column_index(c));
    let (xs, _) = column_to_f64(raw.column(x_idx));
    let (ys, _) = column_to_f64(raw.column(y_idx));

    let parse_optional = |name: &str| -> Option<Vec<f64>> {
        raw.column_index(name).map(|i| column_to_f64(raw.column(i)).0)
    };
    let font_col = parse_optional("Font_px");
    let width_col = parse_optional("Width_px");
    let radius_col = parse_optional("Radius_px");
    let size_values = eff
        .size_col
        .as_deref()
        .and_then(|c| raw.column_index(c))
        .map(|i| column_to_f64(raw.column(i)).0);

    let mut seen = std::collections::HashSet::new();
    for row in 0..raw.row_count {
        let (x, y) = (xs[row], ys[row]);
        if !x.is_finite() || !y.is_finite() {
            continue;
        }
        let label = match label_idx {
            Some(i) => raw.cell(row, i).to_string(),
            None => row.to_string(),
        };
        if !seen.insert(label.clone()) {
            continue;
        }

        let mut record = Record::new(label, x, y);
        record.raw_row = row;

        if let Some(f) = font_col.as_ref().map(|c| c[row]).filter(|f| f.is_finite()) {
            record.font_px = f;
        }
        if let Some(w) = width_col.as_ref().map(|c| c[row]).filter(|w| w.is_finite()) {
            record.width_px = w;
        }
        // Radius fallback chain for tables without a size column: an
        // explicit Radius_px, then the legacy Font_px, then the default.
        if let Some(r) = radius_col.as_ref().map(|c| c[row]).filter(|r| r.is_finite()) {
            record.radius_px = r;
        } else if let Some(f) = font_col.as_ref().map(|c| c[row]).filter(|f| f.is_finite()) {
            record.radius_px = f;
        }

        table.records.push(record);
    }

    if let Some(values) = size_values {
        encoding::apply_size_encoding(&mut table.records, &values);
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::parse_csv_bytes;

    fn raw(csv: &str) -> RawTable {
        parse_csv_bytes(csv.as_bytes()).expect("test csv parses")
    }

    #[test]
    fn exported_state_table_is_recognized() {
        let raw = raw("Label,X,Y,Costo\nA,10,-5,50\nB,-20,30,150\n");
        let plan = classify(&raw);
        assert_eq!(plan.mode, ResolveMode::StateTable);
        assert_eq!(plan.size_candidates, vec!["Costo"]);

        let table = resolve(&raw, &plan, &ColumnChoices::default());
        assert_eq!(table.x_label, "X");
        assert_eq!(table.y_label, "Y");
        assert_eq!(table.size_col.as_deref(), Some("Costo"));
        // Min and max of the size column hit the radius endpoints.
        assert_eq!(table.record("A").unwrap().radius_px, 10.0);
        assert_eq!(table.record("B").unwrap().radius_px, 50.0);
    }

    #[test]
    fn label_with_numeric_columns_offers_axis_picks() {
        let raw = raw("Label,Impacto,Esfuerzo,Costo\nA,1,2,3\nB,4,5,6\n");
        let plan = classify(&raw);
        assert_eq!(plan.mode, ResolveMode::PickAxes);
        assert_eq!(plan.axis_candidates, vec!["Impacto", "Esfuerzo", "Costo"]);

        // Defaults: first two candidates, Costo as the size column.
        let table = resolve(&raw, &plan, &ColumnChoices::default());
        assert_eq!(table.x_label, "Impacto");
        assert_eq!(table.y_label, "Esfuerzo");
        assert_eq!(table.size_col.as_deref(), Some("Costo"));
        assert_eq!(table.record("A").unwrap().x, 1.0);

        // Explicit picks override the defaults.
        let choices = ColumnChoices {
            x_col: Some("Costo".to_string()),
            y_col: Some("Impacto".to_string()),
            size: SizeChoice::Fixed,
            ..Default::default()
        };
        let table = resolve(&raw, &plan, &choices);
        assert_eq!(table.x_label, "Costo");
        assert_eq!(table.record("B").unwrap().x, 6.0);
        assert_eq!(table.size_col, None);
    }

    #[test]
    fn too_few_numeric_columns_degrades_to_manual() {
        let raw = raw("Label,Notes,Score\nA,good,1\nB,bad,2\n");
        let plan = classify(&raw);
        assert_eq!(plan.mode, ResolveMode::Manual);
        // Every detected column is on offer in manual mode.
        assert_eq!(plan.axis_candidates, vec!["Label", "Notes", "Score"]);
        assert!(plan.label_candidates.contains(&"Label".to_string()));
    }

    #[test]
    fn missing_label_column_synthesizes_row_indices() {
        let raw = raw("Ability,Vision\n10,20\n30,40\n");
        let plan = classify(&raw);
        assert_eq!(plan.mode, ResolveMode::PickAxes);
        assert!(plan.synthesized_label);

        let table = resolve(&raw, &plan, &ColumnChoices::default());
        assert_eq!(table.labels(), vec!["0", "1"]);
        assert_eq!(table.record("1").unwrap().y, 40.0);
    }

    #[test]
    fn internal_columns_are_not_axis_or_size_candidates() {
        let raw = raw("Label,X,Y,Radius_px,Font_px,Width_px,Costo\nA,1,2,9,14,100,5\n");
        let plan = classify(&raw);
        assert_eq!(plan.axis_candidates, vec!["X", "Y", "Costo"]);
        assert_eq!(plan.size_candidates, vec!["Costo"]);
    }

    #[test]
    fn rows_without_finite_axes_are_dropped() {
        let raw = raw("Label,X,Y\nA,1,2\nB,oops,3\nC,4,\n");
        let plan = classify(&raw);
        let table = resolve(&raw, &plan, &ColumnChoices::default());
        assert_eq!(table.labels(), vec!["A"]);
    }

    #[test]
    fn duplicate_labels_keep_the_first_row() {
        let raw = raw("Label,X,Y\nA,1,2\nA,3,4\n");
        let plan = classify(&raw);
        let table = resolve(&raw, &plan, &ColumnChoices::default());
        assert_eq!(table.records.len(), 1);
        assert_eq!(table.record("A").unwrap().x, 1.0);
    }

    #[test]
    fn legacy_font_column_seeds_the_radius() {
        let raw = raw("Label,X,Y,Font_px\nA,1,2,36\n");
        let plan = classify(&raw);
        let table = resolve(&raw, &plan, &ColumnChoices::default());
        let a = table.record("A").unwrap();
        assert_eq!(a.font_px, 36.0);
        assert_eq!(a.radius_px, 36.0);
    }

    #[test]
    fn stale_choices_fall_back_to_defaults() {
        let raw = raw("Label,Impacto,Esfuerzo\nA,1,2\n");
        let plan = classify(&raw);
        let choices = ColumnChoices {
            x_col: Some("OldColumn".to_string()),
            size: SizeChoice::Column("Gone".to_string()),
            ..Default::default()
        };
        let eff = effective_choices(&plan, &choices);
        assert_eq!(eff.x_col.as_deref(), Some("Impacto"));
        assert_eq!(eff.size_col, None);
    }
}
