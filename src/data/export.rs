use crate::data::loader::RawTable;
use crate::state::table::{Record, StateTable};

fn fmt(v: f64) -> String {
    v.to_string()
}

fn internal_value(record: &Record, name: &str) -> Option<String> {
    match name {
        "Radius_px" => Some(fmt(record.radius_px)),
        "Font_px" => Some(fmt(record.font_px)),
        "Width_px" => Some(fmt(record.width_px)),
        _ => None,
    }
}

/// Fixed-order serialization of the working table, used as the fingerprint
/// input. Same table in, identical bytes out.
pub fn canonical_csv(table: &StateTable) -> Vec<u8> {
    let mut w = csv::Writer::from_writer(Vec::new());

    let mut header = vec!["Label", table.x_label.as_str(), table.y_label.as_str()];
    if let Some(size_col) = &table.size_col {
        header.push(size_col.as_str());
    }
    header.extend(["Radius_px", "Font_px", "Width_px"]);
    let _ = w.write_record(&header);

    for r in &table.records {
        let mut row = vec![r.label.clone(), fmt(r.x), fmt(r.y)];
        if table.size_col.is_some() {
            row.push(r.size_value.map(fmt).unwrap_or_default());
        }
        row.extend([fmt(r.radius_px), fmt(r.font_px), fmt(r.width_px)]);
        let _ = w.write_record(&row);
    }

    w.into_inner().unwrap_or_default()
}

/// Serialize the current layout for download: the label column first, the
/// axis columns under their display names with current values, every
/// remaining loaded column in its original order, and the derived visual
/// fields last. Internal fields always carry the working values, whatever
/// the loaded table said.
pub fn export_csv(table: &StateTable, raw: &RawTable, label_col: Option<&str>) -> Vec<u8> {
    let skip = |name: &str| {
        Some(name) == label_col || name == table.x_label || name == table.y_label
    };
    let remaining: Vec<(String, usize)> = raw
        .columns
        .iter()
        .enumerate()
        .filter(|(_, name)| !skip(name))
        .map(|(idx, name)| (name.clone(), idx))
        .collect();
    let trailing: Vec<&str> = ["Radius_px", "Font_px", "Width_px"]
        .into_iter()
        .filter(|name| !raw.has_column(name))
        .collect();

    let mut w = csv::Writer::from_writer(Vec::new());

    let mut header = vec!["Label", table.x_label.as_str(), table.y_label.as_str()];
    header.extend(remaining.iter().map(|(name, _)| name.as_str()));
    header.extend(trailing.iter().copied());
    let _ = w.write_record(&header);

    for r in &table.records {
        let mut row = vec![r.label.clone(), fmt(r.x), fmt(r.y)];
        for (name, idx) in &remaining {
            let value = internal_value(r, name)
                .unwrap_or_else(|| raw.cell(r.raw_row, *idx).to_string());
            row.push(value);
        }
        for name in &trailing {
            row.push(internal_value(r, name).unwrap_or_default());
        }
        let _ = w.write_record(&row);
    }

    w.into_inner().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::parse_csv_bytes;
    use crate::data::resolve::{classify, resolve, ColumnChoices};
    use pretty_assertions::assert_eq;

    fn exported_lines(bytes: &[u8]) -> Vec<String> {
        String::from_utf8(bytes.to_vec())
            .expect("export is UTF-8")
            .lines()
            .map(|l| l.to_string())
            .collect()
    }

    #[test]
    fn state_export_restores_label_axes_then_remaining_columns() {
        let raw = parse_csv_bytes(b"Label,X,Y,Costo\nA,10,-5,50\nB,-20,30,150\n").unwrap();
        let plan = classify(&raw);
        let table = resolve(&raw, &plan, &ColumnChoices::default());

        let lines = exported_lines(&export_csv(&table, &raw, Some("Label")));
        assert_eq!(
            lines[0],
            "Label,X,Y,Costo,Radius_px,Font_px,Width_px"
        );
        assert!(lines[1].starts_with("A,10,-5,50,10,"));
        assert!(lines[2].starts_with("B,-20,30,150,50,"));
    }

    #[test]
    fn axis_columns_use_display_names_and_edited_values() {
        let raw = parse_csv_bytes(b"Label,Impacto,Esfuerzo,Costo\nA,1,2,3\n").unwrap();
        let plan = classify(&raw);
        let mut table = resolve(&raw, &plan, &ColumnChoices::default());
        table.record_mut("A").unwrap().x = 7.5;

        let lines = exported_lines(&export_csv(&table, &raw, Some("Label")));
        assert_eq!(lines[0], "Label,Impacto,Esfuerzo,Costo,Radius_px,Font_px,Width_px");
        assert!(lines[1].starts_with("A,7.5,2,3,"));
    }

    #[test]
    fn internal_columns_present_in_source_carry_working_values() {
        let raw = parse_csv_bytes(b"Label,X,Y,Font_px,Width_px\nA,1,2,14,180\n").unwrap();
        let plan = classify(&raw);
        let mut table = resolve(&raw, &plan, &ColumnChoices::default());
        table.record_mut("A").unwrap().font_px = 28.0;

        let lines = exported_lines(&export_csv(&table, &raw, Some("Label")));
        // Font_px and Width_px keep their original positions but show the
        // working values; only Radius_px is appended.
        assert_eq!(lines[0], "Label,X,Y,Font_px,Width_px,Radius_px");
        assert_eq!(lines[1], "A,1,2,28,180,14");
    }

    #[test]
    fn serialization_is_byte_stable() {
        let raw = parse_csv_bytes(b"Label,X,Y,Costo\nA,10,-5,50\nB,-20,30,150\n").unwrap();
        let plan = classify(&raw);
        let table = resolve(&raw, &plan, &ColumnChoices::default());

        assert_eq!(canonical_csv(&table), canonical_csv(&table));
        assert_eq!(
            export_csv(&table, &raw, Some("Label")),
            export_csv(&table, &raw, Some("Label"))
        );
    }

    #[test]
    fn canonical_csv_reflects_axis_names_and_size_column() {
        let raw = parse_csv_bytes(b"Label,Impacto,Esfuerzo\nA,1,2\n").unwrap();
        let plan = classify(&raw);
        let table = resolve(&raw, &plan, &ColumnChoices::default());
        let lines = exported_lines(&canonical_csv(&table));
        assert_eq!(lines[0], "Label,Impacto,Esfuerzo,Radius_px,Font_px,Width_px");
    }
}
