use std::collections::HashMap;

use crate::processing::transform::CanvasTransform;
use crate::state::table::{StateTable, FONT_RANGE, WIDTH_RANGE};

/// One draggable label as reported by the drawing surface.
///
/// `id` is the stable identifier assigned when the object is created and is
/// the only way an object is matched back to a record.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasObject {
    pub id: String,
    pub text: String,
    /// Center position on the surface, pixels.
    pub left: f64,
    pub top: f64,
    pub font_size: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub width: f64,
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn sane_scale(s: f64) -> f64 {
    if s.is_finite() && s > 0.0 {
        s
    } else {
        1.0
    }
}

/// Pull the surface's reported geometry back into data space.
///
/// Records without a matching object keep their stored values, as does the
/// whole table when the object list is empty. Fonts and widths absorb the
/// object's scale factors and are clamped to their valid ranges.
pub fn recover_table(
    objects: &[CanvasObject],
    transform: &CanvasTransform,
    current: &StateTable,
) -> StateTable {
    let mut next = current.clone();
    if objects.is_empty() {
        return next;
    }

    let by_id: HashMap<&str, &CanvasObject> =
        objects.iter().map(|o| (o.id.as_str(), o)).collect();

    for record in &mut next.records {
        let Some(obj) = by_id.get(record.label.as_str()) else {
            continue;
        };
        if obj.left.is_finite() && obj.top.is_finite() {
            let (x, y) = transform.invert(obj.left, obj.top);
            record.x = x;
            record.y = y;
        }
        let sx = sane_scale(obj.scale_x);
        let sy = sane_scale(obj.scale_y);
        if obj.font_size.is_finite() {
            let eff = (obj.font_size * sx.max(sy)).clamp(FONT_RANGE.0, FONT_RANGE.1);
            record.font_px = round2(eff);
        }
        if obj.width.is_finite() {
            let eff = (obj.width * sx).clamp(WIDTH_RANGE.0, WIDTH_RANGE.1);
            record.width_px = round2(eff);
        }
    }
    next
}

/// Whether the recovered table differs from the stored one beyond
/// 2-decimal rounding, compared per label in sorted order. A difference
/// forces a refresh; equality must not, or the surface echoing its own
/// state back would re-trigger forever.
pub fn needs_refresh(prev: &StateTable, next: &StateTable) -> bool {
    if prev.records.len() != next.records.len() {
        return true;
    }

    let key = |t: &StateTable| {
        let mut rows: Vec<(String, [f64; 5])> = t
            .records
            .iter()
            .map(|r| {
                (
                    r.label.clone(),
                    [
                        round2(r.x),
                        round2(r.y),
                        round2(r.font_px),
                        round2(r.width_px),
                        round2(r.radius_px),
                    ],
                )
            })
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));
        rows
    };

    key(prev) != key(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::transform::{CanvasTransform, CANVAS_H, CANVAS_PAD, CANVAS_W};
    use crate::state::table::Record;

    fn table() -> StateTable {
        let mut t = StateTable::new("X", "Y");
        for (label, x, y) in [("A", 10.0, -5.0), ("B", -20.0, 30.0)] {
            let mut r = Record::new(label, x, y);
            r.font_px = 14.0;
            r.width_px = 180.0;
            t.records.push(r);
        }
        t
    }

    fn objects_for(t: &StateTable, tr: &CanvasTransform) -> Vec<CanvasObject> {
        t.records
            .iter()
            .map(|r| {
                let (left, top) = tr.forward(r.x, r.y);
                CanvasObject {
                    id: r.label.clone(),
                    text: r.label.clone(),
                    left,
                    top,
                    font_size: r.font_px,
                    scale_x: 1.0,
                    scale_y: 1.0,
                    width: r.width_px,
                }
            })
            .collect()
    }

    #[test]
    fn unchanged_snapshot_reports_no_refresh() {
        let t = table();
        let tr = CanvasTransform::from_table(&t);
        let objects = objects_for(&t, &tr);
        let recovered = recover_table(&objects, &tr, &t);
        assert!(!needs_refresh(&t, &recovered));
        // And reconciling the recovered table again is just as stable.
        let again = recover_table(&objects, &tr, &recovered);
        assert!(!needs_refresh(&recovered, &again));
    }

    #[test]
    fn drag_moves_record_in_data_space() {
        let t = table();
        let tr = CanvasTransform::from_table(&t);
        let mut objects = objects_for(&t, &tr);
        let (left, top) = tr.forward(0.0, 0.0);
        objects[0].left = left;
        objects[0].top = top;

        let recovered = recover_table(&objects, &tr, &t);
        let a = recovered.record("A").unwrap();
        assert!(a.x.abs() < 1e-6 && a.y.abs() < 1e-6);
        assert!(needs_refresh(&t, &recovered));
    }

    #[test]
    fn scale_factors_recover_clamped_font_and_width() {
        let t = table();
        let tr = CanvasTransform::from_table(&t);
        let mut objects = objects_for(&t, &tr);
        objects[0].scale_x = 2.0;
        objects[0].scale_y = 3.0;

        let recovered = recover_table(&objects, &tr, &t);
        let a = recovered.record("A").unwrap();
        // Font takes the larger scale, width only the horizontal one.
        assert_eq!(a.font_px, 42.0);
        assert_eq!(a.width_px, 360.0);

        objects[0].scale_y = 100.0;
        let recovered = recover_table(&objects, &tr, &t);
        assert_eq!(recovered.record("A").unwrap().font_px, FONT_RANGE.1);
    }

    #[test]
    fn empty_payload_and_unmatched_ids_leave_state_untouched() {
        let t = table();
        let tr = CanvasTransform::from_table(&t);
        let recovered = recover_table(&[], &tr, &t);
        assert_eq!(recovered, t);

        let stray = vec![CanvasObject {
            id: "no such record".into(),
            text: "no such record".into(),
            left: CANVAS_W / 2.0,
            top: CANVAS_H / 2.0,
            font_size: 99.0,
            scale_x: 1.0,
            scale_y: 1.0,
            width: 99.0,
        }];
        let recovered = recover_table(&stray, &tr, &t);
        assert!(!needs_refresh(&t, &recovered));
    }

    #[test]
    fn sub_rounding_jitter_is_ignored() {
        let t = table();
        let mut jittered = t.clone();
        jittered.records[0].x += 0.001;
        jittered.records[1].width_px += 0.004;
        assert!(!needs_refresh(&t, &jittered));

        jittered.records[0].x += 0.02;
        assert!(needs_refresh(&t, &jittered));
    }

    #[test]
    fn non_finite_geometry_is_skipped() {
        let t = table();
        let tr = CanvasTransform::new(120.0, 120.0, CANVAS_W, CANVAS_H, CANVAS_PAD);
        let mut objects = objects_for(&t, &tr);
        objects[0].left = f64::NAN;
        objects[0].scale_x = f64::INFINITY;

        let recovered = recover_table(&objects, &tr, &t);
        let a = recovered.record("A").unwrap();
        assert_eq!(a.x, 10.0);
        // A broken scale falls back to 1.0 instead of exploding the width.
        assert_eq!(a.width_px, 180.0);
    }
}
