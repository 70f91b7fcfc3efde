use egui::Color32;

use crate::state::table::Record;

/// Heat ramp for the bubble fill, low to high.
pub const HEAT_PALETTE: [[u8; 3]; 15] = [
    [255, 255, 153],
    [255, 255, 102],
    [255, 255, 51],
    [255, 255, 0],
    [255, 238, 0],
    [255, 221, 0],
    [255, 204, 0],
    [255, 170, 0],
    [255, 136, 0],
    [255, 102, 0],
    [255, 68, 0],
    [255, 34, 0],
    [255, 0, 0],
    [221, 0, 0],
    [187, 0, 0],
];

/// Categorical palette for canvas label text, indexed by record position.
pub const LABEL_PALETTE: [[u8; 3]; 20] = [
    [31, 119, 180],
    [255, 127, 14],
    [44, 160, 44],
    [214, 39, 40],
    [148, 103, 189],
    [140, 86, 75],
    [227, 119, 194],
    [127, 127, 127],
    [188, 189, 34],
    [23, 190, 207],
    [78, 121, 167],
    [242, 142, 43],
    [89, 161, 79],
    [225, 87, 89],
    [118, 183, 178],
    [237, 201, 72],
    [176, 122, 161],
    [255, 157, 166],
    [156, 117, 95],
    [186, 176, 171],
];

/// Mapped radius range for a size-encoded column, pixels.
pub const RADIUS_MIN_PX: f64 = 10.0;
pub const RADIUS_SPAN_PX: f64 = 40.0;
/// Radius substituted when every value of the size column is equal.
pub const RADIUS_DEGENERATE_PX: f64 = 25.0;

const OPACITY_LOW: f32 = 0.5;
const OPACITY_HIGH: f32 = 0.95;
const OPACITY_DEGENERATE: f32 = 0.75;

fn normalized(value: f64, min: f64, max: f64) -> f64 {
    ((value - min) / (max - min)).clamp(0.0, 1.0)
}

/// Map a size-column value into [RADIUS_MIN_PX, RADIUS_MIN_PX + RADIUS_SPAN_PX].
pub fn radius_for(value: f64, min: f64, max: f64) -> f64 {
    if max > min {
        RADIUS_MIN_PX + normalized(value, min, max) * RADIUS_SPAN_PX
    } else {
        RADIUS_DEGENERATE_PX
    }
}

/// Pick the heat-ramp stop for a value: normalize against the observed
/// range, then bucket by rounding into the palette. The middle stop when
/// the range is degenerate.
pub fn heat_color(value: f64, min: f64, max: f64) -> Color32 {
    let n = HEAT_PALETTE.len();
    let idx = if max > min {
        let t = normalized(value, min, max);
        ((t * (n - 1) as f64).round() as usize).min(n - 1)
    } else {
        n / 2
    };
    let [r, g, b] = HEAT_PALETTE[idx];
    Color32::from_rgb(r, g, b)
}

/// Opacity ramp paired with the heat color: low values fade, high values
/// are nearly solid.
pub fn heat_opacity(value: f64, min: f64, max: f64) -> f32 {
    if max > min {
        OPACITY_LOW + normalized(value, min, max) as f32 * (OPACITY_HIGH - OPACITY_LOW)
    } else {
        OPACITY_DEGENERATE
    }
}

pub fn label_color(index: usize) -> Color32 {
    let [r, g, b] = LABEL_PALETTE[index % LABEL_PALETTE.len()];
    Color32::from_rgb(r, g, b)
}

/// Re-derive `size_value` and `radius_px` on every record from a raw-table
/// column, given column values indexed by raw row (NaN where unparseable).
pub fn apply_size_encoding(records: &mut [Record], values_by_row: &[f64]) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for r in records.iter() {
        if let Some(&v) = values_by_row.get(r.raw_row) {
            if v.is_finite() {
                min = min.min(v);
                max = max.max(v);
            }
        }
    }
    if !min.is_finite() || !max.is_finite() {
        return;
    }
    for r in records.iter_mut() {
        let v = values_by_row.get(r.raw_row).copied().unwrap_or(f64::NAN);
        if v.is_finite() {
            r.size_value = Some(v);
            r.radius_px = radius_for(v, min, max);
        } else {
            r.size_value = None;
            r.radius_px = crate::state::table::DEFAULT_RADIUS_PX;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radius_spans_fixed_range_and_is_monotonic() {
        assert_eq!(radius_for(50.0, 50.0, 150.0), 10.0);
        assert_eq!(radius_for(150.0, 50.0, 150.0), 50.0);
        let mid = radius_for(100.0, 50.0, 150.0);
        assert!(mid > 10.0 && mid < 50.0);
        assert!(radius_for(120.0, 50.0, 150.0) > mid);
    }

    #[test]
    fn degenerate_range_gets_fixed_radius() {
        assert_eq!(radius_for(7.0, 7.0, 7.0), RADIUS_DEGENERATE_PX);
    }

    #[test]
    fn heat_color_buckets_by_rounding() {
        let n = HEAT_PALETTE.len();
        let lo = heat_color(0.0, 0.0, 1.0);
        let hi = heat_color(1.0, 0.0, 1.0);
        assert_eq!(lo, Color32::from_rgb(255, 255, 153));
        assert_eq!(hi, Color32::from_rgb(187, 0, 0));
        // Just below a bucket midpoint rounds down, just above rounds up.
        let step = 1.0 / (n - 1) as f64;
        let below = heat_color(0.49 * step, 0.0, 1.0);
        let above = heat_color(0.51 * step, 0.0, 1.0);
        assert_eq!(below, lo);
        assert_ne!(above, lo);
    }

    #[test]
    fn degenerate_range_gets_middle_stop() {
        let [r, g, b] = HEAT_PALETTE[HEAT_PALETTE.len() / 2];
        assert_eq!(heat_color(3.0, 3.0, 3.0), Color32::from_rgb(r, g, b));
        assert_eq!(heat_opacity(3.0, 3.0, 3.0), 0.75);
    }

    #[test]
    fn opacity_ramps_between_half_and_near_solid() {
        assert_eq!(heat_opacity(0.0, 0.0, 10.0), 0.5);
        assert_eq!(heat_opacity(10.0, 0.0, 10.0), 0.95);
        let mid = heat_opacity(5.0, 0.0, 10.0);
        assert!(mid > 0.5 && mid < 0.95);
    }

    #[test]
    fn size_encoding_updates_records_in_place() {
        let mut records = vec![
            {
                let mut r = Record::new("A", 0.0, 0.0);
                r.raw_row = 0;
                r
            },
            {
                let mut r = Record::new("B", 0.0, 0.0);
                r.raw_row = 1;
                r
            },
        ];
        apply_size_encoding(&mut records, &[50.0, 150.0]);
        assert_eq!(records[0].radius_px, 10.0);
        assert_eq!(records[1].radius_px, 50.0);
        assert_eq!(records[0].size_value, Some(50.0));
    }
}
