/// Valid range for the bubble radius, pixels.
pub const RADIUS_RANGE: (f64, f64) = (5.0, 200.0);
/// Valid range for the canvas label font size, pixels.
pub const FONT_RANGE: (f64, f64) = (6.0, 400.0);
/// Valid range for the canvas label box width, pixels.
pub const WIDTH_RANGE: (f64, f64) = (40.0, 2000.0);

pub const DEFAULT_RADIUS_PX: f64 = 20.0;
pub const DEFAULT_FONT_PX: f64 = 14.0;
pub const DEFAULT_WIDTH_PX: f64 = 180.0;

/// Column names the app writes itself; never offered as axis or size fields.
pub const INTERNAL_COLUMNS: [&str; 3] = ["Radius_px", "Font_px", "Width_px"];

/// One labeled item on the quadrant.
///
/// `label` is the unique key for the lifetime of a loaded source. `raw_row`
/// points back at the row of the loaded table this record came from, for
/// metric lookups and export of untouched columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub label: String,
    pub x: f64,
    pub y: f64,
    /// Value of the chosen size-encoding column, if any.
    pub size_value: Option<f64>,
    pub radius_px: f64,
    pub font_px: f64,
    pub width_px: f64,
    pub raw_row: usize,
}

impl Record {
    pub fn new(label: impl Into<String>, x: f64, y: f64) -> Self {
        let label = label.into();
        let width_px = default_width_for(&label);
        Self {
            label,
            x,
            y,
            size_value: None,
            radius_px: DEFAULT_RADIUS_PX,
            font_px: DEFAULT_FONT_PX,
            width_px,
            raw_row: 0,
        }
    }

    /// Force every derived visual field into its valid range, substituting
    /// the defaults for non-finite values.
    pub fn clamp_visuals(&mut self) {
        self.radius_px = clamp_or(self.radius_px, RADIUS_RANGE, DEFAULT_RADIUS_PX);
        self.font_px = clamp_or(self.font_px, FONT_RANGE, DEFAULT_FONT_PX);
        self.width_px = clamp_or(self.width_px, WIDTH_RANGE, DEFAULT_WIDTH_PX);
    }
}

fn clamp_or(v: f64, (lo, hi): (f64, f64), fallback: f64) -> f64 {
    if v.is_finite() {
        v.clamp(lo, hi)
    } else {
        fallback
    }
}

/// Starting width of a label box, scaled by the label length.
pub fn default_width_for(label: &str) -> f64 {
    let chars = label.chars().count().max(6) as f64;
    (0.6 * DEFAULT_FONT_PX * chars + 16.0).clamp(80.0, 400.0)
}

/// The canonical working table: the resolved records plus the display names
/// of the axis columns and the chosen size-encoding column.
#[derive(Debug, Clone, PartialEq)]
pub struct StateTable {
    pub records: Vec<Record>,
    pub x_label: String,
    pub y_label: String,
    pub size_col: Option<String>,
}

impl StateTable {
    pub fn new(x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        Self {
            records: Vec::new(),
            x_label: x_label.into(),
            y_label: y_label.into(),
            size_col: None,
        }
    }

    pub fn record(&self, label: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.label == label)
    }

    pub fn record_mut(&mut self, label: &str) -> Option<&mut Record> {
        self.records.iter_mut().find(|r| r.label == label)
    }

    pub fn labels(&self) -> Vec<String> {
        self.records.iter().map(|r| r.label.clone()).collect()
    }

    /// Smallest symmetric half-range covering the values of one axis.
    /// Falls back to 1.0 for an empty or all-zero table.
    pub fn half_range(values: impl Iterator<Item = f64>) -> f64 {
        let m = values
            .filter(|v| v.is_finite())
            .fold(0.0_f64, |m, v| m.max(v.abs()));
        if m > 0.0 {
            m
        } else {
            1.0
        }
    }

    pub fn x_half_range(&self) -> f64 {
        Self::half_range(self.records.iter().map(|r| r.x))
    }

    pub fn y_half_range(&self) -> f64 {
        Self::half_range(self.records.iter().map(|r| r.y))
    }

    /// Observed min/max of the radius field, used to drive the heat ramp.
    pub fn radius_range(&self) -> Option<(f64, f64)> {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for r in &self.records {
            if r.radius_px.is_finite() {
                min = min.min(r.radius_px);
                max = max.max(r.radius_px);
            }
        }
        if min.is_finite() && max.is_finite() {
            Some((min, max))
        } else {
            None
        }
    }
}
