use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::data::loader::RawTable;

const SAMPLE_SEED: u64 = 7;
const VENDOR_COUNT: usize = 14;

/// The built-in fallback dataset: fourteen vendors scored on two axes.
/// Seeded, so every call produces the identical table.
pub fn sample_table() -> RawTable {
    let mut rng = StdRng::seed_from_u64(SAMPLE_SEED);

    let labels: Vec<String> = ('A'..)
        .take(VENDOR_COUNT)
        .map(|c| format!("Vendor {c}"))
        .collect();
    let ability: Vec<String> = (0..VENDOR_COUNT)
        .map(|_| rng.gen_range(20.0..100.0f64).to_string())
        .collect();
    let vision: Vec<String> = (0..VENDOR_COUNT)
        .map(|_| rng.gen_range(20.0..100.0f64).to_string())
        .collect();

    RawTable {
        columns: vec![
            "Label".to_string(),
            "Ability_to_Execute".to_string(),
            "Completeness_of_Vision".to_string(),
        ],
        column_data: vec![labels, ability, vision],
        row_count: VENDOR_COUNT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::column_to_f64;
    use pretty_assertions::assert_eq;

    #[test]
    fn sample_is_reproducible() {
        assert_eq!(sample_table(), sample_table());
    }

    #[test]
    fn sample_has_fourteen_vendors_in_range() {
        let table = sample_table();
        assert_eq!(table.row_count, 14);
        assert_eq!(table.column(0)[0], "Vendor A");
        assert_eq!(table.column(0)[13], "Vendor N");

        for col in [1, 2] {
            let (values, frac) = column_to_f64(table.column(col));
            assert_eq!(frac, 1.0);
            assert!(values.iter().all(|v| (20.0..100.0).contains(v)));
        }
    }
}
