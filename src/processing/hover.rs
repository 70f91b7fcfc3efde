use kiddo::KdTree;
use kiddo::SquaredEuclidean;

use crate::state::table::Record;

/// KD-tree over record positions for nearest-bubble hover and click lookup.
pub struct HoverTree {
    tree: KdTree<f64, 2>,
    populated: bool,
}

impl HoverTree {
    /// Build from the working records; non-finite positions are skipped.
    pub fn build(records: &[Record]) -> Self {
        let mut tree: KdTree<f64, 2> = KdTree::new();
        for (i, r) in records.iter().enumerate() {
            if r.x.is_finite() && r.y.is_finite() {
                tree.add(&[r.x, r.y], i as u64);
            }
        }
        let populated = tree.size() > 0;
        if !populated {
            // Dummy entry so queries never panic on an empty tree.
            tree.add(&[0.0, 0.0], 0);
        }
        Self { tree, populated }
    }

    /// Nearest record index to a data-space point, with its Euclidean
    /// distance. None when no record had a usable position.
    pub fn nearest(&self, x: f64, y: f64) -> Option<(usize, f64)> {
        if !self.populated {
            return None;
        }
        let found = self.tree.nearest_one::<SquaredEuclidean>(&[x, y]);
        Some((found.item as usize, found.distance.sqrt()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_closest_record() {
        let records = vec![
            Record::new("A", 10.0, -5.0),
            Record::new("B", -20.0, 30.0),
        ];
        let tree = HoverTree::build(&records);
        let (idx, dist) = tree.nearest(-19.0, 29.0).unwrap();
        assert_eq!(idx, 1);
        assert!(dist < 2.0);
    }

    #[test]
    fn empty_and_nan_tables_return_none() {
        assert!(HoverTree::build(&[]).nearest(0.0, 0.0).is_none());
        let records = vec![Record::new("A", f64::NAN, 0.0)];
        assert!(HoverTree::build(&records).nearest(0.0, 0.0).is_none());
    }
}
