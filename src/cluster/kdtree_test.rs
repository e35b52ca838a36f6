#[cfg(test)]
mod tests {
    use crate::cluster::{Point, PointList, new_kd_tree};
    use quickcheck::quickcheck;

    /// Simple O(N) way to find points in neighbourhood
    fn region_query(points: &PointList, p: &Point, r: f64) -> Vec<usize> {
        let mut result = Vec::new();
        for (i, point) in points.iter().enumerate() {
            if point.sq_dist(p) <= r * r {
                result.push(i);
            }
        }
        result
    }

    /// Simple O(N) way to find points in a rectangle
    fn rect_query(points: &PointList, min: &Point, max: &Point) -> Vec<usize> {
        let mut result = Vec::new();
        for (i, point) in points.iter().enumerate() {
            if point.inside(min, max) {
                result.push(i);
            }
        }
        result
    }

    fn sample_points() -> PointList {
        vec![
            Point([0.58401, 0.30112]),
            Point([0.58400, 0.30111]),
            Point([0.58399, 0.30140]),
            Point([0.58440, 0.30090]),
            Point([0.58900, 0.29800]),
            Point([0.58400, 0.30111]),
            Point([0.10000, 0.90000]),
        ]
    }

    /// Maps arbitrary integers onto a small grid so duplicates and ties are common
    fn grid_points(raw: &[(u8, u8)]) -> PointList {
        raw.iter()
            .map(|&(x, y)| Point([f64::from(x % 16) / 16.0, f64::from(y % 16) / 16.0]))
            .collect()
    }

    #[test]
    fn test_range_query_kdtree() {
        // Verify that KD-Tree & RangeQuery give the same results
        let points = sample_points();
        let tree = new_kd_tree(points.clone());
        let r = 0.0003;

        for pt in &points {
            let mut pts1 = tree.in_range(pt, r, Vec::new());
            let mut pts2 = region_query(&points, pt, r);
            pts1.sort();
            pts2.sort();
            assert_eq!(pts1, pts2);
        }
    }

    #[test]
    fn test_duplicates_are_returned() {
        let points = sample_points();
        let tree = new_kd_tree(points.clone());

        let mut found = tree.in_range(&points[1], 0.0, Vec::new());
        found.sort();
        assert_eq!(found, vec![1, 5]);
    }

    #[test]
    fn test_rectangle_borders_are_inclusive() {
        let points = vec![Point([0.0, 0.0]), Point([1.0, 1.0]), Point([0.5, 0.5])];
        let tree = new_kd_tree(points);

        let mut found = tree.range(&Point([0.0, 0.0]), &Point([1.0, 1.0]), Vec::new());
        found.sort();
        assert_eq!(found, vec![0, 1, 2]);

        let found = tree.range(&Point([0.6, 0.0]), &Point([1.0, 0.9]), Vec::new());
        assert!(found.is_empty());
    }

    #[test]
    fn test_nan_points_are_not_indexed() {
        let points = vec![
            Point([0.5, 0.5]),
            Point([f64::NAN, 0.5]),
            Point([0.25, f64::NAN]),
            Point([0.75, 0.75]),
        ];
        let tree = new_kd_tree(points);

        let mut found = tree.range(&Point([0.0, 0.0]), &Point([1.0, 1.0]), Vec::new());
        found.sort();
        assert_eq!(found, vec![0, 3]);
        assert_eq!(tree.in_range(&Point([0.5, 0.5]), 1.0, Vec::new()).len(), 2);
    }

    #[test]
    fn test_empty_tree() {
        let tree = new_kd_tree(Vec::new());
        assert_eq!(tree.height(), 0);
        assert!(tree.range(&Point([0.0, 0.0]), &Point([1.0, 1.0]), Vec::new()).is_empty());
        assert!(tree.in_range(&Point([0.5, 0.5]), 1.0, Vec::new()).is_empty());
    }

    #[test]
    fn test_tree_is_balanced() {
        let points: PointList = (0..1024_i32)
            .map(|i| Point([f64::from(i % 32) / 32.0, f64::from(i / 32) / 32.0]))
            .collect();
        let tree = new_kd_tree(points);
        // 1024 distinct points, a balanced tree is about 11 levels deep
        assert!(tree.height() <= 16, "height {}", tree.height());
    }

    #[test]
    fn test_buffer_is_reused() {
        let points = sample_points();
        let tree = new_kd_tree(points.clone());
        let buf = Vec::with_capacity(16);
        let buf = tree.in_range(&points[6], 0.001, buf);
        assert_eq!(buf, vec![6]);
    }

    quickcheck! {
        fn prop_in_range_matches_brute_force(raw: Vec<(u8, u8)>, center: (u8, u8), r: u8) -> bool {
            let points = grid_points(&raw);
            let tree = new_kd_tree(points.clone());
            let pt = grid_points(&[center])[0];
            let r = f64::from(r % 8) / 16.0;

            let mut pts1 = tree.in_range(&pt, r, Vec::new());
            let mut pts2 = region_query(&points, &pt, r);
            pts1.sort();
            pts2.sort();
            pts1 == pts2
        }

        fn prop_range_matches_brute_force(raw: Vec<(u8, u8)>, a: (u8, u8), b: (u8, u8)) -> bool {
            let points = grid_points(&raw);
            let tree = new_kd_tree(points.clone());
            let corners = grid_points(&[a, b]);
            let (p, q) = (corners[0].0, corners[1].0);
            let min = Point([p[0].min(q[0]), p[1].min(q[1])]);
            let max = Point([p[0].max(q[0]), p[1].max(q[1])]);

            let mut pts1 = tree.range(&min, &max, Vec::new());
            let mut pts2 = rect_query(&points, &min, &max);
            pts1.sort();
            pts2.sort();
            pts1 == pts2
        }
    }
}
