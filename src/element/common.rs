use egui::{Pos2, Rect};

/// Extra slack around thin geometry so it stays pickable
pub const HIT_TOLERANCE: f32 = 3.0;

/// Calculate distance from a point to a line segment (useful for stroke hit testing)
pub(crate) fn distance_to_line_segment(point: Pos2, line_start: Pos2, line_end: Pos2) -> f32 {
    let line_vec = line_end - line_start;
    let point_vec = point - line_start;

    let len_sq = line_vec.length_sq();
    if len_sq == 0.0 {
        return point_vec.length();
    }

    let t = ((point_vec.x * line_vec.x + point_vec.y * line_vec.y) / len_sq).clamp(0.0, 1.0);
    let projection = line_start + line_vec * t;
    (point - projection).length()
}

/// Calculate the bounding box for a set of points
pub(crate) fn calculate_bounds(points: impl IntoIterator<Item = Pos2>, padding: f32) -> Rect {
    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;
    let mut any = false;

    for point in points {
        any = true;
        min_x = min_x.min(point.x);
        min_y = min_y.min(point.y);
        max_x = max_x.max(point.x);
        max_y = max_y.max(point.y);
    }

    if !any {
        return Rect::NOTHING;
    }

    Rect::from_min_max(
        Pos2::new(min_x - padding, min_y - padding),
        Pos2::new(max_x + padding, max_y + padding),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    #[test]
    fn segment_distance() {
        let (start, end) = (pos2(0.0, 0.0), pos2(10.0, 0.0));
        assert!((distance_to_line_segment(pos2(5.0, 3.0), start, end) - 3.0).abs() < 1e-5);
        assert!((distance_to_line_segment(pos2(-4.0, 3.0), start, end) - 5.0).abs() < 1e-5);
        assert!((distance_to_line_segment(pos2(3.0, 4.0), start, start) - 5.0).abs() < 1e-5);
    }

    #[test]
    fn bounds_of_nothing_is_nothing() {
        assert_eq!(calculate_bounds(std::iter::empty(), 1.0), Rect::NOTHING);
        let rect = calculate_bounds([pos2(1.0, 2.0), pos2(5.0, -2.0)], 1.0);
        assert_eq!(rect.min, pos2(0.0, -3.0));
        assert_eq!(rect.max, pos2(6.0, 3.0));
    }
}
