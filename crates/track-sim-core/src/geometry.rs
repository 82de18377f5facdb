use crate::constants::HEADING_FLIP_DEGREES;

/// Unit direction of travel for a heading in degrees, in screen space (Y grows downward).
///
/// Heading 0 points along +x, heading 90 points up the screen (-y). Radar rays use the
/// same conversion with `heading + offset`.
pub fn heading_vector(heading_degrees: f64) -> [f64; 2] {
    let (sin, cos) = (HEADING_FLIP_DEGREES - heading_degrees).to_radians().sin_cos();
    [cos, sin]
}

pub fn distance(a: [f64; 2], b: [f64; 2]) -> f64 {
    (a[0] - b[0]).hypot(a[1] - b[1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_zero_points_along_positive_x() {
        let [dx, dy] = heading_vector(0.0);
        assert!((dx - 1.0).abs() < 1e-12);
        assert!(dy.abs() < 1e-12);
    }

    #[test]
    fn positive_heading_turns_up_the_screen() {
        let [dx, dy] = heading_vector(90.0);
        assert!(dx.abs() < 1e-12);
        assert!((dy + 1.0).abs() < 1e-12, "heading 90 should move toward -y, got {dy}");
    }

    #[test]
    fn negative_heading_turns_down_the_screen() {
        let [_, dy] = heading_vector(-90.0);
        assert!((dy - 1.0).abs() < 1e-12);
    }

    #[test]
    fn heading_vector_is_unit_length() {
        for h in [-725.0, -45.0, 0.0, 13.0, 180.0, 359.0, 1080.5] {
            let v = heading_vector(h);
            assert!((distance(v, [0.0, 0.0]) - 1.0).abs() < 1e-12);
        }
    }
}
