use nalgebra::{Isometry3, Matrix3, Point3};

// ---------------------------------------------------------------------------
// Oriented 3D box
// ---------------------------------------------------------------------------

/// Edges between corner indices: front face, rear face, then the connectors.
pub const BOX_EDGES: [(usize, usize); 12] = [
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 0),
    (4, 5),
    (5, 6),
    (6, 7),
    (7, 4),
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7),
];

/// The 8 corners of a box of `size` = (width, length, height) placed at `pose`.
///
/// x runs along the length (corners 0–3 are the front face), y along the
/// width, z along the height.
pub fn box_corners(pose: &Isometry3<f64>, size: &[f64; 3]) -> [Point3<f64>; 8] {
    const X: [f64; 8] = [1.0, 1.0, 1.0, 1.0, -1.0, -1.0, -1.0, -1.0];
    const Y: [f64; 8] = [1.0, -1.0, -1.0, 1.0, 1.0, -1.0, -1.0, 1.0];
    const Z: [f64; 8] = [1.0, 1.0, -1.0, -1.0, 1.0, 1.0, -1.0, -1.0];

    let [w, l, h] = *size;
    std::array::from_fn(|i| pose * Point3::new(l / 2.0 * X[i], w / 2.0 * Y[i], h / 2.0 * Z[i]))
}

// ---------------------------------------------------------------------------
// Pinhole projection
// ---------------------------------------------------------------------------

/// Project a camera-frame point to pixel coordinates (normalized by depth).
pub fn project(intrinsic: &Matrix3<f64>, p: &Point3<f64>) -> [f64; 2] {
    let v = intrinsic * p.coords;
    [v.x / v.z, v.y / v.z]
}

/// Whether any corner lands inside a `width` × `height` image with depth > 1 m.
pub fn any_corner_visible(
    intrinsic: &Matrix3<f64>,
    corners: &[Point3<f64>; 8],
    width: f64,
    height: f64,
) -> bool {
    corners.iter().any(|c| {
        let [u, v] = project(intrinsic, c);
        c.z > 1.0 && u > 0.0 && u < width && v > 0.0 && v < height
    })
}

/// Build a 3×3 matrix from a row-major nested list, `None` unless exactly 3×3.
pub fn matrix3_from_rows(rows: &[Vec<f64>]) -> Option<Matrix3<f64>> {
    if rows.len() != 3 || rows.iter().any(|r| r.len() != 3) {
        return None;
    }
    Some(Matrix3::from_fn(|r, c| rows[r][c]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Translation3, UnitQuaternion};

    #[test]
    fn test_box_corners_axis_aligned() {
        let pose = Isometry3::translation(10.0, 0.0, 1.0);
        let corners = box_corners(&pose, &[2.0, 4.0, 1.5]);

        // front-left-top
        assert_relative_eq!(corners[0], Point3::new(12.0, 1.0, 1.75), epsilon = 1e-12);
        // rear-right-bottom
        assert_relative_eq!(corners[6], Point3::new(8.0, -1.0, 0.25), epsilon = 1e-12);

        let front: f64 = corners[..4].iter().map(|c| c.x).sum::<f64>() / 4.0;
        let rear: f64 = corners[4..].iter().map(|c| c.x).sum::<f64>() / 4.0;
        assert!(front > rear);
    }

    #[test]
    fn test_box_corners_rotated() {
        let pose = Isometry3::from_parts(
            Translation3::identity(),
            UnitQuaternion::from_euler_angles(0.0, 0.0, std::f64::consts::FRAC_PI_2),
        );
        let corners = box_corners(&pose, &[2.0, 4.0, 2.0]);
        // Length now runs along +y.
        assert_relative_eq!(corners[0].y, 2.0, epsilon = 1e-12);
        assert_relative_eq!(corners[0].x, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_project_principal_point() {
        let k = Matrix3::new(100.0, 0.0, 80.0, 0.0, 100.0, 45.0, 0.0, 0.0, 1.0);
        let [u, v] = project(&k, &Point3::new(0.0, 0.0, 5.0));
        assert_relative_eq!(u, 80.0);
        assert_relative_eq!(v, 45.0);

        let [u, v] = project(&k, &Point3::new(1.0, -0.5, 10.0));
        assert_relative_eq!(u, 90.0);
        assert_relative_eq!(v, 40.0);
    }

    #[test]
    fn test_visibility_requires_depth_and_bounds() {
        let k = Matrix3::new(100.0, 0.0, 80.0, 0.0, 100.0, 45.0, 0.0, 0.0, 1.0);

        let ahead = box_corners(&Isometry3::translation(0.0, 0.0, 10.0), &[1.0, 1.0, 1.0]);
        assert!(any_corner_visible(&k, &ahead, 160.0, 90.0));

        let behind = box_corners(&Isometry3::translation(0.0, 0.0, -10.0), &[1.0, 1.0, 1.0]);
        assert!(!any_corner_visible(&k, &behind, 160.0, 90.0));

        let too_close = box_corners(&Isometry3::translation(0.0, 0.0, 0.5), &[0.2, 0.2, 0.2]);
        assert!(!any_corner_visible(&k, &too_close, 160.0, 90.0));

        let off_to_side = box_corners(&Isometry3::translation(50.0, 0.0, 10.0), &[1.0, 1.0, 1.0]);
        assert!(!any_corner_visible(&k, &off_to_side, 160.0, 90.0));
    }

    #[test]
    fn test_matrix3_from_rows() {
        assert!(matrix3_from_rows(&[]).is_none());
        assert!(matrix3_from_rows(&[vec![1.0, 0.0], vec![0.0, 1.0]]).is_none());

        let m = matrix3_from_rows(&[
            vec![1.0, 2.0, 3.0],
            vec![4.0, 5.0, 6.0],
            vec![7.0, 8.0, 9.0],
        ])
        .unwrap();
        assert_eq!(m[(0, 2)], 3.0);
        assert_eq!(m[(2, 0)], 7.0);
    }
}
