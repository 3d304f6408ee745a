use nalgebra::{Matrix3, Point3, Rotation3, SymmetricEigen, Unit, Vector3};

pub fn centroid<'a>(points: impl IntoIterator<Item = &'a Point3<f64>>) -> Option<Point3<f64>> {
    let mut sum = Vector3::zeros();
    let mut count = 0usize;
    for p in points {
        sum += p.coords;
        count += 1;
    }
    (count > 0).then(|| Point3::from(sum / count as f64))
}

pub fn rotation_from_axis_angle(axis: &Vector3<f64>, angle_degrees: f64) -> Rotation3<f64> {
    Rotation3::from_axis_angle(&Unit::new_normalize(*axis), angle_degrees.to_radians())
}

/// Rotation whose rows are the principal axes of `points`, largest variance first.
///
/// The third row is the cross product of the first two so the result is always a
/// proper (right-handed) rotation. Returns `None` for an empty point set.
pub fn principal_axes(points: &[Point3<f64>]) -> Option<Matrix3<f64>> {
    let center = centroid(points)?;
    let mut covariance = Matrix3::zeros();
    for p in points {
        let d = p - center;
        covariance += d * d.transpose();
    }
    covariance /= points.len() as f64;

    let eigen = SymmetricEigen::new(covariance);
    let mut order = [0usize, 1, 2];
    order.sort_by(|&a, &b| eigen.eigenvalues[b].total_cmp(&eigen.eigenvalues[a]));

    let first: Vector3<f64> = eigen.eigenvectors.column(order[0]).into_owned();
    let second: Vector3<f64> = eigen.eigenvectors.column(order[1]).into_owned();
    let third = first.cross(&second);

    Some(Matrix3::from_rows(&[
        first.transpose(),
        second.transpose(),
        third.transpose(),
    ]))
}

/// Largest distance from `center` to any of `points`.
pub fn bounding_radius<'a>(
    center: &Point3<f64>,
    points: impl IntoIterator<Item = &'a Point3<f64>>,
) -> f64 {
    points
        .into_iter()
        .map(|p| (p - center).norm())
        .fold(0.0, f64::max)
}
