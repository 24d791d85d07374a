use crate::math::{Point, Real};

/// Computes the geometric center (centroid) of a set of points.
///
/// All points are weighted equally. Returns `None` if `pts` is empty.
#[inline]
pub fn center(pts: &[Point<Real>]) -> Option<Point<Real>> {
    let mut piter = pts.iter();
    let denom: Real = na::convert::<f64, Real>(1.0 / (pts.len() as f64));
    let mut res = *piter.next()? * denom;

    for pt in piter {
        res += pt.coords * denom;
    }

    Some(res)
}
