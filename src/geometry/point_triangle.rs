use crate::math::{Point, Real};

/// Projects `pt` on the triangle `(a, b, c)`, returning the closest point of
/// the triangle (face included).
///
/// Walks the Voronoï regions of the vertices, then of the edges, and falls
/// back to the face.
pub fn project_point_on_triangle(
    pt: &Point<Real>,
    a: &Point<Real>,
    b: &Point<Real>,
    c: &Point<Real>,
) -> Point<Real> {
    let ab = b - a;
    let ac = c - a;
    let ap = pt - a;

    let ab_ap = ab.dot(&ap);
    let ac_ap = ac.dot(&ap);

    if ab_ap <= 0.0 && ac_ap <= 0.0 {
        // Voronoï region of `a`.
        return *a;
    }

    let bp = pt - b;
    let ab_bp = ab.dot(&bp);
    let ac_bp = ac.dot(&bp);

    if ab_bp >= 0.0 && ac_bp <= ab_bp {
        // Voronoï region of `b`.
        return *b;
    }

    let vc = ab_ap * ac_bp - ab_bp * ac_ap;
    if vc <= 0.0 && ab_ap >= 0.0 && ab_bp <= 0.0 {
        // Voronoï region of `ab`.
        let v = ab_ap / (ab_ap - ab_bp);
        return a + ab * v;
    }

    let cp = pt - c;
    let ab_cp = ab.dot(&cp);
    let ac_cp = ac.dot(&cp);

    if ac_cp >= 0.0 && ab_cp <= ac_cp {
        // Voronoï region of `c`.
        return *c;
    }

    let vb = ab_cp * ac_ap - ab_ap * ac_cp;
    if vb <= 0.0 && ac_ap >= 0.0 && ac_cp <= 0.0 {
        // Voronoï region of `ac`.
        let w = ac_ap / (ac_ap - ac_cp);
        return a + ac * w;
    }

    let va = ab_bp * ac_cp - ab_cp * ac_bp;
    if va <= 0.0 && (ac_bp - ab_bp) >= 0.0 && (ab_cp - ac_cp) >= 0.0 {
        // Voronoï region of `bc`.
        let w = (ac_bp - ab_bp) / ((ac_bp - ab_bp) + (ab_cp - ac_cp));
        return b + (c - b) * w;
    }

    // Inside the face.
    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    a + ab * v + ac * w
}
