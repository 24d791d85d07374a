use crate::math::{Real, Vector};

/// Computes two unit vectors which, combined with `n`, form a right-handed
/// orthonormal basis: `b1.cross(&b2) == n`.
///
/// `n` is assumed to be normalized.
// Robust and branchless construction from Pixar:
// https://graphics.pixar.com/library/OrthonormalB/paper.pdf
pub fn orthonormal_basis(n: &Vector<Real>) -> [Vector<Real>; 2] {
    let sign: Real = if n.z >= 0.0 { 1.0 } else { -1.0 };
    let a = -1.0 / (sign + n.z);
    let b = n.x * n.y * a;

    let b1 = Vector::new(1.0 + sign * n.x * n.x * a, sign * b, -sign * n.x);
    // Rebuilding the second axis from the first guarantees the handedness.
    let b2 = n.cross(&b1);
    [b1, b2]
}
