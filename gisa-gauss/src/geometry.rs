//! Segment-pair geometry: the Gauss solid angle and the elementary writhe.
//!
//! For two directed segments `a = (p1, p2)` and `b = (p3, p4)` the Gauss
//! integral equals the solid angle `Ω` swept by the difference vectors
//! `q - p` (`p ∈ a`, `q ∈ b`), signed by the orientation of the pair. The
//! quadrilateral spanned by `p3 - p1, p4 - p1, p4 - p2, p3 - p2` is
//! decomposed through its four face normals (Klenin & Langowski, 2000).

use core::f64::consts::PI;

use crate::types::{Point3D, PolygonalChain, Segment};

/// Cross products shorter than this are treated as undefined normals.
pub const DEGENERACY_EPS: f64 = 1e-12;

fn face_normal(u: &Point3D, v: &Point3D) -> Option<Point3D> {
    let c = u.cross(v);
    let n = c.norm();
    if n < DEGENERACY_EPS {
        None
    } else {
        Some(c.scale(1.0 / n))
    }
}

fn asin_clamped(x: f64) -> f64 {
    x.clamp(-1.0, 1.0).asin()
}

/// Unsigned solid angle subtended by the pair `(a, b)`.
///
/// Returns `0.0` when a face normal is undefined: segments sharing an
/// endpoint, collinear segments, or zero-length segments.
pub fn solid_angle(a: &Segment, b: &Segment) -> f64 {
    let r13 = b.start.sub(&a.start);
    let r14 = b.end.sub(&a.start);
    let r23 = b.start.sub(&a.end);
    let r24 = b.end.sub(&a.end);

    let normals = (
        face_normal(&r13, &r14),
        face_normal(&r14, &r24),
        face_normal(&r24, &r23),
        face_normal(&r23, &r13),
    );
    let (n1, n2, n3, n4) = match normals {
        (Some(n1), Some(n2), Some(n3), Some(n4)) => (n1, n2, n3, n4),
        _ => return 0.0,
    };

    asin_clamped(n1.dot(&n2))
        + asin_clamped(n2.dot(&n3))
        + asin_clamped(n3.dot(&n4))
        + asin_clamped(n4.dot(&n1))
}

/// Elementary mutual writhe `w(a, b) = ±Ω / 2π` of two segments.
///
/// The sign is that of `(d_b × d_a) · (b.start - a.start)`; it is `0.0` for
/// coplanar pairs. Symmetric in its arguments and always finite.
pub fn segment_writhe(a: &Segment, b: &Segment) -> f64 {
    let orientation = b
        .direction()
        .cross(&a.direction())
        .dot(&b.start.sub(&a.start));
    if orientation.abs() < DEGENERACY_EPS {
        return 0.0;
    }
    let omega = solid_angle(a, b);
    if omega == 0.0 {
        return 0.0;
    }
    omega.copysign(orientation) / (2.0 * PI)
}

/// Writhe of a whole chain: the sum of `w(k, l)` over all segment pairs `k < l`.
pub fn writhe(chain: &PolygonalChain) -> f64 {
    let segments = chain.segments();
    let mut total = 0.0;
    for (k, a) in segments.iter().enumerate() {
        for b in &segments[k + 1..] {
            total += segment_writhe(a, b);
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(a: [f64; 3], b: [f64; 3]) -> Segment {
        Segment::new(Point3D::from(a), Point3D::from(b))
    }

    /// Perpendicular segments of half-lengths `ha`, `hb` whose common
    /// perpendicular of length `d` passes through both midpoints.
    fn clasp(ha: f64, hb: f64, d: f64) -> (Segment, Segment) {
        (
            seg([-ha, 0.0, 0.0], [ha, 0.0, 0.0]),
            seg([0.0, -hb, d], [0.0, hb, d]),
        )
    }

    #[test]
    fn unit_clasp_is_one_third() {
        // Rectangle 2×2 seen from distance 1: Ω = 4·atan(1/√3) = 2π/3.
        let (a, b) = clasp(1.0, 1.0, 1.0);
        assert!((solid_angle(&a, &b) - 2.0 * PI / 3.0).abs() < 1e-12);
        assert!((segment_writhe(&a, &b) + 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn clasp_matches_rectangle_formula() {
        let (ha, hb, d) = (2.0, 0.5, 1.5);
        let (a, b) = clasp(ha, hb, d);
        let expected =
            -4.0 * (ha * hb / (d * (ha * ha + hb * hb + d * d).sqrt())).atan() / (2.0 * PI);
        assert!((segment_writhe(&a, &b) - expected).abs() < 1e-12);
    }

    #[test]
    fn symmetric_and_orientation_sensitive() {
        let (a, b) = clasp(1.0, 1.0, 1.0);
        assert!((segment_writhe(&a, &b) - segment_writhe(&b, &a)).abs() < 1e-15);
        let reversed = Segment::new(b.end, b.start);
        assert!((segment_writhe(&a, &reversed) - 1.0 / 3.0).abs() < 1e-12);
        // Mirror image through the xy-plane
        let mirrored = seg([0.0, -1.0, -1.0], [0.0, 1.0, -1.0]);
        assert!((segment_writhe(&a, &mirrored) - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn degenerate_pairs_are_zero() {
        // Shared endpoint
        let a = seg([0.0, 0.0, 0.0], [1.0, 0.0, 0.0]);
        let b = seg([1.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
        assert_eq!(segment_writhe(&a, &b), 0.0);
        // Collinear
        let c = seg([2.0, 0.0, 0.0], [3.0, 0.0, 0.0]);
        assert_eq!(segment_writhe(&a, &c), 0.0);
        // Coplanar
        let d = seg([0.0, 1.0, 0.0], [1.0, 2.0, 0.0]);
        assert_eq!(segment_writhe(&a, &d), 0.0);
        // Zero length
        let e = seg([0.5, 1.0, 1.0], [0.5, 1.0, 1.0]);
        assert_eq!(segment_writhe(&a, &e), 0.0);
    }

    #[test]
    fn straight_chain_has_zero_writhe() {
        let chain = PolygonalChain::from_points(&[
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [2.0, 0.0, 0.0],
            [3.0, 0.0, 0.0],
            [4.0, 0.0, 0.0],
        ])
        .unwrap();
        assert_eq!(writhe(&chain), 0.0);
    }
}
