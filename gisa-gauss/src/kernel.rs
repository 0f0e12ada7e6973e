//! Pluggable segment-pair kernels.
//!
//! The aggregation engine never evaluates geometry itself: it asks a
//! [`WritheKernel`] for `w(a, b)` once per segment pair and works on the
//! resulting table. [`GaussKernel`] is the standard signed Gauss integral;
//! [`AbsoluteKernel`] turns any kernel into its absolute-value variant.

use core::fmt;

use crate::geometry::segment_writhe;
use crate::types::Segment;

/// Elementary pairwise contribution of two directed segments.
///
/// Implementations must be pure and deterministic and must return a finite
/// value for every input, including degenerate segments.
pub trait WritheKernel: Sync {
    /// Kernel value for the ordered pair `(a, b)`, `a` preceding `b` in the chain.
    fn writhe(&self, a: &Segment, b: &Segment) -> f64;

    /// Short identifier used in logs and summaries.
    fn name(&self) -> &str {
        "custom"
    }
}

impl<K: WritheKernel + ?Sized> WritheKernel for &K {
    fn writhe(&self, a: &Segment, b: &Segment) -> f64 {
        (**self).writhe(a, b)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Signed Gauss-integral kernel (`±Ω / 2π`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GaussKernel;

impl WritheKernel for GaussKernel {
    fn writhe(&self, a: &Segment, b: &Segment) -> f64 {
        segment_writhe(a, b)
    }

    fn name(&self) -> &str {
        "gauss"
    }
}

/// Absolute value of an inner kernel.
///
/// With the Gauss kernel this yields the unsigned invariants
/// (`I|12|`, `I|1234|`, ...).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AbsoluteKernel<K>(pub K);

impl<K: WritheKernel> WritheKernel for AbsoluteKernel<K> {
    fn writhe(&self, a: &Segment, b: &Segment) -> f64 {
        self.0.writhe(a, b).abs()
    }

    fn name(&self) -> &str {
        "absolute"
    }
}

/// Adapter turning a closure into a kernel.
#[derive(Clone, Copy)]
pub struct FnKernel<F>(pub F);

impl<F> WritheKernel for FnKernel<F>
where
    F: Fn(&Segment, &Segment) -> f64 + Sync,
{
    fn writhe(&self, a: &Segment, b: &Segment) -> f64 {
        (self.0)(a, b)
    }
}

impl<F> fmt::Debug for FnKernel<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnKernel")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point3D;

    fn clasp() -> (Segment, Segment) {
        (
            Segment::new(Point3D::new(-1.0, 0.0, 0.0), Point3D::new(1.0, 0.0, 0.0)),
            Segment::new(Point3D::new(0.0, -1.0, 1.0), Point3D::new(0.0, 1.0, 1.0)),
        )
    }

    #[test]
    fn gauss_kernel_delegates() {
        let (a, b) = clasp();
        assert!((GaussKernel.writhe(&a, &b) + 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(GaussKernel.name(), "gauss");
    }

    #[test]
    fn absolute_kernel_drops_sign() {
        let (a, b) = clasp();
        let k = AbsoluteKernel(GaussKernel);
        assert!((k.writhe(&a, &b) - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(k.name(), "absolute");
    }

    #[test]
    fn closures_and_references_are_kernels() {
        let (a, b) = clasp();
        let constant = FnKernel(|_: &Segment, _: &Segment| 0.25);
        assert_eq!(constant.writhe(&a, &b), 0.25);
        assert_eq!(constant.name(), "custom");

        fn takes_kernel<K: WritheKernel>(k: K, a: &Segment, b: &Segment) -> f64 {
            k.writhe(a, b)
        }
        assert_eq!(takes_kernel(&constant, &a, &b), 0.25);
    }
}
