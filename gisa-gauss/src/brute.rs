//! Brute-force evaluation of the invariants from their defining sums.
//!
//! Enumerates every ordered tuple `i <= a_1 < ... < a_2k <= j` and
//! multiplies the paired writhe values. The cost is `O(C(L, 2k))` per
//! entry, so this is only usable for short chains; it exists as the
//! reference the recursive engine is checked against.

use gisa_core::Result;

use crate::aggregate::fill_writhe;
use crate::invariant::{Degree, Invariant};
use crate::kernel::WritheKernel;
use crate::table::{InvariantTables, SimplexTable};
use crate::types::PolygonalChain;

/// Call `f` with every strictly increasing `n`-tuple drawn from `lo ..= hi`.
fn for_each_tuple(lo: usize, hi: usize, n: usize, mut f: impl FnMut(&[usize])) {
    if n == 0 || hi < lo || hi - lo + 1 < n {
        return;
    }
    let mut a: Vec<usize> = (lo..lo + n).collect();
    loop {
        f(&a);
        // Rightmost slot that can still move right.
        let k = match (0..n).rev().find(|&k| a[k] < hi - (n - 1 - k)) {
            Some(k) => k,
            None => return,
        };
        a[k] += 1;
        for t in (k + 1)..n {
            a[t] = a[t - 1] + 1;
        }
    }
}

/// Value of `invariant` at `(i, j)` by direct summation over the pairwise
/// `writhe` table.
///
/// Sub-chain invariants sum over tuples inside `[i, j]`. End-anchored
/// tables sum over tuples in `[i, N]` whose partner of position 1 is at
/// most `j`, with `N` the last segment of `writhe`.
pub fn brute_force_value(writhe: &SimplexTable, invariant: Invariant, i: usize, j: usize) -> f64 {
    if invariant == Invariant::W {
        return if i < j { writhe.get(i, j) } else { 0.0 };
    }
    if j <= i {
        return 0.0;
    }
    let pairs = invariant.pairs();
    let (hi, anchor) = match invariant.partner(1) {
        Some(p) if invariant.is_end_anchored() => (writhe.len().saturating_sub(1), Some(p)),
        _ => (j, None),
    };
    let mut total = 0.0;
    for_each_tuple(i, hi, invariant.order() as usize, |a| {
        if let Some(p) = anchor {
            if a[p - 1] > j {
                return;
            }
        }
        let mut product = 1.0;
        for &(u, v) in pairs {
            product *= writhe.get(a[u - 1], a[v - 1]);
        }
        total += product;
    });
    total
}

/// Every table up to `degree` filled by brute force.
///
/// # Errors
///
/// Returns an error if the kernel produces a non-finite value.
pub fn brute_force_tables<K: WritheKernel>(
    chain: &PolygonalChain,
    degree: Degree,
    kernel: &K,
) -> Result<InvariantTables> {
    let n = chain.len();
    let mut tables = InvariantTables::zeros(n, degree);
    fill_writhe(
        &chain.segments(),
        kernel,
        tables.table_mut(Invariant::W),
        |_, _| true,
    )?;
    let writhe = tables.writhe().clone();
    for inv in degree.invariants().filter(|&inv| inv != Invariant::W) {
        let table = tables.table_mut(inv);
        for i in 0..n {
            for j in (i + 1)..n {
                table.set(i, j, brute_force_value(&writhe, inv, i, j));
            }
        }
    }
    Ok(tables)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::aggregate::{aggregate, AggregationConfig};
    use crate::kernel::{AbsoluteKernel, GaussKernel};
    use crate::types::Point3D;
    use proptest::prelude::*;

    fn chain(max_vertices: usize) -> impl Strategy<Value = PolygonalChain> {
        proptest::collection::vec(
            (-6.0f64..6.0, -6.0f64..6.0, -6.0f64..6.0),
            2..=max_vertices,
        )
        .prop_map(|pts| {
            let vertices = pts.into_iter().map(|(x, y, z)| Point3D::new(x, y, z)).collect();
            PolygonalChain::new("random", vertices).unwrap()
        })
    }

    proptest! {
        #[test]
        fn engine_matches_brute_force(c in chain(10)) {
            let fast = aggregate(&c, &AggregationConfig::default(), &GaussKernel).unwrap();
            let slow = brute_force_tables(&c, Degree::Six, &GaussKernel).unwrap();
            let n = c.len();
            for inv in Invariant::ALL {
                for i in 0..n {
                    for j in (i + 1)..n {
                        let a = fast.value(inv, i, j).unwrap();
                        let b = slow.value(inv, i, j).unwrap();
                        prop_assert!((a - b).abs() < 1e-9, "{} at ({}, {}): {} vs {}", inv, i, j, a, b);
                    }
                }
            }
        }

        #[test]
        fn absolute_kernel_matches_brute_force(c in chain(8)) {
            let kernel = AbsoluteKernel(GaussKernel);
            let fast = aggregate(&c, &AggregationConfig::default(), &kernel).unwrap();
            let slow = brute_force_tables(&c, Degree::Six, &kernel).unwrap();
            for ((inv, a), (_, b)) in fast.global_values().into_iter().zip(slow.global_values()) {
                prop_assert!((a - b).abs() < 1e-9, "{}: {} vs {}", inv, a, b);
                prop_assert!(a >= -1e-12);
            }
        }
    }
}
