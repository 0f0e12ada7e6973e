//! Recursive aggregation of Gauss-integral invariants over every sub-chain.
//!
//! For an invariant `T` of order `2k` and a sub-chain `[i, j]`, split the
//! index tuples `i <= a_1 < ... < a_2k <= j` by whether `a_1 == i` and
//! whether `a_2k == j`. Only the tuples pinned at both ends are new when
//! going from the three smaller sub-chains to `[i, j]`:
//!
//! ```text
//! T(i, j) = E(i, j) + T(i+1, j) + T(i, j-1) - T(i+1, j-1)
//! ```
//!
//! The sweep visits `i` from `L-1` down to `0` and `j` upwards from `i+1`,
//! so every table value on a strictly smaller sub-chain is final when
//! `E(i, j)` is formed. The new terms are:
//!
//! - `I12`: `w(i, j)`.
//! - `I1423`, and the order-6 pairings that join the first and last
//!   position: `w(i, j)` times the inner invariant on `[i+1, j-1]`.
//! - `I1234`, `I1324`: one loop over the partner `x` of `i`, against the
//!   column tail `Σ_{a <= y < j} w(y, j)`.
//! - the end-anchored `I1234Tail`, `I1324Tail`: `w(i, j)` times the `I12`
//!   mass of the free pair, `I12(j+1, N)` and
//!   `I12(i+1, N) - I12(i+1, j) - I12(j, N)` respectively, with `N = L-1`.
//!   Both read only rows below `i`, which are already final.
//! - the other twelve order-6 pairings: a double loop over the partner `x`
//!   of `i` and the partner `y` of `j`; the remaining pair contributes its
//!   `I12` mass inside the slots left free by `i < x, y < j`.
//!
//! Degree 2 costs O(L²), degree 4 O(L³) and degree 6 O(L⁴) time; memory is
//! O(L²) throughout.

use gisa_core::{GisaError, Result};
use log::debug;

use crate::invariant::{Degree, Invariant};
use crate::kernel::WritheKernel;
use crate::table::{InvariantTables, SimplexTable};
use crate::types::{PolygonalChain, Segment};
use crate::workspace::Workspace;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Settings for one aggregation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AggregationConfig {
    /// Highest invariant family to compute.
    pub degree: Degree,
    /// Refuse chains whose tables would need more than this many bytes.
    pub max_table_bytes: Option<usize>,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        AggregationConfig {
            degree: Degree::Six,
            max_table_bytes: None,
        }
    }
}

impl AggregationConfig {
    /// Configuration for `degree` with no memory budget.
    pub fn new(degree: Degree) -> Self {
        AggregationConfig {
            degree,
            ..Self::default()
        }
    }

    /// Configuration from a raw degree value.
    ///
    /// # Errors
    ///
    /// Returns an error unless `degree` is 0, 2, 4 or 6.
    pub fn from_degree_value(degree: u32) -> Result<Self> {
        Ok(Self::new(Degree::try_from(degree)?))
    }

    /// Set the degree.
    pub fn with_degree(mut self, degree: Degree) -> Self {
        self.degree = degree;
        self
    }

    /// Set the table memory budget in bytes.
    pub fn with_max_table_bytes(mut self, bytes: usize) -> Self {
        self.max_table_bytes = Some(bytes);
        self
    }

    /// Check a chain of `len` segments against the memory budget.
    pub(crate) fn check_budget(&self, len: usize) -> Result<()> {
        if let Some(limit) = self.max_table_bytes {
            let needed = InvariantTables::estimated_bytes(len, self.degree);
            if needed > limit {
                return Err(GisaError::InvalidInput(format!(
                    "{len} segments at degree {} need {needed} bytes of tables, budget is {limit}",
                    self.degree
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Compute every invariant up to `config.degree` on every sub-chain of `chain`.
///
/// Allocates fresh tables; use [`Workspace::aggregate`] to reuse buffers
/// across many chains.
///
/// # Errors
///
/// Returns an error if the chain exceeds `config.max_table_bytes` or the
/// kernel produces a non-finite value.
///
/// # Example
///
/// ```
/// use gisa_gauss::{aggregate, AggregationConfig, Degree, GaussKernel, Invariant, PolygonalChain};
///
/// let chain = PolygonalChain::from_points(&[
///     [0.0, 0.0, 0.0],
///     [1.0, 0.0, 0.0],
///     [2.0, 0.0, 0.0],
///     [3.0, 0.0, 0.0],
/// ])
/// .unwrap();
/// let tables = aggregate(&chain, &AggregationConfig::new(Degree::Four), &GaussKernel).unwrap();
/// assert_eq!(tables.value(Invariant::I12, 0, 2).unwrap(), 0.0);
/// ```
pub fn aggregate<K: WritheKernel>(
    chain: &PolygonalChain,
    config: &AggregationConfig,
    kernel: &K,
) -> Result<InvariantTables> {
    let mut workspace = Workspace::new();
    workspace.aggregate(chain, config, kernel)?;
    Ok(workspace.into_tables())
}

// ---------------------------------------------------------------------------
// Writhe table
// ---------------------------------------------------------------------------

fn store_writhe<K: WritheKernel>(
    table: &mut SimplexTable,
    kernel: &K,
    i: usize,
    j: usize,
    value: f64,
) -> Result<()> {
    if !value.is_finite() {
        return Err(GisaError::Numeric(format!(
            "kernel '{}' returned {value} for segments ({i}, {j})",
            kernel.name()
        )));
    }
    table.set(i, j, value);
    Ok(())
}

/// Evaluate the kernel for every pair `i < j` selected by `needs` and store
/// it in `table`. Returns the number of kernel evaluations.
pub(crate) fn fill_writhe<K, F>(
    segments: &[Segment],
    kernel: &K,
    table: &mut SimplexTable,
    needs: F,
) -> Result<usize>
where
    K: WritheKernel,
    F: Fn(usize, usize) -> bool + Sync,
{
    let n = segments.len();
    let mut evaluated = 0;

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        let rows: Vec<Vec<(usize, f64)>> = (0..n)
            .into_par_iter()
            .map(|i| {
                ((i + 1)..n)
                    .filter(|&j| needs(i, j))
                    .map(|j| (j, kernel.writhe(&segments[i], &segments[j])))
                    .collect()
            })
            .collect();
        for (i, row) in rows.into_iter().enumerate() {
            for (j, value) in row {
                store_writhe(table, kernel, i, j, value)?;
                evaluated += 1;
            }
        }
    }

    #[cfg(not(feature = "parallel"))]
    {
        for i in 0..n {
            for j in (i + 1)..n {
                if needs(i, j) {
                    let value = kernel.writhe(&segments[i], &segments[j]);
                    store_writhe(table, kernel, i, j, value)?;
                    evaluated += 1;
                }
            }
        }
    }

    Ok(evaluated)
}

// ---------------------------------------------------------------------------
// Order-6 crossing layouts
// ---------------------------------------------------------------------------

/// Shape of an order-6 pairing whose first and last positions are not
/// paired with each other.
///
/// With `x` the partner of position 1 and `y` the partner of position 6,
/// the four pinned indices `i < min(x, y) < max(x, y) < j` cut the chain
/// into three slots; the remaining pair `(r, s)` lives in slots `slot_r`
/// and `slot_s`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CrossLayout {
    pub invariant: Invariant,
    /// Whether the partner of position 1 comes before the partner of position 6.
    pub partner_first: bool,
    pub slot_r: usize,
    pub slot_s: usize,
}

impl CrossLayout {
    pub fn of(invariant: Invariant) -> Option<Self> {
        if invariant.order() != 6 || invariant.nested_inner().is_some() {
            return None;
        }
        let p = invariant.partner(1)?;
        let q = invariant.partner(6)?;
        let mut rest = (2..=5).filter(|&k| k != p && k != q);
        let r = rest.next()?;
        let s = rest.next()?;
        let (near, far) = (p.min(q), p.max(q));
        let slot = |k: usize| usize::from(k > near) + usize::from(k > far);
        Some(CrossLayout {
            invariant,
            partner_first: p < q,
            slot_r: slot(r),
            slot_s: slot(s),
        })
    }

    /// `I12` mass of the remaining pair given the pinned indices
    /// `[i, near, far, j]`.
    #[inline(always)]
    fn remaining_mass(&self, i12: &SimplexTable, pins: &[usize; 4]) -> f64 {
        let r_lo = pins[self.slot_r] + 1;
        let r_hi = pins[self.slot_r + 1] - 1;
        if self.slot_r == self.slot_s {
            i12.span(r_lo, r_hi)
        } else {
            let s_lo = pins[self.slot_s] + 1;
            let s_hi = pins[self.slot_s + 1] - 1;
            i12.rectangle(r_lo, r_hi, s_lo, s_hi)
        }
    }

    /// Contribution of the tuples pinned at `a_1 = i` and `a_6 = j`.
    fn new_term(&self, w: &SimplexTable, i12: &SimplexTable, i: usize, j: usize) -> f64 {
        let mut total = 0.0;
        for x in (i + 1)..j {
            let w_ix = w.at(i, x);
            if w_ix == 0.0 {
                continue;
            }
            let ys = if self.partner_first {
                (x + 1)..j
            } else {
                (i + 1)..x
            };
            let mut inner = 0.0;
            for y in ys {
                let pins = if self.partner_first {
                    [i, x, y, j]
                } else {
                    [i, y, x, j]
                };
                inner += w.at(y, j) * self.remaining_mass(i12, &pins);
            }
            total += w_ix * inner;
        }
        total
    }
}

/// Layouts of the twelve crossing order-6 pairings.
pub(crate) fn cross_layouts() -> Vec<CrossLayout> {
    Invariant::ALL.into_iter().filter_map(CrossLayout::of).collect()
}

// ---------------------------------------------------------------------------
// Sweep
// ---------------------------------------------------------------------------

/// New terms `E(i, j)` of every computed invariant, written into `fresh`
/// by catalog index.
fn new_terms(
    tables: &InvariantTables,
    tail: &SimplexTable,
    cross: &[CrossLayout],
    i: usize,
    j: usize,
    fresh: &mut [f64; Invariant::COUNT],
) {
    let degree = tables.degree();
    let w = tables.table(Invariant::W);
    let i12 = tables.table(Invariant::I12);
    let w_ij = w.at(i, j);

    fresh[Invariant::I12.index()] = w_ij;
    if degree < Degree::Four {
        return;
    }

    // (12)(34): a_2 = x pairs with i, a_3 in (x, j) pairs with j.
    let mut e1234 = 0.0;
    for x in (i + 1)..(j - 1) {
        e1234 += w.at(i, x) * tail.at(x + 1, j);
    }
    // (13)(24): a_2 in (i, x) pairs with j, a_3 = x pairs with i.
    let mut e1324 = 0.0;
    let inner_tail = tail.at(i + 1, j);
    for x in (i + 2)..j {
        e1324 += w.at(i, x) * (inner_tail - tail.at(x, j));
    }
    fresh[Invariant::I1234.index()] = e1234;
    fresh[Invariant::I1324.index()] = e1324;
    fresh[Invariant::I1423.index()] = w_ij * i12.at(i + 1, j - 1);

    // Free pair after a_2 = j, anywhere up to the last segment.
    let last = tables.len() - 1;
    fresh[Invariant::I1234Tail.index()] = w_ij * i12.at(j + 1, last);
    // Free pair straddling j: a_2 in (i, j), a_4 in (j, N].
    let straddling = i12.at(i + 1, last) - i12.at(i + 1, j) - i12.at(j, last);
    fresh[Invariant::I1324Tail.index()] = w_ij * straddling;

    if degree < Degree::Six {
        return;
    }

    for inv in [Invariant::I162345, Invariant::I162435, Invariant::I162534] {
        if let Some(inner) = inv.nested_inner() {
            fresh[inv.index()] = w_ij * tables.table(inner).at(i + 1, j - 1);
        }
    }
    for layout in cross {
        fresh[layout.invariant.index()] = layout.new_term(w, i12, i, j);
    }
}

/// Fill every table above `W` from an already populated writhe table.
///
/// `tail` must be zeroed and sized like the tables.
pub(crate) fn sweep(tables: &mut InvariantTables, tail: &mut SimplexTable) {
    let n = tables.len();
    let degree = tables.degree();
    if degree < Degree::Two || n < 2 {
        return;
    }
    debug!("sweeping {n} segments at degree {degree}");

    let cross = if degree >= Degree::Six {
        cross_layouts()
    } else {
        Vec::new()
    };
    let computed: Vec<Invariant> = degree
        .invariants()
        .filter(|&inv| inv != Invariant::W)
        .collect();
    let mut fresh = [0.0f64; Invariant::COUNT];

    for i in (0..n).rev() {
        for j in (i + 1)..n {
            if degree >= Degree::Four {
                let w_ij = tables.table(Invariant::W).at(i, j);
                tail.set(i, j, tail.at(i + 1, j) + w_ij);
            }
            new_terms(tables, tail, &cross, i, j, &mut fresh);
            for &inv in &computed {
                tables.table_mut(inv).close_cell(i, j, fresh[inv.index()]);
            }
        }
    }
    debug!(
        "sweep done: {} cells × {} tables",
        n * (n - 1) / 2,
        computed.len()
    );
}
