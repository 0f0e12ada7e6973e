//! Invariants of a chain with some vertices moved.
//!
//! Only kernel values of segment pairs that touch a moved vertex change.
//! Those are recomputed, every other pair is copied from the base tables,
//! and the sweep is run again over the whole chain.

use core::ops::Range;

use gisa_core::{Annotated, GisaError, Result};

use crate::aggregate::AggregationConfig;
use crate::kernel::WritheKernel;
use crate::table::InvariantTables;
use crate::types::{Point3D, PolygonalChain};
use crate::workspace::Workspace;

/// Replacement coordinates for a contiguous run of vertices.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Perturbation {
    /// Index of the first replaced vertex.
    pub start: usize,
    /// New coordinates for vertices `start .. start + coords.len()`.
    pub coords: Vec<Point3D>,
}

impl Perturbation {
    pub fn new(start: usize, coords: Vec<Point3D>) -> Self {
        Perturbation { start, coords }
    }

    /// Perturbation of the vertices in `range`.
    ///
    /// # Errors
    ///
    /// Returns an error if `coords` does not hold exactly one point per
    /// vertex of `range`.
    pub fn for_range(range: Range<usize>, coords: Vec<Point3D>) -> Result<Self> {
        if range.len() != coords.len() {
            return Err(GisaError::InvalidInput(format!(
                "vertex range {range:?} needs {} coordinates, got {}",
                range.len(),
                coords.len()
            )));
        }
        Ok(Perturbation::new(range.start, coords))
    }

    /// Replaced vertex indices.
    pub fn vertex_range(&self) -> Range<usize> {
        self.start..self.start.saturating_add(self.coords.len())
    }

    /// Segments of a chain with `len` segments that touch a replaced vertex.
    pub fn affected_segments(&self, len: usize) -> Range<usize> {
        let vertices = self.vertex_range();
        let lo = vertices.start.saturating_sub(1).min(len);
        let hi = vertices.end.min(len);
        lo..hi.max(lo)
    }
}

/// A perturbed chain together with its freshly swept tables.
#[derive(Debug, Clone, PartialEq)]
pub struct PerturbedChain {
    pub chain: PolygonalChain,
    pub tables: InvariantTables,
    /// Kernel evaluations spent on the affected pairs.
    pub refreshed_pairs: usize,
}

/// Validate a perturbation request and build the moved chain.
pub(crate) fn apply_perturbation(
    chain: &PolygonalChain,
    base: &InvariantTables,
    perturbation: &Perturbation,
) -> Result<PolygonalChain> {
    let n = chain.len();
    if base.len() != n {
        return Err(GisaError::InvalidInput(format!(
            "base tables cover {} segments but chain '{}' has {n}",
            base.len(),
            chain.name()
        )));
    }
    if perturbation.coords.is_empty() {
        return Err(GisaError::InvalidInput(
            "perturbation replaces no vertices".into(),
        ));
    }
    chain.with_vertices_replaced(perturbation.start, &perturbation.coords)
}

/// Apply `perturbation` to `chain` and recompute its invariants, reusing
/// the writhe values of `base` for every pair the move leaves untouched.
///
/// `base` must be the tables of `chain` itself; its degree may differ from
/// `config.degree`, only its writhe table is read. Use
/// [`Workspace::perturb`] to keep the buffers across calls.
///
/// # Errors
///
/// Returns an error if the replaced range is empty or runs past the last
/// vertex, if `base` was built for a chain of a different length, if the
/// replacement holds non-finite coordinates, or on any aggregation error.
pub fn perturb<K: WritheKernel>(
    chain: &PolygonalChain,
    base: &InvariantTables,
    perturbation: &Perturbation,
    config: &AggregationConfig,
    kernel: &K,
) -> Result<PerturbedChain> {
    let mut workspace = Workspace::new();
    let (moved, _) = workspace.perturb(chain, base, perturbation, config, kernel)?;
    let refreshed_pairs = workspace.kernel_evaluations();
    Ok(PerturbedChain {
        chain: moved,
        tables: workspace.into_tables(),
        refreshed_pairs,
    })
}
