//! Reusable table storage for batches of chains.
//!
//! Aggregating many chains one after another would otherwise allocate and
//! free a full set of `(L+2)²` tables per chain. A [`Workspace`] sized for
//! the longest chain of a batch keeps its buffers between calls.
//!
//! Kernel values are gathered in a pending writhe table first; the output
//! tables are only touched once every kernel value is known to be finite,
//! so a failed call leaves the previous result in place.

use gisa_core::{Annotated, Result};
use log::{debug, trace};

use crate::aggregate::{fill_writhe, sweep, AggregationConfig};
use crate::invariant::{Degree, Invariant};
use crate::kernel::WritheKernel;
use crate::perturb::{apply_perturbation, Perturbation};
use crate::table::{InvariantTables, SimplexTable};
use crate::types::PolygonalChain;

/// Scratch and output buffers for the aggregation sweep.
#[derive(Debug, Clone)]
pub struct Workspace {
    tables: InvariantTables,
    tail: SimplexTable,
    pending: SimplexTable,
    capacity: usize,
    kernel_evaluations: usize,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

impl Workspace {
    /// Empty workspace; buffers grow on first use.
    pub fn new() -> Self {
        Workspace {
            tables: InvariantTables::zeros(0, Degree::Zero),
            tail: SimplexTable::zeros(0),
            pending: SimplexTable::zeros(0),
            capacity: 0,
            kernel_evaluations: 0,
        }
    }

    /// Workspace pre-allocated for chains of up to `max_len` segments at
    /// every degree.
    pub fn with_capacity(max_len: usize) -> Self {
        Workspace {
            tables: InvariantTables::zeros(max_len, Degree::Six),
            tail: SimplexTable::zeros(max_len),
            pending: SimplexTable::zeros(max_len),
            capacity: max_len,
            kernel_evaluations: 0,
        }
    }

    /// Longest chain (in segments) the buffers currently hold without growing.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Tables from the last successful call.
    pub fn tables(&self) -> &InvariantTables {
        &self.tables
    }

    /// Kernel evaluations spent by the last successful call.
    pub fn kernel_evaluations(&self) -> usize {
        self.kernel_evaluations
    }

    /// Give up the buffers and keep the last tables.
    pub fn into_tables(self) -> InvariantTables {
        self.tables
    }

    /// Install the pending writhe table as the result for `len` segments at
    /// `degree` and sweep the higher tables from it.
    fn commit(&mut self, len: usize, degree: Degree, evaluated: usize) {
        if len > self.capacity {
            trace!("workspace grows from {} to {len} segments", self.capacity);
            self.capacity = len;
        }
        self.tables.reset(len, degree);
        self.tail.reset(if degree >= Degree::Four { len } else { 0 });
        core::mem::swap(self.tables.table_mut(Invariant::W), &mut self.pending);
        sweep(&mut self.tables, &mut self.tail);
        self.kernel_evaluations = evaluated;
    }

    /// Aggregate `chain` into this workspace's buffers.
    ///
    /// The returned tables stay valid until the next successful call.
    ///
    /// # Errors
    ///
    /// Returns an error if the chain exceeds `config.max_table_bytes` or the
    /// kernel produces a non-finite value. The tables of the previous call
    /// are kept in either case.
    pub fn aggregate<K: WritheKernel>(
        &mut self,
        chain: &PolygonalChain,
        config: &AggregationConfig,
        kernel: &K,
    ) -> Result<&InvariantTables> {
        let n = chain.len();
        config.check_budget(n)?;
        debug!(
            "aggregating chain '{}' ({n} segments) at degree {} with kernel '{}'",
            chain.name(),
            config.degree,
            kernel.name()
        );

        self.pending.reset(n);
        let evaluated = fill_writhe(&chain.segments(), kernel, &mut self.pending, |_, _| true)?;
        self.commit(n, config.degree, evaluated);
        Ok(&self.tables)
    }

    /// Apply `perturbation` to `chain` and aggregate the moved chain into
    /// this workspace, reusing the writhe values of `base` for every pair
    /// the move leaves untouched.
    ///
    /// Returns the moved chain with its tables. See [`crate::perturb`] for
    /// the preconditions on `base` and `perturbation`.
    ///
    /// # Errors
    ///
    /// Same as [`crate::perturb::perturb`]. The tables of the previous call
    /// are kept on error.
    pub fn perturb<K: WritheKernel>(
        &mut self,
        chain: &PolygonalChain,
        base: &InvariantTables,
        perturbation: &Perturbation,
        config: &AggregationConfig,
        kernel: &K,
    ) -> Result<(PolygonalChain, &InvariantTables)> {
        let moved = apply_perturbation(chain, base, perturbation)?;
        let n = moved.len();
        config.check_budget(n)?;

        let affected = perturbation.affected_segments(n);
        debug!(
            "perturbing chain '{}': vertices {:?}, segments {:?} of {n}",
            chain.name(),
            perturbation.vertex_range(),
            affected
        );

        self.pending.reset(n);
        let base_w = base.writhe();
        let touched = |i: usize, j: usize| affected.contains(&i) || affected.contains(&j);
        for i in 0..n {
            for j in (i + 1)..n {
                if !touched(i, j) {
                    self.pending.set(i, j, base_w.at(i, j));
                }
            }
        }
        let evaluated = fill_writhe(&moved.segments(), kernel, &mut self.pending, touched)?;
        self.commit(n, config.degree, evaluated);
        Ok((moved, &self.tables))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::kernel::{FnKernel, GaussKernel};
    use crate::types::{Point3D, Segment};

    fn wave(n_vertices: usize, phase: f64) -> PolygonalChain {
        let vertices = (0..n_vertices)
            .map(|k| {
                let t = k as f64 * 0.9 + phase;
                Point3D::new(3.0 * t.cos(), 3.0 * (1.3 * t).sin(), 0.8 * k as f64 + t.sin())
            })
            .collect();
        PolygonalChain::new("wave", vertices).unwrap()
    }

    #[test]
    fn reuse_matches_fresh_allocation() {
        let mut ws = Workspace::with_capacity(12);
        let config = AggregationConfig::default();
        let long = wave(12, 0.0);
        let short = wave(7, 0.4);

        let first = ws.aggregate(&long, &config, &GaussKernel).unwrap().clone();
        assert_eq!(first, aggregate(&long, &config, &GaussKernel).unwrap());

        // A shorter chain after a longer one must not see stale values.
        let second = ws.aggregate(&short, &config, &GaussKernel).unwrap().clone();
        assert_eq!(second, aggregate(&short, &config, &GaussKernel).unwrap());
        assert_eq!(ws.capacity(), 12);
        assert_eq!(ws.kernel_evaluations(), 6 * 5 / 2);
    }

    #[test]
    fn no_reallocation_within_capacity() {
        let mut ws = Workspace::with_capacity(10);
        let cap_before = ws.tables().writhe().capacity();
        ws.aggregate(&wave(8, 0.0), &AggregationConfig::default(), &GaussKernel)
            .unwrap();
        ws.aggregate(&wave(9, 0.3), &AggregationConfig::default(), &GaussKernel)
            .unwrap();
        assert_eq!(ws.tables().writhe().capacity(), cap_before);
    }

    #[test]
    fn grows_beyond_capacity() {
        let mut ws = Workspace::new();
        assert_eq!(ws.capacity(), 0);
        let tables = ws
            .aggregate(&wave(6, 0.0), &AggregationConfig::new(Degree::Two), &GaussKernel)
            .unwrap();
        assert_eq!(tables.len(), 5);
        assert_eq!(ws.capacity(), 5);
    }

    #[test]
    fn degree_change_between_calls() {
        let mut ws = Workspace::with_capacity(9);
        let chain = wave(9, 0.2);
        ws.aggregate(&chain, &AggregationConfig::new(Degree::Six), &GaussKernel)
            .unwrap();
        let low = ws
            .aggregate(&chain, &AggregationConfig::new(Degree::Two), &GaussKernel)
            .unwrap();
        assert_eq!(low.degree(), Degree::Two);
        assert!(low.get(Invariant::I1234).is_none());
    }

    #[test]
    fn failed_call_keeps_previous_tables() {
        let mut ws = Workspace::new();
        let config = AggregationConfig::default();
        let good = ws.aggregate(&wave(9, 0.0), &config, &GaussKernel).unwrap().clone();
        assert!(good.value(Invariant::I12, 0, 7).unwrap() != 0.0);

        let nan = FnKernel(|_: &Segment, _: &Segment| f64::NAN);
        assert!(ws.aggregate(&wave(5, 0.1), &config, &nan).is_err());
        assert_eq!(ws.tables(), &good);

        let tight = config.with_max_table_bytes(16);
        assert!(ws.aggregate(&wave(5, 0.1), &tight, &GaussKernel).is_err());
        assert_eq!(ws.tables(), &good);

        // Still usable afterwards.
        let next = ws.aggregate(&wave(5, 0.1), &config, &GaussKernel).unwrap().clone();
        assert_eq!(next, aggregate(&wave(5, 0.1), &config, &GaussKernel).unwrap());
    }

    #[test]
    fn perturb_reuses_buffers() {
        let mut ws = Workspace::with_capacity(11);
        let config = AggregationConfig::default();
        let chain = wave(11, 0.5);
        let base = ws.aggregate(&chain, &config, &GaussKernel).unwrap().clone();
        let cap_before = ws.tables().writhe().capacity();

        let p = Perturbation::new(6, vec![Point3D::new(1.0, -2.0, 4.0)]);
        let (moved, tables) = ws.perturb(&chain, &base, &p, &config, &GaussKernel).unwrap();
        assert_eq!(tables, &aggregate(&moved, &config, &GaussKernel).unwrap());
        assert_eq!(ws.tables().writhe().capacity(), cap_before);

        // Segments 5 and 6 touch vertex 6.
        let n = chain.len();
        assert_eq!(ws.kernel_evaluations(), n * (n - 1) / 2 - (n - 2) * (n - 3) / 2);
    }

    #[test]
    fn failed_perturb_keeps_previous_tables() {
        let mut ws = Workspace::new();
        let config = AggregationConfig::new(Degree::Four);
        let chain = wave(8, 0.0);
        let base = ws.aggregate(&chain, &config, &GaussKernel).unwrap().clone();

        let p = Perturbation::new(3, vec![Point3D::new(0.0, 1.0, 2.0)]);
        let inf = FnKernel(|_: &Segment, _: &Segment| f64::INFINITY);
        assert!(ws.perturb(&chain, &base, &p, &config, &inf).is_err());
        assert_eq!(ws.tables(), &base);

        let past_end = Perturbation::new(8, vec![Point3D::zero(); 2]);
        assert!(ws.perturb(&chain, &base, &past_end, &config, &GaussKernel).is_err());
        assert_eq!(ws.tables(), &base);
    }
}
