//! Dense simplex tables and the per-chain result set.
//!
//! A [`SimplexTable`] for a chain of `L` segments is an `(L+2)×(L+2)` array
//! addressed with a one-cell halo: indices run over `-1 ..= L`, so the
//! recursions can read `T(i+1, j)` or `T(i, j-1)` at the border without a
//! bounds test. Entries with `i >= j` and halo entries are never written and
//! stay exactly `0.0`.

use gisa_core::{GisaError, Result, Summarizable};

use crate::invariant::{Degree, Invariant};

/// Values of one invariant for every sub-chain `[i, j]`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimplexTable {
    len: usize,
    stride: usize,
    data: Vec<f64>,
}

impl SimplexTable {
    /// Zeroed table for a chain of `len` segments.
    pub fn zeros(len: usize) -> Self {
        let mut table = SimplexTable {
            len: 0,
            stride: 0,
            data: Vec::new(),
        };
        table.reset(len);
        table
    }

    /// Re-dimension to `len` segments and zero every entry, reusing the
    /// allocation when it is large enough.
    pub fn reset(&mut self, len: usize) {
        self.len = len;
        self.stride = len + 2;
        self.data.clear();
        self.data.resize(self.stride * self.stride, 0.0);
    }

    /// Number of chain segments `L` the table is sized for.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the table covers no segments.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Allocated capacity in cells.
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    #[inline(always)]
    fn offset(&self, i: usize, j: usize) -> usize {
        (i + 1) * self.stride + (j + 1)
    }

    /// Value on sub-chain `[i, j]`, for `i, j` in `0 ..= L`.
    ///
    /// Entries with `i >= j` and the `L` halo row/column are `0.0`.
    ///
    /// # Panics
    ///
    /// Panics if `i` or `j` exceeds `L`.
    #[inline(always)]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        assert!(i <= self.len && j <= self.len, "({i}, {j}) outside table of length {}", self.len);
        self.data[self.offset(i, j)]
    }

    /// Value at a signed index pair in the halo range `-1 ..= L`.
    ///
    /// # Panics
    ///
    /// Panics if either index lies outside `-1 ..= L`.
    pub fn get_signed(&self, i: isize, j: isize) -> f64 {
        let max = self.len as isize;
        assert!(
            (-1..=max).contains(&i) && (-1..=max).contains(&j),
            "({i}, {j}) outside halo of table of length {}",
            self.len
        );
        self.data[((i + 1) as usize) * self.stride + (j + 1) as usize]
    }

    /// Unchecked-by-contract read used inside the sweep; callers keep
    /// `i, j <= L`. Slice indexing still panics on a real overrun.
    #[inline(always)]
    pub(crate) fn at(&self, i: usize, j: usize) -> f64 {
        self.data[self.offset(i, j)]
    }

    #[inline(always)]
    pub(crate) fn set(&mut self, i: usize, j: usize, value: f64) {
        debug_assert!(i < j && j < self.len);
        let k = self.offset(i, j);
        self.data[k] = value;
    }

    /// Close cell `(i, j)` with the 2-D inclusion–exclusion recurrence
    /// `T(i,j) = new_term + T(i+1,j) + T(i,j-1) - T(i+1,j-1)`.
    ///
    /// `new_term` is the contribution of the index tuples that start at `i`
    /// and end at `j`; the three neighbours must already be final.
    #[inline(always)]
    pub(crate) fn close_cell(&mut self, i: usize, j: usize, new_term: f64) {
        let value =
            new_term + self.at(i + 1, j) + self.at(i, j - 1) - self.at(i + 1, j - 1);
        self.set(i, j, value);
    }

    /// Order-2 style sum over pairs `lo <= a < b <= hi`; zero for empty ranges.
    ///
    /// Only meaningful for cumulative tables such as `I12`.
    #[inline(always)]
    pub(crate) fn span(&self, lo: usize, hi: usize) -> f64 {
        self.at(lo, hi)
    }

    /// Sum of the underlying pair weights over the rectangle
    /// `[a_lo, a_hi] × [b_lo, b_hi]`, with `a_hi < b_lo`, read from a
    /// cumulative `I12`-style table.
    ///
    /// Empty ranges (`a_lo == a_hi + 1` or `b_lo == b_hi + 1`) give zero.
    #[inline(always)]
    pub(crate) fn rectangle(&self, a_lo: usize, a_hi: usize, b_lo: usize, b_hi: usize) -> f64 {
        self.at(a_lo, b_hi) - self.at(a_hi + 1, b_hi) - self.at(a_lo, b_lo - 1)
            + self.at(a_hi + 1, b_lo - 1)
    }

    /// Largest absolute value in the table.
    pub fn max_abs(&self) -> f64 {
        self.data.iter().fold(0.0, |m, v| m.max(v.abs()))
    }

    /// Sub-chains `(i, j)` with `|T(i, j)| > threshold`, in row-major order.
    pub fn entries_above(&self, threshold: f64) -> Vec<(usize, usize, f64)> {
        let mut hits = Vec::new();
        for i in 0..self.len {
            for j in (i + 1)..self.len {
                let v = self.at(i, j);
                if v.abs() > threshold {
                    hits.push((i, j, v));
                }
            }
        }
        hits
    }

    /// Row-major copy of the `L×L` core without the halo.
    pub fn to_dense(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.len * self.len);
        for i in 0..self.len {
            for j in 0..self.len {
                out.push(self.at(i, j));
            }
        }
        out
    }
}

/// All tables computed for one chain at one degree.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InvariantTables {
    len: usize,
    degree: Degree,
    tables: Vec<SimplexTable>,
}

impl InvariantTables {
    /// Zeroed tables for `len` segments at `degree`.
    pub fn zeros(len: usize, degree: Degree) -> Self {
        let mut tables = InvariantTables {
            len: 0,
            degree,
            tables: (0..Invariant::COUNT).map(|_| SimplexTable::zeros(0)).collect(),
        };
        tables.reset(len, degree);
        tables
    }

    /// Re-dimension for `len` segments at `degree`, zeroing every included
    /// table and shrinking excluded ones to zero length (their allocations
    /// are kept for later reuse).
    pub fn reset(&mut self, len: usize, degree: Degree) {
        self.len = len;
        self.degree = degree;
        for inv in Invariant::ALL {
            let size = if degree.includes(inv) { len } else { 0 };
            self.tables[inv.index()].reset(size);
        }
    }

    /// Number of chain segments.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the chain had no segments.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Degree the tables were computed at.
    pub fn degree(&self) -> Degree {
        self.degree
    }

    /// Table for `invariant`, or `None` if it is above the computed degree.
    pub fn get(&self, invariant: Invariant) -> Option<&SimplexTable> {
        if self.degree.includes(invariant) {
            Some(&self.tables[invariant.index()])
        } else {
            None
        }
    }

    /// Value of `invariant` on sub-chain `[i, j]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the invariant was not computed or the indices
    /// fall outside the chain.
    pub fn value(&self, invariant: Invariant, i: usize, j: usize) -> Result<f64> {
        let table = self.get(invariant).ok_or_else(|| {
            GisaError::InvalidInput(format!(
                "{invariant} is not computed at degree {}",
                self.degree
            ))
        })?;
        if i >= self.len || j >= self.len {
            return Err(GisaError::InvalidInput(format!(
                "sub-chain [{i}, {j}] outside chain of {} segments",
                self.len
            )));
        }
        Ok(table.get(i, j))
    }

    /// The pairwise writhe table (present at every degree).
    pub fn writhe(&self) -> &SimplexTable {
        &self.tables[Invariant::W.index()]
    }

    /// Iterate over the computed `(invariant, table)` pairs in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = (Invariant, &SimplexTable)> {
        self.degree
            .invariants()
            .map(move |inv| (inv, &self.tables[inv.index()]))
    }

    /// Whole-chain value `T(0, L-1)` of every computed invariant.
    ///
    /// For `W` this is the writhe between the first and last segment. Empty
    /// chains give zeros.
    pub fn global_values(&self) -> Vec<(Invariant, f64)> {
        let last = self.len.saturating_sub(1);
        self.iter().map(|(inv, t)| (inv, t.get(0, last))).collect()
    }

    /// Bytes needed by the tables for a chain of `len` segments at `degree`.
    pub fn estimated_bytes(len: usize, degree: Degree) -> usize {
        let side = len.saturating_add(2);
        let cells = side.saturating_mul(side);
        degree
            .invariants()
            .count()
            .saturating_mul(cells)
            .saturating_mul(core::mem::size_of::<f64>())
    }

    pub(crate) fn table(&self, invariant: Invariant) -> &SimplexTable {
        &self.tables[invariant.index()]
    }

    pub(crate) fn table_mut(&mut self, invariant: Invariant) -> &mut SimplexTable {
        &mut self.tables[invariant.index()]
    }
}

impl Summarizable for InvariantTables {
    fn summary(&self) -> String {
        let mut text = format!(
            "InvariantTables — {} segment(s), degree {}, {} table(s)",
            self.len,
            self.degree,
            self.degree.invariants().count()
        );
        if self.degree >= Degree::Two && self.len > 0 {
            text.push_str(&format!(
                ", I12 = {:.4}",
                self.tables[Invariant::I12.index()].get(0, self.len - 1)
            ));
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeros_has_halo() {
        let t = SimplexTable::zeros(4);
        assert_eq!(t.len(), 4);
        for i in -1..=4 {
            for j in -1..=4 {
                assert_eq!(t.get_signed(i, j), 0.0);
            }
        }
    }

    #[test]
    #[should_panic]
    fn get_outside_halo_panics() {
        let t = SimplexTable::zeros(3);
        let _ = t.get(4, 0);
    }

    #[test]
    #[should_panic]
    fn get_signed_outside_halo_panics() {
        let t = SimplexTable::zeros(3);
        let _ = t.get_signed(-2, 0);
    }

    #[test]
    fn close_cell_is_inclusion_exclusion() {
        // Cumulative table of unit weights: T(i, j) counts pairs in [i, j].
        let n = 5;
        let mut t = SimplexTable::zeros(n);
        for i in (0..n).rev() {
            for j in (i + 1)..n {
                t.close_cell(i, j, 1.0);
            }
        }
        for i in 0..n {
            for j in (i + 1)..n {
                let m = (j - i + 1) as f64;
                assert_eq!(t.get(i, j), m * (m - 1.0) / 2.0);
            }
        }
        // Lower triangle and diagonal untouched
        assert_eq!(t.get(3, 1), 0.0);
        assert_eq!(t.get(2, 2), 0.0);
        // Rectangle [0,1] × [3,4] holds 4 unit pairs
        assert_eq!(t.rectangle(0, 1, 3, 4), 4.0);
        // Empty rectangle side
        assert_eq!(t.rectangle(2, 1, 3, 4), 0.0);
        assert_eq!(t.span(2, 4), 3.0);
    }

    #[test]
    fn reset_reuses_allocation() {
        let mut t = SimplexTable::zeros(10);
        let cap = t.capacity();
        t.reset(4);
        assert_eq!(t.capacity(), cap);
        assert_eq!(t.len(), 4);
        assert_eq!(t.to_dense().len(), 16);
    }

    #[test]
    fn entries_above_threshold() {
        let mut t = SimplexTable::zeros(3);
        t.set(0, 1, 0.5);
        t.set(0, 2, -2.0);
        t.set(1, 2, 0.1);
        let hits = t.entries_above(0.3);
        assert_eq!(hits, vec![(0, 1, 0.5), (0, 2, -2.0)]);
        assert_eq!(t.max_abs(), 2.0);
    }

    #[test]
    fn tables_respect_degree() {
        let tables = InvariantTables::zeros(5, Degree::Four);
        assert!(tables.get(Invariant::I1423).is_some());
        assert!(tables.get(Invariant::I123456).is_none());
        assert_eq!(tables.iter().count(), 7);
        assert_eq!(tables.global_values().len(), 7);
        assert!(tables.value(Invariant::I12, 0, 4).is_ok());
        assert!(tables.value(Invariant::I12, 0, 5).is_err());
        assert!(tables.value(Invariant::I162534, 0, 4).is_err());
        assert!(tables.summary().contains("degree 4"));
    }

    #[test]
    fn estimated_bytes_scales_with_degree() {
        assert_eq!(InvariantTables::estimated_bytes(8, Degree::Zero), 100 * 8);
        assert_eq!(InvariantTables::estimated_bytes(8, Degree::Six), 22 * 100 * 8);
        assert_eq!(InvariantTables::estimated_bytes(usize::MAX, Degree::Six), usize::MAX);
    }
}
