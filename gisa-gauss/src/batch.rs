//! Aggregation over many independent chains.

use gisa_core::Result;
use log::debug;

use crate::aggregate::AggregationConfig;
use crate::kernel::WritheKernel;
use crate::table::InvariantTables;
use crate::types::PolygonalChain;

/// Aggregate every chain of `chains`, returning tables in input order.
///
/// With the `parallel` feature chains are spread over the rayon pool, each
/// with its own tables. Without it a single [`crate::Workspace`] sized for
/// the longest chain is reused across the batch.
///
/// # Errors
///
/// Fails on the first chain that fails to aggregate.
pub fn aggregate_batch<K: WritheKernel>(
    chains: &[PolygonalChain],
    config: &AggregationConfig,
    kernel: &K,
) -> Result<Vec<InvariantTables>> {
    let longest = chains.iter().map(PolygonalChain::len).max().unwrap_or(0);
    debug!(
        "batch of {} chains (longest {longest} segments) at degree {}",
        chains.len(),
        config.degree
    );
    for chain in chains {
        config.check_budget(chain.len())?;
    }

    #[cfg(feature = "parallel")]
    let results = {
        use rayon::prelude::*;
        chains
            .par_iter()
            .map(|chain| crate::aggregate::aggregate(chain, config, kernel))
            .collect::<Result<Vec<_>>>()?
    };

    #[cfg(not(feature = "parallel"))]
    let results = {
        let mut workspace = crate::workspace::Workspace::with_capacity(longest);
        let mut out = Vec::with_capacity(chains.len());
        for chain in chains {
            out.push(workspace.aggregate(chain, config, kernel)?.clone());
        }
        out
    };

    debug!("batch done: {} table sets", results.len());
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::invariant::Degree;
    use crate::kernel::{FnKernel, GaussKernel};
    use crate::types::{Point3D, Segment};

    fn spiral(id: &str, n_vertices: usize, pitch: f64) -> PolygonalChain {
        let vertices = (0..n_vertices)
            .map(|k| {
                let t = k as f64 * 1.7;
                Point3D::new(2.1 * t.cos(), 2.1 * t.sin(), pitch * k as f64)
            })
            .collect();
        PolygonalChain::new(id, vertices).unwrap()
    }

    #[test]
    fn preserves_input_order() {
        let chains = vec![
            spiral("a", 9, 0.6),
            spiral("b", 4, 1.4),
            spiral("c", 13, 0.9),
            spiral("d", 1, 1.0),
        ];
        let config = AggregationConfig::new(Degree::Four);
        let results = aggregate_batch(&chains, &config, &GaussKernel).unwrap();
        assert_eq!(results.len(), chains.len());
        for (chain, tables) in chains.iter().zip(&results) {
            assert_eq!(tables.len(), chain.len());
            assert_eq!(tables, &aggregate(chain, &config, &GaussKernel).unwrap());
        }
    }

    #[test]
    fn empty_batch() {
        let results = aggregate_batch(&[], &AggregationConfig::default(), &GaussKernel).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn first_error_aborts() {
        let chains = vec![spiral("a", 6, 1.0), spiral("b", 6, 1.0)];
        let bad = FnKernel(|_: &Segment, _: &Segment| f64::INFINITY);
        assert!(aggregate_batch(&chains, &AggregationConfig::default(), &bad).is_err());

        let tight = AggregationConfig::default().with_max_table_bytes(64);
        assert!(aggregate_batch(&chains, &tight, &GaussKernel)
            .unwrap_err()
            .is_invalid_input());
    }
}
