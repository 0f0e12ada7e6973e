//! Gauss-integral invariants of protein backbone chains.
//!
//! A protein backbone is modeled as a polygonal chain through its Cα atoms.
//! This crate computes the writhe `w(i, j)` of every pair of segments and,
//! from it, the order-2, 4 and 6 Gauss-integral invariants of **every**
//! sub-chain `[i, j]` in one sweep, together with the end-anchored order-4
//! tables `I1234Tail` and `I1324Tail`.
//!
//! - **Geometry** — Points, segments and chains in [`types`], the Gauss
//!   solid angle in [`geometry`]
//! - **Kernels** — Pluggable pairwise term via [`WritheKernel`]
//! - **Aggregation** — All invariant tables of a chain with [`aggregate`]
//! - **Perturbation** — Tables of a chain with moved vertices via [`perturb`]
//! - **Arena** — Buffer reuse across chains with [`Workspace`] and
//!   [`aggregate_batch`]
//! - **Reference** — Brute-force evaluation in [`brute`]
//!
//! # Quick start
//!
//! ```
//! use gisa_gauss::{aggregate, AggregationConfig, GaussKernel, Invariant, PolygonalChain};
//! use gisa_core::Summarizable;
//!
//! let chain = PolygonalChain::from_points(&[
//!     [0.0, 0.0, 0.0],
//!     [3.8, 0.0, 0.0],
//!     [3.8, 3.8, 0.0],
//!     [3.8, 3.8, 3.8],
//!     [0.0, 3.8, 3.8],
//!     [0.0, 0.0, 1.0],
//! ])
//! .unwrap();
//!
//! let tables = aggregate(&chain, &AggregationConfig::default(), &GaussKernel).unwrap();
//! let last = chain.len() - 1;
//! let total = tables.value(Invariant::I12, 0, last).unwrap();
//! assert!((total - gisa_gauss::writhe(&chain)).abs() < 1e-12);
//! assert!(tables.summary().contains("degree 6"));
//! ```

pub mod aggregate;
pub mod batch;
pub mod brute;
pub mod geometry;
pub mod invariant;
pub mod kernel;
pub mod perturb;
pub mod table;
pub mod types;
pub mod workspace;

pub use aggregate::{aggregate, AggregationConfig};
pub use batch::aggregate_batch;
pub use brute::{brute_force_tables, brute_force_value};
pub use geometry::{segment_writhe, solid_angle, writhe};
pub use invariant::{Degree, Invariant};
pub use kernel::{AbsoluteKernel, FnKernel, GaussKernel, WritheKernel};
pub use perturb::{perturb, Perturbation, PerturbedChain};
pub use table::{InvariantTables, SimplexTable};
pub use types::{Point3D, PolygonalChain, Segment};
pub use workspace::Workspace;
