//! Colinear chaining of anchors on an elastic founder graph.
//!
//! # Core Components
//!
//! * [`distance`] - Colinearity test and graph-aware gap/overlap costs between two anchors.
//! * [`algo`] - Dynamic programming with distance-bound revision, alternative chains.
//! * [`stats`] - Per-run statistics on revisions and chaining costs.
//!
//! # Algorithm Overview
//!
//! 1. **Input**: The anchors of one query, sorted by query start and bracketed by a dummy
//!    start and a dummy end anchor.
//! 2. **Dynamic Programming**:
//!    - `C[j] = min(C[i] + max_gap(i, j) + overlap(i, j))` over the colinear predecessors `i`.
//!    - Only predecessors whose query gap is within the current distance bound are scanned.
//! 3. **Bound Revision**: While the optimum exceeds the bound, the bound is multiplied by the
//!    ramp-up factor and the pass is repeated.
//! 4. **Output**: The chain, recovered by backtracking from the dummy end.

pub mod algo;
pub mod distance;
pub mod stats;

pub use algo::{
    chain_anchors, chain_eds, coverage_greedy, Chain, ChainMode, ChainParams, InitialGuess,
};
pub use distance::{are_colinear, max_gap, overlap};
pub use stats::Stats;
