use crate::libs::anchor::Anchor;
use crate::libs::chaining::distance::{are_colinear, max_gap, overlap};
use crate::libs::chaining::stats::Stats;
use crate::libs::efg::Efg;
use crate::libs::error::EfgError;

const INFINITE: i64 = i64::MAX;

/// Whether gaps before the first and after the last anchor are penalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainMode {
    Global,
    SemiGlobal,
}

/// How the first distance bound of a query is chosen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InitialGuess {
    /// The same bound for every query
    Constant(i64),
    /// `qlength - coverage * scale`, with the greedy coverage of the anchors
    Coverage(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChainParams {
    pub mode: ChainMode,
    pub initial_guess: InitialGuess,
    pub ramp_up_factor: f64,
    /// Chains extracted and removed before the final one
    pub alternative_chains: usize,
    pub max_revisions: Option<u32>,
}

impl Default for ChainParams {
    fn default() -> Self {
        Self {
            mode: ChainMode::Global,
            initial_guess: InitialGuess::Constant(100),
            ramp_up_factor: 4.0,
            alternative_chains: 0,
            max_revisions: None,
        }
    }
}

/// An optimal chain, dummies excluded.
#[derive(Debug, Clone, PartialEq)]
pub struct Chain {
    pub anchors: Vec<Anchor>,
    /// Positions of the chained anchors in the input slice
    pub indices: Vec<usize>,
    pub cost: i64,
    pub revisions: u32,
}

/// Query characters covered by a greedy left-to-right scan of anchors sorted by query start.
/// Anchors ending inside the covered prefix are skipped.
pub fn coverage_greedy(anchors: &[Anchor]) -> i64 {
    let mut coverage = 0;
    let mut processed = 0;
    for a in anchors {
        if a.qend <= processed {
            continue;
        }
        coverage += a.qend - a.qstart.max(processed + 1);
        processed = a.qend;
    }

    coverage
}

impl ChainParams {
    /// First distance bound for `anchors` (sorted, dummy bracketed).
    pub fn initial_bound(&self, anchors: &[Anchor]) -> i64 {
        match self.initial_guess {
            InitialGuess::Constant(b) => b,
            InitialGuess::Coverage(scale) => {
                let qlength = anchors[0].qlength;
                let real = &anchors[1..anchors.len().saturating_sub(1).max(1)];
                (qlength as f64 - coverage_greedy(real) as f64 * scale) as i64
            }
        }
    }
}

// One pass of the dynamic program under distance bound `bound`.
// Returns whether some predecessor was left out of the scan window.
fn fill_costs(
    anchors: &[Anchor],
    efg: &Efg,
    mode: ChainMode,
    bound: i64,
    costs: &mut [i64],
    backtrack: &mut [usize],
) -> bool {
    let n = anchors.len();
    let semiglobal = mode == ChainMode::SemiGlobal;
    let mut lo = 0;
    let mut pruned = false;

    for j in 1..n {
        // a gap above the bound cannot belong to a chain of cost <= bound
        while lo < j && anchors[lo].gap_query(&anchors[j]) > bound {
            lo += 1;
        }

        let mut best = INFINITE;
        let mut best_i = 0;
        let mut start = lo;
        if semiglobal {
            // free leading gap
            best = costs[0] + anchors[0].gap_query(&anchors[j]);
            // free trailing gap, from any anchor
            if j == n - 1 {
                start = 0;
            }
        }
        if start > 0 {
            pruned = true;
        }

        for i in (start..j).rev() {
            if costs[i] == INFINITE || !are_colinear(&anchors[i], &anchors[j], efg) {
                continue;
            }
            let g = if semiglobal && j == n - 1 {
                anchors[i].gap_query(&anchors[j])
            } else {
                max_gap(&anchors[i], &anchors[j], efg)
            };
            let o = overlap(&anchors[i], &anchors[j], efg);
            log::trace!("anchors[{}] -> anchors[{}]: g = {}, o = {}", i, j, g, o);

            if costs[i] + g + o < best {
                best = costs[i] + g + o;
                best_i = i;
            }
        }

        costs[j] = best;
        backtrack[j] = best_i;
    }

    pruned
}

/// Optimal colinear chain of `anchors` with respect to the graph-aware gap and overlap costs.
///
/// `anchors` must be sorted by query start, with a dummy start first and a dummy end last,
/// and `efg.init_eds_support()` must have been called.
///
/// The scan window of the dynamic program only admits predecessors whose query gap is at
/// most the current distance bound. Whenever the optimum exceeds the bound, the bound is
/// multiplied by `ramp_up_factor` and the whole pass is repeated, so the result is always
/// the unrestricted optimum.
pub fn chain_eds(
    anchors: &[Anchor],
    efg: &Efg,
    mode: ChainMode,
    initial_bound: i64,
    ramp_up_factor: f64,
    max_revisions: Option<u32>,
) -> Result<Chain, EfgError> {
    let n = anchors.len();
    if n < 2 {
        return Ok(Chain {
            anchors: vec![],
            indices: vec![],
            cost: 0,
            revisions: 0,
        });
    }

    let mut costs = vec![0; n];
    let mut backtrack = vec![0; n];
    let mut bound = initial_bound.max(1);
    let mut revisions = 0;

    loop {
        let pruned = fill_costs(anchors, efg, mode, bound, &mut costs, &mut backtrack);
        let cost = costs[n - 1];

        if cost <= bound || (!pruned && cost != INFINITE) {
            break;
        }
        if !pruned || max_revisions.is_some_and(|max| revisions >= max) {
            return Err(EfgError::NoFeasibleChain {
                qlength: anchors[0].qlength,
                revisions,
            });
        }

        bound = ((bound as f64 * ramp_up_factor).ceil() as i64).max(bound + 1);
        revisions += 1;
    }
    log::trace!("cost DP array = {:?}", costs);
    log::trace!("backtrack array = {:?}", backtrack);
    log::trace!("chaining cost computed {} times", revisions + 1);

    let mut indices = vec![];
    let mut j = backtrack[n - 1];
    while j > 0 {
        indices.push(j);
        j = backtrack[j];
    }
    indices.reverse();

    Ok(Chain {
        anchors: indices.iter().map(|&i| anchors[i].clone()).collect(),
        indices,
        cost: costs[n - 1],
        revisions,
    })
}

/// Chains the anchors of one query and folds every extracted chain into `stats`.
///
/// With `alternative_chains = k > 0`, `k` chains are extracted one after the other, each
/// one removed from `anchors` before the next run, followed by a last best chain over the
/// remaining anchors. The result is the concatenation of all extracted chains.
///
/// A failure of the first run is returned as an error. When a later run finds no chain,
/// extraction stops there and the chains found so far are returned.
pub fn chain_anchors(
    anchors: &mut Vec<Anchor>,
    efg: &Efg,
    params: &ChainParams,
    stats: &mut Stats,
) -> Result<Vec<Anchor>, EfgError> {
    if anchors.len() < 2 {
        return Ok(vec![]);
    }
    let qlength = anchors[0].qlength;
    let initial_bound = params.initial_bound(anchors);

    let mut solution = vec![];
    for round in 0..=params.alternative_chains {
        let chain = match chain_eds(
            anchors,
            efg,
            params.mode,
            initial_bound,
            params.ramp_up_factor,
            params.max_revisions,
        ) {
            Ok(chain) => chain,
            Err(e @ EfgError::NoFeasibleChain { .. }) if round > 0 => {
                log::warn!("alternative chain {} abandoned: {}", round, e);
                break;
            }
            Err(e) => return Err(e),
        };
        if !chain.anchors.is_empty() {
            stats.add_chain(chain.cost, chain.revisions, qlength);
        }

        if round < params.alternative_chains {
            let mut removed = vec![false; anchors.len()];
            for &i in &chain.indices {
                removed[i] = true;
            }
            let mut idx = 0;
            anchors.retain(|_| {
                idx += 1;
                !removed[idx - 1]
            });
        }

        solution.extend(chain.anchors);
    }

    Ok(solution)
}
