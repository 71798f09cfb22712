//! Graph-aware edge costs between two anchors.
//!
//! Every anchor spans at most two consecutive blocks. For a pair `a1 -> a2` the graph
//! relation is one of:
//!
//! * the last block of `a1` strictly precedes the first block of `a2`;
//! * both paths are the same node sequence;
//! * the last node of `a1` is the first node of `a2`.
//!
//! Any other configuration is not colinear.

use crate::libs::anchor::Anchor;
use crate::libs::efg::{BlockId, Efg};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Relation {
    Disjoint { b1: BlockId, b2: BlockId },
    SharedNode,
    SamePath,
}

fn relation(a1: &Anchor, a2: &Anchor, efg: &Efg) -> Option<Relation> {
    let b1 = efg.block_of(a1.last_node());
    let b2 = efg.block_of(a2.first_node());

    if b1 < b2 {
        Some(Relation::Disjoint { b1, b2 })
    } else if a1.last_node() == a2.first_node() {
        Some(Relation::SharedNode)
    } else if a1.path == a2.path {
        Some(Relation::SamePath)
    } else {
        None
    }
}

// Unmatched suffix of the last node of a1
fn suffix(a1: &Anchor) -> i64 {
    a1.plength - a1.pend
}

// End of a1 measured from the start of its last node
fn end_in_last_node(a1: &Anchor, efg: &Efg) -> i64 {
    efg.label_length(a1.last_node()) - suffix(a1)
}

/// Strict precedence in the query, and compatible order in the graph.
pub fn are_colinear(a1: &Anchor, a2: &Anchor, efg: &Efg) -> bool {
    debug_assert!(a1.path.len() <= 2 && a2.path.len() <= 2);

    if a1.qstart >= a2.qstart || a1.qend >= a2.qend {
        return false;
    }

    if efg.block_of(a1.last_node()) < efg.block_of(a2.first_node()) {
        return true;
    }

    if a1.path == a2.path {
        return a1.pstart < a2.pstart && a1.pend < a2.pend;
    }

    if a1.last_node() == a2.first_node() {
        if a1.path.len() == 1 {
            return a1.pstart < a2.pstart && a1.pend < a2.pend;
        }
        // a1 starts in the previous block
        let offset = efg.label_length(a1.first_node());
        return a1.pstart < offset + a2.pstart && a1.pend < offset + a2.pend;
    }

    false
}

/// Gap cost between `a1` and `a2`: the larger of the graph gap and the query gap.
pub fn max_gap(a1: &Anchor, a2: &Anchor, efg: &Efg) -> i64 {
    let graph_distance = match relation(a1, a2, efg) {
        Some(Relation::Disjoint { b1, b2 }) => {
            suffix(a1) + efg.shortest_path(b1 + 1, b2 - 1) + a2.pstart
        }
        Some(Relation::SharedNode) => (a2.pstart - end_in_last_node(a1, efg)).max(0),
        Some(Relation::SamePath) => (a2.pstart - a1.pend).max(0),
        None => {
            debug_assert!(false, "max_gap called on anchors that are not colinear");
            0
        }
    };

    graph_distance.max(a1.gap_query(a2).max(0))
}

/// Difference between the overlap of `a1` and `a2` in the graph and in the query.
pub fn overlap(a1: &Anchor, a2: &Anchor, efg: &Efg) -> i64 {
    let graph_overlap = match relation(a1, a2, efg) {
        Some(Relation::Disjoint { .. }) => 0,
        Some(Relation::SharedNode) => (end_in_last_node(a1, efg) - a2.pstart).max(0),
        Some(Relation::SamePath) => (a1.pend - a2.pstart).max(0),
        None => {
            debug_assert!(false, "overlap called on anchors that are not colinear");
            0
        }
    };

    (graph_overlap - (a1.qend - a2.qstart).max(0)).abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    // A(4) | B1(2) B2(3) | C(3)
    fn graph() -> Efg {
        let mut efg = Efg::from_blocks(
            &[vec![("A", "ACGT")], vec![("B1", "TT"), ("B2", "TGA")], vec![("C", "CCC")]],
            &[("A", "B1"), ("A", "B2"), ("B1", "C"), ("B2", "C")],
        )
        .unwrap();
        efg.init_eds_support();
        efg
    }

    #[test]
    fn test_colinear_strict_query_order() {
        let efg = graph();
        let a = Anchor::new(20, 0, 4, vec![0], 4, 0, 4);
        let b = Anchor::new(20, 4, 7, vec![3], 3, 0, 3);

        assert!(are_colinear(&a, &b, &efg));
        assert!(!are_colinear(&b, &a, &efg));
        assert!(!are_colinear(&a, &a, &efg));

        // equal query start
        let c = Anchor::new(20, 0, 6, vec![3], 3, 0, 3);
        assert!(!are_colinear(&a, &c, &efg));
        // equal query end
        let d = Anchor::new(20, 2, 4, vec![3], 3, 0, 2);
        assert!(!are_colinear(&a, &d, &efg));
    }

    #[test]
    fn test_colinear_same_node() {
        let efg = graph();
        let a = Anchor::new(20, 0, 2, vec![0], 4, 0, 2);
        let b = Anchor::new(20, 1, 4, vec![0], 4, 1, 4);
        assert!(are_colinear(&a, &b, &efg));

        // graph order reversed
        let c = Anchor::new(20, 1, 4, vec![0], 4, 0, 1);
        assert!(!are_colinear(&a, &c, &efg));
    }

    #[test]
    fn test_colinear_shared_boundary_node() {
        let efg = graph();
        // A[1..4) B1[0..2)
        let a = Anchor::new(20, 0, 5, vec![0, 1], 6, 1, 6);
        // B1[1..2) C[0..3)
        let b = Anchor::new(20, 4, 8, vec![1, 3], 5, 1, 5);
        assert!(are_colinear(&a, &b, &efg));

        // different node in block 1
        let c = Anchor::new(20, 4, 8, vec![2, 3], 6, 2, 6);
        assert!(!are_colinear(&a, &c, &efg));
    }

    #[test]
    fn test_colinear_never_reflexive() {
        let efg = graph();
        let anchors = [
            Anchor::new(20, 0, 4, vec![0], 4, 0, 4),
            Anchor::new(20, 2, 6, vec![0, 2], 7, 2, 6),
            Anchor::new(20, 6, 9, vec![3], 3, 0, 3),
            Anchor::dummy_start(20, &efg),
            Anchor::dummy_end(20, &efg),
        ];
        for a in &anchors {
            assert!(!are_colinear(a, a, &efg));
            for b in &anchors {
                if are_colinear(a, b, &efg) {
                    assert!(a.qstart < b.qstart && a.qend < b.qend);
                }
            }
        }
    }

    #[test]
    fn test_gap_disjoint_blocks() {
        let efg = graph();
        // A[0..3), one character of A left unmatched
        let a = Anchor::new(20, 0, 3, vec![0], 4, 0, 3);
        // C[1..3)
        let b = Anchor::new(20, 8, 10, vec![3], 3, 1, 3);

        // graph: 1 (suffix of A) + 2 (shortest label in block 1) + 1 (prefix of C) = 4
        // query: 8 - 3 = 5
        assert_eq!(max_gap(&a, &b, &efg), 5);
        assert_eq!(overlap(&a, &b, &efg), 0);

        let b = Anchor::new(20, 4, 6, vec![3], 3, 1, 3);
        assert_eq!(max_gap(&a, &b, &efg), 4);
    }

    #[test]
    fn test_gap_shared_node() {
        let efg = graph();
        // A[0..4) B1[0..1), one character of B1 left unmatched
        let a = Anchor::new(20, 0, 5, vec![0, 1], 6, 0, 5);
        // B1[1..2) C[0..2)
        let b = Anchor::new(20, 5, 8, vec![1, 3], 5, 1, 4);

        assert!(are_colinear(&a, &b, &efg));
        assert_eq!(max_gap(&a, &b, &efg), 0);
        assert_eq!(overlap(&a, &b, &efg), 0);

        // the query skips two characters that the graph does not
        let b = Anchor::new(20, 7, 10, vec![1, 3], 5, 1, 4);
        assert_eq!(max_gap(&a, &b, &efg), 2);
        assert_eq!(overlap(&a, &b, &efg), 0);

        // the graph repeats the last character of a, the query does not
        let b = Anchor::new(20, 5, 9, vec![1, 3], 5, 0, 4);
        assert_eq!(max_gap(&a, &b, &efg), 0);
        assert_eq!(overlap(&a, &b, &efg), 1);
    }

    #[test]
    fn test_overlap_same_path() {
        let efg = graph();
        // A[0..4) B2[0..1)
        let a = Anchor::new(20, 0, 5, vec![0, 2], 7, 0, 5);
        // A[3..4) B2[0..3): graph overlap 2, query overlap 1
        let b = Anchor::new(20, 4, 8, vec![0, 2], 7, 3, 7);
        assert!(are_colinear(&a, &b, &efg));
        assert_eq!(overlap(&a, &b, &efg), 1);
        assert_eq!(max_gap(&a, &b, &efg), 0);

        // graph gap 1, query gap 3
        let a = Anchor::new(20, 0, 2, vec![0, 2], 7, 0, 2);
        let b = Anchor::new(20, 5, 8, vec![0, 2], 7, 3, 6);
        assert_eq!(max_gap(&a, &b, &efg), 3);
        assert_eq!(overlap(&a, &b, &efg), 0);
    }

    #[test]
    fn test_dummy_to_dummy() {
        let efg = graph();
        let start = Anchor::dummy_start(20, &efg);
        let end = Anchor::dummy_end(20, &efg);

        assert!(are_colinear(&start, &end, &efg));
        // graph: every block (4 + 2 + 3), query: 20
        assert_eq!(max_gap(&start, &end, &efg), 20);
        assert_eq!(overlap(&start, &end, &efg), 0);

        let end = Anchor::dummy_end(5, &efg);
        assert_eq!(max_gap(&start, &end, &efg), 9);
    }
}
