use crate::libs::efg::{Efg, NodeId};
use crate::libs::error::EfgError;
use itertools::Itertools;

/// A local match between a query substring and a graph path.
///
/// Query coordinates are 0-based half-open. Path offsets `pstart`/`pend` index into the
/// concatenation of the path's node labels, whose total length is `plength`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub qlength: i64,
    pub qstart: i64,
    pub qend: i64,
    pub strand: bool,
    pub path: Vec<NodeId>,
    /// `true` for `>` (forward), `false` for `<`
    pub orientations: Vec<bool>,
    pub plength: i64,
    pub pstart: i64,
    pub pend: i64,
}

/// How long matches are cut into single-node pieces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitPolicy {
    /// Keep every piece
    KeepAll,
    /// Drop pieces of length 1, as GraphAligner rejects them
    DropSingle,
}

/// The query name is the first field of a GAF line.
///
/// ```
/// use efgchain::libs::anchor::query_id;
/// assert_eq!(query_id("read1\t100\t0\t10\t+\t>1\t10\t0\t10"), "read1");
/// assert_eq!(query_id(""), "");
/// ```
pub fn query_id(line: &str) -> &str {
    line.split('\t').next().unwrap_or("").trim()
}

impl Anchor {
    /// A forward-strand anchor; every node of `path` gets the same orientation.
    pub fn new(
        qlength: i64,
        qstart: i64,
        qend: i64,
        path: Vec<NodeId>,
        plength: i64,
        pstart: i64,
        pend: i64,
    ) -> Self {
        let orientations = vec![true; path.len()];
        Self {
            qlength,
            qstart,
            qend,
            strand: true,
            path,
            orientations,
            plength,
            pstart,
            pend,
        }
    }

    /// Parses the first nine fields of a GAF line. Returns the query name and the anchor.
    ///
    /// Only forward matches (`+` strand, `>` orientations) are accepted.
    pub fn from_gaf(line: &str, efg: &Efg) -> Result<(String, Anchor), EfgError> {
        let fields: Vec<&str> = line.trim_end().split('\t').collect();
        if fields.len() < 9 {
            return Err(EfgError::record(line, "expected at least 9 fields"));
        }

        let int = |i: usize| -> Result<i64, EfgError> {
            fields[i]
                .parse::<i64>()
                .map_err(|_| EfgError::record(line, format!("invalid integer `{}`", fields[i])))
        };

        if fields[4] != "+" {
            return Err(EfgError::record(line, "only forward strand matches are supported"));
        }
        let path_str = fields[5];
        if !path_str.starts_with('>') || path_str.contains('<') {
            return Err(EfgError::record(line, "only forward oriented paths are supported"));
        }
        let path = path_str
            .split('>')
            .filter(|s| !s.is_empty())
            .map(|s| efg.node(s))
            .collect::<Result<Vec<_>, _>>()?;
        if path.is_empty() {
            return Err(EfgError::record(line, "empty path"));
        }

        let anchor = Anchor::new(int(1)?, int(2)?, int(3)?, path, int(6)?, int(7)?, int(8)?);

        Ok((query_id(line).to_string(), anchor))
    }

    /// GAF line with placeholder residue matches, block length and mapping quality.
    pub fn to_gaf(&self, efg: &Efg, qname: &str) -> String {
        let path: String = self
            .path
            .iter()
            .zip(&self.orientations)
            .map(|(&node, &forward)| format!("{}{}", if forward { '>' } else { '<' }, efg.id(node)))
            .collect();

        format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t0\t0\t255",
            qname,
            self.qlength,
            self.qstart,
            self.qend,
            if self.strand { '+' } else { '-' },
            path,
            self.plength,
            self.pstart,
            self.pend,
        )
    }

    /// Sentinel placed before every real anchor of a query.
    pub fn dummy_start(qlength: i64, efg: &Efg) -> Self {
        Anchor::new(qlength, -1, 0, vec![efg.dummy_start_node()], 0, 0, 0)
    }

    /// Sentinel placed after every real anchor of a query.
    pub fn dummy_end(qlength: i64, efg: &Efg) -> Self {
        Anchor::new(qlength, qlength, qlength + 1, vec![efg.dummy_end_node()], 0, 0, 0)
    }

    pub fn first_node(&self) -> NodeId {
        self.path[0]
    }

    pub fn last_node(&self) -> NodeId {
        self.path[self.path.len() - 1]
    }

    /// Number of query characters between the end of `self` and the start of `other`;
    /// negative when they overlap.
    pub fn gap_query(&self, other: &Anchor) -> i64 {
        other.qstart - self.qend
    }

    /// Mirrors the match onto the reverse complement of the query and of the path.
    pub fn reverse(&mut self) {
        let (qstart, qend) = (self.qlength - self.qend, self.qlength - self.qstart);
        self.qstart = qstart;
        self.qend = qend;

        let (pstart, pend) = (self.plength - self.pend, self.plength - self.pstart);
        self.pstart = pstart;
        self.pend = pend;

        self.path.reverse();
        self.orientations.reverse();
        for o in self.orientations.iter_mut() {
            *o = !*o;
        }
    }

    /// Splits the match into a perfect chain of matches, each spanning exactly one node.
    pub fn split(&self, efg: &Efg, policy: SplitPolicy) -> Vec<Anchor> {
        let mut pieces = Vec::with_capacity(self.path.len());
        let mut qstart = self.qstart;
        let mut pstart = self.pstart;
        let mut pend = self.pend;

        for (&node, &forward) in self.path.iter().zip(&self.orientations) {
            let node_length = efg.label_length(node);
            if pstart >= node_length || pend <= 0 {
                // the match does not touch this node
                pstart = (pstart - node_length).max(0);
                pend -= node_length;
                continue;
            }

            let node_end = node_length.min(pend);
            let match_length = node_end - pstart;
            if policy == SplitPolicy::KeepAll || match_length > 1 {
                pieces.push(Anchor {
                    qlength: self.qlength,
                    qstart,
                    qend: qstart + match_length,
                    strand: self.strand,
                    path: vec![node],
                    orientations: vec![forward],
                    plength: node_length,
                    pstart,
                    pend: node_end,
                });
            }

            qstart += match_length;
            pstart = 0;
            pend -= node_length;
        }

        pieces
    }
}

/// Whether the anchors are ordered by query start.
pub fn is_sorted(anchors: &[Anchor]) -> bool {
    anchors
        .iter()
        .tuple_windows()
        .all(|(a, b)| a.qstart <= b.qstart)
}
