//! Elastic founder graphs.
//!
//! An elastic founder graph (EFG) is a sequence of blocks, each block holding a set of
//! mutually exclusive nodes ("founder segments"). Nodes are stored in block order, so the
//! block of a node follows from the cumulative block heights.
//!
//! Two sentinel node ids bracket every graph: [`Efg::dummy_start_node`] (`-1`, before the
//! first block) and [`Efg::dummy_end_node`] (`#nodes`, after the last block). They are never
//! stored as real nodes.

use crate::libs::error::EfgError;
use fxhash::FxHashMap;
use std::io::BufRead;

/// 0-based node index; `-1` and `#nodes` are the sentinels.
pub type NodeId = i64;

/// 0-based block index; `-1` and `#blocks` are the sentinel blocks.
pub type BlockId = i64;

#[derive(Debug, Clone, Default)]
pub struct Efg {
    cuts: Vec<i64>,
    heights: Vec<usize>,
    node_ids: Vec<String>,
    node_indexes: FxHashMap<String, usize>,
    labels: Vec<String>,
    edges: FxHashMap<usize, Vec<usize>>,
    block: Vec<BlockId>,
    // shortest_to_block_end[i]: sum of the shortest label of every block 0..=i
    shortest_to_block_end: Vec<i64>,
}

impl Efg {
    /// Builds a graph directly from blocks of `(id, label)` pairs and an edge list.
    /// Every block gets a cut position equal to its starting column.
    pub fn from_blocks(blocks: &[Vec<(&str, &str)>], edges: &[(&str, &str)]) -> Result<Self, EfgError> {
        let mut efg = Efg::default();
        let mut col = 0;
        for block in blocks {
            efg.cuts.push(col);
            efg.heights.push(block.len());
            let mut width = 0;
            for (id, label) in block {
                efg.push_node(id, label);
                width = width.max(label.len() as i64);
            }
            col += width;
        }
        for (from, to) in edges {
            efg.push_edge(from, to);
        }
        efg.finish()?;

        Ok(efg)
    }

    /// Reads the tab separated EFG description (`M`, `X`, `B`, `S`, `L` and `P` lines).
    pub fn from_reader(reader: impl BufRead) -> Result<Self, EfgError> {
        let mut efg = Efg::default();

        for line in reader.lines() {
            let line = line?;
            let fields: Vec<&str> = line.split('\t').filter(|f| !f.is_empty()).collect();
            if fields.is_empty() {
                continue;
            }

            match fields[0] {
                "M" => {
                    if fields.len() < 3 {
                        return Err(EfgError::Graph(format!("malformed header `{}`", line)));
                    }
                    let rows: usize = parse_field(fields[1], &line)?;
                    let cols: usize = parse_field(fields[2], &line)?;
                    log::debug!("founder matrix of {} rows and {} columns", rows, cols);
                }
                "X" => {
                    efg.cuts = fields[1..]
                        .iter()
                        .map(|f| parse_field(f, &line))
                        .collect::<Result<_, _>>()?;
                }
                "B" => {
                    efg.heights = fields[1..]
                        .iter()
                        .map(|f| parse_field(f, &line))
                        .collect::<Result<_, _>>()?;
                }
                "S" => {
                    if fields.len() < 3 {
                        return Err(EfgError::Graph(format!("node without label `{}`", line)));
                    }
                    efg.push_node(fields[1], fields[2]);
                }
                "L" => {
                    if fields.len() < 4 {
                        return Err(EfgError::Graph(format!("malformed edge `{}`", line)));
                    }
                    efg.push_edge(fields[1], fields[3]);
                }
                "P" => {}
                other => log::warn!("Unrecognized line {}: skipping...", other),
            }
        }
        efg.finish()?;

        Ok(efg)
    }

    fn push_node(&mut self, id: &str, label: &str) {
        if let Some(&idx) = self.node_indexes.get(id) {
            self.node_ids[idx] = id.to_string();
            self.labels[idx] = label.to_string();
        } else {
            self.node_indexes.insert(id.to_string(), self.node_ids.len());
            self.node_ids.push(id.to_string());
            self.labels.push(label.to_string());
        }
    }

    // Edges may mention nodes before their S line; those get a placeholder slot.
    fn push_edge(&mut self, from: &str, to: &str) {
        let mut index_of = |id: &str| -> usize {
            if let Some(&idx) = self.node_indexes.get(id) {
                idx
            } else {
                let idx = self.node_ids.len();
                self.node_indexes.insert(id.to_string(), idx);
                self.node_ids.push(id.to_string());
                self.labels.push(String::new());
                idx
            }
        };
        let (u, v) = (index_of(from), index_of(to));
        self.edges.entry(u).or_default().push(v);
    }

    fn finish(&mut self) -> Result<(), EfgError> {
        if self.heights.len() != self.cuts.len() {
            return Err(EfgError::Graph(format!(
                "number of cuts ({}) and blocks ({}) mismatch",
                self.cuts.len(),
                self.heights.len()
            )));
        }
        let block_sum: usize = self.heights.iter().sum();
        if block_sum != self.node_ids.len() {
            return Err(EfgError::Graph(format!(
                "sum of block heights ({}) does not correspond to node number ({})",
                block_sum,
                self.node_ids.len()
            )));
        }
        if let Some(i) = self.labels.iter().position(|l| l.is_empty()) {
            return Err(EfgError::Graph(format!("node {} has no label", self.node_ids[i])));
        }

        self.block = self
            .heights
            .iter()
            .enumerate()
            .flat_map(|(b, &h)| std::iter::repeat(b as BlockId).take(h))
            .collect();

        Ok(())
    }

    /// Builds the lower-bound distance index used by the chaining cost functions.
    pub fn init_eds_support(&mut self) {
        let mut shortest = Vec::with_capacity(self.heights.len());
        let mut total = 0;
        let mut node = 0;
        for &h in &self.heights {
            let min = self.labels[node..node + h]
                .iter()
                .map(|l| l.len() as i64)
                .min()
                .unwrap_or(0);
            total += min;
            shortest.push(total);
            node += h;
        }
        log::debug!("shortest path lengths from the start to each block end: {:?}", shortest);
        self.shortest_to_block_end = shortest;
    }

    fn is_indexed(&self) -> bool {
        self.shortest_to_block_end.len() == self.heights.len()
    }

    pub fn num_blocks(&self) -> usize {
        self.heights.len()
    }

    pub fn num_nodes(&self) -> usize {
        self.node_ids.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.values().map(|v| v.len()).sum()
    }

    #[cfg(test)]
    pub(crate) fn successors(&self, node: NodeId) -> &[usize] {
        usize::try_from(node)
            .ok()
            .and_then(|n| self.edges.get(&n))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn dummy_start_node(&self) -> NodeId {
        -1
    }

    pub fn dummy_end_node(&self) -> NodeId {
        self.node_ids.len() as NodeId
    }

    /// Resolves a node id string to its index.
    pub fn node(&self, id: &str) -> Result<NodeId, EfgError> {
        self.node_indexes
            .get(id)
            .map(|&i| i as NodeId)
            .ok_or_else(|| EfgError::UnknownNode(id.to_string()))
    }

    /// The id string of a node, `dummystart` / `dummyend` for the sentinels.
    pub fn id(&self, node: NodeId) -> &str {
        if node < 0 {
            "dummystart"
        } else if node >= self.dummy_end_node() {
            "dummyend"
        } else {
            &self.node_ids[node as usize]
        }
    }

    pub fn label_length(&self, node: NodeId) -> i64 {
        debug_assert!(node >= 0 && node < self.dummy_end_node());
        self.labels[node as usize].len() as i64
    }

    /// Block of a node; `-1` for the start sentinel and `#blocks` for the end sentinel.
    pub fn block_of(&self, node: NodeId) -> BlockId {
        if node < 0 {
            -1
        } else if node >= self.dummy_end_node() {
            self.heights.len() as BlockId
        } else {
            self.block[node as usize]
        }
    }

    pub fn shortest_to_block_end(&self, block: BlockId) -> i64 {
        debug_assert!(self.is_indexed(), "init_eds_support() has not been called");
        self.shortest_to_block_end[block as usize]
    }

    /// Lower bound on the length of a graph path spelling blocks `b1..=b2`.
    pub fn shortest_path(&self, b1: BlockId, b2: BlockId) -> i64 {
        if b1 > b2 {
            0
        } else if b1 <= 0 {
            self.shortest_to_block_end(b2)
        } else {
            self.shortest_to_block_end(b2) - self.shortest_to_block_end(b1 - 1)
        }
    }
}

fn parse_field<T: std::str::FromStr>(field: &str, line: &str) -> Result<T, EfgError> {
    field
        .parse::<T>()
        .map_err(|_| EfgError::Graph(format!("invalid number `{}` in line `{}`", field, line)))
}
