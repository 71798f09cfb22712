//! Reading anchors query by query, chaining them on worker threads and writing the chains.
//!
//! Anchors arrive either as a stream in which the records of a query are contiguous, or, with
//! `unsorted_input`, as an arbitrary order that is bucketed in memory first. One reader thread
//! feeds a bounded task channel, `threads` workers chain one query at a time and push
//! formatted GAF lines to a bounded output channel, and the calling thread writes them.

use crate::libs::anchor::{self, Anchor, SplitPolicy};
use crate::libs::chaining::{chain_anchors, ChainParams, Stats};
use crate::libs::efg::Efg;
use crate::libs::error::EfgError;
use anyhow::{anyhow, Context};
use crossbeam::channel::Receiver;
use fxhash::FxHashSet;
use indexmap::IndexMap;
use std::io::{BufRead, Write};

/// Query ids carrying this prefix were matched on the reverse complement.
pub const REVERSE_PREFIX: &str = "rev_";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Chained anchors as they are
    NoSplit,
    /// One record per graph node
    Split(SplitPolicy),
}

#[derive(Debug, Clone)]
pub struct ChainOpts {
    pub params: ChainParams,
    /// Number of chaining workers; `0` chains on the calling thread without any pipeline
    pub threads: usize,
    pub unsorted_input: bool,
    pub output: OutputMode,
    /// Capacity of the task and output channels
    pub queue_capacity: usize,
}

impl Default for ChainOpts {
    fn default() -> Self {
        Self {
            params: ChainParams::default(),
            threads: 1,
            unsorted_input: false,
            output: OutputMode::Split(SplitPolicy::KeepAll),
            queue_capacity: 64,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Batch {
    /// Raw GAF lines, parsed by the worker
    Lines(Vec<String>),
    /// Parsed anchors, the dummy start first
    Anchors(Vec<Anchor>),
}

/// All anchors of one query.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub query: String,
    pub batch: Batch,
}

// Chaining only handles matches spanning at most two nodes
fn parse_anchor(line: &str, efg: &Efg) -> Result<(String, Anchor), EfgError> {
    let (qname, anchor) = Anchor::from_gaf(line, efg)?;
    if anchor.path.len() > 2 {
        return Err(EfgError::record(
            line,
            "paths longer than two nodes are not supported",
        ));
    }

    Ok((qname, anchor))
}

/// Reads the whole anchor stream and groups it by query id, in first-seen order.
/// Every bucket starts with a dummy start anchor.
pub fn read_buckets(reader: impl BufRead, efg: &Efg) -> anyhow::Result<IndexMap<String, Vec<Anchor>>> {
    let mut buckets: IndexMap<String, Vec<Anchor>> = IndexMap::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let (qname, anchor) =
            parse_anchor(&line, efg).with_context(|| format!("line {}", i + 1))?;

        buckets
            .entry(qname)
            .or_insert_with(|| vec![Anchor::dummy_start(anchor.qlength, efg)])
            .push(anchor);
    }

    Ok(buckets)
}

/// Groups consecutive lines with the same query id into tasks.
///
/// A query id showing up again after another one is an error: its anchors would be chained
/// in two separate, incomplete runs.
pub struct QueryGroups<R> {
    lines: std::io::Lines<R>,
    pending: Option<(String, Vec<String>)>,
    seen: FxHashSet<String>,
    done: bool,
}

impl<R: BufRead> QueryGroups<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            pending: None,
            seen: FxHashSet::default(),
            done: false,
        }
    }

    fn take_pending(&mut self) -> Option<Task> {
        self.pending.take().map(|(query, lines)| Task {
            query,
            batch: Batch::Lines(lines),
        })
    }
}

impl<R: BufRead> Iterator for QueryGroups<R> {
    type Item = anyhow::Result<Task>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            let line = match self.lines.next() {
                None => {
                    self.done = true;
                    return self.take_pending().map(Ok);
                }
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e.into()));
                }
                Some(Ok(line)) => line,
            };
            if line.trim().is_empty() {
                continue;
            }

            let id = anchor::query_id(&line).to_string();
            if let Some((query, lines)) = self.pending.as_mut() {
                if *query == id {
                    lines.push(line);
                    continue;
                }
            }

            if !self.seen.insert(id.clone()) {
                self.done = true;
                return Some(Err(EfgError::NonContiguousQuery(id).into()));
            }
            let finished = self.take_pending();
            self.pending = Some((id, vec![line]));
            if finished.is_some() {
                return finished.map(Ok);
            }
        }
    }
}

type TaskIter<'a> = Box<dyn Iterator<Item = anyhow::Result<Task>> + Send + 'a>;

fn tasks<'a, R: BufRead + Send + 'a>(reader: R, efg: &Efg, opts: &ChainOpts) -> anyhow::Result<TaskIter<'a>> {
    if opts.unsorted_input {
        let buckets = read_buckets(reader, efg)?;
        log::info!(
            "Read {} anchors of {} queries",
            buckets.values().map(|b| b.len() - 1).sum::<usize>(),
            buckets.len()
        );
        Ok(Box::new(buckets.into_iter().map(|(query, anchors)| {
            Ok(Task {
                query,
                batch: Batch::Anchors(anchors),
            })
        })))
    } else {
        Ok(Box::new(QueryGroups::new(reader)))
    }
}

/// Chains one query at a time and keeps its own statistics.
pub struct ChainWorker<'a> {
    efg: &'a Efg,
    opts: &'a ChainOpts,
    pub stats: Stats,
    warned_unsorted: bool,
}

impl<'a> ChainWorker<'a> {
    pub fn new(efg: &'a Efg, opts: &'a ChainOpts) -> Self {
        Self {
            efg,
            opts,
            stats: Stats::new(),
            warned_unsorted: false,
        }
    }

    fn anchors_of(&self, batch: Batch) -> Result<Vec<Anchor>, EfgError> {
        match batch {
            Batch::Anchors(anchors) => Ok(anchors),
            Batch::Lines(lines) => {
                let mut anchors = Vec::with_capacity(lines.len() + 2);
                for line in &lines {
                    let (_, anchor) = parse_anchor(line, self.efg)?;
                    if anchors.is_empty() {
                        anchors.push(Anchor::dummy_start(anchor.qlength, self.efg));
                    }
                    anchors.push(anchor);
                }
                Ok(anchors)
            }
        }
    }

    /// Chains the anchors of `task` and returns the output GAF lines.
    pub fn process(&mut self, task: Task) -> anyhow::Result<Vec<String>> {
        let efg = self.efg;
        let mut anchors = self
            .anchors_of(task.batch)
            .with_context(|| format!("query {}", task.query))?;
        if anchors.len() < 2 {
            return Ok(vec![]);
        }

        anchors.push(Anchor::dummy_end(anchors[0].qlength, efg));
        let n = anchors.len();
        self.stats.reads += 1;
        self.stats.seeds += (n - 2) as u64;

        if !anchor::is_sorted(&anchors[1..n - 1]) {
            if !self.warned_unsorted {
                log::warn!("Anchors are not sorted by query start (first seen in {}), sorting...", task.query);
                self.warned_unsorted = true;
            }
            anchors[1..n - 1].sort_by_key(|a| a.qstart);
        }
        log::debug!(
            "{}: {:?}",
            task.query,
            anchors.iter().map(|a| (a.qstart, a.qend)).collect::<Vec<_>>()
        );

        let solution = match chain_anchors(&mut anchors, efg, &self.opts.params, &mut self.stats) {
            Ok(solution) => solution,
            Err(e @ EfgError::NoFeasibleChain { .. }) => {
                log::warn!("{}: {}", task.query, e);
                return Ok(vec![]);
            }
            Err(e) => return Err(e.into()),
        };

        let (qname, reverse) = match task.query.strip_prefix(REVERSE_PREFIX) {
            Some(stripped) => (stripped, true),
            None => (task.query.as_str(), false),
        };

        let mut out = Vec::with_capacity(solution.len());
        for mut a in solution {
            if reverse {
                a.reverse();
            }
            match self.opts.output {
                OutputMode::NoSplit => out.push(a.to_gaf(efg, qname)),
                OutputMode::Split(policy) => {
                    out.extend(a.split(efg, policy).iter().map(|p| p.to_gaf(efg, qname)))
                }
            }
        }

        Ok(out)
    }
}

fn write_lines<W: Write>(rcv: Receiver<Vec<String>>, writer: &mut W) -> anyhow::Result<()> {
    for lines in rcv.iter() {
        for line in lines {
            writeln!(writer, "{}", line)?;
        }
    }
    writer.flush()?;

    Ok(())
}

/// Chains every query of `reader` and writes the chains to `writer`.
/// Returns the statistics merged over all workers.
///
/// `efg` must be indexed with [`Efg::init_eds_support`].
pub fn run<R, W>(efg: &Efg, reader: R, writer: &mut W, opts: &ChainOpts) -> anyhow::Result<Stats>
where
    R: BufRead + Send,
    W: Write,
{
    let tasks = tasks(reader, efg, opts)?;

    if opts.threads == 0 {
        let mut worker = ChainWorker::new(efg, opts);
        for task in tasks {
            for line in worker.process(task?)? {
                writeln!(writer, "{}", line)?;
            }
        }
        writer.flush()?;
        return Ok(worker.stats);
    }

    // Channel 1 - Tasks
    let (snd1, rcv1) = crossbeam::channel::bounded::<Task>(opts.queue_capacity);
    // Channel 2 - Formatted chains
    let (snd2, rcv2) = crossbeam::channel::bounded::<Vec<String>>(opts.queue_capacity);

    crossbeam::scope(|s| -> anyhow::Result<Stats> {
        //----------------------------
        // Reader thread
        //----------------------------
        let reader = s.spawn(move |_| -> anyhow::Result<()> {
            for task in tasks {
                // every worker is gone
                if snd1.send(task?).is_err() {
                    break;
                }
            }
            Ok(())
        });

        //----------------------------
        // Worker threads
        //----------------------------
        let mut workers = Vec::with_capacity(opts.threads);
        for _ in 0..opts.threads {
            let (sendr, recvr) = (snd2.clone(), rcv1.clone());
            workers.push(s.spawn(move |_| -> anyhow::Result<Stats> {
                let mut worker = ChainWorker::new(efg, opts);
                for task in recvr.iter() {
                    let lines = worker.process(task)?;
                    if !lines.is_empty() && sendr.send(lines).is_err() {
                        break;
                    }
                }
                Ok(worker.stats)
            }));
        }
        drop(rcv1);
        // Close the channel, otherwise the writer never exits the loop
        drop(snd2);

        //----------------------------
        // Writer
        //----------------------------
        let written = write_lines(rcv2, writer);

        reader
            .join()
            .map_err(|_| anyhow!("reader thread panicked"))??;
        let mut stats = Stats::new();
        for worker in workers {
            let worker_stats = worker
                .join()
                .map_err(|_| anyhow!("chaining thread panicked"))??;
            stats = stats.merge(&worker_stats);
        }
        written?;

        Ok(stats)
    })
    .map_err(|_| anyhow!("chaining pipeline panicked"))?
}
