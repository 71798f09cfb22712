use std::fmt;

/// Run statistics, one accumulator per worker, merged once the workers are done.
#[derive(Debug, Clone, PartialEq)]
pub struct Stats {
    pub seeds: u64,
    pub reads: u64,

    pub max_revisions: u32,
    pub min_revisions: u32,
    pub total_revisions: u64,

    pub max_cost: i64,
    pub min_cost: i64,
    pub total_cost: i64,

    pub max_relative_cost: f64,
    pub min_relative_cost: f64,
    pub total_relative_cost: f64,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            seeds: 0,
            reads: 0,
            max_revisions: 0,
            min_revisions: u32::MAX,
            total_revisions: 0,
            max_cost: 0,
            min_cost: i64::MAX,
            total_cost: 0,
            max_relative_cost: 0.0,
            min_relative_cost: f64::MAX,
            total_relative_cost: 0.0,
        }
    }
}

impl Stats {
    pub fn new() -> Self {
        Default::default()
    }

    /// Folds the outcome of one chaining run into the statistics.
    pub fn add_chain(&mut self, cost: i64, revisions: u32, qlength: i64) {
        self.max_revisions = self.max_revisions.max(revisions);
        self.min_revisions = self.min_revisions.min(revisions);
        self.total_revisions += revisions as u64;

        self.max_cost = self.max_cost.max(cost);
        self.min_cost = self.min_cost.min(cost);
        self.total_cost += cost;

        let relative = cost as f64 / qlength.max(1) as f64;
        self.max_relative_cost = self.max_relative_cost.max(relative);
        self.min_relative_cost = self.min_relative_cost.min(relative);
        self.total_relative_cost += relative;
    }

    pub fn merge(&self, other: &Stats) -> Stats {
        Stats {
            seeds: self.seeds + other.seeds,
            reads: self.reads + other.reads,
            max_revisions: self.max_revisions.max(other.max_revisions),
            min_revisions: self.min_revisions.min(other.min_revisions),
            total_revisions: self.total_revisions + other.total_revisions,
            max_cost: self.max_cost.max(other.max_cost),
            min_cost: self.min_cost.min(other.min_cost),
            total_cost: self.total_cost + other.total_cost,
            max_relative_cost: self.max_relative_cost.max(other.max_relative_cost),
            min_relative_cost: self.min_relative_cost.min(other.min_relative_cost),
            total_relative_cost: self.total_relative_cost + other.total_relative_cost,
        }
    }

    fn average(&self, total: f64) -> f64 {
        if self.reads == 0 {
            0.0
        } else {
            total / self.reads as f64
        }
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // an empty run keeps the sentinel minima
        let min_revisions = if self.min_revisions == u32::MAX { 0 } else { self.min_revisions };
        let min_cost = if self.min_cost == i64::MAX { 0 } else { self.min_cost };
        let min_relative = if self.min_relative_cost == f64::MAX {
            0.0
        } else {
            self.min_relative_cost
        };

        writeln!(f, "chained {} seeds for {} reads", self.seeds, self.reads)?;
        writeln!(f, "min number of revisions is {}", min_revisions)?;
        writeln!(f, "max number of revisions is {}", self.max_revisions)?;
        writeln!(
            f,
            "average number of revisions is {}",
            self.average(self.total_revisions as f64)
        )?;
        writeln!(f, "min chaining cost is {}", min_cost)?;
        writeln!(f, "max chaining cost is {}", self.max_cost)?;
        writeln!(f, "average chaining cost is {}", self.average(self.total_cost as f64))?;
        writeln!(f, "min relative chaining cost is {}", min_relative)?;
        writeln!(f, "max relative chaining cost is {}", self.max_relative_cost)?;
        write!(
            f,
            "average relative chaining cost is {}",
            self.average(self.total_relative_cost)
        )
    }
}
