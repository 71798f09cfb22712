//! Subcommand modules for the `efgchain` binary.

pub mod chain;
pub mod split;

use anyhow::Context;

/// Loads the graph at `infile`, with the distance index built.
pub fn load_graph(infile: &str) -> anyhow::Result<efgchain::libs::efg::Efg> {
    log::info!("Reading the graph {}...", infile);
    let reader = efgchain::reader(infile)?;
    let mut efg = efgchain::libs::efg::Efg::from_reader(reader)
        .with_context(|| format!("could not load the graph {}", infile))?;
    log::info!(
        "{} blocks, {} nodes, {} edges",
        efg.num_blocks(),
        efg.num_nodes(),
        efg.num_edges()
    );

    log::info!("Indexing the graph...");
    efg.init_eds_support();

    Ok(efg)
}
