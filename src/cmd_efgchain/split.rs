use clap::*;
use efgchain::libs::anchor::{Anchor, SplitPolicy};
use efgchain::libs::pipeline::REVERSE_PREFIX;
use std::io::{BufRead, Write};

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("split")
        .about("Splits GAF records into one record per graph node")
        .after_help(
            r###"
Each record is cut at node boundaries, so that every output record spans exactly one
node of the graph. Query and path coordinates are recomputed for each piece.

Notes:
* Supports both plain text and gzipped (.gz) files
* Reads records from stdin if the input file is 'stdin'
* Records of any path length are accepted, forward strand only
* Pieces of length 1 are dropped unless --keep-single is set
* Queries named `rev_*` are mirrored and reported without the prefix

Examples:
1. Split records for GraphAligner:
   efgchain split tests/efg/two_blocks.gfa tests/efg/two_blocks.gaf

2. Keep the pieces of length 1:
   efgchain split graph.gfa anchors.gaf --keep-single -o split.gaf

"###,
        )
        .arg(
            Arg::new("graph")
                .required(true)
                .num_args(1)
                .index(1)
                .help("The elastic founder graph"),
        )
        .arg(
            Arg::new("infile")
                .required(true)
                .num_args(1)
                .index(2)
                .help("The records in GAF format"),
        )
        .arg(
            Arg::new("keep_single")
                .long("keep-single")
                .action(ArgAction::SetTrue)
                .help("Keep pieces of length 1"),
        )
        .arg(
            Arg::new("outfile")
                .long("outfile")
                .short('o')
                .num_args(1)
                .default_value("stdout")
                .help("Output filename. [stdout] for screen"),
        )
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    //----------------------------
    // Args
    //----------------------------
    let policy = if args.get_flag("keep_single") {
        SplitPolicy::KeepAll
    } else {
        SplitPolicy::DropSingle
    };

    let efg = super::load_graph(args.get_one::<String>("graph").unwrap())?;
    let reader = efgchain::reader(args.get_one::<String>("infile").unwrap())?;
    let mut writer = efgchain::writer(args.get_one::<String>("outfile").unwrap())?;

    //----------------------------
    // Operating
    //----------------------------
    log::info!("Splitting the records...");
    let mut records = 0;
    let mut pieces = 0;
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let (qname, mut anchor) = Anchor::from_gaf(&line, &efg)?;
        let qname = match qname.strip_prefix(REVERSE_PREFIX) {
            Some(stripped) => {
                anchor.reverse();
                stripped
            }
            None => qname.as_str(),
        };

        for piece in anchor.split(&efg, policy) {
            writeln!(writer, "{}", piece.to_gaf(&efg, qname))?;
            pieces += 1;
        }
        records += 1;
    }
    writer.flush()?;
    log::info!("{} records split into {} pieces", records, pieces);

    Ok(())
}
