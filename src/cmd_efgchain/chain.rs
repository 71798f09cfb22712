use clap::*;
use efgchain::libs::anchor::SplitPolicy;
use efgchain::libs::chaining::{ChainMode, ChainParams, InitialGuess};
use efgchain::libs::pipeline::{self, ChainOpts, OutputMode};

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("chain")
        .about("Chains GAF anchors against an elastic founder graph")
        .after_help(
            r###"
Computes, for every query, a colinear chain of anchors of minimum cost, where the cost of
an edge combines the gap and the overlap between two anchors, measured both in the query
and in the graph.

Notes:
* Supports both plain text and gzipped (.gz) files
* Reads anchors from stdin if the input file is 'stdin'
* Exactly one of --global or --semi-global is required
    * --global penalizes the query regions before the first and after the last anchor
    * --semi-global only counts their length
* Anchors must span at most two graph nodes, forward strand only
* By default, the anchors of a query must be contiguous in the input
    * --unsorted-input reads all the anchors into memory first
* Queries named `rev_*` are mirrored and reported without the prefix
* Supports parallel processing
    * 1 reader, 1 writer and the corresponding number of workers
    * The order of queries in the output may differ from the input
    * `--parallel 0` chains on a single thread, without the pipeline
* The distance bound starts at --initial-guess, or at
  `qlength - coverage * --initial-guess-coverage` when the latter is not 0,
  and is multiplied by --ramp-up-factor until the optimal chain fits in it

Examples:
1. Chain anchors globally:
   efgchain chain tests/efg/two_blocks.gfa tests/efg/two_blocks.gaf --global

2. Semiglobal chaining with 4 workers, unsplit output:
   efgchain chain graph.gfa anchors.gaf --semi-global -p 4 --no-split

3. Anchors in arbitrary order, with statistics:
   efgchain chain graph.gfa anchors.gaf --global --unsorted-input --stats

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
            Arg::new("anchors")
                .required(true)
                .num_args(1)
                .index(2)
                .help("The anchors in GAF format"),
        )
        .arg(
            Arg::new("global")
                .long("global")
                .action(ArgAction::SetTrue)
                .help("Global chaining"),
        )
        .arg(
            Arg::new("semi_global")
                .long("semi-global")
                .action(ArgAction::SetTrue)
                .help("Semiglobal chaining, free leading and trailing query gaps"),
        )
        .group(
            ArgGroup::new("mode")
                .args(["global", "semi_global"])
                .required(true)
                .multiple(false),
        )
        .arg(
            Arg::new("initial_guess")
                .long("initial-guess")
                .value_parser(value_parser!(i64))
                .num_args(1)
                .default_value("100")
                .help("Initial distance bound"),
        )
        .arg(
            Arg::new("initial_guess_coverage")
                .long("initial-guess-coverage")
                .value_parser(value_parser!(f64))
                .num_args(1)
                .default_value("0")
                .help("Derive the initial bound from the anchor coverage, scaled by this factor"),
        )
        .arg(
            Arg::new("ramp_up_factor")
                .long("ramp-up-factor")
                .value_parser(value_parser!(f64))
                .num_args(1)
                .default_value("4.0")
                .help("Multiplier of the distance bound on each revision"),
        )
        .arg(
            Arg::new("max_revisions")
                .long("max-revisions")
                .value_parser(value_parser!(u32))
                .num_args(1)
                .help("Give up on a query after this many bound revisions"),
        )
        .arg(
            Arg::new("alternative_chains")
                .long("alternative-chains")
                .value_parser(value_parser!(usize))
                .num_args(1)
                .default_value("0")
                .help("Extract this many disjoint chains before the last one"),
        )
        .arg(
            Arg::new("unsorted_input")
                .long("unsorted-input")
                .action(ArgAction::SetTrue)
                .help("The anchors of a query are not contiguous in the input"),
        )
        .arg(
            Arg::new("no_split")
                .long("no-split")
                .action(ArgAction::SetTrue)
                .help("Do not split the chained anchors into one record per node"),
        )
        .arg(
            Arg::new("split_drop_single")
                .long("split-drop-single")
                .action(ArgAction::SetTrue)
                .conflicts_with("no_split")
                .help("Drop split records of length 1"),
        )
        .arg(
            Arg::new("stats")
                .long("stats")
                .action(ArgAction::SetTrue)
                .help("Print chaining statistics to stderr"),
        )
        .arg(
            Arg::new("parallel")
                .long("parallel")
                .short('p')
                .value_parser(value_parser!(usize))
                .num_args(1)
                .default_value("1")
                .help("Number of chaining threads, 0 for no pipeline"),
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

fn chain_opts(args: &ArgMatches) -> anyhow::Result<ChainOpts> {
    let mode = if args.get_flag("semi_global") {
        ChainMode::SemiGlobal
    } else {
        ChainMode::Global
    };

    let coverage = *args.get_one::<f64>("initial_guess_coverage").unwrap();
    if coverage < 0.0 {
        anyhow::bail!("--initial-guess-coverage must not be negative");
    }
    let initial_guess = if coverage == 0.0 {
        InitialGuess::Constant(*args.get_one::<i64>("initial_guess").unwrap())
    } else {
        InitialGuess::Coverage(coverage)
    };

    let ramp_up_factor = *args.get_one::<f64>("ramp_up_factor").unwrap();
    if ramp_up_factor <= 1.0 {
        anyhow::bail!("--ramp-up-factor must be greater than 1");
    }

    let output = if args.get_flag("no_split") {
        OutputMode::NoSplit
    } else if args.get_flag("split_drop_single") {
        OutputMode::Split(SplitPolicy::DropSingle)
    } else {
        OutputMode::Split(SplitPolicy::KeepAll)
    };

    Ok(ChainOpts {
        params: ChainParams {
            mode,
            initial_guess,
            ramp_up_factor,
            alternative_chains: *args.get_one::<usize>("alternative_chains").unwrap(),
            max_revisions: args.get_one::<u32>("max_revisions").copied(),
        },
        threads: *args.get_one::<usize>("parallel").unwrap(),
        unsorted_input: args.get_flag("unsorted_input"),
        output,
        ..Default::default()
    })
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    //----------------------------
    // Args
    //----------------------------
    let opts = chain_opts(args)?;
    let infile = args.get_one::<String>("anchors").unwrap();

    //----------------------------
    // Operating
    //----------------------------
    let efg = super::load_graph(args.get_one::<String>("graph").unwrap())?;

    let reader = efgchain::reader(infile)?;
    let mut writer = efgchain::writer(args.get_one::<String>("outfile").unwrap())?;

    log::info!(
        "Chaining the anchors of {} ({:?}, {} threads)...",
        infile,
        opts.params.mode,
        opts.threads
    );
    let stats = pipeline::run(&efg, reader, &mut writer, &opts)?;
    log::info!("Chained {} anchors of {} queries", stats.seeds, stats.reads);

    //----------------------------
    // Output
    //----------------------------
    if args.get_flag("stats") {
        eprintln!("{}", stats);
    }

    Ok(())
}
