extern crate clap;
use clap::*;

mod cmd_efgchain;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let app = Command::new("efgchain")
        .version(crate_version!())
        .author(crate_authors!())
        .about("`efgchain` - Colinear chaining of anchors on Elastic Founder Graphs")
        .propagate_version(true)
        .arg_required_else_help(true)
        .color(ColorChoice::Auto)
        .subcommand(cmd_efgchain::chain::make_subcommand())
        .subcommand(cmd_efgchain::split::make_subcommand())
        .after_help(
            r###"Subcommands:

* chain - Chain GAF anchors against an EFG, globally or semiglobally
* split - Split GAF records into one record per graph node

Log verbosity is controlled by RUST_LOG (default: info).

"###,
        );

    // Check which subcomamnd the user ran...
    match app.get_matches().subcommand() {
        Some(("chain", sub_matches)) => cmd_efgchain::chain::execute(sub_matches),
        Some(("split", sub_matches)) => cmd_efgchain::split::execute(sub_matches),
        _ => unreachable!(),
    }?;

    Ok(())
}
