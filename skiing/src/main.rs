use std::{path::PathBuf, process::ExitCode};

use anyhow::Result;
use clap::{Parser, ValueEnum};
use skiing::{find_best_routes, load_grid, ParentRule, Report, Roots, SearchConfig, Selection};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Select {
    /// Keep the longest runs with the smallest drop.
    MaxSteepness,
    /// Keep the longest runs with the largest drop.
    MaxDrop,
    /// Keep every longest run.
    AllLongest,
}

impl From<Select> for Selection {
    fn from(select: Select) -> Self {
        match select {
            Select::MaxSteepness => Selection::MaxSteepness,
            Select::MaxDrop => Selection::MaxDrop,
            Select::AllLongest => Selection::AllLongest,
        }
    }
}

/// Find the longest, then steepest, ski run down a map of elevations.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Map file: a `ROWS COLS` line followed by ROWS lines of COLS elevations. `-` reads stdin.
    map_file: PathBuf,

    /// Which of the longest runs to report.
    #[arg(long, value_enum, default_value_t = Select::MaxSteepness)]
    select: Select,

    /// Start runs only from cells whose neighbours are all lower, skipping plateaus.
    #[arg(long)]
    sources_only: bool,

    /// Keep the first parent found for each cell instead of its longest chain.
    #[arg(long)]
    first_discovery: bool,

    /// Explore start cells in parallel.
    #[arg(long)]
    parallel: bool,
}

impl Cli {
    fn config(&self) -> SearchConfig {
        SearchConfig {
            roots: if self.sources_only {
                Roots::Sources
            } else {
                Roots::Summits
            },
            parents: if self.first_discovery {
                ParentRule::FirstDiscovery
            } else {
                ParentRule::LongestChain
            },
            selection: self.select.into(),
            parallel: self.parallel,
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let grid = load_grid(&cli.map_file)?;
    let best = find_best_routes(&grid, cli.config());

    print!("{}", Report::new(&best));

    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["skiing", "map.txt"]).unwrap();
        assert_eq!(cli.map_file, PathBuf::from("map.txt"));
        assert_eq!(cli.config(), SearchConfig::default());
    }

    #[test]
    fn flags_map_to_config() {
        let cli = Cli::try_parse_from([
            "skiing",
            "--select",
            "all-longest",
            "--sources-only",
            "--first-discovery",
            "--parallel",
            "-",
        ])
        .unwrap();
        let config = cli.config();
        assert_eq!(config.selection, Selection::AllLongest);
        assert_eq!(config.roots, Roots::Sources);
        assert_eq!(config.parents, ParentRule::FirstDiscovery);
        assert!(config.parallel);
    }

    #[test]
    fn wrong_argument_count_is_a_usage_error() {
        assert!(Cli::try_parse_from(["skiing"]).is_err());
        assert!(Cli::try_parse_from(["skiing", "a.txt", "b.txt"]).is_err());
    }

    #[test]
    fn processing_errors_carry_the_path() {
        let cli = Cli::try_parse_from(["skiing", "missing/map.txt"]).unwrap();
        let err = run(&cli).unwrap_err();
        assert!(format!("{err:#}").starts_with("error reading map file 'missing/map.txt': "));
    }
}
