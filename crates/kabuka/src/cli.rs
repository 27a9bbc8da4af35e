use clap::{Parser, Subcommand, ValueEnum};
use kabuka_warehouse::dashboard::{DEFAULT_DAYS, MAX_DAYS, MIN_DAYS};
use kabuka_warehouse::PriceRange;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Sets the level of tracing
    #[arg(long, value_enum, ignore_case = true, default_value_t = TraceLevel::Info)]
    pub trace: TraceLevel,

    /// JSON file mapping company names to ticker symbols
    #[arg(long, global = true, value_name = "PATH")]
    pub symbols: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the lookback period a day count resolves to.
    Period {
        #[arg(allow_negative_numbers = true)]
        days: i64,
    },

    /// List the companies available to chart.
    Companies {
        #[command(flatten)]
        lookback: Lookback,
    },

    /// Print closing prices, one column per company.
    Table {
        #[command(flatten)]
        lookback: Lookback,
    },

    /// Build a line chart of closing prices as a Vega-Lite specification.
    Chart {
        #[command(flatten)]
        lookback: Lookback,

        /// Floor of the price axis
        #[arg(long, default_value_t = PriceRange::FLOOR, allow_negative_numbers = true)]
        ymin: f64,

        /// Ceiling of the price axis
        #[arg(long, default_value_t = PriceRange::CEILING, allow_negative_numbers = true)]
        ymax: f64,

        /// Company to chart; repeat for several. Defaults to google, apple & TOYOTA.
        #[arg(long = "company", value_name = "NAME")]
        companies: Vec<String>,

        /// Start from an empty selection instead of the defaults.
        #[arg(long, conflicts_with = "companies")]
        no_defaults: bool,

        /// Pick companies from an interactive list.
        #[arg(short, long)]
        interactive: bool,

        /// Write the specification here instead of stdout.
        #[arg(short, long, value_name = "PATH")]
        out: Option<PathBuf>,
    },
}

#[derive(clap::Args, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lookback {
    /// Number of days of history to show
    #[arg(
        short,
        long,
        default_value_t = DEFAULT_DAYS,
        value_parser = clap::value_parser!(i64).range(MIN_DAYS..=MAX_DAYS)
    )]
    pub days: i64,
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum TraceLevel {
    Debug,
    Info,
    Warn,
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn chart_defaults() {
        let cli = Cli::try_parse_from(["kabuka", "chart"]).unwrap();
        let Commands::Chart {
            lookback,
            ymin,
            ymax,
            companies,
            no_defaults,
            interactive,
            out,
        } = cli.command
        else {
            panic!("expected the chart command");
        };
        assert_eq!(lookback.days, 30);
        assert_eq!((ymin, ymax), (0.0, 5000.0));
        assert!(companies.is_empty());
        assert!(!no_defaults && !interactive);
        assert!(out.is_none());
        assert_eq!(cli.trace, TraceLevel::Info);
    }

    #[test]
    fn companies_repeat() {
        let cli = Cli::try_parse_from([
            "kabuka", "chart", "--company", "apple", "--company", "TOYOTA", "--days", "365",
        ])
        .unwrap();
        match cli.command {
            Commands::Chart {
                companies, lookback, ..
            } => {
                assert_eq!(companies, ["apple", "TOYOTA"]);
                assert_eq!(lookback.days, 365);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn days_are_bounded_like_the_slider() {
        assert!(Cli::try_parse_from(["kabuka", "table", "--days", "0"]).is_err());
        assert!(Cli::try_parse_from(["kabuka", "table", "--days", "3651"]).is_err());
        assert!(Cli::try_parse_from(["kabuka", "table", "--days", "3650"]).is_ok());
    }

    #[test]
    fn period_accepts_any_integer() {
        let cli = Cli::try_parse_from(["kabuka", "period", "-7"]).unwrap();
        assert!(matches!(cli.command, Commands::Period { days: -7 }));
    }

    #[test]
    fn trace_level_ignores_case() {
        let cli = Cli::try_parse_from(["kabuka", "--trace", "DEBUG", "period", "5"]).unwrap();
        assert_eq!(cli.trace, TraceLevel::Debug);
    }

    #[test]
    fn symbols_flag_is_global() {
        let cli = Cli::try_parse_from(["kabuka", "companies", "--symbols", "map.json"]).unwrap();
        assert_eq!(cli.symbols, Some(PathBuf::from("map.json")));
    }
}
