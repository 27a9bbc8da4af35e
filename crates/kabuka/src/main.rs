use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands::*, TraceLevel};
use colored::Colorize;
use dotenv::dotenv;
use kabuka_warehouse::{
    select_period, Config, Controls, Dashboard, PriceFetcher, PriceRange, PriceTable, View, Yahoo,
};
use tracing::{debug, info, subscriber, trace, Level};
use tracing_subscriber::FmtSubscriber;

mod cli;
mod ui;

fn preprocess(trace_level: Level) {
    dotenv().ok();
    let my_subscriber = FmtSubscriber::builder()
        .with_max_level(trace_level)
        .with_writer(std::io::stderr)
        .finish();
    subscriber::set_global_default(my_subscriber).expect("Set subscriber");
}

fn build_dashboard(config: &Config) -> Result<Dashboard<Yahoo>> {
    let symbols = config.symbols()?;
    let source = Yahoo::with_user_agent(&config.user_agent)?;
    let fetcher = PriceFetcher::new(source)
        .policy(config.policy)
        .concurrency(config.concurrency);
    Ok(Dashboard::new(symbols, fetcher))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.trace {
        TraceLevel::Debug => Level::DEBUG,
        TraceLevel::Info => Level::INFO,
        TraceLevel::Warn => Level::WARN,
        TraceLevel::Error => Level::ERROR,
    };

    preprocess(log_level);
    trace!("Command line input recorded: {cli:#?}");

    let config = Config::from_env()?.with_symbols_path(cli.symbols.clone());

    // cli framework:
    // "> kabuka <COMMAND>"
    match cli.command {
        // "> kabuka period <DAYS>"
        Period { days } => {
            println!("{}", select_period(days));
        }

        // "> kabuka companies [--days N]"
        Companies { lookback } => {
            let dashboard = build_dashboard(&config)?;
            let table = fetch_table(&dashboard, lookback.days).await?;
            for name in table.companies() {
                let ticker = dashboard.symbols().ticker(name).unwrap_or_default();
                println!("{name:<12} {ticker}");
            }
        }

        // "> kabuka table [--days N]"
        Table { lookback } => {
            let dashboard = build_dashboard(&config)?;
            let table = fetch_table(&dashboard, lookback.days).await?;
            let frame = table.transpose();
            let rows: Vec<(String, Vec<Option<f64>>)> = table
                .date_labels()
                .into_iter()
                .zip(frame.rows.into_iter().map(|(_, prices)| prices))
                .collect();
            print!("{}", ui::render_table(&table.companies(), &rows));
        }

        // "> kabuka chart [--days N] [--company NAME]... [--interactive] [--out PATH]"
        Chart {
            lookback,
            ymin,
            ymax,
            companies,
            no_defaults,
            interactive,
            out,
        } => {
            let dashboard = build_dashboard(&config)?;
            let table = fetch_table(&dashboard, lookback.days).await?;

            let mut selection = if !companies.is_empty() {
                companies
            } else if no_defaults {
                Vec::new()
            } else {
                dashboard.default_selection(lookback.days).await?
            };
            if interactive {
                let options: Vec<String> =
                    table.companies().into_iter().map(String::from).collect();
                selection = ui::select_companies(&options, &selection)?;
            }

            let controls = Controls {
                days: lookback.days,
                range: PriceRange::clamped(ymin, ymax),
                companies: selection,
            };
            debug!("rendering chart for {controls:?}");

            match dashboard.render(&controls).await? {
                View::EmptySelection { message } => {
                    eprintln!("{}", message.red());
                }
                View::Chart { period, chart } => {
                    let spec = serde_json::to_string_pretty(&chart.to_vega_lite())?;
                    match out {
                        Some(path) => {
                            tokio::fs::write(&path, spec).await?;
                            info!(
                                "{} series over {period} written to {}",
                                chart.series().len(),
                                path.display()
                            );
                        }
                        None => println!("{spec}"),
                    }
                }
            }
        }
    }

    Ok(())
}

async fn fetch_table(
    dashboard: &Dashboard<Yahoo>,
    days: i64,
) -> Result<std::sync::Arc<PriceTable>> {
    let pb = ui::spinner("fetching closing prices")?;
    let table = dashboard.table(days).await;
    pb.finish_and_clear();

    let table = table?;
    for skipped in table.skipped() {
        eprintln!(
            "{}",
            format!(
                "[{}] {} left out: {}",
                skipped.ticker, skipped.name, skipped.reason
            )
            .yellow()
        );
    }
    Ok(table)
}
