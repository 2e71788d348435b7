use stock_price_board::config::Config;
use stock_price_board::models::display::{DisplayConfig, DEFAULT_SELECTION};
use stock_price_board::util::arrow_utils;
use stock_price_board::{Dashboard, DashboardError, DashboardView, FailureKind, PriceTable, TickerMap};

use anyhow::{anyhow, Context};
use clap::{App, Arg, ArgMatches, SubCommand};
use log::{error, info};
use std::collections::BTreeSet;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logger
    env_logger::init();

    let default_companies = DEFAULT_SELECTION.join(",");

    let app = App::new("PriceBoard")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Daily closing prices of selected US companies")
        .arg(
            Arg::with_name("tickers")
                .long("tickers")
                .value_name("NAME=SYMBOL,...")
                .help("Override the company to ticker mapping")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("provider-url")
                .long("provider-url")
                .value_name("URL")
                .help("Base URL of the market data provider")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("timeout")
                .long("timeout")
                .value_name("SECONDS")
                .help("HTTP request timeout")
                .takes_value(true)
                .default_value("30"),
        );

    let app = app.subcommand(
        SubCommand::with_name("show")
            .about("Fetch prices once and print the table")
            .arg(
                Arg::with_name("days")
                    .short('d')
                    .long("days")
                    .value_name("DAYS")
                    .help("Look-back window in days (1-50)")
                    .takes_value(true)
                    .default_value("20"),
            )
            .arg(
                Arg::with_name("ymin")
                    .long("ymin")
                    .value_name("PRICE")
                    .help("Lower bound of the price axis")
                    .takes_value(true)
                    .default_value("0"),
            )
            .arg(
                Arg::with_name("ymax")
                    .long("ymax")
                    .value_name("PRICE")
                    .help("Upper bound of the price axis")
                    .takes_value(true)
                    .default_value("3500"),
            )
            .arg(
                Arg::with_name("companies")
                    .short('c')
                    .long("companies")
                    .value_name("NAMES")
                    .help("Comma separated companies to show")
                    .takes_value(true)
                    .default_value(&default_companies),
            )
            .arg(
                Arg::with_name("chart")
                    .long("chart")
                    .value_name("FILE")
                    .help("Write the Vega-Lite chart specification to FILE")
                    .takes_value(true),
            )
            .arg(
                Arg::with_name("export")
                    .long("export")
                    .value_name("FILE")
                    .help("Write the price table as an Arrow IPC file")
                    .takes_value(true),
            )
            .arg(
                Arg::with_name("json")
                    .long("json")
                    .help("Print long-form records as JSON instead of a table")
                    .takes_value(false),
            ),
    ).subcommand(
        SubCommand::with_name("tickers")
            .about("List the configured companies and symbols"),
    ).subcommand(
        SubCommand::with_name("repl")
            .about("Interactive session: days N | range MIN MAX | select a,b | show | tickers | quit"),
    );

    let matches = app.get_matches();

    let mut config = Config::new();
    if let Some(spec) = matches.value_of("tickers") {
        config = config.with_tickers(TickerMap::parse(spec)?);
    }
    if let Some(url) = matches.value_of("provider-url") {
        config = config.with_provider_url(url);
    }
    let timeout = matches.value_of("timeout")
        .unwrap_or("30")
        .parse::<u64>()
        .context("invalid --timeout")?;
    config = config.with_request_timeout_secs(timeout);

    let dashboard = Dashboard::new(config)?;

    if let Some(matches) = matches.subcommand_matches("show") {
        let display = display_from_matches(matches)?;

        match dashboard.render(&display).await {
            Ok(view) => {
                if matches.is_present("json") {
                    println!("{}", serde_json::to_string_pretty(&view.records)?);
                } else {
                    print_view(&view);
                }
                if let Some(path) = matches.value_of("chart") {
                    std::fs::write(path, serde_json::to_string_pretty(&view.chart)?)?;
                    info!("Chart specification written to {}", path);
                }
                if let Some(path) = matches.value_of("export") {
                    arrow_utils::save_price_table_to_arrow(&view.table, Path::new(path))?;
                }
            }
            Err(e) => {
                report(&e);
                if e.kind() != FailureKind::NoSelection {
                    return Err(anyhow!(e.user_message()));
                }
            }
        }
    } else if matches.subcommand_matches("tickers").is_some() {
        for (company, symbol) in dashboard.tickers() {
            println!("{:<12} {}", company, symbol);
        }
    } else if matches.subcommand_matches("repl").is_some() {
        run_repl(&dashboard).await?;
    } else {
        info!("No command specified. Use --help for usage information.");
    }

    Ok(())
}

fn display_from_matches(matches: &ArgMatches) -> anyhow::Result<DisplayConfig> {
    let days = matches.value_of("days")
        .unwrap_or("20")
        .parse::<u32>()
        .context("invalid --days")?;
    let y_min = matches.value_of("ymin")
        .unwrap_or("0")
        .parse::<f64>()
        .context("invalid --ymin")?;
    let y_max = matches.value_of("ymax")
        .unwrap_or("3500")
        .parse::<f64>()
        .context("invalid --ymax")?;
    let companies = parse_selection(matches.value_of("companies").unwrap_or_default());

    Ok(DisplayConfig::new()
        .with_lookback_days(days)
        .with_y_range(y_min, y_max)
        .with_selection(companies))
}

fn parse_selection(list: &str) -> BTreeSet<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// 错误横幅：空选择单独提示，其它错误统一提示
fn report(e: &DashboardError) {
    error!("{}", e);
    eprintln!("{}", e.user_message());
}

fn print_view(view: &DashboardView) {
    println!("Stock prices (USD)");
    print_table(&view.table);
    println!("{} records, y-axis {:?}", view.records.len(),
             view.chart["encoding"]["y"]["scale"]["domain"]);
}

fn print_table(table: &PriceTable) {
    let labels = table.column_labels();

    print!("{:<12}", "Name");
    for label in &labels {
        print!(" {:>18}", label);
    }
    println!();
    println!("{:-<width$}", "", width = 12 + labels.len() * 19);

    for company in table.companies() {
        print!("{:<12}", company);
        for value in table.row(company).unwrap_or_default() {
            match value {
                Some(price) => print!(" {:>18.2}", price),
                None => print!(" {:>18}", "-"),
            }
        }
        println!();
    }
}

async fn run_repl(dashboard: &Dashboard) -> anyhow::Result<()> {
    let mut display = DisplayConfig::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    rerender(dashboard, &display).await;

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let mut parts = line.split_whitespace();
        let Some(command) = parts.next() else {
            continue;
        };
        let args: Vec<&str> = parts.collect();

        match (command, args.as_slice()) {
            ("quit" | "exit", _) => break,
            ("tickers", _) => {
                for (company, symbol) in dashboard.tickers() {
                    println!("{:<12} {}", company, symbol);
                }
                continue;
            }
            ("show", _) => {}
            ("days", [n]) => match n.parse::<u32>() {
                Ok(n) => display.lookback_days = n,
                Err(_) => {
                    println!("days expects an integer");
                    continue;
                }
            },
            ("range", [lo, hi]) => match (lo.parse::<f64>(), hi.parse::<f64>()) {
                (Ok(lo), Ok(hi)) => {
                    display.y_min = lo;
                    display.y_max = hi;
                }
                _ => {
                    println!("range expects two numbers");
                    continue;
                }
            },
            ("select", rest) => display.selected_companies = parse_selection(&rest.join(",")),
            _ => {
                println!("commands: days N | range MIN MAX | select a,b | show | tickers | quit");
                continue;
            }
        }

        rerender(dashboard, &display).await;
    }

    info!("Session ended: {} cache hits, {} misses",
          dashboard.cache().hits(), dashboard.cache().misses());
    Ok(())
}

async fn rerender(dashboard: &Dashboard, display: &DisplayConfig) {
    println!("Last {} days, companies: {:?}", display.lookback_days, display.selected_companies);
    match dashboard.render(display).await {
        Ok(view) => print_view(&view),
        Err(e) => report(&e),
    }
}
