mod run_report;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use cronwalk::{Direction, Options, Schedule, parse_zone, search_verbose_with};
use std::io::{self, IsTerminal};

const DEFAULT_COUNT: usize = 5;
const LOG_ENV: &str = "CRONWALK_LOG";

fn main() {
    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let options = Options { max_iterations: config.max_iterations };
    let mut reports = Vec::with_capacity(config.count);
    let mut from = config.from.with_timezone(&config.zone);

    for index in 0..config.count {
        let allow_current = config.inclusive && index == 0;
        let report =
            search_verbose_with(&config.schedule, &from, 0, allow_current, config.direction, config.zone, &options);
        let found = report.result.clone();
        reports.push(report);
        match found {
            Ok(at) => from = at,
            Err(_) => break,
        }
    }

    if config.report {
        run_report::print_runs(&config.schedule, config.zone, &reports, config.color);
    } else {
        for report in &reports {
            match &report.result {
                Ok(at) => println!("{}", at.to_rfc3339()),
                Err(err) => eprintln!("error: {err}"),
            }
        }
    }

    if reports.iter().any(|report| report.result.is_err()) {
        std::process::exit(1);
    }
}

struct CliConfig {
    schedule: Schedule,
    zone: Tz,
    from: DateTime<Utc>,
    count: usize,
    direction: Direction,
    inclusive: bool,
    max_iterations: usize,
    report: bool,
    color: bool,
}

fn parse_args() -> Result<CliConfig, String> {
    let mut expression: Option<String> = None;
    let mut zone = chrono_tz::UTC;
    let mut from = Utc::now();
    let mut count = DEFAULT_COUNT;
    let mut direction = Direction::Forward;
    let mut inclusive = false;
    let mut max_iterations = Options::default().max_iterations;
    let mut report = false;
    let mut color = io::stdout().is_terminal();
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) if flag.starts_with("--") => (flag.to_string(), Some(value.to_string())),
            _ => (arg.clone(), None),
        };
        let mut value = |name: &str| inline.clone().or_else(|| args.next()).ok_or_else(|| format!("error: {name} expects a value"));

        match flag.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("cronwalk {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--color" => color = true,
            "--no-color" => color = false,
            "--report" => report = true,
            "--previous" => direction = Direction::Backward,
            "--inclusive" => inclusive = true,
            "-z" | "--zone" => zone = parse_zone(&value("--zone")?).map_err(|err| format!("error: {err}"))?,
            "--from" => from = parse_from(&value("--from")?)?,
            "-n" | "--count" => count = parse_number("--count", &value("--count")?)?,
            "--max-iterations" => max_iterations = parse_number("--max-iterations", &value("--max-iterations")?)?,
            "--" => {
                let rest = args.by_ref().collect::<Vec<_>>().join(" ");
                set_expression(&mut expression, rest)?;
                break;
            }
            _ if arg.starts_with('-') => {
                return Err(format!("error: unknown option '{arg}'"));
            }
            _ => {
                let rest = std::iter::once(arg).chain(args.by_ref()).collect::<Vec<_>>().join(" ");
                set_expression(&mut expression, rest)?;
                break;
            }
        }
    }

    let Some(expression) = expression.filter(|text| !text.trim().is_empty()) else {
        return Err(format!("error: no cron expression provided\n\n{}", help_text()));
    };
    let schedule = Schedule::parse(&expression).map_err(|err| format!("error: {err}"))?;

    Ok(CliConfig { schedule, zone, from, count, direction, inclusive, max_iterations, report, color })
}

fn set_expression(expression: &mut Option<String>, text: String) -> Result<(), String> {
    if expression.is_some() {
        return Err("error: cron expression provided multiple times".to_string());
    }
    *expression = Some(text);
    Ok(())
}

fn parse_from(value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|_| format!("error: invalid --from '{value}' (expected RFC 3339, e.g. 2021-03-28T01:30:00+00:00)"))
}

fn parse_number(name: &str, value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("error: {name} expects a positive integer, got '{value}'")),
    }
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "cronwalk {version}

Lists the run dates of a 5-field cron expression in an IANA timezone.

Usage:
  cronwalk [OPTIONS] [--] <expression...>

Options:
  -z, --zone <name>          IANA timezone, e.g. Europe/London. Default: UTC
  --from <timestamp>         Start instant in RFC 3339. Default: now
  -n, --count <n>            Number of runs to list. Default: {count}
  --previous                 Walk backwards from the start instant.
  --inclusive                Allow the start minute itself as the first run.
  --max-iterations <n>       Search bound per run. Default: {iterations}
  --report                   Print fields, per-run metrics and timings.
  --color                    Force ANSI color output.
  --no-color                 Disable ANSI color output.
  -h, --help                 Show this help message.
  -V, --version              Print version information.

Environment:
  {log_env}                Tracing filter, e.g. cronwalk=debug or cronwalk::cursor=trace.

Exit codes:
  0  Success.
  1  A search ran out of iterations.
  2  Invalid arguments or cron expression.
",
        version = env!("CARGO_PKG_VERSION"),
        count = DEFAULT_COUNT,
        iterations = Options::default().max_iterations,
        log_env = LOG_ENV,
    )
}
