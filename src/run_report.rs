use chrono_tz::Tz;
use cronwalk::{FieldKind, FieldSpec, Schedule, SearchReport};

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const RED: &str = "\x1b[31m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";

    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        pub fn paint(&self, s: impl AsRef<str>, color: &str) -> String {
            if self.enabled { format!("{}{}{}", color, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn bold(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", BOLD, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", DIM, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }
    }
}

pub fn print_runs(schedule: &Schedule, zone: Tz, reports: &[SearchReport], color: bool) {
    let palette = ansi::Palette::new(color);
    println!(
        "\n{}",
        palette.bold(palette.paint(format!("⏱  Schedule: \"{}\" in {}", schedule.source(), zone.name()), ansi::CYAN))
    );

    println!("\n{}", palette.paint("━━━ Fields ━━━", ansi::GRAY));
    for kind in FieldKind::ALL {
        println!("  {:<13} {}", palette.paint(kind.name(), ansi::BLUE), describe(schedule.field(kind)));
    }

    println!("\n{}", palette.paint("━━━ Runs ━━━", ansi::GRAY));
    if let Some(first) = reports.first() {
        println!("  {} {}", palette.dim("start:"), palette.paint(first.start.to_rfc3339(), ansi::YELLOW));
    }
    for (idx, report) in reports.iter().enumerate() {
        print_report(idx, report, &palette);
    }

    let total: std::time::Duration = reports.iter().map(|report| report.elapsed).sum();
    let iterations: usize = reports.iter().map(|report| report.metrics.iterations).sum();
    println!("\n{}", palette.paint("━━━ Timing ━━━", ansi::GRAY));
    println!(
        "  Total: {}  │  Iterations: {}  │  Runs: {}",
        palette.paint(format!("{total:?}"), ansi::GREEN),
        palette.paint(iterations.to_string(), ansi::CYAN),
        palette.dim(reports.iter().filter(|report| report.result.is_ok()).count().to_string()),
    );
    println!();
}

fn print_report(idx: usize, report: &SearchReport, palette: &ansi::Palette) {
    let metrics = &report.metrics;
    match &report.result {
        Ok(at) => println!(
            "  {} {} {} {}",
            palette.paint(format!("[{idx}]"), ansi::GRAY),
            palette.bold(palette.paint(at.to_rfc3339(), ansi::GREEN)),
            palette.dim("│"),
            palette.paint(at.format("%a %Z").to_string(), ansi::YELLOW),
        ),
        Err(err) => println!(
            "  {} {}",
            palette.paint(format!("[{idx}]"), ansi::GRAY),
            palette.bold(palette.paint(err.to_string(), ansi::RED)),
        ),
    }
    println!(
        "      {} {}  {} {}/{}/{}/{}  {} {}  {} {:?}",
        palette.dim("iterations:"),
        palette.paint(metrics.iterations.to_string(), ansi::CYAN),
        palette.dim("│ month/day/hour/minute:"),
        metrics.month_steps,
        metrics.day_steps,
        metrics.hour_steps,
        metrics.minute_steps,
        palette.dim("│ offset changes:"),
        palette.paint(metrics.offset_changes.to_string(), ansi::YELLOW),
        palette.dim("│"),
        report.elapsed,
    );
}

fn describe(spec: &FieldSpec) -> String {
    match spec {
        FieldSpec::Wildcard => "every value".to_string(),
        FieldSpec::Unconstrained => "no constraint (?)".to_string(),
        FieldSpec::Values(set) => format!("{set:?}"),
        FieldSpec::LastDayOfMonth => "last day of the month".to_string(),
        FieldSpec::NearestWeekday(day) => format!("weekday nearest day {day}"),
        FieldSpec::NthWeekday { weekday, nth } => format!("occurrence {nth} of weekday {weekday}"),
        FieldSpec::LastWeekday(weekday) => format!("last occurrence of weekday {weekday}"),
    }
}
