use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Context;
use chrono::{Datelike, Local, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use clinic_core::{
    appointment_status_counts, group_by_date, monthly_counts, status_counts,
    test_result_breakdown, Appointment, AppointmentBook, AppointmentStatus, CalendarCell,
    DashboardConfig, DashboardSummary, DateRange, FilterState, MedicalRecordTable, MonthCursor,
    MonthlyCount, NotificationFeed, PatientRegistry, RawFilter, RelativeAge,
};
use clinic_data::JsonDataSource;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "clinic-cli",
    about = "Month grids, filtered listings and summaries from a clinic dataset."
)]
struct Cli {
    /// Path to the dataset JSON file.
    #[arg(short, long)]
    input: PathBuf,

    /// Reference day (YYYY-MM-DD). Defaults to the local date.
    #[arg(long)]
    today: Option<NaiveDate>,

    /// Print JSON instead of text.
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sunday-first month grid with appointments per day.
    Calendar {
        #[arg(long)]
        year: Option<i32>,
        /// Month number, 1-12. Values outside roll over into neighbouring years.
        #[arg(long, allow_negative_numbers = true)]
        month: Option<i32>,
        #[arg(long)]
        selected: Option<NaiveDate>,
    },
    /// Appointment table grouped by day.
    Appointments {
        #[command(flatten)]
        filter: FilterArgs,
        /// Days after today to include. Defaults to the dashboard setting.
        #[arg(long)]
        window: Option<u32>,
        /// Ignore the upcoming window and list every match.
        #[arg(long)]
        all: bool,
    },
    /// Medical records with a per-status tally.
    Records {
        #[command(flatten)]
        filter: FilterArgs,
    },
    Notifications {
        #[command(flatten)]
        filter: FilterArgs,
    },
    Patients {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Headline numbers for the reference day.
    Summary,
    /// Records per month, zero-filled.
    Monthly {
        #[arg(value_enum)]
        section: Section,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Section {
    Appointments,
    Records,
    Notifications,
    Patients,
}

#[derive(Args, Debug, Default)]
struct FilterArgs {
    /// Case-insensitive text matched against names, ids and similar fields.
    #[arg(short, long)]
    search: Option<String>,
    /// Facet constraint such as `status=confirmed`. Repeatable.
    #[arg(short = 'f', long = "filter", value_parser = parse_facet)]
    facets: Vec<(String, String)>,
    #[arg(long)]
    start: Option<String>,
    #[arg(long)]
    end: Option<String>,
    /// A single day, combined with --start/--end.
    #[arg(long)]
    date: Option<String>,
}

impl FilterArgs {
    fn state(&self) -> FilterState {
        FilterState::from(RawFilter {
            search: self.search.clone(),
            facets: self.facets.iter().cloned().collect(),
            start: self.start.clone(),
            end: self.end.clone(),
            date: self.date.clone(),
        })
    }
}

#[derive(Serialize)]
struct AppointmentListing<'a> {
    groups: BTreeMap<NaiveDate, Vec<&'a Appointment>>,
    statistics: BTreeMap<AppointmentStatus, usize>,
}

fn parse_facet(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got {raw:?}"))?;
    Ok((name.trim().to_string(), value.trim().to_string()))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let source = JsonDataSource::from_path(&cli.input)
        .with_context(|| format!("Cannot load dataset {:?}", cli.input))?;
    let dataset = source.dataset();
    let today = cli.today.unwrap_or_else(|| Local::now().date_naive());
    let config = DashboardConfig::default();
    tracing::debug!(%today, command = ?cli.command, "running");

    match &cli.command {
        Command::Calendar {
            year,
            month,
            selected,
        } => {
            let cursor = calendar_cursor(*year, *month, today);
            let book = AppointmentBook::new(dataset.appointments.clone());
            let grid = book.calendar(cursor, today, *selected);
            if cli.json {
                return print_json(&grid);
            }
            println!("{}", grid.cursor.title());
            println!(" Su     Mo     Tu     We     Th     Fr     Sa");
            for week in grid.weeks() {
                let row: Vec<String> = week.iter().map(format_cell).collect();
                println!("{}", row.join(""));
            }
            println!("Appointments this month: {}", grid.month_total());
        }
        Command::Appointments {
            filter,
            window,
            all,
        } => {
            let book = AppointmentBook::new(dataset.appointments.clone());
            let state = filter.state();
            let rows = if *all {
                book.filtered(&state)
            } else {
                let window = window.unwrap_or(config.upcoming_window_days);
                book.table(&state, today, window)
            };
            let statistics = appointment_status_counts(&rows);
            let grouped = group_by_date(rows.iter().copied());
            if cli.json {
                return print_json(&AppointmentListing {
                    groups: grouped,
                    statistics,
                });
            }
            if grouped.is_empty() {
                println!("No appointments match.");
            }
            for (date, day_rows) in &grouped {
                println!("{} ({})", date.format("%a %Y-%m-%d"), day_rows.len());
                for appointment in day_rows {
                    println!("  {}", format_appointment(appointment));
                }
            }
            let tally: Vec<String> = statistics
                .iter()
                .map(|(status, count)| format!("{}: {count}", status.label()))
                .collect();
            println!("Total: {}  ({})", rows.len(), tally.join(", "));
        }
        Command::Records { filter } => {
            let table = MedicalRecordTable::new(dataset.medical_records.clone());
            let rows = table.filtered(&filter.state());
            if cli.json {
                return print_json(&rows);
            }
            for record in &rows {
                println!(
                    "{}  {}  {:<24}  {:<16}  {:<16}  {}",
                    record.recorded_on,
                    record.id,
                    record.patient_name,
                    record.test_type,
                    record.status.label(),
                    record.result
                );
            }
            let tally: Vec<String> = status_counts(&rows)
                .into_iter()
                .map(|(status, count)| format!("{}: {count}", status.label()))
                .collect();
            println!("{}", tally.join(", "));
            println!("Patients: {}", table.patient_names().join(", "));
            for breakdown in test_result_breakdown(rows.iter().copied()) {
                println!(
                    "  {:<16}  normal {:>3}  abnormal {:>3}",
                    breakdown.test_type, breakdown.normal, breakdown.abnormal
                );
            }
        }
        Command::Notifications { filter } => {
            let feed = NotificationFeed::new(dataset.notifications.clone());
            let rows = feed.filtered(&filter.state());
            if cli.json {
                return print_json(&rows);
            }
            let now = Utc::now();
            for notification in &rows {
                let marker = if notification.is_read { ' ' } else { '*' };
                println!(
                    "{marker} [{}] {}  {}  ({})",
                    notification.priority.label(),
                    notification.title,
                    notification.message,
                    RelativeAge::between(notification.timestamp, now)
                );
            }
            println!(
                "Unread: {} (high priority: {})",
                feed.unread_count(),
                feed.high_priority_unread()
            );
        }
        Command::Patients { filter } => {
            let registry = PatientRegistry::new(dataset.patients.clone());
            let rows = registry.filtered(&filter.state());
            if cli.json {
                return print_json(&rows);
            }
            for patient in &rows {
                let bracket = patient.age_bracket().map_or("-", |b| b.label());
                let next = patient
                    .next_appointment
                    .map_or_else(|| "-".to_string(), |d| d.to_string());
                println!(
                    "{}  {:<24}  {:>3}  {:<6}  {:<6}  next: {next}",
                    patient.id,
                    patient.name,
                    patient.age,
                    patient.gender.label(),
                    bracket
                );
            }
        }
        Command::Summary => {
            let summary = DashboardSummary::compute(dataset, today);
            if cli.json {
                return print_json(&summary);
            }
            println!("Summary for {}", summary.date);
            println!("Appointments today: {}", summary.appointments_today);
            for (status, count) in &summary.today_by_status {
                println!("  {}: {count}", status.label());
            }
            println!("Pending records: {}", summary.pending_records);
            println!("Abnormal records: {}", summary.abnormal_records);
            println!(
                "Unread notifications: {} (high priority: {})",
                summary.unread_notifications, summary.high_priority_unread
            );
            println!("Patients: {}", summary.patients);
        }
        Command::Monthly {
            section,
            start,
            end,
        } => {
            let range = DateRange {
                start: *start,
                end: *end,
            };
            let counts = match section {
                Section::Appointments => monthly_counts(&dataset.appointments, range),
                Section::Records => monthly_counts(&dataset.medical_records, range),
                Section::Notifications => monthly_counts(&dataset.notifications, range),
                Section::Patients => monthly_counts(&dataset.patients, range),
            };
            if cli.json {
                return print_json(&counts);
            }
            for MonthlyCount { year, month, count } in counts {
                println!("{year}-{month:02}  {count}");
            }
        }
    }

    Ok(())
}

/// Month shown by `calendar`. `month` is 1-based and rolls over like the grid.
fn calendar_cursor(year: Option<i32>, month: Option<i32>, today: NaiveDate) -> MonthCursor {
    if year.is_none() && month.is_none() {
        return MonthCursor::containing(today);
    }
    MonthCursor::new(
        year.unwrap_or_else(|| today.year()),
        month.map_or(today.month0() as i32, |m| m.saturating_sub(1)),
    )
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("Cannot serialize output")?;
    println!("{rendered}");
    Ok(())
}

/// `*` marks today, `>` the selection and `~` days outside the month.
fn format_cell(cell: &CalendarCell) -> String {
    let marker = if cell.is_selected {
        '>'
    } else if cell.is_today {
        '*'
    } else if !cell.is_current_month {
        '~'
    } else {
        ' '
    };
    let count = if cell.match_count > 0 {
        format!("({})", cell.match_count)
    } else {
        String::new()
    };
    format!("{marker}{:>2}{count:<4}", cell.date.day())
}

fn format_appointment(appointment: &Appointment) -> String {
    format!(
        "{}  {}  {:<24}  {:<14}  {:<18}  {}",
        appointment.time.format("%H:%M"),
        appointment.id,
        appointment.patient_name,
        appointment.doctor,
        appointment.kind.label(),
        appointment.status.label()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facet_arguments_split_on_first_equals() {
        assert_eq!(
            parse_facet(" status = confirmed ").unwrap(),
            ("status".to_string(), "confirmed".to_string())
        );
        assert_eq!(
            parse_facet("doctor=Dr. A=B").unwrap(),
            ("doctor".to_string(), "Dr. A=B".to_string())
        );
        assert!(parse_facet("status").is_err());
    }

    #[test]
    fn filter_arguments_become_a_filter_state() {
        let args = FilterArgs {
            search: Some("tanaka".into()),
            facets: vec![("status".into(), "confirmed".into()), ("bogus".into(), "x".into())],
            start: Some("2025-01-20".into()),
            end: None,
            date: Some("not a date".into()),
        };
        let state = args.state();
        assert_eq!(state.search, "tanaka");
        assert_eq!(state.facet(clinic_core::Facet::Status), Some("confirmed"));
        assert_eq!(state.facets.len(), 1);
        assert_eq!(state.range.start, NaiveDate::from_ymd_opt(2025, 1, 20));
        assert_eq!(state.range.end, None);
    }

    #[test]
    fn cells_show_markers_and_counts() {
        let cell = CalendarCell {
            date: NaiveDate::from_ymd_opt(2025, 1, 20).unwrap(),
            is_current_month: true,
            is_today: true,
            is_selected: false,
            match_count: 3,
        };
        assert_eq!(format_cell(&cell), "*20(3) ");
    }

    #[test]
    fn calendar_month_rolls_over_without_overflow() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 20).unwrap();
        assert_eq!(calendar_cursor(None, None, today), MonthCursor::containing(today));
        assert_eq!(calendar_cursor(Some(2024), Some(3), today), MonthCursor::new(2024, 2));
        assert_eq!(calendar_cursor(None, Some(13), today), MonthCursor::new(2026, 0));
        assert_eq!(calendar_cursor(Some(2024), None, today), MonthCursor::new(2024, 0));

        let cursor = calendar_cursor(None, Some(i32::MIN), today);
        assert_eq!(cursor, MonthCursor::new(2025, i32::MIN));
        assert!(cursor.month0() < 12);
    }

    #[test]
    fn cli_arguments_parse() {
        let cli = Cli::try_parse_from([
            "clinic-cli",
            "--input",
            "data.json",
            "--today",
            "2025-01-20",
            "appointments",
            "-f",
            "status=pending",
            "--window",
            "14",
        ])
        .unwrap();
        assert_eq!(cli.today, NaiveDate::from_ymd_opt(2025, 1, 20));
        match cli.command {
            Command::Appointments { filter, window, all } => {
                assert_eq!(filter.facets, vec![("status".to_string(), "pending".to_string())]);
                assert_eq!(window, Some(14));
                assert!(!all);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
