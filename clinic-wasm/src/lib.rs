//! Framework-neutral WASM <-> JavaScript bridge over the dashboard core.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use clinic_core::{
    filter::ISO_DATE_FORMAT, test_result_breakdown, AppointmentBook, ClinicDataset, ClinicError,
    DashboardConfig, DashboardSummary, FilterState, Language, MedicalRecordTable, MonthCursor,
    MonthGrid, NotificationFeed, PatientRegistry, RawFilter,
};
use serde::{Deserialize, Serialize};
use serde_wasm_bindgen::{from_value, Serializer};
use wasm_bindgen::prelude::*;

#[derive(Deserialize)]
struct JsDashboardConfig {
    #[serde(default)]
    upcoming_window_days: Option<u32>,
    #[serde(default)]
    default_language: Option<String>,
}

impl From<JsDashboardConfig> for DashboardConfig {
    fn from(cfg: JsDashboardConfig) -> Self {
        let mut base = DashboardConfig::default();
        if let Some(days) = cfg.upcoming_window_days {
            base.upcoming_window_days = days;
        }
        if let Some(language) = cfg.default_language.as_deref().and_then(Language::from_code) {
            base.default_language = language;
        }
        base
    }
}

fn read_config(config: Option<JsValue>) -> Result<DashboardConfig, JsValue> {
    match config {
        Some(js_cfg) if !js_cfg.is_undefined() && !js_cfg.is_null() => {
            let cfg: JsDashboardConfig = from_value(js_cfg)
                .map_err(|err| JsValue::from_str(&format!("Cannot read config: {err}")))?;
            Ok(DashboardConfig::from(cfg))
        }
        _ => Ok(DashboardConfig::default()),
    }
}

fn read_dataset(dataset: JsValue) -> Result<ClinicDataset, JsValue> {
    let dataset: ClinicDataset = from_value(dataset)
        .map_err(|err| JsValue::from_str(&format!("Cannot read dataset: {err}")))?;
    dataset
        .validate()
        .map_err(|err| JsValue::from_str(&format_clinic_error(err)))?;
    Ok(dataset)
}

/// Filters are permissive: anything unreadable becomes "no constraint".
fn read_filter(filter: Option<JsValue>) -> FilterState {
    filter
        .and_then(|value| from_value::<RawFilter>(value).ok())
        .map(FilterState::from)
        .unwrap_or_default()
}

fn read_date(raw: &str, what: &str) -> Result<NaiveDate, JsValue> {
    NaiveDate::parse_from_str(raw.trim(), ISO_DATE_FORMAT)
        .map_err(|err| JsValue::from_str(&format!("Invalid {what} date {raw:?}: {err}")))
}

fn read_optional_date(raw: Option<String>) -> Option<NaiveDate> {
    raw.as_deref()
        .and_then(|value| NaiveDate::parse_from_str(value.trim(), ISO_DATE_FORMAT).ok())
}

/// Called at the top of every export.
fn install_panic_hook() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// Maps keyed by date become plain JS objects rather than `Map`s.
fn write<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&Serializer::json_compatible())
        .map_err(|err| JsValue::from_str(&format!("Cannot serialize result: {err}")))
}

/// Builds a 42-cell month grid from a `{ "YYYY-MM-DD": count }` object.
#[wasm_bindgen]
pub fn month_grid(
    year: i32,
    month_index: i32,
    today: &str,
    selected: Option<String>,
    counts: JsValue,
) -> Result<JsValue, JsValue> {
    install_panic_hook();

    let today = read_date(today, "today")?;
    let counts: BTreeMap<NaiveDate, usize> = if counts.is_undefined() || counts.is_null() {
        BTreeMap::new()
    } else {
        from_value(counts)
            .map_err(|err| JsValue::from_str(&format!("Cannot read counts: {err}")))?
    };

    let grid = MonthGrid::build(year, month_index, today, read_optional_date(selected), &counts);
    write(&grid)
}

/// Month grid annotated with the number of appointments per day.
#[wasm_bindgen]
pub fn appointment_calendar(
    dataset: JsValue,
    year: i32,
    month_index: i32,
    today: &str,
    selected: Option<String>,
) -> Result<JsValue, JsValue> {
    install_panic_hook();
    let book = AppointmentBook::new(read_dataset(dataset)?.appointments);
    let today = read_date(today, "today")?;
    let cursor = MonthCursor::new(year, month_index);
    write(&book.calendar(cursor, today, read_optional_date(selected)))
}

/// Appointment table rows for the upcoming window, grouped by date.
#[wasm_bindgen]
pub fn appointment_table(
    dataset: JsValue,
    filter: Option<JsValue>,
    today: &str,
    config: Option<JsValue>,
) -> Result<JsValue, JsValue> {
    install_panic_hook();
    let cfg = read_config(config)?;
    let book = AppointmentBook::new(read_dataset(dataset)?.appointments);
    let today = read_date(today, "today")?;
    let grouped = book.grouped_table(&read_filter(filter), today, cfg.upcoming_window_days);
    write(&grouped)
}

/// Filters one section of the dataset (`appointments`, `medical_records`,
/// `notifications` or `patients`).
#[wasm_bindgen]
pub fn filter_section(
    dataset: JsValue,
    section: &str,
    filter: Option<JsValue>,
) -> Result<JsValue, JsValue> {
    install_panic_hook();
    let dataset = read_dataset(dataset)?;
    let state = read_filter(filter);
    match section {
        "appointments" => write(&AppointmentBook::new(dataset.appointments).filtered(&state)),
        "medical_records" => {
            write(&MedicalRecordTable::new(dataset.medical_records).filtered(&state))
        }
        "notifications" => write(&NotificationFeed::new(dataset.notifications).filtered(&state)),
        "patients" => write(&PatientRegistry::new(dataset.patients).filtered(&state)),
        other => Err(JsValue::from_str(&format!("Unknown section {other:?}"))),
    }
}

#[wasm_bindgen]
pub fn dashboard_summary(dataset: JsValue, today: &str) -> Result<JsValue, JsValue> {
    install_panic_hook();
    let dataset = read_dataset(dataset)?;
    let today = read_date(today, "today")?;
    write(&DashboardSummary::compute(&dataset, today))
}

/// Normal and abnormal results per test type.
#[wasm_bindgen]
pub fn test_results(dataset: JsValue) -> Result<JsValue, JsValue> {
    install_panic_hook();
    let dataset = read_dataset(dataset)?;
    write(&test_result_breakdown(&dataset.medical_records))
}

fn format_clinic_error(err: ClinicError) -> String {
    format!("Clinic error: {err}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_overrides_defaults() {
        let cfg = DashboardConfig::from(JsDashboardConfig {
            upcoming_window_days: Some(14),
            default_language: Some("xx".into()),
        });
        assert_eq!(cfg.upcoming_window_days, 14);
        assert_eq!(cfg.default_language, Language::Japanese);

        let cfg = DashboardConfig::from(JsDashboardConfig {
            upcoming_window_days: None,
            default_language: Some("en".into()),
        });
        assert_eq!(cfg.upcoming_window_days, 7);
        assert_eq!(cfg.default_language, Language::English);
    }

    #[test]
    fn optional_dates_ignore_garbage() {
        assert_eq!(read_optional_date(Some("not a date".into())), None);
        assert_eq!(read_optional_date(None), None);
        assert_eq!(
            read_optional_date(Some(" 2025-01-20 ".into())),
            NaiveDate::from_ymd_opt(2025, 1, 20)
        );
    }

    #[test]
    fn panic_hook_install_is_repeatable() {
        install_panic_hook();
        install_panic_hook();
    }

    #[test]
    fn clinic_errors_are_prefixed() {
        assert_eq!(
            format_clinic_error(ClinicError::MissingData),
            "Clinic error: Input data is missing required information"
        );
    }
}
