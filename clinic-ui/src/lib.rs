//! Appointment dashboard view for WebAssembly: month calendar, filters and the
//! grouped upcoming-appointments table.

#[cfg(target_arch = "wasm32")]
mod styles;

#[cfg(target_arch = "wasm32")]
mod wasm_ui {
    use crate::styles;
    use chrono::{Datelike, NaiveDate};
    use clinic_core::preferences::{load_language, save_language};
    use std::collections::BTreeMap;

    use clinic_core::{
        appointment_status_counts, group_by_date, Appointment, AppointmentBook, AppointmentStatus,
        CalendarCell, ClinicDataset, ClinicError, DashboardConfig, DateRange, Facet, FilterState,
        Language, MonthCursor, PreferenceStore,
    };
    use serde_wasm_bindgen::from_value;
    use wasm_bindgen::prelude::*;
    use web_sys::{console, Document, Element, HtmlInputElement, HtmlSelectElement, Window};
    use yew::events::{Event, InputEvent};
    use yew::prelude::*;
    use yew::TargetCast;

    const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

    /// Browser local storage as a preference store.
    struct BrowserStorage;

    impl BrowserStorage {
        fn storage() -> Option<web_sys::Storage> {
            web_sys::window()?.local_storage().ok().flatten()
        }
    }

    impl PreferenceStore for BrowserStorage {
        fn get(&self, key: &str) -> Option<String> {
            Self::storage()?.get_item(key).ok().flatten()
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), ClinicError> {
            let storage = Self::storage()
                .ok_or_else(|| ClinicError::Other("Local storage unavailable".to_string()))?;
            storage
                .set_item(key, value)
                .map_err(|err| ClinicError::Other(format!("Cannot save preference: {err:?}")))
        }
    }

    #[derive(Properties, PartialEq)]
    pub struct AppointmentsViewProps {
        pub dataset: ClinicDataset,
        pub today: NaiveDate,
        #[prop_or_default]
        pub config: DashboardConfig,
    }

    #[function_component(AppointmentsView)]
    fn appointments_view(props: &AppointmentsViewProps) -> Html {
        let today = props.today;
        let window_days = props.config.upcoming_window_days;

        use_effect_with((), |_| {
            if let Some(window) = web_sys::window() {
                if let Some(document) = window.document() {
                    if let Err(err) = styles::ensure_styles(&document) {
                        console::error_1(&err);
                    }
                }
            }
            || ()
        });

        let book = use_state(|| AppointmentBook::new(props.dataset.appointments.clone()));
        let filters = use_state(FilterState::default);
        let cursor = use_state(|| MonthCursor::containing(today));
        let calendar_open = use_state(|| false);
        let language = use_state(|| load_language(&BrowserStorage, props.config.default_language));

        let filters_value = (*filters).clone();
        let table_rows = book.table(&filters_value, today, window_days);
        let statistics = appointment_status_counts(&table_rows);
        let grouped = group_by_date(table_rows.iter().copied());
        let selected = filters_value
            .range
            .start
            .filter(|start| Some(*start) == filters_value.range.end);
        let todays_count = book.todays(today).len();

        let mut doctors: Vec<String> = book.all().iter().map(|a| a.doctor.clone()).collect();
        doctors.sort();
        doctors.dedup();

        let on_search = {
            let filters = filters.clone();
            Callback::from(move |event: InputEvent| {
                let input: HtmlInputElement = event.target_unchecked_into();
                let mut next = (*filters).clone();
                next.search = input.value();
                filters.set(next);
            })
        };

        let on_doctor = {
            let filters = filters.clone();
            Callback::from(move |event: Event| {
                let select: HtmlSelectElement = event.target_unchecked_into();
                let mut next = (*filters).clone();
                next.set_facet(Facet::Doctor, select.value());
                filters.set(next);
            })
        };

        let on_clear_filters = {
            let filters = filters.clone();
            Callback::from(move |_| filters.set(FilterState::default()))
        };

        let on_toggle_calendar = {
            let calendar_open = calendar_open.clone();
            Callback::from(move |_| calendar_open.set(!*calendar_open))
        };

        let on_pick_date = {
            let filters = filters.clone();
            let calendar_open = calendar_open.clone();
            Callback::from(move |date: NaiveDate| {
                let mut next = (*filters).clone();
                next.range = DateRange::single(date);
                filters.set(next);
                calendar_open.set(false);
            })
        };

        let on_status_change = {
            let book = book.clone();
            Callback::from(move |(id, status): (String, AppointmentStatus)| {
                let mut next = (*book).clone();
                let result = match status {
                    AppointmentStatus::Cancelled => next.cancel(&id).map(|_| ()),
                    AppointmentStatus::Arrived => next.mark_arrived(&id).map(|_| ()),
                    _ => Ok(()),
                };
                match result {
                    Ok(()) => book.set(next),
                    Err(err) => console::error_1(&JsValue::from_str(&err.to_string())),
                }
            })
        };

        let on_language = {
            let language = language.clone();
            Callback::from(move |event: Event| {
                let select: HtmlSelectElement = event.target_unchecked_into();
                if let Some(next) = Language::from_code(&select.value()) {
                    if let Err(err) = save_language(&mut BrowserStorage, next) {
                        console::error_1(&JsValue::from_str(&err.to_string()));
                    }
                    language.set(next);
                }
            })
        };

        let calendar = if *calendar_open {
            let grid = book.calendar(*cursor, today, selected);
            let on_prev = {
                let cursor = cursor.clone();
                Callback::from(move |_| cursor.set(cursor.previous()))
            };
            let on_next = {
                let cursor = cursor.clone();
                Callback::from(move |_| cursor.set(cursor.next()))
            };
            html! {
                <div class="clinic-calendar" role="dialog" aria-label="Pick a date">
                    <header class="clinic-calendar-header">
                        <button type="button" onclick={on_prev} aria-label="Previous month">{"‹"}</button>
                        <h3>{ grid.cursor.title() }</h3>
                        <button type="button" onclick={on_next} aria-label="Next month">{"›"}</button>
                    </header>
                    <div class="clinic-calendar-grid">
                        { for WEEKDAY_LABELS.iter().map(|label| html! { <span class="clinic-weekday">{ *label }</span> }) }
                        { for grid.cells.iter().map(|cell| render_cell(cell, on_pick_date.clone())) }
                    </div>
                </div>
            }
        } else {
            Html::default()
        };

        let status_chips = render_status_chips(filters.clone());

        html! {
            <div class="clinic-root">
                <header class="clinic-header">
                    <div>
                        <span class="clinic-eyebrow">{ format!("{} today", todays_count) }</span>
                        <h2>{"Appointments"}</h2>
                    </div>
                    <select class="clinic-language" onchange={on_language} aria-label="Language">
                        {
                            for Language::ALL.iter().map(|lang| html! {
                                <option value={lang.as_code()} selected={*lang == *language}>
                                    { format!("{} {}", lang.flag(), lang.label()) }
                                </option>
                            })
                        }
                    </select>
                </header>
                <section class="clinic-toolbar">
                    <input
                        type="search"
                        placeholder="Search by patient, appointment id or doctor"
                        value={filters_value.search.clone()}
                        oninput={on_search}
                        aria-label="Search appointments"
                    />
                    { status_chips }
                    <select onchange={on_doctor} aria-label="Doctor">
                        <option value="" selected={filters_value.facet(Facet::Doctor).is_none()}>{"All doctors"}</option>
                        {
                            for doctors.iter().map(|doctor| html! {
                                <option
                                    value={doctor.clone()}
                                    selected={filters_value.facet(Facet::Doctor) == Some(doctor.as_str())}
                                >
                                    { doctor.clone() }
                                </option>
                            })
                        }
                    </select>
                    <div class="clinic-date-picker">
                        <button type="button" onclick={on_toggle_calendar}>
                            { selected.map(|d| d.to_string()).unwrap_or_else(|| "Pick a date".to_string()) }
                        </button>
                        { calendar }
                    </div>
                    <button type="button" onclick={on_clear_filters} aria-label="Clear filters">{"Reset"}</button>
                </section>
                <section class="clinic-table" aria-live="polite">
                    {
                        if grouped.is_empty() {
                            html! { <p class="clinic-empty">{"No appointments match the current filters."}</p> }
                        } else {
                            html! {
                                <>
                                    { for grouped.iter().map(|(date, rows)| {
                                        render_day(*date, today, rows, on_status_change.clone())
                                    }) }
                                </>
                            }
                        }
                    }
                </section>
                { render_statistics(table_rows.len(), window_days, &statistics) }
            </div>
        }
    }

    fn render_statistics(
        total: usize,
        window_days: u32,
        statistics: &BTreeMap<AppointmentStatus, usize>,
    ) -> Html {
        html! {
            <section class="clinic-stats" aria-label="Appointment statistics">
                <h3>{"Appointment statistics"}</h3>
                <p class="clinic-muted">{ format!("Today and the next {window_days} days") }</p>
                <div class="clinic-stats-grid">
                    <div class="clinic-stat">
                        <strong>{ total }</strong>
                        <span>{"Total"}</span>
                    </div>
                    {
                        for statistics.iter().map(|(status, count)| html! {
                            <div class="clinic-stat" data-status={status.as_code()}>
                                <strong>{ *count }</strong>
                                <span>{ status.label() }</span>
                            </div>
                        })
                    }
                </div>
            </section>
        }
    }

    fn render_status_chips(filters: UseStateHandle<FilterState>) -> Html {
        html! {
            <div class="filter-chips" role="group" aria-label="Filter by status">
                {
                    for AppointmentStatus::ALL.iter().map(|status| {
                        let filters = filters.clone();
                        let code = status.as_code();
                        let is_active = filters.facet(Facet::Status) == Some(code);
                        let onclick = Callback::from(move |_| {
                            let mut next = (*filters).clone();
                            next.toggle_facet(Facet::Status, code);
                            filters.set(next);
                        });

                        html! {
                            <button
                                type="button"
                                class={classes!("filter-chip", is_active.then_some("is-active"))}
                                data-status={code}
                                onclick={onclick}
                            >
                                { status.label() }
                            </button>
                        }
                    })
                }
            </div>
        }
    }

    fn render_cell(cell: &CalendarCell, on_pick: Callback<NaiveDate>) -> Html {
        let date = cell.date;
        let onclick = Callback::from(move |_| on_pick.emit(date));
        html! {
            <button
                type="button"
                class={classes!(
                    "clinic-day",
                    (!cell.is_current_month).then_some("is-outside"),
                    cell.is_today.then_some("is-today"),
                    cell.is_selected.then_some("is-selected"),
                    (cell.match_count > 0).then_some("has-matches")
                )}
                onclick={onclick}
            >
                <span>{ date.day() }</span>
                {
                    if cell.match_count > 0 {
                        html! { <span class="clinic-day-count">{ cell.match_count }</span> }
                    } else {
                        Html::default()
                    }
                }
            </button>
        }
    }

    fn render_day(
        date: NaiveDate,
        today: NaiveDate,
        rows: &[&Appointment],
        on_status_change: Callback<(String, AppointmentStatus)>,
    ) -> Html {
        let heading = if date == today {
            format!("Today · {}", date.format("%A, %B %-d"))
        } else {
            date.format("%A, %B %-d").to_string()
        };

        html! {
            <article class="clinic-day-group">
                <header>
                    <h3>{ heading }</h3>
                    <span class="clinic-count">{ rows.len() }</span>
                </header>
                <ul>
                    { for rows.iter().map(|appointment| render_appointment(appointment, on_status_change.clone())) }
                </ul>
            </article>
        }
    }

    fn render_appointment(
        appointment: &Appointment,
        on_status_change: Callback<(String, AppointmentStatus)>,
    ) -> Html {
        let is_open = matches!(
            appointment.status,
            AppointmentStatus::Confirmed | AppointmentStatus::Pending
        );
        let on_arrived = {
            let id = appointment.id.clone();
            let on_status_change = on_status_change.clone();
            Callback::from(move |_| on_status_change.emit((id.clone(), AppointmentStatus::Arrived)))
        };
        let on_cancel = {
            let id = appointment.id.clone();
            Callback::from(move |_| on_status_change.emit((id.clone(), AppointmentStatus::Cancelled)))
        };

        html! {
            <li class="clinic-appointment" data-status={appointment.status.as_code()}>
                <span class="clinic-time">{ appointment.time.format("%H:%M").to_string() }</span>
                <div class="clinic-appointment-body">
                    <strong>{ appointment.patient_name.clone() }</strong>
                    <span class="clinic-muted">{ format!("{} · {}", appointment.id, appointment.patient_id) }</span>
                    <span>{ format!("{} · {}", appointment.kind.label(), appointment.doctor) }</span>
                </div>
                <span class="clinic-status" data-status={appointment.status.as_code()}>
                    { appointment.status.label() }
                </span>
                {
                    if is_open {
                        html! {
                            <div class="clinic-actions">
                                <button type="button" onclick={on_arrived}>{"Mark arrived"}</button>
                                <button type="button" class="is-danger" onclick={on_cancel}>{"Cancel"}</button>
                            </div>
                        }
                    } else {
                        Html::default()
                    }
                }
            </li>
        }
    }

    #[wasm_bindgen]
    pub fn mount_appointments_view(
        selector: &str,
        dataset: JsValue,
        today: &str,
    ) -> Result<(), JsValue> {
        let window: Window = web_sys::window().ok_or_else(|| JsValue::from_str("No window"))?;
        let document: Document = window
            .document()
            .ok_or_else(|| JsValue::from_str("Cannot access document"))?;

        let target: Element = document
            .query_selector(selector)
            .map_err(|err| JsValue::from_str(&format!("Bad selector: {err:?}")))?
            .ok_or_else(|| JsValue::from_str("No element matches selector"))?;

        let dataset: ClinicDataset = from_value(dataset)?;
        dataset
            .validate()
            .map_err(|err| JsValue::from_str(&err.to_string()))?;
        let today = NaiveDate::parse_from_str(today, "%Y-%m-%d")
            .map_err(|err| JsValue::from_str(&format!("Invalid today date: {err}")))?;

        yew::Renderer::<AppointmentsView>::with_root_and_props(
            target,
            AppointmentsViewProps {
                dataset,
                today,
                config: DashboardConfig::default(),
            },
        )
        .render();
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm_ui::mount_appointments_view;

#[cfg(not(target_arch = "wasm32"))]
pub fn mount_appointments_view(
    _: &str,
    _: wasm_bindgen::JsValue,
    _: &str,
) -> Result<(), wasm_bindgen::JsValue> {
    Err(wasm_bindgen::JsValue::from_str(
        "clinic-ui only builds for the wasm32 target",
    ))
}
