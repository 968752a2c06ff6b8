#![cfg(target_arch = "wasm32")]

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Node};

const STYLE_TAG_SELECTOR: &str = "style[data-clinic-ui]";

/// Default CSS for the view along with easy-to-override design tokens.
pub const DEFAULT_STYLES: &str = r#"
:root {
  --clinic-font-family: 'Inter', system-ui, -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif;
  --clinic-bg: #ffffff;
  --clinic-surface: #f8fafc;
  --clinic-border: rgba(148, 163, 184, 0.32);
  --clinic-radius: 14px;
  --clinic-text: #1f2933;
  --clinic-muted: #52606d;
  --clinic-primary: #2e4a70;
  --clinic-accent: #24b0ba;
  --clinic-status-confirmed: #067647;
  --clinic-status-confirmed-bg: rgba(6, 118, 71, 0.12);
  --clinic-status-pending: #dc6803;
  --clinic-status-pending-bg: rgba(220, 104, 3, 0.12);
  --clinic-status-cancelled: #b42318;
  --clinic-status-cancelled-bg: rgba(180, 35, 24, 0.1);
  --clinic-status-arrived: #0b5394;
  --clinic-status-arrived-bg: rgba(11, 83, 148, 0.12);
}

.clinic-root {
  font-family: var(--clinic-font-family);
  background: var(--clinic-bg);
  color: var(--clinic-text);
  border-radius: var(--clinic-radius);
  display: flex;
  flex-direction: column;
  gap: 20px;
  padding: 24px;
  box-shadow: 0 24px 48px rgba(15, 23, 42, 0.1);
}

.clinic-header {
  display: flex;
  justify-content: space-between;
  align-items: flex-end;
}

.clinic-header h2 {
  margin: 4px 0 0;
  font-size: 1.5rem;
}

.clinic-eyebrow {
  text-transform: uppercase;
  letter-spacing: 0.08em;
  font-size: 0.75rem;
  color: var(--clinic-muted);
}

.clinic-toolbar {
  display: flex;
  flex-wrap: wrap;
  gap: 12px;
  align-items: center;
}

.clinic-toolbar input[type="search"] {
  flex: 1 1 260px;
  padding: 8px 12px;
  border: 1px solid var(--clinic-border);
  border-radius: 10px;
}

.clinic-toolbar select,
.clinic-toolbar button,
.clinic-language {
  padding: 8px 12px;
  border: 1px solid var(--clinic-border);
  border-radius: 10px;
  background: var(--clinic-surface);
  cursor: pointer;
}

.filter-chips {
  display: flex;
  gap: 6px;
}

.filter-chip.is-active {
  background: var(--clinic-primary);
  color: #ffffff;
}

.clinic-date-picker {
  position: relative;
}

.clinic-calendar {
  position: absolute;
  top: calc(100% + 6px);
  left: 0;
  z-index: 50;
  width: 340px;
  padding: 16px;
  background: var(--clinic-bg);
  border: 1px solid var(--clinic-border);
  border-radius: var(--clinic-radius);
  box-shadow: 0 12px 24px rgba(15, 23, 42, 0.12);
}

.clinic-calendar-header {
  display: flex;
  justify-content: space-between;
  align-items: center;
  margin-bottom: 12px;
}

.clinic-calendar-header h3 {
  margin: 0;
  font-size: 1rem;
}

.clinic-calendar-grid {
  display: grid;
  grid-template-columns: repeat(7, 1fr);
  gap: 4px;
}

.clinic-weekday {
  text-align: center;
  font-size: 0.75rem;
  color: var(--clinic-muted);
}

.clinic-day {
  display: flex;
  flex-direction: column;
  align-items: center;
  justify-content: center;
  height: 42px;
  border: none;
  border-radius: 8px;
  background: transparent;
  cursor: pointer;
}

.clinic-day:hover {
  background: var(--clinic-surface);
}

.clinic-day.is-outside {
  color: #9aa5b1;
}

.clinic-day.has-matches {
  font-weight: 600;
}

.clinic-day.is-today {
  background: var(--clinic-primary);
  color: #ffffff;
}

.clinic-day.is-selected {
  background: var(--clinic-accent);
  color: #ffffff;
}

.clinic-day-count {
  font-size: 0.65rem;
  padding: 0 4px;
  border-radius: 4px;
  background: var(--clinic-primary);
  color: #ffffff;
}

.clinic-day.is-today .clinic-day-count,
.clinic-day.is-selected .clinic-day-count {
  background: #ffffff;
  color: var(--clinic-text);
}

.clinic-day-group {
  border: 1px solid var(--clinic-border);
  border-radius: var(--clinic-radius);
  margin-bottom: 16px;
  overflow: hidden;
}

.clinic-day-group header {
  display: flex;
  justify-content: space-between;
  align-items: center;
  padding: 10px 16px;
  background: var(--clinic-surface);
}

.clinic-day-group h3 {
  margin: 0;
  font-size: 1rem;
}

.clinic-day-group ul {
  list-style: none;
  margin: 0;
  padding: 0;
}

.clinic-appointment {
  display: grid;
  grid-template-columns: 64px 1fr auto auto;
  gap: 12px;
  align-items: center;
  padding: 12px 16px;
  border-top: 1px solid var(--clinic-border);
}

.clinic-appointment-body {
  display: flex;
  flex-direction: column;
  gap: 2px;
}

.clinic-time {
  font-variant-numeric: tabular-nums;
  font-weight: 600;
}

.clinic-muted,
.clinic-empty {
  color: var(--clinic-muted);
}

.clinic-status {
  padding: 2px 10px;
  border-radius: 999px;
  font-size: 0.8rem;
}

.clinic-status[data-status="confirmed"] {
  color: var(--clinic-status-confirmed);
  background: var(--clinic-status-confirmed-bg);
}

.clinic-status[data-status="pending"] {
  color: var(--clinic-status-pending);
  background: var(--clinic-status-pending-bg);
}

.clinic-status[data-status="cancelled"] {
  color: var(--clinic-status-cancelled);
  background: var(--clinic-status-cancelled-bg);
}

.clinic-status[data-status="arrived"] {
  color: var(--clinic-status-arrived);
  background: var(--clinic-status-arrived-bg);
}

.clinic-stats {
  border: 1px solid var(--clinic-border);
  border-radius: var(--clinic-radius);
  padding: 16px;
}

.clinic-stats h3 {
  margin: 0;
  font-size: 1rem;
}

.clinic-stats-grid {
  display: grid;
  grid-template-columns: repeat(5, 1fr);
  gap: 12px;
  margin-top: 12px;
}

.clinic-stat {
  display: flex;
  flex-direction: column;
  align-items: center;
  padding: 12px;
  border-radius: 10px;
  background: var(--clinic-surface);
}

.clinic-stat strong {
  font-size: 1.5rem;
}

.clinic-stat[data-status="confirmed"] strong {
  color: var(--clinic-status-confirmed);
}

.clinic-stat[data-status="pending"] strong {
  color: var(--clinic-status-pending);
}

.clinic-stat[data-status="cancelled"] strong {
  color: var(--clinic-status-cancelled);
}

.clinic-stat[data-status="arrived"] strong {
  color: var(--clinic-status-arrived);
}

.clinic-actions {
  display: flex;
  gap: 6px;
}

.clinic-actions button {
  padding: 6px 10px;
  border: 1px solid var(--clinic-border);
  border-radius: 8px;
  background: var(--clinic-surface);
  cursor: pointer;
}

.clinic-actions button.is-danger {
  color: var(--clinic-status-cancelled);
}

@media (max-width: 720px) {
  .clinic-appointment {
    grid-template-columns: 1fr;
  }

  .clinic-toolbar {
    flex-direction: column;
    align-items: stretch;
  }

  .clinic-calendar {
    width: 100%;
  }
}
"#;

pub fn ensure_styles(document: &Document) -> Result<(), JsValue> {
    if document.query_selector(STYLE_TAG_SELECTOR)?.is_some() {
        return Ok(());
    }

    let head = document
        .head()
        .ok_or_else(|| JsValue::from_str("Document has no <head>"))?;

    let style_el = document.create_element("style")?;
    style_el.set_attribute("data-clinic-ui", "v1")?;
    style_el.set_text_content(Some(DEFAULT_STYLES));
    head.append_child(&style_el.dyn_into::<Node>()?)?;

    Ok(())
}
