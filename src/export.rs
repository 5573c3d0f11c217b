use crate::{
    calendar::MonthCursor,
    event::{CalendarEvent, EventType},
};
use anyhow::{anyhow, Result};
use chrono::Datelike;

/// Serializations an event list can be written as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Json,
    Yaml,
    Cbor,
}

impl std::str::FromStr for ExportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            "cbor" => Ok(Self::Cbor),
            _ => Err(anyhow!(
                "Invalid export format '{}'; must be one of [json, yaml, cbor]",
                s
            )),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Cbor => "cbor",
        })
    }
}

/// Which events an export covers. The default covers all of them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportScope {
    pub month: Option<MonthCursor>,
    pub event_type: Option<EventType>,
    pub pending_only: bool,
}

impl ExportScope {
    pub fn includes(&self, event: &CalendarEvent) -> bool {
        if let Some(cursor) = self.month {
            let date = event.date();
            if date.year() != cursor.year() || date.month() != cursor.month() {
                return false;
            }
        }

        if let Some(typ) = self.event_type {
            if event.event_type() != typ {
                return false;
            }
        }

        !(self.pending_only && (!event.is_task() || event.is_completed()))
    }

    /// Matching events in date order, then start time with all-day events
    /// first. Ties keep collection order.
    pub fn select<'a>(&self, events: &'a [CalendarEvent]) -> Vec<&'a CalendarEvent> {
        let mut selected = events
            .iter()
            .filter(|e| self.includes(e))
            .collect::<Vec<_>>();
        selected.sort_by_key(|e| (e.date(), e.start_time()));
        selected
    }
}

/// Writes the events `scope` selects and returns how many were written.
pub fn export(
    w: &mut impl std::io::Write,
    events: &[CalendarEvent],
    scope: &ExportScope,
    format: ExportFormat,
) -> Result<usize> {
    let selected = scope.select(events);

    match format {
        ExportFormat::Json => serde_json::to_writer_pretty(&mut *w, &selected)?,
        ExportFormat::Yaml => serde_yaml::to_writer(&mut *w, &selected)?,
        ExportFormat::Cbor => ciborium::into_writer(&selected, &mut *w)?,
    }

    log::debug!("exported {} of {} events as {}", selected.len(), events.len(), format);
    Ok(selected.len())
}
