use crate::{
    calendar::{format_date, MonthCursor, MonthGrid},
    event::{CalendarEvent, EventDraft},
    store::KeyValueStore,
};
use anyhow::Result;
use chrono::Datelike;

pub const EVENTS_KEY: &str = "opencrm_calendar_events";

/// Events whose date is `year-month-day`, in collection order.
pub fn events_on_day(
    events: &[CalendarEvent],
    year: i32,
    month: u32,
    day: u32,
) -> Vec<&CalendarEvent> {
    let wanted = format_date(year, month, day);
    events
        .iter()
        .filter(|e| {
            let date = e.date();
            format_date(date.year(), date.month(), date.day()) == wanted
        })
        .collect()
}

pub fn add_event(mut events: Vec<CalendarEvent>, draft: EventDraft) -> Vec<CalendarEvent> {
    events.push(CalendarEvent::from_draft(draft));
    events
}

pub fn toggle_task_completion(mut events: Vec<CalendarEvent>, id: &str) -> Vec<CalendarEvent> {
    for event in events.iter_mut().filter(|e| e.id() == id) {
        let completed = event.is_completed();
        event.set_completed(!completed);
    }
    events
}

pub fn delete_event(events: Vec<CalendarEvent>, id: &str) -> Vec<CalendarEvent> {
    events.into_iter().filter(|e| e.id() != id).collect()
}

/// A day's events split into appointments/reminders and the to-do list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agenda<'a> {
    pub date: chrono::NaiveDate,
    pub appointments: Vec<&'a CalendarEvent>,
    pub tasks: Vec<&'a CalendarEvent>,
}

impl<'a> Agenda<'a> {
    pub fn for_day(events: &'a [CalendarEvent], date: chrono::NaiveDate) -> Self {
        let (tasks, appointments): (Vec<_>, Vec<_>) =
            events_on_day(events, date.year(), date.month(), date.day())
                .into_iter()
                .partition(|e| e.is_task());

        Self {
            date,
            appointments,
            tasks,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.appointments.is_empty() && self.tasks.is_empty()
    }
}

/// What a calendar view holds: the month shown, the selected day and the
/// events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Calendar {
    cursor: MonthCursor,
    selected: chrono::NaiveDate,
    events: Vec<CalendarEvent>,
}

impl Calendar {
    pub fn new(selected: chrono::NaiveDate, events: Vec<CalendarEvent>) -> Self {
        Self {
            cursor: MonthCursor::containing(selected),
            selected,
            events,
        }
    }

    pub fn today(events: Vec<CalendarEvent>) -> Self {
        Self::new(chrono::Local::now().date_naive(), events)
    }

    pub fn cursor(&self) -> MonthCursor {
        self.cursor
    }

    pub fn selected(&self) -> chrono::NaiveDate {
        self.selected
    }

    pub fn events(&self) -> &[CalendarEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<CalendarEvent> {
        self.events
    }

    pub fn set_cursor(&mut self, cursor: MonthCursor) {
        self.cursor = cursor;
    }

    pub fn next_month(&mut self) -> MonthCursor {
        self.cursor = self.cursor.next();
        self.cursor
    }

    pub fn prev_month(&mut self) -> MonthCursor {
        self.cursor = self.cursor.prev();
        self.cursor
    }

    pub fn select(&mut self, date: chrono::NaiveDate) {
        self.selected = date;
    }

    /// Moves both the cursor and the selection to the current local date.
    pub fn go_to_today(&mut self) {
        let today = chrono::Local::now().date_naive();
        self.selected = today;
        self.cursor = MonthCursor::containing(today);
    }

    pub fn grid(&self) -> MonthGrid {
        MonthGrid::build(self.cursor, &self.events)
    }

    pub fn agenda(&self) -> Agenda<'_> {
        Agenda::for_day(&self.events, self.selected)
    }

    pub fn get(&self, id: &str) -> Option<&CalendarEvent> {
        self.events.iter().find(|e| e.id() == id)
    }

    /// Returns the id of the new event.
    pub fn add_event(&mut self, draft: EventDraft) -> String {
        self.events = add_event(std::mem::take(&mut self.events), draft);
        self.events
            .last()
            .map(|e| e.id().to_string())
            .unwrap_or_default()
    }

    /// Returns whether an event with that id existed.
    pub fn toggle_task_completion(&mut self, id: &str) -> bool {
        let found = self.get(id).is_some();
        self.events = toggle_task_completion(std::mem::take(&mut self.events), id);
        found
    }

    /// Returns whether an event with that id existed.
    pub fn delete_event(&mut self, id: &str) -> bool {
        let before = self.events.len();
        self.events = delete_event(std::mem::take(&mut self.events), id);
        before != self.events.len()
    }
}

/// Missing or unreadable data loads as no events.
pub fn load_events(store: &impl KeyValueStore) -> Vec<CalendarEvent> {
    match store.get(EVENTS_KEY) {
        Ok(Some(blob)) => serde_json::from_str(&blob).unwrap_or_else(|e| {
            log::warn!("stored events are corrupt, starting empty: {}", e);
            Vec::new()
        }),
        Ok(None) => Vec::new(),
        Err(e) => {
            log::warn!("could not read {}: {}", EVENTS_KEY, e);
            Vec::new()
        }
    }
}

pub fn save_events(store: &mut impl KeyValueStore, events: &[CalendarEvent]) -> Result<()> {
    store.set(EVENTS_KEY, &serde_json::to_string(events)?)?;
    log::debug!("persisted {} events under {}", events.len(), EVENTS_KEY);
    Ok(())
}
