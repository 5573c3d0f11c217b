use anyhow::anyhow;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Meeting,
    Reminder,
    Task,
}

impl EventType {
    pub fn is_task(&self) -> bool {
        matches!(self, Self::Task)
    }
}

impl std::str::FromStr for EventType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "meeting" => Ok(Self::Meeting),
            "reminder" => Ok(Self::Reminder),
            "task" => Ok(Self::Task),
            _ => Err(anyhow!(
                "Invalid event type; must be one of [meeting, reminder, task]"
            )),
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Meeting => "meeting",
            Self::Reminder => "reminder",
            Self::Task => "task",
        })
    }
}

// start times are stored as HH:MM
mod hhmm {
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(
        time: &Option<chrono::NaiveTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match time {
            Some(time) => serializer.serialize_str(&time.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<chrono::NaiveTime>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(s) => chrono::NaiveTime::parse_from_str(&s, FORMAT)
                .map(Some)
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}

pub fn parse_start_time(s: &str) -> Result<chrono::NaiveTime, anyhow::Error> {
    chrono::NaiveTime::parse_from_str(s, "%H:%M")
        .map_err(|_| anyhow!("Invalid time '{}'; must be HH:MM in 24 hour time", s))
}

pub fn parse_date(s: &str) -> Result<chrono::NaiveDate, anyhow::Error> {
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| anyhow!("Invalid date '{}'; must be YYYY-MM-DD", s))
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    id: String,
    title: String,
    date: chrono::NaiveDate,
    #[serde(
        default,
        with = "hhmm",
        skip_serializing_if = "Option::is_none"
    )]
    start_time: Option<chrono::NaiveTime>,
    #[serde(rename = "type")]
    typ: EventType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    completed: Option<bool>,
}

impl CalendarEvent {
    /// Gives the draft a fresh id. Tasks start out not completed.
    pub fn from_draft(draft: EventDraft) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            completed: if draft.typ.is_task() {
                Some(false)
            } else {
                None
            },
            title: draft.title,
            date: draft.date,
            start_time: draft.start_time,
            typ: draft.typ,
            description: draft.description,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> String {
        self.title.clone()
    }

    pub fn date(&self) -> chrono::NaiveDate {
        self.date
    }

    pub fn start_time(&self) -> Option<chrono::NaiveTime> {
        self.start_time
    }

    pub fn event_type(&self) -> EventType {
        self.typ
    }

    pub fn description(&self) -> Option<String> {
        self.description.clone()
    }

    pub fn completed(&self) -> Option<bool> {
        self.completed
    }

    pub fn is_task(&self) -> bool {
        self.typ.is_task()
    }

    pub fn is_completed(&self) -> bool {
        self.completed.unwrap_or(false)
    }

    pub fn set_completed(&mut self, completed: bool) -> &mut Self {
        self.completed = Some(completed);
        self
    }
}

/// An event as submitted, before it has an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    title: String,
    date: chrono::NaiveDate,
    start_time: Option<chrono::NaiveTime>,
    typ: EventType,
    description: Option<String>,
}

impl EventDraft {
    pub fn build(title: &str, date: chrono::NaiveDate) -> Self {
        Self {
            title: title.to_string(),
            date,
            start_time: None,
            typ: EventType::Meeting,
            description: None,
        }
    }

    pub fn set_start_time(&mut self, start_time: Option<chrono::NaiveTime>) -> &mut Self {
        self.start_time = start_time;
        self
    }

    pub fn set_event_type(&mut self, typ: EventType) -> &mut Self {
        self.typ = typ;
        self
    }

    pub fn set_description(&mut self, description: Option<String>) -> &mut Self {
        self.description = description;
        self
    }
}
