//! Weekly study timetable builder

use crate::content::ContentCatalog;
use crate::errors::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DAYS: [&str; 5] = ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"];
pub const SLOTS: [&str; 4] = ["9am - 11am", "11am - 1pm", "2pm - 4pm", "4pm - 6pm"];

/// Label used when a selected subject is not in the catalog
pub const FALLBACK_SUBJECT: &str = "Study";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableRequest {
    /// Subject ids in the order they were picked
    #[serde(default)]
    pub subjects: Vec<String>,
    /// Day name to the slots free on that day
    #[serde(default)]
    pub available_slots: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub slot: String,
    pub subject: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySchedule {
    pub day: String,
    pub sessions: Vec<Session>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Timetable {
    pub days: Vec<DaySchedule>,
}

impl Timetable {
    pub fn session_count(&self) -> usize {
        self.days.iter().map(|d| d.sessions.len()).sum()
    }
}

/// Assign subjects round-robin over the free slots.
///
/// Days are visited Monday to Friday and slots in their canonical order, so
/// the result does not depend on the order the slots were submitted in.
pub fn build_timetable(request: &TimetableRequest, catalog: &ContentCatalog) -> Result<Timetable> {
    if request.subjects.is_empty() {
        return Err(AppError::field("subjects", "Please select at least one subject."));
    }

    for (day, slots) in &request.available_slots {
        if !DAYS.contains(&day.as_str()) {
            return Err(AppError::field("availableSlots", format!("Unknown day: {}", day)));
        }
        if let Some(slot) = slots.iter().find(|s| !SLOTS.contains(&s.as_str())) {
            return Err(AppError::field(
                "availableSlots",
                format!("Unknown study slot on {}: {}", day, slot),
            ));
        }
    }

    let mut subjects = request
        .subjects
        .iter()
        .map(|id| catalog.subject(id).map_or(FALLBACK_SUBJECT, |s| s.name.as_str()))
        .cycle();

    let mut days = Vec::new();
    for day in DAYS {
        let Some(free) = request.available_slots.get(day) else {
            continue;
        };
        let sessions: Vec<Session> = SLOTS
            .iter()
            .filter(|slot| free.iter().any(|f| f.as_str() == **slot))
            .filter_map(|slot| {
                subjects.next().map(|subject| Session {
                    slot: slot.to_string(),
                    subject: subject.to_string(),
                })
            })
            .collect();
        if !sessions.is_empty() {
            days.push(DaySchedule {
                day: day.to_string(),
                sessions,
            });
        }
    }

    if days.is_empty() {
        return Err(AppError::field(
            "availableSlots",
            "Please select at least one study slot.",
        ));
    }

    Ok(Timetable { days })
}
