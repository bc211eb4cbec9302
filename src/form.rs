//! Add-task form validation.
//!
//! Input arrives as raw strings (from the TUI form or CLI flags) and is
//! validated per field, all fields in one pass, so the caller can show
//! every problem at once. A successful validation yields a [`NewTask`]
//! ready for the store.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDate, Utc};
use serde::Serialize;

use crate::task::{NewTask, Priority};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Raw add-task input, before validation.
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub priority: String,
    pub due_date: String,
}

/// Field name to message, ordered for stable display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors {
    errors: BTreeMap<String, String>,
}

impl FieldErrors {
    pub fn insert(&mut self, field: &str, message: impl Into<String>) {
        self.errors.insert(field.to_string(), message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors
            .iter()
            .map(|(field, message)| (field.as_str(), message.as_str()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

impl TaskDraft {
    /// Validate every field. Title must be non-blank, priority one of the
    /// known levels (blank means medium), and the due date, when given,
    /// a `YYYY-MM-DD` date no earlier than today.
    pub fn validate(&self) -> std::result::Result<NewTask, FieldErrors> {
        self.validate_on(Utc::now().date_naive())
    }

    fn validate_on(&self, today: NaiveDate) -> std::result::Result<NewTask, FieldErrors> {
        let mut errors = FieldErrors::default();

        let title = self.title.trim();
        if title.is_empty() {
            errors.insert("title", "title is required");
        }

        let priority = if self.priority.trim().is_empty() {
            Priority::default()
        } else {
            match Priority::parse(&self.priority) {
                Ok(priority) => priority,
                Err(_) => {
                    errors.insert("priority", "priority must be high, medium or low");
                    Priority::default()
                }
            }
        };

        let due_date = match self.due_date.trim() {
            "" => None,
            raw => match NaiveDate::parse_from_str(raw, DATE_FORMAT) {
                Ok(date) if date < today => {
                    errors.insert("dueDate", "due date cannot be in the past");
                    None
                }
                Ok(date) => Some(date),
                Err(_) => {
                    errors.insert("dueDate", "due date must be a valid YYYY-MM-DD date");
                    None
                }
            },
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        let description = self.description.trim();
        Ok(NewTask {
            title: title.to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
            priority,
            due_date,
        })
    }
}
