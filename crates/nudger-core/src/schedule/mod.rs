//! Recurring reminder types.
//!
//! A [`NotificationPreference`] is what the user sees: one reminder with one
//! recurrence rule. The backend only knows flat schedule jobs, so the
//! [`expander`] turns a preference into requests and [`reconcile`] folds the
//! backend's entries back into preferences.

pub mod expander;
pub mod reconcile;


pub use expander::expand;
pub use reconcile::reconcile;

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Wire format of [`NotificationPreference::time`].
pub const TIME_FORMAT: &str = "%H:%M";
/// Wire format of [`NotificationPreference::end_date`].
pub const END_DATE_FORMAT: &str = "%d-%m-%Y";

/// How often a reminder fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Once,
    Daily,
    Weekly,
    Monthly,
    /// Monday to Friday
    Weekdays,
    /// Saturday and Sunday
    Weekends,
}

impl Frequency {
    pub const ALL: [Frequency; 6] = [
        Frequency::Once,
        Frequency::Daily,
        Frequency::Weekly,
        Frequency::Monthly,
        Frequency::Weekdays,
        Frequency::Weekends,
    ];

    /// Value the backend stores and expects.
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Once => "once",
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Weekdays => "weekdays",
            Frequency::Weekends => "weekends",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of the known recurrence kinds.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown frequency '{0}'")]
pub struct UnknownFrequency(pub String);

impl FromStr for Frequency {
    type Err = UnknownFrequency;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Frequency::ALL
            .into_iter()
            .find(|f| f.as_str() == lower)
            .ok_or_else(|| UnknownFrequency(s.to_string()))
    }
}

/// One user-facing reminder, possibly realized by several backend jobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPreference {
    /// Local identifier; never sent to the backend.
    #[serde(default)]
    pub id: String,
    pub title: String,
    /// "HH:MM", 24-hour, device-local.
    pub time: String,
    pub frequency: Frequency,
    /// 1 = Monday .. 7 = Sunday. Only meaningful for weekly reminders.
    #[serde(default)]
    pub days_of_week: BTreeSet<u8>,
    /// 1..=31. Only meaningful for monthly reminders.
    #[serde(default)]
    pub day_of_month: Option<u8>,
    /// "DD-MM-YYYY"; `None` repeats forever.
    #[serde(default)]
    pub end_date: Option<String>,
    /// Backend job ids, one per realized schedule entry.
    #[serde(default)]
    pub job_ids: Vec<String>,
}

impl NotificationPreference {
    /// A preference that has not been scheduled yet.
    pub fn new(title: impl Into<String>, time: impl Into<String>, frequency: Frequency) -> Self {
        Self {
            id: String::new(),
            title: title.into(),
            time: time.into(),
            frequency,
            days_of_week: BTreeSet::new(),
            day_of_month: None,
            end_date: None,
            job_ids: Vec::new(),
        }
    }

    pub fn with_days(mut self, days: impl IntoIterator<Item = u8>) -> Self {
        self.days_of_week = days.into_iter().collect();
        self
    }

    pub fn with_day_of_month(mut self, day: u8) -> Self {
        self.day_of_month = Some(day);
        self
    }

    pub fn with_end_date(mut self, end_date: impl Into<String>) -> Self {
        self.end_date = Some(end_date.into());
        self
    }

    /// Drop recurrence fields the frequency does not use: weekdays unless
    /// weekly, day of month unless monthly.
    pub fn clear_unused_fields(&mut self) {
        if self.frequency != Frequency::Weekly {
            self.days_of_week.clear();
        }
        if self.frequency != Frequency::Monthly {
            self.day_of_month = None;
        }
    }

    /// Check the fields the backend would otherwise reject.
    ///
    /// Weekly reminders without days are accepted: they expand to a single
    /// request and the backend decides what to do with it.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::Blank { field: "title" });
        }
        if self.time.trim().is_empty() {
            return Err(ValidationError::Blank { field: "time" });
        }
        NaiveTime::parse_from_str(&self.time, TIME_FORMAT).map_err(|_| {
            ValidationError::InvalidValue {
                field: "time",
                message: format!("'{}' is not in HH:MM format (e.g. \"14:30\")", self.time),
            }
        })?;

        if let Some(end_date) = &self.end_date {
            NaiveDate::parse_from_str(end_date, END_DATE_FORMAT).map_err(|_| {
                ValidationError::InvalidValue {
                    field: "end_date",
                    message: format!("'{end_date}' is not in DD-MM-YYYY format (e.g. \"31-12-2025\")"),
                }
            })?;
        }

        if self.frequency == Frequency::Weekly {
            if let Some(day) = self.days_of_week.iter().find(|d| !(1..=7).contains(*d)) {
                return Err(ValidationError::InvalidValue {
                    field: "days_of_week",
                    message: format!("{day} is outside 1 (Monday) ..= 7 (Sunday)"),
                });
            }
        }

        if self.frequency == Frequency::Monthly {
            match self.day_of_month {
                None => {
                    return Err(ValidationError::InvalidValue {
                        field: "day_of_month",
                        message: "required for monthly frequency".to_string(),
                    })
                }
                Some(day) if !(1..=31).contains(&day) => {
                    return Err(ValidationError::InvalidValue {
                        field: "day_of_month",
                        message: format!("{day} is outside 1..=31"),
                    })
                }
                Some(_) => {}
            }
        }

        Ok(())
    }

    /// Short recurrence phrase, e.g. "weekly on 3 selected days".
    pub fn frequency_text(&self) -> String {
        match self.frequency {
            Frequency::Once => "once".to_string(),
            Frequency::Daily => "daily".to_string(),
            Frequency::Weekly if !self.days_of_week.is_empty() => {
                format!("weekly on {} selected days", self.days_of_week.len())
            }
            Frequency::Weekly => "weekly".to_string(),
            Frequency::Monthly => "monthly".to_string(),
            Frequency::Weekdays => "on weekdays".to_string(),
            Frequency::Weekends => "on weekends".to_string(),
        }
    }

    /// Full recurrence description for listings.
    pub fn describe(&self) -> String {
        let mut text = match self.frequency {
            Frequency::Once => format!("Once at {}", self.time),
            Frequency::Daily => format!("Daily at {}", self.time),
            Frequency::Weekly if self.days_of_week.is_empty() => format!("Weekly at {}", self.time),
            Frequency::Weekly => {
                let days = self
                    .days_of_week
                    .iter()
                    .filter_map(|d| weekday_short_name(*d))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("Weekly on {days} at {}", self.time)
            }
            Frequency::Monthly => match self.day_of_month {
                Some(day) => format!("Monthly on day {day} at {}", self.time),
                None => format!("Monthly at {}", self.time),
            },
            Frequency::Weekdays => format!("Weekdays at {}", self.time),
            Frequency::Weekends => format!("Weekends at {}", self.time),
        };
        if let Some(end_date) = &self.end_date {
            text.push_str(&format!(" until {end_date}"));
        }
        text
    }
}

/// "Mon" for 1 through "Sun" for 7.
pub fn weekday_short_name(day: u8) -> Option<&'static str> {
    const NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
    NAMES.get(usize::from(day).checked_sub(1)?).copied()
}
