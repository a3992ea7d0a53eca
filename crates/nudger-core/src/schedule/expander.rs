//! Preference -> backend schedule requests.

use crate::gateway::ScheduleRequest;
use crate::schedule::{Frequency, NotificationPreference};

/// Requests that together realize `preference` for `token`.
///
/// Weekly preferences with selected days become one request per day, in
/// ascending day order. Everything else, including weekly without days,
/// becomes exactly one request. Only monthly requests carry a day of month.
pub fn expand(preference: &NotificationPreference, token: &str) -> Vec<ScheduleRequest> {
    let request = |weekday: Option<u8>, monthday: Option<u8>| ScheduleRequest {
        token: token.to_string(),
        title: preference.title.clone(),
        time: preference.time.clone(),
        frequency: preference.frequency,
        weekday,
        monthday,
        end_date: preference.end_date.clone(),
    };

    match preference.frequency {
        Frequency::Weekly if !preference.days_of_week.is_empty() => preference
            .days_of_week
            .iter()
            .map(|day| request(Some(*day), None))
            .collect(),
        Frequency::Weekly => vec![request(None, None)],
        Frequency::Monthly => vec![request(None, preference.day_of_month)],
        _ => vec![request(None, None)],
    }
}
