//! Reminder management commands.

use clap::{Args, Subcommand};
use nudger_core::schedule::{Frequency, NotificationPreference};
use nudger_core::sync::{LoadOutcome, PreferenceController, PreferencesState};
use nudger_core::HttpGateway;

use super::context::Context;

#[derive(Subcommand)]
pub enum PrefsAction {
    /// List reminders stored on the backend
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Schedule a new reminder
    Add {
        #[command(flatten)]
        fields: PreferenceArgs,
        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },
    /// Replace an existing reminder
    Edit {
        /// Reminder ID as shown by `prefs list`
        id: String,
        #[command(flatten)]
        changes: EditArgs,
        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },
    /// Cancel a reminder and all of its backend jobs
    Remove {
        /// Reminder ID as shown by `prefs list`
        id: String,
        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
pub struct PreferenceArgs {
    /// Reminder title
    #[arg(long)]
    title: String,
    /// Time of day, HH:MM
    #[arg(long)]
    time: String,
    /// once, daily, weekly, monthly, weekdays or weekends
    #[arg(long, default_value = "daily")]
    frequency: Frequency,
    /// Comma-separated weekdays for weekly reminders (1 = Monday .. 7 = Sunday)
    #[arg(long, value_delimiter = ',')]
    days: Vec<u8>,
    /// Day of month for monthly reminders
    #[arg(long)]
    day_of_month: Option<u8>,
    /// Last day, DD-MM-YYYY
    #[arg(long)]
    end_date: Option<String>,
}

#[derive(Args)]
pub struct EditArgs {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    time: Option<String>,
    #[arg(long)]
    frequency: Option<Frequency>,
    /// Replaces the selected weekdays
    #[arg(long, value_delimiter = ',')]
    days: Option<Vec<u8>>,
    #[arg(long)]
    day_of_month: Option<u8>,
    #[arg(long, conflicts_with = "no_end_date")]
    end_date: Option<String>,
    /// Drop the end date
    #[arg(long)]
    no_end_date: bool,
}

impl PreferenceArgs {
    fn into_preference(self) -> NotificationPreference {
        let mut pref = NotificationPreference::new(self.title, self.time, self.frequency).with_days(self.days);
        pref.day_of_month = self.day_of_month;
        pref.end_date = self.end_date;
        pref.clear_unused_fields();
        pref
    }
}

impl EditArgs {
    fn apply_to(self, base: &NotificationPreference) -> NotificationPreference {
        let mut pref = NotificationPreference::new(
            self.title.unwrap_or_else(|| base.title.clone()),
            self.time.unwrap_or_else(|| base.time.clone()),
            self.frequency.unwrap_or(base.frequency),
        );
        pref.days_of_week = match self.days {
            Some(days) => days.into_iter().collect(),
            None => base.days_of_week.clone(),
        };
        pref.day_of_month = self.day_of_month.or(base.day_of_month);
        pref.end_date = if self.no_end_date {
            None
        } else {
            self.end_date.or_else(|| base.end_date.clone())
        };
        pref.clear_unused_fields();
        pref
    }
}

pub fn run(action: PrefsAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        PrefsAction::List { json } => {
            let ctx = Context::load()?;
            let prefs = ctx.preferences()?;
            let state = load(&ctx, &prefs)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&state.preferences)?);
            } else if state.preferences.is_empty() {
                println!("No reminders scheduled.");
            } else {
                print_table(&state);
            }
        }
        PrefsAction::Add { fields, json } => {
            let preference = fields.into_preference();
            preference.validate()?;

            let ctx = Context::load()?;
            let prefs = ctx.preferences()?;
            let outcome = ctx.runtime.block_on(prefs.create(preference));
            report(&prefs, &outcome, json)?;
            if !outcome.is_committed() {
                return Err(failure_text(&prefs).into());
            }
        }
        PrefsAction::Edit { id, changes, json } => {
            let ctx = Context::load()?;
            let prefs = ctx.preferences()?;
            let state = load(&ctx, &prefs)?;
            let old = state
                .find(&id)
                .cloned()
                .ok_or(format!("Reminder not found: {id}"))?;

            let edited = changes.apply_to(&old);
            edited.validate()?;

            prefs.begin_edit(old);
            let outcome = ctx.runtime.block_on(prefs.save(edited));
            report(&prefs, &outcome, json)?;
            if !outcome.is_committed() {
                return Err(failure_text(&prefs).into());
            }
        }
        PrefsAction::Remove { id, json } => {
            let ctx = Context::load()?;
            let prefs = ctx.preferences()?;
            let state = load(&ctx, &prefs)?;
            let target = state
                .find(&id)
                .cloned()
                .ok_or(format!("Reminder not found: {id}"))?;

            let outcome = ctx.runtime.block_on(prefs.remove(&target));
            report(&prefs, &outcome, json)?;
            if !outcome.removed {
                return Err(failure_text(&prefs).into());
            }
        }
    }
    Ok(())
}

/// Fill the controller from the backend, failing the command on error.
fn load(
    ctx: &Context,
    prefs: &PreferenceController<HttpGateway>,
) -> Result<PreferencesState, Box<dyn std::error::Error>> {
    match ctx.runtime.block_on(prefs.load()) {
        LoadOutcome::Failed(failure) => Err(failure.message.into()),
        LoadOutcome::Loaded { .. } | LoadOutcome::Empty => Ok(prefs.snapshot()),
    }
}

fn report<T: serde::Serialize>(
    prefs: &PreferenceController<HttpGateway>,
    outcome: &T,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
    } else {
        let state = prefs.snapshot();
        if state.status.is_success() {
            println!("{}", state.status.text());
        }
    }
    Ok(())
}

fn failure_text(prefs: &PreferenceController<HttpGateway>) -> String {
    prefs.snapshot().status.text().to_string()
}

fn print_table(state: &PreferencesState) {
    let id_width = state
        .preferences
        .iter()
        .map(|p| p.id.len())
        .max()
        .unwrap_or(2)
        .max(2);
    let title_width = state
        .preferences
        .iter()
        .map(|p| p.title.chars().count())
        .max()
        .unwrap_or(5)
        .max(5);

    println!("{:<id_width$}  {:<title_width$}  {:<4}  SCHEDULE", "ID", "TITLE", "JOBS");
    for pref in &state.preferences {
        println!(
            "{:<id_width$}  {:<title_width$}  {:<4}  {}",
            pref.id,
            pref.title,
            pref.job_ids.len(),
            pref.describe()
        );
    }
}
