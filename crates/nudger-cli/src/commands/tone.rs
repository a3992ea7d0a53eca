//! Notification tone commands.

use clap::Subcommand;
use nudger_core::sync::ToneOutcome;

use super::context::Context;

#[derive(Subcommand)]
pub enum ToneAction {
    /// List the tone catalog, marking the current tone
    List {
        #[arg(long)]
        json: bool,
    },
    /// Show the tone applied to this device
    Get {
        #[arg(long)]
        json: bool,
    },
    /// Apply a tone by ID
    Set {
        /// Tone ID as shown by `tone list`
        tone_id: i64,
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: ToneAction) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::load()?;
    let tones = ctx.tones();

    match action {
        ToneAction::List { json } => {
            let outcome = ctx.runtime.block_on(tones.load());
            let state = tones.snapshot();
            if outcome.tones_loaded == 0 && !outcome.failures.is_empty() {
                return Err(state.status.text().to_string().into());
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&state.available)?);
                return Ok(());
            }
            for tone in &state.available {
                let marker = if state.selected_tone_id == Some(tone.tone_id) {
                    "*"
                } else {
                    " "
                };
                println!("{marker} {:>3}  {:<14} {}", tone.tone_id, tone.tone_name, tone.display_name);
            }
            if !state.status.is_empty() {
                eprintln!("{}", state.status.text());
            }
        }
        ToneAction::Get { json } => {
            ctx.require_token()?;
            ctx.runtime.block_on(tones.load());
            let state = tones.snapshot();
            let current = state
                .current
                .ok_or_else(|| state.status.text().to_string())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&current)?);
            } else {
                let suffix = if current.is_default { " (default)" } else { "" };
                println!("{} (id {}){suffix}", current.tone_name, current.tone_id);
            }
        }
        ToneAction::Set { tone_id, json } => {
            ctx.require_token()?;
            // catalog supplies the tone name for the result
            ctx.runtime.block_on(tones.load());
            match ctx.runtime.block_on(tones.select_tone(tone_id)) {
                ToneOutcome::Updated(preference) => {
                    if json {
                        println!("{}", serde_json::to_string_pretty(&preference)?);
                    } else {
                        println!("Tone set to {} (id {})", preference.tone_name, preference.tone_id);
                    }
                }
                ToneOutcome::Failed(_) => {
                    return Err(tones.snapshot().status.text().to_string().into());
                }
            }
        }
    }
    Ok(())
}
