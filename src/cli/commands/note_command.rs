//! Note command feature.
//!
//! This module owns and handles the "unitscan note" command behavior.
//! Notes are keyed by location/unit and survive rescans.

use anyhow::Result;

use super::open_store;
use crate::config::Config;
use crate::output::OutputMode;
use crate::state::Aggregate;

pub(crate) fn handle_note(
    location: String,
    unit: String,
    text: Option<String>,
    clear: bool,
    mode: OutputMode,
) -> Result<()> {
    let config = Config::load();
    let store = open_store(&config)?;
    let mut aggregate = store.load()?;
    let key = Aggregate::note_key(&location, &unit);

    if clear {
        aggregate.clear_note(&location, &unit);
        store.save(&aggregate)?;
        if mode != OutputMode::Quiet {
            println!("Note cleared for {}", key);
        }
        return Ok(());
    }

    match text {
        Some(text) => {
            // Whitespace-only text removes the note instead of storing blanks.
            let removed = text.trim().is_empty();
            aggregate.set_note(&location, &unit, &text);
            store.save(&aggregate)?;
            if mode != OutputMode::Quiet {
                if removed {
                    println!("Note cleared for {}", key);
                } else {
                    println!("Note saved for {}", key);
                }
            }
        }
        None => match aggregate.note_for(&location, &unit) {
            Some(note) => println!("{}", note),
            None => {
                if mode != OutputMode::Quiet {
                    println!("No note for {}", key);
                }
            }
        },
    }
    Ok(())
}
