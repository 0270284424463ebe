//! Show command feature.
//!
//! This module owns and handles the "unitscan show" command behavior.

use anyhow::{anyhow, Result};

use super::open_store;
use crate::config::Config;
use crate::index::{self, RowPredicate, Selection};
use crate::output;

pub(crate) fn handle_show(location: String, unit: String) -> Result<()> {
    let config = Config::load();
    let store = open_store(&config)?;
    let aggregate = store.load()?;

    let selection = Selection::Unit {
        location: location.clone(),
        unit: unit.clone(),
    };
    let rows = index::filter(&aggregate.results, &selection, RowPredicate::None);
    if rows.is_empty() {
        return Err(anyhow!(
            "No results for {}/{}. Has a scan been run?",
            location,
            unit
        ));
    }

    // Nested directories under one unit can yield several rows; the note
    // belongs to the unit, so print it once.
    let note = aggregate.note_for(&location, &unit);
    for (idx, record) in rows.iter().enumerate() {
        output::print_unit_detail(record, if idx == 0 { note } else { None });
    }
    Ok(())
}
