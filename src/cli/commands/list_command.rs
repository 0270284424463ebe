//! List command feature.
//!
//! This module owns and handles the "unitscan list" command behavior.
//! All views read the stored results; nothing here touches the disk tree.

use anyhow::{anyhow, Result};

use super::open_store;
use crate::config::Config;
use crate::index::{self, RowPredicate, Selection};
use crate::output::{self, OutputMode};

#[allow(clippy::too_many_arguments)]
pub(crate) fn handle_list(
    location: Option<String>,
    unit: Option<String>,
    missing_mer: bool,
    missing_program: bool,
    tree: bool,
    json: bool,
    mode: OutputMode,
) -> Result<()> {
    let config = Config::load();
    let store = open_store(&config)?;
    let aggregate = store.load()?;

    if tree {
        let groups = index::group(&aggregate.results);
        output::print_tree(&groups, mode);
        return Ok(());
    }

    let selection = match (location, unit) {
        (Some(location), Some(unit)) => Selection::Unit { location, unit },
        (Some(location), None) => Selection::Location(location),
        (None, Some(_)) => return Err(anyhow!("--unit requires --location")),
        (None, None) => Selection::All,
    };

    // The clap definitions keep these mutually exclusive.
    let predicate = if missing_mer {
        RowPredicate::MissingQuickPanel
    } else if missing_program {
        RowPredicate::MissingProgram
    } else {
        RowPredicate::None
    };

    let rows = index::filter(&aggregate.results, &selection, predicate);
    if json {
        output::print_records_json(&rows)?;
    } else {
        output::print_records_table(&rows, mode);
    }
    Ok(())
}
