use crate::state::UnitRecord;

/// Tree label for rows whose location segment is blank.
pub const NO_LOCATION_LABEL: &str = "(no location)";
/// Tree label for rows whose unit segment is blank.
pub const NO_UNIT_LABEL: &str = "(no unit)";

/// Which slice of the results a query is asking for.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    All,
    Location(String),
    Unit { location: String, unit: String },
}

impl Selection {
    pub fn matches(&self, record: &UnitRecord) -> bool {
        match self {
            Selection::All => true,
            Selection::Location(location) => record.location.eq_ignore_ascii_case(location),
            Selection::Unit { location, unit } => {
                record.location.eq_ignore_ascii_case(location)
                    && record.unit.eq_ignore_ascii_case(unit)
            }
        }
    }
}

/// The two maintenance views. A single enum value, so the "missing quick
/// panel" and "missing program" filters can never be active together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowPredicate {
    #[default]
    None,
    MissingQuickPanel,
    MissingProgram,
}

impl RowPredicate {
    pub fn matches(&self, record: &UnitRecord) -> bool {
        match self {
            RowPredicate::None => true,
            RowPredicate::MissingQuickPanel => {
                record.is_quick_panel_missing() && !record.is_bak_summary()
            }
            RowPredicate::MissingProgram => record.is_program_missing(),
        }
    }
}

/// Select rows, preserving the aggregate's stored order.
pub fn filter<'a>(
    results: &'a [UnitRecord],
    selection: &Selection,
    predicate: RowPredicate,
) -> Vec<&'a UnitRecord> {
    results
        .iter()
        .filter(|record| selection.matches(record) && predicate.matches(record))
        .collect()
}

#[derive(Debug, Clone)]
pub struct UnitGroup {
    pub unit: String,
    pub display: String,
    pub row_count: usize,
}

#[derive(Debug, Clone)]
pub struct LocationGroup {
    pub location: String,
    pub display: String,
    pub units: Vec<UnitGroup>,
}

pub fn location_display(location: &str) -> &str {
    if location.is_empty() {
        NO_LOCATION_LABEL
    } else {
        location
    }
}

pub fn unit_display(unit: &str) -> &str {
    if unit.is_empty() {
        NO_UNIT_LABEL
    } else {
        unit
    }
}

/// Two-level grouping by location then unit, in first-appearance order.
/// Grouping keys are the exact stored strings; blanks only change the label.
pub fn group(results: &[UnitRecord]) -> Vec<LocationGroup> {
    let mut groups: Vec<LocationGroup> = Vec::new();
    for record in results {
        let idx = match groups
            .iter()
            .position(|group| group.location == record.location)
        {
            Some(idx) => idx,
            None => {
                groups.push(LocationGroup {
                    location: record.location.clone(),
                    display: location_display(&record.location).to_string(),
                    units: Vec::new(),
                });
                groups.len() - 1
            }
        };
        let location_group = &mut groups[idx];
        match location_group
            .units
            .iter_mut()
            .find(|group| group.unit == record.unit)
        {
            Some(unit_group) => unit_group.row_count += 1,
            None => location_group.units.push(UnitGroup {
                unit: record.unit.clone(),
                display: unit_display(&record.unit).to_string(),
                row_count: 1,
            }),
        }
    }
    groups
}
