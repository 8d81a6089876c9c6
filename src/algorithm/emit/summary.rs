//! Per-kind, per-group counts of emitted and excluded rows

use log::info;
use serde::{Deserialize, Serialize};

/// Counts for one (kind, group) cell
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupCounts {
    pub kind: String,
    pub group: u8,
    pub observed: usize,
    pub censored: usize,
    pub excluded: usize,
}

impl GroupCounts {
    /// Rows emitted for this cell
    #[must_use]
    pub const fn emitted(&self) -> usize {
        self.observed + self.censored
    }
}

/// Outcome of one candidate row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tally {
    Observed,
    Censored,
    Excluded,
}

/// Counts for every (kind, group) cell seen, ordered by kind then group
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmitSummary {
    cells: Vec<GroupCounts>,
}

impl EmitSummary {
    fn cell_mut(&mut self, kind: &str, group: u8) -> &mut GroupCounts {
        let position = match self
            .cells
            .binary_search_by(|c| (c.kind.as_str(), c.group).cmp(&(kind, group)))
        {
            Ok(position) => position,
            Err(position) => {
                self.cells.insert(
                    position,
                    GroupCounts {
                        kind: kind.to_string(),
                        group,
                        ..GroupCounts::default()
                    },
                );
                position
            }
        };
        &mut self.cells[position]
    }

    /// Count one candidate row
    pub fn record(&mut self, kind: &str, group: u8, tally: Tally) {
        let cell = self.cell_mut(kind, group);
        match tally {
            Tally::Observed => cell.observed += 1,
            Tally::Censored => cell.censored += 1,
            Tally::Excluded => cell.excluded += 1,
        }
    }

    /// Merge another summary into this one
    pub fn merge(&mut self, other: &Self) {
        for cell in &other.cells {
            let target = self.cell_mut(&cell.kind, cell.group);
            target.observed += cell.observed;
            target.censored += cell.censored;
            target.excluded += cell.excluded;
        }
    }

    /// The counts for one cell
    #[must_use]
    pub fn get(&self, kind: &str, group: u8) -> Option<&GroupCounts> {
        self.cells.iter().find(|c| c.kind == kind && c.group == group)
    }

    /// All cells
    pub fn cells(&self) -> impl Iterator<Item = &GroupCounts> {
        self.cells.iter()
    }

    /// Write one log line per cell
    pub fn log(&self) {
        for cell in &self.cells {
            info!(
                "{} group {}: {} observed, {} censored, {} excluded",
                cell.kind, cell.group, cell.observed, cell.censored, cell.excluded
            );
        }
    }
}
