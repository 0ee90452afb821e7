//! Column order comparison.
//!
//! Compares the declared order of a table's columns with their current
//! physical order and produces the moves that bring the table in line.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Kind of change applied to a column. Only repositioning is reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeOperation {
    /// Reposition an existing column.
    Move,
}

/// A column whose current position differs from its declared position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnChange {
    /// Physical column name.
    pub column: String,
    /// Logical field name, used in reports. Equal to `column` unless the
    /// schema renames the field.
    pub field: String,
    /// 0-based index in the working order just before this move.
    pub from_position: usize,
    /// 0-based target index.
    pub to_position: usize,
    /// What is done to the column.
    pub operation: ChangeOperation,
}

impl ColumnChange {
    /// Creates a move for a column whose field name equals its column name.
    #[must_use]
    pub fn moved(column: impl Into<String>, from_position: usize, to_position: usize) -> Self {
        let column = column.into();
        Self {
            field: column.clone(),
            column,
            from_position,
            to_position,
            operation: ChangeOperation::Move,
        }
    }

    /// Human-readable description, positions shown 1-based.
    #[must_use]
    pub fn describe(&self) -> String {
        let name = if self.field == self.column {
            self.field.clone()
        } else {
            format!("{} (column `{}`)", self.field, self.column)
        };
        format!(
            "Move {name} from position {} to {}",
            self.from_position + 1,
            self.to_position + 1
        )
    }
}

/// Restricts `order` to names contained in `keep`, dropping repeats.
fn retain_common(order: &[String], keep: &HashSet<&str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut common = Vec::new();
    for name in order {
        if keep.contains(name.as_str()) && seen.insert(name.as_str()) {
            common.push(name.clone());
        }
    }
    common
}

/// Restricts both orders to the names they share, each keeping its own
/// sequence. Returns `(expected, current)`.
#[must_use]
pub fn common_orders(expected: &[String], current: &[String]) -> (Vec<String>, Vec<String>) {
    let in_current: HashSet<&str> = current.iter().map(String::as_str).collect();
    let in_expected: HashSet<&str> = expected.iter().map(String::as_str).collect();
    (
        retain_common(expected, &in_current),
        retain_common(current, &in_expected),
    )
}

/// Computes the moves that turn `current` into `expected`.
///
/// Both inputs are first restricted to the names they share, so columns not
/// yet created (or not declared) are ignored. The scan walks the expected
/// order left to right; whenever the column at index `i` is not at index `i`
/// of the working order, a move is recorded and applied to the working
/// order. Applying the returned moves in sequence therefore reproduces the
/// expected order, the same way consecutive `MODIFY COLUMN ... AFTER`
/// statements behave on the server.
///
/// `from_position` and `to_position` are indices into the working order at
/// the time of each move, not into the original `current` slice.
#[must_use]
pub fn compute_moves(expected: &[String], current: &[String]) -> Vec<ColumnChange> {
    let (expected, mut working) = common_orders(expected, current);
    let mut changes = Vec::new();

    for (target, column) in expected.iter().enumerate() {
        let Some(position) = working.iter().position(|c| c == column) else {
            continue;
        };
        if position == target {
            continue;
        }
        let moved = working.remove(position);
        working.insert(target, moved);
        changes.push(ColumnChange::moved(column.clone(), position, target));
    }

    changes
}

/// Replays `changes` on `order` the way the server applies
/// `FIRST` / `AFTER <previous>` repositioning.
#[must_use]
pub fn apply_moves(order: &[String], changes: &[ColumnChange]) -> Vec<String> {
    let mut result = order.to_vec();
    for change in changes {
        if let Some(position) = result.iter().position(|c| *c == change.column) {
            let column = result.remove(position);
            let target = change.to_position.min(result.len());
            result.insert(target, column);
        }
    }
    result
}
