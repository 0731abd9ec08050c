//! Per-solve statistics and their tabular rendering.

use std::collections::HashMap;

use prettytable::{Cell, Row, Table};
use serde::Serialize;

use crate::{model::Model, solver::engine::PropagatorId};

/// Holds performance statistics for a single propagator.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct PropagatorStats {
    /// The number of times the propagator was invoked.
    pub revisions: u64,
    /// The number of invocations that shrank at least one domain.
    pub prunings: u64,
    /// The total time spent inside the propagator, in microseconds.
    pub time_spent_micros: u64,
}

/// Statistics for one solve, merged across workers in parallel mode.
#[derive(Debug, Default, Clone, Serialize)]
pub struct SolveStats {
    /// The total number of nodes (states) visited in the search tree.
    pub nodes_visited: u64,
    /// The total number of times the search backtracked.
    pub backtracks: u64,
    /// A map from [`PropagatorId`] to the statistics for that propagator.
    pub propagator_stats: HashMap<PropagatorId, PropagatorStats>,
}

impl SolveStats {
    pub(crate) fn merge(&mut self, other: &SolveStats) {
        self.nodes_visited += other.nodes_visited;
        self.backtracks += other.backtracks;
        for (id, stats) in &other.propagator_stats {
            let entry = self.propagator_stats.entry(*id).or_default();
            entry.revisions += stats.revisions;
            entry.prunings += stats.prunings;
            entry.time_spent_micros += stats.time_spent_micros;
        }
    }
}

fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        100.0 * part as f64 / whole as f64
    }
}

/// Renders a per-propagator breakdown, heaviest first.
///
/// Beyond the raw run counter the table reports each propagator's hit
/// rate (runs that actually pruned something) and its share of the
/// total propagation time; a hot propagator with a near-zero hit rate
/// is the usual sign a model needs restating. A footer row carries the
/// solve-wide totals.
pub fn render_stats_table(stats: &SolveStats, model: &Model) -> String {
    let mut rows: Vec<(&PropagatorId, &PropagatorStats)> = stats.propagator_stats.iter().collect();
    rows.sort_by(|a, b| {
        b.1.time_spent_micros
            .cmp(&a.1.time_spent_micros)
            .then(a.0.cmp(b.0))
    });

    let total_micros: u64 = rows.iter().map(|(_, row)| row.time_spent_micros).sum();
    let total_runs: u64 = rows.iter().map(|(_, row)| row.revisions).sum();

    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("Propagator"),
        Cell::new("Constraint"),
        Cell::new("Runs"),
        Cell::new("Hit rate"),
        Cell::new("Time (ms)"),
        Cell::new("Share"),
    ]));

    for (id, row) in rows {
        let descriptor = model.propagator(*id).descriptor();
        table.add_row(Row::new(vec![
            Cell::new(&format!("{} #{id}", descriptor.name)),
            Cell::new(&descriptor.description),
            Cell::new(&row.revisions.to_string()),
            Cell::new(&format!("{:.0}%", percent(row.prunings, row.revisions))),
            Cell::new(&format!("{:.2}", row.time_spent_micros as f64 / 1000.0)),
            Cell::new(&format!("{:.1}%", percent(row.time_spent_micros, total_micros))),
        ]));
    }

    table.add_row(Row::new(vec![
        Cell::new("total"),
        Cell::new(&format!(
            "{} nodes, {} backtracks",
            stats.nodes_visited, stats.backtracks
        )),
        Cell::new(&total_runs.to_string()),
        Cell::new(""),
        Cell::new(&format!("{:.2}", total_micros as f64 / 1000.0)),
        Cell::new(""),
    ]));

    table.to_string()
}
