//! Wide CSV rendering and per-session bundles for a finished batch.

use batna_engine::{session_files, CompletedNegotiation};
use batna_models::SessionFiles;

use crate::error::BatchError;
use crate::runner::BatchRun;

pub const BASE_COLUMNS: [&str; 16] = [
    "negotiation_id",
    "starting_price",
    "buyer_batna",
    "seller_batna",
    "estimated_buyer_batna",
    "estimated_seller_batna",
    "buyer_profile",
    "seller_profile",
    "outcome",
    "final_price",
    "total_rounds",
    "month_to_key",
    "termination_reason",
    "seller_surplus",
    "buyer_surplus",
    "total_surplus",
];

/// Column suffixes repeated for every round, in order.
pub const ROUND_FIELDS: [&str; 5] = ["agent", "bid", "month_to_key", "pressure1_id", "pressure2_id"];

pub fn csv_header(max_rounds: usize) -> Vec<String> {
    let mut header: Vec<String> = BASE_COLUMNS.iter().map(|c| c.to_string()).collect();
    for round in 1..=max_rounds {
        header.extend(ROUND_FIELDS.iter().map(|f| format!("round_{round}_{f}")));
    }
    header
}

fn opt(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// One row: the base columns, then one group per round, padded with empty cells.
pub fn csv_row(completed: &CompletedNegotiation, max_rounds: usize) -> Vec<String> {
    let meta = &completed.meta;
    let surplus = &meta.post_negotiation_analysis;

    let mut row = vec![
        meta.negotiation_id.to_string(),
        meta.starting_price.to_string(),
        meta.buyer_batna.to_string(),
        meta.seller_batna.to_string(),
        meta.estimated_buyer_batna.to_string(),
        meta.estimated_seller_batna.to_string(),
        meta.buyer_profile.to_string(),
        meta.seller_profile.to_string(),
        meta.outcome.to_string(),
        opt(meta.final_price),
        meta.total_rounds.to_string(),
        meta.month_to_key.to_string(),
        meta.termination_reason.to_string(),
        opt(surplus.seller_surplus),
        opt(surplus.buyer_surplus),
        opt(surplus.total_surplus),
    ];

    for index in 0..max_rounds {
        match completed.rounds.get(index) {
            Some(record) => row.extend([
                record.agent.to_string(),
                record.bid.to_string(),
                record.month.to_string(),
                record.pressure.first_id().unwrap_or_default(),
                record.pressure.second_id(),
            ]),
            None => row.extend(std::iter::repeat(String::new()).take(ROUND_FIELDS.len())),
        }
    }
    row
}

/// Quote a cell when it holds a delimiter, quote or line break.
pub fn escape_cell(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

fn write_line(out: &mut String, cells: &[String]) {
    let line: Vec<String> = cells.iter().map(|c| escape_cell(c)).collect();
    out.push_str(&line.join(","));
    out.push('\n');
}

/// Render sessions as a CSV: one header line plus one line per session.
pub fn to_csv<'a>(sessions: impl IntoIterator<Item = &'a CompletedNegotiation>) -> String {
    let sessions: Vec<&CompletedNegotiation> = sessions.into_iter().collect();
    let max_rounds = sessions.iter().map(|s| s.rounds.len()).max().unwrap_or(0);

    let mut out = String::new();
    write_line(&mut out, &csv_header(max_rounds));
    for session in sessions {
        write_line(&mut out, &csv_row(session, max_rounds));
    }
    out
}

pub fn run_to_csv(run: &BatchRun) -> String {
    to_csv(run.sessions())
}

/// Rendered JSON bundles for every session in the run, in scenario order.
pub fn bundles(run: &BatchRun) -> Result<Vec<SessionFiles>, BatchError> {
    run.sessions()
        .map(|s| session_files(s).map_err(BatchError::from))
        .collect()
}
