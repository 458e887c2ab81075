use serde::Serialize;
use uuid::Uuid;

use batna_models::session_files::SessionFiles;
use batna_models::BidRecord;

use crate::analysis::value_analysis;
use crate::error::EngineError;
use crate::session::CompletedNegotiation;

#[derive(Serialize)]
struct Transcript<'a> {
    negotiation_id: Uuid,
    rounds: &'a [BidRecord],
}

/// Folder name for a session bundle: start time plus the short id.
pub fn session_folder(completed: &CompletedNegotiation) -> String {
    format!(
        "negotiations/{}_{}",
        completed.meta.started_at.format("%Y-%m-%dT%H-%M-%S"),
        completed.meta.short_id()
    )
}

/// Render the three per-session JSON documents. Nothing touches disk here.
pub fn session_files(completed: &CompletedNegotiation) -> Result<SessionFiles, EngineError> {
    let transcript = Transcript {
        negotiation_id: completed.meta.negotiation_id,
        rounds: &completed.rounds,
    };

    Ok(SessionFiles {
        folder: session_folder(completed),
        negotiation_meta: serde_json::to_string_pretty(&completed.meta)?,
        bid_transcript: serde_json::to_string_pretty(&transcript)?,
        value_analysis: serde_json::to_string_pretty(&value_analysis(&completed.meta))?,
    })
}
