//! JSON persistence for trained character n-gram models.
//!
//! The on-disk form is a 4-element record `(language, order, start table,
//! transition table)`. Fallback log-probabilities are stored inline under a
//! reserved `UNKNOWN` key, so the record round-trips losslessly through the
//! same structure.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{CodeswitchError, Result};
use crate::ngram::{NgramModel, ProbTable};

/// Reserved key carrying a table's fallback log-probability.
pub const UNKNOWN_KEY: &str = "UNKNOWN";

#[derive(Debug, Serialize, Deserialize)]
struct ModelRecord(
    String,
    usize,
    BTreeMap<String, f64>,
    BTreeMap<String, BTreeMap<String, f64>>,
);

/// Serialises the trained model to a JSON string.
pub fn model_json(model: &NgramModel, pretty: bool) -> Result<String> {
    let record = to_record(model);
    if pretty {
        Ok(serde_json::to_string_pretty(&record)?)
    } else {
        Ok(serde_json::to_string(&record)?)
    }
}

/// Reassembles a model from its JSON record.
pub fn model_from_json(json: &str) -> Result<NgramModel> {
    from_record(serde_json::from_str(json)?)
}

/// Persists the trained model as JSON at the given path.
pub fn save_model<P: AsRef<Path>>(model: &NgramModel, path: P, pretty: bool) -> Result<()> {
    let json = model_json(model, pretty)?;
    fs::write(path.as_ref(), json)
        .map_err(|err| CodeswitchError::io(err, Some(path.as_ref().to_path_buf())))
}

/// Loads a previously saved model from disk.
pub fn load_model<P: AsRef<Path>>(path: P) -> Result<NgramModel> {
    let json = fs::read_to_string(path.as_ref())
        .map_err(|err| CodeswitchError::io(err, Some(path.as_ref().to_path_buf())))?;
    model_from_json(&json)
}

fn to_record(model: &NgramModel) -> ModelRecord {
    let mut start: BTreeMap<String, f64> = model
        .start_table()
        .iter()
        .map(|(gram, value)| (gram.to_string(), value))
        .collect();
    start.insert(UNKNOWN_KEY.to_string(), model.start_table().unknown());

    let mut transitions: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
    for (gram, row) in model.transitions() {
        let mut entries: BTreeMap<String, f64> = row
            .iter()
            .map(|(next, value)| (next.to_string(), value))
            .collect();
        entries.insert(UNKNOWN_KEY.to_string(), row.unknown());
        transitions.insert(gram.clone(), entries);
    }
    transitions.insert(
        UNKNOWN_KEY.to_string(),
        BTreeMap::from([(UNKNOWN_KEY.to_string(), model.unseen_log_prob())]),
    );

    ModelRecord(
        model.language().to_string(),
        model.order(),
        start,
        transitions,
    )
}

fn from_record(record: ModelRecord) -> Result<NgramModel> {
    let ModelRecord(language, order, mut start_entries, mut transition_entries) = record;

    let start_unknown = start_entries.remove(UNKNOWN_KEY).ok_or_else(|| {
        CodeswitchError::Serialization("model record is missing the start fallback".into())
    })?;
    let start = ProbTable::from_entries(start_entries, start_unknown);

    let unseen = transition_entries
        .remove(UNKNOWN_KEY)
        .and_then(|row| row.get(UNKNOWN_KEY).copied())
        .ok_or_else(|| {
            CodeswitchError::Serialization(
                "model record is missing the global transition fallback".into(),
            )
        })?;

    let mut transitions: FxHashMap<String, ProbTable> = FxHashMap::default();
    transitions.reserve(transition_entries.len());
    for (gram, mut entries) in transition_entries {
        let unknown = entries.remove(UNKNOWN_KEY).ok_or_else(|| {
            CodeswitchError::Serialization(format!(
                "transition row {gram:?} is missing its fallback"
            ))
        })?;
        transitions.insert(gram, ProbTable::from_entries(entries, unknown));
    }

    NgramModel::from_parts(language, order, start, transitions, unseen)
}
