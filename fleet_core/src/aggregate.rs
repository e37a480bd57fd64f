//! History aggregation: one current-state snapshot per equipment unit.
//!
//! The position history is the spine of the join and decides output order.
//! State histories and identity records are matched by equipment ID. When the
//! ID lookup misses, the entry at the same index is used, provided no spine
//! unit claims it by ID. Entries left unclaimed are appended after the spine
//! so no known unit disappears from the map.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::{debug, warn};

use crate::history::{EquipmentIdentity, HistoryError, HistorySources, StateHistory};

/// WGS84 coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    /// Placeholder for units with no position fix.
    pub const ORIGIN: GeoPoint = GeoPoint { lat: 0.0, lon: 0.0 };

    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquipmentSnapshot {
    pub equipment_id: String,
    /// Empty when the unit has no recorded state transitions.
    pub state_id: String,
    pub position: GeoPoint,
    pub name: String,
    pub model_name: Option<String>,
}

pub fn aggregate(sources: &HistorySources) -> Vec<EquipmentSnapshot> {
    let states = &sources.states;
    let equipment = &sources.equipment;
    let state_index: HashMap<&str, usize> = first_by_key(
        states
            .iter()
            .enumerate()
            .map(|(index, history)| (history.equipment_id.as_str(), index)),
    );
    let identity_index: HashMap<&str, usize> = first_by_key(
        equipment
            .iter()
            .enumerate()
            .filter_map(|(index, identity)| identity.id.as_deref().map(|id| (id, index))),
    );
    let models_by_id: HashMap<&str, &str> = first_by_key(
        sources
            .models
            .iter()
            .map(|model| (model.id.as_str(), model.name.as_str())),
    );

    if sources.positions.len() != states.len() || sources.positions.len() != equipment.len() {
        warn!(
            target: "fleet_map::aggregate",
            positions = sources.positions.len(),
            states = states.len(),
            equipment = equipment.len(),
            "aggregate.source_lengths_differ"
        );
    }

    let spine_keys: HashSet<&str> = sources
        .positions
        .iter()
        .map(|history| history.equipment_id.as_str())
        .collect();
    let mut state_claimed = vec![false; states.len()];
    let mut identity_claimed = vec![false; equipment.len()];

    // Keyed matches first, so a positional fallback never steals an entry
    // that a later spine unit matches by ID.
    let mut matches: Vec<(Option<usize>, Option<usize>)> = sources
        .positions
        .iter()
        .map(|history| {
            let key = history.equipment_id.as_str();
            let state = state_index.get(key).copied();
            let identity = identity_index.get(key).copied();
            claim(&mut state_claimed, state);
            claim(&mut identity_claimed, identity);
            (state, identity)
        })
        .collect();

    for (index, (state, identity)) in matches.iter_mut().enumerate() {
        if state.is_none()
            && states.get(index).is_some_and(|history| {
                !state_claimed[index] && !spine_keys.contains(history.equipment_id.as_str())
            })
        {
            *state = Some(index);
            state_claimed[index] = true;
        }
        if identity.is_none()
            && equipment.get(index).is_some_and(|record| {
                !identity_claimed[index]
                    && record.id.as_deref().map_or(true, |id| !spine_keys.contains(id))
            })
        {
            *identity = Some(index);
            identity_claimed[index] = true;
        }
    }

    let mut seen: HashSet<&str> = spine_keys;
    let mut snapshots = Vec::with_capacity(sources.positions.len());

    for (history, &(state, identity)) in sources.positions.iter().zip(&matches) {
        let equipment_id = history.equipment_id.as_str();
        if state.is_none() {
            warn!(
                target: "fleet_map::aggregate",
                equipment_id,
                "aggregate.state_history_missing"
            );
        }
        if identity.is_none() {
            warn!(
                target: "fleet_map::aggregate",
                equipment_id,
                "aggregate.identity_missing"
            );
        }

        let position = history
            .latest()
            .map(|fix| GeoPoint::new(fix.lat, fix.lon))
            .unwrap_or(GeoPoint::ORIGIN);

        snapshots.push(build_snapshot(
            equipment_id,
            state.map(|index| &states[index]),
            identity.map(|index| &equipment[index]),
            position,
            &models_by_id,
        ));
    }

    // Units without a position history still belong on the map.
    for (index, identity) in equipment.iter().enumerate() {
        if identity_claimed[index] {
            continue;
        }
        let Some(equipment_id) = identity.id.as_deref() else {
            debug!(
                target: "fleet_map::aggregate",
                index,
                "aggregate.identity_unmatched"
            );
            continue;
        };
        if !seen.insert(equipment_id) {
            continue;
        }
        debug!(
            target: "fleet_map::aggregate",
            equipment_id,
            "aggregate.position_history_missing"
        );
        let state = state_index
            .get(equipment_id)
            .copied()
            .filter(|&state| !state_claimed[state]);
        claim(&mut state_claimed, state);
        snapshots.push(build_snapshot(
            equipment_id,
            state.map(|index| &states[index]),
            Some(identity),
            GeoPoint::ORIGIN,
            &models_by_id,
        ));
    }
    for (index, history) in states.iter().enumerate() {
        let equipment_id = history.equipment_id.as_str();
        if state_claimed[index] || !seen.insert(equipment_id) {
            continue;
        }
        debug!(
            target: "fleet_map::aggregate",
            equipment_id,
            "aggregate.position_history_missing"
        );
        snapshots.push(build_snapshot(
            equipment_id,
            Some(history),
            None,
            GeoPoint::ORIGIN,
            &models_by_id,
        ));
    }

    debug!(
        target: "fleet_map::aggregate",
        snapshots = snapshots.len(),
        "aggregate.completed"
    );
    snapshots
}

fn claim(claimed: &mut [bool], index: Option<usize>) {
    if let Some(index) = index {
        claimed[index] = true;
    }
}

/// Aggregate a load result, treating any load failure as an empty fleet.
pub fn snapshots_or_empty<E>(loaded: Result<HistorySources, E>) -> Vec<EquipmentSnapshot>
where
    E: std::fmt::Display,
{
    match loaded {
        Ok(sources) => aggregate(&sources),
        Err(err) => {
            warn!(
                target: "fleet_map::aggregate",
                error = %err,
                "aggregate.skipped=load_failed"
            );
            Vec::new()
        }
    }
}

/// Parse the three required documents and aggregate them in one step.
pub fn aggregate_documents(
    positions: &str,
    states: &str,
    equipment: &str,
) -> Result<Vec<EquipmentSnapshot>, HistoryError> {
    let sources = HistorySources::from_documents(positions, states, equipment)?;
    Ok(aggregate(&sources))
}

fn build_snapshot(
    equipment_id: &str,
    state: Option<&StateHistory>,
    identity: Option<&EquipmentIdentity>,
    position: GeoPoint,
    models_by_id: &HashMap<&str, &str>,
) -> EquipmentSnapshot {
    let model_name = identity
        .and_then(|identity| identity.equipment_model_id.as_deref())
        .and_then(|model_id| models_by_id.get(model_id))
        .map(|name| name.to_string());
    EquipmentSnapshot {
        equipment_id: equipment_id.to_string(),
        state_id: state
            .and_then(StateHistory::latest_state_id)
            .unwrap_or_default()
            .to_string(),
        position,
        name: identity
            .map(|identity| identity.name.clone())
            .unwrap_or_default(),
        model_name,
    }
}

fn first_by_key<'a, V>(entries: impl Iterator<Item = (&'a str, V)>) -> HashMap<&'a str, V> {
    let mut map = HashMap::new();
    for (key, value) in entries {
        map.entry(key).or_insert(value);
    }
    map
}
