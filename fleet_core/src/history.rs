//! Raw history documents as served by the fleet data endpoint.
//!
//! Only the fields the aggregator reads are modeled; everything else in the
//! documents is ignored during deserialization.

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionFix {
    #[serde(default)]
    pub date: Option<String>,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionHistory {
    pub equipment_id: String,
    #[serde(default)]
    pub positions: Vec<PositionFix>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateTransition {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub equipment_state_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateHistory {
    pub equipment_id: String,
    #[serde(default)]
    pub states: Vec<StateTransition>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentIdentity {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub equipment_model_id: Option<String>,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EquipmentModel {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

impl PositionHistory {
    /// Latest known fix: the final entry of the history.
    pub fn latest(&self) -> Option<&PositionFix> {
        self.positions.last()
    }
}

impl StateHistory {
    pub fn latest_state_id(&self) -> Option<&str> {
        self.states
            .last()
            .map(|transition| transition.equipment_state_id.as_str())
    }
}

/// Which of the fleet documents a parse error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    PositionHistory,
    StateHistory,
    Equipment,
    EquipmentModel,
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            DocumentKind::PositionHistory => "position history",
            DocumentKind::StateHistory => "state history",
            DocumentKind::Equipment => "equipment",
            DocumentKind::EquipmentModel => "equipment model",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("failed to parse {kind} document: {source}")]
    Parse {
        kind: DocumentKind,
        #[source]
        source: serde_json::Error,
    },
}

/// The three required documents plus the optional model catalog, parsed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistorySources {
    pub positions: Vec<PositionHistory>,
    pub states: Vec<StateHistory>,
    pub equipment: Vec<EquipmentIdentity>,
    pub models: Vec<EquipmentModel>,
}

impl HistorySources {
    pub fn from_documents(
        positions: &str,
        states: &str,
        equipment: &str,
    ) -> Result<Self, HistoryError> {
        Ok(Self {
            positions: parse_document(positions, DocumentKind::PositionHistory)?,
            states: parse_document(states, DocumentKind::StateHistory)?,
            equipment: parse_document(equipment, DocumentKind::Equipment)?,
            models: Vec::new(),
        })
    }

    pub fn with_models_document(mut self, models: &str) -> Result<Self, HistoryError> {
        self.models = parse_models(models)?;
        Ok(self)
    }
}

/// Parse the optional model catalog on its own, so a bad catalog can be
/// dropped without touching already parsed sources.
pub fn parse_models(models: &str) -> Result<Vec<EquipmentModel>, HistoryError> {
    parse_document(models, DocumentKind::EquipmentModel)
}

fn parse_document<T>(json: &str, kind: DocumentKind) -> Result<Vec<T>, HistoryError>
where
    T: for<'de> Deserialize<'de>,
{
    serde_json::from_str(json).map_err(|source| HistoryError::Parse { kind, source })
}
