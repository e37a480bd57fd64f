//! Known equipment states with their legend color and visibility toggle.

use tracing::{debug, trace};

use crate::aggregate::EquipmentSnapshot;
use crate::color::HexColor;
use crate::config::FleetMapConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquipmentState {
    pub name: String,
    pub color: HexColor,
    pub is_selected: bool,
}

impl EquipmentState {
    pub fn new(name: impl Into<String>, color: HexColor) -> Self {
        Self {
            name: name.into(),
            color,
            is_selected: true,
        }
    }
}

/// Selection state for the legend, kept in legend display order.
///
/// The catalog is seeded once and never grows: toggling an unknown state ID
/// leaves it untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateCatalog {
    states: Vec<(String, EquipmentState)>,
    default_color: HexColor,
}

impl Default for StateCatalog {
    fn default() -> Self {
        Self::new(HexColor::default())
    }
}

impl StateCatalog {
    pub fn new(default_color: HexColor) -> Self {
        Self {
            states: Vec::new(),
            default_color,
        }
    }

    pub fn from_config(config: &FleetMapConfig) -> Self {
        let mut catalog = Self::new(config.default_color.clone());
        for state in &config.states {
            catalog = catalog.with_state(
                state.id.clone(),
                EquipmentState {
                    name: state.name.clone(),
                    color: state.color.clone(),
                    is_selected: state.selected,
                },
            );
        }
        catalog
    }

    /// Add a state. A repeated ID replaces the earlier entry in place.
    pub fn with_state(mut self, id: impl Into<String>, state: EquipmentState) -> Self {
        let id = id.into();
        match self.position(&id) {
            Some(index) => self.states[index].1 = state,
            None => self.states.push((id, state)),
        }
        self
    }

    fn position(&self, state_id: &str) -> Option<usize> {
        self.states.iter().position(|(id, _)| id == state_id)
    }

    pub fn get(&self, state_id: &str) -> Option<&EquipmentState> {
        self.position(state_id).map(|index| &self.states[index].1)
    }

    pub fn is_known(&self, state_id: &str) -> bool {
        self.position(state_id).is_some()
    }

    pub fn is_visible(&self, state_id: &str) -> bool {
        self.get(state_id).is_some_and(|state| state.is_selected)
    }

    pub fn color_of(&self, state_id: &str) -> &HexColor {
        self.get(state_id)
            .map(|state| &state.color)
            .unwrap_or(&self.default_color)
    }

    /// Legend name for a state. Unknown states have none.
    pub fn name_of(&self, state_id: &str) -> Option<&str> {
        self.get(state_id).map(|state| state.name.as_str())
    }

    /// Flip the selection of one state. Returns false when the ID is unknown.
    pub fn toggle(&mut self, state_id: &str) -> bool {
        let Some(index) = self.position(state_id) else {
            trace!(target: "fleet_map::catalog", state_id, "catalog.toggle_ignored=unknown");
            return false;
        };
        let state = &mut self.states[index].1;
        state.is_selected = !state.is_selected;
        debug!(
            target: "fleet_map::catalog",
            state_id,
            name = %state.name,
            selected = state.is_selected,
            "catalog.toggled"
        );
        true
    }

    /// Toggle the state at a legend row. Returns the toggled ID.
    pub fn toggle_at(&mut self, index: usize) -> Option<&str> {
        let id = self.states.get(index)?.0.clone();
        self.toggle(&id);
        self.states.get(index).map(|(id, _)| id.as_str())
    }

    /// Whether a snapshot in this state belongs on the map.
    ///
    /// Known states follow their toggle. States missing from the catalog cannot
    /// be toggled, so they are always drawn in the default color.
    pub fn admits(&self, state_id: &str) -> bool {
        match self.get(state_id) {
            Some(state) => state.is_selected,
            None => true,
        }
    }

    pub fn filter<'a>(
        &'a self,
        snapshots: &'a [EquipmentSnapshot],
    ) -> impl Iterator<Item = &'a EquipmentSnapshot> + 'a {
        snapshots
            .iter()
            .filter(move |snapshot| self.admits(&snapshot.state_id))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EquipmentState)> {
        self.states.iter().map(|(id, state)| (id.as_str(), state))
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::GeoPoint;

    const OPERANDO: &str = "0808344c-454b-4c36-89e8-d7687e692d57";
    const PARADO: &str = "baff9783-84e8-4e01-874b-6fd743b875ad";

    fn catalog() -> StateCatalog {
        StateCatalog::default()
            .with_state("run", EquipmentState::new("Running", HexColor::parse("#0f0").unwrap()))
            .with_state("stop", EquipmentState::new("Stopped", HexColor::parse("#ff0").unwrap()))
    }

    fn snapshot(id: &str, state_id: &str) -> EquipmentSnapshot {
        EquipmentSnapshot {
            equipment_id: id.to_string(),
            state_id: state_id.to_string(),
            position: GeoPoint::ORIGIN,
            name: id.to_string(),
            model_name: None,
        }
    }

    #[test]
    fn builtin_seed_has_three_selected_states() {
        let catalog = StateCatalog::from_config(&FleetMapConfig::default());
        assert_eq!(catalog.len(), 3);
        assert!(catalog.iter().all(|(_, state)| state.is_selected));
        assert_eq!(catalog.color_of(OPERANDO).as_str(), "#2ecc71");
        assert_eq!(catalog.name_of(PARADO), Some("Parado"));
    }

    #[test]
    fn unknown_states_get_default_color_and_no_name() {
        let catalog = catalog();
        assert_eq!(catalog.color_of("missing").as_str(), "#000");
        assert_eq!(catalog.color_of("").as_str(), "#000");
        assert_eq!(catalog.name_of("missing"), None);
        assert!(!catalog.is_visible("missing"));
        assert!(catalog.admits("missing"));
    }

    #[test]
    fn double_toggle_restores_selection() {
        let mut catalog = catalog();
        let before = catalog.clone();
        assert!(catalog.toggle("run"));
        assert!(!catalog.is_visible("run"));
        assert!(catalog.is_visible("stop"));
        assert!(catalog.toggle("run"));
        assert_eq!(catalog, before);
    }

    #[test]
    fn toggling_unknown_state_creates_nothing() {
        let mut catalog = catalog();
        let before = catalog.clone();
        assert!(!catalog.toggle("missing"));
        assert_eq!(catalog, before);
        assert!(!catalog.is_known("missing"));
    }

    #[test]
    fn toggle_leaves_colors_alone() {
        let mut catalog = catalog();
        catalog.toggle("stop");
        assert_eq!(catalog.color_of("stop").as_str(), "#ff0");
        assert_eq!(catalog.color_of("run").as_str(), "#0f0");
    }

    #[test]
    fn filter_removes_and_restores_exactly_one_state() {
        let snapshots = vec![
            snapshot("a", "run"),
            snapshot("b", "stop"),
            snapshot("c", "run"),
            snapshot("d", "ghost"),
        ];
        let mut catalog = catalog();
        let ids = |catalog: &StateCatalog| -> Vec<String> {
            catalog
                .filter(&snapshots)
                .map(|s| s.equipment_id.clone())
                .collect()
        };

        assert_eq!(ids(&catalog), vec!["a", "b", "c", "d"]);
        catalog.toggle("run");
        assert_eq!(ids(&catalog), vec!["b", "d"]);
        catalog.toggle("run");
        assert_eq!(ids(&catalog), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn toggle_at_follows_legend_order() {
        let mut catalog = catalog();
        assert_eq!(catalog.toggle_at(1), Some("stop"));
        assert!(!catalog.is_visible("stop"));
        assert_eq!(catalog.toggle_at(7), None);
    }

    #[test]
    fn repeated_id_replaces_entry() {
        let catalog = catalog().with_state(
            "run",
            EquipmentState::new("Operating", HexColor::parse("#00ff00").unwrap()),
        );
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.name_of("run"), Some("Operating"));
        assert_eq!(catalog.iter().next().map(|(id, _)| id), Some("run"));
    }
}
