use std::sync::Arc;

use fleet_core::{
    EquipmentSnapshot, FeatureLayer, FleetMapConfig, GeoPoint, HexColor, StateCatalog,
};

fn mixed_fleet(catalog: &StateCatalog) -> Vec<Arc<EquipmentSnapshot>> {
    let mut state_ids: Vec<String> = catalog.iter().map(|(id, _)| id.to_string()).collect();
    state_ids.push("unmapped-state".to_string());
    state_ids.push(String::new());

    (0..30)
        .map(|index| {
            Arc::new(EquipmentSnapshot {
                equipment_id: format!("eq-{index}"),
                state_id: state_ids[index % state_ids.len()].clone(),
                position: GeoPoint::new(-20.0 + index as f64 * 0.1, -45.0),
                name: format!("CA-{index:04}"),
                model_name: None,
            })
        })
        .collect()
}

fn rendered_ids(layer: &FeatureLayer) -> Vec<String> {
    layer
        .features()
        .iter()
        .map(|feature| feature.snapshot.equipment_id.clone())
        .collect()
}

/// Deselecting a state removes exactly its features and reselecting restores them.
#[test]
fn deselect_and_reselect_touch_only_that_state() {
    let config = FleetMapConfig::default();
    let mut catalog = StateCatalog::from_config(&config);
    let snapshots = mixed_fleet(&catalog);
    let full = FeatureLayer::build(&snapshots, &catalog, &config.point_style);
    assert_eq!(full.len(), snapshots.len(), "every unit renders when all states are selected");

    let state_ids: Vec<String> = catalog.iter().map(|(id, _)| id.to_string()).collect();
    for state_id in &state_ids {
        catalog.toggle(state_id);
        let reduced = FeatureLayer::build(&snapshots, &catalog, &config.point_style);

        let expected: Vec<String> = snapshots
            .iter()
            .filter(|snapshot| &snapshot.state_id != state_id)
            .map(|snapshot| snapshot.equipment_id.clone())
            .collect();
        assert_eq!(rendered_ids(&reduced), expected);

        catalog.toggle(state_id);
        let restored = FeatureLayer::build(&snapshots, &catalog, &config.point_style);
        assert_eq!(rendered_ids(&restored), rendered_ids(&full));
    }
}

#[test]
fn double_toggle_is_identity_for_every_state() {
    let mut catalog = StateCatalog::from_config(&FleetMapConfig::default());
    let original = catalog.clone();
    let mut ids: Vec<String> = catalog.iter().map(|(id, _)| id.to_string()).collect();
    ids.push("not-a-state".to_string());
    for id in &ids {
        catalog.toggle(id);
        catalog.toggle(id);
        assert_eq!(catalog, original);
    }
}

#[test]
fn color_lookup_is_total_and_stable() {
    let catalog = StateCatalog::from_config(&FleetMapConfig::default());
    for id in ["", "x", "0808344c-454b-4c36-89e8-d7687e692d57", "🚜"] {
        let first = catalog.color_of(id).clone();
        let second = catalog.color_of(id).clone();
        assert_eq!(first, second);
        assert!(HexColor::parse(first.as_str()).is_ok());
    }
}

#[test]
fn catalog_can_be_built_without_fixed_identifiers() {
    let catalog = StateCatalog::new(HexColor::parse("#777").unwrap()).with_state(
        "idle",
        fleet_core::EquipmentState::new("Idle", HexColor::parse("#abcdef").unwrap()),
    );
    assert_eq!(catalog.color_of("idle").as_str(), "#abcdef");
    assert_eq!(catalog.color_of("other").as_str(), "#777");
}
