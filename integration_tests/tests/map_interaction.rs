mod common;

use common::CountingTarget;
use fleet_core::{
    project, FleetMapConfig, MapHost, Pixel, PointerEvent, StateCatalog, Viewport,
};

fn mounted_host() -> anyhow::Result<MapHost<CountingTarget>> {
    let config = FleetMapConfig::default();
    let catalog = StateCatalog::from_config(&config);
    let snapshots = common::fixture_snapshots()?;
    let viewport = Viewport::centered_on(snapshots[0].position, 12.0, 800.0, 600.0);
    let mut host = MapHost::new(
        CountingTarget::default(),
        viewport,
        config.point_style.clone(),
        config.hit_tolerance_px,
    );
    host.rebuild(&snapshots, &catalog);
    Ok(host)
}

#[test]
fn hovering_a_unit_shows_its_tooltip() -> anyhow::Result<()> {
    let mut host = mounted_host()?;
    let center = Pixel::new(400.0, 300.0);
    host.dispatch(PointerEvent::Move(Pixel::new(403.0, 298.0)));

    let tooltip = host.mounted().unwrap().interaction().tooltip();
    assert!(tooltip.is_visible());
    assert_eq!(tooltip.target().unwrap().name, "CA-0001");
    let anchor = host.viewport().coordinate_to_pixel(tooltip.anchor().unwrap());
    assert!(anchor.distance_to(Pixel::new(403.0, 298.0)) < 1e-6);
    assert!(anchor.distance_to(center) < 10.0);
    Ok(())
}

#[test]
fn pointer_move_over_empty_space_hides_tooltip() -> anyhow::Result<()> {
    let mut host = mounted_host()?;
    host.dispatch(PointerEvent::Move(Pixel::new(400.0, 300.0)));
    assert!(host.mounted().unwrap().interaction().tooltip().is_visible());

    host.dispatch(PointerEvent::Move(Pixel::new(20.0, 20.0)));
    let tooltip = host.mounted().unwrap().interaction().tooltip();
    assert!(!tooltip.is_visible());
    assert!(tooltip.target().is_none());
    Ok(())
}

#[test]
fn click_on_unit_requests_its_detail_route() -> anyhow::Result<()> {
    let mut host = mounted_host()?;
    let intent = host
        .dispatch(PointerEvent::Click(Pixel::new(400.0, 300.0)))
        .expect("click on the centered unit");
    assert_eq!(
        intent.route(),
        "/equipment/a7c53eb1-4f5e-4eba-9764-ad205d0891f9"
    );
    assert!(host
        .dispatch(PointerEvent::Click(Pixel::new(5.0, 5.0)))
        .is_none());
    Ok(())
}

#[test]
fn origin_unit_is_clickable_when_in_view() -> anyhow::Result<()> {
    let mut host = mounted_host()?;
    host.update_viewport(|viewport| viewport.center = project(fleet_core::GeoPoint::ORIGIN));
    let intent = host
        .dispatch(PointerEvent::Click(Pixel::new(400.0, 300.0)))
        .expect("unit without positions sits at the origin");
    assert_eq!(intent.equipment_id, "491b983b-950c-4a88-942d-487e99b92540");
    Ok(())
}

#[test]
fn reloads_keep_a_single_surface_attached() -> anyhow::Result<()> {
    let config = FleetMapConfig::default();
    let mut catalog = StateCatalog::from_config(&config);
    let snapshots = common::fixture_snapshots()?;
    let mut host = mounted_host()?;

    for index in 0..catalog.len() {
        catalog.toggle_at(index);
        host.rebuild(&snapshots, &catalog);
        assert_eq!(host.target().live, 1);
    }
    assert_eq!(host.target().peak, 1);
    assert_eq!(host.mounted().unwrap().layer().len(), 1, "only the unknown state remains");

    host.teardown();
    assert_eq!(host.target().live, 0);
    Ok(())
}
