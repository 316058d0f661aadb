use approx::assert_relative_eq;
use metraj::calibration::calibrate;
use metraj::cost::aggregate_project;
use metraj::digitize::{rectangle_perimeter_4_3, round2};
use metraj::geometry::{distance_to_segment, point_in_polygon, polygon_area_perimeter, Point};
use metraj::model::{
    Beam, BeamProperties, BuildingStats, CategoryModes, CostCatalog, Outline, Overrides,
    Pool, Project, Room, RoomProperties, Span, SpatialUnit, StructuralMode, Wall, WallMaterial,
    WallProperties,
};
use metraj::session::EditSession;
use metraj::takeoff::{compute_unit, derive_stats};
use pretty_assertions::assert_eq;

fn manual_room(id: u64, area: f64) -> Room {
    Room {
        id,
        name: format!("Oda {id}"),
        outline: Outline::Manual {
            area_m2: area,
            perimeter_m: None,
        },
        properties: RoomProperties::default(),
    }
}

fn furnished_unit(id: u64, mode: StructuralMode) -> SpatialUnit {
    let mut unit = SpatialUnit::new(id, format!("Kat {id}"));
    unit.mode = mode;
    unit.rooms.push(manual_room(1, 40.0));
    unit.rooms.push(manual_room(2, 15.0));
    unit.walls.push(Wall {
        id: 3,
        span: Span::Manual { length_m: 12.0 },
        properties: WallProperties {
            material: WallMaterial::Briket,
            ..WallProperties::default()
        },
    });
    unit.beams.push(Beam {
        id: 4,
        span: Span::Manual { length_m: 4.0 },
        properties: BeamProperties::default(),
    });
    unit
}

#[test]
fn manual_room_perimeter_from_area() {
    assert_relative_eq!(round2(rectangle_perimeter_4_3(15.0)), 15.65);
}

#[test]
fn calibration_round_trip() {
    for (d, l) in [(250.0, 5.0), (37.5, 0.75), (1234.5, 17.3)] {
        let scale = calibrate(d, l).unwrap();
        assert_relative_eq!(scale.px_per_meter(), d / l);
        assert_relative_eq!(scale.meters(d), l, epsilon = 1e-12);
    }
    assert!(calibrate(100.0, 0.0).is_err());
    assert!(calibrate(100.0, -2.0).is_err());
}

#[test]
fn geometry_primitives() {
    let square = vec![
        Point::new(0.0, 0.0),
        Point::new(10.0, 0.0),
        Point::new(10.0, 10.0),
        Point::new(0.0, 10.0),
    ];
    let m = polygon_area_perimeter(&square).unwrap();
    assert_relative_eq!(m.area, 100.0);
    assert_relative_eq!(m.perimeter, 40.0);
    assert!(point_in_polygon(Point::new(5.0, 5.0), &square));
    assert!(!point_in_polygon(Point::new(50.0, -50.0), &square));
    assert_relative_eq!(
        distance_to_segment(Point::new(5.0, 3.0), square[0], square[1]),
        3.0
    );
    assert!(polygon_area_perimeter(&square[..2]).is_none());
}

#[test]
fn tugla_wall_and_beam_scenarios() {
    let mut unit = SpatialUnit::new(1, "Normal Kat".to_string());
    unit.mode = StructuralMode::Detailed;
    unit.walls.push(Wall {
        id: 1,
        span: Span::Manual { length_m: 5.0 },
        properties: WallProperties {
            material: WallMaterial::Tugla,
            ..WallProperties::default()
        },
    });
    unit.beams.push(Beam {
        id: 2,
        span: Span::Manual { length_m: 4.0 },
        properties: BeamProperties {
            width: 25.0,
            height: 50.0,
            slab_thickness: 15.0,
        },
    });

    let stats = derive_stats(&unit, &BuildingStats::default());
    assert_relative_eq!(stats.wall_area(WallMaterial::Tugla), 13.75, epsilon = 1e-9);
    assert_relative_eq!(stats.beam_concrete_volume, 0.5, epsilon = 1e-9);
    assert_relative_eq!(stats.beam_formwork_area, 3.8, epsilon = 1e-9);
}

#[test]
fn global_item_is_building_wide() {
    let building = BuildingStats {
        normal_floor_count: 6,
        normal_floor_area: 300.0,
        ground_floor_area: 250.0,
        basement_floor_count: 0,
        ..BuildingStats::default()
    };
    let catalog: CostCatalog = serde_json::from_str(
        r#"[{"id":"kaba_insaat","title":"Kaba","structural":true,"items":[
            {"name":"Demir","unit":"ton","unit_price":24000,"auto_source":"total_area",
             "multiplier":0.045,"scope":"global"}
        ]}]"#,
    )
    .unwrap();

    let mut overrides = Overrides::default();
    overrides.set_quantity("Başka Kalem", Some(999.0));
    let units = vec![furnished_unit(1, StructuralMode::Detailed)];

    let report = aggregate_project(&units, &units, &catalog, &overrides, &CategoryModes::default(), &building);
    let item = report.item("Demir").unwrap();
    assert_relative_eq!(item.quantity, 92.25);
    assert_relative_eq!(report.structural_subtotal, 92.25 * 24000.0);
    assert_relative_eq!(report.fitout_subtotal, 0.0);
}

#[test]
fn toggling_mode_never_double_counts() {
    let catalog = CostCatalog::default();
    let building = BuildingStats::default();
    let overrides = Overrides::default();

    let global = vec![furnished_unit(1, StructuralMode::Global)];
    let detailed = vec![furnished_unit(1, StructuralMode::Detailed)];

    let modes = CategoryModes::default();
    let a = aggregate_project(&global, &[], &catalog, &overrides, &modes, &building);
    let b = aggregate_project(&detailed, &[], &catalog, &overrides, &modes, &building);

    // Building-wide structure is identical in both modes.
    assert_relative_eq!(a.structural_subtotal, b.structural_subtotal);

    // Each item is reported exactly once.
    for report in [&a, &b] {
        let names: Vec<&str> = report
            .categories
            .iter()
            .flat_map(|c| c.items.iter().map(|i| i.name.as_str()))
            .collect();
        let mut unique = names.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(names.len(), unique.len());
    }

    // Only the wall formulas change.
    let floor = "Şap Atılması";
    assert_relative_eq!(a.item(floor).unwrap().quantity, b.item(floor).unwrap().quantity);
    assert_relative_eq!(a.item("Briket Duvar (15'lik)").unwrap().quantity, 0.0);
    assert!(b.item("Briket Duvar (15'lik)").unwrap().quantity > 0.0);
    assert!(a.item("Gazbeton Duvar (13.5'luk)").unwrap().quantity > 0.0);
    assert_relative_eq!(b.item("Gazbeton Duvar (13.5'luk)").unwrap().quantity, 0.0);
}

#[test]
fn unit_takeoff_matches_project_for_single_unit() {
    let project_unit = furnished_unit(1, StructuralMode::Detailed);
    let catalog = CostCatalog::default();
    let building = BuildingStats::default();

    let takeoff = compute_unit(&project_unit, &catalog, &building);
    let report = aggregate_project(
        std::slice::from_ref(&project_unit),
        &[],
        &catalog,
        &Overrides::default(),
        &CategoryModes::default(),
        &building,
    );

    let name = "Tavan Boyası";
    assert_relative_eq!(report.item(name).unwrap().quantity, takeoff.quantities[name]);
}

#[test]
fn edit_session_end_to_end() {
    let mut project = Project::new("Bahçe Evleri".to_string());
    let id = project.add_unit(Pool::Architectural);
    project.set_unit_count(Pool::Architectural, id, 4);

    let mut session = EditSession::begin(&project, Pool::Architectural, id).unwrap();
    session
        .calibrate(&[Point::new(0.0, 0.0), Point::new(0.0, 500.0)], 10.0)
        .unwrap();
    for p in [
        Point::new(0.0, 0.0),
        Point::new(250.0, 0.0),
        Point::new(250.0, 200.0),
        Point::new(0.0, 200.0),
        Point::new(3.0, 4.0),
    ] {
        session.push_vertex(p);
    }
    assert_eq!(session.unit().rooms.len(), 1);

    let untouched = project.cost();
    session.commit(&mut project).unwrap();
    let report = project.cost();

    // 5 m x 4 m at 50 px/m, repeated four times.
    assert_relative_eq!(report.item("Şap Atılması").unwrap().quantity, 80.0, epsilon = 1e-9);
    assert!(report.fitout_subtotal > untouched.fitout_subtotal);
    assert_relative_eq!(report.structural_subtotal, untouched.structural_subtotal);
}

#[test]
fn structure_category_switch_prices_floor_plans_once() {
    let mut project = Project::new("Kule".to_string());
    let id = project.add_unit(Pool::Structural);
    project.set_pool_mode(Pool::Structural, StructuralMode::Detailed);
    project.set_unit_count(Pool::Structural, id, 6);

    let mut session = EditSession::begin(&project, Pool::Structural, id).unwrap();
    for _ in 0..20 {
        session.add_column_section(50.0, 50.0, None);
    }
    session.add_manual_beam(200.0, BeamProperties::default());
    session.commit(&mut project).unwrap();

    let global = project.cost();
    project.category_modes.set("kaba_insaat", StructuralMode::Detailed);
    let detailed = project.cost();

    // Column height follows the 2.9 m normal floor.
    let stats = derive_stats(&project.structural_units[0], &project.building);
    assert_relative_eq!(stats.column_concrete_volume, 14.5, epsilon = 1e-9);
    let volume = round2(stats.column_concrete_volume + stats.beam_concrete_volume);

    let concrete = detailed.item("Betonarme Betonu (C30)").unwrap();
    assert_relative_eq!(concrete.quantity, volume * 6.0, epsilon = 1e-9);
    assert!((detailed.structural_subtotal - global.structural_subtotal).abs() > 1.0);
    assert_relative_eq!(detailed.fitout_subtotal, global.fitout_subtotal);
    assert_relative_eq!(
        detailed.project_total,
        detailed.structural_subtotal + detailed.fitout_subtotal,
        epsilon = 1e-6
    );

    project.category_modes.set("kaba_insaat", StructuralMode::Global);
    assert_eq!(project.cost(), global);
}
