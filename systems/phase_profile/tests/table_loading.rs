use fleet_policy_core::PlanetId;
use fleet_policy_system_phase_profile::{PhaseTable, ProfileError, Reach, UnitSampling};

const TWO_BANDS: &str = r#"
[[bands]]
name = "crowded"
after_turn = 30
more_than_units = 20

[bands.profile]
time_budget_secs = 1.5
speed_fraction = 0.5
max_units = 25
dock_check_ratio = 3
defensive_radius = 8.0
ship_reach = { kind = "fixed", distance = 60.0 }
planet_reach = { kind = "map_scaled", factor = 0.5, floor = 90.0 }
expansion_radius = 100.0
docked_target_reach = { kind = "fixed", distance = 150.0 }
diversify_expansion = false
avoid_units_threshold = 80
sampling = "sorted_prefix"

[bands.profile.behavior]
destroy_planet = 10
expansion = 30
collide_docked = 50
harass_docked = 70

[[bands]]
name = "default"
after_turn = 0

[bands.profile]
time_budget_secs = 1.9
speed_fraction = 1.0
max_units = 100
dock_check_ratio = 1
defensive_radius = 20.0
ship_reach = { kind = "fixed", distance = 50.0 }
planet_reach = { kind = "fixed", distance = 100.0 }
expansion_radius = 100.0
docked_target_reach = { kind = "fixed", distance = 100.0 }
diversify_expansion = true
avoid_units_threshold = 100
sampling = "seeded_sample"
excluded_planets = [0, 2]

[bands.profile.behavior]
destroy_planet = 0
expansion = 90
collide_docked = 0
harass_docked = 0
"#;

#[test]
fn toml_tables_select_like_built_in_ones() {
    let table = PhaseTable::from_toml_str(TWO_BANDS).expect("valid table");

    let crowded = table.select(31, 21);
    assert_eq!(crowded.max_units, 25);
    assert_eq!(
        crowded.planet_reach,
        Reach::MapScaled {
            factor: 0.5,
            floor: 90.0
        }
    );
    assert!(crowded.excluded_planets.is_empty());

    let fallback = table.select(31, 20);
    assert_eq!(fallback.sampling, UnitSampling::SeededSample);
    assert_eq!(
        fallback.excluded_planets,
        vec![PlanetId::new(0), PlanetId::new(2)]
    );
}

#[test]
fn built_in_table_survives_toml_rendering() {
    let table = PhaseTable::default();
    let rendered = table.to_toml_string().expect("table renders");
    let parsed = PhaseTable::from_toml_str(&rendered).expect("rendered table parses");
    assert_eq!(parsed, table);
}

#[test]
fn out_of_range_percentages_name_the_band() {
    let broken = TWO_BANDS.replace("harass_docked = 70", "harass_docked = 170");
    match PhaseTable::from_toml_str(&broken) {
        Err(ProfileError::InvalidBand { band, .. }) => assert_eq!(band, "crowded"),
        other => panic!("expected invalid band, got {other:?}"),
    }
}

#[test]
fn missing_bands_are_reported() {
    assert!(matches!(
        PhaseTable::from_toml_str("bands = []"),
        Err(ProfileError::Empty)
    ));
    assert!(matches!(
        PhaseTable::from_toml_str("bands = 3"),
        Err(ProfileError::Parse(_))
    ));
}
