use anyhow::Result;
use chrono::{DateTime, Duration, FixedOffset, Local, TimeZone, Utc};
use mapty_lib::{
    describe, load_config_util, parse_field, save_config_util, Config, ConfigError, ConfiguredLocation,
    Coords, DetailRow, FormInput, GeolocationConfig, GeolocationError, GeolocationProvider,
    KeyValueStore, ListEntry, MemoryStore, Persistence, PersistenceError, SqliteStore,
    StoreError, ValidationError, Workout, WorkoutKind, WorkoutType,
};

fn april_14() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 4, 14, 12, 0, 0).unwrap()
}

fn london() -> Coords {
    Coords::new(51.5, -0.1)
}

// Helper to build a couple of valid workouts with distinct timestamps
fn sample_workouts() -> Result<Vec<Workout>> {
    Ok(vec![
        Workout::running_at(april_14(), london(), 5.0, 25.0, 180.0)?,
        Workout::cycling_at(
            april_14() + Duration::minutes(5),
            Coords::new(48.85, 2.35),
            27.0,
            95.0,
            -120.0,
        )?,
        Workout::running_at(
            april_14() + Duration::days(1),
            Coords::new(40.71, -74.0),
            10.5,
            61.3,
            172.0,
        )?,
    ])
}

fn memory_persistence() -> Persistence {
    Persistence::new(Box::new(MemoryStore::new()))
}

#[test]
fn test_running_derives_pace_and_description() -> Result<()> {
    let run = Workout::running_at(april_14(), london(), 5.0, 25.0, 180.0)?;

    assert_eq!(run.workout_type(), WorkoutType::Running);
    assert_eq!(run.pace(), Some(25.0 / 5.0));
    assert_eq!(run.speed(), None);
    assert_eq!(run.description(), "Running on April 14");
    assert_eq!(run.metric(), 180.0);
    assert_eq!(run.popup_class(), "running-popup");
    assert!(run.popup_text().ends_with("Running on April 14"));

    // Pace for a handful of other valid inputs
    for (distance, duration) in [(1.0, 4.5), (42.195, 180.0), (0.4, 2.0)] {
        let run = Workout::running_at(april_14(), london(), distance, duration, 170.0)?;
        assert_eq!(run.pace(), Some(duration / distance));
        assert!(run.description().contains("Running"));
    }
    Ok(())
}

#[test]
fn test_cycling_derives_speed_and_accepts_descents() -> Result<()> {
    let ride = Workout::cycling_at(april_14(), london(), 30.0, 90.0, -250.0)?;

    assert_eq!(ride.workout_type(), WorkoutType::Cycling);
    assert_eq!(ride.speed(), Some(30.0 / (90.0 / 60.0)));
    assert_eq!(ride.pace(), None);
    assert_eq!(ride.description(), "Cycling on April 14");
    assert_eq!(ride.popup_class(), "cycling-popup");

    let flat = Workout::cycling_at(april_14(), london(), 20.0, 60.0, 0.0)?;
    assert_eq!(flat.speed(), Some(20.0));
    Ok(())
}

#[test]
fn test_description_uses_the_local_calendar_day() -> Result<()> {
    // 20:00 UTC is already the next morning in Auckland and still the
    // afternoon in New York
    let evening = Utc.with_ymd_and_hms(2024, 4, 14, 20, 0, 0).unwrap();
    let auckland = FixedOffset::east_opt(12 * 3600).unwrap();
    let new_york = FixedOffset::west_opt(4 * 3600).unwrap();

    assert_eq!(describe(WorkoutType::Running, evening, &auckland), "Running on April 15");
    assert_eq!(describe(WorkoutType::Cycling, evening, &new_york), "Cycling on April 14");
    assert_eq!(describe(WorkoutType::Running, evening, &Utc), "Running on April 14");

    let run = Workout::running_at(evening, london(), 5.0, 25.0, 180.0)?;
    assert_eq!(run.description(), describe(WorkoutType::Running, evening, &Local));
    Ok(())
}

#[test]
fn test_constructors_reject_invalid_values() {
    assert_eq!(
        Workout::running_at(april_14(), london(), -2.0, 25.0, 180.0),
        Err(ValidationError::InvalidDistance(-2.0))
    );
    assert_eq!(
        Workout::running_at(april_14(), london(), 5.0, 0.0, 180.0),
        Err(ValidationError::InvalidDuration(0.0))
    );
    assert_eq!(
        Workout::running_at(april_14(), london(), 5.0, 25.0, 0.0),
        Err(ValidationError::InvalidCadence(0.0))
    );
    assert!(matches!(
        Workout::cycling_at(april_14(), london(), 5.0, 25.0, f64::NAN),
        Err(ValidationError::InvalidElevation(_))
    ));
    assert!(matches!(
        Workout::cycling_at(april_14(), london(), f64::INFINITY, 25.0, 10.0),
        Err(ValidationError::InvalidDistance(_))
    ));
    assert!(matches!(
        Workout::running_at(april_14(), Coords::new(f64::NAN, 0.0), 5.0, 25.0, 180.0),
        Err(ValidationError::InvalidCoords(..))
    ));
}

#[test]
fn test_id_comes_from_creation_timestamp() -> Result<()> {
    let run = Workout::running_at(april_14(), london(), 5.0, 25.0, 180.0)?;
    // 2024-04-14T12:00:00Z is 1713096000000 ms
    assert_eq!(run.id(), "3096000000");
    assert_eq!(run.created_at(), april_14());

    let later = Workout::running_at(april_14() + Duration::milliseconds(1), london(), 5.0, 25.0, 180.0)?;
    assert_ne!(run.id(), later.id());
    Ok(())
}

#[test]
fn test_register_view_does_not_affect_equality() -> Result<()> {
    let original = Workout::running_at(april_14(), london(), 5.0, 25.0, 180.0)?;
    let mut viewed = original.clone();
    viewed.register_view();
    viewed.register_view();

    assert_eq!(viewed.views(), 2);
    assert_eq!(original.views(), 0);
    assert_eq!(original, viewed);
    Ok(())
}

#[test]
fn test_workout_type_parsing_and_toggle() {
    assert_eq!("running".parse::<WorkoutType>().ok(), Some(WorkoutType::Running));
    assert_eq!("Cycling".parse::<WorkoutType>().ok(), Some(WorkoutType::Cycling));
    assert!("swimming".parse::<WorkoutType>().is_err());
    assert_eq!(WorkoutType::Running.toggled(), WorkoutType::Cycling);
    assert_eq!(WorkoutType::Cycling.to_string(), "cycling");
}

#[test]
fn test_list_entry_details() -> Result<()> {
    let run = Workout::running_at(april_14(), london(), 5.0, 27.0, 180.0)?;
    let entry = ListEntry::from(&run);

    assert_eq!(entry.id, run.id());
    assert_eq!(entry.title, "Running on April 14");
    let values: Vec<(&str, &str)> = entry
        .details
        .iter()
        .map(|DetailRow { value, unit, .. }| (value.as_str(), *unit))
        .collect();
    assert_eq!(
        values,
        vec![("5", "km"), ("27", "min"), ("5.4", "min/km"), ("180", "spm")]
    );

    let ride = Workout::cycling_at(april_14(), london(), 12.0, 40.0, 85.0)?;
    let entry = ListEntry::from(&ride);
    assert_eq!(entry.details[2].value, "18.0");
    assert_eq!(entry.details[2].unit, "km/h");
    assert_eq!(entry.details[3].value, "85");
    assert_eq!(entry.details[3].unit, "m");
    Ok(())
}

#[test]
fn test_form_input_prefill_from_workout() -> Result<()> {
    let ride = Workout::cycling_at(april_14(), london(), 12.5, 40.0, -15.0)?;
    let form = FormInput::from(&ride);

    assert_eq!(form, FormInput::cycling("12.5", "40", "-15"));
    assert_eq!(form.metric(), "-15");
    Ok(())
}

#[test]
fn test_parse_field_follows_form_semantics() {
    assert_eq!(parse_field(""), 0.0);
    assert_eq!(parse_field("   "), 0.0);
    assert_eq!(parse_field(" 5.5 "), 5.5);
    assert_eq!(parse_field("-2"), -2.0);
    assert!(parse_field("five").is_nan());
    assert!(!parse_field("inf").is_finite());
}

// --- Persistence ---

#[test]
fn test_round_trip_reconstructs_variants() -> Result<()> {
    let workouts = sample_workouts()?;
    let mut persistence = memory_persistence();

    persistence.try_save(&workouts)?;
    let loaded = persistence.try_load()?;

    assert_eq!(loaded, workouts);
    assert!(matches!(loaded[0].kind(), WorkoutKind::Running { .. }));
    assert!(matches!(loaded[1].kind(), WorkoutKind::Cycling { .. }));
    assert_eq!(loaded[1].speed(), workouts[1].speed());
    assert_eq!(loaded[2].pace(), workouts[2].pace());
    Ok(())
}

#[test]
fn test_save_twice_leaves_payload_unchanged() -> Result<()> {
    let workouts = sample_workouts()?;
    let mut persistence = memory_persistence();

    persistence.save(&workouts);
    let first = persistence.raw_payload();
    persistence.save(&workouts);
    let second = persistence.raw_payload();

    assert!(first.is_some());
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_persisted_layout_uses_flat_objects() -> Result<()> {
    let mut persistence = memory_persistence();
    persistence.try_save(&sample_workouts()?[..2])?;

    let payload = persistence.raw_payload().expect("payload written");
    let value: serde_json::Value = serde_json::from_str(&payload)?;
    let items = value.as_array().expect("array payload");
    assert_eq!(items.len(), 2);

    let run = &items[0];
    assert_eq!(run["type"], "running");
    assert_eq!(run["id"], "3096000000");
    assert_eq!(run["coords"], serde_json::json!([51.5, -0.1]));
    assert_eq!(run["distanceKm"], 5.0);
    assert_eq!(run["durationMin"], 25.0);
    assert_eq!(run["cadenceSpm"], 180.0);
    assert_eq!(run["paceMinPerKm"], 5.0);
    assert_eq!(run["description"], "Running on April 14");
    assert!(run.get("createdAt").is_some());
    assert!(run.get("views").is_none());

    let ride = &items[1];
    assert_eq!(ride["type"], "cycling");
    assert_eq!(ride["elevationGainM"], -120.0);
    assert!(ride.get("speedKmPerH").is_some());
    assert!(ride.get("cadenceSpm").is_none());
    Ok(())
}

#[test]
fn test_reload_recomputes_derived_fields() -> Result<()> {
    let mut store = MemoryStore::new();
    // Stale pace written by an older build; it must not survive the reload.
    store.set(
        "workouts",
        r#"[{"id":"3096000000","createdAt":"2024-04-14T12:00:00Z","coords":[51.5,-0.1],
            "distanceKm":5.0,"durationMin":25.0,"description":"Running on April 14",
            "type":"running","cadenceSpm":180.0,"paceMinPerKm":99.0}]"#,
    )?;
    let persistence = Persistence::new(Box::new(store));

    let loaded = persistence.try_load()?;
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].pace(), Some(5.0));
    assert_eq!(loaded[0].id(), "3096000000");
    Ok(())
}

#[test]
fn test_load_fails_safe() -> Result<()> {
    // Absent key
    assert!(memory_persistence().load().is_empty());

    let cases = [
        "not json at all",
        "null",
        "{\"id\": 1}",
        // Valid JSON, but a stored workout breaks the invariants.
        r#"[{"id":"1","createdAt":"2024-04-14T12:00:00Z","coords":[51.5,-0.1],
            "distanceKm":-5.0,"durationMin":25.0,"description":"x",
            "type":"running","cadenceSpm":180.0}]"#,
        r#"[{"id":"1","createdAt":"2024-04-14T12:00:00Z","coords":[51.5,-0.1],
            "distanceKm":5.0,"durationMin":25.0,"description":"x","type":"swimming"}]"#,
    ];
    for payload in cases {
        let mut store = MemoryStore::new();
        store.set("workouts", payload)?;
        let persistence = Persistence::new(Box::new(store));
        assert!(persistence.load().is_empty(), "payload {payload:?} should load empty");
    }

    let mut store = MemoryStore::new();
    store.set("workouts", "garbage")?;
    let persistence = Persistence::new(Box::new(store));
    assert!(matches!(
        persistence.try_load(),
        Err(PersistenceError::Malformed(_))
    ));
    Ok(())
}

#[test]
fn test_save_over_quota_is_swallowed() -> Result<()> {
    let workouts = sample_workouts()?;
    let mut persistence = Persistence::new(Box::new(MemoryStore::new().with_quota(Some(300))));

    persistence.try_save(&workouts[..1])?;
    let before = persistence.raw_payload();

    let result = persistence.try_save(&workouts);
    assert!(matches!(
        result,
        Err(PersistenceError::Store(StoreError::QuotaExceeded { .. }))
    ));

    // Best-effort save must not panic and keeps the last good value.
    persistence.save(&workouts);
    assert_eq!(persistence.raw_payload(), before);
    Ok(())
}

#[test]
fn test_clear_removes_key() -> Result<()> {
    let mut persistence = memory_persistence();
    persistence.try_save(&sample_workouts()?)?;
    persistence.clear();

    assert!(persistence.raw_payload().is_none());
    assert!(persistence.load().is_empty());
    Ok(())
}

#[test]
fn test_custom_storage_key() -> Result<()> {
    let mut persistence = Persistence::with_key(Box::new(MemoryStore::new()), "mapty-test");
    persistence.try_save(&sample_workouts()?)?;
    assert_eq!(persistence.key(), "mapty-test");
    assert_eq!(persistence.try_load()?.len(), 3);
    Ok(())
}

// --- Stores ---

#[test]
fn test_sqlite_store_get_set_remove() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("nested").join("mapty.sqlite");

    {
        let mut store = SqliteStore::open(&path)?;
        assert_eq!(store.get("workouts")?, None);
        store.set("workouts", "[]")?;
        store.set("workouts", "[1]")?; // overwrite
        store.set("other", "x")?;
        assert_eq!(store.get("workouts")?.as_deref(), Some("[1]"));
    }

    // Reopen: values survive the connection.
    let mut store = SqliteStore::open(&path)?;
    assert_eq!(store.get("workouts")?.as_deref(), Some("[1]"));
    store.remove("workouts")?;
    store.remove("workouts")?; // absent key is fine
    assert_eq!(store.get("workouts")?, None);
    assert_eq!(store.get("other")?.as_deref(), Some("x"));
    Ok(())
}

#[test]
fn test_sqlite_store_quota() -> Result<()> {
    let mut store = SqliteStore::open_in_memory()?.with_quota(Some(20));
    store.set("a", "0123456789")?;
    // Replacing a key only counts the new value.
    store.set("a", "9876543210")?;
    let result = store.set("b", "0123456789");
    assert!(matches!(result, Err(StoreError::QuotaExceeded { .. })));
    assert_eq!(store.get("b")?, None);
    Ok(())
}

#[test]
fn test_persistence_round_trip_through_sqlite() -> Result<()> {
    let workouts = sample_workouts()?;
    let mut persistence = Persistence::new(Box::new(SqliteStore::open_in_memory()?));
    persistence.try_save(&workouts)?;
    assert_eq!(persistence.try_load()?, workouts);
    Ok(())
}

// --- Config ---

#[test]
fn test_config_defaults_written_when_missing() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("config.toml");

    let config = load_config_util(&path)?;
    assert_eq!(config, Config::default());
    assert_eq!(config.zoom_level, 13);
    assert_eq!(config.storage_key, "workouts");
    assert!(path.exists());
    Ok(())
}

#[test]
fn test_config_round_trip_and_partial_file() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("config.toml");

    let config = Config {
        zoom_level: 15,
        storage_quota_bytes: Some(4096),
        geolocation: GeolocationConfig {
            latitude: Some(51.5),
            longitude: Some(-0.1),
            ..Default::default()
        },
        ..Default::default()
    };
    save_config_util(&path, &config)?;
    assert_eq!(load_config_util(&path)?, config);

    // Missing fields fall back to defaults
    std::fs::write(&path, "zoom_level = 10\n")?;
    let partial = load_config_util(&path)?;
    assert_eq!(partial.zoom_level, 10);
    assert_eq!(partial.storage_key, "workouts");
    assert!(partial.geolocation.enabled);
    Ok(())
}

#[test]
fn test_config_rejects_invalid_values() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("config.toml");

    std::fs::write(&path, "zoom_level = 25\n")?;
    assert!(matches!(
        load_config_util(&path),
        Err(ConfigError::InvalidZoom(25))
    ));

    std::fs::write(&path, "storage_key = \"  \"\n")?;
    assert!(matches!(
        load_config_util(&path),
        Err(ConfigError::EmptyStorageKey)
    ));

    std::fs::write(&path, "zoom_level = \"high\"\n")?;
    assert!(matches!(
        load_config_util(&path),
        Err(ConfigError::TomlParse(_))
    ));
    Ok(())
}

// --- Geolocation ---

#[test]
fn test_configured_location() {
    let denied = ConfiguredLocation::new(GeolocationConfig {
        enabled: false,
        latitude: Some(51.5),
        longitude: Some(-0.1),
        ..Default::default()
    });
    assert_eq!(
        denied.current_position(),
        Err(GeolocationError::PermissionDenied)
    );

    let missing = ConfiguredLocation::new(GeolocationConfig::default());
    assert!(matches!(
        missing.current_position(),
        Err(GeolocationError::PositionUnavailable(_))
    ));

    let out_of_range = ConfiguredLocation::new(GeolocationConfig {
        latitude: Some(123.0),
        longitude: Some(0.0),
        ..Default::default()
    });
    assert!(matches!(
        out_of_range.current_position(),
        Err(GeolocationError::PositionUnavailable(_))
    ));

    let configured = ConfiguredLocation::new(GeolocationConfig {
        latitude: Some(51.5),
        longitude: Some(-0.1),
        accuracy_m: 12.0,
        ..Default::default()
    });
    let position = configured.current_position().expect("position configured");
    assert_eq!(position.coords, london());
    assert_eq!(position.accuracy_m, 12.0);
}
