//! TypeScript Generation Tests
//!
//! Validates that Peloton types can be exported to TypeScript when the tauri
//! feature is enabled.

#[cfg(feature = "tauri")]
#[test]
fn test_core_types_implement_specta_type() {
    use specta::Type;

    // If this compiles, all types are properly configured for TypeScript export.
    fn assert_type<T: Type>() {}

    // Identifiers
    assert_type::<peloton::RaceId>();
    assert_type::<peloton::StageId>();
    assert_type::<peloton::SegmentId>();
    assert_type::<peloton::TeamId>();
    assert_type::<peloton::RiderId>();

    // Stage descriptors
    assert_type::<peloton::StageType>();
    assert_type::<peloton::StageState>();
    assert_type::<peloton::ClimbCategory>();
    assert_type::<peloton::SegmentKind>();
}

#[cfg(not(feature = "tauri"))]
#[test]
fn test_tauri_feature_disabled() {
    // Types still compile without specta::Type
    let _ = peloton::StageType::Flat;
}
