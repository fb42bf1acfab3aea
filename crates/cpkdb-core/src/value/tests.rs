use super::*;

#[test]
fn key_segment_is_defined_for_scalars_only() {
    assert_eq!(Value::Int(-5).key_segment().as_deref(), Some("-5"));
    assert_eq!(Value::Uint(7).key_segment().as_deref(), Some("7"));
    assert_eq!(Value::Bool(true).key_segment().as_deref(), Some("true"));
    assert_eq!(Value::from("JP").key_segment().as_deref(), Some("JP"));

    assert_eq!(Value::Null.key_segment(), None);
    assert_eq!(Value::Unit.key_segment(), None);
    assert_eq!(Value::from((1u64, 2u64)).key_segment(), None);
}

#[test]
fn parse_segment_follows_field_kind() {
    assert_eq!(
        Value::parse_segment(EntityFieldKind::Uint, "42"),
        Some(Value::Uint(42))
    );
    assert_eq!(
        Value::parse_segment(EntityFieldKind::Int, "-3"),
        Some(Value::Int(-3))
    );
    assert_eq!(
        Value::parse_segment(EntityFieldKind::Text, "42"),
        Some(Value::Text("42".to_string()))
    );
    assert_eq!(Value::parse_segment(EntityFieldKind::Uint, "-1"), None);
    assert_eq!(Value::parse_segment(EntityFieldKind::Bool, "yes"), None);
}

#[test]
fn tuples_and_options_convert_into_values() {
    assert_eq!(
        Value::from((5u64, "JP")),
        Value::List(vec![Value::Uint(5), Value::Text("JP".to_string())])
    );
    assert_eq!(Value::from(None::<u64>), Value::Null);
    assert_eq!(Value::from(Some(3i64)), Value::Int(3));
}

#[test]
fn map_lookup_matches_text_keys() {
    let map = Value::from_named([("company", Value::Uint(5)), ("country_code", "JP".into())]);

    assert_eq!(map.map_get("company"), Some(&Value::Uint(5)));
    assert_eq!(map.map_get("missing"), None);
    assert_eq!(Value::Uint(1).map_get("company"), None);
}

#[test]
fn mixed_integer_comparison_is_numeric() {
    assert_eq!(
        Value::Int(-1).partial_cmp_scalar(&Value::Uint(0)),
        Some(Ordering::Less)
    );
    assert_eq!(
        Value::Text("a".into()).partial_cmp_scalar(&Value::Uint(0)),
        None
    );
}
