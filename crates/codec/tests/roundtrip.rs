//! Round-trip properties for both codecs

use proptest::prelude::*;
use recwire_codec::{Value, binary, text};

fn text_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        any::<f64>()
            .prop_filter("text has no non-finite floats", |f| f.is_finite())
            .prop_map(Value::Float),
        any::<String>().prop_map(Value::from),
    ]
}

/// Values the text format can carry: string keys, finite floats
fn arb_text_value() -> impl Strategy<Value = Value> {
    text_leaf().prop_recursive(4, 64, 8, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..8).prop_map(Value::List),
            prop::collection::vec((any::<String>(), inner), 0..8)
                .prop_map(|entries| entries.into_iter().collect::<Value>()),
        ]
    })
}

fn binary_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|i| Value::Int(i64::from(i))),
        any::<f64>().prop_map(Value::Float),
        any::<String>().prop_map(Value::from),
    ]
}

/// Values the binary format can carry: 32-bit ints, any key type
fn arb_binary_value() -> impl Strategy<Value = Value> {
    binary_leaf().prop_recursive(4, 64, 8, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..8).prop_map(Value::List),
            prop::collection::vec((inner.clone(), inner), 0..8)
                .prop_map(|entries| entries.into_iter().collect::<Value>()),
        ]
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_text_round_trip(value in arb_text_value()) {
        let encoded = text::encode(&value).unwrap();
        prop_assert_eq!(&text::decode(&encoded).unwrap(), &value);
        prop_assert_eq!(&text::decode_reader(encoded.as_bytes()).unwrap(), &value);
    }

    #[test]
    fn prop_text_encoding_is_stable(value in arb_text_value()) {
        let first = text::encode(&value).unwrap();
        let second = text::encode(&text::decode(&first).unwrap()).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_text_output_is_printable_ascii(value in arb_text_value()) {
        let encoded = text::encode(&value).unwrap();
        prop_assert!(encoded.chars().all(|c| (' '..='~').contains(&c)));
    }

    #[test]
    fn prop_binary_round_trip(value in arb_binary_value()) {
        let encoded = binary::encode(&value).unwrap();
        prop_assert_eq!(&binary::decode(&encoded).unwrap(), &value);
        prop_assert_eq!(&binary::decode_from(encoded.as_slice()).unwrap(), &value);
    }

    #[test]
    fn prop_text_and_binary_agree(value in arb_text_value()) {
        // Text values with 32-bit ints survive a trip through both formats
        prop_assume!(fits_binary(&value));
        let via_binary = binary::decode(&binary::encode(&value).unwrap()).unwrap();
        prop_assert_eq!(text::encode(&via_binary).unwrap(), text::encode(&value).unwrap());
    }
}

fn fits_binary(value: &Value) -> bool {
    match value {
        Value::Int(i) => i32::try_from(*i).is_ok(),
        Value::List(items) => items.iter().all(fits_binary),
        Value::Dict(dict) => dict.values().all(fits_binary),
        _ => true,
    }
}

#[test]
fn test_classification_examples() {
    assert_eq!(text::decode("42").unwrap(), Value::Int(42));
    for input in ["42.0", "4e2", "4+2"] {
        assert!(
            matches!(text::decode(input).unwrap(), Value::Float(_)),
            "input {:?}",
            input
        );
    }
    assert_eq!(text::decode("4+2").unwrap(), Value::Float(400.0));
}

#[test]
fn test_escaping_examples() {
    let value = Value::from("a\"b\nc");
    assert_eq!(text::decode(&text::encode(&value).unwrap()).unwrap(), value);

    let accented = Value::from("\u{e9}");
    let encoded = text::encode(&accented).unwrap();
    assert_eq!(encoded, "\"\\u00e9\"");
    assert_eq!(text::decode(&encoded).unwrap(), accented);
}

#[test]
fn test_int_keyed_dict_binary_round_trip() {
    let value: Value = vec![(1, "one"), (2, "two")].into_iter().collect();
    let decoded = binary::decode(&binary::encode(&value).unwrap()).unwrap();
    assert_eq!(decoded, value);
    assert_eq!(
        decoded.as_dict().unwrap().get(&Value::Int(2)),
        Some(&Value::from("two"))
    );
}

#[test]
fn test_binary_dict_preserves_insertion_order() {
    let value: Value = vec![("z", 1), ("a", 2), ("m", 3)].into_iter().collect();
    let decoded = binary::decode(&binary::encode(&value).unwrap()).unwrap();
    let keys: Vec<&str> = decoded
        .as_dict()
        .unwrap()
        .keys()
        .filter_map(Value::as_str)
        .collect();
    assert_eq!(keys, vec!["z", "a", "m"]);
}
