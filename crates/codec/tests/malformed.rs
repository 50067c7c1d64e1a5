//! Malformed input is reported, never panics, and says where it went wrong

use recwire_codec::{
    BinaryDecoder, CodecConfig, DecodeError, InternCache, Production, TextDecoder, Value, binary,
    text,
};

fn both(input: &str) -> [Result<Value, DecodeError>; 2] {
    [text::decode(input), text::decode_reader(input.as_bytes())]
}

#[test]
fn test_open_brace_is_malformed() {
    for result in both("{") {
        assert!(matches!(result, Err(DecodeError::Malformed { .. })));
    }
}

#[test]
fn test_empty_input() {
    for result in both("") {
        assert!(matches!(result, Err(DecodeError::EmptyInput)));
    }
    assert!(matches!(binary::decode(&[]), Err(DecodeError::EmptyInput)));
    assert!(matches!(binary::decode_from(&[0u8; 0][..]), Err(DecodeError::EmptyInput)));
}

#[test]
fn test_productions_agree_across_sources() {
    let cases = [
        ("@", Production::Value),
        ("\"open", Production::String),
        ("{\"a\":1 \"b\":2}", Production::Object),
        ("[1;2]", Production::Array),
        ("\"\\q\"", Production::Escape),
        ("\"\\ud800x\"", Production::Escape),
        ("trUe", Production::Boolean),
        ("nULx", Production::Null),
        ("1.2.3", Production::Number),
        ("{3:4}", Production::KeyNotString),
        ("{\"a\"}", Production::KeyMissingValue),
        ("[1] [2]", Production::TrailingCharacters),
    ];
    for (input, expected) in cases {
        for result in both(input) {
            let err = result.unwrap_err();
            assert_eq!(err.production(), Some(expected), "input {:?}: {}", input, err);
            assert!(err.to_string().starts_with(&format!("Error {} at ", expected.as_str())));
        }
    }
}

#[test]
fn test_buffered_error_names_the_character_position() {
    let err = text::decode("[1, 2, @, 4]").unwrap_err();
    assert_eq!(err.to_string(), "Error invalid value at character 7: ..., 2, @, 4]...");
}

#[test]
fn test_deep_nesting_is_refused_not_overflowed() {
    let deep = "[".repeat(100_000);
    let err = text::decode(&deep).unwrap_err();
    assert_eq!(err.production(), Some(Production::NestingTooDeep));

    let mut bytes = Vec::new();
    for _ in 0..100_000 {
        bytes.extend_from_slice(&[binary::TAG_LIST, 1]);
    }
    let err = binary::decode(&bytes).unwrap_err();
    assert_eq!(err.production(), Some(Production::NestingTooDeep));
}

#[test]
fn test_configured_depth_applies_to_both_codecs() {
    let cache = InternCache::new();
    let config = CodecConfig::new().with_max_depth(1);

    let text_decoder = TextDecoder::with_cache(&cache).config(config);
    assert!(text_decoder.decode_str("[1]").is_ok());
    assert!(text_decoder.decode_str("[[1]]").is_err());

    let binary_decoder = BinaryDecoder::with_cache(&cache).config(config);
    assert!(binary_decoder.decode(&[binary::TAG_LIST, 0]).is_ok());
    assert!(binary_decoder.decode(&[binary::TAG_LIST, 1, binary::TAG_LIST, 0]).is_err());
}

#[test]
fn test_streaming_invalid_utf8() {
    let err = text::decode_reader(&b"\"ok\xFF\""[..]).unwrap_err();
    assert!(matches!(err, DecodeError::InvalidUtf8));
}

#[test]
fn test_binary_failures() {
    assert!(matches!(binary::decode(&[8]), Err(DecodeError::InvalidTag(8))));
    assert_eq!(binary::decode(&[8]).unwrap_err().to_string(), "invalid token value 8");
    assert!(matches!(
        binary::decode(&[binary::TAG_INT]),
        Err(DecodeError::UnexpectedEof)
    ));
    assert!(matches!(
        binary::decode(&[binary::TAG_NULL, binary::TAG_NULL]),
        Err(DecodeError::TrailingBytes(1))
    ));
}

#[test]
fn test_unencodable_values() {
    use recwire_codec::EncodeError;

    assert!(matches!(
        text::encode(&Value::Float(f64::NAN)),
        Err(EncodeError::NonFiniteFloat(_))
    ));
    assert!(matches!(
        binary::encode(&Value::Int(i64::MAX)),
        Err(EncodeError::IntegerOutOfRange(i64::MAX))
    ));
}
