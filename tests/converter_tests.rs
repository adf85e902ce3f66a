use chrono::{Datelike, Timelike};
use kdl_doc::{
    parse, parse_with_options, to_string, ConvertError, ErrorKind, KdlReaderOptions, KdlValue,
    RegexOptions, ValueKind,
};

fn args(input: &str) -> Vec<KdlValue> {
    parse(input).unwrap().nodes.remove(0).arguments
}

#[test]
fn test_builtin_converters() {
    let values = args(
        r#"n (date-time)"2024-01-15T10:30:00Z" (time)"08:15" (date)"2024-02-29" (decimal)"12.50" (ipv4)"192.168.1.1" (ipv6)"fe80::1" (regex)"^a+$" (base64)"aGVsbG8=""#,
    );

    let dt = values[0].as_date_time().unwrap();
    assert_eq!((dt.year(), dt.hour(), dt.minute()), (2024, 10, 30));

    let time = values[1].as_time().unwrap();
    assert_eq!((time.hour(), time.minute()), (8, 15));

    let date = values[2].as_date().unwrap();
    assert_eq!((date.month(), date.day()), (2, 29));

    assert_eq!(values[3].as_decimal().map(|d| d.to_string()), Some("12.50".to_string()));
    assert!(values[4].as_ip().unwrap().is_ipv4());
    assert!(values[5].as_ip().unwrap().is_ipv6());
    assert!(values[6].as_regex().unwrap().is_match("aaa"));
    assert_eq!(values[7].as_bytes(), Some(&b"hello"[..]));

    let names: Vec<_> = values.iter().map(|v| v.ty().unwrap()).collect();
    assert_eq!(
        names,
        vec!["date-time", "time", "date", "decimal", "ipv4", "ipv6", "regex", "base64"]
    );
}

#[test]
fn test_converters_apply_to_property_values() {
    let doc = parse(r#"server addr=(ipv4)"10.0.0.1" since=(date)"2023-06-01""#).unwrap();
    let server = &doc.nodes[0];
    assert!(server.get("addr").and_then(|v| v.as_ip()).is_some());
    assert!(server.get("since").and_then(|v| v.as_date()).is_some());
}

#[test]
fn test_rejected_literals_are_conversion_errors() {
    for input in [
        r#"n (date)"2024-13-01""#,
        r#"n (ipv4)"fe80::1""#,
        r#"n (ipv6)"127.0.0.1""#,
        r#"n (regex)"(unclosed""#,
        r#"n (base64)"not base64!""#,
        r#"n (decimal)"twelve""#,
    ] {
        let err = parse(input).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conversion, "{}", input);
        assert!(err.location().is_some());
    }
}

#[test]
fn test_unregistered_annotation_stays_a_string() {
    let values = args(r#"n (color)"red""#);
    assert_eq!(values[0], KdlValue::from("red").with_type("color"));
}

#[test]
fn test_disabled_annotations() {
    let options = KdlReaderOptions::new().with_type_annotations(false);
    let doc = parse_with_options(r#"n (ipv4)"not an address" (u8)999"#, &options).unwrap();
    let values = &doc.nodes[0].arguments;
    assert_eq!(values[0].as_str(), Some("not an address"));
    assert_eq!(values[0].ty(), Some("ipv4"));
    assert_eq!(values[1].as_i64(), Some(999));
}

fn to_upper(text: &str, _ty: &str, _options: &KdlReaderOptions) -> Result<KdlValue, ConvertError> {
    if text.is_empty() {
        return Err(ConvertError::new("empty input"));
    }
    Ok(KdlValue::from(text.to_uppercase()))
}

#[test]
fn test_custom_converter() {
    let options = KdlReaderOptions::new().with_converter("upper", to_upper);
    let doc = parse_with_options(r#"n (upper)"shout" (upper)"""#, &options).unwrap_err();
    assert_eq!(doc.kind(), ErrorKind::Conversion);
    assert!(doc.message().contains("empty input"));

    let doc = parse_with_options(r#"n (upper)"shout""#, &options).unwrap();
    let value = &doc.nodes[0].arguments[0];
    assert_eq!(value.as_str(), Some("SHOUT"));
    // the annotation is attached when the converter leaves it unset
    assert_eq!(value.ty(), Some("upper"));
}

#[test]
fn test_regex_options() {
    let options = KdlReaderOptions::new()
        .with_regex_options(RegexOptions::new().with_case_insensitive(true));
    let doc = parse_with_options(r#"n (regex)"^abc$""#, &options).unwrap();
    assert!(doc.nodes[0].arguments[0].as_regex().unwrap().is_match("ABC"));

    let strict = args(r#"n (regex)"^abc$""#);
    assert!(!strict[0].as_regex().unwrap().is_match("ABC"));
}

#[test]
fn test_converted_values_write_back() {
    let input = r#"n (date-time)"2024-01-15T10:30:00+02:00" (date)"2024-01-15" (ipv6)"::1" (base64)"aGk=" (decimal)"1.5""#;
    let doc = parse(input).unwrap();
    let written = to_string(&doc);
    assert_eq!(
        written,
        "n (date-time)\"2024-01-15T10:30:00+02:00\" (date)\"2024-01-15\" (ipv6)\"::1\" (base64)\"aGk=\" (decimal)1.5\n"
    );
    assert_eq!(parse(&written).unwrap(), doc);
}

#[test]
fn test_serde_export() {
    let doc = parse(r#"(t)n 1 "two" k=true (base64)"aGk=" { c null }"#).unwrap();
    let json = serde_json::to_value(&doc).unwrap();
    assert_eq!(
        json,
        serde_json::json!([
            {
                "name": "n",
                "type": "t",
                "arguments": [1, "two", "aGk="],
                "properties": { "k": true },
                "children": [
                    { "name": "c", "arguments": [null], "properties": {} }
                ]
            }
        ])
    );

    match &doc.nodes[0].arguments[2].kind {
        ValueKind::Bytes(bytes) => assert_eq!(bytes, b"hi"),
        other => panic!("expected bytes, got {:?}", other),
    }
}
