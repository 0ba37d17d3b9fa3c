use crate::{parse_bytes, parse_duration, ConfigError, Origin};

fn origin() -> Origin {
    Origin::new_simple("test")
}

#[test]
pub fn parse_duration_one_second_forms_test() {
    let one_sec_inputs = [
        "1s",
        "1 s",
        "1seconds",
        "1 seconds",
        "   1s    ",
        "   1    s   ",
        "1second",
        "1000",
        "1000ms",
        "1000 ms",
        "1000   milliseconds",
        "   1000       milliseconds    ",
        "1000millisecond",
        "1000000us",
        "1000000   us",
        "1000000 microseconds",
        "1000000microsecond",
        "1000000000ns",
        "1000000000 ns",
        "1000000000  nanoseconds",
        "1000000000nanosecond",
        "0.01666666666666666666666m",
        "0.01666666666666666666666 minutes",
        "0.01666666666666666666666 minute",
        "0.00027777777777777777777h",
        "0.00027777777777777777777 hours",
        "0.00027777777777777777777hour",
        "1.1574074074074073e-05d",
        "1.1574074074074073e-05  days",
        "1.1574074074074073e-05day",
    ];
    for input in one_sec_inputs {
        match parse_duration(input, &origin(), "test") {
            Ok(nanos) => assert_eq!(nanos, 1_000_000_000, "for input {:?}", input),
            Err(err) => panic!("failed to parse {:?}: {}", input, err),
        }
    }
}

#[test]
pub fn parse_duration_units_test() {
    assert_eq!(parse_duration("1ns", &origin(), "t").unwrap(), 1);
    assert_eq!(parse_duration("1us", &origin(), "t").unwrap(), 1_000);
    assert_eq!(parse_duration("1ms", &origin(), "t").unwrap(), 1_000_000);
    assert_eq!(parse_duration("1m", &origin(), "t").unwrap(), 60_000_000_000);
    assert_eq!(
        parse_duration("1h", &origin(), "t").unwrap(),
        3_600_000_000_000
    );
    assert_eq!(
        parse_duration("1d", &origin(), "t").unwrap(),
        86_400_000_000_000
    );
    // no unit means milliseconds
    assert_eq!(parse_duration("7", &origin(), "t").unwrap(), 7_000_000);
}

#[test]
pub fn parse_duration_bad_unit_test() {
    match parse_duration("100 dollars", &origin(), "test") {
        Err(ConfigError::BadValue { message, .. }) => {
            assert!(message.contains("time unit"), "{}", message);
        }
        other => panic!("expected BadValue, got {:?}", other),
    }
}

#[test]
pub fn parse_duration_bad_number_test() {
    match parse_duration("1 00 seconds", &origin(), "test") {
        Err(ConfigError::BadValue { message, .. }) => {
            assert!(message.contains("duration number"), "{}", message);
        }
        other => panic!("expected BadValue, got {:?}", other),
    }
}

#[test]
pub fn parse_bytes_one_mebibyte_forms_test() {
    let one_mebi_inputs = [
        "1048576",
        "1048576b",
        "1048576bytes",
        "1048576byte",
        "1048576  b",
        "1048576  bytes",
        "    1048576  b   ",
        "  1048576  bytes   ",
        "1048576B",
        "1024k",
        "1024K",
        "1024Ki",
        "1024KiB",
        "1024 kibibytes",
        "1024 kibibyte",
        "1m",
        "1M",
        "1 M",
        "1Mi",
        "1MiB",
        "1 mebibytes",
        "1 mebibyte",
        "0.0009765625g",
        "0.0009765625G",
        "0.0009765625Gi",
        "0.0009765625GiB",
        "0.0009765625 gibibytes",
        "0.0009765625 gibibyte",
    ];
    for input in one_mebi_inputs {
        match parse_bytes(input, &origin(), "test") {
            Ok(bytes) => assert_eq!(bytes, 1024 * 1024, "for input {:?}", input),
            Err(err) => panic!("failed to parse {:?}: {}", input, err),
        }
    }
}

#[test]
pub fn parse_bytes_one_megabyte_forms_test() {
    let one_mega_inputs = [
        "1000000",
        "1000000b",
        "1000000bytes",
        "1000000byte",
        "1000000  b",
        "1000000  bytes",
        "    1000000  b   ",
        "  1000000  bytes   ",
        "1000000B",
        "1000kB",
        "1000 kilobytes",
        "1000 kilobyte",
        "1MB",
        "1 megabytes",
        "1 megabyte",
        ".001GB",
        ".001 gigabytes",
        ".001 gigabyte",
    ];
    for input in one_mega_inputs {
        match parse_bytes(input, &origin(), "test") {
            Ok(bytes) => assert_eq!(bytes, 1_000_000, "for input {:?}", input),
            Err(err) => panic!("failed to parse {:?}: {}", input, err),
        }
    }
}

#[test]
pub fn parse_bytes_large_binary_units_test() {
    let mut expected: i64 = 1024 * 1024 * 1024;
    for unit in ["tebi", "pebi", "exbi"] {
        let first = unit[..1].to_uppercase();
        expected *= 1024;
        assert_eq!(
            parse_bytes(&format!("1{}", first), &origin(), "t").unwrap(),
            expected
        );
        assert_eq!(
            parse_bytes(&format!("1{}i", first), &origin(), "t").unwrap(),
            expected
        );
        assert_eq!(
            parse_bytes(&format!("1{}iB", first), &origin(), "t").unwrap(),
            expected
        );
        assert_eq!(
            parse_bytes(&format!("1{}byte", unit), &origin(), "t").unwrap(),
            expected
        );
        assert_eq!(
            parse_bytes(&format!("1{}bytes", unit), &origin(), "t").unwrap(),
            expected
        );
    }
}

#[test]
pub fn parse_bytes_large_decimal_units_test() {
    let mut expected: i64 = 1_000_000_000;
    for unit in ["tera", "peta", "exa"] {
        let first = unit[..1].to_uppercase();
        expected *= 1000;
        assert_eq!(
            parse_bytes(&format!("1{}B", first), &origin(), "t").unwrap(),
            expected
        );
        assert_eq!(
            parse_bytes(&format!("1{}byte", unit), &origin(), "t").unwrap(),
            expected
        );
        assert_eq!(
            parse_bytes(&format!("1{}bytes", unit), &origin(), "t").unwrap(),
            expected
        );
    }
}

#[test]
pub fn parse_bytes_out_of_range_test() {
    // a yobibyte does not fit in 64 bits
    match parse_bytes("1Y", &origin(), "test") {
        Err(ConfigError::BadValue { message, .. }) => {
            assert!(message.contains("out of range"), "{}", message);
        }
        other => panic!("expected BadValue, got {:?}", other),
    }
}

#[test]
pub fn parse_bytes_bad_unit_test() {
    match parse_bytes("100 dollars", &origin(), "test") {
        Err(ConfigError::BadValue { message, .. }) => {
            assert!(message.contains("size-in-bytes unit"), "{}", message);
        }
        other => panic!("expected BadValue, got {:?}", other),
    }
}

#[test]
pub fn parse_bytes_bad_number_test() {
    match parse_bytes("1 00 bytes", &origin(), "test") {
        Err(ConfigError::BadValue { message, .. }) => {
            assert!(message.contains("size-in-bytes number"), "{}", message);
        }
        other => panic!("expected BadValue, got {:?}", other),
    }
}

#[test]
pub fn mixed_suffix_families_test() {
    assert_eq!(parse_bytes("1024Ki", &origin(), "t").unwrap(), 1_048_576);
    assert_eq!(parse_bytes("1MB", &origin(), "t").unwrap(), 1_000_000);
    assert_eq!(parse_bytes("1kB", &origin(), "t").unwrap(), 1_000);
    assert_eq!(parse_bytes("1k", &origin(), "t").unwrap(), 1_024);
}
