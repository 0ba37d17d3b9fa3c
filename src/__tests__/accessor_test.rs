use crate::value::ValueKind;
use crate::{Config, ConfigError};
use std::time::Duration;

fn parse(text: &str) -> Config {
    match Config::parse_string(text) {
        Ok(conf) => conf,
        Err(err) => panic!("failed to parse {:?}: {}", text, err),
    }
}

#[test]
pub fn typed_getters_test() {
    let conf = parse(
        "ints : { a : 1, large : 2147483648 }\n\
         floats : { a : 3.14 }\n\
         strings : { a : hello }\n\
         booleans : { t : true, f : false }",
    );
    assert_eq!(conf.get_int("ints.a").unwrap(), 1);
    assert_eq!(conf.get_long("ints.large").unwrap(), 2147483648);
    assert_eq!(conf.get_double("floats.a").unwrap(), 3.14);
    assert_eq!(conf.get_string("strings.a").unwrap(), "hello");
    assert!(conf.get_boolean("booleans.t").unwrap());
    assert!(!conf.get_boolean("booleans.f").unwrap());
}

#[test]
pub fn numeric_coercion_test() {
    let conf = parse("a : 1, b : 2.0, c : 3");
    // int widens to long and double
    assert_eq!(conf.get_long("a").unwrap(), 1);
    assert_eq!(conf.get_double("a").unwrap(), 1.0);
    // integral double narrows to int and long
    assert_eq!(conf.get_int("b").unwrap(), 2);
    assert_eq!(conf.get_long("b").unwrap(), 2);
    // strings are never numbers
    let conf = parse("s : \"4\"");
    assert!(matches!(
        conf.get_int("s"),
        Err(ConfigError::WrongType { .. })
    ));
}

#[test]
pub fn out_of_range_int_test() {
    let conf = parse("big : 2147483648");
    match conf.get_int("big") {
        Err(ConfigError::WrongType { message, .. }) => {
            assert!(message.contains("out-of-range"), "{}", message);
        }
        other => panic!("expected WrongType, got {:?}", other),
    }
}

#[test]
pub fn missing_versus_null_test() {
    let conf = parse("nothing : null");
    match conf.get_int("absent") {
        Err(ConfigError::Missing { path }) => assert_eq!(path, "absent"),
        other => panic!("expected Missing, got {:?}", other),
    }
    match conf.get_int("nothing") {
        Err(ConfigError::Null { path, .. }) => assert_eq!(path, "nothing"),
        other => panic!("expected Null, got {:?}", other),
    }
    // null is distinct from missing for get_value
    assert!(matches!(
        conf.get_value("nothing").unwrap().kind(),
        ValueKind::Null
    ));
}

#[test]
pub fn wrong_type_on_the_way_test() {
    let conf = parse("a : { b : 42 }");
    match conf.get_int("a.b.c") {
        Err(ConfigError::WrongType { message, .. }) => {
            assert!(message.contains("a.b"), "{}", message);
            assert!(message.contains("object"), "{}", message);
        }
        other => panic!("expected WrongType, got {:?}", other),
    }
}

#[test]
pub fn has_path_test() {
    let conf = parse("a : { b : 1 }, n : null");
    assert!(conf.has_path("a"));
    assert!(conf.has_path("a.b"));
    assert!(!conf.has_path("a.c"));
    assert!(!conf.has_path("n"));
    assert!(!conf.has_path("a.b.c"));
}

#[test]
pub fn has_path_iff_get_value_non_null_test() {
    let conf = parse("a : { b : 1, c : null }, d : [1]");
    for path in ["a", "a.b", "a.c", "a.x", "d", "nope"] {
        let non_null = matches!(
            conf.get_value(path),
            Ok(v) if !matches!(v.kind(), ValueKind::Null)
        );
        assert_eq!(conf.has_path(path), non_null, "at {}", path);
    }
}

#[test]
pub fn get_config_test() {
    let conf = parse("server : { port : 80, host : localhost }");
    let server = conf.get_config("server").unwrap();
    assert_eq!(server.get_int("port").unwrap(), 80);
    assert_eq!(server.get_string("host").unwrap(), "localhost");
}

#[test]
pub fn typed_lists_test() {
    let conf = parse(
        "ints : [1, 2, 3]\n\
         strings : [a, b]\n\
         bools : [true, false]\n\
         doubles : [1.5, 2]\n\
         objects : [{ a : 1 }, { a : 2 }]",
    );
    assert_eq!(conf.get_int_list("ints").unwrap(), vec![1, 2, 3]);
    assert_eq!(
        conf.get_string_list("strings").unwrap(),
        vec!["a".to_string(), "b".to_string()]
    );
    assert_eq!(conf.get_boolean_list("bools").unwrap(), vec![true, false]);
    assert_eq!(conf.get_double_list("doubles").unwrap(), vec![1.5, 2.0]);
    let configs = conf.get_config_list("objects").unwrap();
    assert_eq!(configs.len(), 2);
    assert_eq!(configs[1].get_int("a").unwrap(), 2);
}

#[test]
pub fn duration_accessors_test() {
    let conf = parse("t : 250ms, plain : 100, frac : \"2.5s\"");
    assert_eq!(conf.get_milliseconds("t").unwrap(), 250);
    assert_eq!(conf.get_nanoseconds("t").unwrap(), 250_000_000);
    assert_eq!(conf.get_duration("t").unwrap(), Duration::from_millis(250));
    // a plain number is milliseconds
    assert_eq!(conf.get_milliseconds("plain").unwrap(), 100);
    assert_eq!(conf.get_duration("frac").unwrap(), Duration::from_millis(2500));
}

#[test]
pub fn duration_list_accessors_test() {
    let conf = parse("ds : [1s, \"500ms\", 25]");
    assert_eq!(
        conf.get_duration_list("ds").unwrap(),
        vec![
            Duration::from_secs(1),
            Duration::from_millis(500),
            Duration::from_millis(25)
        ]
    );
    assert_eq!(conf.get_milliseconds_list("ds").unwrap(), vec![1000, 500, 25]);
}

#[test]
pub fn bytes_accessors_test() {
    let conf = parse("m : \"1M\", plain : 1024, dec : \"1MB\"");
    assert_eq!(conf.get_bytes("m").unwrap(), 1024 * 1024);
    assert_eq!(conf.get_bytes("plain").unwrap(), 1024);
    assert_eq!(conf.get_bytes("dec").unwrap(), 1_000_000);
}

#[test]
pub fn bad_unit_string_is_bad_value_test() {
    let conf = parse("t : \"100 dollars\"");
    match conf.get_nanoseconds("t") {
        Err(ConfigError::BadValue { message, .. }) => {
            assert!(message.contains("time unit"), "{}", message);
        }
        other => panic!("expected BadValue, got {:?}", other),
    }
}

#[test]
pub fn with_only_path_test() {
    let conf = parse("a : { b : 1, c : 2 }, d : 3");
    let only = conf.with_only_path("a.b").unwrap();
    assert_eq!(only.get_int("a.b").unwrap(), 1);
    assert!(!only.has_path("a.c"));
    assert!(!only.has_path("d"));

    let nothing = conf.with_only_path("no.such.path").unwrap();
    assert!(nothing.is_empty());
}

#[test]
pub fn without_path_test() {
    let conf = parse("a : { b : 1, c : 2 }, d : 3");
    let without = conf.without_path("a.b").unwrap();
    assert!(!without.has_path("a.b"));
    assert_eq!(without.get_int("a.c").unwrap(), 2);
    assert_eq!(without.get_int("d").unwrap(), 3);
}

#[test]
pub fn with_only_and_without_are_complementary_test() {
    let conf = parse("a : { b : 1, c : 2 }, d : 3");
    let round_one = conf.without_path("a.b").unwrap().with_only_path("a.b").unwrap();
    assert!(!round_one.has_path("a.b"));
    let round_two = conf.with_only_path("a.b").unwrap().without_path("a.b").unwrap();
    assert!(!round_two.has_path("a.b"));
}

#[test]
pub fn entry_set_test() {
    let conf = parse("a : { b : 1, c : null }, d : [1, 2], e : 3");
    let entries = conf.entry_set().unwrap();
    let paths: Vec<&str> = entries.iter().map(|(p, _)| p.as_str()).collect();
    // nulls are skipped, lists are leaves
    assert_eq!(paths, vec!["a.b", "d", "e"]);
}

#[test]
pub fn quoted_path_accessor_test() {
    let conf = parse("\"a.b\" : 1, a : { b : 2 }");
    assert_eq!(conf.get_int("\"a.b\"").unwrap(), 1);
    assert_eq!(conf.get_int("a.b").unwrap(), 2);
}
