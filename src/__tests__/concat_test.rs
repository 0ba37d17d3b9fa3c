use crate::{Config, ConfigError};
use pretty_assertions::assert_eq;

fn parse(text: &str) -> Config {
    match Config::parse_string(text) {
        Ok(conf) => conf,
        Err(err) => panic!("failed to parse {:?}: {}", text, err),
    }
}

fn resolve(text: &str) -> Config {
    match parse(text).resolve() {
        Ok(conf) => conf,
        Err(err) => panic!("failed to resolve {:?}: {}", text, err),
    }
}

#[test]
pub fn no_substitutions_string_concat_test() {
    let conf = resolve(" a :  true \"xyz\" 123 foo  ");
    assert_eq!("true xyz 123 foo", conf.get_string("a").unwrap());
}

#[test]
pub fn trivial_string_concat_test() {
    let conf = resolve(" a : ${x}foo, x = 1 ");
    assert_eq!("1foo", conf.get_string("a").unwrap());
}

#[test]
pub fn two_substitutions_string_concat_test() {
    let conf = resolve(" a : ${x}foo${x}, x = 1 ");
    assert_eq!("1foo1", conf.get_string("a").unwrap());
}

#[test]
pub fn no_objects_in_string_concat_test() {
    match Config::parse_string(" a : abc { x : y } ") {
        Err(ConfigError::WrongType { message, .. }) => {
            assert!(message.contains("Cannot concatenate"), "{}", message);
            assert!(message.contains("abc"), "{}", message);
            assert!(message.contains("{\"x\":\"y\"}"), "{}", message);
        }
        other => panic!("expected WrongType, got {:?}", other),
    }
}

#[test]
pub fn no_object_concat_with_null_test() {
    match Config::parse_string(" a : null { x : y } ") {
        Err(ConfigError::WrongType { message, .. }) => {
            assert!(message.contains("Cannot concatenate"), "{}", message);
            assert!(message.contains("null"), "{}", message);
        }
        other => panic!("expected WrongType, got {:?}", other),
    }
}

#[test]
pub fn no_arrays_in_string_concat_test() {
    match Config::parse_string(" a : abc [1, 2] ") {
        Err(ConfigError::WrongType { message, .. }) => {
            assert!(message.contains("Cannot concatenate"), "{}", message);
            assert!(message.contains("abc"), "{}", message);
            assert!(message.contains("[1,2]"), "{}", message);
        }
        other => panic!("expected WrongType, got {:?}", other),
    }
}

#[test]
pub fn no_objects_substituted_in_string_concat_test() {
    match parse(" a : abc ${x}, x : { y : z } ").resolve() {
        Err(ConfigError::WrongType { message, .. }) => {
            assert!(message.contains("Cannot concatenate"), "{}", message);
            assert!(message.contains("abc"), "{}", message);
        }
        other => panic!("expected WrongType, got {:?}", other),
    }
}

#[test]
pub fn no_arrays_substituted_in_string_concat_test() {
    match parse(" a : abc ${x}, x : [1,2] ").resolve() {
        Err(ConfigError::WrongType { message, .. }) => {
            assert!(message.contains("Cannot concatenate"), "{}", message);
            assert!(message.contains("abc"), "{}", message);
        }
        other => panic!("expected WrongType, got {:?}", other),
    }
}

#[test]
pub fn no_substitutions_list_concat_test() {
    let conf = parse(" a :  [1,2] [3,4]  ");
    assert_eq!(conf.get_int_list("a").unwrap(), vec![1, 2, 3, 4]);
}

#[test]
pub fn list_concat_with_substitutions_test() {
    let conf = resolve(" a :  ${x} [3,4] ${y}, x : [1,2], y : [5,6]  ");
    assert_eq!(conf.get_int_list("a").unwrap(), vec![1, 2, 3, 4, 5, 6]);
}

#[test]
pub fn list_concat_self_referential_test() {
    let conf = resolve(" a : [1, 2], a : ${a} [3,4], a : ${a} [5,6]  ");
    assert_eq!(conf.get_int_list("a").unwrap(), vec![1, 2, 3, 4, 5, 6]);
}

#[test]
pub fn list_concat_can_span_lines_inside_brackets_test() {
    let conf = parse(" a :  [1,2\n] [3,4]  ");
    assert_eq!(conf.get_int_list("a").unwrap(), vec![1, 2, 3, 4]);
}

#[test]
pub fn no_substitutions_object_concat_test() {
    let conf = parse(" a : { b : c } { x : y }  ");
    assert_eq!(conf.get_string("a.b").unwrap(), "c");
    assert_eq!(conf.get_string("a.x").unwrap(), "y");
}

#[test]
pub fn object_concat_merge_order_test() {
    let conf = parse(" a : { b : 1 } { b : 2 } { b : 3 } { b : 4 } ");
    assert_eq!(4, conf.get_int("a.b").unwrap());
}

#[test]
pub fn object_concat_with_substitutions_test() {
    let conf = resolve(" a : ${x} { b : 1 } ${y}, x : { a : 0 }, y : { c : 2 } ");
    assert_eq!(0, conf.get_int("a.a").unwrap());
    assert_eq!(1, conf.get_int("a.b").unwrap());
    assert_eq!(2, conf.get_int("a.c").unwrap());
}

#[test]
pub fn string_concat_number_formats_preserved_test() {
    let conf = resolve(" a : 0x21 1e5 3.14 ");
    assert_eq!("0x21 1e5 3.14", conf.get_string("a").unwrap());
}

#[test]
pub fn optional_substitution_vanishes_in_concat_test() {
    let conf = resolve(" a : ${?nonexistent}foo ");
    assert_eq!("foo", conf.get_string("a").unwrap());
}

#[test]
pub fn concat_of_vanished_pieces_vanishes_test() {
    let conf = resolve(" a : ${?x}${?y} ");
    assert!(!conf.has_path("a"));
}
