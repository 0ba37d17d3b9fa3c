use crate::{Config, ConfigError, ResolveOptions};
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
pub fn simple_substitution_test() {
    let conf = resolve("a : ${b}, b : 42");
    assert_eq!(conf.get_int("a").unwrap(), 42);
    assert!(conf.is_resolved());
}

#[test]
pub fn chained_substitution_test() {
    let conf = resolve("a : ${b}, b : ${c}, c : 42");
    assert_eq!(conf.get_int("a").unwrap(), 42);
}

#[test]
pub fn substitution_into_nested_object_test() {
    let conf = resolve("bar : { foo : 42, baz : ${bar.foo} }");
    assert_eq!(conf.get_int("bar.baz").unwrap(), 42);
}

#[test]
pub fn substitution_of_object_is_deep_copy_test() {
    let conf = resolve("a : { x : 1 }, b : ${a}");
    assert_eq!(conf.get_int("b.x").unwrap(), 1);
    assert_eq!(conf.get_value("a").unwrap(), conf.get_value("b").unwrap());
}

#[test]
pub fn missing_substitution_fails_test() {
    match parse("a : ${nope-not-set-anywhere}").resolve() {
        Err(ConfigError::UnresolvedSubstitution { message, .. }) => {
            assert!(message.contains("nope-not-set-anywhere"), "{}", message);
        }
        other => panic!("expected UnresolvedSubstitution, got {:?}", other),
    }
}

#[test]
pub fn missing_optional_substitution_vanishes_test() {
    let conf = resolve("a : ${?nope-not-set-anywhere}, b : 2");
    assert!(!conf.has_path("a"));
    assert_eq!(conf.get_int("b").unwrap(), 2);
}

#[test]
pub fn optional_substitution_vanishes_from_list_test() {
    let conf = resolve("a : [ 1, ${?nope-not-set-anywhere}, 2 ]");
    assert_eq!(conf.get_int_list("a").unwrap(), vec![1, 2]);
}

#[test]
pub fn cycle_is_detected_test() {
    match parse("a : ${b}, b : ${a}").resolve() {
        Err(ConfigError::UnresolvedSubstitution { message, .. }) => {
            assert!(message.contains("cycle"), "{}", message);
        }
        other => panic!("expected cycle error, got {:?}", other),
    }
}

#[test]
pub fn self_cycle_is_detected_test() {
    match parse("a : ${a}").resolve() {
        Err(ConfigError::UnresolvedSubstitution { message, .. }) => {
            assert!(message.contains("cycle"), "{}", message);
        }
        other => panic!("expected cycle error, got {:?}", other),
    }
}

#[test]
pub fn optional_self_cycle_vanishes_test() {
    let conf = resolve("a : ${?a}, b : 1");
    assert!(!conf.has_path("a"));
}

#[test]
pub fn self_referential_override_sees_value_below_test() {
    let conf = resolve("a : 1, a : ${a} ");
    assert_eq!(conf.get_int("a").unwrap(), 1);
}

#[test]
pub fn self_referential_string_grows_test() {
    let conf = resolve("path : \"a\", path : ${path}\":b\"");
    assert_eq!(conf.get_string("path").unwrap(), "a:b");
}

#[test]
pub fn plus_equals_appends_test() {
    let conf = resolve("a = [], a += 2");
    assert_eq!(conf.get_int_list("a").unwrap(), vec![2]);
}

#[test]
pub fn plus_equals_on_undefined_key_test() {
    let conf = resolve("a += 2");
    assert_eq!(conf.get_int_list("a").unwrap(), vec![2]);
}

#[test]
pub fn plus_equals_chain_test() {
    let conf = resolve("a = [1], a += 2, a += 3");
    assert_eq!(conf.get_int_list("a").unwrap(), vec![1, 2, 3]);
}

#[test]
pub fn plus_equals_inside_object_uses_full_path_test() {
    let conf = resolve("o : { a = [1] }\no : { a += 2 }");
    assert_eq!(conf.get_int_list("o.a").unwrap(), vec![1, 2]);
}

#[test]
pub fn self_reference_into_child_sees_layers_below_test() {
    let conf = resolve("a : { x : 1 }, a : { y : ${a.x} }");
    assert_eq!(conf.get_int("a.x").unwrap(), 1);
    assert_eq!(conf.get_int("a.y").unwrap(), 1);
}

#[test]
pub fn substitution_looks_through_merge_test() {
    let conf = resolve("b : ${a.x}, a : { x : 1 }, a : { x : 2 }");
    assert_eq!(conf.get_int("b").unwrap(), 2);
}

#[test]
pub fn resolve_is_idempotent_test() {
    let once = resolve("a : ${b}foo, b : 1, c : { d : ${b} }");
    let twice = once.resolve().unwrap();
    assert_eq!(once.root_value(), twice.root_value());
}

#[test]
pub fn environment_variable_fallback_test() {
    std::env::set_var("HOCON_PT_TEST_VAR", "from-env");
    let conf = resolve("a : ${HOCON_PT_TEST_VAR}");
    assert_eq!(conf.get_string("a").unwrap(), "from-env");

    let off = parse("a : ${HOCON_PT_TEST_VAR}").resolve_with(&ResolveOptions {
        use_system_environment: false,
        allow_unresolved: false,
    });
    assert!(off.is_err());
    std::env::remove_var("HOCON_PT_TEST_VAR");
}

#[test]
pub fn allow_unresolved_leaves_substitution_test() {
    let conf = parse("a : ${not-set-ever}, b : 1")
        .resolve_with(&ResolveOptions {
            use_system_environment: false,
            allow_unresolved: true,
        })
        .unwrap();
    assert!(!conf.is_resolved());
    assert_eq!(conf.get_int("b").unwrap(), 1);
    match conf.get_string("a") {
        Err(ConfigError::NotResolved { .. }) => {}
        other => panic!("expected NotResolved, got {:?}", other),
    }
}

#[test]
pub fn optional_substitution_with_value_test() {
    let conf = resolve("a : ${?b}, b : 42");
    assert_eq!(conf.get_int("a").unwrap(), 42);
}

#[test]
pub fn substitution_concat_in_object_value_test() {
    let conf = resolve("greeting : \"hello \"${name}, name : world");
    assert_eq!(conf.get_string("greeting").unwrap(), "hello world");
}

#[test]
pub fn resolution_uses_final_merged_tree_test() {
    // ${x} resolves against the whole merged tree, not the file it sits in
    let primary = parse("x : 10");
    let secondary = parse("y : ${x}");
    let conf = primary.with_fallback(&secondary).resolve().unwrap();
    assert_eq!(conf.get_int("y").unwrap(), 10);
}
