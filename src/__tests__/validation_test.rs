use crate::{Config, ConfigError};

fn parse_resolved(text: &str) -> Config {
    match Config::parse_string(text).and_then(|c| c.resolve()) {
        Ok(conf) => conf,
        Err(err) => panic!("failed to prepare {:?}: {}", text, err),
    }
}

fn problems_of(result: Result<(), ConfigError>) -> Vec<crate::ValidationProblem> {
    match result {
        Err(ConfigError::ValidationFailed { problems }) => problems,
        other => panic!("expected ValidationFailed, got {:?}", other),
    }
}

#[test]
pub fn valid_config_passes_test() {
    let reference = parse_resolved("a : { b : 1 }, c : [1, 2], d : hello");
    let subject = parse_resolved("a : { b : 100 }, c : [9], d : world, extra : ok");
    if let Err(err) = subject.check_valid(&reference, &[]) {
        panic!("expected valid, got {}", err);
    }
}

#[test]
pub fn missing_setting_is_reported_test() {
    let reference = parse_resolved("a : { b : 1 }");
    let subject = parse_resolved("a : {}");
    let problems = problems_of(subject.check_valid(&reference, &[]));
    assert_eq!(problems.len(), 1);
    assert_eq!(problems[0].path, "a.b");
    assert!(problems[0].problem.contains("No setting"), "{}", problems[0].problem);
    assert!(problems[0].problem.contains("number"), "{}", problems[0].problem);
}

#[test]
pub fn wrong_type_is_reported_at_leaf_test() {
    let reference = parse_resolved("a : { b : { c : { d : { e : { f : { g : false } } } } } }");
    let subject = parse_resolved("a : { b : { c : { d : { e : { f : { g : 10 } } } } } }");
    let problems = problems_of(subject.check_valid(&reference, &[]));
    assert_eq!(problems.len(), 1);
    assert_eq!(problems[0].path, "a.b.c.d.e.f.g");
    assert!(
        problems[0].problem.contains("expecting: boolean got: number"),
        "{}",
        problems[0].problem
    );
    // the line number of the subject's leaf
    assert_eq!(problems[0].origin.line(), 1);
}

#[test]
pub fn numeric_types_are_interchangeable_test() {
    let reference = parse_resolved("a : 1");
    let subject = parse_resolved("a : 1.5");
    if let Err(err) = subject.check_valid(&reference, &[]) {
        panic!("expected valid, got {}", err);
    }
}

#[test]
pub fn null_in_reference_requires_nothing_test() {
    let reference = parse_resolved("a : null, b : 1");
    let subject = parse_resolved("b : 2");
    if let Err(err) = subject.check_valid(&reference, &[]) {
        panic!("expected valid, got {}", err);
    }
}

#[test]
pub fn wrong_list_element_type_is_reported_test() {
    let reference = parse_resolved("a : [1, 2, 3]");
    let subject = parse_resolved("a : [1, two, 3]");
    let problems = problems_of(subject.check_valid(&reference, &[]));
    assert_eq!(problems.len(), 1);
    assert_eq!(problems[0].path, "a");
    assert!(
        problems[0].problem.contains("list of number"),
        "{}",
        problems[0].problem
    );
}

#[test]
pub fn heterogeneous_reference_list_only_requires_a_list_test() {
    let reference = parse_resolved("a : [1, two]");
    let subject = parse_resolved("a : [true]");
    if let Err(err) = subject.check_valid(&reference, &[]) {
        panic!("expected valid, got {}", err);
    }
}

#[test]
pub fn multiple_problems_sorted_by_line_test() {
    let reference = parse_resolved("a : 1\nb : hello\nc : { d : true }");
    let subject = parse_resolved("a : one\nb : 2\nc : { }");
    let problems = problems_of(subject.check_valid(&reference, &[]));
    assert_eq!(problems.len(), 3);
    assert_eq!(problems[0].path, "a");
    assert_eq!(problems[1].path, "b");
    assert_eq!(problems[2].path, "c.d");
}

#[test]
pub fn restrict_to_paths_test() {
    let reference = parse_resolved("a : 1, b : hello");
    let subject = parse_resolved("a : one, b : 2");
    // only problems under the restricted path are reported
    let problems = problems_of(subject.check_valid(&reference, &["a"]));
    assert_eq!(problems.len(), 1);
    assert_eq!(problems[0].path, "a");
}

#[test]
pub fn unresolved_subject_is_rejected_test() {
    let reference = parse_resolved("a : 1");
    let subject = Config::parse_string("a : ${x}, x : 1").unwrap();
    match subject.check_valid(&reference, &[]) {
        Err(ConfigError::NotResolved { .. }) => {}
        other => panic!("expected NotResolved, got {:?}", other),
    }
}
