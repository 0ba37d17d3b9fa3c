use crate::value::{ConfigObject, ConfigValue, ValueKind, ValueType};
use crate::{Config, ConfigError, Path, ValidationProblem};

/// Compare a resolved configuration against a resolved reference, collecting
/// every missing setting, wrong type and wrong list element type.
pub(crate) fn check_valid(
    subject: &Config,
    reference: &Config,
    restrict_to_paths: &[&str],
) -> Result<(), ConfigError> {
    if !reference.is_resolved() {
        return Err(ConfigError::not_resolved(
            "the reference configuration must be resolved before validating against it",
        ));
    }
    if !subject.is_resolved() {
        return Err(ConfigError::not_resolved(
            "the configuration must be resolved before validating it",
        ));
    }

    let mut problems: Vec<ValidationProblem> = Vec::new();
    if restrict_to_paths.is_empty() {
        check_object_keys(
            reference.root(),
            subject.root(),
            subject.root_value(),
            &mut Vec::new(),
            &mut problems,
        );
    } else {
        for expression in restrict_to_paths {
            let path = Path::new_path(expression)?;
            let reference_value = match peek(reference.root(), path.keys()) {
                // the reference says nothing about this path
                None => continue,
                Some(value) => value,
            };
            let mut at = path.keys().to_vec();
            match peek(subject.root(), path.keys()) {
                None => add_missing(
                    &at,
                    reference_value,
                    subject.root_value(),
                    &mut problems,
                ),
                Some(subject_value) => {
                    check_value(reference_value, subject_value, &mut at, &mut problems)
                }
            }
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        problems.sort_by(|a, b| {
            (a.origin.line(), &a.path).cmp(&(b.origin.line(), &b.path))
        });
        Err(ConfigError::ValidationFailed { problems })
    }
}

fn peek<'v>(object: &'v ConfigObject, keys: &[String]) -> Option<&'v ConfigValue> {
    let mut current = object;
    for (index, key) in keys.iter().enumerate() {
        let child = current.get(key)?;
        if index + 1 == keys.len() {
            return Some(child);
        }
        match child.kind() {
            ValueKind::Object(inner) => current = inner,
            _ => return None,
        }
    }
    None
}

fn add_missing(
    at: &[String],
    reference_value: &ConfigValue,
    subject_container: &ConfigValue,
    problems: &mut Vec<ValidationProblem>,
) {
    problems.push(ValidationProblem::new(
        Path::from_keys(at.to_vec()).render(),
        subject_container.origin().clone(),
        format!(
            "No setting at '{}', expecting: {}",
            Path::from_keys(at.to_vec()).render(),
            reference_value.value_type().name()
        ),
    ));
}

fn check_object_keys(
    reference: &ConfigObject,
    subject: &ConfigObject,
    subject_value: &ConfigValue,
    at: &mut Vec<String>,
    problems: &mut Vec<ValidationProblem>,
) {
    for (key, reference_child) in reference.iter() {
        // a null in the reference requires nothing of the subject
        if matches!(reference_child.kind(), ValueKind::Null) {
            continue;
        }
        at.push(key.to_string());
        match subject.get(key) {
            None => add_missing(at, reference_child, subject_value, problems),
            Some(subject_child) => check_value(reference_child, subject_child, at, problems),
        }
        at.pop();
    }
}

fn check_value(
    reference: &ConfigValue,
    subject: &ConfigValue,
    at: &mut Vec<String>,
    problems: &mut Vec<ValidationProblem>,
) {
    // a null on either side is compatible with any type
    if matches!(reference.kind(), ValueKind::Null) || matches!(subject.kind(), ValueKind::Null) {
        return;
    }
    match (reference.kind(), subject.kind()) {
        (ValueKind::Object(reference_object), ValueKind::Object(subject_object)) => {
            check_object_keys(reference_object, subject_object, subject, at, problems);
        }
        (ValueKind::List(reference_items), ValueKind::List(subject_items)) => {
            check_list_elements(reference_items, subject_items, at, problems);
        }
        _ => {
            if !compatible_types(reference.value_type(), subject.value_type()) {
                problems.push(ValidationProblem::new(
                    Path::from_keys(at.clone()).render(),
                    subject.origin().clone(),
                    format!(
                        "Wrong value type at '{}', expecting: {} got: {}",
                        Path::from_keys(at.clone()).render(),
                        reference.value_type().name(),
                        subject.value_type().name()
                    ),
                ));
            }
        }
    }
}

/// Int, Long and Double are interchangeable; other types must match exactly.
fn compatible_types(expected: ValueType, got: ValueType) -> bool {
    expected == got
}

/// A homogeneous reference list pins the element type; a heterogeneous or
/// empty one only requires "a list".
fn check_list_elements(
    reference_items: &[ConfigValue],
    subject_items: &[ConfigValue],
    at: &mut Vec<String>,
    problems: &mut Vec<ValidationProblem>,
) {
    let element_type = match reference_items.first() {
        None => return,
        Some(first) => first.value_type(),
    };
    if !reference_items
        .iter()
        .all(|item| compatible_types(element_type, item.value_type()))
    {
        return;
    }
    for element in subject_items {
        if !compatible_types(element_type, element.value_type()) {
            problems.push(ValidationProblem::new(
                Path::from_keys(at.clone()).render(),
                element.origin().clone(),
                format!(
                    "List at '{}' contains wrong value type, expecting list of {} but got element of type {}",
                    Path::from_keys(at.clone()).render(),
                    element_type.name(),
                    element.value_type().name()
                ),
            ));
            break;
        }
    }
}
