use super::{ConfigValue, ValueKind};
use crate::{ConfigError, Origin};

/// The outcome of trying to join two adjacent concatenation pieces.
enum Join {
    Joined(ConfigValue),
    KeepBoth,
}

/// Join two adjacent pieces when their kinds allow it. Adjacent objects merge
/// (the later piece wins), adjacent lists append, simple values join as text.
/// An unresolved piece on either side keeps both for resolve time; anything
/// else is a type clash.
fn join(left: &ConfigValue, right: &ConfigValue) -> Result<Join, ConfigError> {
    if let (ValueKind::Object(_), ValueKind::Object(_)) = (left.kind(), right.kind()) {
        return Ok(Join::Joined(right.with_fallback(left)));
    }
    if let (ValueKind::List(a), ValueKind::List(b)) = (left.kind(), right.kind()) {
        let mut items = a.clone();
        items.extend(b.iter().cloned());
        let origin = Origin::merge(left.origin(), right.origin());
        return Ok(Join::Joined(ConfigValue::list(origin, items)));
    }
    if matches!(left.kind(), ValueKind::Concat(_)) || matches!(right.kind(), ValueKind::Concat(_)) {
        panic!("unflattened concatenation");
    }
    if left.is_unmergeable() || right.is_unmergeable() {
        return Ok(Join::KeepBoth);
    }
    match (left.transform_to_string(), right.transform_to_string()) {
        (Some(s1), Some(s2)) => {
            let origin = Origin::merge(left.origin(), right.origin());
            Ok(Join::Joined(ConfigValue::string(origin, s1 + &s2)))
        }
        _ => Err(ConfigError::WrongType {
            origin: left.origin().clone(),
            message: format!(
                "Cannot concatenate object or list with a non-object-or-list, {} and {} are not compatible",
                left, right
            ),
        }),
    }
}

/// Flatten nested concatenations and join adjacent joinable pieces.
fn consolidate(pieces: Vec<ConfigValue>) -> Result<Vec<ConfigValue>, ConfigError> {
    if pieces.len() < 2 {
        return Ok(pieces);
    }
    let mut flattened: Vec<ConfigValue> = Vec::with_capacity(pieces.len());
    for piece in pieces {
        if let ValueKind::Concat(inner) = piece.kind() {
            flattened.extend(inner.iter().cloned());
        } else {
            flattened.push(piece);
        }
    }

    let mut consolidated: Vec<ConfigValue> = Vec::with_capacity(flattened.len());
    for piece in flattened {
        match consolidated.last() {
            None => consolidated.push(piece),
            Some(last) => match join(last, &piece)? {
                Join::Joined(joined) => {
                    consolidated.pop();
                    consolidated.push(joined);
                }
                Join::KeepBoth => consolidated.push(piece),
            },
        }
    }
    Ok(consolidated)
}

/// Fold concatenation pieces into a single value where possible.
///
/// Returns [None] when there are no pieces left at all (every piece was an
/// optional substitution that vanished), a plain value when everything
/// joined, and a [Concat](ValueKind::Concat) node when unresolved pieces
/// defer the fold to resolve time.
pub(crate) fn concatenate(pieces: Vec<ConfigValue>) -> Result<Option<ConfigValue>, ConfigError> {
    let consolidated = consolidate(pieces)?;
    if consolidated.is_empty() {
        Ok(None)
    } else if consolidated.len() == 1 {
        Ok(Some(consolidated.into_iter().next().unwrap()))
    } else {
        let origin = Origin::merge_many(consolidated.iter().map(|p| p.origin()));
        Ok(Some(ConfigValue::concat_node(origin, consolidated)))
    }
}
