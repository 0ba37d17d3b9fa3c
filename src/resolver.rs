use crate::value::{concatenate, ConfigObject, ConfigValue, SubstitutionExpr, ValueKind};
use crate::{ConfigError, Origin, ResolveOptions};
use std::collections::{HashMap, HashSet};

/// Resolve every substitution, concatenation and delayed merge in the tree
/// rooted at `root` (which must be an object), producing a resolved tree.
pub(crate) fn resolve_root(
    root: &ConfigValue,
    options: &ResolveOptions,
) -> Result<ConfigValue, ConfigError> {
    let root_object = match root.kind() {
        ValueKind::Object(o) => o.clone(),
        _ => panic!("resolution must start from an object"),
    };
    let mut context = ResolveContext {
        root: root_object,
        options: *options,
        markers: HashSet::new(),
        self_refs: Vec::new(),
        memos: HashMap::new(),
    };
    match context.resolve_value(root, &PathTrack::At(Vec::new())) {
        Ok(Some(resolved)) => Ok(resolved),
        Ok(None) => Ok(ConfigValue::object(
            root.origin().clone(),
            ConfigObject::new(),
        )),
        Err(ResolveErr::Fatal(error)) => Err(error),
        Err(ResolveErr::NotPossible(path)) => {
            panic!("substitution cycle unwound past every reference frame: {}", path)
        }
    }
}

/// Internal unwinding condition: a lookup ran into a path that is already
/// being resolved. It unwinds to the nearest enclosing substitution frame,
/// which turns it into "absent" (optional reference) or a cycle error.
enum ResolveErr {
    NotPossible(String),
    Fatal(ConfigError),
}

type RResult = Result<Option<ConfigValue>, ResolveErr>;

/// Where the value being resolved sits relative to the root: a concrete key
/// path, or untracked (inside a list or a merge layer, where self-reference
/// by path is meaningless).
#[derive(Clone)]
enum PathTrack {
    Untracked,
    At(Vec<String>),
}

impl PathTrack {
    fn child(&self, key: &str) -> PathTrack {
        match self {
            PathTrack::Untracked => PathTrack::Untracked,
            PathTrack::At(keys) => {
                let mut next = keys.clone();
                next.push(key.to_string());
                PathTrack::At(next)
            }
        }
    }
}

struct ResolveContext {
    root: ConfigObject,
    options: ResolveOptions,
    /// Substitution target paths currently being resolved; revisiting one is
    /// a cycle.
    markers: HashSet<String>,
    /// Registrations for delayed merge stacks under resolution: looking up
    /// the stack's own path (or a child of it) resolves against the merge of
    /// the layers below the one currently being resolved.
    self_refs: Vec<(Vec<String>, Option<ConfigValue>)>,
    /// Results memoized by payload identity; only consulted and written when
    /// no self-reference registration or cycle marker is active.
    memos: HashMap<usize, Option<ConfigValue>>,
}

impl ResolveContext {
    fn memo_eligible(&self) -> bool {
        self.self_refs.is_empty() && self.markers.is_empty()
    }

    fn resolve_value(&mut self, value: &ConfigValue, at: &PathTrack) -> RResult {
        let eligible = self.memo_eligible();
        if eligible {
            if let Some(memoized) = self.memos.get(&value.kind_ptr()) {
                return Ok(memoized.clone());
            }
        }
        let result = match value.kind() {
            ValueKind::Null
            | ValueKind::Boolean(_)
            | ValueKind::Int(_, _)
            | ValueKind::Long(_, _)
            | ValueKind::Double(_, _)
            | ValueKind::String(_) => Ok(Some(value.clone())),
            ValueKind::Object(object) => self.resolve_object(value, object.clone(), at),
            ValueKind::List(items) => self.resolve_list(value, items.clone()),
            ValueKind::Substitution(expr) => self.resolve_substitution(value, expr.clone()),
            ValueKind::Concat(pieces) => self.resolve_concat(pieces.clone()),
            ValueKind::DelayedMerge(stack) | ValueKind::DelayedMergeObject(stack) => {
                self.resolve_delayed(stack.clone(), at)
            }
        };
        if eligible {
            if let Ok(resolved) = &result {
                self.memos.insert(value.kind_ptr(), resolved.clone());
            }
        }
        result
    }

    fn resolve_object(
        &mut self,
        value: &ConfigValue,
        object: ConfigObject,
        at: &PathTrack,
    ) -> RResult {
        let mut resolved = ConfigObject::new();
        for (key, child) in object.iter() {
            let child_at = at.child(key);
            match self.resolve_value(child, &child_at)? {
                // an optional reference that resolved to nothing drops its key
                None => {}
                Some(resolved_child) => resolved.insert(key.to_string(), resolved_child),
            }
        }
        Ok(Some(ConfigValue::object(value.origin().clone(), resolved)))
    }

    fn resolve_list(&mut self, value: &ConfigValue, items: Vec<ConfigValue>) -> RResult {
        let mut resolved = Vec::with_capacity(items.len());
        for item in &items {
            match self.resolve_value(item, &PathTrack::Untracked)? {
                None => {}
                Some(resolved_item) => resolved.push(resolved_item),
            }
        }
        Ok(Some(ConfigValue::list(value.origin().clone(), resolved)))
    }

    fn resolve_substitution(&mut self, value: &ConfigValue, expr: SubstitutionExpr) -> RResult {
        let key = expr.path.render();
        if self.markers.contains(&key) {
            return Err(ResolveErr::NotPossible(key));
        }
        self.markers.insert(key.clone());
        let outcome = self.lookup(&expr);
        self.markers.remove(&key);

        let found = match outcome {
            Err(ResolveErr::NotPossible(_)) => {
                // a cycle somewhere below this reference; for an optional
                // reference the value is simply absent
                if expr.optional {
                    return Ok(None);
                }
                return Err(ResolveErr::Fatal(ConfigError::UnresolvedSubstitution {
                    origin: value.origin().clone(),
                    message: format!("${{{}}} was part of a cycle of substitutions", key),
                }));
            }
            Err(fatal) => return Err(fatal),
            Ok(found) => found,
        };

        match found {
            Some(target) => Ok(Some(target)),
            None => {
                if self.options.use_system_environment {
                    if let Ok(text) = std::env::var(&key) {
                        let origin = Origin::new_simple(&format!("env variable {}", key));
                        return Ok(Some(ConfigValue::string(origin, text)));
                    }
                }
                if expr.optional {
                    Ok(None)
                } else if self.options.allow_unresolved {
                    Ok(Some(value.clone()))
                } else {
                    Err(ResolveErr::Fatal(ConfigError::UnresolvedSubstitution {
                        origin: value.origin().clone(),
                        message: format!("Could not resolve substitution to a value: ${{{}}}", key),
                    }))
                }
            }
        }
    }

    /// Find and fully resolve the value the expression points at, or [None]
    /// when the tree has nothing there.
    fn lookup(&mut self, expr: &SubstitutionExpr) -> RResult {
        let keys = expr.path.keys();

        // a reference into a delayed merge stack that is being resolved right
        // now sees the merge of the layers below the current one
        for (registered, below) in self.self_refs.iter().rev() {
            if keys.len() >= registered.len() && &keys[..registered.len()] == registered.as_slice()
            {
                return match below {
                    None => Err(ResolveErr::NotPossible(expr.path.render())),
                    Some(merged) => {
                        if keys.len() == registered.len() {
                            Ok(Some(merged.clone()))
                        } else {
                            Ok(peek_resolved(merged, &keys[registered.len()..]))
                        }
                    }
                };
            }
        }

        let mut remaining = keys;
        let mut current = self.root.clone();
        let mut consumed: Vec<String> = Vec::new();
        loop {
            let key = &remaining[0];
            let child = match current.get(key) {
                Some(child) => child.clone(),
                None => return Ok(None),
            };
            consumed.push(key.clone());
            let at = PathTrack::At(consumed.clone());
            if remaining.len() == 1 {
                return self.resolve_value(&child, &at);
            }
            // descend through plain objects without touching sibling keys;
            // resolve anything unresolved that stands in the way
            match child.kind() {
                ValueKind::Object(object) => {
                    current = object.clone();
                    remaining = &remaining[1..];
                }
                ValueKind::Substitution(_)
                | ValueKind::Concat(_)
                | ValueKind::DelayedMerge(_)
                | ValueKind::DelayedMergeObject(_) => {
                    match self.resolve_value(&child, &at)? {
                        None => return Ok(None),
                        Some(resolved) => match resolved.kind() {
                            ValueKind::Object(object) => {
                                current = object.clone();
                                remaining = &remaining[1..];
                            }
                            // resolved to a non-object; the path dead-ends
                            _ => return Ok(None),
                        },
                    }
                }
                _ => return Ok(None),
            }
        }
    }

    fn resolve_concat(&mut self, pieces: Vec<ConfigValue>) -> RResult {
        let mut resolved_pieces = Vec::with_capacity(pieces.len());
        for piece in &pieces {
            // concatenation needs the full value of each piece
            match self.resolve_value(piece, &PathTrack::Untracked)? {
                None => {}
                Some(resolved) => resolved_pieces.push(resolved),
            }
        }
        concatenate(resolved_pieces).map_err(ResolveErr::Fatal)
    }

    /// Resolve a delayed merge stack bottom-first, so that each layer's
    /// self-references see the already-resolved merge of the layers below it.
    fn resolve_delayed(&mut self, stack: Vec<ConfigValue>, at: &PathTrack) -> RResult {
        let registered_path = match at {
            PathTrack::At(keys) if !keys.is_empty() => Some(keys.clone()),
            _ => None,
        };
        let mut below: Option<ConfigValue> = None;
        for layer in stack.iter().rev() {
            if let Some(path) = &registered_path {
                self.self_refs.push((path.clone(), below.clone()));
            }
            let outcome = self.resolve_value(layer, &PathTrack::Untracked);
            if registered_path.is_some() {
                self.self_refs.pop();
            }
            match outcome? {
                None => {}
                Some(resolved_layer) => {
                    below = Some(match below {
                        None => resolved_layer,
                        Some(lower) => resolved_layer.with_fallback(&lower),
                    });
                }
            }
        }
        Ok(below)
    }
}

/// Plain descent through already-resolved objects.
fn peek_resolved(value: &ConfigValue, keys: &[String]) -> Option<ConfigValue> {
    let mut current = value.clone();
    for key in keys {
        let next = match current.kind() {
            ValueKind::Object(object) => object.get(key)?.clone(),
            _ => return None,
        };
        current = next;
    }
    Some(current)
}
