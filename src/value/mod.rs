//! The immutable configuration value tree.
//!
//! A [ConfigValue] is an [Origin](crate::Origin) plus one of a closed set of
//! [ValueKind] variants. Scalars and fully-parsed containers are *resolved*;
//! substitutions, value concatenations and delayed merge stacks are
//! *unresolved* and disappear during [resolve](crate::Config::resolve). All
//! operations dispatch by matching on the variant.
mod concat;
mod merge;
mod object;
mod render;

use crate::{Origin, Path};
use ptree::TreeItem;
use std::borrow::Cow;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::fmt::{Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::rc::Rc;

pub(crate) use concat::concatenate;
pub(crate) use render::render_root;
pub use render::render_json_string;

#[derive(Clone)]
/// A single node of the configuration tree: an origin plus a variant payload.
///
/// Values are immutable; every transformation returns a new value. The origin
/// and the payload are shared by reference, so cloning is cheap.
pub struct ConfigValue {
    origin: Rc<Origin>,
    kind: Rc<ValueKind>,
}

/// The closed set of value variants.
#[derive(Debug)]
pub enum ValueKind {
    Null,
    Boolean(bool),
    /// A 32-bit integer with the original text it was parsed from.
    Int(i32, Option<String>),
    /// A 64-bit integer with the original text it was parsed from.
    Long(i64, Option<String>),
    /// A double with the original text it was parsed from.
    Double(f64, Option<String>),
    String(String),
    List(Vec<ConfigValue>),
    Object(ConfigObject),
    /// A `${path}` or `${?path}` reference; resolved against the root.
    Substitution(SubstitutionExpr),
    /// Two or more adjacent value pieces whose folding had to be deferred
    /// because at least one piece is unresolved.
    Concat(Vec<ConfigValue>),
    /// A fallback stack (first element wins) whose merge had to be deferred;
    /// the merged result could have any type.
    DelayedMerge(Vec<ConfigValue>),
    /// A fallback stack whose first element is an object, so the merged
    /// result is known to be an object.
    DelayedMergeObject(Vec<ConfigValue>),
}

#[derive(Debug, Clone, PartialEq)]
/// The expression inside a substitution token: the referenced path and
/// whether the reference tolerates an absent target (`${?path}`).
pub struct SubstitutionExpr {
    pub path: Path,
    pub optional: bool,
}

#[derive(Clone)]
/// An insertion-ordered map from keys to [ConfigValue]s.
pub struct ConfigObject {
    entries: Vec<(String, ConfigValue)>,
    index: HashMap<String, usize>,
    /// Set when a non-object fallback was merged under this object, hiding
    /// everything that could come after it in a fallback chain.
    ignores_fallbacks: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// The user-visible type of a resolved value.
pub enum ValueType {
    Object,
    List,
    Number,
    Boolean,
    Null,
    String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Whether a tree still contains substitutions, concatenations or delayed
/// merges anywhere.
pub enum ResolveStatus {
    Resolved,
    Unresolved,
}

#[derive(Debug, Clone, PartialEq)]
/// A plain-Rust view of a resolved tree, detached from origins.
pub enum PlainValue {
    Null,
    Boolean(bool),
    Int(i32),
    Long(i64),
    Double(f64),
    String(String),
    List(Vec<PlainValue>),
    Object(Vec<(String, PlainValue)>),
}

impl ValueType {
    pub fn name(&self) -> &'static str {
        match self {
            ValueType::Object => "object",
            ValueType::List => "list",
            ValueType::Number => "number",
            ValueType::Boolean => "boolean",
            ValueType::Null => "null",
            ValueType::String => "string",
        }
    }
}

impl ConfigValue {
    pub(crate) fn new(origin: Origin, kind: ValueKind) -> Self {
        Self {
            origin: Rc::new(origin),
            kind: Rc::new(kind),
        }
    }

    pub fn null(origin: Origin) -> Self {
        Self::new(origin, ValueKind::Null)
    }

    pub fn boolean(origin: Origin, value: bool) -> Self {
        Self::new(origin, ValueKind::Boolean(value))
    }

    pub fn int(origin: Origin, value: i32, original_text: Option<String>) -> Self {
        Self::new(origin, ValueKind::Int(value, original_text))
    }

    pub fn long(origin: Origin, value: i64, original_text: Option<String>) -> Self {
        Self::new(origin, ValueKind::Long(value, original_text))
    }

    pub fn double(origin: Origin, value: f64, original_text: Option<String>) -> Self {
        Self::new(origin, ValueKind::Double(value, original_text))
    }

    pub fn string(origin: Origin, value: String) -> Self {
        Self::new(origin, ValueKind::String(value))
    }

    pub fn list(origin: Origin, items: Vec<ConfigValue>) -> Self {
        Self::new(origin, ValueKind::List(items))
    }

    pub fn object(origin: Origin, object: ConfigObject) -> Self {
        Self::new(origin, ValueKind::Object(object))
    }

    pub fn substitution(origin: Origin, path: Path, optional: bool) -> Self {
        Self::new(
            origin,
            ValueKind::Substitution(SubstitutionExpr { path, optional }),
        )
    }

    /// Build a concatenation node. The pieces must already be consolidated:
    /// at least two of them, none itself a concatenation, at least one
    /// unmergeable (otherwise the pieces would have folded).
    pub(crate) fn concat_node(origin: Origin, pieces: Vec<ConfigValue>) -> Self {
        if pieces.len() < 2 {
            panic!("created concatenation with less than 2 items");
        }
        if pieces.iter().any(|p| matches!(&*p.kind, ValueKind::Concat(_))) {
            panic!("concatenation should never be nested");
        }
        if !pieces.iter().any(|p| p.is_unmergeable()) {
            panic!("created concatenation without an unmergeable in it");
        }
        Self::new(origin, ValueKind::Concat(pieces))
    }

    /// Build a delayed merge node from a flat fallback stack, picking
    /// [DelayedMergeObject](ValueKind::DelayedMergeObject) when the winning
    /// element is an object.
    pub(crate) fn delayed(origin: Origin, stack: Vec<ConfigValue>) -> Self {
        if stack.is_empty() {
            panic!("creating empty delayed merge");
        }
        if stack
            .iter()
            .any(|v| matches!(&*v.kind, ValueKind::DelayedMerge(_) | ValueKind::DelayedMergeObject(_)))
        {
            panic!("placed nested delayed merge in a stack, should have consolidated");
        }
        let kind = if matches!(&*stack[0].kind, ValueKind::Object(_)) {
            ValueKind::DelayedMergeObject(stack)
        } else {
            ValueKind::DelayedMerge(stack)
        };
        Self::new(origin, kind)
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn kind(&self) -> &ValueKind {
        &self.kind
    }

    /// A copy of self carrying a different origin.
    pub fn with_origin(&self, origin: Origin) -> Self {
        Self {
            origin: Rc::new(origin),
            kind: Rc::clone(&self.kind),
        }
    }

    /// Identity of the shared payload; used by the resolver to memoize.
    pub(crate) fn kind_ptr(&self) -> usize {
        Rc::as_ptr(&self.kind) as *const () as usize
    }

    pub fn is_unmergeable(&self) -> bool {
        matches!(
            &*self.kind,
            ValueKind::Substitution(_)
                | ValueKind::Concat(_)
                | ValueKind::DelayedMerge(_)
                | ValueKind::DelayedMergeObject(_)
        )
    }

    /// The type of a resolved value.
    ///
    /// Panics when called on an unresolved variant; resolve first.
    pub fn value_type(&self) -> ValueType {
        match &*self.kind {
            ValueKind::Null => ValueType::Null,
            ValueKind::Boolean(_) => ValueType::Boolean,
            ValueKind::Int(_, _) | ValueKind::Long(_, _) | ValueKind::Double(_, _) => {
                ValueType::Number
            }
            ValueKind::String(_) => ValueType::String,
            ValueKind::List(_) => ValueType::List,
            ValueKind::Object(_) => ValueType::Object,
            _ => panic!(
                "value_type() called on unresolved value: {}",
                self.kind_name()
            ),
        }
    }

    /// A human-readable name for the variant, usable on unresolved values.
    pub fn kind_name(&self) -> &'static str {
        match &*self.kind {
            ValueKind::Null => "null",
            ValueKind::Boolean(_) => "boolean",
            ValueKind::Int(_, _) | ValueKind::Long(_, _) | ValueKind::Double(_, _) => "number",
            ValueKind::String(_) => "string",
            ValueKind::List(_) => "list",
            ValueKind::Object(_) => "object",
            ValueKind::Substitution(_) => "substitution",
            ValueKind::Concat(_) => "value concatenation",
            ValueKind::DelayedMerge(_) | ValueKind::DelayedMergeObject(_) => "unresolved merge",
        }
    }

    pub fn resolve_status(&self) -> ResolveStatus {
        match &*self.kind {
            ValueKind::Null
            | ValueKind::Boolean(_)
            | ValueKind::Int(_, _)
            | ValueKind::Long(_, _)
            | ValueKind::Double(_, _)
            | ValueKind::String(_) => ResolveStatus::Resolved,
            ValueKind::List(items) => {
                if items.iter().all(|i| i.is_resolved()) {
                    ResolveStatus::Resolved
                } else {
                    ResolveStatus::Unresolved
                }
            }
            ValueKind::Object(obj) => {
                if obj.values().all(|v| v.is_resolved()) {
                    ResolveStatus::Resolved
                } else {
                    ResolveStatus::Unresolved
                }
            }
            ValueKind::Substitution(_)
            | ValueKind::Concat(_)
            | ValueKind::DelayedMerge(_)
            | ValueKind::DelayedMergeObject(_) => ResolveStatus::Unresolved,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.resolve_status() == ResolveStatus::Resolved
    }

    /// Whether merging anything under this value could change it. Resolved
    /// non-objects can never take a fallback; unresolved values always might.
    pub(crate) fn ignores_fallbacks(&self) -> bool {
        match &*self.kind {
            ValueKind::Object(obj) => obj.ignores_fallbacks,
            ValueKind::Substitution(_)
            | ValueKind::Concat(_)
            | ValueKind::DelayedMerge(_)
            | ValueKind::DelayedMergeObject(_) => false,
            _ => self.is_resolved(),
        }
    }

    /// The textual form a simple value takes inside a string concatenation,
    /// or [None] for containers and unresolved values.
    pub(crate) fn transform_to_string(&self) -> Option<String> {
        match &*self.kind {
            ValueKind::Null => Some("null".to_string()),
            ValueKind::Boolean(b) => Some(b.to_string()),
            ValueKind::Int(v, raw) => Some(raw.clone().unwrap_or_else(|| v.to_string())),
            ValueKind::Long(v, raw) => Some(raw.clone().unwrap_or_else(|| v.to_string())),
            ValueKind::Double(v, raw) => Some(raw.clone().unwrap_or_else(|| v.to_string())),
            ValueKind::String(s) => Some(s.clone()),
            _ => None,
        }
    }

    /// A plain-Rust view of the tree.
    pub fn unwrapped(&self) -> Result<PlainValue, crate::ConfigError> {
        match &*self.kind {
            ValueKind::Null => Ok(PlainValue::Null),
            ValueKind::Boolean(b) => Ok(PlainValue::Boolean(*b)),
            ValueKind::Int(v, _) => Ok(PlainValue::Int(*v)),
            ValueKind::Long(v, _) => Ok(PlainValue::Long(*v)),
            ValueKind::Double(v, _) => Ok(PlainValue::Double(*v)),
            ValueKind::String(s) => Ok(PlainValue::String(s.clone())),
            ValueKind::List(items) => Ok(PlainValue::List(
                items
                    .iter()
                    .map(|i| i.unwrapped())
                    .collect::<Result<_, _>>()?,
            )),
            ValueKind::Object(obj) => Ok(PlainValue::Object(
                obj.iter()
                    .map(|(k, v)| Ok((k.to_string(), v.unwrapped()?)))
                    .collect::<Result<_, crate::ConfigError>>()?,
            )),
            _ => Err(crate::ConfigError::not_resolved(&format!(
                "cannot unwrap unresolved {}",
                self.kind_name()
            ))),
        }
    }

    /// The flat fallback stack this value contributes to a delayed merge.
    pub(crate) fn unmerged_values(&self) -> Vec<ConfigValue> {
        match &*self.kind {
            ValueKind::DelayedMerge(stack) | ValueKind::DelayedMergeObject(stack) => stack.clone(),
            _ => vec![self.clone()],
        }
    }

    /// Print the tree structure to stdout; intended for debugging.
    pub fn print(&self) -> std::io::Result<()> {
        ptree::print_tree(&DebugNode {
            label: None,
            value: self.clone(),
        })
    }
}

/// Numeric payload used for cross-variant numeric equality.
enum NumValue {
    I(i64),
    F(f64),
}

fn numeric_value(kind: &ValueKind) -> Option<NumValue> {
    match kind {
        ValueKind::Int(v, _) => Some(NumValue::I(*v as i64)),
        ValueKind::Long(v, _) => Some(NumValue::I(*v)),
        ValueKind::Double(v, _) => Some(NumValue::F(*v)),
        _ => None,
    }
}

fn numeric_eq(a: &ValueKind, b: &ValueKind) -> bool {
    match (numeric_value(a), numeric_value(b)) {
        (Some(NumValue::I(x)), Some(NumValue::I(y))) => x == y,
        (Some(NumValue::F(x)), Some(NumValue::F(y))) => x == y,
        (Some(NumValue::I(x)), Some(NumValue::F(y))) | (Some(NumValue::F(y)), Some(NumValue::I(x))) => {
            y.fract() == 0.0 && y == x as f64
        }
        _ => false,
    }
}

impl PartialEq for ConfigValue {
    /// Structural equality over the payload; origins are deliberately not
    /// part of it. Numbers compare by numeric value across Int/Long/Double.
    fn eq(&self, other: &Self) -> bool {
        match (&*self.kind, &*other.kind) {
            (ValueKind::Null, ValueKind::Null) => true,
            (ValueKind::Boolean(a), ValueKind::Boolean(b)) => a == b,
            (ValueKind::String(a), ValueKind::String(b)) => a == b,
            (ValueKind::List(a), ValueKind::List(b)) => a == b,
            (ValueKind::Object(a), ValueKind::Object(b)) => {
                // maps of unequal size are unequal
                a.len() == b.len()
                    && a.iter().all(|(k, v)| b.get(k).map_or(false, |bv| v == bv))
            }
            (ValueKind::Substitution(a), ValueKind::Substitution(b)) => a == b,
            (ValueKind::Concat(a), ValueKind::Concat(b)) => a == b,
            (ValueKind::DelayedMerge(a), ValueKind::DelayedMerge(b)) => a == b,
            (ValueKind::DelayedMergeObject(a), ValueKind::DelayedMergeObject(b)) => a == b,
            (a, b) => numeric_eq(a, b),
        }
    }
}

impl Hash for ConfigValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match &*self.kind {
            ValueKind::Null => state.write_u8(0),
            ValueKind::Boolean(b) => {
                state.write_u8(1);
                b.hash(state);
            }
            ValueKind::Int(_, _) | ValueKind::Long(_, _) | ValueKind::Double(_, _) => {
                // all numeric variants hash alike so hash stays consistent
                // with cross-variant numeric equality
                state.write_u8(2);
                match numeric_value(&self.kind) {
                    Some(NumValue::I(v)) => v.hash(state),
                    Some(NumValue::F(v)) => {
                        if v.fract() == 0.0 && v >= i64::MIN as f64 && v <= i64::MAX as f64 {
                            (v as i64).hash(state);
                        } else {
                            v.to_bits().hash(state);
                        }
                    }
                    None => unreachable!(),
                }
            }
            ValueKind::String(s) => {
                state.write_u8(3);
                s.hash(state);
            }
            ValueKind::List(items) => {
                state.write_u8(4);
                for i in items {
                    i.hash(state);
                }
            }
            ValueKind::Object(obj) => {
                state.write_u8(5);
                // order-insensitive, matching order-insensitive equality
                let mut combined: u64 = 0;
                for (k, v) in obj.iter() {
                    let mut h = DefaultHasher::new();
                    k.hash(&mut h);
                    v.hash(&mut h);
                    combined = combined.wrapping_add(h.finish());
                }
                state.write_u64(combined);
            }
            ValueKind::Substitution(expr) => {
                state.write_u8(6);
                expr.path.hash(state);
                expr.optional.hash(state);
            }
            ValueKind::Concat(pieces) => {
                state.write_u8(7);
                for p in pieces {
                    p.hash(state);
                }
            }
            ValueKind::DelayedMerge(stack) | ValueKind::DelayedMergeObject(stack) => {
                state.write_u8(8);
                for v in stack {
                    v.hash(state);
                }
            }
        }
    }
}

impl Display for ConfigValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render_compact())
    }
}

impl Debug for ConfigValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "ConfigValue({})", self.render_compact())
    }
}

#[derive(Clone)]
struct DebugNode {
    label: Option<String>,
    value: ConfigValue,
}

impl TreeItem for DebugNode {
    type Child = DebugNode;

    fn write_self<W: std::io::Write>(&self, f: &mut W, _: &ptree::Style) -> std::io::Result<()> {
        let summary = match self.value.kind() {
            ValueKind::Object(obj) => format!("object ({} keys)", obj.len()),
            ValueKind::List(items) => format!("list ({} elements)", items.len()),
            ValueKind::Concat(pieces) => format!("concatenation ({} pieces)", pieces.len()),
            ValueKind::DelayedMerge(stack) | ValueKind::DelayedMergeObject(stack) => {
                format!("delayed merge ({} layers)", stack.len())
            }
            _ => self.value.render_compact(),
        };
        match &self.label {
            Some(label) => write!(f, "{}: {}", label, summary),
            None => write!(f, "{}", summary),
        }
    }

    fn children(&self) -> Cow<[Self::Child]> {
        let children: Vec<DebugNode> = match self.value.kind() {
            ValueKind::Object(obj) => obj
                .iter()
                .map(|(k, v)| DebugNode {
                    label: Some(k.to_string()),
                    value: v.clone(),
                })
                .collect(),
            ValueKind::List(items) => items
                .iter()
                .map(|v| DebugNode {
                    label: None,
                    value: v.clone(),
                })
                .collect(),
            ValueKind::Concat(pieces) => pieces
                .iter()
                .map(|v| DebugNode {
                    label: None,
                    value: v.clone(),
                })
                .collect(),
            ValueKind::DelayedMerge(stack) | ValueKind::DelayedMergeObject(stack) => stack
                .iter()
                .map(|v| DebugNode {
                    label: None,
                    value: v.clone(),
                })
                .collect(),
            _ => Vec::new(),
        };
        Cow::Owned(children)
    }
}
