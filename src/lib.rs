//! HOCON parsing tool (hocon_pt) is a library to parse, merge and resolve
//! [HOCON](https://github.com/lightbend/config/blob/main/HOCON.md) configuration text
//! (a human-friendly superset of JSON) into an immutable typed value tree.
//!
//! # Overview
//! A configuration is usually layered from several sources: a user file, a set of
//! defaults shipped with the application, maybe the process environment. The library
//! parses each source into a tree of [ConfigValue], composes the trees with
//! [with_fallback](Config::with_fallback) precedence, resolves `${path}` substitutions
//! with [resolve](Config::resolve) and exposes the result through typed accessors such as
//! [get_string](Config::get_string), [get_int](Config::get_int),
//! [get_duration](Config::get_duration) and [get_bytes](Config::get_bytes).
//!
//! Values are immutable once constructed. Every transformation (merging, resolving,
//! retaining or dropping paths) produces a new tree; values are shared by reference
//! and never copied.
//!
//! # Example
//! ```
//! use hocon_pt::Config;
//!
//! let conf = Config::parse_string(
//!     r#"
//!     server {
//!       host : localhost
//!       port : 8080
//!       timeout : 250ms
//!     }
//!     server.banner : "running on "${server.host}
//!     "#,
//! )
//! .unwrap();
//!
//! let resolved = conf.resolve().unwrap();
//!
//! assert_eq!(resolved.get_string("server.host").unwrap(), "localhost");
//! assert_eq!(resolved.get_int("server.port").unwrap(), 8080);
//! assert_eq!(resolved.get_milliseconds("server.timeout").unwrap(), 250);
//! assert_eq!(
//!     resolved.get_string("server.banner").unwrap(),
//!     "running on localhost"
//! );
//! ```
//!
//! Schema validation compares a resolved configuration against a resolved reference
//! document with [check_valid](Config::check_valid), reporting every missing or
//! wrongly-typed path at once.
//!
//! # License
//! [hocon_pt](crate) is provided under the MIT license.
mod config;
mod error;
mod include;
mod origin;
mod parser;
mod path;
mod resolver;
mod token;
mod tokenizer;
mod units;
pub mod util;
pub mod value;
mod validate;

#[cfg(test)]
mod __tests__;

use std::rc::Rc;

pub use include::{IncludeContext, IncludeTarget, Includer};
pub use path::{join_path, split_path};
pub use token::{Lex, Token};
pub use units::{parse_bytes, parse_duration};
pub use value::{
    ConfigObject, ConfigValue, PlainValue, ResolveStatus, SubstitutionExpr, ValueKind, ValueType,
};

#[derive(Clone, PartialEq, Eq, Hash)]
/// A dotted-key path into a configuration tree, such as `a.b.c`.
///
/// A path is an ordered sequence of one or more key strings. A key may contain
/// any character; keys that would not survive unquoted (anything outside
/// `[A-Za-z0-9_-]`, or a key not starting with a letter) render with JSON string
/// quoting. Parsing a path expression honors the same quoting.
pub struct Path {
    keys: Vec<String>,
}

/// An accumulator used while assembling a [Path] from parsed pieces.
pub struct PathBuilder {
    keys: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// The source location (description, optional filename, line number, attached
/// comments) carried by every [ConfigValue] and by parse errors.
///
/// Origin is informational only; it is never part of value equality.
pub struct Origin {
    description: String,
    filename: Option<String>,
    line: i32,
    comments: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// The syntax flavor accepted by the parser.
pub enum Syntax {
    /// The HOCON superset: unquoted strings, `=`, `+=`, includes, substitutions,
    /// concatenation, comments, optional commas.
    Hocon,
    /// Strict JSON per RFC; none of the HOCON extensions.
    Json,
}

#[derive(Clone)]
/// Options controlling how configuration text is parsed.
pub struct ParseOptions {
    /// Syntax flavor; [None] guesses from the filename extension and falls back to HOCON.
    pub syntax: Option<Syntax>,
    /// Description used for origins when no filename is available.
    pub origin_description: Option<String>,
    /// When parsing a file, treat a missing file as an empty configuration.
    pub allow_missing: bool,
    /// Replacement includer for `include` statements.
    pub includer: Option<Rc<dyn Includer>>,
}

#[derive(Debug, Clone, Copy)]
/// Options controlling substitution resolution.
pub struct ResolveOptions {
    /// Fall back to the process environment for references not found in the tree.
    pub use_system_environment: bool,
    /// Leave unresolvable references in place instead of returning an error.
    pub allow_unresolved: bool,
}

#[derive(Debug, Clone, Copy)]
/// Options controlling rendering of a configuration tree.
pub struct RenderOptions {
    /// Emit strictly valid JSON: all strings quoted, braces around the root.
    pub json: bool,
    /// Indent nested values over multiple lines.
    pub formatted: bool,
    /// Emit comments attached to value origins (formatted non-JSON mode only).
    pub comments: bool,
    /// Emit a comment describing each value's origin (formatted non-JSON mode only).
    pub origin_comments: bool,
}

/// The user-facing configuration façade: a root object plus the operations of
/// the library (parse, merge, resolve, typed access, validation, rendering).
#[derive(Clone)]
pub struct Config {
    root: ConfigValue,
}

#[derive(Debug, Clone)]
/// An error returned from parsing, resolving, accessing or validating a
/// configuration.
///
/// Invariant violations inside the library are not represented here; they
/// panic, and indicate a bug to be fixed rather than a condition to handle.
pub enum ConfigError {
    /// Syntax error while parsing, with the origin of the offending token.
    Parse { origin: Origin, message: String },
    /// A `${path}` reference could not be resolved.
    UnresolvedSubstitution { origin: Origin, message: String },
    /// An accessor path has no setting at all.
    Missing { path: String },
    /// An accessor path is set to null (distinct from missing).
    Null { path: String, expected: String },
    /// A value has the wrong type for the requested operation.
    WrongType { origin: Origin, message: String },
    /// A syntactically valid value failed a semantic check, such as a
    /// malformed duration or size-in-bytes string.
    BadValue {
        origin: Origin,
        path: String,
        message: String,
    },
    /// An invalid path expression.
    BadPath { path: String, message: String },
    /// A source could not be read.
    Io { message: String },
    /// A file source does not exist.
    FileNotFound { path: String },
    /// The operation requires a resolved configuration; call
    /// [resolve](Config::resolve) first.
    NotResolved { message: String },
    /// Validation against a reference found problems; see
    /// [check_valid](Config::check_valid).
    ValidationFailed { problems: Vec<ValidationProblem> },
}

#[derive(Debug, Clone)]
/// A single conformance problem found by [check_valid](Config::check_valid).
pub struct ValidationProblem {
    pub path: String,
    pub origin: Origin,
    pub problem: String,
}
