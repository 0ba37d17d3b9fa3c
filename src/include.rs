use crate::util::Code;
use crate::value::ConfigValue;
use crate::{parser, ConfigError, Origin, Syntax};
use std::path::{Path as FsPath, PathBuf};
use std::rc::Rc;

/// The location kinds an `include` statement can name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncludeTarget {
    /// `include "name"`: try the name as a file, with extension guessing.
    Heuristic(String),
    /// `include file("name")`.
    File(String),
    /// `include url("name")`; not supported by the default includer.
    Url(String),
    /// `include classpath("name")`; not supported by the default includer.
    Classpath(String),
}

impl IncludeTarget {
    pub fn name(&self) -> &str {
        match self {
            IncludeTarget::Heuristic(n)
            | IncludeTarget::File(n)
            | IncludeTarget::Url(n)
            | IncludeTarget::Classpath(n) => n,
        }
    }
}

/// State threaded through nested includes: the directory of the including
/// file, the nesting depth, and the includer itself.
#[derive(Clone)]
pub struct IncludeContext {
    pub base_dir: Option<PathBuf>,
    pub depth: usize,
    pub includer: Rc<dyn Includer>,
}

impl IncludeContext {
    pub(crate) fn root(base_dir: Option<PathBuf>, includer: Option<Rc<dyn Includer>>) -> Self {
        Self {
            base_dir,
            depth: 0,
            includer: includer.unwrap_or_else(|| Rc::new(DefaultIncluder)),
        }
    }

    /// The context for parsing a document included from `included_file`.
    pub(crate) fn descend(&self, included_file: &FsPath) -> Self {
        Self {
            base_dir: included_file.parent().map(|p| p.to_path_buf()),
            depth: self.depth + 1,
            includer: Rc::clone(&self.includer),
        }
    }
}

/// The seam through which the parser loads `include` targets.
///
/// Returns the root value of the included document, or [None] when the target
/// does not exist. Whether a missing target is an error is decided by the
/// caller (`required(...)` includes error, plain includes are skipped).
pub trait Includer {
    fn include(
        &self,
        context: &IncludeContext,
        target: &IncludeTarget,
    ) -> Result<Option<ConfigValue>, ConfigError>;
}

/// File-based includer: resolves names relative to the including file, trying
/// `.conf` and `.json` extensions when the name has none.
pub struct DefaultIncluder;

impl DefaultIncluder {
    fn candidates(&self, context: &IncludeContext, name: &str, heuristic: bool) -> Vec<PathBuf> {
        let base_names: Vec<String> = if heuristic && FsPath::new(name).extension().is_none() {
            vec![
                name.to_string(),
                format!("{}.conf", name),
                format!("{}.json", name),
            ]
        } else {
            vec![name.to_string()]
        };

        let mut out = Vec::new();
        for base_name in &base_names {
            let p = FsPath::new(base_name);
            if p.is_relative() {
                if let Some(dir) = &context.base_dir {
                    out.push(dir.join(base_name));
                }
            }
            out.push(PathBuf::from(base_name));
        }
        out
    }

    fn load(
        &self,
        context: &IncludeContext,
        file: &FsPath,
    ) -> Result<Option<ConfigValue>, ConfigError> {
        let text = match std::fs::read_to_string(file) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(ConfigError::Io {
                    message: format!("error reading {}: {}", file.display(), err),
                });
            }
        };
        let flavor = match file.extension().and_then(|e| e.to_str()) {
            Some("json") => Syntax::Json,
            _ => Syntax::Hocon,
        };
        let origin = Origin::new_file(&file.display().to_string());
        let code = Code::new(&text);
        let nested = context.descend(file);
        parser::parse(&code, &origin, flavor, &nested).map(Some)
    }
}

impl Includer for DefaultIncluder {
    fn include(
        &self,
        context: &IncludeContext,
        target: &IncludeTarget,
    ) -> Result<Option<ConfigValue>, ConfigError> {
        match target {
            IncludeTarget::Heuristic(name) | IncludeTarget::File(name) => {
                let heuristic = matches!(target, IncludeTarget::Heuristic(_));
                for candidate in self.candidates(context, name, heuristic) {
                    if let Some(value) = self.load(context, &candidate)? {
                        return Ok(Some(value));
                    }
                }
                Ok(None)
            }
            // no URL fetching or classpath concept here; these resolve as
            // missing and error only under required()
            IncludeTarget::Url(_) | IncludeTarget::Classpath(_) => Ok(None),
        }
    }
}
