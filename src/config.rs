use crate::include::IncludeContext;
use crate::util::Code;
use crate::value::{render_root, ConfigObject, ConfigValue, ValueKind};
use crate::{
    parser, resolver, units, validate, Config, ConfigError, Origin, ParseOptions, Path,
    RenderOptions, ResolveOptions, Syntax,
};
use std::fmt::{Debug, Formatter};
use std::path::Path as FsPath;
use std::time::Duration;

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            syntax: None,
            origin_description: None,
            allow_missing: false,
            includer: None,
        }
    }
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            use_system_environment: true,
            allow_unresolved: false,
        }
    }
}

impl Config {
    fn from_root(root: ConfigValue) -> Self {
        match root.kind() {
            ValueKind::Object(_) => Config { root },
            _ => panic!("Config root must be an object, got {}", root.kind_name()),
        }
    }

    /// A configuration with no settings at all.
    pub fn empty() -> Self {
        Config::from_root(ConfigValue::object(
            Origin::new_simple("empty config"),
            ConfigObject::new(),
        ))
    }

    /// Parse HOCON text into an unresolved configuration.
    pub fn parse_string(text: &str) -> Result<Config, ConfigError> {
        Self::parse_string_with(text, &ParseOptions::default())
    }

    pub fn parse_string_with(text: &str, options: &ParseOptions) -> Result<Config, ConfigError> {
        let description = options.origin_description.as_deref().unwrap_or("String");
        let origin = Origin::new_simple(description);
        let flavor = options.syntax.unwrap_or(Syntax::Hocon);
        let code = Code::new(text);
        let include_context = IncludeContext::root(None, options.includer.clone());
        let root = parser::parse(&code, &origin, flavor, &include_context)?;
        Self::check_root(root)
    }

    /// Parse a file, guessing the syntax flavor from the extension unless the
    /// options pin one.
    pub fn parse_file(file: &FsPath, options: &ParseOptions) -> Result<Config, ConfigError> {
        let text = match std::fs::read_to_string(file) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                if options.allow_missing {
                    return Ok(Config::empty());
                }
                return Err(ConfigError::FileNotFound {
                    path: file.display().to_string(),
                });
            }
            Err(err) => {
                return Err(ConfigError::Io {
                    message: format!("error reading {}: {}", file.display(), err),
                });
            }
        };
        let flavor = options.syntax.unwrap_or_else(|| {
            match file.extension().and_then(|e| e.to_str()) {
                Some("json") => Syntax::Json,
                _ => Syntax::Hocon,
            }
        });
        let origin = Origin::new_file(&file.display().to_string());
        let code = Code::new(&text);
        let include_context = IncludeContext::root(
            file.parent().map(|p| p.to_path_buf()),
            options.includer.clone(),
        );
        let root = parser::parse(&code, &origin, flavor, &include_context)?;
        Self::check_root(root)
    }

    fn check_root(root: ConfigValue) -> Result<Config, ConfigError> {
        match root.kind() {
            ValueKind::Object(_) => Ok(Config { root }),
            _ => Err(ConfigError::WrongType {
                origin: root.origin().clone(),
                message: format!(
                    "the document root is a {}; a Config must have an object at root",
                    root.kind_name()
                ),
            }),
        }
    }

    pub fn root(&self) -> &ConfigObject {
        match self.root.kind() {
            ValueKind::Object(object) => object,
            _ => panic!("Config root is not an object"),
        }
    }

    pub fn root_value(&self) -> &ConfigValue {
        &self.root
    }

    pub fn origin(&self) -> &Origin {
        self.root.origin()
    }

    pub fn is_empty(&self) -> bool {
        self.root().is_empty()
    }

    pub fn is_resolved(&self) -> bool {
        self.root.is_resolved()
    }

    /// Resolve substitutions with default options. Resolving an already
    /// resolved configuration returns an equal configuration.
    pub fn resolve(&self) -> Result<Config, ConfigError> {
        self.resolve_with(&ResolveOptions::default())
    }

    pub fn resolve_with(&self, options: &ResolveOptions) -> Result<Config, ConfigError> {
        let resolved = resolver::resolve_root(&self.root, options)?;
        Ok(Config::from_root(resolved))
    }

    /// Merge: self wins, `fallback` fills gaps, per the deep-merge rules.
    pub fn with_fallback(&self, fallback: &Config) -> Config {
        Config::from_root(self.root.with_fallback(&fallback.root))
    }

    /// Render with HOCON defaults (root braces omitted, unquoted strings
    /// where safe).
    pub fn render(&self) -> String {
        self.render_with_options(&RenderOptions::hocon())
    }

    pub fn render_with_options(&self, options: &RenderOptions) -> String {
        render_root(&self.root, options)
    }

    /// Walk a dotted path to its value, including a Null leaf. Errors on a
    /// missing key, a non-object on the way, or an unresolved node.
    fn find(&self, path_expression: &str) -> Result<ConfigValue, ConfigError> {
        let path = Path::new_path(path_expression)?;
        let rendered = path.render();
        let mut current: &ConfigValue = &self.root;
        for (index, key) in path.keys().iter().enumerate() {
            let object = match current.kind() {
                ValueKind::Object(object) => object,
                ValueKind::Substitution(_)
                | ValueKind::Concat(_)
                | ValueKind::DelayedMerge(_)
                | ValueKind::DelayedMergeObject(_) => {
                    return Err(ConfigError::not_resolved(&format!(
                        "value at '{}' has not been resolved",
                        path.sub_path(0, index).render()
                    )));
                }
                _ => {
                    return Err(ConfigError::wrong_type(
                        current.origin(),
                        &path.sub_path(0, index).render(),
                        "object",
                        current.value_type().name(),
                    ));
                }
            };
            match object.get(key) {
                None => return Err(ConfigError::Missing { path: rendered }),
                Some(child) => current = child,
            }
        }
        Ok(current.clone())
    }

    /// The value at a path, after a null check and a resolution check.
    fn find_non_null(
        &self,
        path_expression: &str,
        expected: &str,
    ) -> Result<ConfigValue, ConfigError> {
        let value = self.find(path_expression)?;
        if matches!(value.kind(), ValueKind::Null) {
            return Err(ConfigError::Null {
                path: path_expression.to_string(),
                expected: expected.to_string(),
            });
        }
        if value.is_unmergeable() {
            return Err(ConfigError::not_resolved(&format!(
                "value at '{}' has not been resolved",
                path_expression
            )));
        }
        Ok(value)
    }

    /// True when the path has a non-null value.
    pub fn has_path(&self, path_expression: &str) -> bool {
        match self.find(path_expression) {
            Ok(value) => !matches!(value.kind(), ValueKind::Null),
            Err(_) => false,
        }
    }

    pub fn get_value(&self, path_expression: &str) -> Result<ConfigValue, ConfigError> {
        self.find(path_expression)
    }

    pub fn get_string(&self, path_expression: &str) -> Result<String, ConfigError> {
        let value = self.find_non_null(path_expression, "string")?;
        convert_string(&value, path_expression)
    }

    pub fn get_boolean(&self, path_expression: &str) -> Result<bool, ConfigError> {
        let value = self.find_non_null(path_expression, "boolean")?;
        convert_boolean(&value, path_expression)
    }

    pub fn get_int(&self, path_expression: &str) -> Result<i32, ConfigError> {
        let value = self.find_non_null(path_expression, "32-bit integer")?;
        convert_int(&value, path_expression)
    }

    pub fn get_long(&self, path_expression: &str) -> Result<i64, ConfigError> {
        let value = self.find_non_null(path_expression, "64-bit integer")?;
        convert_long(&value, path_expression)
    }

    pub fn get_double(&self, path_expression: &str) -> Result<f64, ConfigError> {
        let value = self.find_non_null(path_expression, "number")?;
        convert_double(&value, path_expression)
    }

    /// A size in bytes: a plain number, or a string with a size unit such as
    /// `"128M"` or `"1.5kB"`.
    pub fn get_bytes(&self, path_expression: &str) -> Result<i64, ConfigError> {
        let value = self.find_non_null(path_expression, "size-in-bytes")?;
        convert_bytes(&value, path_expression)
    }

    /// A duration in nanoseconds: a plain number of milliseconds, or a
    /// string with a time unit such as `"250ms"` or `"2.5 minutes"`.
    pub fn get_nanoseconds(&self, path_expression: &str) -> Result<i64, ConfigError> {
        let value = self.find_non_null(path_expression, "duration")?;
        convert_nanoseconds(&value, path_expression)
    }

    /// A duration in milliseconds; fractional milliseconds truncate.
    pub fn get_milliseconds(&self, path_expression: &str) -> Result<i64, ConfigError> {
        Ok(self.get_nanoseconds(path_expression)? / 1_000_000)
    }

    pub fn get_duration(&self, path_expression: &str) -> Result<Duration, ConfigError> {
        let value = self.find_non_null(path_expression, "duration")?;
        let nanos = convert_nanoseconds(&value, path_expression)?;
        if nanos < 0 {
            return Err(ConfigError::BadValue {
                origin: value.origin().clone(),
                path: path_expression.to_string(),
                message: format!("duration must not be negative, got {} ns", nanos),
            });
        }
        Ok(Duration::from_nanos(nanos as u64))
    }

    pub fn get_list(&self, path_expression: &str) -> Result<Vec<ConfigValue>, ConfigError> {
        let value = self.find_non_null(path_expression, "list")?;
        match value.kind() {
            ValueKind::List(items) => Ok(items.clone()),
            _ => Err(ConfigError::wrong_type(
                value.origin(),
                path_expression,
                "list",
                value.value_type().name(),
            )),
        }
    }

    pub fn get_object(&self, path_expression: &str) -> Result<ConfigObject, ConfigError> {
        let value = self.find_non_null(path_expression, "object")?;
        match value.kind() {
            ValueKind::Object(object) => Ok(object.clone()),
            _ => Err(ConfigError::wrong_type(
                value.origin(),
                path_expression,
                "object",
                value.value_type().name(),
            )),
        }
    }

    /// The sub-tree at the path as a configuration of its own.
    pub fn get_config(&self, path_expression: &str) -> Result<Config, ConfigError> {
        let value = self.find_non_null(path_expression, "object")?;
        match value.kind() {
            ValueKind::Object(_) => Ok(Config { root: value }),
            _ => Err(ConfigError::wrong_type(
                value.origin(),
                path_expression,
                "object",
                value.value_type().name(),
            )),
        }
    }

    pub fn get_string_list(&self, path_expression: &str) -> Result<Vec<String>, ConfigError> {
        self.element_wise(path_expression, convert_string)
    }

    pub fn get_boolean_list(&self, path_expression: &str) -> Result<Vec<bool>, ConfigError> {
        self.element_wise(path_expression, convert_boolean)
    }

    pub fn get_int_list(&self, path_expression: &str) -> Result<Vec<i32>, ConfigError> {
        self.element_wise(path_expression, convert_int)
    }

    pub fn get_long_list(&self, path_expression: &str) -> Result<Vec<i64>, ConfigError> {
        self.element_wise(path_expression, convert_long)
    }

    pub fn get_double_list(&self, path_expression: &str) -> Result<Vec<f64>, ConfigError> {
        self.element_wise(path_expression, convert_double)
    }

    pub fn get_bytes_list(&self, path_expression: &str) -> Result<Vec<i64>, ConfigError> {
        self.element_wise(path_expression, convert_bytes)
    }

    pub fn get_nanoseconds_list(&self, path_expression: &str) -> Result<Vec<i64>, ConfigError> {
        self.element_wise(path_expression, convert_nanoseconds)
    }

    pub fn get_milliseconds_list(&self, path_expression: &str) -> Result<Vec<i64>, ConfigError> {
        Ok(self
            .get_nanoseconds_list(path_expression)?
            .into_iter()
            .map(|nanos| nanos / 1_000_000)
            .collect())
    }

    pub fn get_duration_list(&self, path_expression: &str) -> Result<Vec<Duration>, ConfigError> {
        self.element_wise(path_expression, |value, path| {
            let nanos = convert_nanoseconds(value, path)?;
            if nanos < 0 {
                return Err(ConfigError::BadValue {
                    origin: value.origin().clone(),
                    path: path.to_string(),
                    message: format!("duration must not be negative, got {} ns", nanos),
                });
            }
            Ok(Duration::from_nanos(nanos as u64))
        })
    }

    pub fn get_object_list(&self, path_expression: &str) -> Result<Vec<ConfigObject>, ConfigError> {
        self.element_wise(path_expression, |v, p| match v.kind() {
            ValueKind::Object(object) => Ok(object.clone()),
            _ => Err(ConfigError::wrong_type(
                v.origin(),
                p,
                "object",
                v.value_type().name(),
            )),
        })
    }

    pub fn get_config_list(&self, path_expression: &str) -> Result<Vec<Config>, ConfigError> {
        Ok(self
            .get_object_list(path_expression)?
            .into_iter()
            .map(|object| {
                Config::from_root(ConfigValue::object(self.origin().clone(), object))
            })
            .collect())
    }

    fn element_wise<T>(
        &self,
        path_expression: &str,
        convert: impl Fn(&ConfigValue, &str) -> Result<T, ConfigError>,
    ) -> Result<Vec<T>, ConfigError> {
        let items = self.get_list(path_expression)?;
        items
            .iter()
            .map(|item| convert(item, path_expression))
            .collect()
    }

    /// A configuration keeping only the sub-tree at the path; the rest of the
    /// structure on the way to it is preserved.
    pub fn with_only_path(&self, path_expression: &str) -> Result<Config, ConfigError> {
        let path = Path::new_path(path_expression)?;
        let retained = with_only(self.root(), path.keys())?;
        Ok(Config::from_root(ConfigValue::object(
            self.origin().clone(),
            retained.unwrap_or_default(),
        )))
    }

    /// A configuration with the sub-tree at the path removed.
    pub fn without_path(&self, path_expression: &str) -> Result<Config, ConfigError> {
        let path = Path::new_path(path_expression)?;
        let remaining = without(self.root(), path.keys())?;
        Ok(Config::from_root(ConfigValue::object(
            self.origin().clone(),
            remaining,
        )))
    }

    /// All leaf paths with their non-null values, in insertion order.
    pub fn entry_set(&self) -> Result<Vec<(String, ConfigValue)>, ConfigError> {
        let mut out = Vec::new();
        collect_entries(self.root(), &mut Vec::new(), &mut out)?;
        Ok(out)
    }

    /// Check this (resolved) configuration against a (resolved) reference,
    /// reporting every missing or wrongly-typed path at once.
    pub fn check_valid(
        &self,
        reference: &Config,
        restrict_to_paths: &[&str],
    ) -> Result<(), ConfigError> {
        validate::check_valid(self, reference, restrict_to_paths)
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Config({})", self.root)
    }
}

fn convert_string(value: &ConfigValue, path: &str) -> Result<String, ConfigError> {
    match value.kind() {
        ValueKind::String(s) => Ok(s.clone()),
        _ => Err(ConfigError::wrong_type(
            value.origin(),
            path,
            "string",
            value.value_type().name(),
        )),
    }
}

fn convert_boolean(value: &ConfigValue, path: &str) -> Result<bool, ConfigError> {
    match value.kind() {
        ValueKind::Boolean(b) => Ok(*b),
        _ => Err(ConfigError::wrong_type(
            value.origin(),
            path,
            "boolean",
            value.value_type().name(),
        )),
    }
}

fn convert_int(value: &ConfigValue, path: &str) -> Result<i32, ConfigError> {
    let long = convert_long_impl(value, path, "32-bit integer")?;
    i32::try_from(long).map_err(|_| {
        ConfigError::wrong_type(
            value.origin(),
            path,
            "32-bit integer",
            &format!("out-of-range value {}", long),
        )
    })
}

fn convert_long(value: &ConfigValue, path: &str) -> Result<i64, ConfigError> {
    convert_long_impl(value, path, "64-bit integer")
}

fn convert_long_impl(value: &ConfigValue, path: &str, expected: &str) -> Result<i64, ConfigError> {
    match value.kind() {
        ValueKind::Int(v, _) => Ok(*v as i64),
        ValueKind::Long(v, _) => Ok(*v),
        ValueKind::Double(v, _) => {
            if v.fract() == 0.0 && *v >= i64::MIN as f64 && *v <= i64::MAX as f64 {
                Ok(*v as i64)
            } else {
                Err(ConfigError::wrong_type(
                    value.origin(),
                    path,
                    expected,
                    &format!("number with a fractional part ({})", v),
                ))
            }
        }
        _ => Err(ConfigError::wrong_type(
            value.origin(),
            path,
            expected,
            value.value_type().name(),
        )),
    }
}

fn convert_double(value: &ConfigValue, path: &str) -> Result<f64, ConfigError> {
    match value.kind() {
        ValueKind::Int(v, _) => Ok(*v as f64),
        ValueKind::Long(v, _) => Ok(*v as f64),
        ValueKind::Double(v, _) => Ok(*v),
        _ => Err(ConfigError::wrong_type(
            value.origin(),
            path,
            "number",
            value.value_type().name(),
        )),
    }
}

fn convert_bytes(value: &ConfigValue, path: &str) -> Result<i64, ConfigError> {
    match value.kind() {
        ValueKind::String(s) => units::parse_bytes(s, value.origin(), path),
        ValueKind::Int(_, _) | ValueKind::Long(_, _) | ValueKind::Double(_, _) => {
            convert_long_impl(value, path, "size-in-bytes")
        }
        _ => Err(ConfigError::wrong_type(
            value.origin(),
            path,
            "size-in-bytes (number or string with unit)",
            value.value_type().name(),
        )),
    }
}

fn convert_nanoseconds(value: &ConfigValue, path: &str) -> Result<i64, ConfigError> {
    match value.kind() {
        ValueKind::String(s) => units::parse_duration(s, value.origin(), path),
        // a plain number is a count of milliseconds
        ValueKind::Int(v, _) => Ok(*v as i64 * 1_000_000),
        ValueKind::Long(v, _) => v.checked_mul(1_000_000).ok_or_else(|| {
            ConfigError::BadValue {
                origin: value.origin().clone(),
                path: path.to_string(),
                message: format!("duration in milliseconds out of range: {}", v),
            }
        }),
        ValueKind::Double(v, _) => Ok((*v * 1_000_000.0) as i64),
        _ => Err(ConfigError::wrong_type(
            value.origin(),
            path,
            "duration (number or string with unit)",
            value.value_type().name(),
        )),
    }
}

fn with_only(
    object: &ConfigObject,
    keys: &[String],
) -> Result<Option<ConfigObject>, ConfigError> {
    let key = &keys[0];
    let child = match object.get(key) {
        None => return Ok(None),
        Some(child) => child,
    };
    if keys.len() == 1 {
        let mut retained = ConfigObject::new();
        retained.insert(key.clone(), child.clone());
        return Ok(Some(retained));
    }
    match child.kind() {
        ValueKind::Object(inner) => match with_only(inner, &keys[1..])? {
            None => Ok(None),
            Some(retained_inner) => {
                let mut retained = ConfigObject::new();
                retained.insert(
                    key.clone(),
                    ConfigValue::object(child.origin().clone(), retained_inner),
                );
                Ok(Some(retained))
            }
        },
        ValueKind::Substitution(_)
        | ValueKind::Concat(_)
        | ValueKind::DelayedMerge(_)
        | ValueKind::DelayedMergeObject(_) => Err(ConfigError::not_resolved(&format!(
            "value at '{}' has not been resolved",
            key
        ))),
        _ => Ok(None),
    }
}

fn without(object: &ConfigObject, keys: &[String]) -> Result<ConfigObject, ConfigError> {
    let key = &keys[0];
    let mut remaining = ConfigObject::new();
    for (existing_key, child) in object.iter() {
        if existing_key != key {
            remaining.insert(existing_key.to_string(), child.clone());
            continue;
        }
        if keys.len() == 1 {
            continue;
        }
        match child.kind() {
            ValueKind::Object(inner) => {
                let inner_remaining = without(inner, &keys[1..])?;
                remaining.insert(
                    existing_key.to_string(),
                    ConfigValue::object(child.origin().clone(), inner_remaining),
                );
            }
            ValueKind::Substitution(_)
            | ValueKind::Concat(_)
            | ValueKind::DelayedMerge(_)
            | ValueKind::DelayedMergeObject(_) => {
                return Err(ConfigError::not_resolved(&format!(
                    "value at '{}' has not been resolved",
                    existing_key
                )));
            }
            _ => {
                remaining.insert(existing_key.to_string(), child.clone());
            }
        }
    }
    Ok(remaining)
}

fn collect_entries(
    object: &ConfigObject,
    prefix: &mut Vec<String>,
    out: &mut Vec<(String, ConfigValue)>,
) -> Result<(), ConfigError> {
    for (key, value) in object.iter() {
        prefix.push(key.to_string());
        match value.kind() {
            ValueKind::Object(inner) => collect_entries(inner, prefix, out)?,
            ValueKind::Null => {}
            ValueKind::Substitution(_)
            | ValueKind::Concat(_)
            | ValueKind::DelayedMerge(_)
            | ValueKind::DelayedMergeObject(_) => {
                prefix.pop();
                return Err(ConfigError::not_resolved(&format!(
                    "value at '{}' has not been resolved",
                    key
                )));
            }
            _ => out.push((
                Path::from_keys(prefix.clone()).render(),
                value.clone(),
            )),
        }
        prefix.pop();
    }
    Ok(())
}
