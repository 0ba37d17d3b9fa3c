use super::{ConfigValue, ValueKind};
use crate::path::render_key;
use crate::RenderOptions;

impl RenderOptions {
    /// Verbose defaults: formatted JSON with comments.
    pub fn defaults() -> Self {
        Self {
            json: true,
            formatted: true,
            comments: true,
            origin_comments: false,
        }
    }

    /// Single-line JSON with nothing extra.
    pub fn concise() -> Self {
        Self {
            json: true,
            formatted: false,
            comments: false,
            origin_comments: false,
        }
    }

    /// Formatted HOCON output: unquoted strings where safe, comments kept.
    pub fn hocon() -> Self {
        Self {
            json: false,
            formatted: true,
            comments: true,
            origin_comments: false,
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::defaults()
    }
}

/// Render a string as a JSON string literal with the standard escapes.
pub fn render_json_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\u{0008}' => out.push_str("\\b"),
            '\u{000C}' => out.push_str("\\f"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Render a string without quotes when that is guaranteed to re-parse as the
/// same string. This may quote unnecessarily, but never fails to quote when
/// necessary.
fn render_string_unquoted_if_possible(s: &str) -> String {
    if s.is_empty() {
        return render_json_string(s);
    }
    let first = s.chars().next().unwrap();
    // a leading digit or hyphen could be taken for a number
    if first.is_ascii_digit() || first == '-' {
        return render_json_string(s);
    }
    if s.starts_with("include")
        || s.starts_with("true")
        || s.starts_with("false")
        || s.starts_with("null")
        || s.contains("//")
    {
        return render_json_string(s);
    }
    if s.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        s.to_string()
    } else {
        render_json_string(s)
    }
}

impl ConfigValue {
    /// Render with [RenderOptions::defaults].
    pub fn render(&self) -> String {
        self.render_with_options(&RenderOptions::defaults())
    }

    pub fn render_with_options(&self, options: &RenderOptions) -> String {
        let mut out = String::new();
        render_value(self, &mut out, 0, options);
        out
    }

    /// Single-line rendering used by Display and error messages.
    pub(crate) fn render_compact(&self) -> String {
        self.render_with_options(&RenderOptions::concise())
    }
}

/// Render the body of the root object without braces (HOCON mode allows the
/// root braces to be omitted).
pub(crate) fn render_root(root: &ConfigValue, options: &RenderOptions) -> String {
    match root.kind() {
        ValueKind::Object(obj) if !options.json && !obj.is_empty() => {
            let mut out = String::new();
            render_entries(obj.iter(), &mut out, 0, false, options);
            if options.formatted {
                out.push('\n');
            }
            out
        }
        _ => root.render_with_options(options),
    }
}

fn push_indent(out: &mut String, indent: usize) {
    for _ in 0..indent {
        out.push_str("    ");
    }
}

fn render_number(value_text: &Option<String>, computed: String) -> String {
    match value_text {
        Some(raw) => raw.clone(),
        None => computed,
    }
}

fn render_value(value: &ConfigValue, out: &mut String, indent: usize, options: &RenderOptions) {
    match value.kind() {
        ValueKind::Null => out.push_str("null"),
        ValueKind::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
        ValueKind::Int(v, raw) => out.push_str(&render_number(raw, v.to_string())),
        ValueKind::Long(v, raw) => out.push_str(&render_number(raw, v.to_string())),
        ValueKind::Double(v, raw) => out.push_str(&render_number(raw, v.to_string())),
        ValueKind::String(s) => {
            if options.json {
                out.push_str(&render_json_string(s));
            } else {
                out.push_str(&render_string_unquoted_if_possible(s));
            }
        }
        ValueKind::Substitution(expr) => {
            out.push_str("${");
            if expr.optional {
                out.push('?');
            }
            out.push_str(&expr.path.render());
            out.push('}');
        }
        ValueKind::Concat(pieces) => {
            for piece in pieces {
                render_value(piece, out, indent, options);
            }
        }
        ValueKind::List(items) => {
            if items.is_empty() {
                out.push_str("[]");
                return;
            }
            out.push('[');
            let mut first = true;
            for item in items {
                if !first {
                    out.push(',');
                }
                if options.formatted {
                    out.push('\n');
                    push_indent(out, indent + 1);
                }
                render_value(item, out, indent + 1, options);
                first = false;
            }
            if options.formatted {
                out.push('\n');
                push_indent(out, indent);
            }
            out.push(']');
        }
        ValueKind::Object(obj) => {
            if obj.is_empty() {
                out.push_str("{}");
                return;
            }
            out.push('{');
            render_entries(obj.iter(), out, indent + 1, true, options);
            if options.formatted {
                out.push('\n');
                push_indent(out, indent);
            }
            out.push('}');
        }
        ValueKind::DelayedMerge(stack) | ValueKind::DelayedMergeObject(stack) => {
            // a bare unresolved merge with no enclosing field; join the
            // layers so at least the content is visible
            let mut first = true;
            for layer in stack {
                if !first {
                    out.push(' ');
                }
                render_value(layer, out, indent, options);
                first = false;
            }
        }
    }
}

fn render_entries<'e, I: Iterator<Item = (&'e str, &'e ConfigValue)>>(
    entries: I,
    out: &mut String,
    indent: usize,
    inside_braces: bool,
    options: &RenderOptions,
) {
    let mut first = true;
    for (key, value) in entries {
        match value.kind() {
            ValueKind::DelayedMerge(stack) | ValueKind::DelayedMergeObject(stack) => {
                // re-emit an unresolved merge as duplicate fields, bottom
                // first, so re-parsing merges them back in the same order
                for layer in stack.iter().rev() {
                    render_entry(key, layer, out, indent, inside_braces, &mut first, options);
                }
            }
            _ => render_entry(key, value, out, indent, inside_braces, &mut first, options),
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn render_entry(
    key: &str,
    value: &ConfigValue,
    out: &mut String,
    indent: usize,
    inside_braces: bool,
    first: &mut bool,
    options: &RenderOptions,
) {
    if !*first {
        out.push(',');
    }
    if options.formatted {
        if !*first || inside_braces {
            out.push('\n');
        }
        push_indent(out, indent);
    }
    if options.formatted && !options.json {
        if options.origin_comments {
            out.push_str("# ");
            out.push_str(&value.origin().description());
            out.push('\n');
            push_indent(out, indent);
        }
        if options.comments {
            for comment in value.origin().comments() {
                out.push('#');
                out.push_str(comment);
                out.push('\n');
                push_indent(out, indent);
            }
        }
    }
    if options.json {
        out.push_str(&render_json_string(key));
    } else {
        out.push_str(&render_key(key));
    }
    if options.formatted {
        out.push_str(" : ");
    } else {
        out.push(':');
    }
    render_value(value, out, indent, options);
    *first = false;
}
