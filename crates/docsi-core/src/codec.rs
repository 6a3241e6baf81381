//! Reading and writing `search_index.js` files.
//!
//! Documentation generators ship their search data as a small JavaScript
//! file that binds one JSON object to a global:
//!
//! ```text
//! var documenterSearchIndex = {"docs":
//! [{"location":"man/plotting/","page":"Plotting",...},...]
//! }
//! ```
//!
//! [`parse`] accepts that form as well as the bare JSON object or the bare
//! record array. [`render`] writes the generator's exact layout back out,
//! so a file that came from the generator survives a round trip
//! byte-for-byte.

use crate::{Category, Diagnostic, Error, Fragment, Result, SearchIndexDocument};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Identifier the generator binds its search data to.
pub const DEFAULT_BINDING: &str = "documenterSearchIndex";

const FIELDS: [&str; 5] = ["location", "page", "title", "text", "category"];

/// How to treat malformed records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParseMode {
    /// Fail on the first malformed record.
    #[default]
    Strict,
    /// Skip malformed records and report them as diagnostics.
    Lenient,
}

/// Outcome of parsing one search index file.
#[derive(Debug, Clone)]
pub struct ParsedIndex {
    /// Identifier from a `var <ident> = ...` wrapper, if the input had one.
    pub binding: Option<String>,
    /// Fragments that decoded, in input order.
    pub document: SearchIndexDocument,
    /// Records skipped in lenient mode.
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse a search index in strict mode.
pub fn parse(input: &str) -> Result<ParsedIndex> {
    parse_with(input, ParseMode::Strict)
}

/// Parse a search index with an explicit [`ParseMode`].
pub fn parse_with(input: &str, mode: ParseMode) -> Result<ParsedIndex> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input).trim();
    if input.is_empty() {
        return Err(Error::Parse("input is empty".into()));
    }

    let (binding, payload) = split_binding(input)?;
    let root: Value = serde_json::from_str(payload)
        .map_err(|e| Error::Parse(format!("invalid JSON payload: {e}")))?;

    let records = match root {
        Value::Array(records) => records,
        Value::Object(mut object) => match object.remove("docs") {
            Some(Value::Array(records)) => records,
            Some(_) => return Err(Error::Parse("`docs` is not an array".into())),
            None => return Err(Error::Parse("object has no `docs` array".into())),
        },
        _ => {
            return Err(Error::Parse(
                "expected a `{\"docs\": [...]}` object or a record array".into(),
            ));
        },
    };

    let mut docs = Vec::with_capacity(records.len());
    let mut diagnostics = Vec::new();
    for (index, record) in records.into_iter().enumerate() {
        match decode_record(record) {
            Ok(fragment) => docs.push(fragment),
            Err(reason) => match mode {
                ParseMode::Strict => return Err(Error::InvalidRecord { index, reason }),
                ParseMode::Lenient => {
                    warn!("Skipping record #{index}: {reason}");
                    diagnostics.push(Diagnostic::error(Some(index), reason));
                },
            },
        }
    }

    debug!(
        "Parsed {} fragments ({} skipped, binding {:?})",
        docs.len(),
        diagnostics.len(),
        binding
    );

    Ok(ParsedIndex {
        binding,
        document: SearchIndexDocument::new(docs),
        diagnostics,
    })
}

/// Split a `var <ident> = <json>` assignment into identifier and payload.
///
/// Input that starts directly with JSON is returned unchanged.
fn split_binding(input: &str) -> Result<(Option<String>, &str)> {
    if input.starts_with('{') || input.starts_with('[') {
        return Ok((None, input));
    }

    let rest = ["var", "let", "const"]
        .iter()
        .find_map(|kw| {
            input
                .strip_prefix(kw)
                .filter(|r| r.starts_with(char::is_whitespace))
        })
        .ok_or_else(|| {
            Error::Parse("expected JSON or a `var <name> = ...` assignment".into())
        })?
        .trim_start();

    let (ident, payload) = rest
        .split_once('=')
        .ok_or_else(|| Error::Parse("assignment is missing `=`".into()))?;
    let ident = ident.trim();
    if !is_identifier(ident) {
        return Err(Error::Parse(format!("`{ident}` is not a valid identifier")));
    }

    let payload = payload.trim();
    let payload = payload.strip_suffix(';').unwrap_or(payload).trim_end();
    Ok((Some(ident.to_string()), payload))
}

/// JavaScript identifier check restricted to ASCII, which is all generators emit.
#[must_use]
pub fn is_identifier(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn decode_record(record: Value) -> std::result::Result<Fragment, String> {
    let Value::Object(mut object) = record else {
        return Err(format!("expected an object, found {}", kind_of(&record)));
    };

    if let Some(extra) = object.keys().find(|k| !FIELDS.contains(&k.as_str())) {
        return Err(format!("unexpected field `{extra}`"));
    }

    let location = take_string(&mut object, "location")?;
    let page = take_string(&mut object, "page")?;
    let title = take_string(&mut object, "title")?;
    let text = take_string(&mut object, "text")?;
    let category = take_string(&mut object, "category")?.parse::<Category>()?;

    Ok(Fragment {
        location,
        page,
        title,
        text,
        category,
    })
}

fn take_string(
    object: &mut Map<String, Value>,
    field: &str,
) -> std::result::Result<String, String> {
    match object.remove(field) {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(format!(
            "field `{field}` must be a string, found {}",
            kind_of(&other)
        )),
        None => Err(format!("missing field `{field}`")),
    }
}

const fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Write a document in the generator's `search_index.js` layout.
pub fn render(document: &SearchIndexDocument, binding: &str) -> Result<String> {
    if !is_identifier(binding) {
        return Err(Error::Parse(format!("`{binding}` is not a valid identifier")));
    }

    let estimate: usize = document.docs.iter().map(|f| f.text.len() + 96).sum();
    let mut out = String::with_capacity(64 + estimate);
    out.push_str("var ");
    out.push_str(binding);
    out.push_str(" = {\"docs\":\n[");
    for (i, fragment) in document.docs.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&serde_json::to_string(fragment)?);
    }
    out.push_str("]\n}\n");
    Ok(out)
}

/// Pretty-printed `{"docs": [...]}` JSON for tooling.
pub fn render_json(document: &SearchIndexDocument) -> Result<String> {
    Ok(serde_json::to_string_pretty(document)?)
}
