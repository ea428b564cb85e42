// Decoding of tool-call arguments into engine types.
//
// Loosely typed JSON (`position` may be a number or a string, `section` a
// name or an ordinal) is resolved here, once, so the services only ever see
// tagged values.

use serde_json::Value;

use crate::core::editing::{
    Alignment, BatchOperation, EditError, InsertPosition, NamedStyle, ParagraphStyle, RgbColor,
    SectionIdentifier, SectionTarget, Substitution, TextStyle,
};
use crate::core::scripts::ScriptFileType;

pub fn required_str<'a>(args: &'a Value, key: &str) -> Result<&'a str, EditError> {
    args.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| EditError::invalid(format!("Missing '{}' argument", key)))
}

pub fn optional_str<'a>(args: &'a Value, key: &str) -> Result<Option<&'a str>, EditError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(EditError::invalid(format!("'{}' must be a string", key))),
    }
}

pub fn optional_bool(args: &Value, key: &str) -> Result<Option<bool>, EditError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(EditError::invalid(format!("'{}' must be a boolean", key))),
    }
}

fn ordinal(value: &Value, key: &str) -> Result<usize, EditError> {
    value
        .as_u64()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| {
            EditError::invalid(format!("'{}' must be a non-negative integer", key))
        })
}

/// `old_text` / `new_text` / `replace_all`.
pub fn substitution(args: &Value) -> Result<Substitution, EditError> {
    Ok(Substitution::new(
        required_str(args, "old_text")?,
        required_str(args, "new_text")?,
        optional_bool(args, "replace_all")?.unwrap_or(false),
    ))
}

/// Missing or `"end"` appends; a number is a character index; any other
/// string is anchor text to insert after.
pub fn insert_position(value: Option<&Value>) -> Result<InsertPosition, EditError> {
    match value {
        None | Some(Value::Null) => Ok(InsertPosition::End),
        Some(Value::String(s)) if s == "end" => Ok(InsertPosition::End),
        Some(Value::String(s)) => Ok(InsertPosition::After(s.clone())),
        Some(n @ Value::Number(_)) => Ok(InsertPosition::Index(ordinal(n, "position")?)),
        Some(_) => Err(EditError::invalid(
            "'position' must be \"end\", a character index, or text to insert after",
        )),
    }
}

pub fn section_identifier(value: Option<&Value>) -> Result<SectionIdentifier, EditError> {
    match value {
        Some(Value::String(name)) => Ok(SectionIdentifier::Name(name.clone())),
        Some(n @ Value::Number(_)) => Ok(SectionIdentifier::Ordinal(ordinal(n, "section")?)),
        _ => Err(EditError::invalid(
            "'section' must be a section name or a 0-based index",
        )),
    }
}

pub fn section_target(value: Option<&Value>) -> Result<SectionTarget, EditError> {
    match value {
        Some(Value::String(s)) if s == "start" => Ok(SectionTarget::Start),
        Some(Value::String(s)) if s == "end" => Ok(SectionTarget::End),
        Some(Value::String(name)) => Ok(SectionTarget::Name(name.clone())),
        Some(n @ Value::Number(_)) => Ok(SectionTarget::Ordinal(ordinal(n, "target")?)),
        _ => Err(EditError::invalid(
            "'target' must be \"start\", \"end\", a section name, or a 0-based index",
        )),
    }
}

fn color(args: &Value, key: &str) -> Result<Option<RgbColor>, EditError> {
    optional_str(args, key)?
        .map(|hex| {
            RgbColor::from_hex(hex).ok_or_else(|| {
                EditError::invalid(format!("'{}' must be a hex color like #FF0000, got {}", key, hex))
            })
        })
        .transpose()
}

pub fn text_style(args: &Value) -> Result<TextStyle, EditError> {
    let font_size = match args.get("font_size") {
        None | Some(Value::Null) => None,
        Some(v) => Some(
            v.as_f64()
                .filter(|size| *size > 0.0)
                .ok_or_else(|| EditError::invalid("'font_size' must be a positive number"))?
                as f32,
        ),
    };

    Ok(TextStyle {
        bold: optional_bool(args, "bold")?,
        italic: optional_bool(args, "italic")?,
        underline: optional_bool(args, "underline")?,
        strikethrough: optional_bool(args, "strikethrough")?,
        font_size,
        font_family: optional_str(args, "font_family")?.map(str::to_string),
        foreground: color(args, "foreground_color")?,
        background: color(args, "background_color")?,
    })
}

pub fn paragraph_style(args: &Value) -> Result<ParagraphStyle, EditError> {
    let named_style = optional_str(args, "heading")?
        .map(|name| {
            NamedStyle::parse(name).ok_or_else(|| {
                EditError::invalid(format!(
                    "'heading' must be NORMAL_TEXT, TITLE, SUBTITLE or HEADING_1 to HEADING_6, got {}",
                    name
                ))
            })
        })
        .transpose()?;
    let alignment = optional_str(args, "alignment")?
        .map(|name| {
            Alignment::from_user(name).ok_or_else(|| {
                EditError::invalid(format!(
                    "'alignment' must be LEFT, CENTER, RIGHT or JUSTIFY, got {}",
                    name
                ))
            })
        })
        .transpose()?;

    Ok(ParagraphStyle {
        named_style,
        alignment,
    })
}

pub fn batch_operations(value: Option<&Value>) -> Result<Vec<BatchOperation>, EditError> {
    let value = value.ok_or_else(|| EditError::invalid("Missing 'operations' argument"))?;
    serde_json::from_value(value.clone())
        .map_err(|e| EditError::invalid(format!("Invalid operations: {}", e)))
}

pub fn script_file_type(args: &Value) -> Result<Option<ScriptFileType>, EditError> {
    optional_str(args, "file_type")?
        .map(|name| {
            serde_json::from_value(Value::String(name.to_ascii_uppercase())).map_err(|_| {
                EditError::invalid(format!(
                    "'file_type' must be SERVER_JS, HTML or JSON, got {}",
                    name
                ))
            })
        })
        .transpose()
}
