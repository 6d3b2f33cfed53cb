//! # JSON Projection
//!
//! Renders a row as indented JSON by walking a `RowReader` recursively.
//! Named scopes (the root, objects, nested schemas) render as JSON objects;
//! indexed scopes (arrays, tuples, maps, sets, tagged values) render as
//! arrays. A newline and closing indent appear only when a scope actually
//! produced content, so empty scopes render as bare `[]` / `{}`.
//!
//! Strings, date-times, guids and binary values are quoted; binary is
//! hex-encoded. `FLOAT_128` and `MONGODB_OBJECT_ID` have no JSON rendering
//! and fail hard rather than degrading.

use crate::layouts::LayoutCode;
use crate::rows::{Decimal, RowReader, RowResult};

/// Formatting knobs for the JSON projection.
#[derive(Debug, Clone)]
pub struct JsonSettings {
    /// Indentation repeated once per nesting level.
    pub indent_chars: String,
    pub quote_char: char,
}

impl Default for JsonSettings {
    fn default() -> Self {
        JsonSettings {
            indent_chars: "  ".to_string(),
            quote_char: '"',
        }
    }
}

/// Renders the reader's remaining content as a JSON object with default
/// settings.
pub fn to_json(reader: &mut RowReader) -> Result<String, RowResult> {
    to_json_with(reader, &JsonSettings::default())
}

pub fn to_json_with(reader: &mut RowReader, settings: &JsonSettings) -> Result<String, RowResult> {
    let mut out = String::new();
    out.push('{');
    let wrote = write_fields(reader, settings, &mut out, 1, true)?;
    if wrote {
        newline_indent(&mut out, settings, 0);
    }
    out.push('}');
    Ok(out)
}

fn write_fields(
    reader: &mut RowReader,
    settings: &JsonSettings,
    out: &mut String,
    depth: usize,
    named: bool,
) -> Result<bool, RowResult> {
    let mut wrote = false;
    while reader.read() {
        if wrote {
            out.push(',');
        }
        newline_indent(out, settings, depth);
        if named {
            if let Some(path) = reader.path() {
                quote(out, settings, path);
                out.push_str(": ");
            }
        }
        write_value(reader, settings, out, depth)?;
        wrote = true;
    }
    Ok(wrote)
}

fn write_value(
    reader: &mut RowReader,
    settings: &JsonSettings,
    out: &mut String,
    depth: usize,
) -> Result<(), RowResult> {
    let code = reader.cell_code();
    match code {
        LayoutCode::Null => out.push_str("null"),
        LayoutCode::Boolean | LayoutCode::BooleanFalse => {
            out.push_str(if reader.read_bool()? { "true" } else { "false" });
        }
        LayoutCode::Int8 => out.push_str(&reader.read_i8()?.to_string()),
        LayoutCode::Int16 => out.push_str(&reader.read_i16()?.to_string()),
        LayoutCode::Int32 => out.push_str(&reader.read_i32()?.to_string()),
        LayoutCode::Int64 => out.push_str(&reader.read_i64()?.to_string()),
        LayoutCode::UInt8 => out.push_str(&reader.read_u8()?.to_string()),
        LayoutCode::UInt16 => out.push_str(&reader.read_u16()?.to_string()),
        LayoutCode::UInt32 => out.push_str(&reader.read_u32()?.to_string()),
        LayoutCode::UInt64 => out.push_str(&reader.read_u64()?.to_string()),
        LayoutCode::VarInt => out.push_str(&reader.read_var_int()?.to_string()),
        LayoutCode::VarUInt => out.push_str(&reader.read_var_uint()?.to_string()),
        LayoutCode::Float32 => out.push_str(&reader.read_f32()?.to_string()),
        LayoutCode::Float64 => out.push_str(&reader.read_f64()?.to_string()),
        LayoutCode::Decimal => out.push_str(&format_decimal(reader.read_decimal()?)),
        LayoutCode::DateTime => quote(out, settings, &reader.read_date_time()?.to_string()),
        LayoutCode::UnixDateTime => {
            quote(out, settings, &reader.read_unix_date_time()?.to_string());
        }
        LayoutCode::Guid => quote(out, settings, &format_guid(reader.read_guid()?)),
        LayoutCode::Utf8 => quote(out, settings, reader.read_utf8()?),
        LayoutCode::Binary => quote(out, settings, &hex(reader.read_binary()?)),
        LayoutCode::Float128 | LayoutCode::MongoDbObjectId => {
            unimplemented!("no JSON projection for {code:?} values")
        }
        code if code.is_nullable_scope() => {
            if !reader.has_value() {
                out.push_str("null");
            } else {
                reader.read_scope(|inner| {
                    if inner.read() {
                        write_value(inner, settings, out, depth)
                    } else {
                        out.push_str("null");
                        Ok(())
                    }
                })?;
            }
        }
        code if code.is_scope() => {
            let named = !code.is_indexed_scope();
            let (open, close) = if named { ('{', '}') } else { ('[', ']') };
            out.push(open);
            let mut wrote = false;
            reader.read_scope(|child| {
                wrote = write_fields(child, settings, out, depth + 1, named)?;
                Ok(())
            })?;
            if wrote {
                newline_indent(out, settings, depth);
            }
            out.push(close);
        }
        _ => return Err(RowResult::InvalidRow),
    }
    Ok(())
}

fn newline_indent(out: &mut String, settings: &JsonSettings, depth: usize) {
    out.push('\n');
    for _ in 0..depth {
        out.push_str(&settings.indent_chars);
    }
}

fn quote(out: &mut String, settings: &JsonSettings, value: &str) {
    out.push(settings.quote_char);
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push(settings.quote_char);
}

fn hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

fn format_guid(bytes: [u8; 16]) -> String {
    let hex = hex(&bytes);
    format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    )
}

fn format_decimal(value: Decimal) -> String {
    let sign = if value.mantissa < 0 { "-" } else { "" };
    let digits = value.mantissa.unsigned_abs().to_string();
    if value.scale == 0 {
        return format!("{sign}{digits}");
    }
    let scale = value.scale as usize;
    let padded = if digits.len() <= scale {
        format!("{}{}", "0".repeat(scale + 1 - digits.len()), digits)
    } else {
        digits
    };
    let split = padded.len() - scale;
    format!("{sign}{}.{}", &padded[..split], &padded[split..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimals_format_with_scaled_points() {
        let d = |mantissa, scale| format_decimal(Decimal { mantissa, scale });
        assert_eq!(d(12345, 2), "123.45");
        assert_eq!(d(-12345, 2), "-123.45");
        assert_eq!(d(5, 3), "0.005");
        assert_eq!(d(42, 0), "42");
        assert_eq!(d(0, 2), "0.00");
    }

    #[test]
    fn guids_format_hyphenated() {
        let bytes = [
            0x12, 0x34, 0x56, 0x78, 0x9a, 0xbc, 0xde, 0xf0, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66,
            0x77, 0x88,
        ];
        assert_eq!(format_guid(bytes), "12345678-9abc-def0-1122-334455667788");
    }

    #[test]
    fn strings_escape_control_and_quote_characters() {
        let settings = JsonSettings::default();
        let mut out = String::new();
        quote(&mut out, &settings, "a\"b\\c\nd\u{1}");
        assert_eq!(out, "\"a\\\"b\\\\c\\nd\\u0001\"");
    }
}
