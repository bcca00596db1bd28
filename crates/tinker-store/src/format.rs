//! Output serialization styles.
//!
//! `Canonical` reproduces the exact byte layout chain tooling has historically
//! published for tinkered genesis files: one value per line with no
//! indentation, `": "` between keys and values, and every character outside
//! printable ASCII escaped as a lower-case `\uXXXX` UTF-16 unit.

use std::io;

use serde::{Deserialize, Serialize};
use serde_json::ser::{Formatter, PrettyFormatter};

/// Byte layout of a serialized genesis file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputStyle {
    /// Newline separated, zero indentation, ASCII-only.
    #[default]
    Canonical,
    /// Two-space indentation, UTF-8 passed through.
    Pretty,
    /// No whitespace at all.
    Compact,
}

impl OutputStyle {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Canonical => "canonical",
            Self::Pretty => "pretty",
            Self::Compact => "compact",
        }
    }
}

impl std::fmt::Display for OutputStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Serialize `value` in the requested style.
pub fn to_vec_styled<T: Serialize + ?Sized>(
    value: &T,
    style: OutputStyle,
) -> serde_json::Result<Vec<u8>> {
    match style {
        OutputStyle::Canonical => {
            let mut out = Vec::with_capacity(4096);
            let mut ser = serde_json::Serializer::with_formatter(&mut out, AsciiFormatter::new());
            value.serialize(&mut ser)?;
            Ok(out)
        }
        OutputStyle::Pretty => serde_json::to_vec_pretty(value),
        OutputStyle::Compact => serde_json::to_vec(value),
    }
}

/// Zero-indent pretty printer that escapes non-ASCII text.
struct AsciiFormatter {
    inner: PrettyFormatter<'static>,
}

impl AsciiFormatter {
    fn new() -> Self {
        Self {
            inner: PrettyFormatter::with_indent(b""),
        }
    }
}

impl Formatter for AsciiFormatter {
    fn write_string_fragment<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        let bytes = fragment.as_bytes();
        let mut start = 0;
        for (i, ch) in fragment.char_indices() {
            if (' '..='~').contains(&ch) {
                continue;
            }
            if start < i {
                writer.write_all(&bytes[start..i])?;
            }
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{:04x}", unit)?;
            }
            start = i + ch.len_utf8();
        }
        if start < bytes.len() {
            writer.write_all(&bytes[start..])?;
        }
        Ok(())
    }

    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_array(writer)
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.inner.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_object(writer)
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.inner.begin_object_key(writer, first)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_object_value(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn canonical(v: &Value) -> String {
        String::from_utf8(to_vec_styled(v, OutputStyle::Canonical).unwrap()).unwrap()
    }

    #[test]
    fn canonical_layout_has_no_indentation() {
        let v = json!({"a": [1, 2], "b": {"c": "d"}, "e": [], "f": {}});
        assert_eq!(
            canonical(&v),
            "{\n\"a\": [\n1,\n2\n],\n\"b\": {\n\"c\": \"d\"\n},\n\"e\": [],\n\"f\": {}\n}"
        );
    }

    #[test]
    fn canonical_escapes_non_ascii() {
        let v = json!({"name": "Umbrella ☔"});
        assert_eq!(canonical(&v), "{\n\"name\": \"Umbrella \\u2614\"\n}");
    }

    #[test]
    fn canonical_escapes_astral_chars_as_surrogate_pairs() {
        let v = json!("🚀x");
        assert_eq!(canonical(&v), "\"\\ud83d\\ude80x\"");
    }

    #[test]
    fn canonical_escapes_delete_and_controls() {
        let v = json!("a\u{7f}\nb\u{1}");
        assert_eq!(canonical(&v), "\"a\\u007f\\nb\\u0001\"");
    }

    #[test]
    fn canonical_output_parses_back_to_same_tree() {
        let v = json!({"moniker": "Ünïcödé ☔", "power": "10", "list": [{"x": null}]});
        let parsed: Value = serde_json::from_str(&canonical(&v)).unwrap();
        assert_eq!(parsed, v);
    }

    #[test]
    fn pretty_and_compact_styles() {
        let v = json!({"a": [1]});
        assert_eq!(
            to_vec_styled(&v, OutputStyle::Pretty).unwrap(),
            b"{\n  \"a\": [\n    1\n  ]\n}"
        );
        assert_eq!(to_vec_styled(&v, OutputStyle::Compact).unwrap(), b"{\"a\":[1]}");
    }

    #[test]
    fn style_names_are_lowercase() {
        assert_eq!(serde_json::to_string(&OutputStyle::Pretty).unwrap(), "\"pretty\"");
        assert_eq!(OutputStyle::default(), OutputStyle::Canonical);
    }
}
