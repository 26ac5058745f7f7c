//! How this format presents itself to a host tool's format registry.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatInfo {
    pub display_name: &'static str,
    pub extension: &'static str,   // without the leading dot
    pub syntax: &'static str,      // highlighting hint
}

pub const JSON_SCHEMA: FormatInfo = FormatInfo {
    display_name: "JSON Schema",
    extension: "schema",
    syntax: "json",
};
