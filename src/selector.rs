//! Ways to locate an element on the portal's rendered surface.

use serde::{Deserialize, Serialize};

/// Represents ways to locate a portal element
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Selector {
    /// Select by element id (`#txtUser`)
    Id(String),
    /// Select by a raw CSS expression the driver evaluates verbatim
    Css(String),
    /// Select by exact rendered text content
    Text(String),
    /// Select every element whose id starts with `prefix` and ends with
    /// `suffix`, in document order. This is the row-label scan primitive:
    /// grid labels carry ids shaped `<prefix><index><suffix>`.
    IdAffix { prefix: String, suffix: String },
    /// Represents an invalid selector string, with a reason.
    Invalid(String),
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Selector::Id(id) => write!(f, "#{id}"),
            Selector::Css(css) => write!(f, "css:{css}"),
            Selector::Text(text) => write!(f, "text:{text}"),
            Selector::IdAffix { prefix, suffix } => write!(f, "id:{prefix}*{suffix}"),
            Selector::Invalid(reason) => write!(f, "invalid:{reason}"),
        }
    }
}

impl From<&str> for Selector {
    fn from(s: &str) -> Self {
        match s {
            _ if s.starts_with('#') => Selector::Id(s[1..].to_string()),
            _ if s.starts_with("id:") => Selector::Id(s[3..].to_string()),
            _ if s.starts_with("css:") => Selector::Css(s[4..].to_string()),
            _ if s.starts_with("text:") => Selector::Text(s[5..].to_string()),
            _ => Selector::Invalid(format!(
                "Unknown selector format: \"{s}\". Use '#', 'id:', 'css:' or 'text:' to specify the selector type."
            )),
        }
    }
}

impl From<String> for Selector {
    fn from(s: String) -> Self {
        Selector::from(s.as_str())
    }
}
