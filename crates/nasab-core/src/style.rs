//! Rendering attributes attached to layout nodes

use crate::gender::Gender;
use serde::{Deserialize, Serialize};

/// Palette used when building a [`crate::TreeLayout`]
///
/// Colors are plain strings handed through to the renderer untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutStyle {
    pub male_color: String,
    pub female_color: String,
    pub unknown_color: String,
    pub border_color: String,
    pub edge_color: String,
    pub lineage_symbol: String,
    pub lineage_color: String,
}

impl Default for LayoutStyle {
    fn default() -> Self {
        Self {
            male_color: "#CDE7FF".to_string(),
            female_color: "#FFE0F0".to_string(),
            unknown_color: "#E2E8F0".to_string(),
            border_color: "#4A5568".to_string(),
            edge_color: "#4B5563".to_string(),
            lineage_symbol: "★".to_string(),
            lineage_color: "#2563EB".to_string(),
        }
    }
}

impl LayoutStyle {
    pub fn color_for(&self, gender: Gender) -> &str {
        match gender {
            Gender::Male => &self.male_color,
            Gender::Female => &self.female_color,
            Gender::Unknown => &self.unknown_color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_for_gender() {
        let style = LayoutStyle::default();
        assert_eq!(style.color_for(Gender::Male), "#CDE7FF");
        assert_eq!(style.color_for(Gender::Female), "#FFE0F0");
        assert_eq!(style.color_for(Gender::Unknown), "#E2E8F0");
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let style: LayoutStyle = serde_json::from_str(r##"{"male_color": "#000000"}"##).unwrap();
        assert_eq!(style.male_color, "#000000");
        assert_eq!(style.female_color, "#FFE0F0");
    }
}
