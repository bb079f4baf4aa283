//! Gender classification and locale-tolerant normalization

use serde::{Deserialize, Serialize};

/// Closed gender classification used by the layout and reports
///
/// Serializes as `male`, `female` or `unknown`. Deserializing accepts any
/// string and maps it through the default alias table, so records written
/// with locale spellings such as `"L"` or `"Perempuan"` still load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Gender {
    Male,
    Female,
    #[default]
    Unknown,
}

impl Gender {
    /// Symbol shown next to a name in diagrams
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Male => "♂",
            Self::Female => "♀",
            Self::Unknown => "?",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Unknown => "unknown",
        }
    }

    /// Normalize free text using the default alias table
    pub fn parse_lenient(text: &str) -> Self {
        GenderAliases::default().normalize(text)
    }
}

impl From<String> for Gender {
    fn from(text: String) -> Self {
        Self::parse_lenient(&text)
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alias table mapping locale spellings to [`Gender`]
///
/// Matching is exact after trimming and lowercasing. Inputs that match no
/// alias fall back to their first letter: `m` is male, `f` is female.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenderAliases {
    #[serde(default)]
    pub male: Vec<String>,
    #[serde(default)]
    pub female: Vec<String>,
}

impl Default for GenderAliases {
    fn default() -> Self {
        let to_owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            male: to_owned(&["male", "m", "man", "boy", "laki-laki", "laki", "pria", "l"]),
            female: to_owned(&["female", "f", "woman", "girl", "perempuan", "wanita", "p"]),
        }
    }
}

impl GenderAliases {
    /// An empty table; only the prefix fallback applies
    pub fn empty() -> Self {
        Self {
            male: Vec::new(),
            female: Vec::new(),
        }
    }

    /// Merge additional aliases into this table
    pub fn extend(&mut self, other: &GenderAliases) {
        for alias in &other.male {
            let alias = alias.trim().to_lowercase();
            if !self.male.contains(&alias) {
                self.male.push(alias);
            }
        }
        for alias in &other.female {
            let alias = alias.trim().to_lowercase();
            if !self.female.contains(&alias) {
                self.female.push(alias);
            }
        }
    }

    pub fn normalize(&self, text: &str) -> Gender {
        let normalized = text.trim().to_lowercase();
        if normalized.is_empty() {
            return Gender::Unknown;
        }

        if self.male.iter().any(|a| a.eq_ignore_ascii_case(&normalized)) {
            return Gender::Male;
        }
        if self.female.iter().any(|a| a.eq_ignore_ascii_case(&normalized)) {
            return Gender::Female;
        }

        if normalized.starts_with('m') {
            Gender::Male
        } else if normalized.starts_with('f') {
            Gender::Female
        } else {
            Gender::Unknown
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_aliases() {
        let aliases = GenderAliases::default();

        assert_eq!(aliases.normalize("Male"), Gender::Male);
        assert_eq!(aliases.normalize("  laki-laki "), Gender::Male);
        assert_eq!(aliases.normalize("PEREMPUAN"), Gender::Female);
        assert_eq!(aliases.normalize("wanita"), Gender::Female);
    }

    #[test]
    fn test_prefix_fallback() {
        let aliases = GenderAliases::empty();

        assert_eq!(aliases.normalize("masculine"), Gender::Male);
        assert_eq!(aliases.normalize("feminine"), Gender::Female);
        assert_eq!(aliases.normalize("pria"), Gender::Unknown);
    }

    #[test]
    fn test_unknown() {
        assert_eq!(Gender::parse_lenient(""), Gender::Unknown);
        assert_eq!(Gender::parse_lenient("   "), Gender::Unknown);
        assert_eq!(Gender::parse_lenient("x"), Gender::Unknown);
    }

    #[test]
    fn test_extend_aliases() {
        let mut aliases = GenderAliases::default();
        aliases.extend(&GenderAliases {
            male: vec!["Rajol".to_string()],
            female: vec!["imra'a".to_string()],
        });

        assert_eq!(aliases.normalize("rajol"), Gender::Male);
        assert_eq!(aliases.normalize("Imra'a"), Gender::Female);
    }

    #[test]
    fn test_deserialize_free_text() {
        let parsed: Vec<Gender> =
            serde_json::from_str(r#"["L", "Perempuan", "male", "unknown", ""]"#).unwrap();
        assert_eq!(
            parsed,
            vec![
                Gender::Male,
                Gender::Female,
                Gender::Male,
                Gender::Unknown,
                Gender::Unknown
            ]
        );

        // Output stays canonical
        assert_eq!(serde_json::to_string(&Gender::Female).unwrap(), "\"female\"");
    }

    #[test]
    fn test_symbols() {
        assert_eq!(Gender::Male.symbol(), "♂");
        assert_eq!(Gender::Female.symbol(), "♀");
        assert_eq!(Gender::Unknown.symbol(), "?");
    }
}
