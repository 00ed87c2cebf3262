//! `[[template]]` entries: templates tracked from startup.
//!
//! # Example
//!
//! ```toml
//! [[template]]
//! name = "flag"
//! url = "https://pxls.space/#x=10&y=10&ox=0&oy=0&tw=20&template=https%3A%2F%2Fi.example.com%2Fflag.png"
//! scope = "global"            # private | faction | global
//! owner = 0                   # User id, or faction id for faction templates
//! ```

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::config::ConfigDiagnostics;
use crate::template::manager::COMBO_NAME;
use crate::template::{NewTemplate, Scope, looks_like_template_link};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateEntry {
    pub name: String,
    pub url: String,
    #[serde(default = "default_scope")]
    pub scope: Scope,
    #[serde(default)]
    pub owner: u64,
}

fn default_scope() -> Scope {
    Scope::Global
}

impl TemplateEntry {
    pub fn to_request(&self) -> NewTemplate {
        NewTemplate {
            name: self.name.clone(),
            url: self.url.clone(),
            owner: self.owner,
            scope: self.scope,
        }
    }
}

/// Check names and links of all entries.
pub fn validate_templates(entries: &[TemplateEntry], diag: &mut ConfigDiagnostics) {
    let mut seen = FxHashSet::default();
    for (i, entry) in entries.iter().enumerate() {
        let field = format!("template[{i}]");
        let name = entry.name.trim();
        if name.is_empty() {
            diag.error(format!("{field}.name"), "name cannot be empty");
        } else if name.eq_ignore_ascii_case(COMBO_NAME) {
            diag.error(format!("{field}.name"), format!("`{COMBO_NAME}` is a reserved name"));
        } else if !seen.insert(name) {
            diag.error(format!("{field}.name"), format!("duplicate template name `{name}`"));
        }

        if !looks_like_template_link(&entry.url) {
            diag.error_with_hint(
                format!("{field}.url"),
                "not a template link",
                "expected a canvas link with `ox`, `oy`, `tw` and `template` parameters",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    const LINK: &str = "https://pxls.space/#ox=1&oy=2&tw=3&template=https%3A%2F%2Fi.example.com%2Fa.png";

    #[test]
    fn test_template_entries() {
        let config = test_parse_config(&format!(
            "[[template]]\nname = \"a\"\nurl = \"{LINK}\"\n\n[[template]]\nname = \"b\"\nurl = \"{LINK}\"\nscope = \"faction\"\nowner = 77"
        ));
        assert_eq!(config.templates.len(), 2);
        assert_eq!(config.templates[0].scope, Scope::Global);
        assert_eq!(config.templates[1].scope, Scope::Faction);
        assert_eq!(config.templates[1].to_request().owner, 77);

        let mut diag = ConfigDiagnostics::new();
        validate_templates(&config.templates, &mut diag);
        assert!(diag.is_empty());
    }

    #[test]
    fn test_template_validation() {
        let entry = |name: &str, url: &str| TemplateEntry {
            name: name.into(),
            url: url.into(),
            scope: Scope::Global,
            owner: 0,
        };
        let entries = [
            entry("a", LINK),
            entry("a", LINK),
            entry("Combo", LINK),
            entry("", LINK),
            entry("b", "https://example.com/a.png"),
        ];
        let mut diag = ConfigDiagnostics::new();
        validate_templates(&entries, &mut diag);
        assert_eq!(diag.len(), 4);
    }
}
