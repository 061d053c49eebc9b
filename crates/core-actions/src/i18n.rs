//! User-visible text lookup.
//!
//! Every template the editor or completion engine emits goes through a
//! [`Translator`] handed in at construction. There is no process-wide
//! language state: tests use [`IdentityTranslator`], the host may load a
//! [`CatalogTranslator`] from a TOML table.
//!
//! Templates carry named placeholders (`{count}`, `{page}`, ...) that are
//! filled after translation by [`fill`], so translated text may reorder
//! them freely. Colour tags (`{!...!}`) are never touched by [`fill`].

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

pub trait Translator: Send + Sync {
    /// Translation of `text`, or `text` itself when there is none.
    fn translate<'a>(&'a self, text: &'a str) -> &'a str;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityTranslator;

impl Translator for IdentityTranslator {
    fn translate<'a>(&'a self, text: &'a str) -> &'a str {
        text
    }
}

/// Catalog of `"source" = "translation"` pairs.
#[derive(Debug, Default, Clone)]
pub struct CatalogTranslator {
    entries: HashMap<String, String>,
}

impl CatalogTranslator {
    pub fn from_toml(text: &str) -> Result<Self> {
        let entries: HashMap<String, String> = toml::from_str(text).context("parsing translation catalog")?;
        debug!(target: "config", entries = entries.len(), "translation_catalog_loaded");
        Ok(Self { entries })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text =
            std::fs::read_to_string(path).with_context(|| format!("reading translation catalog {}", path.display()))?;
        Self::from_toml(&text)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Translator for CatalogTranslator {
    fn translate<'a>(&'a self, text: &'a str) -> &'a str {
        self.entries.get(text).map_or(text, String::as_str)
    }
}

/// Replace each `{name}` placeholder with its value.
pub fn fill(template: &str, values: &[(&str, &dyn std::fmt::Display)]) -> String {
    let mut out = template.to_string();
    for (name, value) in values {
        out = out.replace(&format!("{{{name}}}"), &value.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_returns_input() {
        assert_eq!(IdentityTranslator.translate("Autocompletion matches:"), "Autocompletion matches:");
    }

    #[test]
    fn catalog_translates_known_and_passes_unknown() {
        let cat = CatalogTranslator::from_toml(
            r#""{!green!}Autocompletion matches:" = "{!green!}Correspondances :""#,
        )
        .unwrap();
        assert_eq!(cat.len(), 1);
        assert_eq!(cat.translate("{!green!}Autocompletion matches:"), "{!green!}Correspondances :");
        assert_eq!(cat.translate("other"), "other");
    }

    #[test]
    fn catalog_rejects_non_string_values() {
        assert!(CatalogTranslator::from_toml("a = 1").is_err());
    }

    #[test]
    fn catalog_loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fr.toml");
        std::fs::write(&path, "\"quit\" = \"quitter\"\n").unwrap();
        let cat = CatalogTranslator::load(&path).unwrap();
        assert_eq!(cat.translate("quit"), "quitter");
    }

    #[test]
    fn fill_leaves_colour_tags_alone() {
        let out = fill("{!error!}And {count} more ({page}/{pages})", &[("count", &3), ("page", &1), ("pages", &2)]);
        assert_eq!(out, "{!error!}And 3 more (1/2)");
    }
}
