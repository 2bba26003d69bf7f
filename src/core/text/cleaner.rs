//! Deterministic cleanup of raw OCR text.
//!
//! Two layers, applied in a fixed order:
//! 1. an ordered table of literal substring corrections for known OCR
//!    misreads (data, not logic; extensible via a JSON5 rules file);
//! 2. general regex passes: apostrophe variants, whitespace runs, stray
//!    characters, space-before-punctuation.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::TextError;

static APOSTROPHES: Lazy<Regex> = Lazy::new(|| Regex::new(r"[’‘`]").unwrap());
static SPACE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").unwrap());
static STRAY_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[^\w\s'":\-+.()\[\]&]"#).unwrap());
static SPACE_BEFORE_PUNCT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s([:.,])").unwrap());

/// Corrections observed in real captures. Order matters: apostrophe repairs
/// feed the possessive-suffix fixes below them.
const BUILTIN_RULES: &[(&str, &str)] = &[
    ("art'$", "art's"),
    ("art’", "Art"),
    ("’", "'"),
    ("armament' ", "armament's "),
    ("armament'", "armament's"),
    ("armament'$", "armament's"),
    ("armaments", "armament's"),
    ("armament s", "armament's"),
    ("armament'ss", "armament's"),
    ("armament$", "armament's"),
    ("Fexpedition", "expedition"),
    ("Fexpeditions", "expeditions"),
    ("of. expedition", "of expedition"),
    ("of, expedition", "of expedition"),
    ("of = expedition", "of expedition"),
    ("Endureat", "Endure at"),
    ("Poison Moth Flightat", "Poison Moth Flight at"),
    ("landing . critical", "landing a critical"),
    ("landing : critical", "landing a critical"),
    ("landing. critical", "landing a critical"),
    ("etc:", "etc."),
    ("Two ~Handing", "Two-Handing"),
    ("Fability", "ability"),
    ("shop`", "shop"),
    ("shop'", "shop"),
    ("shop-", "shop"),
    ("'shop", "shop"),
    ("shop.", "shop"),
    ("Slecp", "Sleep"),
    ("Slecp'", "Sleep"),
    ("slecp", "Sleep"),
    ("slecp'", "Sleep"),
    ("'purchases", "purchases"),
    ("'s $", "'s"),
    ("'$", "'s"),
    ("' $", "'s"),
    (" $", "'s"),
    (" ' ", " "),
    ("[[", "["),
    ("i5", "is"),
    ("+ 1", "+1"),
    ("+ 3", "+3"),
    ("Post Damage", "Post-Damage"),
    ("Post- Damage", "Post-Damage"),
    ("ofthe", "of the"),
    ("'ability", "ability"),
    ("abiliry", "ability"),
    ("[Revenant ", "[Revenant] "),
];

/// One literal correction, applied everywhere it occurs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replacement {
    pub from: String,
    pub to: String,
}

/// The ordered correction table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanRules {
    pub replacements: Vec<Replacement>,
}

impl CleanRules {
    /// The curated table shipped with the crate.
    pub fn builtin() -> Self {
        Self {
            replacements: BUILTIN_RULES
                .iter()
                .map(|&(from, to)| Replacement {
                    from: from.to_string(),
                    to: to.to_string(),
                })
                .collect(),
        }
    }

    /// Load a table from a JSON5 file: `{ replacements: [{ from, to }, ...] }`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TextError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| TextError::RulesIo {
            path: path.display().to_string(),
            source,
        })?;
        json5::from_str(&text).map_err(|source| TextError::RulesParse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn len(&self) -> usize {
        self.replacements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.replacements.is_empty()
    }
}

impl Default for CleanRules {
    fn default() -> Self {
        Self::builtin()
    }
}

pub struct TextCleaner {
    rules: CleanRules,
}

impl TextCleaner {
    pub fn new() -> Self {
        Self::with_rules(CleanRules::builtin())
    }

    pub fn with_rules(rules: CleanRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &CleanRules {
        &self.rules
    }

    /// Pure; identical input always yields identical output.
    pub fn clean(&self, raw: &str) -> String {
        let mut text = raw.to_string();
        for rule in &self.rules.replacements {
            if text.contains(&rule.from) {
                text = text.replace(&rule.from, &rule.to);
            }
        }
        let text = APOSTROPHES.replace_all(&text, "'");
        let text = SPACE_RUNS.replace_all(&text, " ");
        let text = STRAY_CHARS.replace_all(&text, "");
        let text = SPACE_BEFORE_PUNCT.replace_all(&text, "$1");
        text.trim().to_string()
    }
}

impl Default for TextCleaner {
    fn default() -> Self {
        Self::new()
    }
}
