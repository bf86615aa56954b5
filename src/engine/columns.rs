//! Column identity inference for loosely labeled source tables.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Canonical column names understood by the normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Canonical {
    Make,
    Model,
    #[serde(rename = "CC")]
    Cc,
    Category,
    #[serde(rename = "CRSP")]
    Crsp,
    Drive,
    Seating,
    Fuel,
    Transmission,
    #[serde(rename = "Model_Code")]
    ModelCode,
}

impl Canonical {
    pub const ALL: [Canonical; 10] = [
        Canonical::Make,
        Canonical::Model,
        Canonical::Cc,
        Canonical::Category,
        Canonical::Crsp,
        Canonical::Drive,
        Canonical::Seating,
        Canonical::Fuel,
        Canonical::Transmission,
        Canonical::ModelCode,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Canonical::Make => "Make",
            Canonical::Model => "Model",
            Canonical::Cc => "CC",
            Canonical::Category => "Category",
            Canonical::Crsp => "CRSP",
            Canonical::Drive => "Drive",
            Canonical::Seating => "Seating",
            Canonical::Fuel => "Fuel",
            Canonical::Transmission => "Transmission",
            Canonical::ModelCode => "Model_Code",
        }
    }

    /// Match a label that already carries a canonical name (case-insensitive).
    pub fn from_label(label: &str) -> Option<Canonical> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.label().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for Canonical {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One inference rule: every keyword must appear in the lower-cased label.
#[derive(Debug, Clone, Copy)]
pub struct ColumnRule {
    pub keywords: &'static [&'static str],
    pub target: Canonical,
    /// Only the first column matching an exclusive rule may claim its target;
    /// later matches fall through to the remaining rules.
    pub exclusive: bool,
}

impl ColumnRule {
    pub fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().all(|k| lowered.contains(k))
    }
}

/// Inference rules in priority order.
pub const RULES: &[ColumnRule] = &[
    ColumnRule {
        keywords: &["capacity"],
        target: Canonical::Cc,
        exclusive: true,
    },
    ColumnRule {
        keywords: &["body"],
        target: Canonical::Category,
        exclusive: false,
    },
    ColumnRule {
        keywords: &["crsp"],
        target: Canonical::Crsp,
        exclusive: false,
    },
    ColumnRule {
        keywords: &["drive"],
        target: Canonical::Drive,
        exclusive: false,
    },
    ColumnRule {
        keywords: &["seat"],
        target: Canonical::Seating,
        exclusive: false,
    },
    ColumnRule {
        keywords: &["fuel"],
        target: Canonical::Fuel,
        exclusive: false,
    },
    ColumnRule {
        keywords: &["trans"],
        target: Canonical::Transmission,
        exclusive: false,
    },
    ColumnRule {
        keywords: &["model", "number"],
        target: Canonical::ModelCode,
        exclusive: false,
    },
];

/// Trim a raw header and fold embedded line breaks into spaces.
pub fn normalize_header(raw: &str) -> String {
    raw.trim().replace("\r\n", " ").replace(['\n', '\r'], " ")
}

/// How a single raw column was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum Resolution {
    /// Claimed a canonical name through a keyword rule.
    Matched { target: Canonical },
    /// Label was already a canonical name.
    AlreadyCanonical { target: Canonical },
    /// Would have mapped onto a target another column already holds.
    Shadowed { target: Canonical, owner: usize },
    /// No rule applies; the column is not part of the canonical record.
    Unmatched,
}

impl Resolution {
    pub fn target(&self) -> Option<Canonical> {
        match self {
            Resolution::Matched { target } | Resolution::AlreadyCanonical { target } => {
                Some(*target)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MappedColumn {
    pub index: usize,
    pub label: String,
    pub resolution: Resolution,
}

/// Deterministic mapping from raw columns to canonical names.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ColumnMapping {
    pub columns: Vec<MappedColumn>,
}

impl ColumnMapping {
    /// Resolve every header against [`RULES`]. Headers are expected to be
    /// normalized already.
    pub fn infer(headers: &[String]) -> Self {
        let mut claimed: HashMap<Canonical, usize> = HashMap::new();
        let mut columns = Vec::with_capacity(headers.len());

        for (index, label) in headers.iter().enumerate() {
            let resolution = resolve(index, label, &mut claimed);
            match resolution {
                Resolution::Matched { target } => {
                    log::debug!("column '{}' -> {}", label, target)
                }
                Resolution::Shadowed { target, owner } => log::warn!(
                    "column '{}' ignored: {} already taken by '{}'",
                    label,
                    target,
                    headers[owner]
                ),
                Resolution::Unmatched => log::debug!("column '{}' left unmapped", label),
                Resolution::AlreadyCanonical { .. } => {}
            }
            columns.push(MappedColumn {
                index,
                label: label.clone(),
                resolution,
            });
        }

        Self { columns }
    }

    /// Index of the raw column that holds `target`, if any.
    pub fn column_for(&self, target: Canonical) -> Option<usize> {
        self.columns
            .iter()
            .find(|c| c.resolution.target() == Some(target))
            .map(|c| c.index)
    }

    pub fn unmatched(&self) -> impl Iterator<Item = &MappedColumn> {
        self.columns
            .iter()
            .filter(|c| matches!(c.resolution, Resolution::Unmatched))
    }

    pub fn shadowed(&self) -> impl Iterator<Item = &MappedColumn> {
        self.columns
            .iter()
            .filter(|c| matches!(c.resolution, Resolution::Shadowed { .. }))
    }
}

fn resolve(index: usize, label: &str, claimed: &mut HashMap<Canonical, usize>) -> Resolution {
    if let Some(target) = Canonical::from_label(label) {
        return match claimed.get(&target) {
            Some(&owner) => Resolution::Shadowed { target, owner },
            None => {
                claimed.insert(target, index);
                Resolution::AlreadyCanonical { target }
            }
        };
    }

    let lowered = label.to_lowercase();
    let mut passed_over = None;

    for rule in RULES.iter().filter(|r| r.matches(&lowered)) {
        match claimed.get(&rule.target) {
            Some(&owner) if rule.exclusive => {
                passed_over.get_or_insert(Resolution::Shadowed {
                    target: rule.target,
                    owner,
                });
            }
            Some(&owner) => {
                return Resolution::Shadowed {
                    target: rule.target,
                    owner,
                }
            }
            None => {
                claimed.insert(rule.target, index);
                return Resolution::Matched {
                    target: rule.target,
                };
            }
        }
    }

    passed_over.unwrap_or(Resolution::Unmatched)
}
