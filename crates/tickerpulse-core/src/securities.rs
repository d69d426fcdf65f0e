//! Reference list of index constituents and the search terms derived from it.

use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::ConfigError;

/// Legal suffixes and prefixes stripped from company names, applied in order.
const NAME_REPLACEMENTS: &[&str] = &[
    " Inc.",
    " Inc",
    " Corporation",
    " Corp.",
    " Corp",
    " Company",
    " Co.",
    " Co",
    " Ltd.",
    " Ltd",
    " Limited",
    " plc",
    " PLC",
    " Group",
    " (The)",
    "The ",
];

/// One row of the constituents file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Security {
    #[serde(rename = "Symbol")]
    pub symbol: String,
    #[serde(rename = "Security")]
    pub name: String,
}

/// Load the constituents CSV (`Symbol`, `Security` columns; others ignored).
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be opened or a row fails to parse.
pub fn load_securities(path: &Path) -> Result<Vec<Security>, ConfigError> {
    let file = std::fs::File::open(path).map_err(|e| ConfigError::ConstituentsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_securities(file)
}

/// Parse constituents CSV content from any reader.
///
/// # Errors
///
/// Returns [`ConfigError::ConstituentsFileParse`] on malformed rows or missing
/// columns.
pub fn parse_securities<R: Read>(reader: R) -> Result<Vec<Security>, ConfigError> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut securities = Vec::new();
    for row in csv_reader.deserialize() {
        let security: Security = row?;
        securities.push(security);
    }
    Ok(securities)
}

/// Strip legal suffixes and a leading article from a company name.
///
/// Replacements are plain substring removals, so `"The "` is removed wherever
/// it occurs.
#[must_use]
pub fn clean_company_name(company_name: &str) -> String {
    let mut name = company_name.trim().to_string();
    if name.is_empty() {
        return name;
    }
    for pattern in NAME_REPLACEMENTS {
        name = name.replace(pattern, "");
    }
    name.trim().to_string()
}

/// Uppercased ticker symbols and cleaned company names used for searching
/// and mention matching.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchTerms {
    terms: BTreeSet<String>,
}

impl SearchTerms {
    /// Build the term set from reference rows: every symbol plus every
    /// non-empty cleaned name, all uppercased.
    #[must_use]
    pub fn from_securities(securities: &[Security]) -> Self {
        let mut terms = BTreeSet::new();
        for security in securities {
            let symbol = security.symbol.trim().to_uppercase();
            if !symbol.is_empty() {
                terms.insert(symbol);
            }
            let cleaned = clean_company_name(&security.name);
            if !cleaned.is_empty() {
                terms.insert(cleaned.to_uppercase());
            }
        }
        Self { terms }
    }

    #[must_use]
    pub fn contains(&self, term: &str) -> bool {
        self.terms.contains(term)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(String::as_str)
    }

    /// Group terms into search queries of at most `batch_size` terms joined
    /// with `" OR "`. Multi-word terms are quoted so the search treats them as
    /// phrases. A `batch_size` of zero is treated as one.
    #[must_use]
    pub fn query_batches(&self, batch_size: usize) -> Vec<String> {
        let terms: Vec<&str> = self.iter().collect();
        terms
            .chunks(batch_size.max(1))
            .map(|chunk| {
                chunk
                    .iter()
                    .map(|term| {
                        if term.contains(char::is_whitespace) {
                            format!("\"{term}\"")
                        } else {
                            (*term).to_string()
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(" OR ")
            })
            .collect()
    }
}

impl<S: Into<String>> FromIterator<S> for SearchTerms {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            terms: iter
                .into_iter()
                .map(|t| t.into().trim().to_uppercase())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }
}
