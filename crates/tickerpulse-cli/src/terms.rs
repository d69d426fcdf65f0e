//! Search term loading shared by `produce` and `terms`.

use tickerpulse_core::{load_securities, AppConfig, ConfigError, SearchTerms};

/// Load the constituents CSV and build the search term set.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or if it yields no
/// terms at all.
pub(crate) fn load_search_terms(config: &AppConfig) -> anyhow::Result<SearchTerms> {
    let securities = load_securities(&config.constituents_path)?;
    let terms = SearchTerms::from_securities(&securities);
    if terms.is_empty() {
        return Err(ConfigError::Validation(format!(
            "no search terms in {}",
            config.constituents_path.display()
        ))
        .into());
    }

    tracing::info!(
        securities = securities.len(),
        terms = terms.len(),
        path = %config.constituents_path.display(),
        "loaded search terms"
    );
    Ok(terms)
}

pub(crate) fn run_terms(config: &AppConfig) -> anyhow::Result<()> {
    let terms = load_search_terms(config)?;

    println!("{} search terms", terms.len());
    for term in terms.iter() {
        println!("  {term}");
    }

    let queries = terms.query_batches(config.search_batch_size);
    println!();
    println!("{} queries (batch size {})", queries.len(), config.search_batch_size);
    for (index, query) in queries.iter().enumerate() {
        println!("  [{}] {query}", index + 1);
    }
    Ok(())
}
