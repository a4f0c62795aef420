//! Personalized bag recommendations.
//!
//! Browsing history and free-text preferences go into a fixed prompt; the
//! model's comma-separated reply is matched back against catalog names.
//! Recommendations are best effort: any failure yields an empty list.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::sync::Arc;

use tracing::instrument;

use crate::catalog::{Catalog, Product};
use crate::claude::TextCompletion;

/// Recommendation service over an optional completion backend.
#[derive(Clone, Default)]
pub struct RecommendationService {
    completion: Option<Arc<dyn TextCompletion>>,
}

impl RecommendationService {
    /// Service backed by `completion`.
    #[must_use]
    pub fn new(completion: Arc<dyn TextCompletion>) -> Self {
        Self {
            completion: Some(completion),
        }
    }

    /// Service that never recommends anything.
    #[must_use]
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Whether a completion backend is configured.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.completion.is_some()
    }

    /// Recommend catalog products for a shopper.
    ///
    /// `history` is the shopper's viewed product ids joined with `", "`.
    /// Results follow catalog order. Never fails; errors are logged.
    #[instrument(skip(self, catalog, history, preferences))]
    pub async fn recommend<'a>(
        &self,
        catalog: &'a Catalog,
        history: &str,
        preferences: &str,
    ) -> Vec<&'a Product> {
        let Some(completion) = &self.completion else {
            tracing::debug!("recommendations requested but no completion backend configured");
            return Vec::new();
        };

        let prompt = build_prompt(catalog, history, preferences);
        match completion.complete(&prompt).await {
            Ok(reply) => {
                let matches = match_reply(catalog, &reply);
                tracing::info!(count = matches.len(), "recommendations generated");
                matches
            }
            Err(e) => {
                tracing::warn!(error = %e, "recommendation completion failed");
                Vec::new()
            }
        }
    }
}

/// Render the recommendation prompt.
#[must_use]
pub fn build_prompt(catalog: &Catalog, history: &str, preferences: &str) -> String {
    let mut prompt = String::from(
        "You are a personal shopping assistant specializing in bag recommendations.\n\n\
         Based on the user's browsing history and preferences, recommend bags that the \
         user is likely to be interested in.\n\n",
    );
    prompt.push_str("Available bags:\n");
    for product in catalog.products() {
        let _ = writeln!(prompt, "- {}", product.name);
    }
    let _ = write!(
        prompt,
        "\nReply with a comma-separated list of bag names from the list above and nothing else.\n\n\
         Browsing History: {history}\n\
         Preferences: {preferences}\n\n\
         Recommendations:"
    );
    prompt
}

/// Catalog products named in a comma-separated reply, in catalog order.
///
/// Names compare case-insensitively after trimming; unknown names are dropped.
#[must_use]
pub fn match_reply<'a>(catalog: &'a Catalog, reply: &str) -> Vec<&'a Product> {
    let wanted: HashSet<String> = reply
        .split(',')
        .map(|fragment| fragment.trim().to_lowercase())
        .filter(|fragment| !fragment.is_empty())
        .collect();

    catalog
        .products()
        .iter()
        .filter(|product| wanted.contains(&product.name.to_lowercase()))
        .collect()
}
