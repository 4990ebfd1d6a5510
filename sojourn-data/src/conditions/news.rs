//! NewsAPI article decoding and impact assessment.
//!
//! Articles are kept only when they read as relevant to visitors. Each one
//! is graded by keyword: closures and cancellations are high impact,
//! construction and delays medium, anything else low. A high-impact article
//! that names an attraction makes it unavailable; a medium-impact one
//! demotes it.

use serde::Deserialize;
use sojourn_core::{Attraction, Penalties};

const TOURISM_KEYWORDS: [&str; 15] = [
    "tourist",
    "visitor",
    "attraction",
    "museum",
    "festival",
    "event",
    "closure",
    "construction",
    "celebration",
    "exhibition",
    "monument",
    "landmark",
    "traffic",
    "transport",
    "holiday",
];

const HIGH_IMPACT_KEYWORDS: [&str; 5] = ["closure", "cancelled", "emergency", "warning", "strike"];

const MEDIUM_IMPACT_KEYWORDS: [&str; 4] = ["delay", "changed", "construction", "maintenance"];

#[derive(Debug, Deserialize)]
pub(crate) struct NewsResponse {
    pub(crate) status: String,
    #[serde(default)]
    pub(crate) code: Option<String>,
    #[serde(default)]
    pub(crate) message: Option<String>,
    #[serde(default)]
    pub(crate) articles: Vec<Article>,
}

/// A news article as returned by NewsAPI's `everything` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    /// Headline.
    pub title: String,
    /// Summary; NewsAPI omits it for some sources.
    #[serde(default)]
    pub description: Option<String>,
    /// Publication timestamp as reported by the source.
    #[serde(default)]
    pub published_at: String,
    /// Publishing outlet.
    pub source: ArticleSource,
    /// Link to the full article.
    #[serde(default)]
    pub url: String,
}

/// Outlet that published an [`Article`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArticleSource {
    /// Outlet name.
    pub name: String,
}

/// How strongly a news item affects sightseeing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Impact {
    /// Background noise.
    Low,
    /// Worth routing around.
    Medium,
    /// Likely to stop a visit.
    High,
}

impl Article {
    fn text(&self) -> String {
        format!(
            "{} {}",
            self.title,
            self.description.as_deref().unwrap_or_default()
        )
        .to_lowercase()
    }

    /// Whether the article concerns visitors at all.
    #[must_use]
    pub fn is_tourism_relevant(&self) -> bool {
        let text = self.text();
        TOURISM_KEYWORDS.iter().any(|keyword| text.contains(keyword))
    }

    /// Grade the article by its keywords.
    ///
    /// # Examples
    /// ```
    /// use sojourn_data::conditions::{Article, ArticleSource, Impact};
    ///
    /// let article = Article {
    ///     title: "Museum closure announced".to_owned(),
    ///     description: None,
    ///     published_at: String::new(),
    ///     source: ArticleSource { name: "Gazette".to_owned() },
    ///     url: String::new(),
    /// };
    /// assert_eq!(article.impact(), Impact::High);
    /// ```
    #[must_use]
    pub fn impact(&self) -> Impact {
        let text = self.text();
        if HIGH_IMPACT_KEYWORDS.iter().any(|keyword| text.contains(keyword)) {
            Impact::High
        } else if MEDIUM_IMPACT_KEYWORDS
            .iter()
            .any(|keyword| text.contains(keyword))
        {
            Impact::Medium
        } else {
            Impact::Low
        }
    }

    fn mentions(&self, attraction: &Attraction) -> bool {
        let name = attraction.name.trim().to_lowercase();
        !name.is_empty() && self.text().contains(&name)
    }
}

/// Penalties implied by `articles` for `candidates`.
///
/// Irrelevant articles are skipped. Every relevant high-impact headline is
/// also passed on as advice.
#[must_use]
pub fn news_penalties(articles: &[Article], candidates: &[Attraction]) -> Penalties {
    let mut penalties = Penalties::none();
    for article in articles.iter().filter(|article| article.is_tourism_relevant()) {
        let impact = article.impact();
        let named = candidates
            .iter()
            .filter(|attraction| article.mentions(attraction))
            .map(|attraction| attraction.id.clone());
        match impact {
            Impact::High => {
                penalties.unavailable.extend(named);
                penalties
                    .advice
                    .push(format!("Local news may affect plans: {}", article.title));
            }
            Impact::Medium => penalties.demoted.extend(named),
            Impact::Low => {}
        }
    }
    penalties
        .demoted
        .retain(|id| !penalties.unavailable.contains(id));
    penalties
}
