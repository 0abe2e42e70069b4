//! Deduplicated, blockable store of relevant news articles

use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info};

use crate::sources::RawArticle;

/// Title of the stand-in shown when no headline matches the search terms
pub const NO_ARTICLES_TITLE: &str = "No relevant articles currently";

/// Words of article content kept for display
pub const CONTENT_WORD_LIMIT: usize = 20;

/// An article as shown on the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Article {
    pub title: String,
    /// Shortened content, empty when the provider gave none
    pub content: String,
    /// Link to the full article, empty for the placeholder
    pub url: String,
}

impl Article {
    pub fn placeholder() -> Self {
        Self {
            title: NO_ARTICLES_TITLE.to_string(),
            content: String::new(),
            url: String::new(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.title == NO_ARTICLES_TITLE && self.url.is_empty()
    }
}

/// Keep articles whose title contains any of the space separated terms,
/// ignoring case
pub fn filter_articles(articles: &[RawArticle], search_terms: &str) -> Vec<RawArticle> {
    let terms: Vec<String> = search_terms
        .split_whitespace()
        .map(str::to_lowercase)
        .collect();

    articles
        .iter()
        .filter(|article| {
            let title = article.title.to_lowercase();
            terms.iter().any(|term| title.contains(term.as_str()))
        })
        .cloned()
        .collect()
}

/// Filter headlines, substituting a single placeholder when nothing matches
pub fn relevant_headlines(articles: &[RawArticle], search_terms: &str) -> Vec<RawArticle> {
    let relevant = filter_articles(articles, search_terms);
    if relevant.is_empty() {
        debug!("No headlines matched '{}'", search_terms);
        return vec![RawArticle::new(NO_ARTICLES_TITLE, "", "")];
    }
    relevant
}

/// Shorten content to its first words and keep the link
pub fn format_article(article: &RawArticle) -> Article {
    let words: Vec<&str> = article
        .content
        .split_whitespace()
        .take(CONTENT_WORD_LIMIT)
        .collect();
    let content = if words.is_empty() {
        String::new()
    } else {
        format!("{}...", words.join(" "))
    };

    Article {
        title: article.title.clone(),
        content,
        url: article.url.clone(),
    }
}

#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    articles: Vec<Article>,
    blocked: HashSet<String>,
    /// Set while the latest fetch matched nothing
    placeholder: Option<Article>,
}

impl ContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add fetched articles that are neither stored nor blocked.
    ///
    /// The no-match placeholder is never stored; receiving it only marks the
    /// latest fetch as empty. Returns the number of articles added.
    pub fn ingest(&mut self, fetched: &[RawArticle]) -> usize {
        let mut added = 0;
        let mut fetched_placeholder = false;

        for raw in fetched {
            let article = format_article(raw);
            if article.is_placeholder() {
                fetched_placeholder = true;
                continue;
            }
            if self.blocked.contains(&article.title) || self.contains(&article.title) {
                continue;
            }
            info!("Article '{}' added.", article.title);
            self.articles.push(article);
            added += 1;
        }

        self.placeholder = (fetched_placeholder && !self.blocked.contains(NO_ARTICLES_TITLE))
            .then(Article::placeholder);
        added
    }

    /// Hide `title` for the rest of the process lifetime.
    ///
    /// Returns the number of stored articles removed.
    pub fn block(&mut self, title: &str) -> usize {
        self.blocked.insert(title.to_string());
        let before = self.articles.len();
        self.articles.retain(|article| article.title != title);
        if title == NO_ARTICLES_TITLE {
            self.placeholder = None;
        }
        info!("Article '{}' blocked.", title);
        before - self.articles.len()
    }

    pub fn contains(&self, title: &str) -> bool {
        self.articles.iter().any(|article| article.title == title)
    }

    pub fn is_blocked(&self, title: &str) -> bool {
        self.blocked.contains(title)
    }

    /// Stored articles, oldest first
    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    /// Articles to render: the stored ones, or the placeholder when nothing
    /// is stored and the latest fetch matched nothing
    pub fn display_articles(&self) -> Vec<Article> {
        match (&self.placeholder, self.articles.is_empty()) {
            (Some(placeholder), true) => vec![placeholder.clone()],
            _ => self.articles.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titled(title: &str) -> RawArticle {
        RawArticle::new(title, "Some content", format!("https://news.example/{title}"))
    }

    #[test]
    fn test_filter_articles() {
        let articles = vec![
            titled("Irrelevant article"),
            titled("Unrelated article"),
            titled("Important information!"),
        ];
        assert_eq!(filter_articles(&articles, "Important").len(), 1);
        assert_eq!(filter_articles(&articles, "Article").len(), 2);
        assert_eq!(filter_articles(&articles, "Irrelevant Important").len(), 2);
        assert!(filter_articles(&articles, "").is_empty());
    }

    #[test]
    fn test_no_matches_give_single_placeholder() {
        let articles = vec![titled("Weather"), titled("Sport")];
        let relevant = relevant_headlines(&articles, "zyxwvu");
        assert_eq!(relevant.len(), 1);
        assert_eq!(relevant[0].title, NO_ARTICLES_TITLE);
        assert!(relevant[0].content.is_empty());
    }

    #[test]
    fn test_format_article_shortens_content() {
        let article = RawArticle::new("Test", "Test ".repeat(50), "https://google.co.uk");
        let formatted = format_article(&article);
        assert_eq!(formatted.content.split_whitespace().count(), CONTENT_WORD_LIMIT);
        assert!(formatted.content.ends_with("..."));
        assert_eq!(formatted.url, "https://google.co.uk");

        let empty = format_article(&RawArticle::new("Empty", "", "https://x.example"));
        assert!(empty.content.is_empty());
    }

    #[test]
    fn test_ingest_skips_duplicates_by_title() {
        let mut store = ContentStore::new();
        assert_eq!(store.ingest(&[titled("Covid update"), titled("Covid update")]), 1);
        assert_eq!(store.ingest(&[titled("Covid update"), titled("Covid news")]), 1);
        let titles: Vec<&str> = store.articles().iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["Covid update", "Covid news"]);
    }

    #[test]
    fn test_block_is_permanent() {
        let mut store = ContentStore::new();
        store.ingest(&[titled("Covid update"), titled("Covid news")]);

        assert_eq!(store.block("Covid update"), 1);
        assert!(!store.contains("Covid update"));
        assert!(store.is_blocked("Covid update"));

        assert_eq!(store.ingest(&[titled("Covid update")]), 0);
        assert!(!store.contains("Covid update"));
        assert_eq!(store.articles().len(), 1);
    }

    #[test]
    fn test_blocking_unknown_title_still_blocks_future_ingest() {
        let mut store = ContentStore::new();
        assert_eq!(store.block("Not yet seen"), 0);
        assert_eq!(store.ingest(&[titled("Not yet seen")]), 0);
    }

    #[test]
    fn test_placeholder_is_shown_but_never_stored() {
        let mut store = ContentStore::new();
        store.ingest(&relevant_headlines(&[titled("Sport")], "covid"));

        assert!(store.articles().is_empty());
        assert_eq!(store.display_articles(), vec![Article::placeholder()]);

        store.ingest(&relevant_headlines(&[titled("Covid news")], "covid"));
        assert_eq!(store.articles().len(), 1);
        assert!(store.display_articles().iter().all(|a| !a.is_placeholder()));
    }

    #[test]
    fn test_placeholder_hidden_while_articles_are_stored() {
        let mut store = ContentStore::new();
        store.ingest(&[titled("Covid news")]);
        store.ingest(&relevant_headlines(&[], "covid"));

        assert_eq!(store.display_articles().len(), 1);
        assert_eq!(store.display_articles()[0].title, "Covid news");
    }
}
