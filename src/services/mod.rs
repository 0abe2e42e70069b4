//! Domain services behind the dashboard
//!
//! `CovidData` and `NewsFeed` are the refresh actions run by the update
//! controllers; `ContentStore` holds the articles the news feed keeps.

pub mod content_store;
pub mod covid_data;
pub mod news_feed;

pub use content_store::{Article, ContentStore};
pub use covid_data::CovidData;
pub use news_feed::NewsFeed;
