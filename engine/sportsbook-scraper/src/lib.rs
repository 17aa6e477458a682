//! Sportsbook Scraper - fallback odds sources scraped from sportsbook pages
//!
//! Each supported book publishes its NFL board with the odds embedded as JSON
//! in a `<script>` block. The extractors pull that block out of the page and
//! hand it to the odds engine as a provider-specific raw payload.

pub mod books;
pub mod extract;
pub mod scraper;

pub use books::Sportsbook;
pub use extract::extract_payload;
pub use scraper::{all_scrapers, SportsbookScraper};
