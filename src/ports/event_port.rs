//! Event feed port.

use crate::domain::error::NewsalphaError;
use crate::domain::event::Event;

/// Supplies the news-derived event table. The core does not care whether it
/// came from scraped news, model labels, or a hand-built file.
pub trait EventFeedPort {
    fn load_events(&self) -> Result<Vec<Event>, NewsalphaError>;
}
