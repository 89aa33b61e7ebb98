//! # State Change Events
//!
//! The engine announces every visible change to its subscribers, so a
//! renderer only has to map events to redraws.
//!
//! ```text
//!   OrderEngine::adjust_quantity("p1", Increment)
//!        │
//!        ├──► QuantityChanged { product_id: "p1", quantity: 1 }
//!        └──► SummaryChanged
//!                 │
//!                 ▼
//!        every StateObserver, in subscription order
//! ```

use crate::engine::OrderEngine;
use crate::types::{DeliveryChoice, Language, Theme};

/// A change to engine state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateChange {
    SelectionChanged { index: usize },
    QuantityChanged { product_id: String, quantity: u32 },
    SummaryChanged,
    LanguageChanged(Language),
    ThemeChanged(Theme),
    DeliveryChanged(DeliveryChoice),
    ModalOpened { image_url: String },
    ModalClosed,
    CookiesAccepted,
}

/// Receives state changes. The engine passes itself so the observer can read
/// the new state, but not mutate it.
pub trait StateObserver {
    fn on_change(&mut self, change: &StateChange, engine: &OrderEngine);
}

impl<F> StateObserver for F
where
    F: FnMut(&StateChange, &OrderEngine),
{
    fn on_change(&mut self, change: &StateChange, engine: &OrderEngine) {
        self(change, engine)
    }
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub(crate) u64);

impl SubscriptionId {
    pub fn value(&self) -> u64 {
        self.0
    }
}
