//! # Order State Engine
//!
//! Owns the catalog quantities and the view state, and is the only thing
//! that mutates them.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          OrderEngine                                    │
//! │                                                                         │
//! │   intents                    state                      outputs         │
//! │   ───────                    ─────                      ───────         │
//! │   navigate          ┌──────────────────────┐                            │
//! │   adjust_quantity ─►│ Catalog (quantities) │──► compute_summary()       │
//! │   set_language      │ ViewState            │──► submit_order()          │
//! │   set_theme         └──────────┬───────────┘                            │
//! │   set_delivery                 │                                        │
//! │   open/close modal             ├──► PreferenceStore (write-through)     │
//! │   accept_cookies               └──► StateObservers (StateChange)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Totality
//! No operation here returns an error. Empty catalogs, unknown product ids
//! and repeated setter calls degrade to no-ops; the return value tells the
//! caller what happened.

use std::fmt;

use crate::catalog::Catalog;
use crate::events::{StateChange, StateObserver, SubscriptionId};
use crate::order::{OrderResult, OrderSummary, SubmittedOrder};
use crate::prefs::{PreferenceKey, PreferenceStore, Preferences};
use crate::types::{
    DeliveryChoice, Direction, Language, Product, QuantityChange, Theme, ViewState,
};
use crate::{NO_IMAGE_SENTINEL, VAT_RATE};

/// Returns true when an image reference can be shown in the zoom modal.
///
/// Empty references, the "no image" placeholder and bare directory paths
/// (a broken `src` resolves to the page URL, which ends in `/`) are rejected.
pub fn is_zoomable(image_url: &str) -> bool {
    let url = image_url.trim();
    !url.is_empty() && !url.contains(NO_IMAGE_SENTINEL) && !url.ends_with('/')
}

// =============================================================================
// Engine
// =============================================================================

/// The single owner of order and view state for one session.
pub struct OrderEngine {
    catalog: Catalog,
    view: ViewState,
    store: Box<dyn PreferenceStore>,
    observers: Vec<(SubscriptionId, Box<dyn StateObserver>)>,
    next_subscription: u64,
}

impl OrderEngine {
    /// Creates an engine, restoring language, theme, delivery and cookie
    /// consent from the store. `system_theme` applies when no theme is stored.
    pub fn new(catalog: Catalog, store: Box<dyn PreferenceStore>, system_theme: Theme) -> Self {
        let view = Preferences::load(store.as_ref()).into_view_state(system_theme);
        OrderEngine {
            catalog,
            view,
            store,
            observers: Vec::new(),
            next_subscription: 1,
        }
    }

    // =========================================================================
    // Read Access
    // =========================================================================

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn view_state(&self) -> &ViewState {
        &self.view
    }

    pub fn selected_index(&self) -> usize {
        self.view.selected_index
    }

    /// The product in the viewer, or `None` for an empty catalog.
    pub fn selected_product(&self) -> Option<&Product> {
        self.catalog.get(self.view.selected_index)
    }

    pub fn language(&self) -> Language {
        self.view.language
    }

    pub fn theme(&self) -> Theme {
        self.view.theme
    }

    pub fn delivery(&self) -> Option<DeliveryChoice> {
        self.view.delivery
    }

    pub fn modal_image(&self) -> Option<&str> {
        self.view.modal_image.as_deref()
    }

    pub fn is_modal_open(&self) -> bool {
        self.view.is_modal_open()
    }

    pub fn cookie_consent_accepted(&self) -> bool {
        self.view.cookie_consent_accepted
    }

    // =========================================================================
    // Navigation & Quantities
    // =========================================================================

    /// Moves the viewer one product back or forward, wrapping at both ends.
    ///
    /// ## Example
    /// ```rust
    /// use order_core::catalog::Catalog;
    /// use order_core::engine::OrderEngine;
    /// use order_core::prefs::MemoryPreferences;
    /// use order_core::types::{Direction, Theme};
    ///
    /// let mut engine = OrderEngine::new(
    ///     Catalog::demo(),
    ///     Box::new(MemoryPreferences::new()),
    ///     Theme::Light,
    /// );
    /// assert_eq!(engine.navigate(Direction::Previous), 4);
    /// assert_eq!(engine.navigate(Direction::Next), 0);
    /// ```
    pub fn navigate(&mut self, direction: Direction) -> usize {
        let len = self.catalog.len();
        if len == 0 {
            return self.view.selected_index;
        }

        let current = self.view.selected_index % len;
        let next = match direction {
            Direction::Next => (current + 1) % len,
            Direction::Previous => (current + len - 1) % len,
        };

        if next != self.view.selected_index {
            self.view.selected_index = next;
            self.notify(StateChange::SelectionChanged { index: next });
        }
        next
    }

    /// Adds or removes one unit of a product, never going below zero.
    ///
    /// Returns the new quantity, or `None` when the id is not in the catalog.
    /// Observers see `QuantityChanged` followed by `SummaryChanged` even when
    /// a decrement was clamped at zero.
    pub fn adjust_quantity(&mut self, product_id: &str, change: QuantityChange) -> Option<u32> {
        let product = self.catalog.find_mut(product_id)?;
        let quantity = product.apply(change);

        self.notify(StateChange::QuantityChanged {
            product_id: product_id.to_string(),
            quantity,
        });
        self.notify(StateChange::SummaryChanged);
        Some(quantity)
    }

    /// `adjust_quantity` for the product currently in the viewer.
    pub fn adjust_selected(&mut self, change: QuantityChange) -> Option<u32> {
        let product_id = self.selected_product()?.id().to_string();
        self.adjust_quantity(&product_id, change)
    }

    /// Exact lines and totals for the current quantities.
    pub fn compute_summary(&self) -> OrderSummary {
        OrderSummary::from_products(self.catalog.iter(), VAT_RATE)
    }

    // =========================================================================
    // Preferences
    // =========================================================================

    /// Sets the display language. The store is always written; observers
    /// only hear about an actual change.
    pub fn set_language(&mut self, language: Language) {
        self.store.set(PreferenceKey::Language, language.code());
        if self.view.language != language {
            self.view.language = language;
            self.notify(StateChange::LanguageChanged(language));
        }
    }

    /// Switches between English and Spanish. Returns the new language.
    pub fn toggle_language(&mut self) -> Language {
        let next = self.view.language.other();
        self.set_language(next);
        next
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.store.set(PreferenceKey::Theme, theme.code());
        if self.view.theme != theme {
            self.view.theme = theme;
            self.notify(StateChange::ThemeChanged(theme));
        }
    }

    pub fn toggle_theme(&mut self) -> Theme {
        let next = self.view.theme.other();
        self.set_theme(next);
        next
    }

    /// Selects delivery yes/no. The two options are mutually exclusive.
    pub fn set_delivery(&mut self, choice: DeliveryChoice) {
        self.store.set(PreferenceKey::Delivery, choice.code());
        if self.view.delivery != Some(choice) {
            self.view.delivery = Some(choice);
            self.notify(StateChange::DeliveryChanged(choice));
        }
    }

    /// Records cookie consent and hides the banner.
    pub fn accept_cookies(&mut self) {
        self.store.set(PreferenceKey::CookieConsent, "true");
        if !self.view.cookie_consent_accepted {
            self.view.cookie_consent_accepted = true;
            self.notify(StateChange::CookiesAccepted);
        }
    }

    // =========================================================================
    // Image Modal
    // =========================================================================

    /// Opens the zoom modal for an image. Returns false, leaving the modal
    /// untouched, when the reference is not zoomable.
    pub fn open_modal(&mut self, image_url: &str) -> bool {
        if !is_zoomable(image_url) {
            return false;
        }

        let image_url = image_url.trim().to_string();
        self.view.modal_image = Some(image_url.clone());
        self.notify(StateChange::ModalOpened { image_url });
        true
    }

    /// Opens the modal for the product in the viewer, if it has an image.
    pub fn open_selected_image(&mut self) -> bool {
        let image_url = self
            .selected_product()
            .and_then(Product::image_url)
            .unwrap_or_default()
            .to_string();
        self.open_modal(&image_url)
    }

    /// Closes the modal. Returns false when it was not open.
    pub fn close_modal(&mut self) -> bool {
        if self.view.modal_image.take().is_none() {
            return false;
        }
        self.notify(StateChange::ModalClosed);
        true
    }

    /// Escape key: closes the modal only while it is open.
    pub fn handle_escape(&mut self) -> bool {
        self.is_modal_open() && self.close_modal()
    }

    // =========================================================================
    // Submission
    // =========================================================================

    /// Finalizes the order locally. Quantities are left as they are.
    pub fn submit_order(&self) -> OrderResult {
        let summary = self.compute_summary();
        if summary.is_empty() {
            return OrderResult::Empty;
        }
        OrderResult::Submitted(SubmittedOrder::from_summary(summary, self.view.delivery))
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    /// Registers an observer for every later state change.
    pub fn subscribe<O>(&mut self, observer: O) -> SubscriptionId
    where
        O: StateObserver + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Removes an observer. Returns false for an unknown id.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sid, _)| *sid != id);
        self.observers.len() != before
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    fn notify(&mut self, change: StateChange) {
        // Observers only get `&OrderEngine`, so none can subscribe while we
        // iterate and the list can be restored as-is.
        let mut observers = std::mem::take(&mut self.observers);
        for (_, observer) in observers.iter_mut() {
            observer.on_change(&change, self);
        }
        self.observers = observers;
    }
}

impl fmt::Debug for OrderEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderEngine")
            .field("catalog", &self.catalog)
            .field("view", &self.view)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::money::Money;
    use crate::prefs::MemoryPreferences;

    fn engine_with(catalog: Catalog) -> (OrderEngine, MemoryPreferences) {
        let store = MemoryPreferences::new();
        let engine = OrderEngine::new(catalog, Box::new(store.clone()), Theme::Light);
        (engine, store)
    }

    fn recorder(engine: &mut OrderEngine) -> Rc<RefCell<Vec<StateChange>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        engine.subscribe(move |change: &StateChange, _: &OrderEngine| {
            sink.borrow_mut().push(change.clone());
        });
        events
    }

    fn mug_catalog() -> Catalog {
        Catalog::new(vec![Product::new(
            "mug",
            "Mug",
            Money::from_cents(1599),
        )])
        .unwrap()
    }

    #[test]
    fn test_quantity_never_below_zero() {
        let (mut engine, _) = engine_with(Catalog::demo());
        let script = [
            QuantityChange::Decrement,
            QuantityChange::Increment,
            QuantityChange::Decrement,
            QuantityChange::Decrement,
            QuantityChange::Increment,
            QuantityChange::Increment,
            QuantityChange::Decrement,
            QuantityChange::Decrement,
            QuantityChange::Decrement,
        ];
        let mut expected: i64 = 0;
        for change in script {
            let got = engine.adjust_quantity("p2", change).unwrap();
            expected = match change {
                QuantityChange::Increment => expected + 1,
                QuantityChange::Decrement => (expected - 1).max(0),
            };
            assert_eq!(i64::from(got), expected);
        }
    }

    #[test]
    fn test_unknown_product_is_noop() {
        let (mut engine, _) = engine_with(Catalog::demo());
        let events = recorder(&mut engine);

        assert_eq!(engine.adjust_quantity("nope", QuantityChange::Increment), None);
        assert!(events.borrow().is_empty());
        assert!(engine.compute_summary().is_empty());
    }

    #[test]
    fn test_navigation_is_cyclic() {
        let (mut engine, _) = engine_with(Catalog::demo());
        let len = engine.catalog().len();

        for direction in [Direction::Next, Direction::Previous] {
            let start = engine.selected_index();
            for _ in 0..len {
                engine.navigate(direction);
            }
            assert_eq!(engine.selected_index(), start);
        }

        assert_eq!(engine.navigate(Direction::Previous), len - 1);
        assert_eq!(engine.navigate(Direction::Next), 0);
    }

    #[test]
    fn test_mug_scenario() {
        let (mut engine, _) = engine_with(mug_catalog());
        engine.adjust_quantity("mug", QuantityChange::Increment);
        assert_eq!(engine.adjust_quantity("mug", QuantityChange::Increment), Some(2));

        let summary = engine.compute_summary();
        assert_eq!(summary.lines.len(), 1);
        assert_eq!(summary.lines[0].quantity, 2);
        assert_eq!(summary.lines[0].line_total.to_decimal_string(), "31.98");
        assert_eq!(summary.subtotal.to_decimal_string(), "31.98");
        assert_eq!(summary.vat.to_decimal_string(), "3.8376");
        assert_eq!(summary.total.to_decimal_string(), "35.8176");

        assert_eq!(summary.subtotal.format_amount(), "31.98");
        assert_eq!(summary.vat.format_amount(), "3.84");
        assert_eq!(summary.total.format_amount(), "35.82");
    }

    #[test]
    fn test_subtotal_is_exact_sum() {
        let (mut engine, _) = engine_with(Catalog::demo());
        for (id, times) in [("p1", 3), ("p3", 1), ("p5", 7)] {
            for _ in 0..times {
                engine.adjust_quantity(id, QuantityChange::Increment);
            }
        }

        let summary = engine.compute_summary();
        let expected: Money = engine
            .catalog()
            .active()
            .map(|p| p.price().multiply_quantity(p.quantity()))
            .sum();
        assert_eq!(summary.subtotal, expected);
        assert_eq!(summary.total, summary.subtotal + summary.vat);
    }

    #[test]
    fn test_summary_saturates_on_extreme_quantities() {
        let price = crate::validation::MAX_PRICE;
        let catalog = Catalog::new(vec![
            Product::new("a", "Yacht", price).with_quantity(u32::MAX - 1),
            Product::new("b", "Island", price).with_quantity(u32::MAX - 1),
        ])
        .unwrap();
        let (mut engine, _) = engine_with(catalog);
        assert_eq!(engine.adjust_quantity("a", QuantityChange::Increment), Some(u32::MAX));
        assert_eq!(engine.adjust_quantity("a", QuantityChange::Increment), Some(u32::MAX));

        let summary = engine.compute_summary();
        assert_eq!(summary.lines.len(), 2);
        assert_eq!(summary.subtotal, Money::from_raw(i64::MAX));
        assert_eq!(summary.total, Money::from_raw(i64::MAX));
        assert!(summary.vat.is_positive());
        assert!(!summary.total.format_amount().is_empty());
    }

    #[test]
    fn test_empty_catalog() {
        let (mut engine, _) = engine_with(Catalog::empty());
        let events = recorder(&mut engine);

        assert_eq!(engine.navigate(Direction::Next), 0);
        assert_eq!(engine.adjust_selected(QuantityChange::Increment), None);
        assert!(engine.selected_product().is_none());
        assert!(!engine.open_selected_image());
        assert!(events.borrow().is_empty());

        let summary = engine.compute_summary();
        assert_eq!(summary.subtotal.format_amount(), "0.00");
        assert_eq!(summary.vat.format_amount(), "0.00");
        assert_eq!(summary.total.format_amount(), "0.00");
        assert_eq!(engine.submit_order(), OrderResult::Empty);
    }

    #[test]
    fn test_submit_order() {
        let (mut engine, _) = engine_with(Catalog::demo());
        assert_eq!(engine.submit_order(), OrderResult::Empty);

        engine.adjust_quantity("p4", QuantityChange::Increment);
        engine.adjust_quantity("p1", QuantityChange::Increment);
        engine.adjust_quantity("p1", QuantityChange::Increment);
        engine.set_delivery(DeliveryChoice::Yes);

        let result = engine.submit_order();
        let order = result.submitted().unwrap();
        let ids: Vec<&str> = order.lines.iter().map(|l| l.product_id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p4"]);
        assert_eq!(order.lines[0].quantity, 2);
        assert_eq!(order.delivery, Some(DeliveryChoice::Yes));

        // Quantities survive submission; a resubmit gets a new reference.
        assert_eq!(engine.catalog().find("p1").unwrap().quantity(), 2);
        let again = engine.submit_order();
        let again = again.submitted().unwrap();
        assert_eq!(again.lines, order.lines);
        assert_ne!(again.reference, order.reference);
    }

    #[test]
    fn test_six_active_products_all_counted() {
        let products = (1..=6)
            .map(|i| Product::new(format!("p{i}"), format!("Item {i}"), Money::from_cents(100)))
            .collect();
        let (mut engine, _) = engine_with(Catalog::new(products).unwrap());
        for i in 1..=6 {
            engine.adjust_quantity(&format!("p{i}"), QuantityChange::Increment);
        }

        let summary = engine.compute_summary();
        assert_eq!(summary.lines.len(), 6);
        assert_eq!(summary.subtotal, Money::from_cents(600));
    }

    #[test]
    fn test_set_language_is_idempotent() {
        let (mut engine, store) = engine_with(Catalog::demo());
        let events = recorder(&mut engine);

        engine.set_language(Language::En);
        let once = engine.view_state().clone();
        engine.set_language(Language::En);
        assert_eq!(engine.view_state(), &once);
        assert!(events.borrow().is_empty());
        assert_eq!(store.get(PreferenceKey::Language).as_deref(), Some("en"));

        engine.set_language(Language::Es);
        engine.set_language(Language::Es);
        assert_eq!(
            *events.borrow(),
            vec![StateChange::LanguageChanged(Language::Es)]
        );
        assert_eq!(store.get(PreferenceKey::Language).as_deref(), Some("es"));
    }

    #[test]
    fn test_toggles_persist() {
        let (mut engine, store) = engine_with(Catalog::demo());

        assert_eq!(engine.toggle_language(), Language::Es);
        assert_eq!(engine.toggle_theme(), Theme::Dark);
        engine.set_delivery(DeliveryChoice::No);
        engine.accept_cookies();

        let saved = store.snapshot();
        assert_eq!(saved["preferredLanguage"], "es");
        assert_eq!(saved["userTheme"], "dark");
        assert_eq!(saved["deliverySelection"], "no");
        assert_eq!(saved["cookieConsentAccepted"], "true");

        let restored = OrderEngine::new(Catalog::demo(), Box::new(store), Theme::Light);
        assert_eq!(restored.language(), Language::Es);
        assert_eq!(restored.theme(), Theme::Dark);
        assert_eq!(restored.delivery(), Some(DeliveryChoice::No));
        assert!(restored.cookie_consent_accepted());
    }

    #[test]
    fn test_system_theme_used_when_unset() {
        let engine = OrderEngine::new(
            Catalog::demo(),
            Box::new(MemoryPreferences::new()),
            Theme::Dark,
        );
        assert_eq!(engine.theme(), Theme::Dark);
        assert_eq!(engine.language(), Language::En);
        assert!(!engine.cookie_consent_accepted());
    }

    #[test]
    fn test_delivery_is_exclusive() {
        let (mut engine, _) = engine_with(Catalog::demo());
        assert_eq!(engine.delivery(), None);
        engine.set_delivery(DeliveryChoice::Yes);
        engine.set_delivery(DeliveryChoice::No);
        assert_eq!(engine.delivery(), Some(DeliveryChoice::No));
    }

    #[test]
    fn test_modal_suppression() {
        assert!(!is_zoomable(""));
        assert!(!is_zoomable("   "));
        assert!(!is_zoomable("https://via.placeholder.com/300x200?text=No%20Image%20Available"));
        assert!(!is_zoomable("https://shop.example/"));
        assert!(is_zoomable("https://via.placeholder.com/300x200?text=Lamp"));
    }

    #[test]
    fn test_modal_lifecycle() {
        let (mut engine, _) = engine_with(Catalog::demo());
        let events = recorder(&mut engine);

        assert!(!engine.handle_escape());
        assert!(engine.open_selected_image());
        assert_eq!(
            engine.modal_image(),
            Some("https://via.placeholder.com/300x200?text=Glass+Mug")
        );
        assert!(engine.handle_escape());
        assert!(!engine.is_modal_open());
        assert!(!engine.close_modal());

        engine.navigate(Direction::Next);
        engine.navigate(Direction::Next);
        assert_eq!(engine.selected_product().unwrap().id(), "p3");
        assert!(!engine.open_selected_image());

        let modal_events = events
            .borrow()
            .iter()
            .filter(|e| matches!(e, StateChange::ModalOpened { .. } | StateChange::ModalClosed))
            .count();
        assert_eq!(modal_events, 2);
    }

    #[test]
    fn test_observers_see_quantity_then_summary() {
        let (mut engine, _) = engine_with(Catalog::demo());
        let events = recorder(&mut engine);

        engine.adjust_selected(QuantityChange::Increment);
        assert_eq!(
            *events.borrow(),
            vec![
                StateChange::QuantityChanged {
                    product_id: "p1".to_string(),
                    quantity: 1
                },
                StateChange::SummaryChanged,
            ]
        );
    }

    #[test]
    fn test_observer_reads_new_state() {
        let (mut engine, _) = engine_with(Catalog::demo());
        let seen = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&seen);
        engine.subscribe(move |_: &StateChange, engine: &OrderEngine| {
            *sink.borrow_mut() = Some(engine.compute_summary().subtotal);
        });

        engine.adjust_quantity("p2", QuantityChange::Increment);
        assert_eq!(*seen.borrow(), Some(Money::from_cents(3450)));
    }

    #[test]
    fn test_unsubscribe() {
        let (mut engine, _) = engine_with(Catalog::demo());
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        let id = engine.subscribe(move |_: &StateChange, _: &OrderEngine| {
            *sink.borrow_mut() += 1;
        });

        engine.navigate(Direction::Next);
        assert!(engine.unsubscribe(id));
        assert!(!engine.unsubscribe(id));
        engine.navigate(Direction::Next);

        assert_eq!(*count.borrow(), 1);
        assert_eq!(engine.observer_count(), 0);
    }
}
