//! # Text Renderer
//!
//! Draws a [`Screen`] as plain text and keeps a terminal in step with the
//! engine through [`RenderObserver`].
//!
//! ## Frame Layout
//! ```text
//! ═══ Order App ═══════════════════════════════ [ES] light
//!  ◄ 1/5 ►  Liquid Glass Mug                       $15.99
//!           image: https://via.placeholder.com/... (zoom)
//!           Qty: 2   [-] Remove one Liquid Glass Mug
//!                    [+] Add one Liquid Glass Mug
//! ─── Order Items ────────────────────────────────────────
//!   Liquid Glass Mug x 2                           $31.98
//!   (empty item placeholder)
//!   ...
//!   Subtotal 31.98   VAT 3.84   Total 35.82       [PAY]
//!   Includes Delivery: ( ) Yes  ( ) No
//! ```

use std::fmt::Write as _;
use std::io::Write;

use order_core::engine::OrderEngine;
use order_core::events::{StateChange, StateObserver};
use order_core::i18n::Translations;
use order_core::view::{ImageView, Screen};
use order_core::DeliveryChoice;
use tracing::warn;

const WIDTH: usize = 56;

/// Renders screens to text.
#[derive(Debug, Clone, Default)]
pub struct TextRenderer {
    translations: Translations,
}

impl TextRenderer {
    pub fn new(translations: Translations) -> Self {
        TextRenderer { translations }
    }

    /// Builds and renders the engine's current frame.
    pub fn render_engine(&self, engine: &OrderEngine) -> String {
        self.render(&Screen::build(engine, &self.translations))
    }

    pub fn render(&self, screen: &Screen) -> String {
        let mut out = String::new();
        // Writing to a String cannot fail.
        let _ = self.write_screen(&mut out, screen);
        out
    }

    fn write_screen(&self, out: &mut String, screen: &Screen) -> std::fmt::Result {
        let labels = &screen.labels;
        let product = &screen.product;
        let summary = &screen.summary;

        let header = format!("═══ {} ", labels.app_title);
        let status = format!(" [{}] {}", labels.language_toggle, screen.theme.code());
        writeln!(out, "{}", pad_between(&header, &status, '═'))?;

        let position = if product.count == 0 {
            "0/0".to_string()
        } else {
            format!("{}/{}", product.position, product.count)
        };
        let title = format!(" ◄ {position} ►  {}", product.name);
        writeln!(out, "{}", pad_between(&title, &product.price, ' '))?;

        match &product.image {
            ImageView::Image { url, .. } => {
                let zoom = if product.zoomable {
                    format!(" ({})", labels.zoom)
                } else {
                    String::new()
                };
                writeln!(out, "          {}: {url}{zoom}", labels.image)?;
            }
            ImageView::Placeholder { text } => writeln!(out, "          [{text}]")?,
        }

        writeln!(
            out,
            "          {}: {}   [-] {}",
            labels.qty, product.quantity, product.remove_label
        )?;
        writeln!(out, "                   [+] {}", product.add_label)?;

        writeln!(out, "{}", pad_between(&format!("─── {} ", summary.title), "", '─'))?;
        for slot in &summary.slots {
            if slot.is_placeholder() {
                writeln!(out, "  {}", slot.text)?;
            } else {
                let text = format!("  {}", slot.text);
                writeln!(out, "{}", pad_between(&text, &slot.amount, ' '))?;
            }
        }

        let totals = format!(
            "  {} {}   {} {}   {} {}",
            labels.subtotal, summary.subtotal, labels.vat, summary.vat, labels.total, summary.total
        );
        writeln!(
            out,
            "{}",
            pad_between(&totals, &format!("[{}]", labels.pay_button), ' ')
        )?;

        let mark = |choice| {
            if screen.delivery == Some(choice) {
                "(x)"
            } else {
                "( )"
            }
        };
        writeln!(
            out,
            "  {}: {} {}  {} {}",
            labels.delivery,
            mark(DeliveryChoice::Yes),
            labels.delivery_yes,
            mark(DeliveryChoice::No),
            labels.delivery_no
        )?;

        if let Some(image) = &screen.modal_image {
            writeln!(out, "  ┌ {}: {image}", labels.zoom)?;
            writeln!(out, "  └ ({})", labels.close_hint)?;
        }

        if let Some(banner) = &screen.cookie_banner {
            writeln!(out, "  {} [{}]", banner.message, banner.accept_label)?;
        }

        Ok(())
    }
}

/// `left` and `right` on one line, separated by `fill` up to the frame width.
fn pad_between(left: &str, right: &str, fill: char) -> String {
    let used = left.chars().count() + right.chars().count();
    let gap = WIDTH.saturating_sub(used).max(1);
    let mut line = String::with_capacity(left.len() + gap + right.len());
    line.push_str(left);
    line.extend(std::iter::repeat(fill).take(gap));
    line.push_str(right);
    line
}

// =============================================================================
// Observer
// =============================================================================

/// Re-renders the whole frame after every state change.
///
/// `QuantityChanged` is always followed by `SummaryChanged`, so only the
/// latter redraws. A failed write drops that frame only.
pub struct RenderObserver<W: Write> {
    renderer: TextRenderer,
    out: W,
}

impl<W: Write> RenderObserver<W> {
    pub fn new(renderer: TextRenderer, out: W) -> Self {
        RenderObserver { renderer, out }
    }
}

impl<W: Write> StateObserver for RenderObserver<W> {
    fn on_change(&mut self, change: &StateChange, engine: &OrderEngine) {
        if matches!(change, StateChange::QuantityChanged { .. }) {
            return;
        }

        let frame = self.renderer.render_engine(engine);
        let written = self
            .out
            .write_all(frame.as_bytes())
            .and_then(|_| self.out.flush());
        if let Err(err) = written {
            warn!(error = %err, ?change, "Failed to draw frame");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use order_core::prelude::*;
    use std::cell::RefCell;
    use std::io;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct SharedBuf(Rc<RefCell<Vec<u8>>>);

    impl SharedBuf {
        fn text(&self) -> String {
            String::from_utf8(self.0.borrow().clone()).unwrap()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn engine(catalog: Catalog) -> OrderEngine {
        OrderEngine::new(catalog, Box::new(MemoryPreferences::new()), Theme::Light)
    }

    #[test]
    fn test_render_demo_frame() {
        let mut engine = engine(Catalog::demo());
        engine.adjust_quantity("p1", QuantityChange::Increment);
        engine.adjust_quantity("p1", QuantityChange::Increment);

        let text = TextRenderer::default().render_engine(&engine);
        assert!(text.contains("Order App"));
        assert!(text.contains("[ES] light"));
        assert!(text.contains("1/5"));
        assert!(text.contains("Liquid Glass Mug x 2"));
        assert!(text.contains("$31.98"));
        assert!(text.contains("35.82"));
        assert!(text.contains("(zoom)"));
    }

    #[test]
    fn test_render_empty_catalog() {
        let text = TextRenderer::default().render_engine(&engine(Catalog::empty()));
        assert!(text.contains("0/0"));
        assert!(text.contains("N/A"));
        assert!(text.contains("$0.00"));
        assert!(text.contains("0.00"));
    }

    #[test]
    fn test_empty_slots_use_placeholder_text() {
        let json = r#"{"en": {"emptyItemPlaceholder": "(empty)"}}"#;
        let translations = Translations::with_overrides_json(json).unwrap();
        let mut engine = engine(Catalog::demo());
        engine.adjust_quantity("p1", QuantityChange::Increment);

        let text = TextRenderer::new(translations).render_engine(&engine);
        assert_eq!(text.matches("  (empty)\n").count(), 4);
    }

    #[test]
    fn test_spanish_frame_has_no_english_labels() {
        let mut engine = engine(Catalog::demo());
        engine.set_language(Language::Es);
        engine.open_selected_image();

        let text = TextRenderer::default().render_engine(&engine);
        assert!(text.contains("imagen: "));
        assert!(text.contains("(ampliar)"));
        assert!(text.contains("Añadir un Liquid Glass Mug"));
        assert!(text.contains("Quitar un Liquid Glass Mug"));
        assert!(text.contains("esc para cerrar"));
        for english in ["image:", "(zoom)", "Add one", "Remove one", "esc to close"] {
            assert!(!text.contains(english), "found {english}");
        }
    }

    #[test]
    fn test_observer_redraws_on_change() {
        let buf = SharedBuf::default();
        let mut engine = engine(Catalog::demo());
        engine.subscribe(RenderObserver::new(TextRenderer::default(), buf.clone()));

        engine.adjust_quantity("p2", QuantityChange::Increment);
        assert_eq!(buf.text().matches('◄').count(), 1);

        engine.set_language(Language::Es);
        let text = buf.text();
        assert_eq!(text.matches('◄').count(), 2);
        assert!(text.contains("[EN] light"));
        assert!(text.contains("PAGAR"));
    }

    #[test]
    fn test_failed_write_skips_frame() {
        let mut engine = engine(Catalog::demo());
        engine.subscribe(RenderObserver::new(TextRenderer::default(), BrokenPipe));

        assert_eq!(engine.navigate(Direction::Next), 1);
        assert_eq!(
            engine.adjust_selected(QuantityChange::Increment),
            Some(1)
        );
    }
}
