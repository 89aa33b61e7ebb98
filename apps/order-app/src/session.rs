//! # Interactive Session
//!
//! Maps typed commands onto engine operations. Redrawing is left to the
//! subscribed observers; the session only reports one-off messages such as
//! the PAY confirmation.
//!
//! ## Commands
//! ```text
//! next | n            previous | prev | p
//! add | +             remove | -
//! lang [en|es]        theme [light|dark]
//! delivery yes|no     zoom | close | esc
//! accept              pay
//! show                help            quit | q
//! ```

use std::str::FromStr;

use order_core::engine::OrderEngine;
use order_core::i18n::Translations;
use order_core::order::OrderResult;
use order_core::view::message_for;
use order_core::{DeliveryChoice, Direction, Language, QuantityChange, Theme};
use tracing::info;

use crate::error::AppError;

pub const HELP: &str = "\
commands:
  next | prev          move through the catalog
  add | remove         change the quantity of the shown product
  lang [en|es]         switch language (toggles without argument)
  theme [light|dark]   switch theme (toggles without argument)
  delivery yes|no      include delivery
  zoom | close | esc   image zoom
  accept               accept cookies
  pay                  submit the order
  show                 redraw
  quit                 leave";

// =============================================================================
// Commands
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Navigate(Direction),
    Adjust(QuantityChange),
    Language(Option<Language>),
    Theme(Option<Theme>),
    Delivery(DeliveryChoice),
    Zoom,
    CloseZoom,
    Escape,
    AcceptCookies,
    Pay,
    Show,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let verb = words.next().unwrap_or_default().to_lowercase();
        let arg = words.next();
        let unknown = || AppError::UnknownCommand(s.trim().to_string());

        let command = match verb.as_str() {
            "next" | "n" | ">" => Command::Navigate(Direction::Next),
            "previous" | "prev" | "p" | "<" => Command::Navigate(Direction::Previous),
            "add" | "+" => Command::Adjust(QuantityChange::Increment),
            "remove" | "-" => Command::Adjust(QuantityChange::Decrement),
            "lang" | "language" => {
                Command::Language(arg.map(|a| a.parse()).transpose().map_err(|_| unknown())?)
            }
            "theme" => Command::Theme(arg.map(|a| a.parse()).transpose().map_err(|_| unknown())?),
            "delivery" => Command::Delivery(arg.ok_or_else(unknown)?.parse().map_err(|_| unknown())?),
            "zoom" => Command::Zoom,
            "close" => Command::CloseZoom,
            "esc" | "escape" => Command::Escape,
            "accept" => Command::AcceptCookies,
            "pay" => Command::Pay,
            "show" | "" => Command::Show,
            "help" | "?" => Command::Help,
            "quit" | "q" | "exit" => Command::Quit,
            _ => return Err(unknown()),
        };
        Ok(command)
    }
}

/// What the caller should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// State changed (or not); observers already redrew.
    Continue,
    /// Show this text to the user.
    Message(String),
    /// Redraw the whole frame.
    Redraw,
    Quit,
}

// =============================================================================
// Session
// =============================================================================

pub struct Session {
    engine: OrderEngine,
    translations: Translations,
}

impl Session {
    pub fn new(engine: OrderEngine, translations: Translations) -> Self {
        Session {
            engine,
            translations,
        }
    }

    pub fn engine(&self) -> &OrderEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut OrderEngine {
        &mut self.engine
    }

    pub fn execute(&mut self, command: Command) -> Outcome {
        let engine = &mut self.engine;

        match command {
            Command::Navigate(direction) => {
                engine.navigate(direction);
            }
            Command::Adjust(change) => {
                engine.adjust_selected(change);
            }
            Command::Language(Some(language)) => engine.set_language(language),
            Command::Language(None) => {
                engine.toggle_language();
            }
            Command::Theme(Some(theme)) => engine.set_theme(theme),
            Command::Theme(None) => {
                engine.toggle_theme();
            }
            Command::Delivery(choice) => engine.set_delivery(choice),
            Command::Zoom => {
                if !engine.open_selected_image() {
                    return Outcome::Message(
                        self.translations
                            .translate(order_core::i18n::TextKey::NoImageAvailable, engine.language())
                            .to_string(),
                    );
                }
            }
            Command::CloseZoom => {
                engine.close_modal();
            }
            Command::Escape => {
                engine.handle_escape();
            }
            Command::AcceptCookies => engine.accept_cookies(),
            Command::Pay => {
                let result = engine.submit_order();
                if let OrderResult::Submitted(order) = &result {
                    info!(
                        reference = %order.reference,
                        total = %order.total,
                        lines = order.lines.len(),
                        "Order submitted"
                    );
                }
                return Outcome::Message(message_for(
                    &result,
                    engine.language(),
                    &self.translations,
                ));
            }
            Command::Show => return Outcome::Redraw,
            Command::Help => return Outcome::Message(HELP.to_string()),
            Command::Quit => return Outcome::Quit,
        }

        Outcome::Continue
    }

    /// Parses and executes one input line.
    pub fn execute_line(&mut self, line: &str) -> Result<Outcome, AppError> {
        let command: Command = line.parse()?;
        Ok(self.execute(command))
    }
}
