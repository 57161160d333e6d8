//! Macro substitution for card text.
//!
//! ## Grammar
//!
//! - `{XY}` / `{XY:name}`: `X` picks the lookup class, `Y` the value.
//!   - `X`: `c` = any card, `i` = item card, `l` = location
//!   - `Y`: `N` = global number, `n` = local number, `s` = name,
//!     `A` = global letter, `a` = local letter (`'A' + number - 1`)
//!   - no `:name` (or an empty one): the card being rendered, or for `l`
//!     the location that card belongs to
//! - `{n}`: a newline
//!
//! Unknown names fall back to the current entity. Tokens that cannot be
//! resolved or are malformed become `{err}`. An opening `{X` with no
//! closing brace is left as-is.
//!
//! ```
//! use rust_cardforge::deck::{Card, CardList, Deck};
//! use rust_cardforge::text::{expand_macros, MacroContext};
//!
//! let mut deck = Deck::new("demo");
//! deck.add_card(CardList::Base, Card::new("intro"));
//! deck.add_card(CardList::Base, Card::new("finale"));
//! deck.renumber_entities();
//!
//! let intro = deck.find_card("intro", None).unwrap();
//! let ctx = MacroContext::new(&deck).with_card(intro);
//! assert_eq!(expand_macros("{cN} of {cN:finale}", &ctx), "1 of 2");
//! ```

use crate::deck::{Card, Deck, Location};

/// Replacement text for tokens that cannot be resolved.
pub const ERROR_TEXT: &str = "{err}";

/// Key classes, scanned in this order.
const KEYS: [char; 4] = ['c', 'i', 'l', 'n'];

/// What a macro is being expanded for.
#[derive(Clone, Copy, Debug)]
pub struct MacroContext<'a> {
    pub deck: &'a Deck,
    /// The card being rendered.
    pub card: Option<&'a Card>,
    /// The location the card being rendered belongs to.
    pub location: Option<&'a Location>,
}

impl<'a> MacroContext<'a> {
    #[must_use]
    pub fn new(deck: &'a Deck) -> Self {
        Self {
            deck,
            card: None,
            location: None,
        }
    }

    #[must_use]
    pub fn with_card(mut self, card: &'a Card) -> Self {
        self.card = Some(card);
        self
    }

    #[must_use]
    pub fn with_location(mut self, location: &'a Location) -> Self {
        self.location = Some(location);
        self
    }
}

/// A numbered entity a macro can refer to.
#[derive(Clone, Copy, Debug)]
enum Entity<'a> {
    Card(&'a Card),
    Location(&'a Location),
}

impl Entity<'_> {
    fn name(&self) -> &str {
        match self {
            Entity::Card(c) => &c.name,
            Entity::Location(l) => &l.name,
        }
    }

    fn numbers(&self) -> (i32, i32) {
        match self {
            Entity::Card(c) => (c.card_number, c.local_card_number),
            Entity::Location(l) => (l.card_number, l.local_card_number),
        }
    }
}

fn letter(number: i32) -> Option<String> {
    let code = u32::try_from('A' as i32 + number - 1).ok()?;
    char::from_u32(code).map(String::from)
}

/// Expand every macro in `text`.
///
/// Each key class is scanned left to right; scanning resumes after each
/// replacement, so replacement text is never re-expanded by the same class.
#[must_use]
pub fn expand_macros(text: &str, ctx: &MacroContext<'_>) -> String {
    let mut text = text.to_string();
    for key in KEYS {
        let pattern = format!("{{{key}");
        let mut from = 0;
        while let Some(rel) = text[from..].find(&pattern) {
            let start = from + rel;
            let Some(len) = text[start..].find('}') else {
                break;
            };
            let end = start + len;
            let replacement = resolve_token(key, &text[start + 1..end], ctx);
            text.replace_range(start..=end, &replacement);
            from = start + replacement.len();
        }
    }
    text
}

/// Resolve one token body (the text between the braces).
fn resolve_token(key: char, body: &str, ctx: &MacroContext<'_>) -> String {
    if key == 'n' {
        return if body == "n" {
            "\n".to_string()
        } else {
            ERROR_TEXT.to_string()
        };
    }

    let rest = &body[key.len_utf8()..];
    let mut chars = rest.chars();
    let Some(selector) = chars.next() else {
        return ERROR_TEXT.to_string();
    };
    let target = match chars.as_str() {
        "" => None,
        tail => match tail.strip_prefix(':') {
            Some(name) => Some(name),
            None => return ERROR_TEXT.to_string(),
        },
    };

    let Some(entity) = lookup(key, target.filter(|n| !n.is_empty()), ctx) else {
        return ERROR_TEXT.to_string();
    };

    let (global, local) = entity.numbers();
    let value = match selector {
        'N' => Some(global.to_string()),
        'n' => Some(local.to_string()),
        's' => Some(entity.name().to_string()),
        'A' => letter(global),
        'a' => letter(local),
        _ => None,
    };
    value.unwrap_or_else(|| ERROR_TEXT.to_string())
}

fn lookup<'a>(key: char, name: Option<&str>, ctx: &MacroContext<'a>) -> Option<Entity<'a>> {
    let current = match key {
        'l' => ctx.location.map(Entity::Location),
        _ => ctx.card.map(Entity::Card),
    };
    let Some(name) = name else {
        return current;
    };
    let found = match key {
        'l' => ctx.deck.find_location(name, None).map(Entity::Location),
        'i' => ctx.deck.find_item(name, None).map(Entity::Card),
        _ => ctx.deck.find_card(name, None).map(Entity::Card),
    };
    if found.is_none() {
        tracing::warn!(key = %key, name = %name, "macro references unknown name, using current entity");
    }
    found.or(current)
}
