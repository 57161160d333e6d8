//! Cards, locations and card categories.

use serde::{Deserialize, Serialize};

use super::renderable::{Face, FaceSide};

/// Index of a card in its deck's card arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CardId(pub u32);

impl CardId {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.0)
    }
}

/// Index of a location in its deck.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LocationId(pub u32);

impl LocationId {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for LocationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Location({})", self.0)
    }
}

/// Card categories in numbering and rendering order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardCategory {
    DeckCards,
    Base,
    Items,
    Plan,
    Misc,
    Characters,
    Reference,
    Locations,
}

impl CardCategory {
    /// Every category, in the fixed order cards are numbered and rendered.
    pub const ORDER: [CardCategory; 8] = [
        CardCategory::DeckCards,
        CardCategory::Base,
        CardCategory::Items,
        CardCategory::Plan,
        CardCategory::Misc,
        CardCategory::Characters,
        CardCategory::Reference,
        CardCategory::Locations,
    ];

    /// Element name of the category's list container in the deck file.
    #[must_use]
    pub const fn element(self) -> &'static str {
        match self {
            CardCategory::DeckCards => "deckcards",
            CardCategory::Base => "base",
            CardCategory::Items => "items",
            CardCategory::Plan => "plan",
            CardCategory::Misc => "misc",
            CardCategory::Characters => "characters",
            CardCategory::Reference => "iconreference",
            CardCategory::Locations => "locations",
        }
    }
}

/// A card with two faces.
///
/// `card_number`, `local_card_number`, `background_card` and `location`
/// are computed by `Deck::renumber_entities` and should not be set by hand.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub name: String,
    pub top_face: Face,
    pub bot_face: Face,

    /// True for the default (template) cards drawn behind other cards.
    pub background: bool,

    pub card_number: i32,
    pub local_card_number: i32,
    pub background_card: Option<CardId>,
    pub location: Option<LocationId>,
}

impl Card {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            top_face: Face::new(),
            bot_face: Face::new(),
            background: false,
            card_number: 0,
            local_card_number: 0,
            background_card: None,
            location: None,
        }
    }

    /// A template card drawn behind the cards of a category.
    #[must_use]
    pub fn background(name: impl Into<String>) -> Self {
        Self {
            background: true,
            ..Self::new(name)
        }
    }

    #[must_use]
    pub fn with_top(mut self, face: Face) -> Self {
        self.top_face = face;
        self
    }

    #[must_use]
    pub fn with_bottom(mut self, face: Face) -> Self {
        self.bot_face = face;
        self
    }

    #[must_use]
    pub fn face(&self, side: FaceSide) -> &Face {
        match side {
            FaceSide::Top => &self.top_face,
            FaceSide::Bottom => &self.bot_face,
        }
    }

    pub fn face_mut(&mut self, side: FaceSide) -> &mut Face {
        match side {
            FaceSide::Top => &mut self.top_face,
            FaceSide::Bottom => &mut self.bot_face,
        }
    }
}

/// A named, ordered group of cards, itself numbered as one card slot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub cards: Vec<CardId>,
    pub card_number: i32,
    pub local_card_number: i32,
}

impl Location {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cards: Vec::new(),
            card_number: 0,
            local_card_number: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::Renderable;

    #[test]
    fn test_ids() {
        assert_eq!(CardId::new(3).index(), 3);
        assert_eq!(format!("{}", CardId::new(3)), "Card(3)");
        assert_eq!(format!("{}", LocationId::new(1)), "Location(1)");
    }

    #[test]
    fn test_category_order() {
        assert_eq!(CardCategory::ORDER[0], CardCategory::DeckCards);
        assert_eq!(CardCategory::ORDER[7], CardCategory::Locations);
        assert_eq!(CardCategory::Reference.element(), "iconreference");
    }

    #[test]
    fn test_background_card() {
        let card = Card::background("default");
        assert!(card.background);
        assert!(!Card::new("x").background);
    }

    #[test]
    fn test_faces() {
        let mut card = Card::new("c").with_top(Face::new().with(Renderable::rect("r", "s")));
        assert_eq!(card.face(FaceSide::Top).len(), 1);
        assert!(card.face(FaceSide::Bottom).is_empty());
        card.face_mut(FaceSide::Bottom).push(Renderable::image("i", "img"));
        assert_eq!(card.bot_face.len(), 1);
    }
}
