//! The deck: every asset and card of a printable card game.
//!
//! ## Layout
//!
//! Cards live in one arena addressed by `CardId`. Categories are ordered
//! views over that arena:
//!
//! - six plain lists (`CardList`): deckcards, base, items, plan, misc,
//!   characters
//! - the single icon-reference card
//! - locations, each an ordered group of cards
//! - three template cards (default, default item, default location) drawn
//!   behind the cards of their categories
//!
//! Name lookups go through one `NameRegistry` per lookup class.
//!
//! ## Numbering
//!
//! `renumber_entities` walks the categories in `CardCategory::ORDER` and
//! assigns every card a global number, a per-category local number, its
//! background card and (for location members) its location. It must run
//! before rendering since text macros may reference any card's number.

use image::RgbaImage;

use crate::core::config::DEFAULT_CARD_SIZE;

use super::asset::{FileAsset, ImageAsset, Style};
use super::card::{Card, CardCategory, CardId, Location, LocationId};
use super::registry::NameRegistry;

/// Fall back to `default` on a lookup miss, noting the miss.
fn or_default<'a, T>(found: Option<&'a T>, default: Option<&'a T>, kind: &str, name: &str) -> Option<&'a T> {
    if found.is_none() {
        tracing::debug!(kind, name, "name lookup missed");
    }
    found.or(default)
}

/// The six plain card lists.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CardList {
    DeckCards,
    Base,
    Items,
    Plan,
    Misc,
    Characters,
}

impl CardList {
    pub const ALL: [CardList; 6] = [
        CardList::DeckCards,
        CardList::Base,
        CardList::Items,
        CardList::Plan,
        CardList::Misc,
        CardList::Characters,
    ];

    #[must_use]
    pub const fn category(self) -> CardCategory {
        match self {
            CardList::DeckCards => CardCategory::DeckCards,
            CardList::Base => CardCategory::Base,
            CardList::Items => CardCategory::Items,
            CardList::Plan => CardCategory::Plan,
            CardList::Misc => CardCategory::Misc,
            CardList::Characters => CardCategory::Characters,
        }
    }
}

/// The template (background) cards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Template {
    /// Behind base, plan, misc, character and reference cards.
    Default,
    /// Behind item cards.
    Item,
    /// Behind location member cards.
    Location,
}

impl Template {
    pub const ALL: [Template; 3] = [Template::Default, Template::Item, Template::Location];

    /// Element name in the deck file.
    #[must_use]
    pub const fn element(self) -> &'static str {
        match self {
            Template::Default => "defaultcard",
            Template::Item => "defaultitemcard",
            Template::Location => "defaultlocationcard",
        }
    }
}

/// One card to render, with the context it renders in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderEntry {
    pub card: CardId,
    pub background: Option<CardId>,
    pub location: Option<LocationId>,
}

/// A complete deck.
#[derive(Clone, Debug)]
pub struct Deck {
    pub name: String,
    card_size: (u32, u32),

    files: Vec<FileAsset>,
    images: Vec<ImageAsset>,
    styles: Vec<Style>,
    file_names: NameRegistry<usize>,
    image_names: NameRegistry<usize>,
    style_names: NameRegistry<usize>,
    default_style: Style,

    cards: Vec<Card>,
    card_names: NameRegistry<CardId>,
    item_names: NameRegistry<CardId>,

    deckcards: Vec<CardId>,
    base: Vec<CardId>,
    items: Vec<CardId>,
    plan: Vec<CardId>,
    misc: Vec<CardId>,
    characters: Vec<CardId>,
    icon_reference: CardId,
    default_card: CardId,
    default_item_card: CardId,
    default_location_card: CardId,

    locations: Vec<Location>,
    location_names: NameRegistry<LocationId>,
}

impl Default for Deck {
    fn default() -> Self {
        Self::new("")
    }
}

impl Deck {
    /// Create an empty deck with blank template and reference cards.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let mut deck = Self {
            name: name.into(),
            card_size: DEFAULT_CARD_SIZE,
            files: Vec::new(),
            images: Vec::new(),
            styles: Vec::new(),
            file_names: NameRegistry::new(),
            image_names: NameRegistry::new(),
            style_names: NameRegistry::new(),
            default_style: Style::new("default"),
            cards: Vec::new(),
            card_names: NameRegistry::new(),
            item_names: NameRegistry::new(),
            deckcards: Vec::new(),
            base: Vec::new(),
            items: Vec::new(),
            plan: Vec::new(),
            misc: Vec::new(),
            characters: Vec::new(),
            icon_reference: CardId::new(0),
            default_card: CardId::new(0),
            default_item_card: CardId::new(0),
            default_location_card: CardId::new(0),
            locations: Vec::new(),
            location_names: NameRegistry::new(),
        };
        deck.default_card = deck.alloc_card(Card::background("default"));
        deck.default_item_card = deck.alloc_card(Card::background("defaultitem"));
        deck.default_location_card = deck.alloc_card(Card::background("defaultlocation"));
        deck.icon_reference = deck.alloc_card(Card::new("Icon Reference"));
        deck
    }

    fn alloc_card(&mut self, card: Card) -> CardId {
        let id = CardId::new(self.cards.len() as u32);
        self.card_names.register(card.name.clone(), id);
        self.cards.push(card);
        id
    }

    // =========================================================================
    // Canvas
    // =========================================================================

    /// Canvas size in pixels every face renders at.
    #[must_use]
    pub fn card_size(&self) -> (u32, u32) {
        self.card_size
    }

    pub fn set_card_size(&mut self, width: u32, height: u32) {
        self.card_size = (width.max(1), height.max(1));
    }

    // =========================================================================
    // Assets
    // =========================================================================

    /// Add a source file. Returns its index.
    pub fn add_file(&mut self, file: FileAsset) -> usize {
        let index = self.files.len();
        self.file_names.register(file.name.clone(), index);
        self.files.push(file);
        index
    }

    pub fn add_image(&mut self, image: ImageAsset) -> usize {
        let index = self.images.len();
        self.image_names.register(image.name.clone(), index);
        self.images.push(image);
        index
    }

    pub fn add_style(&mut self, style: Style) -> usize {
        let index = self.styles.len();
        self.style_names.register(style.name.clone(), index);
        self.styles.push(style);
        index
    }

    #[must_use]
    pub fn files(&self) -> &[FileAsset] {
        &self.files
    }

    #[must_use]
    pub fn images(&self) -> &[ImageAsset] {
        &self.images
    }

    #[must_use]
    pub fn styles(&self) -> &[Style] {
        &self.styles
    }

    /// Style used when a renderable names a style the deck lacks.
    #[must_use]
    pub fn default_style(&self) -> &Style {
        &self.default_style
    }

    #[must_use]
    pub fn find_file<'a>(&'a self, name: &str, default: Option<&'a FileAsset>) -> Option<&'a FileAsset> {
        or_default(self.file_names.get(name).map(|i| &self.files[i]), default, "file", name)
    }

    #[must_use]
    pub fn find_image<'a>(&'a self, name: &str, default: Option<&'a ImageAsset>) -> Option<&'a ImageAsset> {
        or_default(self.image_names.get(name).map(|i| &self.images[i]), default, "image", name)
    }

    #[must_use]
    pub fn find_style<'a>(&'a self, name: &str, default: Option<&'a Style>) -> Option<&'a Style> {
        or_default(self.style_names.get(name).map(|i| &self.styles[i]), default, "style", name)
    }

    /// Look up a style, warning and falling back to the default style.
    #[must_use]
    pub fn style_or_default(&self, name: &str) -> &Style {
        match self.find_style(name, None) {
            Some(style) => style,
            None => {
                tracing::warn!(style = %name, "unknown style, using default");
                &self.default_style
            }
        }
    }

    /// Pixels of a named image: its crop of its source file.
    ///
    /// `None` (with a warning) when the image, its file, or the file's
    /// decoded pixels are missing or the crop is empty.
    #[must_use]
    pub fn image_pixels(&self, name: &str) -> Option<RgbaImage> {
        let Some(image) = self.find_image(name, None) else {
            tracing::warn!(image = %name, "unknown image");
            return None;
        };
        let Some(pixels) = self
            .find_file(&image.file, None)
            .and_then(|f| f.pixels.as_ref())
        else {
            tracing::warn!(image = %name, file = %image.file, "no pixels for image source file");
            return None;
        };
        let crop = image.crop(pixels);
        if crop.is_none() {
            tracing::warn!(image = %name, rect = %image.rect, "image crop is empty");
        }
        crop
    }

    // =========================================================================
    // Cards
    // =========================================================================

    /// Append a card to one of the plain lists.
    pub fn add_card(&mut self, list: CardList, card: Card) -> CardId {
        let name = card.name.clone();
        let id = self.alloc_card(card);
        if list == CardList::Items {
            self.item_names.register(name, id);
        }
        self.list_mut(list).push(id);
        id
    }

    /// Append a new, empty location.
    pub fn add_location(&mut self, name: impl Into<String>) -> LocationId {
        let location = Location::new(name);
        let id = LocationId::new(self.locations.len() as u32);
        self.location_names.register(location.name.clone(), id);
        self.locations.push(location);
        id
    }

    /// Append a card to a location.
    pub fn add_location_card(&mut self, location: LocationId, card: Card) -> CardId {
        let id = self.alloc_card(card);
        self.locations[location.index()].cards.push(id);
        id
    }

    /// Replace a template card's content, keeping it a background card.
    pub fn set_template(&mut self, template: Template, mut card: Card) {
        card.background = true;
        let id = self.template(template);
        self.cards[id.index()] = card;
        self.rebuild_card_names();
    }

    /// Replace the icon-reference card's content.
    pub fn set_icon_reference(&mut self, card: Card) {
        self.cards[self.icon_reference.index()] = card;
        self.rebuild_card_names();
    }

    #[must_use]
    pub fn template(&self, template: Template) -> CardId {
        match template {
            Template::Default => self.default_card,
            Template::Item => self.default_item_card,
            Template::Location => self.default_location_card,
        }
    }

    #[must_use]
    pub fn icon_reference(&self) -> CardId {
        self.icon_reference
    }

    /// Get a card by id.
    ///
    /// Panics if the id was minted by another deck.
    #[must_use]
    pub fn card(&self, id: CardId) -> &Card {
        &self.cards[id.index()]
    }

    #[must_use]
    pub fn get_card(&self, id: CardId) -> Option<&Card> {
        self.cards.get(id.index())
    }

    pub fn card_mut(&mut self, id: CardId) -> &mut Card {
        &mut self.cards[id.index()]
    }

    /// Every card including templates, in allocation order.
    pub fn all_cards(&self) -> impl Iterator<Item = (CardId, &Card)> {
        self.cards
            .iter()
            .enumerate()
            .map(|(i, c)| (CardId::new(i as u32), c))
    }

    #[must_use]
    pub fn list(&self, list: CardList) -> &[CardId] {
        match list {
            CardList::DeckCards => &self.deckcards,
            CardList::Base => &self.base,
            CardList::Items => &self.items,
            CardList::Plan => &self.plan,
            CardList::Misc => &self.misc,
            CardList::Characters => &self.characters,
        }
    }

    fn list_mut(&mut self, list: CardList) -> &mut Vec<CardId> {
        match list {
            CardList::DeckCards => &mut self.deckcards,
            CardList::Base => &mut self.base,
            CardList::Items => &mut self.items,
            CardList::Plan => &mut self.plan,
            CardList::Misc => &mut self.misc,
            CardList::Characters => &mut self.characters,
        }
    }

    #[must_use]
    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    #[must_use]
    pub fn location(&self, id: LocationId) -> &Location {
        &self.locations[id.index()]
    }

    /// Look up any card (including templates) by name.
    #[must_use]
    pub fn find_card<'a>(&'a self, name: &str, default: Option<&'a Card>) -> Option<&'a Card> {
        or_default(self.find_card_id(name).map(|id| self.card(id)), default, "card", name)
    }

    #[must_use]
    pub fn find_card_id(&self, name: &str) -> Option<CardId> {
        self.card_names.get(name)
    }

    /// Look up a card in the items list by name.
    #[must_use]
    pub fn find_item<'a>(&'a self, name: &str, default: Option<&'a Card>) -> Option<&'a Card> {
        or_default(self.item_names.get(name).map(|id| self.card(id)), default, "item", name)
    }

    #[must_use]
    pub fn find_location<'a>(&'a self, name: &str, default: Option<&'a Location>) -> Option<&'a Location> {
        let found = self.location_names.get(name).map(|id| self.location(id));
        or_default(found, default, "location", name)
    }

    /// Rebuild the card and item name indexes in category order.
    ///
    /// Needed after a card is replaced in place, since its name may differ.
    pub fn rebuild_card_names(&mut self) {
        self.card_names.clear();
        self.item_names.clear();
        let ordered: Vec<CardId> = CardList::ALL
            .iter()
            .flat_map(|&list| self.list(list).iter().copied())
            .chain(std::iter::once(self.icon_reference))
            .chain(self.locations.iter().flat_map(|l| l.cards.iter().copied()))
            .chain(Template::ALL.iter().map(|&t| self.template(t)))
            .collect();
        for id in ordered {
            self.card_names.register(self.cards[id.index()].name.clone(), id);
        }
        for &id in &self.items {
            self.item_names.register(self.cards[id.index()].name.clone(), id);
        }
    }

    // =========================================================================
    // Numbering
    // =========================================================================

    /// Assign card numbers, background cards and locations.
    ///
    /// Walks `CardCategory::ORDER`. Deck cards are unnumbered: they all get
    /// global number 1 and do not advance the counter. Every other card takes
    /// the next global number (starting at 1) and a local number restarting
    /// at 1 per category. Each location takes the next global number itself,
    /// then its members are numbered with local numbers restarting at 1.
    /// Template cards are reset to 0 with no background.
    pub fn renumber_entities(&mut self) {
        let mut global = 1;

        for &id in &self.deckcards {
            let card = &mut self.cards[id.index()];
            card.card_number = 1;
            card.local_card_number = 1;
            card.background_card = None;
            card.location = None;
        }

        let lists = [
            (&self.base, self.default_card),
            (&self.items, self.default_item_card),
            (&self.plan, self.default_card),
            (&self.misc, self.default_card),
            (&self.characters, self.default_card),
        ];
        for (ids, background) in lists {
            let mut local = 1;
            for &id in ids {
                let card = &mut self.cards[id.index()];
                card.card_number = global;
                card.local_card_number = local;
                card.background_card = Some(background);
                card.location = None;
                global += 1;
                local += 1;
            }
        }

        let reference = &mut self.cards[self.icon_reference.index()];
        reference.card_number = global;
        reference.local_card_number = 1;
        reference.background_card = Some(self.default_card);
        reference.location = None;
        global += 1;

        for (index, location) in self.locations.iter_mut().enumerate() {
            location.card_number = global;
            location.local_card_number = index as i32 + 1;
            global += 1;
            let mut local = 1;
            for &id in &location.cards {
                let card = &mut self.cards[id.index()];
                card.card_number = global;
                card.local_card_number = local;
                card.background_card = Some(self.default_location_card);
                card.location = Some(LocationId::new(index as u32));
                global += 1;
                local += 1;
            }
        }

        for template in Template::ALL {
            let id = self.template(template);
            let card = &mut self.cards[id.index()];
            card.background = true;
            card.card_number = 0;
            card.local_card_number = 0;
            card.background_card = None;
            card.location = None;
        }

        tracing::debug!(last_number = global - 1, "renumbered deck");
    }

    /// Every card to render, in output order, with its render context.
    ///
    /// Reads the background and location assigned by `renumber_entities`.
    #[must_use]
    pub fn render_order(&self) -> Vec<RenderEntry> {
        let entry = |id: CardId| {
            let card = self.card(id);
            RenderEntry {
                card: id,
                background: card.background_card,
                location: card.location,
            }
        };
        CardList::ALL
            .iter()
            .flat_map(|&list| self.list(list).iter().copied())
            .chain(std::iter::once(self.icon_reference))
            .chain(self.locations.iter().flat_map(|l| l.cards.iter().copied()))
            .map(entry)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Rect, Rgba};
    use crate::deck::FileSource;

    fn sample_deck() -> Deck {
        let mut deck = Deck::new("sample");
        deck.add_card(CardList::DeckCards, Card::new("cover"));
        deck.add_card(CardList::DeckCards, Card::new("rules"));
        deck.add_card(CardList::Base, Card::new("b1"));
        deck.add_card(CardList::Base, Card::new("b2"));
        deck.add_card(CardList::Items, Card::new("sword"));
        deck.add_card(CardList::Plan, Card::new("plan"));
        deck.add_card(CardList::Characters, Card::new("hero"));
        let cave = deck.add_location("cave");
        deck.add_location_card(cave, Card::new("cave1"));
        deck.add_location_card(cave, Card::new("cave2"));
        let tower = deck.add_location("tower");
        deck.add_location_card(tower, Card::new("tower1"));
        deck
    }

    fn numbers(deck: &Deck, name: &str) -> (i32, i32) {
        let card = deck.find_card(name, None).unwrap();
        (card.card_number, card.local_card_number)
    }

    #[test]
    fn test_new_deck_has_templates() {
        let deck = Deck::new("d");
        for t in Template::ALL {
            assert!(deck.card(deck.template(t)).background);
        }
        assert_eq!(deck.card(deck.icon_reference()).name, "Icon Reference");
        assert_eq!(deck.card_size(), DEFAULT_CARD_SIZE);
    }

    #[test]
    fn test_renumber_global_and_local() {
        let mut deck = sample_deck();
        deck.renumber_entities();

        assert_eq!(numbers(&deck, "cover"), (1, 1));
        assert_eq!(numbers(&deck, "rules"), (1, 1));
        assert_eq!(numbers(&deck, "b1"), (1, 1));
        assert_eq!(numbers(&deck, "b2"), (2, 2));
        assert_eq!(numbers(&deck, "sword"), (3, 1));
        assert_eq!(numbers(&deck, "plan"), (4, 1));
        assert_eq!(numbers(&deck, "hero"), (5, 1));
        assert_eq!(numbers(&deck, "Icon Reference"), (6, 1));

        let cave = deck.find_location("cave", None).unwrap();
        assert_eq!((cave.card_number, cave.local_card_number), (7, 1));
        assert_eq!(numbers(&deck, "cave1"), (8, 1));
        assert_eq!(numbers(&deck, "cave2"), (9, 2));

        let tower = deck.find_location("tower", None).unwrap();
        assert_eq!((tower.card_number, tower.local_card_number), (10, 2));
        assert_eq!(numbers(&deck, "tower1"), (11, 1));
    }

    #[test]
    fn test_renumber_assigns_backgrounds_and_locations() {
        let mut deck = sample_deck();
        deck.renumber_entities();

        let default = deck.template(Template::Default);
        let item = deck.template(Template::Item);
        let location = deck.template(Template::Location);

        assert_eq!(deck.find_card("cover", None).unwrap().background_card, None);
        assert_eq!(deck.find_card("b1", None).unwrap().background_card, Some(default));
        assert_eq!(deck.find_card("sword", None).unwrap().background_card, Some(item));
        let cave1 = deck.find_card("cave1", None).unwrap();
        assert_eq!(cave1.background_card, Some(location));
        assert_eq!(cave1.location, Some(LocationId::new(0)));
        assert_eq!(
            deck.find_card("tower1", None).unwrap().location,
            Some(LocationId::new(1))
        );
        assert_eq!(deck.card(default).card_number, 0);
    }

    #[test]
    fn test_renumber_is_stable() {
        let mut deck = sample_deck();
        deck.renumber_entities();
        let first: Vec<_> = deck.all_cards().map(|(_, c)| c.clone()).collect();
        deck.renumber_entities();
        let second: Vec<_> = deck.all_cards().map(|(_, c)| c.clone()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_render_order() {
        let mut deck = sample_deck();
        deck.renumber_entities();
        let names: Vec<_> = deck
            .render_order()
            .iter()
            .map(|e| deck.card(e.card).name.clone())
            .collect();
        assert_eq!(
            names,
            vec![
                "cover", "rules", "b1", "b2", "sword", "plan", "hero",
                "Icon Reference", "cave1", "cave2", "tower1"
            ]
        );
    }

    #[test]
    fn test_find_with_fallbacks() {
        let deck = sample_deck();
        let fallback = deck.find_card("hero", None).unwrap();
        assert_eq!(deck.find_card("nobody", Some(fallback)).unwrap().name, "hero");
        assert!(deck.find_card("nobody", None).is_none());

        // items only see the items list
        assert!(deck.find_item("sword", None).is_some());
        assert_eq!(deck.find_item("hero", Some(fallback)).unwrap().name, "hero");
        assert!(deck.find_item("b1", None).is_none());

        // templates are findable as cards
        assert!(deck.find_card("default", None).unwrap().background);
    }

    #[test]
    fn test_style_lookup() {
        let mut deck = Deck::new("d");
        deck.add_style(Style::new("body").with_typesize(12.0));
        assert_eq!(deck.style_or_default("body").typesize, 12.0);
        assert_eq!(deck.style_or_default("missing").name, "default");
        let fallback = Style::new("fb");
        assert_eq!(deck.find_style("missing", Some(&fallback)).unwrap().name, "fb");
    }

    #[test]
    fn test_image_pixels() {
        let mut deck = Deck::new("d");
        let mut pixels = RgbaImage::new(20, 10);
        pixels.put_pixel(5, 5, image::Rgba(Rgba::WHITE.0));
        deck.add_file(FileAsset::new("sheet", FileSource::Embedded(Vec::new())).with_pixels(pixels));
        deck.add_file(FileAsset::new("broken", FileSource::Path("nope.png".into())));
        deck.add_image(ImageAsset::new("crop", "sheet").with_rect(Rect::new(5.0, 5.0, 4.0, -1.0)));
        deck.add_image(ImageAsset::new("orphan", "broken"));

        let crop = deck.image_pixels("crop").unwrap();
        assert_eq!(crop.dimensions(), (4, 5));
        assert_eq!(crop.get_pixel(0, 0).0, Rgba::WHITE.0);
        assert!(deck.image_pixels("orphan").is_none());
        assert!(deck.image_pixels("missing").is_none());
    }

    #[test]
    fn test_set_template_reindexes_names() {
        let mut deck = Deck::new("d");
        deck.set_template(Template::Item, Card::new("itemframe"));
        let id = deck.find_card_id("itemframe").unwrap();
        assert_eq!(id, deck.template(Template::Item));
        assert!(deck.card(id).background);
        assert!(deck.find_card("defaultitem", None).is_none());
    }
}
