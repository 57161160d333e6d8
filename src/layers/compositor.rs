//! Deterministic paint order for the renderables of a face.
//!
//! A normal card face occupies the order space starting at 0. A background
//! (template) face is split by each renderable's `underlay` flag:
//!
//! | partition | first order | painted                        |
//! |-----------|-------------|--------------------------------|
//! | underlay  | -100        | before the foreground card     |
//! | core      | 0           | normal card content            |
//! | overlay   | +100        | after the foreground card      |
//!
//! Within a partition, insertion order is kept and orders step by 0.1. A
//! partition with more than 990 renderables uses a smaller step so that it
//! still ends inside its 100-wide band.
//! A renderable that expands into several primitives gives them orders
//! `order`, `order - 0.001`, `order - 0.002`, ... so they stay contiguous.

use serde::{Deserialize, Serialize};

use crate::deck::{Deck, Face, FaceSide, Renderable};

pub const UNDERLAY_BASE: f32 = -100.0;
pub const CORE_BASE: f32 = 0.0;
pub const OVERLAY_BASE: f32 = 100.0;

/// Order distance between consecutive renderables of a partition.
pub const ORDER_STEP: f32 = 0.1;

/// Order range a partition's renderables may spread over.
pub const PARTITION_SPAN: f32 = 99.0;

/// Order distance between consecutive primitives of one renderable.
pub const SUB_Z_STEP: f32 = 0.001;

/// Paint-order partition of a renderable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Partition {
    Underlay,
    Core,
    Overlay,
}

impl Partition {
    /// Partition of `renderable` on a face that is (or is not) a background.
    #[must_use]
    pub fn of(renderable: &Renderable, background: bool) -> Self {
        match (background, renderable.underlay) {
            (false, _) => Partition::Core,
            (true, true) => Partition::Underlay,
            (true, false) => Partition::Overlay,
        }
    }

    #[must_use]
    pub const fn base(self) -> f32 {
        match self {
            Partition::Underlay => UNDERLAY_BASE,
            Partition::Core => CORE_BASE,
            Partition::Overlay => OVERLAY_BASE,
        }
    }
}

/// Paint order of the primitive at `index` of a renderable with `order`.
#[must_use]
pub fn primitive_z(order: f32, index: usize) -> f32 {
    order - SUB_Z_STEP * index as f32
}

impl Face {
    /// Renumber every renderable's `order` for painting.
    ///
    /// `background` selects the underlay/overlay split used by template
    /// cards; normal faces put everything in the core partition.
    pub fn recompute_renderable_order(&mut self, background: bool) {
        let mut totals = [0usize; 3];
        for renderable in &self.renderables {
            totals[Partition::of(renderable, background) as usize] += 1;
        }
        let steps = totals.map(|n| ORDER_STEP.min(PARTITION_SPAN / n.max(1) as f32));

        let mut counts = [0usize; 3];
        for renderable in &mut self.renderables {
            let partition = Partition::of(renderable, background);
            let slot = &mut counts[partition as usize];
            renderable.order = partition.base() + steps[partition as usize] * *slot as f32;
            *slot += 1;
        }
    }
}

impl Deck {
    /// Recompute the paint order of both faces of every card.
    ///
    /// Template cards use the underlay/overlay split.
    pub fn recompute_render_orders(&mut self) {
        let ids: Vec<_> = self.all_cards().map(|(id, _)| id).collect();
        for id in ids {
            let card = self.card_mut(id);
            let background = card.background;
            for side in [FaceSide::Top, FaceSide::Bottom] {
                card.face_mut(side).recompute_renderable_order(background);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face(underlays: &[bool]) -> Face {
        let mut face = Face::new();
        for (i, &u) in underlays.iter().enumerate() {
            face.push(Renderable::rect(format!("r{i}"), "s").underlay(u));
        }
        face
    }

    fn orders(face: &Face) -> Vec<f32> {
        face.renderables.iter().map(|r| r.order).collect()
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_normal_face_ignores_underlay() {
        let mut f = face(&[true, false, true]);
        f.recompute_renderable_order(false);
        let o = orders(&f);
        assert!(close(o[0], 0.0) && close(o[1], 0.1) && close(o[2], 0.2));
    }

    #[test]
    fn test_background_face_partitions() {
        let mut f = face(&[false, true, false, true]);
        f.recompute_renderable_order(true);
        let o = orders(&f);
        assert!(close(o[0], 100.0));
        assert!(close(o[1], -100.0));
        assert!(close(o[2], 100.1));
        assert!(close(o[3], -99.9));
    }

    #[test]
    fn test_crowded_partition_stays_in_band() {
        let mut underlays = vec![true; 5000];
        underlays.extend([false; 3]);
        let mut f = face(&underlays);
        f.recompute_renderable_order(true);
        let o = orders(&f);
        assert!(close(o[0], -100.0));
        assert!(o[4999] < -1.0);
        assert!(o.windows(2).take(4999).all(|w| w[1] > w[0]));
        // the small overlay keeps the regular step
        assert!(close(o[5000], 100.0) && close(o[5002], 100.2));
    }

    #[test]
    fn test_recompute_overwrites_stale_orders() {
        let mut f = face(&[false, false]);
        f.renderables[0].order = 55.0;
        f.renderables[1].order = -3.0;
        f.recompute_renderable_order(false);
        assert!(orders(&f)[0] < orders(&f)[1]);
    }

    #[test]
    fn test_primitive_z() {
        assert!(close(primitive_z(0.1, 0), 0.1));
        assert!(close(primitive_z(0.1, 9), 0.091));
        // ten primitives never reach the previous renderable's order
        assert!(primitive_z(0.1, 9) > 0.0);
    }

    #[test]
    fn test_deck_recompute_uses_background_flag() {
        use crate::deck::{Card, CardList, Template};

        let mut deck = Deck::new("d");
        let face = Face::new().with(Renderable::rect("a", "s").underlay(true));
        let id = deck.add_card(CardList::Base, Card::new("c").with_top(face.clone()));
        deck.set_template(Template::Default, Card::background("default").with_top(face));
        deck.recompute_render_orders();

        assert!(close(deck.card(id).top_face.renderables[0].order, 0.0));
        let template = deck.card(deck.template(Template::Default));
        assert!(close(template.top_face.renderables[0].order, -100.0));
    }

    #[test]
    fn test_partition_of() {
        let under = Renderable::rect("a", "s").underlay(true);
        assert_eq!(Partition::of(&under, true), Partition::Underlay);
        assert_eq!(Partition::of(&under, false), Partition::Core);
        let over = Renderable::rect("b", "s");
        assert_eq!(Partition::of(&over, true), Partition::Overlay);
    }
}
