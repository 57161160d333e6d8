//! Per-render-pass primitive table.
//!
//! Model objects never hold drawing handles. Instead, each render pass
//! builds a `PrimitiveTable` that maps a renderable's identity (card, face
//! side and position in the face) to the primitives it expanded into, each
//! tagged with its paint order. The table is dropped when the pass ends.

use std::ops::Range;

use rustc_hash::FxHashMap;

use crate::deck::{CardId, Face, FaceSide};

use super::compositor::primitive_z;
use super::primitive::{expand_renderable, ExpandContext, Primitive, Primitives};

/// Identity of a renderable within a deck.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RenderableKey {
    pub card: CardId,
    pub side: FaceSide,
    /// Position in the face's renderable list.
    pub index: usize,
}

/// A primitive with its paint order.
#[derive(Clone, Debug, PartialEq)]
pub struct ScenePrimitive {
    pub z: f32,
    pub primitive: Primitive,
}

/// Primitives of one render pass, indexed by renderable.
#[derive(Clone, Debug, Default)]
pub struct PrimitiveTable {
    items: Vec<ScenePrimitive>,
    index: FxHashMap<RenderableKey, Range<usize>>,
}

impl PrimitiveTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the primitives of one renderable, assigning sub-z values from
    /// `order` downward. Replaces an earlier entry for the same key.
    pub fn insert(&mut self, key: RenderableKey, order: f32, primitives: Primitives) {
        let start = self.items.len();
        self.items.extend(
            primitives
                .into_iter()
                .enumerate()
                .map(|(i, primitive)| ScenePrimitive {
                    z: primitive_z(order, i),
                    primitive,
                }),
        );
        self.index.insert(key, start..self.items.len());
    }

    /// Expand and record every renderable of `face`.
    ///
    /// Orders must already be computed (`Face::recompute_renderable_order`).
    pub fn add_face(&mut self, card: CardId, side: FaceSide, face: &Face, ctx: &ExpandContext<'_>) {
        for (index, renderable) in face.renderables.iter().enumerate() {
            let primitives = expand_renderable(renderable, ctx);
            tracing::trace!(
                card = %card,
                renderable = %renderable.name,
                primitives = primitives.len(),
                "expanded renderable"
            );
            self.insert(RenderableKey { card, side, index }, renderable.order, primitives);
        }
    }

    /// Primitives recorded for `key`, top to bottom.
    #[must_use]
    pub fn get(&self, key: &RenderableKey) -> &[ScenePrimitive] {
        self.index
            .get(key)
            .and_then(|range| self.items.get(range.clone()))
            .unwrap_or(&[])
    }

    #[must_use]
    pub fn contains(&self, key: &RenderableKey) -> bool {
        self.index.contains_key(key)
    }

    /// Number of primitives.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Every primitive, bottom first. Ties keep insertion order.
    #[must_use]
    pub fn paint_order(&self) -> Vec<&ScenePrimitive> {
        let mut sorted: Vec<&ScenePrimitive> = self.items.iter().collect();
        sorted.sort_by(|a, b| a.z.total_cmp(&b.z));
        sorted
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.index.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Rect, Rgba};
    use crate::deck::LineStyle;
    use crate::layers::primitive::Backdrop;
    use smallvec::smallvec;

    fn rect(fill: u8) -> Primitive {
        Primitive::Rect(Backdrop {
            rect: Rect::new(0.0, 0.0, 1.0, 1.0),
            rotation: 0.0,
            fill: Rgba::new(fill, 0, 0, 255),
            border: Rgba::TRANSPARENT,
            thickness: 0.0,
            linestyle: LineStyle::Solid,
        })
    }

    fn key(index: usize) -> RenderableKey {
        RenderableKey {
            card: CardId::new(0),
            side: FaceSide::Top,
            index,
        }
    }

    #[test]
    fn test_insert_assigns_sub_z() {
        let mut table = PrimitiveTable::new();
        table.insert(key(0), 0.5, smallvec![rect(1), rect(2), rect(3)]);
        let prims = table.get(&key(0));
        assert_eq!(prims.len(), 3);
        assert!(prims[0].z > prims[1].z && prims[1].z > prims[2].z);
        assert!((prims[2].z - 0.498).abs() < 1e-5);
    }

    #[test]
    fn test_paint_order_keeps_renderables_contiguous() {
        let mut table = PrimitiveTable::new();
        table.insert(key(1), 0.1, smallvec![rect(10), rect(11)]);
        table.insert(key(0), 0.0, smallvec![rect(0), rect(1)]);
        table.insert(key(2), -100.0, smallvec![rect(20)]);
        let fills: Vec<u8> = table
            .paint_order()
            .iter()
            .map(|p| match &p.primitive {
                Primitive::Rect(b) => b.fill.0[0],
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(fills, vec![20, 1, 0, 11, 10]);
    }

    #[test]
    fn test_missing_key_is_empty() {
        let table = PrimitiveTable::new();
        assert!(table.get(&key(7)).is_empty());
        assert!(!table.contains(&key(7)));
        assert!(table.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut table = PrimitiveTable::new();
        table.insert(key(0), 0.0, smallvec![rect(0)]);
        table.clear();
        assert_eq!(table.len(), 0);
        assert!(!table.contains(&key(0)));
    }
}
