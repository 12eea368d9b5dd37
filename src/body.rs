//! Bodies and the arena that owns them
//!
//! A body is one axis-aligned rectangle with a tag, a per-tag response map
//! and a cached list of the grid cells it currently overlaps. Callers never
//! hold bodies directly; they hold `BodyKey` handles into a generational
//! arena, so a key left over from a removed body can never alias a body
//! that later reuses the same slot.

use std::collections::HashMap;

use crate::geom::Rect;

/// Opaque handle to a body: arena slot plus generation counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyKey {
    index: u32,
    generation: u32,
}

#[derive(Debug)]
pub(crate) struct Body {
    pub tag: String,
    pub rect: Rect,
    /// Static bodies never change cell membership after creation.
    pub is_static: bool,
    /// Cached membership: exactly the grid cells `rect` overlaps. The grid
    /// owns placement; this cache exists for O(cells) removal.
    pub cells: Vec<(i32, i32)>,
    /// other tag -> response name; falls back to "default", then to the
    /// world-wide default.
    pub responses: HashMap<String, String>,
}

impl Body {
    pub fn new(tag: &str, rect: Rect, is_static: bool) -> Self {
        Self {
            tag: tag.to_string(),
            rect,
            is_static,
            cells: Vec::new(),
            responses: HashMap::new(),
        }
    }

    /// Response name to use against a body tagged `other_tag`.
    pub fn response_for<'a>(&'a self, other_tag: &str, world_default: &'a str) -> &'a str {
        self.responses
            .get(other_tag)
            .or_else(|| self.responses.get("default"))
            .map(String::as_str)
            .unwrap_or(world_default)
    }

    /// Tag allow-list check; an empty list admits every tag.
    pub fn has_tag(&self, tags: &[&str]) -> bool {
        tags.is_empty() || tags.iter().any(|t| *t == self.tag)
    }
}

#[derive(Debug, Default)]
pub(crate) struct BodyArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    body: Option<Body>,
}

impl BodyArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn insert(&mut self, body: Body) -> BodyKey {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.body = Some(body);
            BodyKey {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                body: Some(body),
            });
            BodyKey {
                index,
                generation: 0,
            }
        }
    }

    pub fn get(&self, key: BodyKey) -> Option<&Body> {
        let slot = self.slots.get(key.index as usize)?;
        if slot.generation != key.generation {
            return None;
        }
        slot.body.as_ref()
    }

    pub fn get_mut(&mut self, key: BodyKey) -> Option<&mut Body> {
        let slot = self.slots.get_mut(key.index as usize)?;
        if slot.generation != key.generation {
            return None;
        }
        slot.body.as_mut()
    }

    /// Frees the slot and bumps its generation so the key goes stale.
    pub fn remove(&mut self, key: BodyKey) -> Option<Body> {
        let slot = self.slots.get_mut(key.index as usize)?;
        if slot.generation != key.generation {
            return None;
        }
        let body = slot.body.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(key.index);
        self.len -= 1;
        Some(body)
    }

    pub fn contains(&self, key: BodyKey) -> bool {
        self.get(key).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(tag: &str) -> Body {
        Body::new(tag, Rect::new(0.0, 0.0, 10.0, 10.0), false)
    }

    #[test]
    fn test_arena_insert_get() {
        let mut arena = BodyArena::new();
        let a = arena.insert(body("player"));
        let b = arena.insert(body("block"));
        assert_ne!(a, b);
        assert_eq!(arena.get(a).unwrap().tag, "player");
        assert_eq!(arena.get(b).unwrap().tag, "block");
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn test_arena_generational_reuse() {
        let mut arena = BodyArena::new();
        let a = arena.insert(body("player"));
        assert!(arena.remove(a).is_some());
        assert!(!arena.contains(a));

        // the slot is reused but the stale key stays dead
        let b = arena.insert(body("block"));
        assert_ne!(a, b);
        assert!(arena.get(a).is_none());
        assert!(arena.remove(a).is_none());
        assert_eq!(arena.get(b).unwrap().tag, "block");
    }

    #[test]
    fn test_response_fallback_chain() {
        let mut b = body("grenade");
        b.responses.insert("block".to_string(), "bounce".to_string());
        b.responses.insert("default".to_string(), "cross".to_string());

        assert_eq!(b.response_for("block", "slide"), "bounce");
        assert_eq!(b.response_for("player", "slide"), "cross");

        b.responses.remove("default");
        assert_eq!(b.response_for("player", "slide"), "slide");
    }

    #[test]
    fn test_has_tag() {
        let b = body("coin");
        assert!(b.has_tag(&[]));
        assert!(b.has_tag(&["block", "coin"]));
        assert!(!b.has_tag(&["block", "player"]));
    }
}
