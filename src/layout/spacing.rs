//! # Spacing
//!
//! Margin, padding and border are each a [`Spacing`] block with nine
//! independently settable slots. Reading an edge resolves aliases in a fixed
//! order:
//!
//! 1. the edge itself, if it was set
//! 2. its axis pair (`Vertical` for top/bottom, `Horizontal` otherwise)
//! 3. `All`
//! 4. a default registered with [`Spacing::set_default`]
//! 5. `0`, or undefined for `Start`/`End`
//!
//! `Start`/`End` are the direction-aware edges. The layout engine reads them
//! through [`Spacing::get_with_fallback`] so that an unset `Start` falls back
//! to the physical edge for the resolved direction.

use super::value::{floats_equal, is_undefined, UNDEFINED};

/// A logical spacing slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Left = 0,
    Top = 1,
    Right = 2,
    Bottom = 3,
    Vertical = 4,
    Horizontal = 5,
    Start = 6,
    End = 7,
    All = 8,
}

impl Edge {
    pub const COUNT: usize = 9;

    /// The four physical edges, in layout position order.
    pub const PHYSICAL: [Edge; 4] = [Edge::Left, Edge::Top, Edge::Right, Edge::Bottom];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    fn flag(self) -> u16 {
        1 << (self as u16)
    }

    fn axis_pair(self) -> Option<Edge> {
        match self {
            Edge::Top | Edge::Bottom | Edge::Vertical => Some(Edge::Vertical),
            Edge::Left | Edge::Right | Edge::Horizontal | Edge::Start | Edge::End => {
                Some(Edge::Horizontal)
            }
            Edge::All => None,
        }
    }

    fn is_directional(self) -> bool {
        matches!(self, Edge::Start | Edge::End)
    }
}

#[derive(Debug, Clone)]
pub struct Spacing {
    values: [f64; Edge::COUNT],
    defaults: Option<[f64; Edge::COUNT]>,
    /// One bit per slot holding a defined value.
    flags: u16,
    has_aliases: bool,
}

impl Default for Spacing {
    fn default() -> Self {
        Self {
            values: [UNDEFINED; Edge::COUNT],
            defaults: None,
            flags: 0,
            has_aliases: false,
        }
    }
}

impl Spacing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a slot. Returns `true` if the stored value changed.
    pub fn set(&mut self, edge: Edge, value: f64) -> bool {
        if floats_equal(self.values[edge.index()], value) {
            return false;
        }
        self.values[edge.index()] = value;
        if is_undefined(value) {
            self.flags &= !edge.flag();
        } else {
            self.flags |= edge.flag();
        }
        self.has_aliases = self.flags
            & (Edge::All.flag() | Edge::Vertical.flag() | Edge::Horizontal.flag())
            != 0;
        true
    }

    /// Register a fallback used when neither the edge nor any alias is set.
    /// Returns `true` if the default changed.
    pub fn set_default(&mut self, edge: Edge, value: f64) -> bool {
        let defaults = self.defaults.get_or_insert_with(|| {
            let mut d = [0.0; Edge::COUNT];
            d[Edge::Start.index()] = UNDEFINED;
            d[Edge::End.index()] = UNDEFINED;
            d
        });
        if floats_equal(defaults[edge.index()], value) {
            return false;
        }
        defaults[edge.index()] = value;
        true
    }

    /// Resolve an edge through the alias chain.
    pub fn get(&self, edge: Edge) -> f64 {
        let default = match &self.defaults {
            Some(defaults) => defaults[edge.index()],
            None if edge.is_directional() => UNDEFINED,
            None => 0.0,
        };

        if self.flags == 0 {
            return default;
        }
        if self.flags & edge.flag() != 0 {
            return self.values[edge.index()];
        }
        if self.has_aliases {
            if let Some(pair) = edge.axis_pair() {
                if self.flags & pair.flag() != 0 {
                    return self.values[pair.index()];
                }
            }
            if self.flags & Edge::All.flag() != 0 {
                return self.values[Edge::All.index()];
            }
        }
        default
    }

    /// The value stored in a slot, ignoring aliases and defaults.
    pub fn get_raw(&self, edge: Edge) -> f64 {
        self.values[edge.index()]
    }

    /// `edge`'s own value if it was set, otherwise `get(fallback)`.
    pub fn get_with_fallback(&self, edge: Edge, fallback: Edge) -> f64 {
        if self.flags & edge.flag() != 0 {
            self.values[edge.index()]
        } else {
            self.get(fallback)
        }
    }

    pub fn is_set(&self, edge: Edge) -> bool {
        self.flags & edge.flag() != 0
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
