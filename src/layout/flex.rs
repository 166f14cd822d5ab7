//! # Flex Distribution Utilities
//!
//! Helper functions for the flexbox algorithm. The main per-line logic lives
//! in the layout engine; this module provides the lower-level distribution
//! calculations so they can be tested without building a tree.

use super::style::{Align, Justify};
use super::value::{bound, floats_equal};

/// A flexible child as seen by the distribution step.
#[derive(Debug, Clone, Copy)]
pub struct FlexItem {
    /// Flex factor, always > 0.
    pub flex: f64,
    /// Padding + border along the main axis. Every share is added on top.
    pub padding_and_border: f64,
    pub min: f64,
    pub max: f64,
}

impl FlexItem {
    fn size_for(&self, share: f64) -> f64 {
        share * self.flex + self.padding_and_border
    }
}

/// Split `remaining` main-axis space among `items` in proportion to their
/// flex factors, honouring min/max.
///
/// An item whose proportional size violates its bounds is frozen at the
/// clamped size and taken out of the pool; the rest is redistributed until
/// no further item gets clamped. Negative space is treated as none, so
/// items then collapse to their padding + border.
pub fn resolve_flexible_sizes(items: &[FlexItem], remaining: f64) -> Vec<f64> {
    let mut frozen: Vec<Option<f64>> = vec![None; items.len()];
    let mut remaining = remaining;
    let mut total_flex: f64 = items.iter().map(|item| item.flex).sum();

    loop {
        let share = share_of(remaining, total_flex);
        let mut clamped_any = false;

        for (item, slot) in items.iter().zip(frozen.iter_mut()) {
            if slot.is_some() {
                continue;
            }
            let base = item.size_for(share);
            let bounded = bound(base, item.min, item.max);
            if !floats_equal(base, bounded) {
                *slot = Some(bounded);
                // padding + border was already reserved by the caller
                remaining -= bounded - item.padding_and_border;
                total_flex -= item.flex;
                clamped_any = true;
            }
        }

        if !clamped_any {
            break;
        }
    }

    let share = share_of(remaining, total_flex).max(0.0);
    items
        .iter()
        .zip(frozen)
        .map(|(item, slot)| slot.unwrap_or_else(|| bound(item.size_for(share), item.min, item.max)))
        .collect()
}

fn share_of(remaining: f64, total_flex: f64) -> f64 {
    if total_flex > 0.0 {
        remaining / total_flex
    } else {
        0.0
    }
}

/// Leading offset and gap between items for a line without flexible
/// children. `count` is the number of in-flow items on the line.
pub fn justify_offsets(justify: Justify, remaining: f64, count: usize) -> (f64, f64) {
    match justify {
        Justify::FlexStart => (0.0, 0.0),
        Justify::Center => (remaining / 2.0, 0.0),
        Justify::FlexEnd => (remaining, 0.0),
        Justify::SpaceBetween => {
            if count > 1 {
                (0.0, remaining.max(0.0) / (count - 1) as f64)
            } else {
                (0.0, 0.0)
            }
        }
        Justify::SpaceAround => {
            if count == 0 {
                return (0.0, 0.0);
            }
            // edges get half the space found between items
            let between = remaining / count as f64;
            (between / 2.0, between)
        }
    }
}

/// Lead added before the first line and extra cross size added to every
/// line when distributing `remaining` cross space over `line_count` lines.
pub fn align_content_offsets(align: Align, remaining: f64, line_count: usize) -> (f64, f64) {
    match align {
        Align::FlexEnd => (remaining, 0.0),
        Align::Center => (remaining / 2.0, 0.0),
        Align::Stretch if remaining > 0.0 && line_count > 0 => (0.0, remaining / line_count as f64),
        _ => (0.0, 0.0),
    }
}
