use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, warn};

use crate::geometry::Roi;
use crate::viewer::ShapeLayer;

use super::{Result, RoiStackIndex, StackError, StackId};

/// What a shape-layer edit turned out to be, as seen from the last snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum ShapeChange {
    Unchanged,
    Added {
        first: usize,
        count: usize,
    },
    /// `propagated` other stack members were given the moved footprint.
    Moved {
        index: usize,
        stack: Option<StackId>,
        propagated: usize,
    },
    /// `removed` holds snapshot positions, stack siblings included.
    Deleted {
        removed: Vec<usize>,
        stacks: Vec<StackId>,
    },
}

/// Counts and first diverging position between a snapshot and the live list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerDiff {
    pub previous_count: usize,
    pub current_count: usize,
    pub divergent: Option<usize>,
}

impl LayerDiff {
    pub fn between(previous: &[Roi], current: &[Roi]) -> Self {
        Self {
            previous_count: previous.len(),
            current_count: current.len(),
            divergent: first_divergent_index(previous, current),
        }
    }
}

/// First position, within the common length, whose geometry differs once
/// rounded to integers.
pub fn first_divergent_index(previous: &[Roi], current: &[Roi]) -> Option<usize> {
    previous
        .iter()
        .zip(current)
        .position(|(before, after)| !before.same_rounded(after))
}

/// Snapshot positions missing from `current`, assuming `current` is the
/// snapshot with some entries taken out. `None` if it is not.
fn removed_positions(previous: &[Roi], current: &[Roi]) -> Option<BTreeSet<usize>> {
    let mut live = current.iter().peekable();
    let mut removed = BTreeSet::new();
    for (index, roi) in previous.iter().enumerate() {
        match live.peek() {
            Some(next) if next.same_rounded(roi) => {
                live.next();
            }
            _ => {
                removed.insert(index);
            }
        }
    }
    live.next().is_none().then_some(removed)
}

impl RoiStackIndex {
    /// Brings the index in line with the live shape layer after any edit.
    ///
    /// A shrinking layer is always handled as a deletion, even if shapes
    /// moved in the same edit. On return the snapshot equals the layer.
    /// Shapes with non-finite coordinates are refused before anything changes.
    pub fn reconcile(&mut self, layer: &mut dyn ShapeLayer) -> Result<ShapeChange> {
        for (index, shape) in layer.shapes().iter().enumerate() {
            shape
                .check_finite()
                .map_err(|source| StackError::InvalidShape { index, source })?;
        }
        let diff = LayerDiff::between(&self.rois, layer.shapes());
        let change = match diff.current_count.cmp(&diff.previous_count) {
            Ordering::Equal => match diff.divergent {
                Some(index) => self.propagate_move(layer, index)?,
                None => ShapeChange::Unchanged,
            },
            Ordering::Less => self.apply_deletion(layer, diff)?,
            Ordering::Greater => ShapeChange::Added {
                first: diff.previous_count,
                count: diff.current_count - diff.previous_count,
            },
        };

        self.rois = layer.shapes().to_vec();
        self.check_consistency()?;
        debug!(?change, rois = self.rois.len(), "shape layer reconciled");
        Ok(change)
    }

    fn propagate_move(&mut self, layer: &mut dyn ShapeLayer, index: usize) -> Result<ShapeChange> {
        let Some(stack) = self.roi_to_stack.get(&index).copied() else {
            return Ok(ShapeChange::Moved {
                index,
                stack: None,
                propagated: 0,
            });
        };
        let moved = layer.shapes()[index].clone();
        let members = self
            .stack_to_rois
            .get(&stack)
            .cloned()
            .ok_or(StackError::UnknownStack(stack))?;

        let mut propagated = 0;
        for member in members.into_iter().filter(|member| *member != index) {
            let current = layer.shapes().get(member).ok_or(StackError::IndexOutOfRange {
                index: member,
                len: layer.len(),
            })?;
            let updated = current.with_spatial_from(&moved)?;
            layer.replace_shape(member, updated);
            propagated += 1;
        }
        Ok(ShapeChange::Moved {
            index,
            stack: Some(stack),
            propagated,
        })
    }

    fn apply_deletion(&mut self, layer: &mut dyn ShapeLayer, diff: LayerDiff) -> Result<ShapeChange> {
        let lost = diff.previous_count - diff.current_count;
        let removed = removed_positions(&self.rois, layer.shapes()).unwrap_or_else(|| {
            let start = diff.divergent.unwrap_or(diff.current_count);
            warn!(
                start,
                lost, "shape edit mixes removal and changes; treating it as a removal block"
            );
            (start..start + lost).collect()
        });

        let mut doomed = removed.clone();
        for index in &removed {
            if let Some(id) = self.roi_to_stack.get(index) {
                if let Some(members) = self.stack_to_rois.get(id) {
                    doomed.extend(members.iter().copied());
                }
            }
        }

        // Siblings of a deleted stack member are still on the layer.
        let siblings = doomed
            .difference(&removed)
            .map(|index| index - removed.range(..*index).count())
            .collect::<Vec<_>>();
        if !siblings.is_empty() {
            debug!(?siblings, "removing remaining stack members from layer");
            layer.remove_shapes(&siblings);
        }

        let stacks = self.remove_indices(&doomed);
        Ok(ShapeChange::Deleted {
            removed: doomed.into_iter().collect(),
            stacks,
        })
    }
}
