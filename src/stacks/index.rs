use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::geometry::Roi;
use crate::viewer::ShapeLayer;

use super::{Result, StackError};

pub type StackId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoiKind {
    Standalone2D,
    StackMember(StackId),
}

/// ROI list of one source file together with its stack membership.
///
/// `roi_to_stack` and `stack_to_rois` describe the same membership from
/// both sides and only ever reference positions inside `rois`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RoiStackIndex {
    pub(super) rois: Vec<Roi>,
    pub(super) roi_to_stack: BTreeMap<usize, StackId>,
    pub(super) stack_to_rois: BTreeMap<StackId, Vec<usize>>,
    pub(super) last_stack_id: Option<StackId>,
}

impl RoiStackIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds an index from persisted parts, rejecting anything that
    /// violates the membership invariants.
    pub fn from_parts(
        rois: Vec<Roi>,
        roi_to_stack: BTreeMap<usize, StackId>,
        stack_to_rois: BTreeMap<StackId, Vec<usize>>,
        last_stack_id: Option<StackId>,
    ) -> Result<Self> {
        let index = Self {
            rois,
            roi_to_stack,
            stack_to_rois,
            last_stack_id,
        };
        index.check_consistency()?;
        Ok(index)
    }

    pub fn rois(&self) -> &[Roi] {
        &self.rois
    }

    pub fn len(&self) -> usize {
        self.rois.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rois.is_empty()
    }

    pub fn roi_to_stack(&self) -> &BTreeMap<usize, StackId> {
        &self.roi_to_stack
    }

    pub fn stack_to_rois(&self) -> &BTreeMap<StackId, Vec<usize>> {
        &self.stack_to_rois
    }

    pub fn last_stack_id(&self) -> Option<StackId> {
        self.last_stack_id
    }

    pub fn stacks(&self) -> impl Iterator<Item = (StackId, &[usize])> + '_ {
        self.stack_to_rois
            .iter()
            .map(|(id, members)| (*id, members.as_slice()))
    }

    pub fn roi(&self, index: usize) -> Result<&Roi> {
        self.rois.get(index).ok_or(StackError::IndexOutOfRange {
            index,
            len: self.rois.len(),
        })
    }

    pub fn roi_kind(&self, index: usize) -> Result<RoiKind> {
        self.roi(index)?;
        Ok(match self.roi_to_stack.get(&index) {
            Some(id) => RoiKind::StackMember(*id),
            None => RoiKind::Standalone2D,
        })
    }

    /// Members of `id` ordered by slice coordinate, ties broken by position.
    pub fn stack_members(&self, id: StackId) -> Result<Vec<usize>> {
        let members = self
            .stack_to_rois
            .get(&id)
            .ok_or(StackError::UnknownStack(id))?;
        let mut keyed = members
            .iter()
            .map(|index| {
                let slice = self.roi(*index)?.slice_coord().unwrap_or_default();
                Ok((slice, *index))
            })
            .collect::<Result<Vec<_>>>()?;
        keyed.sort_by(|left, right| left.0.total_cmp(&right.0).then(left.1.cmp(&right.1)));
        Ok(keyed.into_iter().map(|(_, index)| index).collect())
    }

    /// Appends `width` square ROIs of side `spatial_size` centred on the
    /// slice of `current_step`, one per slice, and links them into a new
    /// stack when `width > 1`.
    ///
    /// Slice offsets run from `floor(-width / 2) + 1` to `floor(width / 2)`,
    /// so a width of 3 covers the slices before and after the current one.
    pub fn add_fixed_stack(
        &mut self,
        layer: &mut dyn ShapeLayer,
        current_step: &[usize],
        width: usize,
        spatial_size: usize,
    ) -> Result<Option<StackId>> {
        if width == 0 {
            return Err(StackError::InvalidWidth);
        }
        if layer.len() != self.rois.len() {
            return Err(StackError::Unreconciled {
                live: layer.len(),
                known: self.rois.len(),
            });
        }
        let ndim = current_step.len();
        if let Some(existing) = self.rois.first() {
            if existing.ndim() != ndim {
                return Err(StackError::DimensionMismatch {
                    expected: existing.ndim(),
                    found: ndim,
                });
            }
        }
        if ndim < 2 || (width > 1 && ndim < 3) {
            return Err(StackError::NoSliceAxis { ndim });
        }

        let size = spatial_size as f64;
        let leading = current_step[..ndim - 2]
            .iter()
            .map(|value| *value as f64)
            .collect::<Vec<_>>();
        let span = width as i64;
        let new_rois = ((-span).div_euclid(2) + 1..=span.div_euclid(2))
            .map(|offset| {
                let mut plane = leading.clone();
                if let Some(slice) = plane.last_mut() {
                    *slice += offset as f64;
                }
                Roi::rectangle(&plane, (0.0, size), (0.0, size))
            })
            .collect::<Vec<_>>();

        let first = self.rois.len();
        layer.add_rectangles(new_rois.clone());
        self.rois.extend(new_rois);

        if width == 1 {
            debug!(index = first, "standalone ROI added");
            return Ok(None);
        }

        let id = self.next_stack_id();
        let members = (first..self.rois.len()).collect::<Vec<_>>();
        for index in &members {
            self.roi_to_stack.insert(*index, id);
        }
        debug!(stack = id, ?members, "stack added");
        self.stack_to_rois.insert(id, members);
        self.last_stack_id = Some(id);
        Ok(Some(id))
    }

    pub fn next_stack_id(&self) -> StackId {
        self.last_stack_id.map_or(0, |id| id + 1)
    }

    /// Removes the ROIs at `removed` (positions before removal), drops every
    /// stack touching them and shifts the remaining positions down past the
    /// removed ones. Returns the dropped stack ids.
    pub fn remove_indices(&mut self, removed: &BTreeSet<usize>) -> Vec<StackId> {
        let mut position = 0;
        self.rois.retain(|_| {
            let keep = !removed.contains(&position);
            position += 1;
            keep
        });

        let dropped = self
            .stack_to_rois
            .iter()
            .filter(|(_, members)| members.iter().any(|index| removed.contains(index)))
            .map(|(id, _)| *id)
            .collect::<Vec<_>>();
        for id in &dropped {
            self.stack_to_rois.remove(id);
        }

        let shift = |index: usize| index - removed.range(..index).count();
        self.roi_to_stack = self
            .roi_to_stack
            .iter()
            .filter(|&(index, id)| !removed.contains(index) && !dropped.contains(id))
            .map(|(index, id)| (shift(*index), *id))
            .collect();
        for members in self.stack_to_rois.values_mut() {
            for index in members.iter_mut() {
                *index = shift(*index);
            }
        }
        dropped
    }

    /// Forgets all ROIs and stacks. `last_stack_id` is kept so ids are
    /// never handed out twice.
    pub fn clear(&mut self) {
        self.rois.clear();
        self.roi_to_stack.clear();
        self.stack_to_rois.clear();
    }

    pub fn check_consistency(&self) -> Result<()> {
        let len = self.rois.len();
        for (id, members) in &self.stack_to_rois {
            if members.is_empty() {
                return Err(StackError::Inconsistent(format!("stack {id} has no members")));
            }
            if self.last_stack_id.is_none_or(|last| *id > last) {
                return Err(StackError::Inconsistent(format!(
                    "stack {id} is above the last allocated id {:?}",
                    self.last_stack_id
                )));
            }
            let mut seen = BTreeSet::new();
            for index in members {
                if *index >= len {
                    return Err(StackError::IndexOutOfRange { index: *index, len });
                }
                if !seen.insert(*index) {
                    return Err(StackError::Inconsistent(format!(
                        "ROI {index} listed twice in stack {id}"
                    )));
                }
                if self.roi_to_stack.get(index) != Some(id) {
                    return Err(StackError::Inconsistent(format!(
                        "ROI {index} of stack {id} maps to {:?}",
                        self.roi_to_stack.get(index)
                    )));
                }
            }
        }
        for (index, id) in &self.roi_to_stack {
            if *index >= len {
                return Err(StackError::IndexOutOfRange { index: *index, len });
            }
            let listed = self
                .stack_to_rois
                .get(id)
                .is_some_and(|members| members.contains(index));
            if !listed {
                return Err(StackError::Inconsistent(format!(
                    "ROI {index} maps to stack {id} which does not list it"
                )));
            }
        }
        Ok(())
    }
}
