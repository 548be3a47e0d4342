use std::collections::BTreeMap;

use crate::geometry::Roi;
use crate::viewer::{ShapeLayer, ShapeStore};

use super::{LayerDiff, RoiKind, RoiStackIndex, ShapeChange, StackError, first_divergent_index};

fn planar(slice: f64, rows: (f64, f64), cols: (f64, f64)) -> Roi {
    Roi::rectangle(&[slice], rows, cols)
}

fn slices(layer: &ShapeStore) -> Vec<f64> {
    layer
        .shapes()
        .iter()
        .map(|roi| roi.slice_coord().expect("3-D ROI"))
        .collect()
}

fn assert_bijection(index: &RoiStackIndex) {
    for (id, members) in index.stack_to_rois() {
        for member in members {
            assert_eq!(index.roi_to_stack().get(member), Some(id));
            assert!(*member < index.len());
        }
    }
    for (member, id) in index.roi_to_stack() {
        assert!(index.stack_to_rois()[id].contains(member));
        assert!(*member < index.len());
    }
}

#[test]
fn fixed_stack_of_three_is_centred_on_current_slice() {
    let mut layer = ShapeStore::new();
    let mut index = RoiStackIndex::new();
    let id = index
        .add_fixed_stack(&mut layer, &[5, 0, 0], 3, 128)
        .expect("stack");

    assert_eq!(id, Some(0));
    assert_eq!(slices(&layer), vec![4.0, 5.0, 6.0]);
    for roi in layer.shapes() {
        let bounds = roi.spatial_bounds();
        assert_eq!(
            (bounds.row_min, bounds.col_min, bounds.row_max, bounds.col_max),
            (0.0, 0.0, 128.0, 128.0)
        );
    }
    assert_eq!(index.stack_to_rois()[&0], vec![0, 1, 2]);
    assert_eq!(index.rois(), layer.shapes());
    assert_eq!(index.last_stack_id(), Some(0));
    assert_bijection(&index);
}

#[test]
fn fixed_stack_offsets_for_even_widths() {
    let mut layer = ShapeStore::new();
    let mut index = RoiStackIndex::new();
    index.add_fixed_stack(&mut layer, &[5, 0, 0], 2, 8).expect("width 2");
    assert_eq!(slices(&layer), vec![5.0, 6.0]);

    let mut layer = ShapeStore::new();
    let mut index = RoiStackIndex::new();
    index.add_fixed_stack(&mut layer, &[5, 0, 0], 4, 8).expect("width 4");
    assert_eq!(slices(&layer), vec![4.0, 5.0, 6.0, 7.0]);
}

#[test]
fn single_width_adds_standalone_roi() {
    let mut layer = ShapeStore::new();
    let mut index = RoiStackIndex::new();
    let id = index
        .add_fixed_stack(&mut layer, &[1, 7, 0, 0], 1, 32)
        .expect("roi");
    assert_eq!(id, None);
    assert_eq!(layer.len(), 1);
    assert_eq!(layer.shapes()[0].leading(), &[1.0, 7.0]);
    assert!(index.roi_to_stack().is_empty());
    assert!(index.stack_to_rois().is_empty());
    assert_eq!(index.last_stack_id(), None);
    assert_eq!(index.roi_kind(0).expect("kind"), RoiKind::Standalone2D);

    let mut planar_layer = ShapeStore::new();
    let mut planar_index = RoiStackIndex::new();
    assert_eq!(
        planar_index
            .add_fixed_stack(&mut planar_layer, &[0, 0], 1, 16)
            .expect("planar roi"),
        None
    );
    assert_eq!(planar_layer.shapes()[0].ndim(), 2);
}

#[test]
fn fixed_stack_rejects_bad_requests() {
    let mut layer = ShapeStore::new();
    let mut index = RoiStackIndex::new();
    assert!(matches!(
        index.add_fixed_stack(&mut layer, &[3, 0, 0], 0, 8),
        Err(StackError::InvalidWidth)
    ));
    assert!(matches!(
        index.add_fixed_stack(&mut layer, &[0, 0], 3, 8),
        Err(StackError::NoSliceAxis { ndim: 2 })
    ));

    index.add_fixed_stack(&mut layer, &[3, 0, 0], 1, 8).expect("roi");
    assert!(matches!(
        index.add_fixed_stack(&mut layer, &[0, 3, 0, 0], 1, 8),
        Err(StackError::DimensionMismatch {
            expected: 3,
            found: 4
        })
    ));

    layer.add_rectangles(vec![planar(0.0, (0.0, 1.0), (0.0, 1.0))]);
    assert!(matches!(
        index.add_fixed_stack(&mut layer, &[3, 0, 0], 3, 8),
        Err(StackError::Unreconciled { live: 2, known: 1 })
    ));
}

#[test]
fn moving_one_member_moves_the_whole_footprint() {
    let mut layer = ShapeStore::new();
    let mut index = RoiStackIndex::new();
    index.add_fixed_stack(&mut layer, &[5, 0, 0], 3, 16).expect("stack");

    assert!(layer.move_shape(1, 10.0, 20.0).expect("move"));
    let change = index.reconcile(&mut layer).expect("reconcile");
    assert_eq!(
        change,
        ShapeChange::Moved {
            index: 1,
            stack: Some(0),
            propagated: 2
        }
    );

    assert_eq!(slices(&layer), vec![4.0, 5.0, 6.0]);
    for roi in layer.shapes() {
        let bounds = roi.spatial_bounds();
        assert_eq!((bounds.row_min, bounds.row_max), (10.0, 26.0));
        assert_eq!((bounds.col_min, bounds.col_max), (20.0, 36.0));
    }
    assert_eq!(index.rois(), layer.shapes());
}

#[test]
fn moving_standalone_roi_touches_nothing_else() {
    let mut layer = ShapeStore::new();
    let mut index = RoiStackIndex::new();
    index.add_fixed_stack(&mut layer, &[5, 0, 0], 3, 16).expect("stack");
    index.add_fixed_stack(&mut layer, &[1, 0, 0], 1, 16).expect("roi");
    let before = layer.shapes()[..3].to_vec();

    layer.move_shape(3, 4.0, 4.0).expect("move");
    let change = index.reconcile(&mut layer).expect("reconcile");
    assert_eq!(
        change,
        ShapeChange::Moved {
            index: 3,
            stack: None,
            propagated: 0
        }
    );
    assert_eq!(&layer.shapes()[..3], before.as_slice());
}

#[test]
fn subpixel_jitter_is_not_a_move() {
    let mut layer = ShapeStore::new();
    let mut index = RoiStackIndex::new();
    index.add_fixed_stack(&mut layer, &[5, 0, 0], 3, 16).expect("stack");
    layer.move_shape(0, 0.3, -0.2).expect("move");
    assert_eq!(index.reconcile(&mut layer).expect("reconcile"), ShapeChange::Unchanged);
}

#[test]
fn deleting_a_member_deletes_the_stack_and_renumbers() {
    let mut layer = ShapeStore::new();
    let mut index = RoiStackIndex::new();
    index.add_fixed_stack(&mut layer, &[0, 0, 0], 1, 8).expect("a");
    index.add_fixed_stack(&mut layer, &[5, 0, 0], 3, 8).expect("stack 0");
    index.add_fixed_stack(&mut layer, &[9, 0, 0], 1, 8).expect("b");
    index.add_fixed_stack(&mut layer, &[2, 0, 0], 2, 8).expect("stack 1");
    assert_eq!(index.stack_to_rois()[&0], vec![1, 2, 3]);
    assert_eq!(index.stack_to_rois()[&1], vec![5, 6]);

    let before = layer.len();
    layer.remove_shapes(&[2]);
    let change = index.reconcile(&mut layer).expect("reconcile");

    assert_eq!(
        change,
        ShapeChange::Deleted {
            removed: vec![1, 2, 3],
            stacks: vec![0]
        }
    );
    assert_eq!(before - layer.len(), 3);
    assert_eq!(slices(&layer), vec![0.0, 9.0, 2.0, 3.0]);
    assert_eq!(index.stack_to_rois().len(), 1);
    assert_eq!(index.stack_to_rois()[&1], vec![2, 3]);
    assert_eq!(
        index.roi_to_stack(),
        &BTreeMap::from([(2, 1), (3, 1)])
    );
    assert_eq!(index.last_stack_id(), Some(1));
    assert_bijection(&index);
}

#[test]
fn deleting_the_last_shape_of_a_trailing_stack() {
    let mut layer = ShapeStore::new();
    let mut index = RoiStackIndex::new();
    index.add_fixed_stack(&mut layer, &[0, 0, 0], 1, 8).expect("a");
    index.add_fixed_stack(&mut layer, &[5, 0, 0], 3, 8).expect("stack");

    layer.remove_shapes(&[3]);
    let change = index.reconcile(&mut layer).expect("reconcile");
    assert_eq!(
        change,
        ShapeChange::Deleted {
            removed: vec![1, 2, 3],
            stacks: vec![0]
        }
    );
    assert_eq!(layer.len(), 1);
    assert!(index.stack_to_rois().is_empty());
    assert!(index.roi_to_stack().is_empty());
}

#[test]
fn deleting_several_standalone_shapes_at_once() {
    let mut layer = ShapeStore::new();
    let mut index = RoiStackIndex::new();
    for z in 0..3 {
        index.add_fixed_stack(&mut layer, &[z, 0, 0], 1, 8).expect("roi");
    }
    index.add_fixed_stack(&mut layer, &[7, 0, 0], 2, 8).expect("stack");

    layer.select(0);
    layer.select(2);
    assert_eq!(layer.remove_selected(), 2);
    let change = index.reconcile(&mut layer).expect("reconcile");
    assert_eq!(
        change,
        ShapeChange::Deleted {
            removed: vec![0, 2],
            stacks: vec![]
        }
    );
    assert_eq!(index.stack_to_rois()[&0], vec![1, 2]);
    assert_bijection(&index);
}

#[test]
fn shrink_with_move_is_treated_as_removal_block() {
    let mut layer = ShapeStore::new();
    let mut index = RoiStackIndex::new();
    for z in 0..4 {
        index.add_fixed_stack(&mut layer, &[z, 0, 0], 1, 8).expect("roi");
    }
    layer.remove_shapes(&[1]);
    layer.move_shape(2, 5.0, 5.0).expect("move");

    let change = index.reconcile(&mut layer).expect("reconcile");
    assert_eq!(
        change,
        ShapeChange::Deleted {
            removed: vec![1],
            stacks: vec![]
        }
    );
    assert_eq!(index.rois(), layer.shapes());
}

#[test]
fn last_stack_id_survives_deleting_highest_stack() {
    let mut layer = ShapeStore::new();
    let mut index = RoiStackIndex::new();
    index.add_fixed_stack(&mut layer, &[5, 0, 0], 3, 8).expect("stack 0");
    index.add_fixed_stack(&mut layer, &[10, 0, 0], 3, 8).expect("stack 1");

    layer.remove_shapes(&[4]);
    index.reconcile(&mut layer).expect("reconcile");
    assert_eq!(index.last_stack_id(), Some(1));
    assert_eq!(index.stack_to_rois().keys().copied().collect::<Vec<_>>(), vec![0]);

    let id = index
        .add_fixed_stack(&mut layer, &[10, 0, 0], 3, 8)
        .expect("stack 2");
    assert_eq!(id, Some(2));
    assert_eq!(index.stack_to_rois()[&2], vec![3, 4, 5]);
}

#[test]
fn drawn_rectangles_stay_standalone() {
    let mut layer = ShapeStore::new();
    let mut index = RoiStackIndex::new();
    index.add_fixed_stack(&mut layer, &[5, 0, 0], 3, 8).expect("stack");
    layer.add_rectangles(vec![planar(2.0, (1.0, 9.0), (3.0, 12.0))]);

    let change = index.reconcile(&mut layer).expect("reconcile");
    assert_eq!(change, ShapeChange::Added { first: 3, count: 1 });
    assert_eq!(index.roi_kind(3).expect("kind"), RoiKind::Standalone2D);
    assert_eq!(index.roi_kind(0).expect("kind"), RoiKind::StackMember(0));
    assert!(matches!(
        index.roi_kind(4),
        Err(StackError::IndexOutOfRange { index: 4, len: 4 })
    ));
}

#[test]
fn stack_members_follow_slice_order() {
    let rois = vec![
        planar(6.0, (0.0, 4.0), (0.0, 4.0)),
        planar(4.0, (0.0, 4.0), (0.0, 4.0)),
        planar(5.0, (0.0, 4.0), (0.0, 4.0)),
    ];
    let index = RoiStackIndex::from_parts(
        rois,
        BTreeMap::from([(0, 3), (1, 3), (2, 3)]),
        BTreeMap::from([(3, vec![0, 1, 2])]),
        Some(3),
    )
    .expect("valid parts");
    assert_eq!(index.stack_members(3).expect("members"), vec![1, 2, 0]);
    assert!(matches!(index.stack_members(1), Err(StackError::UnknownStack(1))));
}

#[test]
fn from_parts_rejects_broken_membership() {
    let rois = vec![planar(0.0, (0.0, 4.0), (0.0, 4.0)); 2];
    let dangling = RoiStackIndex::from_parts(
        rois.clone(),
        BTreeMap::from([(0, 0), (2, 0)]),
        BTreeMap::from([(0, vec![0, 2])]),
        Some(0),
    );
    assert!(matches!(
        dangling,
        Err(StackError::IndexOutOfRange { index: 2, len: 2 })
    ));

    let one_sided = RoiStackIndex::from_parts(
        rois.clone(),
        BTreeMap::from([(0, 0), (1, 0)]),
        BTreeMap::from([(0, vec![0])]),
        Some(0),
    );
    assert!(matches!(one_sided, Err(StackError::Inconsistent(_))));

    let unallocated = RoiStackIndex::from_parts(
        rois,
        BTreeMap::from([(0, 4), (1, 4)]),
        BTreeMap::from([(4, vec![0, 1])]),
        Some(2),
    );
    assert!(matches!(unallocated, Err(StackError::Inconsistent(_))));
}

#[test]
fn diff_reports_counts_and_divergence() {
    let a = planar(0.0, (0.0, 4.0), (0.0, 4.0));
    let b = planar(1.0, (0.0, 4.0), (0.0, 4.0));
    let c = planar(2.0, (0.0, 4.0), (0.0, 4.0));
    let previous = vec![a.clone(), b.clone(), c.clone()];
    assert_eq!(first_divergent_index(&previous, &[a.clone(), c.clone()]), Some(1));
    assert_eq!(first_divergent_index(&previous, &[a.clone(), b.clone()]), None);
    assert_eq!(
        LayerDiff::between(&previous, &[a, c]),
        LayerDiff {
            previous_count: 3,
            current_count: 2,
            divergent: Some(1)
        }
    );
}

/// Small deterministic generator so the edit sequence is reproducible.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: usize) -> usize {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        ((self.0 >> 33) as usize) % bound.max(1)
    }
}

#[test]
fn random_edit_sequences_keep_invariants() {
    let mut rng = Lcg(7);
    let mut layer = ShapeStore::new();
    let mut index = RoiStackIndex::new();
    let mut last_seen = None;

    // Every group of shapes gets its own size so deletions are unambiguous.
    for step in 0..400 {
        let size = 8 + step;
        match rng.next(5) {
            0 => {
                let width = 1 + rng.next(4);
                let slice = 2 + rng.next(20);
                index
                    .add_fixed_stack(&mut layer, &[slice, 0, 0], width, size)
                    .expect("add stack");
            }
            1 => {
                let slice = rng.next(20) as f64;
                layer.add_rectangles(vec![planar(slice, (1.0, 5.0), (2.0, size as f64))]);
            }
            2 if !layer.is_empty() => {
                let target = rng.next(layer.len());
                layer.move_shape(target, rng.next(7) as f64 + 1.0, 2.0).expect("move");
            }
            3 | 4 if !layer.is_empty() => {
                let target = rng.next(layer.len());
                let expected_loss = match index.roi_kind(target).expect("kind") {
                    RoiKind::StackMember(id) => index.stack_to_rois()[&id].len(),
                    RoiKind::Standalone2D => 1,
                };
                let before = layer.len();
                layer.remove_shapes(&[target]);
                index.reconcile(&mut layer).expect("reconcile delete");
                assert_eq!(before - layer.len(), expected_loss);
            }
            _ => {}
        }

        index.reconcile(&mut layer).expect("reconcile");
        assert_eq!(index.rois(), layer.shapes());
        assert_bijection(&index);
        assert!(index.last_stack_id() >= last_seen);
        last_seen = index.last_stack_id();

        for (id, _) in index.stacks() {
            let members = index.stack_members(id).expect("members");
            let first = index.roi(members[0]).expect("roi").spatial_bounds();
            for member in &members {
                assert_eq!(index.roi(*member).expect("roi").spatial_bounds(), first);
            }
        }
    }
}

#[test]
fn remove_indices_and_clear_keep_ids_allocated() {
    let mut layer = ShapeStore::new();
    let mut index = RoiStackIndex::new();
    index.add_fixed_stack(&mut layer, &[3, 0, 0], 2, 8).expect("stack 0");
    index.add_fixed_stack(&mut layer, &[8, 0, 0], 1, 8).expect("roi");

    let dropped = index.remove_indices(&std::collections::BTreeSet::from([0, 1]));
    assert_eq!(dropped, vec![0]);
    assert_eq!(index.len(), 1);
    assert_eq!(index.roi(0).expect("roi").slice_coord(), Some(8.0));
    index.check_consistency().expect("consistent");

    index.clear();
    assert!(index.is_empty());
    assert_eq!(index.next_stack_id(), 1);
}

#[test]
fn non_finite_shape_is_refused_before_any_change() {
    let mut layer = ShapeStore::new();
    let mut index = RoiStackIndex::new();
    index.add_fixed_stack(&mut layer, &[5, 0, 0], 3, 16).expect("stack");
    let snapshot = index.rois().to_vec();

    layer.replace_shape(1, planar(5.0, (f64::NAN, 16.0), (0.0, 16.0)));
    assert!(matches!(
        index.reconcile(&mut layer),
        Err(StackError::InvalidShape { index: 1, .. })
    ));
    assert_eq!(index.rois(), snapshot.as_slice());
    assert_eq!(layer.shapes()[0], snapshot[0]);
    assert_eq!(layer.shapes()[2], snapshot[2]);

    layer.replace_shape(1, snapshot[1].clone());
    layer.add_rectangles(vec![planar(1.0, (0.0, f64::INFINITY), (0.0, 4.0))]);
    assert!(matches!(
        index.reconcile(&mut layer),
        Err(StackError::InvalidShape { index: 3, .. })
    ));
    assert_eq!(index.len(), 3);
    assert_bijection(&index);
}
