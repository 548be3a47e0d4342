use super::{GeometryError, Roi};

fn square(slice: f64, size: f64) -> Roi {
    Roi::rectangle(&[slice], (0.0, size), (0.0, size))
}

#[test]
fn rectangle_corners_follow_drawing_order() {
    let roi = Roi::rectangle(&[2.0, 5.0], (10.0, 20.0), (30.0, 40.0));
    assert_eq!(roi.ndim(), 4);
    assert_eq!(roi.corner(0), &[2.0, 5.0, 10.0, 30.0]);
    assert_eq!(roi.corner(1), &[2.0, 5.0, 10.0, 40.0]);
    assert_eq!(roi.corner(2), &[2.0, 5.0, 20.0, 40.0]);
    assert_eq!(roi.corner(3), &[2.0, 5.0, 20.0, 30.0]);
    assert_eq!(roi.leading(), &[2.0, 5.0]);
    assert_eq!(roi.slice_coord(), Some(5.0));
}

#[test]
fn planar_roi_has_no_slice() {
    let roi = Roi::rectangle(&[], (1.0, 3.0), (2.0, 6.0));
    assert_eq!(roi.ndim(), 2);
    assert_eq!(roi.slice_coord(), None);
    assert!(roi.leading().is_empty());
    let bounds = roi.spatial_bounds();
    assert_eq!((bounds.row_max - bounds.row_min, bounds.col_max - bounds.col_min), (2.0, 4.0));
}

#[test]
fn flat_form_is_validated() {
    assert_eq!(
        Roi::from_flat(vec![0.0; 6]),
        Err(GeometryError::InvalidLength(6))
    );
    assert_eq!(
        Roi::from_flat(vec![0.0; 4]),
        Err(GeometryError::InvalidLength(4))
    );
    assert!(matches!(
        Roi::from_flat(vec![f64::NAN; 8]),
        Err(GeometryError::NonFinite(_))
    ));
    let roi = Roi::from_flat(square(3.0, 8.0).as_flat().to_vec()).expect("valid");
    assert_eq!(roi, square(3.0, 8.0));
}

#[test]
fn spatial_copy_keeps_slice() {
    let target = square(4.0, 16.0);
    let moved = Roi::rectangle(&[5.0], (3.0, 19.0), (7.0, 23.0));
    let updated = target.with_spatial_from(&moved).expect("same ndim");
    assert_eq!(updated.slice_coord(), Some(4.0));
    assert_eq!(updated.spatial_bounds(), moved.spatial_bounds());
    assert!(target.with_spatial_from(&Roi::rectangle(&[], (0.0, 1.0), (0.0, 1.0))).is_err());
}

#[test]
fn rounding_comparison_ignores_subpixel_jitter() {
    let roi = square(1.0, 10.0);
    let jittered = roi.translated(0.2, -0.3).expect("finite");
    assert!(roi.same_rounded(&jittered));
    assert!(!roi.same_rounded(&roi.translated(1.0, 0.0).expect("finite")));
    assert_eq!(jittered.rounded(), roi);
}

#[test]
fn serde_uses_flat_sequence() {
    let roi = square(2.0, 4.0);
    let yaml = serde_yaml::to_string(&roi).expect("serialize");
    let restored: Roi = serde_yaml::from_str(&yaml).expect("deserialize");
    assert_eq!(restored, roi);
    assert!(serde_yaml::from_str::<Roi>("[1.0, 2.0, 3.0]").is_err());
}

#[test]
fn translation_rejects_non_finite_offsets() {
    let roi = square(1.0, 4.0);
    assert!(matches!(
        roi.translated(f64::NAN, 0.0),
        Err(GeometryError::NonFinite(value)) if value.is_nan()
    ));
    assert!(matches!(
        roi.translated(0.0, f64::NEG_INFINITY),
        Err(GeometryError::NonFinite(value)) if value == f64::NEG_INFINITY
    ));
    assert!(Roi::rectangle(&[1.0], (f64::NAN, 2.0), (0.0, 2.0)).check_finite().is_err());
    assert!(roi.check_finite().is_ok());
}
