use ndarray::Array;

use super::{AxisKind, Dataset, Dim, LabelDataset, Metadata, PixelType};

#[test]
fn metadata_roundtrip_json() {
    let mut metadata = Metadata::from_shape(&[3, 4, 5], PixelType::U8);
    metadata.channel_names = vec!["R".into(), "G".into(), "B".into()];
    let serialized = serde_json::to_string_pretty(&metadata).expect("serialize metadata");
    let restored: Metadata = serde_json::from_str(&serialized).expect("deserialize metadata");
    assert_eq!(restored, metadata);
}

#[test]
fn default_axes_put_spatial_plane_last() {
    let metadata = Metadata::from_shape(&[2, 6, 4, 5], PixelType::U16);
    assert_eq!(metadata.axis_index(AxisKind::Time), Some(0));
    assert_eq!(metadata.axis_index(AxisKind::Z), Some(1));
    assert_eq!(metadata.axis_index(AxisKind::Y), Some(2));
    assert_eq!(metadata.axis_index(AxisKind::X), Some(3));
}

#[test]
fn dataset_rejects_invalid_metadata_shape() {
    let data = Array::from_shape_vec((2, 2), vec![0.0_f32, 1.0, 2.0, 3.0])
        .expect("shape")
        .into_dyn();
    let metadata = Metadata {
        dims: vec![Dim::new(AxisKind::X, 2)],
        pixel_type: PixelType::F32,
        ..Metadata::default()
    };
    assert!(Dataset::new(data, metadata).is_err());
}

#[test]
fn index_axis_drops_channel_names() {
    let data = Array::from_shape_vec((2, 1, 2), vec![0.0_f32, 1.0, 2.0, 3.0])
        .expect("shape")
        .into_dyn();
    let metadata = Metadata {
        dims: vec![
            Dim::new(AxisKind::Channel, 2),
            Dim::new(AxisKind::Y, 1),
            Dim::new(AxisKind::X, 2),
        ],
        pixel_type: PixelType::F32,
        channel_names: vec!["dapi".into(), "gfp".into()],
        source: None,
    };
    let dataset = Dataset::new(data, metadata).expect("dataset");
    let second = dataset.index_axis(0, 1).expect("channel");
    assert_eq!(second.shape(), &[1, 2]);
    assert!(second.metadata.channel_names.is_empty());
    assert_eq!(second.data.iter().copied().collect::<Vec<_>>(), vec![2.0, 3.0]);
    assert!(dataset.index_axis(0, 2).is_err());
}

#[test]
fn label_zeros_match_shape() {
    let labels = LabelDataset::zeros_like(&[3, 4, 5]);
    assert_eq!(labels.shape(), &[3, 4, 5]);
    assert_eq!(labels.metadata.pixel_type, PixelType::U16);
    assert!(labels.data.iter().all(|value| *value == 0));
}
