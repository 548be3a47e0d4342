use crate::model::{AxisKind, CoreError, DatasetF32};

/// Channel names a file offers for annotation: one per entry of its channel
/// axis, or the file stem when it has none.
pub fn channels_of(stem: &str, dataset: &DatasetF32) -> Vec<String> {
    let Some(axis) = dataset.axis_index(AxisKind::Channel) else {
        return vec![stem.to_string()];
    };
    let count = dataset.shape()[axis];
    if dataset.metadata.channel_names.len() == count {
        dataset.metadata.channel_names.clone()
    } else {
        (0..count).map(|index| format!("{stem}_ch{index}")).collect()
    }
}

/// Position of `channel` among `names`; no choice means the first one.
pub fn channel_index(names: &[String], channel: Option<&str>) -> Option<usize> {
    match channel {
        Some(channel) => names.iter().position(|name| name == channel),
        None => (!names.is_empty()).then_some(0),
    }
}

/// The plane of one channel, or the dataset itself when it has no channel axis.
pub fn select_channel(dataset: DatasetF32, index: usize) -> Result<DatasetF32, CoreError> {
    match dataset.axis_index(AxisKind::Channel) {
        Some(axis) => dataset.index_axis(axis, index),
        None if index == 0 => Ok(dataset),
        None => Err(CoreError::AxisIndexOutOfRange {
            axis: 0,
            index,
            size: 1,
        }),
    }
}
