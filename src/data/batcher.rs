// ============================================================
// Layer 4 — Sensor Batcher
// ============================================================
// Implements Burn's Batcher trait to turn a Vec<SensorItem>
// into tensors for the model.
//
// How batching works here:
//   Input:  N SensorItems, each with F features
//   Output: features [N, F] (float), targets [N] (int)
//
//   Feature rows are flattened in order and reshaped:
//   [r1_f1, r1_f2, ..., r1_fF, r2_f1, ..., rN_fF] → [N, F]
//
// The batcher is generic over the backend, so the same code
// builds autodiff tensors for training and plain tensors for
// evaluation.

use burn::{data::dataloader::batcher::Batcher, prelude::*};

use crate::data::dataset::SensorItem;

/// A batch of labelled examples ready for the forward pass.
#[derive(Debug, Clone)]
pub struct SensorBatch<B: Backend> {
    /// shape: [batch_size, num_features]
    pub features: Tensor<B, 2>,

    /// Class indices, shape: [batch_size]
    pub targets: Tensor<B, 1, Int>,
}

impl<B: Backend> SensorBatch<B> {
    pub fn len(&self) -> usize {
        self.targets.dims()[0]
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Holds the target device so tensors are created in the right place.
#[derive(Clone, Debug)]
pub struct SensorBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> SensorBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<SensorItem, SensorBatch<B>> for SensorBatcher<B> {
    /// Callers never pass an empty Vec; iterators yield no batch for an empty dataset.
    fn batch(&self, items: Vec<SensorItem>) -> SensorBatch<B> {
        let batch_size = items.len();
        let num_features = items.first().map_or(0, |item| item.features.len());

        let features_flat: Vec<f32> = items
            .iter()
            .flat_map(|item| item.features.iter().copied())
            .collect();

        let labels: Vec<i64> = items.iter().map(|item| item.label as i64).collect();

        let features = Tensor::<B, 1>::from_floats(features_flat.as_slice(), &self.device)
            .reshape([batch_size, num_features]);

        let targets = Tensor::<B, 1, Int>::from_ints(labels.as_slice(), &self.device);

        SensorBatch { features, targets }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    #[test]
    fn test_batch_shapes_and_values() {
        let batcher = SensorBatcher::<NdArray>::new(Default::default());
        let items = vec![
            SensorItem { features: vec![1.0, 2.0, 3.0], label: 4 },
            SensorItem { features: vec![4.0, 5.0, 6.0], label: 0 },
        ];

        let batch = batcher.batch(items);

        assert_eq!(batch.features.dims(), [2, 3]);
        assert_eq!(batch.len(), 2);

        let features: Vec<f32> = batch.features.into_data().iter::<f32>().collect();
        assert_eq!(features, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);

        let targets: Vec<i64> = batch.targets.into_data().iter::<i64>().collect();
        assert_eq!(targets, vec![4, 0]);
    }
}
