use burn::{
    nn::{Initializer, Linear, LinearConfig, Relu},
    prelude::*,
    tensor::activation::softmax,
};

/// Two-layer feed-forward classifier: dense ReLU hidden layer, softmax output.
#[derive(Config, Debug)]
pub struct SensorClassifierConfig {
    pub num_features: usize,
    pub hidden_units: usize,
    pub num_classes: usize,
}

impl SensorClassifierConfig {
    /// Allocate both layers with Xavier-uniform weights.
    /// Seed the backend first for reproducible weights.
    pub fn init<B: Backend>(&self, device: &B::Device) -> SensorClassifier<B> {
        let xavier = Initializer::XavierUniform { gain: 1.0 };
        let hidden = LinearConfig::new(self.num_features, self.hidden_units)
            .with_initializer(xavier.clone())
            .init(device);
        let output = LinearConfig::new(self.hidden_units, self.num_classes)
            .with_initializer(xavier)
            .init(device);
        SensorClassifier {
            hidden,
            output,
            activation: Relu::new(),
        }
    }
}

#[derive(Module, Debug)]
pub struct SensorClassifier<B: Backend> {
    pub hidden: Linear<B>,
    pub output: Linear<B>,
    pub activation: Relu,
}

impl<B: Backend> SensorClassifier<B> {
    /// features: [batch, num_features] → logits: [batch, num_classes]
    pub fn forward(&self, features: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = self.hidden.forward(features);
        let x = self.activation.forward(x);
        self.output.forward(x)
    }

    /// Softmax class probabilities, each row sums to 1.
    pub fn forward_probs(&self, features: Tensor<B, 2>) -> Tensor<B, 2> {
        softmax(self.forward(features), 1)
    }

    /// Negative log-likelihood of the softmax output against `targets`.
    pub fn forward_loss(&self, features: Tensor<B, 2>, targets: Tensor<B, 1, Int>) -> Tensor<B, 1> {
        let logits = self.forward(features);
        // log-softmax + NLL in one op
        burn::nn::loss::CrossEntropyLossConfig::new()
            .init(&logits.device())
            .forward(logits, targets)
    }

    /// Predicted class index per row: the most probable softmax output.
    pub fn predict(&self, features: Tensor<B, 2>) -> Tensor<B, 1, Int> {
        // argmax(1) returns [batch, 1]
        self.forward_probs(features).argmax(1).flatten::<1>(0, 1)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_output_shape_and_probabilities() {
        let device = Default::default();
        let model = SensorClassifierConfig::new(6, 20, 7).init::<TestBackend>(&device);

        let input = Tensor::<TestBackend, 2>::zeros([4, 6], &device);
        let probs = model.forward_probs(input.clone());
        assert_eq!(probs.dims(), [4, 7]);

        let row_sums: Vec<f32> = probs.sum_dim(1).into_data().iter::<f32>().collect();
        for sum in row_sums {
            assert!((sum - 1.0).abs() < 1e-5);
        }

        let predictions: Vec<i64> = model.predict(input).into_data().iter::<i64>().collect();
        assert_eq!(predictions.len(), 4);
        assert!(predictions.iter().all(|&p| (0..7).contains(&p)));
    }

    #[test]
    fn test_parameter_count() {
        let device = Default::default();
        let model = SensorClassifierConfig::new(6, 20, 7).init::<TestBackend>(&device);
        // (6*20 + 20) + (20*7 + 7)
        assert_eq!(model.num_params(), 287);
    }
}
