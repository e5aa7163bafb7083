// ============================================================
// Layer 5 — Network (model + optimiser + lifecycle)
// ============================================================
// Wraps the burn classifier with its optimiser and tracks the
// lifecycle:
//
//   Uninitialized ──init()──► Initialized ──fit()──► Trained(1) ──fit()──► Trained(2) ...
//
// - init() seeds the backend and allocates Xavier weights.
//   Calling it again throws away everything learned so far.
// - fit() makes one pass over the training iterator, one
//   Nesterov-momentum SGD step per batch.
// - evaluate() runs on model.valid() (inner backend, no autodiff)
//   and never touches the parameters or the state.

use std::fmt;

use burn::{
    data::dataloader::batcher::Batcher,
    module::AutodiffModule,
    optim::{
        adaptor::OptimizerAdaptor, momentum::MomentumConfig, GradientsParams, Optimizer, Sgd,
        SgdConfig,
    },
    prelude::*,
    tensor::{backend::AutodiffBackend, ElementConversion},
};

use crate::data::batcher::SensorBatcher;
use crate::data::dataset::SensorItem;
use crate::domain::error::{PipelineError, PipelineResult};
use crate::domain::evaluation::{ConfusionMatrix, EvaluationReport, FitSummary};
use crate::domain::traits::{BatchIterator, Classifier};
use crate::ml::model::{SensorClassifier, SensorClassifierConfig};

#[derive(Config, Debug)]
pub struct NetworkConfig {
    pub model: SensorClassifierConfig,
    #[config(default = 1e-3)]
    pub learning_rate: f64,
    /// Nesterov momentum coefficient.
    #[config(default = 0.9)]
    pub momentum: f64,
    #[config(default = 1234)]
    pub seed: u64,
    /// Log the training loss every N iterations; 0 disables it.
    #[config(default = 10)]
    pub score_interval: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelState {
    Uninitialized,
    Initialized,
    /// Number of completed fit passes.
    Trained(usize),
}

impl fmt::Display for ModelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelState::Uninitialized => f.write_str("uninitialized"),
            ModelState::Initialized => f.write_str("initialized"),
            ModelState::Trained(n) => write!(f, "trained ({n} passes)"),
        }
    }
}

type SensorOptimizer<B> =
    OptimizerAdaptor<Sgd<<B as AutodiffBackend>::InnerBackend>, SensorClassifier<B>, B>;

struct Trainable<B: AutodiffBackend> {
    model: SensorClassifier<B>,
    optim: SensorOptimizer<B>,
}

pub struct Network<B: AutodiffBackend> {
    config: NetworkConfig,
    device: B::Device,
    parts: Option<Trainable<B>>,
    state: ModelState,
    class_names: Vec<String>,
    /// Parameter updates across all fit calls.
    iterations: usize,
}

impl<B: AutodiffBackend> Network<B> {
    /// A network declaration; nothing is allocated until `init()`.
    pub fn new(config: NetworkConfig, device: B::Device) -> Self {
        Self {
            config,
            device,
            parts: None,
            state: ModelState::Uninitialized,
            class_names: Vec::new(),
            iterations: 0,
        }
    }

    /// Names used when rendering evaluation reports.
    pub fn with_class_names(mut self, names: Vec<String>) -> Self {
        self.class_names = names;
        self
    }

    /// Seed the backend and allocate fresh parameters and optimiser state.
    pub fn init(&mut self) {
        if let ModelState::Trained(n) = self.state {
            tracing::warn!("Re-initialising the network discards {} training passes", n);
        }

        B::seed(self.config.seed);
        let model = self.config.model.init::<B>(&self.device);

        let momentum = MomentumConfig::new()
            .with_momentum(self.config.momentum)
            .with_dampening(0.0)
            .with_nesterov(true);
        let optim = SgdConfig::new()
            .with_momentum(Some(momentum))
            .init::<B, SensorClassifier<B>>();

        tracing::info!(
            "Network initialised: {} → {} (ReLU) → {} (softmax), {} parameters, seed {}",
            self.config.model.num_features,
            self.config.model.hidden_units,
            self.config.model.num_classes,
            model.num_params(),
            self.config.seed
        );

        self.parts = Some(Trainable { model, optim });
        self.state = ModelState::Initialized;
        self.iterations = 0;
    }

    pub fn state(&self) -> ModelState {
        self.state
    }

    /// The current parameters, once initialised.
    pub fn model(&self) -> Option<&SensorClassifier<B>> {
        self.parts.as_ref().map(|p| &p.model)
    }

    fn state_error(&self, operation: &'static str) -> PipelineError {
        PipelineError::ModelState {
            state: self.state.to_string(),
            operation,
        }
    }

    /// Reject batches the model cannot consume. `offset` is the dataset
    /// position of the batch's first example.
    fn check_batch(&self, items: &[SensorItem], offset: usize) -> PipelineResult<()> {
        let num_features = self.config.model.num_features;
        let num_classes = self.config.model.num_classes;
        for (row, item) in (offset..).zip(items) {
            if item.features.len() != num_features {
                return Err(PipelineError::Config(format!(
                    "model expects {} features, batch row {} has {}",
                    num_features,
                    row,
                    item.features.len()
                )));
            }
            if item.label >= num_classes {
                return Err(PipelineError::InvalidLabel {
                    row,
                    label: item.label.to_string(),
                    num_classes,
                });
            }
        }
        Ok(())
    }

    /// One pass with the parts moved out of `self`; always hands them back.
    fn fit_pass<I>(
        &mut self,
        mut parts: Trainable<B>,
        train: &mut I,
    ) -> (Trainable<B>, PipelineResult<FitSummary>)
    where
        I: BatchIterator<Item = Vec<SensorItem>>,
    {
        let batcher = SensorBatcher::<B>::new(self.device.clone());
        let lr = self.config.learning_rate;
        let interval = self.config.score_interval;

        let mut loss_sum = 0.0f64;
        let mut updates = 0usize;
        let mut seen = 0usize;

        for items in train {
            if items.is_empty() {
                continue;
            }
            if let Err(err) = self.check_batch(&items, seen) {
                return (parts, Err(err));
            }
            seen += items.len();

            let batch = batcher.batch(items);
            let loss = parts.model.forward_loss(batch.features, batch.targets);
            let loss_value: f64 = loss.clone().into_scalar().elem::<f64>();

            // Backward pass + SGD update
            let grads = GradientsParams::from_grads(loss.backward(), &parts.model);
            parts.model = parts.optim.step(lr, parts.model, grads);

            loss_sum += loss_value;
            updates += 1;
            self.iterations += 1;

            if interval > 0 && self.iterations % interval == 0 {
                tracing::info!("Score at iteration {} is {:.6}", self.iterations, loss_value);
            }
        }

        let mean_loss = if updates > 0 {
            loss_sum / updates as f64
        } else {
            f64::NAN
        };

        (
            parts,
            Ok(FitSummary {
                iterations: updates,
                mean_loss,
            }),
        )
    }
}

impl<B: AutodiffBackend> Classifier for Network<B> {
    type Batch = Vec<SensorItem>;

    fn fit<I>(&mut self, train: &mut I) -> PipelineResult<FitSummary>
    where
        I: BatchIterator<Item = Self::Batch>,
    {
        let parts = self.parts.take().ok_or_else(|| self.state_error("fit"))?;

        // A pass always starts from the first batch
        train.reset();
        let (parts, outcome) = self.fit_pass(parts, train);
        self.parts = Some(parts);
        let summary = outcome?;

        if summary.iterations == 0 {
            tracing::warn!("Training iterator is empty; parameters unchanged");
        }

        self.state = match self.state {
            ModelState::Trained(n) => ModelState::Trained(n + 1),
            _ => ModelState::Trained(1),
        };
        Ok(summary)
    }

    fn evaluate<I>(&self, test: &mut I) -> PipelineResult<EvaluationReport>
    where
        I: BatchIterator<Item = Self::Batch>,
    {
        let parts = self.parts.as_ref().ok_or_else(|| self.state_error("evaluate"))?;

        // Inner backend: no autodiff graph, parameters untouched
        let model = parts.model.valid();
        let batcher = SensorBatcher::<B::InnerBackend>::new(self.device.clone());
        let mut confusion = ConfusionMatrix::new(self.config.model.num_classes);
        let mut seen = 0usize;

        for items in test {
            if items.is_empty() {
                continue;
            }
            self.check_batch(&items, seen)?;
            seen += items.len();

            let actual: Vec<usize> = items.iter().map(|item| item.label).collect();
            let batch = batcher.batch(items);
            let predicted = model.predict(batch.features).into_data();

            for (&a, p) in actual.iter().zip(predicted.iter::<i64>()) {
                confusion.add(a, p as usize)?;
            }
        }

        if confusion.total() == 0 {
            tracing::warn!("Evaluation iterator is empty; returning an empty report");
        }

        Ok(EvaluationReport::with_class_names(confusion, &self.class_names))
    }
}
