// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All Burn model and optimiser code lives here. The data layer
// only touches Burn for its Dataset and Batcher traits.
//
//   model.rs    — the two-layer classifier
//                 dense ReLU hidden layer → softmax output,
//                 Xavier-uniform weights
//
//   network.rs  — init / fit / evaluate around the model
//                 owns the optimiser, tracks the lifecycle
//                 (uninitialized → initialized → trained)
//
//   trainer.rs  — the epoch loop
//                 fit, evaluate, report, reset the test data
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)

/// Two-layer feed-forward classifier
pub mod model;

/// Stateful network: initialisation, fitting and evaluation
pub mod network;

/// Fixed-epoch training loop
pub mod trainer;
