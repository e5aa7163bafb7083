// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates all the other layers to accomplish
// a specific goal (training, or inspecting a data file).
//
// Rules for this layer:
//   - No model math here (that's Layer 5)
//   - No argument parsing here (that's Layer 1)
//   - No direct file parsing (that's Layer 4 and 6)
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// The training workflow and its configuration
pub mod train_use_case;

// Load, split and transform only, then describe the result
pub mod inspect_use_case;
