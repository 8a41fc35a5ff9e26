// Artifact loading and ownership
pub mod artifacts;

// Model inference (trait + ONNX runtime backend)
pub mod ml;

// Prediction pipeline and response assembly
pub mod prediction;

// Window-to-tensor sequence building
pub mod sequence;
