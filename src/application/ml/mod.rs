pub mod forecaster;
pub mod onnx_forecaster;

pub use forecaster::SequenceForecaster;
pub use onnx_forecaster::OnnxForecaster;
