// Trained-artifact metadata and the normalization protocol
pub mod metadata;
pub mod scaler;
