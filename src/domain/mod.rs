// Machine learning domain (scaler protocol, artifact metadata)
pub mod ml;

// Port interfaces
pub mod ports;

// Core prediction domain types
pub mod types;

// Domain-specific error types
pub mod errors;
