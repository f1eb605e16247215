//! HTTP API handlers for ncr-predict

pub mod health;
pub mod model;
pub mod predict;

pub use health::health_routes;
pub use model::model_routes;
pub use predict::predict_routes;
