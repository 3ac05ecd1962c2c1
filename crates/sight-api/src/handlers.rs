//! Request handlers.

pub mod detections;
pub mod frames;
pub mod health;
pub mod sessions;
pub mod speech;

pub use detections::*;
pub use frames::*;
pub use health::*;
pub use sessions::*;
pub use speech::*;
