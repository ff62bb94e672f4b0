//! In-memory stores owned by an agent session.

pub mod bounds;
pub mod notification;
pub mod validation;

pub use bounds::PositionBoundsCache;
pub use notification::NotificationBuffer;
pub use validation::ValidationStore;
