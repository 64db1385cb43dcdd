//! Shared traits and re-exports for expense-tracking primitives.

use uuid::Uuid;

/// Exposes a stable identifier for rows stored by the backend.
pub trait Identifiable {
    fn id(&self) -> Uuid;
}

/// Provides read-only access to an entity's display name.
pub trait NamedEntity {
    fn name(&self) -> &str;
}

/// Converts an entity into a user-facing display label.
pub trait Displayable {
    fn display_label(&self) -> String;
}

/// Shortened identifier used when rows are listed in a terminal.
pub fn short_id(id: Uuid) -> String {
    id.simple().to_string()[..8].to_string()
}

// Re-export common dependencies so consumers can rely on this crate as a façade.
pub use chrono;
pub use serde;
pub use uuid;
