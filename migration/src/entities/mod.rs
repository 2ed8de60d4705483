pub mod scroll_event;
pub mod tracker;

pub use scroll_event::Entity as ScrollEventEntity;
pub use tracker::Entity as TrackerEntity;
