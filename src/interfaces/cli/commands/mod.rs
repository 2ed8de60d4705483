mod config_gen;
mod stats;
mod trackers;

pub use config_gen::config_generate;
pub use stats::{render_summary, show_stats};
pub use trackers::{create_tracker, delete_tracker, embed_snippet, list_trackers};
