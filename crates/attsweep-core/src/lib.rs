pub mod attachment;
pub mod issue;
pub mod selection;
pub mod size;
pub mod stats;

pub use attachment::Attachment;
pub use issue::Issue;
pub use selection::{DeletionResult, SelectionEntry, SelectionKey, SelectionSet};
pub use size::{comment_excerpt, format_size};
pub use stats::{compute_stats, Stats};
