pub mod file_system;
pub mod markdown;
pub mod stats;

// Re-export the converter entry points for the application layer
pub use markdown::{convert_markdown_to_text, PIPELINE, SAMPLE_MARKDOWN};
pub use stats::{character_count, character_count_no_spaces, text_stats, word_count};
