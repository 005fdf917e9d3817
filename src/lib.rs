pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod server;

// Re-export what main.rs, the batch binary and the integration tests need
pub use application::conversion_service::ConversionServiceImpl;
pub use config::{load_config, MdTextConfig};
pub use domain::document::{BatchReport, Conversion, ConversionService, TextStats};
pub use domain::pass::Pass;
pub use infrastructure::file_system::{self, LoadError};
pub use infrastructure::{
    character_count, character_count_no_spaces, convert_markdown_to_text, text_stats, word_count,
    PIPELINE, SAMPLE_MARKDOWN,
};
