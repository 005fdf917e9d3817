pub mod document;
pub mod pass;
