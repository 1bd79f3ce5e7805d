pub mod book_summary;
pub mod frequency;
pub mod legacy;
pub mod rules;
pub mod scorer;
pub mod sessions;
