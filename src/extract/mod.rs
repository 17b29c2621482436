pub mod candidates;
pub mod matcher;
pub mod transliterate;
pub mod tree_search;
