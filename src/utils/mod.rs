pub mod pagination;
pub mod sanitize;
