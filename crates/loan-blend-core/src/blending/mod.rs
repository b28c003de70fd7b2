pub mod model;
pub mod ratio_search;
pub mod selector;
