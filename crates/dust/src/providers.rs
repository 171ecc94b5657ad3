pub mod base;
pub mod catalog;
pub mod configs;
pub mod dust;
pub mod sse;
pub mod utils;
