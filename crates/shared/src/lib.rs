pub mod individuals;
pub mod markers;
pub mod models;
pub mod parser;
pub mod surface;
pub mod timeline;
pub mod tracker;
pub mod utm;
