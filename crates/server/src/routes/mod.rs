//! HTTP endpoints exposed by the autoviz server.

pub mod extract_product;
pub mod generate_visualization;
