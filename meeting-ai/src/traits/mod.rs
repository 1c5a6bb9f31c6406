pub mod embedding;
pub mod generation;
