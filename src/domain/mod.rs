pub mod accumulator;
pub mod error;
pub mod models;
pub mod normalizer;
pub mod report;
pub mod sequencer;
