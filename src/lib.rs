
pub mod aggregator;
pub mod client;
pub mod config;
pub mod extractor;
pub mod ranker;
pub mod scanner;
pub mod ui;
pub mod units;
