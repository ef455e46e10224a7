mod client;

pub use client::{AnalysisClient, AnalysisResult};
