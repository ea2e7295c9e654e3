pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod db;
pub mod diagram;
pub mod error;
pub mod global;
pub mod llm;
pub mod meeting;
pub mod pipeline;
pub mod reconcile;
pub mod search;
pub mod share;
pub mod storage;
pub mod summary;
pub mod transcription;
pub mod validation;
