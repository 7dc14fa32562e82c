// src/lib.rs — Library root for SentiChat

pub mod api;
pub mod cli;
pub mod infra;
pub mod provider;
pub mod report;
pub mod sentiment;
pub mod storage;
pub mod util;
