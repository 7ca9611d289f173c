//! Config command - show current configuration

use crate::cli::output::print_output;
use crate::cli::OutputFormat;
use crate::core::config::LimitsConfig;
use crate::core::services::Services;
use crate::core::types::ChunkStrategy;
use clap::Args;
use serde::Serialize;
use std::sync::Arc;

/// Arguments for the config command
#[derive(Args, Debug)]
pub struct ConfigArgs {}

/// Configuration response
#[derive(Debug, Serialize)]
pub struct ConfigResponse {
    pub data_dir: String,
    pub sessions_dir: String,
    pub chunking: ChunkStrategy,
    pub limits: LimitsConfig,
}

/// Execute the config command
pub fn execute(
    _args: ConfigArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = &services.config;

    let response = ConfigResponse {
        data_dir: config.storage.data_dir.to_string_lossy().into_owned(),
        sessions_dir: config.sessions_dir().to_string_lossy().into_owned(),
        chunking: config.chunking.clone(),
        limits: config.limits.clone(),
    };

    print_output(&response, format, |r| {
        println!("Configuration:");
        println!("  data_dir: {}", r.data_dir);
        println!("  sessions_dir: {}", r.sessions_dir);
        println!("  chunking:");
        println!("    chunk_size: {}", r.chunking.chunk_size);
        println!("    overlap: {}", r.chunking.overlap);
        println!("    split_mode: {}", r.chunking.split_mode);
        println!("    normalize: {}", r.chunking.normalize);
        println!("  limits:");
        println!(
            "    chunk_size: {}..={}",
            r.limits.min_chunk_size, r.limits.max_chunk_size
        );
        println!("    max_overlap: {}", r.limits.max_overlap);
        println!("    max_pages: {}", r.limits.max_pages);
    })?;

    Ok(())
}
