//! CLI module for the geo gateway
//!
//! Provides subcommands for running the service in different modes:
//! - `serve`: HTTP API server (default)
//! - `backfill`: one-shot repair pass over stored job coordinates

pub mod backfill;
pub mod serve;

use clap::{Parser, Subcommand};

/// Geo Gateway - geocoding and route caching for Israeli service areas
#[derive(Parser)]
#[command(name = "geo-gateway")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve,

    /// Re-geocode job rows with missing or out-of-bounds coordinates
    Backfill(backfill::BackfillArgs),
}
