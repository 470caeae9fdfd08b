use clap::Parser;
use std::env;
use std::fmt;

use crate::rate_limit::{DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW_SECS, MAX_WINDOW_SECS};

// CLI argument structure
#[derive(Parser, Debug, Clone)]
#[command(name = "ravehouse-api")]
#[command(about = "Admission-controlled write endpoints for the Ravehouse site")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    // Rate limit max requests per window
    #[arg(long, default_value_t = DEFAULT_MAX_REQUESTS)]
    pub rate_limit: u32,

    // Rate limit window in seconds, at most one day
    #[arg(
        long,
        default_value_t = DEFAULT_WINDOW_SECS,
        value_parser = clap::value_parser!(u64).range(1..=MAX_WINDOW_SECS)
    )]
    pub rate_window: u64,

    // Background sweep of expired rate limit entries, 0 disables it
    #[arg(long, default_value_t = 300)]
    pub sweep_interval: u64,

    // Trust edge-injected client IP headers even without platform env vars
    #[arg(long)]
    pub trusted_edge: bool,
}

/// Where the service runs, which decides how much client IP headers can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentMode {
    /// Behind a platform edge that overwrites forwarding headers itself.
    TrustedEdge,
    /// Behind arbitrary proxies, or none; forwarding headers are client-controlled.
    Generic,
}

impl DeploymentMode {
    pub fn detect(force_trusted: bool) -> Self {
        if force_trusted {
            return Self::TrustedEdge;
        }

        Self::from_platform_vars(
            env::var("VERCEL").ok().as_deref(),
            env::var("VERCEL_ENV").ok().as_deref(),
        )
    }

    fn from_platform_vars(vercel: Option<&str>, vercel_env: Option<&str>) -> Self {
        let flag_set = vercel
            .map(str::trim)
            .is_some_and(|v| !v.is_empty() && v != "0");
        let env_set = vercel_env.map(str::trim).is_some_and(|v| !v.is_empty());

        if flag_set || env_set {
            Self::TrustedEdge
        } else {
            Self::Generic
        }
    }
}

impl fmt::Display for DeploymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TrustedEdge => f.write_str("trusted-edge"),
            Self::Generic => f.write_str("generic"),
        }
    }
}
