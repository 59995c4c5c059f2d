//! CLI commands and argument parsing

use clap::{Parser, Subcommand};

/// FabWire API command-line client
#[derive(Parser, Debug)]
#[command(name = "fabwire")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// API base URL
    #[arg(short, long, global = true, env = "FABWIRE_BASE_URL")]
    pub base_url: Option<String>,

    /// ID token used as the bearer credential
    #[arg(long, global = true, env = "FABWIRE_TOKEN")]
    pub token: Option<String>,

    /// Refresh token
    #[arg(long, global = true, env = "FABWIRE_REFRESH_TOKEN")]
    pub refresh_token: Option<String>,

    /// Access token embedded in request bodies
    #[arg(long, global = true, env = "FABWIRE_ACCESS_TOKEN")]
    pub access_token: Option<String>,

    /// Session token, used for logout when no normal session exists
    #[arg(long, global = true, env = "FABWIRE_SESSION_TOKEN")]
    pub session_token: Option<String>,

    /// Locale sent as `Accept-Language`
    #[arg(long, global = true, default_value = "en-US")]
    pub locale: String,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// GET an endpoint
    Get {
        /// Endpoint path, e.g. /jobs
        path: String,

        /// Query parameters as key=value pairs
        #[arg(short, long)]
        query: Vec<String>,
    },

    /// POST a JSON body to an endpoint
    Post {
        /// Endpoint path
        path: String,

        /// Inline JSON body
        #[arg(short, long)]
        data: Option<String>,
    },

    /// PUT a JSON body to an endpoint
    Put {
        /// Endpoint path
        path: String,

        /// Inline JSON body
        #[arg(short, long)]
        data: Option<String>,
    },

    /// DELETE an endpoint
    Delete {
        /// Endpoint path
        path: String,
    },

    /// Call the logout endpoint
    Logout,
}
