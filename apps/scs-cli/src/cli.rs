use std::path::PathBuf;

use clap::{Parser, Subcommand};
use scs_client::ByteRange;

/// scs - command-line client for SCS object storage
#[derive(Parser, Debug)]
#[command(name = "scs")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// JSON config file with `accesskey`, `secretkey`, `endpoint` and `bucket`
    #[arg(short, long, global = true, env = "SCS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Endpoint template; `$` is replaced by the bucket name
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Bucket for object commands (defaults to `bucket` from the config file)
    #[arg(short, long, global = true, env = "SCS_BUCKET")]
    pub bucket: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List buckets
    Buckets,

    /// Show bucket metadata
    Meta,

    /// Create a bucket
    Mb {
        /// Bucket name
        name: String,

        /// Canned ACL
        #[arg(long, default_value = "private")]
        acl: String,
    },

    /// Delete an empty bucket
    Rb {
        /// Bucket name
        name: String,
    },

    /// Show the bucket ACL
    Acl,

    /// List objects
    Ls {
        /// Only keys starting with this prefix
        #[arg(long, default_value = "")]
        prefix: String,

        /// Group keys sharing a prefix up to this delimiter
        #[arg(long, default_value = "")]
        delimiter: String,

        /// Start listing after this key
        #[arg(long, default_value = "")]
        marker: String,

        /// Maximum number of keys
        #[arg(long, default_value = "100")]
        limit: u64,
    },

    /// Show object metadata
    Head {
        /// Object key
        key: String,
    },

    /// Download an object
    Get {
        /// Object key
        key: String,

        /// Byte range, `start-end` or `start-`
        #[arg(long)]
        range: Option<ByteRange>,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Upload a file in one request
    Put {
        /// Object key
        key: String,

        /// Local file
        file: PathBuf,

        /// Custom metadata, `name=value` (repeatable)
        #[arg(long = "meta", value_parser = parse_meta)]
        meta: Vec<(String, String)>,
    },

    /// Delete an object
    Rm {
        /// Object key
        key: String,
    },

    /// Upload a file as a multipart upload
    Upload {
        /// Object key
        key: String,

        /// Local file
        file: PathBuf,

        /// Part size in MiB
        #[arg(long, default_value = "5")]
        part_size: u64,

        /// Custom metadata, `name=value` (repeatable)
        #[arg(long = "meta", value_parser = parse_meta)]
        meta: Vec<(String, String)>,
    },
}

/// Parse `name=value`, prefixing `x-amz-meta-` when missing.
fn parse_meta(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got {s}"))?;
    let name = name.trim().to_ascii_lowercase();
    if name.is_empty() {
        return Err(format!("empty metadata name in {s}"));
    }
    let name = if name.starts_with(scs_model::headers::X_AMZ_META_PREFIX) {
        name
    } else {
        format!("{}{name}", scs_model::headers::X_AMZ_META_PREFIX)
    };
    Ok((name, value.to_owned()))
}
