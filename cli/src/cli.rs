use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use stashbox_business::{DEFAULT_API_BASE_URL, UploaderOptions};

#[derive(Parser)]
#[command(name = "stashbox")]
#[command(about = "Upload files to a stashbox service", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Base URL of the stashbox service
    #[arg(long, global = true, env = "STASHBOX_API_URL", default_value = DEFAULT_API_BASE_URL)]
    pub api_url: String,

    /// Show timing/latency information
    #[arg(long, global = true)]
    pub timing: bool,

    /// Enable verbose debug output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upload one batch of files
    Upload(UploadArgs),
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Clone)]
pub struct UploadArgs {
    /// Files to upload
    #[arg(long = "file", short = 'f', required = true)]
    pub files: Vec<PathBuf>,

    /// Single-file uploader: a selection replaces instead of appending
    #[arg(long)]
    pub single: bool,

    /// Accepted types, e.g. "image/*,application/pdf"
    #[arg(long, default_value = "image/*")]
    pub accept: String,

    /// Per-file size limit in megabytes
    #[arg(long, default_value_t = 20)]
    pub max_size_mb: u64,

    /// Maximum number of files in the batch
    #[arg(long, default_value_t = 10)]
    pub max_files: usize,
}

impl UploadArgs {
    pub fn options(&self) -> UploaderOptions {
        UploaderOptions {
            multiple: !self.single,
            accept: self.accept.clone(),
            max_size_mb: self.max_size_mb,
            max_files: self.max_files,
            disabled: false,
        }
    }
}
