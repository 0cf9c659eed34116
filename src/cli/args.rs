//! Command-line argument definitions

use clap::Args;

/// Positional arguments of an operation invocation
#[derive(Args, Debug, Clone)]
pub struct InvocationArgs {
    /// Input video file path (a URL for youtube_dl)
    #[arg(required_unless_present_any = ["list", "search"])]
    pub input: Option<String>,

    /// Operation name, see --list
    #[arg(required_unless_present_any = ["list", "search"])]
    pub operation: Option<String>,

    /// Output file path (default: video.mp4)
    pub output: Option<String>,

    /// Operation arguments, positional or name=value
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}
