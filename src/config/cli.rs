use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum, ValueHint, builder::BoolishValueParser};

/// Command-line arguments for the pawboard operator client.
#[derive(Debug, Parser)]
#[command(
    name = "pawboard",
    version,
    about = "Moderation and list client for the pawboard admin API"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(
        long = "config-file",
        env = "PAWBOARD_CONFIG_FILE",
        value_name = "PATH",
        value_hint = ValueHint::FilePath
    )]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: GlobalOverrides,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args, Default, Clone)]
pub struct GlobalOverrides {
    /// Override the admin API base URL.
    #[arg(long = "api-url", value_name = "URL", global = true)]
    pub api_url: Option<String>,

    /// Bearer token sent with every request.
    #[arg(
        long = "api-token",
        env = "PAWBOARD_API_TOKEN",
        value_name = "TOKEN",
        hide_env_values = true,
        global = true
    )]
    pub api_token: Option<String>,

    /// Abort requests that take longer than this many seconds.
    #[arg(long = "api-timeout-seconds", value_name = "SECONDS", global = true)]
    pub api_timeout_seconds: Option<u64>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub log_json: Option<bool>,

    /// Name recorded as the resolving admin on optimistic updates.
    #[arg(long = "actor", value_name = "NAME", global = true)]
    pub actor: Option<String>,

    /// Bulk aggregation (all_or_nothing|per_item).
    #[arg(long = "bulk-mode", value_name = "MODE", global = true)]
    pub bulk_mode: Option<String>,

    /// Bulk transport (fan_out|batched).
    #[arg(long = "bulk-strategy", value_name = "STRATEGY", global = true)]
    pub bulk_strategy: Option<String>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Moderate user reports.
    Reports(ReportsArgs),
    /// Decide organization registration requests.
    #[command(name = "org-requests")]
    OrgRequests(OrgRequestsArgs),
    /// Publish, unpublish or delete news items.
    News(NewsArgs),
}

#[derive(Debug, Args, Clone)]
pub struct ReportsArgs {
    #[command(subcommand)]
    pub command: ReportsCommand,
}

#[derive(Debug, Subcommand, Clone)]
pub enum ReportsCommand {
    /// Show one page of reports.
    List(ListArgs),
    /// Apply a moderation action to one or more reports.
    Act(ReportActArgs),
}

#[derive(Debug, Args, Clone)]
pub struct ReportActArgs {
    #[arg(value_enum)]
    pub action: ReportActionArg,

    #[command(flatten)]
    pub target: ActionArgs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportActionArg {
    Hide,
    Delete,
    Dismiss,
}

#[derive(Debug, Args, Clone)]
pub struct OrgRequestsArgs {
    #[command(subcommand)]
    pub command: OrgRequestsCommand,
}

#[derive(Debug, Subcommand, Clone)]
pub enum OrgRequestsCommand {
    /// Show one page of organization requests.
    List(ListArgs),
    /// Approve the given requests.
    Approve(ActionArgs),
    /// Reject the given requests.
    Reject(ActionArgs),
}

#[derive(Debug, Args, Clone)]
pub struct NewsArgs {
    #[command(subcommand)]
    pub command: NewsCommand,
}

#[derive(Debug, Subcommand, Clone)]
pub enum NewsCommand {
    /// Show one page of news items.
    List(ListArgs),
    Publish(ActionArgs),
    Unpublish(ActionArgs),
    /// Delete news items; needs the confirmation phrase.
    Delete(ActionArgs),
}

/// Which page of which rows to load.
#[derive(Debug, Args, Clone, Default)]
pub struct ListArgs {
    #[arg(long, value_name = "N", default_value_t = 1)]
    pub page: u32,

    #[arg(long = "page-size", value_name = "N")]
    pub page_size: Option<u32>,

    /// Column to sort by.
    #[arg(long, value_name = "KEY")]
    pub sort: Option<String>,

    /// Sort descending instead of ascending.
    #[arg(long, requires = "sort")]
    pub desc: bool,

    /// Only rows in this status.
    #[arg(long, value_name = "STATUS")]
    pub status: Option<String>,

    /// Free-text search.
    #[arg(long = "search", value_name = "TEXT")]
    pub search: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct ActionArgs {
    /// Row ids to act on.
    #[arg(value_name = "ID", required = true, num_args = 1..)]
    pub ids: Vec<String>,

    /// Reason recorded with the decision.
    #[arg(long, value_name = "TEXT")]
    pub reason: Option<String>,

    /// Confirmation phrase for destructive actions.
    #[arg(long, value_name = "PHRASE")]
    pub confirm: Option<String>,

    /// Confirm actions that only need a yes.
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Page whose rows are patched locally before the server answers.
    #[command(flatten)]
    pub list: ListArgs,
}
