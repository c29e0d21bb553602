use clap::Parser;
use serde::Serialize;

#[derive(Debug, Default, Parser, Serialize)]
#[command(author, version, about = "Track AtCoder standings and ratings for a fixed roster")]
pub struct Cli {
    /// Tracked AtCoder user names, replacing the configured roster
    #[arg(long, num_args = 1..)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub roster: Vec<String>,

    /// One of TRACE, DEBUG, INFO, WARN, ERROR
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_level: Option<String>,

    /// Print the roster standings for a contest (e.g. abc300) and exit
    #[arg(long)]
    #[serde(skip)]
    pub contest: Option<String>,
}
