use clap::Parser;
use std::path::PathBuf;

/// Local sidecar for the school dashboard: newline-delimited JSON requests on
/// stdin, one JSON response per line on stdout.
#[derive(Debug, Parser)]
#[command(name = "classroomd", version)]
pub struct Config {
    /// Workspace directory to open at startup.
    #[arg(long, env = "CLASSROOMD_WORKSPACE")]
    pub workspace: Option<PathBuf>,

    /// Fill empty workspaces with the demo timetable and roster.
    #[arg(long, env = "CLASSROOMD_SEED_DEMO")]
    pub seed_demo: bool,
}
