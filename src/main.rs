//! CLI entry point for clug.

use std::process::ExitCode;

mod app;
mod app_config;
mod cli;
mod commands;
mod output;

/// Process outcome mapped to the exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcessExit {
    /// Completed, nothing to do, or no surveys found.
    Success,
    /// Completed, but some requested surveys were not found.
    Partial,
    /// Aborted by an error.
    Failure,
}

impl ProcessExit {
    pub(crate) fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
            Self::Partial => 2,
        }
    }
}

impl From<ProcessExit> for ExitCode {
    fn from(exit: ProcessExit) -> Self {
        ExitCode::from(exit.code())
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    match app::runtime::run_clug().await {
        Ok(exit) => exit.into(),
        Err(err) => {
            eprintln!("error: {err:#}");
            ProcessExit::Failure.into()
        }
    }
}
