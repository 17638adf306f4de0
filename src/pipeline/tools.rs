//! External renderer and converter invocation.

use std::ffi::{OsStr, OsString};
use std::path::Path;
use std::process::Command;

use crate::error::{LayerexError, Result};

/// Program names for the external tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tools {
    pub renderer: String,
    pub converter: String,
}

impl Default for Tools {
    fn default() -> Self {
        Self {
            renderer: "inkscape".to_string(),
            converter: "convert".to_string(),
        }
    }
}

/// Exit status and captured output of a finished tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub program: String,
    /// Exit code; `None` if the process was killed by a signal.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    /// Output of a process that exited with code 0 and printed nothing.
    pub fn ok(program: &str) -> Self {
        Self {
            program: program.to_string(),
            status: Some(0),
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    /// Turn a non-zero exit into an error.
    pub fn into_result(self) -> Result<Self> {
        if self.success() {
            return Ok(self);
        }

        let status = match self.status {
            Some(code) => format!("exited with status {}", code),
            None => "was terminated by a signal".to_string(),
        };
        let stderr = self.stderr.trim();
        let message = if stderr.is_empty() {
            status
        } else {
            format!("{}: {}", status, stderr)
        };

        Err(LayerexError::ExternalTool {
            tool: self.program,
            status: self.status,
            message,
            help: None,
        })
    }
}

/// Runs external programs, blocking until they exit.
pub trait ToolRunner {
    fn run(&mut self, program: &str, args: &[OsString]) -> Result<ToolOutput>;
}

/// Runs programs with `std::process::Command`, capturing their output.
#[derive(Debug, Default)]
pub struct SystemRunner;

impl ToolRunner for SystemRunner {
    fn run(&mut self, program: &str, args: &[OsString]) -> Result<ToolOutput> {
        log::debug!("running {} {:?}", program, args);

        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|e| LayerexError::ExternalTool {
                tool: program.to_string(),
                status: None,
                message: format!("could not start: {}", e),
                help: Some(format!("Check that '{}' is installed and on your PATH", program)),
            })?;

        Ok(ToolOutput {
            program: program.to_string(),
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Renderer arguments: the configured extras, then the SVG.
pub fn renderer_argv(extra: &[String], svg: &Path) -> Vec<OsString> {
    extra
        .iter()
        .map(OsString::from)
        .chain([svg.as_os_str().to_os_string()])
        .collect()
}

/// Converter arguments: the PNG, the configured extras, then the output.
pub fn converter_argv(png: &Path, extra: &[String], output: &Path) -> Vec<OsString> {
    [png.as_os_str().to_os_string()]
        .into_iter()
        .chain(extra.iter().map(OsString::from))
        .chain([output.as_os_str().to_os_string()])
        .collect()
}

/// Render a command line for log and status output.
pub fn display_command(program: &str, args: &[OsString]) -> String {
    std::iter::once(OsStr::new(program))
        .chain(args.iter().map(OsString::as_os_str))
        .map(|a| a.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}
