/*!
 * Command Handlers
 * Loader-style filesystem commands: size, load, ls, save, uuid, fstype
 */

mod info;
mod load;
mod ls;
pub mod parse;
mod save;

use std::fmt;
use std::io::Write;
use std::process::ExitCode;
use tracing::{debug, error};

use crate::core::{FsError, FsResult};
use crate::env::Environment;
use crate::fs::{BootFs, FsType};
use crate::memory::BufferMapper;
use crate::monitoring::command_span;

/// Outcome of a command, collapsed to three exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Success,
    Failure,
    Usage,
}

impl CommandStatus {
    /// Process exit code: 0 success, 1 failure, 2 usage
    pub const fn code(self) -> u8 {
        match self {
            CommandStatus::Success => 0,
            CommandStatus::Failure => 1,
            CommandStatus::Usage => 2,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            CommandStatus::Success => "success",
            CommandStatus::Failure => "failure",
            CommandStatus::Usage => "usage",
        }
    }

    #[inline]
    pub const fn is_success(self) -> bool {
        matches!(self, CommandStatus::Success)
    }
}

impl fmt::Display for CommandStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<CommandStatus> for ExitCode {
    fn from(status: CommandStatus) -> Self {
        ExitCode::from(status.code())
    }
}

/// Everything a handler may touch
pub struct CommandContext<'a> {
    pub fs: &'a mut BootFs,
    pub memory: &'a dyn BufferMapper,
    pub env: &'a dyn Environment,
    /// Console output
    pub out: &'a mut dyn Write,
    /// Load address used when neither the command nor `loadaddr` give one
    pub default_load_addr: u64,
}

impl<'a> CommandContext<'a> {
    pub fn new(
        fs: &'a mut BootFs,
        memory: &'a dyn BufferMapper,
        env: &'a dyn Environment,
        out: &'a mut dyn Write,
        default_load_addr: u64,
    ) -> Self {
        Self {
            fs,
            memory,
            env,
            out,
            default_load_addr,
        }
    }
}

type Handler = fn(&mut CommandContext<'_>, &[&str], FsType) -> FsResult<()>;

struct Command {
    name: &'static str,
    usage: &'static str,
    handler: Handler,
}

const COMMANDS: &[Command] = &[
    Command {
        name: "size",
        usage: "<interface> <dev[:part]> <filename>",
        handler: info::do_size,
    },
    Command {
        name: "load",
        usage: "<interface> [<dev[:part]> [<addr> [<filename> [bytes [pos]]]]]",
        handler: load::do_load,
    },
    Command {
        name: "ls",
        usage: "<interface> [<dev[:part]> [directory]]",
        handler: ls::do_ls,
    },
    Command {
        name: "save",
        usage: "<interface> <dev[:part]> <addr> <filename> bytes [pos]",
        handler: save::do_save,
    },
    Command {
        name: "uuid",
        usage: "<interface> <dev[:part]> [<varname>]",
        handler: info::do_uuid,
    },
    Command {
        name: "fstype",
        usage: "<interface> <dev[:part]> [<varname>]",
        handler: info::do_fstype,
    },
];

/// Find the command for `name`, honoring type prefixes (`ext4load`, `ramfsls`)
fn lookup(name: &str) -> Option<(&'static Command, FsType)> {
    if let Some(command) = COMMANDS.iter().find(|c| c.name == name) {
        return Some((command, FsType::Any));
    }

    COMMANDS.iter().find_map(|command| {
        let prefix = name.strip_suffix(command.name)?;
        let fs_type = prefix.parse::<FsType>().ok().filter(|t| !t.is_any())?;
        Some((command, fs_type))
    })
}

/// Reject argument vectors outside `min..=max` (command name included)
pub(crate) fn check_arity(argv: &[&str], min: usize, max: usize) -> FsResult<()> {
    if argv.len() < min || argv.len() > max {
        return Err(FsError::Usage(format!(
            "{} takes {} to {} arguments, got {}",
            argv.first().copied().unwrap_or("command"),
            min - 1,
            max - 1,
            argv.len().saturating_sub(1)
        )));
    }
    Ok(())
}

/// Run one command; `argv[0]` is the command name
pub fn run(ctx: &mut CommandContext<'_>, argv: &[&str]) -> CommandStatus {
    let Some(&name) = argv.first() else {
        return CommandStatus::Usage;
    };

    let span = command_span(name, argv.len());
    let _guard = span.enter();

    let Some((command, requested)) = lookup(name) else {
        error!(command = name, "Unknown command");
        let _ = writeln!(ctx.out, "Unknown command '{}'", name);
        return CommandStatus::Failure;
    };

    let status = match (command.handler)(ctx, argv, requested) {
        Ok(()) => CommandStatus::Success,
        Err(FsError::Usage(reason)) => {
            debug!(reason = %reason, "Usage error");
            let _ = writeln!(ctx.out, "Usage:\n{} {}", name, command.usage);
            CommandStatus::Usage
        }
        Err(e) => {
            error!(command = name, error = %e, "Command failed");
            CommandStatus::Failure
        }
    };

    span.record("status", status.as_str());
    status
}

/// Split a console line into arguments; blank lines and `#` comments yield nothing
pub fn split_line(line: &str) -> Vec<&str> {
    let line = line.trim();
    if line.starts_with('#') {
        return Vec::new();
    }
    line.split_whitespace().collect()
}

/// Human-readable byte count, e.g. `1.5 MiB`
pub(crate) fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];
    if bytes < 1024 {
        return format!("{} Bytes", bytes);
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

/// `N bytes <verb> in T ms (R/s)` transfer summary line
pub(crate) fn report_transfer(out: &mut dyn Write, bytes: u64, verb: &str, elapsed_ms: u128) -> FsResult<()> {
    write!(out, "{} bytes {} in {} ms", bytes, verb, elapsed_ms)?;
    if elapsed_ms > 0 {
        let rate = (bytes as u128 * 1000 / elapsed_ms) as u64;
        write!(out, " ({}/s)", format_size(rate))?;
    }
    writeln!(out)?;
    Ok(())
}
