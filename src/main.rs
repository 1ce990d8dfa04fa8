/*!
 * bootfs - Boot Filesystem Shell
 *
 * Runs loader-style filesystem commands against configured disk images:
 * - one command from the argument list, or
 * - one command per line from stdin
 */

use std::io::{self, BufRead};
use std::process::ExitCode;
use tracing::{error, info};

use boot_fs::core::limits::ENV_BOOTFILE;
use boot_fs::{
    commands::split_line, init_tracing, run, BootConfig, BootFs, CommandContext, CommandStatus, EnvStore,
    Environment, HostFs, RamFs, Registry, SysMem,
};

fn main() -> ExitCode {
    init_tracing();

    match start() {
        Ok(status) => status.into(),
        Err(report) => {
            eprintln!("{:?}", report);
            ExitCode::from(CommandStatus::Failure.code())
        }
    }
}

fn start() -> miette::Result<CommandStatus> {
    let config = BootConfig::from_env()?;
    let (table, persist) = config.device_table()?;

    let mut registry = Registry::new().with_driver(Box::new(RamFs::new()))?;
    if let Some(root) = &config.host_root {
        info!(root = %root.display(), "Serving host directory");
        registry.register(Box::new(HostFs::new(root)))?;
    }
    info!(drivers = ?registry.types(), "Filesystem drivers registered");

    let mut fs = BootFs::new(registry, Box::new(table));
    let memory = SysMem::new(config.memory_base, config.memory_size);
    let env = EnvStore::new();
    if let Some(bootfile) = &config.bootfile {
        env.set(ENV_BOOTFILE, bootfile);
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut ctx = CommandContext::new(&mut fs, &memory, &env, &mut out, config.load_addr);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let status = if args.is_empty() {
        run_batch(&mut ctx)?
    } else {
        let argv: Vec<&str> = args.iter().map(String::as_str).collect();
        run(&mut ctx, &argv)
    };
    out_flush(&mut ctx)?;

    for target in &persist {
        if let Err(e) = target.persist() {
            error!(path = %target.path.display(), error = %e, "Failed to persist disk image");
        }
    }
    Ok(status)
}

/// Run stdin line by line; the last command's status wins
fn run_batch(ctx: &mut CommandContext<'_>) -> miette::Result<CommandStatus> {
    let mut status = CommandStatus::Success;
    for line in io::stdin().lock().lines() {
        let line = line.map_err(boot_fs::FsError::from)?;
        let argv = split_line(&line);
        if argv.is_empty() {
            continue;
        }
        status = run(ctx, &argv);
    }
    Ok(status)
}

fn out_flush(ctx: &mut CommandContext<'_>) -> miette::Result<()> {
    ctx.out.flush().map_err(boot_fs::FsError::from)?;
    Ok(())
}
