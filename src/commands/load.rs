/*!
 * Load Command
 * Reads a file from the bound partition into memory
 */

use std::time::Instant;
use tracing::{info, warn};

use super::parse::{parse_hex_lenient, parse_hex_strict};
use super::{check_arity, report_transfer, CommandContext};
use crate::core::limits::{ENV_BOOTFILE, ENV_FILEADDR, ENV_FILESIZE, ENV_LOADADDR};
use crate::core::{FsError, FsResult};
use crate::fs::FsType;

/// `load <interface> [<dev[:part]> [<addr> [<filename> [bytes [pos]]]]]`
///
/// `addr` must be pure hex; without it `loadaddr` is used, then the
/// configured default. Without `filename`, `bootfile` is used. `bytes` 0
/// reads the whole file.
pub(super) fn do_load(ctx: &mut CommandContext<'_>, argv: &[&str], requested: FsType) -> FsResult<()> {
    check_arity(argv, 2, 7)?;

    let mut session = ctx.fs.bind_and_probe(argv[1], argv.get(2).copied(), requested)?;

    let addr = match argv.get(3) {
        Some(token) => parse_hex_strict(token)
            .ok_or_else(|| FsError::Usage(format!("malformed address {}", token)))?,
        None => match ctx.env.get(ENV_LOADADDR) {
            Some(value) => parse_hex_lenient(&value),
            None => ctx.default_load_addr,
        },
    };

    let filename = match argv.get(4) {
        Some(name) => name.to_string(),
        None => match ctx.env.get(ENV_BOOTFILE) {
            Some(name) => name,
            None => {
                writeln!(ctx.out, "** No boot file defined **")?;
                return Err(FsError::NotFound("no boot file defined".into()));
            }
        },
    };

    let bytes = argv.get(5).map(|s| parse_hex_lenient(s)).unwrap_or(0);
    let pos = argv.get(6).map(|s| parse_hex_lenient(s)).unwrap_or(0);

    let start = Instant::now();
    let transfer = {
        let mut buf = match ctx.memory.map(addr, bytes) {
            Ok(buf) => buf,
            Err(e) => {
                warn!(addr = format_args!("{:#x}", addr), bytes, error = %e, "Cannot map load buffer");
                session.close();
                return Err(e);
            }
        };
        session.read_file(&filename, &mut buf, pos, bytes)?
    };
    let elapsed = start.elapsed();
    drop(session);

    info!(
        file = %filename,
        addr = format_args!("{:#x}", addr),
        bytes = transfer.actual,
        elapsed_ms = elapsed.as_millis() as u64,
        "Loaded file"
    );
    report_transfer(ctx.out, transfer.actual, "read", elapsed.as_millis())?;

    ctx.env.set_hex(ENV_FILEADDR, addr);
    ctx.env.set_hex(ENV_FILESIZE, transfer.actual);
    Ok(())
}
