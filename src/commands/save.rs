/*!
 * Save Command
 * Writes a memory region to a file on the bound partition
 */

use std::time::Instant;
use tracing::{info, warn};

use super::parse::parse_hex_lenient;
use super::{check_arity, report_transfer, CommandContext};
use crate::core::FsResult;
use crate::fs::FsType;

/// `save <interface> <dev[:part]> <addr> <filename> bytes [pos]`
pub(super) fn do_save(ctx: &mut CommandContext<'_>, argv: &[&str], requested: FsType) -> FsResult<()> {
    check_arity(argv, 6, 7)?;

    let mut session = ctx.fs.bind_and_probe(argv[1], Some(argv[2]), requested)?;

    let addr = parse_hex_lenient(argv[3]);
    let filename = argv[4];
    let bytes = parse_hex_lenient(argv[5]);
    let pos = argv.get(6).map(|s| parse_hex_lenient(s)).unwrap_or(0);

    let start = Instant::now();
    let transfer = if bytes == 0 {
        session.write_file(filename, &[], pos)?
    } else {
        let buf = match ctx.memory.map(addr, bytes) {
            Ok(buf) => buf,
            Err(e) => {
                warn!(addr = format_args!("{:#x}", addr), bytes, error = %e, "Cannot map save buffer");
                session.close();
                return Err(e);
            }
        };
        session.write_file(filename, &buf, pos)?
    };
    let elapsed = start.elapsed();
    drop(session);

    info!(
        file = filename,
        bytes = transfer.actual,
        elapsed_ms = elapsed.as_millis() as u64,
        "Saved file"
    );
    report_transfer(ctx.out, transfer.actual, "written", elapsed.as_millis())
}
