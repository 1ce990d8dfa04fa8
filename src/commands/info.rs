/*!
 * Information Commands
 * size, uuid and fstype
 */

use tracing::debug;

use super::{check_arity, CommandContext};
use crate::core::limits::ENV_FILESIZE;
use crate::core::FsResult;
use crate::fs::{FsType, Identifier};

/// `size <interface> <dev[:part]> <filename>`: store the file size in `filesize`
pub(super) fn do_size(ctx: &mut CommandContext<'_>, argv: &[&str], requested: FsType) -> FsResult<()> {
    check_arity(argv, 4, 4)?;

    let mut session = ctx.fs.bind_and_probe(argv[1], Some(argv[2]), requested)?;
    let size = session.size(argv[3])?;

    debug!(file = argv[3], size, "File size");
    ctx.env.set_hex(ENV_FILESIZE, size);
    Ok(())
}

/// `uuid <interface> <dev[:part]> [<varname>]`: print or store the filesystem identifier
pub(super) fn do_uuid(ctx: &mut CommandContext<'_>, argv: &[&str], requested: FsType) -> FsResult<()> {
    check_arity(argv, 3, 4)?;

    let mut id = Identifier::zeroed();
    ctx.fs
        .bind_and_probe(argv[1], Some(argv[2]), requested)?
        .identifier_into(&mut id)?;

    match argv.get(3) {
        Some(var) => ctx.env.set(var, id.as_str()),
        None => writeln!(ctx.out, "{}", id)?,
    }
    Ok(())
}

/// `fstype <interface> <dev[:part]> [<varname>]`: print or store the recognizing driver's name
pub(super) fn do_fstype(ctx: &mut CommandContext<'_>, argv: &[&str], requested: FsType) -> FsResult<()> {
    check_arity(argv, 3, 4)?;

    let session = ctx.fs.bind_and_probe(argv[1], Some(argv[2]), requested)?;
    let name = session.driver_name().to_string();
    drop(session);

    match argv.get(3) {
        Some(var) => ctx.env.set(var, &name),
        None => writeln!(ctx.out, "{}", name)?,
    }
    Ok(())
}
