/*!
 * Directory Listing Command
 */

use super::{check_arity, CommandContext};
use crate::core::FsResult;
use crate::fs::FsType;

/// `ls <interface> [<dev[:part]> [directory]]`
pub(super) fn do_ls(ctx: &mut CommandContext<'_>, argv: &[&str], requested: FsType) -> FsResult<()> {
    check_arity(argv, 2, 4)?;

    let dir = argv.get(3).copied().unwrap_or("/");
    let entries = ctx
        .fs
        .bind_and_probe(argv[1], argv.get(2).copied(), requested)?
        .list(dir)?;

    let mut files = 0;
    let mut dirs = 0;
    for entry in &entries {
        if entry.is_dir() {
            dirs += 1;
        } else {
            files += 1;
        }
        writeln!(ctx.out, "{}", entry)?;
    }
    writeln!(ctx.out, "\n{} file(s), {} dir(s)\n", files, dirs)?;
    Ok(())
}
