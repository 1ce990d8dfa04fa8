/*!
 * Session Tests
 * Auto-close, short transfers, write normalization and identifiers
 */

use pretty_assertions::assert_eq;

use boot_fs::fs::{FsType, Identifier, Unsupported};
use boot_fs::{FsError, Registry};

use super::common::*;

#[test]
fn test_write_then_read_round_trip() {
    let mut rig = rig();
    let payload: Vec<u8> = (0..1234u32).map(|i| (i * 7) as u8).collect();

    let mut session = rig.fs.bind_and_probe("mmc", Some("0:1"), FsType::Any).unwrap();
    let written = session.write_file("/boot/initrd", &payload, 0).unwrap();
    assert_eq!(written.actual, payload.len() as u64);
    assert!(!written.is_short());
    drop(session);

    let mut session = rig.fs.bind_and_probe("mmc", Some("0:1"), FsType::Any).unwrap();
    let mut buf = vec![0u8; 2048];
    let read = session.read_file("/boot/initrd", &mut buf, 0, 0).unwrap();
    assert_eq!(read.actual, payload.len() as u64);
    assert_eq!(&buf[..payload.len()], &payload[..]);
    assert!(rig.disk.is_dirty());
}

#[test]
fn test_short_read_succeeds() {
    let mut rig = rig();
    let mut session = rig.fs.bind_and_probe("mmc", Some("0:1"), FsType::Any).unwrap();
    session.write_file("/fifty", &[0x5A; 50], 0).unwrap();
    drop(session);

    let mut session = rig.fs.bind_and_probe("mmc", Some("0:1"), FsType::Any).unwrap();
    let mut buf = [0u8; 100];
    let transfer = session.read_file("/fifty", &mut buf, 0, 100).unwrap();
    assert_eq!(transfer.requested, 100);
    assert_eq!(transfer.actual, 50);
    assert!(transfer.is_short());
    assert_eq!(buf[49], 0x5A);
    assert_eq!(buf[50], 0);
}

#[test]
fn test_whole_file_read_is_never_short() {
    let mut rig = rig();
    let mut session = rig.fs.bind_and_probe("mmc", Some("0:1"), FsType::Any).unwrap();
    let mut buf = [0u8; 64];
    let transfer = session.read_file("/hello.txt", &mut buf, 0, 0).unwrap();
    assert_eq!(transfer.actual, HELLO.len() as u64);
    assert!(!transfer.is_short());
}

#[test]
fn test_size_read_write_auto_close() {
    let mut rig = rig();

    let mut session = rig.fs.bind_and_probe("mmc", Some("0:1"), FsType::Any).unwrap();
    assert_eq!(session.size("/hello.txt").unwrap(), HELLO.len() as u64);
    // Driver state is gone; the active type is kept
    assert_eq!(session.list("/"), Err(FsError::NotMounted));
    assert_eq!(session.fs_type(), FsType::Ram);
    drop(session);
    assert_eq!(rig.fs.active_type(), FsType::Ram);

    let mut session = rig.fs.resume().unwrap();
    assert!(!session.exists("/hello.txt"));
    drop(session);

    let mut session = rig.fs.bind_and_probe("mmc", Some("0:1"), FsType::Any).unwrap();
    let mut buf = [0u8; 4];
    assert!(session.read_file("/missing", &mut buf, 0, 4).is_err());
    assert!(!session.exists("/hello.txt"));
}

#[test]
fn test_list_exists_identifier_keep_mount() {
    let mut rig = rig();
    let mut session = rig.fs.bind_and_probe("mmc", Some("0:1"), FsType::Any).unwrap();

    let names: Vec<String> = session.list("/").unwrap().into_iter().map(|e| e.name).collect();
    assert_eq!(names, vec!["big", "boot", "empty", "hello.txt"]);
    assert!(session.exists("/boot/vmlinuz"));
    assert_eq!(session.identifier().unwrap().as_str(), rig.uuid.hyphenated().to_string());
    assert_eq!(session.size("/boot/vmlinuz").unwrap(), kernel_bytes().len() as u64);
}

#[test]
fn test_close_is_idempotent() {
    let mut rig = rig();
    let mut session = rig.fs.bind_and_probe("mmc", Some("0:1"), FsType::Any).unwrap();
    session.close();
    session.close();
    assert_eq!(session.fs_type(), FsType::Ram);
}

#[test]
fn test_failed_write_is_normalized() {
    let mut rig = rig();
    let mut session = rig.fs.bind_and_probe("mmc", Some("0:1"), FsType::Any).unwrap();
    assert_eq!(
        session.write_file("/no/such/dir/file", b"data", 0),
        Err(FsError::WriteFailed("/no/such/dir/file".into()))
    );

    // Zero-length write that fails moved exactly what was asked
    let mut session = rig.fs.bind_and_probe("mmc", Some("0:1"), FsType::Any).unwrap();
    assert!(matches!(
        session.write_file("/no/such/dir/file", b"", 0),
        Err(FsError::NotFound(_))
    ));
}

#[test]
fn test_identifier_real_driver_and_sentinel() {
    let mut rig = rig();
    let mut id = Identifier::zeroed();
    rig.fs
        .bind_and_probe("mmc", Some("0:1"), FsType::Any)
        .unwrap()
        .identifier_into(&mut id)
        .unwrap();
    assert_eq!(id.as_str().len(), 36);
    assert_eq!(id.as_str(), rig.uuid.hyphenated().to_string());

    let mut registry = Registry::new();
    let sentinel = registry.resolve_mut(FsType::Ext4);
    assert_eq!(sentinel.name(), Unsupported::NAME);
    let mut id = Identifier::zeroed();
    assert!(sentinel.identifier(&mut id).is_err());
    assert!(id.is_zeroed());
}

#[test]
fn test_hostfs_session() {
    let mut rig = rig();
    std::fs::write(rig.host.path().join("config.txt"), b"console=ttyS0").unwrap();

    let mut session = rig.fs.bind_and_probe("hostfs", None, FsType::Any).unwrap();
    assert_eq!(session.fs_type(), FsType::Host);
    assert!(session.exists("/config.txt"));
    assert!(matches!(session.identifier(), Err(FsError::NotSupported(_))));
    drop(session);

    let mut session = rig.fs.bind_and_probe("hostfs", Some("0"), FsType::Host).unwrap();
    session.write_file("/out.bin", b"abc", 0).unwrap();
    assert_eq!(std::fs::read(rig.host.path().join("out.bin")).unwrap(), b"abc");
}
