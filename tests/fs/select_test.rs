/*!
 * Selection Tests
 * Probe order, requested types, null devices and binding replacement
 */

use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::sync::Arc;

use boot_fs::block::PartitionDescriptor;
use boot_fs::fs::FsType;
use boot_fs::{BootFs, FsError, Registry};

use super::common::*;

fn scripted(drivers: &[(FsType, bool, bool)]) -> (BootFs, Arc<Mutex<Vec<String>>>) {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut registry = Registry::new();
    for &(fs_type, recognizes, null_ok) in drivers {
        registry
            .register(Scripted::boxed(fs_type, recognizes, null_ok, &log))
            .unwrap();
    }
    (BootFs::new(registry, Box::new(scripted_table())), log)
}

#[test]
fn test_first_success_in_registration_order() {
    let (mut fs, log) = scripted(&[
        (FsType::Ext4, false, false),
        (FsType::Fat, true, false),
        (FsType::Ram, true, false),
    ]);

    let session = fs.bind_and_probe("mmc", Some("0"), FsType::Any).unwrap();
    assert_eq!(session.fs_type(), FsType::Fat);
    drop(session);

    assert_eq!(fs.active_type(), FsType::Fat);
    assert_eq!(*log.lock(), vec!["probe:ext4", "probe:fat"]);
}

#[test]
fn test_requested_type_skips_other_drivers() {
    let (mut fs, log) = scripted(&[(FsType::Fat, true, false), (FsType::Ram, true, false)]);

    let session = fs.bind_and_probe("mmc", Some("0"), FsType::Ram).unwrap();
    assert_eq!(session.fs_type(), FsType::Ram);
    drop(session);

    assert_eq!(*log.lock(), vec!["probe:ramfs"]);
}

#[test]
fn test_requested_type_without_driver_fails() {
    let (mut fs, log) = scripted(&[(FsType::Fat, true, false)]);

    assert!(matches!(
        fs.bind_and_probe("mmc", Some("0"), FsType::Ext4),
        Err(FsError::ProbeFailure(_))
    ));
    assert!(log.lock().is_empty());
}

#[test]
fn test_null_device_skips_drivers_needing_one() {
    let (mut fs, log) = scripted(&[(FsType::Ext4, true, false)]);

    assert!(matches!(
        fs.bind_and_probe("virt", None, FsType::Any),
        Err(FsError::ProbeFailure(_))
    ));
    assert!(log.lock().is_empty());

    let (mut fs, log) = scripted(&[(FsType::Ext4, true, false), (FsType::Host, true, true)]);
    let session = fs.bind_and_probe("virt", Some("-"), FsType::Any).unwrap();
    assert_eq!(session.fs_type(), FsType::Host);
    assert!(session.binding().is_virtual());
    drop(session);
    assert_eq!(*log.lock(), vec!["probe:hostfs"]);
}

#[test]
fn test_failed_select_keeps_active_type() {
    let mut rig = rig();

    let session = rig.fs.bind_and_probe("mmc", Some("0:1"), FsType::Any).unwrap();
    assert_eq!(session.fs_type(), FsType::Ram);
    drop(session);

    // Partition 2 is blank: ramfs rejects it, hostfs refuses block devices
    assert!(matches!(
        rig.fs.bind_and_probe("mmc", Some("0:2"), FsType::Any),
        Err(FsError::ProbeFailure(_))
    ));
    assert_eq!(rig.fs.active_type(), FsType::Ram);
    assert_eq!(rig.fs.partition().map(|p| p.index), Some(2));
    assert!(rig.fs.resume().is_err());
}

#[test]
fn test_bind_failure_keeps_previous_binding() {
    let mut rig = rig();
    rig.fs.bind("mmc", Some("0:1")).unwrap();

    assert!(matches!(rig.fs.bind("mmc", Some("0:9")), Err(FsError::DeviceResolution(_))));
    assert!(matches!(rig.fs.bind("usb", Some("0")), Err(FsError::DeviceResolution(_))));
    assert!(matches!(rig.fs.bind("mmc", Some("zz")), Err(FsError::DeviceResolution(_))));
    assert_eq!(rig.fs.partition().map(|p| p.index), Some(1));

    rig.fs.select(FsType::Any).unwrap();
    assert!(rig.fs.resume().unwrap().exists("/hello.txt"));
}

#[test]
fn test_select_without_binding() {
    let mut rig = rig();
    assert!(matches!(rig.fs.select(FsType::Any), Err(FsError::DeviceResolution(_))));
    assert!(rig.fs.resume().is_err());
}

#[test]
fn test_default_partition_and_whole_disk() {
    let mut rig = rig();

    let session = rig.fs.bind_and_probe("mmc", None, FsType::Any).unwrap();
    assert_eq!(session.partition().index, 1);
    drop(session);

    rig.fs.bind("mmc", Some("0:0")).unwrap();
    assert_eq!(rig.fs.partition().map(|p| (p.index, p.blocks)), Some((0, 256)));
}

#[test]
fn test_attach_resolved_partition() {
    let mut rig = rig();
    let part = partitions().remove(0);

    let session = rig
        .fs
        .attach("mmc", Some(rig.disk.clone()), part, FsType::Ram)
        .unwrap();
    assert_eq!(session.driver_name(), "ramfs");
}

#[test]
fn test_file_exists_helper() {
    let mut rig = rig();
    assert!(rig.fs.file_exists("mmc", Some("0:1"), "/boot/vmlinuz", FsType::Any));
    assert!(!rig.fs.file_exists("mmc", Some("0:1"), "/boot/missing", FsType::Any));
    assert!(!rig.fs.file_exists("mmc", Some("0:7"), "/boot/vmlinuz", FsType::Any));
    assert!(!rig.fs.file_exists("mmc", Some("0:1"), "/boot/vmlinuz", FsType::Host));
}

proptest! {
    #[test]
    fn prop_select_returns_first_recognizing_driver(verdicts in proptest::collection::vec(any::<bool>(), 1..=4)) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = Registry::new();
        for (fs_type, &recognizes) in FsType::CONCRETE.iter().zip(&verdicts) {
            registry.register(Scripted::boxed(*fs_type, recognizes, true, &log)).unwrap();
        }

        let part = PartitionDescriptor::virtual_root("virt");
        let expected = FsType::CONCRETE
            .iter()
            .zip(&verdicts)
            .find(|(_, ok)| **ok)
            .map(|(t, _)| *t);

        match registry.select(None, &part, FsType::Any) {
            Ok(t) => prop_assert_eq!(Some(t), expected),
            Err(FsError::ProbeFailure(_)) => prop_assert_eq!(None, expected),
            Err(e) => prop_assert!(false, "unexpected error {}", e),
        }

        let probes = log.lock().len();
        let want = match expected {
            Some(t) => FsType::CONCRETE.iter().position(|c| *c == t).unwrap() + 1,
            None => verdicts.len(),
        };
        prop_assert_eq!(probes, want);
    }
}
