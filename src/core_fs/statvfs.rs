use std::path::Path;
use sysinfo::{DiskExt, System, SystemExt};

use crate::core_fs::error::FsError;

const BLOCK_SIZE: u64 = 4096;

/// Filesystem statistics in the shape of the `statvfs@openssh.com` reply.
/// Figures come from the disk holding the served tree: free/total space
/// with a constant block size; inode counts and flags are not available
/// through this backend and report zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatVfs {
    pub block_size: u64,
    pub fragment_size: u64,
    pub blocks: u64,
    pub free: u64,
    pub avail: u64,
    pub files: u64,
    pub ffree: u64,
    pub favail: u64,
    pub fsid: u64,
    pub flags: u64,
    pub namemax: u64,
}

pub fn stat_vfs(path: &Path) -> Result<StatVfs, FsError> {
    let sys = System::new_all();

    // Pick the disk with the longest mount point containing the path.
    let mut best: Option<(usize, u64, u64)> = None;
    for disk in sys.disks() {
        let mount = disk.mount_point();
        if path.starts_with(mount) {
            let depth = mount.components().count();
            if best.map_or(true, |(d, _, _)| depth >= d) {
                best = Some((depth, disk.total_space(), disk.available_space()));
            }
        }
    }

    let (_, total, available) = best.ok_or(FsError::Unsupported)?;
    Ok(StatVfs {
        block_size: BLOCK_SIZE,
        fragment_size: BLOCK_SIZE,
        blocks: total / BLOCK_SIZE,
        free: available / BLOCK_SIZE,
        avail: available / BLOCK_SIZE,
        files: 0,
        ffree: 0,
        favail: 0,
        fsid: 0,
        flags: 0,
        namemax: 255,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_space_for_the_temp_dir() {
        // Containerized hosts may expose no disks at all; only a present
        // disk has figures worth checking.
        match stat_vfs(&std::env::temp_dir()) {
            Ok(stats) => {
                assert_eq!(stats.block_size, 4096);
                assert!(stats.blocks >= stats.avail);
            }
            Err(FsError::Unsupported) => {}
            Err(e) => panic!("unexpected statvfs error: {}", e),
        }
    }
}
