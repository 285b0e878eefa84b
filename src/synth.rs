//! Synthetic images: zero-filled buffers with just enough signature bytes
//! planted for the locator to pick structures up. Used by the tests and the
//! fuzz targets.

use crate::consts::*;
use crate::FsType;

fn put(data: &mut [u8], off: usize, bytes: &[u8]) {
    data[off..off + bytes.len()].copy_from_slice(bytes);
}

/// Plant a UFS superblock of type `fs` at `off`: magic, `fs_sblockloc`,
/// `fs_bsize`/`fs_fsize` and a mount point.
pub fn plant_ufs_sb(data: &mut [u8], fs: FsType, off: usize) {
    put(data, off + 48, &32768i32.to_le_bytes()); /* fs_bsize */
    put(data, off + 52, &4096i32.to_le_bytes()); /* fs_fsize */
    put(data, off + 212, b"/mnt"); /* fs_fsmnt */
    put(data, off + 1000, &(off as i64).to_le_bytes()); /* fs_sblockloc */
    put(data, off + UFS_SB_SIZE - 4, fs.sb_magic());
}

/// Plant a cylinder group header at `off`.
pub fn plant_cg(data: &mut [u8], off: usize) {
    put(data, off + CG_MAGIC_OFF, &CG_MAGIC_BYTES);
    put(data, off + 12, &((off >> 16) as u32).to_le_bytes()); /* cg_cgx */
}

/// Plant an ext superblock at `off` carrying `uuid`.
pub fn plant_ext_sb(data: &mut [u8], off: usize, uuid: &[u8; 16]) {
    put(data, off + 24, &2u32.to_le_bytes()); /* e2fs_log_bsize */
    put(data, off + EXT2_MAGIC_OFF, &EXT2_MAGIC_SIG);
    put(data, off + 76, &1u32.to_le_bytes()); /* e2fs_rev */
    put(data, off + EXT2_UUID_OFF, uuid);
}

/// A `len` byte UFS image with superblocks at `sbs` and cylinder groups at
/// `cgs`.
pub fn ufs_image(fs: FsType, len: usize, sbs: &[usize], cgs: &[usize]) -> Vec<u8> {
    let mut data = vec![0u8; len];
    for &off in sbs {
        plant_ufs_sb(&mut data, fs, off);
    }
    for &off in cgs {
        plant_cg(&mut data, off);
    }
    data
}

/// A `len` byte ext image with superblocks at `sbs`, all sharing `uuid`.
pub fn ext_image(len: usize, sbs: &[usize], uuid: &[u8; 16]) -> Vec<u8> {
    let mut data = vec![0u8; len];
    for &off in sbs {
        plant_ext_sb(&mut data, off, uuid);
    }
    data
}
