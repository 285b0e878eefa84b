//! Minimal on-disk images: zero bytes with the signatures the locator keys
//! on, plus a few recognizable fields.

use fsmutator::consts::*;
use fsmutator::FsType;

fn put(data: &mut [u8], off: usize, bytes: &[u8]) {
    data[off..off + bytes.len()].copy_from_slice(bytes);
}

pub fn plant_ufs_sb(data: &mut [u8], fs: FsType, off: usize) {
    put(data, off + 48, &32768i32.to_le_bytes()); /* fs_bsize */
    put(data, off + 212, b"/mnt"); /* fs_fsmnt */
    put(data, off + UFS_SB_SIZE - 4, fs.sb_magic());
}

pub fn ufs_image(fs: FsType, len: usize, sbs: &[usize], cgs: &[usize]) -> Vec<u8> {
    let mut data = vec![0u8; len];
    for &off in sbs {
        plant_ufs_sb(&mut data, fs, off);
    }
    for &off in cgs {
        put(&mut data, off + CG_MAGIC_OFF, &CG_MAGIC_BYTES);
    }
    data
}

pub fn ext_image(len: usize, sbs: &[usize], uuid: &[u8; 16]) -> Vec<u8> {
    let mut data = vec![0u8; len];
    for &off in sbs {
        put(&mut data, off + EXT2_MAGIC_OFF, &EXT2_MAGIC_SIG);
        put(&mut data, off + EXT2_UUID_OFF, uuid);
    }
    data
}
