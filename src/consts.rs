// fs.h
pub const SBLOCK_UFS1: usize = 8192;
pub const SBLOCK_UFS2: usize = 65536;
pub const SBLOCK_PIGGY: usize = 262144;

pub const SBLOCKSEARCH: [usize; 3] = [SBLOCK_UFS1, SBLOCK_UFS2, SBLOCK_PIGGY];

pub const MAXMNTLEN: usize = 468;
pub const MAXVOLLEN: usize = 32;

/* pointer-sized slots on LP64 */
pub const NOCSPTRS: usize = (128 / 8) - 4;

pub const FSMAXSNAP: usize = 20;

pub const MAXFRAG: usize = 8;

pub const FS_UFS1_MAGIC: i32 = 0x011954;
pub const FS_UFS2_MAGIC: i32 = 0x19540119;

// cylinder group
pub const CG_MAGIC: i32 = 0x090255;

/* the high byte of cg_magic is zero, so only three bytes identify it */
pub const CG_MAGIC_SIG: [u8; 3] = [0x55, 0x02, 0x09];

/// Byte offset of `cg_magic` inside `struct cg`.
pub const CG_MAGIC_OFF: usize = 4;

// ext2fs.h
pub const SBLOCK_EXT2: usize = 1024;
pub const EXT2_MAGIC: u16 = 0xef53;

/// Byte offset of `e2fs_magic` inside the ext superblock.
pub const EXT2_MAGIC_OFF: usize = 56;

/// Byte offset of `e2fs_uuid` inside the ext superblock.
pub const EXT2_UUID_OFF: usize = 104;
pub const EXT2_UUID_LEN: usize = 16;

// expected on-disk widths of the modeled structures
pub const UFS_SB_SIZE: usize = 1376;
pub const UFS_CG_SIZE: usize = 169;
pub const EXT_SB_SIZE: usize = 960;

/// Fill length used by data-plane mutation in block mode.
pub const DATA_BLOCK_SIZE: usize = 64;

/// Upper bound on random draws when looking for a data-plane position.
pub const MAX_POSITION_DRAWS: usize = 1 << 16;

pub const UFS1_MAGIC_SIG: [u8; 4] = FS_UFS1_MAGIC.to_le_bytes();
pub const UFS2_MAGIC_SIG: [u8; 4] = FS_UFS2_MAGIC.to_le_bytes();
pub const CG_MAGIC_BYTES: [u8; 4] = CG_MAGIC.to_le_bytes();
pub const EXT2_MAGIC_SIG: [u8; 2] = EXT2_MAGIC.to_le_bytes();
