use crate::consts::*;
use crate::layout::Field;

const fn i8(name: &'static str) -> Field {
    Field::signed(name, 1, 1)
}
const fn i16(name: &'static str) -> Field {
    Field::signed(name, 2, 1)
}
const fn i32(name: &'static str) -> Field {
    Field::signed(name, 4, 1)
}
const fn i64(name: &'static str) -> Field {
    Field::signed(name, 8, 1)
}
const fn u8(name: &'static str) -> Field {
    Field::unsigned(name, 1, 1)
}
const fn u16(name: &'static str) -> Field {
    Field::unsigned(name, 2, 1)
}
const fn u32(name: &'static str) -> Field {
    Field::unsigned(name, 4, 1)
}
const fn u64(name: &'static str) -> Field {
    Field::unsigned(name, 8, 1)
}
const fn text(name: &'static str, len: usize) -> Field {
    Field::text(name, len)
}

/// `struct fs`, UFS1/UFS2 superblock (LP64).
pub const UFS_SB: &[Field] = &[
    i32("fs_firstfield"), /* historic file system linked list, */
    i32("fs_unused_1"),   /*     used for incore super blocks */
    i32("fs_sblkno"),     /* offset of super-block in filesys */
    i32("fs_cblkno"),     /* offset of cyl-block in filesys */
    i32("fs_iblkno"),     /* offset of inode-blocks in filesys */
    i32("fs_dblkno"),     /* offset of first data after cg */
    i32("fs_old_cgoffset"),
    i32("fs_old_cgmask"),
    i32("fs_old_time"),
    i32("fs_old_size"),
    i32("fs_old_dsize"),
    u32("fs_ncg"), /* number of cylinder groups */
    i32("fs_bsize"),
    i32("fs_fsize"),
    i32("fs_frag"),
    /* these are configuration parameters */
    i32("fs_minfree"),
    i32("fs_old_rotdelay"),
    i32("fs_old_rps"),
    /* these fields can be computed from the others */
    i32("fs_bmask"),
    i32("fs_fmask"),
    i32("fs_bshift"),
    i32("fs_fshift"),
    /* these are configuration parameters */
    i32("fs_maxcontig"),
    i32("fs_maxbpg"),
    /* these fields can be computed from the others */
    i32("fs_fragshift"),
    i32("fs_fsbtodb"),
    i32("fs_sbsize"),
    Field::signed("fs_spare1", 4, 2),
    i32("fs_nindir"),
    u32("fs_inopb"),
    i32("fs_old_nspf"),
    i32("fs_optim"),
    i32("fs_old_npsect"),
    i32("fs_old_interleave"),
    i32("fs_old_trackskew"),
    Field::signed("fs_id", 4, 2), /* unique filesystem id */
    /* sizes determined by number of cylinder groups and their sizes */
    i32("fs_old_csaddr"),
    i32("fs_cssize"),
    i32("fs_cgsize"),
    i32("fs_spare2"),
    i32("fs_old_nsect"),
    i32("fs_old_spc"),
    i32("fs_old_ncyl"),
    i32("fs_old_cpg"),
    u32("fs_ipg"),
    i32("fs_fpg"),
    /* struct csum fs_old_cstotal */
    i32("fs_old_cstotal.cs_ndir"),
    i32("fs_old_cstotal.cs_nbfree"),
    i32("fs_old_cstotal.cs_nifree"),
    i32("fs_old_cstotal.cs_nffree"),
    /* these fields are cleared at mount time */
    i8("fs_fmod"),
    i8("fs_clean"),
    i8("fs_ronly"),
    i8("fs_old_flags"),
    text("fs_fsmnt", MAXMNTLEN),
    text("fs_volname", MAXVOLLEN),
    u64("fs_swuid"),
    i32("fs_pad"), /* due to alignment of fs_swuid */
    /* these fields retain the current block allocation info */
    i32("fs_cgrotor"),
    Field::unsigned("fs_ocsp", 8, NOCSPTRS),
    u64("fs_contigdirs"),
    u64("fs_csp"),
    u64("fs_maxcluster"),
    u64("fs_active"),
    i32("fs_old_cpc"),
    i32("fs_maxbsize"),
    i64("fs_unrefs"),
    i64("fs_providersize"),
    i64("fs_metaspace"),
    Field::signed("fs_sparecon64", 8, 13),
    i64("fs_sblockactualloc"),
    i64("fs_sblockloc"), /* byte offset of standard superblock */
    /* struct csum_total fs_cstotal */
    i64("fs_cstotal.cs_ndir"),
    i64("fs_cstotal.cs_nbfree"),
    i64("fs_cstotal.cs_nifree"),
    i64("fs_cstotal.cs_nffree"),
    i64("fs_cstotal.cs_numclusters"),
    Field::signed("fs_cstotal.cs_spare", 8, 3),
    i64("fs_time"),
    i64("fs_size"),
    i64("fs_dsize"),
    i64("fs_csaddr"),
    i64("fs_pendingblocks"),
    u32("fs_pendinginodes"),
    Field::unsigned("fs_snapinum", 4, FSMAXSNAP),
    u32("fs_avgfilesize"),
    u32("fs_avgfpdir"),
    i32("fs_save_cgsize"),
    i64("fs_mtime"),
    i32("fs_sujfree"),
    Field::signed("fs_sparecon32", 4, 21),
    u32("fs_ckhash"),
    u32("fs_metackhash"),
    i32("fs_flags"),
    i32("fs_contigsumsize"),
    i32("fs_maxsymlinklen"),
    i32("fs_old_inodefmt"),
    u64("fs_maxfilesize"),
    i64("fs_qbmask"),
    i64("fs_qfmask"),
    i32("fs_state"),
    i32("fs_old_postblformat"),
    i32("fs_old_nrpos"),
    Field::signed("fs_spare5", 4, 2),
    i32("fs_magic"),
];

/// `struct cg` header, up to and including the first byte of `cg_space`.
pub const UFS_CG: &[Field] = &[
    i32("cg_firstfield"), /* historic cyl groups linked list */
    i32("cg_magic"),
    i32("cg_old_time"),
    u32("cg_cgx"), /* we are the cgx'th cylinder group */
    i16("cg_old_ncyl"),
    i16("cg_old_niblk"),
    u32("cg_ndblk"),
    /* struct csum cg_cs */
    i32("cg_cs.cs_ndir"),
    i32("cg_cs.cs_nbfree"),
    i32("cg_cs.cs_nifree"),
    i32("cg_cs.cs_nffree"),
    u32("cg_rotor"),
    u32("cg_frotor"),
    u32("cg_irotor"),
    Field::unsigned("cg_frsum", 4, MAXFRAG), /* counts of available frags */
    i32("cg_old_btotoff"),
    i32("cg_old_boff"),
    u32("cg_iusedoff"),
    u32("cg_freeoff"),
    u32("cg_nextfreeoff"),
    u32("cg_clustersumoff"),
    u32("cg_clusteroff"),
    u32("cg_nclusterblks"),
    u32("cg_niblk"),
    u32("cg_initediblk"),
    u32("cg_unrefs"),
    i32("cg_sparecon32"),
    u32("cg_ckhash"),
    i64("cg_time"),
    Field::unsigned("cg_sparecon64", 8, 3),
    u8("cg_space"), /* space for cylinder group maps */
];

/// `struct ext2fs`, the ext2/3/4 superblock.
pub const EXT_SB: &[Field] = &[
    u32("e2fs_icount"),
    u32("e2fs_bcount"),
    u32("e2fs_rbcount"),
    u32("e2fs_fbcount"),
    u32("e2fs_ficount"),
    u32("e2fs_first_dblock"),
    u32("e2fs_log_bsize"),
    u32("e2fs_log_fsize"),
    u32("e2fs_bpg"),
    u32("e2fs_fpg"),
    u32("e2fs_ipg"),
    u32("e2fs_mtime"),
    u32("e2fs_wtime"),
    u16("e2fs_mnt_count"),
    u16("e2fs_max_mnt_count"),
    u16("e2fs_magic"), /* at offset 56 */
    u16("e2fs_state"),
    u16("e2fs_beh"),
    u16("e2fs_minrev"),
    u32("e2fs_lastfsck"),
    u32("e2fs_fsckintv"),
    u32("e2fs_creator"),
    u32("e2fs_rev"),
    u16("e2fs_ruid"),
    u16("e2fs_rgid"),
    /* EXT2_DYNAMIC_REV */
    u32("e2fs_first_ino"),
    u16("e2fs_inode_size"),
    u16("e2fs_block_group_nr"),
    u32("e2fs_features_compat"),
    u32("e2fs_features_incompat"),
    u32("e2fs_features_rocompat"),
    Field::unsigned("e2fs_uuid", 1, 16), /* at offset 104 */
    text("e2fs_vname", 16),
    text("e2fs_fsmnt", 64),
    u32("e2fs_algo"),
    u8("e2fs_prealloc"),
    u8("e2fs_dir_prealloc"),
    u16("e2fs_reserved_ngdb"),
    /* ext3 journaling */
    text("e3fs_journal_uuid", 16),
    u32("e3fs_journal_inum"),
    u32("e3fs_journal_dev"),
    u32("e3fs_last_orphan"),
    Field::unsigned("e3fs_hash_seed", 4, 4),
    text("e3fs_def_hash_version", 1),
    text("e3fs_jnl_backup_type", 1),
    u16("e3fs_desc_size"),
    u32("e3fs_default_mount_opts"),
    u32("e3fs_first_meta_bg"),
    u32("e3fs_mkfs_time"),
    u32("e3fs_jnl_blks"),
    /* ext4 64bit and beyond */
    u32("e4fs_bcount_hi"),
    u32("e4fs_rbcount_hi"),
    u32("e4fs_fbcount_hi"),
    u16("e4fs_min_extra_isize"),
    u16("e4fs_want_extra_isize"),
    u32("e4fs_flags"),
    u16("e4fs_raid_stride"),
    u16("e4fs_mmpintv"),
    u64("e4fs_mmpblk"),
    u32("e4fs_raid_stripe_wid"),
    u8("e4fs_log_gpf"),
    u8("e4fs_chksum_type"),
    u8("e4fs_encrypt"),
    u8("e4fs_reserved_pad"),
    u64("e4fs_kbytes_written"),
    u32("e4fs_snapinum"),
    u32("e4fs_snapid"),
    u64("e4fs_snaprbcount"),
    u32("e4fs_snaplist"),
    u32("e4fs_errcount"),
    u32("e4fs_first_errtime"),
    u32("e4fs_first_errino"),
    u64("e4fs_first_errblk"),
    Field::unsigned("e4fs_first_errfunc", 1, 32),
    u32("e4fs_first_errline"),
    u32("e4fs_last_errtime"),
    u32("e4fs_last_errino"),
    u32("e4fs_last_errline"),
    u64("e4fs_last_errblk"),
    Field::unsigned("e4fs_last_errfunc", 1, 32),
    Field::unsigned("e4fs_mount_opts", 1, 64),
    u32("e4fs_usrquota_inum"),
    u32("e4fs_grpquota_inum"),
    u32("e4fs_overhead_clusters"),
    Field::unsigned("e4fs_backup_bgs", 4, 2),
    Field::unsigned("e4fs_encrypt_algos", 1, 4),
    Field::unsigned("e4fs_encrypt_pw_salt", 1, 16),
    u32("e4fs_lpf_ino"),
    u32("e4fs_proj_quota_inum"),
    u32("e4fs_chksum_seed"),
    Field::unsigned("e4fs_reserved", 4, 98),
    u32("e4fs_sbchksum"),
];
