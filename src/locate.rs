use derive_more::Deref;
use log::*;
use std::path::Path;
use std::str::FromStr;

use crate::consts::*;
use crate::decode::decode_bytes;
use crate::error::{Error, Result};
use crate::image::Image;
use crate::layout::EXT_SB_LAYOUT;
use crate::{FsType, StructureKind};

/// Absolute offsets of the located replicas of one structure kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref)]
pub struct LocationSet(Vec<usize>);

impl LocationSet {
    pub fn new(offsets: Vec<usize>) -> Self {
        LocationSet(offsets)
    }

    /// Offsets picked by `target`.
    pub fn select(&self, target: Target) -> Result<Vec<usize>> {
        match target {
            Target::All => Ok(self.0.clone()),
            Target::Index(index) => match self.0.get(index) {
                Some(&off) => Ok(vec![off]),
                None => Err(Error::Index {
                    index,
                    count: self.0.len(),
                }),
            },
        }
    }

    pub fn into_vec(self) -> Vec<usize> {
        self.0
    }
}

/// Which of the located instances an operation applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    All,
    Index(usize),
}

impl FromStr for Target {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(Target::All);
        }
        s.parse()
            .map(Target::Index)
            .map_err(|_| Error::Parse(format!("expected an index or \"all\", got {:?}", s)))
    }
}

/// Start positions of every non-overlapping occurrence of `needle`.
pub fn find_all(data: &[u8], needle: &[u8]) -> Vec<usize> {
    let mut out = Vec::new();
    if needle.is_empty() || data.len() < needle.len() {
        return out;
    }

    let last = data.len() - needle.len();
    let mut i = 0;
    while i <= last {
        match data[i..=last].iter().position(|&b| b == needle[0]) {
            Some(p) => i += p,
            None => break,
        }
        if &data[i..i + needle.len()] == needle {
            out.push(i);
            i += needle.len();
        } else {
            i += 1;
        }
    }
    out
}

/// UFS superblocks.
///
/// The magic is the last field of the superblock, so each match yields a
/// candidate `UFS_SB_SIZE - 4` bytes earlier. The first match is dropped as
/// boot-area noise, and the standard superblock offset is put in front if it
/// is missing.
pub fn ufs_superblocks(fs: FsType, data: &[u8]) -> LocationSet {
    let magic_off = UFS_SB_SIZE - 4;

    let mut locs: Vec<usize> = find_all(data, fs.sb_magic())
        .into_iter()
        .skip(1)
        .filter_map(|p| p.checked_sub(magic_off))
        .collect();

    let sblock = fs.sblock();
    if !locs.contains(&sblock) && sblock + UFS_SB_SIZE <= data.len() {
        locs.insert(0, sblock);
    }

    debug!("{} superblocks: {:x?}", fs, locs);
    LocationSet(locs)
}

/// UFS cylinder group headers; possibly none.
pub fn cylinder_groups(data: &[u8]) -> LocationSet {
    let locs: Vec<usize> = find_all(data, &CG_MAGIC_SIG)
        .into_iter()
        .filter_map(|p| p.checked_sub(CG_MAGIC_OFF))
        .filter(|&base| base + UFS_CG_SIZE <= data.len())
        .collect();

    debug!("cylinder groups: {:x?}", locs);
    LocationSet(locs)
}

fn is_ext_sb(data: &[u8], base: usize) -> bool {
    base + EXT_SB_SIZE <= data.len()
        && data[base + EXT2_MAGIC_OFF..base + EXT2_MAGIC_OFF + 2] == EXT2_MAGIC_SIG
}

/// ext superblocks.
///
/// The two magic bytes alone match all over a large image, so replicas are
/// found by the volume UUID of the primary superblock instead, and each UUID
/// hit must carry the magic at its superblock-relative offset. A zero UUID
/// would match every run of zeros, so such images are scanned by magic and
/// checked by UUID.
pub fn ext_superblocks(data: &[u8]) -> LocationSet {
    let primary = match decode_bytes(&EXT_SB_LAYOUT, data, SBLOCK_EXT2) {
        Ok(sb) => sb,
        Err(e) => {
            debug!("no primary ext superblock: {}", e);
            return LocationSet::default();
        }
    };
    let uuid = match primary.get("e2fs_uuid") {
        Some(uuid) => uuid,
        None => return LocationSet::default(),
    };

    let locs: Vec<usize> = if uuid.iter().any(|&b| b != 0) {
        find_all(data, uuid)
            .into_iter()
            .filter_map(|p| p.checked_sub(EXT2_UUID_OFF))
            .filter(|&base| is_ext_sb(data, base))
            .collect()
    } else {
        warn!("ext volume uuid is all zero, locating by magic");
        find_all(data, &EXT2_MAGIC_SIG)
            .into_iter()
            .filter_map(|p| p.checked_sub(EXT2_MAGIC_OFF))
            .filter(|&base| {
                is_ext_sb(data, base)
                    && &data[base + EXT2_UUID_OFF..base + EXT2_UUID_OFF + EXT2_UUID_LEN] == uuid
            })
            .collect()
    };

    debug!("ext superblocks: {:x?}", locs);
    LocationSet(locs)
}

/// Every replica of `kind` in the image bytes.
pub fn locate(fs: FsType, kind: StructureKind, data: &[u8]) -> Result<LocationSet> {
    match (fs, kind) {
        (FsType::Ufs1 | FsType::Ufs2, StructureKind::Superblock) => Ok(ufs_superblocks(fs, data)),
        (FsType::Ufs1 | FsType::Ufs2, StructureKind::CylinderGroup) => Ok(cylinder_groups(data)),
        (FsType::Ext, StructureKind::Superblock) => Ok(ext_superblocks(data)),
        (FsType::Ext, StructureKind::CylinderGroup) => Err(Error::UnsupportedKind { fs, kind }),
    }
}

/// [`locate`] on the current contents of the image file at `path`.
pub fn locate_file<P: AsRef<Path>>(fs: FsType, kind: StructureKind, path: P) -> Result<LocationSet> {
    let image = Image::open(path)?;
    locate(fs, kind, &image)
}

/// Guess the filesystem type from the standard superblock positions.
pub fn detect(data: &[u8]) -> Option<FsType> {
    let magic_off = UFS_SB_SIZE - 4;
    for offset in SBLOCKSEARCH {
        let magic = match data.get(offset + magic_off..offset + UFS_SB_SIZE) {
            Some(magic) => magic,
            None => continue,
        };
        if magic == UFS2_MAGIC_SIG && offset != SBLOCK_UFS1 {
            return Some(FsType::Ufs2);
        }
        if magic == UFS1_MAGIC_SIG && offset != SBLOCK_UFS2 {
            return Some(FsType::Ufs1);
        }
    }

    if is_ext_sb(data, SBLOCK_EXT2) {
        return Some(FsType::Ext);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth;

    #[test]
    fn find_all_non_overlapping() {
        assert_eq!(find_all(b"aaaa", b"aa"), vec![0, 2]);
        assert_eq!(find_all(b"xabcabx", b"ab"), vec![1, 4]);
        assert_eq!(find_all(b"ab", b"abc"), Vec::<usize>::new());
        assert_eq!(find_all(b"abc", b""), Vec::<usize>::new());
        assert_eq!(find_all(b"zzabc", b"abc"), vec![2]);
    }

    #[test]
    fn ufs2_zero_image_has_canonical() {
        let data = vec![0u8; SBLOCK_UFS2 + UFS_SB_SIZE];
        assert_eq!(*ufs_superblocks(FsType::Ufs2, &data), vec![SBLOCK_UFS2]);

        // too short to hold the standard superblock
        let data = vec![0u8; SBLOCK_UFS2 + 100];
        assert!(ufs_superblocks(FsType::Ufs2, &data).is_empty());
    }

    #[test]
    fn ufs2_replicas() {
        let mut data = vec![0u8; 1 << 20];
        for off in [SBLOCK_UFS2, 0x40000, 0x80000] {
            synth::plant_ufs_sb(&mut data, FsType::Ufs2, off);
        }
        assert_eq!(
            *ufs_superblocks(FsType::Ufs2, &data),
            vec![SBLOCK_UFS2, 0x40000, 0x80000]
        );
    }

    #[test]
    fn ufs_first_match_dropped() {
        let mut data = vec![0u8; 1 << 20];
        // stray magic in the boot area, ahead of the real superblocks
        data[100..104].copy_from_slice(&UFS2_MAGIC_SIG);
        synth::plant_ufs_sb(&mut data, FsType::Ufs2, 0x40000);

        assert_eq!(*ufs_superblocks(FsType::Ufs2, &data), vec![SBLOCK_UFS2, 0x40000]);
    }

    #[test]
    fn ufs1_uses_own_magic() {
        let mut data = vec![0u8; 1 << 20];
        synth::plant_ufs_sb(&mut data, FsType::Ufs1, SBLOCK_UFS1);
        synth::plant_ufs_sb(&mut data, FsType::Ufs1, 0x20000);
        synth::plant_ufs_sb(&mut data, FsType::Ufs2, 0x30000);

        assert_eq!(*ufs_superblocks(FsType::Ufs1, &data), vec![SBLOCK_UFS1, 0x20000]);
        assert_eq!(detect(&data), Some(FsType::Ufs1));
    }

    #[test]
    fn cylinder_group_scan() {
        let mut data = vec![0u8; 0x10000];
        assert!(cylinder_groups(&data).is_empty());

        synth::plant_cg(&mut data, 0x1000);
        synth::plant_cg(&mut data, 0x8000);
        // header would run past the end of the image
        data[0x10000 - 10..0x10000 - 7].copy_from_slice(&CG_MAGIC_SIG);
        // magic too close to the start for a header
        data[2..5].copy_from_slice(&CG_MAGIC_SIG);

        assert_eq!(*cylinder_groups(&data), vec![0x1000, 0x8000]);
    }

    #[test]
    fn ext_by_uuid() {
        let uuid = [0x42u8; 16];
        let mut data = vec![0u8; 1 << 20];
        for off in [SBLOCK_EXT2, 0x8000 * 4, 0x18000 * 4] {
            synth::plant_ext_sb(&mut data, off, &uuid);
        }
        assert_eq!(
            *ext_superblocks(&data),
            vec![SBLOCK_EXT2, 0x8000 * 4, 0x18000 * 4]
        );
        assert_eq!(detect(&data), Some(FsType::Ext));

        // a uuid copy without the magic next to it is not a superblock
        data[0x50000..0x50010].copy_from_slice(&uuid);
        assert_eq!(ext_superblocks(&data).len(), 3);
    }

    #[test]
    fn ext_corrupted_primary_magic() {
        let uuid = [7u8; 16];
        let mut data = vec![0u8; 1 << 20];
        synth::plant_ext_sb(&mut data, SBLOCK_EXT2, &uuid);
        synth::plant_ext_sb(&mut data, 0x20000, &uuid);

        data[SBLOCK_EXT2 + EXT2_MAGIC_OFF] ^= 0xff;
        let locs = ext_superblocks(&data);
        assert!(!locs.contains(&SBLOCK_EXT2));
        assert_eq!(*locs, vec![0x20000]);
    }

    #[test]
    fn ext_zero_uuid() {
        let mut data = vec![0u8; 1 << 20];
        synth::plant_ext_sb(&mut data, SBLOCK_EXT2, &[0u8; 16]);
        synth::plant_ext_sb(&mut data, 0x20000, &[0u8; 16]);
        // magic with a non-zero uuid belongs to some other volume
        synth::plant_ext_sb(&mut data, 0x40000, &[9u8; 16]);

        assert_eq!(*ext_superblocks(&data), vec![SBLOCK_EXT2, 0x20000]);
    }

    #[test]
    fn truncated_and_foreign_images() {
        assert!(ext_superblocks(&[0u8; 1500]).is_empty());
        assert!(ext_superblocks(&[]).is_empty());
        assert!(ufs_superblocks(FsType::Ufs2, &[]).is_empty());
        assert!(cylinder_groups(&[]).is_empty());
        assert_eq!(detect(&[0u8; 4096]), None);

        assert!(matches!(
            locate(FsType::Ext, StructureKind::CylinderGroup, &[]),
            Err(Error::UnsupportedKind { .. })
        ));
    }

    #[test]
    fn select_targets() {
        let set = LocationSet::new(vec![10, 20]);
        assert_eq!(set.select(Target::All).unwrap(), vec![10, 20]);
        assert_eq!(set.select(Target::Index(1)).unwrap(), vec![20]);
        assert!(matches!(
            set.select(Target::Index(2)),
            Err(Error::Index { index: 2, count: 2 })
        ));

        assert_eq!("all".parse::<Target>().unwrap(), Target::All);
        assert_eq!("3".parse::<Target>().unwrap(), Target::Index(3));
        assert!("-1".parse::<Target>().is_err());
    }

    #[test]
    fn locate_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let res = locate_file(FsType::Ufs2, StructureKind::Superblock, dir.path().join("missing"));
        assert!(matches!(res, Err(Error::Io(_))));
    }
}
