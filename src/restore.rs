//! Magic signature bookkeeping: where the signatures sit in a source image,
//! and forcing them back into a mutated copy.

use log::*;
use std::fs::OpenOptions;
use std::io::{Seek, SeekFrom, Write};
use std::path::Path;

use crate::consts::*;
use crate::error::Result;
use crate::locate::{ext_superblocks, find_all};
use crate::FsType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MagicSite {
    pub offset: usize,
    pub bytes: &'static [u8],
}

impl MagicSite {
    pub fn end(&self) -> usize {
        self.offset + self.bytes.len()
    }
}

/// Every magic signature of the `fs` family present in `data`.
///
/// UFS: each superblock magic and each cylinder group magic found in the
/// stream. ext: the magic of the primary superblock slot and of every
/// located replica.
pub fn magic_sites(fs: FsType, data: &[u8]) -> Vec<MagicSite> {
    let mut sites = Vec::new();
    match fs {
        FsType::Ufs1 | FsType::Ufs2 => {
            let magic = fs.sb_magic();
            for offset in find_all(data, magic) {
                sites.push(MagicSite {
                    offset,
                    bytes: magic,
                });
            }
            for offset in find_all(data, &CG_MAGIC_SIG) {
                sites.push(MagicSite {
                    offset,
                    bytes: &CG_MAGIC_SIG,
                });
            }
        }
        FsType::Ext => {
            sites.push(MagicSite {
                offset: SBLOCK_EXT2 + EXT2_MAGIC_OFF,
                bytes: &EXT2_MAGIC_SIG,
            });
            for base in ext_superblocks(data).iter() {
                let offset = base + EXT2_MAGIC_OFF;
                if offset != SBLOCK_EXT2 + EXT2_MAGIC_OFF {
                    sites.push(MagicSite {
                        offset,
                        bytes: &EXT2_MAGIC_SIG,
                    });
                }
            }
        }
    }
    sites.sort_by_key(|s| s.offset);
    sites
}

/// Rewrite the signatures of `sites` in place.
///
/// Sites beyond the end of `data` are skipped. Returns the offsets written.
pub fn restore_in(data: &mut [u8], sites: &[MagicSite]) -> Vec<usize> {
    let mut restored = Vec::with_capacity(sites.len());
    for site in sites {
        if site.end() > data.len() {
            warn!("magic at {:#x} lies past the end of the image", site.offset);
            continue;
        }
        data[site.offset..site.end()].copy_from_slice(site.bytes);
        restored.push(site.offset);
    }
    restored
}

/// Rewrite the signatures of `sites` in the image file at `path`.
pub fn restore_file<P: AsRef<Path>>(path: P, sites: &[MagicSite]) -> Result<Vec<usize>> {
    let mut f = OpenOptions::new().read(true).write(true).open(path.as_ref())?;
    let len = f.metadata()?.len() as usize;

    let mut restored = Vec::with_capacity(sites.len());
    for site in sites {
        if site.end() > len {
            warn!("magic at {:#x} lies past the end of {:?}", site.offset, path.as_ref());
            continue;
        }
        f.seek(SeekFrom::Start(site.offset as u64))?;
        f.write_all(site.bytes)?;
        restored.push(site.offset);
    }
    f.sync_all()?;

    info!("restored {} magic signature(s) in {:?}", restored.len(), path.as_ref());
    Ok(restored)
}
