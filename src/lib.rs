//! Locate and corrupt UFS1/UFS2 and ext2/3/4 metadata structures inside raw
//! filesystem images.
//!
//! The pieces, leaves first: [`layout`] holds the static field tables,
//! [`decode`] reads a structure instance out of an image, [`locate`] finds
//! every replica of a structure, and [`mutate`] writes a corrupted copy of
//! the image.

use derive_more::Display;
use std::path::Path;
use std::str::FromStr;

pub mod consts;
pub mod decode;
pub mod error;
pub mod external;
pub mod image;
pub mod layout;
pub mod locate;
pub mod mutate;
pub mod restore;
#[cfg(any(test, feature = "synth"))]
pub mod synth;
mod tables;

pub use decode::{to_display_integer, StructureInstance};
pub use error::{Error, Result};
pub use external::ExternalTool;
pub use layout::{Field, FieldKind, FieldLayout};
pub use locate::{LocationSet, Target};
pub use mutate::{Fill, Mode, MutationReport, Mutator, Request, Unit, Value};

use consts::*;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FsType {
    #[display(fmt = "ufs1")]
    Ufs1,
    #[display(fmt = "ufs2")]
    Ufs2,
    #[display(fmt = "ext")]
    Ext,
}

impl FsType {
    pub fn is_ufs(self) -> bool {
        matches!(self, FsType::Ufs1 | FsType::Ufs2)
    }

    /// Offset of the primary superblock.
    pub fn sblock(self) -> usize {
        match self {
            FsType::Ufs1 => SBLOCK_UFS1,
            FsType::Ufs2 => SBLOCK_UFS2,
            FsType::Ext => SBLOCK_EXT2,
        }
    }

    /// Magic bytes of the superblock as stored on disk.
    pub fn sb_magic(self) -> &'static [u8] {
        match self {
            FsType::Ufs1 => &UFS1_MAGIC_SIG,
            FsType::Ufs2 => &UFS2_MAGIC_SIG,
            FsType::Ext => &EXT2_MAGIC_SIG,
        }
    }

    /// Guess the type of an image from its standard superblock slots.
    pub fn detect(data: &[u8]) -> Option<FsType> {
        locate::detect(data)
    }

    /// The structure kinds this filesystem type carries.
    pub fn kinds(self) -> &'static [StructureKind] {
        if self.is_ufs() {
            &[StructureKind::Superblock, StructureKind::CylinderGroup]
        } else {
            &[StructureKind::Superblock]
        }
    }
}

impl FromStr for FsType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "ufs1" => Ok(FsType::Ufs1),
            "ufs" | "ufs2" => Ok(FsType::Ufs2),
            "ext" | "ext2" | "ext3" | "ext4" => Ok(FsType::Ext),
            other => Err(Error::Parse(format!("unknown filesystem type {:?}", other))),
        }
    }
}

/// Filesystem type as given on the command line: a type, or `auto`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsSelector {
    Auto,
    Is(FsType),
}

impl FsSelector {
    pub fn resolve<P: AsRef<Path>>(self, image: P) -> Result<FsType> {
        match self {
            FsSelector::Is(fs) => Ok(fs),
            FsSelector::Auto => {
                let data = image::Image::open(image.as_ref())?;
                let fs = FsType::detect(&data).ok_or_else(|| {
                    Error::Parse(format!("cannot detect the filesystem of {:?}", image.as_ref()))
                })?;
                log::info!("detected {} in {:?}", fs, image.as_ref());
                Ok(fs)
            }
        }
    }
}

impl Default for FsSelector {
    fn default() -> Self {
        FsSelector::Is(FsType::Ufs2)
    }
}

impl FromStr for FsSelector {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("auto") {
            Ok(FsSelector::Auto)
        } else {
            s.parse().map(FsSelector::Is)
        }
    }
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructureKind {
    #[display(fmt = "superblock")]
    Superblock,
    #[display(fmt = "cylinder group")]
    CylinderGroup,
}

impl StructureKind {
    /// Prefix of dump file names.
    pub fn dump_prefix(self) -> &'static str {
        match self {
            StructureKind::Superblock => "superblock",
            StructureKind::CylinderGroup => "cylinder_group",
        }
    }
}

impl FromStr for StructureKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sb" | "superblock" => Ok(StructureKind::Superblock),
            "cg" | "cylinder_group" => Ok(StructureKind::CylinderGroup),
            other => Err(Error::Parse(format!("unknown structure kind {:?}", other))),
        }
    }
}
