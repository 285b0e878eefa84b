//! Static field layouts of the modeled on-disk structures.
//!
//! A layout is an ordered list of fields whose widths add up to the size of
//! the structure. Offsets are never stored; they are the running sum of the
//! widths of the preceding fields.

use crate::consts::*;
use crate::error::{Error, Result};
use crate::{tables, FsType, StructureKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Signed,
    Unsigned,
    /// character buffer
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    /// total width in bytes, `count` elements included
    pub width: usize,
    pub count: usize,
    pub kind: FieldKind,
}

impl Field {
    pub const fn signed(name: &'static str, elem: usize, count: usize) -> Self {
        Field {
            name,
            width: elem * count,
            count,
            kind: FieldKind::Signed,
        }
    }

    pub const fn unsigned(name: &'static str, elem: usize, count: usize) -> Self {
        Field {
            name,
            width: elem * count,
            count,
            kind: FieldKind::Unsigned,
        }
    }

    pub const fn text(name: &'static str, len: usize) -> Self {
        Field {
            name,
            width: len,
            count: len,
            kind: FieldKind::Text,
        }
    }

    pub fn elem_width(&self) -> usize {
        self.width / self.count
    }

    pub fn is_array(&self) -> bool {
        self.count > 1
    }

    /// Whether the field is shown as a signed integer.
    pub fn display_signed(&self) -> bool {
        self.kind == FieldKind::Signed
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct FieldLayout {
    pub name: &'static str,
    pub fields: &'static [Field],
    /// expected on-disk width
    pub size: usize,
}

const fn total_width(fields: &[Field]) -> usize {
    let mut sum = 0;
    let mut i = 0;
    while i < fields.len() {
        sum += fields[i].width;
        i += 1;
    }
    sum
}

// a table that does not add up must not build at all
const _: () = assert!(total_width(tables::UFS_SB) == UFS_SB_SIZE);
const _: () = assert!(total_width(tables::UFS_CG) == UFS_CG_SIZE);
const _: () = assert!(total_width(tables::EXT_SB) == EXT_SB_SIZE);

pub static UFS_SB_LAYOUT: FieldLayout = FieldLayout {
    name: "ufs superblock",
    fields: tables::UFS_SB,
    size: UFS_SB_SIZE,
};

pub static UFS_CG_LAYOUT: FieldLayout = FieldLayout {
    name: "ufs cylinder group",
    fields: tables::UFS_CG,
    size: UFS_CG_SIZE,
};

pub static EXT_SB_LAYOUT: FieldLayout = FieldLayout {
    name: "ext superblock",
    fields: tables::EXT_SB,
    size: EXT_SB_SIZE,
};

impl FieldLayout {
    /// Registry lookup: the layout of `kind` in a filesystem of type `fs`.
    pub fn of(fs: FsType, kind: StructureKind) -> Result<&'static FieldLayout> {
        match (fs, kind) {
            (FsType::Ufs1 | FsType::Ufs2, StructureKind::Superblock) => Ok(&UFS_SB_LAYOUT),
            (FsType::Ufs1 | FsType::Ufs2, StructureKind::CylinderGroup) => Ok(&UFS_CG_LAYOUT),
            (FsType::Ext, StructureKind::Superblock) => Ok(&EXT_SB_LAYOUT),
            (FsType::Ext, StructureKind::CylinderGroup) => {
                Err(Error::UnsupportedKind { fs, kind })
            }
        }
    }

    /// Iterate `(offset, field)` in on-disk order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &'static Field)> {
        let fields: &'static [Field] = self.fields;
        fields.iter().scan(0, |off, field| {
            let cur = *off;
            *off += field.width;
            Some((cur, field))
        })
    }

    pub fn find(&self, name: &str) -> Option<(usize, &'static Field)> {
        self.iter().find(|(_, f)| f.name == name)
    }

    /// Offset and descriptor of the field called `name`.
    pub fn field(&self, name: &str) -> Result<(usize, &'static Field)> {
        self.find(name).ok_or_else(|| Error::UnknownField {
            layout: self.name,
            field: name.to_string(),
        })
    }

    pub fn verify(&self) -> Result<()> {
        let declared: usize = self.fields.iter().map(|f| f.width).sum();
        if declared != self.size {
            return Err(Error::LayoutInconsistency {
                layout: self.name,
                detail: format!("fields span {} bytes, expected {}", declared, self.size),
            });
        }
        if let Some(f) = self.fields.iter().find(|f| f.count == 0 || f.width % f.count != 0) {
            return Err(Error::LayoutInconsistency {
                layout: self.name,
                detail: format!("field {} has a ragged element width", f.name),
            });
        }
        Ok(())
    }

    fn expect_at(&self, name: &str, offset: usize) -> Result<()> {
        match self.find(name) {
            Some((off, _)) if off == offset => Ok(()),
            found => Err(Error::LayoutInconsistency {
                layout: self.name,
                detail: format!("{} at {:?}, expected {}", name, found.map(|x| x.0), offset),
            }),
        }
    }
}

/// Startup self-check over every registered layout.
///
/// Besides the widths this also pins the fields the locator relies on, so a
/// reordered table cannot silently shift the signature offsets.
pub fn verify_all() -> Result<()> {
    for layout in [&UFS_SB_LAYOUT, &UFS_CG_LAYOUT, &EXT_SB_LAYOUT] {
        layout.verify()?;
    }
    UFS_SB_LAYOUT.expect_at("fs_magic", UFS_SB_SIZE - 4)?;
    UFS_CG_LAYOUT.expect_at("cg_magic", CG_MAGIC_OFF)?;
    EXT_SB_LAYOUT.expect_at("e2fs_magic", EXT2_MAGIC_OFF)?;
    EXT_SB_LAYOUT.expect_at("e2fs_uuid", EXT2_UUID_OFF)?;
    Ok(())
}
