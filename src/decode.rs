use log::*;
use std::fmt;
use std::fs::File;
use std::io::{Cursor, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::layout::{Field, FieldLayout};
use crate::StructureKind;

/// Raw bytes of one field of a decoded structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValue {
    /// offset relative to the structure base
    pub offset: usize,
    pub field: &'static Field,
    pub raw: Vec<u8>,
}

impl FieldValue {
    pub fn name(&self) -> &'static str {
        self.field.name
    }

    /// Hexadecimal rendering used by [`StructureInstance`]'s `Display`.
    pub fn display_hex(&self) -> String {
        display_hex(&self.raw, self.field.display_signed())
    }
}

/// One structure read out of an image at an absolute offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureInstance {
    pub layout: &'static FieldLayout,
    pub base: usize,
    pub fields: Vec<FieldValue>,
}

impl StructureInstance {
    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.fields
            .iter()
            .find(|v| v.field.name == name)
            .map(|v| v.raw.as_slice())
    }

    /// Field bytes concatenated in layout order.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.layout.size);
        for v in &self.fields {
            out.extend_from_slice(&v.raw);
        }
        out
    }

    /// Path of the dump file for this instance of `image`:
    /// `<prefix>_<hex-offset>_<image-name>.dump`, next to the image unless
    /// `dir` is given.
    pub fn dump_path(&self, kind: StructureKind, image: &Path, dir: Option<&Path>) -> PathBuf {
        let name = image
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let file = format!("{}_{:#x}_{}.dump", kind.dump_prefix(), self.base, name);
        match dir.or_else(|| image.parent()) {
            Some(dir) => dir.join(file),
            None => PathBuf::from(file),
        }
    }

    pub fn dump(&self, kind: StructureKind, image: &Path, dir: Option<&Path>) -> Result<PathBuf> {
        let path = self.dump_path(kind, image, dir);
        let mut f = File::create(&path)?;
        f.write_all(&self.to_bytes())?;
        info!("dumped {} at {:#x} to {:?}", self.layout.name, self.base, path);
        Ok(path)
    }
}

impl fmt::Display for StructureInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.fields.iter().map(|v| v.name().len()).max().unwrap_or(0);
        for v in &self.fields {
            writeln!(f, "{:<width$} {}", v.name(), v.display_hex(), width = width)?;
        }
        Ok(())
    }
}

fn decode_from<R: Read + Seek>(
    layout: &'static FieldLayout,
    mut r: R,
    base: usize,
) -> Result<StructureInstance> {
    r.seek(SeekFrom::Start(base as u64))?;

    let mut fields = Vec::with_capacity(layout.fields.len());
    for (offset, field) in layout.iter() {
        let mut raw = vec![0u8; field.width];
        r.read_exact(&mut raw)?;
        fields.push(FieldValue { offset, field, raw });
    }
    Ok(StructureInstance {
        layout,
        base,
        fields,
    })
}

/// Read one instance of `layout` at `base` from the image file at `path`.
///
/// An image too short to hold the whole structure fails with an
/// `UnexpectedEof` IO error. No semantic validation is done.
pub fn decode<P: AsRef<Path>>(
    layout: &'static FieldLayout,
    path: P,
    base: usize,
) -> Result<StructureInstance> {
    let file = File::open(path.as_ref())?;
    let sb = decode_from(layout, file, base)?;
    trace!("decoded {} at {:#x} from {:?}", layout.name, base, path.as_ref());
    Ok(sb)
}

/// In-memory variant of [`decode`].
pub fn decode_bytes(
    layout: &'static FieldLayout,
    data: &[u8],
    base: usize,
) -> Result<StructureInstance> {
    decode_from(layout, Cursor::new(data), base)
}

/// Interpret up to eight raw bytes as a little-endian integer.
///
/// Returns `None` for empty or wider slices.
pub fn to_display_integer(raw: &[u8], signed: bool) -> Option<i128> {
    if raw.is_empty() || raw.len() > 8 {
        return None;
    }
    let mut buf = [0u8; 16];
    buf[..raw.len()].copy_from_slice(raw);
    if signed && raw[raw.len() - 1] & 0x80 != 0 {
        for b in &mut buf[raw.len()..] {
            *b = 0xff;
        }
    }
    Some(i128::from_le_bytes(buf))
}

/// Render a field as one hexadecimal integer, lowest byte first on disk.
///
/// Arrays and text are shown as a single integer of their full width, in
/// two's complement when `signed`.
pub fn display_hex(raw: &[u8], signed: bool) -> String {
    if let Some(v) = to_display_integer(raw, signed) {
        return if v < 0 {
            format!("-{:#x}", -v)
        } else {
            format!("{:#x}", v)
        };
    }

    let negative = signed && raw.last().map_or(false, |&b| b & 0x80 != 0);
    let magnitude = if negative { negate(raw) } else { raw.to_vec() };
    let digits: String = magnitude
        .iter()
        .rev()
        .skip_while(|&&b| b == 0)
        .map(|b| format!("{:02x}", b))
        .collect();
    let digits = digits.trim_start_matches('0');
    match (negative, digits.is_empty()) {
        (_, true) => "0x0".to_string(),
        (true, false) => format!("-0x{}", digits),
        (false, false) => format!("0x{}", digits),
    }
}

/// Two's complement negation of a little-endian integer of any width.
fn negate(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len());
    let mut carry = 1u16;
    for &b in raw {
        let v = u16::from(!b) + carry;
        out.push(v as u8);
        carry = v >> 8;
    }
    out
}
