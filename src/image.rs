use log::*;
use memmap2::{Mmap, MmapMut, MmapOptions};
use std::fs::File;
use std::io::Write;
use std::ops::{Deref, DerefMut};
use std::path::Path;
use tempfile::NamedTempFile;

use crate::error::Result;

/// Read-only mapping of an image file.
///
/// Every call maps the file afresh, so callers always observe its current
/// bytes. Empty files are not mapped.
pub struct Image {
    map: Option<Mmap>,
}

impl Image {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Image> {
        let file = File::open(path.as_ref())?;
        let len = file.metadata()?.len();
        trace!("map {:?}: {} bytes", path.as_ref(), len);

        let map = if len == 0 {
            None
        } else {
            Some(unsafe { MmapOptions::new().map(&file)? })
        };
        Ok(Image { map })
    }
}

impl Deref for Image {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match &self.map {
            Some(map) => &map[..],
            None => &[],
        }
    }
}

/// Private copy-on-write mapping of an image.
///
/// Writes land in anonymous pages and never reach the source file; the
/// result is persisted with [`Scratch::write_to`].
pub struct Scratch {
    map: Option<MmapMut>,
}

impl Scratch {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Scratch> {
        let file = File::open(path.as_ref())?;
        let len = file.metadata()?.len();

        let map = if len == 0 {
            None
        } else {
            Some(unsafe { MmapOptions::new().map_copy(&file)? })
        };
        Ok(Scratch { map })
    }

    /// Persist the bytes at `path`.
    ///
    /// The data goes to a temporary file next to `path` that is then renamed
    /// over it, so an existing file at `path` is replaced rather than
    /// truncated, even when it shares its inode with the mapped source.
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut out = temp_beside(path.as_ref())?;
        out.write_all(self)?;
        out.as_file().sync_all()?;
        out.persist(path.as_ref()).map_err(|e| e.error)?;
        debug!("wrote {} bytes to {:?}", self.len(), path.as_ref());
        Ok(())
    }
}

/// Temporary file in the directory of `path`, for an atomic replace.
pub fn temp_beside(path: &Path) -> Result<NamedTempFile> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    Ok(NamedTempFile::new_in(dir)?)
}

/// Whether `a` and `b` name the same file, hard links included.
#[cfg(unix)]
pub fn same_file(a: &Path, b: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    match (a.metadata(), b.metadata()) {
        (Ok(a), Ok(b)) => a.dev() == b.dev() && a.ino() == b.ino(),
        _ => false,
    }
}

#[cfg(not(unix))]
pub fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

impl Deref for Scratch {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match &self.map {
            Some(map) => &map[..],
            None => &[],
        }
    }
}

impl DerefMut for Scratch {
    fn deref_mut(&mut self) -> &mut [u8] {
        match &mut self.map {
            Some(map) => &mut map[..],
            None => &mut [],
        }
    }
}
