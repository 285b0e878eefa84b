use derive_more::Display;
use log::*;
use rand::rngs::OsRng;
use rand::{CryptoRng, Rng, RngCore};
use std::ops::Range;
use std::path::PathBuf;
use std::str::FromStr;

use crate::consts::*;
use crate::error::{Error, Result};
use crate::external::ExternalTool;
use crate::image::{same_file, Image, Scratch};
use crate::layout::FieldLayout;
use crate::locate::{locate, Target};
use crate::restore::{magic_sites, restore_file};
use crate::{FsType, StructureKind};

/// Byte pattern written over the corrupted range.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Fill {
    #[display(fmt = "zero")]
    Zero,
    #[display(fmt = "ff")]
    Ff,
    #[display(fmt = "rnd")]
    Random,
}

impl Fill {
    pub fn bytes<R: RngCore + ?Sized>(self, len: usize, rng: &mut R) -> Vec<u8> {
        match self {
            Fill::Zero => vec![0u8; len],
            Fill::Ff => vec![0xffu8; len],
            Fill::Random => {
                let mut buf = vec![0u8; len];
                rng.fill_bytes(&mut buf);
                buf
            }
        }
    }
}

impl FromStr for Fill {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "zero" => Ok(Fill::Zero),
            "ff" => Ok(Fill::Ff),
            "rnd" | "random" => Ok(Fill::Random),
            other => Err(Error::Parse(format!("unknown fill {:?}", other))),
        }
    }
}

/// Extent of one corruption.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    /// a single byte at a random position
    #[display(fmt = "byte_flip")]
    ByteFlip,
    /// the whole structure, or `DATA_BLOCK_SIZE` bytes in the data plane
    #[display(fmt = "block")]
    Block,
}

impl Unit {
    pub fn fill_len(self, block: usize) -> usize {
        match self {
            Unit::ByteFlip => 1,
            Unit::Block => block,
        }
    }
}

impl FromStr for Unit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "byte_flip" | "byte" => Ok(Unit::ByteFlip),
            "block" => Ok(Unit::Block),
            other => Err(Error::Parse(format!("unknown mutation size {:?}", other))),
        }
    }
}

/// Replacement for a targeted field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// truncated or NUL-padded to the field width
    Text(String),
    /// little-endian at the field width
    Int(i128),
}

impl Value {
    pub fn parse_int(s: &str) -> Result<Value> {
        let (neg, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let parsed = match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
            Some(hex) => i128::from_str_radix(hex, 16),
            None => digits.parse::<i128>(),
        };
        let v = parsed.map_err(|e| Error::Parse(format!("bad integer {:?}: {}", s, e)))?;
        Ok(Value::Int(if neg { -v } else { v }))
    }

    pub fn encode(&self, width: usize) -> Vec<u8> {
        match self {
            Value::Text(s) => {
                let mut out = s.as_bytes().to_vec();
                out.resize(width, 0);
                out
            }
            Value::Int(v) => {
                let pad = if *v < 0 { 0xff } else { 0 };
                let mut out: Vec<u8> = v.to_le_bytes().iter().copied().take(width).collect();
                out.resize(width, pad);
                out
            }
        }
    }
}

#[derive(Debug, Clone)]
pub enum Mode {
    /// Overwrite one named field in the selected instances.
    Field {
        kind: StructureKind,
        target: Target,
        field: String,
        value: Value,
    },
    /// Fill a byte or the whole extent of the selected instances.
    Structure {
        kind: StructureKind,
        target: Target,
        fill: Fill,
        unit: Unit,
    },
    /// Fill a range that overlaps no located structure.
    Data { fill: Fill, unit: Unit },
    /// Hand the whole image to an external byte mutator.
    External(ExternalTool),
}

#[derive(Debug, Clone)]
pub struct Request {
    pub source: PathBuf,
    pub output: PathBuf,
    pub fs: FsType,
    pub mode: Mode,
    /// force magic signatures back after mutating
    pub restore: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationReport {
    pub ranges: Vec<Range<usize>>,
    /// seed handed to the external mutator
    pub seed: Option<u64>,
    pub restored: Vec<usize>,
}

/// Closed byte ranges `[loc, loc + width]` of every located structure.
pub fn forbidden_regions(fs: FsType, data: &[u8]) -> Result<Vec<(usize, usize)>> {
    let mut regions = Vec::new();
    for &kind in fs.kinds() {
        let layout = FieldLayout::of(fs, kind)?;
        for &loc in locate(fs, kind, data)?.iter() {
            regions.push((loc, loc + layout.size));
        }
    }
    Ok(regions)
}

/// Random start for a `len` byte fill in a `size` byte image such that
/// `[pos, pos + len]` touches no forbidden region.
pub fn pick_data_pos<R: Rng + ?Sized>(
    rng: &mut R,
    size: usize,
    len: usize,
    forbidden: &[(usize, usize)],
) -> Result<usize> {
    if len > size {
        return Err(Error::MutationFailure(format!(
            "image of {} bytes cannot take a {} byte fill",
            size, len
        )));
    }
    let max = size - len;
    for _ in 0..MAX_POSITION_DRAWS {
        let pos = rng.gen_range(0..=max);
        let end = pos + len;
        if forbidden.iter().all(|&(lo, hi)| end < lo || pos > hi) {
            return Ok(pos);
        }
    }
    Err(Error::MutationFailure(format!(
        "no data position found in {} draws",
        MAX_POSITION_DRAWS
    )))
}

pub struct Mutator<R> {
    rng: R,
}

impl Mutator<OsRng> {
    pub fn new() -> Self {
        Mutator { rng: OsRng }
    }
}

impl Default for Mutator<OsRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RngCore + CryptoRng> Mutator<R> {
    pub fn with_rng(rng: R) -> Self {
        Mutator { rng }
    }

    /// Write a mutated copy of `req.source` to `req.output`.
    ///
    /// The source is only ever read. With `req.restore` the magic signatures
    /// of the source are forced back into the output afterwards, also when
    /// the mutation itself failed.
    pub fn mutate(&mut self, req: &Request) -> Result<MutationReport> {
        if same_file(&req.source, &req.output) {
            return Err(Error::MutationFailure(format!(
                "output {:?} is the source image",
                req.output
            )));
        }

        let sites = if req.restore {
            match Image::open(&req.source) {
                Ok(image) => magic_sites(req.fs, &image),
                Err(e) => {
                    warn!("cannot collect magic offsets of {:?}: {}", req.source, e);
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        let res = self.run(req);

        let mut restored = Vec::new();
        if req.restore && req.output.exists() {
            match restore_file(&req.output, &sites) {
                Ok(offsets) => restored = offsets,
                Err(e) => error!("restoring magic bytes in {:?}: {}", req.output, e),
            }
        }

        match res {
            Ok(mut report) => {
                report.restored = restored;
                info!("wrote {:?}", req.output);
                Ok(report)
            }
            Err(e) => {
                error!("failed to mutate {:?}: {}", req.source, e);
                Err(e)
            }
        }
    }

    fn run(&mut self, req: &Request) -> Result<MutationReport> {
        if let Mode::External(tool) = &req.mode {
            let seed = tool.run(&req.source, &req.output, &mut self.rng)?;
            return Ok(MutationReport {
                seed,
                ..Default::default()
            });
        }

        let mut scratch = Scratch::open(&req.source)?;
        let ranges = self.apply(req.fs, &req.mode, &mut scratch)?;
        scratch.write_to(&req.output).map_err(|e| {
            Error::MutationFailure(format!("writing {:?}: {}", req.output, e))
        })?;
        Ok(MutationReport {
            ranges,
            ..Default::default()
        })
    }

    /// Apply an in-place mode to image bytes. Returns the modified ranges.
    pub fn apply(&mut self, fs: FsType, mode: &Mode, data: &mut [u8]) -> Result<Vec<Range<usize>>> {
        match mode {
            Mode::Field {
                kind,
                target,
                field,
                value,
            } => self.mutate_field(fs, data, *kind, *target, field, value),
            Mode::Structure {
                kind,
                target,
                fill,
                unit,
            } => self.mutate_structure(fs, data, *kind, *target, *fill, *unit),
            Mode::Data { fill, unit } => self.mutate_data(fs, data, *fill, *unit),
            Mode::External(_) => Err(Error::MutationFailure(
                "external mutation works on files only".to_string(),
            )),
        }
    }

    pub fn mutate_field(
        &mut self,
        fs: FsType,
        data: &mut [u8],
        kind: StructureKind,
        target: Target,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Range<usize>>> {
        let layout = FieldLayout::of(fs, kind)?;
        let (off, f) = layout.field(field)?;
        let bases = locate(fs, kind, data)?.select(target)?;
        if bases.is_empty() {
            warn!("no {} located, nothing to mutate", kind);
        }

        let bytes = value.encode(f.width);
        let mut ranges = Vec::with_capacity(bases.len());
        for base in bases {
            let range = base + off..base + off + bytes.len();
            write_range(data, range.clone(), &bytes)?;
            info!("modified {} at {:#x} ({:#x}+{:#x})", field, range.start, base, off);
            ranges.push(range);
        }
        Ok(ranges)
    }

    pub fn mutate_structure(
        &mut self,
        fs: FsType,
        data: &mut [u8],
        kind: StructureKind,
        target: Target,
        fill: Fill,
        unit: Unit,
    ) -> Result<Vec<Range<usize>>> {
        let layout = FieldLayout::of(fs, kind)?;
        let bases = locate(fs, kind, data)?.select(target)?;
        if bases.is_empty() {
            warn!("no {} located, nothing to mutate", kind);
        }

        let len = unit.fill_len(layout.size);
        // same relative position in every instance
        let pos = self.rng.gen_range(0..=layout.size - len);
        let bytes = fill.bytes(len, &mut self.rng);

        let mut ranges = Vec::with_capacity(bases.len());
        for base in bases {
            let range = base + pos..base + pos + len;
            write_range(data, range.clone(), &bytes)?;
            info!("modified offset {:#x} with {} {} byte(s)", range.start, len, fill);
            ranges.push(range);
        }
        Ok(ranges)
    }

    pub fn mutate_data(
        &mut self,
        fs: FsType,
        data: &mut [u8],
        fill: Fill,
        unit: Unit,
    ) -> Result<Vec<Range<usize>>> {
        let len = unit.fill_len(DATA_BLOCK_SIZE);
        let forbidden = forbidden_regions(fs, data)?;
        let pos = pick_data_pos(&mut self.rng, data.len(), len, &forbidden)?;
        let bytes = fill.bytes(len, &mut self.rng);

        let range = pos..pos + len;
        write_range(data, range.clone(), &bytes)?;
        info!("modified offset {:#x} with {} {} byte(s)", pos, len, fill);
        Ok(vec![range])
    }
}

fn write_range(data: &mut [u8], range: Range<usize>, bytes: &[u8]) -> Result<()> {
    match data.get_mut(range.clone()) {
        Some(dst) => {
            dst.copy_from_slice(bytes);
            Ok(())
        }
        None => Err(Error::MutationFailure(format!(
            "range {:#x}..{:#x} exceeds the image ({} bytes)",
            range.start,
            range.end,
            data.len()
        ))),
    }
}
