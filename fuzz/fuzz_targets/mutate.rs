#![no_main]

use fsmutator::consts::*;
use fsmutator::*;
use libfuzzer_sys::fuzz_target;
use rand::rngs::StdRng;
use rand::SeedableRng;

use arbitrary::Arbitrary;

#[derive(Arbitrary, Debug)]
pub enum Op {
    Field {
        cg: bool,
        index: Option<u8>,
        field: u16,
        value: i64,
    },
    Structure {
        cg: bool,
        index: Option<u8>,
        fill: u8,
        block: bool,
    },
    Data {
        fill: u8,
        block: bool,
    },
}

#[derive(Arbitrary, Debug)]
pub struct Input {
    ext: bool,
    seed: u64,
    /// structures planted in 512-byte units
    sbs: Vec<u16>,
    cgs: Vec<u16>,
    ops: Vec<Op>,
    image: Vec<u8>,
}

fn kind(cg: bool) -> StructureKind {
    if cg {
        StructureKind::CylinderGroup
    } else {
        StructureKind::Superblock
    }
}

fn target(index: Option<u8>) -> Target {
    index.map_or(Target::All, |i| Target::Index(i as usize))
}

fn fill(f: u8) -> Fill {
    match f % 3 {
        0 => Fill::Zero,
        1 => Fill::Ff,
        _ => Fill::Random,
    }
}

fn unit(block: bool) -> Unit {
    if block {
        Unit::Block
    } else {
        Unit::ByteFlip
    }
}

fuzz_target!(|input: Input| {
    let fs = if input.ext { FsType::Ext } else { FsType::Ufs2 };
    let mut data = input.image;
    let len = data.len();

    for off in input.sbs.iter().map(|&o| o as usize * 512) {
        if fs == FsType::Ext && off + EXT_SB_SIZE <= len {
            synth::plant_ext_sb(&mut data, off, &[0xa5; 16]);
        } else if fs != FsType::Ext && off + UFS_SB_SIZE <= len {
            synth::plant_ufs_sb(&mut data, fs, off);
        }
    }
    if fs != FsType::Ext {
        for off in input.cgs.iter().map(|&o| o as usize * 512) {
            if off + UFS_CG_SIZE <= len {
                synth::plant_cg(&mut data, off);
            }
        }
    }
    let mut m = Mutator::with_rng(StdRng::seed_from_u64(input.seed));

    for op in input.ops {
        let mode = match op {
            Op::Field {
                cg,
                index,
                field,
                value,
            } => {
                let layout = match FieldLayout::of(fs, kind(cg)) {
                    Ok(layout) => layout,
                    Err(_) => continue,
                };
                let f = &layout.fields[field as usize % layout.fields.len()];
                Mode::Field {
                    kind: kind(cg),
                    target: target(index),
                    field: f.name.to_string(),
                    value: Value::Int(value as i128),
                }
            }
            Op::Structure {
                cg,
                index,
                fill: f,
                block,
            } => Mode::Structure {
                kind: kind(cg),
                target: target(index),
                fill: fill(f),
                unit: unit(block),
            },
            Op::Data { fill: f, block } => Mode::Data {
                fill: fill(f),
                unit: unit(block),
            },
        };

        if let Ok(ranges) = m.apply(fs, &mode, &mut data) {
            for r in ranges {
                assert!(r.end <= len);
            }
        }
        assert_eq!(data.len(), len);
    }
});
