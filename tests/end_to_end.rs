use fsmutator::consts::*;
use fsmutator::decode::decode;
use fsmutator::image::Image;
use fsmutator::locate::locate_file;
use fsmutator::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs::OpenOptions;
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

mod common;

fn mutator() -> Mutator<StdRng> {
    Mutator::with_rng(StdRng::seed_from_u64(0xf5))
}

/// Sparse file of `len` bytes with `chunks` written at their offsets.
fn sparse_image(path: &Path, len: u64, chunks: &[(usize, Vec<u8>)]) {
    let mut f = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .unwrap();
    f.set_len(len).unwrap();
    for (off, bytes) in chunks {
        f.seek(SeekFrom::Start(*off as u64)).unwrap();
        f.write_all(bytes).unwrap();
    }
}

fn ufs2_sb_bytes(off: usize) -> Vec<u8> {
    let mut data = vec![0u8; off + UFS_SB_SIZE];
    common::plant_ufs_sb(&mut data, FsType::Ufs2, off);
    data.split_off(off)
}

fn request(source: &Path, output: PathBuf, fs: FsType, mode: Mode, restore: bool) -> Request {
    Request {
        source: source.to_path_buf(),
        output,
        fs,
        mode,
        restore,
    }
}

#[test]
fn large_sparse_ufs2_block_zero() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("ufs2.img");
    let output = dir.path().join("ufs2.out");
    sparse_image(
        &source,
        200 << 20,
        &[(65536, ufs2_sb_bytes(65536)), (131072, ufs2_sb_bytes(131072))],
    );

    let locs = locate_file(FsType::Ufs2, StructureKind::Superblock, &source).unwrap();
    assert_eq!(*locs, vec![65536, 131072]);

    let mode = Mode::Structure {
        kind: StructureKind::Superblock,
        target: Target::All,
        fill: Fill::Zero,
        unit: Unit::Block,
    };
    let report = mutator()
        .mutate(&request(&source, output.clone(), FsType::Ufs2, mode, false))
        .unwrap();
    assert_eq!(report.ranges, vec![65536..66912, 131072..132448]);
    assert!(report.restored.is_empty());

    let src = Image::open(&source).unwrap();
    let out = Image::open(&output).unwrap();
    assert_eq!(src.len(), out.len());

    let mut changed = Vec::new();
    for (i, (a, b)) in src.chunks(1 << 20).zip(out.chunks(1 << 20)).enumerate() {
        if a != b {
            changed.push(i);
        }
    }
    assert_eq!(changed, vec![0]);
    assert!(out[65536..66912].iter().all(|&b| b == 0));
    assert!(out[131072..132448].iter().all(|&b| b == 0));
    assert_eq!(&src[..65536], &out[..65536]);
    assert_eq!(&src[66912..131072], &out[66912..131072]);
    assert_eq!(&src[132448..1 << 20], &out[132448..1 << 20]);

    // the source keeps its superblocks
    assert_eq!(&src[65536 + 1372..65536 + 1376], &UFS2_MAGIC_SIG);
}

#[test]
fn ext_field_on_every_replica() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("ext4.img");
    let uuid = [0x9cu8; 16];
    let replicas = [SBLOCK_EXT2, 0x8000 * 4, 0x18000 * 4];
    std::fs::write(&source, common::ext_image(1 << 20, &replicas, &uuid)).unwrap();

    let mode = |field: &str| Mode::Field {
        kind: StructureKind::Superblock,
        target: Target::All,
        field: field.to_string(),
        value: Value::Int(0),
    };

    // without restoration the magic stays broken
    let broken = dir.path().join("broken.img");
    mutator()
        .mutate(&request(&source, broken.clone(), FsType::Ext, mode("e2fs_magic"), false))
        .unwrap();
    let out = std::fs::read(&broken).unwrap();
    for base in replicas {
        assert_eq!(&out[base + 56..base + 58], &[0, 0]);
    }

    // with restoration it is forced back
    let fixed = dir.path().join("fixed.img");
    let report = mutator()
        .mutate(&request(&source, fixed.clone(), FsType::Ext, mode("e2fs_magic"), true))
        .unwrap();
    assert_eq!(
        report.restored,
        replicas.iter().map(|b| b + 56).collect::<Vec<_>>()
    );
    assert_eq!(std::fs::read(&fixed).unwrap(), std::fs::read(&source).unwrap());

    let missing = mutator().mutate(&request(
        &source,
        dir.path().join("never.img"),
        FsType::Ext,
        mode("fs_fsmnt"),
        false,
    ));
    assert!(matches!(missing, Err(Error::UnknownField { .. })));
}

#[test]
fn data_plane_file() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("ufs2.img");
    let data = common::ufs_image(FsType::Ufs2, 1 << 20, &[SBLOCK_UFS2, 0x80000], &[0x40000]);
    std::fs::write(&source, &data).unwrap();

    let mut m = mutator();
    for i in 0..20 {
        let output = dir.path().join(format!("out{}.img", i));
        let mode = Mode::Data {
            fill: Fill::Ff,
            unit: Unit::Block,
        };
        let report = m
            .mutate(&request(&source, output.clone(), FsType::Ufs2, mode, true))
            .unwrap();
        let r = report.ranges[0].clone();
        assert_eq!(r.len(), DATA_BLOCK_SIZE);
        for (lo, size) in [(SBLOCK_UFS2, UFS_SB_SIZE), (0x80000, UFS_SB_SIZE), (0x40000, UFS_CG_SIZE)] {
            assert!(r.end < lo || r.start > lo + size);
        }

        let out = std::fs::read(&output).unwrap();
        assert_eq!(out.len(), data.len());
        assert!(out[r.clone()].iter().all(|&b| b == 0xff));
        assert_eq!(&out[..r.start], &data[..r.start]);
        assert_eq!(&out[r.end..], &data[r.end..]);

        assert_eq!(report.restored, vec![SBLOCK_UFS2 + 1372, 0x40004, 0x80000 + 1372]);
        for sb in [SBLOCK_UFS2, 0x80000] {
            assert_eq!(&out[sb + 1372..sb + 1376], &UFS2_MAGIC_SIG);
        }
        assert_eq!(&out[0x40004..0x40007], &CG_MAGIC_SIG);
    }
}

#[test]
fn restore_after_random_fills() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("ufs2.img");
    let data = common::ufs_image(FsType::Ufs2, 1 << 20, &[SBLOCK_UFS2, 0x80000], &[0x40000]);
    std::fs::write(&source, &data).unwrap();

    let mut m = mutator();
    for (i, (kind, unit)) in [
        (StructureKind::Superblock, Unit::Block),
        (StructureKind::Superblock, Unit::ByteFlip),
        (StructureKind::CylinderGroup, Unit::Block),
        (StructureKind::CylinderGroup, Unit::ByteFlip),
    ]
    .into_iter()
    .enumerate()
    {
        let output = dir.path().join(format!("rnd{}.img", i));
        let mode = Mode::Structure {
            kind,
            target: Target::All,
            fill: Fill::Random,
            unit,
        };
        m.mutate(&request(&source, output.clone(), FsType::Ufs2, mode, true))
            .unwrap();

        let out = std::fs::read(&output).unwrap();
        for sb in [SBLOCK_UFS2, 0x80000] {
            assert_eq!(&out[sb + 1372..sb + 1376], &UFS2_MAGIC_SIG);
        }
        assert_eq!(&out[0x40004..0x40007], &CG_MAGIC_SIG);
    }
}

#[test]
fn locate_print_and_dump() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("ufs1.img");
    let data = common::ufs_image(FsType::Ufs1, 1 << 20, &[SBLOCK_UFS1, 0x50000], &[0x20000, 0x60000]);
    std::fs::write(&source, &data).unwrap();

    let fs = FsSelector::Auto.resolve(&source).unwrap();
    assert_eq!(fs, FsType::Ufs1);

    let sbs = locate_file(fs, StructureKind::Superblock, &source).unwrap();
    assert_eq!(*sbs, vec![SBLOCK_UFS1, 0x50000]);
    let sb = decode(&layout::UFS_SB_LAYOUT, &source, sbs[1]).unwrap();
    assert_eq!(&sb.get("fs_fsmnt").unwrap()[..4], b"/mnt");
    assert!(sb.to_string().lines().any(|l| l.starts_with("fs_bsize") && l.ends_with("0x8000")));

    let cgs = locate_file(fs, StructureKind::CylinderGroup, &source).unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    let mut dumped = Vec::new();
    for &base in cgs.iter() {
        let cg = decode(&layout::UFS_CG_LAYOUT, &source, base).unwrap();
        dumped.push(cg.dump(StructureKind::CylinderGroup, &source, Some(out_dir.path())).unwrap());
    }
    assert_eq!(
        dumped,
        vec![
            out_dir.path().join("cylinder_group_0x20000_ufs1.img.dump"),
            out_dir.path().join("cylinder_group_0x60000_ufs1.img.dump"),
        ]
    );
    assert_eq!(
        std::fs::read(&dumped[1]).unwrap(),
        &data[0x60000..0x60000 + UFS_CG_SIZE]
    );
}

#[cfg(unix)]
#[test]
fn external_tool_output() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("img");
    let output = dir.path().join("out");
    std::fs::write(&source, common::ufs_image(FsType::Ufs2, 1 << 18, &[], &[])).unwrap();

    let report = mutator()
        .mutate(&request(
            &source,
            output.clone(),
            FsType::Ufs2,
            Mode::External(ExternalTool::new("cat")),
            true,
        ))
        .unwrap();
    assert_eq!(report.seed, None);
    assert!(report.ranges.is_empty());
    // no magic in the source, nothing to restore
    assert!(report.restored.is_empty());
    assert_eq!(std::fs::read(&output).unwrap(), std::fs::read(&source).unwrap());
}
