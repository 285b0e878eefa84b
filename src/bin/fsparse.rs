use argh::FromArgs;
use fsmutator::decode::decode;
use fsmutator::locate::locate_file;
use fsmutator::*;
use std::path::PathBuf;

#[derive(FromArgs)]
/// Locate, print and dump the metadata structures of a filesystem image.
struct Args {
    /// image to inspect
    #[argh(option, short = 'f')]
    image: PathBuf,

    /// filesystem type: ufs1, ufs2 (or ufs), ext, auto
    #[argh(option, short = 't', default = "FsSelector::default()")]
    fs_type: FsSelector,

    #[argh(subcommand)]
    cmd: Cmd,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Cmd {
    Find(FindCmd),
    Print(PrintCmd),
    Dump(DumpCmd),
}

#[derive(FromArgs)]
/// List the offsets of every located structure.
#[argh(subcommand, name = "find")]
struct FindCmd {}

#[derive(FromArgs)]
/// Print the fields of one located structure.
#[argh(subcommand, name = "print")]
struct PrintCmd {
    /// sb or cg
    #[argh(positional)]
    kind: StructureKind,

    /// instance index
    #[argh(positional)]
    index: usize,
}

#[derive(FromArgs)]
/// Write the raw bytes of located structures to .dump files.
#[argh(subcommand, name = "dump")]
struct DumpCmd {
    /// dump every instance instead of one
    #[argh(switch)]
    all: bool,

    /// instance index
    #[argh(option, default = "0")]
    index: usize,

    /// sb or cg
    #[argh(option, default = "StructureKind::Superblock")]
    kind: StructureKind,

    /// output directory, next to the image by default
    #[argh(option)]
    dir: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Args = argh::from_env();

    layout::verify_all()?;

    let fs = args.fs_type.resolve(&args.image)?;
    match args.cmd {
        Cmd::Find(_) => {
            for &kind in fs.kinds() {
                let locs = locate_file(fs, kind, &args.image)?;
                println!("{} {} location(s):", locs.len(), kind);
                for (i, off) in locs.iter().enumerate() {
                    println!("  [{}] {:#x}", i, off);
                }
            }
        }
        Cmd::Print(c) => {
            let layout = FieldLayout::of(fs, c.kind)?;
            let bases = locate_file(fs, c.kind, &args.image)?.select(Target::Index(c.index))?;
            for base in bases {
                println!("{} {} at {:#x}", fs, c.kind, base);
                print!("{}", decode(layout, &args.image, base)?);
            }
        }
        Cmd::Dump(c) => {
            let layout = FieldLayout::of(fs, c.kind)?;
            let target = if c.all {
                Target::All
            } else {
                Target::Index(c.index)
            };
            let bases = locate_file(fs, c.kind, &args.image)?.select(target)?;
            for base in bases {
                let sb = decode(layout, &args.image, base)?;
                let path = sb.dump(c.kind, &args.image, c.dir.as_deref())?;
                println!("{}", path.display());
            }
        }
    }

    Ok(())
}
