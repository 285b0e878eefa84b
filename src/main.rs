use argh::FromArgs;
use fsmutator::*;
use log::*;
use std::path::PathBuf;

#[derive(FromArgs)]
/// Write a corrupted copy of a UFS or ext filesystem image.
struct Args {
    /// image to mutate, never modified
    #[argh(option, short = 'f')]
    image: PathBuf,

    /// filesystem type: ufs1, ufs2 (or ufs), ext, auto
    #[argh(option, short = 't', default = "FsSelector::default()")]
    fs_type: FsSelector,

    /// where to write the mutated image
    #[argh(option, short = 'o')]
    out: PathBuf,

    /// put the magic signatures of the source back after mutating
    #[argh(switch, short = 'r')]
    restore: bool,

    #[argh(subcommand)]
    cmd: Cmd,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Cmd {
    Field(FieldCmd),
    Block(BlockCmd),
    Data(DataCmd),
    External(ExternalCmd),
}

#[derive(FromArgs)]
/// Overwrite one named field of the located structures.
#[argh(subcommand, name = "field")]
struct FieldCmd {
    /// sb or cg
    #[argh(positional)]
    kind: StructureKind,

    /// instance index, or all
    #[argh(positional)]
    target: Target,

    /// field name, e.g. fs_fsmnt or e2fs_state
    #[argh(positional)]
    field: String,

    /// replacement value
    #[argh(positional)]
    value: String,

    /// write the value as a little-endian integer
    #[argh(switch)]
    int: bool,
}

#[derive(FromArgs)]
/// Fill a byte or the whole extent of the located structures.
#[argh(subcommand, name = "block")]
struct BlockCmd {
    /// sb or cg
    #[argh(positional)]
    kind: StructureKind,

    /// byte_flip or block
    #[argh(positional)]
    unit: Unit,

    /// zero, ff or rnd
    #[argh(positional)]
    fill: Fill,

    /// instance index, or all
    #[argh(positional)]
    target: Target,
}

#[derive(FromArgs)]
/// Fill bytes outside every located structure.
#[argh(subcommand, name = "data")]
struct DataCmd {
    /// byte_flip or block
    #[argh(positional)]
    unit: Unit,

    /// zero, ff or rnd
    #[argh(positional)]
    fill: Fill,
}

#[derive(FromArgs)]
/// Mutate the whole image with an external tool.
#[argh(subcommand, name = "external")]
struct ExternalCmd {
    /// pass a random seed to the tool and print it
    #[argh(switch)]
    seed: bool,

    /// replay a previous run with this seed
    #[argh(option)]
    replay: Option<u64>,

    /// mutator program
    #[argh(option, default = "PathBuf::from(external::DEFAULT_TOOL)")]
    tool: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Args = argh::from_env();

    layout::verify_all()?;

    let fs = args.fs_type.resolve(&args.image)?;
    let mode = match args.cmd {
        Cmd::Field(c) => Mode::Field {
            kind: c.kind,
            target: c.target,
            value: if c.int {
                Value::parse_int(&c.value)?
            } else {
                Value::Text(c.value)
            },
            field: c.field,
        },
        Cmd::Block(c) => Mode::Structure {
            kind: c.kind,
            target: c.target,
            fill: c.fill,
            unit: c.unit,
        },
        Cmd::Data(c) => Mode::Data {
            fill: c.fill,
            unit: c.unit,
        },
        Cmd::External(c) => {
            let mut tool = ExternalTool::new(c.tool);
            tool.deterministic = c.seed;
            tool.seed = c.replay;
            Mode::External(tool)
        }
    };
    debug!("{} image {:?}: {:?}", fs, args.image, mode);

    let req = Request {
        source: args.image,
        output: args.out,
        fs,
        mode,
        restore: args.restore,
    };
    let report = Mutator::new().mutate(&req)?;

    for r in &report.ranges {
        println!("modified {:#x}..{:#x}", r.start, r.end);
    }
    if let Some(seed) = report.seed {
        println!("seed {}", seed);
    }
    if !report.restored.is_empty() {
        println!("restored {} magic signature(s)", report.restored.len());
    }

    Ok(())
}
