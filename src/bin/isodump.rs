use clap::{ArgAction, Parser};
use isobox::{
    FourCC, IsoBox, JsonBox, JsonFile, KnownBox, NodeKind, OpenEnded, ParseOptions,
    read_boxes_with, select_by_path, util::hex_dump,
};

#[derive(Parser, Debug)]
#[command(version, about = "ISOBMFF/MP4 box tree explorer")]
struct Args {
    /// MP4/ISOBMFF file path
    path: String,

    /// Only print subtree(s) matching a dotted path (e.g. moov.trak[0].mdia.mdhd)
    #[arg(long = "filter")]
    filter: Option<String>,

    /// Hex-dump the payload of every box of this 4CC (e.g. --raw ftyp)
    #[arg(long = "raw")]
    raw: Option<String>,

    /// Bytes to show per raw dump (0 means the entire payload)
    #[arg(long, default_value_t = 0)]
    bytes: usize,

    /// Containers nested this deep are not descended into
    #[arg(long, default_value_t = 64)]
    max_depth: usize,

    /// End size-0 boxes at their parent instead of at the end of the file
    #[arg(long, action = ArgAction::SetTrue)]
    clamp_size_zero: bool,

    /// Emit JSON instead of a human-readable tree
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let data = std::fs::read(&args.path)?;
    let options = ParseOptions {
        max_depth: args.max_depth,
        open_ended: if args.clamp_size_zero {
            OpenEnded::ParentEnd
        } else {
            OpenEnded::BufferEnd
        },
    };
    let file = read_boxes_with(&data, options)?;

    let targets: Vec<&IsoBox> = match &args.filter {
        Some(path) => select_by_path(file.boxes(), path),
        None => file.boxes().iter().collect(),
    };

    if args.json {
        let out = JsonFile {
            incomplete: file.is_incomplete(),
            boxes: targets.iter().map(|b| JsonBox::from(*b)).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    for b in &targets {
        for (depth, node) in b.walk() {
            print_box(node, depth);
        }
    }
    if file.is_incomplete() {
        println!("(incomplete: file is truncated)");
    }

    if let Some(sel) = &args.raw {
        let typ = FourCC::from_str(sel)
            .ok_or_else(|| anyhow::anyhow!("--raw expects a four-character code, got {sel:?}"))?;
        for (i, b) in file.find_all(typ).into_iter().enumerate() {
            dump_raw(&data, b, i, args.bytes);
        }
    }

    Ok(())
}

fn print_box(b: &IsoBox, depth: usize) {
    let indent = "  ".repeat(depth);
    let note = match &b.kind {
        NodeKind::Container(_) => " (container)".to_string(),
        NodeKind::Truncated => " (incomplete)".to_string(),
        NodeKind::Decoded => {
            let fields: Vec<String> = b
                .fields
                .iter()
                .filter(|(name, _)| !matches!(*name, "size" | "type" | "largesize"))
                .map(|(name, value)| format!("{name}={value}"))
                .collect();
            format!(" [{}]", fields.join(" "))
        }
        NodeKind::Leaf(_) => match KnownBox::from(b.typ) {
            KnownBox::Unknown(_) => String::new(),
            kb => format!(" {}", kb.full_name()),
        },
    };
    println!(
        "{indent}{:>8} {:>10} {}{}",
        format!("{:#x}", b.start),
        b.size,
        b.typ,
        note
    );
}

fn dump_raw(data: &[u8], b: &IsoBox, index: usize, limit: usize) {
    let Some(range) = b.range() else {
        println!("\n== Dump {index} ({}) skipped: box is truncated ==", b.typ);
        return;
    };
    let off = b.payload_offset();
    let len = range.end - off;
    let to_read = if limit == 0 { len } else { limit.min(len) };
    println!(
        "\n== Dump {} ({}) payload: offset={:#x}, len={} ==",
        index, b.typ, off, to_read
    );
    print!("{}", hex_dump(&data[off..off + to_read], off as u64));
}
