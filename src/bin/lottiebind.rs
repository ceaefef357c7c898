use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use lottiebind::{
    AnimationInfo, PixelFormat, PlaybackEvent, PlaybackOpts, Player, RenderSession, RepeatCount,
    RepeatMode, Rgba8Premul, SessionOpts, TargetSize,
};

#[derive(Parser, Debug)]
#[command(name = "lottiebind", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print animation metadata.
    Info(InfoArgs),
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Play the animation and write every produced frame as a numbered PNG.
    Sequence(SequenceArgs),
}

#[derive(Parser, Debug)]
struct InfoArgs {
    /// Input Lottie JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Print as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Parser, Debug)]
struct SizeArgs {
    /// Target width in pixels (defaults to the composition width).
    #[arg(long)]
    width: Option<f32>,

    /// Target height in pixels (defaults to the composition height).
    #[arg(long)]
    height: Option<f32>,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input Lottie JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Frame number (0-based, fractional allowed).
    #[arg(long)]
    frame: f32,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    size: SizeArgs,
}

#[derive(Parser, Debug)]
struct SequenceArgs {
    /// Input Lottie JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output directory for `frame_NNNNN.png` files.
    #[arg(long)]
    out_dir: PathBuf,

    #[command(flatten)]
    size: SizeArgs,

    /// Extra passes after the first.
    #[arg(long, default_value_t = 0)]
    repeat_count: u32,

    /// Ping-pong instead of restarting at the first frame.
    #[arg(long)]
    reverse: bool,

    /// Playback speed multiplier (only affects the reported frame interval).
    #[arg(long, default_value_t = 1.0)]
    speed: f32,

    /// Stop after this many frames.
    #[arg(long)]
    max_frames: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Info(args) => cmd_info(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Sequence(args) => cmd_sequence(args),
    }
}

fn load_session(path: &Path) -> anyhow::Result<(RenderSession, AnimationInfo)> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read animation '{}'", path.display()))?;
    let session = RenderSession::create_with(
        &bytes,
        &lottiebind::CpuEngine,
        SessionOpts::from_env(),
    )
    .context("create render session")?;
    let Some(info) = session.info() else {
        anyhow::bail!(
            "load animation '{}': {}",
            path.display(),
            session.load_error().unwrap_or("unknown error")
        );
    };
    Ok((session, info))
}

fn target_size(info: &AnimationInfo, size: &SizeArgs) -> anyhow::Result<(f32, f32, TargetSize)> {
    let w = size.width.unwrap_or(info.width);
    let h = size.height.unwrap_or(info.height);
    let target = TargetSize::from_device(w, h)?;
    Ok((w, h, target))
}

fn cmd_info(args: InfoArgs) -> anyhow::Result<()> {
    let (_session, info) = load_session(&args.in_path)?;
    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&info).context("serialize info")?
        );
    } else {
        println!("frames:      {}", info.frame_count);
        println!("duration_ms: {}", info.duration_ms);
        println!("frame_rate:  {}", info.frame_rate);
        println!("size:        {}x{}", info.width, info.height);
    }
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let (session, info) = load_session(&args.in_path)?;
    let (w, h, target) = target_size(&info, &args.size)?;

    let mut pixels = vec![0u32; target.pixel_count()];
    session.bind_target(&mut pixels, w, h);
    anyhow::ensure!(session.is_bound(), "bind render target {w}x{h}");
    session.render_frame(args.frame, &mut pixels);

    write_png(&args.out, &pixels, target, session.opts().pixel_format)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_sequence(args: SequenceArgs) -> anyhow::Result<()> {
    let (session, info) = load_session(&args.in_path)?;
    let (w, h, target) = target_size(&info, &args.size)?;

    let mode = if args.reverse {
        RepeatMode::Reverse
    } else {
        RepeatMode::Restart
    };
    let opts = PlaybackOpts::default()
        .with_speed(args.speed)
        .with_repeat(mode, RepeatCount::Finite(args.repeat_count));
    let mut player = Player::new(info, opts)?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;

    let mut pixels = vec![0u32; target.pixel_count()];
    session.bind_target(&mut pixels, w, h);
    anyhow::ensure!(session.is_bound(), "bind render target {w}x{h}");

    let max = args.max_frames.unwrap_or(usize::MAX);
    let mut written = 0usize;
    while written < max {
        let Some(tick) = player.tick() else {
            break;
        };
        for ev in &tick.events {
            if *ev == PlaybackEvent::Repeat {
                eprintln!("repeat {}", player.repeated());
            }
        }
        session.render_frame(tick.frame as f32, &mut pixels);
        let out = args.out_dir.join(format!("frame_{written:05}.png"));
        write_png(&out, &pixels, target, session.opts().pixel_format)?;
        written += 1;
    }

    eprintln!(
        "wrote {written} frames to {} ({:?} per frame)",
        args.out_dir.display(),
        player.frame_interval()
    );
    Ok(())
}

fn write_png(
    path: &Path,
    pixels: &[u32],
    size: TargetSize,
    format: PixelFormat,
) -> anyhow::Result<()> {
    let mut rgba = Vec::with_capacity(pixels.len() * 4);
    for &px in pixels {
        let [r, g, b, a] = format.unpack(px);
        let straight = if format.is_premultiplied() {
            Rgba8Premul { r, g, b, a }.to_straight_rgba()
        } else {
            [r, g, b, a]
        };
        rgba.extend_from_slice(&straight);
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        path,
        &rgba,
        size.width,
        size.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}
