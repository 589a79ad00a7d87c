use std::env;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use log::info;
use pollster::block_on;

use glowtext::input::parse_key_list;
use glowtext::render::software::MAX_DIMENSION;
use glowtext::{
    action_for_key, run_windowed, FontSource, KeyCode, SceneContext, ShowcaseConfig,
    SoftwareRenderer, Variant, WindowInitError,
};

const FALLBACK_OUTPUT: &str = "glowtext.png";

const USAGE: &str = "Usage: glowtext [--headless <out.png>] [--frames <n>] [--size <WxH>] \
[--font <font.xml>] [--nrp <n>] [--variant <lit|wave|flat>] [--letter <text>] \
[--number <text>] [--keys <w,a,s,d,...>]";

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn,glowtext=info"))
        .init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = CliOptions::parse(env::args().skip(1))?;
    let scene = assemble(&options)?;
    print_summary(&scene, &options.config);

    match &options.headless {
        Some(path) => run_headless(scene, &options, path),
        None => match run_windowed(scene, options.config.key_step) {
            Ok(scene) => {
                print_final_state(&scene);
                Ok(())
            }
            Err(err) if err.downcast_ref::<WindowInitError>().is_some() => {
                eprintln!("{err}. Falling back to headless mode, writing {FALLBACK_OUTPUT}.");
                let scene = assemble(&options)?;
                run_headless(scene, &options, Path::new(FALLBACK_OUTPUT))
            }
            Err(err) => Err(err),
        },
    }
}

fn assemble(options: &CliOptions) -> Result<SceneContext> {
    block_on(SceneContext::assemble(&options.config, &options.font))
        .context("failed to assemble scene")
}

fn run_headless(mut scene: SceneContext, options: &CliOptions, path: &Path) -> Result<()> {
    let (width, height) = options.size;
    scene.resize(width, height);
    let mut renderer = SoftwareRenderer::new(width, height)?;

    for key in &options.keys {
        if let Some(action) = action_for_key(*key, options.config.key_step) {
            scene.apply(action);
        }
    }

    let mut stats = Default::default();
    for _ in 0..options.frames {
        let frame = scene.advance_frame();
        stats = renderer.render(&scene, &frame);
    }
    renderer.save_png(path)?;
    info!("wrote {}", path.display());

    println!(
        "Rendered {} frame(s) at {width}x{height} to {}",
        options.frames,
        path.display()
    );
    println!(
        "Last frame: {} triangles, {} fragments",
        stats.triangles, stats.fragments
    );
    print_final_state(&scene);
    Ok(())
}

fn print_summary(scene: &SceneContext, config: &ShowcaseConfig) {
    println!(
        "Scene assembled with {} drawable(s) ({} variant, ambient {:.3})",
        scene.drawables.len(),
        config.variant,
        config.ambient_intensity()
    );
    for drawable in &scene.drawables {
        let wave = if drawable.material.wave.is_some() {
            " + wave"
        } else {
            ""
        };
        println!(
            " - {} ({}{wave}, {} triangles)",
            drawable.name,
            drawable.material.model.label(),
            drawable.mesh.triangle_count()
        );
    }
}

fn print_final_state(scene: &SceneContext) {
    let cube = scene.cube_position();
    let camera = scene.camera.position;
    println!("Final state after {} frame(s):", scene.frame());
    println!(" - cube pos=({:.2}, {:.2}, {:.2})", cube.x, cube.y, cube.z);
    println!(
        " - camera pos=({:.2}, {:.2}, {:.2})",
        camera.x, camera.y, camera.z
    );
    println!(" - time={:.3}", scene.time());
}

struct CliOptions {
    config: ShowcaseConfig,
    font: FontSource,
    headless: Option<PathBuf>,
    frames: u32,
    size: (u32, u32),
    keys: Vec<KeyCode>,
}

impl CliOptions {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self> {
        let mut options = Self {
            config: ShowcaseConfig::default(),
            font: FontSource::Builtin,
            headless: None,
            frames: 1,
            size: (1280, 720),
            keys: Vec::new(),
        };

        while let Some(arg) = args.next() {
            let mut value = || {
                args.next()
                    .ok_or_else(|| anyhow!("{arg} expects a value\n{USAGE}"))
            };
            match arg.as_str() {
                "--headless" => options.headless = Some(PathBuf::from(value()?)),
                "--frames" => {
                    options.frames = value()?.parse().context("--frames expects a number")?;
                    if options.frames == 0 {
                        return Err(anyhow!("--frames must be at least 1"));
                    }
                }
                "--size" => options.size = parse_size(&value()?)?,
                "--font" => options.font = FontSource::File(PathBuf::from(value()?)),
                "--nrp" => {
                    options.config.nrp = value()?.parse().context("--nrp expects a number")?
                }
                "--variant" => options.config.variant = value()?.parse::<Variant>()?,
                "--letter" => options.config.text.letter = value()?,
                "--number" => options.config.text.number = value()?,
                "--keys" => {
                    let list = value()?;
                    options.keys = parse_key_list(&list)
                        .ok_or_else(|| anyhow!("unrecognized key in {list:?}"))?;
                }
                "--help" | "-h" => return Err(anyhow!("{USAGE}")),
                other => return Err(anyhow!("Unknown argument: {other}\n{USAGE}")),
            }
        }
        Ok(options)
    }
}

fn parse_size(value: &str) -> Result<(u32, u32)> {
    let (width, height) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| anyhow!("--size expects WxH, got {value:?}"))?;
    let width: u32 = width.parse().context("invalid width")?;
    let height: u32 = height.parse().context("invalid height")?;
    if width == 0 || height == 0 {
        return Err(anyhow!("--size must be non-zero, got {value:?}"));
    }
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(anyhow!(
            "--size is limited to {MAX_DIMENSION}x{MAX_DIMENSION}, got {value:?}"
        ));
    }
    Ok((width, height))
}
