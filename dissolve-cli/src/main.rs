//! # Dissolve CLI
//!
//! 覆盖层动画引擎的命令行驱动，在内存渲染树上运行效果。
//!
//! ## 用法
//!
//! ```bash
//! # 逐帧输出一次最小化效果（JSON Lines）
//! cargo run -p dissolve-cli -- simulate
//! cargo run -p dissolve-cli -- simulate --phase unminimize --style genie --frame-ms 33
//! cargo run -p dissolve-cli -- simulate --fail-clone --fail-snapshot
//!
//! # 查看风格的片段着色器
//! cargo run -p dissolve-cli -- shader ripple
//!
//! # 预设与生效配置
//! cargo run -p dissolve-cli -- presets
//! cargo run -p dissolve-cli -- --config dissolve.json config
//! cargo run -p dissolve-cli -- --config dissolve.json config --init
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;
use tracing::{debug, info};
use tracing_subscriber::filter::LevelFilter;

use dissolve_runtime::overlay::EffectState;
use dissolve_runtime::style::UniformValue;
use dissolve_runtime::{
    Coordinator, DefaultsProbe, Dispatch, EffectConfig, HostCapabilities, Preset, RuntimeFlags,
    SimulatedScene, Style, Vec2,
};

/// 模拟的最长时间（毫秒），防止参数异常时死循环
const SIMULATION_LIMIT_MS: u64 = 60_000;

#[derive(Parser)]
#[command(name = "dissolve")]
#[command(about = "窗口最小化/还原覆盖层动画 - 无界面驱动")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 配置文件（默认：dissolve.json）
    #[arg(short, long, default_value = "dissolve.json", global = true)]
    config: PathBuf,

    /// 输出调试日志
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// 在内存渲染树上运行一次效果，逐帧输出 JSON
    Simulate(SimulateArgs),

    /// 输出风格的片段着色器源码
    Shader {
        /// 风格名
        style: Style,
    },

    /// 列出预设数值
    Presets,

    /// 输出生效配置
    Config {
        /// 写入默认配置文件
        #[arg(long)]
        init: bool,
    },
}

#[derive(clap::Args)]
struct SimulateArgs {
    /// 效果阶段
    #[arg(long, value_enum, default_value_t = PhaseArg::Minimize)]
    phase: PhaseArg,

    /// 覆盖配置中的风格
    #[arg(long)]
    style: Option<Style>,

    /// 覆盖配置中的时长（毫秒）
    #[arg(long)]
    duration: Option<i64>,

    /// 帧间隔（毫秒）
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,

    /// 窗口宽度
    #[arg(long, default_value_t = 800.0)]
    width: f32,

    /// 窗口高度
    #[arg(long, default_value_t = 600.0)]
    height: f32,

    /// 模拟实时克隆失败
    #[arg(long)]
    fail_clone: bool,

    /// 模拟静态快照失败
    #[arg(long)]
    fail_snapshot: bool,

    /// 模拟宿主不支持着色器
    #[arg(long)]
    no_shader: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum PhaseArg {
    Minimize,
    Unminimize,
}

/// 单帧输出
#[derive(Serialize)]
struct FrameRecord {
    now_ms: u64,
    #[serde(flatten)]
    state: EffectState,
    progress: f32,
    clone: Option<CloneRecord>,
    uniforms: BTreeMap<&'static str, UniformValue>,
}

#[derive(Serialize)]
struct CloneRecord {
    opacity: u8,
    scale: Vec2,
    translation: Vec2,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let flags = RuntimeFlags::from_env();
    init_logging(cli.verbose || flags.debug);

    if let Err(e) = run(cli, flags) {
        eprintln!("dissolve error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli, flags: RuntimeFlags) -> anyhow::Result<()> {
    match cli.command {
        Commands::Simulate(args) => simulate(args, EffectConfig::load(&cli.config), flags),
        Commands::Shader { style } => {
            println!("{}", style.shader_source());
            Ok(())
        }
        Commands::Presets => {
            print_presets();
            Ok(())
        }
        Commands::Config { init } => {
            if init {
                EffectConfig::default()
                    .save(&cli.config)
                    .with_context(|| format!("写入配置失败: {}", cli.config.display()))?;
                info!(path = ?cli.config, "已写入默认配置");
            }
            let params = EffectConfig::load(&cli.config).resolve();
            println!("{}", serde_json::to_string_pretty(&params)?);
            Ok(())
        }
    }
}

fn simulate(args: SimulateArgs, mut config: EffectConfig, flags: RuntimeFlags) -> anyhow::Result<()> {
    if let Some(style) = args.style {
        config.style = style.name().to_string();
    }
    if let Some(duration) = args.duration {
        config.duration_ms = duration;
    }
    let params = config.resolve();

    let mut scene = SimulatedScene::with_capabilities(HostCapabilities {
        shaders: !args.no_shader,
        ..HostCapabilities::default()
    });
    scene.failures_mut().clone = args.fail_clone;
    scene.failures_mut().snapshot = args.fail_snapshot;
    let window = scene.add_window(args.width, args.height);
    let scene = Rc::new(RefCell::new(scene));

    let mut coordinator = Coordinator::new(scene.clone(), params, flags);
    coordinator.enable(Box::new(DefaultsProbe::new()));

    let dispatch = match args.phase {
        PhaseArg::Minimize => coordinator.on_minimize(window, 0),
        PhaseArg::Unminimize => coordinator.on_unminimize(window, 0),
    };
    let handle = match dispatch {
        Dispatch::Started(handle) => handle,
        Dispatch::Ignored(_) => {
            println!("{}", serde_json::to_string(&dispatch)?);
            return Ok(());
        }
    };
    debug!(window = %window, phase = %handle.phase, "开始模拟");

    let frame_ms = args.frame_ms.max(1);
    let mut now = 0;
    loop {
        let running = coordinator.tick(now);
        let effect = coordinator.effect(handle);

        let view = scene.borrow();
        let clone = view.clones_of(window).first().and_then(|&actor| {
            Some(CloneRecord {
                opacity: view.opacity(actor)?,
                scale: view.scale(actor)?,
                translation: view.translation(actor)?,
            })
        });
        let record = FrameRecord {
            now_ms: now,
            state: effect.map_or(EffectState::Detached, |e| e.state()),
            progress: effect.map_or(1.0, |e| e.progress()),
            clone,
            uniforms: view
                .last_shader()
                .map(|(_, shader)| shader.uniforms.clone())
                .unwrap_or_default(),
        };
        println!("{}", serde_json::to_string(&record)?);

        if running == 0 {
            break;
        }
        now += frame_ms;
        if now > SIMULATION_LIMIT_MS {
            anyhow::bail!("模拟超过 {SIMULATION_LIMIT_MS}ms 仍未结束");
        }
    }

    coordinator.disable();
    anyhow::ensure!(
        scene.borrow().live_clone_count() == 0,
        "模拟结束后仍有克隆体残留"
    );
    Ok(())
}

fn print_presets() {
    println!(
        "{:<8} {:>8} {:>6} {:>9} {:>6} {:>7} {:>6}",
        "preset", "duration", "noise", "intensity", "hold", "shrink", "drift"
    );
    for preset in [Preset::Subtle, Preset::Default, Preset::Bold] {
        let v = preset.values();
        println!(
            "{:<8} {:>8} {:>6.1} {:>9.2} {:>6.2} {:>7.2} {:>6}",
            preset.name(),
            v.duration_ms,
            v.noise_scale,
            v.intensity,
            v.reveal_hold,
            v.shrink_min,
            v.drift_px
        );
    }
}
