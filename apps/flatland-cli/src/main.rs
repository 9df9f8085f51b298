use clap::{Parser, Subcommand};
use flatland_assets::TextureStore;
use flatland_common::{Rect, WorldScale};
use flatland_game::{Drawable, FrameContext, Platform, Player};
use flatland_physics::PhysicsWorld;
use flatland_render::{RecordingBackend, RenderBackend};
use flatland_render_wgpu::{GpuContext, QuadRenderer};
use glam::Vec2;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "flatland-cli", about = "CLI tool for flatland operations")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print engine version and crate info
    Info,
    /// Run a headless simulation: a player dropped onto a platform
    Sim {
        /// Number of fixed steps to simulate
        #[arg(short, long, default_value = "120")]
        steps: u32,
        /// Fixed timestep in seconds
        #[arg(short, long, default_value = "0.016666668")]
        dt: f32,
        /// Pixels per physics meter
        #[arg(short, long, default_value = "32.0")]
        pixels_per_meter: f32,
        /// Vertical gravity in physics units
        #[arg(short, long, default_value = "-9.81", allow_hyphen_values = true)]
        gravity: f32,
        /// Render each frame on the wgpu backend (offscreen) instead of
        /// recording draws in memory
        #[arg(long)]
        gpu: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("flatland-cli v{}", env!("CARGO_PKG_VERSION"));
            println!(
                "scale: {} px/m default",
                WorldScale::default().pixels_per_meter
            );
            let placeholder = TextureStore::new().placeholder();
            println!(
                "assets: placeholder {}x{}",
                placeholder.width, placeholder.height
            );
        }
        Commands::Sim {
            steps,
            dt,
            pixels_per_meter,
            gravity,
            gpu,
        } => {
            let params = SimParams {
                steps,
                dt,
                scale: WorldScale::new(pixels_per_meter),
                gravity: Vec2::new(0.0, gravity),
            };
            if gpu {
                run_sim_gpu(&params)?;
            } else {
                let mut backend = RecordingBackend::new();
                run_sim(&mut backend, |_| {}, &params);
                println!("recorded {} draw calls", backend.draw_calls().len());
            }
        }
    }

    Ok(())
}

struct SimParams {
    steps: u32,
    dt: f32,
    scale: WorldScale,
    gravity: Vec2,
}

/// Run the sim against a real device, presenting to an offscreen target.
fn run_sim_gpu(params: &SimParams) -> anyhow::Result<()> {
    let context = GpuContext::headless()?;
    let format = wgpu::TextureFormat::Rgba8UnormSrgb;
    let mut renderer = QuadRenderer::new(&context, format, None);

    let target = context.device.create_texture(&wgpu::TextureDescriptor {
        label: Some("sim_target"),
        size: wgpu::Extent3d {
            width: 640,
            height: 480,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let view = target.create_view(&Default::default());

    run_sim(
        &mut renderer,
        |r| r.flush(&view, wgpu::Color::BLACK),
        params,
    );
    Ok(())
}

/// Drop a player onto a floor platform and print the synced position.
///
/// `end_frame` runs after each frame's draws; the GPU path uses it to
/// encode and submit the pass.
fn run_sim<B: RenderBackend>(backend: &mut B, mut end_frame: impl FnMut(&mut B), params: &SimParams) {
    let mut physics = PhysicsWorld::new(params.gravity);
    let mut textures = TextureStore::new();

    let mut player = Player::new(Vec2::new(100.0, 200.0), 32.0, 48.0);
    let mut floor = Platform::new(Rect::new(0.0, 0.0, 640.0, 16.0));

    let mut ctx = FrameContext {
        backend: &mut *backend,
        textures: &mut textures,
        physics: &mut physics,
        scale: params.scale,
    };
    player.init(&mut ctx);
    floor.init(&mut ctx);

    println!(
        "step 0: player at ({:.2}, {:.2})",
        player.pos().x,
        player.pos().y
    );

    for step in 1..=params.steps {
        physics.step(params.dt);

        let mut ctx = FrameContext {
            backend: &mut *backend,
            textures: &mut textures,
            physics: &mut physics,
            scale: params.scale,
        };
        player.update(&mut ctx);
        floor.update(&mut ctx);
        player.draw(&mut *backend);
        floor.draw(&mut *backend);
        end_frame(backend);

        if step % 30 == 0 || step == params.steps {
            println!(
                "step {step}: player at ({:.2}, {:.2})",
                player.pos().x,
                player.pos().y
            );
        }
    }

    println!("done: {} bodies simulated", physics.body_count());

    player.destroy(&mut *backend);
    floor.destroy(&mut *backend);
}
