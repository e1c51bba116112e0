//! Headless rendering: simulate a fixed number of frames, save one PNG

use std::path::PathBuf;

use anyhow::{Context, Result};
use ember_render::{BillboardPipeline, HeadlessContext, TextureCache};
use ember_runtime::GameClock;

use crate::scene::{load_sprite_texture, FountainScene, PlayerOptions};

#[derive(Clone, Debug)]
pub struct SnapshotOptions {
    pub frames: u32,
    pub width: u32,
    pub height: u32,
    pub output: PathBuf,
}

/// Run `snapshot.frames` fixed-interval frames offscreen and write the last one
pub fn run_snapshot(options: &PlayerOptions, snapshot: &SnapshotOptions) -> Result<()> {
    if snapshot.width == 0 || snapshot.height == 0 {
        anyhow::bail!(
            "snapshot size must be non-zero, got {}x{}",
            snapshot.width,
            snapshot.height
        );
    }

    // Fail on an unknown extension before doing any GPU work
    image::ImageFormat::from_path(&snapshot.output)
        .with_context(|| format!("Unsupported image format: {}", snapshot.output.display()))?;

    let context = pollster::block_on(HeadlessContext::new(snapshot.width, snapshot.height))
        .context("Failed to create headless render context")?;

    let mut textures = TextureCache::new(&context.device, &context.queue);
    let texture = load_sprite_texture(
        &mut textures,
        &context.device,
        &context.queue,
        options.texture.as_deref(),
    )
    .context("Failed to load sprite texture")?;

    let mut scene = FountainScene::new(
        options.config.clone(),
        options.seed,
        texture,
        context.aspect_ratio(),
    )
    .context("Failed to build particle scene")?;

    // Fixed steps at the target interval, independent of wall time
    let mut clock = GameClock::with_target_fps(options.fps);
    let mut sprites = 0;
    for _ in 0..snapshot.frames {
        clock.advance(clock.frame_interval_secs());
        sprites = scene.advance(clock.delta_time)?;
    }
    log::info!(
        "[snapshot] {} frames ({:.2}s simulated), {} sprites",
        clock.frame_count,
        clock.total_time,
        sprites
    );

    let mut pipeline = BillboardPipeline::new(&context.device, context.format);
    let texture_bind_group =
        pipeline.texture_bind_group(&context.device, textures.get(texture));
    pipeline.prepare(
        &context.device,
        &context.queue,
        &scene.camera().projection_matrix(),
        scene.billboards(),
    );
    pipeline.render_to(
        &context.device,
        &context.queue,
        &context.color_view,
        &texture_bind_group,
    );

    let image = context
        .read_image()
        .context("Failed to read back snapshot")?;
    image
        .save(&snapshot.output)
        .with_context(|| format!("Failed to write {}", snapshot.output.display()))?;
    log::info!("[snapshot] Saved {}", snapshot.output.display());

    scene.shutdown()?;
    Ok(())
}
