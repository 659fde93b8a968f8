//! A box bouncing around a headless canvas. Writes the last frame to
//! `bouncing_box.png`.
//!
//! ```text
//! cargo run -p easel --example bouncing_box
//! RUST_LOG=debug cargo run -p easel --example bouncing_box
//! ```

use easel::prelude::*;

const FRAMES: u64 = 90;

fn main() -> Result<()> {
    easel::logging::init();

    let settings = GameSettings::from_json_str(
        r##"{
            "width": 160,
            "height": 120,
            "backgroundColor": "#1e1e28",
            "framerate": 60,
            "title": "Bouncing box"
        }"##,
    )?;
    let mut game = GameCore::init(Canvas::new(1, 1), settings)?;
    game.bind_key("boost", KeyCode::Space)?;

    let mut level = Scene::new("level").with_overlay(|surface, entities| {
        // One pip per entity along the top edge.
        for (i, _) in entities.foreground.iter().enumerate() {
            surface.fill_rect(2.0 + i as f32 * 4.0, 2.0, 3.0, 3.0, Color::WHITE);
        }
    });

    level.spawn_background(
        BackgroundEntity::new(0.0, 100.0, 160.0, 20.0).color(Color::rgb(0.2, 0.25, 0.3)),
    );

    let mut velocity = Vec2::new(2.0, 1.5);
    level.spawn_foreground(
        ForegroundEntity::new(20.0, 20.0, 12.0, 12.0)
            .color(Color::RED)
            .kind("box")
            .on_update(move |body, ctx| {
                let (width, height) = ctx.bounds;
                let speed = if ctx.input.action_pressed("boost") { 2.0 } else { 1.0 };
                body.translate(velocity.x * speed, velocity.y * speed);

                let bbox = body.bounding_box();
                if bbox.left <= 0.0 || bbox.right >= width as f32 {
                    velocity.x = -velocity.x;
                }
                if bbox.top <= 0.0 || bbox.bottom >= height as f32 {
                    velocity.y = -velocity.y;
                }
            }),
    );

    level.spawn_data(DataEntity::new(Phase::End, |frame| {
        if frame.time.every(30) {
            if let Some(body) = frame.entities.foreground.find_kind("box").map(|e| &e.body) {
                let frames = frame.time.frame_count();
                log::info!("box at {:?} after {frames} frames", body.position());
            }
        }
    }));

    game.add_scene(level);

    game.queue_action("boost", |frame| {
        if frame.input.action_just_pressed("boost") {
            log::info!("boost on at frame {}", frame.time.frame_count());
            return ActionStatus::Complete;
        }
        ActionStatus::Pending
    })?;

    // Second half runs with the boost key held.
    game.run_frames(FRAMES / 2)?;
    game.press_key(KeyCode::Space);
    game.run_frames(FRAMES / 2)?;

    game.surface().save_png("bouncing_box.png")?;
    log::info!(
        "Wrote bouncing_box.png ({} frames, {} draw calls in the last one)",
        game.frames_count(),
        game.surface().draw_calls()
    );
    Ok(())
}
