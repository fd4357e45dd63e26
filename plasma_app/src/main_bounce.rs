//! Bouncing-box demo application
//!
//! A handful of colored boxes bounce around a buffer that always matches
//! the window size, so no rescaling happens until the user resizes the
//! window mid-flight. Window parameters come from `bounce.toml` when one
//! exists next to the binary.

use std::time::Duration;

use pixel_surface::{Frame, Size, Surface, SurfaceConfig, UpdateStatus};
use rand::prelude::*;

const BOX_COUNT: usize = 8;
const BOX_SIZE: i32 = 24;
const BACKGROUND: u32 = 0x0010_1018;
const FRAME_TIME: Duration = Duration::from_millis(16);

struct BouncingBox {
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
    color: u32,
}

impl BouncingBox {
    fn random(rng: &mut impl Rng, bounds: Size) -> Self {
        Self {
            x: rng.gen_range(0.0..(bounds.width as f32 - BOX_SIZE as f32)),
            y: rng.gen_range(0.0..(bounds.height as f32 - BOX_SIZE as f32)),
            vx: rng.gen_range(60.0..180.0) * if rng.gen() { 1.0 } else { -1.0 },
            vy: rng.gen_range(60.0..180.0) * if rng.gen() { 1.0 } else { -1.0 },
            color: rng.gen::<u32>() & 0x00ff_ffff,
        }
    }

    fn step(&mut self, dt: f32, bounds: Size) {
        self.x += self.vx * dt;
        self.y += self.vy * dt;

        let max_x = bounds.width as f32 - BOX_SIZE as f32;
        let max_y = bounds.height as f32 - BOX_SIZE as f32;
        if self.x < 0.0 || self.x > max_x {
            self.vx = -self.vx;
            self.x = self.x.clamp(0.0, max_x);
        }
        if self.y < 0.0 || self.y > max_y {
            self.vy = -self.vy;
            self.y = self.y.clamp(0.0, max_y);
        }
    }

    fn draw(&self, pixels: &mut [u32], bounds: Size) {
        let x0 = (self.x as i32).max(0);
        let y0 = (self.y as i32).max(0);
        for y in y0..(y0 + BOX_SIZE).min(bounds.height as i32) {
            for x in x0..(x0 + BOX_SIZE).min(bounds.width as i32) {
                pixels[(y as u32 * bounds.width + x as u32) as usize] = self.color;
            }
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = SurfaceConfig::load_from_file("bounce.toml").unwrap_or_else(|_| {
        SurfaceConfig::new("Bounce", 640, 480)
    });
    let mut surface = Surface::open_with(&config)?;

    let mut rng = rand::thread_rng();
    let mut bounds = surface.window_size();
    let mut boxes: Vec<BouncingBox> = (0..BOX_COUNT)
        .map(|_| BouncingBox::random(&mut rng, bounds))
        .collect();
    let mut pixels = vec![BACKGROUND; bounds.area()];

    loop {
        // Track the window so the buffer always matches the viewport and
        // the boxes keep the whole client area to bounce in.
        let window = surface.window_size();
        if window != bounds && !window.is_empty() {
            bounds = window;
            pixels.resize(bounds.area(), BACKGROUND);
            for b in &mut boxes {
                b.x = b.x.min(bounds.width as f32 - BOX_SIZE as f32).max(0.0);
                b.y = b.y.min(bounds.height as f32 - BOX_SIZE as f32).max(0.0);
            }
        }

        pixels.fill(BACKGROUND);
        for b in &mut boxes {
            b.step(FRAME_TIME.as_secs_f32(), bounds);
            b.draw(&mut pixels, bounds);
        }

        let frame = Frame::new(&pixels, bounds.width, bounds.height)?;
        if surface.update(Some(frame))? == UpdateStatus::Terminated {
            break;
        }

        std::thread::sleep(FRAME_TIME);
    }

    Ok(())
}
