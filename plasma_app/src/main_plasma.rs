//! Plasma demo application
//!
//! Renders a classic plasma effect into a fixed 320x240 buffer every
//! frame. Resize the window to watch the surface rescale the same buffer
//! to the new viewport; close it to exit cleanly.

use std::time::{Duration, Instant};

use pixel_surface::{Frame, Surface, UpdateStatus};

// Buffer stays this size no matter what the window does.
const BUFFER_WIDTH: u32 = 320;
const BUFFER_HEIGHT: u32 = 240;
const FRAME_TIME: Duration = Duration::from_millis(16);

fn plasma_pixel(x: u32, y: u32, t: f32) -> u32 {
    let fx = x as f32 / BUFFER_WIDTH as f32;
    let fy = y as f32 / BUFFER_HEIGHT as f32;

    let v = (fx * 10.0 + t).sin()
        + ((fy * 10.0 + t) * 0.5).sin()
        + ((fx * 10.0 + fy * 10.0 + t) * 0.5).sin()
        + (((fx - 0.5).hypot(fy - 0.5) * 20.0 + t) * 0.5).sin();

    let r = ((v * std::f32::consts::PI).sin() * 127.0 + 128.0) as u32;
    let g = ((v * std::f32::consts::PI + 2.0).sin() * 127.0 + 128.0) as u32;
    let b = ((v * std::f32::consts::PI + 4.0).sin() * 127.0 + 128.0) as u32;
    (r << 16) | (g << 8) | b
}

fn render(pixels: &mut [u32], t: f32) {
    for y in 0..BUFFER_HEIGHT {
        for x in 0..BUFFER_WIDTH {
            pixels[(y * BUFFER_WIDTH + x) as usize] = plasma_pixel(x, y, t);
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut surface = Surface::open("Plasma", BUFFER_WIDTH, BUFFER_HEIGHT)?;
    let mut pixels = vec![0u32; (BUFFER_WIDTH * BUFFER_HEIGHT) as usize];
    let start = Instant::now();

    loop {
        render(&mut pixels, start.elapsed().as_secs_f32());

        let frame = Frame::new(&pixels, BUFFER_WIDTH, BUFFER_HEIGHT)?;
        if surface.update(Some(frame))? == UpdateStatus::Terminated {
            log::info!("window closed after {:.1}s", start.elapsed().as_secs_f32());
            break;
        }

        std::thread::sleep(FRAME_TIME);
    }

    Ok(())
}
