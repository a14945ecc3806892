//! Preview window for a finished frame (Escape or close to exit)

use log::warn;
use macroquad::prelude::{
    clear_background, draw_texture_ex, is_key_pressed, next_frame, screen_height, screen_width, vec2,
    Conf, DrawTextureParams, FilterMode, KeyCode, Texture2D, BLACK, WHITE,
};

use super::output::to_rgba_bytes;
use crate::rasterizer::{Resource, UnsignedColor};

/// Blocks until the window is closed
pub fn show(title: &str, target: &Resource<UnsignedColor>) {
    let (Ok(width), Ok(height)) = (u16::try_from(target.width()), u16::try_from(target.height())) else {
        warn!("Frame {}x{} too large to preview", target.width(), target.height());
        return;
    };
    let pixels = to_rgba_bytes(target);

    let conf = Conf {
        window_title: title.to_string(),
        window_width: i32::from(width),
        window_height: i32::from(height),
        window_resizable: true,
        ..Default::default()
    };

    macroquad::Window::from_config(conf, async move {
        let texture = Texture2D::from_rgba8(width, height, &pixels);
        texture.set_filter(FilterMode::Nearest);

        loop {
            if is_key_pressed(KeyCode::Escape) {
                break;
            }
            clear_background(BLACK);

            // Letterbox, keep aspect
            let scale = (screen_width() / f32::from(width)).min(screen_height() / f32::from(height));
            let (draw_w, draw_h) = (f32::from(width) * scale, f32::from(height) * scale);
            draw_texture_ex(
                &texture,
                (screen_width() - draw_w) / 2.0,
                (screen_height() - draw_h) / 2.0,
                WHITE,
                DrawTextureParams {
                    dest_size: Some(vec2(draw_w, draw_h)),
                    ..Default::default()
                },
            );

            next_frame().await;
        }
    });
}
