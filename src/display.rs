use crate::error::{Error, Result};
use crate::settings::Settings;

use eframe::egui;
use eframe::egui::{ColorImage, TextureHandle, TextureOptions, Vec2,
                   ViewportCommand};
use image::RgbaImage;
use std::time::{Duration, Instant};

// Space between grid cells in points
const CELL_PAD: f32 = 4.0;

pub fn grid_shape(count: usize) -> (usize, usize) {
    let cols = if count <= 8 { 2 } else { 4 };
    let rows = (count + cols - 1)/cols;

    (rows, cols)
}

pub trait ImageViewer {
    fn show(&self, title: &str, images: Vec<RgbaImage>, settings: &Settings)
            -> Result<()>;
}

// Opens a native window with the grid and closes it again after
// SHOWTIME seconds. Blocks until the window is gone.
pub struct WindowViewer;

impl ImageViewer for WindowViewer {
    fn show(&self, title: &str, images: Vec<RgbaImage>, settings: &Settings)
            -> Result<()> {
        if images.is_empty() {
            return Ok(());
        }

        let options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_title(title)
                .with_position([settings.xpos, settings.ypos])
                .with_inner_size([settings.fig_width, settings.fig_height]),
            ..Default::default()
        };

        let grid = GridWindow::new(title, images, settings.showtime);

        eframe::run_native("gatebilde", options,
                           Box::new(|_cc| Ok(Box::new(grid))))
            .map_err(|e| Error::Display(e.to_string()))
    }
}

pub struct NoViewer;

impl ImageViewer for NoViewer {
    fn show(&self, _: &str, _: Vec<RgbaImage>, _: &Settings) -> Result<()> {
        Ok(())
    }
}

struct GridWindow {
    title: String,
    pending: Vec<ColorImage>,
    textures: Vec<TextureHandle>,
    deadline: Instant,
}

impl GridWindow {
    fn new(title: &str, images: Vec<RgbaImage>, showtime: f64) -> Self {
        let pending = images.iter()
            .map(|im| ColorImage::from_rgba_unmultiplied(
                [im.width() as usize, im.height() as usize], im.as_raw()))
            .collect();

        Self {
            title: title.to_string(),
            pending: pending,
            textures: vec![],
            deadline: Instant::now() + Duration::from_secs_f64(showtime),
        }
    }
}

impl eframe::App for GridWindow {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if Instant::now() >= self.deadline {
            ctx.send_viewport_cmd(ViewportCommand::Close);
            return;
        }

        // Textures can only be created once the context exists
        for (i, im) in self.pending.drain(..).enumerate() {
            self.textures.push(ctx.load_texture(format!("artifact-{}", i), im,
                                                TextureOptions::LINEAR));
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading(&self.title);
            });

            let (rows, cols) = grid_shape(self.textures.len());
            let avail = ui.available_size();
            let cell = Vec2::new(
                avail.x/(cols as f32) - CELL_PAD,
                avail.y/(rows.max(1) as f32) - CELL_PAD,
            );

            egui::Grid::new("artifacts")
                .spacing([CELL_PAD, CELL_PAD])
                .show(ui, |ui| {
                    for (i, tex) in self.textures.iter().enumerate() {
                        ui.add(egui::Image::new(tex).max_size(cell));
                        if (i + 1) % cols == 0 {
                            ui.end_row();
                        }
                    }
                });
        });

        let left = self.deadline.saturating_duration_since(Instant::now());
        ctx.request_repaint_after(left.min(Duration::from_millis(100)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_shapes() {
        assert_eq!(grid_shape(1), (1, 2));
        assert_eq!(grid_shape(4), (2, 2));
        assert_eq!(grid_shape(5), (3, 2));
        assert_eq!(grid_shape(8), (4, 2));
        assert_eq!(grid_shape(9), (3, 4));
        assert_eq!(grid_shape(12), (3, 4));
        assert_eq!(grid_shape(13), (4, 4));
    }
}
