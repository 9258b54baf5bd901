use std::io::{ self, Write };
use std::fs::File;
use std::path::Path;

use log::debug;

use crate::error::SceneError;

/// Image encodings a `Canvas` can be saved as.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ImageFormat {
    /// Plain-text PPM (`P3`).
    Ppm,
    Png,
}

impl ImageFormat {
    /// Picks the encoding from a path's extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<ImageFormat, SceneError> {
        let ext = path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "ppm" => Ok(ImageFormat::Ppm),
            "png" => Ok(ImageFormat::Png),
            _ => Err(SceneError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// A canvas of rendered pixels.
///
/// Pixels are packed `0xRRGGBB` values (see `Color::to_rgb`), stored
/// row-major. Row `y = 0` is the *bottom* row of the scene, matching the
/// camera's pixel numbering; encoders flip rows so that the top of the scene
/// is written first.
#[derive(Clone, Default, Debug, PartialEq)]
pub struct Canvas {
    /// The width of the canvas, in pixels.
    pub width: usize,

    /// The height of the canvas, in pixels.
    pub height: usize,

    /// The pixels of the canvas, stored as a flattened vector.
    pixels: Vec<u32>,
}

impl Canvas {
    /// Creates a black canvas with specified width and height.
    pub fn new(width: usize, height: usize) -> Canvas {
        Canvas {
            width,
            height,
            pixels: vec![0; width * height]
        }
    }

    /// Writes a packed color to a location on the `Canvas`.
    ///
    /// Out-of-bounds pixels are ignored. `x` is the column and `y` the row,
    /// both zero-indexed.
    ///
    /// # Examples
    ///
    /// ```
    /// # use scene_tracer::canvas::Canvas;
    /// let mut canvas = Canvas::new(8, 8);
    /// canvas.write_pixel(4, 2, 0xff00ff);
    /// assert_eq!(canvas.read_pixel(4, 2), Some(0xff00ff));
    /// ```
    pub fn write_pixel(&mut self, x: usize, y: usize, rgb: u32) {
        // Silently ignore out-of-bounds pixels
        if x >= self.width || y >= self.height {
            return;
        }

        self.pixels[(y * self.width) + x] = rgb;
    }

    /// Reads a packed color from a location on the `Canvas`.
    ///
    /// If the specified pixel location is out-of-bounds, `None` is returned.
    pub fn read_pixel(&self, x: usize, y: usize) -> Option<u32> {
        // Return nothing if pixel is out-of-bounds
        if x >= self.width || y >= self.height {
            return None
        }

        Some(self.pixels[(y * self.width) + x])
    }

    /// Copies a whole row into the canvas. Extra values are ignored.
    pub fn write_row(&mut self, y: usize, row: &[u32]) {
        if y >= self.height {
            return;
        }

        let n = row.len().min(self.width);
        let start = y * self.width;
        self.pixels[start..start + n].copy_from_slice(&row[..n]);
    }

    /// All pixels, row-major, bottom row first.
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Rows from the top of the scene down.
    fn rows_top_down(&self) -> impl Iterator<Item = &[u32]> {
        // `chunks` panics on a zero chunk size.
        self.pixels.chunks(self.width.max(1)).rev()
    }

    /// Saves the canvas, choosing the encoding from the file extension.
    pub fn save(&self, path: &Path) -> Result<(), SceneError> {
        let format = ImageFormat::from_path(path)?;
        debug!("Encoding {}x{} image as {:?}", self.width, self.height, format);

        match format {
            ImageFormat::Ppm => {
                let out = io::BufWriter::new(File::create(path)?);
                self.write_ppm(out)?;
            },
            ImageFormat::Png => self.save_png(path)?,
        }

        Ok(())
    }

    /// Writes the canvas as a plain PPM image.
    ///
    /// Lines in the PPM output are clamped to 70 columns. If some value would
    /// exceed the 70 column mark on a line, it is moved to the next line.
    pub fn write_ppm<W: Write>(&self, mut out: W) -> io::Result<()> {
        // Write PPM header, as well as metadata
        writeln!(out, "P3")?;
        writeln!(out, "{} {}", self.width, self.height)?;
        writeln!(out, "255")?; // Maximum color value

        for row in self.rows_top_down() {
            let mut col = 0;
            for &pixel in row {
                for &channel in [pixel >> 16, pixel >> 8, pixel].iter() {
                    let value = (channel & 0xff).to_string();

                    if col == 0 {
                        write!(out, "{}", value)?;
                        col = value.len();
                    } else if col + 1 + value.len() > 70 {
                        write!(out, "\n{}", value)?;
                        col = value.len();
                    } else {
                        write!(out, " {}", value)?;
                        col += 1 + value.len();
                    }
                }
            }

            // Each image row starts on a fresh line
            writeln!(out)?;
        }

        out.flush()
    }

    fn save_png(&self, path: &Path) -> Result<(), SceneError> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);
        for row in self.rows_top_down() {
            for &pixel in row {
                bytes.push((pixel >> 16) as u8);
                bytes.push((pixel >> 8) as u8);
                bytes.push(pixel as u8);
            }
        }

        let img = image::RgbImage::from_raw(
            self.width as u32,
            self.height as u32,
            bytes
        ).ok_or_else(|| SceneError::invalid("pixel buffer does not match image size"))?;

        img.save(path)?;
        Ok(())
    }
}

#[test]
fn write_and_read_pixels() {
    let mut c = Canvas::new(3, 2);
    c.write_pixel(2, 1, 0x123456);
    c.write_pixel(7, 7, 0xffffff);

    assert_eq!(c.read_pixel(2, 1), Some(0x123456));
    assert_eq!(c.read_pixel(0, 0), Some(0));
    assert_eq!(c.read_pixel(3, 0), None);
    assert_eq!(c.pixels().len(), 6);
}

#[test]
fn write_whole_row() {
    let mut c = Canvas::new(3, 2);
    c.write_row(1, &[1, 2, 3, 4]);

    assert_eq!(c.pixels(), &[0, 0, 0, 1, 2, 3]);
}

#[test]
fn ppm_flips_rows() {
    let mut c = Canvas::new(2, 2);
    c.write_pixel(0, 0, 0xff0000); // bottom left
    c.write_pixel(1, 1, 0x0000ff); // top right

    let mut out = Vec::new();
    c.write_ppm(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    assert_eq!(text, "P3\n2 2\n255\n0 0 0 0 0 255\n255 0 0 0 0 0\n");
}

#[test]
fn ppm_lines_stay_within_70_columns() {
    let mut c = Canvas::new(10, 2);
    for y in 0..2 {
        for x in 0..10 {
            c.write_pixel(x, y, 0xccccb3);
        }
    }

    let mut out = Vec::new();
    c.write_ppm(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    assert!(text.lines().all(|l| l.len() <= 70));
    assert_eq!(
        text.lines().skip(3).collect::<Vec<_>>(),
        vec![
            "204 204 179 204 204 179 204 204 179 204 204 179 204 204 179 204 204",
            "179 204 204 179 204 204 179 204 204 179 204 204 179",
            "204 204 179 204 204 179 204 204 179 204 204 179 204 204 179 204 204",
            "179 204 204 179 204 204 179 204 204 179 204 204 179",
        ]
    );
    assert!(text.ends_with('\n'));
}

#[test]
fn format_from_extension() {
    assert_eq!(ImageFormat::from_path(Path::new("a/b.PNG")).unwrap(),
        ImageFormat::Png);
    assert_eq!(ImageFormat::from_path(Path::new("out.ppm")).unwrap(),
        ImageFormat::Ppm);
    assert!(ImageFormat::from_path(Path::new("out.bmp")).is_err());
    assert!(ImageFormat::from_path(Path::new("out")).is_err());
}

#[test]
fn png_round_trips_through_encoder() {
    let mut c = Canvas::new(2, 3);
    c.write_pixel(0, 0, 0x102030); // bottom left
    c.write_pixel(1, 2, 0xa0b0c0); // top right

    let path = std::env::temp_dir()
        .join(format!("scene-tracer-canvas-{}.png", std::process::id()));
    c.save(&path).unwrap();

    let img = image::open(&path).unwrap().to_rgb8();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(img.dimensions(), (2, 3));
    assert_eq!(img.get_pixel(0, 2).0, [0x10, 0x20, 0x30]);
    assert_eq!(img.get_pixel(1, 0).0, [0xa0, 0xb0, 0xc0]);
}
