use std::io;
use std::io::{ BufWriter, Write };
use std::fs::File;
use std::mem;
use std::ops::Range;
use std::path::Path;

use crate::color::Color;

/// Something rendered pixels can be written to.
///
/// Pixels are addressed by column `x` and row `y`, both zero-indexed from
/// the top-left corner of the image.
pub trait PixelSink {
    fn set_pixel(&mut self, x: usize, y: usize, color: Color);
}

/// A canvas for drawing pixels.
///
/// The canvas stores the resulting color of each primary ray. Once rendering
/// finishes, it can be saved as an image file; only PPM is supported.
#[derive(Clone, Default, Debug, PartialEq)]
pub struct Canvas {
    /// The width of the canvas, in pixels.
    pub width: usize,

    /// The height of the canvas, in pixels.
    pub height: usize,

    /// The pixels of the canvas, stored row by row.
    pixels: Vec<Color>,
}

impl Canvas {
    /// Creates a black canvas with specified width and height.
    pub fn new(width: usize, height: usize) -> Canvas {
        Canvas {
            width,
            height,
            pixels: vec![Color::black(); width * height]
        }
    }

    /// Reads a color from a location on the `Canvas`.
    ///
    /// Returns `None` if the location is out of bounds.
    ///
    /// # Examples
    ///
    /// ```
    /// # use whitted_tracer::color::Color;
    /// # use whitted_tracer::canvas::{ Canvas, PixelSink };
    /// let purple = Color::rgb(1.0, 0.0, 1.0);
    /// let mut canvas = Canvas::new(8, 8);
    /// canvas.set_pixel(4, 2, purple);
    /// assert_eq!(canvas.read_pixel(4, 2), Some(purple));
    /// assert_eq!(canvas.read_pixel(8, 2), None);
    /// ```
    pub fn read_pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None
        }

        Some(self.pixels[(y * self.width) + x])
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Splits the canvas into disjoint, mutable bands of rows.
    ///
    /// `rows` must be contiguous, in order, and together cover every row of
    /// the canvas, as produced by `parallel::partition_rows`. Each band can
    /// be written from a different thread.
    pub fn bands_mut(&mut self, rows: &[Range<usize>]) -> Vec<CanvasBand<'_>> {
        let width = self.width;
        let mut rest: &mut [Color] = &mut self.pixels;
        let mut bands = Vec::with_capacity(rows.len());

        for range in rows {
            let (band, tail) = mem::take(&mut rest).split_at_mut(range.len() * width);
            bands.push(CanvasBand { width, rows: range.clone(), pixels: band });
            rest = tail;
        }

        bands
    }

    /// Writes the canvas as a plain (P3) PPM image.
    ///
    /// Colors are clamped to `[0, 1]` and scaled to `[0, 255]`. Lines are
    /// kept within 70 columns.
    pub fn write_ppm<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "P3")?;
        writeln!(out, "{} {}", self.width, self.height)?;
        writeln!(out, "255")?; // Maximum color value

        let mut col = 0;
        for pixel in self.pixels.iter() {
            let c = pixel.clamp();

            for channel in [c.r, c.g, c.b] {
                let s = ((channel * 255.0).round() as u8).to_string();

                // Wrap before a value would cross the 70 column mark
                if col > 0 && col + 1 + s.len() > 70 {
                    writeln!(out)?;
                    col = 0;
                }

                if col > 0 {
                    write!(out, " ")?;
                    col += 1;
                }

                write!(out, "{}", s)?;
                col += s.len();
            }
        }

        // Terminate the PPM file with a newline
        writeln!(out)?;
        Ok(())
    }

    /// Saves a canvas to a PPM file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        self.write_ppm(&mut out)?;
        out.flush()
    }
}

impl PixelSink for Canvas {
    /// Out-of-bounds pixels are ignored.
    fn set_pixel(&mut self, x: usize, y: usize, color: Color) {
        if x >= self.width || y >= self.height {
            return;
        }

        self.pixels[(y * self.width) + x] = color;
    }
}

/// A contiguous range of rows borrowed from a `Canvas`.
///
/// Rows are addressed with canvas coordinates, not band-relative ones.
#[derive(Debug)]
pub struct CanvasBand<'a> {
    width: usize,
    rows: Range<usize>,
    pixels: &'a mut [Color],
}

impl<'a> CanvasBand<'a> {
    /// The canvas rows covered by this band.
    pub fn rows(&self) -> Range<usize> {
        self.rows.clone()
    }

    pub fn width(&self) -> usize {
        self.width
    }
}

impl<'a> PixelSink for CanvasBand<'a> {
    /// Pixels outside the band are ignored.
    fn set_pixel(&mut self, x: usize, y: usize, color: Color) {
        if x >= self.width || !self.rows.contains(&y) {
            return;
        }

        self.pixels[(y - self.rows.start) * self.width + x] = color;
    }
}

#[test]
fn new_canvas_is_black() {
    let c = Canvas::new(10, 20);

    assert_eq!(c.pixels().len(), 200);
    assert!(c.pixels().iter().all(|p| *p == Color::black()));
}

#[test]
fn out_of_bounds_writes_are_ignored() {
    let mut c = Canvas::new(2, 2);
    c.set_pixel(2, 0, Color::white());
    c.set_pixel(0, 2, Color::white());

    assert!(c.pixels().iter().all(|p| p.is_black()));
}

#[test]
fn bands_write_disjoint_rows() {
    let mut c = Canvas::new(3, 5);

    {
        let mut bands = c.bands_mut(&[0..2, 2..5]);
        assert_eq!(bands[1].rows(), 2..5);

        bands[0].set_pixel(1, 1, Color::white());
        bands[1].set_pixel(2, 4, Color::rgb(0.5, 0.5, 0.5));

        // Row 1 belongs to the first band.
        bands[1].set_pixel(0, 1, Color::white());
    }

    assert_eq!(c.read_pixel(1, 1), Some(Color::white()));
    assert_eq!(c.read_pixel(2, 4), Some(Color::rgb(0.5, 0.5, 0.5)));
    assert_eq!(c.read_pixel(0, 1), Some(Color::black()));
}

#[test]
fn ppm_header_and_clamped_pixels() {
    let mut c = Canvas::new(5, 3);
    c.set_pixel(0, 0, Color::rgb(1.5, 0.0, 0.0));
    c.set_pixel(2, 1, Color::rgb(0.0, 0.5, 0.0));
    c.set_pixel(4, 2, Color::rgb(-0.5, 0.0, 1.0));

    let mut out = Vec::new();
    c.write_ppm(&mut out).unwrap();
    let ppm = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = ppm.lines().collect();

    assert_eq!(lines[0], "P3");
    assert_eq!(lines[1], "5 3");
    assert_eq!(lines[2], "255");
    assert!(lines[3].starts_with("255 0 0 0 0 0"));
    assert!(ppm.contains("0 128 0"));
    assert!(ppm.ends_with("0 0 255\n"));
}

#[test]
fn ppm_lines_stay_within_70_columns() {
    let mut c = Canvas::new(10, 2);
    for y in 0..2 {
        for x in 0..10 {
            c.set_pixel(x, y, Color::rgb(1.0, 0.8, 0.6));
        }
    }

    let mut out = Vec::new();
    c.write_ppm(&mut out).unwrap();
    let ppm = String::from_utf8(out).unwrap();

    assert!(ppm.lines().all(|l| l.len() <= 70));
    assert_eq!(ppm.split_whitespace().count(), 4 + 10 * 2 * 3);
    assert_eq!(
        ppm.lines().nth(3),
        Some("255 204 153 255 204 153 255 204 153 255 204 153 255 204 153 255 204")
    );
}
