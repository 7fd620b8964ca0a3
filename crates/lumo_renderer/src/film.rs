//! Film: the pixel buffer and its image file.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use image::codecs::png::PngEncoder;
use image::codecs::pnm::{PnmEncoder, PnmSubtype, SampleEncoding};
use image::{ColorType, ImageEncoder};
use lumo_core::{ParamSet, SceneError};
use lumo_math::{clamp_color, Color};

use crate::error::Result;

/// Output formats supported by [`Film::write_image`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageType {
    Png,
    /// Plain-text PPM (P3)
    Ppm3,
    /// Binary PPM (P6)
    Ppm6,
}

impl ImageType {
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "png" => Ok(ImageType::Png),
            "ppm3" => Ok(ImageType::Ppm3),
            "ppm6" => Ok(ImageType::Ppm6),
            other => Err(SceneError::unknown_type("image", other).into()),
        }
    }
}

/// Command-line overrides applied to the film.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Replaces the scene's `filename`.
    pub outfile: Option<PathBuf>,
    /// Render at a quarter of the resolution on each axis.
    pub quick_render: bool,
}

pub struct Film {
    width: u32,
    height: u32,
    filename: PathBuf,
    image_type: ImageType,
    gamma_corrected: bool,
    pixels: Vec<Color>,
}

impl Film {
    pub fn new(width: u32, height: u32, filename: impl Into<PathBuf>, image_type: ImageType) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            filename: filename.into(),
            image_type,
            gamma_corrected: false,
            pixels: vec![Color::ZERO; (width * height) as usize],
        }
    }

    /// Build from a `film` directive.
    ///
    /// Reads `x_res` (1280), `y_res` (720), `filename` (`image.png`),
    /// `img_type` (`png`) and `gamma_corrected` (false).
    pub fn from_params(ps: &ParamSet, run: &RunOptions) -> Result<Self> {
        let mut width = ps.get_one_int("x_res", 1280).max(1) as u32;
        let mut height = ps.get_one_int("y_res", 720).max(1) as u32;
        if run.quick_render {
            width = (width / 4).max(1);
            height = (height / 4).max(1);
        }

        let filename = match &run.outfile {
            Some(outfile) => {
                if ps.contains("filename") {
                    log::warn!(
                        "Output file {} from the command line overrides the scene's \"{}\"",
                        outfile.display(),
                        ps.get_one_string("filename", "")
                    );
                }
                outfile.clone()
            }
            None => PathBuf::from(ps.get_one_string("filename", "image.png")),
        };

        let image_type = ImageType::from_name(&ps.get_one_string("img_type", "png"))?;
        let mut film = Film::new(width, height, filename, image_type);
        film.gamma_corrected = ps.get_one_bool("gamma_corrected", false);

        log::debug!(
            "Film {}x{} -> {} ({:?})",
            film.width,
            film.height,
            film.filename.display(),
            film.image_type
        );
        Ok(film)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn filename(&self) -> &Path {
        &self.filename
    }

    /// Store the color of pixel (`row`, `col`). Out-of-range pixels are ignored.
    pub fn add_sample(&mut self, row: u32, col: u32, color: Color) {
        if row < self.height && col < self.width {
            self.pixels[(row * self.width + col) as usize] = color;
        }
    }

    pub fn pixel(&self, row: u32, col: u32) -> Color {
        self.pixels[(row * self.width + col) as usize]
    }

    /// 8-bit RGB bytes, row-major from the top-left pixel.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);
        for color in &self.pixels {
            let mut c = clamp_color(*color);
            if self.gamma_corrected {
                c = Color::new(linear_to_gamma(c.x), linear_to_gamma(c.y), linear_to_gamma(c.z));
            }
            let rgb = (c * 255.0).round();
            bytes.extend_from_slice(&[rgb.x as u8, rgb.y as u8, rgb.z as u8]);
        }
        bytes
    }

    /// Encode the buffer to `filename`.
    pub fn write_image(&self) -> Result<()> {
        let bytes = self.to_rgb8();
        let writer = BufWriter::new(File::create(&self.filename)?);

        match self.image_type {
            ImageType::Png => PngEncoder::new(writer).write_image(
                &bytes,
                self.width,
                self.height,
                ColorType::Rgb8,
            )?,
            ImageType::Ppm3 | ImageType::Ppm6 => {
                let encoding = if self.image_type == ImageType::Ppm3 {
                    SampleEncoding::Ascii
                } else {
                    SampleEncoding::Binary
                };
                PnmEncoder::new(writer)
                    .with_subtype(PnmSubtype::Pixmap(encoding))
                    .write_image(&bytes, self.width, self.height, ColorType::Rgb8)?
            }
        }

        log::info!("Wrote {}", self.filename.display());
        Ok(())
    }
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}
