use crate::pixel::{PackedPixel, Pixel, PixelBuffer};

/// A keyword/value pair carried in a text chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageProperty {
    pub name: String,
    pub value: String,
}

impl ImageProperty {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Everything a PNG carries besides pixels that this codec reads or writes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageMetadata {
    /// Pixels per inch; `0.0` when unknown.
    pub horizontal_resolution: f64,
    /// Pixels per inch; `0.0` when unknown.
    pub vertical_resolution: f64,
    pub gamma: Option<f32>,
    pub properties: Vec<ImageProperty>,
}

/// A row-major `width * height` image.
#[derive(Debug, Clone, PartialEq)]
pub struct Image<P = Pixel> {
    width: u32,
    height: u32,
    pixels: Vec<P>,
    pub metadata: ImageMetadata,
}

impl<P: PackedPixel> Image<P> {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![P::default(); width as usize * height as usize],
            metadata: ImageMetadata::default(),
        }
    }

    /// `None` unless `pixels` holds exactly `width * height` entries.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<P>) -> Option<Self> {
        (pixels.len() == width as usize * height as usize).then_some(Self {
            width,
            height,
            pixels,
            metadata: ImageMetadata::default(),
        })
    }

    pub fn pixels(&self) -> &[P] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<P> {
        self.pixels
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

impl<P: PackedPixel> PixelBuffer for Image<P> {
    type Pixel = P;

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn get_pixel(&self, x: u32, y: u32) -> P {
        self.pixels[self.index(x, y)]
    }

    fn set_pixel(&mut self, x: u32, y: u32, pixel: P) {
        let index = self.index(x, y);
        self.pixels[index] = pixel;
    }
}
