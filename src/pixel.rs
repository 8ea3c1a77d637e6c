#[derive(Debug, PartialEq, Eq, Clone, Copy, Default, Hash)]
pub struct Pixel {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}
impl Pixel {
    pub fn new(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    pub fn opaque(red: u8, green: u8, blue: u8) -> Self {
        Self::new(red, green, blue, u8::MAX)
    }
}

/// The narrow conversion the codec needs from whatever pixel type the host
/// application stores. Components are always 8-bit RGBA in that order.
pub trait PackedPixel: Copy + Default {
    fn pack_from_components(red: u8, green: u8, blue: u8, alpha: u8) -> Self;
    fn to_components(&self) -> [u8; 4];
}

impl PackedPixel for Pixel {
    fn pack_from_components(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self::new(red, green, blue, alpha)
    }

    fn to_components(&self) -> [u8; 4] {
        [self.red, self.green, self.blue, self.alpha]
    }
}

impl PackedPixel for [u8; 4] {
    fn pack_from_components(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        [red, green, blue, alpha]
    }

    fn to_components(&self) -> [u8; 4] {
        *self
    }
}

/// A 2D pixel store owned by the caller. The decoder only writes through
/// `set_pixel` and the encoder only reads through `get_pixel`.
pub trait PixelBuffer {
    type Pixel: PackedPixel;

    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn get_pixel(&self, x: u32, y: u32) -> Self::Pixel;
    fn set_pixel(&mut self, x: u32, y: u32, pixel: Self::Pixel);
}
