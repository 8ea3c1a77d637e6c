use crate::{
    chunks::ihdr::{Header, Interlacing},
    interlacing::{Adam7Iter, SubImage},
};

/// The two rows a filter looks at: the one being worked on and the one above
/// it. Each row starts with its filter-type byte.
///
/// Both rows are sized once for the widest scanline of the image and only the
/// leading `length` bytes are used for the current pass.
#[derive(Debug)]
pub(crate) struct ScanlineBuffer {
    current: Vec<u8>,
    previous: Vec<u8>,
    length: usize,
}

impl ScanlineBuffer {
    /// `max_length` excludes the filter-type byte.
    pub(crate) fn new(max_length: usize) -> Self {
        Self {
            current: vec![0; max_length + 1],
            previous: vec![0; max_length + 1],
            length: 0,
        }
    }

    /// Starts a pass whose scanlines carry `length` sample bytes. The row
    /// above the first row of a pass is all zeros.
    pub(crate) fn start_pass(&mut self, length: usize) {
        self.length = length + 1;
        self.previous[..self.length].fill(0);
        self.current[..self.length].fill(0);
    }

    /// The current row and the previous one, filter byte first.
    pub(crate) fn split(&mut self) -> (&mut [u8], &[u8]) {
        (
            &mut self.current[..self.length],
            &self.previous[..self.length],
        )
    }

    /// The current row becomes the previous one.
    pub(crate) fn rotate(&mut self) {
        std::mem::swap(&mut self.current, &mut self.previous);
    }
}

/// One group of scanlines sharing a width: the whole image when it is not
/// interlaced, otherwise a single Adam7 pass.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ScanlinePass {
    pub(crate) width: u32,
    pub(crate) height: u32,
    sub_image: Option<SubImage>,
}

impl ScanlinePass {
    /// Full-image coordinates of this pass's pixel `(column, row)`.
    pub(crate) fn position(&self, column: u32, row: u32) -> (u32, u32) {
        match &self.sub_image {
            Some(sub) => (sub.image_column(column), sub.image_row(row)),
            None => (column, row),
        }
    }
}

/// Passes in stream order. Empty Adam7 passes are left out.
pub(crate) fn scanline_passes(header: &Header) -> Vec<ScanlinePass> {
    match header.interlace_method {
        Interlacing::None => vec![ScanlinePass {
            width: header.width,
            height: header.height,
            sub_image: None,
        }],
        Interlacing::Adam7 => Adam7Iter::new(header.width, header.height)
            .map(|sub| ScanlinePass {
                width: sub.width,
                height: sub.height,
                sub_image: Some(sub),
            })
            .collect(),
    }
}

/// Bytes of filtered image data the header implies, filter-type bytes
/// included.
pub(crate) fn image_data_length(header: &Header) -> usize {
    scanline_passes(header)
        .iter()
        .map(|pass| (header.scanline_length(pass.width) + 1) * pass.height as usize)
        .sum()
}
