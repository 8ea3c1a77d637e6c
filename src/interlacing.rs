//! Adam7 pass geometry.

/// Where one Adam7 pass samples the full image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassDescriptor {
    pub first_column: u32,
    pub column_increment: u32,
    pub first_row: u32,
    pub row_increment: u32,
}

impl PassDescriptor {
    const fn new(first_column: u32, column_increment: u32, first_row: u32, row_increment: u32) -> Self {
        Self {
            first_column,
            column_increment,
            first_row,
            row_increment,
        }
    }

    /// `ceil((width - first_column) / column_increment)`, zero when the image is
    /// narrower than the pass's first column.
    pub const fn columns(&self, width: u32) -> u32 {
        width
            .saturating_sub(self.first_column)
            .div_ceil(self.column_increment)
    }

    pub const fn rows(&self, height: u32) -> u32 {
        height
            .saturating_sub(self.first_row)
            .div_ceil(self.row_increment)
    }
}

pub const ADAM7_PASSES: [PassDescriptor; 7] = [
    PassDescriptor::new(0, 8, 0, 8),
    PassDescriptor::new(4, 8, 0, 8),
    PassDescriptor::new(0, 4, 4, 8),
    PassDescriptor::new(2, 4, 0, 4),
    PassDescriptor::new(0, 2, 2, 4),
    PassDescriptor::new(1, 2, 0, 2),
    PassDescriptor::new(0, 1, 1, 2),
];

/// Columns in Adam7 pass `pass` (0 to 6) of an image `width` pixels wide.
pub const fn compute_columns(pass: usize, width: u32) -> u32 {
    ADAM7_PASSES[pass].columns(width)
}

pub const fn compute_rows(pass: usize, height: u32) -> u32 {
    ADAM7_PASSES[pass].rows(height)
}

/// Walks the non-empty Adam7 passes of a `width * height` image in order.
#[derive(Debug, Clone)]
pub struct Adam7Iter {
    next_pass: usize,
    width: u32,
    height: u32,
}

impl Adam7Iter {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            next_pass: 0,
            width,
            height,
        }
    }
}

impl Iterator for Adam7Iter {
    type Item = SubImage;

    fn next(&mut self) -> Option<Self::Item> {
        while self.next_pass < ADAM7_PASSES.len() {
            let pass = self.next_pass;
            self.next_pass += 1;
            let width = compute_columns(pass, self.width);
            let height = compute_rows(pass, self.height);
            // An empty pass contributes no scanlines at all.
            if width == 0 || height == 0 {
                continue;
            }
            return Some(SubImage {
                pass,
                descriptor: ADAM7_PASSES[pass],
                width,
                height,
            });
        }
        None
    }
}

/// One Adam7 pass viewed as a small image of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubImage {
    pub pass: usize,
    pub descriptor: PassDescriptor,
    pub width: u32,
    pub height: u32,
}

impl SubImage {
    /// Full-image row of this pass's row `row`.
    pub fn image_row(&self, row: u32) -> u32 {
        self.descriptor.first_row + row * self.descriptor.row_increment
    }

    /// Full-image column of this pass's column `column`.
    pub fn image_column(&self, column: u32) -> u32 {
        self.descriptor.first_column + column * self.descriptor.column_increment
    }
}
