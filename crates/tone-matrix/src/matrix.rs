//! 4×5 affine color matrix.
//!
//! Rows are the R, G, B, A outputs; columns are the R, G, B, A inputs plus a
//! constant offset. Channel values live in 0–255 space, so offsets are in
//! the same units as pixel bytes.
//!
//! For composition the matrix is treated as 5×5 with an implicit last row
//! `[0, 0, 0, 0, 1]`.

/// Affine transform over RGBA channels in 0–255 space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorMatrix {
    rows: [[f32; 5]; 4],
}

impl Default for ColorMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ColorMatrix {
    /// The neutral matrix: every channel passes through unchanged.
    pub const IDENTITY: Self = Self {
        rows: [
            [1.0, 0.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 1.0, 0.0],
        ],
    };

    /// Build a matrix from four row-major rows.
    pub const fn from_rows(rows: [[f32; 5]; 4]) -> Self {
        Self { rows }
    }

    /// Diagonal scale on R, G, B with per-channel offset; alpha passes through.
    pub const fn scale_offset(scale: [f32; 3], offset: [f32; 3]) -> Self {
        Self {
            rows: [
                [scale[0], 0.0, 0.0, 0.0, offset[0]],
                [0.0, scale[1], 0.0, 0.0, offset[1]],
                [0.0, 0.0, scale[2], 0.0, offset[2]],
                [0.0, 0.0, 0.0, 1.0, 0.0],
            ],
        }
    }

    /// Row-major rows.
    pub fn rows(&self) -> &[[f32; 5]; 4] {
        &self.rows
    }

    /// Flattened row-major values (20 entries), the layout most graphics
    /// APIs accept for a color-matrix filter.
    pub fn to_array(&self) -> [f32; 20] {
        let mut out = [0.0; 20];
        for (r, row) in self.rows.iter().enumerate() {
            out[r * 5..r * 5 + 5].copy_from_slice(row);
        }
        out
    }

    /// Exact comparison against [`ColorMatrix::IDENTITY`].
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Compose: apply `self` first, then `next`.
    ///
    /// Equivalent to the matrix product `next · self`.
    #[must_use]
    pub fn then(&self, next: &ColorMatrix) -> ColorMatrix {
        let a = &next.rows;
        let b = &self.rows;
        let mut rows = [[0.0f32; 5]; 4];
        for (r, row) in rows.iter_mut().enumerate() {
            for (c, cell) in row.iter_mut().enumerate() {
                let mut sum = 0.0;
                for k in 0..4 {
                    sum += a[r][k] * b[k][c];
                }
                // implicit fifth row of `self` is [0, 0, 0, 0, 1]
                if c == 4 {
                    sum += a[r][4];
                }
                *cell = sum;
            }
        }
        ColorMatrix { rows }
    }

    /// Elementwise blend: `self · (1 − t) + target · t`.
    ///
    /// `t = 0` yields `self`, `t = 1` yields `target` exactly.
    #[must_use]
    pub fn lerp(&self, target: &ColorMatrix, t: f32) -> ColorMatrix {
        let mut rows = [[0.0f32; 5]; 4];
        for (r, row) in rows.iter_mut().enumerate() {
            for (c, cell) in row.iter_mut().enumerate() {
                *cell = self.rows[r][c] * (1.0 - t) + target.rows[r][c] * t;
            }
        }
        ColorMatrix { rows }
    }

    /// Transform one RGBA pixel, clamping and rounding back to bytes.
    #[inline]
    pub fn apply_rgba(&self, px: [u8; 4]) -> [u8; 4] {
        let input = [px[0] as f32, px[1] as f32, px[2] as f32, px[3] as f32];
        let mut out = [0u8; 4];
        for (c, row) in self.rows.iter().enumerate() {
            let v = row[0] * input[0]
                + row[1] * input[1]
                + row[2] * input[2]
                + row[3] * input[3]
                + row[4];
            out[c] = v.clamp(0.0, 255.0).round() as u8;
        }
        out
    }
}

impl std::ops::Index<(usize, usize)> for ColorMatrix {
    type Output = f32;

    fn index(&self, (row, col): (usize, usize)) -> &f32 {
        &self.rows[row][col]
    }
}
