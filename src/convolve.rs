//! Strided 2D block-reduction over the trailing spatial axes.
//!
//! This is the single numerical primitive behind all three grid-variant
//! coarsening functions: a sliding `kh × kw` window is multiplied
//! element-wise with a kernel and summed, advancing by a fixed stride,
//! broadcast over every leading (batch) axis.

use ndarray::{Array2, ArrayD, ArrayViewD, Axis, Slice};

use crate::error::{GridError, GridResult};

/// Block-reduce the trailing two axes of `data` with `kernel` and
/// `stride = (sy, sx)`.
///
/// The output spatial sizes are `(H - kh)/sy + 1` and `(W - kw)/sx + 1`
/// (integer division, so a non-divisible remainder is truncated); all
/// leading axes pass through unchanged. Each output element is the sum
/// of the corresponding window times the kernel.
///
/// Fails with [`GridError::InvalidShape`] when the kernel is empty, the
/// stride has a zero component, `data` has fewer than two axes, or the
/// kernel does not fit inside the spatial extent.
pub fn convolve2d(
    data: ArrayViewD<'_, f64>,
    kernel: &Array2<f64>,
    stride: (usize, usize),
) -> GridResult<ArrayD<f64>> {
    let (kh, kw) = kernel.dim();
    let (sy, sx) = stride;

    if kh == 0 || kw == 0 {
        return Err(GridError::InvalidShape("kernel must be non-empty".into()));
    }
    if sy == 0 || sx == 0 {
        return Err(GridError::InvalidShape(
            "stride components must be non-zero".into(),
        ));
    }
    let nd = data.ndim();
    if nd < 2 {
        return Err(GridError::InvalidShape(format!(
            "data must have at least two axes, got {}",
            nd
        )));
    }

    let height = data.shape()[nd - 2];
    let width = data.shape()[nd - 1];
    if height < kh || width < kw {
        return Err(GridError::InvalidShape(format!(
            "kernel {}x{} does not fit in spatial extent {}x{}",
            kh, kw, height, width
        )));
    }

    let out_height = (height - kh) / sy + 1;
    let out_width = (width - kw) / sx + 1;

    let mut out_shape = data.shape().to_vec();
    out_shape[nd - 2] = out_height;
    out_shape[nd - 1] = out_width;
    let mut output = ArrayD::<f64>::zeros(out_shape);

    for y in 0..out_height {
        for x in 0..out_width {
            let y0 = y * sy;
            let x0 = x * sx;

            let window = data.slice_each_axis(|ad| {
                let i = ad.axis.index();
                if i == nd - 2 {
                    Slice::from(y0..y0 + kh)
                } else if i == nd - 1 {
                    Slice::from(x0..x0 + kw)
                } else {
                    Slice::from(..)
                }
            });

            // Weighted window sum over the two spatial axes; the kernel
            // broadcasts across all batch axes.
            let weighted = &window * kernel;
            let sums = weighted.sum_axis(Axis(nd - 1)).sum_axis(Axis(nd - 2));

            let mut dst = output.slice_each_axis_mut(|ad| {
                let i = ad.axis.index();
                if i == nd - 2 {
                    Slice::from(y..y + 1)
                } else if i == nd - 1 {
                    Slice::from(x..x + 1)
                } else {
                    Slice::from(..)
                }
            });
            dst.assign(&sums.insert_axis(Axis(nd - 2)).insert_axis(Axis(nd - 1)));
        }
    }

    Ok(output)
}
