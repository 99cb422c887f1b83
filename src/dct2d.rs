use rustdct::DctPlanner;

/*
Orthonormal two dimensional cosine transforms, matching:

dct = lambda x: scipy.fftpack.dct(x, norm='ortho')
coefficients = dct(dct(block).transpose(1, 0)).transpose(1, 0)

idct = lambda x: scipy.fftpack.idct(x, norm='ortho')
block = idct(idct(coefficients).transpose(1, 0)).transpose(1, 0)

rustdct computes the unscaled sums, so the scaling happens here.
*/

/// Direction of the transform.
#[derive(PartialEq, Debug, Copy, Clone)]
pub enum Type {
    /// Forward transform, DCT type II.
    DCT2,
    /// Inverse transform, DCT type III.
    DCT3,
}

#[derive(PartialEq, Debug, Copy, Clone)]
enum Direction {
    Row,
    Column,
}

/// Perform an orthonormal 2d discrete cosine transform in place.
/// Data is assumed to be ordered row first and will be overwritten with the result.
pub fn dct_2d(
    planner: &mut DctPlanner<f32>,
    transform: Type,
    width: usize,
    height: usize,
    data: &mut [f32],
) {
    assert_eq!(data.len(), (width * height));
    // The order of rows / columns and then columns / rows does not matter.
    // We can do the largest dimension first, to allow reuse of the scratch buffer.
    let first = if width >= height {
        Direction::Row
    } else {
        Direction::Column
    };
    let second = if first == Direction::Row {
        Direction::Column
    } else {
        Direction::Row
    };

    let mut tmp: Vec<f32> = Vec::new();
    let mut scratch: Vec<f32> = Vec::new();

    for current in [first, second] {
        let (iter_max, step, skip_mult, take) = match current {
            Direction::Row => (height, 1, width, width),
            Direction::Column => (width, width, 1, height),
        };
        let length = take;
        let dct = planner.plan_dct2(length);
        tmp.resize(length, 0.0);
        scratch.resize(dct.get_scratch_len(), 0.0);

        let scale = (2.0 / length as f32).sqrt();
        let dc_scale = std::f32::consts::FRAC_1_SQRT_2;

        for i in 0..iter_max {
            for (out, orig) in tmp
                .iter_mut()
                .zip(data.iter().skip(i * skip_mult).step_by(step).take(take))
            {
                *out = *orig;
            }

            match transform {
                Type::DCT2 => {
                    dct.process_dct2_with_scratch(&mut tmp, &mut scratch);
                    tmp[0] *= dc_scale;
                }
                Type::DCT3 => {
                    // dct3 halves the first term, undo that before scaling.
                    tmp[0] *= std::f32::consts::SQRT_2;
                    dct.process_dct3_with_scratch(&mut tmp, &mut scratch);
                }
            }

            for (data_dct, result) in data
                .iter_mut()
                .skip(i * skip_mult)
                .step_by(step)
                .take(take)
                .zip(tmp.iter())
            {
                *data_dct = scale * *result;
            }
        }
    }
}
