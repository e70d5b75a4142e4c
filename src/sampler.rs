//! ピクセル内スーパーサンプリング用のサブピクセルオフセット。
//!
//! オフセットはピクセル中心からの差分で、範囲は (-0.5, 0.5)。
//! ボックスフィルタ（サンプル平均）がレンダラ側で掛かる。

use crate::rng::Rng;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SampleMode {
    RandomSquare,
    #[default]
    UniformSquare,
}

impl SampleMode {
    /// トグル用: RandomSquare → UniformSquare → RandomSquare → …
    pub fn cycled(self) -> Self {
        match self {
            SampleMode::RandomSquare => SampleMode::UniformSquare,
            SampleMode::UniformSquare => SampleMode::RandomSquare,
        }
    }
}

/// sample 番目（0 始まり）のサブピクセルオフセットを返す。
pub fn subpixel_offset(
    mode: SampleMode,
    sample_count: u32,
    sample: u32,
    rng: &mut Rng,
) -> (f32, f32) {
    match mode {
        SampleMode::RandomSquare => (rng.next_f32() - 0.5, rng.next_f32() - 0.5),
        SampleMode::UniformSquare => uniform_square(sample_count, sample),
    }
}

fn uniform_square(sample_count: u32, sample: u32) -> (f32, f32) {
    if sample_count == 1 {
        return (0.0, 0.0);
    }
    // 2 サンプルだけのときは中心線上に横並び
    if sample_count == 2 {
        return ((sample as f32 + 0.5) / 2.0 - 0.5, 0.0);
    }

    // ceil(sqrt(n)) の格子に敷き詰め、セル中心を使う
    let mut grid = (sample_count as f32).sqrt() as u32;
    if grid * grid < sample_count {
        grid += 1;
    }
    let cell = 1.0 / grid as f32;

    let sx = sample % grid;
    let sy = sample / grid;
    (
        (sx as f32 + 0.5) * cell - 0.5,
        (sy as f32 + 0.5) * cell - 0.5,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn single_sample_is_pixel_center() {
        let mut rng = Rng::from_seed(0);
        assert_eq!(
            subpixel_offset(SampleMode::UniformSquare, 1, 0, &mut rng),
            (0.0, 0.0)
        );
    }

    #[test]
    fn two_samples_sit_on_horizontal_center_line() {
        let mut rng = Rng::from_seed(0);
        let (x0, y0) = subpixel_offset(SampleMode::UniformSquare, 2, 0, &mut rng);
        let (x1, y1) = subpixel_offset(SampleMode::UniformSquare, 2, 1, &mut rng);
        assert_relative_eq!(x0, -0.25);
        assert_relative_eq!(x1, 0.25);
        assert_eq!(y0, 0.0);
        assert_eq!(y1, 0.0);
    }

    #[test]
    fn four_samples_form_a_centered_grid() {
        let mut rng = Rng::from_seed(0);
        let expected = [(-0.25, -0.25), (0.25, -0.25), (-0.25, 0.25), (0.25, 0.25)];
        for (s, (ex, ey)) in expected.into_iter().enumerate() {
            let (x, y) = subpixel_offset(SampleMode::UniformSquare, 4, s as u32, &mut rng);
            assert_relative_eq!(x, ex);
            assert_relative_eq!(y, ey);
        }
    }

    #[test]
    fn uniform_grid_is_centered_on_average() {
        // グリッドの平均はピクセル中心（サンプル数を倍にしても期待値は不変）
        for n in [4_u32, 9, 16] {
            let mut rng = Rng::from_seed(0);
            let mut sum = (0.0, 0.0);
            for s in 0..n {
                let (x, y) = subpixel_offset(SampleMode::UniformSquare, n, s, &mut rng);
                sum.0 += x;
                sum.1 += y;
            }
            assert_relative_eq!(sum.0 / n as f32, 0.0, epsilon = 1e-6);
            assert_relative_eq!(sum.1 / n as f32, 0.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn offsets_stay_in_half_open_box() {
        let mut rng = Rng::from_seed(3);
        for s in 0..64 {
            let (x, y) = subpixel_offset(SampleMode::UniformSquare, 64, s, &mut rng);
            assert!((-0.5..0.5).contains(&x));
            assert!((-0.5..0.5).contains(&y));
            let (rx, ry) = subpixel_offset(SampleMode::RandomSquare, 64, s, &mut rng);
            assert!((-0.5..0.5).contains(&rx));
            assert!((-0.5..0.5).contains(&ry));
        }
    }

    #[test]
    fn cycle_alternates_modes() {
        assert_eq!(
            SampleMode::UniformSquare.cycled(),
            SampleMode::RandomSquare
        );
        assert_eq!(
            SampleMode::RandomSquare.cycled(),
            SampleMode::UniformSquare
        );
    }
}
