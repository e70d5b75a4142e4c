//! Linear RGB color value type and tone curves.
//! 演算はすべて成分ごと。値域は基本 [0,1] だが、HDR の中間値は許容し
//! `max_to_one` で出力直前に詰める。

use core::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Sub, SubAssign};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ColorRgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

pub const RED: ColorRgb = ColorRgb::new(1.0, 0.0, 0.0);
pub const GREEN: ColorRgb = ColorRgb::new(0.0, 1.0, 0.0);
pub const BLUE: ColorRgb = ColorRgb::new(0.0, 0.0, 1.0);
pub const YELLOW: ColorRgb = ColorRgb::new(1.0, 1.0, 0.0);
pub const CYAN: ColorRgb = ColorRgb::new(0.0, 1.0, 1.0);
pub const MAGENTA: ColorRgb = ColorRgb::new(1.0, 0.0, 1.0);
pub const WHITE: ColorRgb = ColorRgb::new(1.0, 1.0, 1.0);
pub const BLACK: ColorRgb = ColorRgb::new(0.0, 0.0, 0.0);
pub const GRAY: ColorRgb = ColorRgb::new(0.5, 0.5, 0.5);

impl ColorRgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub const fn splat(v: f32) -> Self {
        Self::new(v, v, v)
    }

    /// Rec.709 輝度。
    pub const fn luminance(self) -> f32 {
        0.2126 * self.r + 0.7152 * self.g + 0.0722 * self.b
    }

    /// 最大成分が 1 を超えるときだけ全体をその値で割る。色相（成分比）は保存。
    pub fn max_to_one(self) -> Self {
        let max = self.r.max(self.g).max(self.b);
        if max > 1.0 { self / max } else { self }
    }

    pub fn lerp(a: Self, b: Self, t: f32) -> Self {
        crate::math::lerp(a, b, t)
    }

    pub fn is_finite(self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite()
    }
}

// Operators (component-wise)
impl Add for ColorRgb {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.r + rhs.r, self.g + rhs.g, self.b + rhs.b)
    }
}

impl Sub for ColorRgb {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.r - rhs.r, self.g - rhs.g, self.b - rhs.b)
    }
}

impl Mul for ColorRgb {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self::Output {
        Self::new(self.r * rhs.r, self.g * rhs.g, self.b * rhs.b)
    }
}

impl Div for ColorRgb {
    type Output = Self;
    fn div(self, rhs: Self) -> Self::Output {
        Self::new(self.r / rhs.r, self.g / rhs.g, self.b / rhs.b)
    }
}

impl Mul<f32> for ColorRgb {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self::Output {
        Self::new(self.r * rhs, self.g * rhs, self.b * rhs)
    }
}

impl Mul<ColorRgb> for f32 {
    type Output = ColorRgb;
    fn mul(self, rhs: ColorRgb) -> Self::Output {
        rhs * self
    }
}

impl Div<f32> for ColorRgb {
    type Output = Self;
    fn div(self, rhs: f32) -> Self::Output {
        Self::new(self.r / rhs, self.g / rhs, self.b / rhs)
    }
}

impl Add<f32> for ColorRgb {
    type Output = Self;
    fn add(self, rhs: f32) -> Self::Output {
        Self::new(self.r + rhs, self.g + rhs, self.b + rhs)
    }
}

impl Sub<ColorRgb> for f32 {
    type Output = ColorRgb;
    fn sub(self, rhs: ColorRgb) -> Self::Output {
        ColorRgb::new(self - rhs.r, self - rhs.g, self - rhs.b)
    }
}

impl AddAssign for ColorRgb {
    fn add_assign(&mut self, rhs: Self) {
        self.r += rhs.r;
        self.g += rhs.g;
        self.b += rhs.b;
    }
}

impl SubAssign for ColorRgb {
    fn sub_assign(&mut self, rhs: Self) {
        self.r -= rhs.r;
        self.g -= rhs.g;
        self.b -= rhs.b;
    }
}

impl MulAssign<f32> for ColorRgb {
    fn mul_assign(&mut self, rhs: f32) {
        self.r *= rhs;
        self.g *= rhs;
        self.b *= rhs;
    }
}

impl DivAssign<f32> for ColorRgb {
    fn div_assign(&mut self, rhs: f32) {
        self.r /= rhs;
        self.g /= rhs;
        self.b /= rhs;
    }
}

/// 出力前のトーンカーブ。既定は None（MaxToOne だけで露出を詰める）。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ToneMap {
    #[default]
    None,
    Reinhard,
    AcesApprox,
}

impl ToneMap {
    pub fn apply(self, c: ColorRgb) -> ColorRgb {
        match self {
            ToneMap::None => c,
            ToneMap::Reinhard => reinhard(c),
            ToneMap::AcesApprox => aces_approx(c),
        }
    }
}

/// Reinhard: c / (c + 1)。常に [0,1) に収まる。
fn reinhard(c: ColorRgb) -> ColorRgb {
    c / (c + 1.0)
}

/// Narkowicz の ACES 近似。0.6 の露出プリスケール込み。
fn aces_approx(c: ColorRgb) -> ColorRgb {
    const A: f32 = 2.51;
    const B: f32 = 0.03;
    const C: f32 = 2.43;
    const D: f32 = 0.59;
    const E: f32 = 0.14;

    let c = c * 0.6;
    let mapped = (c * (c * A + B)) / (c * (c * C + D) + E);
    ColorRgb::new(
        mapped.r.clamp(0.0, 1.0),
        mapped.g.clamp(0.0, 1.0),
        mapped.b.clamp(0.0, 1.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn luminance_weights() {
        assert_relative_eq!(WHITE.luminance(), 1.0, epsilon = 1e-6);
        assert_relative_eq!(ColorRgb::new(1.0, 0.0, 0.0).luminance(), 0.2126);
        assert_relative_eq!(ColorRgb::new(0.0, 1.0, 0.0).luminance(), 0.7152);
        assert_relative_eq!(ColorRgb::new(0.0, 0.0, 1.0).luminance(), 0.0722);
    }

    #[test]
    fn max_to_one_clamps_and_preserves_hue() {
        let c = ColorRgb::new(2.0, 1.0, 0.5).max_to_one();
        assert!(c.r <= 1.0 && c.g <= 1.0 && c.b <= 1.0);
        assert_relative_eq!(c.r / c.g, 2.0, epsilon = 1e-6);
        assert_relative_eq!(c.g / c.b, 2.0, epsilon = 1e-6);

        // 1 以下はそのまま
        let in_range = ColorRgb::new(0.2, 0.4, 0.9);
        assert_eq!(in_range.max_to_one(), in_range);
    }

    #[test]
    fn reinhard_stays_below_one() {
        let c = ToneMap::Reinhard.apply(ColorRgb::splat(100.0));
        assert!(c.r < 1.0 && c.g < 1.0 && c.b < 1.0);
        assert!(c.r > 0.9);
    }

    #[test]
    fn aces_is_monotone_and_clamped() {
        let lo = ToneMap::AcesApprox.apply(ColorRgb::splat(0.1));
        let hi = ToneMap::AcesApprox.apply(ColorRgb::splat(10.0));
        assert!(lo.r < hi.r);
        assert!(hi.r <= 1.0);
        assert!(lo.r >= 0.0);
    }

    #[test]
    fn component_arithmetic() {
        let a = ColorRgb::new(0.5, 0.25, 1.0);
        let b = ColorRgb::new(0.5, 0.5, 0.5);
        assert_eq!(a * b, ColorRgb::new(0.25, 0.125, 0.5));
        assert_eq!(1.0 - b, b);
        let mut acc = BLACK;
        acc += a;
        acc /= 2.0;
        assert_eq!(acc, ColorRgb::new(0.25, 0.125, 0.5));
    }
}
