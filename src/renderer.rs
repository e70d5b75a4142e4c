//! Frame renderer: parallel per-pixel loop over an owned u32 pixel buffer.
//!
//! The scene is borrowed immutably for the duration of a frame. Rows fan out
//! over rayon, and each pixel runs on its own RNG seeded from the pixel
//! coordinates, so output does not depend on thread count or scheduling.

use rayon::prelude::*;

use std::path::Path;

use crate::color::{ColorRgb, ToneMap};
use crate::integrator::{self, IlluminationSettings, LightMode};
use crate::math::{Mat4, Ray, Vec3};
use crate::output::{BmpBackend, ImageBackend, PngBackend};
use crate::rng::{self, Rng};
use crate::sampler::{self, SampleMode};
use crate::scene::Scene;

/// Upper bound for the sample-count toggle; anything beyond this is
/// pointless at interactive rates.
const MAX_SAMPLE_COUNT: u32 = 4096;

/// Channel positions (shift amounts) within the 32bit word. XRGB8888 by default.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelFormat {
    pub r_shift: u32,
    pub g_shift: u32,
    pub b_shift: u32,
}

impl Default for PixelFormat {
    fn default() -> Self {
        Self::XRGB8888
    }
}

impl PixelFormat {
    pub const XRGB8888: Self = Self {
        r_shift: 16,
        g_shift: 8,
        b_shift: 0,
    };

    /// Truncate linear [0,1] values to 8 bits and pack (no gamma correction).
    pub fn pack(&self, c: ColorRgb) -> u32 {
        let r = (c.r * 255.0) as u32;
        let g = (c.g * 255.0) as u32;
        let b = (c.b * 255.0) as u32;
        (r << self.r_shift) | (g << self.g_shift) | (b << self.b_shift)
    }

    pub fn unpack(&self, word: u32) -> [u8; 3] {
        [
            (word >> self.r_shift) as u8,
            (word >> self.g_shift) as u8,
            (word >> self.b_shift) as u8,
        ]
    }
}

pub struct Renderer {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
    format: PixelFormat,

    light_mode: LightMode,
    shadows_enabled: bool,
    sample_mode: SampleMode,
    sample_count: u32,
    light_samples: u32,
    tone_map: ToneMap,
}

impl Renderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_format(width, height, PixelFormat::default())
    }

    pub fn with_format(width: u32, height: u32, format: PixelFormat) -> Self {
        assert!(width > 0 && height > 0, "renderer needs a non-empty surface");
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize],
            format,
            light_mode: LightMode::Combined,
            shadows_enabled: true,
            sample_mode: SampleMode::UniformSquare,
            sample_count: 1,
            light_samples: 10,
            tone_map: ToneMap::None,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The packed framebuffer, for the presentation side to read.
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    // --- Interactive toggles (picked up at the start of the next frame) ---

    pub fn toggle_shadows(&mut self) {
        self.shadows_enabled = !self.shadows_enabled;
    }

    pub fn shadows_enabled(&self) -> bool {
        self.shadows_enabled
    }

    pub fn cycle_light_mode(&mut self) {
        self.light_mode = self.light_mode.cycled();
    }

    pub fn light_mode(&self) -> LightMode {
        self.light_mode
    }

    pub fn set_light_mode(&mut self, mode: LightMode) {
        self.light_mode = mode;
    }

    pub fn cycle_sample_mode(&mut self) {
        self.sample_mode = self.sample_mode.cycled();
    }

    pub fn sample_mode(&self) -> SampleMode {
        self.sample_mode
    }

    pub fn set_sample_mode(&mut self, mode: SampleMode) {
        self.sample_mode = mode;
    }

    pub fn increase_samples(&mut self) {
        self.sample_count = (self.sample_count * 2).min(MAX_SAMPLE_COUNT);
    }

    pub fn decrease_samples(&mut self) {
        self.sample_count = (self.sample_count / 2).max(1);
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    pub fn set_sample_count(&mut self, count: u32) {
        self.sample_count = count.clamp(1, MAX_SAMPLE_COUNT);
    }

    pub fn set_light_samples(&mut self, k: u32) {
        self.light_samples = k.max(1);
    }

    pub fn set_tone_map(&mut self, tone_map: ToneMap) {
        self.tone_map = tone_map;
    }

    // --- Frame rendering --------------------------------------------------

    pub fn render(&mut self, scene: &Scene) {
        let width = self.width;
        let height = self.height;
        let aspect = width as f32 / height as f32;

        let camera = scene.camera();
        let fov = camera.fov_scale();
        let cam_to_world = camera.camera_to_world();

        let illumination = IlluminationSettings {
            light_mode: self.light_mode,
            shadows_enabled: self.shadows_enabled,
            light_samples: self.light_samples,
        };
        let sample_mode = self.sample_mode;
        let sample_count = self.sample_count.max(1);
        let tone_map = self.tone_map;
        let format = self.format;

        self.pixels
            .par_chunks_exact_mut(width as usize)
            .enumerate()
            .for_each(|(py, row)| {
                for (px, out) in row.iter_mut().enumerate() {
                    let seed = rng::splitmix64(((py as u64) << 32) | px as u64);
                    let mut rng = Rng::from_seed(seed);

                    let mut acc = ColorRgb::splat(0.0);
                    for sample in 0..sample_count {
                        let offset =
                            sampler::subpixel_offset(sample_mode, sample_count, sample, &mut rng);
                        let ray = generate_primary_ray(
                            px as u32,
                            py as u32,
                            offset,
                            width,
                            height,
                            aspect,
                            fov,
                            &cam_to_world,
                        );

                        if let Some(hit) = scene.closest_hit(&ray) {
                            for light in scene.lights() {
                                acc += integrator::calculate_illumination(
                                    scene,
                                    light,
                                    &hit,
                                    ray.direction,
                                    &mut rng,
                                    &illumination,
                                );
                            }
                        }
                    }

                    // box filter, then tone curve, exposure clamp, pack
                    acc /= sample_count as f32;
                    let mapped = tone_map.apply(acc).max_to_one();
                    *out = format.pack(mapped);
                }
            });
    }

    /// Write the current buffer to a bitmap (PNG only for a .png extension).
    pub fn save_buffer(&self, path: &Path) -> std::io::Result<()> {
        let mut rgb = Vec::with_capacity(self.pixels.len() * 3);
        for word in &self.pixels {
            rgb.extend_from_slice(&self.format.unpack(*word));
        }

        let is_png = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
        if is_png {
            PngBackend.write(path, self.width, self.height, &rgb)
        } else {
            BmpBackend.write(path, self.width, self.height, &rgb)
        }
    }
}

/// Primary ray of the pinhole camera. `offset` is the subpixel delta from
/// the pixel center.
#[allow(clippy::too_many_arguments)]
pub fn generate_primary_ray(
    px: u32,
    py: u32,
    offset: (f32, f32),
    width: u32,
    height: u32,
    aspect: f32,
    fov: f32,
    cam_to_world: &Mat4,
) -> Ray {
    let x = (2.0 * (px as f32 + 0.5 + offset.0) / width as f32 - 1.0) * aspect * fov;
    let y = (1.0 - 2.0 * (py as f32 + 0.5 + offset.1) / height as f32) * fov;

    let dir_view = Vec3::new(x, y, 1.0);
    let dir_world = cam_to_world.transform_vector(dir_view).normalized();

    Ray::new(cam_to_world.translation(), dir_world)
}
