//! 画像出力バックエンドの抽象化と実装。
//! ピクセルは RGB の連続バイト列（行は上から下へ、左→右）を想定。

use image::{ImageBuffer, Rgb};
use std::fs;
use std::path::Path;

pub trait ImageBackend {
    /// 画像を書き出す。
    fn write(&self, path: &Path, width: u32, height: u32, pixels: &[u8]) -> std::io::Result<()>;

    /// ファイル拡張子（例: "bmp", "png"）。ドットなしの小文字。
    fn file_extension(&self) -> &'static str;
}

fn encode_rgb(path: &Path, width: u32, height: u32, pixels: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let expected = (width as usize) * (height as usize) * 3;
    assert!(
        pixels.len() == expected,
        "pixel buffer size mismatch: {} != {}",
        pixels.len(),
        expected
    );

    let img: ImageBuffer<Rgb<u8>, _> = ImageBuffer::from_raw(width, height, pixels.to_vec())
        .expect("invalid buffer size for ImageBuffer");
    img.save(path).map_err(std::io::Error::other)
}

/// BMP バックエンド（スクリーンショット既定）。`image` クレートでエンコード。
#[derive(Default, Clone, Copy, Debug)]
pub struct BmpBackend;

impl ImageBackend for BmpBackend {
    fn write(&self, path: &Path, width: u32, height: u32, pixels: &[u8]) -> std::io::Result<()> {
        encode_rgb(path, width, height, pixels)
    }

    fn file_extension(&self) -> &'static str {
        "bmp"
    }
}

/// PNG バックエンド。
#[derive(Default, Clone, Copy, Debug)]
pub struct PngBackend;

impl ImageBackend for PngBackend {
    fn write(&self, path: &Path, width: u32, height: u32, pixels: &[u8]) -> std::io::Result<()> {
        encode_rgb(path, width, height, pixels)
    }

    fn file_extension(&self) -> &'static str {
        "png"
    }
}
