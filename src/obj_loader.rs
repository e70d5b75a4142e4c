//! Minimal OBJ subset loader.
//!
//! 対応は `#` コメント、`v x y z`、`f i j k`（1 始まり、テクスチャ/法線
//! インデックスやクアッドは非対応）だけ。フェース法線はここで前計算する。
//! 退化フェース（法線が NaN/ゼロ）は warn を出して捨てる。

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::warn;
use thiserror::Error;

use crate::math::{Point3, Vec3};

#[derive(Debug, Error)]
pub enum ObjError {
    #[error("failed to read OBJ file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed OBJ data at line {line}: {message}")]
    Parse { line: usize, message: String },
}

#[derive(Clone, Debug, Default)]
pub struct ObjData {
    pub positions: Vec<Point3>,
    /// 3 個で 1 フェース。
    pub indices: Vec<u32>,
    /// フェースごとの法線。
    pub normals: Vec<Vec3>,
}

pub fn parse_obj(path: &Path) -> Result<ObjData, ObjError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut positions: Vec<Point3> = Vec::new();
    let mut raw_indices: Vec<u32> = Vec::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = line_no + 1;
        let mut tokens = line.split_whitespace();

        match tokens.next() {
            Some("v") => {
                let mut component = |name: &str| -> Result<f32, ObjError> {
                    tokens
                        .next()
                        .ok_or_else(|| ObjError::Parse {
                            line: line_no,
                            message: format!("vertex missing {name} component"),
                        })?
                        .parse::<f32>()
                        .map_err(|e| ObjError::Parse {
                            line: line_no,
                            message: format!("bad vertex {name}: {e}"),
                        })
                };
                let x = component("x")?;
                let y = component("y")?;
                let z = component("z")?;
                positions.push(Point3::new(x, y, z));
            }
            Some("f") => {
                for name in ["i0", "i1", "i2"] {
                    let idx = tokens
                        .next()
                        .ok_or_else(|| ObjError::Parse {
                            line: line_no,
                            message: format!("face missing index {name}"),
                        })?
                        .parse::<u32>()
                        .map_err(|e| ObjError::Parse {
                            line: line_no,
                            message: format!("bad face index {name}: {e}"),
                        })?;
                    if idx == 0 || idx as usize > positions.len() {
                        return Err(ObjError::Parse {
                            line: line_no,
                            message: format!("face index {idx} out of range"),
                        });
                    }
                    raw_indices.push(idx - 1); // OBJ は 1 始まり
                }
            }
            // コメントと未対応コマンドは行ごと無視
            _ => {}
        }
    }

    // フェース法線の前計算。退化フェースはここで捨てる。
    let mut indices = Vec::with_capacity(raw_indices.len());
    let mut normals = Vec::with_capacity(raw_indices.len() / 3);
    let mut dropped = 0_usize;
    for face in raw_indices.chunks_exact(3) {
        let v0 = positions[face[0] as usize];
        let v1 = positions[face[1] as usize];
        let v2 = positions[face[2] as usize];
        let normal = (v1 - v0).cross(v2 - v0).normalized();

        if !normal.is_finite() || normal == Vec3::ZERO {
            dropped += 1;
            continue;
        }
        indices.extend_from_slice(face);
        normals.push(normal);
    }
    if dropped > 0 {
        warn!(
            "dropped {} degenerate face(s) while loading {}",
            dropped,
            path.display()
        );
    }

    Ok(ObjData {
        positions,
        indices,
        normals,
    })
}
