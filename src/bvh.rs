//! メッシュ三角形の BVH（中央分割）。
//!
//! 構築はノード AABB の最長軸をその中点で分割し、面の並べ替えは
//! `face_index` の置換だけで行う。元の index/法線配列は不変のままなので、
//! トランスフォーム更新と構築が分離できる。
//! `nodes[0]` がルート。内部ノードの右の子は常に `left_first + 1`。

use crate::hit::{Aabb, HitRecord};
use crate::math::{Point3, Ray};

/// 葉に残す最大フェース数。これ以下のノードは分割しない。
const LEAF_THRESHOLD: u32 = 2;

#[derive(Clone, Copy, Debug, Default)]
pub struct BvhNode {
    pub aabb_min: Point3,
    pub aabb_max: Point3,
    /// 内部ノード: 左の子のノード番号。葉: フェース範囲の先頭。
    pub left_first: u32,
    /// 0 なら内部ノード、それ以外はこの葉が覆う連続フェース数。
    pub triangle_count: u32,
}

impl BvhNode {
    pub const fn is_leaf(&self) -> bool {
        self.triangle_count > 0
    }

    fn aabb(&self) -> Aabb {
        Aabb::new(self.aabb_min, self.aabb_max)
    }
}

#[derive(Clone, Debug, Default)]
pub struct Bvh {
    pub nodes: Vec<BvhNode>,
    /// ノードのフェース範囲 → 実フェース番号の置換。
    pub face_index: Vec<u32>,
}

impl Bvh {
    /// 頂点とフェースインデックス（3 個で 1 面）から構築。
    /// フェースが無いメッシュはノードを持たない（トラバースは常にミス）。
    pub fn build(positions: &[Point3], indices: &[u32]) -> Self {
        let face_count = (indices.len() / 3) as u32;
        if face_count == 0 {
            return Self::default();
        }

        let mut face_index: Vec<u32> = (0..face_count).collect();
        let mut nodes = vec![BvhNode {
            left_first: 0,
            triangle_count: face_count,
            ..BvhNode::default()
        }];

        update_node_bounds(&mut nodes, 0, &face_index, positions, indices);
        subdivide(&mut nodes, 0, &mut face_index, positions, indices);

        Self { nodes, face_index }
    }

    /// 最近接探索。`test` はフェース番号と現時点の最近接 t を受け取り、
    /// より近いヒットがあれば HitRecord を返す。両方の子を必ず訪問する。
    pub fn closest_hit<F>(&self, ray: &Ray, mut test: F) -> Option<HitRecord>
    where
        F: FnMut(u32, f32) -> Option<HitRecord>,
    {
        let mut best: Option<HitRecord> = None;
        if !self.nodes.is_empty() {
            self.closest_rec(0, ray, &mut best, &mut test);
        }
        best
    }

    fn closest_rec<F>(&self, node_idx: usize, ray: &Ray, best: &mut Option<HitRecord>, test: &mut F)
    where
        F: FnMut(u32, f32) -> Option<HitRecord>,
    {
        let node = &self.nodes[node_idx];
        let closest = best.as_ref().map_or(ray.t_max, |b| b.t);
        if !node.aabb().slab_test(ray, closest) {
            return;
        }

        if node.is_leaf() {
            for i in 0..node.triangle_count {
                let face = self.face_index[(node.left_first + i) as usize];
                let closest = best.as_ref().map_or(ray.t_max, |b| b.t);
                if let Some(rec) = test(face, closest) {
                    if best.as_ref().is_none_or(|b| rec.t < b.t) {
                        *best = Some(rec);
                    }
                }
            }
        } else {
            self.closest_rec(node.left_first as usize, ray, best, test);
            self.closest_rec(node.left_first as usize + 1, ray, best, test);
        }
    }

    /// any-hit 探索。カリングを通った最初のフェースで即座に打ち切る。
    pub fn any_hit<F>(&self, ray: &Ray, mut test: F) -> bool
    where
        F: FnMut(u32) -> bool,
    {
        !self.nodes.is_empty() && self.any_rec(0, ray, &mut test)
    }

    fn any_rec<F>(&self, node_idx: usize, ray: &Ray, test: &mut F) -> bool
    where
        F: FnMut(u32) -> bool,
    {
        let node = &self.nodes[node_idx];
        if !node.aabb().slab_test(ray, ray.t_max) {
            return false;
        }

        if node.is_leaf() {
            for i in 0..node.triangle_count {
                let face = self.face_index[(node.left_first + i) as usize];
                if test(face) {
                    return true;
                }
            }
            false
        } else {
            self.any_rec(node.left_first as usize, ray, test)
                || self.any_rec(node.left_first as usize + 1, ray, test)
        }
    }
}

fn face_vertices(face: u32, indices: &[u32], positions: &[Point3]) -> [Point3; 3] {
    let base = (face * 3) as usize;
    [
        positions[indices[base] as usize],
        positions[indices[base + 1] as usize],
        positions[indices[base + 2] as usize],
    ]
}

fn update_node_bounds(
    nodes: &mut [BvhNode],
    node_idx: usize,
    face_index: &[u32],
    positions: &[Point3],
    indices: &[u32],
) {
    debug_assert!(nodes[node_idx].is_leaf());

    let mut aabb = Aabb::EMPTY;
    let node = &nodes[node_idx];
    for i in 0..node.triangle_count {
        let face = face_index[(node.left_first + i) as usize];
        for v in face_vertices(face, indices, positions) {
            aabb.grow(v);
        }
    }
    nodes[node_idx].aabb_min = aabb.min;
    nodes[node_idx].aabb_max = aabb.max;
}

fn subdivide(
    nodes: &mut Vec<BvhNode>,
    node_idx: usize,
    face_index: &mut [u32],
    positions: &[Point3],
    indices: &[u32],
) {
    let node = nodes[node_idx];
    if node.triangle_count <= LEAF_THRESHOLD {
        return;
    }

    // 分割軸はノード AABB の最長軸、位置はその中点
    let extent = node.aabb_max - node.aabb_min;
    let mut axis = 0;
    if extent.y > extent.x {
        axis = 1;
    }
    if extent.z > extent[axis] {
        axis = 2;
    }
    let split_pos = node.aabb_min[axis] + extent[axis] * 0.5;

    // 重心が分割位置より手前のフェースを前方に寄せる（面順の置換のみ）
    let mut i = node.left_first as usize;
    let mut j = (node.left_first + node.triangle_count - 1) as usize;
    while i <= j {
        let [v0, v1, v2] = face_vertices(face_index[i], indices, positions);
        let center = (v0 + v1 + v2) / 3.0;
        if center[axis] < split_pos {
            i += 1;
        } else {
            face_index.swap(i, j);
            if j == 0 {
                break;
            }
            j -= 1;
        }
    }

    // 片側が空になる分割は中止し、このノードを葉のまま残す
    let left_count = i as u32 - node.left_first;
    if left_count == 0 || left_count == node.triangle_count {
        return;
    }

    let left_child = nodes.len();
    nodes.push(BvhNode {
        left_first: node.left_first,
        triangle_count: left_count,
        ..BvhNode::default()
    });
    nodes.push(BvhNode {
        left_first: i as u32,
        triangle_count: node.triangle_count - left_count,
        ..BvhNode::default()
    });

    nodes[node_idx].left_first = left_child as u32;
    nodes[node_idx].triangle_count = 0;

    update_node_bounds(nodes, left_child, face_index, positions, indices);
    update_node_bounds(nodes, left_child + 1, face_index, positions, indices);
    subdivide(nodes, left_child, face_index, positions, indices);
    subdivide(nodes, left_child + 1, face_index, positions, indices);
}
