//! Extrusion of text outlines into beveled 3D meshes.
//!
//! The outline is flattened into closed polygon contours. Side walls sweep
//! each contour through a bevel profile: rings curve outward from the front
//! face, run straight along the extrusion depth, then curve back in at the
//! rear. Flat caps close both ends with the unexpanded contour.

use std::f32::consts::FRAC_PI_2;

use anyhow::{Result, anyhow};
use cgmath::Vector3;
use lyon_path::Path;
use lyon_path::iterator::PathIterator;
use lyon_path::math::point;
use lyon_tessellation::{
    BuffersBuilder, FillOptions, FillRule, FillTessellator, FillVertex, VertexBuffers,
};

use crate::data_structures::mesh::{MeshData, MeshVertex};
use crate::text::Typeface;

/// Extrusion parameters in mesh units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtrudeOptions {
    /// Em size the text is laid out at.
    pub size: f32,
    /// Extrusion depth, bevels not included.
    pub depth: f32,
    pub bevel_thickness: f32,
    pub bevel_size: f32,
    pub bevel_offset: f32,
    pub bevel_segments: u32,
    /// Maximum curve flattening error.
    pub tolerance: f32,
}

impl Default for ExtrudeOptions {
    fn default() -> Self {
        Self {
            size: 0.5,
            depth: 0.2,
            bevel_thickness: 0.03,
            bevel_size: 0.02,
            bevel_offset: 0.0,
            bevel_segments: 5,
            tolerance: 0.002,
        }
    }
}

/// Lay out and extrude `text`. The result is roughly centered on the origin;
/// an empty result (empty string, or no known glyphs) is a valid empty mesh.
pub fn extrude_text(typeface: &Typeface, text: &str, options: &ExtrudeOptions) -> Result<MeshData> {
    let path = typeface.text_path(text, options.size);
    let contours = flatten_contours(&path, options.tolerance);
    if contours.is_empty() {
        return Ok(MeshData::default());
    }

    let mut mesh = build_extrusion(&contours, options)?;

    // Centering halves the bounding-box maximum on each axis. The box is not
    // symmetric around the origin, so this is approximate on purpose: it
    // reproduces how the scene has always framed its text.
    if let Some((_, max)) = mesh.bounding_box() {
        mesh.translate(Vector3::new(-max.x * 0.5, -max.y * 0.5, -max.z * 0.5));
    }
    Ok(mesh)
}

/// Flatten a fill path into closed polygon contours, dropping degenerate
/// points and contours too small to bound any area.
pub fn flatten_contours(path: &Path, tolerance: f32) -> Vec<Vec<[f32; 2]>> {
    let mut contours = Vec::new();
    let mut current: Vec<[f32; 2]> = Vec::new();

    let mut push_point = |current: &mut Vec<[f32; 2]>, p: [f32; 2]| {
        if let Some(last) = current.last() {
            if (last[0] - p[0]).abs() < 1e-7 && (last[1] - p[1]).abs() < 1e-7 {
                return;
            }
        }
        current.push(p);
    };

    for event in path.iter().flattened(tolerance) {
        match event {
            lyon_path::Event::Begin { at } => {
                current = vec![[at.x, at.y]];
            }
            lyon_path::Event::Line { to, .. } => {
                push_point(&mut current, [to.x, to.y]);
            }
            lyon_path::Event::End { .. } => {
                let mut contour = std::mem::take(&mut current);
                if let (Some(first), Some(last)) = (contour.first(), contour.last()) {
                    if (first[0] - last[0]).abs() < 1e-7 && (first[1] - last[1]).abs() < 1e-7 {
                        contour.pop();
                    }
                }
                if contour.len() >= 3 {
                    contours.push(contour);
                }
            }
            _ => {}
        }
    }
    contours
}

/// Twice the signed area is the shoelace sum; positive means counterclockwise.
pub fn signed_area(contour: &[[f32; 2]]) -> f32 {
    let mut doubled = 0.0;
    for (i, a) in contour.iter().enumerate() {
        let b = contour[(i + 1) % contour.len()];
        doubled += a[0] * b[1] - b[0] * a[1];
    }
    doubled * 0.5
}

fn build_extrusion(contours: &[Vec<[f32; 2]>], options: &ExtrudeOptions) -> Result<MeshData> {
    // Holes wind opposite to solids, so one orientation convention moves
    // every contour the right way: solids grow, holes shrink. The largest
    // contour is always a solid and fixes the convention.
    let solid_ccw = contours
        .iter()
        .map(|c| signed_area(c))
        .max_by(|a, b| a.abs().total_cmp(&b.abs()))
        .map(|area| area > 0.0)
        .unwrap_or(true);

    let profile = bevel_profile(options);
    let mut mesh = MeshData::default();
    for contour in contours {
        mesh.extend(contour_wall(contour, &profile, solid_ccw));
    }
    mesh.extend(build_caps(contours, options)?);
    Ok(mesh)
}

/// The wall cross-section as `(z, expansion)` rings, front to back.
fn bevel_profile(options: &ExtrudeOptions) -> Vec<[f32; 2]> {
    let segments = options.bevel_segments.max(1);
    let outer = options.bevel_offset;
    let inner = options.bevel_offset + options.bevel_size;

    let mut profile = Vec::with_capacity(2 * segments as usize + 2);
    for b in 0..=segments {
        let angle = b as f32 / segments as f32 * FRAC_PI_2;
        profile.push([
            -options.bevel_thickness * angle.cos(),
            outer + options.bevel_size * angle.sin(),
        ]);
    }
    profile.push([options.depth, inner]);
    for b in 1..=segments {
        let angle = b as f32 / segments as f32 * FRAC_PI_2;
        profile.push([
            options.depth + options.bevel_thickness * angle.sin(),
            outer + options.bevel_size * angle.cos(),
        ]);
    }
    profile
}

fn contour_wall(contour: &[[f32; 2]], profile: &[[f32; 2]], solid_ccw: bool) -> MeshData {
    let n = contour.len();

    // Outward normal of each edge, by the winding convention.
    let mut edge_normals = Vec::with_capacity(n);
    for i in 0..n {
        let a = contour[i];
        let b = contour[(i + 1) % n];
        let (dx, dy) = (b[0] - a[0], b[1] - a[1]);
        let len = (dx * dx + dy * dy).sqrt().max(1e-12);
        if solid_ccw {
            edge_normals.push([dy / len, -dx / len]);
        } else {
            edge_normals.push([-dy / len, dx / len]);
        }
    }

    // Per-vertex offset direction: the bisector of the adjacent edge normals,
    // with a clamped miter so sharp corners do not shoot off.
    let mut directions = Vec::with_capacity(n);
    for i in 0..n {
        let prev = edge_normals[(i + n - 1) % n];
        let curr = edge_normals[i];
        let (bx, by) = (prev[0] + curr[0], prev[1] + curr[1]);
        let len = (bx * bx + by * by).sqrt();
        if len < 1e-6 {
            // A 180 degree spike; fall back to the leading edge normal.
            directions.push((curr, 1.0f32));
        } else {
            let bisector = [bx / len, by / len];
            let cos = bisector[0] * curr[0] + bisector[1] * curr[1];
            let miter = (1.0 / cos.max(0.25)).min(4.0);
            directions.push((bisector, miter));
        }
    }

    // Ring normals follow the profile slope, by central differences.
    let rings = profile.len();
    let mut ring_normals = Vec::with_capacity(rings);
    for r in 0..rings {
        let before = profile[r.saturating_sub(1)];
        let after = profile[(r + 1).min(rings - 1)];
        let dz = after[0] - before[0];
        let de = after[1] - before[1];
        let len = (dz * dz + de * de).sqrt();
        if len < 1e-12 {
            ring_normals.push([1.0, 0.0]);
        } else {
            ring_normals.push([dz / len, -de / len]);
        }
    }

    let mut mesh = MeshData {
        vertices: Vec::with_capacity(rings * n),
        indices: Vec::with_capacity((rings - 1) * n * 6),
    };
    for (r, ring) in profile.iter().enumerate() {
        let [z, expand] = *ring;
        let [n_out, n_z] = ring_normals[r];
        for i in 0..n {
            let (bisector, miter) = directions[i];
            let p = contour[i];
            mesh.vertices.push(MeshVertex {
                position: [
                    p[0] + bisector[0] * miter * expand,
                    p[1] + bisector[1] * miter * expand,
                    z,
                ],
                normal: [bisector[0] * n_out, bisector[1] * n_out, n_z],
            });
        }
    }
    for r in 0..rings - 1 {
        for i in 0..n {
            let i2 = (i + 1) % n;
            let (a, b) = ((r * n + i) as u32, (r * n + i2) as u32);
            let (c, d) = (((r + 1) * n + i) as u32, ((r + 1) * n + i2) as u32);
            mesh.indices.extend_from_slice(&[a, b, d, a, d, c]);
        }
    }
    mesh
}

/// Fill both end faces with the unexpanded contour, at the bevel extremes.
fn build_caps(contours: &[Vec<[f32; 2]>], options: &ExtrudeOptions) -> Result<MeshData> {
    let mut builder = Path::builder();
    for contour in contours {
        builder.begin(point(contour[0][0], contour[0][1]));
        for p in &contour[1..] {
            builder.line_to(point(p[0], p[1]));
        }
        builder.end(true);
    }
    let path = builder.build();

    let mut buffers: VertexBuffers<[f32; 2], u32> = VertexBuffers::new();
    FillTessellator::new()
        .tessellate_path(
            &path,
            &FillOptions::tolerance(options.tolerance).with_fill_rule(FillRule::NonZero),
            &mut BuffersBuilder::new(&mut buffers, |vertex: FillVertex| {
                let p = vertex.position();
                [p.x, p.y]
            }),
        )
        .map_err(|error| anyhow!("cap tessellation failed: {error:?}"))?;

    let front_z = -options.bevel_thickness;
    let back_z = options.depth + options.bevel_thickness;

    let mut mesh = MeshData::default();
    for (z, normal) in [(front_z, [0.0, 0.0, -1.0]), (back_z, [0.0, 0.0, 1.0])] {
        let cap = MeshData {
            vertices: buffers
                .vertices
                .iter()
                .map(|p| MeshVertex {
                    position: [p[0], p[1], z],
                    normal,
                })
                .collect(),
            indices: buffers.indices.clone(),
        };
        mesh.extend(cap);
    }
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_spans_both_bevels() {
        let options = ExtrudeOptions::default();
        let profile = bevel_profile(&options);
        assert_eq!(profile.len(), 2 * 5 + 2);

        let first = profile.first().unwrap();
        let last = profile.last().unwrap();
        assert!((first[0] + options.bevel_thickness).abs() < 1e-6);
        assert!((last[0] - options.depth - options.bevel_thickness).abs() < 1e-6);
        // Both extremes sit on the unexpanded contour.
        assert!((first[1] - options.bevel_offset).abs() < 1e-6);
        assert!((last[1] - options.bevel_offset).abs() < 1e-6);
        // The straight section carries the full bevel expansion.
        assert!(profile.iter().any(|ring| {
            ring[0].abs() < 1e-6 && (ring[1] - options.bevel_size).abs() < 1e-6
        }));
    }

    #[test]
    fn profile_z_is_monotonic() {
        let profile = bevel_profile(&ExtrudeOptions::default());
        for pair in profile.windows(2) {
            assert!(pair[1][0] >= pair[0][0]);
        }
    }

    #[test]
    fn signed_area_tracks_winding() {
        let ccw = vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        let cw: Vec<_> = ccw.iter().rev().copied().collect();
        assert!((signed_area(&ccw) - 1.0).abs() < 1e-6);
        assert!((signed_area(&cw) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn square_contour_wall_expands_outward() {
        let contour = vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        let profile = bevel_profile(&ExtrudeOptions::default());
        let wall = contour_wall(&contour, &profile, true);

        let (min, max) = wall.bounding_box().unwrap();
        // The waist of the wall bulges out by the bevel size.
        assert!(max.x > 1.0 + 0.01);
        assert!(min.x < -0.01);
        assert!((min.z + 0.03).abs() < 1e-6);
        assert!((max.z - 0.23).abs() < 1e-6);
    }
}
