//! Typeface data and text outlines.
//!
//! Typefaces come in as JSON with per-glyph outline command strings. A glyph
//! outline is a flat token list: `m x y` starts a contour, `l x y` a line,
//! `q x y cx cy` a quadratic curve and `b x y cx1 cy1 cx2 cy2` a cubic curve.
//! Curve tokens carry the end point first, then the control points.

pub mod extrude;

use std::collections::HashMap;

use anyhow::{Result, anyhow, bail};
use lyon_path::Path;
use lyon_path::math::point;
use serde::Deserialize;

/// A parsed typeface: glyph outlines in font units plus layout metrics.
#[derive(Debug, Clone, Deserialize)]
pub struct Typeface {
    pub glyphs: HashMap<String, Glyph>,
    /// Font units per em; outline coordinates divide by this.
    pub resolution: f32,
    #[serde(rename = "familyName", default)]
    pub family_name: String,
}

/// One glyph: horizontal advance and an optional outline command string.
/// Glyphs without an outline (like the space) still advance the pen.
#[derive(Debug, Clone, Deserialize)]
pub struct Glyph {
    pub ha: f32,
    #[serde(default)]
    pub o: Option<String>,
}

impl Typeface {
    pub fn from_json(json: &str) -> Result<Self> {
        let typeface: Typeface = serde_json::from_str(json)?;
        if typeface.resolution <= 0.0 {
            bail!("typeface resolution must be positive");
        }
        Ok(typeface)
    }

    pub fn glyph(&self, c: char) -> Option<&Glyph> {
        let mut buf = [0u8; 4];
        self.glyphs.get(c.encode_utf8(&mut buf) as &str)
    }

    /// Lay out `text` at the given em size and collect all glyph contours
    /// into a single fill path. Characters without a glyph are skipped,
    /// glyphs without an outline still advance the pen.
    pub fn text_path(&self, text: &str, size: f32) -> Path {
        let scale = size / self.resolution;
        let mut builder = Path::builder();
        let mut pen_x = 0.0f32;

        for c in text.chars() {
            let Some(glyph) = self.glyph(c) else {
                log::warn!("typeface {:?} has no glyph for {c:?}", self.family_name);
                continue;
            };
            if let Some(outline) = &glyph.o {
                match parse_outline(outline) {
                    Ok(commands) => {
                        append_glyph(&mut builder, &commands, scale, pen_x);
                    }
                    Err(error) => {
                        log::warn!("skipping malformed outline for {c:?}: {error}");
                    }
                }
            }
            pen_x += glyph.ha * scale;
        }

        builder.build()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutlineCommand {
    MoveTo([f32; 2]),
    LineTo([f32; 2]),
    /// Control point, then end point.
    QuadTo([f32; 2], [f32; 2]),
    /// Two control points, then end point.
    CubicTo([f32; 2], [f32; 2], [f32; 2]),
    /// Explicit contour close; contours also close implicitly at the next
    /// `m` or at the end of the outline.
    Close,
}

/// Parse a glyph outline command string into drawing commands.
pub fn parse_outline(outline: &str) -> Result<Vec<OutlineCommand>> {
    let mut tokens = outline.split_ascii_whitespace();
    let mut commands = Vec::new();

    while let Some(op) = tokens.next() {
        let mut coord = |what: &str| -> Result<f32> {
            let token = tokens
                .next()
                .ok_or_else(|| anyhow!("outline ended while reading {what} of {op:?}"))?;
            token
                .parse::<f32>()
                .map_err(|_| anyhow!("bad {what} coordinate {token:?} after {op:?}"))
        };

        let command = match op {
            "m" => OutlineCommand::MoveTo([coord("x")?, coord("y")?]),
            "l" => OutlineCommand::LineTo([coord("x")?, coord("y")?]),
            "q" => {
                let end = [coord("x")?, coord("y")?];
                let ctrl = [coord("cx")?, coord("cy")?];
                OutlineCommand::QuadTo(ctrl, end)
            }
            "b" => {
                let end = [coord("x")?, coord("y")?];
                let ctrl1 = [coord("cx1")?, coord("cy1")?];
                let ctrl2 = [coord("cx2")?, coord("cy2")?];
                OutlineCommand::CubicTo(ctrl1, ctrl2, end)
            }
            "z" => OutlineCommand::Close,
            other => bail!("unknown outline opcode {other:?}"),
        };
        commands.push(command);
    }

    Ok(commands)
}

fn append_glyph(
    builder: &mut lyon_path::path::Builder,
    commands: &[OutlineCommand],
    scale: f32,
    pen_x: f32,
) {
    let at = |p: [f32; 2]| point(p[0] * scale + pen_x, p[1] * scale);
    let mut open = false;

    for command in commands {
        match *command {
            OutlineCommand::MoveTo(p) => {
                if open {
                    builder.end(true);
                }
                builder.begin(at(p));
                open = true;
            }
            OutlineCommand::LineTo(p) if open => {
                builder.line_to(at(p));
            }
            OutlineCommand::QuadTo(ctrl, end) if open => {
                builder.quadratic_bezier_to(at(ctrl), at(end));
            }
            OutlineCommand::CubicTo(ctrl1, ctrl2, end) if open => {
                builder.cubic_bezier_to(at(ctrl1), at(ctrl2), at(end));
            }
            OutlineCommand::Close => {
                if open {
                    builder.end(true);
                    open = false;
                }
            }
            // Drawing before any `m` has no current point; drop the command.
            _ => log::warn!("outline drawing command before any contour start"),
        }
    }
    if open {
        builder.end(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_command_kinds() {
        let commands = parse_outline("m 0 0 l 10 0 q 10 10 10 5 b 0 10 7 12 3 12 z").unwrap();
        assert_eq!(
            commands,
            vec![
                OutlineCommand::MoveTo([0.0, 0.0]),
                OutlineCommand::LineTo([10.0, 0.0]),
                OutlineCommand::QuadTo([10.0, 5.0], [10.0, 10.0]),
                OutlineCommand::CubicTo([7.0, 12.0], [3.0, 12.0], [0.0, 10.0]),
                OutlineCommand::Close,
            ]
        );
    }

    #[test]
    fn rejects_truncated_and_unknown_input() {
        assert!(parse_outline("m 0").is_err());
        assert!(parse_outline("x 1 2").is_err());
        assert!(parse_outline("l one two").is_err());
        assert!(parse_outline("").unwrap().is_empty());
    }

    #[test]
    fn typeface_requires_positive_resolution() {
        let json = r#"{"glyphs": {}, "resolution": 0}"#;
        assert!(Typeface::from_json(json).is_err());
    }

    #[test]
    fn layout_advances_the_pen_and_skips_unknown_glyphs() {
        let json = r#"{
            "glyphs": {
                "a": {"ha": 600, "o": "m 0 0 l 500 0 l 500 500 l 0 500"},
                " ": {"ha": 300}
            },
            "resolution": 1000,
            "familyName": "Test"
        }"#;
        let typeface = Typeface::from_json(json).unwrap();

        // "a a" places two squares: the second starts at (600 + 300) units.
        let path = typeface.text_path("a a", 1.0);
        let mut max_x = f32::MIN;
        for event in path.iter() {
            if let lyon_path::Event::Line { to, .. } = event {
                max_x = max_x.max(to.x);
            }
        }
        assert!((max_x - 1.4).abs() < 1e-5);

        // Unknown characters contribute nothing, not even advance.
        let skipped = typeface.text_path("??", 1.0);
        assert_eq!(skipped.iter().count(), 0);
    }
}
