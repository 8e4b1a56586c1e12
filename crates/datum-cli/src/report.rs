//! Rendering resolved frames as tables or JSON.

use std::io::Write;

use anyhow::Result;
use datum::{Anchor, AnchorKind, Frame};
use datum_math::{Point3, Vec3};
use serde::Serialize;

use crate::settings::Format;

/// One resolved frame, as printed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameRecord {
    /// Reference path.
    pub path: String,
    /// `auto`, `named`, or `part` for a placement.
    pub kind: &'static str,
    /// World-space origin.
    pub origin: [f64; 3],
    /// Local X.
    pub tangent: [f64; 3],
    /// Local Y.
    pub bitangent: [f64; 3],
    /// Local Z.
    pub normal: [f64; 3],
}

impl FrameRecord {
    /// Record for an arbitrary frame.
    pub fn new(path: impl Into<String>, kind: &'static str, frame: &Frame) -> Self {
        Self {
            path: path.into(),
            kind,
            origin: point(&frame.origin()),
            tangent: vector(&frame.tangent()),
            bitangent: vector(&frame.bitangent()),
            normal: vector(&frame.normal()),
        }
    }

    /// Record for a registered anchor.
    pub fn from_anchor(anchor: &Anchor) -> Self {
        let kind = match anchor.kind() {
            AnchorKind::Auto => "auto",
            AnchorKind::Named => "named",
        };
        Self::new(anchor.path().as_str(), kind, anchor.frame())
    }
}

fn point(p: &Point3) -> [f64; 3] {
    [p.x, p.y, p.z]
}

fn vector(v: &Vec3) -> [f64; 3] {
    [v.x, v.y, v.z]
}

/// Write `records` in `format`.
pub fn write_records(
    out: &mut impl Write,
    records: &[FrameRecord],
    format: Format,
    precision: usize,
) -> Result<()> {
    match format {
        Format::Json => {
            serde_json::to_writer_pretty(&mut *out, records)?;
            writeln!(out)?;
        }
        Format::Table => {
            let width = records
                .iter()
                .map(|r| r.path.len())
                .chain(std::iter::once("PATH".len()))
                .max()
                .unwrap_or(4);
            writeln!(
                out,
                "{:<width$}  {:<5}  {:<24}  {:<24}",
                "PATH", "KIND", "ORIGIN", "NORMAL"
            )?;
            for r in records {
                writeln!(
                    out,
                    "{:<width$}  {:<5}  {:<24}  {:<24}",
                    r.path,
                    r.kind,
                    triple(&r.origin, precision),
                    triple(&r.normal, precision),
                )?;
            }
        }
    }
    Ok(())
}

fn triple(v: &[f64; 3], precision: usize) -> String {
    // avoid printing -0.000
    let fmt = |x: f64| {
        let s = format!("{x:.precision$}");
        if s.starts_with('-') && s[1..].chars().all(|c| c == '0' || c == '.') {
            s[1..].to_string()
        } else {
            s
        }
    };
    format!("({}, {}, {})", fmt(v[0]), fmt(v[1]), fmt(v[2]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> FrameRecord {
        let frame = Frame::identity()
            .with_origin(Point3::new(5.0, 5.0, 20.0))
            .unwrap();
        FrameRecord::new("base.face_top", "auto", &frame)
    }

    #[test]
    fn table_rounds_to_precision() {
        let mut out = Vec::new();
        write_records(&mut out, &[record()], Format::Table, 2).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("PATH"));
        let row = lines.next().unwrap();
        assert!(row.starts_with("base.face_top"));
        assert!(row.contains("(5.00, 5.00, 20.00)"));
        assert!(row.contains("(0.00, 0.00, 1.00)"));
    }

    #[test]
    fn negative_zero_is_printed_as_zero() {
        assert_eq!(triple(&[-0.0, -1e-9, 1.5], 1), "(0.0, 0.0, 1.5)");
        assert_eq!(triple(&[-2.0, 0.0, 0.0], 0), "(-2, 0, 0)");
    }

    #[test]
    fn json_is_an_array_of_records() {
        let mut out = Vec::new();
        write_records(&mut out, &[record()], Format::Json, 3).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value[0]["path"], "base.face_top");
        assert_eq!(value[0]["origin"][2], 20.0);
        assert_eq!(value[0]["normal"][2], 1.0);
    }
}
