//! Corner construction from a triple of finder patterns.
//!
//! The two finders with the largest mutual distance span the hypotenuse;
//! the remaining one is the top-left corner. The sign of the cross product
//! around the top-left orients the other two so the triple forms an L
//! consistent with the image axes.

use log::trace;

use crate::detector::finder::FinderCandidate;
use crate::error::{DecodeError, Result};
use crate::models::Point;

/// Maximum allowed imbalance between the two corner legs (min/max)
pub(crate) const CORNER_SIDE_LENGTH_DEV: f32 = 0.8;
/// Maximum |cos| of the angle between the legs (~4 degrees off square)
pub(crate) const CORNER_RIGHT_ANGLE_DEV: f32 = 0.25;

/// An oriented finder triple with derived geometry
#[derive(Debug, Clone)]
pub struct Corner {
    pub top_left: FinderCandidate,
    pub top_right: FinderCandidate,
    pub bottom_left: FinderCandidate,
    pub top_line_length: f32,
    pub left_line_length: f32,
    pub version_estimate: u8,
}

impl Corner {
    /// Build and validate a corner from three matched finders.
    ///
    /// Fails with `CornerInvalid` when the legs are too unequal or the
    /// corner angle is too far from square.
    pub fn try_new(
        a: &FinderCandidate,
        b: &FinderCandidate,
        c: &FinderCandidate,
    ) -> Result<Corner> {
        let (pa, pb, pc) = (a.center(), b.center(), c.center());
        let d_ab = pa.distance_squared(&pb);
        let d_ac = pa.distance_squared(&pc);
        let d_bc = pb.distance_squared(&pc);

        // The vertex opposite the hypotenuse is the top-left finder
        let (tl, o1, o2) = if d_bc >= d_ab && d_bc >= d_ac {
            (a, b, c)
        } else if d_ac >= d_ab && d_ac >= d_bc {
            (b, a, c)
        } else {
            (c, a, b)
        };

        let p_tl = tl.center();
        let cross = p_tl.cross(&o1.center(), &o2.center());
        let (tr, bl) = if cross > 0.0 { (o1, o2) } else { (o2, o1) };

        let p_tr = tr.center();
        let p_bl = bl.center();
        let top = p_tl.distance(&p_tr);
        let left = p_tl.distance(&p_bl);

        if top.min(left) < CORNER_SIDE_LENGTH_DEV * top.max(left) {
            trace!("corner rejected: legs {top:.1} / {left:.1}");
            return Err(DecodeError::CornerInvalid);
        }

        let dot = (p_tr.x - p_tl.x) * (p_bl.x - p_tl.x) + (p_tr.y - p_tl.y) * (p_bl.y - p_tl.y);
        let cos = dot / (top * left);
        if cos.abs() > CORNER_RIGHT_ANGLE_DEV {
            trace!("corner rejected: cos {cos:.3}");
            return Err(DecodeError::CornerInvalid);
        }

        let version_estimate = estimate_version(tl, tr, bl, top, left);

        Ok(Corner {
            top_left: tl.clone(),
            top_right: tr.clone(),
            bottom_left: bl.clone(),
            top_line_length: top,
            left_line_length: left,
            version_estimate,
        })
    }

    /// Average module size over the three finders
    pub fn module_size(&self) -> f32 {
        (self.top_left.module_size()
            + self.top_right.module_size()
            + self.bottom_left.module_size())
            / 3.0
    }

    pub fn centers(&self) -> (Point, Point, Point) {
        (
            self.top_left.center(),
            self.top_right.center(),
            self.bottom_left.center(),
        )
    }
}

/// The finder centers sit 7 modules apart from the symbol edges, so each
/// leg spans `dimension - 7` modules: `v = ((len/module - 10) / 4)`
/// averaged over both legs and clamped to the valid range.
fn estimate_version(
    tl: &FinderCandidate,
    tr: &FinderCandidate,
    bl: &FinderCandidate,
    top: f32,
    left: f32,
) -> u8 {
    let top_module = (tl.module_size() + tr.module_size()) / 2.0;
    let left_module = (tl.module_size() + bl.module_size()) / 2.0;
    let modules = (top / top_module + left / left_module) / 2.0;
    let version = ((modules - 10.0) / 4.0).round();
    version.clamp(1.0, 40.0) as u8
}
