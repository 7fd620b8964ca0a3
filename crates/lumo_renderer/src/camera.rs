//! Cameras for primary ray generation.
//!
//! The camera frame is right-handed: `w` points from the target back to the
//! eye, `u` to the right and `v` up. Pixel (row 0, col 0) is the top-left
//! corner of the screen window.

use lumo_core::{ParamSet, SceneError};
use lumo_math::{Ray, Vec3};

use crate::error::{RenderError, Result};

/// Image-plane extent in camera units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenWindow {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
}

impl ScreenWindow {
    pub fn new(left: f32, right: f32, bottom: f32, top: f32) -> Self {
        Self {
            left,
            right,
            bottom,
            top,
        }
    }

    /// Symmetric window spanning a vertical field of view (degrees).
    pub fn from_fovy(fovy: f32, aspect: f32) -> Self {
        let h = (fovy.to_radians() / 2.0).tan().abs();
        Self::new(-aspect * h, aspect * h, -h, h)
    }

    fn from_params(ps: &ParamSet) -> Option<Self> {
        match ps.get_float_array("screen_window")?.as_slice() {
            &[l, r, b, t] => Some(Self::new(l, r, b, t)),
            other => {
                log::warn!("screen_window needs 4 values, got {}", other.len());
                None
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    /// Parallel rays along the view direction.
    Orthographic,
    /// All rays leave the eye.
    Perspective,
}

#[derive(Debug, Clone)]
pub struct Camera {
    projection: Projection,
    eye: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
    window: ScreenWindow,
    width: u32,
    height: u32,
}

impl Camera {
    /// Build a camera looking from `eye` toward `target`.
    pub fn new(
        projection: Projection,
        eye: Vec3,
        target: Vec3,
        up: Vec3,
        window: ScreenWindow,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        let w = (eye - target).normalize_or_zero();
        if w == Vec3::ZERO {
            return Err(RenderError::InvalidCamera(
                "look_from and look_at coincide".to_string(),
            ));
        }
        let u = up.cross(w).normalize_or_zero();
        if u == Vec3::ZERO {
            return Err(RenderError::InvalidCamera(format!(
                "up vector {} is parallel to the view direction",
                up
            )));
        }
        let v = w.cross(u);

        Ok(Self {
            projection,
            eye,
            u,
            v,
            w,
            window,
            width: width.max(1),
            height: height.max(1),
        })
    }

    /// Build from the `camera` and `look_at` directives for a film of
    /// `width` x `height` pixels.
    ///
    /// An explicit `screen_window` wins; a perspective camera may instead give
    /// `fovy` (degrees), with the window widened by the film aspect ratio.
    pub fn from_params(camera_ps: &ParamSet, look_at_ps: &ParamSet, width: u32, height: u32) -> Result<Self> {
        let kind = camera_ps.get_one_string("type", "perspective");
        let projection = match kind.as_str() {
            "orthographic" => Projection::Orthographic,
            "perspective" => Projection::Perspective,
            other => return Err(SceneError::unknown_type("camera", other).into()),
        };

        let aspect = width.max(1) as f32 / height.max(1) as f32;
        let window = match ScreenWindow::from_params(camera_ps) {
            Some(window) => window,
            None if projection == Projection::Perspective => {
                if !camera_ps.contains("fovy") {
                    return Err(RenderError::InvalidCamera(
                        "perspective camera needs screen_window or fovy".to_string(),
                    ));
                }
                ScreenWindow::from_fovy(camera_ps.get_one_float("fovy", 90.0), aspect)
            }
            None => ScreenWindow::new(-aspect, aspect, -1.0, 1.0),
        };

        let eye = look_at_ps.get_one_vec3("look_from", Vec3::ZERO);
        let target = look_at_ps.get_one_vec3("look_at", Vec3::NEG_Z);
        let up = look_at_ps.get_one_vec3("up", Vec3::Y);

        log::debug!(
            "Camera {:?} at {} looking at {} (window {:?})",
            projection,
            eye,
            target,
            window
        );
        Self::new(projection, eye, target, up, window, width, height)
    }

    pub fn projection(&self) -> Projection {
        self.projection
    }

    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Screen coordinates of the center of pixel (`row`, `col`).
    fn screen_position(&self, row: u32, col: u32) -> (f32, f32) {
        let sw = &self.window;
        let su = sw.left + (sw.right - sw.left) * (col as f32 + 0.5) / self.width as f32;
        let sv = sw.top - (sw.top - sw.bottom) * (row as f32 + 0.5) / self.height as f32;
        (su, sv)
    }

    /// Primary ray through the center of pixel (`row`, `col`).
    pub fn generate_ray(&self, row: u32, col: u32) -> Ray {
        let (su, sv) = self.screen_position(row, col);
        let offset = self.u * su + self.v * sv;
        match self.projection {
            Projection::Orthographic => Ray::new(self.eye + offset, -self.w),
            Projection::Perspective => Ray::new(self.eye, -self.w + offset),
        }
    }
}
