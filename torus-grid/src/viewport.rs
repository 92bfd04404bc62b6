/// Upper zoom bound.
pub const ZOOM_MAX: u32 = 100;

const ZOOM_STEP: u32 = 2;
const PAN_STEP: i64 = 20;

/// Snapshot of the viewport transform, returned from every mutation so the
/// caller can drive its own redraw decisions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ViewState {
    pub zoom: u32,
    pub dx: i64,
    pub dy: i64,
}

/// Zoom/pan transform from logical pixel coordinates to screen coordinates.
///
/// Offsets are clamped so the scaled grid always covers the viewport:
/// `dx` stays in `[extent_x - extent_x*zoom, 0]` (and likewise for `dy`);
/// at zoom 1 both are pinned to 0 since the whole grid already fits.
#[derive(Clone, Debug)]
pub struct Viewport {
    extent_x: i64,
    extent_y: i64,
    zoom: u32,
    dx: i64,
    dy: i64,
}

impl Viewport {
    /// `extent_x`/`extent_y` are the grid's logical pixel extent at zoom 1.
    pub fn new(extent_x: u32, extent_y: u32) -> Self {
        Self {
            extent_x: extent_x as i64,
            extent_y: extent_y as i64,
            zoom: 1,
            dx: 0,
            dy: 0,
        }
    }

    pub fn view(&self) -> ViewState {
        ViewState {
            zoom: self.zoom,
            dx: self.dx,
            dy: self.dy,
        }
    }

    /// Central re-projection. When the zoom changes, the offsets are first
    /// re-derived so the point at the viewport center stays centered, and
    /// only then clamped; clamping first gives wrong panning at the zoom
    /// boundaries.
    pub fn set_view(&mut self, zoom: u32, dx: i64, dy: i64) -> ViewState {
        let zoom = zoom.clamp(1, ZOOM_MAX);

        let (mut dx, mut dy) = (dx, dy);
        if zoom != self.zoom {
            let center_x = self.extent_x / 2;
            let center_y = self.extent_y / 2;
            dx = center_x - (center_x - self.dx) * zoom as i64 / self.zoom as i64;
            dy = center_y - (center_y - self.dy) * zoom as i64 / self.zoom as i64;
            self.zoom = zoom;
        }

        if self.zoom == 1 {
            self.dx = 0;
            self.dy = 0;
        } else {
            let zoom = self.zoom as i64;
            self.dx = dx.clamp(self.extent_x - self.extent_x * zoom, 0);
            self.dy = dy.clamp(self.extent_y - self.extent_y * zoom, 0);
        }
        self.view()
    }

    pub fn zoom_in(&mut self) -> ViewState {
        self.set_view(self.zoom + ZOOM_STEP, self.dx, self.dy)
    }

    pub fn zoom_out(&mut self) -> ViewState {
        self.set_view(self.zoom.saturating_sub(ZOOM_STEP).max(1), self.dx, self.dy)
    }

    pub fn pan_by(&mut self, ddx: i64, ddy: i64) -> ViewState {
        self.set_view(self.zoom, self.dx + ddx, self.dy + ddy)
    }

    /// One pan step per arrow-key direction.
    pub fn pan_step(&self) -> i64 {
        PAN_STEP
    }

    /// Maps a logical rectangle to its screen rectangle.
    pub fn project(&self, x: i64, y: i64, size: i64) -> (i64, i64, i64) {
        let zoom = self.zoom as i64;
        (x * zoom + self.dx, y * zoom + self.dy, size * zoom)
    }

    /// Inverse of [`project`](Self::project)'s linear map. The result is an
    /// unfiltered logical point; the caller applies its own bounds test.
    pub fn unproject(&self, screen_x: i64, screen_y: i64) -> (i64, i64) {
        let zoom = self.zoom as i64;
        (
            (screen_x - self.dx).div_euclid(zoom),
            (screen_y - self.dy).div_euclid(zoom),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unzoomed_and_centered() {
        let viewport = Viewport::new(100, 80);
        assert_eq!(
            viewport.view(),
            ViewState {
                zoom: 1,
                dx: 0,
                dy: 0
            }
        );
    }

    #[test]
    fn project_unproject_round_trip_at_zoom_one() {
        let viewport = Viewport::new(100, 100);
        for (x, y) in [(0, 0), (37, 12), (99, 99)] {
            let (sx, sy, size) = viewport.project(x, y, 1);
            assert_eq!(size, 1);
            assert_eq!(viewport.unproject(sx, sy), (x, y));
        }
    }

    #[test]
    fn project_unproject_round_trip_when_zoomed() {
        let mut viewport = Viewport::new(100, 100);
        viewport.zoom_in();
        viewport.pan_by(-15, -27);
        for (x, y) in [(0, 0), (37, 12), (99, 99)] {
            let (sx, sy, _) = viewport.project(x, y, 1);
            assert_eq!(viewport.unproject(sx, sy), (x, y));
        }
    }

    #[test]
    fn zoom_clamps_to_bounds() {
        let mut viewport = Viewport::new(100, 100);
        assert_eq!(viewport.zoom_out().zoom, 1);
        let state = viewport.set_view(ZOOM_MAX + 5, 0, 0);
        assert_eq!(state.zoom, ZOOM_MAX);
        assert_eq!(viewport.zoom_in().zoom, ZOOM_MAX);
    }

    #[test]
    fn zoom_in_recenters_around_midpoint() {
        let mut viewport = Viewport::new(100, 100);
        // 50 - (50 - 0) * 3 / 1 = -100, inside [-200, 0].
        assert_eq!(
            viewport.zoom_in(),
            ViewState {
                zoom: 3,
                dx: -100,
                dy: -100
            }
        );
        // 50 - (50 - -100) * 5 / 3 = -200, inside [-400, 0].
        assert_eq!(
            viewport.zoom_in(),
            ViewState {
                zoom: 5,
                dx: -200,
                dy: -200
            }
        );
    }

    #[test]
    fn recenter_happens_before_clamping() {
        let mut viewport = Viewport::new(100, 100);
        viewport.zoom_in();
        viewport.pan_by(100, 0); // push dx to the 0 edge, keep dy at -100
        assert_eq!(viewport.view().dx, 0);
        assert_eq!(viewport.view().dy, -100);
        // Re-centering from the edge: 50 - (50 - 0) * 5 / 3 = -33, not the
        // 0 a clamp-first implementation would keep.
        let state = viewport.zoom_in();
        assert_eq!(state.dx, -33);
        assert_eq!(state.dy, -200);
    }

    #[test]
    fn pan_clamps_to_grid_extent() {
        let mut viewport = Viewport::new(100, 80);
        viewport.zoom_in(); // zoom 3
        for _ in 0..100 {
            viewport.pan_by(-50, -50);
        }
        let state = viewport.view();
        assert_eq!(state.dx, 100 - 100 * 3);
        assert_eq!(state.dy, 80 - 80 * 3);
        for _ in 0..100 {
            viewport.pan_by(50, 50);
        }
        let state = viewport.view();
        assert_eq!(state.dx, 0);
        assert_eq!(state.dy, 0);
    }

    #[test]
    fn no_panning_at_zoom_one() {
        let mut viewport = Viewport::new(100, 100);
        let state = viewport.pan_by(-500, 300);
        assert_eq!((state.dx, state.dy), (0, 0));
    }

    #[test]
    fn returning_to_zoom_one_resets_offsets() {
        let mut viewport = Viewport::new(100, 100);
        viewport.zoom_in();
        viewport.pan_by(-40, -40);
        let state = viewport.zoom_out();
        assert_eq!(
            state,
            ViewState {
                zoom: 1,
                dx: 0,
                dy: 0
            }
        );
    }
}
