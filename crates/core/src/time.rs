pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 5.0;

/// Maps timeline seconds to a horizontally zoomed and scrolled pixel space.
///
/// Pixel coordinates are measured from the left edge of the timeline content;
/// screen coordinates are measured from the left edge of the visible canvas,
/// i.e. content pixels minus the scroll offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    zoom: f64,
    canvas_width: u32,
    duration: f64,
    scroll: f64,
    min_zoom: f64,
    max_zoom: f64,
}

impl Viewport {
    pub fn new(canvas_width: u32, duration: f64) -> Self {
        let duration = if duration.is_finite() && duration > 0.0 {
            duration
        } else {
            1.0
        };

        Self {
            zoom: 1.0,
            canvas_width: canvas_width.max(1),
            duration,
            scroll: 0.0,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
        }
    }

    pub fn with_zoom_range(mut self, min_zoom: f64, max_zoom: f64) -> Self {
        if min_zoom > 0.0 && min_zoom <= max_zoom {
            self.min_zoom = min_zoom;
            self.max_zoom = max_zoom;
            self.zoom = self.zoom.clamp(min_zoom, max_zoom);
            self.scroll = self.scroll.clamp(0.0, self.max_scroll());
        } else {
            log::debug!("ignoring invalid zoom range {min_zoom}..{max_zoom}");
        }
        self
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn zoom_range(&self) -> (f64, f64) {
        (self.min_zoom, self.max_zoom)
    }

    pub fn scroll(&self) -> f64 {
        self.scroll
    }

    pub fn canvas_width(&self) -> u32 {
        self.canvas_width
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn time_to_pixel(&self, seconds: f64) -> f64 {
        (seconds / self.duration) * self.canvas_width as f64 * self.zoom
    }

    pub fn pixel_to_time(&self, pixels: f64) -> f64 {
        (pixels / (self.canvas_width as f64 * self.zoom)) * self.duration
    }

    pub fn pixels_per_second(&self) -> f64 {
        self.canvas_width as f64 * self.zoom / self.duration
    }

    /// Width of the whole timeline at the current zoom.
    pub fn content_width(&self) -> f64 {
        self.time_to_pixel(self.duration)
    }

    pub fn max_scroll(&self) -> f64 {
        (self.content_width() - self.canvas_width as f64).max(0.0)
    }

    pub fn set_scroll(&mut self, pixels: f64) {
        self.scroll = pixels.clamp(0.0, self.max_scroll());
    }

    /// Change zoom, keeping the time under `ref_pixel` (a screen coordinate)
    /// in place.
    pub fn zoom_around(&mut self, zoom: f64, ref_pixel: f64) {
        let anchor = self.screen_to_time(ref_pixel);
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        self.set_scroll(self.time_to_pixel(anchor) - ref_pixel);
    }

    pub fn set_duration(&mut self, duration: f64) {
        if !(duration.is_finite() && duration > 0.0) {
            log::debug!("ignoring non-positive timeline duration {duration}");
            return;
        }
        self.duration = duration;
        self.set_scroll(self.scroll);
    }

    pub fn set_canvas_width(&mut self, canvas_width: u32) {
        self.canvas_width = canvas_width.max(1);
        self.set_scroll(self.scroll);
    }

    pub fn screen_to_time(&self, x: f64) -> f64 {
        self.pixel_to_time(self.scroll + x)
    }

    pub fn time_to_screen(&self, seconds: f64) -> f64 {
        self.time_to_pixel(seconds) - self.scroll
    }
}
