/// Drawing target seen by the editing core: pixel size plus a redraw request.
pub trait RenderSurface {
    fn width(&self) -> f32;
    fn height(&self) -> f32;
    /// Ask the host to redraw on the next frame
    fn invalidate(&mut self);

    fn aspect(&self) -> f32 {
        self.width() / self.height()
    }
}

/// Fixed-size surface without a window; counts redraw requests.
#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    width: f32,
    height: f32,
    redraws: usize,
}

impl HeadlessSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            redraws: 0,
        }
    }

    pub fn redraw_count(&self) -> usize {
        self.redraws
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        self.redraws += 1;
    }
}

impl Default for HeadlessSurface {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

impl RenderSurface for HeadlessSurface {
    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn invalidate(&mut self) {
        self.redraws += 1;
    }
}
