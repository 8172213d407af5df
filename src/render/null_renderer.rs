use crate::error::ChartResult;
use crate::render::{RenderFrame, Renderer};

/// Headless renderer that validates frames and records their size.
#[derive(Debug, Default)]
pub struct NullRenderer {
    pub frames_rendered: usize,
    pub last_line_count: usize,
    pub last_point_count: usize,
    pub last_text_count: usize,
}

impl Renderer for NullRenderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()> {
        frame.validate()?;
        self.frames_rendered += 1;
        self.last_line_count = frame.lines.len();
        self.last_point_count = frame.points.len();
        self.last_text_count = frame.texts.len();
        Ok(())
    }
}
