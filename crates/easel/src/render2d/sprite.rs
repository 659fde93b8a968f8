//! Sprite-sheet animation.
//!
//! A [`SpriteSheet`] cuts an image into a grid of equally sized cells, numbered
//! row-major from the top-left. The sheet tracks a current frame that cycles
//! between a start and end frame. A [`Sprite`] pairs a sheet with the scene
//! resource that holds the image.

use crate::entity::EntityId;

use super::PixelRect;

/// Frame layout and playback position inside a sprite-sheet image.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteSheet {
    frame_width: u32,
    frame_height: u32,
    columns: u32,
    rows: u32,
    start_frame: u32,
    end_frame: u32,
    frame: u32,
}

impl SpriteSheet {
    /// A sheet of `columns` × `rows` frames, each `frame_width` × `frame_height`
    /// pixels. Playback covers every frame.
    pub fn new(frame_width: u32, frame_height: u32, columns: u32, rows: u32) -> Self {
        let columns = columns.max(1);
        let mut rows = rows.max(1);
        if columns.checked_mul(rows).is_none() {
            let max_rows = u32::MAX / columns;
            log::warn!(
                "Sprite sheet of {columns}x{rows} frames is too large, keeping {max_rows} rows"
            );
            rows = max_rows;
        }
        Self {
            frame_width,
            frame_height,
            columns,
            rows,
            start_frame: 0,
            end_frame: columns * rows - 1,
            frame: 0,
        }
    }

    /// Restrict playback to `start..=end`. Out-of-range values are clamped to
    /// the sheet, and the current frame jumps to `start`.
    pub fn frames(mut self, start: u32, end: u32) -> Self {
        let last = self.frame_count() - 1;
        self.end_frame = end.min(last);
        self.start_frame = start.min(self.end_frame);
        self.frame = self.start_frame;
        self
    }

    pub fn frame_count(&self) -> u32 {
        self.columns * self.rows
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }

    pub fn frame_size(&self) -> (u32, u32) {
        (self.frame_width, self.frame_height)
    }

    /// Jump to a frame, clamped into the playback range.
    pub fn set_frame(&mut self, frame: u32) {
        self.frame = frame.clamp(self.start_frame, self.end_frame);
    }

    /// Advance one frame, wrapping from the end frame back to the start frame.
    pub fn next_frame(&mut self) {
        self.frame = if self.frame >= self.end_frame {
            self.start_frame
        } else {
            self.frame + 1
        };
    }

    /// Step back one frame, wrapping from the start frame to the end frame.
    pub fn prev_frame(&mut self) {
        self.frame = if self.frame <= self.start_frame {
            self.end_frame
        } else {
            self.frame - 1
        };
    }

    /// Pixel rectangle of the current frame inside the sheet image.
    pub fn source_rect(&self) -> PixelRect {
        let row = self.frame / self.columns;
        let col = self.frame % self.columns;
        PixelRect {
            x: col.saturating_mul(self.frame_width),
            y: row.saturating_mul(self.frame_height),
            width: self.frame_width,
            height: self.frame_height,
        }
    }
}

/// A sprite sheet drawn from a scene resource.
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    pub resource: EntityId,
    pub sheet: SpriteSheet,
    /// Multiplier applied to the frame size when drawn.
    pub scale: f32,
}

impl Sprite {
    pub fn new(resource: EntityId, sheet: SpriteSheet) -> Self {
        Self {
            resource,
            sheet,
            scale: 1.0,
        }
    }

    pub fn scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// On-surface size of one frame.
    pub fn draw_size(&self) -> (f32, f32) {
        let (w, h) = self.sheet.frame_size();
        (w as f32 * self.scale, h as f32 * self.scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_are_row_major_by_column_count() {
        // 4 columns, 2 rows: frame 5 is row 1, column 1.
        let mut sheet = SpriteSheet::new(16, 8, 4, 2);
        sheet.set_frame(5);
        assert_eq!(
            sheet.source_rect(),
            PixelRect { x: 16, y: 8, width: 16, height: 8 }
        );
    }

    #[test]
    fn next_and_prev_wrap_inside_range() {
        let mut sheet = SpriteSheet::new(8, 8, 3, 3).frames(2, 4);
        assert_eq!(sheet.frame(), 2);
        sheet.next_frame();
        sheet.next_frame();
        assert_eq!(sheet.frame(), 4);
        sheet.next_frame();
        assert_eq!(sheet.frame(), 2);
        sheet.prev_frame();
        assert_eq!(sheet.frame(), 4);
    }

    #[test]
    fn range_is_clamped_to_sheet() {
        let sheet = SpriteSheet::new(8, 8, 2, 2).frames(7, 99);
        assert_eq!(sheet.frame(), 3);
        assert_eq!(sheet.frame_count(), 4);
    }

    #[test]
    fn oversized_grid_is_clamped() {
        let mut sheet = SpriteSheet::new(1, 1, u32::MAX, 2);
        assert_eq!(sheet.frame_count(), u32::MAX);
        sheet.set_frame(u32::MAX - 1);
        assert_eq!(sheet.source_rect().x, u32::MAX - 1);
        sheet.next_frame();
        assert_eq!(sheet.frame(), 0);
    }

    #[test]
    fn scaled_draw_size() {
        let sprite = Sprite::new(EntityId::next(), SpriteSheet::new(10, 6, 1, 1)).scale(2.0);
        assert_eq!(sprite.draw_size(), (20.0, 12.0));
    }
}
