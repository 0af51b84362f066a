//! Recording surface
//!
//! A [`DrawSurface`] that records every call as a [`DrawCommand`] instead of
//! rasterizing. Drawing commands carry the translation and alpha in effect
//! when they were issued, so tests can assert on final placement without a
//! real backend.

use serde::Serialize;

use crate::{Color, DrawSurface, ImageRef, Point, Rect, Size, TextStyle};

/// Translation and alpha in effect for a drawing command
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SurfaceState {
    pub translation: Point,
    pub alpha: f32,
}

impl Default for SurfaceState {
    fn default() -> Self {
        Self {
            translation: Point::ZERO,
            alpha: 1.0,
        }
    }
}

/// A single recorded surface call
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    // State
    Save,
    Restore,
    Translate {
        dx: f32,
        dy: f32,
    },
    MultiplyAlpha {
        alpha: f32,
    },

    // Drawing
    ClearRect {
        rect: Rect,
    },
    FillRect {
        rect: Rect,
        color: Color,
        state: SurfaceState,
    },
    FillText {
        text: String,
        origin: Point,
        style: TextStyle,
        state: SurfaceState,
    },
    DrawImage {
        key: String,
        src: Rect,
        dst: Rect,
        state: SurfaceState,
    },
}

impl DrawCommand {
    /// Whether this command puts pixels on the surface
    pub fn is_draw(&self) -> bool {
        matches!(
            self,
            DrawCommand::FillRect { .. } | DrawCommand::FillText { .. } | DrawCommand::DrawImage { .. }
        )
    }
}

/// Records drawing commands for later inspection or replay
#[derive(Debug)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
    state_stack: Vec<SurfaceState>,
    viewport: Size,
}

impl RecordingSurface {
    /// Create a new recording surface
    pub fn new(viewport: Size) -> Self {
        Self {
            commands: Vec::new(),
            state_stack: vec![SurfaceState::default()],
            viewport,
        }
    }

    /// Get the recorded commands
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Take the recorded commands
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Number of commands that put pixels on the surface
    pub fn draw_count(&self) -> usize {
        self.commands.iter().filter(|c| c.is_draw()).count()
    }

    /// Text runs drawn so far, in order
    pub fn drawn_text(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Current save depth (0 when balanced)
    pub fn depth(&self) -> usize {
        self.state_stack.len() - 1
    }

    /// State currently in effect
    pub fn current_state(&self) -> SurfaceState {
        self.state_stack.last().copied().unwrap_or_default()
    }

    /// Clear all recorded commands and reset state
    pub fn clear(&mut self) {
        self.commands.clear();
        self.state_stack = vec![SurfaceState::default()];
    }

    fn state_mut(&mut self) -> &mut SurfaceState {
        if self.state_stack.is_empty() {
            self.state_stack.push(SurfaceState::default());
        }
        let last = self.state_stack.len() - 1;
        &mut self.state_stack[last]
    }
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new(Size::ZERO)
    }
}

impl DrawSurface for RecordingSurface {
    fn viewport_size(&self) -> Size {
        self.viewport
    }

    fn save(&mut self) {
        self.commands.push(DrawCommand::Save);
        let state = self.current_state();
        self.state_stack.push(state);
    }

    fn restore(&mut self) {
        self.commands.push(DrawCommand::Restore);
        if self.state_stack.len() > 1 {
            self.state_stack.pop();
        } else {
            tracing::warn!("RecordingSurface::restore called without matching save");
        }
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.commands.push(DrawCommand::Translate { dx, dy });
        let state = self.state_mut();
        state.translation = Point::new(state.translation.x + dx, state.translation.y + dy);
    }

    fn multiply_alpha(&mut self, alpha: f32) {
        self.commands.push(DrawCommand::MultiplyAlpha { alpha });
        self.state_mut().alpha *= alpha;
    }

    fn clear_rect(&mut self, rect: Rect) {
        self.commands.push(DrawCommand::ClearRect { rect });
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let state = self.current_state();
        self.commands.push(DrawCommand::FillRect { rect, color, state });
    }

    fn fill_text(&mut self, text: &str, origin: Point, style: &TextStyle) {
        let state = self.current_state();
        self.commands.push(DrawCommand::FillText {
            text: text.to_string(),
            origin,
            style: style.clone(),
            state,
        });
    }

    fn draw_image(&mut self, image: ImageRef<'_>, src: Rect, dst: Rect) {
        let state = self.current_state();
        self.commands.push(DrawCommand::DrawImage {
            key: image.key.to_string(),
            src,
            dst,
            state,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DrawSurfaceExt;

    #[test]
    fn test_fill_rect_records_state() {
        let mut surface = RecordingSurface::new(Size::new(800.0, 600.0));
        surface.fill_rect(Rect::new(10.0, 20.0, 100.0, 50.0), Color::BLUE);
        assert_eq!(surface.commands().len(), 1);
        assert_eq!(surface.draw_count(), 1);
    }

    #[test]
    fn test_scoped_restores_translation_and_alpha() {
        let mut surface = RecordingSurface::new(Size::new(800.0, 600.0));
        surface.scoped(|s| {
            s.translate(5.0, 7.0);
            s.multiply_alpha(0.5);
            s.scoped(|s| {
                s.multiply_alpha(0.5);
                s.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Color::RED);
            });
        });

        assert_eq!(surface.depth(), 0);
        assert_eq!(surface.current_state(), SurfaceState::default());

        let DrawCommand::FillRect { state, .. } = &surface.commands()[5] else {
            panic!("expected fill_rect, got {:?}", surface.commands()[5]);
        };
        assert_eq!(state.translation, Point::new(5.0, 7.0));
        assert_eq!(state.alpha, 0.25);
    }

    #[test]
    fn test_clear_is_not_a_draw() {
        let mut surface = RecordingSurface::new(Size::new(10.0, 10.0));
        surface.clear_rect(Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(surface.commands().len(), 1);
        assert_eq!(surface.draw_count(), 0);
    }

    #[test]
    fn test_drawn_text_in_order() {
        let mut surface = RecordingSurface::default();
        let style = TextStyle::new(16.0);
        surface.fill_text("a", Point::ZERO, &style);
        surface.fill_text("b", Point::ZERO, &style);
        assert_eq!(surface.drawn_text(), vec!["a", "b"]);
    }
}
