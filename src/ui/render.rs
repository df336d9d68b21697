use tiny_skia::{Paint, Color, Rect, Transform, PixmapMut, PathBuilder, Stroke};
use cosmic_text::{Attrs, Buffer, FontSystem, Metrics, SwashCache};
use crate::config::ThemeConfig;
use crate::launch::{LaunchSurface, Severity};
use crate::state::AppState;

const ITEM_HEIGHT: f32 = 30.0;
const SEARCH_HEIGHT: f32 = 20.0;
const STATUS_HEIGHT: f32 = 36.0;

/// Which slice of the filtered list is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListWindow {
    pub scroll_offset: usize,
    pub visible_items: usize,
}

impl ListWindow {
    pub fn compute(theme: &ThemeConfig, height: f32, total_items: usize, selected_index: usize) -> Self {
        let list_start_y = list_start_y(theme);
        let available = height - list_start_y - theme.padding - STATUS_HEIGHT;
        let visible_items = (available / ITEM_HEIGHT).max(0.0) as usize;

        let scroll_offset = if total_items <= visible_items {
            0
        } else if selected_index < visible_items / 2 {
            0
        } else if selected_index >= total_items - visible_items / 2 {
            total_items.saturating_sub(visible_items)
        } else {
            selected_index - visible_items / 2
        };

        Self { scroll_offset, visible_items }
    }
}

fn list_start_y(theme: &ThemeConfig) -> f32 {
    theme.padding + SEARCH_HEIGHT + theme.spacing
}

pub struct Renderer {
    font_system: FontSystem,
    swash_cache: SwashCache,
    theme: ThemeConfig,
}

impl Renderer {
    pub fn new(theme: ThemeConfig) -> Self {
        Self {
            font_system: FontSystem::new(),
            swash_cache: SwashCache::new(),
            theme,
        }
    }

    pub fn theme(&self) -> &ThemeConfig {
        &self.theme
    }

    pub fn draw<S: LaunchSurface>(&mut self, pixmap: &mut PixmapMut, state: &AppState<S>) {
        let theme = self.theme.clone();
        let bg_color = ThemeConfig::parse_color(&theme.background);
        let border_color = ThemeConfig::parse_color(&theme.border_color);
        let text_color = ThemeConfig::parse_color(&theme.text);
        let placeholder_color = ThemeConfig::parse_color(&theme.placeholder);
        let sel_bg_color = ThemeConfig::parse_color(&theme.selection_background);
        let sel_text_color = ThemeConfig::parse_color(&theme.selection_text);
        let num_color = ThemeConfig::parse_color(&theme.number_color);

        pixmap.fill(Color::TRANSPARENT);

        let width = pixmap.width() as f32;
        let height = pixmap.height() as f32;

        if let Some(rect) = Rect::from_xywh(0.0, 0.0, width, height) {
            self.draw_rounded_rect(pixmap, rect, theme.border_radius, bg_color, Some(border_color));
        }

        let search_y = theme.padding;
        let (search_text, search_color) = if state.query.is_empty() {
            ("Search settings...".to_string(), placeholder_color)
        } else {
            (format!("> {}", state.query), text_color)
        };
        self.draw_text(pixmap, &search_text, theme.padding, search_y, 20.0, search_color);

        let list_start_y = list_start_y(&theme);
        let window = ListWindow::compute(&theme, height, state.filtered.len(), state.selected_index);

        for (i, label) in state.filtered.iter().enumerate().skip(window.scroll_offset).take(window.visible_items) {
            let relative_index = i - window.scroll_offset;
            let y = list_start_y + (relative_index as f32 * ITEM_HEIGHT);

            let mut current_text_color = text_color;

            if i == state.selected_index {
                if let Some(sel_rect) = Rect::from_xywh(theme.padding / 2.0, y, width - theme.padding, ITEM_HEIGHT) {
                    self.draw_rounded_rect(pixmap, sel_rect, theme.border_radius / 2.0, sel_bg_color, None);
                }
                current_text_color = sel_text_color;
            }

            let mut text_x = theme.padding;
            if relative_index < 9 {
                let nr_text = format!("{}. ", relative_index + 1);
                self.draw_text(pixmap, &nr_text, theme.padding, y + (ITEM_HEIGHT - 16.0) / 2.0, 14.0, num_color);
                text_x += 20.0;
            }

            self.draw_text(pixmap, label, text_x, y + (ITEM_HEIGHT - 16.0) / 2.0, 16.0, current_text_color);
        }

        if state.filtered.is_empty() {
            self.draw_text(pixmap, "No results found", theme.padding, list_start_y, 16.0, placeholder_color);
        }

        let status_y = height - theme.padding - STATUS_HEIGHT + theme.spacing;
        match &state.status {
            Some(status) => {
                let color = match status.severity {
                    Severity::Warning => ThemeConfig::parse_color(&theme.warning_color),
                    Severity::Error => ThemeConfig::parse_color(&theme.error_color),
                };
                let text = format!("{}: {}", status.title, status.text);
                self.draw_text(pixmap, &text, theme.padding, status_y, 13.0, color);
            }
            None => {
                let hint = "Enter or Alt+1..9 to launch, Esc to close";
                self.draw_text(pixmap, hint, theme.padding, status_y, 12.0, placeholder_color);
            }
        }
    }

    fn draw_rounded_rect(&self, pixmap: &mut PixmapMut, rect: Rect, radius: f32, fill: Color, stroke: Option<Color>) {
        let mut pb = PathBuilder::new();
        let x = rect.left();
        let y = rect.top();
        let w = rect.width();
        let h = rect.height();

        pb.move_to(x + radius, y);
        pb.line_to(x + w - radius, y);
        pb.quad_to(x + w, y, x + w, y + radius);
        pb.line_to(x + w, y + h - radius);
        pb.quad_to(x + w, y + h, x + w - radius, y + h);
        pb.line_to(x + radius, y + h);
        pb.quad_to(x, y + h, x, y + h - radius);
        pb.line_to(x, y + radius);
        pb.quad_to(x, y, x + radius, y);
        pb.close();

        if let Some(path) = pb.finish() {
            let mut paint = Paint::default();
            paint.set_color(fill);
            paint.anti_alias = true;
            pixmap.fill_path(&path, &paint, tiny_skia::FillRule::Winding, Transform::identity(), None);

            if let Some(s_color) = stroke {
                let mut s_paint = Paint::default();
                s_paint.set_color(s_color);
                s_paint.anti_alias = true;
                let stroke_obj = Stroke { width: 1.5, ..Default::default() };
                pixmap.stroke_path(&path, &s_paint, &stroke_obj, Transform::identity(), None);
            }
        }
    }

    fn draw_text(&mut self, pixmap: &mut PixmapMut, text: &str, x: f32, y: f32, size: f32, color: Color) {
        let mut buffer = Buffer::new(&mut self.font_system, Metrics::new(size, size * 1.2));
        buffer.set_size(&mut self.font_system, Some(pixmap.width() as f32 - x - self.theme.padding), None);
        buffer.set_text(&mut self.font_system, text, Attrs::new(), cosmic_text::Shaping::Advanced);
        buffer.shape_until_scroll(&mut self.font_system, false);

        let text_color = cosmic_text::Color::rgba(
            (color.red() * 255.0) as u8,
            (color.green() * 255.0) as u8,
            (color.blue() * 255.0) as u8,
            (color.alpha() * 255.0) as u8,
        );

        buffer.draw(&mut self.font_system, &mut self.swash_cache, text_color, |draw_x, draw_y, w, h, color| {
            let draw_x = draw_x + x as i32;
            let draw_y = draw_y + y as i32;
            if w == 0 || h == 0 { return; }
            if draw_x >= 0 && draw_y >= 0 && draw_x < pixmap.width() as i32 && draw_y < pixmap.height() as i32 {
                let paint = Paint {
                    shader: tiny_skia::Shader::SolidColor(tiny_skia::Color::from_rgba8(color.r(), color.g(), color.b(), color.a())),
                    ..Paint::default()
                };
                if let Some(r) = Rect::from_xywh(draw_x as f32, draw_y as f32, w as f32, h as f32) {
                    pixmap.fill_rect(r, &paint, Transform::identity(), None);
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_lists_do_not_scroll() {
        let theme = ThemeConfig::default();
        let window = ListWindow::compute(&theme, 650.0, 3, 2);
        assert_eq!(window.scroll_offset, 0);
        assert!(window.visible_items >= 3);
    }

    #[test]
    fn long_lists_keep_selection_centred() {
        let theme = ThemeConfig::default();
        let window = ListWindow::compute(&theme, 650.0, 100, 50);
        assert_eq!(window.scroll_offset, 50 - window.visible_items / 2);

        let end = ListWindow::compute(&theme, 650.0, 100, 99);
        assert_eq!(end.scroll_offset, 100 - end.visible_items);
    }

    #[test]
    fn tiny_surface_shows_nothing() {
        let theme = ThemeConfig::default();
        let window = ListWindow::compute(&theme, 10.0, 5, 0);
        assert_eq!(window.visible_items, 0);
        assert_eq!(window.scroll_offset, 0);
    }
}
