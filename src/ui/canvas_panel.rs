use crate::processing::encoding;
use crate::processing::reconcile::CanvasObject;
use crate::processing::transform::{CanvasTransform, CANVAS_H, CANVAS_PAD, CANVAS_W};
use crate::state::table::{StateTable, FONT_RANGE, WIDTH_RANGE};
use crate::state::theme::Theme;

/// The drawing surface: a persistent object list plus the transform that
/// placed it. Objects echo back through reconciliation every frame; the
/// list is only rebuilt when the app confirms the stored table moved.
pub struct CanvasSurface {
    pub objects: Vec<CanvasObject>,
    pub transform: CanvasTransform,
    pub needs_rebuild: bool,
}

impl CanvasSurface {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            transform: CanvasTransform::new(1.0, 1.0, CANVAS_W, CANVAS_H, CANVAS_PAD),
            needs_rebuild: true,
        }
    }

    /// Regenerate the object list from the working table, windowing the
    /// transform around the table's current value range.
    pub fn rebuild(&mut self, table: &StateTable) {
        self.transform = CanvasTransform::from_table(table);
        self.objects = table
            .records
            .iter()
            .map(|r| {
                let (left, top) = self.transform.forward(r.x, r.y);
                CanvasObject {
                    id: r.label.clone(),
                    text: r.label.clone(),
                    left,
                    top,
                    font_size: r.font_px,
                    scale_x: 1.0,
                    scale_y: 1.0,
                    width: r.width_px,
                }
            })
            .collect();
        self.needs_rebuild = false;
    }
}

impl Default for CanvasSurface {
    fn default() -> Self {
        Self::new()
    }
}

pub fn show_canvas(
    ui: &mut egui::Ui,
    surface: &mut CanvasSurface,
    table: &StateTable,
    theme: &Theme,
) {
    if surface.needs_rebuild {
        surface.rebuild(table);
    }

    egui::ScrollArea::both().show(ui, |ui| {
        let desired = egui::vec2(CANVAS_W as f32, CANVAS_H as f32);
        let (canvas_rect, _) = ui.allocate_exact_size(desired, egui::Sense::hover());
        let painter = ui.painter_at(canvas_rect);
        painter.rect_filled(canvas_rect, egui::CornerRadius::ZERO, theme.surface_bg());

        draw_axes(&painter, canvas_rect, &surface.transform, table, theme);

        for (i, obj) in surface.objects.iter_mut().enumerate() {
            let color = encoding::label_color(i);
            let font = (obj.font_size * obj.scale_x.max(obj.scale_y))
                .clamp(FONT_RANGE.0, FONT_RANGE.1) as f32;
            let wrap =
                (obj.width * obj.scale_x).clamp(WIDTH_RANGE.0, WIDTH_RANGE.1) as f32;

            let galley = painter.layout(
                obj.text.clone(),
                egui::FontId::proportional(font),
                color,
                wrap,
            );
            let center =
                canvas_rect.min + egui::vec2(obj.left as f32, obj.top as f32);
            let rect = egui::Rect::from_center_size(center, galley.size());

            let id = ui.id().with("quadrant_label").with(&obj.id);
            let response = ui.interact(rect.expand(3.0), id, egui::Sense::click_and_drag());
            if response.dragged() {
                let delta = response.drag_delta();
                obj.left += delta.x as f64;
                obj.top += delta.y as f64;
            }
            if response.hovered() || response.dragged() {
                painter.rect_stroke(
                    rect.expand(3.0),
                    egui::CornerRadius::same(2),
                    egui::Stroke::new(1.0, theme.axis_color()),
                    egui::StrokeKind::Outside,
                );
                let scroll = ui.input(|i| i.smooth_scroll_delta.y);
                if scroll != 0.0 {
                    let factor = (1.0 + scroll as f64 * 0.002).clamp(0.5, 2.0);
                    let widen_only = ui.input(|i| i.modifiers.shift);
                    obj.scale_x *= factor;
                    if !widen_only {
                        obj.scale_y *= factor;
                    }
                }
            }

            painter.galley(rect.min, galley, color);
        }
    });

    ui.label(
        egui::RichText::new(
            "Drag a label to reposition it. Scroll over a label to resize, Shift+scroll to change its width.",
        )
        .weak(),
    );
}

fn draw_axes(
    painter: &egui::Painter,
    canvas_rect: egui::Rect,
    transform: &CanvasTransform,
    table: &StateTable,
    theme: &Theme,
) {
    let origin = canvas_rect.min;
    let at = |x: f64, y: f64| origin + egui::vec2(x as f32, y as f32);
    let x0 = transform.x_to_px(0.0);
    let y0 = transform.y_to_px(0.0);
    let pad = transform.pad;
    let (w, h) = (transform.width, transform.height);
    let axis_stroke = egui::Stroke::new(1.0, theme.axis_color());

    // Dashed zero axes.
    painter.extend(egui::Shape::dashed_line(
        &[at(pad, y0), at(w - pad, y0)],
        axis_stroke,
        6.0,
        4.0,
    ));
    painter.extend(egui::Shape::dashed_line(
        &[at(x0, pad), at(x0, h - pad)],
        axis_stroke,
        6.0,
        4.0,
    ));

    // Axis captions at both ends.
    let caption = egui::FontId::proportional(10.0);
    let caption_color = theme.caption_color();
    painter.text(
        at(pad, y0 + 10.0),
        egui::Align2::LEFT_TOP,
        &table.x_label,
        caption.clone(),
        caption_color,
    );
    painter.text(
        at(w - pad, y0 + 10.0),
        egui::Align2::RIGHT_TOP,
        &table.x_label,
        caption.clone(),
        caption_color,
    );
    painter.text(
        at(x0 + 10.0, pad),
        egui::Align2::LEFT_TOP,
        &table.y_label,
        caption.clone(),
        caption_color,
    );
    painter.text(
        at(x0 + 10.0, h - pad),
        egui::Align2::LEFT_BOTTOM,
        &table.y_label,
        caption,
        caption_color,
    );

    // Tick marks at tenths of the half-range, numbered every other tick.
    let tick_stroke = egui::Stroke::new(1.0, theme.tick_color());
    let tick_font = egui::FontId::proportional(9.0);
    for t in -10_i32..=10 {
        let x_px = transform.x_to_px(t as f64 / 10.0 * transform.half_x);
        painter.line_segment([at(x_px, y0 - 4.0), at(x_px, y0 + 4.0)], tick_stroke);
        if t % 2 == 0 {
            painter.text(
                at(x_px, y0 + 14.0),
                egui::Align2::CENTER_TOP,
                t.to_string(),
                tick_font.clone(),
                caption_color,
            );
        }

        let y_px = transform.y_to_px(t as f64 / 10.0 * transform.half_y);
        painter.line_segment([at(x0 - 4.0, y_px), at(x0 + 4.0, y_px)], tick_stroke);
        if t % 2 == 0 {
            painter.text(
                at(x0 - 8.0, y_px),
                egui::Align2::RIGHT_CENTER,
                t.to_string(),
                tick_font.clone(),
                caption_color,
            );
        }
    }
}
