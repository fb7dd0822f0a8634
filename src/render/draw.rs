//! Card compositor: turns a [`RenderRequest`] into an ordered sequence of surface calls.

use tracing::debug;

use crate::assets::color::Color;
use crate::card::model::{BorderSpec, EdgeGeometry, GradientStop, RenderRequest, TemplateImage, TextBlock};
use crate::foundation::error::{CardError, CardResult};
use crate::layout::wrap::{TextPlacement, draw_wrapped_text};
use crate::render::path::clamp_corner_radius;
use crate::render::surface::{Surface, TextAlign, TextBaseline};

/// Draw one card onto `surface`.
///
/// Stages run in a fixed order: rounded frame and clip, background color, background gradient,
/// template image, borders (top, right, bottom, left), text blocks, guides. The rounded clip is
/// left installed for the rest of the surface's life.
pub fn draw<S: Surface + ?Sized>(surface: &mut S, req: &RenderRequest) -> CardResult<()> {
    let (w, h) = (req.canvas.w(), req.canvas.h());

    surface.set_text_baseline(TextBaseline::Top);

    if let Some(rb) = &req.rounded_border {
        debug!(width = rb.width, radius = rb.radius, "rounded border");
        fill_solid(surface, rb.color, 0.0, 0.0, w, h)?;
        paint_gradient(surface, rb.gradient.as_deref(), 0.0, 0.0, w, h)?;
        round_rect_clip(
            surface,
            rb.width,
            rb.width,
            w - 2.0 * rb.width,
            h - 2.0 * rb.width,
            rb.radius,
        )?;
    }

    fill_solid(surface, req.background_color, 0.0, 0.0, w, h)?;
    paint_gradient(surface, req.background_gradient.as_deref(), 0.0, 0.0, w, h)?;

    match &req.template_image {
        Some(TemplateImage::Decoded(image)) => {
            debug!(width = image.width, height = image.height, "template image");
            surface.draw_image(image, 0.0, 0.0)?;
        }
        Some(TemplateImage::Unresolved(path)) => {
            return Err(CardError::missing_template(format!(
                "'{}' was not decoded before drawing",
                path.display()
            )));
        }
        None => {}
    }

    let edges = [
        (Edge::Top, &req.borders.top),
        (Edge::Right, &req.borders.right),
        (Edge::Bottom, &req.borders.bottom),
        (Edge::Left, &req.borders.left),
    ];
    for (edge, border) in edges {
        if let Some(border) = border {
            paint_border(surface, edge, border, w, h, req.edge_geometry)?;
        }
    }

    for block in &req.texts {
        draw_text_block(surface, block, w, h, req.text_placement)?;
    }

    if req.guides {
        surface.set_fill_style(Color::LIME.into());
        surface.fill_rect(0.0, h / 2.0, w, 1.0)?;
        surface.fill_rect(w / 2.0, 0.0, 1.0, h)?;
    }

    Ok(())
}

/// Clip all later drawing to a rounded rectangle.
///
/// The radius is clamped to half of the width, then to half of the height. The clip is not
/// released here.
pub fn round_rect_clip<S: Surface + ?Sized>(
    surface: &mut S,
    x: f64,
    y: f64,
    w: f64,
    h: f64,
    r: f64,
) -> CardResult<()> {
    let r = clamp_corner_radius(w, h, r);
    surface.begin_path();
    surface.move_to(x + r, y);
    surface.arc_to(x + w, y, x + w, y + h, r)?;
    surface.arc_to(x + w, y + h, x, y + h, r)?;
    surface.arc_to(x, y + h, x, y, r)?;
    surface.arc_to(x, y, x + w, y, r)?;
    surface.close_path();
    surface.clip()
}

/// Fill `(x, y, w, h)` with a linear gradient built from `stops`.
///
/// The gradient vector runs from `(x, y)` to `(w, h)`, not to `(x + w, y + h)`; border bands
/// depend on that. `None` draws nothing.
pub fn paint_gradient<S: Surface + ?Sized>(
    surface: &mut S,
    stops: Option<&[GradientStop]>,
    x: f64,
    y: f64,
    w: f64,
    h: f64,
) -> CardResult<()> {
    let Some(stops) = stops else {
        return Ok(());
    };
    let mut gradient = surface.create_linear_gradient(x, y, w, h);
    for stop in stops {
        gradient.add_color_stop(stop.offset, stop.color)?;
    }
    surface.set_fill_style(gradient.into());
    surface.fill_rect(x, y, w, h)
}

fn fill_solid<S: Surface + ?Sized>(
    surface: &mut S,
    color: Option<Color>,
    x: f64,
    y: f64,
    w: f64,
    h: f64,
) -> CardResult<()> {
    let Some(color) = color else {
        return Ok(());
    };
    surface.set_fill_style(color.into());
    surface.fill_rect(x, y, w, h)
}

#[derive(Clone, Copy, Debug)]
enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

/// `(x, y, w, h)` passed to both the solid fill and the gradient painter.
fn band(edge: Edge, width: f64, w: f64, h: f64, geometry: EdgeGeometry) -> (f64, f64, f64, f64) {
    match (edge, geometry) {
        (Edge::Top, EdgeGeometry::Compat) => (0.0, 0.0, w, width),
        (Edge::Right, EdgeGeometry::Compat) => (w - width, 0.0, w - width, h),
        (Edge::Bottom, EdgeGeometry::Compat) => (0.0, h - width, w, h - width),
        (Edge::Left, EdgeGeometry::Compat) => (0.0, 0.0, width, h),
        (Edge::Top, EdgeGeometry::Corrected) => (0.0, 0.0, w, width),
        (Edge::Right, EdgeGeometry::Corrected) => (w - width, 0.0, width, h),
        (Edge::Bottom, EdgeGeometry::Corrected) => (0.0, h - width, w, width),
        (Edge::Left, EdgeGeometry::Corrected) => (0.0, 0.0, width, h),
    }
}

fn paint_border<S: Surface + ?Sized>(
    surface: &mut S,
    edge: Edge,
    border: &BorderSpec,
    w: f64,
    h: f64,
    geometry: EdgeGeometry,
) -> CardResult<()> {
    let (x, y, bw, bh) = band(edge, border.width, w, h, geometry);
    debug!(?edge, x, y, w = bw, h = bh, "border band");
    fill_solid(surface, border.color, x, y, bw, bh)?;

    let Some(stops) = border.gradient.as_deref() else {
        return Ok(());
    };
    match geometry {
        EdgeGeometry::Compat => paint_gradient(surface, Some(stops), x, y, bw, bh),
        EdgeGeometry::Corrected => {
            let mut gradient = surface.create_linear_gradient(x, y, x + bw, y + bh);
            for stop in stops {
                gradient.add_color_stop(stop.offset, stop.color)?;
            }
            surface.set_fill_style(gradient.into());
            surface.fill_rect(x, y, bw, bh)
        }
    }
}

fn draw_text_block<S: Surface + ?Sized>(
    surface: &mut S,
    block: &TextBlock,
    w: f64,
    h: f64,
    placement: TextPlacement,
) -> CardResult<()> {
    surface.set_fill_style(block.color.into());
    surface.set_font(&block.font);

    let y = block.y.resolve(h);
    let x = resolve_text_x(surface, block, w, placement)?;

    let layout = draw_wrapped_text(
        surface,
        &block.text,
        x,
        y,
        block.max_width,
        block.line_height,
        placement,
    )?;
    debug!(lines = layout.lines.len(), x, y, "text block");
    Ok(())
}

/// Set the text alignment for `block` and return the x anchor its lines are drawn at.
pub(crate) fn resolve_text_x<S: Surface + ?Sized>(
    surface: &mut S,
    block: &TextBlock,
    w: f64,
    placement: TextPlacement,
) -> CardResult<f64> {
    match (placement, block.x.is_centered()) {
        (TextPlacement::Centered, true) => {
            surface.set_text_align(TextAlign::Center);
            Ok(w / 2.0)
        }
        (TextPlacement::Legacy, true) => {
            surface.set_text_align(TextAlign::Left);
            Ok(w / 2.0 - surface.measure_text(&block.text)?.width / 2.0)
        }
        (_, false) => {
            surface.set_text_align(TextAlign::Left);
            Ok(block.x.resolve(w))
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/draw.rs"]
mod tests;
