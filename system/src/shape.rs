use euclid::default::Point2D;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Point = Point2D<f32>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);
    pub const STICKY_YELLOW: Color = Color::new(0xFF, 0xF5, 0x9D);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// A finished drawing on the shared canvas.
///
/// Objects are immutable once they reach the shape log. While a gesture is in
/// progress the authoring client keeps mutating its own copy and only
/// publishes the final value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum DrawableObject {
    FreehandStroke {
        points: Vec<Point>,
        stroke: Color,
        stroke_width: f32,
    },
    EraserStroke {
        points: Vec<Point>,
        stroke_width: f32,
    },
    Rectangle {
        origin: Point,
        width: f32,
        height: f32,
        stroke: Color,
        stroke_width: f32,
        /// `None` is a transparent fill.
        fill: Option<Color>,
    },
    Ellipse {
        center: Point,
        radius_x: f32,
        radius_y: f32,
        stroke: Color,
        stroke_width: f32,
        fill: Option<Color>,
    },
    Arrow {
        start: Point,
        end: Point,
        stroke: Color,
        stroke_width: f32,
    },
    StraightLine {
        start: Point,
        end: Point,
        stroke: Color,
        stroke_width: f32,
    },
    Text {
        origin: Point,
        text: String,
        font_size: f32,
        fill: Color,
    },
    StickyNote {
        origin: Point,
        width: f32,
        height: f32,
        text: String,
        fill: Color,
    },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShapeError {
    #[error("{kind} has a non-finite coordinate or size")]
    NonFinite { kind: &'static str },
    #[error("{kind} stroke has no points")]
    EmptyStroke { kind: &'static str },
    #[error("{kind} stroke width must be positive, got {width}")]
    NonPositiveStrokeWidth { kind: &'static str, width: f32 },
    #[error("font size must be positive, got {0}")]
    NonPositiveFontSize(f32),
    #[error("{kind} has empty text")]
    EmptyText { kind: &'static str },
}

impl DrawableObject {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::FreehandStroke { .. } => "freehand-stroke",
            Self::EraserStroke { .. } => "eraser-stroke",
            Self::Rectangle { .. } => "rectangle",
            Self::Ellipse { .. } => "ellipse",
            Self::Arrow { .. } => "arrow",
            Self::StraightLine { .. } => "straight-line",
            Self::Text { .. } => "text",
            Self::StickyNote { .. } => "sticky-note",
        }
    }

    /// Checks that the object is structurally complete and may be published.
    pub fn validate(&self) -> Result<(), ShapeError> {
        let kind = self.kind();
        let finite = |values: &[f32]| values.iter().all(|v| v.is_finite());
        let finite_point = |p: &Point| p.x.is_finite() && p.y.is_finite();
        let check_finite = |ok: bool| if ok { Ok(()) } else { Err(ShapeError::NonFinite { kind }) };
        let check_stroke_width = |width: f32| {
            if width > 0.0 {
                Ok(())
            } else {
                Err(ShapeError::NonPositiveStrokeWidth { kind, width })
            }
        };
        let check_text = |text: &str| {
            if text.trim().is_empty() {
                Err(ShapeError::EmptyText { kind })
            } else {
                Ok(())
            }
        };

        match self {
            Self::FreehandStroke {
                points,
                stroke_width,
                ..
            }
            | Self::EraserStroke {
                points,
                stroke_width,
            } => {
                if points.is_empty() {
                    return Err(ShapeError::EmptyStroke { kind });
                }
                check_finite(points.iter().all(finite_point) && stroke_width.is_finite())?;
                check_stroke_width(*stroke_width)
            }
            Self::Rectangle {
                origin,
                width,
                height,
                stroke_width,
                ..
            } => {
                check_finite(finite_point(origin) && finite(&[*width, *height, *stroke_width]))?;
                check_stroke_width(*stroke_width)
            }
            Self::Ellipse {
                center,
                radius_x,
                radius_y,
                stroke_width,
                ..
            } => {
                check_finite(
                    finite_point(center) && finite(&[*radius_x, *radius_y, *stroke_width]),
                )?;
                check_stroke_width(*stroke_width)
            }
            Self::Arrow {
                start,
                end,
                stroke_width,
                ..
            }
            | Self::StraightLine {
                start,
                end,
                stroke_width,
                ..
            } => {
                check_finite(finite_point(start) && finite_point(end) && stroke_width.is_finite())?;
                check_stroke_width(*stroke_width)
            }
            Self::Text {
                origin,
                text,
                font_size,
                ..
            } => {
                check_finite(finite_point(origin) && font_size.is_finite())?;
                if *font_size <= 0.0 {
                    return Err(ShapeError::NonPositiveFontSize(*font_size));
                }
                check_text(text)
            }
            Self::StickyNote {
                origin,
                width,
                height,
                text,
                ..
            } => {
                check_finite(finite_point(origin) && finite(&[*width, *height]))?;
                check_text(text)
            }
        }
    }
}
