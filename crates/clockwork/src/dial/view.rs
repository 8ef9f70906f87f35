use super::model::SegmentedDial;
use super::{
    BORDER_WIDTH, CENTER_DOT_RADIUS, LABEL_RADIUS_FACTOR, OVERLAY_MIN_SIZE, OVERLAY_SIZE_FACTOR,
    START_ANGLE, WEDGE_OUTLINE_WIDTH, segment_span,
};
use crate::color::Rgb;
use crate::geometry::Point;
use serde::Serialize;

/// One pie slice. Angles are degrees counter-clockwise from +x; `sweep_angle` is negative
/// because wedges run clockwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Wedge {
    pub index: usize,
    pub start_angle: f64,
    pub sweep_angle: f64,
    pub filled: bool,
    /// Fill color when filled, the background otherwise.
    pub color: Rgb,
    pub outline: Rgb,
    pub outline_width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Spoke {
    pub from: Point,
    pub to: Point,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DialLabel {
    pub index: usize,
    pub position: Point,
    pub text: String,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Border {
    pub center: Point,
    pub radius: f64,
    pub width: f64,
    pub color: Rgb,
}

/// Centered text drawn over the dial, e.g. a countdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overlay {
    pub position: Point,
    pub text: String,
    pub color: Rgb,
    pub size: f64,
}

/// Everything a host needs to paint a dial, in draw order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DialRenderModel {
    pub title: String,
    pub center: Point,
    pub radius: f64,
    pub background: Rgb,
    pub foreground: Rgb,
    pub wedges: Vec<Wedge>,
    pub spokes: Vec<Spoke>,
    pub border: Border,
    pub center_dot: f64,
    pub labels: Vec<DialLabel>,
    pub overlay: Option<Overlay>,
}

impl DialRenderModel {
    pub fn with_overlay(mut self, text: impl Into<String>, color: Rgb) -> Self {
        self.overlay = Some(Overlay {
            position: self.center,
            text: text.into(),
            color,
            size: (self.radius * OVERLAY_SIZE_FACTOR).floor().max(OVERLAY_MIN_SIZE),
        });
        self
    }
}

pub fn render(dial: &SegmentedDial, center: Point, radius: f64) -> DialRenderModel {
    let colors = dial.theme().colors();
    let span = segment_span(dial.segment_count());
    let start = |i: usize| START_ANGLE - i as f64 * span;

    let wedges = dial
        .filled()
        .iter()
        .enumerate()
        .map(|(i, &filled)| Wedge {
            index: i,
            start_angle: start(i),
            sweep_angle: -span,
            filled,
            color: if filled {
                dial.fill_color()
            } else {
                colors.background
            },
            outline: colors.outline,
            outline_width: WEDGE_OUTLINE_WIDTH,
        })
        .collect();

    let spokes = (0..dial.segment_count())
        .map(|i| Spoke {
            from: center,
            to: center.polar(radius, start(i)),
            color: colors.foreground,
        })
        .collect();

    let labels = if dial.show_labels() {
        dial.labels()
            .iter()
            .zip(dial.filled())
            .enumerate()
            .filter_map(|(i, (text, &filled))| {
                let text = text.trim();
                (!text.is_empty()).then(|| DialLabel {
                    index: i,
                    position: center.polar(radius * LABEL_RADIUS_FACTOR, start(i) - span / 2.0),
                    text: text.to_string(),
                    color: if filled {
                        dial.fill_color().contrast_text()
                    } else {
                        colors.foreground
                    },
                })
            })
            .collect()
    } else {
        Vec::new()
    };

    DialRenderModel {
        title: dial.title().to_string(),
        center,
        radius,
        background: colors.background,
        foreground: colors.foreground,
        wedges,
        spokes,
        border: Border {
            center,
            radius,
            width: BORDER_WIDTH,
            color: colors.foreground,
        },
        center_dot: CENTER_DOT_RADIUS,
        labels,
        overlay: None,
    }
}

impl SegmentedDial {
    pub fn render_model(&self, center: Point, radius: f64) -> DialRenderModel {
        render(self, center, radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::Theme;

    #[test]
    fn test_wedge_angles_run_clockwise_from_top() {
        let dial = SegmentedDial::new(4, 1).unwrap();
        let model = dial.render_model(Point::new(0.0, 0.0), 10.0);
        let starts: Vec<f64> = model.wedges.iter().map(|w| w.start_angle).collect();
        assert_eq!(starts, vec![90.0, 0.0, -90.0, -180.0]);
        assert!(model.wedges.iter().all(|w| w.sweep_angle == -90.0));
        assert!(model.wedges[0].filled);
        assert_eq!(model.wedges[0].color, Rgb::black());
        assert_eq!(model.wedges[1].color, Rgb::white());
        assert_eq!(model.spokes.len(), 4);
    }

    #[test]
    fn test_label_position_and_contrast() {
        let mut dial = SegmentedDial::new(4, 1).unwrap();
        dial.set_label(0, "A").unwrap();
        dial.set_label(1, "B").unwrap();
        dial.set_label(2, "   ").unwrap();

        let hidden = dial.render_model(Point::new(0.0, 0.0), 100.0);
        assert!(hidden.labels.is_empty());

        dial.set_show_labels(true);
        let model = dial.render_model(Point::new(0.0, 0.0), 100.0);
        assert_eq!(model.labels.len(), 2);

        // wedge 0 spans 90..0 degrees, so its label sits at 45 degrees
        let a = &model.labels[0];
        let expected = 60.0 * std::f64::consts::FRAC_1_SQRT_2;
        assert!((a.position.x - expected).abs() < 1e-9);
        assert!((a.position.y + expected).abs() < 1e-9);
        // filled with black, so white text
        assert_eq!(a.color, Rgb::white());
        // unfilled uses the light theme foreground
        assert_eq!(model.labels[1].color, Rgb::black());
    }

    #[test]
    fn test_dark_theme_colors() {
        let dial = SegmentedDial::new(6, 0).unwrap().with_theme(Theme::Dark);
        let model = dial.render_model(Point::new(5.0, 5.0), 4.0);
        assert_eq!(model.background, Rgb::black());
        assert_eq!(model.border.color, Rgb::white());
        assert_eq!(model.wedges[0].color, Rgb::black());
    }

    #[test]
    fn test_overlay_size_floor() {
        let dial = SegmentedDial::new(4, 0).unwrap();
        let model = dial
            .render_model(Point::new(0.0, 0.0), 20.0)
            .with_overlay("00:01:00", Rgb::black());
        assert_eq!(model.overlay.unwrap().size, OVERLAY_MIN_SIZE);
    }
}
