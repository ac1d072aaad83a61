//! Drawing the prepared chart data as SVG with plotters

use std::error::Error;
use std::ops::Range;
use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::algorithm::statistics::CorrelationMatrix;
use crate::algorithm::statistics::descriptive::BoxStats;
use crate::models::Variable;
use crate::viz::data::{DensityCurve, Facet, ScatterSeries, StackedBar};

type Area<'a> = DrawingArea<SVGBackend<'a>, Shift>;
type DrawResult = Result<(), Box<dyn Error>>;

const FONT: &str = "sans-serif";
const MALE: RGBColor = RGBColor(31, 119, 180);
const FEMALE: RGBColor = RGBColor(214, 39, 40);
const PEDIATRIC: RGBColor = RGBColor(44, 160, 44);
const ADULT: RGBColor = RGBColor(148, 103, 189);
const BOX_FILL: RGBColor = RGBColor(158, 202, 225);
const DIABETES_YES: RGBColor = RGBColor(203, 24, 29);
const DIABETES_NO: RGBColor = RGBColor(107, 174, 214);
const HISTOGRAM_FILL: RGBColor = RGBColor(100, 149, 237);
const MISSING: RGBColor = RGBColor(200, 200, 200);
const POINTS: RGBColor = RGBColor(31, 119, 180);

/// Fixed colour of a group label
fn group_color(label: &str) -> RGBColor {
    match label {
        "Male" => MALE,
        "Female" => FEMALE,
        "Pediatric" => PEDIATRIC,
        "Adult" => ADULT,
        "Yes" => DIABETES_YES,
        "No" => DIABETES_NO,
        _ => BLACK,
    }
}

/// Blue-white-red colour for a correlation in `[-1, 1]`
#[must_use]
pub fn diverging_color(r: f64) -> RGBColor {
    const BLUE_END: (f64, f64, f64) = (59.0, 76.0, 192.0);
    const MIDDLE: (f64, f64, f64) = (247.0, 247.0, 247.0);
    const RED_END: (f64, f64, f64) = (180.0, 4.0, 38.0);

    if r.is_nan() {
        return MISSING;
    }
    let r = r.clamp(-1.0, 1.0);
    let (from, to, t) = if r < 0.0 {
        (MIDDLE, BLUE_END, -r)
    } else {
        (MIDDLE, RED_END, r)
    };
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let channel = |a: f64, b: f64| (a + (b - a) * t).round() as u8;
    RGBColor(
        channel(from.0, to.0),
        channel(from.1, to.1),
        channel(from.2, to.2),
    )
}

/// Data range widened by 5% on each side; `0..1` when there is no data
fn padded_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if lo > hi {
        return 0.0..1.0;
    }
    let pad = if hi > lo { (hi - lo) * 0.05 } else { 1.0 };
    (lo - pad)..(hi + pad)
}

/// Float axis with category `i` centred on `i`
#[allow(clippy::cast_precision_loss)]
fn category_axis(n: usize) -> Range<f64> {
    -0.5..(n as f64 - 0.5)
}

/// Label of the category at an axis tick; ticks between categories stay blank
fn category_label(labels: &[&str], value: f64) -> String {
    if (value - value.round()).abs() > 1e-6 || value < -0.5 {
        return String::new();
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let index = value.round() as usize;
    labels.get(index).map(ToString::to_string).unwrap_or_default()
}

fn draw_density(area: &Area<'_>, curves: &[DensityCurve]) -> DrawResult {
    let x_range = padded_range(curves.iter().flat_map(|c| c.points.iter().map(|p| p.0)));
    let y_max = curves
        .iter()
        .flat_map(|c| c.points.iter().map(|p| p.1))
        .fold(0.0_f64, f64::max);
    let y_top = if y_max > 0.0 { y_max * 1.05 } else { 1.0 };

    let mut chart = ChartBuilder::on(area)
        .caption("BMI density by sex", (FONT, 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, 0.0..y_top)?;
    chart
        .configure_mesh()
        .x_desc(Variable::Bmi.label())
        .y_desc("Density")
        .draw()?;

    for curve in curves {
        let color = group_color(curve.label);
        chart
            .draw_series(LineSeries::new(curve.points.iter().copied(), color.stroke_width(2)))?
            .label(curve.label)
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
            });
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    Ok(())
}

fn draw_scatter(
    area: &Area<'_>,
    title: &str,
    x_variable: Variable,
    y_variable: Variable,
    series: &[ScatterSeries],
) -> DrawResult {
    let x_range = padded_range(series.iter().flat_map(|s| s.points.iter().map(|p| p.0)));
    let y_range = padded_range(series.iter().flat_map(|s| s.points.iter().map(|p| p.1)));

    let mut chart = ChartBuilder::on(area)
        .caption(title, (FONT, 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, y_range)?;
    chart
        .configure_mesh()
        .x_desc(x_variable.label())
        .y_desc(y_variable.label())
        .draw()?;

    for s in series {
        let color = if series.len() == 1 {
            POINTS
        } else {
            group_color(s.label)
        };
        chart
            .draw_series(
                s.points
                    .iter()
                    .map(|&(x, y)| Circle::new((x, y), 2, color.mix(0.5).filled())),
            )?
            .label(s.label)
            .legend(move |(x, y)| Circle::new((x + 10, y), 4, color.filled()));

        if let Some((intercept, slope)) = s.line {
            let (lo, hi) = s
                .points
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                    (lo.min(p.0), hi.max(p.0))
                });
            chart.draw_series(LineSeries::new(
                [lo, hi].map(|x| (x, intercept + slope * x)),
                color.stroke_width(2),
            ))?;
        }
    }

    if series.len() > 1 {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }
    Ok(())
}

/// BMI density by sex next to protein against cholesterol
pub fn overview(path: &Path, densities: &[DensityCurve], scatter: &ScatterSeries) -> DrawResult {
    let root = SVGBackend::new(path, (1400, 560)).into_drawing_area();
    root.fill(&WHITE)?;
    let panels = root.split_evenly((1, 2));
    draw_density(&panels[0], densities)?;
    draw_scatter(
        &panels[1],
        "Protein intake vs total cholesterol",
        Variable::Protein,
        Variable::Cholesterol,
        std::slice::from_ref(scatter),
    )?;
    root.present()?;
    Ok(())
}

/// Sugar against glucose, one colour and fitted line per age group
pub fn glucose_sugar(path: &Path, series: &[ScatterSeries]) -> DrawResult {
    let root = SVGBackend::new(path, (900, 600)).into_drawing_area();
    root.fill(&WHITE)?;
    draw_scatter(
        &root,
        "Sugar intake vs fasting glucose by age group",
        Variable::Sugar,
        Variable::Glucose,
        series,
    )?;
    root.present()?;
    Ok(())
}

/// Annotated correlation heatmap, first variable in the top row
pub fn correlation_heatmap(path: &Path, matrix: &CorrelationMatrix) -> DrawResult {
    let root = SVGBackend::new(path, (800, 720)).into_drawing_area();
    root.fill(&WHITE)?;

    let names: Vec<&str> = matrix.variables.iter().map(|v| v.name()).collect();
    let k = i32::try_from(names.len())?;
    let label = |value: &SegmentValue<i32>, flip: bool| match value {
        SegmentValue::CenterOf(i) => {
            let index = if flip { k - 1 - i } else { *i };
            usize::try_from(index)
                .ok()
                .and_then(|i| names.get(i))
                .map(ToString::to_string)
                .unwrap_or_default()
        }
        _ => String::new(),
    };

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Correlation matrix (n = {})", matrix.n),
            (FONT, 22),
        )
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(100)
        .build_cartesian_2d((0..k).into_segmented(), (0..k).into_segmented())?;
    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(names.len())
        .y_labels(names.len())
        .x_label_formatter(&|v| label(v, false))
        .y_label_formatter(&|v| label(v, true))
        .draw()?;

    let cells: Vec<(i32, i32, f64)> = (0..k)
        .flat_map(|i| (0..k).map(move |j| (i, j)))
        .filter_map(|(i, j)| {
            let row = matrix.values.get(usize::try_from(i).ok()?)?;
            Some((i, j, *row.get(usize::try_from(j).ok()?)?))
        })
        .collect();

    chart.draw_series(cells.iter().map(|&(i, j, r)| {
        let row = k - 1 - i;
        Rectangle::new(
            [
                (SegmentValue::Exact(j), SegmentValue::Exact(row)),
                (SegmentValue::Exact(j + 1), SegmentValue::Exact(row + 1)),
            ],
            diverging_color(r).filled(),
        )
    }))?;

    let text_style = (FONT, 16)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Center));
    chart.draw_series(cells.iter().map(|&(i, j, r)| {
        let text = if r.is_nan() {
            "NaN".to_string()
        } else {
            format!("{r:.2}")
        };
        Text::new(
            text,
            (SegmentValue::CenterOf(j), SegmentValue::CenterOf(k - 1 - i)),
            text_style.clone(),
        )
    }))?;

    root.present()?;
    Ok(())
}

/// Cholesterol box plot per BMI category
pub fn cholesterol_boxplot(
    path: &Path,
    boxes: &[(&'static str, Option<BoxStats>)],
) -> DrawResult {
    let root = SVGBackend::new(path, (900, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let labels: Vec<&str> = boxes.iter().map(|(label, _)| *label).collect();
    let x_range = category_axis(labels.len());
    let y_range = padded_range(
        boxes
            .iter()
            .filter_map(|(_, stats)| *stats)
            .flat_map(|b| [b.lower_whisker, b.upper_whisker]),
    );

    let mut chart = ChartBuilder::on(&root)
        .caption("Total cholesterol by BMI category", (FONT, 22))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(x_range, y_range)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(Variable::BmiCategory.label())
        .y_desc(Variable::Cholesterol.label())
        .x_labels(labels.len())
        .x_label_formatter(&|v| category_label(&labels, *v))
        .draw()?;

    for (index, (_, stats)) in boxes.iter().enumerate() {
        let Some(b) = stats else { continue };
        #[allow(clippy::cast_precision_loss)]
        let x = index as f64;
        let (left, right) = (x - 0.3, x + 0.3);

        chart.draw_series([
            Rectangle::new([(left, b.q1), (right, b.q3)], BOX_FILL.filled()),
            Rectangle::new([(left, b.q1), (right, b.q3)], BLACK.stroke_width(1)),
        ])?;
        chart.draw_series(
            [
                vec![(left, b.median), (right, b.median)],
                vec![(x, b.q3), (x, b.upper_whisker)],
                vec![(x, b.q1), (x, b.lower_whisker)],
                vec![(x - 0.12, b.upper_whisker), (x + 0.12, b.upper_whisker)],
                vec![(x - 0.12, b.lower_whisker), (x + 0.12, b.lower_whisker)],
            ]
            .into_iter()
            .map(|points| PathElement::new(points, BLACK.stroke_width(2))),
        )?;
    }

    root.present()?;
    Ok(())
}

/// Stacked percentage bars of diabetes status per socioeconomic category
pub fn diabetes_stacked(path: &Path, bars: &[StackedBar]) -> DrawResult {
    let root = SVGBackend::new(path, (900, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let labels: Vec<&str> = bars.iter().map(|b| b.label).collect();
    let x_range = category_axis(labels.len());

    let mut chart = ChartBuilder::on(&root)
        .caption("Diabetes status by socioeconomic category", (FONT, 22))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, 0.0..100.0)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(Variable::SesCategory.label())
        .y_desc("Percent of category")
        .x_labels(labels.len())
        .x_label_formatter(&|v| category_label(&labels, *v))
        .draw()?;

    let levels: Vec<&'static str> = bars
        .first()
        .map(|b| b.segments.iter().map(|(level, _)| *level).collect())
        .unwrap_or_default();

    for (level_index, level) in levels.iter().enumerate() {
        let color = group_color(level);
        let rectangles: Vec<Rectangle<(f64, f64)>> = bars
            .iter()
            .enumerate()
            .filter(|(_, bar)| bar.total > 0)
            .map(|(index, bar)| {
                let below: f64 = bar.segments[..level_index].iter().map(|(_, p)| p).sum();
                let height = bar.segments.get(level_index).map_or(0.0, |(_, p)| *p);
                #[allow(clippy::cast_precision_loss)]
                let x = index as f64;
                Rectangle::new([(x - 0.35, below), (x + 0.35, below + height)], color.filled())
            })
            .collect();
        chart
            .draw_series(rectangles)?
            .label(format!("Diabetes: {level}"))
            .legend(move |(x, y)| {
                Rectangle::new([(x, y - 5), (x + 15, y + 5)], color.filled())
            });
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.9))
        .border_style(BLACK)
        .draw()?;
    root.present()?;
    Ok(())
}

/// Glucose histograms in an age group x sex grid with shared axes
pub fn glucose_histograms(path: &Path, facets: &[Facet]) -> DrawResult {
    let root = SVGBackend::new(path, (1100, 800)).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled("Fasting glucose by age group and sex", (FONT, 24))?;

    let columns = facets
        .iter()
        .map(|f| f.sex)
        .fold(Vec::<&str>::new(), |mut seen, sex| {
            if !seen.contains(&sex) {
                seen.push(sex);
            }
            seen
        })
        .len()
        .max(1);
    let rows = facets.len().div_ceil(columns).max(1);
    let panels = root.split_evenly((rows, columns));

    let y_max = facets
        .iter()
        .map(|f| f.histogram.max_count())
        .max()
        .unwrap_or(0);
    #[allow(clippy::cast_precision_loss)]
    let y_top = (y_max.max(1) as f64) * 1.1;

    for (facet, panel) in facets.iter().zip(panels.iter()) {
        let h = &facet.histogram;
        #[allow(clippy::cast_precision_loss)]
        let end = h.start + h.width * h.counts.len() as f64;

        let mut chart = ChartBuilder::on(panel)
            .caption(format!("{} / {}", facet.age_group, facet.sex), (FONT, 18))
            .margin(10)
            .x_label_area_size(35)
            .y_label_area_size(45)
            .build_cartesian_2d(h.start..end, 0.0..y_top)?;
        chart
            .configure_mesh()
            .x_desc(Variable::Glucose.label())
            .y_desc("Count")
            .draw()?;

        chart.draw_series(h.counts.iter().enumerate().map(|(bin, count)| {
            #[allow(clippy::cast_precision_loss)]
            let x0 = h.start + h.width * bin as f64;
            #[allow(clippy::cast_precision_loss)]
            let top = *count as f64;
            Rectangle::new([(x0, 0.0), (x0 + h.width, top)], HISTOGRAM_FILL.filled())
        }))?;
    }

    root.present()?;
    Ok(())
}
