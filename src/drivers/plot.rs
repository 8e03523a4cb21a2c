use std::io::Cursor;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use plotters::prelude::LineSeries;
use plotters::prelude::*;
use crate::drivers::error::ScopeError;
use crate::drivers::TraceFrame;
#[derive(Clone, Debug)]
pub struct PlotStyle {
    pub width: u32,
    pub height: u32,
    pub background: RGBColor,
    pub palette: Vec<RGBColor>,
    /// Captions and axis labels need a system font; turn off for headless use.
    pub draw_labels: bool,
}
impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 600,
            background: RGBColor(0, 0, 0),
            palette: vec![RGBColor(0, 0, 255), RGBColor(0, 200, 200)],
            draw_labels: true,
        }
    }
}
/// Renders each frame as its own step-trace panel, stacked top to bottom.
pub fn render_trace_png(frames: &[TraceFrame], style: PlotStyle) -> Result<Vec<u8>, ScopeError> {
    if frames.is_empty() {
        return Err(ScopeError::Plot("no trace frames to render".into()));
    }
    if style.palette.is_empty() {
        return Err(ScopeError::Plot("plot palette is empty".into()));
    }
    let mut buffer = vec![0u8; (style.width * style.height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (style.width, style.height))
            .into_drawing_area();
        root.fill(&style.background)?;
        let panels = root.split_evenly((frames.len(), 1));
        for (idx, (panel, frame)) in panels.iter().zip(frames).enumerate() {
            let color = style.palette[idx % style.palette.len()];
            let x_min = frame.x.first().copied().unwrap_or(0) as f64;
            let x_max = (frame.x.last().copied().unwrap_or(0) as f64).max(x_min + 1.0);
            let mut builder = ChartBuilder::on(panel);
            builder.margin(10);
            if style.draw_labels {
                builder
                    .caption(
                        format!("{} Graph", frame.channel),
                        ("sans-serif", 18).into_font().color(&WHITE),
                    )
                    .set_label_area_size(LabelAreaPosition::Left, 40)
                    .set_label_area_size(LabelAreaPosition::Bottom, 30);
            }
            let mut chart = builder.build_cartesian_2d(x_min..x_max, 0f64..1.5f64)?;
            if style.draw_labels {
                chart
                    .configure_mesh()
                    .light_line_style(&WHITE.mix(0.1))
                    .x_desc("Time")
                    .y_desc("Bit")
                    .draw()?;
            }
            if frame.is_empty() {
                continue;
            }
            chart.draw_series(LineSeries::new(
                frame.points().into_iter().map(|[x, y]| (x, y)),
                &color,
            ))?;
        }
        root.present()?;
    }
    encode_png(&buffer, style.width, style.height)
}
fn encode_png(buffer: &[u8], width: u32, height: u32) -> Result<Vec<u8>, ScopeError> {
    let image = ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, buffer.to_vec())
        .ok_or_else(|| ScopeError::Plot("failed to allocate image buffer".into()))?;
    let mut output = Vec::new();
    let dynamic = DynamicImage::ImageRgb8(image);
    dynamic.write_to(&mut Cursor::new(&mut output), ImageFormat::Png)?;
    Ok(output)
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::{Bit, BitTraceBuffer, Channel};
    fn headless() -> PlotStyle {
        PlotStyle {
            width: 320,
            height: 200,
            draw_labels: false,
            ..PlotStyle::default()
        }
    }
    #[test]
    fn renders_png_for_both_channels() {
        let mut one = BitTraceBuffer::zeroed(8);
        let mut two = BitTraceBuffer::zeroed(4);
        for bit in [Bit::High, Bit::Low, Bit::High] {
            one.append(bit);
            two.append(bit);
        }
        let frames = [one.snapshot(Channel::One), two.snapshot(Channel::Two)];
        let png = render_trace_png(&frames, headless()).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }
    #[test]
    fn empty_window_leaves_blank_panel() {
        let frames = [
            BitTraceBuffer::zeroed(0).snapshot(Channel::One),
            BitTraceBuffer::zeroed(4).snapshot(Channel::Two),
        ];
        let png = render_trace_png(&frames, headless()).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }
    #[test]
    fn empty_input_is_an_error() {
        assert!(matches!(
            render_trace_png(&[], headless()),
            Err(ScopeError::Plot(_))
        ));
    }
}
