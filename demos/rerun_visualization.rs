use anyhow::Result;
use covellipse::{
    stats::{
        analytic_level, density_levels, prune_lowest_density, standard_normal_pdf, BivariateNormal,
        SIGMA_MASSES,
    },
    Color, CovarianceSource, EllipseEstimator, EllipsePatch, EllipseRenderer, LineStyle,
    PatchStyle, PlotConfig,
};
use nalgebra as na;
use rand::SeedableRng;
use rand_pcg::Pcg64;
use rerun as rr;

/// Draws ellipse patches as closed line strips.
struct RerunRenderer<'a> {
    rec: &'a rr::RecordingStream,
    prefix: String,
    outline_points: usize,
    drawn: usize,
}

impl<'a> RerunRenderer<'a> {
    fn new(rec: &'a rr::RecordingStream, prefix: &str, outline_points: usize) -> Self {
        Self {
            rec,
            prefix: prefix.to_string(),
            outline_points,
            drawn: 0,
        }
    }
}

fn to_rr_color(color: Color, alpha: f32) -> rr::Color {
    let [r, g, b] = color.to_array();
    rr::Color::from_unmultiplied_rgba(r, g, b, (alpha.clamp(0.0, 1.0) * 255.0) as u8)
}

impl EllipseRenderer<f64> for RerunRenderer<'_> {
    type Error = rr::RecordingStreamError;

    fn draw_ellipse(
        &mut self,
        patch: &EllipsePatch<f64>,
        style: &PatchStyle,
    ) -> Result<(), Self::Error> {
        let mut outline = patch.outline(self.outline_points);
        if let Some(first) = outline.first().copied() {
            outline.push(first);
        }
        let strip = rr::components::LineStrip2D::from(
            outline.iter().map(|p| [p.x as f32, p.y as f32]),
        );

        // Line strips cannot be filled, so the face color only stands in for a missing edge
        let color = style.edge_color.or(style.face_color).unwrap_or(Color::BLACK);
        let radius: f32 = match style.line_style {
            LineStyle::Solid => 0.02,
            LineStyle::Dashed | LineStyle::DashDot | LineStyle::Dotted => 0.01,
        };

        let mut strips = rr::LineStrips2D::new([strip])
            .with_colors([to_rr_color(color, style.alpha)])
            .with_radii([radius])
            .with_draw_order(style.z_order as f32);
        if let Some(label) = &style.label {
            strips = strips.with_labels([label.as_str()]);
        }

        let path = format!("{}/ellipse_{}", self.prefix, self.drawn);
        self.drawn += 1;
        self.rec.log(path, &strips)
    }
}

fn circle(radius: f64, n: usize) -> rr::components::LineStrip2D {
    rr::components::LineStrip2D::from((0..=n).map(|i| {
        let t = i as f64 / n as f64 * std::f64::consts::TAU;
        [(radius * t.cos()) as f32, (radius * t.sin()) as f32]
    }))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let config = PlotConfig::default();
    let rec = rr::RecordingStreamBuilder::new("confidence_ellipses").spawn()?;
    let mut rng = Pcg64::seed_from_u64(2);
    let standard = BivariateNormal::standard();

    // σ contours of the true posterior, empirical next to closed form
    let z = standard.sample_cloud(&mut rng, 100_000);
    let densities = z.iter().map(|(x, y)| standard_normal_pdf(x, y)).collect::<Vec<_>>();
    let levels = density_levels(&densities, &SIGMA_MASSES)?;
    for ((mass, level), sigma) in SIGMA_MASSES.iter().zip(&levels).zip(1usize..) {
        tracing::info!(mass, level, analytic = analytic_level(*mass), "{sigma}σ level");
        // The standard normal density equals `level` on a circle of this radius
        let radius = (-2.0 * (level * 2.0 * std::f64::consts::PI).ln()).sqrt();
        rec.log(
            format!("posterior/sigma_{sigma}"),
            &rr::LineStrips2D::new([circle(radius, 200)])
                .with_colors([to_rr_color(config.palette_color(sigma - 1), 1.0)])
                .with_labels([format!("{sigma}σ")]),
        )?;
    }

    // Live points: drop the two least likely draws, then add a hand-placed outlier
    let live = standard.sample_cloud(&mut rng, 101);
    let live = prune_lowest_density(live, 2, standard_normal_pdf).with_points([(-3.3, 1.0)]);
    rec.log(
        "live_points",
        &rr::Points2D::new(live.iter().map(|(x, y)| [x as f32, y as f32]))
            .with_colors([rr::Color::from_rgb(255, 0, 0)])
            .with_radii([0.03f32]),
    )?;

    let mut renderer = RerunRenderer::new(&rec, "ellipses", config.outline_points);

    let preset = EllipseEstimator::default().with_n_std(config.n_std);
    let posterior = EllipseEstimator::default()
        .with_source(CovarianceSource::Sample)
        .with_n_std(3.4)
        .estimate_cloud(&z);
    posterior.draw(
        &mut renderer,
        &PatchStyle::default()
            .with_face_color(Color::BLUE)
            .with_alpha(0.2),
    )?;

    let large = preset
        .clone()
        .with_source(CovarianceSource::LargePreset)
        .estimate_cloud(&live);
    large.draw(
        &mut renderer,
        &PatchStyle::default()
            .with_edge_color(Color::ORANGE)
            .with_line_style(LineStyle::DashDot)
            .with_label("MultiNest expanded ellipse"),
    )?;

    let small = preset.estimate_cloud(&live);
    small.draw(
        &mut renderer,
        &PatchStyle::default()
            .with_edge_color(Color::RED)
            .with_line_style(LineStyle::Dashed)
            .with_label("MultiNest ellipse"),
    )?;

    let resolved = small.resolve()?;
    rec.log(
        "ellipses/small_axes",
        &rr::Arrows2D::from_vectors([
            [
                (resolved.semi_major * resolved.rotation.cos()) as f32,
                (resolved.semi_major * resolved.rotation.sin()) as f32,
            ],
            [
                (-resolved.semi_minor * resolved.rotation.sin()) as f32,
                (resolved.semi_minor * resolved.rotation.cos()) as f32,
            ],
        ])
        .with_origins([[resolved.center.x as f32, resolved.center.y as f32]; 2])
        .with_labels(["semi-major", "semi-minor"]),
    )?;

    let mean = live.mean().unwrap_or_else(na::Point2::origin);
    tracing::info!(?mean, "live point mean, ignored by the ellipses");

    Ok(())
}
