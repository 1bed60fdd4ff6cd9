use covellipse::{compute_ellipse, CovarianceSource, EllipseEstimator, PointCloud};

fn main() -> Result<(), covellipse::Error> {
    tracing_subscriber::fmt::init();

    let cloud = PointCloud::from_points([(0.3, -1.2), (1.1, 0.4), (-0.9, 0.8), (2.0, 1.5)]);

    // Preset ellipses ignore the points
    let small = compute_ellipse(&cloud, false, false, 3.0)?;
    let large = compute_ellipse(&cloud, false, true, 3.0)?;
    let sampled = EllipseEstimator::default()
        .with_source(CovarianceSource::Sample)
        .with_n_std(3.4)
        .estimate(cloud.x(), cloud.y())?;

    for (name, ellipse) in [("small", small), ("large", large), ("sample", sampled)] {
        println!("{name}: {ellipse:?}");
        let resolved = ellipse.resolve()?;
        println!(
            "  drawn as a={:.4}, b={:.4}, θ={:.4} rad",
            resolved.semi_major, resolved.semi_minor, resolved.rotation
        );
    }

    Ok(())
}
