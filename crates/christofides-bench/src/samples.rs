//! Sample discovery on disk and synthetic instances.

use std::path::Path;

use christofides_pipeline::{AdjacencyMatrix, Sample};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{BenchError, Result};

/// Side length of the square random points are drawn from.
const RANDOM_EXTENT: f64 = 1000.0;

/// Load every `*.txt` file in `dir` as a sample.
///
/// Samples come back ordered by vertex count, then by file name.
pub fn load_samples(dir: &Path) -> Result<Vec<Sample>> {
    let entries = std::fs::read_dir(dir).map_err(|e| BenchError::io(dir, e))?;

    let mut samples = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| BenchError::io(dir, e))?.path();
        if !path.is_file() || path.extension().is_none_or(|ext| ext != "txt") {
            continue;
        }
        let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        let text = std::fs::read_to_string(&path).map_err(|e| BenchError::io(&path, e))?;
        let sample = Sample::parse(name, &text)?;
        log::debug!(
            "loaded {} ({} vertices, expected {:?})",
            sample.name,
            sample.vertex_count(),
            sample.expected_cost
        );
        samples.push(sample);
    }

    sort_samples(&mut samples);
    Ok(samples)
}

fn sort_samples(samples: &mut [Sample]) {
    samples.sort_by(|a, b| {
        a.vertex_count()
            .cmp(&b.vertex_count())
            .then_with(|| a.name.cmp(&b.name))
    });
}

/// Euclidean instance over `n` uniform points, reproducible from `seed`.
///
/// Random samples carry no expected cost.
pub fn random_sample(n: usize, seed: u64) -> Sample {
    let mut rng = StdRng::seed_from_u64(seed);
    let points: Vec<(f64, f64)> = (0..n)
        .map(|_| {
            (
                rng.gen_range(0.0..RANDOM_EXTENT),
                rng.gen_range(0.0..RANDOM_EXTENT),
            )
        })
        .collect();
    let matrix = AdjacencyMatrix::from_fn(n, |i, j| {
        let (xi, yi) = points[i];
        let (xj, yj) = points[j];
        (xi - xj).hypot(yi - yj)
    });
    Sample {
        name: format!("random{n}_seed{seed}"),
        matrix,
        expected_cost: None,
    }
}
