use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const FILE_RAW: &str = "raw.csv";
const FILE_SUMMARY: &str = "summary.json";

#[derive(Serialize, Debug, PartialEq)]
pub struct Summary {
    pub iterations: usize,
    pub compile: f64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub var: f64,
    pub std: f64,
}

/// Durations in milliseconds of one run.
pub struct Samples<'a>(&'a [f64]);

impl<'a> Samples<'a> {
    pub fn new(slice: &'a [f64]) -> anyhow::Result<Self> {
        if slice.is_empty() {
            return Err(anyhow::anyhow!("No values to evaluate"));
        }
        if slice.iter().any(|x| x.is_nan()) {
            return Err(anyhow::anyhow!("Samples contain NaN"));
        }

        Ok(Self(slice))
    }

    fn min(&self) -> f64 {
        self.0.iter().copied().fold(f64::INFINITY, f64::min)
    }

    fn max(&self) -> f64 {
        self.0.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    fn mean(&self) -> f64 {
        self.0.iter().sum::<f64>() / self.0.len() as f64
    }

    /// Sample variance; zero for a single sample.
    fn var(&self, mean: f64) -> f64 {
        let len = self.0.len();
        if len < 2 {
            return 0.0;
        }

        let sum = self.0.iter().map(|&x| (x - mean).powi(2)).sum::<f64>();
        sum / (len - 1) as f64
    }

    fn median(&self) -> f64 {
        let mut v = self.0.to_vec();
        v.sort_by(f64::total_cmp);
        let mid = v.len() / 2;

        if v.len() % 2 == 0 {
            (v[mid] + v[mid - 1]) / 2.0
        } else {
            v[mid]
        }
    }

    pub fn summary(&self, compile: f64) -> Summary {
        let mean = self.mean();
        let var = self.var(mean);

        Summary {
            iterations: self.0.len(),
            compile,
            min: self.min(),
            max: self.max(),
            mean,
            median: self.median(),
            var,
            std: var.sqrt(),
        }
    }
}

/// Write raw samples and their summary into `directory`.
pub fn eval(directory: &Path, samples: &Samples, summary: &Summary) -> anyhow::Result<()> {
    println!("Writing results to {}", directory.display());
    std::fs::create_dir_all(directory)?;

    write_raw(directory, samples)?;
    write_summary(directory, summary)?;
    Ok(())
}

fn write_summary(path: &Path, summary: &Summary) -> anyhow::Result<()> {
    let file = File::create(path.join(FILE_SUMMARY))?;
    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, summary)?;
    Ok(())
}

/// Write the raw data to file
fn write_raw(path: &Path, samples: &Samples) -> anyhow::Result<()> {
    let file = File::create(path.join(FILE_RAW))?;
    let mut writer = BufWriter::new(file);

    for s in samples.0.iter() {
        writeln!(writer, "{}", s)?;
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_of_even_count() {
        let data = [4.0, 1.0, 3.0, 2.0];
        let summary = Samples::new(&data).unwrap().summary(0.5);

        assert_eq!(summary.iterations, 4);
        assert_eq!(summary.compile, 0.5);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 4.0);
        assert_eq!(summary.mean, 2.5);
        assert_eq!(summary.median, 2.5);
        assert!((summary.var - 5.0 / 3.0).abs() < 1e-12);
        assert!((summary.std - (5.0f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn single_sample() {
        let summary = Samples::new(&[7.0]).unwrap().summary(1.0);
        assert_eq!(summary.median, 7.0);
        assert_eq!(summary.var, 0.0);
        assert_eq!(summary.std, 0.0);
    }

    #[test]
    fn rejects_empty_and_nan() {
        assert!(Samples::new(&[]).is_err());
        assert!(Samples::new(&[1.0, f64::NAN]).is_err());
    }

    #[test]
    fn writes_files() {
        let dir = std::env::temp_dir().join(format!("benchy-eval-{}", std::process::id()));
        let data = [1.0, 2.0];
        let samples = Samples::new(&data).unwrap();
        let summary = samples.summary(0.1);

        eval(&dir, &samples, &summary).unwrap();
        let raw = std::fs::read_to_string(dir.join(FILE_RAW)).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(dir.join(FILE_SUMMARY)).unwrap())
                .unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        assert_eq!(raw, "1\n2\n");
        assert_eq!(json["iterations"], 2);
        assert_eq!(json["mean"], 1.5);
    }
}
