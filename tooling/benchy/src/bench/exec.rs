use crate::bench::{Report, prepare, sample};
use crate::workload::Workload;
use microbench_host::{BenchmarkBuilder, Engine, Source, Value};
use std::path::Path;

/// Check a workload's known answer, then time it at `size`.
pub fn workload(
    engine: &Engine,
    workload: Workload,
    size: i32,
    warmup: u32,
    iters: u32,
) -> anyhow::Result<Report> {
    println!("Workload: {} ({}({size}))", workload.name(), workload.export());
    let mut prepared = prepare(engine, workload.dependency(), workload.source())?;

    if workload.needs_vectors() {
        let len = usize::try_from(size)?;
        for (index, values) in workload.vectors(len) {
            prepared
                .instantiator
                .write_f64s(&prepared.instance, "mem", index, &values)?;
        }
    }

    let (args, expected) = workload.sanity();
    let check = BenchmarkBuilder::new(workload.export())
        .args(args)
        .expect(expected)
        .build();
    sample(&mut prepared, &check)?;
    log::info!("sanity check passed: {}", expected);

    let bench = BenchmarkBuilder::new(workload.export())
        .args(workload.args(size))
        .warmup(warmup)
        .iterations(iters)
        .build();
    let run = sample(&mut prepared, &bench)?;

    Ok(Report {
        label: format!("{}-{size}", workload.name()),
        compile: prepared.compile,
        run: Some(run),
    })
}

/// Time an arbitrary export of a module file.
pub fn file(
    engine: &Engine,
    path: &Path,
    export: &str,
    args: Vec<Value>,
    expected: Option<Value>,
    warmup: u32,
    iters: u32,
) -> anyhow::Result<Report> {
    println!("Executable: {}", path.display());
    let mut prepared = prepare(engine, None, Source::from(path))?;

    let mut builder = BenchmarkBuilder::new(export)
        .args(args)
        .warmup(warmup)
        .iterations(iters);
    if let Some(expected) = expected {
        builder = builder.expect(expected);
    }
    let run = sample(&mut prepared, &builder.build())?;

    Ok(Report {
        label: label(path),
        compile: prepared.compile,
        run: Some(run),
    })
}

pub(crate) fn label(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| String::from("module"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::ValueEnum;
    use microbench_host::Config;

    fn small(workload: Workload) -> i32 {
        match workload {
            Workload::Idiv => 2,
            w if w.needs_vectors() => 20,
            _ => 15,
        }
    }

    #[test]
    fn every_workload_passes_its_sanity_check() {
        let engine = Config::default().engine().unwrap();
        for w in Workload::value_variants() {
            let report = workload(&engine, *w, small(*w), 0, 2)
                .unwrap_or_else(|err| panic!("{}: {err}", w.name()));
            let run = report.run.unwrap();
            assert_eq!(run.iterations(), 2, "{}", w.name());
            assert_eq!(run.returned().len(), 1, "{}", w.name());
        }
    }

    #[test]
    fn timed_run_uses_the_requested_size() {
        let engine = Config::default().engine().unwrap();

        let run = workload(&engine, Workload::Loop, 15, 0, 1).unwrap().run.unwrap();
        assert_eq!(run.returned(), &[Value::I32(15 * 21)]);

        let run = workload(&engine, Workload::Idiv, 2, 0, 1).unwrap().run.unwrap();
        // 1 / 2 + 3 / 2 + 5 / 2
        assert_eq!(run.returned(), &[Value::I32(3)]);

        let report = workload(&engine, Workload::Fib, 15, 1, 3).unwrap();
        assert_eq!(report.label, "fib-15");
        assert_eq!(report.run.unwrap().returned(), &[Value::I32(610)]);
    }
}
