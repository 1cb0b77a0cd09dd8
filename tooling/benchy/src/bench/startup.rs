use crate::bench::exec::label;
use crate::bench::{Report, prepare};
use crate::workload::Workload;
use microbench_host::{Engine, Source};
use std::path::Path;

/// Compile and instantiate a workload without calling it.
pub fn workload(engine: &Engine, workload: Workload) -> anyhow::Result<Report> {
    println!("Workload: {} (compile only)", workload.name());
    let prepared = prepare(engine, workload.dependency(), workload.source())?;

    Ok(Report {
        label: format!("{}-compile", workload.name()),
        compile: prepared.compile,
        run: None,
    })
}

pub fn file(engine: &Engine, path: &Path) -> anyhow::Result<Report> {
    println!("Executable: {} (compile only)", path.display());
    let prepared = prepare(engine, None, Source::from(path))?;

    Ok(Report {
        label: format!("{}-compile", label(path)),
        compile: prepared.compile,
        run: None,
    })
}
