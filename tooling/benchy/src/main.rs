use clap::{Parser, ValueEnum};
use microbench_host::{ConfigBuilder, Optimization, Value};
use std::path::PathBuf;

mod bench;
mod eval;
mod variant;
mod workload;

use variant::Variant;
use workload::Workload;

const ENV_DEBUG: &str = "DEBUG";

#[derive(ValueEnum, Copy, Clone, Debug, Eq, PartialEq)]
enum OptLevel {
    None,
    Speed,
    SpeedAndSize,
}

impl From<OptLevel> for Optimization {
    fn from(level: OptLevel) -> Self {
        match level {
            OptLevel::None => Optimization::None,
            OptLevel::Speed => Optimization::Speed,
            OptLevel::SpeedAndSize => Optimization::SpeedAndSize,
        }
    }
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Workload size: 0 only compiles, 1-5 shrink or grow the workload (3 is the default size)
    #[arg(env = "VARIANT", default_value = "3")]
    variant: Variant,
    #[arg(long, env = "WORKLOAD", default_value = "fib")]
    workload: Workload,
    /// Benchmark a module file instead of a built-in workload
    #[arg(short, long, env = "FILE", conflicts_with = "workload")]
    file: Option<PathBuf>,
    /// Export to call in the module file
    #[arg(short, long, env = "EXPORT", requires = "file")]
    export: Option<String>,
    /// Argument for the export, as `<type>:<value>` or a bare i32/f64 literal
    #[arg(short = 'a', long = "arg", requires = "file", allow_hyphen_values = true)]
    args: Vec<Value>,
    /// Value the first call must return
    #[arg(long, requires = "file", allow_hyphen_values = true)]
    expect: Option<Value>,
    #[arg(short, long, env = "WARMUP", default_value = "0")]
    warmup: u32,
    #[arg(short, long, env = "ITERATIONS", default_value = "1")]
    iters: u32,
    /// Directory to write raw samples and a summary to
    #[arg(short, long, env = "OUTPUT")]
    output: Option<PathBuf>,
    #[arg(long, env = "OPT_LEVEL", default_value = "speed")]
    opt_level: OptLevel,
    #[arg(long, env = "PARALLEL_COMPILATION", default_value_t = false)]
    parallel_compilation: bool,
    /// List the built-in workloads and exit
    #[arg(long, default_value_t = false)]
    list: bool,
    #[arg(short, long, env = ENV_DEBUG, default_value_t = false)]
    debug: bool,
}

fn validate(args: &Args) -> anyhow::Result<()> {
    if let Some(file) = &args.file {
        if !file.is_file() {
            return Err(anyhow::anyhow!(
                "Provided path is not a file: {}",
                file.display()
            ));
        }
        if args.variant != Variant::CompileOnly && args.export.is_none() {
            return Err(anyhow::anyhow!("--export is required when running a file"));
        }
    }

    if let Some(output) = &args.output {
        if args.variant == Variant::CompileOnly {
            return Err(anyhow::anyhow!(
                "--output needs run samples, variant 0 only compiles"
            ));
        }
        if output.exists() && !output.is_dir() {
            return Err(anyhow::anyhow!(
                "Provided output path is not a directory: {}",
                output.display()
            ));
        }
    }

    Ok(())
}

/// The `compile:`, `run:` and `result:` lines printed after a run.
fn report_lines(compile: f64, run: Option<(f64, &[Value])>) -> Vec<String> {
    let mut lines = vec![format!("compile: {compile:.3} ms")];
    if let Some((mean, returned)) = run {
        let result = returned.iter().map(Value::to_string).collect::<Vec<_>>();
        lines.push(format!("run: {mean:.3} ms"));
        lines.push(format!("result: {}", result.join(", ")));
    }
    lines
}

fn list() {
    for w in Workload::value_variants() {
        let (base, step) = w.base_and_step();
        let sizes = Variant::ALL
            .iter()
            .filter_map(|v| v.size(base, step).map(|s| format!("{v}={s}")))
            .collect::<Vec<_>>();
        println!("{:<18} {:<14} {}", w.name(), w.export(), sizes.join(" "));
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // logging
    let mut log_builder = env_logger::Builder::from_default_env();
    match args.debug {
        true => log_builder.filter_level(log::LevelFilter::Debug),
        false => log_builder.filter_level(log::LevelFilter::Info),
    }
    .init();

    if args.list {
        list();
        return Ok(());
    }

    validate(&args)?;

    let engine = ConfigBuilder::new()
        .optimization(args.opt_level.into())
        .parallel_compilation(args.parallel_compilation)
        .build()
        .engine()?;

    let report = match (&args.file, args.variant) {
        (Some(path), Variant::CompileOnly) => bench::startup::file(&engine, path)?,
        (Some(path), _) => bench::exec::file(
            &engine,
            path,
            args.export.as_deref().unwrap_or_default(),
            args.args.clone(),
            args.expect,
            args.warmup,
            args.iters,
        )?,
        (None, variant) => {
            let (base, step) = args.workload.base_and_step();
            match variant.size(base, step) {
                Some(size) => bench::exec::workload(
                    &engine,
                    args.workload,
                    size,
                    args.warmup,
                    args.iters,
                )?,
                None => bench::startup::workload(&engine, args.workload)?,
            }
        }
    };

    let compile = report.compile.as_secs_f64() * 1000.0;
    let run = report.run.as_ref().map(|r| (r.mean(), r.returned()));
    for line in report_lines(compile, run) {
        println!("{line}");
    }

    let Some(run) = report.run else {
        return Ok(());
    };

    let samples = eval::Samples::new(run.durations())?;
    let summary = samples.summary(compile);
    if run.iterations() > 1 {
        println!(
            "min {:.3} ms, max {:.3} ms, median {:.3} ms, std {:.3} ms",
            summary.min, summary.max, summary.median, summary.std
        );
    }

    if let Some(mut output) = args.output {
        output.push(report.label);
        eval::eval(&output, &samples, &summary)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["benchy"]).unwrap();
        assert_eq!(args.variant, Variant::Default);
        assert_eq!(args.workload, Workload::Fib);
        assert_eq!(args.iters, 1);
        assert!(args.file.is_none());
    }

    #[test]
    fn variant_is_positional() {
        let args = Args::try_parse_from(["benchy", "5", "--workload", "dot-split"]).unwrap();
        assert_eq!(args.variant, Variant::Largest);
        assert_eq!(args.workload, Workload::DotSplit);

        assert!(Args::try_parse_from(["benchy", "6"]).is_err());
    }

    #[test]
    fn file_arguments() {
        let args = Args::try_parse_from([
            "benchy", "--file", "fib.wasm", "-e", "fib", "-a", "10", "--expect", "55",
        ])
        .unwrap();
        assert_eq!(args.export.as_deref(), Some("fib"));
        assert_eq!(args.args, vec![Value::I32(10)]);
        assert_eq!(args.expect, Some(Value::I32(55)));

        assert!(Args::try_parse_from(["benchy", "-a", "10"]).is_err());
    }

    #[test]
    fn output_requires_a_run() {
        let dir = std::env::temp_dir();
        let dir = dir.to_str().unwrap();

        let args = Args::try_parse_from(["benchy", "0", "--output", dir]).unwrap();
        assert!(validate(&args).is_err());

        let args = Args::try_parse_from(["benchy", "3", "--output", dir]).unwrap();
        assert!(validate(&args).is_ok());
    }

    #[test]
    fn printed_lines() {
        assert_eq!(report_lines(1.23456, None), vec!["compile: 1.235 ms"]);

        let returned = [Value::I32(55)];
        assert_eq!(
            report_lines(0.5, Some((2.0, &returned))),
            vec!["compile: 0.500 ms", "run: 2.000 ms", "result: 55"]
        );
    }
}
