//! Compare linear and log-space scoring as sequences grow.
//!
//! For each length the probe decodes the same observations twice and
//! reports wall time, RSS delta, the scores, and whether the linear score
//! has underflowed or the two decoders disagree on the path.

use std::env;
use std::time::Instant;

use sysinfo::{get_current_pid, ProcessRefreshKind, System};
use viterbi_dp::{Decoder, Decoding, Hmm, ZeroPathPolicy};

const LENGTHS: &[usize] = &[
    64, 128, 256, 512, 1024, 2048, 4096, 8192, 16384, 32768, 65536,
];

fn main() {
    let options = match Options::parse(env::args().skip(1)) {
        Ok(opts) => opts,
        Err(err) => {
            eprintln!("underflow_probe: {err}");
            Options::print_help();
            std::process::exit(2);
        }
    };

    let hmm = match demo_hmm() {
        Ok(hmm) => hmm,
        Err(err) => {
            eprintln!("underflow_probe: {err}");
            std::process::exit(1);
        }
    };
    let linear = Decoder::builder(&hmm)
        .with_zero_path(ZeroPathPolicy::FirstState)
        .build();
    let log = Decoder::builder(&hmm)
        .log_space()
        .with_zero_path(ZeroPathPolicy::FirstState)
        .build();

    let mut sys = System::new();
    let lengths: Vec<usize> = LENGTHS
        .iter()
        .copied()
        .filter(|&len| len <= options.max_len)
        .collect();
    let total = lengths.len();
    let mut rows = Vec::with_capacity(total);

    for (idx, &len) in lengths.iter().enumerate() {
        eprint!("[{}/{}] obs_len {}... ", idx + 1, total, len);
        let obs = cycling_observations(len);

        let (lin_m, lin_best) = measure(&mut sys, || linear.decode(&obs));
        let (log_m, log_best) = measure(&mut sys, || log.decode(&obs));
        let row = match (lin_best, log_best) {
            (Ok(lin), Ok(lg)) => Row::compare(len, lin_m, log_m, &lin, &lg),
            (Err(err), _) | (_, Err(err)) => Row::failed(len, lin_m, log_m, err.to_string()),
        };
        eprintln!("{}", row.status.label());
        rows.push(row);
    }

    if let Some(first) = rows.iter().find(|r| matches!(r.status, Status::Underflow)) {
        eprintln!("linear scoring underflows from obs_len {}", first.len);
    }

    options.format.write(&rows);
}

fn demo_hmm() -> viterbi_dp::Result<Hmm<&'static str, char>> {
    Hmm::from_dense(
        vec!["calm", "windy", "stormy"],
        vec!['s', 'c', 'r'],
        vec![0.5, 0.3, 0.2],
        vec![0.8, 0.15, 0.05, 0.2, 0.6, 0.2, 0.1, 0.3, 0.6],
        vec![0.7, 0.2, 0.1, 0.3, 0.5, 0.2, 0.1, 0.3, 0.6],
    )
}

fn cycling_observations(len: usize) -> Vec<char> {
    const PATTERN: &[char] = &['s', 's', 'c', 'r', 'r', 'c', 's', 'c'];
    (0..len).map(|i| PATTERN[i % PATTERN.len()]).collect()
}

struct Measurement {
    wall_s: f64,
    rss_delta_kib: u64,
}

fn measure<T, F: FnOnce() -> T>(sys: &mut System, compute: F) -> (Measurement, T) {
    let before = rss_kib(sys);
    let start = Instant::now();
    let out = compute();
    let duration = start.elapsed();
    let after = rss_kib(sys);
    (
        Measurement {
            wall_s: duration.as_secs_f64(),
            rss_delta_kib: after.saturating_sub(before),
        },
        out,
    )
}

fn rss_kib(sys: &mut System) -> u64 {
    sys.refresh_processes_specifics(ProcessRefreshKind::new());
    if let Some(process) = get_current_pid().ok().and_then(|pid| sys.process(pid)) {
        process.memory() / 1024
    } else {
        0
    }
}

#[derive(Clone, Copy)]
enum Status {
    Agree,
    Underflow,
    Diverged,
    Failed,
}

impl Status {
    fn label(&self) -> &'static str {
        match self {
            Status::Agree => "agree",
            Status::Underflow => "underflow",
            Status::Diverged => "diverged",
            Status::Failed => "failed",
        }
    }
}

struct Row {
    len: usize,
    linear: Measurement,
    log: Measurement,
    linear_probability: f64,
    log_probability: f64,
    status: Status,
    detail: String,
}

impl Row {
    fn compare(
        len: usize,
        linear: Measurement,
        log: Measurement,
        lin: &Decoding<&str>,
        lg: &Decoding<&str>,
    ) -> Self {
        let status = if lin.probability == 0.0 && lg.log_probability.is_finite() {
            Status::Underflow
        } else if lin.states == lg.states {
            Status::Agree
        } else {
            Status::Diverged
        };
        let detail = match status {
            Status::Diverged => {
                let first = lin
                    .states
                    .iter()
                    .zip(&lg.states)
                    .position(|(a, b)| a != b)
                    .unwrap_or(0);
                format!("paths differ from t={first}")
            }
            _ => String::new(),
        };
        Self {
            len,
            linear,
            log,
            linear_probability: lin.probability,
            log_probability: lg.log_probability,
            status,
            detail,
        }
    }

    fn failed(len: usize, linear: Measurement, log: Measurement, detail: String) -> Self {
        Self {
            len,
            linear,
            log,
            linear_probability: f64::NAN,
            log_probability: f64::NAN,
            status: Status::Failed,
            detail,
        }
    }
}

struct Options {
    format: OutputFormat,
    max_len: usize,
}

impl Options {
    fn parse<I, T>(mut args: I) -> Result<Self, String>
    where
        I: Iterator<Item = T>,
        T: Into<String>,
    {
        let mut format = OutputFormat::Csv;
        let mut max_len = usize::MAX;

        while let Some(arg) = args.next() {
            let arg = arg.into();
            if arg == "--help" || arg == "-h" {
                Options::print_help();
                std::process::exit(0);
            } else if let Some(value) = arg.strip_prefix("--format=") {
                format = OutputFormat::from_str(value)?;
            } else if arg == "--format" {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value after --format".to_string())?
                    .into();
                format = OutputFormat::from_str(&value)?;
            } else if let Some(value) = arg.strip_prefix("--max-len=") {
                max_len = parse_len(value)?;
            } else if arg == "--max-len" {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value after --max-len".to_string())?
                    .into();
                max_len = parse_len(&value)?;
            } else {
                return Err(format!("unrecognized argument '{arg}'"));
            }
        }

        Ok(Self { format, max_len })
    }

    fn print_help() {
        println!(
            "\
Usage: cargo run --features probe --bin underflow_probe [-- <options>]

Options:
  --format <csv|table>     Output format (default: csv)
  --max-len <N>            Largest observation length to decode (default: all)
  -h, --help               Print this help message
"
        );
    }
}

fn parse_len(value: &str) -> Result<usize, String> {
    value
        .parse::<usize>()
        .map_err(|_| "max length must be a positive integer".to_string())
}

#[derive(Copy, Clone)]
enum OutputFormat {
    Csv,
    Table,
}

impl OutputFormat {
    fn from_str(value: &str) -> Result<Self, String> {
        match value {
            "csv" => Ok(Self::Csv),
            "table" => Ok(Self::Table),
            other => Err(format!("unknown format '{other}'")),
        }
    }

    fn write(self, rows: &[Row]) {
        match self {
            OutputFormat::Csv => write_csv(rows),
            OutputFormat::Table => write_table(rows),
        }
    }
}

fn write_csv(rows: &[Row]) {
    println!("obs_len,linear_wall_s,log_wall_s,linear_rss_delta_kib,log_rss_delta_kib,linear_probability,log_probability,status,detail");
    for r in rows {
        println!(
            "{},{:.4},{:.4},{},{},{:e},{:.6},{},\"{}\"",
            r.len,
            r.linear.wall_s,
            r.log.wall_s,
            r.linear.rss_delta_kib,
            r.log.rss_delta_kib,
            r.linear_probability,
            r.log_probability,
            r.status.label(),
            r.detail.replace('"', "'")
        );
    }
}

fn write_table(rows: &[Row]) {
    println!(
        "{:>8}  {:>10}  {:>10}  {:>12}  {:>18}  {:>10}  detail",
        "obs_len", "linear_s", "log_s", "linear_p", "log_p", "status"
    );
    println!(
        "{:-<8}  {:-<10}  {:-<10}  {:-<12}  {:-<18}  {:-<10}  {:-<6}",
        "", "", "", "", "", "", ""
    );
    for r in rows {
        println!(
            "{:>8}  {:>10.4}  {:>10.4}  {:>12.3e}  {:>18.6}  {:>10}  {}",
            r.len,
            r.linear.wall_s,
            r.log.wall_s,
            r.linear_probability,
            r.log_probability,
            r.status.label(),
            r.detail
        );
    }
}
