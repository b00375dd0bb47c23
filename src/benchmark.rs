use anyhow::{Context, bail};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, fs::File, io::BufReader, path::Path};

/// Placeholder for the thread count inside benchmark arguments
pub const THREAD_NUM_TOKEN: &str = "__THREAD_NUM__";

/// Input sizes every sized benchmark provides, in table order
pub const SIZES: [&str; 4] = ["dev", "small", "medium", "large"];

/// Benchmark suites, each one a separate snapshot of the run scripts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Suite {
    /// PARSEC 2.1 and SPLASH2 through the launcher wrapper
    Launcher,
    /// PARSEC 3.0
    Parsec3,
    /// SPLASH-2x
    #[clap(name = "splash2x")]
    Splash2x,
    /// Single core micro benchmarks
    Micro,
}

impl Suite {
    pub fn name(&self) -> &'static str {
        match self {
            Suite::Launcher => "launcher",
            Suite::Parsec3 => "parsec3",
            Suite::Splash2x => "splash2x",
            Suite::Micro => "micro",
        }
    }
}

impl fmt::Display for Suite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Memory model tag passed to the simulator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MemoryModel {
    Sc,
    Tso,
    /// TSO with an effectively unlimited store queue
    #[clap(name = "usqtso")]
    UsqTso,
    Rcm,
    Wmm,
}

impl MemoryModel {
    /// Tag used in report file names
    pub fn tag(&self) -> &'static str {
        match self {
            MemoryModel::Sc => "sc",
            MemoryModel::Tso => "tso",
            MemoryModel::UsqTso => "usqtso",
            MemoryModel::Rcm => "rcm",
            MemoryModel::Wmm => "wmm",
        }
    }

    /// Name the simulator understands, it has no notion of usqtso
    pub fn simulator_name(&self) -> &'static str {
        match self {
            MemoryModel::UsqTso => "tso",
            model => model.tag(),
        }
    }

    pub fn unlimited_store_queue(&self) -> bool {
        *self == MemoryModel::UsqTso
    }

    /// Weak models need the fence-annotated builds of some SPLASH programs
    pub fn is_weak(&self) -> bool {
        matches!(self, MemoryModel::Rcm | MemoryModel::Wmm)
    }
}

impl fmt::Display for MemoryModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Derives the thread count handed to a benchmark from the number of simulated cores
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadPolicy {
    /// One thread per core
    Cores,
    /// Leave some cores for threads the benchmark spawns on its own
    CoresMinus(u32),
    /// Always the same count
    Fixed(u32),
    /// One core for the main thread plus one per four cores beyond the first four
    OnePerFourReserved,
    /// Explicit count per input size
    PerSize(BTreeMap<String, u32>),
}

impl ThreadPolicy {
    pub fn threads(&self, cores: u32, size: &str) -> anyhow::Result<u32> {
        let cores = i64::from(cores);
        let threads = match self {
            ThreadPolicy::Cores => cores,
            ThreadPolicy::CoresMinus(reserved) => cores - i64::from(*reserved),
            ThreadPolicy::Fixed(threads) => i64::from(*threads),
            // floor division, so fewer than four cores reserve nothing
            ThreadPolicy::OnePerFourReserved => cores - (cores - 4).div_euclid(4) - 1,
            ThreadPolicy::PerSize(threads) => match threads.get(size) {
                Some(threads) => i64::from(*threads),
                None => bail!("no thread count for size {}", size),
            },
        };
        if threads < 1 {
            bail!(
                "thread policy {:?} leaves {} threads on {} cores",
                self,
                threads,
                cores
            );
        }
        Ok(threads as u32)
    }
}

/// One benchmark: argument template per input size and its thread policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Benchmark {
    /// Benchmark name, also the executable name
    pub name: String,
    /// Argument template per input size
    pub args: BTreeMap<String, String>,
    /// Thread count derivation
    pub threads: ThreadPolicy,
    /// Input directory ships an `input.template` with NUMPROCS tokens
    #[serde(default)]
    pub input_template: bool,
}

impl Benchmark {
    fn sized(name: &str, args: [&str; 4], threads: ThreadPolicy) -> Self {
        Benchmark {
            name: name.to_string(),
            args: SIZES
                .iter()
                .zip(args)
                .map(|(size, args)| (size.to_string(), args.to_string()))
                .collect(),
            threads,
            input_template: false,
        }
    }

    fn with_input_template(mut self) -> Self {
        self.input_template = true;
        self
    }

    /// Argument line for `size` with the thread count filled in
    pub fn command_args(&self, size: &str, threads: u32) -> anyhow::Result<String> {
        match self.args.get(size) {
            Some(args) => Ok(args.replace(THREAD_NUM_TOKEN, &threads.to_string())),
            None => bail!("{} doesn't have parameter for size {}", self.name, size),
        }
    }
}

/// Immutable table of benchmarks for one suite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkTable {
    pub suite: Suite,
    pub benchmarks: Vec<Benchmark>,
}

impl BenchmarkTable {
    pub fn builtin(suite: Suite) -> Self {
        let benchmarks = match suite {
            Suite::Launcher => launcher_benchmarks(),
            Suite::Parsec3 => parsec3_benchmarks(),
            Suite::Splash2x => splash2x_benchmarks(),
            // micro benchmarks take an iteration count instead of a size
            Suite::Micro => vec![],
        };
        BenchmarkTable { suite, benchmarks }
    }

    /// Load a replacement table, e.g. `{"suite": "parsec3", "benchmarks": [...]}`
    pub fn from_json<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("cannot open benchmark table {}", path.display()))?;
        let table: BenchmarkTable = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("cannot parse benchmark table {}", path.display()))?;
        Ok(table)
    }

    pub fn get(&self, name: &str) -> Option<&Benchmark> {
        self.benchmarks.iter().find(|bench| bench.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.benchmarks
            .iter()
            .map(|bench| bench.name.as_str())
            .collect()
    }
}

fn x264_args(output: &str, input: &str) -> String {
    format!(
        "--quiet --qp 20 --partitions b8x8,i4x4 --ref 5 --direct auto --b-pyramid \
         --weightb --mixed-refs --no-fast-pskip --me umh --subme 7 --analyse b8x8,i4x4 \
         --threads {} -o {} {}",
        THREAD_NUM_TOKEN, output, input
    )
}

fn x264(outputs: [&str; 4], threads: ThreadPolicy) -> Benchmark {
    let inputs = [
        "eledream_64x36_3.y4m",
        "eledream_640x360_8.y4m",
        "eledream_640x360_32.y4m",
        "eledream_640x360_128.y4m",
    ];
    let args: Vec<String> = outputs
        .iter()
        .zip(inputs)
        .map(|(output, input)| x264_args(output, input))
        .collect();
    Benchmark::sized(
        "x264",
        [
            args[0].as_str(),
            args[1].as_str(),
            args[2].as_str(),
            args[3].as_str(),
        ],
        threads,
    )
}

/// PARSEC 2.1 and SPLASH2 programs run through `launcher`
pub fn launcher_benchmarks() -> Vec<Benchmark> {
    // the main PARSEC thread occupies a core of its own
    let parsec = || ThreadPolicy::CoresMinus(1);
    vec![
        Benchmark::sized(
            "blackscholes",
            [
                "__THREAD_NUM__ in_16.txt blackscholes_dev.out",
                "__THREAD_NUM__ in_4K.txt blackscholes_small.out",
                "__THREAD_NUM__ in_16K.txt blackscholes_medium.out",
                "__THREAD_NUM__ in_64K.txt blackscholes_large.out",
            ],
            parsec(),
        ),
        Benchmark::sized(
            "bodytrack",
            [
                "sequenceB_1 4 1 100 3 2 __THREAD_NUM__",
                "sequenceB_1 4 1 1000 5 2 __THREAD_NUM__",
                "sequenceB_2 4 2 2000 5 2 __THREAD_NUM__",
                "sequenceB_4 4 4 4000 5 2 __THREAD_NUM__",
            ],
            parsec(),
        ),
        Benchmark::sized(
            "canneal",
            [
                "__THREAD_NUM__ 100 300 100.nets 2",
                "__THREAD_NUM__ 10000 2000 100000.nets 32",
                "__THREAD_NUM__ 15000 2000 200000.nets 64",
                "__THREAD_NUM__ 15000 2000 400000.nets 128",
            ],
            parsec(),
        ),
        Benchmark::sized(
            "facesim",
            ["-timing -threads __THREAD_NUM__"; 4],
            parsec(),
        ),
        Benchmark::sized(
            "ferret",
            [
                "corel lsh queries 5 5 __THREAD_NUM__ ferret_dev.out",
                "corel lsh queries 10 20 __THREAD_NUM__ ferret_small.out",
                "corel lsh queries 10 20 __THREAD_NUM__ ferret_medium.out",
                "corel lsh queries 10 20 __THREAD_NUM__ ferret_large.out",
            ],
            parsec(),
        ),
        Benchmark::sized(
            "fluidanimate",
            [
                "__THREAD_NUM__ 3 in_15K.fluid fluidanimate_dev.out",
                "__THREAD_NUM__ 5 in_35K.fluid fluidanimate_small.out",
                "__THREAD_NUM__ 5 in_100K.fluid fluidanimate_medium.out",
                "__THREAD_NUM__ 5 in_300K.fluid fluidanimate_large.out",
            ],
            parsec(),
        ),
        Benchmark::sized(
            "swaptions",
            [
                "-ns 8 -sm 50 -nt __THREAD_NUM__",
                "-ns 16 -sm 5000 -nt __THREAD_NUM__",
                "-ns 32 -sm 10000 -nt __THREAD_NUM__",
                "-ns 64 -sm 20000 -nt __THREAD_NUM__",
            ],
            parsec(),
        ),
        x264(
            [
                "x264_dev.264",
                "x264_small.264",
                "x264_medium.264",
                "x264_large.264",
            ],
            parsec(),
        ),
        Benchmark::sized(
            "ocean",
            [
                "-n258 -p__THREAD_NUM__ -e1e-07 -r20000 -t28800",
                "-n514 -p__THREAD_NUM__ -e1e-07 -r20000 -t28800",
                "-n1026 -p__THREAD_NUM__ -e1e-07 -r20000 -t28800",
                "-n2050 -p__THREAD_NUM__ -e1e-07 -r20000 -t28800",
            ],
            ThreadPolicy::Cores,
        ),
        Benchmark::sized(
            "fft",
            [
                "-m18 -p__THREAD_NUM__",
                "-m20 -p__THREAD_NUM__",
                "-m22 -p__THREAD_NUM__",
                "-m24 -p__THREAD_NUM__",
            ],
            ThreadPolicy::Cores,
        ),
        Benchmark::sized(
            "radix",
            [
                "-p__THREAD_NUM__ -r4096 -n262144 -m524288",
                "-p__THREAD_NUM__ -r4096 -n4194304 -m2147483647",
                "-p__THREAD_NUM__ -r4096 -n16777216 -m2147483647",
                "-p__THREAD_NUM__ -r4096 -n67108864 -m2147483647",
            ],
            ThreadPolicy::Cores,
        ),
    ]
}

/// PARSEC 3.0 programs
pub fn parsec3_benchmarks() -> Vec<Benchmark> {
    vec![
        Benchmark::sized(
            "blackscholes",
            [
                "__THREAD_NUM__ in_16.txt blackscholes_dev.out",
                "__THREAD_NUM__ in_4K.txt blackscholes_small.out",
                "__THREAD_NUM__ in_16K.txt blackscholes_medium.out",
                "__THREAD_NUM__ in_64K.txt blackscholes_large.out",
            ],
            ThreadPolicy::Cores,
        ),
        // posix thread model (2)
        Benchmark::sized(
            "bodytrack",
            [
                "sequenceB_1 4 1 100 3 2 __THREAD_NUM__",
                "sequenceB_1 4 1 1000 5 2 __THREAD_NUM__",
                "sequenceB_2 4 2 2000 5 2 __THREAD_NUM__",
                "sequenceB_4 4 4 4000 5 2 __THREAD_NUM__",
            ],
            ThreadPolicy::OnePerFourReserved,
        ),
        // all input sizes share the dev inputs
        Benchmark::sized(
            "facesim",
            ["-timing -threads __THREAD_NUM__"; 4],
            ThreadPolicy::Cores,
        ),
        // two threads on eight cores already run out of cores
        Benchmark::sized(
            "ferret",
            [
                "corel lsh queries 5 5 __THREAD_NUM__ ferret_dev.out",
                "corel lsh queries 10 20 __THREAD_NUM__ ferret_small.out",
                "corel lsh queries 10 20 __THREAD_NUM__ ferret_medium.out",
                "corel lsh queries 10 20 __THREAD_NUM__ ferret_large.out",
            ],
            ThreadPolicy::Fixed(1),
        ),
        Benchmark::sized(
            "fluidanimate",
            [
                "__THREAD_NUM__ 3 in_15K.fluid fluidanimate_dev.out",
                "__THREAD_NUM__ 5 in_35K.fluid fluidanimate_small.out",
                "__THREAD_NUM__ 5 in_100K.fluid fluidanimate_medium.out",
                "__THREAD_NUM__ 5 in_300K.fluid fluidanimate_large.out",
            ],
            ThreadPolicy::Cores,
        ),
        Benchmark::sized(
            "freqmine",
            [
                "T10I4D100K_1k.dat 3 freqmine.out __THREAD_NUM__",
                "kosarak_250k.dat 220 freqmine.out __THREAD_NUM__",
                "kosarak_500k.dat 410 freqmine.out __THREAD_NUM__",
                "kosarak_990k.dat 790 freqmine.out __THREAD_NUM__",
            ],
            ThreadPolicy::Cores,
        ),
        Benchmark::sized(
            "streamcluster",
            [
                "3 10 3 16 16 10 none streamcluster_dev.out __THREAD_NUM__",
                "10 20 32 4096 4096 1000 none streamcluster_small.out __THREAD_NUM__",
                "10 20 64 8192 8192 1000 none streamcluster_medium.out __THREAD_NUM__",
                "10 20 128 16384 16384 1000 none streamcluster_large.out __THREAD_NUM__",
            ],
            ThreadPolicy::Cores,
        ),
        // 16 swaptions in dev so that 8 threads all get work
        Benchmark::sized(
            "swaptions",
            [
                "-ns 16 -sm 50 -nt __THREAD_NUM__",
                "-ns 16 -sm 5000 -nt __THREAD_NUM__",
                "-ns 32 -sm 10000 -nt __THREAD_NUM__",
                "-ns 64 -sm 20000 -nt __THREAD_NUM__",
            ],
            ThreadPolicy::Cores,
        ),
        Benchmark::sized(
            "vips",
            [
                "im_benchmark barbados_256x288.v vips_dev.v __THREAD_NUM__",
                "im_benchmark pomegranate_1600x1200.v vips_small.v __THREAD_NUM__",
                "im_benchmark vulture_2336x2336.v vips_medium.v __THREAD_NUM__",
                "im_benchmark bigben_2662x5500.v vips_large.v __THREAD_NUM__",
            ],
            ThreadPolicy::CoresMinus(2),
        ),
        x264(
            [
                "x264_dev4.264",
                "x264_small.264",
                "x264_medium.264",
                "x264_large.264",
            ],
            ThreadPolicy::CoresMinus(1),
        ),
    ]
}

/// SPLASH-2x programs
pub fn splash2x_benchmarks() -> Vec<Benchmark> {
    let ocean = |name: &str| {
        Benchmark::sized(
            name,
            [
                "-n258 -p__THREAD_NUM__ -e1e-07 -r20000 -t28800",
                "-n514 -p__THREAD_NUM__ -e1e-07 -r20000 -t28800",
                "-n1026 -p__THREAD_NUM__ -e1e-07 -r20000 -t28800",
                "-n2050 -p__THREAD_NUM__ -e1e-07 -r20000 -t28800",
            ],
            ThreadPolicy::Cores,
        )
    };
    let lu = |name: &str| {
        Benchmark::sized(
            name,
            [
                "-p__THREAD_NUM__ -n512 -b16",
                "-p__THREAD_NUM__ -n512 -b16",
                "-p__THREAD_NUM__ -n1024 -b16",
                "-p__THREAD_NUM__ -n2048 -b16",
            ],
            ThreadPolicy::Cores,
        )
    };
    vec![
        Benchmark::sized("barnes", ["-f input.template"; 4], ThreadPolicy::Cores)
            .with_input_template(),
        Benchmark::sized("fmm", ["-f input.template"; 4], ThreadPolicy::Cores)
            .with_input_template(),
        ocean("ocean_cp"),
        ocean("ocean_ncp"),
        Benchmark::sized(
            "radiosity",
            [
                "-bf 1.5e-1 -batch -room -p __THREAD_NUM__",
                "-bf 1.5e-1 -batch -room -p __THREAD_NUM__",
                "-bf 1.5e-2 -batch -room -p __THREAD_NUM__",
                "-bf 1.5e-3 -batch -room -p __THREAD_NUM__",
            ],
            ThreadPolicy::Cores,
        ),
        Benchmark::sized(
            "raytrace",
            [
                "-s -p__THREAD_NUM__ -a4 teapot.env",
                "-s -p__THREAD_NUM__ -a8 teapot.env",
                "-s -p__THREAD_NUM__ -a2 balls4.env",
                "-s -p__THREAD_NUM__ -a8 balls4.env",
            ],
            ThreadPolicy::Cores,
        ),
        Benchmark::sized(
            "volrend",
            [
                "__THREAD_NUM__ head-scaleddown4 4",
                "__THREAD_NUM__ head-scaleddown4 20",
                "__THREAD_NUM__ head-scaleddown2 50",
                "__THREAD_NUM__ head-scaleddown2 100",
            ],
            ThreadPolicy::Cores,
        ),
        Benchmark::sized("water_nsquared", ["input.template"; 4], ThreadPolicy::Cores)
            .with_input_template(),
        Benchmark::sized("water_spatial", ["input.template"; 4], ThreadPolicy::Cores)
            .with_input_template(),
        Benchmark::sized(
            "cholesky",
            [
                "-p__THREAD_NUM__ tk14.O",
                "-p__THREAD_NUM__ tk29.O",
                "-p__THREAD_NUM__ tk29.O",
                "-p__THREAD_NUM__ tk29.O",
            ],
            ThreadPolicy::Cores,
        ),
        Benchmark::sized(
            "fft",
            [
                "-m18 -p__THREAD_NUM__",
                "-m20 -p__THREAD_NUM__",
                "-m22 -p__THREAD_NUM__",
                "-m24 -p__THREAD_NUM__",
            ],
            ThreadPolicy::Cores,
        ),
        lu("lu_cb"),
        lu("lu_ncb"),
        Benchmark::sized(
            "radix",
            [
                "-p__THREAD_NUM__ -r4096 -n262144 -m524288",
                "-p__THREAD_NUM__ -r4096 -n4194304 -m2147483647",
                "-p__THREAD_NUM__ -r4096 -n16777216 -m2147483647",
                "-p__THREAD_NUM__ -r4096 -n67108864 -m2147483647",
            ],
            ThreadPolicy::Cores,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use crate::{BenchmarkTable, MemoryModel, SIZES, Suite, ThreadPolicy};
    use std::collections::BTreeMap;

    #[test]
    fn test_thread_policies() {
        assert_eq!(ThreadPolicy::Cores.threads(8, "small").unwrap(), 8);
        assert_eq!(ThreadPolicy::CoresMinus(2).threads(8, "small").unwrap(), 6);
        assert_eq!(ThreadPolicy::Fixed(1).threads(8, "small").unwrap(), 1);

        // bodytrack reserves the main thread and one core per four beyond four
        let policy = ThreadPolicy::OnePerFourReserved;
        assert_eq!(policy.threads(1, "dev").unwrap(), 1);
        assert_eq!(policy.threads(3, "dev").unwrap(), 3);
        assert_eq!(policy.threads(4, "dev").unwrap(), 3);
        assert_eq!(policy.threads(8, "dev").unwrap(), 6);
        assert_eq!(policy.threads(16, "dev").unwrap(), 12);

        let per_size = ThreadPolicy::PerSize(BTreeMap::from([("dev".to_string(), 2)]));
        assert_eq!(per_size.threads(8, "dev").unwrap(), 2);
        assert!(per_size.threads(8, "large").is_err());

        assert!(ThreadPolicy::CoresMinus(2).threads(2, "dev").is_err());
    }

    #[test]
    fn test_blackscholes_small_on_8_cores() {
        let table = BenchmarkTable::builtin(Suite::Parsec3);
        let bench = table.get("blackscholes").unwrap();
        let threads = bench.threads.threads(8, "small").unwrap();
        assert_eq!(threads, 8);
        assert_eq!(
            bench.command_args("small", threads).unwrap(),
            "8 in_4K.txt blackscholes_small.out"
        );
    }

    #[test]
    fn test_tables_are_complete() {
        for suite in [Suite::Launcher, Suite::Parsec3, Suite::Splash2x] {
            let table = BenchmarkTable::builtin(suite);
            assert!(!table.benchmarks.is_empty());
            for bench in &table.benchmarks {
                for size in SIZES {
                    assert!(
                        bench.args.contains_key(size),
                        "{} {} misses {}",
                        suite,
                        bench.name,
                        size
                    );
                }
            }
        }
        assert!(BenchmarkTable::builtin(Suite::Micro).benchmarks.is_empty());
    }

    #[test]
    fn test_x264_replaces_every_token() {
        let table = BenchmarkTable::builtin(Suite::Parsec3);
        let bench = table.get("x264").unwrap();
        let args = bench.command_args("dev", 7).unwrap();
        assert!(args.contains("--threads 7 -o x264_dev4.264 eledream_64x36_3.y4m"));
        assert!(!args.contains("__THREAD_NUM__"));
    }

    #[test]
    fn test_unknown_size() {
        let table = BenchmarkTable::builtin(Suite::Splash2x);
        assert!(table.get("fft").unwrap().command_args("huge", 4).is_err());
        assert!(table.get("canneal").is_none());
    }

    #[test]
    fn test_table_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.json");
        let table = BenchmarkTable::builtin(Suite::Splash2x);
        std::fs::write(&path, serde_json::to_vec(&table).unwrap()).unwrap();
        assert_eq!(BenchmarkTable::from_json(&path).unwrap(), table);

        std::fs::write(
            &path,
            r#"{"suite": "parsec3", "benchmarks": [
                {"name": "swaptions", "args": {"dev": "-ns 8 -sm 50 -nt __THREAD_NUM__"},
                 "threads": {"cores_minus": 1}}
            ]}"#,
        )
        .unwrap();
        let table = BenchmarkTable::from_json(&path).unwrap();
        let bench = table.get("swaptions").unwrap();
        assert_eq!(bench.threads, ThreadPolicy::CoresMinus(1));
        assert!(!bench.input_template);
        assert_eq!(
            bench.command_args("dev", 3).unwrap(),
            "-ns 8 -sm 50 -nt 3"
        );
    }

    #[test]
    fn test_memory_model_names() {
        assert_eq!(MemoryModel::UsqTso.tag(), "usqtso");
        assert_eq!(MemoryModel::UsqTso.simulator_name(), "tso");
        assert!(MemoryModel::UsqTso.unlimited_store_queue());
        assert!(MemoryModel::Wmm.is_weak());
        assert!(!MemoryModel::Tso.is_weak());
    }
}
