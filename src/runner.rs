// drive the simulator for one benchmark run
use crate::{
    BenchmarkTable, MemoryModel, Placeholders, Suite, fill_numprocs, get_executable_path,
    get_input_dir, get_log_path, get_report_pattern, set_key_in_file,
};
use anyhow::{Context, bail};
use chrono::{DateTime, Local};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::{
    ffi::OsString,
    fs::{File, Permissions},
    io::BufReader,
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
};

/// Where benchmarks, the simulator and its configuration files live
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Root of the benchmark executables and inputs
    pub bench_root: PathBuf,
    /// Directory the simulator runs in
    pub work_dir: PathBuf,
    /// Simulator binary, relative paths are resolved from the working directory
    pub simulator: PathBuf,
    /// Configuration template file name
    pub template: String,
    /// Rendered configuration file name
    pub config: String,
    /// Core configuration file name
    pub simu_config: String,
    /// Remove staged inputs and executable after the run
    pub cleanup: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        RunnerConfig {
            bench_root: PathBuf::from("program"),
            work_dir: PathBuf::from("."),
            simulator: PathBuf::from("../main/esesc"),
            template: "esesc.conf.template".to_string(),
            config: "esesc.conf".to_string(),
            simu_config: "simu.conf".to_string(),
            cleanup: false,
        }
    }
}

impl RunnerConfig {
    pub fn from_json<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("cannot open runner config {}", path.display()))?;
        let config = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("cannot parse runner config {}", path.display()))?;
        Ok(config)
    }
}

/// What a benchmark is run on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Workload {
    /// Named input size of a benchmark table entry
    Size(String),
    /// Iteration count of a micro benchmark
    Iterations(u64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub suite: Suite,
    pub name: String,
    pub workload: Workload,
    /// Simulated core count
    pub cores: u32,
    /// Explicit thread count, otherwise derived from the thread policy
    pub threads: Option<u32>,
    pub model: MemoryModel,
    pub prefetch: String,
    /// Turn on load verification in the core configuration
    pub verify_ld: bool,
    /// Suffix of the report name
    pub comment: Option<String>,
}

impl RunRequest {
    pub fn sized(suite: Suite, name: &str, size: &str, cores: u32) -> Self {
        RunRequest {
            suite,
            name: name.to_string(),
            workload: Workload::Size(size.to_string()),
            cores,
            threads: None,
            model: MemoryModel::Tso,
            prefetch: "0".to_string(),
            verify_ld: false,
            comment: None,
        }
    }

    pub fn micro(name: &str, iterations: u64) -> Self {
        RunRequest {
            suite: Suite::Micro,
            name: name.to_string(),
            workload: Workload::Iterations(iterations),
            cores: 1,
            threads: Some(1),
            model: MemoryModel::Tso,
            prefetch: "0".to_string(),
            verify_ld: false,
            comment: None,
        }
    }
}

/// Everything a run needs, resolved before touching the file system
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    pub request: RunRequest,
    pub threads: u32,
    /// Benchmark command line handed to the simulator
    pub command: String,
    /// Base name of the log and the simulator reports
    pub report_file: String,
    /// Executable to copy into the working directory
    pub executable: Option<PathBuf>,
    /// Directory whose content is copied into the working directory
    pub input_dir: Option<PathBuf>,
    /// Fill NUMPROCS in `input.template`
    pub input_template: bool,
    pub placeholders: Placeholders,
}

impl RunPlan {
    fn executable_name(&self) -> Option<OsString> {
        self.executable
            .as_ref()
            .and_then(|exe| exe.file_name())
            .map(|name| name.to_os_string())
    }
}

/// Outcome of a finished run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub report_file: String,
    pub threads: u32,
    pub log_path: PathBuf,
    /// Whether the simulator pipeline exited with status 0, informational only
    pub exit_success: bool,
    /// Simulator reports whose mode was fixed
    pub artifacts: Vec<PathBuf>,
    pub started: DateTime<Local>,
    pub finished: DateTime<Local>,
}

pub struct Runner {
    config: RunnerConfig,
    table: BenchmarkTable,
}

impl Runner {
    pub fn new(config: RunnerConfig, table: BenchmarkTable) -> Self {
        Runner { config, table }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    pub fn table(&self) -> &BenchmarkTable {
        &self.table
    }

    /// Resolve a request without side effects
    pub fn plan(&self, request: &RunRequest) -> anyhow::Result<RunPlan> {
        if request.suite != self.table.suite {
            bail!(
                "request for suite {} given to a runner for suite {}",
                request.suite,
                self.table.suite
            );
        }
        if request.cores == 0 {
            bail!("at least one core is required");
        }
        if request.threads == Some(0) {
            bail!("at least one thread is required");
        }

        let (threads, args, input_template, size) = match (&request.workload, request.suite) {
            (Workload::Iterations(iterations), Suite::Micro) => {
                (1, iterations.to_string(), false, None)
            }
            (Workload::Size(size), suite) if suite != Suite::Micro => {
                let bench = match self.table.get(&request.name) {
                    Some(bench) => bench,
                    None => bail!("{} doesn't have parameters!", request.name),
                };
                if !bench.args.contains_key(size) {
                    bail!("{} doesn't have parameter for size {}", request.name, size);
                }
                let threads = match request.threads {
                    Some(threads) => threads,
                    None => bench.threads.threads(request.cores, size)?,
                };
                let args = bench.command_args(size, threads)?;
                (threads, args, bench.input_template, Some(size.as_str()))
            }
            (workload, suite) => bail!("{:?} cannot be run in suite {}", workload, suite),
        };

        let executable = get_executable_path(
            &self.config.bench_root,
            request.suite,
            &request.name,
            request.model,
        );
        if let Some(exe) = &executable {
            if !exe.is_file() {
                bail!("{} doesn't exist!", exe.display());
            }
        }
        let input_dir = size.and_then(|size| {
            get_input_dir(&self.config.bench_root, request.suite, &request.name, size)
        });
        if let Some(input_dir) = &input_dir {
            if !input_dir.is_dir() {
                bail!("{} doesn't exist!", input_dir.display());
            }
        }

        let exe_name = executable
            .as_ref()
            .and_then(|exe| exe.file_name())
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| request.name.clone());
        let command = match request.suite {
            Suite::Launcher => format!("launcher -- {} {}", request.name, args),
            _ => format!("{} {}", exe_name, args),
        };

        let cores = match request.suite {
            Suite::Micro => 1,
            _ => request.cores,
        };
        let mut report_file = match (request.suite, size) {
            (Suite::Launcher, Some(size)) => {
                format!("{}_{}_c{}_t{}", request.name, size, cores, threads)
            }
            (Suite::Parsec3 | Suite::Splash2x, Some(size)) => format!(
                "{}_{}_{}_{}_c{}_t{}_pf{}",
                if request.suite == Suite::Parsec3 {
                    "parsec"
                } else {
                    "splash"
                },
                request.name,
                request.model,
                size,
                cores,
                threads,
                request.prefetch
            ),
            _ => format!(
                "micro_{}_{}_pf{}_v{}",
                request.name, request.model, request.prefetch, request.verify_ld as u8
            ),
        };
        if let Some(comment) = request.comment.as_deref().filter(|c| !c.is_empty()) {
            report_file = format!("{}_{}", report_file, comment);
        }

        let placeholders = Placeholders {
            cpu_max_id: cores - 1,
            memory_model: request.model.simulator_name().to_string(),
            store_prefetch: request.prefetch.clone(),
            bench_name: command.clone(),
            report_file: report_file.clone(),
        };

        Ok(RunPlan {
            request: request.clone(),
            threads,
            command,
            report_file,
            executable,
            input_dir,
            input_template,
            placeholders,
        })
    }

    /// Plan, stage, run the simulator and archive its reports
    pub fn run(&self, request: &RunRequest) -> anyhow::Result<RunRecord> {
        let plan = self.plan(request)?;
        self.execute(&plan)
    }

    pub fn execute(&self, plan: &RunPlan) -> anyhow::Result<RunRecord> {
        let work_dir = &self.config.work_dir;
        let started = Local::now();
        info!(
            "Running {} at {}",
            plan.report_file,
            started.format("%Y%m%d-%H%M%S")
        );

        // copy executable
        if let (Some(exe), Some(exe_name)) = (&plan.executable, plan.executable_name()) {
            let dst = work_dir.join(&exe_name);
            remove_here(work_dir, std::slice::from_ref(&exe_name))?;
            info!("Copying {} to {}", exe.display(), dst.display());
            std::fs::copy(exe, &dst)
                .with_context(|| format!("cannot copy {}", exe.display()))?;
        }

        // copy input files
        let inputs = match &plan.input_dir {
            Some(input_dir) => copy_here(input_dir, work_dir)?,
            None => vec![],
        };

        // render simulator configuration
        let config_path = work_dir.join(&self.config.config);
        plan.placeholders
            .render_file(work_dir.join(&self.config.template), &config_path)?;
        info!(
            "Generated {}: cpu max id {}, memory model {}, store prefetch {}, benchmark \"{}\", report {}",
            config_path.display(),
            plan.placeholders.cpu_max_id,
            plan.placeholders.memory_model,
            plan.placeholders.store_prefetch,
            plan.placeholders.bench_name,
            plan.placeholders.report_file
        );

        let simu_config = work_dir.join(&self.config.simu_config);
        if plan.request.model.unlimited_store_queue() {
            info!("Unlimited store queue: maxStores = 1024 in {}", simu_config.display());
            set_key_in_file(&simu_config, "maxStores", "1024")?;
        }
        if plan.request.verify_ld {
            info!("Load verification: sctsoVerifyLd = true in {}", simu_config.display());
            set_key_in_file(&simu_config, "sctsoVerifyLd", "true")?;
        }
        if plan.input_template {
            let path = work_dir.join("input.template");
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("cannot read {}", path.display()))?;
            std::fs::write(&path, fill_numprocs(&text, plan.threads))?;
        }

        // facesim writes into a fixed output directory
        if plan.request.name == "facesim" {
            let storytelling = work_dir.join("Storytelling");
            if storytelling.is_dir() {
                std::fs::remove_dir_all(&storytelling)?;
            }
            std::fs::create_dir_all(storytelling.join("output"))?;
        }

        // run
        let log_path = get_log_path(work_dir, &plan.report_file);
        let log_name = log_path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        // paths go in as positional parameters so the shell never splits them
        let args = format!(
            "{} 2>&1 | tee {}",
            self.config.simulator.display(),
            log_name.to_string_lossy()
        );
        info!("Running {}", args);
        let status = std::process::Command::new("sh")
            .arg("-c")
            .arg("\"$0\" 2>&1 | tee \"$1\"")
            .arg(&self.config.simulator)
            .arg(&log_name)
            .current_dir(work_dir)
            .status()
            .with_context(|| format!("cannot spawn {}", args))?;
        if !status.success() {
            warn!("{} exited with {}", args, status);
        }

        // bodytrack leaves its frames in the sequence directory
        if plan.request.suite == Suite::Parsec3 && plan.request.name == "bodytrack" {
            if let Some(sequence) = plan
                .command
                .split_whitespace()
                .nth(1)
                .map(|sequence| work_dir.join(sequence))
            {
                move_matching(&sequence, "*.bmp", work_dir)?;
            }
        }

        if self.config.cleanup {
            remove_here(work_dir, &inputs)?;
            if let Some(exe_name) = plan.executable_name() {
                remove_here(work_dir, &[exe_name])?;
            }
        }

        // change report file mode
        let mut artifacts = vec![];
        let pattern = get_report_pattern(work_dir, &plan.report_file);
        for entry in glob::glob(&pattern)? {
            let path = entry?;
            std::fs::set_permissions(&path, Permissions::from_mode(0o644))
                .with_context(|| format!("cannot chmod {}", path.display()))?;
            debug!("chmod 644 {}", path.display());
            artifacts.push(path);
        }

        let finished = Local::now();
        info!(
            "Finished {} in {}s, log at {}",
            plan.report_file,
            (finished - started).num_seconds(),
            log_path.display()
        );

        Ok(RunRecord {
            report_file: plan.report_file.clone(),
            threads: plan.threads,
            log_path,
            exit_success: status.success(),
            artifacts,
            started,
            finished,
        })
    }
}

fn remove_here(work_dir: &Path, names: &[OsString]) -> anyhow::Result<()> {
    for name in names {
        let path = work_dir.join(name);
        if path.is_dir() {
            std::fs::remove_dir_all(&path)?;
        } else if path.is_file() {
            std::fs::remove_file(&path)?;
        }
    }
    Ok(())
}

fn copy_dir_all(src: &Path, dst: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(dst)?;
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_all(&entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Copy everything in `src_dir` into `work_dir`, replacing stale copies
fn copy_here(src_dir: &Path, work_dir: &Path) -> anyhow::Result<Vec<OsString>> {
    let mut names = vec![];
    for entry in std::fs::read_dir(src_dir)? {
        names.push(entry?.file_name());
    }
    names.sort();
    remove_here(work_dir, &names)?;

    for name in &names {
        let src = src_dir.join(name);
        let dst = work_dir.join(name);
        debug!("Copying {} to {}", src.display(), dst.display());
        if src.is_dir() {
            copy_dir_all(&src, &dst)?;
        } else {
            std::fs::copy(&src, &dst)
                .with_context(|| format!("cannot copy {}", src.display()))?;
        }
    }
    info!(
        "Copied {} inputs from {}",
        names.len(),
        src_dir.display()
    );
    Ok(names)
}

fn move_matching(src_dir: &Path, pattern: &str, dst_dir: &Path) -> anyhow::Result<()> {
    let pattern = src_dir
        .join(pattern)
        .display()
        .to_string();
    for entry in glob::glob(&pattern)? {
        let path = entry?;
        if let Some(name) = path.file_name() {
            let dst = dst_dir.join(name);
            info!("Moving {} to {}", path.display(), dst.display());
            std::fs::rename(&path, &dst)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{
        BenchmarkTable, MemoryModel, RunRequest, Runner, RunnerConfig, Suite, Workload,
    };
    use std::{
        os::unix::fs::PermissionsExt,
        path::{Path, PathBuf},
    };

    const TEMPLATE: &str = "\
cpuemul[0:__CPU_MAX_ID__] = 'QEMUSectionCPU'
cpusimu[0:__CPU_MAX_ID__] = 'tradCORE'
memModel = '__MEMORY_MODEL__'
storePrefetch = __STORE_PREFETCH__
benchName = \"__BENCH_NAME__\"
reportFile = '__REPORT_FILE__'
";

    const SIMU_CONF: &str = "\
robSize = 128
maxLoads = 32
maxStores = 32
sctsoVerifyLd = false
";

    struct Setup {
        _dir: tempfile::TempDir,
        root: PathBuf,
        work: PathBuf,
        config: RunnerConfig,
    }

    fn write_executable(path: &Path, content: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    fn setup(simulator: &str) -> Setup {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("program");
        let work = dir.path().join("run");
        std::fs::create_dir_all(&work).unwrap();
        std::fs::write(work.join("esesc.conf.template"), TEMPLATE).unwrap();
        std::fs::write(work.join("simu.conf"), SIMU_CONF).unwrap();

        let sim = dir.path().join("main").join("esesc");
        write_executable(&sim, simulator);

        let config = RunnerConfig {
            bench_root: root.clone(),
            work_dir: work.clone(),
            simulator: sim,
            ..Default::default()
        };
        Setup {
            _dir: dir,
            root,
            work,
            config,
        }
    }

    fn list_dir(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_plan_blackscholes() {
        let s = setup("#!/bin/sh\n");
        write_executable(&s.root.join("parsec/blackscholes/blackscholes"), "");
        std::fs::create_dir_all(s.root.join("parsec/blackscholes/small")).unwrap();
        let runner = Runner::new(s.config.clone(), BenchmarkTable::builtin(Suite::Parsec3));

        let request = RunRequest::sized(Suite::Parsec3, "blackscholes", "small", 8);
        let plan = runner.plan(&request).unwrap();
        assert_eq!(plan.threads, 8);
        assert_eq!(plan.command, "blackscholes 8 in_4K.txt blackscholes_small.out");
        assert_eq!(plan.report_file, "parsec_blackscholes_tso_small_c8_t8_pf0");
        assert_eq!(plan.placeholders.cpu_max_id, 7);
        assert_eq!(
            plan.input_dir,
            Some(s.root.join("parsec/blackscholes/small"))
        );

        // explicit thread count and comment
        let mut request = request.clone();
        request.threads = Some(3);
        request.model = MemoryModel::UsqTso;
        request.comment = Some("retry".to_string());
        let plan = runner.plan(&request).unwrap();
        assert_eq!(plan.command, "blackscholes 3 in_4K.txt blackscholes_small.out");
        assert_eq!(plan.report_file, "parsec_blackscholes_usqtso_small_c8_t3_pf0_retry");
        assert_eq!(plan.placeholders.memory_model, "tso");
    }

    #[test]
    fn test_plan_launcher() {
        let s = setup("#!/bin/sh\n");
        let runner = Runner::new(s.config.clone(), BenchmarkTable::builtin(Suite::Launcher));
        assert!(
            runner
                .plan(&RunRequest::sized(Suite::Launcher, "canneal", "dev", 5))
                .is_err()
        );
        std::fs::create_dir_all(s.root.join("launcher/canneal/dev")).unwrap();
        let plan = runner
            .plan(&RunRequest::sized(Suite::Launcher, "canneal", "dev", 5))
            .unwrap();
        assert_eq!(plan.threads, 4);
        assert_eq!(plan.command, "launcher -- canneal 4 100 300 100.nets 2");
        assert_eq!(plan.report_file, "canneal_dev_c5_t4");
        assert_eq!(plan.executable, None);
    }

    #[test]
    fn test_plan_failures_have_no_side_effects() {
        let s = setup("#!/bin/sh\ntouch ran\n");
        let runner = Runner::new(s.config.clone(), BenchmarkTable::builtin(Suite::Parsec3));
        let before = list_dir(&s.work);

        // unknown benchmark
        let request = RunRequest::sized(Suite::Parsec3, "doom", "small", 8);
        assert!(runner.run(&request).is_err());
        // unknown size
        let request = RunRequest::sized(Suite::Parsec3, "blackscholes", "huge", 8);
        assert!(runner.run(&request).is_err());
        // missing executable
        let request = RunRequest::sized(Suite::Parsec3, "blackscholes", "small", 8);
        assert!(runner.run(&request).is_err());
        // missing inputs
        write_executable(&s.root.join("parsec/blackscholes/blackscholes"), "");
        assert!(runner.run(&request).is_err());
        // policy leaves no thread
        write_executable(&s.root.join("parsec/vips/vips"), "");
        let request = RunRequest::sized(Suite::Parsec3, "vips", "dev", 2);
        assert!(runner.run(&request).is_err());
        // wrong suite
        let request = RunRequest::micro("dekker", 10);
        assert!(runner.run(&request).is_err());

        assert_eq!(list_dir(&s.work), before);
    }

    #[test]
    fn test_run_splash_with_input_template() {
        let s = setup("#!/bin/sh\necho \"simulating $(grep benchName esesc.conf)\"\ntouch esesc_splash_barnes_usqtso_dev_c4_t4_pf1.conf\n");
        write_executable(&s.root.join("splash/barnes/barnes"), "#!/bin/sh\n");
        let input = s.root.join("splash/barnes/dev");
        std::fs::create_dir_all(input.join("data")).unwrap();
        std::fs::write(input.join("input.template"), "16384\nNUMPROCS\n").unwrap();
        std::fs::write(input.join("data/bodies.txt"), "1 2 3\n").unwrap();
        // stale copy gets replaced
        std::fs::write(s.work.join("input.template"), "stale\n").unwrap();

        let runner = Runner::new(s.config.clone(), BenchmarkTable::builtin(Suite::Splash2x));
        let mut request = RunRequest::sized(Suite::Splash2x, "barnes", "dev", 4);
        request.model = MemoryModel::UsqTso;
        request.prefetch = "1".to_string();
        let record = runner.run(&request).unwrap();

        assert_eq!(record.report_file, "splash_barnes_usqtso_dev_c4_t4_pf1");
        assert_eq!(record.threads, 4);
        assert!(s.work.join("barnes").is_file());
        assert_eq!(
            std::fs::read_to_string(s.work.join("input.template")).unwrap(),
            "16384\n4\n"
        );
        assert_eq!(
            std::fs::read_to_string(s.work.join("data/bodies.txt")).unwrap(),
            "1 2 3\n"
        );

        let config = std::fs::read_to_string(s.work.join("esesc.conf")).unwrap();
        assert!(config.contains("cpusimu[0:3] = 'tradCORE'"));
        assert!(config.contains("memModel = 'tso'"));
        assert!(config.contains("storePrefetch = 1"));
        assert!(config.contains("benchName = \"barnes -f input.template\""));
        assert!(config.contains("reportFile = 'splash_barnes_usqtso_dev_c4_t4_pf1'"));

        let simu = std::fs::read_to_string(s.work.join("simu.conf")).unwrap();
        assert!(simu.contains("maxStores = 1024"));
        assert!(simu.contains("sctsoVerifyLd = false"));

        let log = std::fs::read_to_string(&record.log_path).unwrap();
        assert!(log.contains("simulating benchName = \"barnes -f input.template\""));

        assert_eq!(record.artifacts.len(), 1);
        let mode = std::fs::metadata(&record.artifacts[0])
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[test]
    fn test_run_micro_with_cleanup() {
        let mut s = setup("#!/bin/sh\necho done\n");
        s.config.cleanup = true;
        write_executable(&s.root.join("micro/dekker/dekker"), "#!/bin/sh\n");
        let runner = Runner::new(s.config.clone(), BenchmarkTable::builtin(Suite::Micro));

        let mut request = RunRequest::micro("dekker", 1000);
        request.verify_ld = true;
        assert_eq!(request.workload, Workload::Iterations(1000));
        let record = runner.run(&request).unwrap();
        assert_eq!(record.report_file, "micro_dekker_tso_pf0_v1");

        let config = std::fs::read_to_string(s.work.join("esesc.conf")).unwrap();
        assert!(config.contains("cpusimu[0:0] = 'tradCORE'"));
        assert!(config.contains("benchName = \"dekker 1000\""));
        let simu = std::fs::read_to_string(s.work.join("simu.conf")).unwrap();
        assert!(simu.contains("sctsoVerifyLd = true"));
        assert!(simu.contains("maxStores = 32"));
        // executable removed again
        assert!(!s.work.join("dekker").exists());
        assert!(s.work.join("micro_dekker_tso_pf0_v1.log").is_file());
    }

    #[test]
    fn test_run_comment_with_spaces() {
        let s = setup("#!/bin/sh\necho done\ntouch 'esesc_micro_dekker_tso_pf0_v0_first try; touch x.conf'\n");
        write_executable(&s.root.join("micro/dekker/dekker"), "#!/bin/sh\n");
        let runner = Runner::new(s.config.clone(), BenchmarkTable::builtin(Suite::Micro));

        let mut request = RunRequest::micro("dekker", 10);
        request.comment = Some("first try; touch x".to_string());
        let record = runner.run(&request).unwrap();
        assert_eq!(record.report_file, "micro_dekker_tso_pf0_v0_first try; touch x");
        assert!(record.log_path.is_file());
        assert_eq!(
            std::fs::read_to_string(&record.log_path).unwrap(),
            "done\n"
        );
        assert!(!s.work.join("x").exists());
        assert!(!s.work.join("micro_dekker_tso_pf0_v0_first").exists());
        assert_eq!(record.artifacts.len(), 1);
    }

    #[test]
    fn test_runner_config_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runner.json");
        std::fs::write(&path, r#"{"bench_root": "/opt/bench", "cleanup": true}"#).unwrap();
        let config = RunnerConfig::from_json(&path).unwrap();
        assert_eq!(config.bench_root, PathBuf::from("/opt/bench"));
        assert!(config.cleanup);
        assert_eq!(config.simulator, PathBuf::from("../main/esesc"));
        assert_eq!(config.template, "esesc.conf.template");
    }
}
