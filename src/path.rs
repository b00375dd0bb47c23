// benchmark root structure:
// {bench_root}/
// |- launcher/
//    \- {benchmark-name}/{size}/...            inputs, the launcher binary runs them
// |- parsec/
//    \- {benchmark-name}/
//       |- {benchmark-name}                    executable
//       \- {size}/...                          inputs
// |- splash/
//    \- {benchmark-name}/
//       |- {benchmark-name}
//       \- {size}/...
// |- splash_wmm/
//    \- {benchmark-name}_wmm                   builds with fences for weak models
// \- micro/
//    \- {benchmark-name}/{benchmark-name}
//
// working directory structure:
// {work_dir}/
// |- esesc.conf.template
// |- esesc.conf                                rendered from the template
// |- simu.conf
// |- {report}.log                              simulator stdout & stderr
// \- esesc_{report}.*                          simulator reports

use crate::{MemoryModel, Suite};
use anyhow::bail;
use std::path::{Path, PathBuf};

pub fn get_executable_path<P: AsRef<Path>>(
    bench_root: P,
    suite: Suite,
    name: &str,
    model: MemoryModel,
) -> Option<PathBuf> {
    let root = bench_root.as_ref();
    match suite {
        Suite::Launcher => None,
        Suite::Parsec3 => Some(root.join("parsec").join(name).join(name)),
        Suite::Splash2x if model.is_weak() && (name == "barnes" || name == "fmm") => {
            Some(root.join("splash_wmm").join(format!("{}_wmm", name)))
        }
        Suite::Splash2x => Some(root.join("splash").join(name).join(name)),
        Suite::Micro => Some(root.join("micro").join(name).join(name)),
    }
}

pub fn get_input_dir<P: AsRef<Path>>(
    bench_root: P,
    suite: Suite,
    name: &str,
    size: &str,
) -> Option<PathBuf> {
    let root = bench_root.as_ref();
    match suite {
        Suite::Launcher => Some(root.join("launcher").join(name).join(size)),
        // facesim ships one input set for every size
        Suite::Parsec3 if name == "facesim" => Some(root.join("parsec").join(name).join("dev")),
        Suite::Parsec3 => Some(root.join("parsec").join(name).join(size)),
        Suite::Splash2x => Some(root.join("splash").join(name).join(size)),
        Suite::Micro => None,
    }
}

pub fn get_log_path<P: AsRef<Path>>(work_dir: P, report_file: &str) -> PathBuf {
    work_dir.as_ref().join(format!("{}.log", report_file))
}

/// Glob pattern matching the reports the simulator writes for `report_file`
pub fn get_report_pattern<P: AsRef<Path>>(work_dir: P, report_file: &str) -> String {
    let dir = glob::Pattern::escape(&work_dir.as_ref().display().to_string());
    Path::new(&dir)
        .join(format!("esesc_{}.*", glob::Pattern::escape(report_file)))
        .display()
        .to_string()
}

/// Base name of a log: its file name up to the first dot
pub fn get_log_base_name<P: AsRef<Path>>(log_path: P) -> anyhow::Result<String> {
    let log_path = log_path.as_ref();
    let file_name = match log_path.file_name().and_then(|name| name.to_str()) {
        Some(name) => name,
        None => bail!("cannot derive base name of {}", log_path.display()),
    };
    let base = file_name.split('.').next().unwrap_or(file_name);
    if base.is_empty() {
        bail!("cannot derive base name of {}", log_path.display());
    }
    Ok(base.to_string())
}

/// Paths of the json and npz dumps of a log inside `output_dir`
pub fn get_dump_paths<P1: AsRef<Path>, P2: AsRef<Path>>(
    log_path: P1,
    output_dir: P2,
) -> anyhow::Result<(PathBuf, PathBuf)> {
    let base = get_log_base_name(log_path)?;
    let dir = output_dir.as_ref();
    Ok((
        dir.join(format!("{}.json", base)),
        dir.join(format!("{}.npz", base)),
    ))
}

/// Dump paths of a log, refusing a missing `output_dir` or an existing dump
pub fn prepare_dump_paths<P1: AsRef<Path>, P2: AsRef<Path>>(
    log_path: P1,
    output_dir: P2,
) -> anyhow::Result<(PathBuf, PathBuf)> {
    let output_dir = output_dir.as_ref();
    if !output_dir.is_dir() {
        bail!("cannot find {}", output_dir.display());
    }
    let (json, npz) = get_dump_paths(log_path, output_dir)?;
    for path in [&json, &npz] {
        if path.exists() {
            bail!("{} already exists", path.display());
        }
    }
    Ok((json, npz))
}

#[cfg(test)]
mod tests {
    use crate::{
        MemoryModel, Suite, get_dump_paths, get_executable_path, get_input_dir,
        get_log_base_name, get_report_pattern, prepare_dump_paths,
    };
    use std::path::PathBuf;

    #[test]
    fn test_executable_paths() {
        let root = PathBuf::from("/bench");
        assert_eq!(
            get_executable_path(&root, Suite::Parsec3, "vips", MemoryModel::Tso),
            Some(PathBuf::from("/bench/parsec/vips/vips"))
        );
        assert_eq!(
            get_executable_path(&root, Suite::Splash2x, "fmm", MemoryModel::Wmm),
            Some(PathBuf::from("/bench/splash_wmm/fmm_wmm"))
        );
        assert_eq!(
            get_executable_path(&root, Suite::Splash2x, "fmm", MemoryModel::Tso),
            Some(PathBuf::from("/bench/splash/fmm/fmm"))
        );
        assert_eq!(
            get_executable_path(&root, Suite::Splash2x, "fft", MemoryModel::Rcm),
            Some(PathBuf::from("/bench/splash/fft/fft"))
        );
        assert_eq!(
            get_executable_path(&root, Suite::Launcher, "fft", MemoryModel::Tso),
            None
        );
    }

    #[test]
    fn test_input_dirs() {
        let root = PathBuf::from("/bench");
        assert_eq!(
            get_input_dir(&root, Suite::Parsec3, "facesim", "large"),
            Some(PathBuf::from("/bench/parsec/facesim/dev"))
        );
        assert_eq!(
            get_input_dir(&root, Suite::Launcher, "canneal", "small"),
            Some(PathBuf::from("/bench/launcher/canneal/small"))
        );
        assert_eq!(get_input_dir(&root, Suite::Micro, "dekker", "dev"), None);
    }

    #[test]
    fn test_base_name() {
        assert_eq!(
            get_log_base_name("logs/parsec_vips_tso_dev_c8_t6_pf0.log").unwrap(),
            "parsec_vips_tso_dev_c8_t6_pf0"
        );
        assert_eq!(get_log_base_name("a.b.log.zst").unwrap(), "a");
        assert!(get_log_base_name(".hidden").is_err());

        let (json, npz) = get_dump_paths("logs/run.log", "out").unwrap();
        assert_eq!(json, PathBuf::from("out/run.json"));
        assert_eq!(npz, PathBuf::from("out/run.npz"));
    }

    #[test]
    fn test_report_pattern() {
        assert_eq!(
            get_report_pattern("/work", "micro_dekker_tso_pf0_v1"),
            "/work/esesc_micro_dekker_tso_pf0_v1.*"
        );
        assert_eq!(
            get_report_pattern("/work[1]*", "a[b]"),
            "/work[[]1[]][*]/esesc_a[[]b[]].*"
        );
    }

    #[test]
    fn test_report_pattern_matches_in_odd_dir() {
        let dir = tempfile::tempdir().unwrap();
        let work = dir.path().join("run [1]");
        std::fs::create_dir_all(&work).unwrap();
        std::fs::write(work.join("esesc_run.conf"), "").unwrap();
        let matches: Vec<_> = glob::glob(&get_report_pattern(&work, "run"))
            .unwrap()
            .map(|entry| entry.unwrap())
            .collect();
        assert_eq!(matches, vec![work.join("esesc_run.conf")]);
    }

    #[test]
    fn test_prepare_dump_paths() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        // missing directory
        assert!(prepare_dump_paths("logs/run.log", &out).is_err());

        std::fs::create_dir_all(&out).unwrap();
        let (json, npz) = prepare_dump_paths("logs/run.log", &out).unwrap();
        assert_eq!(json, out.join("run.json"));
        assert_eq!(npz, out.join("run.npz"));

        // existing json
        std::fs::write(&json, "{}").unwrap();
        assert!(prepare_dump_paths("logs/run.log", &out).is_err());
        std::fs::remove_file(&json).unwrap();

        // existing npz
        std::fs::write(&npz, "").unwrap();
        assert!(prepare_dump_paths("logs/run.log", &out).is_err());
    }
}
