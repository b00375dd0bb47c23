use anyhow::Context;
use regex::{NoExpand, Regex};
use std::path::Path;

pub const CPU_MAX_ID_TOKEN: &str = "__CPU_MAX_ID__";
pub const MEMORY_MODEL_TOKEN: &str = "__MEMORY_MODEL__";
pub const STORE_PREFETCH_TOKEN: &str = "__STORE_PREFETCH__";
pub const BENCH_NAME_TOKEN: &str = "__BENCH_NAME__";
pub const REPORT_FILE_TOKEN: &str = "__REPORT_FILE__";

/// Token in SPLASH `input.template` files standing for the thread count
pub const NUMPROCS_TOKEN: &str = "NUMPROCS";

/// Values substituted into the simulator configuration template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholders {
    /// Highest simulated core id, i.e. core count - 1
    pub cpu_max_id: u32,
    pub memory_model: String,
    pub store_prefetch: String,
    /// Full benchmark command line
    pub bench_name: String,
    /// Report file base name
    pub report_file: String,
}

impl Placeholders {
    /// Literal replacement of every placeholder occurrence
    pub fn render(&self, template: &str) -> String {
        template
            .replace(CPU_MAX_ID_TOKEN, &self.cpu_max_id.to_string())
            .replace(MEMORY_MODEL_TOKEN, &self.memory_model)
            .replace(STORE_PREFETCH_TOKEN, &self.store_prefetch)
            .replace(BENCH_NAME_TOKEN, &self.bench_name)
            .replace(REPORT_FILE_TOKEN, &self.report_file)
    }

    pub fn render_file<P1: AsRef<Path>, P2: AsRef<Path>>(
        &self,
        template_path: P1,
        output_path: P2,
    ) -> anyhow::Result<()> {
        let template_path = template_path.as_ref();
        let template = std::fs::read_to_string(template_path)
            .with_context(|| format!("cannot read template {}", template_path.display()))?;
        std::fs::write(output_path.as_ref(), self.render(&template)).with_context(|| {
            format!(
                "cannot write configuration {}",
                output_path.as_ref().display()
            )
        })?;
        Ok(())
    }
}

/// Replace every line starting with `key` by `key = value`
pub fn set_key(text: &str, key: &str, value: &str) -> anyhow::Result<String> {
    let re = Regex::new(&format!(r"(?m)^{}.*$", regex::escape(key)))?;
    let line = format!("{} = {}", key, value);
    Ok(re.replace_all(text, NoExpand(&line)).into_owned())
}

pub fn set_key_in_file<P: AsRef<Path>>(path: P, key: &str, value: &str) -> anyhow::Result<()> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    std::fs::write(path, set_key(&text, key, value)?)
        .with_context(|| format!("cannot write {}", path.display()))?;
    Ok(())
}

pub fn fill_numprocs(text: &str, threads: u32) -> String {
    text.replace(NUMPROCS_TOKEN, &threads.to_string())
}
