// Extraction of counters from a simulator log.
//
// The log is scanned twice: once for the configuration echoed at its top,
// then once more dispatching every line to the first counter rule matching it.
mod category;
mod check;
mod rates;
mod report;

pub use category::*;
pub use check::*;
pub use rates::*;
pub use report::*;

use crate::{CounterTable, CounterValue};
use anyhow::{Context, bail};
use once_cell::sync::Lazy;
use regex::{Captures, Regex, RegexSet};

/// Largest core count and ROB size a log may declare
pub const MAX_CORES: i64 = 4096;
pub const MAX_ROB_SIZE: i64 = 4096;

/// Configuration scalars, -1 until found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimConfig {
    pub core_num: i64,
    pub max_ld: i64,
    pub max_st: i64,
    pub rob_size: i64,
    pub retire_width: i64,
    pub issue_width: i64,
    /// Load verification switch, `None` if the log does not say
    pub verify_ld: Option<bool>,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            core_num: -1,
            max_ld: -1,
            max_st: -1,
            rob_size: -1,
            retire_width: -1,
            issue_width: -1,
            verify_ld: None,
        }
    }
}

static CORE_NUM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"cpusimu\[0:(\d+)\]").unwrap());
static MAX_LD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"maxLoads\s*=\s*(\d+)").unwrap());
static MAX_ST_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"maxStores\s*=\s*(\d+)").unwrap());
static ROB_SIZE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"robSize\s*=\s*(\d+)").unwrap());
static RETIRE_WIDTH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"retireWidth\s*=\s*(\d+)").unwrap());
static ISSUE_WIDTH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"issueWidth\s*=\s*(\d+)").unwrap());
static VERIFY_LD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"sctsoVerifyLd\s*=\s*(true|false)").unwrap());

fn first_int(re: &Regex, line: &str) -> Option<i64> {
    re.captures(line).and_then(|caps| caps[1].parse().ok())
}

impl SimConfig {
    fn required_found(&self) -> bool {
        self.core_num > 0
            && self.max_ld > 0
            && self.max_st > 0
            && self.rob_size > 0
            && self.retire_width > 0
            && self.issue_width > 0
    }

    /// First match wins; the scan stops once everything has been seen
    pub fn parse(text: &str) -> Self {
        let mut config = SimConfig::default();
        for line in text.lines() {
            if config.required_found() && config.verify_ld.is_some() {
                break;
            }
            // one value per line
            if config.core_num == -1 {
                if let Some(max_id) = first_int(&CORE_NUM_RE, line) {
                    config.core_num = max_id.saturating_add(1);
                    continue;
                }
            }
            let scalars: [(&Lazy<Regex>, &mut i64); 5] = [
                (&MAX_LD_RE, &mut config.max_ld),
                (&MAX_ST_RE, &mut config.max_st),
                (&ROB_SIZE_RE, &mut config.rob_size),
                (&RETIRE_WIDTH_RE, &mut config.retire_width),
                (&ISSUE_WIDTH_RE, &mut config.issue_width),
            ];
            let mut matched = false;
            for (re, slot) in scalars {
                if *slot == -1 {
                    if let Some(value) = first_int(re, line) {
                        *slot = value;
                        matched = true;
                        break;
                    }
                }
            }
            if matched {
                continue;
            }
            if config.verify_ld.is_none() {
                if let Some(caps) = VERIFY_LD_RE.captures(line) {
                    config.verify_ld = Some(&caps[1] == "true");
                }
            }
        }
        config
    }
}

/// Cache levels, L3 is shared and has a single slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheLevel {
    DL1,
    L2,
    L3,
}

impl CacheLevel {
    pub const ALL: [CacheLevel; 3] = [CacheLevel::DL1, CacheLevel::L2, CacheLevel::L3];

    pub fn name(&self) -> &'static str {
        match self {
            CacheLevel::DL1 => "DL1",
            CacheLevel::L2 => "L2",
            CacheLevel::L3 => "L3",
        }
    }

    pub fn slots(&self, core_num: usize) -> usize {
        match self {
            CacheLevel::L3 => 1,
            _ => core_num,
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        CacheLevel::ALL
            .iter()
            .copied()
            .find(|level| level.name() == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CacheStats {
    pub level: CacheLevel,
    /// Misses that allocate a new request
    pub miss: CoreCounts<MemAccess>,
    /// Requests merged into an outstanding miss
    pub half_miss: CoreCounts<MemAccess>,
    /// Requests the level received, when reported
    pub handled_req: Vec<Option<i64>>,
}

impl CacheStats {
    fn new(level: CacheLevel, slots: usize) -> Self {
        CacheStats {
            level,
            miss: CoreCounts::new(slots),
            half_miss: CoreCounts::new(slots),
            handled_req: vec![None; slots],
        }
    }

    /// Sum of read, write and prefetch full misses of one slot
    pub fn total_miss(&self, slot: usize) -> i64 {
        MemAccess::ALL
            .iter()
            .map(|access| self.miss.get(slot, *access))
            .sum()
    }
}

/// Everything extracted from one log
#[derive(Debug, Clone, PartialEq)]
pub struct Stats {
    pub config: SimConfig,
    pub wall_clock: i64,
    pub sim_time: i64,
    /// Committed instructions per core
    pub inst: Vec<i64>,
    /// Active cycles per core
    pub cycle: Vec<i64>,
    pub inst_mix: CoreCounts<InstClass>,
    pub lsq: CoreCounts<LsqEvent>,
    pub retire: CoreCounts<RetireStall>,
    pub issue: CoreCounts<IssueStall>,
    /// Sum of the per unit window stalls, `None` if a core has none
    pub unit_small_win: Vec<Option<i64>>,
    /// ROB occupancy histogram, robSize + 1 buckets per core
    pub rob_usage: Vec<Vec<i64>>,
    pub mem_num: CoreCounts<MemAccess>,
    pub mem_lat: CoreCounts<MemAccess, f64>,
    /// Indexed like `CacheLevel::ALL`
    pub caches: Vec<CacheStats>,
}

#[derive(Debug, Clone, Copy)]
enum Rule {
    WallClock,
    SimTime,
    Committed,
    ActiveCycles,
    InstMix,
    Lsq,
    Retire,
    UnitSmallWin,
    Issue,
    RobUsage,
    MemLat,
    Miss,
    HandledReq,
}

const RULES: [(Rule, &str); 13] = [
    (Rule::WallClock, r"OS:wallClock\s*=\s*(\d+)"),
    (Rule::SimTime, r"OS:simTime\s*=\s*(\d+)"),
    (Rule::Committed, r"P\((\d+)\):nCommitted\s*=\s*(\d+)"),
    (Rule::ActiveCycles, r"P\((\d+)\)_activeCyc\s*=\s*(\d+)"),
    (Rule::InstMix, r"P\((\d+)\)_ExeEngine_i(\w+):n=(\d+)"),
    (Rule::Lsq, r"P\((\d+)\)_MTLSQ_n(\w+)\s*=\s*(\d+)"),
    (Rule::Retire, r"P\((\d+)\)_retireStallBy(\w+)\s*=\s*(\d+)"),
    (Rule::UnitSmallWin, r"P\((\d+)\)_(\w+)_nSmallWinStall\s*=\s*(\d+)"),
    (Rule::Issue, r"P\((\d+)\)_(?:ExeEngine:)?n(\w+)Stall\s*=\s*(\d+)"),
    (Rule::RobUsage, r"P\((\d+)\)_robUsage\((\d+)\)\s*=\s*(\d+)"),
    (
        Rule::MemLat,
        r"DL1\((\d+)\)[_:](\w+)MemLat:n=(\d+)::v=(\d+(?:\.\d*)?(?:[eE][-+]?\d+)?)",
    ),
    (
        Rule::Miss,
        r"(DL1|L2|L3)\((\d+)\)[_:](read|write|prefetch)(Half)?Miss\s*=\s*(\d+)",
    ),
    (Rule::HandledReq, r"(L2|L3)\((\d+)\)[_:]handledReq\s*=\s*(\d+)"),
];

static RULE_SET: Lazy<RegexSet> =
    Lazy::new(|| RegexSet::new(RULES.iter().map(|(_, re)| *re)).unwrap());
static RULE_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    RULES
        .iter()
        .map(|(_, re)| Regex::new(re).unwrap())
        .collect()
});

fn parse_int(text: &str) -> anyhow::Result<i64> {
    text.parse()
        .with_context(|| format!("cannot parse counter value {}", text))
}

fn slot_index(text: &str, slots: usize, what: &str, core_num: i64) -> anyhow::Result<usize> {
    let index: usize = text
        .parse()
        .with_context(|| format!("cannot parse index {} of {}", text, what))?;
    if index >= slots {
        bail!(
            "index {} of {} out of range, coreNum is {}",
            index,
            what,
            core_num
        );
    }
    Ok(index)
}

impl Stats {
    /// Empty counters sized by the configuration
    pub fn new(config: SimConfig) -> anyhow::Result<Self> {
        if config.core_num < 1 {
            bail!("cannot find core number (cpusimu[0:N]) in log");
        }
        if config.core_num > MAX_CORES {
            bail!("core number {} exceeds {}", config.core_num, MAX_CORES);
        }
        if config.rob_size > MAX_ROB_SIZE {
            bail!("robSize {} exceeds {}", config.rob_size, MAX_ROB_SIZE);
        }
        let cores = config.core_num as usize;
        let buckets = (config.rob_size + 1).max(0) as usize;
        Ok(Stats {
            config,
            wall_clock: -1,
            sim_time: -1,
            inst: vec![-1; cores],
            cycle: vec![-1; cores],
            inst_mix: CoreCounts::new(cores),
            lsq: CoreCounts::new(cores),
            retire: CoreCounts::new(cores),
            issue: CoreCounts::new(cores),
            unit_small_win: vec![None; cores],
            rob_usage: vec![vec![0; buckets]; cores],
            mem_num: CoreCounts::new(cores),
            mem_lat: CoreCounts::new(cores),
            caches: CacheLevel::ALL
                .iter()
                .map(|level| CacheStats::new(*level, level.slots(cores)))
                .collect(),
        })
    }

    pub fn cores(&self) -> usize {
        self.inst.len()
    }

    pub fn cache(&self, level: CacheLevel) -> &CacheStats {
        &self.caches[level as usize]
    }

    /// Extract every counter of a log
    pub fn extract(text: &str) -> anyhow::Result<Self> {
        let mut stats = Stats::new(SimConfig::parse(text))?;
        for (line_no, line) in text.lines().enumerate() {
            stats
                .scan_line(line)
                .with_context(|| format!("line {}: {}", line_no + 1, line.trim()))?;
        }
        Ok(stats)
    }

    fn core(&self, text: &str, what: &str) -> anyhow::Result<usize> {
        slot_index(text, self.cores(), what, self.config.core_num)
    }

    fn record<C: Category>(
        counts: &mut CoreCounts<C>,
        core: usize,
        label: &str,
        count: i64,
    ) -> anyhow::Result<()> {
        match C::classify(label) {
            Some(category) => counts.record(core, category, count),
            // silent typos in counter names would skew every table
            None if count != 0 => bail!("unknown {} {}", C::KIND, label),
            None => {}
        }
        Ok(())
    }

    fn scan_line(&mut self, line: &str) -> anyhow::Result<()> {
        let index = match RULE_SET.matches(line).iter().next() {
            Some(index) => index,
            None => return Ok(()),
        };
        let caps = match RULE_RES[index].captures(line) {
            Some(caps) => caps,
            None => return Ok(()),
        };
        self.apply(RULES[index].0, &caps)
    }

    fn apply(&mut self, rule: Rule, caps: &Captures) -> anyhow::Result<()> {
        match rule {
            Rule::WallClock => {
                if self.wall_clock == -1 {
                    self.wall_clock = parse_int(&caps[1])?;
                }
            }
            Rule::SimTime => {
                if self.sim_time == -1 {
                    self.sim_time = parse_int(&caps[1])?;
                }
            }
            Rule::Committed => {
                let core = self.core(&caps[1], "nCommitted")?;
                self.inst[core] = parse_int(&caps[2])?;
            }
            Rule::ActiveCycles => {
                let core = self.core(&caps[1], "activeCyc")?;
                self.cycle[core] = parse_int(&caps[2])?;
            }
            Rule::InstMix => {
                let core = self.core(&caps[1], InstClass::KIND)?;
                Self::record(&mut self.inst_mix, core, &caps[2], parse_int(&caps[3])?)?;
            }
            Rule::Lsq => {
                let core = self.core(&caps[1], LsqEvent::KIND)?;
                Self::record(&mut self.lsq, core, &caps[2], parse_int(&caps[3])?)?;
            }
            Rule::Retire => {
                let core = self.core(&caps[1], RetireStall::KIND)?;
                Self::record(&mut self.retire, core, &caps[2], parse_int(&caps[3])?)?;
            }
            Rule::UnitSmallWin => {
                let core = self.core(&caps[1], "nSmallWinStall")?;
                let count = parse_int(&caps[3])?;
                let sum = self.unit_small_win[core].unwrap_or(0) + count;
                self.unit_small_win[core] = Some(sum);
            }
            Rule::Issue => {
                let core = self.core(&caps[1], IssueStall::KIND)?;
                Self::record(&mut self.issue, core, &caps[2], parse_int(&caps[3])?)?;
            }
            Rule::RobUsage => {
                let core = self.core(&caps[1], "robUsage")?;
                let bucket = parse_int(&caps[2])?;
                if bucket > self.config.rob_size {
                    bail!(
                        "robUsage bucket {} exceeds robSize {}",
                        bucket,
                        self.config.rob_size
                    );
                }
                self.rob_usage[core][bucket as usize] = parse_int(&caps[3])?;
            }
            Rule::MemLat => {
                let core = self.core(&caps[1], "MemLat")?;
                let num = parse_int(&caps[3])?;
                match MemAccess::classify(&caps[2]) {
                    Some(access) => {
                        let lat: f64 = caps[4]
                            .parse()
                            .with_context(|| format!("cannot parse latency {}", &caps[4]))?;
                        self.mem_num.set(core, access, num);
                        self.mem_lat.set(core, access, lat);
                    }
                    None if num != 0 => bail!("unknown {} {}", MemAccess::KIND, &caps[2]),
                    None => {}
                }
            }
            Rule::Miss => {
                // the regex only admits known levels and request kinds
                if let (Some(level), Some(access)) = (
                    CacheLevel::from_name(&caps[1]),
                    MemAccess::classify(&caps[3]),
                ) {
                    let slots = level.slots(self.cores());
                    let slot = slot_index(&caps[2], slots, level.name(), self.config.core_num)?;
                    let count = parse_int(&caps[5])?;
                    let cache = &mut self.caches[level as usize];
                    if caps.get(4).is_some() {
                        cache.half_miss.set(slot, access, count);
                    } else {
                        cache.miss.set(slot, access, count);
                    }
                }
            }
            Rule::HandledReq => {
                if let Some(level) = CacheLevel::from_name(&caps[1]) {
                    let slots = level.slots(self.cores());
                    let slot = slot_index(&caps[2], slots, level.name(), self.config.core_num)?;
                    self.caches[level as usize].handled_req[slot] = Some(parse_int(&caps[3])?);
                }
            }
        }
        Ok(())
    }

    /// Flat counter table for the dumps
    pub fn to_counters(&self) -> CounterTable {
        let mut table = CounterTable::new();
        let config = &self.config;
        for (key, value) in [
            ("coreNum", config.core_num),
            ("maxLd", config.max_ld),
            ("maxSt", config.max_st),
            ("robSize", config.rob_size),
            ("retireWidth", config.retire_width),
            ("issueWidth", config.issue_width),
            ("sctsoVerifyLd", config.verify_ld.map_or(-1, i64::from)),
            ("wallClock", self.wall_clock),
            ("simTime", self.sim_time),
        ] {
            table.insert(key, CounterValue::Scalar(value));
        }
        table.insert("inst", CounterValue::Array(self.inst.clone()));
        table.insert("cycle", CounterValue::Array(self.cycle.clone()));

        fn insert_columns<C: Category>(table: &mut CounterTable, counts: &CoreCounts<C>) {
            for category in C::ALL {
                table.insert(category.key(), CounterValue::Array(counts.column(*category)));
            }
        }
        insert_columns(&mut table, &self.inst_mix);
        insert_columns(&mut table, &self.lsq);
        insert_columns(&mut table, &self.retire);
        insert_columns(&mut table, &self.issue);

        table.insert(
            "issueSmallWinByUnit",
            CounterValue::Array(
                self.unit_small_win
                    .iter()
                    .map(|sum| sum.unwrap_or(0))
                    .collect(),
            ),
        );
        table.insert("robUsage", CounterValue::Matrix(self.rob_usage.clone()));

        for access in MemAccess::ALL {
            table.insert(
                format!("{}MemNum", access.key()),
                CounterValue::Array(self.mem_num.column(*access)),
            );
            table.insert(
                format!("{}MemLat", access.key()),
                CounterValue::FloatArray(self.mem_lat.column(*access)),
            );
        }

        for cache in &self.caches {
            let name = cache.level.name();
            for access in MemAccess::ALL {
                table.insert(
                    format!("{}_{}Miss", name, access.key()),
                    CounterValue::Array(cache.miss.column(*access)),
                );
                table.insert(
                    format!("{}_{}HalfMiss", name, access.key()),
                    CounterValue::Array(cache.half_miss.column(*access)),
                );
            }
            if cache.level != CacheLevel::DL1 {
                table.insert(
                    format!("{}_handledReq", name),
                    CounterValue::Array(
                        cache
                            .handled_req
                            .iter()
                            .map(|req| req.unwrap_or(-1))
                            .collect(),
                    ),
                );
            }
        }
        table
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use crate::{
        CacheLevel, CounterValue, InstClass, IssueStall, LsqEvent, MemAccess, RetireStall,
        SimConfig, Stats,
    };

    /// Four core log with the configuration echoed on top
    pub(crate) fn sample_log() -> String {
        let mut log = String::from(
            "\
cpuemul[0:3] = 'QEMUSectionCPU'
cpusimu[0:3] = 'tradCORE'
maxLoads = 32
maxStores = 32
robSize = 128
retireWidth = 4
issueWidth = 4
sctsoVerifyLd = false
OS:wallClock=52.000
OS:simTime=1200000.000
",
        );
        for core in 0..4 {
            log.push_str(&format!(
                "P({core}):nCommitted=1000000.000\n\
                 P({core})_activeCyc=1200000.000\n\
                 P({core})_ExeEngine_iRALU:n=400000.000\n\
                 P({core})_ExeEngine_iLALU_LD:n=250000.000\n\
                 P({core})_ExeEngine_iSALU_ST:n=100000.000\n\
                 P({core})_ExeEngine_iBALU_BRANCH:n=100000.000\n\
                 P({core})_ExeEngine_iBALU_JUMP:n=50000.000\n\
                 P({core})_ExeEngine_iCALU_FPALU:n=20000.000\n\
                 P({core})_ExeEngine_iCALU_MULT:n=30000.000\n\
                 P({core})_MTLSQ_nUnalignLd=2500.000\n\
                 P({core})_MTLSQ_nLdKillByInv=10.000\n\
                 P({core})_retireStallByEmpty=400000.000\n\
                 P({core})_retireStallByEx_iLALU_LD=800000.000\n\
                 P({core})_retireStallByEx_iRALU=100000.000\n\
                 P({core})_retireStallByEx_iCALU_FPALU=20000.000\n\
                 P({core})_retireStallByVerify_CacheInv=0.000\n\
                 P({core})_ExeEngine:nSmallWinStall=300.000\n\
                 P({core})_nOutsLoadsStall=1200.000\n\
                 P({core})_FXU_nSmallWinStall=100.000\n\
                 P({core})_LDU_nSmallWinStall=200.000\n\
                 P({core})_robUsage(0)=600000.000\n\
                 P({core})_robUsage(64)=300000.000\n\
                 P({core})_robUsage(128)=300000.000\n\
                 DL1({core})_readMemLat:n=250000::v=12.500\n\
                 DL1({core}):readMiss=5000.000\n\
                 DL1({core}):readHalfMiss=700.000\n\
                 DL1({core}):writeMiss=1000.000\n\
                 L2({core}):handledReq=6000.000\n\
                 L2({core}):readMiss=1500.000\n\
                 L2({core})_prefetchMiss=500.000\n"
            ));
        }
        log.push_str("L3(0):handledReq=8000.000\nL3(0):readMiss=2000.000\n");
        log
    }

    #[test]
    fn test_config() {
        let config = SimConfig::parse(&sample_log());
        assert_eq!(
            config,
            SimConfig {
                core_num: 4,
                max_ld: 32,
                max_st: 32,
                rob_size: 128,
                retire_width: 4,
                issue_width: 4,
                verify_ld: Some(false),
            }
        );

        // first match wins
        let config = SimConfig::parse("robSize = 64\nrobSize = 128\n");
        assert_eq!(config.rob_size, 64);
        assert_eq!(config.core_num, -1);
        assert_eq!(config.verify_ld, None);
    }

    #[test]
    fn test_extract() {
        let stats = Stats::extract(&sample_log()).unwrap();
        assert_eq!(stats.cores(), 4);
        assert_eq!(stats.wall_clock, 52);
        assert_eq!(stats.sim_time, 1200000);
        assert_eq!(stats.inst, vec![1000000; 4]);
        assert_eq!(stats.cycle, vec![1200000; 4]);

        assert_eq!(stats.inst_mix.get(0, InstClass::Ralu), 400000);
        assert_eq!(stats.inst_mix.get(3, InstClass::Balu), 150000);
        assert_eq!(stats.inst_mix.get(2, InstClass::Calu3c), 50000);
        assert_eq!(stats.inst_mix.get(2, InstClass::Malu), 0);
        assert_eq!(stats.lsq.get(1, LsqEvent::UnalignLd), 2500);
        assert_eq!(stats.lsq.get(1, LsqEvent::LdKillByInv), 10);
        assert_eq!(stats.retire.get(0, RetireStall::ExLd), 800000);
        assert_eq!(stats.retire.get(0, RetireStall::ExOther), 120000);
        assert_eq!(stats.issue.get(0, IssueStall::SmallWin), 300);
        assert_eq!(stats.issue.get(0, IssueStall::OutLd), 1200);
        assert_eq!(stats.unit_small_win, vec![Some(300); 4]);
        assert_eq!(stats.rob_usage[1].len(), 129);
        assert_eq!(stats.rob_usage[1][128], 300000);
        assert_eq!(stats.mem_num.get(0, MemAccess::Read), 250000);
        assert_eq!(stats.mem_lat.get(0, MemAccess::Read), 12.5);

        let dl1 = stats.cache(CacheLevel::DL1);
        assert_eq!(dl1.miss.get(0, MemAccess::Read), 5000);
        assert_eq!(dl1.half_miss.get(0, MemAccess::Read), 700);
        assert_eq!(dl1.total_miss(0), 6000);
        let l3 = stats.cache(CacheLevel::L3);
        assert_eq!(l3.miss.cores(), 1);
        assert_eq!(l3.handled_req, vec![Some(8000)]);
    }

    #[test]
    fn test_missing_counters_keep_sentinels() {
        let stats = Stats::extract("cpusimu[0:1] = 'tradCORE'\nP(1):nCommitted=5.0\n").unwrap();
        assert_eq!(stats.inst, vec![-1, 5]);
        assert_eq!(stats.cycle, vec![-1, -1]);
        assert_eq!(stats.wall_clock, -1);
        assert_eq!(stats.config.rob_size, -1);
        assert!(stats.rob_usage[0].is_empty());
        assert_eq!(stats.retire.get(1, RetireStall::Empty), 0);
        assert_eq!(stats.cache(CacheLevel::L2).handled_req, vec![None, None]);
    }

    #[test]
    fn test_strict_labels() {
        let base = "cpusimu[0:0] = 'tradCORE'\nrobSize = 8\n";
        // zero counts of unknown labels pass
        assert!(Stats::extract(&format!("{base}P(0)_retireStallByBogus=0.000\n")).is_ok());
        assert!(Stats::extract(&format!("{base}P(0)_retireStallByBogus=3.000\n")).is_err());
        assert!(Stats::extract(&format!("{base}P(0)_ExeEngine_iXALU:n=3.000\n")).is_err());
        assert!(Stats::extract(&format!("{base}P(0)_nFooStall=1.000\n")).is_err());
        assert!(Stats::extract(&format!("{base}P(0)_MTLSQ_nLdKillByFoo=1.000\n")).is_err());
        assert!(
            Stats::extract(&format!("{base}DL1(0)_evictMemLat:n=4::v=1.0\n")).is_err()
        );
    }

    #[test]
    fn test_index_bounds() {
        let base = "cpusimu[0:1] = 'tradCORE'\nrobSize = 8\n";
        assert!(Stats::extract(&format!("{base}P(2):nCommitted=5.000\n")).is_err());
        assert!(Stats::extract(&format!("{base}L2(2):readMiss=5.000\n")).is_err());
        assert!(Stats::extract(&format!("{base}L3(1):readMiss=5.000\n")).is_err());
        assert!(Stats::extract(&format!("{base}P(0)_robUsage(9)=5.000\n")).is_err());
        assert!(Stats::extract(&format!("{base}P(0)_robUsage(8)=5.000\n")).is_ok());
        // no core count at all
        assert!(Stats::extract("robSize = 8\n").is_err());
    }

    #[test]
    fn test_oversized_config() {
        assert!(Stats::extract("cpusimu[0:9223372036854775807]\n").is_err());
        assert!(Stats::extract("cpusimu[0:4096]\n").is_err());
        assert!(Stats::extract("cpusimu[0:4095]\n").is_ok());
        let base = "cpusimu[0:0] = 'tradCORE'\n";
        assert!(Stats::extract(&format!("{base}robSize = 9223372036854775807\n")).is_err());
        assert!(Stats::extract(&format!("{base}robSize = 4097\n")).is_err());
        assert!(Stats::extract(&format!("{base}robSize = 4096\n")).is_ok());
    }

    #[test]
    fn test_to_counters() {
        let table = Stats::extract(&sample_log()).unwrap().to_counters();
        assert_eq!(table.get("coreNum"), Some(&CounterValue::Scalar(4)));
        assert_eq!(table.get("sctsoVerifyLd"), Some(&CounterValue::Scalar(0)));
        assert_eq!(
            table.get("retireStallByExOther"),
            Some(&CounterValue::Array(vec![120000; 4]))
        );
        assert_eq!(
            table.get("readMemLat"),
            Some(&CounterValue::FloatArray(vec![12.5; 4]))
        );
        assert_eq!(
            table.get("L3_handledReq"),
            Some(&CounterValue::Array(vec![8000]))
        );
        assert_eq!(
            table.get("DL1_readHalfMiss"),
            Some(&CounterValue::Array(vec![700; 4]))
        );
        assert!(table.get("DL1_handledReq").is_none());
    }
}
