use crate::{
    CacheLevel, Category, InstClass, IssueStall, LsqEvent, MemAccess, RetireStall, Stats,
    format_rate,
};
use cli_table::{Cell, Table, print_stdout};

/// One titled table of the report
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub title: String,
    /// Printed between title and table
    pub note: Option<String>,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Section {
    fn new(title: &str, corner: &str, columns: &[&str]) -> Self {
        let mut header = vec![corner.to_string()];
        header.extend(columns.iter().map(|column| column.to_string()));
        Section {
            title: title.to_string(),
            note: None,
            header,
            rows: vec![],
        }
    }

    fn push(&mut self, name: String, values: Vec<String>) {
        let mut row = vec![name];
        row.extend(values);
        self.rows.push(row);
    }

    pub fn print(&self) -> anyhow::Result<()> {
        println!("-- {}", self.title);
        if let Some(note) = &self.note {
            println!("{}", note);
        }
        let table = self
            .rows
            .iter()
            .map(|row| row.iter().map(|value| value.cell()).collect::<Vec<_>>())
            .collect::<Vec<_>>()
            .table()
            .title(self.header.iter().map(|column| column.cell()).collect::<Vec<_>>());
        print_stdout(table)?;
        println!();
        Ok(())
    }
}

fn core_name(core: usize) -> String {
    format!("P({})", core)
}

fn overall(stats: &Stats) -> Section {
    let mut section = Section::new("Overall Performance", "", &["cycle", "inst", "IPC"]);
    section.note = Some(format!(
        "wallClock = {}, simTime = {}",
        stats.wall_clock, stats.sim_time
    ));
    for core in 0..stats.cores() {
        section.push(
            core_name(core),
            vec![
                stats.cycle[core].to_string(),
                stats.inst[core].to_string(),
                format_rate(stats.ipc(core), 3),
            ],
        );
    }
    section
}

fn inst_distribution(stats: &Stats) -> Section {
    let columns: Vec<&str> = InstClass::ALL.iter().map(|class| class.label()).collect();
    let mut section = Section::new("Instruction Distribution", "(%)", &columns);
    for core in 0..stats.cores() {
        section.push(
            core_name(core),
            InstClass::ALL
                .iter()
                .map(|class| format_rate(stats.inst_share(core, *class), 2))
                .collect(),
        );
    }
    section
}

fn unaligned(stats: &Stats) -> Section {
    let mut section = Section::new(
        "Unaligned Memory Access",
        "(%)",
        &["Unalign Ld", "Unalign St"],
    );
    for core in 0..stats.cores() {
        section.push(
            core_name(core),
            vec![
                format_rate(stats.unaligned_share(core, LsqEvent::UnalignLd), 3),
                format_rate(stats.unaligned_share(core, LsqEvent::UnalignSt), 3),
            ],
        );
    }
    section
}

fn lsq_events(stats: &Stats) -> Section {
    let events: Vec<LsqEvent> = LsqEvent::ALL
        .iter()
        .copied()
        .filter(|event| !matches!(event, LsqEvent::UnalignLd | LsqEvent::UnalignSt))
        .collect();
    let columns: Vec<&str> = events.iter().map(|event| event.label()).collect();
    let mut section = Section::new("MTLSQ Events", "(PKI)", &columns);
    for core in 0..stats.cores() {
        section.push(
            core_name(core),
            events
                .iter()
                .map(|event| format_rate(stats.lsq_pki(core, *event), 3))
                .collect(),
        );
    }
    section
}

fn retire_bandwidth(stats: &Stats) -> Section {
    let mut columns: Vec<&str> = RetireStall::ALL.iter().map(|stall| stall.label()).collect();
    columns.push("Active");
    let mut section = Section::new("Retire Port BW Distribution", "(%)", &columns);
    for core in 0..stats.cores() {
        let mut values: Vec<String> = RetireStall::ALL
            .iter()
            .map(|stall| format_rate(stats.retire_share(core, *stall), 2))
            .collect();
        values.push(format_rate(stats.retire_active(core), 2));
        section.push(core_name(core), values);
    }
    section
}

fn issue_stalls(stats: &Stats) -> Section {
    let columns: Vec<&str> = IssueStall::ALL.iter().map(|stall| stall.label()).collect();
    let mut section = Section::new("Issue Port Stall Ratio", "(%)", &columns);
    for core in 0..stats.cores() {
        section.push(
            core_name(core),
            IssueStall::ALL
                .iter()
                .map(|stall| format_rate(stats.issue_share(core, *stall), 2))
                .collect(),
        );
    }
    section
}

fn rob_usage(stats: &Stats) -> Section {
    let mut section = Section::new(
        "ROB Usage",
        "(%)",
        &[
            "[0.0, 0.2)",
            "[0.2, 0.4)",
            "[0.4, 0.6)",
            "[0.6, 0.8)",
            "[0.8, 1.0]",
        ],
    );
    for core in 0..stats.cores() {
        let values = match stats.rob_usage_bands(core) {
            Some(bands) => bands.iter().map(|band| format!("{:.2}", band)).collect(),
            None => vec!["nan".to_string(); 5],
        };
        section.push(core_name(core), values);
    }
    section
}

fn memory_access(stats: &Stats) -> Section {
    let mut section = Section::new(
        "Memory Access",
        "",
        &[
            "Read ReqPKI",
            "Read AvgLat",
            "Write ReqPKI",
            "Write AvgLat",
            "Prefetch ReqPKI",
            "Prefetch AvgLat",
        ],
    );
    for core in 0..stats.cores() {
        let mut values = vec![];
        for access in MemAccess::ALL {
            values.push(format_rate(stats.mem_req_pki(core, *access), 1));
            values.push(format!("{:.1}", stats.mem_lat.get(core, *access)));
        }
        section.push(core_name(core), values);
    }
    section
}

fn cache_miss(stats: &Stats) -> Section {
    let mut section = Section::new(
        "Cache Miss",
        "(MPKI)",
        &[
            "Read",
            "Write",
            "Prefetch",
            "Read Half",
            "Write Half",
            "Prefetch Half",
        ],
    );
    for level in CacheLevel::ALL {
        for slot in 0..level.slots(stats.cores()) {
            let mut values: Vec<String> = MemAccess::ALL
                .iter()
                .map(|access| format_rate(stats.miss_pki(level, slot, *access), 1))
                .collect();
            values.extend(
                MemAccess::ALL
                    .iter()
                    .map(|access| format_rate(stats.half_miss_pki(level, slot, *access), 1)),
            );
            section.push(format!("{}({})", level.name(), slot), values);
        }
    }
    section
}

pub fn report_sections(stats: &Stats) -> Vec<Section> {
    vec![
        overall(stats),
        inst_distribution(stats),
        unaligned(stats),
        lsq_events(stats),
        retire_bandwidth(stats),
        issue_stalls(stats),
        rob_usage(stats),
        memory_access(stats),
        cache_miss(stats),
    ]
}

pub fn print_report(stats: &Stats) -> anyhow::Result<()> {
    println!(
        "coreNum = {}, maxLd = {}, maxSt = {}, robSize = {}, retireWidth = {}, issueWidth = {}",
        stats.config.core_num,
        stats.config.max_ld,
        stats.config.max_st,
        stats.config.rob_size,
        stats.config.retire_width,
        stats.config.issue_width
    );
    println!();
    for section in report_sections(stats) {
        section.print()?;
    }
    Ok(())
}
