use crate::{CacheLevel, Category, InstClass, IssueStall, LsqEvent, MemAccess, RetireStall, Stats};

/// `num / den`, `None` when the denominator is not positive
pub fn ratio(num: f64, den: f64) -> Option<f64> {
    if den > 0.0 { Some(num / den) } else { None }
}

pub fn percent(num: i64, den: i64) -> Option<f64> {
    ratio(num as f64 * 100.0, den as f64)
}

pub fn per_kilo(num: i64, den: i64) -> Option<f64> {
    ratio(num as f64 * 1000.0, den as f64)
}

/// Render a rate, missing ones as `nan`
pub fn format_rate(rate: Option<f64>, precision: usize) -> String {
    match rate {
        Some(rate) => format!("{:.*}", precision, rate),
        None => "nan".to_string(),
    }
}

/// Bounds of the five ROB occupancy bands, the last one includes a full ROB
pub fn rob_bands(rob_size: usize) -> [(usize, usize); 5] {
    let bound = |fifth: usize| rob_size * fifth / 5;
    [
        (0, bound(1)),
        (bound(1), bound(2)),
        (bound(2), bound(3)),
        (bound(3), bound(4)),
        (bound(4), rob_size + 1),
    ]
}

impl Stats {
    pub fn ipc(&self, core: usize) -> Option<f64> {
        if self.inst[core] <= 0 {
            return None;
        }
        ratio(self.inst[core] as f64, self.cycle[core] as f64)
    }

    /// Share of committed instructions
    pub fn inst_share(&self, core: usize, class: InstClass) -> Option<f64> {
        percent(self.inst_mix.get(core, class), self.inst[core])
    }

    /// Unaligned loads per load, unaligned stores per store
    pub fn unaligned_share(&self, core: usize, event: LsqEvent) -> Option<f64> {
        let accesses = match event {
            LsqEvent::UnalignLd => self.inst_mix.get(core, InstClass::LaluLd),
            LsqEvent::UnalignSt => self.inst_mix.get(core, InstClass::SaluSt),
            _ => return None,
        };
        percent(self.lsq.get(core, event), accesses)
    }

    pub fn lsq_pki(&self, core: usize, event: LsqEvent) -> Option<f64> {
        per_kilo(self.lsq.get(core, event), self.inst[core])
    }

    fn retire_slots(&self, core: usize) -> i64 {
        if self.config.retire_width <= 0 || self.cycle[core] <= 0 {
            return -1;
        }
        self.config.retire_width * self.cycle[core]
    }

    /// Share of retire bandwidth lost to `stall`
    pub fn retire_share(&self, core: usize, stall: RetireStall) -> Option<f64> {
        percent(self.retire.get(core, stall), self.retire_slots(core))
    }

    /// Share of retire bandwidth used to retire
    pub fn retire_active(&self, core: usize) -> Option<f64> {
        let stalled: i64 = RetireStall::ALL
            .iter()
            .map(|stall| self.retire.get(core, *stall))
            .sum();
        percent(stalled, self.retire_slots(core)).map(|stalled| 100.0 - stalled)
    }

    pub fn issue_share(&self, core: usize, stall: IssueStall) -> Option<f64> {
        if self.config.issue_width <= 0 || self.cycle[core] <= 0 {
            return None;
        }
        percent(
            self.issue.get(core, stall),
            self.config.issue_width * self.cycle[core],
        )
    }

    /// Share of cycles spent in each fifth of ROB occupancy
    pub fn rob_usage_bands(&self, core: usize) -> Option<[f64; 5]> {
        if self.cycle[core] <= 0 || self.config.rob_size < 0 {
            return None;
        }
        let usage = &self.rob_usage[core];
        let mut shares = [0.0; 5];
        for (share, (start, end)) in shares
            .iter_mut()
            .zip(rob_bands(self.config.rob_size as usize))
        {
            let cycles: i64 = usage[start.min(usage.len())..end.min(usage.len())]
                .iter()
                .sum();
            *share = cycles as f64 * 100.0 / self.cycle[core] as f64;
        }
        Some(shares)
    }

    /// Requests per thousand committed instructions
    pub fn mem_req_pki(&self, core: usize, access: MemAccess) -> Option<f64> {
        per_kilo(self.mem_num.get(core, access), self.inst[core])
    }

    /// Instructions the misses of a cache slot are normalized by
    pub fn cache_inst(&self, level: CacheLevel, slot: usize) -> i64 {
        match level {
            CacheLevel::L3 => self.inst.iter().filter(|inst| **inst > 0).sum(),
            _ => self.inst[slot],
        }
    }

    pub fn miss_pki(&self, level: CacheLevel, slot: usize, access: MemAccess) -> Option<f64> {
        per_kilo(
            self.cache(level).miss.get(slot, access),
            self.cache_inst(level, slot),
        )
    }

    pub fn half_miss_pki(&self, level: CacheLevel, slot: usize, access: MemAccess) -> Option<f64> {
        per_kilo(
            self.cache(level).half_miss.get(slot, access),
            self.cache_inst(level, slot),
        )
    }
}
