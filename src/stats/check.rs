use crate::{CacheLevel, IssueStall, LsqEvent, RetireStall, Stats};
use anyhow::bail;

impl Stats {
    /// Cross-counter consistency, any violation means the log cannot be trusted
    pub fn check(&self) -> anyhow::Result<()> {
        self.check_verify_ld()?;
        self.check_small_win()?;
        self.check_handled_req()?;
        Ok(())
    }

    /// Without load verification nothing may be attributed to it
    pub fn check_verify_ld(&self) -> anyhow::Result<()> {
        if self.config.verify_ld != Some(false) {
            return Ok(());
        }
        for core in 0..self.cores() {
            for stall in [RetireStall::VerifyInv, RetireStall::VerifyRep] {
                let count = self.retire.get(core, stall);
                if count != 0 {
                    bail!(
                        "P({}) retire stall {:?} = {} but sctsoVerifyLd is false",
                        core,
                        stall,
                        count
                    );
                }
            }
            for event in [LsqEvent::VerifyLdByInv, LsqEvent::VerifyLdByRep] {
                let count = self.lsq.get(core, event);
                if count != 0 {
                    bail!(
                        "P({}) MTLSQ event {:?} = {} but sctsoVerifyLd is false",
                        core,
                        event,
                        count
                    );
                }
            }
        }
        Ok(())
    }

    pub fn check_small_win(&self) -> anyhow::Result<()> {
        for (core, unit_sum) in self.unit_small_win.iter().enumerate() {
            if let Some(unit_sum) = unit_sum {
                let total = self.issue.get(core, IssueStall::SmallWin);
                if *unit_sum != total {
                    bail!(
                        "P({}) per unit window stalls sum to {} but nSmallWinStall is {}",
                        core,
                        unit_sum,
                        total
                    );
                }
            }
        }
        Ok(())
    }

    /// Requests handled by a level equal the full misses of the levels above
    pub fn check_handled_req(&self) -> anyhow::Result<()> {
        let dl1 = self.cache(CacheLevel::DL1);
        let l2 = self.cache(CacheLevel::L2);
        for (core, handled) in l2.handled_req.iter().enumerate() {
            if let Some(handled) = handled {
                let misses = dl1.total_miss(core);
                if *handled != misses {
                    bail!(
                        "L2({}) handledReq = {} but DL1({}) misses = {}",
                        core,
                        handled,
                        core,
                        misses
                    );
                }
            }
        }
        if let Some(Some(handled)) = self.cache(CacheLevel::L3).handled_req.first() {
            let misses: i64 = (0..self.cores()).map(|core| l2.total_miss(core)).sum();
            if *handled != misses {
                bail!(
                    "L3(0) handledReq = {} but L2 misses = {}",
                    handled,
                    misses
                );
            }
        }
        Ok(())
    }
}
