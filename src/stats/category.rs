use std::{fmt::Debug, marker::PhantomData, ops::AddAssign};

/// Fixed enumeration of labels a per-core counter family may carry
pub trait Category: Copy + Eq + Debug + 'static {
    const ALL: &'static [Self];
    /// Counter family, used in diagnostics
    const KIND: &'static str;

    fn index(self) -> usize;

    /// Column header in reports
    fn label(self) -> &'static str;

    /// Name in the counter table
    fn key(self) -> &'static str;

    /// Map a label found in the log, `None` if unrecognized
    fn classify(label: &str) -> Option<Self>;

    /// Several log labels fold into this category, so repeated matches add up
    fn merged(self) -> bool {
        false
    }
}

/// Per core value of every category of `C`
#[derive(Debug, Clone, PartialEq)]
pub struct CoreCounts<C, T = i64> {
    values: Vec<T>,
    _category: PhantomData<C>,
}

impl<C: Category, T: Copy + Default + AddAssign> CoreCounts<C, T> {
    pub fn new(cores: usize) -> Self {
        CoreCounts {
            values: vec![T::default(); cores * C::ALL.len()],
            _category: PhantomData,
        }
    }

    pub fn cores(&self) -> usize {
        self.values.len() / C::ALL.len()
    }

    pub fn get(&self, core: usize, category: C) -> T {
        self.values[core * C::ALL.len() + category.index()]
    }

    pub fn set(&mut self, core: usize, category: C, value: T) {
        self.values[core * C::ALL.len() + category.index()] = value;
    }

    pub fn add(&mut self, core: usize, category: C, value: T) {
        self.values[core * C::ALL.len() + category.index()] += value;
    }

    /// Store according to the category's merge rule
    pub fn record(&mut self, core: usize, category: C, value: T) {
        if category.merged() {
            self.add(core, category, value);
        } else {
            self.set(core, category, value);
        }
    }

    /// Values of one category across cores
    pub fn column(&self, category: C) -> Vec<T> {
        (0..self.cores()).map(|core| self.get(core, category)).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstClass {
    Ralu,
    Aalu,
    Balu,
    LaluLd,
    LaluRec,
    SaluSt,
    SaluAddr,
    SaluCom,
    Calu3c,
    Calu5c,
    Calu7c,
    Malu,
}

impl Category for InstClass {
    const ALL: &'static [Self] = &[
        InstClass::Ralu,
        InstClass::Aalu,
        InstClass::Balu,
        InstClass::LaluLd,
        InstClass::LaluRec,
        InstClass::SaluSt,
        InstClass::SaluAddr,
        InstClass::SaluCom,
        InstClass::Calu3c,
        InstClass::Calu5c,
        InstClass::Calu7c,
        InstClass::Malu,
    ];
    const KIND: &'static str = "inst type";

    fn index(self) -> usize {
        self as usize
    }

    fn label(self) -> &'static str {
        match self {
            InstClass::Ralu => "RALU",
            InstClass::Aalu => "AALU",
            InstClass::Balu => "BALU",
            InstClass::LaluLd => "LALU_LD",
            InstClass::LaluRec => "LALU_REC",
            InstClass::SaluSt => "SALU_ST",
            InstClass::SaluAddr => "SALU_ADDR",
            InstClass::SaluCom => "SALU_COM",
            InstClass::Calu3c => "CALU_3C",
            InstClass::Calu5c => "CALU_5C",
            InstClass::Calu7c => "CALU_7C",
            InstClass::Malu => "MALU",
        }
    }

    fn key(self) -> &'static str {
        match self {
            InstClass::Ralu => "nRALU",
            InstClass::Aalu => "nAALU",
            InstClass::Balu => "nBALU",
            InstClass::LaluLd => "nLALU_LD",
            InstClass::LaluRec => "nLALU_REC",
            InstClass::SaluSt => "nSALU_ST",
            InstClass::SaluAddr => "nSALU_ADDR",
            InstClass::SaluCom => "nSALU_COM",
            InstClass::Calu3c => "nCALU_3C",
            InstClass::Calu5c => "nCALU_5C",
            InstClass::Calu7c => "nCALU_7C",
            InstClass::Malu => "nMALU",
        }
    }

    fn classify(label: &str) -> Option<Self> {
        Some(match label {
            "RALU" => InstClass::Ralu,
            "AALU" => InstClass::Aalu,
            "LALU_LD" => InstClass::LaluLd,
            "LALU_REC" => InstClass::LaluRec,
            "SALU_ST" => InstClass::SaluSt,
            "SALU_ADDR" => InstClass::SaluAddr,
            "SALU_COM" => InstClass::SaluCom,
            // 3 cycle, 5 cycle and 7 cycle complex units
            "CALU_FPALU" | "CALU_MULT" => InstClass::Calu3c,
            "CALU_FPMULT" => InstClass::Calu5c,
            "CALU_FPDIV" | "CALU_DIV" => InstClass::Calu7c,
            label if label.starts_with("BALU") => InstClass::Balu,
            label if label.starts_with("MALU") => InstClass::Malu,
            _ => return None,
        })
    }

    fn merged(self) -> bool {
        matches!(
            self,
            InstClass::Balu
                | InstClass::Calu3c
                | InstClass::Calu5c
                | InstClass::Calu7c
                | InstClass::Malu
        )
    }
}

/// Load/store queue events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LsqEvent {
    LdStallByLd,
    LdStallByRec,
    LdKillByLd,
    LdKillBySt,
    LdKillByInv,
    LdKillByRep,
    LdReExByLd,
    LdReExBySt,
    LdReExByInv,
    LdReExByRep,
    StLdForward,
    LdLdForward,
    StEarlyRetire,
    VerifyLdByInv,
    VerifyLdByRep,
    UnalignLd,
    UnalignSt,
}

impl Category for LsqEvent {
    const ALL: &'static [Self] = &[
        LsqEvent::LdStallByLd,
        LsqEvent::LdStallByRec,
        LsqEvent::LdKillByLd,
        LsqEvent::LdKillBySt,
        LsqEvent::LdKillByInv,
        LsqEvent::LdKillByRep,
        LsqEvent::LdReExByLd,
        LsqEvent::LdReExBySt,
        LsqEvent::LdReExByInv,
        LsqEvent::LdReExByRep,
        LsqEvent::StLdForward,
        LsqEvent::LdLdForward,
        LsqEvent::StEarlyRetire,
        LsqEvent::VerifyLdByInv,
        LsqEvent::VerifyLdByRep,
        LsqEvent::UnalignLd,
        LsqEvent::UnalignSt,
    ];
    const KIND: &'static str = "MTLSQ event";

    fn index(self) -> usize {
        self as usize
    }

    fn label(self) -> &'static str {
        match self {
            LsqEvent::LdStallByLd => "LdStallByLd",
            LsqEvent::LdStallByRec => "LdStallByRec",
            LsqEvent::LdKillByLd => "LdKillByLd",
            LsqEvent::LdKillBySt => "LdKillBySt",
            LsqEvent::LdKillByInv => "LdKillByInv",
            LsqEvent::LdKillByRep => "LdKillByRep",
            LsqEvent::LdReExByLd => "LdReExByLd",
            LsqEvent::LdReExBySt => "LdReExBySt",
            LsqEvent::LdReExByInv => "LdReExByInv",
            LsqEvent::LdReExByRep => "LdReExByRep",
            LsqEvent::StLdForward => "StLdForward",
            LsqEvent::LdLdForward => "LdLdForward",
            LsqEvent::StEarlyRetire => "StEarlyRetire",
            LsqEvent::VerifyLdByInv => "VerifyLdByInv",
            LsqEvent::VerifyLdByRep => "VerifyLdByRep",
            LsqEvent::UnalignLd => "UnalignLd",
            LsqEvent::UnalignSt => "UnalignSt",
        }
    }

    fn key(self) -> &'static str {
        match self {
            LsqEvent::LdStallByLd => "mtlsqLdStallByLd",
            LsqEvent::LdStallByRec => "mtlsqLdStallByRec",
            LsqEvent::LdKillByLd => "mtlsqLdKillByLd",
            LsqEvent::LdKillBySt => "mtlsqLdKillBySt",
            LsqEvent::LdKillByInv => "mtlsqLdKillByInv",
            LsqEvent::LdKillByRep => "mtlsqLdKillByRep",
            LsqEvent::LdReExByLd => "mtlsqLdReExByLd",
            LsqEvent::LdReExBySt => "mtlsqLdReExBySt",
            LsqEvent::LdReExByInv => "mtlsqLdReExByInv",
            LsqEvent::LdReExByRep => "mtlsqLdReExByRep",
            LsqEvent::StLdForward => "mtlsqStLdForward",
            LsqEvent::LdLdForward => "mtlsqLdLdForward",
            LsqEvent::StEarlyRetire => "mtlsqStEarlyRetire",
            LsqEvent::VerifyLdByInv => "mtlsqVerifyLdByInv",
            LsqEvent::VerifyLdByRep => "mtlsqVerifyLdByRep",
            LsqEvent::UnalignLd => "unalignLd",
            LsqEvent::UnalignSt => "unalignSt",
        }
    }

    fn classify(label: &str) -> Option<Self> {
        LsqEvent::ALL
            .iter()
            .copied()
            .find(|event| event.label() == label)
    }
}

/// Why a retire slot went unused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetireStall {
    ExLd,
    ExOther,
    FlushSt,
    FlushLd,
    FlushInv,
    ComSq,
    Empty,
    VerifyInv,
    VerifyRep,
}

impl Category for RetireStall {
    const ALL: &'static [Self] = &[
        RetireStall::ExLd,
        RetireStall::ExOther,
        RetireStall::FlushSt,
        RetireStall::FlushLd,
        RetireStall::FlushInv,
        RetireStall::ComSq,
        RetireStall::Empty,
        RetireStall::VerifyInv,
        RetireStall::VerifyRep,
    ];
    const KIND: &'static str = "retire stall type";

    fn index(self) -> usize {
        self as usize
    }

    fn label(self) -> &'static str {
        match self {
            RetireStall::ExLd => "LdEx",
            RetireStall::ExOther => "OtherEx",
            RetireStall::FlushSt => "FlushSt",
            RetireStall::FlushLd => "FlushLd",
            RetireStall::FlushInv => "FlushInv",
            RetireStall::ComSq => "ComSQ",
            RetireStall::Empty => "Empty",
            RetireStall::VerifyInv => "VerifyInv",
            RetireStall::VerifyRep => "VerifyRep",
        }
    }

    fn key(self) -> &'static str {
        match self {
            RetireStall::ExLd => "retireStallByExLd",
            RetireStall::ExOther => "retireStallByExOther",
            RetireStall::FlushSt => "retireStallByFlushSt",
            RetireStall::FlushLd => "retireStallByFlushLd",
            RetireStall::FlushInv => "retireStallByFlushInv",
            RetireStall::ComSq => "retireStallByComSQ",
            RetireStall::Empty => "retireStallByEmpty",
            RetireStall::VerifyInv => "retireStallByVerifyInv",
            RetireStall::VerifyRep => "retireStallByVerifyRep",
        }
    }

    fn classify(label: &str) -> Option<Self> {
        Some(match label {
            "Empty" => RetireStall::Empty,
            "ComSQ" => RetireStall::ComSq,
            "Flush_CacheInv" => RetireStall::FlushInv,
            "Flush_Load" => RetireStall::FlushLd,
            "Flush_Store" => RetireStall::FlushSt,
            "Verify_CacheInv" => RetireStall::VerifyInv,
            "Verify_CacheRep" => RetireStall::VerifyRep,
            "Ex_iLALU_LD" => RetireStall::ExLd,
            label if label.starts_with("Ex_i") => RetireStall::ExOther,
            _ => return None,
        })
    }

    fn merged(self) -> bool {
        self == RetireStall::ExOther
    }
}

/// Why the issue stage stalled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueStall {
    OutBr,
    OutLd,
    OutSt,
    SmallReg,
    SmallWin,
    SmallRob,
    Replay,
    Syscall,
}

impl Category for IssueStall {
    const ALL: &'static [Self] = &[
        IssueStall::OutBr,
        IssueStall::OutLd,
        IssueStall::OutSt,
        IssueStall::SmallReg,
        IssueStall::SmallWin,
        IssueStall::SmallRob,
        IssueStall::Replay,
        IssueStall::Syscall,
    ];
    const KIND: &'static str = "issue stall type";

    fn index(self) -> usize {
        self as usize
    }

    fn label(self) -> &'static str {
        match self {
            IssueStall::OutBr => "OutBr",
            IssueStall::OutLd => "OutLd",
            IssueStall::OutSt => "OutSt",
            IssueStall::SmallReg => "SmallReg",
            IssueStall::SmallWin => "SmallWin",
            IssueStall::SmallRob => "SmallROB",
            IssueStall::Replay => "Replay",
            IssueStall::Syscall => "Syscall",
        }
    }

    fn key(self) -> &'static str {
        match self {
            IssueStall::OutBr => "issueOutBr",
            IssueStall::OutLd => "issueOutLd",
            IssueStall::OutSt => "issueOutSt",
            IssueStall::SmallReg => "issueSmallReg",
            IssueStall::SmallWin => "issueSmallWin",
            IssueStall::SmallRob => "issueSmallROB",
            IssueStall::Replay => "issueReplay",
            IssueStall::Syscall => "issueSyscall",
        }
    }

    fn classify(label: &str) -> Option<Self> {
        Some(match label {
            "OutsBranches" => IssueStall::OutBr,
            "OutsLoads" => IssueStall::OutLd,
            "OutsStores" => IssueStall::OutSt,
            "SmallREG" => IssueStall::SmallReg,
            "SmallWin" => IssueStall::SmallWin,
            "SmallROB" => IssueStall::SmallRob,
            "Replays" => IssueStall::Replay,
            "Syscall" => IssueStall::Syscall,
            _ => return None,
        })
    }
}

/// Kind of memory request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemAccess {
    Read,
    Write,
    Prefetch,
}

impl Category for MemAccess {
    const ALL: &'static [Self] = &[MemAccess::Read, MemAccess::Write, MemAccess::Prefetch];
    const KIND: &'static str = "memory access type";

    fn index(self) -> usize {
        self as usize
    }

    fn label(self) -> &'static str {
        match self {
            MemAccess::Read => "Read",
            MemAccess::Write => "Write",
            MemAccess::Prefetch => "Prefetch",
        }
    }

    fn key(self) -> &'static str {
        match self {
            MemAccess::Read => "read",
            MemAccess::Write => "write",
            MemAccess::Prefetch => "prefetch",
        }
    }

    fn classify(label: &str) -> Option<Self> {
        MemAccess::ALL
            .iter()
            .copied()
            .find(|access| access.key() == label)
    }
}
