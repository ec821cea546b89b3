//! Construction-time unit counts and latencies.

#[derive(Debug, Clone, Copy)]
pub struct Latencies {
    pub alu: u32,
    pub mem: u32,
    pub mul: u32,
    pub div: u32,
    pub saxs: u32,
}

impl Default for Latencies {
    fn default() -> Self {
        Self {
            alu: 1,
            mem: 3,
            mul: 1,
            div: 40,
            saxs: 4,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ScoreboardConfig {
    pub alu_count: usize,
    pub mem_count: usize,
    pub mul_count: usize,
    pub div_count: usize,
    pub saxs_count: usize,
    pub latencies: Latencies,
    pub memory_size: usize,
}

impl Default for ScoreboardConfig {
    fn default() -> Self {
        Self {
            alu_count: 2,
            mem_count: 2,
            mul_count: 1,
            div_count: 1,
            saxs_count: 1,
            latencies: Latencies::default(),
            memory_size: crate::core::memory::DEFAULT_SIZE,
        }
    }
}

impl ScoreboardConfig {
    /// The configuration the stepper facade uses (§6 of the requirements):
    /// same unit/latency table, larger data memory.
    pub fn stepper() -> Self {
        Self {
            memory_size: 15360,
            ..Self::default()
        }
    }
}
