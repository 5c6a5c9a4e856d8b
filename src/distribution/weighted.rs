//! Percentage dispersion table
//!
//! Multi-folder file pools pick a folder for every generated value according
//! to configured percentage weights. The pick order is fixed up front in a
//! table of 100 slots: each slot is given to the first container (in
//! declaration order) whose share of the slots filled so far is still below
//! its percentage. Walking the table in order yields exactly the configured
//! counts per 100 draws.

/// Number of slots in a dispersion table
pub const TABLE_SLOTS: usize = 100;

/// Fixed pick order across weighted containers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PercentageTable {
    slots: Vec<usize>,
}

impl PercentageTable {
    /// Build the table from per-container percentages
    ///
    /// Percentages are expected to sum to 100; callers verify that before
    /// building. A slot no container claims falls back to container 0, so a
    /// 0% entry in first position still gets a slot: `[0, 100]` splits 1/99.
    pub fn new(percentages: &[u32]) -> Self {
        let mut slots = Vec::with_capacity(TABLE_SLOTS);
        let mut picked = vec![0u64; percentages.len()];

        for filled in 0..TABLE_SLOTS as u64 {
            let container = percentages
                .iter()
                .enumerate()
                .find(|&(idx, &percentage)| {
                    let share = if filled == 0 { 0 } else { picked[idx] * 100 / filled };
                    share < percentage as u64
                })
                .map(|(idx, _)| idx)
                .unwrap_or(0);

            if let Some(count) = picked.get_mut(container) {
                *count += 1;
            }
            slots.push(container);
        }

        Self { slots }
    }

    /// Container index for a slot (wraps every 100 slots)
    #[inline]
    pub fn container_at(&self, slot: u64) -> usize {
        self.slots[(slot % TABLE_SLOTS as u64) as usize]
    }

    /// All slots in order
    pub fn slots(&self) -> &[usize] {
        &self.slots
    }
}
