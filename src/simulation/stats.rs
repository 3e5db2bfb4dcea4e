//! Run statistics for the signal simulation

use log::info;

/// Counters collected by the engine over a run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationStats {
    pub ticks: u64,
    pub vehicles_added: usize,
    pub vehicles_exited: usize,
    /// Sum of the wait times of every vehicle that has exited
    pub total_wait_exited: u64,
    /// Longest wait of any vehicle that has exited
    pub max_wait: u32,
}

impl SimulationStats {
    pub fn record_added(&mut self) {
        self.vehicles_added += 1;
    }

    pub fn record_exit(&mut self, wait_time: u32) {
        self.vehicles_exited += 1;
        self.total_wait_exited += u64::from(wait_time);
        self.max_wait = self.max_wait.max(wait_time);
    }

    /// Vehicles still queued or crossing
    pub fn vehicles_remaining(&self) -> usize {
        self.vehicles_added - self.vehicles_exited
    }

    /// Mean wait of exited vehicles, 0 when none have exited yet
    pub fn average_wait(&self) -> f64 {
        if self.vehicles_exited == 0 {
            0.0
        } else {
            self.total_wait_exited as f64 / self.vehicles_exited as f64
        }
    }

    pub fn log_summary(&self) {
        info!("=== SIMULATION COMPLETE ===");
        info!("Ticks: {}", self.ticks);
        info!("Total vehicles added: {}", self.vehicles_added);
        info!("Total vehicles exited: {}", self.vehicles_exited);
        info!("Vehicles remaining: {}", self.vehicles_remaining());
        info!("Average wait: {:.2} ticks", self.average_wait());
        info!("Max wait: {} ticks", self.max_wait);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_and_max_wait() {
        let mut stats = SimulationStats::default();
        assert_eq!(stats.average_wait(), 0.0);

        for _ in 0..3 {
            stats.record_added();
        }
        stats.record_exit(1);
        stats.record_exit(4);

        assert_eq!(stats.vehicles_exited, 2);
        assert_eq!(stats.vehicles_remaining(), 1);
        assert_eq!(stats.max_wait, 4);
        assert!((stats.average_wait() - 2.5).abs() < f64::EPSILON);
    }
}
