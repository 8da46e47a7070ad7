use std::sync::atomic::{AtomicUsize, Ordering};

/// Global in-flight orchestration counter (§5 "Admission control"). Excess
/// requests are rejected outright rather than queued — there is no waiter
/// list here, only an atomic compare-and-increment.
pub struct AdmissionControl {
    max_in_flight: usize,
    in_flight: AtomicUsize,
}

impl AdmissionControl {
    pub fn new(max_in_flight: usize) -> Self {
        Self { max_in_flight, in_flight: AtomicUsize::new(0) }
    }

    /// Attempt to admit one orchestration. Returns `None` (OVERLOADED) if
    /// the process is already at capacity; otherwise an RAII guard that
    /// decrements the counter on drop, however the request ends.
    pub fn try_admit(&self) -> Option<AdmissionGuard<'_>> {
        let mut current = self.in_flight.load(Ordering::Acquire);
        loop {
            if current >= self.max_in_flight {
                return None;
            }
            match self.in_flight.compare_exchange_weak(
                current,
                current + 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Some(AdmissionGuard { control: self }),
                Err(observed) => current = observed,
            }
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }
}

pub struct AdmissionGuard<'a> {
    control: &'a AdmissionControl,
}

impl Drop for AdmissionGuard<'_> {
    fn drop(&mut self) {
        self.control.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admits_up_to_capacity_then_rejects() {
        let admission = AdmissionControl::new(2);
        let g1 = admission.try_admit().unwrap();
        let g2 = admission.try_admit().unwrap();
        assert!(admission.try_admit().is_none());
        drop(g1);
        assert!(admission.try_admit().is_some());
        drop(g2);
    }
}
