use chrono::{DateTime, Duration, Utc};

/// A finite list of phases, each due at a fixed offset from the start.
///
/// One driver calls [`PhaseSequence::poll`] with the current time and gets
/// back every phase that became due since the previous poll, in order. All
/// offsets are measured from the same start instant, so late polls never
/// accumulate drift.
#[derive(Debug, Clone)]
pub struct PhaseSequence<P> {
    started_at: DateTime<Utc>,
    phases: Vec<(Duration, P)>,
    next: usize,
}

impl<P: Clone> PhaseSequence<P> {
    pub fn start(started_at: DateTime<Utc>, phases: impl IntoIterator<Item = (i64, P)>) -> Self {
        let mut phases: Vec<(Duration, P)> = phases
            .into_iter()
            .map(|(offset_ms, phase)| (Duration::milliseconds(offset_ms.max(0)), phase))
            .collect();
        phases.sort_by_key(|(offset, _)| *offset);
        Self {
            started_at,
            phases,
            next: 0,
        }
    }

    pub fn poll(&mut self, now: DateTime<Utc>) -> Vec<P> {
        let elapsed = now - self.started_at;
        let mut due = Vec::new();
        while let Some((offset, phase)) = self.phases.get(self.next) {
            if *offset > elapsed {
                break;
            }
            due.push(phase.clone());
            self.next += 1;
        }
        due
    }

    pub fn next_due_at(&self) -> Option<DateTime<Utc>> {
        self.phases
            .get(self.next)
            .map(|(offset, _)| self.started_at + *offset)
    }

    pub fn elapsed_ms(&self, now: DateTime<Utc>) -> i64 {
        (now - self.started_at).num_milliseconds().max(0)
    }

    pub fn is_finished(&self) -> bool {
        self.next >= self.phases.len()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::PhaseSequence;

    #[test]
    fn emits_phases_in_offset_order_once() {
        let start = Utc
            .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
            .single()
            .expect("valid start");
        let mut seq = PhaseSequence::start(start, [(300, "c"), (100, "a"), (200, "b")]);

        assert!(seq.poll(start + Duration::milliseconds(50)).is_empty());
        assert_eq!(seq.poll(start + Duration::milliseconds(250)), vec!["a", "b"]);
        assert_eq!(seq.next_due_at(), Some(start + Duration::milliseconds(300)));
        assert_eq!(seq.poll(start + Duration::seconds(10)), vec!["c"]);
        assert!(seq.is_finished());
        assert!(seq.poll(start + Duration::seconds(20)).is_empty());
    }
}
