//! Cooldown-gated timer nudging the layer view during paint drags.

use crate::host::HostInterop;

/// One-shot host timer owned by a single drag.
///
/// `ready` gates how often a drag may scroll; the host timer keeps scrolling
/// while the pointer rests outside the visible range.
#[derive(Debug, Clone, Default)]
pub struct ScrollTimer {
    next_tick: u64,
    owner: Option<u64>,
}

impl ScrollTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ready(&self, now_ms: u64) -> bool {
        now_ms >= self.next_tick
    }

    /// Drag generation the pending timer belongs to.
    pub fn owner(&self) -> Option<u64> {
        self.owner
    }

    pub fn arm(&mut self, host: &mut dyn HostInterop, owner: u64, delay_ms: u32) {
        self.next_tick = host.now_ms() + delay_ms as u64;
        self.owner = Some(owner);
        host.set_timer(delay_ms);
        log::trace!("auto-scroll armed for drag #{} ({} ms)", owner, delay_ms);
    }

    pub fn kill(&mut self, host: &mut dyn HostInterop) {
        if self.owner.take().is_some() {
            host.kill_timer();
        }
        self.next_tick = host.now_ms();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_host::MemoryHost;

    #[test]
    fn cooldown_gates_ticks() {
        let mut host = MemoryHost::new(100);
        let mut timer = ScrollTimer::new();
        assert!(timer.ready(host.now_ms()));

        timer.arm(&mut host, 7, 100);
        assert_eq!(timer.owner(), Some(7));
        assert_eq!(host.pending_timer(), Some(100));
        assert!(!timer.ready(host.now_ms() + 99));
        assert!(timer.ready(host.now_ms() + 100));

        timer.kill(&mut host);
        assert_eq!(timer.owner(), None);
        assert_eq!(host.pending_timer(), None);
        assert!(timer.ready(host.now_ms()));
    }
}
