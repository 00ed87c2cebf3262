//! Pause gate between delta application and board replacement.
//!
//! ```text
//! feed thread:   enter() ──(blocks while paused)──> apply batch ──> drop Pass
//! refresher:     pause() ──(waits for passes)──> fetch + replace ──> drop PauseGuard
//! ```
//!
//! A batch that entered before `pause()` finishes before `pause()` returns; a
//! batch arriving after it waits on the condvar until the guard is dropped.

use parking_lot::{Condvar, Mutex};

#[derive(Default)]
struct GateState {
    paused: bool,
    /// Batches currently inside the gate
    active: usize,
}

/// Blocking gate the delta feed passes through before touching the board.
#[derive(Default)]
pub struct PauseGate {
    state: Mutex<GateState>,
    changed: Condvar,
}

impl PauseGate {
    #[cfg(test)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter the gate, blocking while paused.
    pub fn enter(&self) -> Pass<'_> {
        let mut state = self.state.lock();
        while state.paused {
            self.changed.wait(&mut state);
        }
        state.active += 1;
        Pass { gate: self }
    }

    /// Pause the gate and wait for in-flight batches to drain.
    ///
    /// Only one pause is held at a time; a second caller waits for the first
    /// guard to drop. The gate reopens when the returned guard drops, on every
    /// exit path.
    pub fn pause(&self) -> PauseGuard<'_> {
        let mut state = self.state.lock();
        while state.paused {
            self.changed.wait(&mut state);
        }
        state.paused = true;
        while state.active > 0 {
            self.changed.wait(&mut state);
        }
        PauseGuard { gate: self }
    }

    #[cfg(test)]
    pub fn is_paused(&self) -> bool {
        self.state.lock().paused
    }

    fn leave(&self) {
        let mut state = self.state.lock();
        state.active -= 1;
        if state.active == 0 {
            self.changed.notify_all();
        }
    }

    fn resume(&self) {
        self.state.lock().paused = false;
        self.changed.notify_all();
    }
}

/// Permission to apply one batch of deltas.
pub struct Pass<'a> {
    gate: &'a PauseGate,
}

impl Drop for Pass<'_> {
    fn drop(&mut self) {
        self.gate.leave();
    }
}

/// Held while delta application is suspended.
pub struct PauseGuard<'a> {
    gate: &'a PauseGate,
}

impl Drop for PauseGuard<'_> {
    fn drop(&mut self) {
        self.gate.resume();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_enter_passes_when_open() {
        let gate = PauseGate::new();
        let _a = gate.enter();
        let _b = gate.enter();
        assert!(!gate.is_paused());
    }

    #[test]
    fn test_enter_blocks_while_paused() {
        let gate = Arc::new(PauseGate::new());
        let entered = Arc::new(AtomicBool::new(false));

        let guard = gate.pause();
        let handle = {
            let gate = Arc::clone(&gate);
            let entered = Arc::clone(&entered);
            thread::spawn(move || {
                let _pass = gate.enter();
                entered.store(true, Ordering::SeqCst);
            })
        };

        thread::sleep(Duration::from_millis(50));
        assert!(!entered.load(Ordering::SeqCst));

        drop(guard);
        handle.join().unwrap();
        assert!(entered.load(Ordering::SeqCst));
        assert!(!gate.is_paused());
    }

    #[test]
    fn test_pause_waits_for_active_pass() {
        let gate = Arc::new(PauseGate::new());
        let pass = gate.enter();
        let paused = Arc::new(AtomicBool::new(false));

        let handle = {
            let gate = Arc::clone(&gate);
            let paused = Arc::clone(&paused);
            thread::spawn(move || {
                let _guard = gate.pause();
                paused.store(true, Ordering::SeqCst);
            })
        };

        thread::sleep(Duration::from_millis(50));
        assert!(!paused.load(Ordering::SeqCst));

        drop(pass);
        handle.join().unwrap();
        assert!(paused.load(Ordering::SeqCst));
    }

    #[test]
    fn test_guard_resumes_on_early_return() {
        fn failing_refresh(gate: &PauseGate) -> Result<(), &'static str> {
            let _guard = gate.pause();
            Err("fetch failed")
        }

        let gate = PauseGate::new();
        assert!(failing_refresh(&gate).is_err());
        assert!(!gate.is_paused());
    }
}
