use super::PoolPos;

#[derive(Clone, Copy, Default)]
struct FrameState {
    pin_count: u32,
    referenced: bool,
}

/// ClockReplacer picks victim frames for the buffer manager using the clock policy.
/// Pinned frames are never chosen, recently referenced frames get a second chance.
pub(in crate::buffer) struct ClockReplacer {
    clock_hand: PoolPos,
    unpinned: usize,
    frames: Vec<FrameState>,
}

impl ClockReplacer {
    pub fn new(pool_size: usize) -> Self {
        Self {
            clock_hand: 0,
            unpinned: pool_size,
            frames: vec![FrameState::default(); pool_size],
        }
    }

    pub fn pin(&mut self, frame: PoolPos) {
        let state = &mut self.frames[frame];
        if state.pin_count == 0 {
            self.unpinned -= 1;
        }
        state.pin_count += 1;
        state.referenced = true;
    }

    pub fn unpin(&mut self, frame: PoolPos) {
        let state = &mut self.frames[frame];
        debug_assert!(state.pin_count > 0, "frame {frame} is not pinned");
        state.pin_count -= 1;
        if state.pin_count == 0 {
            self.unpinned += 1;
        }
    }

    /// Marks the frame as recently used without pinning it
    pub fn touch(&mut self, frame: PoolPos) {
        self.frames[frame].referenced = true;
    }

    #[cfg(test)]
    pub fn is_pinned(&self, frame: PoolPos) -> bool {
        self.frames[frame].pin_count > 0
    }

    /// Returns None if all frames are pinned, else the next victim under the clock hand.
    pub fn find_victim(&mut self) -> Option<PoolPos> {
        if self.unpinned == 0 {
            return None;
        }
        loop {
            let frame = self.clock_hand;
            self.clock_hand = (self.clock_hand + 1) % self.frames.len();
            let state = &mut self.frames[frame];
            if state.pin_count != 0 {
                continue;
            }
            if state.referenced {
                state.referenced = false;
            } else {
                return Some(frame);
            }
        }
    }
}
