use std::collections::VecDeque;

use crate::platform::Backend;
use crate::{Input, PlatformError, Rgba};

/// A windowless backend fed from a script of per-frame input batches.
///
/// Once the script runs out it reports [`Input::CloseRequested`] every frame.
#[derive(Debug, Default)]
pub struct Headless {
    script: VecDeque<Vec<Input>>,
    record: bool,
    frames: Vec<Vec<Rgba>>,
    presented: usize,
    fullscreen: bool,
    fullscreen_requests: Vec<bool>,
    fail_present_after: Option<usize>,
    fail_fullscreen: bool,
}

impl Headless {
    pub fn new<I>(script: I) -> Self
    where
        I: IntoIterator<Item = Vec<Input>>,
    {
        Self {
            script: script.into_iter().collect(),
            ..Default::default()
        }
    }

    /// `count` frames without any input.
    pub fn idle(count: usize) -> Self {
        Self::new(std::iter::repeat_with(Vec::new).take(count))
    }

    /// Keeps a copy of every presented frame.
    pub fn recording(mut self) -> Self {
        self.record = true;
        self
    }

    pub fn fail_present_after(mut self, presents: usize) -> Self {
        self.fail_present_after = Some(presents);
        self
    }

    pub fn fail_fullscreen(mut self) -> Self {
        self.fail_fullscreen = true;
        self
    }

    pub fn presented(&self) -> usize {
        self.presented
    }

    pub fn frames(&self) -> &[Vec<Rgba>] {
        &self.frames
    }

    pub fn last_frame(&self) -> Option<&[Rgba]> {
        self.frames.last().map(Vec::as_slice)
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn fullscreen_requests(&self) -> &[bool] {
        &self.fullscreen_requests
    }
}

impl Backend for Headless {
    fn poll_events(&mut self, events: &mut Vec<Input>) {
        match self.script.pop_front() {
            Some(batch) => events.extend(batch),
            None => events.push(Input::CloseRequested),
        }
    }

    fn present(
        &mut self,
        frame_buffer: &[Rgba],
        width: usize,
        height: usize,
    ) -> Result<(), PlatformError> {
        if self.fail_present_after == Some(self.presented) {
            return Err(PlatformError::Present(String::from("headless present failed")));
        }
        debug_assert_eq!(frame_buffer.len(), width * height);
        if self.record {
            self.frames.push(frame_buffer.to_vec());
        }
        self.presented += 1;
        Ok(())
    }

    fn set_fullscreen(&mut self, fullscreen: bool) -> Result<(), PlatformError> {
        self.fullscreen_requests.push(fullscreen);
        if self.fail_fullscreen {
            return Err(PlatformError::Fullscreen {
                entering: fullscreen,
                reason: String::from("headless fullscreen failed"),
            });
        }
        self.fullscreen = fullscreen;
        Ok(())
    }
}
