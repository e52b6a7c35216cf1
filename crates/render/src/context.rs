use std::cell::RefCell;
use std::rc::Rc;

use bitflags::bitflags;
use glam::Vec4;

use crate::error::ContextError;

bitflags! {
    /// Buffers affected by a clear.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClearMask: u32 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;
    }
}

/// The device/context contract view nodes render through.
///
/// State setters mirror fixed-function raster state; `clear` uses whatever
/// state is current when it is called.
pub trait GraphicsContext {
    fn begin_frame(&mut self) -> Result<(), ContextError>;
    fn set_clear_color(&mut self, color: Vec4);
    fn set_clear_depth(&mut self, depth: f32);
    fn set_depth_write(&mut self, enabled: bool);
    fn set_color_write(&mut self, mask: [bool; 4]);
    fn set_depth_test(&mut self, enabled: bool);
    fn clear(&mut self, mask: ClearMask) -> Result<(), ContextError>;
    fn push_debug_group(&mut self, label: &str) -> Result<(), ContextError>;
    fn pop_debug_group(&mut self) -> Result<(), ContextError>;
    /// Finish the frame and hand it to the presentation target.
    fn present(&mut self) -> Result<(), ContextError>;
    /// Drop the open frame, if any, without presenting it. Open debug
    /// groups are discarded with it.
    fn abort_frame(&mut self);
    fn resize(&mut self, width: u32, height: u32);
    fn size(&self) -> (u32, u32);
}

/// A context shared between the root view node and its descendants.
pub type SharedContext = Rc<RefCell<dyn GraphicsContext>>;

/// Commands captured by [`RecordingContext`].
#[derive(Debug, Clone, PartialEq)]
pub enum ContextCommand {
    BeginFrame,
    ClearColor(Vec4),
    ClearDepth(f32),
    DepthWrite(bool),
    ColorWrite([bool; 4]),
    DepthTest(bool),
    Clear(ClearMask),
    PushDebugGroup(String),
    PopDebugGroup,
    Present,
    AbortFrame,
    Resize(u32, u32),
}

/// In-memory context that records every command.
///
/// Used for tests, dry runs and frame reports. It enforces the same frame
/// and debug-group discipline a GPU backend would.
#[derive(Debug)]
pub struct RecordingContext {
    commands: Vec<ContextCommand>,
    width: u32,
    height: u32,
    in_frame: bool,
    open_groups: usize,
    depth_write: bool,
    depth_test: bool,
    color_write: [bool; 4],
    frames_presented: u64,
}

impl RecordingContext {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            commands: Vec::new(),
            width,
            height,
            in_frame: false,
            open_groups: 0,
            depth_write: false,
            depth_test: false,
            color_write: [true; 4],
            frames_presented: 0,
        }
    }

    /// Wrap in a shared handle. Keep the returned `Rc` to inspect the log;
    /// it coerces to [`SharedContext`].
    pub fn shared(width: u32, height: u32) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new(width, height)))
    }

    pub fn commands(&self) -> &[ContextCommand] {
        &self.commands
    }

    pub fn drain(&mut self) -> Vec<ContextCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn depth_write_enabled(&self) -> bool {
        self.depth_write
    }

    pub fn depth_test_enabled(&self) -> bool {
        self.depth_test
    }

    pub fn color_write(&self) -> [bool; 4] {
        self.color_write
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    /// Masks of every clear issued so far, in order.
    pub fn clears(&self) -> Vec<ClearMask> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                ContextCommand::Clear(mask) => Some(*mask),
                _ => None,
            })
            .collect()
    }
}

impl Default for RecordingContext {
    fn default() -> Self {
        Self::new(300, 300)
    }
}

impl GraphicsContext for RecordingContext {
    fn begin_frame(&mut self) -> Result<(), ContextError> {
        if self.in_frame {
            return Err(ContextError::FrameInProgress);
        }
        self.in_frame = true;
        self.commands.push(ContextCommand::BeginFrame);
        Ok(())
    }

    fn set_clear_color(&mut self, color: Vec4) {
        self.commands.push(ContextCommand::ClearColor(color));
    }

    fn set_clear_depth(&mut self, depth: f32) {
        self.commands.push(ContextCommand::ClearDepth(depth));
    }

    fn set_depth_write(&mut self, enabled: bool) {
        self.depth_write = enabled;
        self.commands.push(ContextCommand::DepthWrite(enabled));
    }

    fn set_color_write(&mut self, mask: [bool; 4]) {
        self.color_write = mask;
        self.commands.push(ContextCommand::ColorWrite(mask));
    }

    fn set_depth_test(&mut self, enabled: bool) {
        self.depth_test = enabled;
        self.commands.push(ContextCommand::DepthTest(enabled));
    }

    fn clear(&mut self, mask: ClearMask) -> Result<(), ContextError> {
        if !self.in_frame {
            return Err(ContextError::NoFrame);
        }
        self.commands.push(ContextCommand::Clear(mask));
        Ok(())
    }

    fn push_debug_group(&mut self, label: &str) -> Result<(), ContextError> {
        if !self.in_frame {
            return Err(ContextError::NoFrame);
        }
        self.open_groups += 1;
        self.commands
            .push(ContextCommand::PushDebugGroup(label.to_string()));
        Ok(())
    }

    fn pop_debug_group(&mut self) -> Result<(), ContextError> {
        if self.open_groups == 0 {
            return Err(ContextError::UnbalancedDebugGroup);
        }
        self.open_groups -= 1;
        self.commands.push(ContextCommand::PopDebugGroup);
        Ok(())
    }

    fn present(&mut self) -> Result<(), ContextError> {
        if !self.in_frame {
            return Err(ContextError::NoFrame);
        }
        if self.open_groups != 0 {
            return Err(ContextError::UnbalancedDebugGroup);
        }
        self.in_frame = false;
        self.frames_presented += 1;
        self.commands.push(ContextCommand::Present);
        Ok(())
    }

    fn abort_frame(&mut self) {
        if !self.in_frame {
            return;
        }
        self.in_frame = false;
        self.open_groups = 0;
        self.commands.push(ContextCommand::AbortFrame);
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.commands.push(ContextCommand::Resize(width, height));
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
