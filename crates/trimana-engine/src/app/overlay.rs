use crate::layers::{FrameCtx, Layer};

/// The UI subsystem's seam into the frame.
///
/// `begin` and `end` bracket every layer's `on_ui_update`. The overlay is
/// also a regular overlay layer, so it gets first refusal on input.
pub trait UiOverlay: Layer {
    fn begin(&mut self, ctx: &mut FrameCtx<'_>);
    fn end(&mut self, ctx: &mut FrameCtx<'_>);
}
