//! Components module for TSPlayer
//!
//! Headless models of the stock overlays: what each one shows and what it
//! asks the player for. A UI layer binds widgets to these fields; the
//! playback core never draws anything itself.

mod complete;
mod error;
mod gesture_view;
mod live_control;
mod prepare;
mod standard;
mod title;
mod vod_control;

pub use complete::CompleteView;
pub use error::ErrorView;
pub use gesture_view::{GestureIcon, GestureView};
pub use live_control::LiveControlView;
pub use prepare::PrepareView;
pub use standard::StandardControlView;
pub use title::TitleView;
pub use vod_control::{VodControlView, PROGRESS_MAX};

use crate::controller::{ComponentId, ControlWrapper, Controller, GestureVideoController, VideoControl};
use crate::utils::config::{ControllerConfig, PlaybackPolicy};
use crate::window::{ScreenOrientation, ViewHandle};

/// Horizontal `(left, right)` padding that keeps a bar clear of the cutout
///
/// None when the orientation does not tell which edge the cutout is on.
pub fn cutout_padding(orientation: ScreenOrientation, cutout_height: u32) -> Option<(u32, u32)> {
    match orientation {
        ScreenOrientation::Portrait => Some((0, 0)),
        ScreenOrientation::Landscape => Some((cutout_height, 0)),
        ScreenOrientation::ReverseLandscape => Some((0, cutout_height)),
        ScreenOrientation::Unspecified => None,
    }
}

/// Update `padding` for the current orientation if the screen has a cutout
pub(crate) fn adapt_padding(wrapper: &ControlWrapper, padding: &mut (u32, u32)) {
    if !wrapper.has_cutout() {
        return;
    }
    if let Some(p) = cutout_padding(wrapper.requested_orientation(), wrapper.cutout_height()) {
        *padding = p;
    }
}

/// Ids of the components added by `standard_controller`
#[derive(Debug, Clone, Copy)]
pub struct StandardComponents {
    /// Lock button and loading spinner, beneath every other overlay
    pub standard: ComponentId,
    pub complete: ComponentId,
    pub error: ComponentId,
    pub prepare: ComponentId,
    pub title: ComponentId,
    /// `LiveControlView` for live streams, `VodControlView` otherwise
    pub control: ComponentId,
    pub gesture: ComponentId,
}

/// Gesture controller with the full stock overlay set
///
/// Overlay views are numbered from `first_view` upwards in stacking order.
/// Live streams get the live bar and cannot be seeked by dragging.
pub fn standard_controller(
    config: ControllerConfig,
    policy: PlaybackPolicy,
    title: &str,
    is_live: bool,
    first_view: u64,
) -> (GestureVideoController, StandardComponents) {
    let view = |offset: u64| ViewHandle(first_view + offset);
    let mut controller = GestureVideoController::new(config);

    let standard =
        controller.add_control_component(Box::new(StandardControlView::new(view(0))), false);
    let complete = controller.add_control_component(Box::new(CompleteView::new(view(1))), false);
    let error = controller.add_control_component(Box::new(ErrorView::new(view(2))), false);

    let mut prepare_view = PrepareView::new(view(3), policy);
    prepare_view.set_click_start();
    let prepare = controller.add_control_component(Box::new(prepare_view), false);

    let mut title_view = TitleView::new(view(4));
    title_view.set_title(title);
    let title = controller.add_control_component(Box::new(title_view), false);

    let control = if is_live {
        controller.add_control_component(Box::new(LiveControlView::new(view(5))), false)
    } else {
        controller.add_control_component(Box::new(VodControlView::new(view(5))), false)
    };
    let gesture = controller.add_control_component(Box::new(GestureView::new(view(6))), false);
    controller.set_can_change_position(!is_live);

    let ids = StandardComponents {
        standard,
        complete,
        error,
        prepare,
        title,
        control,
        gesture,
    };
    (controller, ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cutout_padding_by_orientation() {
        assert_eq!(cutout_padding(ScreenOrientation::Portrait, 80), Some((0, 0)));
        assert_eq!(cutout_padding(ScreenOrientation::Landscape, 80), Some((80, 0)));
        assert_eq!(cutout_padding(ScreenOrientation::ReverseLandscape, 80), Some((0, 80)));
        assert_eq!(cutout_padding(ScreenOrientation::Unspecified, 80), None);
    }

    #[test]
    fn test_standard_controller_layout() {
        let (controller, ids) =
            standard_controller(ControllerConfig::default(), PlaybackPolicy::new(false), "Clip", false, 10);

        assert_eq!(controller.base().registry().len(), 7);
        assert_eq!(
            controller.base().registry().overlay_views(),
            (10..17).map(ViewHandle).collect::<Vec<_>>()
        );
        assert!(controller
            .component(ids.standard)
            .is_some_and(|c| c.as_any().is::<StandardControlView>()));
        let title = controller
            .component(ids.title)
            .and_then(|c| c.as_any().downcast_ref::<TitleView>());
        assert_eq!(title.map(|t| t.title()), Some("Clip"));
        assert!(controller
            .component(ids.control)
            .is_some_and(|c| c.as_any().is::<VodControlView>()));
    }

    #[test]
    fn test_live_controller_uses_live_bar() {
        let (controller, ids) =
            standard_controller(ControllerConfig::default(), PlaybackPolicy::new(false), "Live", true, 0);
        assert!(controller
            .component(ids.control)
            .is_some_and(|c| c.as_any().is::<LiveControlView>()));
    }
}
